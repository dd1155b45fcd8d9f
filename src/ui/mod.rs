//! Terminal screens.
//!
//! Every screen owns a `XxxState`, draws itself with `render_xxx` and turns
//! keys into an optional `XxxAction` for the application loop to carry out.

pub mod components;

pub mod appointment_wizard;
pub mod booking_wizard;
pub mod calendar;
pub mod catalog;
pub mod categories;
pub mod category_wizard;
pub mod client_wizard;
pub mod clients;
pub mod dashboard;
pub mod home;
pub mod login;
pub mod service_wizard;
pub mod services;
pub mod settings;
