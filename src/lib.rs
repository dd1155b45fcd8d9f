pub mod app;
pub mod auth;
pub mod booking;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod notify;
pub mod scheduling;
pub mod ui;
pub mod validation;
