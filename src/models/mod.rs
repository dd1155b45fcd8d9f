mod appointment;
mod category;
mod client;
mod schedule_block;
mod service;
mod settings;
mod user;

pub use appointment::{Appointment, AppointmentDetails, AppointmentStatus};
pub use category::Category;
pub use client::Client;
pub use schedule_block::ScheduleBlock;
pub use service::Service;
pub use settings::{ClinicSettings, WEEKDAY_NAMES};
pub use user::{Role, User};
