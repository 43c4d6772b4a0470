// Appointment scheduling: calendar credentials, operator provisioning and event creation.

pub mod calendar;
pub mod credentials;
pub mod handlers;
pub mod provision;
