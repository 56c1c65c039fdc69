pub mod projects;
pub mod reminders;
pub mod schedule;
pub mod server;
pub mod stocks;
pub mod weather;
