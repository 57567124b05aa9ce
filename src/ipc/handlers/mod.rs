pub mod core;
pub mod exchange;
pub mod reports;
pub mod settings;
pub mod students;
