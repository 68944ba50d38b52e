pub mod configuration;
pub mod report;
