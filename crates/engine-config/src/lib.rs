pub mod report;
pub mod settings;
