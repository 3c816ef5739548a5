pub mod core;
pub mod events;
pub mod import;
pub mod records;
