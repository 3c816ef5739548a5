pub mod control;
pub mod error;
pub mod event_bus;
pub mod input;
pub mod metrics;
pub mod plan;
pub mod progress;
