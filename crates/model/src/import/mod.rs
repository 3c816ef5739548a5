pub mod state;
pub mod status;
pub mod summary;
pub mod totals;
