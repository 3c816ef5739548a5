pub mod batch;
pub mod record_set;
