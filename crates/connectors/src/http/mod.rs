pub mod processor;
pub mod response;
