pub mod header;
pub mod normalizer;
