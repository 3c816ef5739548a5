pub mod error;
pub mod importer;

pub use importer::Importer;
