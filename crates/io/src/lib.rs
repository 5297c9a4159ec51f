// File I/O: CSV ingestion into a dataset, CSV/JSON export of results

pub mod csv;
pub mod error;
pub mod json;

pub use error::IngestError;
