use std::fmt;

use facetgrid_engine::FacetError;

#[derive(Debug)]
pub enum IngestError {
    /// File read/write error.
    Io(String),
    /// Malformed CSV the reader couldn't recover from.
    Csv(String),
    /// Input has no header row.
    MissingHeader,
    /// Header/records don't form a valid dataset under the schema.
    Schema(FacetError),
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
            Self::MissingHeader => write!(f, "input has no header row"),
            Self::Schema(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for IngestError {}

impl From<FacetError> for IngestError {
    fn from(e: FacetError) -> Self {
        Self::Schema(e)
    }
}
