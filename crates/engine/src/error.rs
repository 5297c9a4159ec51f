use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FacetError {
    /// A field name that is not part of the dataset's field list.
    UnknownField(String),
    /// A record carries a key the dataset does not declare.
    SchemaMismatch { record: usize, field: String },
    /// Schema references fields that don't exist, or declares a field twice.
    InvalidSchema(String),
}

impl fmt::Display for FacetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownField(field) => write!(f, "unknown field: '{field}'"),
            Self::SchemaMismatch { record, field } => {
                write!(f, "record {record}: field '{field}' is not declared by the dataset")
            }
            Self::InvalidSchema(msg) => write!(f, "invalid schema: {msg}"),
        }
    }
}

impl std::error::Error for FacetError {}
