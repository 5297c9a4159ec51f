//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 1    | General error (unspecified, output write failure)    |
//! | 2    | Usage error (bad args, malformed --select / --pin)   |
//! | 3    | A field named on the command line isn't in the data  |
//! | 4    | Schema file unreadable or invalid                    |
//! | 5    | Data file unreadable or not a valid dataset          |

use facetgrid_config::ConfigError;
use facetgrid_engine::FacetError;
use facetgrid_io::IngestError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, malformed FIELD=VALUE or identity.
pub const EXIT_USAGE: u8 = 2;

/// Unknown field in --select or `options FIELD`.
pub const EXIT_UNKNOWN_FIELD: u8 = 3;

/// Schema config could not be read, parsed or validated.
pub const EXIT_CONFIG: u8 = 4;

/// Data file could not be read or doesn't fit the schema.
pub const EXIT_INGEST: u8 = 5;

pub fn facet_exit_code(err: &FacetError) -> u8 {
    match err {
        FacetError::UnknownField(_) => EXIT_UNKNOWN_FIELD,
        FacetError::SchemaMismatch { .. } | FacetError::InvalidSchema(_) => EXIT_INGEST,
    }
}

pub fn config_exit_code(_err: &ConfigError) -> u8 {
    EXIT_CONFIG
}

pub fn ingest_exit_code(_err: &IngestError) -> u8 {
    EXIT_INGEST
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_USAGE,
            EXIT_UNKNOWN_FIELD,
            EXIT_CONFIG,
            EXIT_INGEST,
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_facet_error_mapping() {
        assert_eq!(
            facet_exit_code(&FacetError::UnknownField("x".into())),
            EXIT_UNKNOWN_FIELD
        );
        assert_eq!(
            facet_exit_code(&FacetError::InvalidSchema("x".into())),
            EXIT_INGEST
        );
    }
}
