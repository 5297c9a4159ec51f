//! `facetgrid-engine` - faceted filtering and comparison over an in-memory dataset.
//!
//! Pure engine crate: receives a parsed dataset and user intents, returns
//! filtered records, facet option lists and the pinned comparison set.
//! No IO dependencies.

pub mod compare;
pub mod error;
pub mod events;
pub mod explorer;
pub mod facets;
pub mod filter;
pub mod record;
pub mod sort;

pub use compare::ComparisonSelection;
pub use error::FacetError;
pub use events::{ApplyPolicy, Intent};
pub use explorer::{Explorer, Snapshot};
pub use facets::{facet_options, facet_panel, filtered_records, Facet, FacetEntry, FacetOption};
pub use filter::{FilterState, FilterTag};
pub use record::{Dataset, Field, FieldKind, Record, RecordId, Schema};
pub use sort::{compare_values, SortMode};
