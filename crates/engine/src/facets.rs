//! Faceted Filter Engine
//!
//! Pure functions of `(Dataset, FilterState)`; nothing is cached between calls.
//!
//! Key invariants:
//! - AND across fields, OR within a field
//! - A record missing a constrained field fails that constraint
//! - Filtering preserves dataset record order
//! - A facet's options ignore that facet's own selection (cross-filtering)

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::error::FacetError;
use crate::filter::FilterState;
use crate::record::{Dataset, FieldKind, Record, Schema};
use crate::sort::{parse_number, sort_values, SortMode};

// =============================================================================
// Types
// =============================================================================

/// A distinct value offerable for a field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacetOption {
    /// Raw (trimmed) value, as matched by the filter
    pub value: String,
    /// Parsed number when the list was sorted numerically
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<f64>,
}

/// An option as shown in a facet list, with its checkmark state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacetEntry {
    #[serde(flatten)]
    pub option: FacetOption,
    pub selected: bool,
}

/// One facet (dataset field) with its current option list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Facet {
    pub field: String,
    pub kind: FieldKind,
    /// Field has at least one selected value
    pub active: bool,
    pub entries: Vec<FacetEntry>,
}

// =============================================================================
// Matching
// =============================================================================

/// Does `record` satisfy any of `selected` for `field`?
pub fn record_matches(
    record: &Record,
    field: &str,
    selected: &FxHashSet<String>,
    schema: &Schema,
) -> bool {
    let Some(cell) = record.value(field) else {
        return false;
    };
    if schema.kind_of(field).is_multi_valued() {
        record
            .parts(field, schema.delimiter())
            .any(|part| selected.contains(part))
    } else {
        selected.contains(cell)
    }
}

fn check_fields(dataset: &Dataset, state: &FilterState) -> Result<(), FacetError> {
    for (field, _) in state.selections() {
        dataset.require_field(field)?;
    }
    Ok(())
}

// =============================================================================
// Filtering
// =============================================================================

/// Records satisfying every active field's selection, in dataset order.
///
/// With no active field this is the whole dataset.
pub fn filtered_records<'a>(
    dataset: &'a Dataset,
    state: &FilterState,
) -> Result<Vec<&'a Record>, FacetError> {
    check_fields(dataset, state)?;

    let schema = dataset.schema();
    let records: Vec<&Record> = dataset
        .records()
        .iter()
        .filter(|record| {
            state
                .selections()
                .all(|(field, selected)| record_matches(record, field, selected, schema))
        })
        .collect();

    log::debug!(
        "filtered {} of {} records across {} active field(s)",
        records.len(),
        dataset.len(),
        state.active_fields().len()
    );
    Ok(records)
}

// =============================================================================
// Facet options
// =============================================================================

/// Values still achievable for `field` given every *other* active facet.
///
/// Sorted numerically when the field is numeric and every value parses,
/// lexicographically otherwise.
pub fn facet_options(
    dataset: &Dataset,
    state: &FilterState,
    field: &str,
) -> Result<Vec<FacetOption>, FacetError> {
    let kind = dataset.require_field(field)?.kind;
    let candidates = filtered_records(dataset, &state.without(field))?;

    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut values: Vec<&str> = Vec::new();
    for record in &candidates {
        for value in record.facet_values(field, dataset.schema()) {
            if seen.insert(value) {
                values.push(value);
            }
        }
    }

    Ok(build_options(values, kind))
}

fn build_options(mut values: Vec<&str>, kind: FieldKind) -> Vec<FacetOption> {
    let mode = sort_values(&mut values, kind);
    values
        .into_iter()
        .map(|value| FacetOption {
            value: value.to_string(),
            number: match mode {
                SortMode::Numeric => parse_number(value).map(|n| n.0),
                SortMode::Lexicographic => None,
            },
        })
        .collect()
}

/// Every non-hidden field, in dataset order, with its options and selection marks.
///
/// Values that are selected but no longer offered are still listed so they
/// can be deselected.
pub fn facet_panel(dataset: &Dataset, state: &FilterState) -> Result<Vec<Facet>, FacetError> {
    check_fields(dataset, state)?;
    let schema = dataset.schema();

    let mut facets = Vec::new();
    for field in dataset.fields() {
        if schema.is_hidden(&field.name) {
            continue;
        }
        let mut options = facet_options(dataset, state, &field.name)?;

        if let Some(selected) = state.selected(&field.name) {
            let offered: FxHashSet<&str> = options.iter().map(|o| o.value.as_str()).collect();
            let orphans: Vec<&str> = selected
                .iter()
                .map(String::as_str)
                .filter(|v| !offered.contains(v))
                .collect();
            if !orphans.is_empty() {
                let mut merged: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
                merged.extend(orphans);
                options = build_options(merged, field.kind);
            }
        }

        let entries = options
            .into_iter()
            .map(|option| FacetEntry {
                selected: state.is_selected(&field.name, &option.value),
                option,
            })
            .collect();

        facets.push(Facet {
            field: field.name.clone(),
            kind: field.kind,
            active: state.is_active(&field.name),
            entries,
        });
    }
    Ok(facets)
}

// =============================================================================
// Tests
// =============================================================================
