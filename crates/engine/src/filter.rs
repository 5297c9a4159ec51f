//! Filter State - active facet selections
//!
//! Maps field name -> set of selected raw values.
//!
//! Key invariants:
//! - A field is present iff its selected set is non-empty
//! - Removing the last value for a field removes the field's key
//! - Set semantics: insertion order is irrelevant, duplicates impossible

use std::collections::BTreeSet;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use crate::record::Dataset;
use crate::sort::sort_values;

/// One active `(field, value)` pair, for rendering removable filter tags
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterTag {
    pub field: String,
    pub value: String,
}

/// Per-field selected values. Empty state = unfiltered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    selections: FxHashMap<String, FxHashSet<String>>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Mutators
    // -------------------------------------------------------------------------

    /// Add `value` to `field`'s selection. Returns false if it was already there.
    pub fn select(&mut self, field: &str, value: &str) -> bool {
        self.selections
            .entry(field.to_string())
            .or_default()
            .insert(value.to_string())
    }

    /// Remove `value`; drops the field entirely when its set empties.
    /// Returns false if the value wasn't selected.
    pub fn deselect(&mut self, field: &str, value: &str) -> bool {
        let Some(values) = self.selections.get_mut(field) else {
            return false;
        };
        let removed = values.remove(value);
        if values.is_empty() {
            self.selections.remove(field);
        }
        removed
    }

    /// Flip a value's selection. Returns the new selected state.
    pub fn toggle(&mut self, field: &str, value: &str) -> bool {
        if self.is_selected(field, value) {
            self.deselect(field, value);
            false
        } else {
            self.select(field, value);
            true
        }
    }

    /// Drop every selection for `field`. Returns false if nothing was selected.
    pub fn clear_field(&mut self, field: &str) -> bool {
        self.selections.remove(field).is_some()
    }

    pub fn clear(&mut self) {
        self.selections.clear();
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn is_selected(&self, field: &str, value: &str) -> bool {
        self.selections
            .get(field)
            .is_some_and(|values| values.contains(value))
    }

    /// Fields with at least one selected value
    pub fn active_fields(&self) -> BTreeSet<&str> {
        self.selections.keys().map(String::as_str).collect()
    }

    pub fn is_active(&self, field: &str) -> bool {
        self.selections.contains_key(field)
    }

    /// No field is constrained. Callers may render this differently from an
    /// empty result (e.g. a prompt instead of an empty table).
    pub fn is_unfiltered(&self) -> bool {
        self.selections.is_empty()
    }

    pub fn selected(&self, field: &str) -> Option<&FxHashSet<String>> {
        self.selections.get(field)
    }

    pub fn selections(&self) -> impl Iterator<Item = (&str, &FxHashSet<String>)> {
        self.selections.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Total number of selected values across all fields
    pub fn len(&self) -> usize {
        self.selections.values().map(FxHashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.is_unfiltered()
    }

    /// Copy of this state with `field`'s own entry removed
    pub fn without(&self, field: &str) -> FilterState {
        let mut derived = self.clone();
        derived.selections.remove(field);
        derived
    }

    /// Active selections as tags: dataset field order first, values in each
    /// field's option order. Fields the dataset doesn't know come last, by name.
    pub fn tags(&self, dataset: &Dataset) -> Vec<FilterTag> {
        let mut order: Vec<&str> = dataset
            .field_names()
            .filter(|name| self.is_active(name))
            .collect();
        let mut stray: Vec<&str> = self
            .selections
            .keys()
            .map(String::as_str)
            .filter(|name| dataset.field(name).is_none())
            .collect();
        stray.sort_unstable();
        order.extend(stray);

        let mut tags = Vec::with_capacity(self.len());
        for field in order {
            let Some(values) = self.selections.get(field) else {
                continue;
            };
            let mut values: Vec<&str> = values.iter().map(String::as_str).collect();
            sort_values(&mut values, dataset.schema().kind_of(field));
            tags.extend(values.into_iter().map(|value| FilterTag {
                field: field.to_string(),
                value: value.to_string(),
            }));
        }
        tags
    }
}

// =============================================================================
// Tests
// =============================================================================
