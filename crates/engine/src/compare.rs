//! Comparison Selection - pinned records for side-by-side viewing
//!
//! Pins are identity-keyed and independent of the filter state: a pinned
//! record stays pinned when a later filter would exclude it.
//!
//! Display order (recomputed on every call, never cached):
//! 1. Descending count of pinned records sharing the same group value
//! 2. First identity component, ascending
//! 3. Second identity component, ascending

use std::cmp::Reverse;
use std::collections::BTreeSet;

use rustc_hash::FxHashMap;

use crate::record::{Dataset, Record, RecordId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComparisonSelection {
    pinned: BTreeSet<RecordId>,
}

impl ComparisonSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if already pinned
    pub fn pin(&mut self, id: RecordId) -> bool {
        self.pinned.insert(id)
    }

    /// Returns false if it wasn't pinned
    pub fn unpin(&mut self, id: &RecordId) -> bool {
        self.pinned.remove(id)
    }

    /// Flip the pin. Returns the new pinned state.
    pub fn toggle(&mut self, id: RecordId) -> bool {
        if self.pinned.remove(&id) {
            false
        } else {
            self.pinned.insert(id);
            true
        }
    }

    pub fn is_pinned(&self, id: &RecordId) -> bool {
        self.pinned.contains(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &RecordId> {
        self.pinned.iter()
    }

    pub fn len(&self) -> usize {
        self.pinned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pinned.is_empty()
    }

    pub fn clear(&mut self) {
        self.pinned.clear();
    }

    /// Drop identities that no longer resolve against `dataset`.
    /// Returns how many were dropped.
    pub fn retain_resolvable(&mut self, dataset: &Dataset) -> usize {
        let before = self.pinned.len();
        self.pinned.retain(|id| {
            let keep = dataset.find(id).is_some();
            if !keep {
                log::warn!("dropping stale pin {id}: no matching record");
            }
            keep
        });
        before - self.pinned.len()
    }

    /// Resolve pins against `dataset` in display order.
    ///
    /// Identities without a record are skipped silently.
    pub fn to_pinned_records<'a>(&self, dataset: &'a Dataset) -> Vec<&'a Record> {
        let schema = dataset.schema();
        let resolved: Vec<(&RecordId, &Record)> = self
            .pinned
            .iter()
            .filter_map(|id| dataset.find(id).map(|record| (id, record)))
            .collect();

        let group_of = |record: &'a Record| -> &'a str {
            schema
                .group()
                .and_then(|field| record.value(field))
                .filter(|v| !v.is_empty())
                .unwrap_or(schema.group_fallback())
        };

        let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
        for (_, record) in &resolved {
            *counts.entry(group_of(*record)).or_default() += 1;
        }

        let mut ordered = resolved;
        ordered.sort_by_key(|(id, record)| (Reverse(counts[group_of(*record)]), *id));
        ordered.into_iter().map(|(_, record)| record).collect()
    }
}
