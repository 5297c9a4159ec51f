//! Explorer - one browsing session over a dataset
//!
//! Owns the filter state and the comparison selection for a shared,
//! read-only dataset. Intents mutate state synchronously; `snapshot`
//! recomputes every output from scratch.
//!
//! Key invariants:
//! - Swapping the dataset resets filters, pending intents and pins
//! - Under `ApplyPolicy::Deferred`, outputs reflect committed state only

use std::sync::Arc;

use serde::Serialize;

use crate::compare::ComparisonSelection;
use crate::error::FacetError;
use crate::events::{ApplyPolicy, Intent};
use crate::facets::{facet_panel, filtered_records, Facet};
use crate::filter::{FilterState, FilterTag};
use crate::record::{Dataset, Record};

/// Everything a rendering layer needs after an intent
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<'a> {
    /// No field is constrained (caller may show a prompt instead of a table)
    pub unfiltered: bool,
    #[serde(skip)]
    pub records: Vec<&'a Record>,
    pub facets: Vec<Facet>,
    pub tags: Vec<FilterTag>,
    #[serde(skip)]
    pub pinned: Vec<&'a Record>,
}

#[derive(Debug, Clone)]
pub struct Explorer {
    dataset: Arc<Dataset>,
    filters: FilterState,
    comparison: ComparisonSelection,
    policy: ApplyPolicy,
    pending: Vec<Intent>,
}

impl Explorer {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self::with_policy(dataset, ApplyPolicy::default())
    }

    pub fn with_policy(dataset: Arc<Dataset>, policy: ApplyPolicy) -> Self {
        Self {
            dataset,
            filters: FilterState::new(),
            comparison: ComparisonSelection::new(),
            policy,
            pending: Vec::new(),
        }
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn comparison(&self) -> &ComparisonSelection {
        &self.comparison
    }

    pub fn policy(&self) -> ApplyPolicy {
        self.policy
    }

    /// Selection intents waiting for `commit`
    pub fn pending(&self) -> &[Intent] {
        &self.pending
    }

    // -------------------------------------------------------------------------
    // Intents
    // -------------------------------------------------------------------------

    /// Process one intent. Selection intents naming a field the dataset
    /// doesn't have are rejected without touching any state.
    pub fn apply(&mut self, intent: Intent) -> Result<(), FacetError> {
        if let Some(field) = intent.field() {
            self.dataset.require_field(field)?;
        }
        log::debug!("intent: {intent:?}");

        if !intent.is_selection() {
            self.apply_pin(intent);
            return Ok(());
        }
        match self.policy {
            ApplyPolicy::Immediate => self.apply_selection(intent),
            ApplyPolicy::Deferred => self.pending.push(intent),
        }
        Ok(())
    }

    /// Apply a batch in order, stopping at the first rejected intent
    pub fn apply_all<I>(&mut self, intents: I) -> Result<(), FacetError>
    where
        I: IntoIterator<Item = Intent>,
    {
        for intent in intents {
            self.apply(intent)?;
        }
        Ok(())
    }

    /// Fold queued selection intents into the filter state.
    /// Returns how many were applied.
    pub fn commit(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending);
        let count = pending.len();
        for intent in pending {
            self.apply_selection(intent);
        }
        count
    }

    /// Drop queued selection intents without applying them
    pub fn discard_pending(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }

    fn apply_selection(&mut self, intent: Intent) {
        match intent {
            Intent::Select { field, value } => {
                self.filters.select(&field, &value);
            }
            Intent::Deselect { field, value } => {
                self.filters.deselect(&field, &value);
            }
            Intent::Toggle { field, value } => {
                self.filters.toggle(&field, &value);
            }
            Intent::ClearField { field } => {
                self.filters.clear_field(&field);
            }
            Intent::ClearAll => self.filters.clear(),
            Intent::Pin { .. } | Intent::Unpin { .. } | Intent::TogglePin { .. } => {
                self.apply_pin(intent)
            }
        }
    }

    fn apply_pin(&mut self, intent: Intent) {
        match intent {
            Intent::Pin { id } => {
                self.comparison.pin(id);
            }
            Intent::Unpin { id } => {
                self.comparison.unpin(&id);
            }
            Intent::TogglePin { id } => {
                self.comparison.toggle(id);
            }
            _ => {}
        }
    }

    // -------------------------------------------------------------------------
    // Dataset lifecycle
    // -------------------------------------------------------------------------

    /// Swap in a new dataset; filters, pending intents and pins start empty
    pub fn load(&mut self, dataset: Arc<Dataset>) {
        log::debug!("loading dataset with {} records", dataset.len());
        self.dataset = dataset;
        self.filters.clear();
        self.pending.clear();
        self.comparison.clear();
    }

    /// Swap in a new dataset but keep pins that still resolve.
    /// Returns how many pins were dropped.
    pub fn load_keeping_pins(&mut self, dataset: Arc<Dataset>) -> usize {
        let comparison = std::mem::take(&mut self.comparison);
        self.load(dataset);
        self.comparison = comparison;
        self.comparison.retain_resolvable(&self.dataset)
    }

    // -------------------------------------------------------------------------
    // Outputs
    // -------------------------------------------------------------------------

    pub fn records(&self) -> Result<Vec<&Record>, FacetError> {
        filtered_records(&self.dataset, &self.filters)
    }

    pub fn pinned(&self) -> Vec<&Record> {
        self.comparison.to_pinned_records(&self.dataset)
    }

    /// Recompute records, facets, tags and pinned records
    pub fn snapshot(&self) -> Result<Snapshot<'_>, FacetError> {
        Ok(Snapshot {
            unfiltered: self.filters.is_unfiltered(),
            records: self.records()?,
            facets: facet_panel(&self.dataset, &self.filters)?,
            tags: self.filters.tags(&self.dataset),
            pinned: self.pinned(),
        })
    }
}
