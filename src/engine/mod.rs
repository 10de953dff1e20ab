//! The faceted filtering engine
//!
//! A `FacetEngine` bundles the collaborators a recomputation needs (clock,
//! membership sets, size classifier, searched fields, label aliases) and
//! exposes the pure operations over a catalog snapshot:
//!
//! ```text
//! filter(catalog, state)            -> filtered set
//! count(catalog, filtered, state)   -> per-dimension (value, count) lists
//! reconcile(counts, state)          -> lists with previous selections re-applied
//! ```
//!
//! None of these mutate their inputs, so they can run on a worker thread
//! against a frozen snapshot.

pub mod classify;
pub mod clock;
pub mod counter;
pub mod dates;
pub mod filter;
pub mod membership;
pub mod predicates;
pub mod reconcile;
pub mod status;
pub mod text;

use crate::catalog::Item;
use crate::config::EngineConfig;
use crate::state::FilterState;
use crate::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

pub use classify::{FileSizeClassifier, NoSizeBuckets, ThresholdClassifier};
pub use clock::{Clock, FixedClock, SystemClock};
pub use counter::{CountMode, FacetCount, FacetCounts, FacetList, StatusSection};
pub use dates::{DateFilter, DateFilterType, DateRange};
pub use filter::ItemPredicate;
pub use membership::{EmptySet, MembershipSet};
pub use predicates::{Collection, DamagedFilter, FacetContext, FacetDimension, Location};
pub use reconcile::{FacetEntry, LabelAliases, ReconciledList, Reconciliation, SelectionReconciler};
pub use status::{OptimizationState, StatusFacet, VersionState};
pub use text::{SearchField, TextQuery};

/// Result of one filter-and-count pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetComputation {
    /// Indices into the catalog, in catalog order
    pub filtered: Vec<usize>,
    pub counts: FacetCounts,
}

/// Reconciled lists for every dimension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledFacets {
    pub lists: Vec<ReconciledList>,
    /// Selections that no longer match any candidate, per dimension
    pub dropped: Vec<(FacetDimension, Vec<String>)>,
}

impl ReconciledFacets {
    pub fn list(&self, dimension: FacetDimension) -> Option<&ReconciledList> {
        self.lists.iter().find(|l| l.dimension == dimension)
    }

    pub fn has_dropped_selections(&self) -> bool {
        self.dropped.iter().any(|(_, names)| !names.is_empty())
    }
}

pub struct FacetEngine {
    clock: Arc<dyn Clock>,
    favorites: Arc<dyn MembershipSet>,
    auto_install: Arc<dyn MembershipSet>,
    classifier: Arc<dyn FileSizeClassifier>,
    search_fields: Vec<SearchField>,
    reconciler: SelectionReconciler,
}

impl Default for FacetEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FacetEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FacetEngine")
            .field("search_fields", &self.search_fields)
            .field("size_buckets", &self.classifier.labels())
            .field("aliases", self.reconciler.aliases())
            .finish()
    }
}

impl FacetEngine {
    /// Engine with the system clock, empty membership sets, no size
    /// buckets and the default searched fields
    pub fn new() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            favorites: Arc::new(EmptySet),
            auto_install: Arc::new(EmptySet),
            classifier: Arc::new(NoSizeBuckets),
            search_fields: SearchField::defaults(),
            reconciler: SelectionReconciler::default(),
        }
    }

    /// Build from configuration: threshold classifier, searched fields and
    /// extra label aliases
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let classifier = ThresholdClassifier::new(config.file_size_buckets.clone())?;
        Ok(Self::new()
            .with_classifier(Arc::new(classifier))
            .with_search_fields(config.search_fields.clone())
            .with_aliases(LabelAliases::with_extra(&config.label_aliases)))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_favorites(mut self, favorites: Arc<dyn MembershipSet>) -> Self {
        self.favorites = favorites;
        self
    }

    pub fn with_auto_install(mut self, auto_install: Arc<dyn MembershipSet>) -> Self {
        self.auto_install = auto_install;
        self
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn FileSizeClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_search_fields(mut self, fields: Vec<SearchField>) -> Self {
        self.search_fields = fields;
        self
    }

    pub fn with_aliases(mut self, aliases: LabelAliases) -> Self {
        self.reconciler = SelectionReconciler::new(aliases);
        self
    }

    pub fn context(&self) -> FacetContext<'_> {
        FacetContext {
            favorites: self.favorites.as_ref(),
            auto_install: self.auto_install.as_ref(),
            classifier: self.classifier.as_ref(),
        }
    }

    pub fn search_fields(&self) -> &[SearchField] {
        &self.search_fields
    }

    pub fn reconciler(&self) -> &SelectionReconciler {
        &self.reconciler
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// The combined predicate for `state`, with "now" read once
    pub fn predicate<'a>(&'a self, state: &'a FilterState) -> ItemPredicate<'a> {
        ItemPredicate::new(state, self.context(), &self.search_fields, self.clock.now())
    }

    /// Items passing every active test, in catalog order
    pub fn filter<'c>(&self, catalog: &'c [Item], state: &FilterState) -> Vec<&'c Item> {
        let predicate = self.predicate(state);
        catalog.iter().filter(|item| predicate.matches(item)).collect()
    }

    pub fn filter_indices(&self, catalog: &[Item], state: &FilterState) -> Vec<usize> {
        filter::filter_indices(catalog, &self.predicate(state))
    }

    /// Facet counts over an already filtered set
    pub fn count<'c>(
        &'c self,
        catalog: &'c [Item],
        filtered: &[&'c Item],
        state: &FilterState,
        mode: CountMode,
    ) -> FacetCounts {
        counter::count_facets(catalog, filtered, state, mode, &self.context())
    }

    /// Filter then count, in the mode the state selects
    pub fn compute(&self, catalog: &[Item], state: &FilterState) -> FacetComputation {
        let started = Instant::now();
        let mode = CountMode::for_state(state);

        let filtered = self.filter_indices(catalog, state);
        let filtered_items: Vec<&Item> = filtered.iter().map(|&i| &catalog[i]).collect();
        let counts = self.count(catalog, &filtered_items, state, mode);

        debug!(
            "Recomputed facets: {} of {} items matched ({:?} mode) in {:?}",
            filtered.len(),
            catalog.len(),
            mode,
            started.elapsed()
        );

        FacetComputation { filtered, counts }
    }

    /// Re-apply the state's current selections to freshly computed lists
    pub fn reconcile(&self, counts: &FacetCounts, state: &FilterState) -> ReconciledFacets {
        let mut lists = Vec::with_capacity(counts.lists.len());
        let mut dropped = Vec::new();

        for list in &counts.lists {
            let previous = state.selected_values(list.dimension);
            let reconciliation = self.reconciler.reconcile(list, &previous);
            if !reconciliation.dropped.is_empty() {
                debug!(
                    "Selections {:?} of facet {} no longer have a candidate value",
                    reconciliation.dropped, list.dimension
                );
                dropped.push((list.dimension, reconciliation.dropped));
            }
            lists.push(reconciliation.list);
        }

        ReconciledFacets { lists, dropped }
    }
}
