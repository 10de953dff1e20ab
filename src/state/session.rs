//! Interactive filtering session
//!
//! A session owns one filter state, the catalog snapshot it filters and the
//! last computed view. Selection changes made outside a batch recompute
//! immediately; inside a batch they only mark the session dirty and the
//! outermost scope recomputes once when it ends.
//!
//! Settling a computation runs inside a batch of its own, so the selections
//! the reconciler writes back never re-enter the recomputation. When it has
//! to drop a vanished selection the state changed, and exactly one more pass
//! follows, on the caller's thread or on the blocking pool.

use super::FilterState;
use crate::catalog::{CatalogSnapshot, Item};
use crate::engine::{
    CountMode, DamagedFilter, DateFilter, FacetComputation, FacetDimension, FacetEngine,
    ReconciledList, StatusSection,
};
use crate::{FacetError, Result};
use serde::Serialize;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Upper bound on recomputations per rebuild: the first pass plus one
/// after the reconciler dropped vanished selections
const MAX_PASSES: usize = 2;

pub type SharedSession = Arc<Mutex<FacetSession>>;

/// What a UI renders after a recomputation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FacetView {
    pub mode: CountMode,
    /// Catalog indices of the matching items, in catalog order
    pub filtered: Vec<usize>,
    pub lists: Vec<ReconciledList>,
    pub status_sections: Vec<StatusSection>,
    pub date_description: String,
}

impl FacetView {
    pub fn list(&self, dimension: FacetDimension) -> Option<&ReconciledList> {
        self.lists.iter().find(|l| l.dimension == dimension)
    }

    pub fn filtered_items<'c>(&self, catalog: &'c [Item]) -> Vec<&'c Item> {
        self.filtered
            .iter()
            .filter_map(|&index| catalog.get(index))
            .collect()
    }
}

pub struct FacetSession {
    engine: Arc<FacetEngine>,
    catalog: CatalogSnapshot,
    state: FilterState,
    view: FacetView,
    /// Whether `view.lists` was built from the current catalog
    layout_valid: bool,
    batch_depth: usize,
    dirty: bool,
    /// Leave recomputation to `recompute_in_background`
    deferred: bool,
    stale: bool,
    generation: u64,
    /// Pass number owed after a published result dropped selections
    next_pass: Option<usize>,
    recomputations: usize,
}

impl FacetSession {
    pub fn new(engine: impl Into<Arc<FacetEngine>>, catalog: CatalogSnapshot) -> Self {
        Self::with_state(engine, catalog, FilterState::default())
    }

    /// Session starting from an existing state; the first view is computed
    /// right away
    pub fn with_state(
        engine: impl Into<Arc<FacetEngine>>,
        catalog: CatalogSnapshot,
        state: FilterState,
    ) -> Self {
        let mut session = Self {
            engine: engine.into(),
            catalog,
            state,
            view: FacetView::default(),
            layout_valid: false,
            batch_depth: 0,
            dirty: false,
            deferred: false,
            stale: true,
            generation: 0,
            next_pass: None,
            recomputations: 0,
        };
        session.rebuild();
        session
    }

    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    /// In deferred mode changes only mark the view stale; the caller runs
    /// the computation through `prepare_recompute` and `publish`
    pub fn set_deferred(&mut self, deferred: bool) {
        self.deferred = deferred;
    }

    pub fn engine(&self) -> &FacetEngine {
        &self.engine
    }

    pub fn catalog(&self) -> &CatalogSnapshot {
        &self.catalog
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn view(&self) -> &FacetView {
        &self.view
    }

    pub fn filtered_items(&self) -> Vec<&Item> {
        self.view.filtered_items(&self.catalog)
    }

    /// Bumped on every state or catalog change
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of filter-and-count passes run so far
    pub fn recomputation_count(&self) -> usize {
        self.recomputations
    }

    pub fn is_batching(&self) -> bool {
        self.batch_depth > 0
    }

    /// Whether the view lags behind the state
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Open a batch scope. Scopes nest; the outermost one recomputes once
    /// when it ends, and only if something changed.
    pub fn begin_batch(&mut self) -> BatchScope<'_> {
        self.batch_depth += 1;
        BatchScope {
            session: self,
            finished: false,
        }
    }

    /// Selection-changed handler. Status names are canonicalised through
    /// the label aliases; names the dimension does not know are returned
    /// and not stored.
    pub fn set_selection<S: AsRef<str>>(
        &mut self,
        dimension: FacetDimension,
        names: &[S],
    ) -> Vec<String> {
        let aliases = self.engine.reconciler().aliases();
        let canonical: Vec<&str> = names
            .iter()
            .map(|name| aliases.canonical(dimension, name.as_ref()))
            .collect();

        let mut next = self.state.clone();
        let unknown = next.set_selected_values(dimension, &canonical);
        if !unknown.is_empty() {
            warn!("Ignoring unknown {} values: {:?}", dimension, unknown);
        }
        self.replace_state(next);
        unknown
    }

    /// Apply an arbitrary state mutation. Returns whether the state changed.
    pub fn update_state(&mut self, mutate: impl FnOnce(&mut FilterState)) -> bool {
        let mut next = self.state.clone();
        mutate(&mut next);
        self.replace_state(next)
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        self.update_state(|state| state.search_text = text)
    }

    pub fn set_date_filter(&mut self, date: DateFilter) -> bool {
        self.update_state(|state| state.date = date)
    }

    pub fn set_damaged_filter(&mut self, damaged: DamagedFilter) -> bool {
        self.update_state(|state| state.damaged = damaged)
    }

    pub fn set_cascade_mode(&mut self, cascade_mode: bool) -> bool {
        self.update_state(|state| state.cascade_mode = cascade_mode)
    }

    pub fn clear_filters(&mut self) -> bool {
        self.update_state(FilterState::clear)
    }

    /// Swap in a new snapshot; selections are kept where the new catalog
    /// still offers them
    pub fn replace_catalog(&mut self, catalog: CatalogSnapshot) {
        if catalog.ptr_eq(&self.catalog) {
            return;
        }
        debug!(
            "Replacing catalog snapshot ({} -> {} items)",
            self.catalog.len(),
            catalog.len()
        );
        self.catalog = catalog;
        self.layout_valid = false;
        self.changed();
    }

    /// Recompute now, regardless of batching or deferral
    pub fn refresh(&mut self) {
        self.rebuild();
    }

    /// Snapshot of everything a worker needs to recompute the current
    /// generation
    pub fn prepare_recompute(&self) -> RecomputeRequest {
        self.request_pass(1)
    }

    fn request_pass(&self, pass: usize) -> RecomputeRequest {
        RecomputeRequest {
            generation: self.generation,
            pass,
            engine: Arc::clone(&self.engine),
            catalog: self.catalog.clone(),
            state: self.state.clone(),
        }
    }

    /// Install a worker's result if it belongs to the current generation.
    /// Superseded results are dropped.
    ///
    /// When the reconciler had to drop vanished selections the session
    /// stays stale and `follow_up` yields the request for the extra pass.
    pub fn publish(&mut self, result: RecomputeResult) -> bool {
        if result.generation != self.generation {
            debug!(
                "Discarding stale recomputation (generation {} < {})",
                result.generation, self.generation
            );
            return false;
        }
        self.recomputations += 1;
        let final_pass = result.pass >= MAX_PASSES;
        self.settle(result.computation, final_pass);
        self.next_pass = (!final_pass && self.stale).then_some(result.pass + 1);
        true
    }

    /// Request for the pass that must follow the last published result
    pub fn follow_up(&self) -> Option<RecomputeRequest> {
        self.next_pass.map(|pass| self.request_pass(pass))
    }

    fn replace_state(&mut self, next: FilterState) -> bool {
        if next == self.state {
            return false;
        }
        self.state = next;
        self.changed();
        true
    }

    fn changed(&mut self) {
        self.generation += 1;
        self.next_pass = None;
        self.stale = true;
        if self.batch_depth > 0 {
            self.dirty = true;
        } else if !self.deferred {
            self.rebuild();
        }
    }

    fn end_batch(&mut self) {
        self.batch_depth = self.batch_depth.saturating_sub(1);
        if self.batch_depth == 0 && std::mem::take(&mut self.dirty) {
            debug!("Batch finished with changes, recomputing once");
            if !self.deferred {
                self.rebuild();
            }
        }
    }

    fn compute(&mut self) -> FacetComputation {
        self.recomputations += 1;
        self.engine.compute(&self.catalog, &self.state)
    }

    fn rebuild(&mut self) {
        for pass in 1..=MAX_PASSES {
            let computation = self.compute();
            if !self.settle(computation, pass == MAX_PASSES) {
                break;
            }
        }
    }

    /// Reconcile and install `computation`. Unless this is the final pass,
    /// vanished selections are dropped from the state; returns whether that
    /// changed it and another pass is needed.
    fn settle(&mut self, computation: FacetComputation, final_pass: bool) -> bool {
        let engine = Arc::clone(&self.engine);
        let reconciled = engine.reconcile(&computation.counts, &self.state);
        self.install(computation, reconciled.lists);

        self.batch_depth += 1;
        if !final_pass {
            for (dimension, names) in &reconciled.dropped {
                debug!("Dropping vanished {} selections: {:?}", dimension, names);
                let kept: Vec<String> = self
                    .state
                    .selected_values(*dimension)
                    .into_iter()
                    .filter(|value| !names.contains(value))
                    .collect();
                self.set_selection(*dimension, kept.as_slice());
            }
        }
        let again = std::mem::take(&mut self.dirty);
        self.batch_depth -= 1;

        self.stale = again;
        again
    }

    fn install(&mut self, computation: FacetComputation, fresh_lists: Vec<ReconciledList>) {
        let mode = computation.counts.mode;
        let live = self.layout_valid && mode == CountMode::Flat && self.view.mode == CountMode::Flat;
        let previous = std::mem::take(&mut self.view.lists);

        let lists = fresh_lists
            .into_iter()
            .map(|fresh| {
                let existing = previous.iter().find(|l| l.dimension == fresh.dimension);
                let counts = computation.counts.list(fresh.dimension);
                match (live, existing, counts) {
                    (true, Some(existing), Some(counts)) => {
                        let mut updated = existing.clone();
                        let selected = self.state.selected_values(fresh.dimension);
                        if self.engine.reconciler().refresh(&mut updated, counts, &selected) {
                            updated
                        } else {
                            fresh
                        }
                    }
                    _ => fresh,
                }
            })
            .collect();

        self.view = FacetView {
            mode,
            filtered: computation.filtered,
            lists,
            status_sections: computation.counts.status_sections,
            date_description: self.state.date.get_description(),
        };
        self.layout_valid = true;
    }
}

/// Guard for a batch of selection changes. Derefs to the session, so
/// changes go through the usual setters.
pub struct BatchScope<'s> {
    session: &'s mut FacetSession,
    finished: bool,
}

impl BatchScope<'_> {
    /// End the scope now instead of at drop
    pub fn finish(mut self) {
        self.end();
    }

    fn end(&mut self) {
        if !self.finished {
            self.finished = true;
            self.session.end_batch();
        }
    }
}

impl Deref for BatchScope<'_> {
    type Target = FacetSession;

    fn deref(&self) -> &FacetSession {
        self.session
    }
}

impl DerefMut for BatchScope<'_> {
    fn deref_mut(&mut self) -> &mut FacetSession {
        self.session
    }
}

impl Drop for BatchScope<'_> {
    fn drop(&mut self) {
        self.end();
    }
}

/// A frozen copy of one generation's inputs
pub struct RecomputeRequest {
    pub generation: u64,
    pass: usize,
    engine: Arc<FacetEngine>,
    catalog: CatalogSnapshot,
    state: FilterState,
}

impl RecomputeRequest {
    pub fn run(self) -> RecomputeResult {
        RecomputeResult {
            generation: self.generation,
            pass: self.pass,
            computation: self.engine.compute(&self.catalog, &self.state),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecomputeResult {
    pub generation: u64,
    pass: usize,
    pub computation: FacetComputation,
}

/// Run the current generation's computation on the blocking pool and
/// publish it, including the extra pass after dropped selections. Returns
/// `false` when a newer change superseded it.
pub async fn recompute_in_background(session: &SharedSession) -> Result<bool> {
    let mut request = session.lock().await.prepare_recompute();

    loop {
        let generation = request.generation;
        let result = match tokio::task::spawn_blocking(move || request.run()).await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => return Err(FacetError::Generic(e.into())),
        };

        let mut session = session.lock().await;
        if !session.publish(result) {
            return Ok(false);
        }
        match session.follow_up() {
            Some(next) => {
                debug!("Generation {generation} dropped selections, running another pass");
                request = next;
            }
            None => {
                debug!("Background recomputation of generation {generation} published");
                return Ok(true);
            }
        }
    }
}
