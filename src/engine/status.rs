//! The "Status" facet
//!
//! One displayed list, five independent predicates: lifecycle status,
//! duplicate flag, optimization state, version state and dependency
//! degree. Each sub-facet owns its value names, its candidate rows and its
//! slice of `FilterState`; the display list is their concatenation.

use crate::catalog::{Item, ItemStatus};
use crate::state::FilterState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const DUPLICATE: &str = "Duplicate";
pub const OPTIMIZED: &str = "Optimized";
pub const UNOPTIMIZED: &str = "Unoptimized";
pub const LATEST: &str = "Latest";
pub const OLD_VERSION: &str = "Old Version";
pub const NO_DEPENDENTS: &str = "No Dependents";
pub const NO_DEPENDENCIES: &str = "No Dependencies";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OptimizationState {
    Optimized,
    Unoptimized,
}

impl OptimizationState {
    pub fn of(item: &Item) -> Self {
        if item.is_optimized {
            OptimizationState::Optimized
        } else {
            OptimizationState::Unoptimized
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OptimizationState::Optimized => OPTIMIZED,
            OptimizationState::Unoptimized => UNOPTIMIZED,
        }
    }

    fn parse(name: &str) -> Option<Self> {
        match name {
            OPTIMIZED => Some(OptimizationState::Optimized),
            UNOPTIMIZED => Some(OptimizationState::Unoptimized),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VersionState {
    Latest,
    OldVersion,
}

impl VersionState {
    pub fn of(item: &Item) -> Self {
        if item.is_old_version {
            VersionState::OldVersion
        } else {
            VersionState::Latest
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VersionState::Latest => LATEST,
            VersionState::OldVersion => OLD_VERSION,
        }
    }

    fn parse(name: &str) -> Option<Self> {
        match name {
            LATEST => Some(VersionState::Latest),
            OLD_VERSION => Some(VersionState::OldVersion),
            _ => None,
        }
    }
}

/// One of the predicates folded into the Status list
pub trait StatusFacet: Send + Sync {
    /// Stable section name
    fn name(&self) -> &'static str;

    /// Rows to display, in order, derived from the full catalog
    fn candidates(&self, catalog: &[Item]) -> Vec<&'static str>;

    /// Values this item carries under this sub-facet
    fn item_values(&self, item: &Item) -> Vec<&'static str>;

    fn owns(&self, value: &str) -> bool;

    fn is_active(&self, state: &FilterState) -> bool;

    fn matches(&self, item: &Item, state: &FilterState) -> bool;

    fn selected(&self, state: &FilterState) -> Vec<&'static str>;

    /// Replace this sub-facet's selection with the owned names in `values`
    fn select(&self, state: &mut FilterState, values: &[&str]);
}

pub struct LifecycleFacet;

impl StatusFacet for LifecycleFacet {
    fn name(&self) -> &'static str {
        "lifecycle"
    }

    fn candidates(&self, catalog: &[Item]) -> Vec<&'static str> {
        let present: BTreeSet<&'static str> =
            catalog.iter().map(|item| item.status.as_str()).collect();
        present.into_iter().collect()
    }

    fn item_values(&self, item: &Item) -> Vec<&'static str> {
        vec![item.status.as_str()]
    }

    fn owns(&self, value: &str) -> bool {
        value.parse::<ItemStatus>().is_ok()
    }

    fn is_active(&self, state: &FilterState) -> bool {
        !state.statuses.is_empty()
    }

    fn matches(&self, item: &Item, state: &FilterState) -> bool {
        state.statuses.is_empty() || state.statuses.contains(&item.status)
    }

    fn selected(&self, state: &FilterState) -> Vec<&'static str> {
        state.statuses.iter().map(ItemStatus::as_str).collect()
    }

    fn select(&self, state: &mut FilterState, values: &[&str]) {
        state.statuses = values.iter().filter_map(|v| v.parse().ok()).collect();
    }
}

pub struct DuplicateFacet;

impl StatusFacet for DuplicateFacet {
    fn name(&self) -> &'static str {
        "duplicate"
    }

    fn candidates(&self, catalog: &[Item]) -> Vec<&'static str> {
        if catalog.iter().any(|item| item.is_duplicate) {
            vec![DUPLICATE]
        } else {
            Vec::new()
        }
    }

    fn item_values(&self, item: &Item) -> Vec<&'static str> {
        if item.is_duplicate {
            vec![DUPLICATE]
        } else {
            Vec::new()
        }
    }

    fn owns(&self, value: &str) -> bool {
        value == DUPLICATE
    }

    fn is_active(&self, state: &FilterState) -> bool {
        state.filter_duplicates
    }

    fn matches(&self, item: &Item, state: &FilterState) -> bool {
        !state.filter_duplicates || item.is_duplicate
    }

    fn selected(&self, state: &FilterState) -> Vec<&'static str> {
        if state.filter_duplicates {
            vec![DUPLICATE]
        } else {
            Vec::new()
        }
    }

    fn select(&self, state: &mut FilterState, values: &[&str]) {
        state.filter_duplicates = values.contains(&DUPLICATE);
    }
}

pub struct OptimizationFacet;

impl StatusFacet for OptimizationFacet {
    fn name(&self) -> &'static str {
        "optimization"
    }

    fn candidates(&self, catalog: &[Item]) -> Vec<&'static str> {
        let present: BTreeSet<OptimizationState> = catalog.iter().map(OptimizationState::of).collect();
        present.iter().map(OptimizationState::as_str).collect()
    }

    fn item_values(&self, item: &Item) -> Vec<&'static str> {
        vec![OptimizationState::of(item).as_str()]
    }

    fn owns(&self, value: &str) -> bool {
        OptimizationState::parse(value).is_some()
    }

    fn is_active(&self, state: &FilterState) -> bool {
        !state.optimization.is_empty()
    }

    fn matches(&self, item: &Item, state: &FilterState) -> bool {
        state.optimization.is_empty() || state.optimization.contains(&OptimizationState::of(item))
    }

    fn selected(&self, state: &FilterState) -> Vec<&'static str> {
        state.optimization.iter().map(OptimizationState::as_str).collect()
    }

    fn select(&self, state: &mut FilterState, values: &[&str]) {
        state.optimization = values
            .iter()
            .filter_map(|v| OptimizationState::parse(v))
            .collect();
    }
}

pub struct VersionFacet;

impl StatusFacet for VersionFacet {
    fn name(&self) -> &'static str {
        "version"
    }

    /// Both rows are listed even when nothing carries them
    fn candidates(&self, _catalog: &[Item]) -> Vec<&'static str> {
        vec![LATEST, OLD_VERSION]
    }

    fn item_values(&self, item: &Item) -> Vec<&'static str> {
        vec![VersionState::of(item).as_str()]
    }

    fn owns(&self, value: &str) -> bool {
        VersionState::parse(value).is_some()
    }

    fn is_active(&self, state: &FilterState) -> bool {
        !state.versions.is_empty()
    }

    fn matches(&self, item: &Item, state: &FilterState) -> bool {
        state.versions.is_empty() || state.versions.contains(&VersionState::of(item))
    }

    fn selected(&self, state: &FilterState) -> Vec<&'static str> {
        state.versions.iter().map(VersionState::as_str).collect()
    }

    fn select(&self, state: &mut FilterState, values: &[&str]) {
        state.versions = values.iter().filter_map(|v| VersionState::parse(v)).collect();
    }
}

/// "No Dependents" and "No Dependencies" are two flags that each narrow
/// the result on their own.
pub struct DependencyDegreeFacet;

impl DependencyDegreeFacet {
    fn has_no_dependents(item: &Item) -> bool {
        item.dependents_count == 0
    }

    fn has_no_dependencies(item: &Item) -> bool {
        item.dependency_count == 0
    }
}

impl StatusFacet for DependencyDegreeFacet {
    fn name(&self) -> &'static str {
        "dependency_degree"
    }

    fn candidates(&self, catalog: &[Item]) -> Vec<&'static str> {
        let mut rows = Vec::new();
        if catalog.iter().any(Self::has_no_dependents) {
            rows.push(NO_DEPENDENTS);
        }
        if catalog.iter().any(Self::has_no_dependencies) {
            rows.push(NO_DEPENDENCIES);
        }
        rows
    }

    fn item_values(&self, item: &Item) -> Vec<&'static str> {
        let mut values = Vec::new();
        if Self::has_no_dependents(item) {
            values.push(NO_DEPENDENTS);
        }
        if Self::has_no_dependencies(item) {
            values.push(NO_DEPENDENCIES);
        }
        values
    }

    fn owns(&self, value: &str) -> bool {
        value == NO_DEPENDENTS || value == NO_DEPENDENCIES
    }

    fn is_active(&self, state: &FilterState) -> bool {
        state.filter_no_dependents || state.filter_no_dependencies
    }

    fn matches(&self, item: &Item, state: &FilterState) -> bool {
        (!state.filter_no_dependents || Self::has_no_dependents(item))
            && (!state.filter_no_dependencies || Self::has_no_dependencies(item))
    }

    fn selected(&self, state: &FilterState) -> Vec<&'static str> {
        let mut values = Vec::new();
        if state.filter_no_dependents {
            values.push(NO_DEPENDENTS);
        }
        if state.filter_no_dependencies {
            values.push(NO_DEPENDENCIES);
        }
        values
    }

    fn select(&self, state: &mut FilterState, values: &[&str]) {
        state.filter_no_dependents = values.contains(&NO_DEPENDENTS);
        state.filter_no_dependencies = values.contains(&NO_DEPENDENCIES);
    }
}

/// Sub-facets in display order
pub static STATUS_FACETS: [&dyn StatusFacet; 5] = [
    &LifecycleFacet,
    &DuplicateFacet,
    &OptimizationFacet,
    &VersionFacet,
    &DependencyDegreeFacet,
];

/// Route Status names to their sub-facets, replacing every sub-selection.
/// Returns the names no sub-facet owns.
pub fn select_status_values(state: &mut FilterState, values: &[&str]) -> Vec<String> {
    for facet in STATUS_FACETS {
        let owned: Vec<&str> = values.iter().copied().filter(|v| facet.owns(v)).collect();
        facet.select(state, &owned);
    }
    values
        .iter()
        .filter(|v| !is_status_value(v))
        .map(|v| v.to_string())
        .collect()
}

/// Whether some sub-facet recognises `name`
pub fn is_status_value(name: &str) -> bool {
    STATUS_FACETS.iter().any(|facet| facet.owns(name))
}

pub fn selected_status_values(state: &FilterState) -> Vec<&'static str> {
    STATUS_FACETS
        .iter()
        .flat_map(|facet| facet.selected(state))
        .collect()
}
