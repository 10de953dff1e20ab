//! Re-applying previous selections to freshly computed facet lists
//!
//! Matching is by value name, never by display text or count: a value that
//! is still a candidate stays selected even when its count dropped to zero.

use super::counter::{FacetCount, FacetList};
use super::predicates::FacetDimension;
use super::status::{is_status_value, DUPLICATE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bidirectional equivalences between Status value names. Other
/// dimensions hold free-form names and always compare literally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelAliases {
    pairs: Vec<(String, String)>,
}

impl Default for LabelAliases {
    fn default() -> Self {
        Self {
            pairs: vec![("Duplicates".to_string(), DUPLICATE.to_string())],
        }
    }
}

impl LabelAliases {
    /// The fixed table plus configured extras
    pub fn with_extra(extra: &BTreeMap<String, String>) -> Self {
        let mut aliases = Self::default();
        for (from, to) in extra {
            if !aliases.paired(from, to) {
                aliases.pairs.push((from.clone(), to.clone()));
            }
        }
        aliases
    }

    pub fn applies_to(dimension: FacetDimension) -> bool {
        dimension == FacetDimension::Status
    }

    fn paired(&self, a: &str, b: &str) -> bool {
        a == b
            || self
                .pairs
                .iter()
                .any(|(x, y)| (x == a && y == b) || (x == b && y == a))
    }

    pub fn equivalent(&self, dimension: FacetDimension, a: &str, b: &str) -> bool {
        if Self::applies_to(dimension) {
            self.paired(a, b)
        } else {
            a == b
        }
    }

    /// Spelling the engine stores for an incoming name: a recognised Status
    /// name is kept, an alias is rewritten to whichever side of its pair the
    /// Status list recognises.
    pub fn canonical<'n>(&'n self, dimension: FacetDimension, name: &'n str) -> &'n str {
        if !Self::applies_to(dimension) || is_status_value(name) {
            return name;
        }
        self.pairs
            .iter()
            .find_map(|(a, b)| {
                if a == name && is_status_value(b) {
                    Some(b.as_str())
                } else if b == name && is_status_value(a) {
                    Some(a.as_str())
                } else {
                    None
                }
            })
            .unwrap_or(name)
    }
}

/// One displayed row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetEntry {
    pub value: String,
    pub count: usize,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledList {
    pub dimension: FacetDimension,
    pub entries: Vec<FacetEntry>,
}

impl ReconciledList {
    pub fn selected_values(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.selected)
            .map(|e| e.value.clone())
            .collect()
    }

    pub fn entry(&self, value: &str) -> Option<&FacetEntry> {
        self.entries.iter().find(|e| e.value == value)
    }

    /// Replace counts in place, keeping the existing row order. Rows the
    /// fresh list no longer carries drop to zero. Returns `false` when the
    /// fresh list has values this list lacks, in which case nothing is
    /// changed and a structural rebuild is needed.
    pub fn apply_live_counts(&mut self, fresh: &FacetList) -> bool {
        let structural = fresh
            .entries
            .iter()
            .any(|f| !self.entries.iter().any(|e| e.value == f.value));
        if structural || fresh.dimension != self.dimension {
            return false;
        }

        for entry in &mut self.entries {
            entry.count = fresh.count_of(&entry.value).unwrap_or(0);
        }
        true
    }
}

/// Outcome of reconciling one dimension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub list: ReconciledList,
    /// Previously selected names with no matching row
    pub dropped: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SelectionReconciler {
    aliases: LabelAliases,
}

impl SelectionReconciler {
    pub fn new(aliases: LabelAliases) -> Self {
        Self { aliases }
    }

    pub fn aliases(&self) -> &LabelAliases {
        &self.aliases
    }

    /// Mark every fresh row whose value matches a previously selected name
    pub fn reconcile<S: AsRef<str>>(&self, fresh: &FacetList, previous: &[S]) -> Reconciliation {
        let entries = fresh
            .entries
            .iter()
            .map(|FacetCount { value, count }| FacetEntry {
                value: value.clone(),
                count: *count,
                selected: previous
                    .iter()
                    .any(|p| self.aliases.equivalent(fresh.dimension, p.as_ref(), value)),
            })
            .collect();

        let dropped = previous
            .iter()
            .map(|p| p.as_ref())
            .filter(|p| {
                !fresh
                    .entries
                    .iter()
                    .any(|f| self.aliases.equivalent(fresh.dimension, p, &f.value))
            })
            .map(str::to_string)
            .collect();

        Reconciliation {
            list: ReconciledList {
                dimension: fresh.dimension,
                entries,
            },
            dropped,
        }
    }

    /// Live-count update of an existing list followed by refreshing its
    /// selection marks. Returns `false` when a structural rebuild is needed.
    pub fn refresh<S: AsRef<str>>(
        &self,
        existing: &mut ReconciledList,
        fresh: &FacetList,
        previous: &[S],
    ) -> bool {
        if !existing.apply_live_counts(fresh) {
            return false;
        }
        let dimension = existing.dimension;
        for entry in &mut existing.entries {
            entry.selected = previous
                .iter()
                .any(|p| self.aliases.equivalent(dimension, p.as_ref(), &entry.value));
        }
        true
    }
}
