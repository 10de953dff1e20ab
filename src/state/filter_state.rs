use crate::catalog::ItemStatus;
use crate::engine::dates::DateFilter;
use crate::engine::predicates::{Collection, DamagedFilter, FacetDimension, Location};
use crate::engine::status::{self, OptimizationState, VersionState, STATUS_FACETS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The caller-owned record of current selections.
///
/// An empty set means the dimension is inactive. The Status list is stored
/// as five separate pieces (`statuses`, `filter_duplicates`,
/// `optimization`, `versions` and the two dependency flags), each tested by
/// its own predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    pub statuses: BTreeSet<ItemStatus>,
    pub filter_duplicates: bool,
    pub optimization: BTreeSet<OptimizationState>,
    pub versions: BTreeSet<VersionState>,
    pub filter_no_dependents: bool,
    pub filter_no_dependencies: bool,

    pub creators: BTreeSet<String>,
    pub categories: BTreeSet<String>,
    pub license_types: BTreeSet<String>,
    pub file_size_buckets: BTreeSet<String>,
    pub subfolders: BTreeSet<String>,
    pub destinations: BTreeSet<String>,
    pub playlists: BTreeSet<String>,
    pub collections: BTreeSet<Collection>,
    pub locations: BTreeSet<Location>,

    pub damaged: DamagedFilter,
    pub date: DateFilter,
    pub search_text: String,

    /// Selects cascading instead of flat facet counts
    pub cascade_mode: bool,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cascade_mode(mut self, cascade_mode: bool) -> Self {
        self.cascade_mode = cascade_mode;
        self
    }

    fn string_selection(&self, dimension: FacetDimension) -> Option<&BTreeSet<String>> {
        match dimension {
            FacetDimension::Creator => Some(&self.creators),
            FacetDimension::Category => Some(&self.categories),
            FacetDimension::License => Some(&self.license_types),
            FacetDimension::FileSize => Some(&self.file_size_buckets),
            FacetDimension::Subfolder => Some(&self.subfolders),
            FacetDimension::Destination => Some(&self.destinations),
            FacetDimension::Playlist => Some(&self.playlists),
            FacetDimension::Status | FacetDimension::Collection | FacetDimension::Location => None,
        }
    }

    fn string_selection_mut(&mut self, dimension: FacetDimension) -> Option<&mut BTreeSet<String>> {
        match dimension {
            FacetDimension::Creator => Some(&mut self.creators),
            FacetDimension::Category => Some(&mut self.categories),
            FacetDimension::License => Some(&mut self.license_types),
            FacetDimension::FileSize => Some(&mut self.file_size_buckets),
            FacetDimension::Subfolder => Some(&mut self.subfolders),
            FacetDimension::Destination => Some(&mut self.destinations),
            FacetDimension::Playlist => Some(&mut self.playlists),
            FacetDimension::Status | FacetDimension::Collection | FacetDimension::Location => None,
        }
    }

    /// Whether the dimension currently constrains the result
    pub fn is_dimension_active(&self, dimension: FacetDimension) -> bool {
        match dimension {
            FacetDimension::Status => STATUS_FACETS.iter().any(|f| f.is_active(self)),
            FacetDimension::Collection => !self.collections.is_empty(),
            FacetDimension::Location => !self.locations.is_empty(),
            other => self
                .string_selection(other)
                .is_some_and(|selection| !selection.is_empty()),
        }
    }

    /// Selected value names of a dimension, in display order
    pub fn selected_values(&self, dimension: FacetDimension) -> Vec<String> {
        match dimension {
            FacetDimension::Status => status::selected_status_values(self)
                .into_iter()
                .map(str::to_string)
                .collect(),
            FacetDimension::Collection => self
                .collections
                .iter()
                .map(|c| c.as_str().to_string())
                .collect(),
            FacetDimension::Location => self
                .locations
                .iter()
                .map(|l| l.as_str().to_string())
                .collect(),
            other => self
                .string_selection(other)
                .map(|selection| selection.iter().cloned().collect())
                .unwrap_or_default(),
        }
    }

    /// Replace a dimension's selection by value names.
    ///
    /// Returns the names the dimension does not recognise; they are not
    /// stored. Free-form dimensions accept any non-empty name.
    pub fn set_selected_values<S: AsRef<str>>(
        &mut self,
        dimension: FacetDimension,
        values: &[S],
    ) -> Vec<String> {
        let names: Vec<&str> = values.iter().map(AsRef::as_ref).collect();
        match dimension {
            FacetDimension::Status => status::select_status_values(self, &names),
            FacetDimension::Collection => {
                let (known, unknown) = parse_all::<Collection>(&names);
                self.collections = known;
                unknown
            }
            FacetDimension::Location => {
                let (known, unknown) = parse_all::<Location>(&names);
                self.locations = known;
                unknown
            }
            other => {
                let mut unknown = Vec::new();
                let mut selection = BTreeSet::new();
                for name in names {
                    if name.is_empty() {
                        unknown.push(String::new());
                    } else {
                        selection.insert(name.to_string());
                    }
                }
                if let Some(slot) = self.string_selection_mut(other) {
                    *slot = selection;
                }
                unknown
            }
        }
    }

    pub fn clear_dimension(&mut self, dimension: FacetDimension) {
        self.set_selected_values::<&str>(dimension, &[]);
    }

    /// Reset every filter; the count mode is kept
    pub fn clear(&mut self) {
        *self = Self::default().with_cascade_mode(self.cascade_mode);
    }

    /// Whether any filter at all is active
    pub fn has_active_filters(&self) -> bool {
        FacetDimension::ALL
            .iter()
            .any(|d| self.is_dimension_active(*d))
            || self.damaged.is_active()
            || self.date.is_active()
            || !self.search_text.trim().is_empty()
    }
}

fn parse_all<T: std::str::FromStr + Ord>(names: &[&str]) -> (BTreeSet<T>, Vec<String>) {
    let mut known = BTreeSet::new();
    let mut unknown = Vec::new();
    for name in names {
        match name.parse::<T>() {
            Ok(value) => {
                known.insert(value);
            }
            Err(_) => unknown.push(name.to_string()),
        }
    }
    (known, unknown)
}
