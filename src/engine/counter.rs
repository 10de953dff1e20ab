//! Facet value counts
//!
//! Candidate values come from the full catalog so a value can be listed
//! with a zero count; counts are tallied over the filtered set.
//!
//! Flat mode counts against the fully filtered set, including each
//! dimension's own selection. Cascading mode uses the same tallies and
//! additionally hides the unselected siblings of every dimension that has
//! an active selection. Neither mode recomputes a dimension against an
//! "all other filters" subset.

use super::predicates::{FacetContext, FacetDimension};
use super::status::STATUS_FACETS;
use crate::catalog::Item;
use crate::state::FilterState;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountMode {
    #[default]
    Flat,
    Cascading,
}

impl CountMode {
    pub fn for_state(state: &FilterState) -> Self {
        if state.cascade_mode {
            CountMode::Cascading
        } else {
            CountMode::Flat
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCount {
    pub value: String,
    pub count: usize,
}

impl FacetCount {
    pub fn new(value: impl Into<String>, count: usize) -> Self {
        Self {
            value: value.into(),
            count,
        }
    }
}

/// Ordered value counts of one dimension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetList {
    pub dimension: FacetDimension,
    pub entries: Vec<FacetCount>,
}

impl FacetList {
    pub fn count_of(&self, value: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|entry| entry.value == value)
            .map(|entry| entry.count)
    }

    pub fn values(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.value.as_str()).collect()
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }
}

/// Rows contributed by one Status sub-facet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSection {
    pub facet: String,
    pub entries: Vec<FacetCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCounts {
    pub mode: CountMode,
    pub lists: Vec<FacetList>,
    pub status_sections: Vec<StatusSection>,
}

impl FacetCounts {
    pub fn list(&self, dimension: FacetDimension) -> Option<&FacetList> {
        self.lists.iter().find(|list| list.dimension == dimension)
    }

    pub fn status_section(&self, facet: &str) -> Option<&StatusSection> {
        self.status_sections.iter().find(|s| s.facet == facet)
    }
}

/// Candidate values of a dimension in display order, from the full catalog
pub fn candidate_values<'a>(
    dimension: FacetDimension,
    catalog: &'a [Item],
    ctx: &FacetContext<'a>,
) -> Vec<&'a str> {
    match dimension {
        FacetDimension::Status => STATUS_FACETS
            .iter()
            .flat_map(|facet| facet.candidates(catalog))
            .collect(),
        FacetDimension::FileSize => {
            let present: BTreeSet<&str> = catalog
                .iter()
                .filter_map(|item| ctx.classifier.classify(item.file_size_bytes))
                .collect();
            ctx.classifier
                .labels()
                .into_iter()
                .filter(|label| present.contains(label))
                .collect()
        }
        _ => {
            let present: BTreeSet<&str> = catalog
                .iter()
                .flat_map(|item| dimension.item_values(item, ctx))
                .collect();
            present.into_iter().collect()
        }
    }
}

/// Count every dimension over `filtered`, listing candidates from `catalog`
pub fn count_facets<'a>(
    catalog: &'a [Item],
    filtered: &[&'a Item],
    state: &FilterState,
    mode: CountMode,
    ctx: &FacetContext<'a>,
) -> FacetCounts {
    let lists = FacetDimension::ALL
        .iter()
        .map(|dimension| {
            let tallies = tally(*dimension, filtered, ctx);
            let candidates = candidate_values(*dimension, catalog, ctx);
            let entries = build_entries(*dimension, &candidates, &tallies, state, mode);
            tracing::trace!(
                "Facet {} lists {} of {} candidate values",
                dimension,
                entries.len(),
                candidates.len()
            );
            FacetList {
                dimension: *dimension,
                entries,
            }
        })
        .collect();

    let status_sections = STATUS_FACETS
        .iter()
        .map(|facet| {
            let mut tallies: HashMap<&str, usize> = HashMap::new();
            for item in filtered {
                for value in facet.item_values(item) {
                    *tallies.entry(value).or_insert(0) += 1;
                }
            }
            let candidates = facet.candidates(catalog);
            StatusSection {
                facet: facet.name().to_string(),
                entries: build_entries(FacetDimension::Status, &candidates, &tallies, state, mode),
            }
        })
        .collect();

    FacetCounts {
        mode,
        lists,
        status_sections,
    }
}

fn tally<'a>(
    dimension: FacetDimension,
    filtered: &[&'a Item],
    ctx: &FacetContext<'a>,
) -> HashMap<&'a str, usize> {
    let mut tallies = HashMap::new();
    for &item in filtered {
        for value in dimension.item_values(item, ctx) {
            *tallies.entry(value).or_insert(0) += 1;
        }
    }
    tallies
}

fn build_entries(
    dimension: FacetDimension,
    candidates: &[&str],
    tallies: &HashMap<&str, usize>,
    state: &FilterState,
    mode: CountMode,
) -> Vec<FacetCount> {
    let hide_siblings = mode == CountMode::Cascading && state.is_dimension_active(dimension);
    let selected: BTreeSet<String> = if hide_siblings {
        state.selected_values(dimension).into_iter().collect()
    } else {
        BTreeSet::new()
    };

    candidates
        .iter()
        .filter(|value| !hide_siblings || selected.contains(**value))
        .map(|value| FacetCount::new(*value, tallies.get(value).copied().unwrap_or(0)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ItemStatus;
    use crate::engine::classify::{NoSizeBuckets, ThresholdClassifier};
    use crate::config::SizeBucket;
    use crate::engine::membership::EmptySet;
    use pretty_assertions::assert_eq;

    fn ctx() -> FacetContext<'static> {
        FacetContext {
            favorites: &EmptySet,
            auto_install: &EmptySet,
            classifier: &NoSizeBuckets,
        }
    }

    fn catalog() -> Vec<Item> {
        vec![
            Item::new("1")
                .with_creator("Bob")
                .with_category("Scenes")
                .with_category("Looks")
                .with_status(ItemStatus::Loaded),
            Item::new("2")
                .with_creator("Alice")
                .with_category("Scenes")
                .with_status(ItemStatus::Missing),
            Item::new("3").with_status(ItemStatus::Loaded),
        ]
    }

    #[test]
    fn test_candidates_sorted_and_empty_values_excluded() {
        let items = catalog();
        assert_eq!(
            candidate_values(FacetDimension::Creator, &items, &ctx()),
            vec!["Alice", "Bob"]
        );
        assert_eq!(
            candidate_values(FacetDimension::Category, &items, &ctx()),
            vec!["Looks", "Scenes"]
        );
        assert!(candidate_values(FacetDimension::Destination, &items, &ctx()).is_empty());
    }

    #[test]
    fn test_derived_candidates_sorted_by_name() {
        let favorites: std::collections::HashSet<crate::catalog::ItemId> =
            ["1", "2"].into_iter().map(crate::catalog::ItemId::from).collect();
        let auto_install: std::collections::HashSet<crate::catalog::ItemId> =
            ["2"].into_iter().map(crate::catalog::ItemId::from).collect();
        let ctx = FacetContext {
            favorites: &favorites,
            auto_install: &auto_install,
            classifier: &NoSizeBuckets,
        };
        let mut items = catalog();
        items[2] = Item::new("3").external("Archive");

        assert_eq!(
            candidate_values(FacetDimension::Collection, &items, &ctx),
            vec!["Auto-Install", "Favorites"]
        );
        assert_eq!(
            candidate_values(FacetDimension::Location, &items, &ctx),
            vec!["External", "Local"]
        );
    }

    #[test]
    fn test_file_size_buckets_keep_configured_order() {
        let classifier = ThresholdClassifier::new(vec![
            SizeBucket {
                label: "Tiny".to_string(),
                max_bytes: Some(10),
            },
            SizeBucket {
                label: "Medium".to_string(),
                max_bytes: Some(1_000),
            },
            SizeBucket {
                label: "Huge".to_string(),
                max_bytes: None,
            },
        ])
        .unwrap();
        let ctx = FacetContext {
            favorites: &EmptySet,
            auto_install: &EmptySet,
            classifier: &classifier,
        };
        let items = vec![
            Item::new("a").with_size(5_000),
            Item::new("b").with_size(1),
            Item::new("c").with_size(2),
        ];
        let filtered: Vec<&Item> = items.iter().collect();
        let counts = count_facets(&items, &filtered, &FilterState::default(), CountMode::Flat, &ctx);
        assert_eq!(
            counts.list(FacetDimension::FileSize).unwrap().entries,
            vec![FacetCount::new("Tiny", 2), FacetCount::new("Huge", 1)]
        );
    }

    #[test]
    fn test_flat_counts_include_zero_rows() {
        let items = catalog();
        let filtered: Vec<&Item> = items.iter().filter(|i| i.creator == "Alice").collect();
        let mut state = FilterState::default();
        state.creators.insert("Alice".to_string());

        let counts = count_facets(&items, &filtered, &state, CountMode::Flat, &ctx());
        assert_eq!(
            counts.list(FacetDimension::Creator).unwrap().entries,
            vec![FacetCount::new("Alice", 1), FacetCount::new("Bob", 0)]
        );
        assert_eq!(
            counts.list(FacetDimension::Category).unwrap().entries,
            vec![FacetCount::new("Looks", 0), FacetCount::new("Scenes", 1)]
        );
    }

    #[test]
    fn test_cascading_hides_siblings_of_active_dimensions_only() {
        let items = catalog();
        let filtered: Vec<&Item> = items.iter().filter(|i| i.creator == "Alice").collect();
        let mut state = FilterState::default();
        state.creators.insert("Alice".to_string());

        let counts = count_facets(&items, &filtered, &state, CountMode::Cascading, &ctx());
        assert_eq!(
            counts.list(FacetDimension::Creator).unwrap().entries,
            vec![FacetCount::new("Alice", 1)]
        );
        assert_eq!(
            counts.list(FacetDimension::Category).unwrap().values(),
            vec!["Looks", "Scenes"]
        );
    }

    #[test]
    fn test_status_list_concatenates_sections() {
        let items = catalog();
        let filtered: Vec<&Item> = items.iter().collect();
        let counts = count_facets(&items, &filtered, &FilterState::default(), CountMode::Flat, &ctx());

        let lifecycle = counts.status_section("lifecycle").unwrap();
        assert_eq!(
            lifecycle.entries,
            vec![FacetCount::new("Loaded", 2), FacetCount::new("Missing", 1)]
        );
        assert_eq!(
            counts.list(FacetDimension::Status).unwrap().values(),
            vec![
                "Loaded",
                "Missing",
                "Unoptimized",
                "Latest",
                "Old Version",
                "No Dependents",
                "No Dependencies"
            ]
        );
        assert_eq!(
            counts.list(FacetDimension::Status).unwrap().count_of("Old Version"),
            Some(0)
        );
    }
}
