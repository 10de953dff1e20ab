//! Composition of every active test into one item predicate

use super::dates::DateRange;
use super::predicates::{FacetContext, FacetDimension};
use super::text::{SearchField, TextQuery};
use crate::catalog::Item;
use crate::state::FilterState;
use chrono::{DateTime, FixedOffset};

/// Dimensions in evaluation order: plain flag and enum tests first,
/// membership lookups and classification after.
const EVALUATION_ORDER: [FacetDimension; 10] = [
    FacetDimension::Status,
    FacetDimension::Location,
    FacetDimension::Creator,
    FacetDimension::License,
    FacetDimension::Subfolder,
    FacetDimension::Destination,
    FacetDimension::Category,
    FacetDimension::Playlist,
    FacetDimension::Collection,
    FacetDimension::FileSize,
];

/// The conjunction of all active tests for one filter state, prepared
/// once per recomputation. Holds no mutable state, so evaluation order
/// never changes the outcome.
pub struct ItemPredicate<'a> {
    state: &'a FilterState,
    ctx: FacetContext<'a>,
    active_dimensions: Vec<FacetDimension>,
    date_range: Option<DateRange>,
    text: TextQuery,
    search_fields: &'a [SearchField],
}

impl<'a> ItemPredicate<'a> {
    pub fn new(
        state: &'a FilterState,
        ctx: FacetContext<'a>,
        search_fields: &'a [SearchField],
        now: DateTime<FixedOffset>,
    ) -> Self {
        let active_dimensions = EVALUATION_ORDER
            .iter()
            .copied()
            .filter(|d| state.is_dimension_active(*d))
            .collect();
        let date_range = state
            .date
            .is_active()
            .then(|| state.date.get_date_range(now));

        Self {
            state,
            ctx,
            active_dimensions,
            date_range,
            text: TextQuery::parse(&state.search_text),
            search_fields,
        }
    }

    pub fn active_dimensions(&self) -> &[FacetDimension] {
        &self.active_dimensions
    }

    pub fn matches(&self, item: &Item) -> bool {
        if !self.state.damaged.matches(item) {
            return false;
        }

        if !self
            .active_dimensions
            .iter()
            .all(|d| d.matches(item, self.state, &self.ctx))
        {
            return false;
        }

        if let Some(range) = &self.date_range {
            // An undated item only satisfies the inactive (all time) filter
            match item.modified_date {
                Some(date) if range.contains(date) => {}
                _ => return false,
            }
        }

        self.text.matches_item(item, self.search_fields)
    }
}

/// Indices of the catalog items satisfying every active test, in catalog
/// order
pub fn filter_indices(catalog: &[Item], predicate: &ItemPredicate<'_>) -> Vec<usize> {
    catalog
        .iter()
        .enumerate()
        .filter(|(_, item)| predicate.matches(item))
        .map(|(index, _)| index)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ItemStatus;
    use crate::engine::classify::NoSizeBuckets;
    use crate::engine::dates::{DateFilter, DateFilterType};
    use crate::engine::membership::EmptySet;
    use chrono::{Duration, Utc};
    use pretty_assertions::assert_eq;

    fn ctx() -> FacetContext<'static> {
        FacetContext {
            favorites: &EmptySet,
            auto_install: &EmptySet,
            classifier: &NoSizeBuckets,
        }
    }

    fn now() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-06-15T12:00:00+00:00").unwrap()
    }

    #[test]
    fn test_inactive_dimensions_are_skipped() {
        let mut state = FilterState::default();
        state.creators.insert("Alice".to_string());
        let fields = SearchField::defaults();
        let predicate = ItemPredicate::new(&state, ctx(), &fields, now());
        assert_eq!(predicate.active_dimensions(), &[FacetDimension::Creator]);
    }

    #[test]
    fn test_undated_items_fail_active_date_filter() {
        let mut state = FilterState::default();
        state.date = DateFilter::new(DateFilterType::PastWeek);
        let fields = SearchField::defaults();
        let predicate = ItemPredicate::new(&state, ctx(), &fields, now());

        let recent = Item::new("recent").with_modified(now().with_timezone(&Utc) - Duration::days(2));
        let undated = Item::new("undated");
        assert!(predicate.matches(&recent));
        assert!(!predicate.matches(&undated));
    }

    #[test]
    fn test_all_tests_are_conjoined() {
        let mut state = FilterState::default();
        state.statuses.insert(ItemStatus::Loaded);
        state.search_text = "beach".to_string();
        let fields = SearchField::defaults();
        let predicate = ItemPredicate::new(&state, ctx(), &fields, now());

        let catalog = vec![
            Item::new("1").with_name("Beach").with_status(ItemStatus::Loaded),
            Item::new("2").with_name("Beach").with_status(ItemStatus::Missing),
            Item::new("3").with_name("Forest").with_status(ItemStatus::Loaded),
        ];
        assert_eq!(filter_indices(&catalog, &predicate), vec![0]);
    }
}
