//! Facet dimensions and the per-item predicate for each
//!
//! Every list dimension uses one rule: an item matches when the
//! dimension's selection is empty or shares at least one value with the
//! values extracted from the item. Status is the exception and delegates to
//! its sub-facets.

use super::classify::FileSizeClassifier;
use super::membership::MembershipSet;
use super::status::STATUS_FACETS;
use crate::catalog::Item;
use crate::state::FilterState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetDimension {
    Status,
    Creator,
    Category,
    License,
    FileSize,
    Subfolder,
    Destination,
    Playlist,
    Collection,
    Location,
}

impl FacetDimension {
    pub const ALL: [FacetDimension; 10] = [
        FacetDimension::Status,
        FacetDimension::Creator,
        FacetDimension::Category,
        FacetDimension::License,
        FacetDimension::FileSize,
        FacetDimension::Subfolder,
        FacetDimension::Destination,
        FacetDimension::Playlist,
        FacetDimension::Collection,
        FacetDimension::Location,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FacetDimension::Status => "status",
            FacetDimension::Creator => "creator",
            FacetDimension::Category => "category",
            FacetDimension::License => "license",
            FacetDimension::FileSize => "file_size",
            FacetDimension::Subfolder => "subfolder",
            FacetDimension::Destination => "destination",
            FacetDimension::Playlist => "playlist",
            FacetDimension::Collection => "collection",
            FacetDimension::Location => "location",
        }
    }

    /// Whether one item can carry several values of this dimension
    pub fn is_multi_value(&self) -> bool {
        matches!(
            self,
            FacetDimension::Status
                | FacetDimension::Category
                | FacetDimension::Playlist
                | FacetDimension::Collection
        )
    }

    /// Values of this dimension the item carries. Empty strings count as
    /// absent.
    pub fn item_values<'a>(&self, item: &'a Item, ctx: &FacetContext<'a>) -> Vec<&'a str> {
        match self {
            FacetDimension::Status => STATUS_FACETS
                .iter()
                .flat_map(|facet| facet.item_values(item))
                .collect(),
            FacetDimension::Creator => non_empty(&item.creator),
            FacetDimension::Category => item
                .categories
                .iter()
                .map(String::as_str)
                .filter(|c| !c.is_empty())
                .collect(),
            FacetDimension::License => non_empty(&item.license_type),
            FacetDimension::FileSize => ctx
                .classifier
                .classify(item.file_size_bytes)
                .into_iter()
                .collect(),
            FacetDimension::Subfolder => non_empty(&item.subfolder),
            FacetDimension::Destination => item.destination().into_iter().collect(),
            FacetDimension::Playlist => item
                .playlists
                .iter()
                .map(String::as_str)
                .filter(|p| !p.is_empty())
                .collect(),
            FacetDimension::Collection => Collection::of(item, ctx)
                .into_iter()
                .map(|c| c.as_str())
                .collect(),
            FacetDimension::Location => vec![Location::of(item).as_str()],
        }
    }

    /// Evaluate one item against this dimension's current selection
    pub fn matches(&self, item: &Item, state: &FilterState, ctx: &FacetContext<'_>) -> bool {
        match self {
            FacetDimension::Status => STATUS_FACETS.iter().all(|f| f.matches(item, state)),
            FacetDimension::Creator => matches_any(&state.creators, &item.creator),
            FacetDimension::License => matches_any(&state.license_types, &item.license_type),
            FacetDimension::Subfolder => matches_any(&state.subfolders, &item.subfolder),
            FacetDimension::Category => {
                intersects(&state.categories, item.categories.iter().map(String::as_str))
            }
            FacetDimension::Playlist => {
                intersects(&state.playlists, item.playlists.iter().map(String::as_str))
            }
            FacetDimension::FileSize => intersects(
                &state.file_size_buckets,
                ctx.classifier.classify(item.file_size_bytes),
            ),
            FacetDimension::Destination => intersects(&state.destinations, item.destination()),
            FacetDimension::Collection => {
                state.collections.is_empty()
                    || Collection::of(item, ctx)
                        .iter()
                        .any(|c| state.collections.contains(c))
            }
            FacetDimension::Location => {
                state.locations.is_empty() || state.locations.contains(&Location::of(item))
            }
        }
    }
}

impl fmt::Display for FacetDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FacetDimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FacetDimension::ALL
            .iter()
            .copied()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| format!("unknown facet dimension '{s}'"))
    }
}

fn non_empty(value: &str) -> Vec<&str> {
    if value.is_empty() {
        Vec::new()
    } else {
        vec![value]
    }
}

fn matches_any(selection: &BTreeSet<String>, value: &str) -> bool {
    selection.is_empty() || (!value.is_empty() && selection.contains(value))
}

fn intersects<'a>(selection: &BTreeSet<String>, values: impl IntoIterator<Item = &'a str>) -> bool {
    selection.is_empty() || values.into_iter().any(|v| selection.contains(v))
}

/// Collaborators needed to extract derived facet values
#[derive(Clone, Copy)]
pub struct FacetContext<'a> {
    pub favorites: &'a dyn MembershipSet,
    pub auto_install: &'a dyn MembershipSet,
    pub classifier: &'a dyn FileSizeClassifier,
}

/// Membership-derived collections. External items never belong to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Collection {
    Favorites,
    AutoInstall,
}

impl Collection {
    pub const ALL: [Collection; 2] = [Collection::Favorites, Collection::AutoInstall];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Favorites => "Favorites",
            Collection::AutoInstall => "Auto-Install",
        }
    }

    pub fn of(item: &Item, ctx: &FacetContext<'_>) -> Vec<Collection> {
        if item.is_external {
            return Vec::new();
        }
        let mut collections = Vec::new();
        if ctx.favorites.contains(&item.id) {
            collections.push(Collection::Favorites);
        }
        if ctx.auto_install.contains(&item.id) {
            collections.push(Collection::AutoInstall);
        }
        collections
    }
}

impl FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown collection '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Location {
    Local,
    External,
}

impl Location {
    pub const ALL: [Location; 2] = [Location::Local, Location::External];

    pub fn of(item: &Item) -> Self {
        if item.is_external {
            Location::External
        } else {
            Location::Local
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Local => "Local",
            Location::External => "External",
        }
    }
}

impl FromStr for Location {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Location::ALL
            .iter()
            .copied()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| format!("unknown location '{s}'"))
    }
}

/// Tri-state damaged filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamagedFilter {
    #[default]
    All,
    DamagedOnly,
    ValidOnly,
}

impl DamagedFilter {
    pub fn is_active(&self) -> bool {
        *self != DamagedFilter::All
    }

    pub fn matches(&self, item: &Item) -> bool {
        match self {
            DamagedFilter::All => true,
            DamagedFilter::DamagedOnly => item.is_damaged,
            DamagedFilter::ValidOnly => !item.is_damaged,
        }
    }
}

impl FromStr for DamagedFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(DamagedFilter::All),
            "damaged" | "damaged-only" => Ok(DamagedFilter::DamagedOnly),
            "valid" | "valid-only" => Ok(DamagedFilter::ValidOnly),
            other => Err(format!("unknown damaged filter '{other}'")),
        }
    }
}
