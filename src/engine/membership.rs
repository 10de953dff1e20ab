//! Externally owned identity sets (favorites, auto-install)

use crate::catalog::ItemId;
use std::collections::{BTreeSet, HashSet};

/// Membership test over item identities
pub trait MembershipSet: Send + Sync {
    fn contains(&self, id: &ItemId) -> bool;
}

/// A set nobody belongs to
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptySet;

impl MembershipSet for EmptySet {
    fn contains(&self, _id: &ItemId) -> bool {
        false
    }
}

impl MembershipSet for HashSet<ItemId> {
    fn contains(&self, id: &ItemId) -> bool {
        HashSet::contains(self, id)
    }
}

impl MembershipSet for BTreeSet<ItemId> {
    fn contains(&self, id: &ItemId) -> bool {
        BTreeSet::contains(self, id)
    }
}

/// Parse a newline-separated identity list; blank lines and `#` comments
/// are skipped.
pub fn parse_identity_list(content: &str) -> HashSet<ItemId> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ItemId::from)
        .collect()
}
