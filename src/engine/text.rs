//! Free-text matching
//!
//! A query is split on whitespace into lowercase tokens. An item matches
//! when every token is a substring of at least one of its searched fields.
//! Comparison is plain ordinal substring matching on lowercased text, with
//! no locale-dependent folding.

use crate::catalog::Item;
use serde::{Deserialize, Serialize};

/// Item fields the text matcher can search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    Name,
    Creator,
    Description,
    Categories,
    Subfolder,
    Identity,
}

impl SearchField {
    pub fn defaults() -> Vec<SearchField> {
        vec![
            SearchField::Name,
            SearchField::Creator,
            SearchField::Description,
        ]
    }

    fn collect<'a>(&self, item: &'a Item, out: &mut Vec<&'a str>) {
        match self {
            SearchField::Name => out.push(&item.name),
            SearchField::Creator => out.push(&item.creator),
            SearchField::Description => out.push(&item.description),
            SearchField::Categories => out.extend(item.categories.iter().map(String::as_str)),
            SearchField::Subfolder => out.push(&item.subfolder),
            SearchField::Identity => out.push(item.id.as_str()),
        }
    }
}

/// A parsed search query, built once per recomputation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextQuery {
    tokens: Vec<String>,
}

impl TextQuery {
    pub fn parse(search_text: &str) -> Self {
        Self {
            tokens: tokenize(search_text),
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// An empty query matches everything
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// AND across tokens, OR across the given field values
    pub fn matches_fields<S: AsRef<str>>(&self, fields: &[S]) -> bool {
        if self.tokens.is_empty() {
            return true;
        }
        let lowered: Vec<String> = fields.iter().map(|f| f.as_ref().to_lowercase()).collect();
        self.tokens
            .iter()
            .all(|token| lowered.iter().any(|field| field.contains(token.as_str())))
    }

    pub fn matches_item(&self, item: &Item, fields: &[SearchField]) -> bool {
        if self.tokens.is_empty() {
            return true;
        }
        let mut values = Vec::with_capacity(fields.len());
        for field in fields {
            field.collect(item, &mut values);
        }
        self.matches_fields(&values)
    }
}

/// Split on whitespace into lowercase tokens, dropping empties
pub fn tokenize(search_text: &str) -> Vec<String> {
    search_text
        .split_whitespace()
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tokenize_drops_whitespace() {
        assert_eq!(tokenize("  John \t Fantasy\n"), vec!["john", "fantasy"]);
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn test_all_tokens_must_match() {
        let query = TextQuery::parse("john fantasy");
        assert!(query.matches_fields(&["John's Fantasy Island"]));
        assert!(!query.matches_fields(&["John's Reality Island"]));
    }

    #[test]
    fn test_tokens_may_match_different_fields() {
        let query = TextQuery::parse("alice beach");
        assert!(query.matches_fields(&["Beach Scene", "Alice"]));
        assert!(!query.matches_fields(&["Beach Scene", "Bob"]));
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let query = TextQuery::parse(" ");
        assert!(query.is_empty());
        assert!(query.matches_fields::<&str>(&[]));
    }

    #[test]
    fn test_matches_configured_fields_only() {
        let item = Item::new("Alice.Beach.1")
            .with_name("Beach Scene")
            .with_creator("Alice")
            .with_category("Scenes");
        let query = TextQuery::parse("scenes");

        assert!(!query.matches_item(&item, &SearchField::defaults()));
        assert!(query.matches_item(&item, &[SearchField::Categories]));
        assert!(TextQuery::parse("alice.beach").matches_item(&item, &[SearchField::Identity]));
    }
}
