//! Path Filters
//!
//! Anonymize and prune filters over element and attribute paths:
//! - Parser: expression grammar and segment arrays
//! - Matcher: incremental matching against the open element stack

pub mod matcher;
pub mod parser;

use std::fmt;

pub use matcher::{Decision, FilterSet, MatchState};

/// Replaces a pruned subtree.
pub const PRUNE_MARKER: &[u8] = b"<!-- [SUBTREE REMOVED] -->";

/// Replaces anonymized text and attribute values.
pub const ANONYMIZE_MARKER: &[u8] = b"[*****]";

/// Whether a filter redacts or removes what it matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    Anonymize,
    Prune,
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterKind::Anonymize => f.write_str("anonymize"),
            FilterKind::Prune => f.write_str("prune"),
        }
    }
}
