//! Incremental Filter Matching
//!
//! Every absolute filter keeps a counter of how many of its leading
//! segments match the currently open element stack. A start tag at depth
//! `d` can only advance filters whose counter is `d - 1`, and closing back
//! to level `l` clamps every counter to `l`, so partial matches never leak
//! from one subtree into its siblings.

use super::parser::{self, AnyPathFilter, AttributeFilter, Expression, PathFilter};
use super::FilterKind;
use crate::error::ConfigError;

/// What to do with an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Keep,
    Anonymize,
    Prune,
}

/// Validated filters of one printer. Immutable, shared by all calls.
#[derive(Debug, Default, Clone)]
pub struct FilterSet {
    elements: Vec<PathFilter>,
    attributes: Vec<AttributeFilter>,
    any: Vec<AnyPathFilter>,
}

impl FilterSet {
    /// Parse and validate anonymize and prune expressions.
    pub fn new<S: AsRef<str>>(anonymize: &[S], prune: &[S]) -> Result<Self, ConfigError> {
        let mut set = FilterSet::default();
        let tagged = prune
            .iter()
            .map(|e| (e, FilterKind::Prune))
            .chain(anonymize.iter().map(|e| (e, FilterKind::Anonymize)));
        for (expression, kind) in tagged {
            match parser::parse(expression.as_ref(), kind)? {
                Expression::Element(filter) => set.elements.push(filter),
                Expression::Attribute(filter) => set.attributes.push(filter),
                Expression::AnyDepth(filter) => set.any.push(filter),
            }
        }
        Ok(set)
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.attributes.is_empty() && self.any.is_empty()
    }

    /// Fresh per-call match state.
    pub fn state(&self) -> MatchState<'_> {
        MatchState {
            filters: self,
            elements: vec![0; self.elements.len()],
            attributes: vec![0; self.attributes.len()],
            anonymized: Vec::new(),
        }
    }
}

/// Per-call matching progress. Cheap to clone for rollback.
#[derive(Debug, Clone)]
pub struct MatchState<'f> {
    filters: &'f FilterSet,
    /// Matched segment count per element filter
    elements: Vec<usize>,
    /// Matched element segment count per attribute filter
    attributes: Vec<usize>,
    /// Anonymize flag per open element, indexed by depth - 1
    anonymized: Vec<bool>,
}

impl MatchState<'_> {
    /// Match a start tag with local name `name` at 1-based `depth`.
    pub fn open(&mut self, name: &[u8], depth: usize) -> Decision {
        let mut prune = false;
        let mut anonymize = false;

        for (filter, matched) in self.filters.elements.iter().zip(self.elements.iter_mut()) {
            if *matched + 1 != depth {
                continue;
            }
            let Some(segment) = filter.segments.get(*matched) else {
                continue;
            };
            if segment.matches(name) {
                *matched += 1;
                if *matched == filter.segments.len() {
                    match filter.kind {
                        FilterKind::Prune => prune = true,
                        FilterKind::Anonymize => anonymize = true,
                    }
                }
            }
        }

        for filter in &self.filters.any {
            if *filter.name == *name {
                match filter.kind {
                    FilterKind::Prune => prune = true,
                    FilterKind::Anonymize => anonymize = true,
                }
            }
        }

        for (filter, matched) in self.filters.attributes.iter().zip(self.attributes.iter_mut()) {
            if *matched + 1 == depth
                && filter.element.get(*matched).is_some_and(|segment| segment.matches(name))
            {
                *matched += 1;
            }
        }

        if prune {
            Decision::Prune
        } else if anonymize {
            Decision::Anonymize
        } else {
            Decision::Keep
        }
    }

    /// Record that the element just matched at `depth` was opened.
    pub fn enter(&mut self, depth: usize, anonymized: bool) {
        self.anonymized.truncate(depth.saturating_sub(1));
        self.anonymized.push(anonymized);
    }

    /// Close back to `level`, dropping partial matches made deeper down.
    pub fn close(&mut self, level: usize) {
        for matched in self.elements.iter_mut().chain(self.attributes.iter_mut()) {
            if *matched > level {
                *matched = level;
            }
        }
        self.anonymized.truncate(level);
    }

    /// Whether the open element at `depth` has its text redacted.
    #[inline]
    pub fn is_anonymized(&self, depth: usize) -> bool {
        depth
            .checked_sub(1)
            .and_then(|i| self.anonymized.get(i))
            .copied()
            .unwrap_or(false)
    }

    /// Whether any attribute filter applies to the element just matched at `depth`.
    #[inline]
    pub fn has_attribute_filters(&self, depth: usize) -> bool {
        self.filters
            .attributes
            .iter()
            .zip(&self.attributes)
            .any(|(filter, &matched)| matched == depth && filter.element.len() == depth)
    }

    /// Whether attribute `name` of the element just matched at `depth` is redacted.
    pub fn redacts_attribute(&self, depth: usize, name: &[u8]) -> bool {
        self.filters
            .attributes
            .iter()
            .zip(&self.attributes)
            .any(|(filter, &matched)| {
                matched == depth && filter.element.len() == depth && filter.attribute.matches(name)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(anonymize: &[&str], prune: &[&str]) -> FilterSet {
        FilterSet::new(anonymize, prune).unwrap()
    }

    #[test]
    fn test_absolute_match() {
        let filters = set(&["/a/b"], &[]);
        let mut state = filters.state();
        assert_eq!(state.open(b"a", 1), Decision::Keep);
        state.enter(1, false);
        assert_eq!(state.open(b"b", 2), Decision::Anonymize);
        state.enter(2, true);
        assert!(state.is_anonymized(2));
        assert!(!state.is_anonymized(1));
        state.close(1);
        assert!(!state.is_anonymized(2));
    }

    #[test]
    fn test_wildcard_segment() {
        let filters = set(&[], &["/a/*/c"]);
        let mut state = filters.state();
        state.open(b"a", 1);
        state.open(b"anything", 2);
        assert_eq!(state.open(b"c", 3), Decision::Prune);
    }

    #[test]
    fn test_sibling_reset() {
        let filters = set(&["/a/b/c"], &[]);
        let mut state = filters.state();
        state.open(b"a", 1);
        state.open(b"b", 2);
        state.close(1);
        // sibling <x> must not inherit the partial match of <b>
        state.open(b"x", 2);
        assert_eq!(state.open(b"c", 3), Decision::Keep);
        state.close(2);
        state.close(1);
        state.open(b"b", 2);
        assert_eq!(state.open(b"c", 3), Decision::Anonymize);
    }

    #[test]
    fn test_prune_wins_over_anonymize() {
        let filters = set(&["/a/b", "//b"], &["/a/b"]);
        let mut state = filters.state();
        state.open(b"a", 1);
        assert_eq!(state.open(b"b", 2), Decision::Prune);
    }

    #[test]
    fn test_any_depth() {
        let filters = set(&["//pin"], &[]);
        let mut state = filters.state();
        state.open(b"a", 1);
        state.open(b"b", 2);
        assert_eq!(state.open(b"pin", 3), Decision::Anonymize);
        assert_eq!(state.open(b"pin", 1), Decision::Anonymize);
    }

    #[test]
    fn test_attribute_match() {
        let filters = set(&["/a/b/@id"], &[]);
        let mut state = filters.state();
        state.open(b"a", 1);
        assert!(!state.has_attribute_filters(1));
        state.open(b"b", 2);
        assert!(state.has_attribute_filters(2));
        assert!(state.redacts_attribute(2, b"id"));
        assert!(!state.redacts_attribute(2, b"name"));
        state.close(1);
        assert!(!state.has_attribute_filters(2));
    }

    #[test]
    fn test_invalid_filter_rejected() {
        assert!(FilterSet::new(&["/a[1]"], &[]).is_err());
        assert!(FilterSet::new::<&str>(&[], &["/a/@id"]).is_err());
    }
}
