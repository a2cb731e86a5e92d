//! Filter Expression Parser
//!
//! Two syntactic forms are accepted:
//! - absolute paths: `/a/b/c`, `/a/*/c`, and for anonymize filters `/a/b/@attr`
//! - any-depth names: `//c`
//!
//! Predicates, axes, functions and unions are rejected.

use std::sync::LazyLock;

use regex::Regex;

use super::FilterKind;
use crate::error::ConfigError;

/// Path grammar, compiled once per process.
struct Grammar {
    prune: Regex,
    anonymize: Regex,
    any_depth: Regex,
}

impl Grammar {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Grammar {
            prune: Regex::new(r"^(/[^@/\[\]().:|]+)+(/[^@/\[\]().:|]+)?$")?,
            anonymize: Regex::new(r"^(/[^@/\[\]().:|]+)+(/[^/\[\]().:|]+)?$")?,
            any_depth: Regex::new(r"^(//[^@/\[\]().:|*]+)$")?,
        })
    }
}

static GRAMMAR: LazyLock<Result<Grammar, regex::Error>> = LazyLock::new(Grammar::compile);

/// One step of an absolute path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// `*`
    Any,
    Name(Box<[u8]>),
}

impl Segment {
    fn parse(text: &str) -> Self {
        if text == "*" {
            Segment::Any
        } else {
            Segment::Name(text.as_bytes().into())
        }
    }

    /// Match a local name.
    #[inline]
    pub fn matches(&self, name: &[u8]) -> bool {
        match self {
            Segment::Any => true,
            Segment::Name(expected) => **expected == *name,
        }
    }
}

/// Absolute element path, e.g. `/a/*/c`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathFilter {
    pub segments: Vec<Segment>,
    pub kind: FilterKind,
}

/// Absolute attribute path, e.g. `/a/b/@id`. Always anonymizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeFilter {
    /// Path of the owning element
    pub element: Vec<Segment>,
    pub attribute: Segment,
}

/// Element name matched at any depth, e.g. `//c`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnyPathFilter {
    pub name: Box<[u8]>,
    pub kind: FilterKind,
}

/// A parsed filter expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    Element(PathFilter),
    Attribute(AttributeFilter),
    AnyDepth(AnyPathFilter),
}

/// Parse one filter expression of the given kind.
pub fn parse(expression: &str, kind: FilterKind) -> Result<Expression, ConfigError> {
    let grammar = GRAMMAR.as_ref().map_err(|e| ConfigError::Grammar {
        source: e.to_string(),
    })?;
    let invalid = || ConfigError::InvalidFilter {
        expression: expression.to_string(),
        kind,
    };

    if let Some(name) = expression.strip_prefix("//") {
        if !grammar.any_depth.is_match(expression) {
            return Err(invalid());
        }
        return Ok(Expression::AnyDepth(AnyPathFilter {
            name: name.as_bytes().into(),
            kind,
        }));
    }

    let absolute = match kind {
        FilterKind::Prune => &grammar.prune,
        FilterKind::Anonymize => &grammar.anonymize,
    };
    if !absolute.is_match(expression) {
        return Err(invalid());
    }

    let mut steps: Vec<&str> = expression[1..].split('/').collect();
    let last = steps.pop().ok_or_else(invalid)?;
    let mut segments: Vec<Segment> = steps.into_iter().map(Segment::parse).collect();

    match last.strip_prefix('@') {
        Some(attribute) if !segments.is_empty() => Ok(Expression::Attribute(AttributeFilter {
            element: segments,
            attribute: Segment::parse(attribute),
        })),
        Some(_) => Err(invalid()),
        None => {
            segments.push(Segment::parse(last));
            Ok(Expression::Element(PathFilter { segments, kind }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Segment {
        Segment::Name(s.as_bytes().into())
    }

    #[test]
    fn test_absolute_path() {
        let parsed = parse("/a/*/c", FilterKind::Prune).unwrap();
        assert_eq!(
            parsed,
            Expression::Element(PathFilter {
                segments: vec![name("a"), Segment::Any, name("c")],
                kind: FilterKind::Prune,
            })
        );
    }

    #[test]
    fn test_attribute_path() {
        let parsed = parse("/a/b/@id", FilterKind::Anonymize).unwrap();
        assert_eq!(
            parsed,
            Expression::Attribute(AttributeFilter {
                element: vec![name("a"), name("b")],
                attribute: name("id"),
            })
        );
        let wildcard = parse("/a/@*", FilterKind::Anonymize).unwrap();
        assert!(matches!(wildcard, Expression::Attribute(AttributeFilter { attribute: Segment::Any, .. })));
    }

    #[test]
    fn test_any_depth() {
        let parsed = parse("//secret", FilterKind::Anonymize).unwrap();
        assert_eq!(
            parsed,
            Expression::AnyDepth(AnyPathFilter {
                name: b"secret"[..].into(),
                kind: FilterKind::Anonymize,
            })
        );
    }

    #[test]
    fn test_rejected_expressions() {
        for bad in ["a/b", "/a/b[1]", "/a/text()", "/a|/b", "//*", "//a/b", "/", "", "/a//b"] {
            assert!(parse(bad, FilterKind::Anonymize).is_err(), "{bad}");
        }
        assert!(parse("/a/@id", FilterKind::Prune).is_err());
        assert!(parse("//@id", FilterKind::Anonymize).is_err());
        assert!(parse("/@id", FilterKind::Anonymize).is_err());
    }

    #[test]
    fn test_segment_matching() {
        assert!(Segment::Any.matches(b"x"));
        assert!(name("item").matches(b"item"));
        assert!(!name("item").matches(b"items"));
    }
}
