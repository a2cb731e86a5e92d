//! Error types
//!
//! Configuration errors surface to the caller when a printer is built.
//! Scan errors never leave a `process*` call: they trigger rollback and
//! are reported as a plain `false`.

use std::fmt;

use crate::filter::FilterKind;

// ============================================================================
// Configuration errors
// ============================================================================

/// Errors from printer construction.
///
/// These are raised before any input is processed. Fix the options and
/// build the printer again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Robust mode was requested, but no body kind has markup reformatting enabled.
    RobustnessWithoutTarget,
    /// Whitespace stripping cannot be combined with a max node length.
    WhitespaceWithMaxLength,
    /// Whitespace stripping cannot be combined with filters.
    WhitespaceWithFilters,
    /// The indentation multiplier is above the supported maximum.
    IndentationOutOfRange { multiplier: usize },
    /// A filter expression does not follow the path grammar for its kind.
    InvalidFilter {
        /// The rejected expression.
        expression: String,
        /// Whether it was passed as an anonymize or a prune filter.
        kind: FilterKind,
    },
    /// The filter grammar itself failed to compile.
    Grammar {
        /// The underlying regex error message.
        source: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RobustnessWithoutTarget => write!(
                f,
                "robustness requires reformatting of text, CDATA or comment nodes"
            ),
            Self::WhitespaceWithMaxLength => {
                write!(f, "ignoring whitespace is not supported together with max node lengths")
            }
            Self::WhitespaceWithFilters => {
                write!(f, "ignoring whitespace is not supported together with filters")
            }
            Self::IndentationOutOfRange { multiplier } => {
                write!(f, "indentation multiplier {multiplier} is out of range")
            }
            Self::InvalidFilter { expression, kind } => {
                write!(f, "invalid {kind} filter \"{expression}\"")
            }
            Self::Grammar { source } => write!(f, "filter grammar: {source}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Scan errors
// ============================================================================

/// The construct a scanner was looking at when it ran out of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Construct {
    StartTag,
    EndTag,
    Comment,
    CData,
    ProcessingInstruction,
    Declaration,
    Subtree,
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::StartTag => "start tag",
            Self::EndTag => "end tag",
            Self::Comment => "comment",
            Self::CData => "CDATA section",
            Self::ProcessingInstruction => "processing instruction",
            Self::Declaration => "declaration",
            Self::Subtree => "subtree",
        };
        f.write_str(name)
    }
}

/// Processing failure inside a single call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// The terminator of a construct lies beyond the end of the input.
    Unterminated { construct: Construct, offset: usize },
    /// An end tag closes more elements than were opened.
    Unbalanced { offset: usize },
    /// Input ended with elements still open.
    Unclosed { depth: usize },
    /// A named entity other than the five predefined ones.
    UnknownEntity { offset: usize },
    /// Nesting too deep for an addressable indentation table.
    TooDeep { depth: usize },
    /// The requested `(offset, length)` range does not fit the input.
    OutOfBounds { offset: usize, length: usize, available: usize },
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unterminated { construct, offset } => {
                write!(f, "unterminated {construct} at offset {offset}")
            }
            Self::Unbalanced { offset } => write!(f, "unbalanced end tag at offset {offset}"),
            Self::Unclosed { depth } => write!(f, "{depth} element(s) left open"),
            Self::UnknownEntity { offset } => write!(f, "unknown entity at offset {offset}"),
            Self::TooDeep { depth } => write!(f, "nesting depth {depth} cannot be indented"),
            Self::OutOfBounds { offset, length, available } => write!(
                f,
                "range {offset}+{length} exceeds input of {available} bytes"
            ),
        }
    }
}

impl std::error::Error for ScanError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidFilter {
            expression: "/a/@b".to_string(),
            kind: FilterKind::Prune,
        };
        assert_eq!(err.to_string(), "invalid prune filter \"/a/@b\"");
    }

    #[test]
    fn test_scan_error_display() {
        let err = ScanError::Unterminated {
            construct: Construct::Comment,
            offset: 4,
        };
        assert_eq!(err.to_string(), "unterminated comment at offset 4");
    }
}
