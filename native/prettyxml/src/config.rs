//! Printer Configuration
//!
//! A plain option value plus a fluent builder. Options are orthogonal; the
//! engine reads them at each decision point instead of being specialised
//! per combination.

use crate::error::ConfigError;
use crate::printer::PrettyPrinter;

/// Largest accepted `indentation_multiplier`.
pub const MAX_INDENTATION_MULTIPLIER: usize = 1024;

/// Options of a [`PrettyPrinter`].
///
/// Equal configurations produce identical output, so the value doubles as
/// a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrinterConfig {
    /// Keep a leading `<?xml ...?>` declaration
    pub declaration: bool,
    pub indentation_character: char,
    /// Indentation characters per nesting level
    pub indentation_multiplier: usize,
    /// Reformat markup found inside CDATA sections
    pub pretty_print_cdata: bool,
    /// Reformat markup found inside comments
    pub pretty_print_comments: bool,
    /// Reformat escaped markup found inside text nodes
    pub pretty_print_text_nodes: bool,
    /// Fall back to literal output when embedded markup is malformed
    pub robustness: bool,
    pub max_text_node_length: Option<usize>,
    pub max_cdata_node_length: Option<usize>,
    /// Drop existing indentation whitespace between constructs
    pub ignore_whitespace: bool,
    pub anonymize_filters: Vec<String>,
    pub prune_filters: Vec<String>,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        PrinterConfig {
            declaration: false,
            indentation_character: '\t',
            indentation_multiplier: 1,
            pretty_print_cdata: false,
            pretty_print_comments: false,
            pretty_print_text_nodes: false,
            robustness: false,
            max_text_node_length: None,
            max_cdata_node_length: None,
            ignore_whitespace: false,
            anonymize_filters: Vec::new(),
            prune_filters: Vec::new(),
        }
    }
}

impl PrinterConfig {
    /// Whether any body kind has markup reformatting enabled.
    pub fn reformats_embedded_markup(&self) -> bool {
        self.pretty_print_cdata || self.pretty_print_comments || self.pretty_print_text_nodes
    }

    pub fn has_filters(&self) -> bool {
        !self.anonymize_filters.is_empty() || !self.prune_filters.is_empty()
    }

    pub fn has_max_length(&self) -> bool {
        self.max_text_node_length.is_some() || self.max_cdata_node_length.is_some()
    }

    /// Reject unsupported option combinations. Filter syntax is checked
    /// when the filters are compiled.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.indentation_multiplier > MAX_INDENTATION_MULTIPLIER {
            return Err(ConfigError::IndentationOutOfRange {
                multiplier: self.indentation_multiplier,
            });
        }
        if self.robustness && !self.reformats_embedded_markup() {
            return Err(ConfigError::RobustnessWithoutTarget);
        }
        if self.ignore_whitespace && self.has_max_length() {
            return Err(ConfigError::WhitespaceWithMaxLength);
        }
        if self.ignore_whitespace && self.has_filters() {
            return Err(ConfigError::WhitespaceWithFilters);
        }
        Ok(())
    }
}

/// Fluent construction of a [`PrettyPrinter`].
#[derive(Debug, Clone, Default)]
pub struct PrettyPrinterBuilder {
    config: PrinterConfig,
}

impl PrettyPrinterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keep_xml_declaration(mut self) -> Self {
        self.config.declaration = true;
        self
    }

    pub fn indentate(mut self, character: char, multiplier: usize) -> Self {
        self.config.indentation_character = character;
        self.config.indentation_multiplier = multiplier;
        self
    }

    pub fn pretty_print_cdata(mut self) -> Self {
        self.config.pretty_print_cdata = true;
        self
    }

    pub fn pretty_print_comments(mut self) -> Self {
        self.config.pretty_print_comments = true;
        self
    }

    pub fn pretty_print_text_nodes(mut self) -> Self {
        self.config.pretty_print_text_nodes = true;
        self
    }

    pub fn robust(mut self) -> Self {
        self.config.robustness = true;
        self
    }

    pub fn max_text_node_length(mut self, length: usize) -> Self {
        self.config.max_text_node_length = Some(length);
        self
    }

    pub fn max_cdata_node_length(mut self, length: usize) -> Self {
        self.config.max_cdata_node_length = Some(length);
        self
    }

    /// Same limit for text and CDATA nodes.
    pub fn max_node_length(self, length: usize) -> Self {
        self.max_text_node_length(length).max_cdata_node_length(length)
    }

    pub fn ignore_whitespace(mut self) -> Self {
        self.config.ignore_whitespace = true;
        self
    }

    pub fn anonymize<I, S>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.anonymize_filters.extend(filters.into_iter().map(Into::into));
        self
    }

    pub fn prune<I, S>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.prune_filters.extend(filters.into_iter().map(Into::into));
        self
    }

    pub fn config(&self) -> &PrinterConfig {
        &self.config
    }

    pub fn build(self) -> Result<PrettyPrinter, ConfigError> {
        PrettyPrinter::new(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterKind;

    #[test]
    fn test_defaults() {
        let config = PrinterConfig::default();
        assert!(!config.declaration);
        assert_eq!(config.indentation_character, '\t');
        assert_eq!(config.indentation_multiplier, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_robustness_needs_target() {
        let builder = PrettyPrinterBuilder::new().robust();
        assert_eq!(builder.config().validate(), Err(ConfigError::RobustnessWithoutTarget));
        let builder = builder.pretty_print_comments();
        assert!(builder.config().validate().is_ok());
    }

    #[test]
    fn test_whitespace_exclusions() {
        let builder = PrettyPrinterBuilder::new().ignore_whitespace().max_text_node_length(10);
        assert_eq!(builder.config().validate(), Err(ConfigError::WhitespaceWithMaxLength));

        let builder = PrettyPrinterBuilder::new().ignore_whitespace().prune(["/a"]);
        assert_eq!(builder.config().validate(), Err(ConfigError::WhitespaceWithFilters));
    }

    #[test]
    fn test_build_rejects_bad_filter() {
        let err = PrettyPrinterBuilder::new().prune(["/a/@id"]).build().err();
        assert_eq!(
            err,
            Some(ConfigError::InvalidFilter {
                expression: "/a/@id".to_string(),
                kind: FilterKind::Prune,
            })
        );
    }

    #[test]
    fn test_indentation_multiplier_bounded() {
        let builder = PrettyPrinterBuilder::new().indentate(' ', MAX_INDENTATION_MULTIPLIER);
        assert!(builder.config().validate().is_ok());

        let err = PrettyPrinterBuilder::new().indentate(' ', usize::MAX / 8).build().err();
        assert_eq!(
            err,
            Some(ConfigError::IndentationOutOfRange {
                multiplier: usize::MAX / 8
            })
        );
    }

    #[test]
    fn test_max_node_length_sets_both() {
        let config = PrettyPrinterBuilder::new().max_node_length(5).config().clone();
        assert_eq!(config.max_text_node_length, Some(5));
        assert_eq!(config.max_cdata_node_length, Some(5));
    }
}
