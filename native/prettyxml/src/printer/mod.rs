//! Pretty Printer
//!
//! A configured printer is immutable apart from its indentation cache and
//! can be shared across threads. Every `process*` call either appends the
//! complete formatted document to the output, or leaves the output exactly
//! as it was and returns `false`.

mod body;
mod engine;

use std::io::{self, Read, Seek};

use crate::config::{PrettyPrinterBuilder, PrinterConfig};
use crate::core::indent::IndentCache;
use crate::error::{ConfigError, ScanError};
use crate::filter::FilterSet;
use crate::reader::MarkedReader;

use engine::Transducer;

/// Single-pass XML reformatter.
#[derive(Debug)]
pub struct PrettyPrinter {
    config: PrinterConfig,
    filters: Option<FilterSet>,
    indents: IndentCache,
}

impl PrettyPrinter {
    /// Validate `config` and build a printer for it.
    pub fn new(config: PrinterConfig) -> Result<Self, ConfigError> {
        let (filters, indents) = Self::compile(&config).inspect_err(|e| {
            log::debug!(target: "prettyxml.config", "rejected configuration: {e}");
        })?;
        Ok(PrettyPrinter {
            config,
            filters,
            indents,
        })
    }

    fn compile(config: &PrinterConfig) -> Result<(Option<FilterSet>, IndentCache), ConfigError> {
        config.validate()?;
        let filters = FilterSet::new(&config.anonymize_filters, &config.prune_filters)?;
        let indents = IndentCache::new(config.indentation_character, config.indentation_multiplier)?;
        Ok(((!filters.is_empty()).then_some(filters), indents))
    }

    pub fn builder() -> PrettyPrinterBuilder {
        PrettyPrinterBuilder::new()
    }

    /// Effective configuration.
    pub fn config(&self) -> &PrinterConfig {
        &self.config
    }

    /// Format a string, appending to `out`.
    pub fn process(&self, input: &str, out: &mut String) -> bool {
        let Some(formatted) = self.format(input.as_bytes()) else {
            return false;
        };
        match String::from_utf8(formatted) {
            Ok(formatted) => {
                out.push_str(&formatted);
                true
            }
            Err(_) => false,
        }
    }

    /// Format raw bytes, appending to `out`.
    pub fn process_bytes(&self, input: &[u8], out: &mut Vec<u8>) -> bool {
        self.process_range(input, 0, input.len(), out)
    }

    /// Format `input[offset..offset + length]`, appending to `out`.
    pub fn process_range(&self, input: &[u8], offset: usize, length: usize, out: &mut Vec<u8>) -> bool {
        let entry = out.len();
        let result = offset
            .checked_add(length)
            .filter(|&end| end <= input.len())
            .ok_or(ScanError::OutOfBounds {
                offset,
                length,
                available: input.len(),
            })
            .and_then(|end| self.transducer(entry).run(input, offset, end, out));

        match result {
            Ok(()) => true,
            Err(e) => {
                log::debug!(target: "prettyxml.engine", "rolled back: {e}");
                out.truncate(entry);
                false
            }
        }
    }

    /// Format the next `length` bytes of `reader`, appending to `out`.
    ///
    /// The reader is rewound to where it was before the call. A stream
    /// shorter than `length` is an I/O error.
    pub fn process_reader<R: Read + Seek>(
        &self,
        reader: R,
        length: usize,
        out: &mut Vec<u8>,
    ) -> io::Result<bool> {
        let mut reader = MarkedReader::new(reader);
        reader.mark()?;
        let read = reader.read_bytes(length);
        reader.reset()?;
        Ok(self.process_bytes(&read?, out))
    }

    /// Format into a fresh buffer.
    pub fn format(&self, input: &[u8]) -> Option<Vec<u8>> {
        let mut out = Vec::with_capacity(input.len() + input.len() / 4);
        self.process_bytes(input, &mut out).then_some(out)
    }

    fn transducer(&self, origin: usize) -> Transducer<'_> {
        Transducer::new(
            &self.config,
            &self.indents,
            self.filters.as_ref().map(FilterSet::state),
            origin,
        )
    }
}
