//! Character Bodies
//!
//! Text, CDATA and comment bodies may be redacted, truncated, or carry
//! markup of their own that is reformatted by reentering the engine.

use std::mem;

use crate::core::entities::{decode_escaped_markup, is_escaped_markup, is_literal_markup};
use crate::error::ScanError;
use crate::filter::ANONYMIZE_MARKER;

use super::engine::Transducer;

/// Prefix of the marker that replaces the tail of a truncated body.
pub const TRUNCATE_MARKER: &[u8] = b"...[TRUNCATED BY ";

/// Which kind of body is being handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum BodyKind {
    Text,
    CData,
    Comment,
}

impl Transducer<'_> {
    /// Body of the element at `depth`, found between its start and end tag.
    pub(super) fn element_body(&mut self, body: &[u8], depth: usize, out: &mut Vec<u8>) -> Result<(), ScanError> {
        if body.is_empty() {
            return Ok(());
        }
        if self.anonymized(depth) {
            out.extend_from_slice(ANONYMIZE_MARKER);
            return Ok(());
        }
        if self.config.pretty_print_text_nodes
            && is_escaped_markup(body)
            && self.reformat(BodyKind::Text, body, depth - 1, out)?
        {
            return Ok(());
        }
        self.truncate(BodyKind::Text, body, out);
        Ok(())
    }

    /// CDATA section inside the element at `level`. Returns whether the
    /// body was reformatted as markup.
    pub(super) fn cdata(&mut self, body: &[u8], level: usize, out: &mut Vec<u8>) -> Result<bool, ScanError> {
        out.extend_from_slice(b"<![CDATA[");
        let mut reformatted = false;
        if !body.is_empty() && self.anonymized(level) {
            out.extend_from_slice(ANONYMIZE_MARKER);
        } else if self.config.pretty_print_cdata
            && is_literal_markup(body)
            && self.reformat(BodyKind::CData, body, level, out)?
        {
            reformatted = true;
        } else {
            self.truncate(BodyKind::CData, body, out);
        }
        out.extend_from_slice(b"]]>");
        Ok(reformatted)
    }

    /// Comment body with comment reformatting enabled.
    pub(super) fn comment(&mut self, body: &[u8], level: usize, out: &mut Vec<u8>) -> Result<(), ScanError> {
        out.extend_from_slice(b"<!--");
        if !self.reformat(BodyKind::Comment, body, level, out)? {
            out.extend_from_slice(body);
        }
        out.extend_from_slice(b"-->");
        Ok(())
    }

    /// Reenter the engine on embedded markup.
    ///
    /// Escaped text is unescaped into a fresh buffer and formatted one
    /// level below its element; CDATA and comment bodies are formatted in
    /// place at `level`. On failure all output and match progress of the
    /// attempt is undone; robust printers then report `Ok(false)` so the
    /// caller can emit the body literally.
    fn reformat(&mut self, kind: BodyKind, body: &[u8], level: usize, out: &mut Vec<u8>) -> Result<bool, ScanError> {
        let mark = out.len();
        let saved = self.filters.clone();

        self.reentry += 1;
        let result = match kind {
            BodyKind::Text => {
                let mut decoded = Vec::new();
                decode_escaped_markup(body, &mut decoded)
                    .and_then(|()| self.transduce(&decoded, 0, decoded.len(), level + 1, out))
                    .and_then(|()| self.indent(level, out))
            }
            BodyKind::CData => self.transduce(body, 0, body.len(), level, out),
            BodyKind::Comment => {
                let redact = mem::replace(&mut self.redact_text, false);
                let result = self.transduce(body, 0, body.len(), level, out);
                self.redact_text = redact;
                result
            }
        };
        self.reentry -= 1;

        match result {
            Ok(()) => Ok(true),
            Err(e) => {
                out.truncate(mark);
                self.filters = saved;
                if !self.config.robustness {
                    return Err(e);
                }
                log::trace!(target: "prettyxml.probe", "{kind:?} body kept literal: {e}");
                Ok(false)
            }
        }
    }

    /// Copy `body`, cutting it at the configured max length for its kind.
    fn truncate(&self, kind: BodyKind, body: &[u8], out: &mut Vec<u8>) {
        let max = match kind {
            BodyKind::Text => self.config.max_text_node_length,
            BodyKind::CData => self.config.max_cdata_node_length,
            BodyKind::Comment => None,
        };
        if let Some(max) = max {
            let total = char_count(body);
            if total > max {
                out.extend_from_slice(&body[..char_offset(body, max)]);
                out.extend_from_slice(TRUNCATE_MARKER);
                out.extend_from_slice((total - max).to_string().as_bytes());
                out.push(b']');
                return;
            }
        }
        out.extend_from_slice(body);
    }
}

/// Whether `b` starts a UTF-8 encoded character.
#[inline]
fn is_char_start(b: u8) -> bool {
    (b as i8) >= -0x40
}

#[inline]
fn char_count(bytes: &[u8]) -> usize {
    bytes.iter().filter(|&&b| is_char_start(b)).count()
}

/// Byte offset of the character at index `n`, or the length when there are fewer.
fn char_offset(bytes: &[u8], n: usize) -> usize {
    bytes
        .iter()
        .enumerate()
        .filter(|&(_, &b)| is_char_start(b))
        .nth(n)
        .map_or(bytes.len(), |(i, _)| i)
}
