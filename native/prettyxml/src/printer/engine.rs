//! Reformat Engine
//!
//! One pass over the input. Each `<` is classified by the byte after it,
//! the construct is located with the boundary scanner and copied through
//! with indentation in front of it. Bytes between constructs stay pending
//! until the next construct decides what they are: the body of the element
//! just opened, or content between siblings.

use std::sync::Arc;

use memchr::memchr;

use crate::config::PrinterConfig;
use crate::core::attributes::attributes;
use crate::core::indent::{IndentCache, IndentTable};
use crate::core::scanner::{
    element_name_end, find_cdata_end, is_blank, is_xml_declaration, local_name,
    scan_beyond_comment, scan_beyond_dtd, scan_beyond_end_tag, scan_beyond_processing_instruction,
    scan_beyond_start_tag, skip_subtree, skip_whitespace,
};
use crate::error::{Construct, ScanError};
use crate::filter::{Decision, MatchState, ANONYMIZE_MARKER, PRUNE_MARKER};

/// What the previous sibling construct was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Sibling {
    /// A start tag: pending bytes are that element's body
    JustOpened,
    /// An end tag, empty element, comment, PI or declaration
    JustClosed,
    /// Nothing yet
    Neither,
}

/// Per-call engine state.
pub(super) struct Transducer<'p> {
    pub(super) config: &'p PrinterConfig,
    cache: &'p IndentCache,
    indents: Arc<IndentTable>,
    pub(super) filters: Option<MatchState<'p>>,
    /// Output length when the top-level call started
    origin: usize,
    /// Nesting of recursive reentries into embedded markup
    pub(super) reentry: usize,
    /// Off while reformatting a comment body
    pub(super) redact_text: bool,
}

impl<'p> Transducer<'p> {
    pub(super) fn new(
        config: &'p PrinterConfig,
        cache: &'p IndentCache,
        filters: Option<MatchState<'p>>,
        origin: usize,
    ) -> Self {
        Transducer {
            config,
            cache,
            indents: cache.snapshot(),
            filters,
            origin,
            reentry: 0,
            redact_text: true,
        }
    }

    /// Format `input[start..limit]` as a complete document.
    pub(super) fn run(
        &mut self,
        input: &[u8],
        start: usize,
        limit: usize,
        out: &mut Vec<u8>,
    ) -> Result<(), ScanError> {
        self.transduce(input, start, limit, 0, out)
    }

    /// Format `input[start..limit]` starting at nesting `level_offset`.
    ///
    /// On error, output written by this call is left in place; callers
    /// truncate back to their own mark.
    pub(super) fn transduce(
        &mut self,
        input: &[u8],
        start: usize,
        limit: usize,
        level_offset: usize,
        out: &mut Vec<u8>,
    ) -> Result<(), ScanError> {
        let mut offset = start;
        let mut pending = start;
        let mut level = level_offset;
        let mut sibling = Sibling::Neither;

        while offset < limit {
            let Some(found) = memchr(b'<', &input[offset..limit]) else {
                break;
            };
            offset += found;
            if offset + 1 >= limit {
                return Err(ScanError::Unterminated {
                    construct: Construct::StartTag,
                    offset,
                });
            }

            match input[offset + 1] {
                b'/' => {
                    if level == level_offset {
                        return Err(ScanError::Unbalanced { offset });
                    }
                    if sibling == Sibling::JustOpened {
                        self.element_body(&input[pending..offset], level, out)?;
                    } else {
                        self.flush(&input[pending..offset], level, out);
                        self.indent(level - 1, out)?;
                    }
                    level -= 1;

                    let end = scan_beyond_end_tag(input, offset, limit)?;
                    out.extend_from_slice(&input[offset..end]);
                    self.close(level);
                    sibling = Sibling::JustClosed;
                    offset = end;
                }
                b'!' if input[offset..limit].starts_with(b"<!--") => {
                    self.flush(&input[pending..offset], level, out);
                    self.indent(level, out)?;

                    let end = scan_beyond_comment(input, offset, limit)?;
                    if self.config.pretty_print_comments {
                        self.comment(&input[offset + 4..end - 3], level, out)?;
                    } else {
                        out.extend_from_slice(&input[offset..end]);
                    }
                    sibling = Sibling::JustClosed;
                    offset = end;
                }
                b'!' if input[offset..limit].starts_with(b"<![CDATA[") => {
                    if offset + 12 > limit {
                        return Err(ScanError::Unterminated {
                            construct: Construct::CData,
                            offset,
                        });
                    }
                    self.flush(&input[pending..offset], level, out);

                    // inline, no indentation: CDATA is character data of its element
                    let close = find_cdata_end(input, offset + 9, limit)?;
                    if self.cdata(&input[offset + 9..close], level, out)? {
                        sibling = Sibling::JustClosed;
                    }
                    offset = close + 3;
                }
                b'!' => {
                    // assume a DOCTYPE or other declaration
                    self.flush(&input[pending..offset], level, out);

                    let end = scan_beyond_dtd(input, offset, limit)?;
                    out.extend_from_slice(&input[offset..end]);
                    sibling = Sibling::JustClosed;
                    offset = end;
                }
                b'?' => {
                    self.flush(&input[pending..offset], level, out);

                    let end = scan_beyond_processing_instruction(input, offset, limit)?;
                    if level == 0
                        && self.reentry == 0
                        && !self.config.declaration
                        && is_xml_declaration(input, offset, limit)
                    {
                        // drop the declaration along with the line break after it
                        offset = skip_whitespace(input, end, limit);
                    } else {
                        self.indent(level, out)?;
                        out.extend_from_slice(&input[offset..end]);
                        sibling = Sibling::JustClosed;
                        offset = end;
                    }
                }
                _ => {
                    self.flush(&input[pending..offset], level, out);

                    let depth = level + 1;
                    let name_end = element_name_end(input, offset + 1, limit);
                    let decision = match self.filters.as_mut() {
                        Some(state) => state.open(local_name(&input[offset + 1..name_end]), depth),
                        None => Decision::Keep,
                    };
                    let end = scan_beyond_start_tag(input, offset, limit)?;
                    let empty = input[end - 2] == b'/';

                    self.indent(level, out)?;
                    if decision == Decision::Prune && !empty {
                        let close = skip_subtree(input, end, limit)?;
                        offset = scan_beyond_end_tag(input, close, limit)?;
                        out.extend_from_slice(PRUNE_MARKER);
                        self.close(level);
                        sibling = Sibling::JustClosed;
                        pending = offset;
                        continue;
                    }

                    self.start_tag(&input[offset..end], depth, out);
                    if empty {
                        self.close(level);
                        sibling = Sibling::JustClosed;
                    } else {
                        self.enter(depth, decision == Decision::Anonymize);
                        level = depth;
                        sibling = Sibling::JustOpened;
                    }
                    offset = end;
                }
            }
            pending = offset;
        }

        if level != level_offset {
            return Err(ScanError::Unclosed {
                depth: level - level_offset,
            });
        }
        self.flush(&input[pending..limit], level, out);
        Ok(())
    }

    /// Copy bytes found between constructs inside the element at `depth`.
    fn flush(&self, pending: &[u8], depth: usize, out: &mut Vec<u8>) {
        if pending.is_empty() {
            return;
        }
        let blank = is_blank(pending);
        if blank && self.config.ignore_whitespace {
            return;
        }
        if !blank && self.anonymized(depth) {
            out.extend_from_slice(ANONYMIZE_MARKER);
        } else {
            out.extend_from_slice(pending);
        }
    }

    /// Append the indentation for `depth`.
    ///
    /// Nothing is written for depth 0 at the very start of the output, so
    /// a document never opens with a blank line.
    pub(super) fn indent(&mut self, depth: usize, out: &mut Vec<u8>) -> Result<(), ScanError> {
        if depth == 0 && out.len() == self.origin {
            return Ok(());
        }
        if depth > self.indents.depth() {
            self.indents = self.cache.grow(depth).ok_or(ScanError::TooDeep { depth })?;
        }
        let indent = self.indents.get(depth).ok_or(ScanError::TooDeep { depth })?;
        out.extend_from_slice(indent);
        Ok(())
    }

    /// Copy a start tag, redacting attribute values matched by a filter.
    fn start_tag(&self, tag: &[u8], depth: usize, out: &mut Vec<u8>) {
        let Some(state) = self.filters.as_ref().filter(|s| s.has_attribute_filters(depth)) else {
            out.extend_from_slice(tag);
            return;
        };
        let mut copied = 0;
        for span in attributes(tag) {
            if state.redacts_attribute(depth, span.local_name(tag)) {
                out.extend_from_slice(&tag[copied..span.value.start]);
                out.extend_from_slice(ANONYMIZE_MARKER);
                copied = span.value.end;
            }
        }
        out.extend_from_slice(&tag[copied..]);
    }

    /// Whether text directly inside the element at `depth` is redacted.
    pub(super) fn anonymized(&self, depth: usize) -> bool {
        self.redact_text && self.filters.as_ref().is_some_and(|s| s.is_anonymized(depth))
    }

    #[inline]
    fn enter(&mut self, depth: usize, anonymized: bool) {
        if let Some(state) = self.filters.as_mut() {
            state.enter(depth, anonymized);
        }
    }

    #[inline]
    fn close(&mut self, level: usize) {
        if let Some(state) = self.filters.as_mut() {
            state.close(level);
        }
    }
}
