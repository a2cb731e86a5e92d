//! XML Attribute Spans
//!
//! Walks the attributes of a raw start tag and reports byte ranges instead
//! of decoded values, so a value can be replaced in place while every other
//! byte of the tag is copied through untouched.

use std::ops::Range;

use super::scanner::{element_name_end, is_whitespace, local_name};

/// Location of one attribute inside a start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSpan {
    /// Qualified name (may include a namespace prefix)
    pub name: Range<usize>,
    /// Value between the quotes, quotes excluded
    pub value: Range<usize>,
}

impl AttributeSpan {
    /// Local name (after colon, if namespaced)
    pub fn local_name<'t>(&self, tag: &'t [u8]) -> &'t [u8] {
        local_name(&tag[self.name.clone()])
    }
}

/// Iterator over the quoted attributes of a start tag.
///
/// Attributes without a quoted value are skipped.
pub struct Attributes<'a> {
    tag: &'a [u8],
    pos: usize,
}

/// Iterate the attributes of `tag`, a complete start tag from `<` to `>`.
pub fn attributes(tag: &[u8]) -> Attributes<'_> {
    Attributes {
        tag,
        pos: element_name_end(tag, 1, tag.len()),
    }
}

impl Attributes<'_> {
    #[inline]
    fn skip_whitespace(&mut self) {
        while self.pos < self.tag.len() && is_whitespace(self.tag[self.pos]) {
            self.pos += 1;
        }
    }
}

impl Iterator for Attributes<'_> {
    type Item = AttributeSpan;

    fn next(&mut self) -> Option<AttributeSpan> {
        let tag = self.tag;
        loop {
            self.skip_whitespace();

            // Check for end of attributes (/ or >)
            if self.pos >= tag.len() || tag[self.pos] == b'/' || tag[self.pos] == b'>' {
                return None;
            }

            let name_start = self.pos;
            while self.pos < tag.len()
                && !is_whitespace(tag[self.pos])
                && !matches!(tag[self.pos], b'=' | b'/' | b'>')
            {
                self.pos += 1;
            }
            let name = name_start..self.pos;

            self.skip_whitespace();
            if self.pos >= tag.len() || tag[self.pos] != b'=' {
                // Attribute without value
                continue;
            }
            self.pos += 1; // Skip '='
            self.skip_whitespace();

            let quote = *tag.get(self.pos)?;
            if quote != b'"' && quote != b'\'' {
                // Unquoted value, skip it
                while self.pos < tag.len() && !is_whitespace(tag[self.pos]) && tag[self.pos] != b'>' {
                    self.pos += 1;
                }
                continue;
            }

            let value_start = self.pos + 1;
            let value_end = memchr::memchr(quote, &tag[value_start..])
                .map(|i| value_start + i)
                .unwrap_or(tag.len());
            self.pos = (value_end + 1).min(tag.len());
            return Some(AttributeSpan {
                name,
                value: value_start..value_end,
            });
        }
    }
}
