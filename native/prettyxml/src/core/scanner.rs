//! Construct boundary scanning using memchr
//!
//! Every `scan_beyond_*` routine takes `(input, offset, limit)` where
//! `input[offset] == b'<'` and returns the offset one past the end of the
//! construct. Nothing at or after `limit` is ever read; running into it
//! before the terminator is found is an error.
//!
//! memchr uses SIMD when available:
//! - SSE2 (default x86_64)
//! - AVX2 (runtime detection)
//! - NEON (aarch64)

use memchr::{memchr, memchr2, memchr3, memmem};

use crate::error::{Construct, ScanError};

/// Bytes `[from, limit)`, empty when `from` is already past the limit.
#[inline]
fn window(input: &[u8], from: usize, limit: usize) -> &[u8] {
    if from >= limit {
        &[]
    } else {
        &input[from..limit]
    }
}

/// Find `byte` in `[from, limit)`, returning its absolute position.
#[inline]
fn find_byte(input: &[u8], from: usize, limit: usize, byte: u8) -> Option<usize> {
    memchr(byte, window(input, from, limit)).map(|i| from + i)
}

/// Find `needle` in `[from, limit)`, returning the absolute position of its first byte.
#[inline]
fn find_seq(input: &[u8], from: usize, limit: usize, needle: &[u8]) -> Option<usize> {
    memmem::find(window(input, from, limit), needle).map(|i| from + i)
}

#[inline]
fn unterminated(construct: Construct, offset: usize) -> ScanError {
    ScanError::Unterminated { construct, offset }
}

/// Scan past `</name>`.
#[inline]
pub fn scan_beyond_end_tag(input: &[u8], offset: usize, limit: usize) -> Result<usize, ScanError> {
    find_byte(input, offset + 3, limit, b'>')
        .map(|end| end + 1)
        .ok_or_else(|| unterminated(Construct::EndTag, offset))
}

/// Scan past a start tag or an empty element.
///
/// A `>` inside a quoted attribute value does not end the tag.
pub fn scan_beyond_start_tag(input: &[u8], offset: usize, limit: usize) -> Result<usize, ScanError> {
    let mut pos = offset + 2;
    while let Some(i) = memchr3(b'>', b'"', b'\'', window(input, pos, limit)) {
        let at = pos + i;
        let quote = input[at];
        if quote == b'>' {
            return Ok(at + 1);
        }
        match find_byte(input, at + 1, limit, quote) {
            Some(close) => pos = close + 1,
            None => break,
        }
    }
    Err(unterminated(Construct::StartTag, offset))
}

/// Scan past `<!-- ... -->`.
#[inline]
pub fn scan_beyond_comment(input: &[u8], offset: usize, limit: usize) -> Result<usize, ScanError> {
    find_comment_end(input, offset + 4, limit)
        .map(|end| end + 3)
        .map_err(|_| unterminated(Construct::Comment, offset))
}

/// Position of the `-->` closing a comment whose body starts at `from`.
#[inline]
pub fn find_comment_end(input: &[u8], from: usize, limit: usize) -> Result<usize, ScanError> {
    find_seq(input, from, limit, b"-->").ok_or_else(|| unterminated(Construct::Comment, from))
}

/// Scan past `<![CDATA[ ... ]]>`.
#[inline]
pub fn scan_beyond_cdata(input: &[u8], offset: usize, limit: usize) -> Result<usize, ScanError> {
    find_cdata_end(input, offset + 9, limit)
        .map(|end| end + 3)
        .map_err(|_| unterminated(Construct::CData, offset))
}

/// Position of the `]]>` closing a CDATA section whose body starts at `from`.
#[inline]
pub fn find_cdata_end(input: &[u8], from: usize, limit: usize) -> Result<usize, ScanError> {
    find_seq(input, from, limit, b"]]>").ok_or_else(|| unterminated(Construct::CData, from))
}

/// Scan past `<? ... ?>`.
#[inline]
pub fn scan_beyond_processing_instruction(
    input: &[u8],
    offset: usize,
    limit: usize,
) -> Result<usize, ScanError> {
    find_seq(input, offset + 2, limit, b"?>")
        .map(|end| end + 2)
        .ok_or_else(|| unterminated(Construct::ProcessingInstruction, offset))
}

/// Scan past a `<!DOCTYPE ...>` or other `<!` declaration.
///
/// Internal subsets nest markup declarations, so `<` and `>` are counted
/// until the outermost one closes.
pub fn scan_beyond_dtd(input: &[u8], offset: usize, limit: usize) -> Result<usize, ScanError> {
    let mut depth = 1usize;
    let mut pos = offset + 2;
    while let Some(i) = memchr2(b'<', b'>', window(input, pos, limit)) {
        let at = pos + i;
        if input[at] == b'<' {
            depth += 1;
        } else {
            depth -= 1;
            if depth == 0 {
                return Ok(at + 1);
            }
        }
        pos = at + 1;
    }
    Err(unterminated(Construct::Declaration, offset))
}

/// Skip the content of an element whose start tag ends just before `offset`.
///
/// Returns the offset of the matching end tag. Comments, CDATA sections,
/// processing instructions and declarations inside the subtree are skipped
/// whole so markup-like text in them does not disturb the depth count.
pub fn skip_subtree(input: &[u8], offset: usize, limit: usize) -> Result<usize, ScanError> {
    let mut depth = 0usize;
    let mut pos = offset;
    loop {
        let at = find_byte(input, pos, limit, b'<')
            .filter(|at| at + 1 < limit)
            .ok_or_else(|| unterminated(Construct::Subtree, offset))?;
        pos = match input[at + 1] {
            b'/' => {
                if depth == 0 {
                    return Ok(at);
                }
                depth -= 1;
                scan_beyond_end_tag(input, at, limit)?
            }
            b'!' if input[at..limit].starts_with(b"<!--") => scan_beyond_comment(input, at, limit)?,
            b'!' if input[at..limit].starts_with(b"<![CDATA[") => scan_beyond_cdata(input, at, limit)?,
            b'!' => scan_beyond_dtd(input, at, limit)?,
            b'?' => scan_beyond_processing_instruction(input, at, limit)?,
            _ => {
                let end = scan_beyond_start_tag(input, at, limit)?;
                if input[end - 2] != b'/' {
                    depth += 1;
                }
                end
            }
        };
    }
}

/// Check whether the processing instruction at `offset` is `<?xml ...?>`.
#[inline]
pub fn is_xml_declaration(input: &[u8], offset: usize, limit: usize) -> bool {
    offset + 6 < limit
        && &input[offset + 2..offset + 5] == b"xml"
        && is_whitespace(input[offset + 5])
}

/// End of the element name starting at `from` (just after `<`).
#[inline]
pub fn element_name_end(input: &[u8], from: usize, limit: usize) -> usize {
    let mut pos = from;
    while pos < limit && !is_end_of_name(input[pos]) {
        pos += 1;
    }
    pos
}

/// Strip a namespace prefix: `ns:item` becomes `item`.
#[inline]
pub fn local_name(name: &[u8]) -> &[u8] {
    match memchr::memrchr(b':', name) {
        Some(colon) => &name[colon + 1..],
        None => name,
    }
}

/// Position of the first non-whitespace byte in `[from, limit)`, or `limit`.
#[inline]
pub fn skip_whitespace(input: &[u8], from: usize, limit: usize) -> usize {
    let mut pos = from;
    while pos < limit && is_whitespace(input[pos]) {
        pos += 1;
    }
    pos
}

/// Check if a run of bytes is indentation whitespace only.
#[inline]
pub fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(|&b| is_whitespace(b))
}

/// Check if byte is whitespace (space, tab, newline, carriage return)
#[inline]
pub fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

#[inline]
fn is_end_of_name(b: u8) -> bool {
    is_whitespace(b) || b == b'/' || b == b'>'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn end(f: fn(&[u8], usize, usize) -> Result<usize, ScanError>, input: &[u8]) -> Result<usize, ScanError> {
        f(input, 0, input.len())
    }

    #[test]
    fn test_end_tag() {
        assert_eq!(end(scan_beyond_end_tag, b"</a>rest"), Ok(4));
        assert!(end(scan_beyond_end_tag, b"</abc").is_err());
    }

    #[test]
    fn test_start_tag_quoted() {
        let input = b"<a attr=\">test\">content";
        assert_eq!(end(scan_beyond_start_tag, input), Ok(16));
        assert_eq!(end(scan_beyond_start_tag, b"<a b='x>y'/>"), Ok(12));
        assert!(end(scan_beyond_start_tag, b"<a b=\"open>").is_err());
    }

    #[test]
    fn test_comment() {
        assert_eq!(end(scan_beyond_comment, b"<!-- x -->tail"), Ok(10));
        assert_eq!(end(scan_beyond_comment, b"<!---->"), Ok(7));
        assert!(end(scan_beyond_comment, b"<!-- x --").is_err());
    }

    #[test]
    fn test_cdata() {
        assert_eq!(end(scan_beyond_cdata, b"<![CDATA[a]]b]]>!"), Ok(16));
        assert_eq!(find_cdata_end(b"<![CDATA[]]>", 9, 12), Ok(9));
    }

    #[test]
    fn test_processing_instruction() {
        assert_eq!(end(scan_beyond_processing_instruction, b"<?pi a>b?>x"), Ok(10));
    }

    #[test]
    fn test_dtd_nesting() {
        let input = b"<!DOCTYPE a [<!ENTITY e \"v\"><!ELEMENT a ANY>]><a/>";
        assert_eq!(end(scan_beyond_dtd, input), Ok(46));
    }

    #[test]
    fn test_skip_subtree() {
        let input = b"<b><c>x</c><!-- </b> --><![CDATA[</b>]]><d/></b><e/>";
        assert_eq!(skip_subtree(input, 3, input.len()), Ok(44));
        assert!(skip_subtree(b"<b><c></c>", 3, 10).is_err());
    }

    #[test]
    fn test_xml_declaration() {
        let input = b"<?xml version=\"1.0\"?>";
        assert!(is_xml_declaration(input, 0, input.len()));
        assert!(!is_xml_declaration(b"<?xml-stylesheet href=\"a\"?>", 0, 27));
    }

    #[test]
    fn test_names() {
        let input = b"<ns:item attr=\"1\">";
        let name_end = element_name_end(input, 1, input.len());
        assert_eq!(&input[1..name_end], b"ns:item");
        assert_eq!(local_name(&input[1..name_end]), b"item");
        assert_eq!(local_name(b"plain"), b"plain");
    }

    #[test]
    fn test_skip_whitespace() {
        assert_eq!(skip_whitespace(b"  \t\n hello", 0, 10), 5);
        assert!(is_blank(b" \r\n\t"));
        assert!(!is_blank(b" x "));
    }
}
