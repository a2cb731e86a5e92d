//! XML Entity Decoding
//!
//! Only the five predefined entities are decoded:
//! &lt; &gt; &amp; &quot; &apos;
//!
//! Numeric character references (&#60; &#x3C;) are copied verbatim, so an
//! escaped body that spells its markup with numeric references is never
//! turned back into markup.

use memchr::memchr;

use crate::error::ScanError;

/// Decode a named entity (the part between `&` and `;`).
#[inline]
pub fn decode_entity(name: &[u8]) -> Option<char> {
    match name {
        b"lt" => Some('<'),
        b"gt" => Some('>'),
        b"amp" => Some('&'),
        b"quot" => Some('"'),
        b"apos" => Some('\''),
        _ => None,
    }
}

/// Check if a text body looks like escaped markup.
///
/// The shortest escaped element is `&lt;x/>` (the closing `>` need not be
/// escaped), hence the 7 byte floor.
#[inline]
pub fn is_escaped_markup(body: &[u8]) -> bool {
    body.len() >= 7
        && body.starts_with(b"&lt;")
        && (body.ends_with(b">") || body.ends_with(b"&gt;"))
}

/// Check if a CDATA or comment body looks like literal markup.
#[inline]
pub fn is_literal_markup(body: &[u8]) -> bool {
    body.len() >= 4 && body[0] == b'<' && body[body.len() - 1] == b'>'
}

/// Unescape a body accepted by [`is_escaped_markup`] into `out`.
///
/// An `&` without a following `;` is copied as is. An unknown named
/// entity is an error carrying its offset within `body`.
pub fn decode_escaped_markup(body: &[u8], out: &mut Vec<u8>) -> Result<(), ScanError> {
    out.reserve(body.len());
    out.push(b'<');

    let mut pos = 4;
    while let Some(amp) = memchr(b'&', &body[pos..]) {
        let amp = pos + amp;
        let Some(semi) = memchr(b';', &body[amp + 1..]).map(|i| amp + 1 + i) else {
            break;
        };
        let name = &body[amp + 1..semi];
        if name.first() == Some(&b'#') {
            out.extend_from_slice(&body[pos..=semi]);
        } else {
            let decoded = decode_entity(name).ok_or(ScanError::UnknownEntity { offset: amp })?;
            out.extend_from_slice(&body[pos..amp]);
            let mut utf8 = [0u8; 4];
            out.extend_from_slice(decoded.encode_utf8(&mut utf8).as_bytes());
        }
        pos = semi + 1;
    }
    out.extend_from_slice(&body[pos..]);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(body: &[u8]) -> Result<Vec<u8>, ScanError> {
        let mut out = Vec::new();
        decode_escaped_markup(body, &mut out).map(|()| out)
    }

    #[test]
    fn test_builtin_entities() {
        assert_eq!(decode_entity(b"lt"), Some('<'));
        assert_eq!(decode_entity(b"gt"), Some('>'));
        assert_eq!(decode_entity(b"amp"), Some('&'));
        assert_eq!(decode_entity(b"quot"), Some('"'));
        assert_eq!(decode_entity(b"apos"), Some('\''));
        assert_eq!(decode_entity(b"nbsp"), None);
    }

    #[test]
    fn test_escaped_markup_detection() {
        assert!(is_escaped_markup(b"&lt;x/>"));
        assert!(is_escaped_markup(b"&lt;a&gt;b&lt;/a&gt;"));
        assert!(!is_escaped_markup(b"&lt;x>"));
        assert!(!is_escaped_markup(b"plain text here"));
        assert!(!is_escaped_markup(b"&lt;a&gt;b"));
    }

    #[test]
    fn test_literal_markup_detection() {
        assert!(is_literal_markup(b"<x/>"));
        assert!(!is_literal_markup(b"<x>"));
        assert!(!is_literal_markup(b"a <x/>"));
    }

    #[test]
    fn test_decode_escaped() {
        assert_eq!(decode(b"&lt;a&gt;b&lt;/a&gt;").unwrap(), b"<a>b</a>");
        assert_eq!(decode(b"&lt;a t=&quot;1&quot;/>").unwrap(), b"<a t=\"1\"/>");
    }

    #[test]
    fn test_numeric_reference_kept() {
        assert_eq!(decode(b"&lt;a&gt;&#60;&lt;/a&gt;").unwrap(), b"<a>&#60;</a>");
    }

    #[test]
    fn test_unknown_entity() {
        assert_eq!(
            decode(b"&lt;a&gt;&nbsp;&lt;/a&gt;"),
            Err(ScanError::UnknownEntity { offset: 9 })
        );
    }
}
