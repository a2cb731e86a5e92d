//! Marked Reader
//!
//! Wraps any source implementing `Read + Seek` with the mark, read, reset
//! discipline used for stream input.

use std::io::{self, Read, Seek, SeekFrom};

/// Reader that can return to a recorded position.
pub struct MarkedReader<R> {
    reader: R,
    mark: Option<u64>,
}

impl<R: Read + Seek> MarkedReader<R> {
    pub fn new(reader: R) -> Self {
        MarkedReader { reader, mark: None }
    }

    /// Record the current position.
    pub fn mark(&mut self) -> io::Result<u64> {
        let position = self.reader.stream_position()?;
        self.mark = Some(position);
        Ok(position)
    }

    /// Read exactly `length` bytes.
    ///
    /// A stream that ends early is an `UnexpectedEof` error.
    pub fn read_bytes(&mut self, length: usize) -> io::Result<Vec<u8>> {
        let mut buffer = vec![0u8; length];
        self.reader.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    /// Seek back to the last mark. Without a mark this is a no-op.
    pub fn reset(&mut self) -> io::Result<()> {
        if let Some(position) = self.mark {
            self.reader.seek(SeekFrom::Start(position))?;
        }
        Ok(())
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_mark_read_reset() {
        let mut cursor = Cursor::new(b"xx<root>content</root>".to_vec());
        cursor.set_position(2);
        let mut reader = MarkedReader::new(cursor);

        assert_eq!(reader.mark().unwrap(), 2);
        assert_eq!(reader.read_bytes(6).unwrap(), b"<root>");
        reader.reset().unwrap();
        assert_eq!(reader.into_inner().position(), 2);
    }

    #[test]
    fn test_short_stream() {
        let mut reader = MarkedReader::new(Cursor::new(b"<a/>".to_vec()));
        reader.mark().unwrap();
        let err = reader.read_bytes(10).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
