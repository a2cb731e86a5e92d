//! Indentation Cache
//!
//! Indentation for depth `d` is a newline followed by `d * multiplier`
//! copies of the indentation character. All depths share one buffer: the
//! indentation for `d` is its prefix of `1 + d * step` bytes.
//!
//! The table only ever grows. Growth builds a larger table from the old
//! bytes under the write lock and replaces the shared `Arc`. Each call
//! takes the read lock once to clone its snapshot and then indents without
//! locking; a snapshot stays valid for every depth it covers.

use std::sync::{Arc, PoisonError, RwLock};

use crate::error::ConfigError;

/// Depth covered by a fresh cache.
pub const DEFAULT_DEPTH: usize = 64;

/// Extra depth added on every growth.
const GROWTH_SLACK: usize = 8;

/// Immutable snapshot of indentations for depths `0..=depth()`.
#[derive(Debug)]
pub struct IndentTable {
    buf: Box<[u8]>,
    step: usize,
    depth: usize,
}

/// Buffer length for `depth` levels of `step` bytes, if addressable.
#[inline]
fn table_len(step: usize, depth: usize) -> Option<usize> {
    depth.checked_mul(step)?.checked_add(1)
}

impl IndentTable {
    fn build(unit: &[u8], multiplier: usize, depth: usize) -> Option<Self> {
        let step = unit.len().checked_mul(multiplier)?;
        let mut buf = Vec::with_capacity(table_len(step, depth)?);
        buf.push(b'\n');
        for _ in 0..depth * multiplier {
            buf.extend_from_slice(unit);
        }
        Some(IndentTable {
            buf: buf.into_boxed_slice(),
            step,
            depth,
        })
    }

    /// Extend `self` to `depth`, reusing its bytes.
    fn extend(&self, unit: &[u8], multiplier: usize, depth: usize) -> Option<Self> {
        let mut buf = Vec::with_capacity(table_len(self.step, depth)?);
        buf.extend_from_slice(&self.buf);
        for _ in 0..(depth - self.depth) * multiplier {
            buf.extend_from_slice(unit);
        }
        Some(IndentTable {
            buf: buf.into_boxed_slice(),
            step: self.step,
            depth,
        })
    }

    /// Deepest level this table covers.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Indentation for `depth`, if covered.
    #[inline]
    pub fn get(&self, depth: usize) -> Option<&[u8]> {
        if depth <= self.depth {
            Some(&self.buf[..1 + depth * self.step])
        } else {
            None
        }
    }
}

/// Shared, grow-on-demand indentation table for one printer.
#[derive(Debug)]
pub struct IndentCache {
    unit: Box<[u8]>,
    multiplier: usize,
    table: RwLock<Arc<IndentTable>>,
}

impl IndentCache {
    /// Create a cache for the given character and per-level repeat count.
    pub fn new(character: char, multiplier: usize) -> Result<Self, ConfigError> {
        let mut utf8 = [0u8; 4];
        let unit: Box<[u8]> = character.encode_utf8(&mut utf8).as_bytes().into();
        let table = IndentTable::build(&unit, multiplier, DEFAULT_DEPTH)
            .ok_or(ConfigError::IndentationOutOfRange { multiplier })?;
        Ok(IndentCache {
            unit,
            multiplier,
            table: RwLock::new(Arc::new(table)),
        })
    }

    /// Current table.
    #[inline]
    pub fn snapshot(&self) -> Arc<IndentTable> {
        Arc::clone(&self.table.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Make sure `depth` is covered, returning a table that covers it.
    /// `None` when the table for `depth` would not be addressable.
    pub fn grow(&self, depth: usize) -> Option<Arc<IndentTable>> {
        let mut current = self.table.write().unwrap_or_else(PoisonError::into_inner);
        if current.depth() < depth {
            let target = depth.checked_add(GROWTH_SLACK)?;
            let grown = current.extend(&self.unit, self.multiplier, target)?;
            *current = Arc::new(grown);
        }
        Some(Arc::clone(&current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tabs() {
        let cache = IndentCache::new('\t', 1).unwrap();
        let table = cache.snapshot();
        assert_eq!(table.depth(), DEFAULT_DEPTH);
        assert_eq!(table.get(0), Some(&b"\n"[..]));
        assert_eq!(table.get(2), Some(&b"\n\t\t"[..]));
    }

    #[test]
    fn test_multiplier_and_wide_char() {
        let cache = IndentCache::new(' ', 2).unwrap();
        assert_eq!(cache.snapshot().get(3).map(<[u8]>::len), Some(7));

        let cache = IndentCache::new('\u{3000}', 1).unwrap();
        let table = cache.snapshot();
        assert_eq!(table.get(1), Some("\n\u{3000}".as_bytes()));
    }

    #[test]
    fn test_grow_keeps_old_snapshot_valid() {
        let cache = IndentCache::new(' ', 1).unwrap();
        let old = cache.snapshot();
        let grown = cache.grow(100).unwrap();
        assert_eq!(grown.depth(), 108);
        assert_eq!(grown.get(100).map(<[u8]>::len), Some(101));
        assert_eq!(old.get(64).map(<[u8]>::len), Some(65));
        assert!(old.get(65).is_none());
        assert_eq!(cache.snapshot().depth(), 108);
    }

    #[test]
    fn test_grow_is_noop_when_covered() {
        let cache = IndentCache::new('\t', 1).unwrap();
        assert_eq!(cache.grow(10).unwrap().depth(), DEFAULT_DEPTH);
    }

    #[test]
    fn test_concurrent_growth() {
        let cache = IndentCache::new('\t', 1).unwrap();
        std::thread::scope(|scope| {
            for depth in [70, 90, 200, 80] {
                let cache = &cache;
                scope.spawn(move || {
                    let table = cache.grow(depth).unwrap();
                    assert!(table.get(depth).is_some());
                });
            }
        });
        assert!(cache.snapshot().depth() >= 200);
    }

    #[test]
    fn test_unaddressable_multiplier_rejected() {
        let err = IndentCache::new('\u{3000}', usize::MAX / 2).unwrap_err();
        assert_eq!(err, ConfigError::IndentationOutOfRange { multiplier: usize::MAX / 2 });
    }

    #[test]
    fn test_unaddressable_depth_not_grown() {
        let cache = IndentCache::new('\t', 4).unwrap();
        assert!(cache.grow(usize::MAX / 2).is_none());
        assert!(cache.grow(usize::MAX).is_none());
        assert_eq!(cache.snapshot().depth(), DEFAULT_DEPTH);
    }
}
