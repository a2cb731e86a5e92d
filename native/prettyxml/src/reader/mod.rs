//! Stream Input
//!
//! The engine needs random access over the exact range it formats, so a
//! stream is read into memory under a mark and rewound afterwards:
//! - MarkedReader: mark / read N bytes / reset over any `Read + Seek`

pub mod marked;

pub use marked::MarkedReader;
