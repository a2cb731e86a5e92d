//! Core scanning primitives
//!
//! This module contains the building blocks of the reformat engine:
//! - Scanner: construct boundary detection using memchr
//! - Entities: predefined entity decoding for escaped markup
//! - Attributes: attribute spans for in-place value redaction
//! - Indent: shared, grow-on-demand indentation table

pub mod attributes;
pub mod entities;
pub mod indent;
pub mod scanner;
