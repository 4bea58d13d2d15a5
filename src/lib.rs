//! Streaming transducer from MediaWiki XML export dumps to MySQL-compatible
//! SQL `INSERT` statements.
//!
//! The crate is organized as one module per stage of the pipeline: a
//! compression-transparent [`codec`], a capacity-bounded [`linebuf`], a
//! pull-based [`scanner`] over `quick_xml`, an [`assembler`] that turns
//! scanner events into [`model`] records, a [`digest`] module for
//! MediaWiki's base-36 SHA-1 encoding, an [`sql`] layer for escaping and
//! batching, a [`policy`] table of schema variants by target MediaWiki
//! version, and a [`join`] driver that combines a stub stream and a
//! content stream into the three output tables.

#![warn(missing_docs)]

pub mod assembler;
pub mod codec;
pub mod digest;
pub mod error;
pub mod join;
pub mod linebuf;
pub mod model;
pub mod policy;
pub mod scanner;
pub mod sql;

pub use error::{Error, Result};
