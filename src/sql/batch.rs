//! INSERT batcher (C6).
//!
//! Accumulates formatted row tuples per target table and emits
//! `INSERT INTO \`table\` VALUES (…),(…),…;` once the accumulated statement
//! would exceed a soft size cap, or when the stream ends. On any I/O error
//! the batcher aborts without flushing a partial statement.

use crate::error::{Error, Result};
use std::io::Write;

/// Default soft cap on one INSERT statement's encoded size (spec.md §4.6).
pub const DEFAULT_CAP: usize = 1024 * 1024;

pub struct Batcher<W: Write> {
    writer: W,
    table: String,
    cap: usize,
    pending: Vec<Vec<u8>>,
    pending_len: usize,
    wrote_any_statement: bool,
}

impl<W: Write> Batcher<W> {
    pub fn new(table: impl Into<String>, writer: W) -> Self {
        Self::with_cap(table, writer, DEFAULT_CAP)
    }

    pub fn with_cap(table: impl Into<String>, writer: W, cap: usize) -> Self {
        Batcher {
            writer,
            table: table.into(),
            cap,
            pending: Vec::new(),
            pending_len: 0,
            wrote_any_statement: false,
        }
    }

    /// Queues one formatted row tuple, e.g. `b"(1,'x',NULL)"`, flushing a
    /// statement first if this row would push the batch over the cap.
    pub fn push_row(&mut self, row: Vec<u8>) -> Result<()> {
        let added = row.len() + 1; // account for the joining comma
        if !self.pending.is_empty() && self.pending_len + added > self.cap {
            self.flush()?;
        }
        self.pending_len += added;
        self.pending.push(row);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        if self.wrote_any_statement {
            writeln!(self.writer).map_err(Error::Io)?;
        }
        write!(self.writer, "INSERT INTO `{}` VALUES ", self.table).map_err(Error::Io)?;
        for (i, row) in self.pending.iter().enumerate() {
            if i > 0 {
                write!(self.writer, ",").map_err(Error::Io)?;
            }
            self.writer.write_all(row).map_err(Error::Io)?;
        }
        writeln!(self.writer, ";").map_err(Error::Io)?;
        self.pending.clear();
        self.pending_len = 0;
        self.wrote_any_statement = true;
        Ok(())
    }

    /// Flushes any remaining rows. The only path that emits a final partial
    /// batch — a killed process never leaves a half-written `INSERT`.
    pub fn finish(mut self) -> Result<W> {
        self.flush()?;
        self.writer.flush().map_err(Error::Io)?;
        Ok(self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_one_statement_for_a_small_batch() {
        let mut batcher = Batcher::new("page", Vec::new());
        batcher.push_row(b"(1,'a')".to_vec()).unwrap();
        batcher.push_row(b"(2,'b')".to_vec()).unwrap();
        let out = batcher.finish().unwrap();
        let out = String::from_utf8(out).unwrap();
        assert_eq!(out, "INSERT INTO `page` VALUES (1,'a'),(2,'b');\n");
    }

    #[test]
    fn splits_into_multiple_statements_past_the_cap() {
        let mut batcher = Batcher::with_cap("revision", Vec::new(), 10);
        for i in 0..5 {
            batcher.push_row(format!("({})", i).into_bytes()).unwrap();
        }
        let out = batcher.finish().unwrap();
        let out = String::from_utf8(out).unwrap();
        let statements: Vec<_> = out.trim_end().split("\n\n").collect();
        assert!(statements.len() > 1, "expected more than one INSERT statement: {out}");
        for s in &statements {
            assert!(s.starts_with("INSERT INTO `revision` VALUES "));
            assert!(s.ends_with(';'));
        }
    }

    #[test]
    fn empty_batch_writes_nothing() {
        let batcher: Batcher<Vec<u8>> = Batcher::new("text", Vec::new());
        let out = batcher.finish().unwrap();
        assert!(out.is_empty());
    }
}
