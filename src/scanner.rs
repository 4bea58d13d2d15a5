//! Incremental XML tag scanner (C3).
//!
//! A thin, lenient wrapper around `quick_xml::Reader` — the actual pull
//! parser. No DOM is ever built; dumps are many gigabytes and the only
//! correct shape here is event-at-a-time. Unlike the teacher crate this is
//! layered on top of, tag recognition is namespace-*agnostic*: MediaWiki
//! export schema versions 0.5 through 0.10 each declare a different
//! `xmlns` on the `<mediawiki>` root, and hard-coding one (as the 0.10-only
//! upstream parser does) would reject every dump but the newest.

use crate::error::{Error, Result};
use quick_xml::events::Event as QEvent;
use quick_xml::Reader;
use std::io::BufRead;

/// One token from the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    StartTag {
        name: Vec<u8>,
        attrs: Vec<(Vec<u8>, Vec<u8>)>,
    },
    Text(Vec<u8>),
    EndTag {
        name: Vec<u8>,
    },
}

pub struct Scanner<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
}

impl<R: BufRead> Scanner<R> {
    pub fn new(source: R) -> Self {
        let mut reader = Reader::from_reader(source);
        reader.expand_empty_elements(true);
        reader.trim_text(false);
        Scanner {
            reader,
            buf: Vec::with_capacity(4096),
        }
    }

    /// Byte offset of the scanner's read cursor, for error reporting.
    pub fn offset(&self) -> usize {
        self.reader.buffer_position()
    }

    fn xml_err(&self, reason: impl Into<String>) -> Error {
        Error::Xml {
            offset: self.offset(),
            reason: reason.into(),
        }
    }

    /// Returns the next scanner event, or `None` at end of input.
    pub fn next_event(&mut self) -> Result<Option<XmlEvent>> {
        loop {
            self.buf.clear();
            // `read_event` borrows `self.buf` for the lifetime of the
            // `Event` it returns (quick-xml 0.12's buffer-reuse API), so
            // that `Event` must be fully consumed into an owned value
            // inside this block, before the borrow ends, and before the
            // length check below takes its own access to `self.buf`.
            let outcome: Outcome = {
                let event = self
                    .reader
                    .read_event(&mut self.buf)
                    .map_err(|e| self.xml_err(e.to_string()))?;
                match event {
                    QEvent::Start(e) => {
                        let name = e.name().to_vec();
                        let mut attrs = Vec::new();
                        for attr in e.attributes() {
                            let attr = attr.map_err(|e| self.xml_err(e.to_string()))?;
                            attrs.push((attr.key.to_vec(), attr.value.into_owned()));
                        }
                        Outcome::Event(XmlEvent::StartTag { name, attrs })
                    }
                    QEvent::End(e) => Outcome::Event(XmlEvent::EndTag {
                        name: e.name().to_vec(),
                    }),
                    QEvent::Text(e) | QEvent::CData(e) => {
                        let decoded = e
                            .unescape_and_decode(&self.reader)
                            .unwrap_or_else(|_| String::from_utf8_lossy(&e).into_owned());
                        Outcome::Event(XmlEvent::Text(decoded.into_bytes()))
                    }
                    QEvent::Eof => Outcome::Eof,
                    // Comments and processing instructions are skipped transparently.
                    _ => Outcome::Skip,
                }
            };

            if self.buf.len() > crate::linebuf::MAX_ELEMENT_SIZE {
                return Err(self.xml_err("element exceeded maximum size (LineTooLong)"));
            }

            match outcome {
                Outcome::Event(ev) => return Ok(Some(ev)),
                Outcome::Eof => return Ok(None),
                Outcome::Skip => continue,
            }
        }
    }
}

/// Result of decoding one `quick_xml` event, fully owned so it no longer
/// borrows the scanner's scratch buffer once produced.
enum Outcome {
    Event(XmlEvent),
    Eof,
    Skip,
}

/// Strips a namespace prefix (`foo:bar` -> `bar`), matching `local_name()`
/// semantics without requiring namespace resolution.
pub fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().position(|&b| b == b':') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}
