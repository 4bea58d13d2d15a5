//! MediaWiki element assembler (C4).
//!
//! Consumes [`crate::scanner::Scanner`] events and recognizes the subset of
//! `<mediawiki><page>…<revision>…</revision>…</page></mediawiki>` the
//! `page`/`revision`/`text` tables need. Generalizes the teacher crate's
//! one-revision-per-page `Page` into [`RawPage`] with a `Vec<RawRevision>`,
//! since stub dumps with full history carry many revisions per page.

use crate::error::{Error, Result};
use crate::model::{RawPage, RawRevision};
use crate::scanner::{local_name, Scanner, XmlEvent};
use std::io::BufRead;

/// Iterates the `<page>` elements of one MediaWiki export stream.
pub struct PageReader<R: BufRead> {
    scanner: Scanner<R>,
    started: bool,
}

impl<R: BufRead> PageReader<R> {
    pub fn new(source: R) -> Self {
        PageReader {
            scanner: Scanner::new(source),
            started: false,
        }
    }

    fn err(&self, reason: impl Into<String>) -> Error {
        Error::Xml {
            offset: self.scanner.offset(),
            reason: reason.into(),
        }
    }

    fn next_event(&mut self) -> Result<XmlEvent> {
        self.scanner
            .next_event()?
            .ok_or_else(|| self.err("unexpected end of input"))
    }

    /// Finds the `<mediawiki>` root, ignoring its namespace declaration so
    /// every schema version 0.5 through 0.10 is accepted uniformly.
    fn find_root(&mut self) -> Result<()> {
        loop {
            match self.scanner.next_event()? {
                None => return Err(self.err("no <mediawiki> root element found")),
                Some(XmlEvent::StartTag { name, .. }) => {
                    if local_name(&name) == b"mediawiki" {
                        return Ok(());
                    }
                    return Err(self.err("expected <mediawiki> as the root element"));
                }
                _ => continue,
            }
        }
    }

    fn skip_element(&mut self) -> Result<()> {
        let mut depth = 0usize;
        loop {
            match self.next_event()? {
                XmlEvent::StartTag { .. } => depth += 1,
                XmlEvent::EndTag { .. } => {
                    if depth == 0 {
                        return Ok(());
                    }
                    depth -= 1;
                }
                XmlEvent::Text(_) => {}
            }
        }
    }

    /// Reads the text content of a leaf element and its closing tag.
    fn read_text(&mut self) -> Result<String> {
        match self.next_event()? {
            XmlEvent::Text(bytes) => {
                let text = String::from_utf8_lossy(&bytes).into_owned();
                match self.next_event()? {
                    XmlEvent::EndTag { .. } => Ok(text),
                    _ => Err(self.err("expected closing tag after text content")),
                }
            }
            XmlEvent::EndTag { .. } => Ok(String::new()),
            XmlEvent::StartTag { .. } => Err(self.err("expected text content, found nested element")),
        }
    }

    fn attr<'a>(attrs: &'a [(Vec<u8>, Vec<u8>)], key: &[u8]) -> Option<&'a [u8]> {
        attrs
            .iter()
            .find(|(k, _)| local_name(k) == key)
            .map(|(_, v)| v.as_slice())
    }

    fn parse_contributor(&mut self, deleted: bool) -> Result<(u32, String, bool)> {
        if deleted {
            self.skip_element()?;
            return Ok((0, String::new(), true));
        }
        let mut id = None;
        let mut username = None;
        let mut ip = None;
        loop {
            match self.next_event()? {
                XmlEvent::EndTag { .. } => break,
                XmlEvent::StartTag { name, .. } => match local_name(&name) {
                    b"id" => {
                        let text = self.read_text()?;
                        id = Some(text.parse::<u32>().map_err(|_| self.err("invalid contributor id"))?);
                    }
                    b"username" => username = Some(self.read_text()?),
                    b"ip" => ip = Some(self.read_text()?),
                    _ => self.skip_element()?,
                },
                XmlEvent::Text(_) => {}
            }
        }
        match id {
            Some(id) => Ok((id, username.unwrap_or_default(), false)),
            None => match ip {
                Some(ip) => Ok((0, ip, false)),
                None => Ok((0, String::new(), false)),
            },
        }
    }

    fn parse_text_element(
        &mut self,
        attrs: &[(Vec<u8>, Vec<u8>)],
    ) -> Result<(Option<String>, Option<u32>, Option<u32>, bool)> {
        let attr_deleted = Self::attr(attrs, b"deleted") == Some(b"deleted");
        let bytes_attr = Self::attr(attrs, b"bytes")
            .and_then(|v| std::str::from_utf8(v).ok())
            .and_then(|v| v.parse::<u32>().ok());
        let source_id_attr = Self::attr(attrs, b"id")
            .and_then(|v| std::str::from_utf8(v).ok())
            .and_then(|v| v.parse::<u32>().ok());
        let mut content = None;
        let mut deleted = attr_deleted;
        loop {
            match self.next_event()? {
                XmlEvent::EndTag { .. } => break,
                XmlEvent::Text(bytes) => {
                    content = Some(String::from_utf8_lossy(&bytes).into_owned());
                }
                XmlEvent::StartTag { name, .. } => {
                    if local_name(&name) == b"deleted" {
                        deleted = true;
                    }
                    self.skip_element()?;
                }
            }
        }
        if deleted {
            content = None;
        }
        Ok((content, bytes_attr, source_id_attr, deleted))
    }

    fn parse_revision(&mut self) -> Result<RawRevision> {
        let mut rev_id = None;
        let mut parent_id = 0u32;
        let mut timestamp = None;
        let mut user_id = 0u32;
        let mut user_text = String::new();
        let mut user_deleted = false;
        let mut comment = String::new();
        let mut comment_deleted = false;
        let mut minor = false;
        let mut model = None;
        let mut format = None;
        let mut sha1 = None;
        let mut text = None;
        let mut text_bytes_attr = None;
        let mut source_text_id = None;
        let mut text_deleted = false;

        loop {
            match self.next_event()? {
                XmlEvent::EndTag { .. } => break,
                XmlEvent::Text(_) => {}
                XmlEvent::StartTag { name, attrs } => match local_name(&name) {
                    b"id" => {
                        let v = self.read_text()?;
                        rev_id = Some(v.parse::<u32>().map_err(|_| self.err("invalid revision id"))?);
                    }
                    b"parentid" => {
                        let v = self.read_text()?;
                        parent_id = v.parse::<u32>().unwrap_or(0);
                    }
                    b"timestamp" => timestamp = Some(self.read_text()?),
                    b"minor" => {
                        let _ = self.read_text()?;
                        minor = true;
                    }
                    b"comment" => {
                        comment_deleted = Self::attr(&attrs, b"deleted") == Some(b"deleted");
                        let v = self.read_text()?;
                        comment = if comment_deleted { String::new() } else { v };
                    }
                    b"contributor" => {
                        let deleted = Self::attr(&attrs, b"deleted") == Some(b"deleted");
                        let (id, text, del) = self.parse_contributor(deleted)?;
                        user_id = id;
                        user_text = text;
                        user_deleted = del;
                    }
                    b"model" => model = Some(self.read_text()?),
                    b"format" => format = Some(self.read_text()?),
                    b"sha1" => {
                        let v = self.read_text()?;
                        sha1 = if v.is_empty() { None } else { Some(v) };
                    }
                    b"text" => {
                        let (content, bytes_attr, source_id, deleted) =
                            self.parse_text_element(&attrs)?;
                        text = content.map(|s| s.into_bytes());
                        text_bytes_attr = bytes_attr;
                        source_text_id = source_id;
                        text_deleted = deleted;
                    }
                    _ => self.skip_element()?,
                },
            }
        }

        Ok(RawRevision {
            rev_id: rev_id.ok_or_else(|| self.err("revision missing <id>"))?,
            parent_id,
            timestamp: timestamp.ok_or_else(|| self.err("revision missing <timestamp>"))?,
            user_id,
            user_text,
            comment,
            minor,
            // Pre-1.21 dumps omit <model>/<format> entirely.
            model: model.unwrap_or_else(|| "wikitext".to_string()),
            format: format.unwrap_or_else(|| "text/x-wiki".to_string()),
            sha1,
            text,
            text_bytes_attr,
            source_text_id,
            text_deleted,
            comment_deleted,
            user_deleted,
        })
    }

    fn parse_page(&mut self) -> Result<RawPage> {
        let mut page_id = None;
        let mut namespace = None;
        let mut title = None;
        let mut restrictions = String::new();
        let mut is_redirect = false;
        let mut revisions = Vec::new();

        loop {
            match self.next_event()? {
                XmlEvent::EndTag { .. } => break,
                XmlEvent::Text(_) => {}
                XmlEvent::StartTag { name, .. } => match local_name(&name) {
                    b"id" => {
                        let v = self.read_text()?;
                        page_id = Some(v.parse::<u32>().map_err(|_| self.err("invalid page id"))?);
                    }
                    b"ns" => {
                        let v = self.read_text()?;
                        namespace = Some(v.parse::<i16>().map_err(|_| self.err("invalid namespace"))?);
                    }
                    b"title" => title = Some(self.read_text()?),
                    b"restrictions" => restrictions = self.read_text()?,
                    b"redirect" => {
                        is_redirect = true;
                        // `<redirect title="..."/>` is always empty, expands to Start+End.
                        match self.next_event()? {
                            XmlEvent::EndTag { .. } => {}
                            _ => self.skip_element()?,
                        }
                    }
                    b"revision" => revisions.push(self.parse_revision()?),
                    _ => self.skip_element()?,
                },
            }
        }

        Ok(RawPage {
            page_id: page_id.ok_or_else(|| self.err("page missing <id>"))?,
            namespace: namespace.unwrap_or(0),
            title: title.ok_or_else(|| self.err("page missing <title>"))?,
            restrictions,
            is_redirect,
            revisions,
        })
    }
}

impl<R: BufRead> Iterator for PageReader<R> {
    type Item = Result<RawPage>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.started {
            if let Err(e) = self.find_root() {
                self.started = true;
                return Some(Err(e));
            }
            self.started = true;
        }
        loop {
            match self.scanner.next_event() {
                Err(e) => return Some(Err(e)),
                Ok(None) => return None,
                Ok(Some(XmlEvent::EndTag { .. })) => return None,
                Ok(Some(XmlEvent::StartTag { name, .. })) => {
                    if local_name(&name) == b"page" {
                        return Some(self.parse_page());
                    }
                    if let Err(e) = self.skip_element() {
                        return Some(Err(e));
                    }
                }
                Ok(Some(XmlEvent::Text(_))) => continue,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn pages(xml: &str) -> Vec<RawPage> {
        let reader = PageReader::new(Cursor::new(xml.as_bytes().to_vec()));
        reader.map(|r| r.unwrap()).collect()
    }

    const MINIMAL: &str = concat!(
        r#"<mediawiki xmlns="http://www.mediawiki.org/xml/export-0.10/">"#,
        "<siteinfo><sitename>Wiki</sitename></siteinfo>",
        "<page>",
        "<title>Main Page</title>",
        "<ns>0</ns>",
        "<id>1</id>",
        "<revision>",
        "<id>10</id>",
        "<timestamp>2013-01-15T12:00:00Z</timestamp>",
        "<contributor><id>2</id><username>Bob</username></contributor>",
        "<comment>initial</comment>",
        "<model>wikitext</model>",
        "<format>text/x-wiki</format>",
        "<text bytes=\"5\" id=\"1\">Hello</text>",
        "</revision>",
        "</page>",
        "</mediawiki>"
    );

    #[test]
    fn parses_minimal_page() {
        let ps = pages(MINIMAL);
        assert_eq!(ps.len(), 1);
        let p = &ps[0];
        assert_eq!(p.page_id, 1);
        assert_eq!(p.namespace, 0);
        assert_eq!(p.title, "Main Page");
        assert_eq!(p.revisions.len(), 1);
        let r = &p.revisions[0];
        assert_eq!(r.rev_id, 10);
        assert_eq!(r.user_id, 2);
        assert_eq!(r.user_text, "Bob");
        assert_eq!(r.text.as_deref(), Some(&b"Hello"[..]));
    }

    #[test]
    fn ip_contributor_has_no_user_id() {
        let xml = concat!(
            r#"<mediawiki xmlns="http://www.mediawiki.org/xml/export-0.10/">"#,
            "<page><title>T</title><ns>0</ns><id>1</id>",
            "<revision><id>1</id><timestamp>2013-01-15T12:00:00Z</timestamp>",
            "<contributor><ip>192.0.2.1</ip></contributor>",
            "<text bytes=\"1\" id=\"1\">x</text></revision></page></mediawiki>"
        );
        let ps = pages(xml);
        assert_eq!(ps[0].revisions[0].user_id, 0);
        assert_eq!(ps[0].revisions[0].user_text, "192.0.2.1");
    }

    #[test]
    fn deleted_text_marker_yields_no_content() {
        let xml = concat!(
            r#"<mediawiki xmlns="http://www.mediawiki.org/xml/export-0.10/">"#,
            "<page><title>T</title><ns>0</ns><id>1</id>",
            "<revision><id>1</id><timestamp>2013-01-15T12:00:00Z</timestamp>",
            "<contributor><ip>192.0.2.1</ip></contributor>",
            "<text><deleted/></text></revision></page></mediawiki>"
        );
        let ps = pages(xml);
        assert!(ps[0].revisions[0].text.is_none());
        assert!(ps[0].revisions[0].text_deleted);
    }

    #[test]
    fn namespace_agnostic_root_accepts_any_schema_version() {
        let xml = concat!(
            r#"<mediawiki xmlns="http://www.mediawiki.org/xml/export-0.5/">"#,
            "<page><title>T</title><ns>0</ns><id>1</id>",
            "<revision><id>1</id><timestamp>2013-01-15T12:00:00Z</timestamp>",
            "<contributor><ip>192.0.2.1</ip></contributor>",
            "<text bytes=\"1\" id=\"1\">x</text></revision></page></mediawiki>"
        );
        assert_eq!(pages(xml).len(), 1);
    }
}
