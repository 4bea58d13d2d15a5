//! Dual-stream join driver (C8) — the central algorithm.
//!
//! Drives the stub stream as the spine. For each page: emit one page row.
//! For each of its revisions, advance the content stream until a matching
//! `rev_id` is found, handling both directions of desync, then combine,
//! derive the SHA-1 if absent, allocate a `text_id`, and emit text,
//! revision, and page rows (spec.md §4.8).

use crate::assembler::PageReader;
use crate::digest::{sha1_base36, validate_source_sha1};
use crate::error::{Error, Result};
use crate::model::{deleted, Page, RawPage, RawRevision, Revision, Text};
use crate::policy::SchemaVariant;
use crate::sql::batch::Batcher;
use crate::sql::escape::{format_row, Value};
use std::collections::HashSet;
use std::io::BufRead;
use std::io::Write;

/// How many revisions the content stream may run ahead of or behind the
/// stub stream before the join is declared unrecoverable (spec.md §4.8).
pub const DEFAULT_DESYNC_TOLERANCE: u32 = 1000;

/// Per-category counters threaded through the driver by mutable reference.
/// Not global state (spec.md §9) — one instance lives on the driver's
/// stack for the duration of a single run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Counters {
    pub pages_emitted: u64,
    pub revisions_emitted: u64,
    pub revisions_missing_content: u64,
    pub orphan_content_revisions: u64,
    pub duplicate_text_ids_skipped: u64,
    pub malformed_records_skipped: u64,
}

/// Buffers one page's worth of content-stream revisions at a time and
/// exposes them as a flat, peekable sequence — "one `current_record`
/// struct per stream, never a queue" (spec.md §9).
struct ContentCursor<R: BufRead> {
    pages: PageReader<R>,
    pending: std::vec::IntoIter<RawRevision>,
    current: Option<RawRevision>,
    exhausted: bool,
}

impl<R: BufRead> ContentCursor<R> {
    fn new(pages: PageReader<R>) -> Self {
        ContentCursor {
            pages,
            pending: Vec::new().into_iter(),
            current: None,
            exhausted: false,
        }
    }

    fn refill(&mut self, counters: &mut Counters) -> Result<()> {
        loop {
            if let Some(rev) = self.pending.next() {
                self.current = Some(rev);
                return Ok(());
            }
            match self.pages.next() {
                None => {
                    self.exhausted = true;
                    self.current = None;
                    return Ok(());
                }
                Some(Err(e)) => {
                    counters.malformed_records_skipped += 1;
                    log::warn!("skipping malformed page in content stream: {e}");
                    continue;
                }
                Some(Ok(RawPage { revisions, .. })) => {
                    self.pending = revisions.into_iter();
                }
            }
        }
    }

    /// Returns the current revision without consuming it, pulling more
    /// input if necessary.
    fn peek(&mut self, counters: &mut Counters) -> Result<Option<&RawRevision>> {
        if self.current.is_none() && !self.exhausted {
            self.refill(counters)?;
        }
        Ok(self.current.as_ref())
    }

    fn advance(&mut self, counters: &mut Counters) -> Result<()> {
        self.current = None;
        self.refill(counters)
    }
}

fn reformat_timestamp(iso: &str) -> Option<String> {
    // "YYYY-MM-DDTHH:MM:SSZ" -> "YYYYMMDDHHMMSS"
    let bytes = iso.as_bytes();
    if bytes.len() < 20 || bytes[4] != b'-' || bytes[7] != b'-' || bytes[10] != b'T' {
        return None;
    }
    let mut out = String::with_capacity(14);
    out.push_str(&iso[0..4]);
    out.push_str(&iso[5..7]);
    out.push_str(&iso[8..10]);
    out.push_str(&iso[11..13]);
    out.push_str(&iso[14..16]);
    out.push_str(&iso[17..19]);
    if out.len() == 14 && out.bytes().all(|b| b.is_ascii_digit()) {
        Some(out)
    } else {
        None
    }
}

struct Tables<W1: Write, W2: Write, W3: Write> {
    page: Batcher<W1>,
    revision: Batcher<W2>,
    text: Batcher<W3>,
}

/// Runs the full join: stub + content streams in, three batched writers
/// out. Returns the end-of-run counters on success.
pub fn run<R1: BufRead, R2: BufRead, W1: Write, W2: Write, W3: Write>(
    stub: PageReader<R1>,
    content: PageReader<R2>,
    page_out: W1,
    revision_out: W2,
    text_out: W3,
    schema: &SchemaVariant,
    start_id: u32,
) -> Result<Counters> {
    run_with_tolerance(
        stub,
        content,
        page_out,
        revision_out,
        text_out,
        schema,
        start_id,
        DEFAULT_DESYNC_TOLERANCE,
    )
}

pub fn run_with_tolerance<R1: BufRead, R2: BufRead, W1: Write, W2: Write, W3: Write>(
    stub: PageReader<R1>,
    content: PageReader<R2>,
    page_out: W1,
    revision_out: W2,
    text_out: W3,
    schema: &SchemaVariant,
    start_id: u32,
    desync_tolerance: u32,
) -> Result<Counters> {
    let mut counters = Counters::default();
    let mut content = ContentCursor::new(content);
    let mut seen_source_text_ids: HashSet<u32> = HashSet::new();
    let mut next_text_id = start_id;

    let mut tables = Tables {
        page: Batcher::new("page", page_out),
        revision: Batcher::new("revision", revision_out),
        text: Batcher::new("text", text_out),
    };

    for page in stub {
        let page = match page {
            Ok(p) => p,
            Err(e) => {
                counters.malformed_records_skipped += 1;
                log::warn!("skipping malformed page in stub stream: {e}");
                continue;
            }
        };
        process_page(
            page,
            &mut content,
            &mut tables,
            schema,
            &mut next_text_id,
            &mut seen_source_text_ids,
            &mut counters,
            desync_tolerance,
        )?;
        counters.pages_emitted += 1;
        if counters.pages_emitted % 10_000 == 0 {
            log::info!(
                "{} pages, {} revisions emitted",
                counters.pages_emitted,
                counters.revisions_emitted
            );
        }
    }

    // Any content-stream revisions left over are orphans of the join as a
    // whole, not individual desyncs; still worth a warning count.
    while let Some(_) = content.peek(&mut counters)? {
        counters.orphan_content_revisions += 1;
        content.advance(&mut counters)?;
    }

    tables.page.finish()?;
    tables.revision.finish()?;
    tables.text.finish()?;

    log::info!(
        "done: {} pages, {} revisions ({} missing content, {} orphaned, {} duplicate text ids, {} malformed skipped)",
        counters.pages_emitted,
        counters.revisions_emitted,
        counters.revisions_missing_content,
        counters.orphan_content_revisions,
        counters.duplicate_text_ids_skipped,
        counters.malformed_records_skipped,
    );

    Ok(counters)
}

#[allow(clippy::too_many_arguments)]
fn process_page<R2: BufRead, W1: Write, W2: Write, W3: Write>(
    page: RawPage,
    content: &mut ContentCursor<R2>,
    tables: &mut Tables<W1, W2, W3>,
    schema: &SchemaVariant,
    next_text_id: &mut u32,
    seen_source_text_ids: &mut HashSet<u32>,
    counters: &mut Counters,
    desync_tolerance: u32,
) -> Result<()> {
    let mut latest_rev_id = 0u32;
    let mut page_len = 0u32;

    for stub_rev in page.revisions {
        let matched = loop {
            // Skip any content-stream revision whose source text id we've
            // already consumed once (spec.md §3, §9: keep first, discard
            // the rest).
            if let Some(peeked) = content.peek(counters)? {
                if let Some(source_id) = peeked.source_text_id {
                    if seen_source_text_ids.contains(&source_id) {
                        counters.duplicate_text_ids_skipped += 1;
                        content.advance(counters)?;
                        continue;
                    }
                }
            }
            match content.peek(counters)?.map(|r| r.rev_id) {
                None => break None,
                Some(content_id) if content_id == stub_rev.rev_id => {
                    let rev = content.advance_and_take(counters)?;
                    break rev;
                }
                Some(content_id) if content_id < stub_rev.rev_id => {
                    counters.orphan_content_revisions += 1;
                    content.advance(counters)?;
                    continue;
                }
                Some(content_id) => {
                    // content_id > stub_rev.rev_id: content has run ahead;
                    // the stub's revision simply has no content.
                    let distance = content_id.saturating_sub(stub_rev.rev_id);
                    if distance > desync_tolerance {
                        return Err(Error::JoinDesync {
                            stub_rev: stub_rev.rev_id,
                            content_rev: content_id,
                            distance,
                        });
                    }
                    break None;
                }
            }
        };

        let (combined, had_content) = match matched {
            Some(content_rev) => (merge_revision(stub_rev.clone(), content_rev), true),
            None => {
                counters.revisions_missing_content += 1;
                log::warn!(
                    "revision {} in page {} has no matching content",
                    stub_rev.rev_id,
                    page.page_id
                );
                (stub_rev, false)
            }
        };

        if let Some(source_id) = combined.source_text_id {
            if had_content {
                seen_source_text_ids.insert(source_id);
            }
        }

        let text_id = *next_text_id;
        *next_text_id += 1;

        let text_bytes = combined.text.clone().unwrap_or_default();
        let row_len = combined
            .text_bytes_attr
            .unwrap_or(text_bytes.len() as u32);

        let mut deleted_flags = 0u8;
        if combined.text.is_none() {
            deleted_flags |= deleted::TEXT;
        }
        if combined.comment_deleted {
            deleted_flags |= deleted::COMMENT;
        }
        if combined.user_deleted {
            deleted_flags |= deleted::USER;
        }

        let sha1_b36 = combined
            .sha1
            .as_deref()
            .and_then(validate_source_sha1)
            .unwrap_or_else(|| sha1_base36(&text_bytes));

        let timestamp = reformat_timestamp(&combined.timestamp)
            .ok_or_else(|| Error::Internal(format!("bad timestamp: {}", combined.timestamp)))?;

        let text_record = Text {
            text_id,
            content: text_bytes,
            flags: "utf-8".to_string(),
        };
        let revision_record = Revision {
            rev_id: combined.rev_id,
            page_id: page.page_id,
            text_id,
            comment: combined.comment,
            user_id: combined.user_id,
            user_text: combined.user_text,
            timestamp,
            minor: combined.minor,
            deleted_flags,
            len: row_len,
            parent_id: combined.parent_id,
            sha1_b36,
            model: combined.model,
            format: combined.format,
        };

        write_text_row(&mut tables.text, &text_record)?;
        write_revision_row(&mut tables.revision, schema, &revision_record)?;

        latest_rev_id = revision_record.rev_id;
        page_len = row_len;
        counters.revisions_emitted += 1;
    }

    let page_record = Page {
        page_id: page.page_id,
        namespace: page.namespace,
        title: page.title,
        restrictions: page.restrictions,
        is_redirect: page.is_redirect,
        latest_rev_id,
        len: page_len,
    };
    write_page_row(&mut tables.page, &page_record)?;
    Ok(())
}

impl<R: BufRead> ContentCursor<R> {
    fn advance_and_take(&mut self, counters: &mut Counters) -> Result<Option<RawRevision>> {
        let rev = self.current.take();
        self.refill(counters)?;
        Ok(rev)
    }
}

fn merge_revision(stub: RawRevision, content: RawRevision) -> RawRevision {
    // The stub stream carries the authoritative metadata; only the
    // content stream's text (and whatever it alone saw fit to include)
    // is folded in.
    RawRevision {
        text: content.text,
        text_bytes_attr: stub.text_bytes_attr.or(content.text_bytes_attr),
        source_text_id: content.source_text_id,
        text_deleted: stub.text_deleted || content.text_deleted,
        sha1: stub.sha1.or(content.sha1),
        ..stub
    }
}

fn write_text_row<W: Write>(batcher: &mut Batcher<W>, text: &Text) -> Result<()> {
    let row = format_row(&[
        Value::UInt(text.text_id as u64),
        Value::str(text.content.clone()),
        Value::str(text.flags.clone()),
    ]);
    batcher.push_row(row)
}

fn write_revision_row<W: Write>(
    batcher: &mut Batcher<W>,
    schema: &SchemaVariant,
    rev: &Revision,
) -> Result<()> {
    let mut values = vec![
        Value::UInt(rev.rev_id as u64),
        Value::UInt(rev.page_id as u64),
        Value::UInt(rev.text_id as u64),
        Value::str(rev.comment.clone()),
        Value::UInt(rev.user_id as u64),
        Value::str(rev.user_text.clone()),
        Value::str(rev.timestamp.clone()),
        Value::UInt(rev.minor as u64),
        Value::UInt(rev.deleted_flags as u64),
    ];
    for col in schema.revision.iter().skip(9) {
        values.push(match col.name {
            "rev_len" => Value::UInt(rev.len as u64),
            "rev_parent_id" => {
                if rev.parent_id == 0 {
                    Value::Null
                } else {
                    Value::UInt(rev.parent_id as u64)
                }
            }
            "rev_sha1" => Value::str(rev.sha1_b36.clone()),
            "rev_content_model" => Value::str(rev.model.clone()),
            "rev_content_format" => Value::str(rev.format.clone()),
            _ => Value::Null,
        });
    }
    let row = format_row(&values);
    batcher.push_row(row)
}

fn write_page_row<W: Write>(batcher: &mut Batcher<W>, page: &Page) -> Result<()> {
    let row = format_row(&[
        Value::UInt(page.page_id as u64),
        Value::Int(page.namespace as i64),
        Value::str(page.title.clone()),
        Value::str(page.restrictions.clone()),
        Value::UInt(page.is_redirect as u64),
        Value::UInt(0), // page_is_new: not derivable from a single dump pass
        Value::UInt(0), // page_random: assigned by MediaWiki itself, not meaningful here
        Value::str(String::new()), // page_touched: unknown without a live wiki
        Value::UInt(page.latest_rev_id as u64),
        Value::UInt(page.len as u64),
    ]);
    batcher.push_row(row)
}
