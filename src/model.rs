//! The data model (spec.md §3): `Page`, `Revision`, `Text`, and the
//! per-stream record staged while the assembler walks one `<page>` element.

/// Bitmask for `Revision::deleted_flags`. Only the text flag reflects an
/// actual public-dump redaction (`<text><deleted/></text>`); the comment
/// and user flags are carried for completeness when a dump does mark them.
pub mod deleted {
    pub const TEXT: u8 = 1;
    pub const COMMENT: u8 = 2;
    pub const USER: u8 = 4;
}

/// One row of the `page` table, ready to be formatted and batched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub page_id: u32,
    pub namespace: i16,
    pub title: String,
    pub restrictions: String,
    pub is_redirect: bool,
    pub latest_rev_id: u32,
    pub len: u32,
}

/// One row of the `revision` table, ready to be formatted and batched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    pub rev_id: u32,
    pub page_id: u32,
    pub text_id: u32,
    pub comment: String,
    pub user_id: u32,
    pub user_text: String,
    pub timestamp: String,
    pub minor: bool,
    pub deleted_flags: u8,
    pub len: u32,
    pub parent_id: u32,
    pub sha1_b36: String,
    pub model: String,
    pub format: String,
}

/// One row of the `text` table, ready to be formatted and batched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    pub text_id: u32,
    pub content: Vec<u8>,
    pub flags: String,
}

/// One `<revision>` as read off either stream, before it has been matched
/// and assigned a `text_id`. Carries the raw, possibly-absent text content
/// read from the *content* stream, or `None` when read from the stub
/// stream (which omits it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRevision {
    pub rev_id: u32,
    pub parent_id: u32,
    pub timestamp: String,
    pub user_id: u32,
    pub user_text: String,
    pub comment: String,
    pub minor: bool,
    pub model: String,
    pub format: String,
    pub sha1: Option<String>,
    pub text: Option<Vec<u8>>,
    pub text_bytes_attr: Option<u32>,
    /// The content stream's own `<text id="N">` attribute, used only to
    /// detect duplicate text ids (spec.md §3, §9); never used as the
    /// output `text_id`, which the join driver assigns monotonically.
    pub source_text_id: Option<u32>,
    pub text_deleted: bool,
    pub comment_deleted: bool,
    pub user_deleted: bool,
}

/// One `<page>` as read off either stream, with its unmatched revisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPage {
    pub page_id: u32,
    pub namespace: i16,
    pub title: String,
    pub restrictions: String,
    pub is_redirect: bool,
    pub revisions: Vec<RawRevision>,
}
