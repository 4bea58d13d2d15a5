//! Schema-variant policy table (C9).
//!
//! Maps a target MediaWiki version to the ordered column set each output
//! table gets, plus the default value for any column the dump itself can't
//! supply. Adding support for MW 1.30+ means adding a tier here, never a
//! branch at an emission site (spec.md §4.9 / §9).

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub nullable: bool,
    /// SQL literal used when the source dump doesn't supply this column.
    pub default: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct SchemaVariant {
    pub mw_version: (u32, u32),
    pub page: &'static [ColumnSpec],
    pub revision: &'static [ColumnSpec],
    pub text: &'static [ColumnSpec],
}

const PAGE_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec { name: "page_id", nullable: false, default: "0" },
    ColumnSpec { name: "page_namespace", nullable: false, default: "0" },
    ColumnSpec { name: "page_title", nullable: false, default: "''" },
    ColumnSpec { name: "page_restrictions", nullable: false, default: "''" },
    ColumnSpec { name: "page_is_redirect", nullable: false, default: "0" },
    ColumnSpec { name: "page_is_new", nullable: false, default: "0" },
    ColumnSpec { name: "page_random", nullable: false, default: "0" },
    ColumnSpec { name: "page_touched", nullable: false, default: "''" },
    ColumnSpec { name: "page_latest", nullable: false, default: "0" },
    ColumnSpec { name: "page_len", nullable: false, default: "0" },
];

const TEXT_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec { name: "old_id", nullable: false, default: "0" },
    ColumnSpec { name: "old_text", nullable: false, default: "''" },
    ColumnSpec { name: "old_flags", nullable: false, default: "'utf-8'" },
];

// rev_len was added in MW 1.10; rev_sha1 in 1.19; rev_content_model and
// rev_content_format in 1.21.
const REVISION_BASE: &[ColumnSpec] = &[
    ColumnSpec { name: "rev_id", nullable: false, default: "0" },
    ColumnSpec { name: "rev_page", nullable: false, default: "0" },
    ColumnSpec { name: "rev_text_id", nullable: false, default: "0" },
    ColumnSpec { name: "rev_comment", nullable: false, default: "''" },
    ColumnSpec { name: "rev_user", nullable: false, default: "0" },
    ColumnSpec { name: "rev_user_text", nullable: false, default: "''" },
    ColumnSpec { name: "rev_timestamp", nullable: false, default: "''" },
    ColumnSpec { name: "rev_minor_edit", nullable: false, default: "0" },
    ColumnSpec { name: "rev_deleted", nullable: false, default: "0" },
    ColumnSpec { name: "rev_parent_id", nullable: true, default: "NULL" },
];

const REVISION_WITH_LEN: &[ColumnSpec] = &[
    ColumnSpec { name: "rev_id", nullable: false, default: "0" },
    ColumnSpec { name: "rev_page", nullable: false, default: "0" },
    ColumnSpec { name: "rev_text_id", nullable: false, default: "0" },
    ColumnSpec { name: "rev_comment", nullable: false, default: "''" },
    ColumnSpec { name: "rev_user", nullable: false, default: "0" },
    ColumnSpec { name: "rev_user_text", nullable: false, default: "''" },
    ColumnSpec { name: "rev_timestamp", nullable: false, default: "''" },
    ColumnSpec { name: "rev_minor_edit", nullable: false, default: "0" },
    ColumnSpec { name: "rev_deleted", nullable: false, default: "0" },
    ColumnSpec { name: "rev_len", nullable: true, default: "NULL" },
    ColumnSpec { name: "rev_parent_id", nullable: true, default: "NULL" },
];

const REVISION_WITH_SHA1: &[ColumnSpec] = &[
    ColumnSpec { name: "rev_id", nullable: false, default: "0" },
    ColumnSpec { name: "rev_page", nullable: false, default: "0" },
    ColumnSpec { name: "rev_text_id", nullable: false, default: "0" },
    ColumnSpec { name: "rev_comment", nullable: false, default: "''" },
    ColumnSpec { name: "rev_user", nullable: false, default: "0" },
    ColumnSpec { name: "rev_user_text", nullable: false, default: "''" },
    ColumnSpec { name: "rev_timestamp", nullable: false, default: "''" },
    ColumnSpec { name: "rev_minor_edit", nullable: false, default: "0" },
    ColumnSpec { name: "rev_deleted", nullable: false, default: "0" },
    ColumnSpec { name: "rev_len", nullable: true, default: "NULL" },
    ColumnSpec { name: "rev_parent_id", nullable: true, default: "NULL" },
    ColumnSpec { name: "rev_sha1", nullable: false, default: "''" },
];

const REVISION_FULL: &[ColumnSpec] = &[
    ColumnSpec { name: "rev_id", nullable: false, default: "0" },
    ColumnSpec { name: "rev_page", nullable: false, default: "0" },
    ColumnSpec { name: "rev_text_id", nullable: false, default: "0" },
    ColumnSpec { name: "rev_comment", nullable: false, default: "''" },
    ColumnSpec { name: "rev_user", nullable: false, default: "0" },
    ColumnSpec { name: "rev_user_text", nullable: false, default: "''" },
    ColumnSpec { name: "rev_timestamp", nullable: false, default: "''" },
    ColumnSpec { name: "rev_minor_edit", nullable: false, default: "0" },
    ColumnSpec { name: "rev_deleted", nullable: false, default: "0" },
    ColumnSpec { name: "rev_len", nullable: true, default: "NULL" },
    ColumnSpec { name: "rev_parent_id", nullable: true, default: "NULL" },
    ColumnSpec { name: "rev_sha1", nullable: false, default: "''" },
    ColumnSpec { name: "rev_content_model", nullable: true, default: "NULL" },
    ColumnSpec { name: "rev_content_format", nullable: true, default: "NULL" },
];

fn parse_version(v: &str) -> Option<(u32, u32)> {
    let mut parts = v.trim().splitn(2, '.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    Some((major, minor))
}

/// Looks up the column policy for a target MediaWiki version string such
/// as `"1.25"`. Supports 1.5 through 1.29, per spec.md §6.
pub fn for_version(mw_version: &str) -> Result<SchemaVariant> {
    let parsed = parse_version(mw_version)
        .ok_or_else(|| Error::SchemaUnsupported { version: mw_version.to_string() })?;
    let (major, minor) = parsed;
    if major != 1 || !(5..=29).contains(&minor) {
        return Err(Error::SchemaUnsupported { version: mw_version.to_string() });
    }
    let revision: &'static [ColumnSpec] = if minor >= 21 {
        REVISION_FULL
    } else if minor >= 19 {
        REVISION_WITH_SHA1
    } else if minor >= 10 {
        REVISION_WITH_LEN
    } else {
        REVISION_BASE
    };
    Ok(SchemaVariant {
        mw_version: parsed,
        page: PAGE_COLUMNS,
        revision,
        text: TEXT_COLUMNS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn old_versions_omit_sha1_and_content_model() {
        let v = for_version("1.15").unwrap();
        assert!(!v.revision.iter().any(|c| c.name == "rev_sha1"));
        assert!(v.revision.iter().any(|c| c.name == "rev_len"));
    }

    #[test]
    fn modern_versions_carry_the_full_column_set() {
        let v = for_version("1.25").unwrap();
        assert!(v.revision.iter().any(|c| c.name == "rev_sha1"));
        assert!(v.revision.iter().any(|c| c.name == "rev_content_model"));
    }

    #[test]
    fn rejects_versions_outside_the_declared_range() {
        assert!(for_version("2.0").is_err());
        assert!(for_version("1.40").is_err());
        assert!(for_version("garbage").is_err());
    }

    #[test]
    fn page_and_text_columns_are_stable_across_versions() {
        let old = for_version("1.6").unwrap();
        let new = for_version("1.28").unwrap();
        assert_eq!(old.page.len(), new.page.len());
        assert_eq!(old.text.len(), new.text.len());
    }
}
