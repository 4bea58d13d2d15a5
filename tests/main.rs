use mwxml2sql::assembler::PageReader;
use mwxml2sql::{join, policy};
use std::io::Cursor;

const STUB: &str = concat!(
    r#"<mediawiki xmlns="http://www.mediawiki.org/xml/export-0.10/">"#,
    "<siteinfo><sitename>Wiki</sitename></siteinfo>",
    "<page><title>Main Page</title><ns>0</ns><id>1</id>",
    "<revision><id>10</id><timestamp>2013-01-15T12:00:00Z</timestamp>",
    "<contributor><id>2</id><username>Bob</username></contributor>",
    "<comment>first</comment></revision>",
    "<revision><id>11</id><timestamp>2013-01-16T08:30:00Z</timestamp>",
    "<contributor><ip>192.0.2.1</ip></contributor>",
    "<comment>second</comment></revision></page>",
    "<page><title>Orphaned</title><ns>0</ns><id>2</id>",
    "<revision><id>20</id><timestamp>2013-02-01T00:00:00Z</timestamp>",
    "<contributor><id>3</id><username>Carol</username></contributor>",
    "</revision></page>",
    "</mediawiki>"
);

const CONTENT: &str = concat!(
    r#"<mediawiki xmlns="http://www.mediawiki.org/xml/export-0.10/">"#,
    "<page><title>Main Page</title><ns>0</ns><id>1</id>",
    "<revision><id>10</id><timestamp>2013-01-15T12:00:00Z</timestamp>",
    "<contributor><id>2</id><username>Bob</username></contributor>",
    "<text bytes=\"5\" id=\"100\">Hello</text></revision>",
    // content surplus: rev 15 exists only in the content dump and must be skipped as an orphan
    "<revision><id>15</id><timestamp>2013-01-15T13:00:00Z</timestamp>",
    "<contributor><id>2</id><username>Bob</username></contributor>",
    "<text bytes=\"3\" id=\"101\">xyz</text></revision>",
    "<revision><id>11</id><timestamp>2013-01-16T08:30:00Z</timestamp>",
    "<contributor><ip>192.0.2.1</ip></contributor>",
    "<text bytes=\"11\" id=\"102\">Hello world</text></revision></page>",
    // page 2's revision 20 has no counterpart here at all
    "</mediawiki>"
);

#[test]
fn joins_two_streams_into_three_tables() -> anyhow::Result<()> {
    let schema = policy::for_version("1.25")?;
    let stub = PageReader::new(Cursor::new(STUB.as_bytes().to_vec()));
    let content = PageReader::new(Cursor::new(CONTENT.as_bytes().to_vec()));

    let mut page_sql = Vec::new();
    let mut revision_sql = Vec::new();
    let mut text_sql = Vec::new();

    let counters = join::run(
        stub,
        content,
        &mut page_sql,
        &mut revision_sql,
        &mut text_sql,
        &schema,
        1,
    )?;

    assert_eq!(counters.pages_emitted, 2);
    assert_eq!(counters.revisions_emitted, 3);
    assert_eq!(counters.revisions_missing_content, 1); // page 2's rev 20
    assert_eq!(counters.orphan_content_revisions, 1); // content's rev 15

    let page_sql = String::from_utf8(page_sql)?;
    let revision_sql = String::from_utf8(revision_sql)?;
    let text_sql = String::from_utf8(text_sql)?;

    assert!(page_sql.contains("INSERT INTO `page` VALUES"));
    assert!(page_sql.contains("'Main Page'"));
    assert!(page_sql.contains("'Orphaned'"));

    assert!(revision_sql.contains("INSERT INTO `revision` VALUES"));
    assert!(text_sql.contains("'Hello'"));
    assert!(text_sql.contains("'Hello world'"));
    assert!(!text_sql.contains("'xyz'"), "orphaned content revision must not be emitted");
    Ok(())
}
