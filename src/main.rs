//! Command-line entry point: reads a stub dump and a content dump, joins
//! them, and writes `page.sql`, `revision.sql`, and `text.sql`.

use clap::Parser as ClapParser;
use mwxml2sql::assembler::PageReader;
use mwxml2sql::error::Error;
use mwxml2sql::{codec, join, policy};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Converts MediaWiki XML export dumps into MySQL `INSERT` statements.
#[derive(Debug, ClapParser)]
#[command(name = "mwxml2sql", version, about)]
struct Cli {
    /// Path to the stub dump (revision metadata, no text).
    #[arg(long)]
    stubs: PathBuf,

    /// Path to the content dump (full revision text).
    #[arg(long)]
    text: PathBuf,

    /// Prefix for the output files: produces `<prefix>-page.sql`,
    /// `<prefix>-revision.sql`, and `<prefix>-text.sql`, each compressed
    /// per a trailing `.gz`/`.bz2` on the prefix itself.
    #[arg(long = "sql")]
    sql_prefix: PathBuf,

    /// Target MediaWiki version, e.g. "1.25". Selects the output column set.
    #[arg(long)]
    mwversion: String,

    /// First text_id to allocate; use to continue a previous run.
    #[arg(long, default_value_t = 1)]
    startid: u32,

    /// How many revisions the two streams may desync before aborting.
    #[arg(long, default_value_t = join::DEFAULT_DESYNC_TOLERANCE)]
    desync_tolerance: u32,

    /// Print progress every 10,000 pages.
    #[arg(short, long)]
    verbose: bool,
}

/// Builds `<prefix>-<table>.sql[.gz|.bz2]`, recognizing a compression
/// suffix already present on `prefix` and reapplying it after the table
/// name so codec dispatch (by final filename suffix) still applies.
fn table_path(prefix: &Path, table: &str) -> PathBuf {
    let prefix_str = prefix.to_string_lossy();
    for ext in [".gz", ".bz2"] {
        if let Some(stem) = prefix_str.strip_suffix(ext) {
            return PathBuf::from(format!("{stem}-{table}.sql{ext}"));
        }
    }
    PathBuf::from(format!("{prefix_str}-{table}.sql"))
}

fn run(cli: Cli) -> Result<(), Error> {
    let schema = policy::for_version(&cli.mwversion)?;

    let stub_reader = codec::open_read(&cli.stubs)?;
    let content_reader = codec::open_read(&cli.text)?;
    let stub_pages = PageReader::new(stub_reader);
    let content_pages = PageReader::new(content_reader);

    let page_out = codec::open_write(&table_path(&cli.sql_prefix, "page"))?;
    let revision_out = codec::open_write(&table_path(&cli.sql_prefix, "revision"))?;
    let text_out = codec::open_write(&table_path(&cli.sql_prefix, "text"))?;

    let counters = join::run_with_tolerance(
        stub_pages,
        content_pages,
        page_out,
        revision_out,
        text_out,
        &schema,
        cli.startid,
        cli.desync_tolerance,
    )?;

    log::info!(
        "wrote {} pages, {} revisions ({} missing content, {} orphaned, {} duplicate text ids)",
        counters.pages_emitted,
        counters.revisions_emitted,
        counters.revisions_missing_content,
        counters.orphan_content_revisions,
        counters.duplicate_text_ids_skipped,
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // clap itself handles --help/--version by printing and exiting
            // 0; anything else is a usage error, mapped to spec.md §6's
            // exit code 1 rather than clap's own default of 2.
            let _ = e.print();
            return ExitCode::from(if e.exit_code() == 0 { 0 } else { 1 });
        }
    };
    let level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
