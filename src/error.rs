//! Error type shared by every component of the transducer.

use thiserror::Error;

/// The error type for the whole crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error("usage error: {0}")]
    Usage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed compressed input: {0}")]
    Codec(String),

    #[error("XML error at offset {offset}: {reason}")]
    Xml { offset: usize, reason: String },

    #[error("unsupported MediaWiki schema version: {version}")]
    SchemaUnsupported { version: String },

    #[error(
        "join desync: stub revision {stub_rev} is {distance} revisions ahead of content revision {content_rev}"
    )]
    JoinDesync {
        stub_rev: u32,
        content_rev: u32,
        distance: u32,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Maps an error to the process exit code specified by the CLI contract.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Usage(_) => 1,
            Error::Io(_) | Error::Codec(_) => 2,
            Error::Xml { .. } => 3,
            Error::JoinDesync { .. } => 4,
            Error::SchemaUnsupported { .. } => 1,
            Error::Internal(_) => 2,
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(e: quick_xml::Error) -> Self {
        Error::Xml {
            offset: 0,
            reason: e.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
