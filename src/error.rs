//! Error types for the memory-record subsystem.
//!
//! `RecordError` covers environment failures (a pseudo-file that cannot be
//! opened or read, a failing `getrusage`, a broken output sink). These are
//! not recoverable; the binary reports them and exits.
//!
//! `MapsLineError` describes a single malformed `/proc/self/maps` line. It is
//! never fatal: the summarizer logs it and moves on.

use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("getrusage(RUSAGE_SELF) failed: {0}")]
    Rusage(#[from] nix::errno::Errno),

    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapsLineError {
    #[error("missing {0} field")]
    MissingField(&'static str),

    #[error("invalid address range '{0}'")]
    InvalidAddress(String),

    #[error("invalid permissions '{0}'")]
    InvalidPermissions(String),

    #[error("invalid {0} '{1}'")]
    InvalidField(&'static str, String),
}
