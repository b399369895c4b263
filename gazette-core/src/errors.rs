//! Error taxonomy of the ingestion pipeline.
//!
//! Source errors are fatal and surface before anything is submitted. Extraction errors are per
//! record and never block ingestion. Submit errors are per record and counted. Commit errors are
//! fatal for the durability of the whole run.
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceReadError {
    #[error("no source files were given")]
    NoSources,

    #[error("failed to read source {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("source {path} is missing required column `{column}`")]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("source {path}, line {line}: missing value for `{field}`")]
    MissingField {
        path: PathBuf,
        line: u64,
        field: &'static str,
    },

    #[error("source {path} is malformed: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("failed to read lexicon {path}: {source}")]
    LexiconIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("lexicon line {line} is malformed: {reason}")]
    MalformedLexicon { line: usize, reason: String },

    #[error("failed to compile entity matcher: {0}")]
    Matcher(#[from] regex::Error),

    #[error("entity extraction failed: {0}")]
    Failed(anyhow::Error),
}

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("transport error while submitting document: {0}")]
    Transport(anyhow::Error),

    #[error("index rejected document with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl SubmitError {
    /// Whether resending the identical request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            SubmitError::Transport(_) => true,
            SubmitError::Status { status, .. } => is_transient_status(*status),
            SubmitError::Serialize(_) => false,
        }
    }
}

#[derive(Error, Debug)]
pub enum CommitError {
    #[error("transport error while committing: {0}")]
    Transport(anyhow::Error),

    #[error("index rejected commit with status {status}: {body}")]
    Status { status: u16, body: String },
}

impl CommitError {
    /// Whether reissuing the commit may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            CommitError::Transport(_) => true,
            CommitError::Status { status, .. } => is_transient_status(*status),
        }
    }
}

/// Errors that end a pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("no index writer configured for pipeline")]
    NoIndex,

    #[error(transparent)]
    Source(#[from] SourceReadError),

    #[error("failed to set up index: {0:#}")]
    Setup(anyhow::Error),

    #[error("submitting record {id} failed, run aborted without commit: {source}")]
    Submit {
        id: usize,
        #[source]
        source: SubmitError,
    },

    #[error("commit failed, {acknowledged} acknowledged documents will not be visible: {source}")]
    Commit {
        acknowledged: usize,
        #[source]
        source: CommitError,
    },
}

fn is_transient_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}
