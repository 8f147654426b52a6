use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum GenarcError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid genome id: {0}")]
    InvalidGenomeId(String),

    #[error("unsupported sequence file: {0}")]
    UnsupportedSequence(String),

    #[error("missing manifest file genarc.json in current directory")]
    MissingManifest,

    #[error("failed to read manifest at {0}")]
    ManifestRead(Utf8PathBuf),

    #[error("failed to parse manifest: {0}")]
    ManifestParse(String),

    #[error("malformed fasta {path}: {reason}")]
    FastaParse { path: Utf8PathBuf, reason: String },

    #[error("too many sequences in {path}: limit is {limit}")]
    TooManyContigs { path: Utf8PathBuf, limit: usize },

    #[error("invalid sequence index {path} line {line}: {reason}")]
    IndexParse {
        path: Utf8PathBuf,
        line: usize,
        reason: String,
    },

    #[error("malformed descriptor: {0}")]
    DescriptorParse(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("archive error: {0}")]
    Archive(String),
}

impl GenarcError {
    /// Request-level failures that are reported before any I/O happens.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            GenarcError::MissingField(_)
                | GenarcError::InvalidGenomeId(_)
                | GenarcError::UnsupportedSequence(_)
        )
    }
}
