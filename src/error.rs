//! Per-node error taxonomy.
//!
//! None of these escape the inlining pass: the engine records them in the
//! [`InlineReport`](crate::inline::InlineReport) and leaves the node as it was.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Why a candidate node could not be inlined
#[derive(Debug, Error)]
pub enum InlineError {
    #[error("cannot read `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot optimize `{}`: {message}", path.display())]
    Optimize { path: PathBuf, message: String },

    #[error("unsupported asset type: `{0}`")]
    UnsupportedAssetType(String),

    #[error("element has no `src` attribute")]
    MissingSrc,

    #[error("`{src}` did not resolve within {}ms", timeout.as_millis())]
    Timeout { src: String, timeout: Duration },

    #[error("resolver task aborted: {0}")]
    Task(String),

    #[error("cannot parse document: {0}")]
    Parse(String),
}

impl InlineError {
    /// Short machine-friendly label, used in log lines and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io { .. } => "io",
            Self::Optimize { .. } => "optimize",
            Self::UnsupportedAssetType(_) => "unsupported",
            Self::MissingSrc => "missing-src",
            Self::Timeout { .. } => "timeout",
            Self::Task(_) => "task",
            Self::Parse(_) => "parse",
        }
    }
}
