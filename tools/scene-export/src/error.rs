//! Export errors and non-fatal warnings

use std::fmt;

use glb_builder::GlbError;
use thiserror::Error;

/// Fatal export failure
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("{path}: byte range {offset}..{end} exceeds buffer length {len}")]
    OutOfBounds {
        path: String,
        offset: usize,
        end: usize,
        len: usize,
    },

    #[error("output buffer exceeds 4 GiB")]
    TooLarge,

    #[error("GLB assembly failed: {0}")]
    Glb(#[from] GlbError),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Something the exporter dropped or could not represent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportWarning {
    /// Location in the source (e.g. `animations[0].channels[2]`)
    pub path: String,
    pub message: String,
}

impl ExportWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ExportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Collects warnings and mirrors each one to the log
#[derive(Debug, Default)]
pub(crate) struct Warnings(Vec<ExportWarning>);

impl Warnings {
    pub(crate) fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        let warning = ExportWarning::new(path, message);
        tracing::warn!("{}", warning);
        self.0.push(warning);
    }

    pub(crate) fn into_vec(self) -> Vec<ExportWarning> {
        self.0
    }
}
