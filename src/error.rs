//! Error conditions surfaced by the interpolation pipeline.
//!
//! Conditions that callers (and tests) need to tell apart are typed here;
//! everything else travels as `anyhow` context on top of them.
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Named failure conditions of the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("dependency not found: {dependency} (tried {candidates})")]
    DependencyNotFound {
        dependency: &'static str,
        candidates: String,
        #[source]
        source: which::Error,
    },

    #[error("metadata unreadable: {0}")]
    MetadataUnreadable(String),

    #[error("insufficient frames: source has {frames} frame(s), nothing to interpolate")]
    InsufficientFrames { frames: u64 },

    #[error("frame sequence mismatch in {}: {kind} index {index}", dir.display())]
    SequenceMismatch {
        dir: PathBuf,
        index: u64,
        kind: Mismatch,
    },

    #[error("missing paired frame {index}: {}", path.display())]
    MissingPairedFrame { index: u64, path: PathBuf },

    #[error("{tool} exited with {status}: {detail}")]
    ToolFailed {
        tool: String,
        status: String,
        detail: String,
    },

    #[error("cannot launch {tool}")]
    ToolLaunch {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("worker panicked")]
    UnitPanicked,

    #[error("invalid configuration {key}: {reason}")]
    InvalidConfig { key: &'static str, reason: String },
}

/// How a frame sequence departs from its expected index set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mismatch {
    Missing,
    Unexpected,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mismatch::Missing => "missing",
            Mismatch::Unexpected => "unexpected",
        })
    }
}

/// Pipeline stages; each stage's errors carry its label as outermost context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Inspect,
    Workspace,
    Split,
    Loop,
    Interpolate,
    Composite,
    Assemble,
    Convert,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Inspect => "inspect",
            Stage::Workspace => "workspace",
            Stage::Split => "split",
            Stage::Loop => "loop",
            Stage::Interpolate => "interpolate",
            Stage::Composite => "composite",
            Stage::Assemble => "assemble",
            Stage::Convert => "convert",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
