//! Ephemeral directory tree owned by one pipeline run.
//!
//! The tree is removed recursively when [`Workspace`] is dropped, so every
//! exit path (success, `?` early return, or unwinding) cleans up.
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PREFIX: &str = "rife-interpolation-";

pub const RAW_COLOR: &str = "Frames";
pub const RAW_ALPHA: &str = "Alpha";
pub const INTERPOLATED_COLOR: &str = "IFrames";
pub const INTERPOLATED_ALPHA: &str = "IAlpha";
pub const MERGED: &str = "Merged";

/// File name of the intermediate animated PNG when GIF output is requested.
const INTERMEDIATE_APNG: &str = "assembled.png";

#[derive(Debug)]
pub struct Workspace {
    root: TempDir,
}

impl Workspace {
    /// Create a uniquely named directory under the system temp dir.
    pub fn create() -> Result<Self> {
        Self::create_in(&std::env::temp_dir())
    }

    /// Create the workspace under `parent` instead of the system temp dir.
    pub fn create_in(parent: &Path) -> Result<Self> {
        let root = tempfile::Builder::new()
            .prefix(PREFIX)
            .tempdir_in(parent)
            .with_context(|| format!("create temporary directory in {}", parent.display()))?;
        Self::populate(root)
    }

    fn populate(root: TempDir) -> Result<Self> {
        for name in [RAW_COLOR, RAW_ALPHA, INTERPOLATED_COLOR, INTERPOLATED_ALPHA, MERGED] {
            let dir = root.path().join(name);
            fs::create_dir(&dir).with_context(|| format!("create {}", dir.display()))?;
        }
        tracing::debug!(root = %root.path().display(), "workspace created");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn raw_color(&self) -> PathBuf {
        self.root().join(RAW_COLOR)
    }

    pub fn raw_alpha(&self) -> PathBuf {
        self.root().join(RAW_ALPHA)
    }

    pub fn interpolated_color(&self) -> PathBuf {
        self.root().join(INTERPOLATED_COLOR)
    }

    pub fn interpolated_alpha(&self) -> PathBuf {
        self.root().join(INTERPOLATED_ALPHA)
    }

    pub fn merged(&self) -> PathBuf {
        self.root().join(MERGED)
    }

    pub fn intermediate_apng(&self) -> PathBuf {
        self.root().join(INTERMEDIATE_APNG)
    }
}
