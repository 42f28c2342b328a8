//! Numbered single-frame image sequences inside the workspace.
//!
//! Input-indexed sequences (split output) count from 0 and are padded to the
//! width of the source frame count. Output-indexed sequences (interpolated and
//! merged frames) count from 1 and are padded to the width of the final frame
//! count. Fixed-width padding keeps lexicographic order equal to numeric order.
use crate::error::{Mismatch, PipelineError};
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

const EXTENSION: &str = "png";

/// Frames produced for a source of `source_frames` frames: double the source,
/// plus the transition back to the first frame.
pub fn final_frame_count(source_frames: u64) -> Result<u64, PipelineError> {
    source_frames
        .checked_mul(2)
        .and_then(|doubled| doubled.checked_add(1))
        .ok_or_else(|| {
            PipelineError::MetadataUnreadable(format!("frame count {source_frames} is too large"))
        })
}

/// Decimal digits needed to print `value`.
pub fn digits(value: u64) -> usize {
    value.checked_ilog10().map_or(1, |log| log as usize + 1)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSequence {
    dir: PathBuf,
    width: usize,
}

impl FrameSequence {
    /// 0-based sequence sized for a source with `frame_count` frames.
    pub fn input_indexed(dir: impl Into<PathBuf>, frame_count: u64) -> Self {
        Self {
            dir: dir.into(),
            width: digits(frame_count),
        }
    }

    /// 1-based sequence sized for `final_count` output frames.
    pub fn output_indexed(dir: impl Into<PathBuf>, final_count: u64) -> Self {
        Self {
            dir: dir.into(),
            width: digits(final_count),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// printf-style file name format, e.g. `%02d.png`.
    pub fn file_format(&self) -> String {
        format!("%0{}d.{EXTENSION}", self.width)
    }

    /// printf-style path pattern for tools that write whole sequences.
    pub fn pattern(&self) -> PathBuf {
        self.dir.join(self.file_format())
    }

    /// Wildcard matching every frame of the sequence.
    pub fn glob(&self) -> PathBuf {
        self.dir.join(format!("*.{EXTENSION}"))
    }

    pub fn file_name(&self, index: u64) -> String {
        format!("{index:0width$}.{EXTENSION}", width = self.width)
    }

    pub fn path(&self, index: u64) -> PathBuf {
        self.dir.join(self.file_name(index))
    }

    /// Indices of the frames currently on disk. Files that do not follow the
    /// sequence's naming are ignored.
    pub fn indices(&self) -> Result<BTreeSet<u64>> {
        let mut indices = BTreeSet::new();
        let entries =
            fs::read_dir(&self.dir).with_context(|| format!("read {}", self.dir.display()))?;
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            if stem.len() != self.width || !stem.bytes().all(|b| b.is_ascii_digit()) {
                continue;
            }
            if let Ok(index) = stem.parse::<u64>() {
                indices.insert(index);
            }
        }
        Ok(indices)
    }

    /// Require the frames on disk to be exactly `range`. Reports the first
    /// missing index, else the first index outside the range.
    pub fn require(&self, range: RangeInclusive<u64>) -> Result<()> {
        let present = self.indices()?;
        let mismatch = range
            .clone()
            .find(|index| !present.contains(index))
            .map(|index| (index, Mismatch::Missing))
            .or_else(|| {
                present
                    .iter()
                    .find(|&&index| !range.contains(&index))
                    .map(|&index| (index, Mismatch::Unexpected))
            });
        if let Some((index, kind)) = mismatch {
            return Err(PipelineError::SequenceMismatch {
                dir: self.dir.clone(),
                index,
                kind,
            }
            .into());
        }
        Ok(())
    }
}
