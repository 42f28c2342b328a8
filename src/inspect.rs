//! Source animation metadata.
use crate::deps::{Dependency, Toolchain};
use crate::error::PipelineError;
use crate::exec;
use crate::frames::final_frame_count;
use anyhow::Result;
use std::path::Path;

/// Metadata query: frame count and per-frame delay in 1/100 s. The engine
/// prints the pair once per frame.
const IDENTIFY_FORMAT: &str = "%n %T ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceInfo {
    pub frame_count: u64,
    /// Nominal per-frame duration in hundredths of a second; 0 means unspecified.
    pub frame_duration: u64,
}

impl SourceInfo {
    /// Parse the first two whitespace-separated numbers of a metadata query.
    pub fn parse(output: &str) -> Result<Self, PipelineError> {
        let mut tokens = output.split_whitespace();
        let mut next_number = |what: &str| -> Result<u64, PipelineError> {
            let token = tokens
                .next()
                .ok_or_else(|| PipelineError::MetadataUnreadable(format!("missing {what}")))?;
            token.parse::<u64>().map_err(|_| {
                PipelineError::MetadataUnreadable(format!("{what} is not a number: {token:?}"))
            })
        };
        let frame_count = next_number("frame count")?;
        let frame_duration = next_number("frame duration")?;
        Ok(Self {
            frame_count,
            frame_duration,
        })
    }

    /// Interpolation needs at least two frames, and the doubled count must
    /// still be representable.
    pub fn ensure_animated(self) -> Result<Self, PipelineError> {
        if self.frame_count <= 1 {
            return Err(PipelineError::InsufficientFrames {
                frames: self.frame_count,
            });
        }
        final_frame_count(self.frame_count)?;
        Ok(self)
    }
}

/// Query the compositing engine for the source's frame count and duration.
pub fn inspect(tools: &Toolchain, source: &Path) -> Result<SourceInfo> {
    let mut command = tools.command(Dependency::Magick)?;
    command
        .arg("identify")
        .arg("-format")
        .arg(IDENTIFY_FORMAT)
        .arg(source);
    let stdout = exec::run(command)
        .map_err(|err| PipelineError::MetadataUnreadable(err.to_string()))?;
    let info = SourceInfo::parse(&String::from_utf8_lossy(&stdout))?.ensure_animated()?;
    tracing::info!(
        frames = info.frame_count,
        duration = info.frame_duration,
        "inspected source"
    );
    Ok(info)
}
