use super::{Layout, Pipeline};
use crate::deps::Dependency;
use crate::exec;
use anyhow::{Context, Result};
use std::fmt;
use std::path::Path;

/// Compression iterations passed to the assembler.
const ASSEMBLER_ITERATIONS: &str = "-i30";

/// Output frame delay as a fraction of a second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameDelay {
    pub numerator: u64,
    pub denominator: u64,
}

impl FrameDelay {
    /// Delay that keeps the total playback time once the frame count doubles.
    ///
    /// Source durations are in 1/100 s, so doubling the denominator halves
    /// each frame. A zero (unspecified) duration plays at 10 fps.
    pub fn from_duration(centiseconds: u64) -> Self {
        if centiseconds > 0 {
            Self {
                numerator: centiseconds,
                denominator: 200,
            }
        } else {
            Self {
                numerator: 1,
                denominator: 10,
            }
        }
    }
}

impl fmt::Display for FrameDelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Assemble the merged frames into an animated PNG at `dest`. The assembler
/// expands the wildcard itself; zero padding keeps the match order numeric.
pub(super) fn assemble(
    pipeline: &Pipeline<'_>,
    layout: &Layout,
    delay: FrameDelay,
    dest: &Path,
) -> Result<()> {
    let mut command = pipeline.tools().command(Dependency::Apngasm)?;
    command
        .arg(dest)
        .arg(layout.merged.glob())
        .arg(ASSEMBLER_ITERATIONS)
        .arg(delay.numerator.to_string())
        .arg(delay.denominator.to_string());
    tracing::debug!(%delay, dest = %dest.display(), "assembling animation");
    exec::run(command).context("assembly failed")?;
    Ok(())
}

/// Convert the assembled animated PNG to GIF. Partial transparency does not
/// survive this step.
pub(super) fn convert(pipeline: &Pipeline<'_>, apng: &Path, dest: &Path) -> Result<()> {
    let mut command = pipeline.tools().command(Dependency::Apng2Gif)?;
    command.arg(apng).arg(dest);
    exec::run(command).context("GIF conversion failed")?;
    Ok(())
}
