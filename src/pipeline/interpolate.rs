use super::{Invocation, Layout, Pipeline};
use crate::deps::Dependency;
use crate::frames::FrameSequence;
use anyhow::Result;
use std::process::Command;

/// Run the interpolation model over the color and alpha sequences at once.
/// Each run doubles its `source_frames + 1` inputs into a 1-based sequence of
/// `final_frames` frames; the frame count is trusted to the runner.
pub(super) fn interpolate(pipeline: &Pipeline<'_>, layout: &Layout) -> Result<()> {
    let channels = [
        ("color", &layout.raw_color, &layout.interpolated_color),
        ("alpha", &layout.raw_alpha, &layout.interpolated_alpha),
    ];
    let mut invocations = Vec::with_capacity(channels.len());
    for (channel, input, output) in channels {
        let command = rife_command(pipeline, input, output)?;
        invocations.push(Invocation::new(
            format!("interpolation failed for {channel}"),
            command,
        ));
    }
    pipeline.run_all(invocations)
}

fn rife_command(
    pipeline: &Pipeline<'_>,
    input: &FrameSequence,
    output: &FrameSequence,
) -> Result<Command> {
    let config = pipeline.config();
    let mut command = pipeline.tools().command(Dependency::Rife)?;
    command
        .arg("-m")
        .arg(&config.model)
        .arg("-i")
        .arg(input.dir())
        .arg("-o")
        .arg(output.dir())
        // spatial and temporal TTA
        .args(["-x", "-z"])
        .arg("-f")
        .arg(output.file_format())
        .args(&config.rife_args);
    Ok(command)
}
