use super::{Invocation, Layout, Pipeline};
use crate::deps::Dependency;
use crate::error::PipelineError;
use anyhow::Result;

/// Merge every interpolated color frame with the alpha frame at the same
/// index into a transparent frame. One invocation per output frame.
pub(super) fn composite(pipeline: &Pipeline<'_>, layout: &Layout) -> Result<()> {
    ensure_paired(layout)?;

    let mut invocations = Vec::new();
    for index in 1..=layout.final_frames {
        let mut command = pipeline.tools().command(Dependency::Magick)?;
        command
            .arg(layout.interpolated_color.path(index))
            .arg(layout.interpolated_alpha.path(index))
            .args(["-alpha", "Off", "-compose", "CopyOpacity", "-composite"])
            .arg(layout.merged.path(index));
        invocations.push(Invocation::new(
            format!("merge of frame {index} failed"),
            command,
        ));
    }

    pipeline.run_all(invocations)
}

/// Every output index needs both an interpolated color and alpha frame.
fn ensure_paired(layout: &Layout) -> Result<(), PipelineError> {
    for index in 1..=layout.final_frames {
        for sequence in [&layout.interpolated_color, &layout.interpolated_alpha] {
            let path = sequence.path(index);
            if !path.is_file() {
                return Err(PipelineError::MissingPairedFrame { index, path });
            }
        }
    }
    Ok(())
}
