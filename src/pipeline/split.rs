use super::{Invocation, Layout, Pipeline};
use crate::deps::Dependency;
use crate::frames::FrameSequence;
use anyhow::{Context, Result};
use std::fs;
use std::io::{self, ErrorKind};
use std::path::Path;

/// Split the source into an opaque color sequence (transparency flattened onto
/// `matte`) and a grayscale alpha sequence, both input-indexed from 0.
pub(super) fn split(
    pipeline: &Pipeline<'_>,
    source: &Path,
    matte: &str,
    layout: &Layout,
) -> Result<()> {
    let tools = pipeline.tools();

    let mut color = tools.command(Dependency::Magick)?;
    color
        .arg("convert")
        .arg(source)
        .args(["-background", matte])
        .args(["-coalesce", "-alpha", "Background", "-alpha", "Off", "-strip"])
        .args(["-define", "png:color-type=2"])
        .arg(layout.raw_color.pattern());

    let mut alpha = tools.command(Dependency::Magick)?;
    alpha
        .arg("convert")
        .arg(source)
        .args(["-coalesce", "-alpha", "Extract", "-strip"])
        .args(["-define", "png:color-type=0"])
        .arg(layout.raw_alpha.pattern());

    pipeline.run_all(vec![
        Invocation::new("color extraction failed", color),
        Invocation::new("alpha extraction failed", alpha),
    ])?;

    require_raw(layout, layout.source_frames - 1)
}

/// Duplicate frame 0 of both raw sequences into slot `source_frames`, giving
/// the interpolator a frame to blend the last frame back into. Both sequences
/// must then hold exactly `0..=source_frames`.
pub(super) fn close_loop(layout: &Layout) -> Result<()> {
    for sequence in [&layout.raw_color, &layout.raw_alpha] {
        duplicate_frame(sequence, 0, layout.source_frames).with_context(|| {
            format!("cannot establish loop frame in {}", sequence.dir().display())
        })?;
    }
    require_raw(layout, layout.source_frames)
}

/// Both raw sequences hold exactly the indices `0..=last`.
fn require_raw(layout: &Layout, last: u64) -> Result<()> {
    layout.raw_color.require(0..=last)?;
    layout.raw_alpha.require(0..=last)?;
    Ok(())
}

/// Never overwrites: an existing frame at `to` is an error.
fn duplicate_frame(sequence: &FrameSequence, from: u64, to: u64) -> Result<()> {
    let source = sequence.path(from);
    let dest = sequence.path(to);
    match fs::hard_link(&source, &dest) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::AlreadyExists => {
            Err(err).with_context(|| format!("{} already exists", dest.display()))
        }
        Err(err) => {
            tracing::debug!(error = %err, "hard link unavailable, copying frame");
            fs::File::open(&source)
                .and_then(|mut from| io::copy(&mut from, &mut fs::File::create_new(&dest)?))
                .with_context(|| format!("copy {} to {}", source.display(), dest.display()))?;
            Ok(())
        }
    }
}
