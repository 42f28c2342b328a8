//! Staged orchestration of one interpolation run.
//!
//! inspect -> split -> close loop -> interpolate -> composite -> assemble ->
//! convert. Each stage fans its external invocations out through [`FanIn`]
//! and only returns once every invocation has reported, so no stage starts
//! before the previous one has fully drained.
mod assemble;
mod composite;
mod interpolate;
mod split;

pub use assemble::FrameDelay;

use crate::config::Config;
use crate::deps::Toolchain;
use crate::error::Stage;
use crate::exec;
use crate::fanin::FanIn;
use crate::frames::{final_frame_count, FrameSequence};
use crate::inspect;
use crate::workspace::Workspace;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

/// Container written to the destination path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Apng,
    Gif,
}

impl OutputFormat {
    /// `.gif` (any case) selects GIF; everything else is written as animated PNG.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("gif") => OutputFormat::Gif,
            _ => OutputFormat::Apng,
        }
    }
}

/// One requested interpolation.
#[derive(Debug, Clone)]
pub struct Job {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub matte: String,
}

impl Job {
    pub fn format(&self) -> OutputFormat {
        OutputFormat::for_path(&self.destination)
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    pub source_frames: u64,
    pub final_frames: u64,
    pub delay: FrameDelay,
}

/// Frame sequences of one run, numbered for a known source frame count.
#[derive(Debug, Clone)]
pub(crate) struct Layout {
    pub(crate) source_frames: u64,
    pub(crate) final_frames: u64,
    pub(crate) raw_color: FrameSequence,
    pub(crate) raw_alpha: FrameSequence,
    pub(crate) interpolated_color: FrameSequence,
    pub(crate) interpolated_alpha: FrameSequence,
    pub(crate) merged: FrameSequence,
}

impl Layout {
    pub(crate) fn new(workspace: &Workspace, source_frames: u64) -> Result<Self> {
        let final_frames = final_frame_count(source_frames)?;
        Ok(Self {
            source_frames,
            final_frames,
            raw_color: FrameSequence::input_indexed(workspace.raw_color(), source_frames),
            raw_alpha: FrameSequence::input_indexed(workspace.raw_alpha(), source_frames),
            interpolated_color: FrameSequence::output_indexed(
                workspace.interpolated_color(),
                final_frames,
            ),
            interpolated_alpha: FrameSequence::output_indexed(
                workspace.interpolated_alpha(),
                final_frames,
            ),
            merged: FrameSequence::output_indexed(workspace.merged(), final_frames),
        })
    }
}

/// One external command plus the message that prefixes its failure.
pub(crate) struct Invocation {
    label: String,
    command: Command,
}

impl Invocation {
    pub(crate) fn new(label: impl Into<String>, command: Command) -> Self {
        Self {
            label: label.into(),
            command,
        }
    }

    fn run(self) -> Result<()> {
        let Invocation { label, command } = self;
        exec::run(command).with_context(|| label)?;
        Ok(())
    }
}

pub struct Pipeline<'a> {
    tools: &'a Toolchain,
    config: &'a Config,
    fan_in: FanIn,
}

impl<'a> Pipeline<'a> {
    pub fn new(tools: &'a Toolchain, config: &'a Config) -> Self {
        Self {
            tools,
            config,
            fan_in: FanIn::with_limit(config.jobs),
        }
    }

    /// Run every stage for `job`. The workspace is removed before this returns,
    /// whichever stage fails.
    pub fn run(&self, job: &Job) -> Result<Report> {
        let info = timed(Stage::Inspect, || inspect::inspect(self.tools, &job.source))?;
        let delay = FrameDelay::from_duration(info.frame_duration);

        let workspace = timed(Stage::Workspace, Workspace::create)?;
        let layout = Layout::new(&workspace, info.frame_count).context(Stage::Workspace)?;

        timed(Stage::Split, || split::split(self, &job.source, &job.matte, &layout))?;
        timed(Stage::Loop, || split::close_loop(&layout))?;
        timed(Stage::Interpolate, || interpolate::interpolate(self, &layout))?;
        timed(Stage::Composite, || composite::composite(self, &layout))?;

        match job.format() {
            OutputFormat::Apng => {
                timed(Stage::Assemble, || {
                    assemble::assemble(self, &layout, delay, &job.destination)
                })?;
            }
            OutputFormat::Gif => {
                let intermediate = workspace.intermediate_apng();
                timed(Stage::Assemble, || {
                    assemble::assemble(self, &layout, delay, &intermediate)
                })?;
                timed(Stage::Convert, || {
                    assemble::convert(self, &intermediate, &job.destination)
                })?;
            }
        }

        Ok(Report {
            source_frames: layout.source_frames,
            final_frames: layout.final_frames,
            delay,
        })
    }

    pub(crate) fn tools(&self) -> &Toolchain {
        self.tools
    }

    pub(crate) fn config(&self) -> &Config {
        self.config
    }

    /// Fan out `invocations` and wait for all of them.
    pub(crate) fn run_all(&self, invocations: Vec<Invocation>) -> Result<()> {
        tracing::info!(units = invocations.len(), "fanning out");
        let units = invocations
            .into_iter()
            .map(|invocation| move || invocation.run())
            .collect();
        self.fan_in.run(units)
    }
}

/// Run one stage inside a `stage` span, labelling its errors and logging its
/// duration. Fan-out events inside the stage carry the unit count.
fn timed<T>(stage: Stage, f: impl FnOnce() -> Result<T>) -> Result<T> {
    let _span = tracing::info_span!("stage", %stage).entered();
    let start = Instant::now();
    let result = f().context(stage);
    tracing::info!(
        %stage,
        ok = result.is_ok(),
        elapsed_ms = start.elapsed().as_millis(),
        "stage finished"
    );
    result
}
