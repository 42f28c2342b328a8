//! CLI argument parsing.
//!
//! The surface is three positionals. Help is handled before clap sees the
//! arguments so that `-h`/`--help` in any case lands on stderr with a failing
//! status, like every other usage error.
use crate::pipeline::Job;
use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Matte used to flatten transparency when none is given.
pub const DEFAULT_MATTE: &str = "#36393F";

/// Appended to the input stem when no output path is given.
const DEFAULT_OUTPUT_SUFFIX: &str = "-2x-Interpolated.gif";

/// Exit status for usage errors, matching clap's.
pub const USAGE_EXIT_CODE: u8 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "rife2x",
    version,
    about = "Double the frame rate of a transparent animation with RIFE",
    disable_help_flag = true,
    after_help = "Outputs ending in .gif are converted after assembly; any other extension is written as animated PNG.\n\nExamples:\n  rife2x wave.gif\n  rife2x wave.gif wave-smooth.png\n  rife2x wave.webp wave-smooth.gif '#FFFFFF'"
)]
pub struct Args {
    /// Animated image to interpolate (GIF, animated WebP, ...)
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Destination; defaults to <INPUT stem>-2x-Interpolated.gif beside the input
    #[arg(value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Matte color substituted for transparency in the color pass [default: #36393F]
    #[arg(value_name = "#MATTE")]
    pub matte: Option<String>,
}

/// True when any argument after argv0 asks for help, ignoring case.
pub fn wants_help(argv: &[OsString]) -> bool {
    argv.iter().skip(1).any(|arg| {
        arg.to_str().is_some_and(|arg| {
            arg.eq_ignore_ascii_case("-h") || arg.eq_ignore_ascii_case("--help")
        })
    })
}

pub fn print_usage() {
    eprintln!("{}", Args::command().render_help());
}

impl Args {
    /// Resolve defaults and absolute paths. The input must exist.
    pub fn into_job(self) -> Result<Job> {
        let Args {
            input,
            mut output,
            mut matte,
        } = self;

        // `rife2x in.gif '#FFF'` gives a matte but no output.
        if matte.is_none() && output.as_deref().is_some_and(looks_like_color) {
            matte = output.take().map(|value| value.to_string_lossy().into_owned());
        }

        let source = std::path::absolute(&input)
            .with_context(|| format!("cannot resolve input path {}", input.display()))?;
        std::fs::metadata(&source)
            .with_context(|| format!("cannot open input file {}", input.display()))?;

        let destination = match output {
            Some(output) => std::path::absolute(&output)
                .with_context(|| format!("cannot resolve output path {}", output.display()))?,
            None => default_output(&source),
        };

        Ok(Job {
            source,
            destination,
            matte: matte.unwrap_or_else(|| DEFAULT_MATTE.to_string()),
        })
    }
}

/// `#` followed by 3, 4, 6 or 8 hex digits.
fn looks_like_color(value: &Path) -> bool {
    let Some(hex) = value.to_str().and_then(|value| value.strip_prefix('#')) else {
        return false;
    };
    matches!(hex.len(), 3 | 4 | 6 | 8) && hex.bytes().all(|b| b.is_ascii_hexdigit())
}

/// `<stem>-2x-Interpolated.gif` in the input's directory.
pub fn default_output(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    source.with_file_name(format!("{stem}{DEFAULT_OUTPUT_SUFFIX}"))
}
