//! Resolution of the external programs the pipeline drives.
//!
//! Every dependency is resolved once, before any workspace exists, into a
//! [`Toolchain`] that the stages consume. Lookups try the search path first
//! and then a fallback directory that ships beside the executable.
use crate::error::PipelineError;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Name of the fallback directory colocated with the executable.
pub const FALLBACK_DIR_NAME: &str = "Dependencies";

/// Logical external dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Dependency {
    /// Image decoding, compositing and metadata engine.
    Magick,
    /// Frame-interpolation model runner.
    Rife,
    /// Animated PNG assembler.
    Apngasm,
    /// Animated PNG to GIF converter.
    Apng2Gif,
}

impl Dependency {
    /// Acceptable program names, in preference order.
    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            Dependency::Magick => &["magick"],
            Dependency::Rife => &["rife-ncnn-vulkan", "rife"],
            Dependency::Apngasm => &["apngasm64", "apngasm"],
            Dependency::Apng2Gif => &["apng2gif64", "apng2gif"],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Dependency::Magick => "compositing engine",
            Dependency::Rife => "interpolation runner",
            Dependency::Apngasm => "animation assembler",
            Dependency::Apng2Gif => "GIF converter",
        }
    }

    /// Dependencies required for a run, given whether GIF output was requested.
    pub fn required(gif_output: bool) -> Vec<Dependency> {
        let mut deps = vec![Dependency::Magick, Dependency::Rife, Dependency::Apngasm];
        if gif_output {
            deps.push(Dependency::Apng2Gif);
        }
        deps
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Program lookup over a search path plus one fallback directory.
#[derive(Debug, Clone)]
pub struct Locator {
    search_path: Option<OsString>,
    fallback_dir: Option<PathBuf>,
    cwd: PathBuf,
}

impl Locator {
    /// Locator over the process `PATH`, falling back to `override_dir` or to
    /// `Dependencies` beside the running executable.
    pub fn from_env(override_dir: Option<&Path>) -> Result<Self> {
        let cwd = std::env::current_dir().context("resolve current directory")?;
        let fallback_dir = match override_dir {
            Some(dir) => Some(dir.to_path_buf()),
            None => std::env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(|dir| dir.join(FALLBACK_DIR_NAME))),
        };
        Ok(Self::new(std::env::var_os("PATH"), fallback_dir, cwd))
    }

    pub fn new(search_path: Option<OsString>, fallback_dir: Option<PathBuf>, cwd: PathBuf) -> Self {
        Self {
            search_path,
            fallback_dir,
            cwd,
        }
    }

    /// Return the first candidate name resolvable on the search path or in the
    /// fallback directory.
    pub fn locate(&self, dependency: Dependency) -> Result<PathBuf, PipelineError> {
        let mut last_error = which::Error::CannotFindBinaryPath;
        for name in dependency.candidates() {
            match which::which_in(name, self.search_path.as_ref(), &self.cwd) {
                Ok(path) => return Ok(path),
                Err(err) => last_error = err,
            }
            if let Some(dir) = &self.fallback_dir {
                match which::which_in(name, Some(dir), &self.cwd) {
                    Ok(path) => return Ok(path),
                    Err(err) => last_error = err,
                }
            }
        }
        Err(PipelineError::DependencyNotFound {
            dependency: dependency.label(),
            candidates: dependency.candidates().join(", "),
            source: last_error,
        })
    }
}

/// Resolved program table handed to every stage.
#[derive(Debug, Clone, Default)]
pub struct Toolchain {
    programs: BTreeMap<Dependency, PathBuf>,
}

impl Toolchain {
    pub fn resolve(locator: &Locator, dependencies: &[Dependency]) -> Result<Self> {
        let mut programs = BTreeMap::new();
        for &dependency in dependencies {
            let path = locator.locate(dependency)?;
            tracing::debug!(%dependency, path = %path.display(), "resolved dependency");
            programs.insert(dependency, path);
        }
        Ok(Self { programs })
    }

    pub fn path(&self, dependency: Dependency) -> Option<&Path> {
        self.programs.get(&dependency).map(PathBuf::as_path)
    }

    /// Start a command for a resolved dependency.
    pub fn command(&self, dependency: Dependency) -> Result<Command> {
        let path = self
            .path(dependency)
            .with_context(|| format!("{dependency} was not resolved"))?;
        Ok(Command::new(path))
    }
}
