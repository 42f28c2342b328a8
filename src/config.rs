//! Environment-driven configuration, read once at startup.
use crate::error::PipelineError;
use anyhow::Result;
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Interpolation model used when `RIFE2X_MODEL` is unset.
pub const DEFAULT_MODEL: &str = "rife-v4.6";

pub const MODEL_VAR: &str = "RIFE2X_MODEL";
pub const JOBS_VAR: &str = "RIFE2X_JOBS";
pub const RIFE_ARGS_VAR: &str = "RIFE2X_RIFE_ARGS";
pub const DEPENDENCIES_VAR: &str = "RIFE2X_DEPENDENCIES";

/// Knobs that shape external invocations without changing pipeline semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub model: String,
    /// Cap on concurrently running external processes per stage; `None` runs
    /// every unit of a stage at once.
    pub jobs: Option<NonZeroUsize>,
    pub rife_args: Vec<String>,
    pub dependencies_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            jobs: None,
            rife_args: Vec::new(),
            dependencies_dir: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Config::default();

        if let Some(model) = get(MODEL_VAR) {
            config.model = model.trim().to_string();
        }
        if let Some(raw) = get(JOBS_VAR) {
            config.jobs = Some(parse_jobs(&raw)?);
        }
        if let Some(raw) = get(RIFE_ARGS_VAR) {
            config.rife_args =
                shell_words::split(&raw).map_err(|err| PipelineError::InvalidConfig {
                    key: RIFE_ARGS_VAR,
                    reason: err.to_string(),
                })?;
        }
        config.dependencies_dir = get(DEPENDENCIES_VAR).map(PathBuf::from);
        Ok(config)
    }
}

fn parse_jobs(raw: &str) -> Result<NonZeroUsize> {
    raw.trim().parse::<NonZeroUsize>().map_err(|_| {
        PipelineError::InvalidConfig {
            key: JOBS_VAR,
            reason: format!("expected a positive integer, got {raw:?}"),
        }
        .into()
    })
}
