//! Fan-out/fan-in over blocking units of work.
//!
//! Each unit runs on its own scoped thread and reports exactly once on a
//! shared channel. The coordinator waits for every launched unit, keeps the
//! first error that arrives and discards the rest.
use crate::error::PipelineError;
use anyhow::Result;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::thread;

/// The default launches every unit at once.
#[derive(Debug, Clone, Copy, Default)]
pub struct FanIn {
    limit: Option<NonZeroUsize>,
}

impl FanIn {
    /// Keep at most `limit` units running; `None` is unbounded.
    pub fn with_limit(limit: Option<NonZeroUsize>) -> Self {
        Self { limit }
    }

    /// Run all units and block until each has reported.
    ///
    /// Returns the first error in completion order. Units keep running after a
    /// sibling fails; with a limit set, queued units are still launched.
    pub fn run<U>(&self, units: Vec<U>) -> Result<()>
    where
        U: FnOnce() -> Result<()> + Send,
    {
        let total = units.len();
        let window = self.limit.map_or(total, NonZeroUsize::get);

        thread::scope(|scope| {
            let (tx, rx) = mpsc::channel::<Result<()>>();
            let mut queue = units.into_iter();
            let mut launched = 0usize;

            for unit in queue.by_ref().take(window) {
                spawn_unit(scope, &tx, unit);
                launched += 1;
            }

            let mut first_error = None;
            let mut reported = 0usize;
            while reported < launched {
                let outcome = rx
                    .recv()
                    .map_err(|_| anyhow::Error::new(PipelineError::UnitPanicked))
                    .and_then(|outcome| outcome);
                reported += 1;
                if let Err(err) = outcome {
                    if first_error.is_none() {
                        first_error = Some(err);
                    } else {
                        tracing::debug!(error = %format!("{err:#}"), "discarding later failure");
                    }
                }
                if let Some(unit) = queue.next() {
                    spawn_unit(scope, &tx, unit);
                    launched += 1;
                }
            }

            match first_error {
                Some(err) => Err(err),
                None => Ok(()),
            }
        })
    }
}

fn spawn_unit<'scope, U>(
    scope: &'scope thread::Scope<'scope, '_>,
    tx: &mpsc::Sender<Result<()>>,
    unit: U,
) where
    U: FnOnce() -> Result<()> + Send + 'scope,
{
    let tx = tx.clone();
    scope.spawn(move || {
        let outcome = panic::catch_unwind(AssertUnwindSafe(unit))
            .unwrap_or_else(|_| Err(PipelineError::UnitPanicked.into()));
        // The receiver outlives every unit inside the scope.
        let _ = tx.send(outcome);
    });
}
