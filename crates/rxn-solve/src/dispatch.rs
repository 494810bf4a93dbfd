//! Runs branches on a fixed-size rayon pool.

use std::time::Instant;

use rayon::prelude::*;
use rxn_core::{ErrorInfo, RxnError};

use crate::solver::{Branch, BranchOutcome, GraphSolver};

/// Options governing branch execution.
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    /// Number of branches solved in parallel.
    pub number_of_threads: usize,
    /// Branches are not started after this instant.
    pub deadline: Option<Instant>,
}

impl DispatchOptions {
    /// Builds the worker pool shared by every dispatch of one search.
    pub fn build_pool(&self) -> Result<rayon::ThreadPool, RxnError> {
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.number_of_threads.max(1))
            .build()
            .map_err(|err| {
                RxnError::Config(
                    ErrorInfo::new("thread-pool", err.to_string())
                        .with_context("threads", self.number_of_threads),
                )
            })
    }
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            number_of_threads: 1,
            deadline: None,
        }
    }
}

/// Result of handing one branch to the pool.
#[derive(Debug, Clone, PartialEq)]
pub enum BranchReport {
    /// The branch ran to completion.
    Finished(BranchOutcome),
    /// The deadline passed before the branch was started.
    NotAttempted,
}

/// Solves the branches on `pool`. Reports come back in branch order. A
/// branch that was started always runs to completion; the deadline only
/// prevents new branches from starting.
pub fn dispatch_branches(
    pool: &rayon::ThreadPool,
    solver: &GraphSolver<'_>,
    branches: &[Branch],
    options: &DispatchOptions,
) -> Result<Vec<BranchReport>, RxnError> {
    let results: Result<Vec<_>, RxnError> = pool.install(|| {
        branches
            .par_iter()
            .enumerate()
            .map(|(index, branch)| -> Result<(usize, BranchReport), RxnError> {
                if options
                    .deadline
                    .is_some_and(|deadline| Instant::now() >= deadline)
                {
                    return Ok((index, BranchReport::NotAttempted));
                }
                Ok((index, BranchReport::Finished(solver.solve(branch)?)))
            })
            .collect()
    });

    let mut ordered = results?;
    ordered.sort_by_key(|(index, _)| *index);
    let skipped = ordered
        .iter()
        .filter(|(_, report)| matches!(report, BranchReport::NotAttempted))
        .count();
    if skipped > 0 {
        tracing::warn!(skipped, total = branches.len(), "deadline passed before all branches ran");
    }
    Ok(ordered.into_iter().map(|(_, report)| report).collect())
}
