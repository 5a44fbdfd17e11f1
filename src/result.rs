// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The bundle returned by [`crate::driver::optimize`], modeled on
//! `argmin::core::result::OptimizationResult`, specialized to this crate's
//! one concrete state type and expanded with the full per-iteration
//! history (`spec.md` §5).

use std::fmt;

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::problem::EvalCounts;
use crate::state::IterationRecord;
use crate::termination::TerminationReason;

/// Everything a caller needs about a finished (or aborted) solve.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct OptimizationResult {
    /// The accepted iterate history, `history[0]` being the initial point.
    pub history: Vec<IterationRecord>,
    /// Why the driver stopped.
    pub termination: TerminationReason,
    /// Total cost/gradient/Hessian evaluations over the whole run.
    pub counts: EvalCounts,
    /// The configuration the run used, for the observer and for a
    /// post-hoc audit of which settings produced this result.
    pub config: Config,
}

impl OptimizationResult {
    /// The last accepted iterate, i.e. the solution.
    pub fn best(&self) -> &IterationRecord {
        self.history
            .last()
            .expect("history always has at least the initial iterate")
    }

    /// Whether [`TerminationReason::is_convergence`] holds for the stop
    /// reason.
    pub fn converged(&self) -> bool {
        self.termination.is_convergence()
    }

    /// A human-readable summary of why the run stopped.
    pub fn status_message(&self) -> &'static str {
        self.termination.text()
    }
}

impl fmt::Display for OptimizationResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let best = self.best();
        writeln!(f, "OptimizationResult:")?;
        writeln!(f, "    iters:       {}", best.iter)?;
        writeln!(f, "    cost:        {}", best.f)?;
        writeln!(f, "    |grad|:      {}", best.grad_norm)?;
        writeln!(f, "    termination: {}", self.termination)?;
        writeln!(
            f,
            "    evals:       cost={} grad={} hessian={}",
            self.counts.cost, self.counts.gradient, self.counts.hessian
        )?;
        Ok(())
    }
}
