// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Backtracking (Armijo) line search, modeled on
//! `argmin::solver::linesearch::backtracking::BacktrackingLineSearch`,
//! specialized to halving steps and a fixed `c1`.

use nalgebra::DVector;

use crate::config::Config;
use crate::error::Error;
use crate::kv::KV;
use crate::linesearch::condition::armijo;
use crate::linesearch::{LineSearchOutcome, ALPHA_FLOOR};
use crate::problem::{Objective, Problem};

/// Backtrack from `cfg.lambda`, halving `alpha` until the Armijo condition
/// holds or `alpha` undercuts [`ALPHA_FLOOR`].
///
/// Only `cost` is evaluated at each trial point; the gradient is evaluated
/// once, at the accepted point.
pub fn search<O: Objective>(
    problem: &mut Problem<O>,
    x: &DVector<f64>,
    f0: f64,
    g0: &DVector<f64>,
    p: &DVector<f64>,
    cfg: &Config,
) -> Result<LineSearchOutcome, Error> {
    let since = problem.counts();
    let mut alpha = cfg.lambda;
    let mut backtracks: u64 = 0;

    loop {
        let x_trial = x + alpha * p;
        let f_trial = problem.cost(&x_trial)?;

        if f_trial.is_finite() && armijo(f_trial, f0, g0, p, alpha, cfg.c1) {
            let g_trial = problem.gradient(&x_trial)?;
            return Ok(LineSearchOutcome {
                alpha,
                x_new: x_trial,
                f_new: f_trial,
                g_new: g_trial,
                evals: problem.counts_since(since),
                ok: true,
                kv: KV::new().with("backtracks", backtracks),
            });
        }

        alpha *= 0.5;
        backtracks += 1;

        if alpha < ALPHA_FLOOR {
            return Ok(LineSearchOutcome {
                alpha,
                x_new: x.clone(),
                f_new: f0,
                g_new: g0.clone(),
                evals: problem.counts_since(since),
                ok: false,
                kv: KV::new()
                    .with("backtracks", backtracks)
                    .with("reason", "alpha floor undercut"),
            });
        }
    }
}
