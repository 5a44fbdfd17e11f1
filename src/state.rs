// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Per-iteration history, modeled on `argmin::core::state::IterState` but
//! flattened into a single append-only record type instead of argmin's
//! generic, type-parameterized state struct — this crate has exactly one
//! parameter type (`DVector<f64>`), so the extra generality buys nothing.

use std::time::Duration;

use nalgebra::DVector;
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::problem::EvalCounts;

/// One accepted iterate, plus everything an [`Observe`](crate::observer::Observe)
/// implementation or a post-hoc analysis needs about how it was reached.
///
/// Iteration 0 is the initial point (`x0`), with `p` and `alpha` left at
/// their defaults since no step was taken to reach it.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct IterationRecord {
    /// Iteration index, starting at 0 for the initial point.
    pub iter: u64,
    /// The iterate `x_k`.
    pub x: DVector<f64>,
    /// `f(x_k)`.
    pub f: f64,
    /// `∇f(x_k)`.
    pub g: DVector<f64>,
    /// Euclidean norm of `g`, the quantity `ngtol` is compared against.
    pub grad_norm: f64,
    /// Manhattan (L1) norm of `g`, carried alongside the Euclidean norm for
    /// callers that want it; never read by a termination check.
    pub grad_l1_norm: f64,
    /// The search direction that produced this iterate from the previous
    /// one (zero vector at iteration 0).
    pub p: DVector<f64>,
    /// The accepted step length (`0` at iteration 0).
    pub alpha: f64,
    /// Cost/gradient/Hessian evaluations spent inside the line search (or
    /// trust-region subproblem) that produced this iterate.
    pub line_search_evals: EvalCounts,
    /// Wall-clock time spent computing this iteration.
    pub time: Duration,
}

impl IterationRecord {
    /// Build the iteration-0 record from the initial point.
    pub fn initial(x: DVector<f64>, f: f64, g: DVector<f64>) -> Self {
        let n = x.len();
        let grad_norm = g.norm();
        let grad_l1_norm = g.iter().map(|v| v.abs()).sum();
        IterationRecord {
            iter: 0,
            x,
            f,
            g,
            grad_norm,
            grad_l1_norm,
            p: DVector::zeros(n),
            alpha: 0.0,
            line_search_evals: EvalCounts::default(),
            time: Duration::default(),
        }
    }
}

/// The previous and current iterate bundled together, since every
/// termination check and every direction oracle reads exactly these two.
#[derive(Debug, Clone)]
pub struct DecisionState {
    /// The iterate before the most recent accepted step.
    pub prev: IterationRecord,
    /// The current iterate.
    pub current: IterationRecord,
}

impl DecisionState {
    /// Seed the decision state from the initial point. `prev` is a clone of
    /// `current` so that `|x - x_prev|`-style checks are well-defined (and
    /// trivially zero) before any step has been taken.
    pub fn new(initial: IterationRecord) -> Self {
        DecisionState {
            prev: initial.clone(),
            current: initial,
        }
    }

    /// Shift history forward after accepting a new iterate: what was
    /// `current` becomes `prev`, and `next` becomes `current`.
    pub fn shift(&mut self, next: IterationRecord) {
        self.prev = std::mem::replace(&mut self.current, next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(iter: u64, x: f64, f: f64) -> IterationRecord {
        IterationRecord::initial(DVector::from_vec(vec![x]), f, DVector::from_vec(vec![-f]))
            .with_iter(iter)
    }

    impl IterationRecord {
        fn with_iter(mut self, iter: u64) -> Self {
            self.iter = iter;
            self
        }
    }

    #[test]
    fn initial_seeds_prev_equal_to_current() {
        let rec = record(0, 1.0, 2.0);
        let state = DecisionState::new(rec.clone());
        assert_eq!(state.prev.x, state.current.x);
        assert_eq!(state.prev.f, rec.f);
    }

    #[test]
    fn shift_moves_current_into_prev() {
        let rec0 = record(0, 1.0, 2.0);
        let mut state = DecisionState::new(rec0.clone());
        let rec1 = record(1, 0.5, 1.0);
        state.shift(rec1.clone());
        assert_eq!(state.prev.x, rec0.x);
        assert_eq!(state.current.x, rec1.x);
    }

    #[test]
    fn grad_norm_is_euclidean_not_manhattan() {
        let x = DVector::from_vec(vec![3.0, 4.0]);
        let g = DVector::from_vec(vec![3.0, -4.0]);
        let rec = IterationRecord::initial(x, 0.0, g);
        assert!((rec.grad_norm - 5.0).abs() < 1e-12);
        assert!((rec.grad_l1_norm - 7.0).abs() < 1e-12);
    }
}
