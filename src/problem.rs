// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The objective adapter: wraps a user callable and counts evaluations.

use nalgebra::{DMatrix, DVector};
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A smooth objective `f: R^n -> R` with an analytic gradient, supplied by
/// the caller. The adapter does not validate `x` or the returned values;
/// NaN/Inf detection is the driver's responsibility (see
/// [`OptimError::NonFinite`](crate::error::OptimError::NonFinite)).
///
/// Implementors are free to carry an opaque parameter bundle (bound at
/// construction) and to parallelize internally; `cost`/`gradient` are only
/// ever called from a single thread, one call at a time.
pub trait Objective {
    /// Evaluate the objective at `x`.
    fn cost(&self, x: &DVector<f64>) -> Result<f64, Error>;

    /// Evaluate the gradient at `x`.
    fn gradient(&self, x: &DVector<f64>) -> Result<DVector<f64>, Error>;

    /// Evaluate both the cost and the gradient at `x`.
    ///
    /// The default implementation calls `cost` and `gradient` separately;
    /// override it when the two share intermediate work.
    fn cost_and_gradient(&self, x: &DVector<f64>) -> Result<(f64, DVector<f64>), Error> {
        Ok((self.cost(x)?, self.gradient(x)?))
    }

    /// Evaluate the Hessian at `x`, used only by the trust-region method's
    /// condition-number guard when a true Hessian (rather than a BFGS
    /// approximation) is available. Optional: the default errors out, and
    /// `TrustRegion` falls back to the running BFGS approximation when this
    /// is not overridden (see `DESIGN.md`).
    fn hessian(&self, _x: &DVector<f64>) -> Result<DMatrix<f64>, Error> {
        Err(crate::error::OptimError::NotInitialized {
            text: "Objective::hessian is not implemented for this objective".to_string(),
        }
        .into())
    }
}

/// Running evaluation counts for one [`Problem`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct EvalCounts {
    /// Number of calls to `cost`.
    pub cost: u64,
    /// Number of calls to `gradient` (including the gradient half of
    /// `cost_and_gradient`).
    pub gradient: u64,
    /// Number of calls to `hessian`.
    pub hessian: u64,
}

/// Wraps an [`Objective`] and counts how often each operation is invoked,
/// modeled on `argmin`'s `OpWrapper`. Unlike `OpWrapper`'s `HashMap`-based
/// counters, the set of operations here is fixed and small, so a plain
/// struct is used instead.
pub struct Problem<O> {
    objective: O,
    counts: EvalCounts,
}

impl<O: Objective> Problem<O> {
    /// Wrap an objective, starting all counters at zero.
    pub fn new(objective: O) -> Self {
        Problem {
            objective,
            counts: EvalCounts::default(),
        }
    }

    /// Evaluate the cost, counting the call.
    pub fn cost(&mut self, x: &DVector<f64>) -> Result<f64, Error> {
        self.counts.cost += 1;
        self.objective.cost(x)
    }

    /// Evaluate the gradient, counting the call.
    pub fn gradient(&mut self, x: &DVector<f64>) -> Result<DVector<f64>, Error> {
        self.counts.gradient += 1;
        self.objective.gradient(x)
    }

    /// Evaluate cost and gradient together, counting both.
    pub fn cost_and_gradient(&mut self, x: &DVector<f64>) -> Result<(f64, DVector<f64>), Error> {
        self.counts.cost += 1;
        self.counts.gradient += 1;
        self.objective.cost_and_gradient(x)
    }

    /// Evaluate the Hessian, counting the call.
    pub fn hessian(&mut self, x: &DVector<f64>) -> Result<DMatrix<f64>, Error> {
        self.counts.hessian += 1;
        self.objective.hessian(x)
    }

    /// Current evaluation counts.
    pub fn counts(&self) -> EvalCounts {
        self.counts
    }

    /// Evaluation counts accumulated since `since`, used by the driver to
    /// report `line_search_evals` per outer iteration.
    pub fn counts_since(&self, since: EvalCounts) -> EvalCounts {
        EvalCounts {
            cost: self.counts.cost - since.cost,
            gradient: self.counts.gradient - since.gradient,
            hessian: self.counts.hessian - since.hessian,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Quadratic;

    impl Objective for Quadratic {
        fn cost(&self, x: &DVector<f64>) -> Result<f64, Error> {
            Ok(0.5 * x.dot(x))
        }

        fn gradient(&self, x: &DVector<f64>) -> Result<DVector<f64>, Error> {
            Ok(x.clone())
        }
    }

    #[test]
    fn counts_accumulate_independently() {
        let mut problem = Problem::new(Quadratic);
        let x = DVector::from_vec(vec![1.0, 2.0]);
        problem.cost(&x).unwrap();
        problem.cost(&x).unwrap();
        problem.gradient(&x).unwrap();
        let counts = problem.counts();
        assert_eq!(counts.cost, 2);
        assert_eq!(counts.gradient, 1);
        assert_eq!(counts.hessian, 0);
    }

    #[test]
    fn counts_since_reports_delta() {
        let mut problem = Problem::new(Quadratic);
        let x = DVector::from_vec(vec![1.0, 2.0]);
        problem.cost(&x).unwrap();
        let since = problem.counts();
        problem.cost_and_gradient(&x).unwrap();
        let delta = problem.counts_since(since);
        assert_eq!(delta.cost, 1);
        assert_eq!(delta.gradient, 1);
    }

    #[test]
    fn hessian_defaults_to_not_initialized_error() {
        let mut problem = Problem::new(Quadratic);
        let x = DVector::from_vec(vec![1.0, 2.0]);
        assert!(problem.hessian(&x).is_err());
    }
}
