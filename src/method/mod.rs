// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The direction oracle: given the current iterate, produces the search
//! direction a line search then walks along.
//!
//! `TrustRegion` is not a direction oracle in this sense — it produces a
//! full step, not a direction for an external line search — so it lives
//! in [`crate::trustregion`] instead and is dispatched separately by the
//! driver.

pub mod bfgs;
pub mod conjugate_gradient;
pub mod gradient_descent;

use nalgebra::DVector;

use crate::kv::KV;

use bfgs::BfgsState;
use conjugate_gradient::ConjugateGradientState;

/// Per-method working state, carried across iterations by the driver.
pub enum MethodState {
    GradientDescent,
    ConjugateGradient(ConjugateGradientState),
    Bfgs(BfgsState),
}

impl MethodState {
    /// Initialize the working state for `method` at dimension `n`, given
    /// `f0 = f(x0)` (used to seed BFGS's `H = f0 I`) and `x0`/`g0` (used to
    /// seed BFGS's first curvature pair, so the `x0 -> x1` step already
    /// performs a real update instead of merely priming history).
    pub fn new(
        method: crate::config::Method,
        n: usize,
        f0: f64,
        x0: &DVector<f64>,
        g0: &DVector<f64>,
    ) -> Self {
        match method {
            crate::config::Method::GradientDescent => MethodState::GradientDescent,
            crate::config::Method::ConjugateGradient => {
                MethodState::ConjugateGradient(ConjugateGradientState::new())
            }
            crate::config::Method::Bfgs => MethodState::Bfgs(BfgsState::new(n, f0, x0, g0)),
            crate::config::Method::TrustRegion => {
                unreachable!("TrustRegion is driven by crate::trustregion, not MethodState")
            }
        }
    }

    /// The search direction at the current gradient `g`.
    ///
    /// Returns the direction, an observer [`KV`], and `suppress_change_checks`:
    /// `true` when the driver should skip its `dftol`/`dxtol` checks for
    /// this iteration (right after a CG restart or a BFGS curvature
    /// reset).
    pub fn direction(&mut self, g: &DVector<f64>) -> (DVector<f64>, KV, bool) {
        match self {
            MethodState::GradientDescent => (gradient_descent::direction(g), KV::new(), false),
            MethodState::ConjugateGradient(state) => state.direction(g),
            MethodState::Bfgs(state) => (state.direction(g), KV::new(), false),
        }
    }

    /// Update any per-method curvature state after a step has been
    /// accepted at the new iterate `(x, f, g)`. A no-op for methods with no
    /// such state.
    ///
    /// Returns `suppress_change_checks`, analogous to [`Self::direction`].
    pub fn post_step(&mut self, x: &DVector<f64>, f: f64, g: &DVector<f64>) -> (KV, bool) {
        match self {
            MethodState::GradientDescent | MethodState::ConjugateGradient(_) => {
                (KV::new(), false)
            }
            MethodState::Bfgs(state) => state.update(x, f, g),
        }
    }
}
