// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! BFGS quasi-Newton, inverse-Hessian form. The update formula is grounded
//! on `fedemagnani-optimization-solvers`'s direct-nalgebra `BFGS::
//! update_next_iterate` (the only example in the retrieved pack that
//! carries the inverse-Hessian form rather than argmin's factored
//! `quasinewton::bfgs::BFGS`, which tracks the forward Hessian and solves a
//! linear system every step); the curvature guard and forced
//! symmetrization are this crate's own additions, documented in
//! `DESIGN.md`.

use nalgebra::DMatrix;
use nalgebra::DVector;

use crate::kv::KV;

/// Inverse-Hessian approximation `H`, updated once per accepted step.
#[derive(Debug, Clone)]
pub struct BfgsState {
    h: DMatrix<f64>,
    prev_x: DVector<f64>,
    prev_g: DVector<f64>,
}

impl BfgsState {
    /// Start from the scaled identity `H = f(x0) I`; a non-positive `f0`
    /// falls back to the plain identity, since a negative scale would make
    /// the initial direction an ascent direction. `x0`/`g0` seed the first
    /// curvature pair so the very first accepted step (`x0 -> x1`) feeds a
    /// real update instead of being spent just priming `prev_x`/`prev_g`
    /// (`spec.md` §4.3 applies the update "otherwise", i.e. from the first
    /// step onward — there is no step at which the update is skipped just
    /// for lack of history).
    pub fn new(n: usize, f0: f64, x0: &DVector<f64>, g0: &DVector<f64>) -> Self {
        let scale = if f0 > 0.0 { f0 } else { 1.0 };
        BfgsState {
            h: DMatrix::identity(n, n) * scale,
            prev_x: x0.clone(),
            prev_g: g0.clone(),
        }
    }

    /// The current search direction, `p = -H g`.
    pub fn direction(&self, g: &DVector<f64>) -> DVector<f64> {
        -&self.h * g
    }

    /// Update `H` from the step just taken, given the new iterate `(x, f,
    /// g)`.
    ///
    /// Returns a [`KV`] recording the curvature term `y . s` and whether
    /// the update was skipped (`reset == true`), and `reset` itself: when
    /// `true`, the curvature condition failed, `H` is reset to `f I`, and
    /// the driver suppresses its `dftol`/`dxtol` checks for this iteration,
    /// the same as after a CG restart.
    pub fn update(&mut self, x: &DVector<f64>, f: f64, g: &DVector<f64>) -> (KV, bool) {
        let s = x - &self.prev_x;
        let y = g - &self.prev_g;
        let ys = y.dot(&s);

        self.prev_x = x.clone();
        self.prev_g = g.clone();

        // Curvature condition: skip the update rather than let H lose
        // positive-definiteness (Nocedal & Wright §6.1).
        if ys <= 1e-10 * s.norm() * y.norm() {
            let scale = if f > 0.0 { f } else { 1.0 };
            self.h = DMatrix::identity(self.h.nrows(), self.h.ncols()) * scale;
            return (KV::new().with("ys", ys).with("reset", true), true);
        }

        let n = self.h.nrows();
        let identity = DMatrix::<f64>::identity(n, n);
        let rho = 1.0 / ys;
        let left = &identity - rho * &s * y.transpose();
        let right = &identity - rho * &y * s.transpose();
        self.h = &left * &self.h * &right + rho * &s * s.transpose();

        // Guard against asymmetry drift from repeated floating-point
        // updates.
        self.h = 0.5 * (&self.h + self.h.transpose());

        (KV::new().with("ys", ys).with("reset", false), false)
    }
}
