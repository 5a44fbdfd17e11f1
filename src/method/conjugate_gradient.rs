// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Polak-Ribière nonlinear conjugate gradient with hard restart, modeled on
//! `argmin::solver::conjugategradient::beta::PolakRibiere` and the
//! nonlinear CG driver's restart-on-non-descent behaviour, collapsed into
//! a single state object since this crate runs exactly one method per
//! solve.

use nalgebra::DVector;

use crate::kv::KV;

/// Carries the previous direction and gradient needed to form the next
/// Polak-Ribière update.
#[derive(Debug, Clone)]
pub struct ConjugateGradientState {
    prev_g: Option<DVector<f64>>,
    prev_p: Option<DVector<f64>>,
}

impl ConjugateGradientState {
    /// A fresh state; the first call to [`Self::direction`] always takes
    /// the steepest-descent direction since there is no previous step yet.
    pub fn new() -> Self {
        ConjugateGradientState {
            prev_g: None,
            prev_p: None,
        }
    }

    /// Compute the next search direction.
    ///
    /// Returns the direction, a [`KV`] recording `beta` and whether a
    /// restart occurred, and `restarted`: `true` when the direction fell
    /// back to steepest descent, in which case the driver suppresses its
    /// `dftol`/`dxtol` checks for this iteration.
    pub fn direction(&mut self, g: &DVector<f64>) -> (DVector<f64>, KV, bool) {
        let (p, beta, restarted) = match (&self.prev_g, &self.prev_p) {
            (Some(prev_g), Some(prev_p)) => {
                let denom = prev_g.dot(prev_g);
                let raw_beta = if denom > 0.0 {
                    (g.dot(g) - g.dot(prev_g)) / denom
                } else {
                    0.0
                };

                if raw_beta <= 0.0 {
                    // beta clamps to zero: a restart in its own right, per
                    // spec.md's PR+ restart rule, independent of the
                    // descent check below.
                    (-g, 0.0, true)
                } else {
                    let candidate = -g + raw_beta * prev_p;
                    if g.dot(&candidate) < 0.0 {
                        (candidate, raw_beta, false)
                    } else {
                        (-g, 0.0, true)
                    }
                }
            }
            _ => (-g, 0.0, true),
        };

        self.prev_g = Some(g.clone());
        self.prev_p = Some(p.clone());

        let kv = KV::new().with("beta", beta).with("restarted", restarted);
        (p, kv, restarted)
    }
}

impl Default for ConjugateGradientState {
    fn default() -> Self {
        Self::new()
    }
}
