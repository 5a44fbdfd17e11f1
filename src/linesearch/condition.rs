// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The acceptance tests shared by both line searches, split out of the
//! search loops themselves. Modeled on `argmin`'s
//! `solver::linesearch::condition` module (`ArmijoCondition`,
//! `StrongWolfeCondition`), collapsed from a generic trait to free
//! functions over `f64`/`DVector<f64>` since this crate has only the one
//! scalar type.
//!
//! # References
//!
//! Jorge Nocedal and Stephen J. Wright (2006). Numerical Optimization.
//! Springer. ISBN 0-387-30303-0.

use nalgebra::DVector;

/// The sufficient-decrease (Armijo) test:
/// `f(x + alpha p) <= f(x) + c1 alpha (g . p)`.
pub fn armijo(f_trial: f64, f0: f64, g0: &DVector<f64>, p: &DVector<f64>, alpha: f64, c1: f64) -> bool {
    f_trial <= f0 + c1 * alpha * g0.dot(p)
}

/// The curvature test of the strong Wolfe conditions:
/// `|g(x + alpha p) . p| <= c2 |g(x) . p|`.
pub fn strong_curvature(
    g_trial: &DVector<f64>,
    p: &DVector<f64>,
    g0: &DVector<f64>,
    c2: f64,
) -> bool {
    g_trial.dot(p).abs() <= c2 * g0.dot(p).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn armijo_accepts_sufficient_decrease() {
        let g0 = DVector::from_vec(vec![-1.0]);
        let p = DVector::from_vec(vec![1.0]);
        // f0 = 1, slope g0.p = -1, c1 = 0.1, alpha = 0.5 -> bound = 1 - 0.05 = 0.95
        assert!(armijo(0.9, 1.0, &g0, &p, 0.5, 0.1));
        assert!(!armijo(0.96, 1.0, &g0, &p, 0.5, 0.1));
    }

    #[test]
    fn strong_curvature_rejects_steep_residual_slope() {
        let g0 = DVector::from_vec(vec![-1.0]);
        let p = DVector::from_vec(vec![1.0]);
        let g_trial_ok = DVector::from_vec(vec![-0.2]);
        let g_trial_bad = DVector::from_vec(vec![-0.95]);
        assert!(strong_curvature(&g_trial_ok, &p, &g0, 0.9));
        assert!(!strong_curvature(&g_trial_bad, &p, &g0, 0.9));
    }
}
