// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The six end-to-end scenarios of `spec.md` §8, run through the public
//! `gradmin::optimize` entry point. Rosenbrock comes from
//! `argmin_testfunctions`, the same crate `argmin`'s own examples and
//! tests use; Rastrigin's gradient has no published closed form in that
//! crate (only the value), so it is written out here.

use gradmin::config::{Config, EtaThresholds, LineSearchKind, Method};
use gradmin::error::Error;
use gradmin::kv::{KvValue, KV};
use gradmin::observer::Observe;
use gradmin::problem::Objective;
use gradmin::state::IterationRecord;
use nalgebra::DVector;

/// Collects the `KV` attached to every observed iteration, used to check
/// for method-specific auxiliary facts (a CG restart, a trust-region
/// ratio) without threading extra plumbing through the driver.
#[derive(Default)]
struct KvCollector {
    kvs: Vec<KV>,
}

impl Observe for KvCollector {
    fn observe_init(&mut self, _msg: &str, _kv: &KV) -> Result<(), Error> {
        Ok(())
    }

    fn observe_iter(&mut self, _record: &IterationRecord, kv: &KV) -> Result<(), Error> {
        self.kvs.push(kv.clone());
        Ok(())
    }
}

impl KvCollector {
    fn any_bool(&self, key: &str, value: bool) -> bool {
        self.kvs
            .iter()
            .any(|kv| kv.get(key) == Some(&KvValue::Bool(value)))
    }

    fn floats(&self, key: &str) -> Vec<f64> {
        self.kvs
            .iter()
            .filter_map(|kv| match kv.get(key) {
                Some(KvValue::Float(v)) => Some(*v),
                _ => None,
            })
            .collect()
    }
}

/// `f(x) = 1/2 x^T A x - b^T x`, `A = diag(1, 10, 100)`, `b = (1,1,1)`.
/// Minimized at `x* = A^-1 b = (1, 0.1, 0.01)`.
struct DiagonalQuadratic {
    diag: DVector<f64>,
}

impl Objective for DiagonalQuadratic {
    fn cost(&self, x: &DVector<f64>) -> Result<f64, Error> {
        let quad: f64 = x.zip_map(&self.diag, |xi, di| di * xi * xi).sum();
        Ok(0.5 * quad - x.sum())
    }

    fn gradient(&self, x: &DVector<f64>) -> Result<DVector<f64>, Error> {
        Ok(x.zip_map(&self.diag, |xi, di| di * xi) - DVector::from_element(x.len(), 1.0))
    }
}

struct Rosenbrock2D;

impl Objective for Rosenbrock2D {
    fn cost(&self, x: &DVector<f64>) -> Result<f64, Error> {
        Ok(argmin_testfunctions::rosenbrock(x.as_slice()))
    }

    fn gradient(&self, x: &DVector<f64>) -> Result<DVector<f64>, Error> {
        Ok(DVector::from_vec(argmin_testfunctions::rosenbrock_derivative(
            x.as_slice(),
        )))
    }
}

/// `f(x) = a n + sum(x_i^2 - a cos(2 pi x_i))`, `a = 10`. Global minimum at
/// the origin; `x0 = (0.3, 0.3)` sits in the basin of that same minimum.
struct Rastrigin2D;

impl Objective for Rastrigin2D {
    fn cost(&self, x: &DVector<f64>) -> Result<f64, Error> {
        Ok(argmin_testfunctions::rastrigin(x.as_slice()))
    }

    fn gradient(&self, x: &DVector<f64>) -> Result<DVector<f64>, Error> {
        use std::f64::consts::PI;
        Ok(x.map(|xi| 2.0 * xi + 20.0 * PI * (2.0 * PI * xi).sin()))
    }
}

struct ConstantObjective;

impl Objective for ConstantObjective {
    fn cost(&self, _x: &DVector<f64>) -> Result<f64, Error> {
        Ok(1.0)
    }

    fn gradient(&self, x: &DVector<f64>) -> Result<DVector<f64>, Error> {
        Ok(DVector::zeros(x.len()))
    }
}

#[test]
fn scenario_1_bfgs_strong_wolfe_on_diagonal_quadratic() {
    let cfg = Config::new(Method::Bfgs)
        .with_linesearch(LineSearchKind::StrongWolfe)
        .with_maxiter(10);
    let objective = DiagonalQuadratic {
        diag: DVector::from_vec(vec![1.0, 10.0, 100.0]),
    };
    let x0 = DVector::from_vec(vec![0.0, 0.0, 0.0]);
    let mut observer = KvCollector::default();
    let result = gradmin::optimize(objective, x0, cfg, &mut observer).unwrap();

    assert!(result.converged());
    assert!(result.best().iter <= 4, "expected <= 4 iterations, got {}", result.best().iter);
    assert!(result.best().grad_norm < 1e-8);

    let expected = DVector::from_vec(vec![1.0, 0.1, 0.01]);
    assert!((&result.best().x - &expected).norm() < 1e-6);
}

#[test]
fn scenario_2_bfgs_strong_wolfe_on_rosenbrock() {
    let cfg = Config::new(Method::Bfgs)
        .with_linesearch(LineSearchKind::StrongWolfe)
        .with_maxiter(50);
    let x0 = DVector::from_vec(vec![-1.2, 1.0]);
    let mut observer = KvCollector::default();
    let result = gradmin::optimize(Rosenbrock2D, x0, cfg, &mut observer).unwrap();

    assert!(result.converged());
    assert!(result.best().iter < 50);
    assert!(result.best().f < 1e-10, "f = {}", result.best().f);
    assert!((&result.best().x - &DVector::from_vec(vec![1.0, 1.0])).norm() < 1e-4);
}

#[test]
fn scenario_3_conjugate_gradient_strong_wolfe_on_rosenbrock_restarts() {
    let cfg = Config::new(Method::ConjugateGradient)
        .with_linesearch(LineSearchKind::StrongWolfe)
        .with_maxiter(500);
    assert_eq!(cfg.c2(), 0.4);

    let x0 = DVector::from_vec(vec![-1.2, 1.0]);
    let mut observer = KvCollector::default();
    let result = gradmin::optimize(Rosenbrock2D, x0, cfg, &mut observer).unwrap();

    assert!(result.converged() || result.best().grad_norm < 1e-4);
    assert!(
        observer.any_bool("restarted", true),
        "expected at least one CG restart over the run"
    );
}

#[test]
fn scenario_4_gradient_descent_armijo_on_rastrigin() {
    let cfg = Config::new(Method::GradientDescent).with_maxiter(10_000);
    let x0 = DVector::from_vec(vec![0.3, 0.3]);
    let mut observer = KvCollector::default();
    let result = gradmin::optimize(Rastrigin2D, x0, cfg, &mut observer).unwrap();

    assert!(result.converged());
    assert!(result.best().grad_norm < 1e-6, "|g| = {}", result.best().grad_norm);
    assert!(result.best().x.norm() < 1e-3, "x = {:?}", result.best().x);
}

#[test]
fn scenario_5_trust_region_on_rosenbrock_shrinks_and_expands() {
    let cfg = Config::new(Method::TrustRegion)
        .with_delta0(1.0)
        .unwrap()
        .with_eta(EtaThresholds {
            eta1: 0.01,
            eta2: 0.25,
            eta3: 0.75,
        })
        .unwrap()
        .with_maxiter(200);
    let x0 = DVector::from_vec(vec![-1.2, 1.0]);
    let mut observer = KvCollector::default();
    let result = gradmin::optimize(Rosenbrock2D, x0, cfg, &mut observer).unwrap();

    assert!(result.converged());
    assert!((&result.best().x - &DVector::from_vec(vec![1.0, 1.0])).norm() < 1e-2);

    let rhos = observer.floats("rho");
    assert!(rhos.iter().any(|&rho| rho < 0.01), "expected at least one shrink (rho < eta1)");
    assert!(rhos.iter().any(|&rho| rho >= 0.75), "expected at least one expand (rho >= eta3)");
}

#[test]
fn scenario_6_constant_objective_terminates_before_any_step() {
    let cfg = Config::new(Method::GradientDescent);
    let x0 = DVector::from_vec(vec![0.0, 0.0]);
    let mut observer = KvCollector::default();
    let result = gradmin::optimize(ConstantObjective, x0, cfg, &mut observer).unwrap();

    // `|g_prev| < ngtol` is checked before `|g| < ngtol` (spec.md §4.5's
    // priority order), and at iteration 0 the two are the same record, so
    // this is the cause that actually fires.
    assert_eq!(result.history.len(), 1);
    assert_eq!(result.status_message(), "gradient too small (previous iterate)");
}
