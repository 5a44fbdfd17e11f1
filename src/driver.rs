// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The iteration driver: direction oracle or trust-region step, termination
//! checks in a fixed priority order, progress reporting. Modeled on
//! `argmin::core::executor::Executor::run`'s loop structure,
//! collapsed to this crate's single concrete `Objective`/state type and a
//! closed set of four methods rather than a generic `Solver`.

use std::time::Instant;

use nalgebra::DVector;

use crate::config::{Config, LineSearchKind, Method};
use crate::error::{Error, OptimError};
use crate::kv::KV;
use crate::linesearch::{armijo, strongwolfe};
use crate::method::MethodState;
use crate::observer::Observe;
use crate::problem::{Objective, Problem};
use crate::result::OptimizationResult;
use crate::state::{DecisionState, IterationRecord};
use crate::termination::TerminationReason;
use crate::trustregion::TrustRegionState;

enum Engine {
    LineSearch(MethodState),
    TrustRegion(TrustRegionState),
}

struct StepOutcome {
    x: DVector<f64>,
    f: f64,
    g: DVector<f64>,
    p: DVector<f64>,
    alpha: f64,
    accepted: bool,
    suppress_change_checks: bool,
    kv: KV,
}

/// Run the solver configured by `cfg` on `objective`, starting from `x0`,
/// reporting progress to `observer` every `cfg.progress` accepted
/// iterations.
pub fn optimize<O: Objective>(
    objective: O,
    x0: DVector<f64>,
    cfg: Config,
    observer: &mut dyn Observe,
) -> Result<OptimizationResult, Error> {
    let n = x0.len();
    let mut problem = Problem::new(objective);

    let (f0, g0) = problem.cost_and_gradient(&x0)?;
    check_finite(f0, &g0, 0)?;

    let initial = IterationRecord::initial(x0, f0, g0);
    let mut decision = DecisionState::new(initial.clone());
    let mut history = vec![initial];

    let mut engine = match cfg.method() {
        Method::TrustRegion => Engine::TrustRegion(TrustRegionState::new(n, &cfg)),
        method => Engine::LineSearch(MethodState::new(
            method,
            n,
            f0,
            &decision.current.x,
            &decision.current.g,
        )),
    };

    observer.observe_init(&format!("starting optimization ({:?})", cfg.method()), &KV::new())?;

    let mut suppress_change_checks = false;
    let mut outer_iter: u64 = 0;

    let termination = 'outer: loop {
        if let Some(reason) =
            check_termination(&decision, &cfg, suppress_change_checks, &engine, outer_iter)
        {
            break 'outer reason;
        }

        let started = Instant::now();
        let since = problem.counts();

        let step = match &mut engine {
            Engine::LineSearch(method) => {
                let (p, dir_kv, suppress_dir) = method.direction(&decision.current.g);

                let outcome = match cfg.linesearch() {
                    LineSearchKind::Armijo => armijo::search(
                        &mut problem,
                        &decision.current.x,
                        decision.current.f,
                        &decision.current.g,
                        &p,
                        &cfg,
                    )?,
                    LineSearchKind::StrongWolfe => strongwolfe::search(
                        &mut problem,
                        &decision.current.x,
                        decision.current.f,
                        &decision.current.g,
                        &p,
                        &cfg,
                    )?,
                };

                if !outcome.ok {
                    break 'outer TerminationReason::LineSearchFailed;
                }

                let (post_kv, suppress_post) =
                    method.post_step(&outcome.x_new, outcome.f_new, &outcome.g_new);

                StepOutcome {
                    x: outcome.x_new,
                    f: outcome.f_new,
                    g: outcome.g_new,
                    p,
                    alpha: outcome.alpha,
                    accepted: true,
                    suppress_change_checks: suppress_dir || suppress_post,
                    kv: dir_kv.merge(post_kv).merge(outcome.kv),
                }
            }
            Engine::TrustRegion(state) => {
                let (x_new, f_new, g_new, accepted, kv) = state.step(
                    &mut problem,
                    &decision.current.x,
                    decision.current.f,
                    &decision.current.g,
                    &cfg,
                )?;
                let p = &x_new - &decision.current.x;
                StepOutcome {
                    x: x_new,
                    f: f_new,
                    g: g_new,
                    p,
                    alpha: 1.0,
                    accepted,
                    suppress_change_checks: !accepted,
                    kv,
                }
            }
        };

        check_finite(step.f, &step.g, outer_iter + 1)?;
        outer_iter += 1;
        suppress_change_checks = step.suppress_change_checks;

        if step.accepted {
            let mut rec = IterationRecord::initial(step.x, step.f, step.g);
            rec.iter = decision.current.iter + 1;
            rec.p = step.p;
            rec.alpha = step.alpha;
            rec.line_search_evals = problem.counts_since(since);
            rec.time = started.elapsed();

            decision.shift(rec.clone());
            history.push(rec.clone());

            let progress = cfg.progress.max(1);
            if rec.iter % progress == 0 {
                observer.observe_iter(&rec, &step.kv)?;
            }
        }
    };

    Ok(OptimizationResult {
        history,
        termination,
        counts: problem.counts(),
        config: cfg,
    })
}

/// Reject a run the instant a NaN or infinite value appears; every
/// subsequent decision in the driver assumes finite inputs.
fn check_finite(f: f64, g: &DVector<f64>, iter: u64) -> Result<(), Error> {
    if !f.is_finite() || !g.iter().all(|v| v.is_finite()) {
        return Err(OptimError::NonFinite {
            text: "objective or gradient returned a non-finite value".to_string(),
            iter,
        }
        .into());
    }
    Ok(())
}

/// Check the fixed termination priority order:
/// line-search failure (handled inline at the call site, since it has no
/// corresponding iterate to check against) takes priority over the
/// gradient-norm checks, which take priority over the change-based checks
/// (skipped for one iteration after a CG restart or BFGS reset, and always
/// skipped under `TrustRegion`), which take priority over the iteration
/// ceiling, which takes priority over the trust-region radius floor.
fn check_termination(
    decision: &DecisionState,
    cfg: &Config,
    suppress_change_checks: bool,
    engine: &Engine,
    outer_iter: u64,
) -> Option<TerminationReason> {
    if decision.prev.grad_norm < cfg.ngtol {
        return Some(TerminationReason::GradientNormPrev);
    }
    if decision.current.grad_norm < cfg.ngtol {
        return Some(TerminationReason::GradientNorm);
    }

    if outer_iter > 0 && cfg.method() != Method::TrustRegion && !suppress_change_checks {
        if (decision.current.f - decision.prev.f).abs() < cfg.dftol {
            return Some(TerminationReason::ObjectiveChange);
        }
        if (&decision.current.x - &decision.prev.x).norm() < cfg.dxtol {
            return Some(TerminationReason::IterateChange);
        }
    }

    if let Some(max) = cfg.maxiter() {
        if outer_iter >= max {
            return Some(TerminationReason::MaxIterationsReached);
        }
    }

    if let Engine::TrustRegion(state) = engine {
        if state.radius() < cfg.deltatol {
            return Some(TerminationReason::TrustRegionRadius);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Method;

    struct ConstantObjective;

    impl Objective for ConstantObjective {
        fn cost(&self, _x: &DVector<f64>) -> Result<f64, Error> {
            Ok(1.0)
        }

        fn gradient(&self, x: &DVector<f64>) -> Result<DVector<f64>, Error> {
            Ok(DVector::zeros(x.len()))
        }
    }

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
    }

    struct NullObserver;

    impl Observe for NullObserver {
        fn observe_init(&mut self, _msg: &str, _kv: &KV) -> Result<(), Error> {
            Ok(())
        }

        fn observe_iter(&mut self, _record: &IterationRecord, _kv: &KV) -> Result<(), Error> {
            Ok(())
        }
    }

    #[test]
    fn a_stationary_point_terminates_immediately_with_gradient_norm() {
        // At iteration 0, prev and current are the same seeded record, so
        // the `|g_prev| < ngtol` check (which runs first) fires before
        // `|g| < ngtol` ever gets a chance to.
        let cfg = Config::new(Method::GradientDescent);
        let x0 = DVector::from_vec(vec![0.0, 0.0]);
        let mut observer = NullObserver;
        let result = optimize(ConstantObjective, x0, cfg, &mut observer).unwrap();
        assert_eq!(result.termination, TerminationReason::GradientNormPrev);
        assert_eq!(result.history.len(), 1);
    }

    #[test]
    fn bfgs_converges_on_a_diagonal_quadratic() {
        let cfg = Config::new(Method::Bfgs)
            .with_linesearch(LineSearchKind::StrongWolfe)
            .with_maxiter(50);
        let objective = Quadratic {
            diag: DVector::from_vec(vec![1.0, 10.0, 100.0]),
        };
        let x0 = DVector::from_vec(vec![1.0, 1.0, 1.0]);
        let mut observer = NullObserver;
        let result = optimize(objective, x0, cfg, &mut observer).unwrap();
        assert!(result.converged());
        assert!(result.best().f < 1e-10);
    }

    #[test]
    fn maxiter_of_zero_stops_before_any_step() {
        let cfg = Config::new(Method::GradientDescent).with_maxiter(0);
        let objective = Quadratic {
            diag: DVector::from_vec(vec![1.0, 1.0]),
        };
        let x0 = DVector::from_vec(vec![1.0, 1.0]);
        let mut observer = NullObserver;
        let result = optimize(objective, x0, cfg, &mut observer).unwrap();
        assert_eq!(result.termination, TerminationReason::MaxIterationsReached);
        assert_eq!(result.history.len(), 1);
    }
}
