// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Strong-Wolfe line search (bracketing phase + `zoom`), following Nocedal
//! & Wright Algorithm 3.5/3.6. Grounded on
//! `argmin::solver::linesearch::morethuente::cstep`'s cubic-interpolation
//! step for the interior of `zoom`, simplified from its five-case dispatch
//! (driven by More-Thuente's `info` bookkeeping, which this crate has no
//! use for since it does not need to resume a step across calls) down to a
//! single cubic-minimizer formula with a bisection fallback: the bracket is
//! refined by cubic interpolation, falling back to bisection when the cubic
//! step lands outside the bracket or too close to its endpoints.

use nalgebra::DVector;

use crate::config::Config;
use crate::error::Error;
use crate::kv::KV;
use crate::linesearch::condition::{armijo, strong_curvature};
use crate::linesearch::{LineSearchOutcome, MAX_BRACKET_ITERS};
use crate::problem::{Objective, Problem};

/// One endpoint of the current bracket: step length plus the cached
/// objective value and directional derivative there.
struct Point {
    alpha: f64,
    f: f64,
    dphi: f64,
}

/// Minimum fraction of the bracket width a cubic step must fall inside of
/// either endpoint; closer than this, bisection is used instead (mirrors
/// `cstep`'s `bound`/`stpmin`/`stpmax` clamping).
const SAFEGUARD: f64 = 0.1;

/// Cubic-minimizer step between `lo` and `hi`, or `None` when the cubic has
/// no real minimizer in the admissible range (falls back to bisection).
fn cubic_step(lo: &Point, hi: &Point) -> Option<f64> {
    let d1 = lo.dphi + hi.dphi - 3.0 * (lo.f - hi.f) / (lo.alpha - hi.alpha);
    let d2_sq = d1 * d1 - lo.dphi * hi.dphi;
    if d2_sq < 0.0 {
        return None;
    }
    let d2 = d2_sq.sqrt() * (hi.alpha - lo.alpha).signum();
    let denom = hi.dphi - lo.dphi + 2.0 * d2;
    if denom == 0.0 {
        return None;
    }
    let alpha = hi.alpha - (hi.alpha - lo.alpha) * (hi.dphi + d2 - d1) / denom;

    let (min, max) = if lo.alpha < hi.alpha {
        (lo.alpha, hi.alpha)
    } else {
        (hi.alpha, lo.alpha)
    };
    let width = max - min;
    if alpha.is_finite() && alpha > min + SAFEGUARD * width && alpha < max - SAFEGUARD * width {
        Some(alpha)
    } else {
        None
    }
}

/// Bracket `[lo, hi]` (in the order the caller supplies, not necessarily
/// increasing) down to a point satisfying both strong-Wolfe conditions.
#[allow(clippy::too_many_arguments)]
fn zoom<O: Objective>(
    problem: &mut Problem<O>,
    x: &DVector<f64>,
    f0: f64,
    g0: &DVector<f64>,
    p: &DVector<f64>,
    cfg: &Config,
    mut lo: Point,
    mut hi: Point,
) -> Result<Option<(f64, DVector<f64>, f64, DVector<f64>)>, Error> {
    let alpha_tol = ALPHA_TOL;

    for _ in 0..MAX_BRACKET_ITERS {
        if (hi.alpha - lo.alpha).abs() < alpha_tol {
            return Ok(None);
        }

        let alpha = cubic_step(&lo, &hi).unwrap_or_else(|| 0.5 * (lo.alpha + hi.alpha));

        let x_trial = x + alpha * p;
        let f_trial = problem.cost(&x_trial)?;
        if !f_trial.is_finite() {
            hi = Point {
                alpha,
                f: f_trial,
                dphi: f64::NAN,
            };
            continue;
        }

        if !armijo(f_trial, f0, g0, p, alpha, cfg.c1) || f_trial >= lo.f {
            hi = Point {
                alpha,
                f: f_trial,
                dphi: f64::NAN,
            };
            continue;
        }

        let g_trial = problem.gradient(&x_trial)?;
        let dphi_trial = g_trial.dot(p);

        if strong_curvature(&g_trial, p, g0, cfg.c2) {
            return Ok(Some((alpha, x_trial, f_trial, g_trial)));
        }

        if dphi_trial * (hi.alpha - lo.alpha) >= 0.0 {
            hi = Point {
                alpha: lo.alpha,
                f: lo.f,
                dphi: lo.dphi,
            };
        }
        lo = Point {
            alpha,
            f: f_trial,
            dphi: dphi_trial,
        };
    }
    Ok(None)
}

/// Floating-point-scale-independent tolerance for the width of a collapsed
/// bracket.
const ALPHA_TOL: f64 = 1e-12;

/// Bracket-then-zoom strong-Wolfe search starting from `cfg.lambda`,
/// doubling (clamped to `cfg.lambdamax`) until the bracketing phase's exit
/// tests fire.
pub fn search<O: Objective>(
    problem: &mut Problem<O>,
    x: &DVector<f64>,
    f0: f64,
    g0: &DVector<f64>,
    p: &DVector<f64>,
    cfg: &Config,
) -> Result<LineSearchOutcome, Error> {
    let since = problem.counts();
    let dphi0 = g0.dot(p);

    let mut prev = Point {
        alpha: 0.0,
        f: f0,
        dphi: dphi0,
    };
    let mut alpha = cfg.lambda.min(cfg.lambdamax);

    for iter in 0..MAX_BRACKET_ITERS {
        let x_trial = x + alpha * p;
        let f_trial = problem.cost(&x_trial)?;

        let violates_armijo = !f_trial.is_finite() || !armijo(f_trial, f0, g0, p, alpha, cfg.c1);
        let worse_than_prev = iter > 0 && f_trial >= prev.f;

        if violates_armijo || worse_than_prev {
            let hi = Point {
                alpha,
                f: if f_trial.is_finite() { f_trial } else { f64::INFINITY },
                dphi: f64::NAN,
            };
            let zoomed = zoom(problem, x, f0, g0, p, cfg, prev, hi)?;
            return finish(problem, x, f0, g0, p, cfg, since, zoomed);
        }

        let g_trial = problem.gradient(&x_trial)?;
        let dphi_trial = g_trial.dot(p);

        if strong_curvature(&g_trial, p, g0, cfg.c2) {
            return Ok(LineSearchOutcome {
                alpha,
                x_new: x_trial,
                f_new: f_trial,
                g_new: g_trial,
                evals: problem.counts_since(since),
                ok: true,
                kv: KV::new().with("bracket_iters", iter as u64),
            });
        }

        if dphi_trial >= 0.0 {
            let lo = Point {
                alpha,
                f: f_trial,
                dphi: dphi_trial,
            };
            let zoomed = zoom(problem, x, f0, g0, p, cfg, lo, prev)?;
            return finish(problem, x, f0, g0, p, cfg, since, zoomed);
        }

        prev = Point {
            alpha,
            f: f_trial,
            dphi: dphi_trial,
        };
        alpha = (2.0 * alpha).min(cfg.lambdamax);
    }

    Ok(LineSearchOutcome {
        alpha,
        x_new: x.clone(),
        f_new: f0,
        g_new: g0.clone(),
        evals: problem.counts_since(since),
        ok: false,
        kv: KV::new().with("reason", "bracket search exhausted"),
    })
}

#[allow(clippy::too_many_arguments)]
fn finish<O: Objective>(
    problem: &mut Problem<O>,
    x: &DVector<f64>,
    f0: f64,
    g0: &DVector<f64>,
    _p: &DVector<f64>,
    _cfg: &Config,
    since: crate::problem::EvalCounts,
    zoomed: Option<(f64, DVector<f64>, f64, DVector<f64>)>,
) -> Result<LineSearchOutcome, Error> {
    match zoomed {
        Some((alpha, x_new, f_new, g_new)) => Ok(LineSearchOutcome {
            alpha,
            x_new,
            f_new,
            g_new,
            evals: problem.counts_since(since),
            ok: true,
            kv: KV::new(),
        }),
        None => Ok(LineSearchOutcome {
            alpha: 0.0,
            x_new: x.clone(),
            f_new: f0,
            g_new: g0.clone(),
            evals: problem.counts_since(since),
            ok: false,
            kv: KV::new().with("reason", "zoom tolerance breached"),
        }),
    }
}
