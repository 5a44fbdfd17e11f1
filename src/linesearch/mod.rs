// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Step-length selection along a fixed search direction.
//!
//! `Method`/`LineSearchKind` selection is a static enum resolved once in
//! the driver, so the two searches here are plain generic functions rather
//! than implementations of a `LineSearch` trait object — there is never a
//! need to box or swap a search at runtime.

pub mod armijo;
pub mod condition;
pub mod strongwolfe;

use nalgebra::DVector;

use crate::kv::KV;
use crate::problem::EvalCounts;

/// The floor below which a backtracking step length is considered collapsed.
pub const ALPHA_FLOOR: f64 = 1e-16;

/// Safety cap on the number of outer bracketing iterations for the
/// Strong-Wolfe search. The bracketing loop doubles `alpha` up to
/// `lambdamax` and is bounded in principle, but a cap guards against a
/// pathological objective that never satisfies either exit test before
/// `lambdamax` is reached many times over due to floating point noise.
pub const MAX_BRACKET_ITERS: usize = 64;

/// The result of a completed (successful or failed) line search.
#[derive(Debug, Clone)]
pub struct LineSearchOutcome {
    /// The accepted step length (meaningless when `ok` is `false`).
    pub alpha: f64,
    /// The accepted point `x + alpha p`.
    pub x_new: DVector<f64>,
    /// `f` at `x_new`.
    pub f_new: f64,
    /// `g` at `x_new`.
    pub g_new: DVector<f64>,
    /// Cost/gradient evaluations spent finding this step.
    pub evals: EvalCounts,
    /// Whether an acceptable step was found.
    pub ok: bool,
    /// Auxiliary facts for the observer (e.g. `"bracket_iters"`).
    pub kv: KV,
}
