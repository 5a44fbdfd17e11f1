// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! The configuration bundle, validated once at construction (`spec.md` §6,
//! §7's "Configuration error" kind). Modeled on `argmin`'s validate-in-setter
//! builder style (`BacktrackingLineSearch::rho`,
//! `WolfeCondition::new`, `TrustRegion::eta`).

#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, OptimError};

/// The descent method (`spec.md` §4.3), a tagged variant replacing the
/// source's dynamic dispatch on a method-name string (`spec.md` §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub enum Method {
    /// `p = -g`, no state.
    GradientDescent,
    /// Polak-Ribière conjugate gradient with hard restart.
    ConjugateGradient,
    /// BFGS quasi-Newton, inverse-Hessian form.
    Bfgs,
    /// Positive-definite dogleg trust-region step.
    TrustRegion,
}

/// Which line search drives the step-length choice.
///
/// `TrustRegion` ignores this field entirely: exactly one of line search or
/// trust-region step runs per iteration (`spec.md` §3's invariant), and
/// `TrustRegion` always takes the latter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub enum LineSearchKind {
    /// Armijo backtracking.
    Armijo,
    /// Strong-Wolfe with cubic/quadratic zoom.
    StrongWolfe,
}

/// The three trust-region acceptance/resize thresholds `eta1 < eta2 < eta3`
/// of `spec.md` §3.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct EtaThresholds {
    /// Below this, a trial step is rejected and the radius shrinks.
    pub eta1: f64,
    /// Below this (but above `eta1`), the step is accepted and the radius
    /// still shrinks.
    pub eta2: f64,
    /// At or above this (with a near-boundary step), the radius expands.
    pub eta3: f64,
}

impl Default for EtaThresholds {
    fn default() -> Self {
        EtaThresholds {
            eta1: 0.01,
            eta2: 0.25,
            eta3: 0.75,
        }
    }
}

/// Solver configuration. Every field except `method` has the default from
/// `spec.md` §6's table; `c1`/`c2` additionally default differently for
/// `ConjugateGradient` (see [`Config::new`]).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct Config {
    pub(crate) method: Method,
    pub(crate) linesearch: LineSearchKind,
    pub(crate) maxiter: Option<u64>,
    pub(crate) ngtol: f64,
    pub(crate) dftol: f64,
    pub(crate) dxtol: f64,
    pub(crate) lambda: f64,
    pub(crate) lambdamax: f64,
    pub(crate) c1: f64,
    pub(crate) c2: f64,
    pub(crate) deltamax: f64,
    pub(crate) deltatol: f64,
    pub(crate) delta0: f64,
    pub(crate) eta: EtaThresholds,
    pub(crate) maxcond: f64,
    pub(crate) progress: u64,
}

impl Config {
    /// Start a configuration for `method` with every optional field at its
    /// documented default, including the CG-specific `c1`/`c2` of
    /// `spec.md` §6 (`1e-3`/`0.4` rather than `1e-4`/`0.9`).
    pub fn new(method: Method) -> Self {
        let (c1, c2) = match method {
            Method::ConjugateGradient => (1e-3, 0.4),
            _ => (1e-4, 0.9),
        };
        Config {
            method,
            linesearch: LineSearchKind::Armijo,
            maxiter: None,
            ngtol: 1e-8,
            dftol: 1e-8,
            dxtol: 1e-8,
            lambda: 1.0,
            lambdamax: 100.0,
            c1,
            c2,
            deltamax: 100.0,
            deltatol: f64::EPSILON.sqrt(),
            delta0: 1.0,
            eta: EtaThresholds::default(),
            maxcond: 1000.0,
            progress: 1,
        }
    }

    /// Select the line search (ignored for [`Method::TrustRegion`]).
    #[must_use]
    pub fn with_linesearch(mut self, linesearch: LineSearchKind) -> Self {
        self.linesearch = linesearch;
        self
    }

    /// Cap the number of outer iterations. `None` (the default) means no
    /// cap.
    #[must_use]
    pub fn with_maxiter(mut self, maxiter: u64) -> Self {
        self.maxiter = Some(maxiter);
        self
    }

    /// Gradient-norm stop, must be `>= 0`.
    pub fn with_ngtol(mut self, ngtol: f64) -> Result<Self, Error> {
        if ngtol < 0.0 {
            return Err(OptimError::InvalidParameter {
                text: "ngtol must be >= 0".to_string(),
            }
            .into());
        }
        self.ngtol = ngtol;
        Ok(self)
    }

    /// Objective-change stop (disabled under `TrustRegion`), must be `>= 0`.
    pub fn with_dftol(mut self, dftol: f64) -> Result<Self, Error> {
        if dftol < 0.0 {
            return Err(OptimError::InvalidParameter {
                text: "dftol must be >= 0".to_string(),
            }
            .into());
        }
        self.dftol = dftol;
        Ok(self)
    }

    /// Iterate-change stop (disabled under `TrustRegion`), must be `>= 0`.
    pub fn with_dxtol(mut self, dxtol: f64) -> Result<Self, Error> {
        if dxtol < 0.0 {
            return Err(OptimError::InvalidParameter {
                text: "dxtol must be >= 0".to_string(),
            }
            .into());
        }
        self.dxtol = dxtol;
        Ok(self)
    }

    /// Initial line-search step length, must be `> 0`.
    pub fn with_lambda(mut self, lambda: f64) -> Result<Self, Error> {
        if lambda <= 0.0 {
            return Err(OptimError::InvalidParameter {
                text: "lambda must be > 0".to_string(),
            }
            .into());
        }
        self.lambda = lambda;
        Ok(self)
    }

    /// Line-search step cap, must be `>= lambda`.
    pub fn with_lambdamax(mut self, lambdamax: f64) -> Result<Self, Error> {
        if lambdamax < self.lambda {
            return Err(OptimError::InvalidParameter {
                text: "lambdamax must be >= lambda".to_string(),
            }
            .into());
        }
        self.lambdamax = lambdamax;
        Ok(self)
    }

    /// Armijo/Wolfe `c1`, `c2` pair. `spec.md` §4.2: `0 < c1 < 1/2` always;
    /// additionally `c1 < c2 < 1/2` for `ConjugateGradient`, `c1 < c2 < 1`
    /// otherwise.
    pub fn with_wolfe_constants(mut self, c1: f64, c2: f64) -> Result<Self, Error> {
        if !(c1 > 0.0 && c1 < 0.5) {
            return Err(OptimError::InvalidParameter {
                text: "c1 must be in (0, 1/2)".to_string(),
            }
            .into());
        }
        let c2_upper = if self.method == Method::ConjugateGradient {
            0.5
        } else {
            1.0
        };
        if !(c2 > c1 && c2 < c2_upper) {
            return Err(OptimError::InvalidParameter {
                text: format!("c2 must be in ({c1}, {c2_upper})"),
            }
            .into());
        }
        self.c1 = c1;
        self.c2 = c2;
        Ok(self)
    }

    /// Trust-region maximum radius, must be `> 0`.
    pub fn with_deltamax(mut self, deltamax: f64) -> Result<Self, Error> {
        if deltamax <= 0.0 {
            return Err(OptimError::InvalidParameter {
                text: "deltamax must be > 0".to_string(),
            }
            .into());
        }
        self.deltamax = deltamax;
        Ok(self)
    }

    /// Trust-region radius stop, must be in `(0, deltamax)`.
    pub fn with_deltatol(mut self, deltatol: f64) -> Result<Self, Error> {
        if !(deltatol > 0.0 && deltatol < self.deltamax) {
            return Err(OptimError::InvalidParameter {
                text: "deltatol must be in (0, deltamax)".to_string(),
            }
            .into());
        }
        self.deltatol = deltatol;
        Ok(self)
    }

    /// Initial trust-region radius, must be in `[deltatol, deltamax]`.
    pub fn with_delta0(mut self, delta0: f64) -> Result<Self, Error> {
        if !(delta0 >= self.deltatol && delta0 <= self.deltamax) {
            return Err(OptimError::InvalidParameter {
                text: "delta0 must be in [deltatol, deltamax]".to_string(),
            }
            .into());
        }
        self.delta0 = delta0;
        Ok(self)
    }

    /// Trust-region acceptance/resize thresholds, must satisfy
    /// `0 <= eta1 < eta2 < eta3 < 1`.
    pub fn with_eta(mut self, eta: EtaThresholds) -> Result<Self, Error> {
        if !(eta.eta1 >= 0.0 && eta.eta1 < eta.eta2 && eta.eta2 < eta.eta3 && eta.eta3 < 1.0) {
            return Err(OptimError::InvalidParameter {
                text: "eta thresholds must satisfy 0 <= eta1 < eta2 < eta3 < 1".to_string(),
            }
            .into());
        }
        self.eta = eta;
        Ok(self)
    }

    /// Trust-region model-Hessian condition-number cap, must be `> 1`.
    pub fn with_maxcond(mut self, maxcond: f64) -> Result<Self, Error> {
        if maxcond <= 1.0 {
            return Err(OptimError::InvalidParameter {
                text: "maxcond must be > 1".to_string(),
            }
            .into());
        }
        self.maxcond = maxcond;
        Ok(self)
    }

    /// Emit progress every `n` iterations; `0` disables progress output
    /// entirely.
    #[must_use]
    pub fn with_progress(mut self, n: u64) -> Self {
        self.progress = n;
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn linesearch(&self) -> LineSearchKind {
        self.linesearch
    }

    pub fn maxiter(&self) -> Option<u64> {
        self.maxiter
    }

    pub fn c1(&self) -> f64 {
        self.c1
    }

    pub fn c2(&self) -> f64 {
        self.c2
    }
}
