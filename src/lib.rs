// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! gradmin is a small, single-threaded unconstrained nonlinear optimization
//! core written entirely in Rust.
//!
//! It drives a smooth objective `f: R^n -> R` with an analytic gradient
//! toward a stationary point by iteratively choosing a descent direction
//! and a step length. Problem loading, result plotting, and domain-specific
//! objectives are left to the caller; this crate sees an objective only
//! through the [`Objective`](problem::Objective) trait.
//!
//! # Methods
//!
//! - [`GradientDescent`](config::Method::GradientDescent) — steepest descent
//! - [`ConjugateGradient`](config::Method::ConjugateGradient) — Polak-Ribière
//!   nonlinear conjugate gradient with hard restart
//! - [`Bfgs`](config::Method::Bfgs) — BFGS quasi-Newton, inverse-Hessian form
//! - [`TrustRegion`](config::Method::TrustRegion) — positive-definite dogleg
//!   trust-region step
//!
//! # Line searches
//!
//! - [`Armijo`](config::LineSearchKind::Armijo) backtracking
//! - [`StrongWolfe`](config::LineSearchKind::StrongWolfe) bracketing + zoom
//!
//! # Example
//!
//! ```
//! use gradmin::config::{Config, Method};
//! use gradmin::error::Error;
//! use gradmin::kv::KV;
//! use gradmin::observer::Observe;
//! use gradmin::problem::Objective;
//! use gradmin::state::IterationRecord;
//! use nalgebra::DVector;
//!
//! struct Quadratic;
//!
//! impl Objective for Quadratic {
//!     fn cost(&self, x: &DVector<f64>) -> Result<f64, Error> {
//!         Ok(0.5 * x.dot(x))
//!     }
//!
//!     fn gradient(&self, x: &DVector<f64>) -> Result<DVector<f64>, Error> {
//!         Ok(x.clone())
//!     }
//! }
//!
//! struct NullObserver;
//!
//! impl Observe for NullObserver {
//!     fn observe_init(&mut self, _msg: &str, _kv: &KV) -> Result<(), Error> {
//!         Ok(())
//!     }
//!
//!     fn observe_iter(&mut self, _record: &IterationRecord, _kv: &KV) -> Result<(), Error> {
//!         Ok(())
//!     }
//! }
//!
//! let cfg = Config::new(Method::Bfgs).with_maxiter(50);
//! let x0 = DVector::from_vec(vec![1.0, 1.0]);
//! let mut observer = NullObserver;
//! let result = gradmin::optimize(Quadratic, x0, cfg, &mut observer).unwrap();
//! assert!(result.converged());
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod kv;
pub mod linesearch;
pub mod method;
pub mod observer;
pub mod problem;
pub mod result;
pub mod state;
pub mod termination;
pub mod trustregion;

pub use config::{Config, Method};
pub use driver::optimize;
pub use error::{Error, OptimError};
pub use problem::Objective;
pub use result::OptimizationResult;
