// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Errors

use thiserror::Error;

/// Crate-wide error type used for solver plumbing that doesn't need a match
/// on a specific kind.
pub use anyhow::Error;

/// Optimizer error type.
///
/// Only the error kinds that are *fatal* for a run are represented here
/// (see the crate documentation for the kinds that are recovered silently
/// instead, such as a BFGS curvature reset or a CG restart).
#[derive(Debug, Error)]
pub enum OptimError {
    /// A configuration field violates one of its documented constraints.
    #[error("Invalid parameter: {text:?}")]
    InvalidParameter {
        /// Text
        text: String,
    },

    /// The objective or its gradient returned a NaN or infinite value.
    #[error("Non-finite value encountered at iteration {iter}: {text:?}")]
    NonFinite {
        /// Text
        text: String,
        /// Iteration at which the value was produced
        iter: u64,
    },

    /// A component was asked to act before being initialized.
    #[error("Not initialized: {text:?}")]
    NotInitialized {
        /// Text
        text: String,
    },

    /// Indicates an internal invariant was violated; likely a bug.
    #[error("Potential bug: {text:?}. Please file a report.")]
    PotentialBug {
        /// Text
        text: String,
    },
}
