// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! `p = -g`, modeled on
//! `argmin::solver::gradientdescent::SteepestDescent`'s direction, stripped
//! of its line-search delegation (the driver owns that here).

use nalgebra::DVector;

/// The steepest-descent direction at the current iterate.
pub fn direction(g: &DVector<f64>) -> DVector<f64> {
    -g
}
