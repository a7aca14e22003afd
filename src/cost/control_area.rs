// Copyright 2026 QOC Engine Contributors
// SPDX-License-Identifier: Apache-2.0

//! Control-area penalty.
//!
//! Penalizes the area under the function of time generated by the
//! discrete control parameters. Each sample is scaled by
//! `dt / max_control_norm_p`, the scaled samples are summed with the
//! backend reduction, and the sum is normalized by
//! `param_count · step_count` so the value is comparable across problem
//! sizes.

use ndarray::{Array1, Array2, ArrayView2, Axis};
use num_complex::Complex64;

use super::{CostFn, EvaluationSchedule};
use crate::backend::LinearAlgebra;
use crate::error::{Error, Result};

/// Area-under-the-pulse penalty on the control trajectory.
pub struct ControlArea {
    dt: f64,
    max_control_norms: Array1<f64>,
    normalization: f64,
    multiplier: f64,
}

impl ControlArea {
    /// Create the penalty for a `(step_count, param_count)` trajectory
    /// over `evolution_time`, with one positive norm bound per parameter.
    pub fn new(
        param_count: usize,
        step_count: usize,
        evolution_time: f64,
        max_control_norms: Array1<f64>,
        multiplier: f64,
    ) -> Result<Self> {
        if max_control_norms.len() != param_count {
            return Err(Error::Config(format!(
                "max_control_norms must have one entry per parameter ({}), got {}",
                param_count,
                max_control_norms.len()
            )));
        }
        if max_control_norms.iter().any(|&norm| norm <= 0.0) {
            return Err(Error::Config(
                "max_control_norms entries must be positive".into(),
            ));
        }
        if step_count == 0 {
            return Err(Error::Config("step_count must be > 0".into()));
        }
        Ok(Self {
            dt: evolution_time / step_count as f64,
            max_control_norms,
            normalization: (param_count * step_count) as f64,
            multiplier,
        })
    }

    /// Per-entry scale `dt / (max_norm_p · normalization)`.
    fn entry_scale(&self, param: usize) -> f64 {
        self.dt / (self.max_control_norms[param] * self.normalization)
    }
}

impl CostFn for ControlArea {
    fn name(&self) -> &'static str {
        "control_area"
    }

    fn multiplier(&self) -> f64 {
        self.multiplier
    }

    fn schedule(&self) -> EvaluationSchedule {
        // Reads the whole trajectory once; states are ignored.
        EvaluationSchedule::FinalStep
    }

    fn cost(
        &self,
        controls: ArrayView2<'_, f64>,
        _states: &Array2<Complex64>,
        _step: usize,
        linalg: &dyn LinearAlgebra,
    ) -> f64 {
        let mut scaled = controls.to_owned();
        for (param, mut column) in scaled.axis_iter_mut(Axis(1)).enumerate() {
            let scale = self.dt / self.max_control_norms[param];
            column.mapv_inplace(|sample| sample * scale);
        }
        linalg.reduce_sum(scaled.view()) / self.normalization
    }

    fn control_vjp(
        &self,
        controls: ArrayView2<'_, f64>,
        _states: &Array2<Complex64>,
        _step: usize,
    ) -> Option<Array2<f64>> {
        // The penalty is linear in the controls, so the gradient is the
        // constant per-entry scale.
        let (steps, params) = controls.dim();
        Some(Array2::from_shape_fn((steps, params), |(_, param)| {
            self.entry_scale(param)
        }))
    }
}
