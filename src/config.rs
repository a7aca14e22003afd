// Copyright 2026 QOC Engine Contributors
// SPDX-License-Identifier: Apache-2.0

//! Problem-definition configuration.
//!
//! An [`EvolutionConfig`] fixes everything that stays immutable for one
//! optimization run: the Hilbert dimension, the control-parameter count,
//! the time grid, and the compute-backend tag. Values are loaded with the
//! following priority (later sources override earlier ones):
//!
//! 1. Built-in defaults
//! 2. config.yaml file
//! 3. Environment variables (QOC_*)

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::backend::Backend;
use crate::error::{Error, Result};

/// Immutable per-run problem dimensions and backend selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Hilbert-space dimension `n`.
    #[serde(default = "default_hilbert_size")]
    pub hilbert_size: usize,

    /// Control parameters per time step.
    #[serde(default = "default_param_count")]
    pub param_count: usize,

    /// Number of discrete time steps.
    #[serde(default = "default_step_count")]
    pub step_count: usize,

    /// Total evolution time covered by the grid.
    #[serde(default = "default_evolution_time")]
    pub evolution_time: f64,

    /// Compute-backend tag, consistent across every operation of the run.
    #[serde(default)]
    pub backend: Backend,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            hilbert_size: default_hilbert_size(),
            param_count: default_param_count(),
            step_count: default_step_count(),
            evolution_time: default_evolution_time(),
            backend: Backend::default(),
        }
    }
}

impl EvolutionConfig {
    /// Load configuration from a YAML file and the environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = EvolutionConfig::default();

        if let Some(path) = config_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                config = serde_yml::from_str(&content)?;
            }
        }

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = env::var("QOC_BACKEND") {
            self.backend = val.parse()?;
        }
        if let Ok(val) = env::var("QOC_STEP_COUNT") {
            if let Ok(steps) = val.parse() {
                self.step_count = steps;
            }
        }
        if let Ok(val) = env::var("QOC_EVOLUTION_TIME") {
            if let Ok(time) = val.parse() {
                self.evolution_time = time;
            }
        }
        Ok(())
    }

    /// Grid spacing `dt = evolution_time / step_count`.
    pub fn dt(&self) -> f64 {
        self.evolution_time / self.step_count as f64
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<()> {
        if self.hilbert_size == 0 {
            return Err(Error::Config("hilbert_size must be > 0".into()));
        }
        if self.param_count == 0 {
            return Err(Error::Config("param_count must be > 0".into()));
        }
        if self.step_count == 0 {
            return Err(Error::Config("step_count must be > 0".into()));
        }
        if !(self.evolution_time > 0.0) {
            return Err(Error::Config("evolution_time must be > 0".into()));
        }
        Ok(())
    }
}

fn default_hilbert_size() -> usize {
    2
}

fn default_param_count() -> usize {
    1
}

fn default_step_count() -> usize {
    100
}

fn default_evolution_time() -> f64 {
    100.0
}
