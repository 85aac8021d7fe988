//! Planner configuration.

use crate::amount::DisplaySettings;
use crate::solver::{MAX_ATTEMPTS, SolverSettings};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub solver: SolverSettings,
    pub display: DisplaySettings,
}

impl PlannerConfig {
    /// Reject settings the solver would otherwise silently clamp.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tolerance = self.solver.feasibility_tolerance;
        if !(tolerance > 0.0 && tolerance < 1.0) {
            return Err(ConfigError::InvalidTolerance(tolerance));
        }
        if self.solver.max_attempts == 0 || self.solver.max_attempts > MAX_ATTEMPTS {
            return Err(ConfigError::InvalidAttempts(self.solver.max_attempts));
        }
        if !(self.display.items_per_belt > 0.0) || !(self.display.fluid_per_pipe > 0.0) {
            return Err(ConfigError::InvalidThroughput);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("feasibility tolerance must be in (0, 1), got {0}")]
    InvalidTolerance(f64),
    #[error("max attempts must be between 1 and {MAX_ATTEMPTS}, got {0}")]
    InvalidAttempts(u32),
    #[error("belt and pipe throughput must be positive")]
    InvalidThroughput,
}
