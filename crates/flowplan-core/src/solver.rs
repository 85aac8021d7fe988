//! LP backend seam and the retry policy around it.
//!
//! [`LinearSolver`] is the seam to the numeric backend. [`GoodLpSolver`]
//! implements it with `good_lp` on the pure-Rust `microlp` engine. The
//! driver [`solve_with_retry`] runs an explicit state machine:
//!
//! ```text
//! Attempting(n) --optimal-------------------> Solved
//! Attempting(n) --infeasible----------------> Infeasible
//! Attempting(n) --unbounded-----------------> Unbounded
//! Attempting(n) --abnormal, n + 1 < max-----> Attempting(n + 1)
//! Attempting(n) --abnormal, otherwise-------> Abnormal
//! ```
//!
//! Every attempt uses a distinct seed. Seed zero solves the problem as
//! built; any other seed perturbs the objective weights slightly, which is
//! usually enough to step around a degenerate pivot sequence.

use crate::lp::{ConstraintKind, LpProblem};
use crate::rng::SeedRng;
use good_lp::{Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable, default_solver, variable};
use serde::{Deserialize, Serialize};

/// Hard cap on attempts per solve.
pub const MAX_ATTEMPTS: u32 = 3;

/// Relative size of the objective perturbation on reseeded attempts.
const PERTURBATION: f64 = 1e-7;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Largest constraint violation accepted in a returned solution, relative
    /// to the largest right-hand side.
    pub feasibility_tolerance: f64,
    /// Attempts before giving up on abnormal results; capped at
    /// [`MAX_ATTEMPTS`].
    pub max_attempts: u32,
    /// Seed of the first attempt; later attempts count up from it.
    pub base_seed: u64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            feasibility_tolerance: 1e-4,
            max_attempts: MAX_ATTEMPTS,
            base_seed: 0,
        }
    }
}

impl SolverSettings {
    pub fn effective_max_attempts(&self) -> u32 {
        self.max_attempts.clamp(1, MAX_ATTEMPTS)
    }

    pub fn seed_for_attempt(&self, attempt: u32) -> u64 {
        self.base_seed.wrapping_add(attempt as u64)
    }
}

// ---------------------------------------------------------------------------
// Backend seam
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverParams {
    pub attempt: u32,
    pub seed: u64,
    pub feasibility_tolerance: f64,
}

/// Result of a single backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum SolverOutcome {
    /// Column values in column order.
    Optimal(Vec<f64>),
    Infeasible,
    Unbounded,
    /// Numerical trouble or an internal backend error.
    Abnormal(String),
}

pub trait LinearSolver: Send + Sync {
    fn solve(&self, problem: &LpProblem, params: &SolverParams) -> SolverOutcome;
}

/// `good_lp` backend using the bundled `microlp` simplex.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoodLpSolver;

impl LinearSolver for GoodLpSolver {
    fn solve(&self, problem: &LpProblem, params: &SolverParams) -> SolverOutcome {
        if problem.columns().is_empty() {
            return SolverOutcome::Optimal(Vec::new());
        }

        let mut vars = ProblemVariables::new();
        let columns: Vec<Variable> = problem
            .columns()
            .iter()
            .map(|_| vars.add(variable().min(0.0)))
            .collect();

        let mut rng = SeedRng::new(params.seed);
        let mut objective = Expression::default();
        for (var, column) in columns.iter().zip(problem.columns()) {
            let weight = if params.seed == 0 {
                column.cost
            } else {
                column.cost * rng.jitter(PERTURBATION)
            };
            objective.add_mul(weight, *var);
        }

        let mut model = vars.minimise(objective).using(default_solver);
        for constraint in problem.constraints() {
            let mut lhs = Expression::default();
            for &(column, coefficient) in &constraint.coefficients {
                lhs.add_mul(coefficient, columns[column]);
            }
            model = model.with(match constraint.kind {
                ConstraintKind::Equal => lhs.eq(constraint.rhs),
                ConstraintKind::GreaterOrEqual => lhs.geq(constraint.rhs),
                ConstraintKind::LessOrEqual => lhs.leq(constraint.rhs),
            });
        }

        let solution = match model.solve() {
            Ok(solution) => solution,
            Err(ResolutionError::Infeasible) => return SolverOutcome::Infeasible,
            Err(ResolutionError::Unbounded) => return SolverOutcome::Unbounded,
            Err(other) => return SolverOutcome::Abnormal(other.to_string()),
        };

        let raw: Vec<f64> = columns.iter().map(|v| solution.value(*v)).collect();
        if raw.iter().any(|v| !v.is_finite()) {
            return SolverOutcome::Abnormal("solution contains non-finite values".to_string());
        }
        // Only round-off below the column bound is clamped; small rates are real.
        let values: Vec<f64> = raw.into_iter().map(|x| x.max(0.0)).collect();

        let tolerance = params.feasibility_tolerance;

        let scale = problem
            .constraints()
            .iter()
            .map(|c| c.rhs.abs())
            .fold(1.0, f64::max);
        let violation = problem.max_violation(&values);
        if violation > tolerance * scale {
            return SolverOutcome::Abnormal(format!("constraint violated by {violation:e}"));
        }
        SolverOutcome::Optimal(values)
    }
}

// ---------------------------------------------------------------------------
// Retry state machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum SolveState {
    Attempting(u32),
    Solved(Vec<f64>),
    Infeasible,
    Unbounded,
    Abnormal,
}

impl SolveState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SolveState::Attempting(_))
    }

    /// Transition out of `Attempting(attempt)` given the backend outcome.
    pub fn advance(attempt: u32, outcome: SolverOutcome, max_attempts: u32) -> SolveState {
        match outcome {
            SolverOutcome::Optimal(values) => SolveState::Solved(values),
            SolverOutcome::Infeasible => SolveState::Infeasible,
            SolverOutcome::Unbounded => SolveState::Unbounded,
            SolverOutcome::Abnormal(_) if attempt + 1 < max_attempts => SolveState::Attempting(attempt + 1),
            SolverOutcome::Abnormal(_) => SolveState::Abnormal,
        }
    }
}

/// Terminal state plus the number of backend calls it took.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryReport {
    pub state: SolveState,
    pub attempts: u32,
}

pub fn solve_with_retry(solver: &dyn LinearSolver, problem: &LpProblem, settings: &SolverSettings) -> RetryReport {
    let max_attempts = settings.effective_max_attempts();
    let mut state = SolveState::Attempting(0);
    let mut attempts = 0;

    while let SolveState::Attempting(attempt) = state {
        let params = SolverParams {
            attempt,
            seed: settings.seed_for_attempt(attempt),
            feasibility_tolerance: settings.feasibility_tolerance,
        };
        tracing::debug!(
            attempt,
            seed = params.seed,
            columns = problem.columns().len(),
            constraints = problem.constraints().len(),
            "solving"
        );
        let outcome = solver.solve(problem, &params);
        attempts += 1;
        if let SolverOutcome::Abnormal(reason) = &outcome {
            tracing::warn!(attempt, %reason, "abnormal solver result");
        }
        state = SolveState::advance(attempt, outcome, max_attempts);
    }

    RetryReport { state, attempts }
}
