//! Solver-independent linear program.
//!
//! A problem is a list of non-negative columns with objective weights and a
//! list of linear constraints over them. The solve pipeline fills one in from
//! a production table; a [`crate::solver::LinearSolver`] turns it into column
//! values.

use crate::id::ObjectWithQuality;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Equal,
    GreaterOrEqual,
    LessOrEqual,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub coefficients: Vec<(usize, f64)>,
    pub kind: ConstraintKind,
    pub rhs: f64,
}

impl LinearConstraint {
    /// Left-hand side evaluated at `values`.
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .map(|&(column, coefficient)| coefficient * values.get(column).copied().unwrap_or(0.0))
            .sum()
    }

    /// Amount by which `values` breaks this constraint; zero when satisfied.
    pub fn violation(&self, values: &[f64]) -> f64 {
        let lhs = self.evaluate(values);
        match self.kind {
            ConstraintKind::Equal => (lhs - self.rhs).abs(),
            ConstraintKind::GreaterOrEqual => (self.rhs - lhs).max(0.0),
            ConstraintKind::LessOrEqual => (lhs - self.rhs).max(0.0),
        }
    }
}

/// One variable, bounded below by zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub cost: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LpProblem {
    columns: Vec<Column>,
    constraints: Vec<LinearConstraint>,
}

impl LpProblem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a non-negative column with the given objective weight.
    pub fn add_column(&mut self, cost: f64) -> usize {
        self.columns.push(Column { cost });
        self.columns.len() - 1
    }

    pub fn add_constraint(&mut self, constraint: LinearConstraint) {
        self.constraints.push(constraint);
    }

    /// Pin a column to a single value.
    pub fn fix_column(&mut self, column: usize, value: f64) {
        self.constraints.push(LinearConstraint {
            coefficients: vec![(column, 1.0)],
            kind: ConstraintKind::Equal,
            rhs: value,
        });
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    /// Largest constraint violation at `values`, including negative columns.
    pub fn max_violation(&self, values: &[f64]) -> f64 {
        let negative = values.iter().map(|v| (-v).max(0.0)).fold(0.0, f64::max);
        self.constraints
            .iter()
            .map(|c| c.violation(values))
            .fold(negative, f64::max)
    }

    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.columns.iter().zip(values).map(|(c, v)| c.cost * v).sum()
    }
}

// ---------------------------------------------------------------------------
// Coefficient table
// ---------------------------------------------------------------------------

/// Per-goods, per-column net amounts per run for one build pass.
///
/// Contributions to the same goods from the same column add up, so a row
/// that both consumes and produces a goods, or burns an ingredient as fuel,
/// ends up with its net coefficient.
#[derive(Debug, Clone, Default)]
pub struct CoefficientTable {
    entries: BTreeMap<ObjectWithQuality, BTreeMap<usize, f64>>,
}

impl CoefficientTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate `amount` (positive produces, negative consumes).
    pub fn add(&mut self, goods: ObjectWithQuality, column: usize, amount: f64) {
        *self.entries.entry(goods).or_default().entry(column).or_insert(0.0) += amount;
    }

    pub fn coefficient(&self, goods: ObjectWithQuality, column: usize) -> f64 {
        self.entries
            .get(&goods)
            .and_then(|columns| columns.get(&column))
            .copied()
            .unwrap_or(0.0)
    }

    /// Goods in deterministic order.
    pub fn goods(&self) -> impl Iterator<Item = ObjectWithQuality> + '_ {
        self.entries.keys().copied()
    }

    /// Sparse row for one goods, ready to become a constraint.
    pub fn row(&self, goods: ObjectWithQuality) -> Vec<(usize, f64)> {
        self.entries
            .get(&goods)
            .map(|columns| columns.iter().map(|(c, v)| (*c, *v)).collect())
            .unwrap_or_default()
    }

    /// Net flow of `goods` at the given column values.
    pub fn net(&self, goods: ObjectWithQuality, values: &[f64]) -> f64 {
        self.entries
            .get(&goods)
            .map(|columns| {
                columns
                    .iter()
                    .map(|(c, v)| v * values.get(*c).copied().unwrap_or(0.0))
                    .sum()
            })
            .unwrap_or(0.0)
    }
}
