//! Table solve pipeline: resolve rows, build the LP, solve, write back.
//!
//! Nested sub-tables are flattened into their root: every enabled row in the
//! tree becomes one column, and every link in the tree becomes one
//! conservation constraint. Goods without a link are free imports or exports
//! and show up in [`ProductionTable::flows`].

use crate::id::ObjectWithQuality;
use crate::lp::{CoefficientTable, ConstraintKind, LinearConstraint, LpProblem};
use crate::model::{FuelInformation, LinkAlgorithm, ModelError, ProductionTable, RowFlow, RowSolution};
use crate::ordering::OrderingContext;
use crate::preferences::SelectionSession;
use crate::resolve::{RowParameters, resolve_row};
use crate::solver::{LinearSolver, SolveState, SolverSettings, solve_with_retry};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
    /// Retries exhausted without a usable answer.
    Abnormal,
}

impl SolveStatus {
    pub fn is_success(self) -> bool {
        self == SolveStatus::Optimal
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SolveStatus::Optimal => "optimal",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Unbounded => "unbounded",
            SolveStatus::Abnormal => "indeterminate",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolveReport {
    pub status: SolveStatus,
    /// Backend calls made; zero when the problem was rejected before solving.
    pub attempts: u32,
    /// Objective value of the accepted solution.
    pub objective: Option<f64>,
}

/// Flattened problem plus what is needed to map values back onto rows.
struct BuiltProblem {
    problem: LpProblem,
    coefficients: CoefficientTable,
    /// Parameters and column per visited row; `None` for disabled rows.
    rows: Vec<Option<(RowParameters, usize)>>,
    /// A link no enabled row touches asks for a non-zero amount.
    trivially_infeasible: bool,
}

fn build_problem(
    table: &ProductionTable,
    ctx: &OrderingContext<'_>,
    session: &mut SelectionSession,
    settings: &SolverSettings,
) -> Result<BuiltProblem, ModelError> {
    let mut visited = Vec::new();
    table.collect_rows(true, &mut visited);

    let mut problem = LpProblem::new();
    let mut coefficients = CoefficientTable::new();
    let mut rows = Vec::with_capacity(visited.len());

    for (row, enabled) in visited {
        if !enabled {
            rows.push(None);
            continue;
        }
        let params = resolve_row(row, ctx, session)?;
        let column = problem.add_column(params.cost);
        if let Some(buildings) = row.fixed_buildings {
            problem.fix_column(column, params.runs_for_buildings(buildings as f64));
        }
        for (goods, amount) in &params.products {
            coefficients.add(*goods, column, *amount);
        }
        for (goods, amount) in &params.ingredients {
            coefficients.add(*goods, column, -*amount);
        }
        if let Some((fuel, amount)) = &params.fuel {
            coefficients.add(*fuel, column, -*amount);
        }
        rows.push(Some((params, column)));
    }

    let mut links = Vec::new();
    table.collect_links(&mut links);
    let mut seen = HashSet::new();
    let mut trivially_infeasible = false;
    for link in links {
        if !seen.insert(link.goods) {
            tracing::warn!(goods = link.goods.target.0, "duplicate link in nested table ignored");
            continue;
        }
        let kind = match link.algorithm {
            LinkAlgorithm::Match => ConstraintKind::Equal,
            LinkAlgorithm::AllowOverProduction => ConstraintKind::GreaterOrEqual,
            LinkAlgorithm::AllowOverConsumption => ConstraintKind::LessOrEqual,
        };
        let constraint = LinearConstraint {
            coefficients: coefficients.row(link.goods),
            kind,
            rhs: link.amount as f64,
        };
        if constraint.coefficients.is_empty() {
            if constraint.violation(&[]) > settings.feasibility_tolerance {
                trivially_infeasible = true;
            }
            continue;
        }
        problem.add_constraint(constraint);
    }

    Ok(BuiltProblem {
        problem,
        coefficients,
        rows,
        trivially_infeasible,
    })
}

fn scaled(amounts: &[(ObjectWithQuality, f64)], rate: f64) -> Vec<RowFlow> {
    amounts
        .iter()
        .map(|(goods, amount)| RowFlow {
            goods: *goods,
            amount: (amount * rate) as f32,
        })
        .collect()
}

fn row_solution(params: &RowParameters, rate: f64) -> RowSolution {
    RowSolution {
        recipes_per_second: rate,
        buildings: params.buildings_for_runs(rate),
        crafter: params.crafter,
        ingredients: scaled(&params.ingredients, rate),
        products: scaled(&params.products, rate),
        fuel: params.fuel.map(|(goods, per_run)| FuelInformation {
            goods,
            amount: (per_run * rate) as f32,
        }),
    }
}

/// Solve `table` in place.
///
/// On success every enabled row gets a fresh solution and disabled rows lose
/// theirs. On any failure status rows keep their last-known values.
pub fn solve_table(
    table: &mut ProductionTable,
    ctx: &OrderingContext<'_>,
    settings: &SolverSettings,
    solver: &dyn LinearSolver,
) -> Result<SolveReport, ModelError> {
    let mut session = SelectionSession::new();
    let built = build_problem(table, ctx, &mut session, settings)?;

    if built.trivially_infeasible {
        tracing::warn!("link requests goods no enabled row touches");
        table.set_last_status(SolveStatus::Infeasible);
        return Ok(SolveReport {
            status: SolveStatus::Infeasible,
            attempts: 0,
            objective: None,
        });
    }

    let retry = solve_with_retry(solver, &built.problem, settings);
    let status = match &retry.state {
        SolveState::Solved(_) => SolveStatus::Optimal,
        SolveState::Infeasible => SolveStatus::Infeasible,
        SolveState::Unbounded => SolveStatus::Unbounded,
        SolveState::Abnormal | SolveState::Attempting(_) => SolveStatus::Abnormal,
    };
    table.set_last_status(status);

    let SolveState::Solved(values) = retry.state else {
        tracing::warn!(%status, attempts = retry.attempts, "table solve failed");
        return Ok(SolveReport {
            status,
            attempts: retry.attempts,
            objective: None,
        });
    };

    let mut solutions = built.rows.into_iter();
    table.for_each_row_mut(&mut |row| match solutions.next().flatten() {
        Some((params, column)) => row.set_solution(row_solution(&params, values[column])),
        None => row.clear_solution(),
    });

    let tolerance = settings.feasibility_tolerance;
    let flows: Vec<RowFlow> = built
        .coefficients
        .goods()
        .filter_map(|goods| {
            let net = built.coefficients.net(goods, &values);
            (net.abs() > tolerance).then_some(RowFlow {
                goods,
                amount: net as f32,
            })
        })
        .collect();
    table.set_flows(flows);

    let objective = built.problem.objective_value(&values);
    tracing::info!(
        rows = values.len(),
        attempts = retry.attempts,
        objective,
        "table solved"
    );
    Ok(SolveReport {
        status,
        attempts: retry.attempts,
        objective: Some(objective),
    })
}

/// Solve several independent tables, each with its own selection session.
#[cfg(not(feature = "parallel"))]
pub fn solve_tables(
    tables: &mut [ProductionTable],
    ctx: &OrderingContext<'_>,
    settings: &SolverSettings,
    solver: &dyn LinearSolver,
) -> Vec<Result<SolveReport, ModelError>> {
    tables
        .iter_mut()
        .map(|table| solve_table(table, ctx, settings, solver))
        .collect()
}

/// Solve several independent tables, each with its own selection session.
#[cfg(feature = "parallel")]
pub fn solve_tables(
    tables: &mut [ProductionTable],
    ctx: &OrderingContext<'_>,
    settings: &SolverSettings,
    solver: &dyn LinearSolver,
) -> Vec<Result<SolveReport, ModelError>> {
    use rayon::prelude::*;
    tables
        .par_iter_mut()
        .map(|table| solve_table(table, ctx, settings, solver))
        .collect()
}
