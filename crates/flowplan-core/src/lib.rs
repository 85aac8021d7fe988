//! Flowplan Core -- production chain planning for factory-building games.
//!
//! Given a catalog of goods, recipes and crafters, a set of user preferences
//! and a table of recipe rows, this crate computes how many times per second
//! each recipe runs and how much of every ingredient, product and fuel moves.
//!
//! # Solve Pipeline
//!
//! Each call to [`solve::solve_table`] runs four steps:
//!
//! 1. **Resolve** -- Settle every open choice of every enabled row (crafter,
//!    fuel, ambiguous ingredient variants) with the default pickers.
//! 2. **Build** -- One non-negative column per enabled row, one conservation
//!    constraint per link, fixed building counts as equalities.
//! 3. **Solve** -- Run the LP backend under the retry policy.
//! 4. **Write back** -- Rates, amounts, fuel and building counts onto rows,
//!    net flows onto the table.
//!
//! # Ambiguity Resolution
//!
//! Choices are ranked by accessibility first (see [`milestones`]), then by a
//! domain key (see [`ordering`]). Quick-select actions use
//! [`select::select_single`], which only picks when the answer is
//! unambiguous and otherwise explains why not:
//!
//! ```rust,ignore
//! let selection = select_single(catalog.recipes_producing(gear), &ctx);
//! if let Some(recipe) = selection.selected {
//!     table.add_recipe(&ctx, ObjectWithQuality::normal(recipe))?;
//! } else {
//!     println!("{}", selection.hint);
//! }
//! ```
//!
//! # Key Types
//!
//! - [`catalog::Catalog`] -- Immutable registry of goods, recipes, crafters
//!   and technologies (frozen at load).
//! - [`milestones::Milestones`] -- Per-object accessibility masks.
//! - [`ordering::ObjectOrdering`] -- Comparator trait and its domain
//!   specializations.
//! - [`model::ProductionTable`] -- Recipe rows, links and solved flows.
//! - [`solver::LinearSolver`] -- LP backend seam with a `good_lp`
//!   implementation.
//! - [`worker::SolveWorker`] -- Background solving with supersede semantics.
//! - [`amount`] -- Amount formatting and parsing.

pub mod amount;
pub mod catalog;
pub mod config;
pub mod id;
pub mod lp;
pub mod milestones;
pub mod model;
pub mod ordering;
pub mod preferences;
pub mod resolve;
pub mod rng;
pub mod select;
pub mod solve;
pub mod solver;
pub mod worker;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
