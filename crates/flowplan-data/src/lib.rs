//! Data-driven catalog and settings loading for flowplan.
//!
//! Catalog content lives in RON, JSON or TOML files named by object kind
//! (see [`loader`]). Planner settings and user preferences live next to them
//! as optional `planner.*` and `preferences.*` files (see [`config`]).

pub mod config;
pub mod loader;
pub mod schema;

pub use config::{load_planner_config, load_preferences};
pub use loader::{DataLoadError, LoadedCatalog, load_catalog};
