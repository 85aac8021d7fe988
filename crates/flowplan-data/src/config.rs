//! Planner settings and user preferences.

use crate::loader::{DataLoadError, deserialize_file, find_data_file, resolve_name};
use crate::schema::PreferencesData;
use flowplan_core::catalog::Catalog;
use flowplan_core::config::PlannerConfig;
use flowplan_core::milestones::Milestones;
use flowplan_core::preferences::Preferences;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Load `planner.{ron,toml,json}` from `dir`. A missing file yields the
/// defaults; a present one is validated.
pub fn load_planner_config(dir: &Path) -> Result<PlannerConfig, DataLoadError> {
    let Some(path) = find_data_file(dir, "planner")? else {
        tracing::debug!(dir = %dir.display(), "no planner config, using defaults");
        return Ok(PlannerConfig::default());
    };
    let config: PlannerConfig = deserialize_file(&path)?;
    config.validate()?;
    Ok(config)
}

/// Load `preferences.{ron,toml,json}` from `dir`, resolving names against
/// `catalog`. Unlocked milestones are applied to `milestones`.
pub fn load_preferences(
    dir: &Path,
    catalog: &Catalog,
    milestones: &mut Milestones,
) -> Result<Preferences, DataLoadError> {
    let Some(path) = find_data_file(dir, "preferences")? else {
        return Ok(Preferences::new());
    };
    let data: PreferencesData = deserialize_file(&path)?;
    let names: HashMap<String, _> = catalog
        .objects()
        .iter()
        .map(|o| (o.name.clone(), o.id))
        .collect();

    let mut preferences = Preferences::new();
    for name in &data.favorites {
        preferences.add_favorite(*resolve_name(&names, name, &path, "object")?);
    }

    let tracked: HashSet<_> = milestones.milestones().iter().copied().collect();
    let mut unlocked = HashSet::new();
    for name in &data.unlocked {
        let id = *resolve_name(&names, name, &path, "milestone")?;
        if !tracked.contains(&id) {
            return Err(DataLoadError::UnresolvedRef {
                file: path.clone(),
                name: name.clone(),
                expected_kind: "milestone",
            });
        }
        unlocked.insert(id);
    }
    milestones.set_unlocked(&unlocked);
    tracing::debug!(
        favorites = data.favorites.len(),
        unlocked = unlocked.len(),
        "preferences loaded"
    );
    Ok(preferences)
}
