//! Catalog loading: finds data files, parses them and resolves names into a
//! frozen [`Catalog`] plus its milestone analysis.
//!
//! A data directory holds one file per object kind. Each file may be RON,
//! JSON or TOML; the format comes from the extension and a directory may not
//! carry the same base name in two formats.
//!
//! | base name      | required | TOML array key |
//! |----------------|----------|----------------|
//! | `technologies` | no       | `technologies` |
//! | `goods`        | yes      | `goods`        |
//! | `crafters`     | no       | `crafters`     |
//! | `recipes`      | yes      | `recipes`      |
//! | `qualities`    | no       | `qualities`    |

use crate::schema::{CrafterData, GoodsData, QualityData, RecipeData, TechnologyData};
use flowplan_core::catalog::{
    Catalog, CatalogBuilder, CatalogError, EnergySource, Ingredient, ObjectData, ObjectDef, Product,
};
use flowplan_core::config::ConfigError;
use flowplan_core::id::ObjectId;
use flowplan_core::milestones::{MilestoneError, Milestones};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// ===========================================================================
// Errors
// ===========================================================================

#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// The same base name exists in two formats.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    #[error("unresolved {expected_kind} reference '{name}' in {file}")]
    UnresolvedRef {
        file: PathBuf,
        name: String,
        expected_kind: &'static str,
    },

    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    #[error("invalid catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("milestone analysis failed: {0}")]
    Milestones(#[from] MilestoneError),

    #[error("invalid planner config: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection and discovery
// ===========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

/// Look for `{base_name}.ron`, `.toml` or `.json` in `dir`.
///
/// Returns `Ok(None)` when none exists and `ConflictingFormats` when more
/// than one does.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;
    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if !candidate.exists() {
            continue;
        }
        if let Some(existing) = &found {
            return Err(DataLoadError::ConflictingFormats {
                a: existing.clone(),
                b: candidate,
            });
        }
        found = Some(candidate);
    }
    Ok(found)
}

/// Like [`find_data_file`], but a missing file is an error.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(path: &Path, detail: impl ToString) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: detail.to_string(),
    }
}

/// Read a whole file as `T` in the format given by its extension.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => toml::from_str(&content).map_err(|e| parse_error(path, e)),
    }
}

/// Read a list of `T`. RON and JSON files hold a bare array; TOML files
/// hold the array under `toml_key`.
pub fn deserialize_list<T: DeserializeOwned>(path: &Path, toml_key: &str) -> Result<Vec<T>, DataLoadError> {
    if detect_format(path)? != Format::Toml {
        return deserialize_file(path);
    }
    let content = std::fs::read_to_string(path)?;
    let mut table: toml::Table = toml::from_str(&content).map_err(|e| parse_error(path, e))?;
    let array = table
        .remove(toml_key)
        .ok_or_else(|| parse_error(path, format!("missing key '{toml_key}' in TOML file")))?;
    array.try_into().map_err(|e: toml::de::Error| parse_error(path, e))
}

fn optional_list<T: DeserializeOwned>(dir: &Path, base_name: &str) -> Result<(Vec<T>, PathBuf), DataLoadError> {
    match find_data_file(dir, base_name)? {
        Some(path) => Ok((deserialize_list(&path, base_name)?, path)),
        None => Ok((Vec::new(), dir.join(base_name))),
    }
}

fn required_list<T: DeserializeOwned>(dir: &Path, base_name: &str) -> Result<(Vec<T>, PathBuf), DataLoadError> {
    let path = require_data_file(dir, base_name)?;
    Ok((deserialize_list(&path, base_name)?, path))
}

// ===========================================================================
// Name resolution helpers
// ===========================================================================

pub fn resolve_name<'a, V>(
    map: &'a HashMap<String, V>,
    name: &str,
    file: &Path,
    expected_kind: &'static str,
) -> Result<&'a V, DataLoadError> {
    map.get(name).ok_or_else(|| DataLoadError::UnresolvedRef {
        file: file.to_path_buf(),
        name: name.to_string(),
        expected_kind,
    })
}

pub fn check_duplicate<V>(map: &HashMap<String, V>, name: &str, file: &Path) -> Result<(), DataLoadError> {
    if map.contains_key(name) {
        return Err(DataLoadError::DuplicateName {
            file: file.to_path_buf(),
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Name table for one load. Ids are handed out in registration order so
/// every file can reference objects from every other file.
struct NameTable {
    ids: HashMap<String, ObjectId>,
}

impl NameTable {
    fn new() -> Self {
        Self { ids: HashMap::new() }
    }

    fn reserve<'a>(&mut self, names: impl Iterator<Item = &'a str>, file: &Path) -> Result<(), DataLoadError> {
        for name in names {
            check_duplicate(&self.ids, name, file)?;
            let id = ObjectId(self.ids.len() as u32);
            self.ids.insert(name.to_string(), id);
        }
        Ok(())
    }

    fn id(&self, name: &str, file: &Path, kind: &'static str) -> Result<ObjectId, DataLoadError> {
        resolve_name(&self.ids, name, file, kind).copied()
    }

    fn ids(&self, names: &[String], file: &Path, kind: &'static str) -> Result<Vec<ObjectId>, DataLoadError> {
        names.iter().map(|n| self.id(n, file, kind)).collect()
    }

    fn with_requirements(
        &self,
        mut def: ObjectDef,
        requires: &[String],
        requires_any: &[String],
        file: &Path,
    ) -> Result<ObjectDef, DataLoadError> {
        // An empty any-list would make the object unreachable.
        if !requires.is_empty() {
            def = def.require_all(self.ids(requires, file, "object")?);
        }
        if !requires_any.is_empty() {
            def = def.require_any(self.ids(requires_any, file, "object")?);
        }
        Ok(def)
    }
}

// ===========================================================================
// Catalog loading
// ===========================================================================

/// A loaded catalog and the accessibility analysis over its milestones.
/// Every milestone starts locked.
#[derive(Debug, Clone)]
pub struct LoadedCatalog {
    pub catalog: Arc<Catalog>,
    pub milestones: Milestones,
}

/// Load every catalog file from `dir`.
pub fn load_catalog(dir: &Path) -> Result<LoadedCatalog, DataLoadError> {
    let (technologies, tech_path): (Vec<TechnologyData>, _) = optional_list(dir, "technologies")?;
    let (goods, goods_path): (Vec<GoodsData>, _) = required_list(dir, "goods")?;
    let (crafters, crafter_path): (Vec<CrafterData>, _) = optional_list(dir, "crafters")?;
    let (recipes, recipe_path): (Vec<RecipeData>, _) = required_list(dir, "recipes")?;
    let (qualities, _): (Vec<QualityData>, _) = optional_list(dir, "qualities")?;

    let mut names = NameTable::new();
    names.reserve(technologies.iter().map(|t| t.name.as_str()), &tech_path)?;
    names.reserve(goods.iter().map(|g| g.name.as_str()), &goods_path)?;
    names.reserve(crafters.iter().map(|c| c.name.as_str()), &crafter_path)?;
    names.reserve(recipes.iter().map(|r| r.name.as_str()), &recipe_path)?;

    let mut builder = CatalogBuilder::new();
    for quality in &qualities {
        builder.register_quality(&quality.name, quality.level, quality.speed_multiplier);
    }

    let mut milestone_ids = Vec::new();
    for tech in &technologies {
        let def = ObjectDef::technology(&tech.name).with_cost(tech.cost);
        let def = names.with_requirements(def, &tech.requires, &tech.requires_any, &tech_path)?;
        let id = builder.register(def);
        if tech.milestone {
            milestone_ids.push(id);
        }
    }

    for data in &goods {
        let def = goods_def(data);
        let def = names.with_requirements(def, &data.requires, &data.requires_any, &goods_path)?;
        match data.fluid.as_ref().and_then(|f| f.group.as_deref()) {
            Some(group) => builder.register_fluid_variant(group, def),
            None => builder.register(def),
        };
    }

    for data in &crafters {
        let def = ObjectDef::crafter(
            &data.name,
            flowplan_core::catalog::CrafterData {
                crafting_speed: data.speed,
                energy_usage: data.energy_usage,
                energy: EnergySource {
                    energy_type: data.energy_type,
                    fuels: names.ids(&data.fuels, &crafter_path, "fuel")?,
                    effectivity: data.effectivity,
                },
            },
        )
        .with_cost(data.cost);
        let def = names.with_requirements(def, &data.requires, &data.requires_any, &crafter_path)?;
        builder.register(def);
    }

    for data in &recipes {
        let def = recipe_def(data, &names, &recipe_path)?;
        let def = names.with_requirements(def, &data.requires, &data.requires_any, &recipe_path)?;
        builder.register(def);
    }

    let catalog = builder.build()?;
    let milestones = Milestones::compute(&catalog, milestone_ids)?;
    tracing::debug!(
        dir = %dir.display(),
        objects = catalog.len(),
        qualities = catalog.qualities().len(),
        milestones = milestones.milestones().len(),
        "catalog loaded"
    );
    Ok(LoadedCatalog {
        catalog: Arc::new(catalog),
        milestones,
    })
}

fn goods_def(data: &GoodsData) -> ObjectDef {
    let def = match &data.fluid {
        Some(fluid) => {
            let mut def = ObjectDef::fluid(&data.name, fluid.temperature, fluid.base_temperature, fluid.heat_capacity);
            if let ObjectData::Goods(goods) = &mut def.data {
                goods.fuel_value = data.fuel_value;
            }
            def
        }
        None => ObjectDef::fuel(&data.name, data.fuel_value),
    };
    def.with_cost(data.cost)
        .with_flow(data.flow)
        .with_special_type(data.special)
}

fn recipe_def(data: &RecipeData, names: &NameTable, file: &Path) -> Result<ObjectDef, DataLoadError> {
    let ingredients = data
        .ingredients
        .iter()
        .map(|ing| {
            let goods = names.id(&ing.goods, file, "goods")?;
            let variants = names.ids(&ing.variants, file, "goods")?;
            Ok(Ingredient::with_variants(goods, ing.amount, variants))
        })
        .collect::<Result<Vec<_>, DataLoadError>>()?;
    let products = data
        .products
        .iter()
        .map(|(goods, amount)| Ok(Product::new(names.id(goods, file, "goods")?, *amount)))
        .collect::<Result<Vec<_>, DataLoadError>>()?;

    let def = ObjectDef::recipe(
        &data.name,
        flowplan_core::catalog::RecipeData {
            ingredients,
            products,
            time: data.time,
            crafters: names.ids(&data.crafters, file, "crafter")?,
            waste: data.waste,
            temperature_scaled: data.temperature_scaled,
        },
    );
    Ok(def
        .with_cost(data.cost)
        .with_flow(data.flow)
        .with_special_type(data.special))
}

// ===========================================================================
// Tests
// ===========================================================================
