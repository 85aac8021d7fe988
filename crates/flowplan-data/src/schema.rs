//! Serde data file structs for catalog content and planner settings.
//!
//! These structs define the on-disk format for goods, crafters, recipes,
//! technologies, quality tiers and user preferences. They are deserialized
//! from RON, JSON, or TOML data files and then resolved into catalog types by
//! the loader. Every cross-reference is by name.

use flowplan_core::catalog::{EnergyType, SpecialType};
use serde::Deserialize;

fn default_cost() -> f32 {
    1.0
}

fn default_one() -> f32 {
    1.0
}

// ===========================================================================
// Goods
// ===========================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct GoodsData {
    pub name: String,
    #[serde(default = "default_cost")]
    pub cost: f32,
    #[serde(default)]
    pub flow: f32,
    #[serde(default)]
    pub special: SpecialType,
    /// kJ per unit; zero for non-fuels.
    #[serde(default)]
    pub fuel_value: f32,
    #[serde(default)]
    pub fluid: Option<FluidData>,
    /// Every listed object must be accessible.
    #[serde(default)]
    pub requires: Vec<String>,
    /// At least one listed object must be accessible.
    #[serde(default)]
    pub requires_any: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FluidData {
    pub temperature: f32,
    pub base_temperature: f32,
    pub heat_capacity: f32,
    /// Fluids sharing a group are interchangeable variants.
    #[serde(default)]
    pub group: Option<String>,
}

// ===========================================================================
// Crafters
// ===========================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CrafterData {
    pub name: String,
    #[serde(default = "default_cost")]
    pub cost: f32,
    pub speed: f32,
    /// kW while working.
    #[serde(default)]
    pub energy_usage: f32,
    pub energy_type: EnergyType,
    #[serde(default)]
    pub fuels: Vec<String>,
    #[serde(default = "default_one")]
    pub effectivity: f32,
    /// Every listed object must be accessible.
    #[serde(default)]
    pub requires: Vec<String>,
    /// At least one listed object must be accessible.
    #[serde(default)]
    pub requires_any: Vec<String>,
}

// ===========================================================================
// Recipes
// ===========================================================================

/// A recipe ingredient. `variants`, when given, lists interchangeable goods
/// for the slot and must include `goods`.
#[derive(Debug, Clone, Deserialize)]
pub struct IngredientData {
    pub goods: String,
    pub amount: f32,
    #[serde(default)]
    pub variants: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecipeData {
    pub name: String,
    #[serde(default = "default_cost")]
    pub cost: f32,
    #[serde(default)]
    pub flow: f32,
    #[serde(default)]
    pub special: SpecialType,
    pub time: f32,
    #[serde(default)]
    pub ingredients: Vec<IngredientData>,
    pub products: Vec<(String, f32)>,
    #[serde(default)]
    pub crafters: Vec<String>,
    #[serde(default)]
    pub waste: f32,
    #[serde(default)]
    pub temperature_scaled: bool,
    /// Every listed object must be accessible.
    #[serde(default)]
    pub requires: Vec<String>,
    /// At least one listed object must be accessible.
    #[serde(default)]
    pub requires_any: Vec<String>,
}

// ===========================================================================
// Technologies and qualities
// ===========================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct TechnologyData {
    pub name: String,
    #[serde(default = "default_cost")]
    pub cost: f32,
    /// Tracked as a milestone for accessibility ordering.
    #[serde(default)]
    pub milestone: bool,
    /// Every listed object must be accessible.
    #[serde(default)]
    pub requires: Vec<String>,
    /// At least one listed object must be accessible.
    #[serde(default)]
    pub requires_any: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QualityData {
    pub name: String,
    pub level: u8,
    #[serde(default = "default_one")]
    pub speed_multiplier: f32,
}

// ===========================================================================
// Preferences
// ===========================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreferencesData {
    #[serde(default)]
    pub favorites: Vec<String>,
    /// Milestones already reached.
    #[serde(default)]
    pub unlocked: Vec<String>,
}

// ===========================================================================
// TOML wrappers
// ===========================================================================

#[derive(Debug, Deserialize)]
pub struct TomlGoods {
    pub goods: Vec<GoodsData>,
}

#[derive(Debug, Deserialize)]
pub struct TomlCrafters {
    pub crafters: Vec<CrafterData>,
}

#[derive(Debug, Deserialize)]
pub struct TomlRecipes {
    pub recipes: Vec<RecipeData>,
}

#[derive(Debug, Deserialize)]
pub struct TomlTechnologies {
    pub technologies: Vec<TechnologyData>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingredient_variants_default_empty() {
        let plain: IngredientData = ron::from_str(r#"(goods: "iron-plate", amount: 2.0)"#).unwrap();
        assert!(plain.variants.is_empty());

        let ambiguous: IngredientData =
            ron::from_str(r#"(goods: "water", amount: 1.0, variants: ["water", "water-50"])"#).unwrap();
        assert_eq!(ambiguous.goods, "water");
        assert_eq!(ambiguous.variants.len(), 2);
    }

    #[test]
    fn goods_defaults() {
        let goods: GoodsData = serde_json::from_str(r#"{ "name": "coal", "fuel_value": 4000 }"#).unwrap();
        assert_eq!(goods.cost, 1.0);
        assert_eq!(goods.special, SpecialType::Normal);
        assert!(goods.fluid.is_none());
        assert!(goods.requires.is_empty());
    }

    #[test]
    fn crafter_energy_type_is_snake_case() {
        let crafter: CrafterData = serde_json::from_str(
            r#"{ "name": "boiler", "speed": 1800, "energy_usage": 1800,
                 "energy_type": "solid_fuel", "fuels": ["coal"] }"#,
        )
        .unwrap();
        assert_eq!(crafter.energy_type, EnergyType::SolidFuel);
        assert_eq!(crafter.effectivity, 1.0);
    }

    #[test]
    fn technology_requirements() {
        let tech: TechnologyData =
            toml::from_str("name = \"logistics\"\nmilestone = true\nrequires = [\"automation\"]\n").unwrap();
        assert!(tech.milestone);
        assert_eq!(tech.requires, vec!["automation".to_string()]);
    }
}
