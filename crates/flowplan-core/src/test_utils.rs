//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::catalog::*;
use crate::id::*;
use crate::milestones::Milestones;
use crate::model::{LinkAlgorithm, ProductionLink, ProductionTable};
use crate::ordering::OrderingContext;
use crate::preferences::Preferences;
use std::sync::Arc;

// ===========================================================================
// Fixture catalog
// ===========================================================================

/// A small power-and-iron catalog with every object id at hand.
pub struct Fixture {
    pub catalog: Arc<Catalog>,
    pub milestones: Milestones,
    pub uncommon: QualityId,

    // Goods
    pub coal: ObjectId,
    pub wood: ObjectId,
    pub water: ObjectId,
    pub water_50: ObjectId,
    pub steam_165: ObjectId,
    pub steam_500: ObjectId,
    pub electricity: ObjectId,
    pub iron_ore: ObjectId,
    pub iron_plate: ObjectId,
    pub scrap: ObjectId,
    pub gear: ObjectId,

    // Crafters
    pub boiler: ObjectId,
    pub steam_engine: ObjectId,
    pub furnace: ObjectId,
    pub assembler: ObjectId,
    pub assembler_2: ObjectId,

    // Recipes
    pub boil_water: ObjectId,
    pub steam_power: ObjectId,
    pub smelt_iron: ObjectId,
    pub recycle_scrap: ObjectId,
    pub gear_recipe: ObjectId,
    pub free_recipe: ObjectId,
}

impl Fixture {
    pub fn ctx<'a>(&'a self, preferences: &'a Preferences) -> OrderingContext<'a> {
        OrderingContext::new(&self.catalog, &self.milestones, preferences)
    }
}

fn crafter(speed: f32, energy_usage: f32, energy_type: EnergyType, fuels: Vec<ObjectId>) -> CrafterData {
    CrafterData {
        crafting_speed: speed,
        energy_usage,
        energy: EnergySource {
            energy_type,
            fuels,
            effectivity: 1.0,
        },
    }
}

fn recipe(ingredients: Vec<Ingredient>, products: Vec<Product>, time: f32, crafters: Vec<ObjectId>) -> RecipeData {
    RecipeData {
        ingredients,
        products,
        time,
        crafters,
        waste: 0.0,
        temperature_scaled: false,
    }
}

/// Build the fixture with every milestone unlocked.
pub fn fixture() -> Fixture {
    let mut b = CatalogBuilder::new();
    let uncommon = b.register_quality("uncommon", 1, 1.3);

    let coal = b.register(ObjectDef::fuel("coal", 4000.0).with_cost(1.0));
    let wood = b.register(ObjectDef::fuel("wood", 2000.0).with_cost(2.0));
    let water = b.register_fluid_variant("water", ObjectDef::fluid("water", 15.0, 15.0, 0.2).with_cost(0.03));
    let water_50 = b.register_fluid_variant("water", ObjectDef::fluid("water-50", 50.0, 15.0, 0.2).with_cost(0.02));
    let steam_165 = b.register_fluid_variant("steam", ObjectDef::fluid("steam", 165.0, 15.0, 0.2).with_cost(1.0));
    let steam_500 = b.register_fluid_variant("steam", ObjectDef::fluid("steam-500", 500.0, 15.0, 0.2).with_cost(4.0));
    let electricity = b.register(ObjectDef::item("electricity"));
    let iron_ore = b.register(ObjectDef::item("iron-ore"));
    let iron_plate = b.register(ObjectDef::item("iron-plate"));
    let scrap = b.register(ObjectDef::item("scrap"));
    let gear = b.register(ObjectDef::item("gear"));

    let boiler = b.register(ObjectDef::crafter(
        "boiler",
        crafter(1800.0, 1800.0, EnergyType::SolidFuel, vec![coal, wood]),
    ));
    let steam_engine = b.register(ObjectDef::crafter(
        "steam-engine",
        crafter(1.0, 900.0, EnergyType::FluidHeat, vec![steam_165, steam_500]),
    ));
    let furnace = b.register(ObjectDef::crafter("furnace", crafter(2.0, 90.0, EnergyType::Electric, vec![])));
    let assembler = b.register(ObjectDef::crafter(
        "assembler",
        crafter(0.75, 75.0, EnergyType::Electric, vec![]),
    ));
    let assembler_2 = b.register(
        ObjectDef::crafter("assembler-2", crafter(1.25, 150.0, EnergyType::Electric, vec![])).with_cost(3.0),
    );

    let mut boil = recipe(
        vec![Ingredient::with_variants(water, 1.0, vec![water, water_50])],
        vec![Product::new(steam_165, 1.0)],
        0.2,
        vec![boiler],
    );
    boil.temperature_scaled = true;
    let boil_water = b.register(ObjectDef::recipe("boil-water", boil));
    let steam_power = b.register(ObjectDef::recipe(
        "steam-power",
        recipe(vec![], vec![Product::new(electricity, 900.0)], 1.0, vec![steam_engine]),
    ));
    let smelt_iron = b.register(ObjectDef::recipe(
        "smelt-iron",
        recipe(
            vec![Ingredient::new(iron_ore, 1.0)],
            vec![Product::new(iron_plate, 1.0)],
            3.2,
            vec![furnace],
        ),
    ));
    let recycle_scrap = b.register(
        ObjectDef::recipe(
            "recycle-scrap",
            recipe(
                vec![Ingredient::new(scrap, 2.0)],
                vec![Product::new(iron_plate, 1.0)],
                1.0,
                vec![furnace],
            ),
        )
        .with_cost(5.0),
    );
    let gear_recipe = b.register(ObjectDef::recipe(
        "gear",
        recipe(
            vec![Ingredient::new(iron_plate, 2.0)],
            vec![Product::new(gear, 1.0)],
            0.5,
            vec![assembler, assembler_2],
        ),
    ));
    let free_recipe = b.register(
        ObjectDef::recipe(
            "pump-water",
            recipe(vec![], vec![Product::new(water, 1200.0)], 1.0, vec![]),
        )
        .with_cost(0.0),
    );

    let catalog = Arc::new(b.build().expect("fixture catalog is valid"));
    let milestones = Milestones::all_unlocked(&catalog);

    Fixture {
        catalog,
        milestones,
        uncommon,
        coal,
        wood,
        water,
        water_50,
        steam_165,
        steam_500,
        electricity,
        iron_ore,
        iron_plate,
        scrap,
        gear,
        boiler,
        steam_engine,
        furnace,
        assembler,
        assembler_2,
        boil_water,
        steam_power,
        smelt_iron,
        recycle_scrap,
        gear_recipe,
        free_recipe,
    }
}

// ===========================================================================
// Table builders
// ===========================================================================

/// One boiler running at a fixed count of one building on 15 degree water.
pub fn boiler_table(f: &Fixture) -> ProductionTable {
    let prefs = Preferences::new();
    let ctx = f.ctx(&prefs);
    let mut table = ProductionTable::new();
    let row = table
        .add_recipe(&ctx, ObjectWithQuality::normal(f.boil_water))
        .expect("boil-water is a recipe");
    table.set_fixed_buildings(row, Some(1.0)).expect("row exists");
    table
}

/// Two fixed gear rows fed by one smelting row through a matched plate link.
pub fn gear_table(f: &Fixture) -> ProductionTable {
    let prefs = Preferences::new();
    let ctx = f.ctx(&prefs);
    let mut table = ProductionTable::new();
    table
        .add_recipe(&ctx, ObjectWithQuality::normal(f.smelt_iron))
        .expect("smelt-iron is a recipe");
    for _ in 0..2 {
        let row = table
            .add_recipe(&ctx, ObjectWithQuality::normal(f.gear_recipe))
            .expect("gear is a recipe");
        table
            .set_crafter(&ctx, row, Some(ObjectWithQuality::normal(f.assembler)))
            .expect("assembler makes gears");
        table.set_fixed_buildings(row, Some(1.0)).expect("row exists");
    }
    table.add_link(ProductionLink::new(
        ObjectWithQuality::normal(f.iron_plate),
        0.0,
        LinkAlgorithm::Match,
    ));
    table
}
