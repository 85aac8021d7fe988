//! Scenario: a catalog loaded from data files and solved.

mod common;

use common::{assert_close, init_tracing, remove_dir, scratch_dir};
use flowplan_core::id::ObjectWithQuality;
use flowplan_core::model::ProductionTable;
use flowplan_core::ordering::OrderingContext;
use flowplan_core::preferences::Preferences;
use flowplan_core::select::SelectionHint;
use flowplan_core::solve::{SolveStatus, solve_table};
use flowplan_core::solver::GoodLpSolver;
use flowplan_data::{load_catalog, load_planner_config, load_preferences};
use std::fs;
use std::path::Path;

const TECHNOLOGIES: &str = r#"[
    (name: "steam-power", milestone: true),
    (name: "advanced-fuel", milestone: true, requires: ["steam-power"]),
]"#;

const GOODS: &str = r#"[
    (name: "coal", fuel_value: 4000.0),
    (name: "solid-fuel", fuel_value: 12000.0, cost: 3.0, requires: ["advanced-fuel"]),
    (name: "water", cost: 0.03,
     fluid: Some((temperature: 15.0, base_temperature: 15.0, heat_capacity: 0.2, group: Some("water")))),
    (name: "water-50", cost: 0.02,
     fluid: Some((temperature: 50.0, base_temperature: 15.0, heat_capacity: 0.2, group: Some("water")))),
    (name: "steam", fluid: Some((temperature: 165.0, base_temperature: 15.0, heat_capacity: 0.2))),
    (name: "electricity"),
]"#;

const CRAFTERS: &str = r#"[
    (name: "boiler", speed: 1800.0, energy_usage: 1800.0, energy_type: solid_fuel,
     fuels: ["coal", "solid-fuel"], requires: ["steam-power"]),
    (name: "steam-engine", speed: 1.0, energy_usage: 900.0, energy_type: fluid_heat,
     fuels: ["steam"], requires: ["steam-power"]),
]"#;

const RECIPES: &str = r#"[
    (name: "boil-water", time: 0.2, temperature_scaled: true,
     ingredients: [(goods: "water", amount: 1.0)],
     products: [("steam", 1.0)],
     crafters: ["boiler"]),
    (name: "steam-power", time: 1.0,
     products: [("electricity", 900.0)],
     crafters: ["steam-engine"]),
]"#;

fn write_data(dir: &Path) {
    fs::write(dir.join("technologies.ron"), TECHNOLOGIES).unwrap();
    fs::write(dir.join("goods.ron"), GOODS).unwrap();
    fs::write(dir.join("crafters.ron"), CRAFTERS).unwrap();
    fs::write(dir.join("recipes.ron"), RECIPES).unwrap();
}

#[test]
fn names_must_be_unique_across_kinds() {
    // "steam-power" is both a technology and a recipe.
    let dir = scratch_dir("shared_names");
    write_data(&dir);

    let err = load_catalog(&dir).unwrap_err();
    assert!(err.to_string().contains("steam-power"));

    remove_dir(&dir);
}

fn write_unique_data(dir: &Path) {
    write_data(dir);
    fs::write(
        dir.join("recipes.ron"),
        RECIPES.replace(r#"(name: "steam-power""#, r#"(name: "generate-power""#),
    )
    .unwrap();
}

#[test]
fn loaded_boiler_solves_like_the_builtin_one() {
    init_tracing();
    let dir = scratch_dir("loaded_boiler");
    write_unique_data(&dir);
    fs::write(dir.join("preferences.ron"), r#"(unlocked: ["steam-power"])"#).unwrap();

    let mut loaded = load_catalog(&dir).unwrap();
    let prefs = load_preferences(&dir, &loaded.catalog, &mut loaded.milestones).unwrap();
    let config = load_planner_config(&dir).unwrap();
    let ctx = OrderingContext::new(&loaded.catalog, &loaded.milestones, &prefs);

    let boil = loaded.catalog.id("boil-water").unwrap();
    let water = loaded.catalog.id("water").unwrap();
    let water_50 = loaded.catalog.id("water-50").unwrap();
    // The water group makes the slot ambiguous without a variant list.
    let slot = &loaded.catalog.object(boil).as_recipe().unwrap().ingredients[0];
    assert_eq!(slot.variants, vec![water, water_50]);

    let mut table = ProductionTable::new();
    let row = table.add_recipe(&ctx, ObjectWithQuality::normal(boil)).unwrap();
    assert_eq!(table.row(row).unwrap().variants, vec![water]);
    table.set_fixed_buildings(row, Some(1.0)).unwrap();

    let report = solve_table(&mut table, &ctx, &config.solver, &GoodLpSolver).unwrap();
    assert_eq!(report.status, SolveStatus::Optimal);

    let row = table.row(row).unwrap();
    assert_close(row.recipes_per_second().unwrap(), 60.0);
    // Solid fuel is still locked, so coal is the only accessible choice.
    let fuel = row.fuel_information().unwrap();
    assert_eq!(fuel.goods.target, loaded.catalog.id("coal").unwrap());
    assert_close(fuel.amount as f64, 0.45);

    remove_dir(&dir);
}

#[test]
fn favorite_from_preferences_picks_the_fuel() {
    init_tracing();
    let dir = scratch_dir("favorite_fuel");
    write_unique_data(&dir);
    fs::write(
        dir.join("preferences.json"),
        r#"{ "favorites": ["solid-fuel"], "unlocked": ["steam-power", "advanced-fuel"] }"#,
    )
    .unwrap();

    let mut loaded = load_catalog(&dir).unwrap();
    let prefs = load_preferences(&dir, &loaded.catalog, &mut loaded.milestones).unwrap();
    let ctx = OrderingContext::new(&loaded.catalog, &loaded.milestones, &prefs);

    let boil = loaded.catalog.id("boil-water").unwrap();
    let mut table = ProductionTable::new();
    let row = table.add_recipe(&ctx, ObjectWithQuality::normal(boil)).unwrap();
    table.set_fixed_buildings(row, Some(1.0)).unwrap();
    solve_table(&mut table, &ctx, &Default::default(), &GoodLpSolver).unwrap();

    let fuel = table.row(row).unwrap().fuel_information().unwrap();
    assert_eq!(fuel.goods.target, loaded.catalog.id("solid-fuel").unwrap());
    assert_close(fuel.amount as f64, 0.15);

    remove_dir(&dir);
}

#[test]
fn quick_add_picks_the_only_producer() {
    let dir = scratch_dir("quick_add");
    write_unique_data(&dir);

    let loaded = load_catalog(&dir).unwrap();
    let prefs = Preferences::new();
    let ctx = OrderingContext::new(&loaded.catalog, &loaded.milestones, &prefs);
    let electricity = loaded.catalog.id("electricity").unwrap();

    let mut table = ProductionTable::new();
    let added = table.quick_add(&ctx, electricity).unwrap();
    assert!(added.row.is_some());
    assert_ne!(added.hint, SelectionHint::MultipleFavorites);
    let (_, row) = table.rows().next().unwrap();
    assert_eq!(row.recipe.target, loaded.catalog.id("generate-power").unwrap());

    remove_dir(&dir);
}

#[test]
fn planner_config_tunes_the_solver() {
    let dir = scratch_dir("planner_config");
    fs::write(
        dir.join("planner.ron"),
        "(solver: (max_attempts: 2, base_seed: 11), display: (precise: true))",
    )
    .unwrap();

    let config = load_planner_config(&dir).unwrap();
    assert_eq!(config.solver.max_attempts, 2);
    assert_eq!(config.solver.seed_for_attempt(1), 12);
    assert!(config.display.precise);

    remove_dir(&dir);
}
