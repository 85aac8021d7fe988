//! Default pickers and per-row parameter resolution.
//!
//! Before a row can become an LP column its open choices are settled: the
//! crafter, the fuel and the goods used in every ambiguous ingredient slot.
//! Explicit overrides on the row always win. Otherwise the quick-select scan
//! decides, and when it cannot, the best candidate under the
//! favorites-wrapped domain ordering is taken. Every auto-pick bumps the
//! chosen object in the solve session so later rows of the same solve agree.

use crate::catalog::{Catalog, CatalogObject, Ingredient};
use crate::id::*;
use crate::model::{ModelError, RecipeRow};
use crate::ordering::{FavoritesComparer, ObjectComparer, ObjectOrdering, OrderingContext, SimilarOrdering};
use crate::preferences::SelectionSession;
use crate::select::select_single;

/// Objective weight for recipes whose cost is zero or negative.
pub const COST_EPSILON: f64 = 1e-3;

// ---------------------------------------------------------------------------
// Pickers
// ---------------------------------------------------------------------------

fn pick_default(
    candidates: &[ObjectId],
    ctx: &OrderingContext<'_>,
    session: &mut SelectionSession,
    similar: SimilarOrdering,
) -> Option<ObjectId> {
    let picked = match select_single(candidates, ctx).selected {
        Some(id) => Some(id),
        None => {
            let base = ObjectComparer::new(ctx.milestones, similar);
            let comparer = FavoritesComparer::new(base, ctx.preferences, session);
            comparer
                .best(candidates.iter().filter_map(|&id| ctx.catalog.get(id)))
                .map(|o| o.id)
        }
    }?;
    session.add_to_favorite(picked, 1);
    Some(picked)
}

/// Crafter for a recipe without an explicit crafter.
pub fn pick_crafter(recipe: &CatalogObject, ctx: &OrderingContext<'_>, session: &mut SelectionSession) -> Option<ObjectId> {
    let crafters = recipe.as_recipe().map(|r| r.crafters.as_slice()).unwrap_or(&[]);
    pick_default(crafters, ctx, session, SimilarOrdering::Crafter)
}

/// Fuel for a crafter without an explicit fuel. `None` when the crafter does
/// not burn anything.
pub fn pick_fuel(crafter: &CatalogObject, ctx: &OrderingContext<'_>, session: &mut SelectionSession) -> Option<ObjectId> {
    let energy = &crafter.as_crafter()?.energy;
    if !energy.energy_type.uses_fuel() {
        return None;
    }
    pick_default(&energy.fuels, ctx, session, SimilarOrdering::Fuel)
}

/// Goods for an ambiguous ingredient slot.
pub fn pick_variant(
    ingredient: &Ingredient,
    ctx: &OrderingContext<'_>,
    session: &mut SelectionSession,
) -> Option<ObjectId> {
    pick_default(&ingredient.variants, ctx, session, SimilarOrdering::Default)
}

// ---------------------------------------------------------------------------
// Row parameters
// ---------------------------------------------------------------------------

/// Per-run amounts and rates of one row after every choice is settled.
#[derive(Debug, Clone, PartialEq)]
pub struct RowParameters {
    pub recipe: ObjectWithQuality,
    pub crafter: Option<ObjectWithQuality>,
    /// Crafting speed including the crafter's quality multiplier.
    pub crafting_speed: f64,
    /// Seconds per run at speed 1, after temperature scaling.
    pub recipe_time: f64,
    pub ingredients: Vec<(ObjectWithQuality, f64)>,
    pub products: Vec<(ObjectWithQuality, f64)>,
    /// Fuel goods and units burned per run.
    pub fuel: Option<(ObjectWithQuality, f64)>,
    /// Objective weight per run.
    pub cost: f64,
}

impl RowParameters {
    /// Runs per second delivered by `buildings` crafters.
    pub fn runs_for_buildings(&self, buildings: f64) -> f64 {
        buildings * self.crafting_speed / self.recipe_time
    }

    /// Crafters needed for `runs_per_second`.
    pub fn buildings_for_runs(&self, runs_per_second: f64) -> f64 {
        runs_per_second * self.recipe_time / self.crafting_speed
    }
}

/// Goods flow at the recipe's quality, except fluids which are always Normal.
fn goods_at_quality(catalog: &Catalog, goods: ObjectId, quality: QualityId) -> ObjectWithQuality {
    if catalog.get(goods).is_some_and(CatalogObject::is_fluid) {
        ObjectWithQuality::normal(goods)
    } else {
        ObjectWithQuality::new(goods, quality)
    }
}

/// Settle every choice of `row` and compute its per-run coefficients.
pub fn resolve_row(
    row: &RecipeRow,
    ctx: &OrderingContext<'_>,
    session: &mut SelectionSession,
) -> Result<RowParameters, ModelError> {
    let catalog = ctx.catalog;
    let recipe_object = catalog
        .get(row.recipe.target)
        .ok_or(ModelError::UnknownObject(row.recipe.target))?;
    let recipe = recipe_object
        .as_recipe()
        .ok_or(ModelError::NotARecipe(row.recipe.target))?;
    let quality = row.recipe.quality;

    let crafter = match row.crafter {
        Some(explicit) => Some(explicit),
        None => pick_crafter(recipe_object, ctx, session).map(ObjectWithQuality::normal),
    };
    let crafter_data = crafter.and_then(|c| catalog.get(c.target)).and_then(|o| o.as_crafter());
    let speed_multiplier = crafter
        .and_then(|c| catalog.quality(c.quality))
        .map(|q| q.speed_multiplier)
        .unwrap_or(1.0);
    let crafting_speed = crafter_data.map(|c| c.crafting_speed).unwrap_or(1.0) as f64 * speed_multiplier as f64;

    let mut ingredients = Vec::with_capacity(recipe.ingredients.len());
    let mut fluid_input_temperature = None;
    for ingredient in &recipe.ingredients {
        let goods = if ingredient.is_ambiguous() {
            match row.variants.iter().find(|v| ingredient.variants.contains(v)) {
                Some(chosen) => *chosen,
                None => pick_variant(ingredient, ctx, session).unwrap_or(ingredient.goods),
            }
        } else {
            ingredient.goods
        };
        if fluid_input_temperature.is_none() {
            fluid_input_temperature = catalog.get(goods).and_then(|o| o.as_fluid()).map(|f| f.temperature);
        }
        ingredients.push((goods_at_quality(catalog, goods, quality), ingredient.amount as f64));
    }

    let products: Vec<(ObjectWithQuality, f64)> = recipe
        .products
        .iter()
        .map(|p| (goods_at_quality(catalog, p.goods, quality), p.amount as f64))
        .collect();

    let mut recipe_time = recipe.time as f64;
    if recipe.temperature_scaled {
        let product_temperature = recipe
            .products
            .iter()
            .find_map(|p| catalog.get(p.goods).and_then(|o| o.as_fluid()))
            .map(|f| f.temperature);
        match (product_temperature, fluid_input_temperature) {
            (Some(out), Some(input)) if out > input => recipe_time *= (out - input) as f64,
            _ => tracing::warn!(
                recipe = %recipe_object.name,
                "temperature-scaled recipe without a rising fluid temperature, using base time"
            ),
        }
    }

    let fuel = match crafter.and_then(|c| catalog.get(c.target)) {
        Some(crafter_object) if crafter_data.is_some_and(|c| c.energy.energy_type.uses_fuel()) => {
            // A pinned fuel keeps its quality; auto-picked fuel is Normal.
            let fuel = match row.fuel {
                Some(explicit) => Some(explicit),
                None => pick_fuel(crafter_object, ctx, session).map(ObjectWithQuality::normal),
            };
            fuel.and_then(|f| {
                let energy = catalog.get(f.target)?.energy_per_unit() as f64;
                let source = &crafter_data?.energy;
                let effectivity = source.effectivity as f64;
                if energy <= 0.0 || effectivity <= 0.0 {
                    return None;
                }
                let seconds = recipe_time / crafting_speed;
                let per_run = seconds * crafter_data?.energy_usage as f64 / (energy * effectivity);
                Some((f, per_run))
            })
        }
        _ => None,
    };

    Ok(RowParameters {
        recipe: row.recipe,
        crafter,
        crafting_speed,
        recipe_time,
        ingredients,
        products,
        fuel,
        cost: (recipe_object.cost as f64).max(COST_EPSILON),
    })
}
