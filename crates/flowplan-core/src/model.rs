//! Production graph: tables of recipe rows plus fixed-rate links.
//!
//! A [`ProductionTable`] owns its rows exclusively. Rows are addressed by
//! [`RowId`] keys and kept in user order; a row may own a nested sub-table.
//! Row solutions are written only by the solver. Before the first successful
//! solve, or while a row is disabled, a row has no solution at all, which is
//! distinct from a solution with zero amounts.

use crate::id::*;
use crate::ordering::OrderingContext;
use crate::preferences::SelectionSession;
use crate::resolve;
use crate::select::{SelectionHint, select_single};
use crate::solve::SolveStatus;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

// ---------------------------------------------------------------------------
// Links
// ---------------------------------------------------------------------------

/// How a link's conservation constraint is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkAlgorithm {
    /// Net production equals the requested amount.
    #[default]
    Match,
    /// Net production is at least the requested amount.
    AllowOverProduction,
    /// Net production is at most the requested amount.
    AllowOverConsumption,
}

/// A fixed-rate constraint on one goods within a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionLink {
    pub goods: ObjectWithQuality,
    /// Requested net production per second; negative requests consumption.
    pub amount: f32,
    #[serde(default)]
    pub algorithm: LinkAlgorithm,
}

impl ProductionLink {
    pub fn new(goods: ObjectWithQuality, amount: f32, algorithm: LinkAlgorithm) -> Self {
        Self {
            goods,
            amount,
            algorithm,
        }
    }
}

// ---------------------------------------------------------------------------
// Row solution
// ---------------------------------------------------------------------------

/// An amount per second of one goods.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RowFlow {
    pub goods: ObjectWithQuality,
    pub amount: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FuelInformation {
    pub goods: ObjectWithQuality,
    /// Units consumed per second.
    pub amount: f32,
}

/// Solved state of a row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowSolution {
    pub recipes_per_second: f64,
    pub buildings: f64,
    pub crafter: Option<ObjectWithQuality>,
    pub ingredients: Vec<RowFlow>,
    pub products: Vec<RowFlow>,
    pub fuel: Option<FuelInformation>,
}

// ---------------------------------------------------------------------------
// Recipe row
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeRow {
    pub recipe: ObjectWithQuality,
    /// Explicit crafter; `None` lets the resolver pick.
    #[serde(default)]
    pub crafter: Option<ObjectWithQuality>,
    /// Explicit fuel; `None` lets the resolver pick at every solve.
    #[serde(default)]
    pub fuel: Option<ObjectWithQuality>,
    /// Chosen goods for ambiguous ingredient slots.
    #[serde(default)]
    pub variants: Vec<ObjectId>,
    #[serde(default)]
    pub fixed_buildings: Option<f32>,
    pub enabled: bool,
    #[serde(default)]
    pub subgroup: Option<ProductionTable>,
    #[serde(skip)]
    solution: Option<RowSolution>,
}

impl RecipeRow {
    pub fn new(recipe: ObjectWithQuality) -> Self {
        Self {
            recipe,
            crafter: None,
            fuel: None,
            variants: Vec::new(),
            fixed_buildings: None,
            enabled: true,
            subgroup: None,
            solution: None,
        }
    }

    pub fn solution(&self) -> Option<&RowSolution> {
        self.solution.as_ref()
    }

    pub fn recipes_per_second(&self) -> Option<f64> {
        self.solution.as_ref().map(|s| s.recipes_per_second)
    }

    pub fn buildings(&self) -> Option<f64> {
        self.solution.as_ref().map(|s| s.buildings)
    }

    pub fn ingredients(&self) -> Option<&[RowFlow]> {
        self.solution.as_ref().map(|s| s.ingredients.as_slice())
    }

    pub fn products(&self) -> Option<&[RowFlow]> {
        self.solution.as_ref().map(|s| s.products.as_slice())
    }

    pub fn fuel_information(&self) -> Option<&FuelInformation> {
        self.solution.as_ref().and_then(|s| s.fuel.as_ref())
    }

    pub(crate) fn set_solution(&mut self, solution: RowSolution) {
        self.solution = Some(solution);
    }

    pub(crate) fn clear_solution(&mut self) {
        self.solution = None;
    }
}

/// Outcome of [`ProductionTable::quick_add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickAdd {
    pub row: Option<RowId>,
    pub hint: SelectionHint,
}

// ---------------------------------------------------------------------------
// Production table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductionTable {
    rows: SlotMap<RowId, RecipeRow>,
    order: Vec<RowId>,
    links: Vec<ProductionLink>,
    #[serde(skip)]
    flows: Vec<RowFlow>,
    #[serde(skip)]
    last_status: Option<SolveStatus>,
}

impl ProductionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row for `recipe`, choosing defaults for ambiguous ingredient
    /// slots.
    pub fn add_recipe(
        &mut self,
        ctx: &OrderingContext<'_>,
        recipe: ObjectWithQuality,
    ) -> Result<RowId, ModelError> {
        let data = ctx
            .catalog
            .get(recipe.target)
            .ok_or(ModelError::UnknownObject(recipe.target))?
            .as_recipe()
            .ok_or(ModelError::NotARecipe(recipe.target))?;

        let mut session = SelectionSession::new();
        let mut row = RecipeRow::new(recipe);
        for ingredient in data.ingredients.iter().filter(|i| i.is_ambiguous()) {
            if let Some(variant) = resolve::pick_variant(ingredient, ctx, &mut session) {
                row.variants.push(variant);
            }
        }

        let id = self.rows.insert(row);
        self.order.push(id);
        tracing::debug!(recipe = recipe.target.0, "recipe row added");
        Ok(id)
    }

    /// Add the recipe a quick-select would pick for producing `goods`.
    pub fn quick_add(&mut self, ctx: &OrderingContext<'_>, goods: ObjectId) -> Result<QuickAdd, ModelError> {
        if ctx.catalog.get(goods).is_none() {
            return Err(ModelError::UnknownObject(goods));
        }
        let selection = select_single(ctx.catalog.recipes_producing(goods), ctx);
        let row = match selection.selected {
            Some(recipe) => Some(self.add_recipe(ctx, ObjectWithQuality::normal(recipe))?),
            None => None,
        };
        Ok(QuickAdd {
            row,
            hint: selection.hint,
        })
    }

    pub fn remove_row(&mut self, id: RowId) -> Option<RecipeRow> {
        let row = self.rows.remove(id)?;
        self.order.retain(|r| *r != id);
        Some(row)
    }

    pub fn row(&self, id: RowId) -> Option<&RecipeRow> {
        self.rows.get(id)
    }

    pub fn row_mut(&mut self, id: RowId) -> Option<&mut RecipeRow> {
        self.rows.get_mut(id)
    }

    /// Rows in user order.
    pub fn rows(&self) -> impl Iterator<Item = (RowId, &RecipeRow)> + '_ {
        self.order.iter().map(move |id| (*id, &self.rows[*id]))
    }

    pub fn row_ids(&self) -> &[RowId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Swap the goods used in an ambiguous ingredient slot.
    pub fn change_variant(
        &mut self,
        ctx: &OrderingContext<'_>,
        row_id: RowId,
        from: ObjectId,
        to: ObjectId,
    ) -> Result<(), ModelError> {
        let row = self.rows.get_mut(row_id).ok_or(ModelError::UnknownRow(row_id))?;
        let recipe = ctx
            .catalog
            .get(row.recipe.target)
            .ok_or(ModelError::UnknownObject(row.recipe.target))?
            .as_recipe()
            .ok_or(ModelError::NotARecipe(row.recipe.target))?;

        let slot_exists = recipe
            .ingredients
            .iter()
            .any(|i| i.variants.contains(&from) && i.variants.contains(&to));
        if !slot_exists {
            return Err(ModelError::NotAVariant { from, to });
        }

        match row.variants.iter_mut().find(|v| **v == from) {
            Some(slot) => *slot = to,
            None => row.variants.push(to),
        }
        Ok(())
    }

    pub fn set_fixed_buildings(&mut self, row_id: RowId, buildings: Option<f32>) -> Result<(), ModelError> {
        if let Some(count) = buildings
            && !(count >= 0.0 && count.is_finite())
        {
            return Err(ModelError::InvalidFixedBuildings(count));
        }
        let row = self.rows.get_mut(row_id).ok_or(ModelError::UnknownRow(row_id))?;
        row.fixed_buildings = buildings;
        Ok(())
    }

    pub fn set_enabled(&mut self, row_id: RowId, enabled: bool) -> Result<(), ModelError> {
        let row = self.rows.get_mut(row_id).ok_or(ModelError::UnknownRow(row_id))?;
        row.enabled = enabled;
        Ok(())
    }

    /// Pin a crafter. It must be one the recipe can be made in.
    pub fn set_crafter(
        &mut self,
        ctx: &OrderingContext<'_>,
        row_id: RowId,
        crafter: Option<ObjectWithQuality>,
    ) -> Result<(), ModelError> {
        let row = self.rows.get_mut(row_id).ok_or(ModelError::UnknownRow(row_id))?;
        if let Some(crafter) = crafter {
            let allowed = ctx
                .catalog
                .get(row.recipe.target)
                .ok_or(ModelError::UnknownObject(row.recipe.target))?
                .as_recipe()
                .is_some_and(|r| r.crafters.contains(&crafter.target));
            if !allowed {
                return Err(ModelError::CrafterNotAllowed(crafter.target));
            }
        }
        row.crafter = crafter;
        Ok(())
    }

    /// Pin a fuel, or `None` to let the resolver pick on every solve.
    pub fn set_fuel(
        &mut self,
        ctx: &OrderingContext<'_>,
        row_id: RowId,
        fuel: Option<ObjectWithQuality>,
    ) -> Result<(), ModelError> {
        let row = self.rows.get_mut(row_id).ok_or(ModelError::UnknownRow(row_id))?;
        if let Some(fuel) = fuel
            && ctx.catalog.get(fuel.target).and_then(|o| o.as_goods()).is_none()
        {
            return Err(ModelError::NotGoods(fuel.target));
        }
        row.fuel = fuel;
        Ok(())
    }

    /// Attach a nested sub-table to a row, returning the previous one.
    pub fn set_subgroup(
        &mut self,
        row_id: RowId,
        subgroup: Option<ProductionTable>,
    ) -> Result<Option<ProductionTable>, ModelError> {
        let row = self.rows.get_mut(row_id).ok_or(ModelError::UnknownRow(row_id))?;
        Ok(std::mem::replace(&mut row.subgroup, subgroup))
    }

    pub fn add_link(&mut self, link: ProductionLink) {
        match self.links.iter_mut().find(|l| l.goods == link.goods) {
            Some(existing) => *existing = link,
            None => self.links.push(link),
        }
    }

    pub fn remove_link(&mut self, goods: ObjectWithQuality) -> Option<ProductionLink> {
        let index = self.links.iter().position(|l| l.goods == goods)?;
        Some(self.links.remove(index))
    }

    pub fn links(&self) -> &[ProductionLink] {
        &self.links
    }

    pub fn link(&self, goods: ObjectWithQuality) -> Option<&ProductionLink> {
        self.links.iter().find(|l| l.goods == goods)
    }

    /// Net per-goods flow of the last successful solve. Positive amounts are
    /// surplus leaving the table, negative amounts are imports.
    pub fn flows(&self) -> &[RowFlow] {
        &self.flows
    }

    pub fn last_status(&self) -> Option<SolveStatus> {
        self.last_status
    }

    pub(crate) fn set_flows(&mut self, flows: Vec<RowFlow>) {
        self.flows = flows;
    }

    pub(crate) fn set_last_status(&mut self, status: SolveStatus) {
        self.last_status = Some(status);
    }

    /// Depth-first rows (row, then its sub-table) with effective enablement.
    pub(crate) fn collect_rows<'t>(&'t self, parent_enabled: bool, out: &mut Vec<(&'t RecipeRow, bool)>) {
        for id in &self.order {
            let row = &self.rows[*id];
            let enabled = parent_enabled && row.enabled;
            out.push((row, enabled));
            if let Some(sub) = &row.subgroup {
                sub.collect_rows(enabled, out);
            }
        }
    }

    /// Mutable visit in the same order as [`Self::collect_rows`].
    pub(crate) fn for_each_row_mut<F: FnMut(&mut RecipeRow)>(&mut self, f: &mut F) {
        for id in &self.order {
            let row = &mut self.rows[*id];
            f(row);
            if let Some(sub) = &mut row.subgroup {
                sub.for_each_row_mut(f);
            }
        }
    }

    /// Links of this table and every nested sub-table.
    pub(crate) fn collect_links(&self, out: &mut Vec<ProductionLink>) {
        out.extend(self.links.iter().cloned());
        for id in &self.order {
            if let Some(sub) = &self.rows[*id].subgroup {
                sub.collect_links(out);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("row not found: {0:?}")]
    UnknownRow(RowId),
    #[error("object not found: {0:?}")]
    UnknownObject(ObjectId),
    #[error("object {0:?} is not a recipe")]
    NotARecipe(ObjectId),
    #[error("object {0:?} is not goods")]
    NotGoods(ObjectId),
    #[error("{to:?} is not a variant of {from:?} in this recipe")]
    NotAVariant { from: ObjectId, to: ObjectId },
    #[error("crafter {0:?} cannot make this recipe")]
    CrafterNotAllowed(ObjectId),
    #[error("fixed building count must be finite and non-negative, got {0}")]
    InvalidFixedBuildings(f32),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn add_recipe_picks_variant_for_ambiguous_slot() {
        let f = fixture();
        let prefs = Default::default();
        let ctx = f.ctx(&prefs);
        let mut table = ProductionTable::new();
        let row = table.add_recipe(&ctx, ObjectWithQuality::normal(f.boil_water)).unwrap();
        assert_eq!(table.row(row).unwrap().variants, vec![f.water]);
        assert!(table.row(row).unwrap().solution().is_none());
    }

    #[test]
    fn add_recipe_rejects_non_recipe() {
        let f = fixture();
        let prefs = Default::default();
        let ctx = f.ctx(&prefs);
        let mut table = ProductionTable::new();
        assert_eq!(
            table.add_recipe(&ctx, ObjectWithQuality::normal(f.coal)),
            Err(ModelError::NotARecipe(f.coal))
        );
    }

    #[test]
    fn change_variant_replaces_choice() {
        let f = fixture();
        let prefs = Default::default();
        let ctx = f.ctx(&prefs);
        let mut table = ProductionTable::new();
        let row = table.add_recipe(&ctx, ObjectWithQuality::normal(f.boil_water)).unwrap();
        table.change_variant(&ctx, row, f.water, f.water_50).unwrap();
        assert_eq!(table.row(row).unwrap().variants, vec![f.water_50]);

        assert_eq!(
            table.change_variant(&ctx, row, f.water_50, f.coal),
            Err(ModelError::NotAVariant {
                from: f.water_50,
                to: f.coal
            })
        );
    }

    #[test]
    fn row_edits_report_recipe_missing_from_catalog() {
        let f = fixture();
        let prefs = Default::default();
        let ctx = f.ctx(&prefs);
        let mut table = ProductionTable::new();
        let row = table.add_recipe(&ctx, ObjectWithQuality::normal(f.boil_water)).unwrap();
        let missing = ObjectId(9999);
        table.rows[row].recipe = ObjectWithQuality::normal(missing);

        assert_eq!(
            table.change_variant(&ctx, row, f.water, f.water_50),
            Err(ModelError::UnknownObject(missing))
        );
        assert_eq!(
            table.set_crafter(&ctx, row, Some(ObjectWithQuality::normal(f.boiler))),
            Err(ModelError::UnknownObject(missing))
        );
    }

    #[test]
    fn rows_keep_insertion_order_after_removal() {
        let f = fixture();
        let prefs = Default::default();
        let ctx = f.ctx(&prefs);
        let mut table = ProductionTable::new();
        let a = table.add_recipe(&ctx, ObjectWithQuality::normal(f.smelt_iron)).unwrap();
        let b = table.add_recipe(&ctx, ObjectWithQuality::normal(f.gear_recipe)).unwrap();
        let c = table.add_recipe(&ctx, ObjectWithQuality::normal(f.boil_water)).unwrap();
        table.remove_row(b).unwrap();
        let ids: Vec<RowId> = table.rows().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![a, c]);
        assert!(table.row(b).is_none());
    }

    #[test]
    fn quick_add_uses_unique_producer() {
        let f = fixture();
        let prefs = Default::default();
        let ctx = f.ctx(&prefs);
        let mut table = ProductionTable::new();
        let added = table.quick_add(&ctx, f.gear).unwrap();
        let row = added.row.unwrap();
        assert_eq!(table.row(row).unwrap().recipe.target, f.gear_recipe);
        assert_eq!(added.hint, SelectionHint::OnlyAccessible);
    }

    #[test]
    fn quick_add_reports_ambiguity() {
        let f = fixture();
        let prefs = Default::default();
        let ctx = f.ctx(&prefs);
        let mut table = ProductionTable::new();
        let added = table.quick_add(&ctx, f.iron_plate).unwrap();
        assert_eq!(added.row, None);
        assert_eq!(added.hint, SelectionHint::MarkFavorite);
        assert!(table.is_empty());
    }

    #[test]
    fn fixed_buildings_validated() {
        let f = fixture();
        let prefs = Default::default();
        let ctx = f.ctx(&prefs);
        let mut table = ProductionTable::new();
        let row = table.add_recipe(&ctx, ObjectWithQuality::normal(f.smelt_iron)).unwrap();
        assert!(table.set_fixed_buildings(row, Some(2.0)).is_ok());
        assert_eq!(
            table.set_fixed_buildings(row, Some(-1.0)),
            Err(ModelError::InvalidFixedBuildings(-1.0))
        );
        assert_eq!(table.row(row).unwrap().fixed_buildings, Some(2.0));
    }

    #[test]
    fn set_crafter_checks_recipe_crafters() {
        let f = fixture();
        let prefs = Default::default();
        let ctx = f.ctx(&prefs);
        let mut table = ProductionTable::new();
        let row = table.add_recipe(&ctx, ObjectWithQuality::normal(f.gear_recipe)).unwrap();
        assert!(table.set_crafter(&ctx, row, Some(ObjectWithQuality::normal(f.assembler_2))).is_ok());
        assert_eq!(
            table.set_crafter(&ctx, row, Some(ObjectWithQuality::normal(f.boiler))),
            Err(ModelError::CrafterNotAllowed(f.boiler))
        );
    }

    #[test]
    fn links_are_unique_per_goods() {
        let f = fixture();
        let mut table = ProductionTable::new();
        let plate = ObjectWithQuality::normal(f.iron_plate);
        table.add_link(ProductionLink::new(plate, 1.0, LinkAlgorithm::Match));
        table.add_link(ProductionLink::new(plate, 5.0, LinkAlgorithm::AllowOverProduction));
        assert_eq!(table.links().len(), 1);
        assert_eq!(table.link(plate).unwrap().amount, 5.0);
        assert!(table.remove_link(plate).is_some());
        assert!(table.links().is_empty());
    }

    #[test]
    fn nested_rows_inherit_disabled_state() {
        let f = fixture();
        let prefs = Default::default();
        let ctx = f.ctx(&prefs);
        let mut inner = ProductionTable::new();
        inner.add_recipe(&ctx, ObjectWithQuality::normal(f.smelt_iron)).unwrap();
        let mut table = ProductionTable::new();
        let outer = table.add_recipe(&ctx, ObjectWithQuality::normal(f.gear_recipe)).unwrap();
        table.set_subgroup(outer, Some(inner)).unwrap();
        table.set_enabled(outer, false).unwrap();

        let mut rows = Vec::new();
        table.collect_rows(true, &mut rows);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|(_, enabled)| !enabled));
    }
}
