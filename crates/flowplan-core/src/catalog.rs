//! Immutable catalog of game objects.
//!
//! The catalog is assembled once through [`CatalogBuilder`] and frozen by
//! [`CatalogBuilder::build`], which validates every cross-reference. After
//! that it is shared read-only (typically behind an `Arc`) by ordering,
//! selection and solving.

use crate::id::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Object classification
// ---------------------------------------------------------------------------

/// Special-type tag. `Normal` always precedes the virtual variants when
/// accessibility ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialType {
    #[default]
    Normal,
    Voiding,
    Barreling,
    Stacking,
    Pressurization,
    Crating,
}

/// How a crafter is powered. Declaration order is the crafter grouping order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyType {
    Void,
    Electric,
    Heat,
    SolidFuel,
    FluidFuel,
    FluidHeat,
}

impl EnergyType {
    /// Whether this energy source burns a goods (and so needs a fuel pick).
    pub fn uses_fuel(self) -> bool {
        matches!(
            self,
            EnergyType::SolidFuel | EnergyType::FluidFuel | EnergyType::FluidHeat
        )
    }
}

// ---------------------------------------------------------------------------
// Kind-specific data
// ---------------------------------------------------------------------------

/// Fluid-only attributes of a goods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluidData {
    pub temperature: f32,
    /// Temperature the fluid carries no usable heat at.
    pub base_temperature: f32,
    /// Energy (kJ) to raise one unit by one degree.
    pub heat_capacity: f32,
    /// Assigned by the catalog builder from the fluid's group name.
    #[serde(default)]
    pub variant_group: Option<VariantGroupId>,
}

impl FluidData {
    /// Usable heat per unit: `(temperature - base_temperature) * heat_capacity`.
    pub fn heat_value(&self) -> f32 {
        (self.temperature - self.base_temperature) * self.heat_capacity
    }
}

/// An item or a fluid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoodsData {
    /// Energy content per unit in kJ. Zero for non-fuels.
    #[serde(default)]
    pub fuel_value: f32,
    #[serde(default)]
    pub fluid: Option<FluidData>,
}

/// One ingredient slot of a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub goods: ObjectId,
    pub amount: f32,
    /// Interchangeable goods for this slot. Empty when the slot is not
    /// ambiguous; otherwise contains `goods` itself.
    #[serde(default)]
    pub variants: Vec<ObjectId>,
}

impl Ingredient {
    pub fn new(goods: ObjectId, amount: f32) -> Self {
        Self {
            goods,
            amount,
            variants: Vec::new(),
        }
    }

    pub fn with_variants(goods: ObjectId, amount: f32, variants: Vec<ObjectId>) -> Self {
        Self {
            goods,
            amount,
            variants,
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        self.variants.len() > 1
    }
}

/// One product of a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub goods: ObjectId,
    pub amount: f32,
}

impl Product {
    pub fn new(goods: ObjectId, amount: f32) -> Self {
        Self { goods, amount }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeData {
    pub ingredients: Vec<Ingredient>,
    pub products: Vec<Product>,
    /// Seconds of work per run at crafting speed 1.
    pub time: f32,
    pub crafters: Vec<ObjectId>,
    /// Derived inefficiency score, used as a ranking tie-break.
    #[serde(default)]
    pub waste: f32,
    /// When set, `time` is per degree of heating: the effective time is
    /// `time * (product temperature - ingredient temperature)`.
    #[serde(default)]
    pub temperature_scaled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergySource {
    pub energy_type: EnergyType,
    #[serde(default)]
    pub fuels: Vec<ObjectId>,
    #[serde(default = "default_effectivity")]
    pub effectivity: f32,
}

fn default_effectivity() -> f32 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrafterData {
    pub crafting_speed: f32,
    /// Power draw in kW while working.
    pub energy_usage: f32,
    pub energy: EnergySource,
}

/// Kind-specific payload of a catalog object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjectData {
    Goods(GoodsData),
    Recipe(RecipeData),
    Crafter(CrafterData),
    Technology,
}

// ---------------------------------------------------------------------------
// Dependencies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    /// Every listed object must be accessible.
    RequireAll,
    /// At least one listed object must be accessible.
    RequireAny,
}

/// A group of objects an object depends on for accessibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyList {
    pub kind: DependencyKind,
    pub objects: Vec<ObjectId>,
}

// ---------------------------------------------------------------------------
// Catalog object
// ---------------------------------------------------------------------------

/// A registered catalog object. Immutable once the catalog is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogObject {
    pub id: ObjectId,
    pub name: String,
    pub special_type: SpecialType,
    /// Derived cost; always available and the final tie-break.
    pub cost: f32,
    pub approximate_flow: f32,
    pub data: ObjectData,
    pub dependencies: Vec<DependencyList>,
}

impl CatalogObject {
    pub fn as_goods(&self) -> Option<&GoodsData> {
        match &self.data {
            ObjectData::Goods(goods) => Some(goods),
            _ => None,
        }
    }

    pub fn as_recipe(&self) -> Option<&RecipeData> {
        match &self.data {
            ObjectData::Recipe(recipe) => Some(recipe),
            _ => None,
        }
    }

    pub fn as_crafter(&self) -> Option<&CrafterData> {
        match &self.data {
            ObjectData::Crafter(crafter) => Some(crafter),
            _ => None,
        }
    }

    pub fn as_fluid(&self) -> Option<&FluidData> {
        self.as_goods().and_then(|g| g.fluid.as_ref())
    }

    pub fn is_fluid(&self) -> bool {
        self.as_fluid().is_some()
    }

    /// Recipe waste; `None` for anything that is not a recipe.
    pub fn recipe_waste(&self) -> Option<f32> {
        self.as_recipe().map(|r| r.waste)
    }

    /// Fuel value in kJ per unit; zero for non-goods and non-fuels.
    pub fn fuel_value(&self) -> f32 {
        self.as_goods().map(|g| g.fuel_value).unwrap_or(0.0)
    }

    /// Usable heat per unit for fluids.
    pub fn heat_value(&self) -> Option<f32> {
        self.as_fluid().map(FluidData::heat_value)
    }

    /// Energy one unit delivers when burned or cooled: the fuel value, or the
    /// heat value for fluids without a fuel value.
    pub fn energy_per_unit(&self) -> f32 {
        let fuel = self.fuel_value();
        if fuel > 0.0 {
            fuel
        } else {
            self.heat_value().unwrap_or(0.0)
        }
    }
}

/// Registration input for [`CatalogBuilder::register`].
#[derive(Debug, Clone)]
pub struct ObjectDef {
    pub name: String,
    pub special_type: SpecialType,
    pub cost: f32,
    pub approximate_flow: f32,
    pub data: ObjectData,
    pub dependencies: Vec<DependencyList>,
}

impl ObjectDef {
    pub fn new(name: &str, data: ObjectData) -> Self {
        Self {
            name: name.to_string(),
            special_type: SpecialType::Normal,
            cost: 1.0,
            approximate_flow: 0.0,
            data,
            dependencies: Vec::new(),
        }
    }

    pub fn item(name: &str) -> Self {
        Self::new(name, ObjectData::Goods(GoodsData::default()))
    }

    pub fn fuel(name: &str, fuel_value: f32) -> Self {
        Self::new(
            name,
            ObjectData::Goods(GoodsData {
                fuel_value,
                fluid: None,
            }),
        )
    }

    pub fn fluid(name: &str, temperature: f32, base_temperature: f32, heat_capacity: f32) -> Self {
        Self::new(
            name,
            ObjectData::Goods(GoodsData {
                fuel_value: 0.0,
                fluid: Some(FluidData {
                    temperature,
                    base_temperature,
                    heat_capacity,
                    variant_group: None,
                }),
            }),
        )
    }

    pub fn recipe(name: &str, recipe: RecipeData) -> Self {
        Self::new(name, ObjectData::Recipe(recipe))
    }

    pub fn crafter(name: &str, crafter: CrafterData) -> Self {
        Self::new(name, ObjectData::Crafter(crafter))
    }

    pub fn technology(name: &str) -> Self {
        Self::new(name, ObjectData::Technology)
    }

    pub fn with_cost(mut self, cost: f32) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_flow(mut self, approximate_flow: f32) -> Self {
        self.approximate_flow = approximate_flow;
        self
    }

    pub fn with_special_type(mut self, special_type: SpecialType) -> Self {
        self.special_type = special_type;
        self
    }

    pub fn require_all(mut self, objects: Vec<ObjectId>) -> Self {
        self.dependencies.push(DependencyList {
            kind: DependencyKind::RequireAll,
            objects,
        });
        self
    }

    pub fn require_any(mut self, objects: Vec<ObjectId>) -> Self {
        self.dependencies.push(DependencyList {
            kind: DependencyKind::RequireAny,
            objects,
        });
        self
    }
}

/// A quality tier definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityDef {
    pub name: String,
    pub level: u8,
    /// Multiplier applied to the crafting speed of crafters at this quality.
    pub speed_multiplier: f32,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for constructing an immutable [`Catalog`].
#[derive(Debug)]
pub struct CatalogBuilder {
    objects: Vec<CatalogObject>,
    name_to_id: HashMap<String, ObjectId>,
    qualities: Vec<QualityDef>,
    fluid_groups: HashMap<ObjectId, String>,
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogBuilder {
    /// A builder pre-populated with the Normal quality tier.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            name_to_id: HashMap::new(),
            qualities: vec![QualityDef {
                name: "normal".to_string(),
                level: 0,
                speed_multiplier: 1.0,
            }],
            fluid_groups: HashMap::new(),
        }
    }

    /// Register an object. Returns its id.
    pub fn register(&mut self, def: ObjectDef) -> ObjectId {
        let id = ObjectId(self.objects.len() as u32);
        self.name_to_id.insert(def.name.clone(), id);
        self.objects.push(CatalogObject {
            id,
            name: def.name,
            special_type: def.special_type,
            cost: def.cost,
            approximate_flow: def.approximate_flow,
            data: def.data,
            dependencies: def.dependencies,
        });
        id
    }

    /// Register a fluid and file it under a named variant group. Fluids that
    /// share a group name become interchangeable variants.
    pub fn register_fluid_variant(&mut self, group: &str, def: ObjectDef) -> ObjectId {
        let id = self.register(def);
        self.fluid_groups.insert(id, group.to_string());
        id
    }

    /// Register a quality tier above Normal. Returns its id.
    pub fn register_quality(&mut self, name: &str, level: u8, speed_multiplier: f32) -> QualityId {
        let id = QualityId(self.qualities.len() as u8);
        self.qualities.push(QualityDef {
            name: name.to_string(),
            level,
            speed_multiplier,
        });
        id
    }

    /// Mutate a registered object by name.
    pub fn mutate<F>(&mut self, name: &str, f: F) -> Result<(), CatalogError>
    where
        F: FnOnce(&mut CatalogObject),
    {
        let id = self
            .name_to_id
            .get(name)
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))?;
        f(&mut self.objects[id.index()]);
        Ok(())
    }

    pub fn object_id(&self, name: &str) -> Option<ObjectId> {
        self.name_to_id.get(name).copied()
    }

    /// Validate references and freeze the catalog.
    pub fn build(mut self) -> Result<Catalog, CatalogError> {
        let count = self.objects.len();
        let exists = |id: ObjectId| id.index() < count;

        for object in &self.objects {
            for list in &object.dependencies {
                if let Some(bad) = list.objects.iter().find(|&&d| !exists(d)) {
                    return Err(CatalogError::InvalidReference {
                        object: object.id,
                        reference: *bad,
                    });
                }
            }
        }

        let is_goods = |objects: &[CatalogObject], id: ObjectId| {
            objects.get(id.index()).is_some_and(|o| o.as_goods().is_some())
        };
        let is_crafter = |objects: &[CatalogObject], id: ObjectId| {
            objects.get(id.index()).is_some_and(|o| o.as_crafter().is_some())
        };

        for object in &self.objects {
            match &object.data {
                ObjectData::Recipe(recipe) => {
                    if !(recipe.time > 0.0) {
                        return Err(CatalogError::InvalidRecipeTime(object.id));
                    }
                    for ingredient in &recipe.ingredients {
                        for &goods in std::iter::once(&ingredient.goods).chain(&ingredient.variants) {
                            if !is_goods(&self.objects, goods) {
                                return Err(CatalogError::NotGoods {
                                    object: object.id,
                                    reference: goods,
                                });
                            }
                        }
                        if !ingredient.variants.is_empty()
                            && !ingredient.variants.contains(&ingredient.goods)
                        {
                            return Err(CatalogError::VariantMismatch(object.id));
                        }
                    }
                    for product in &recipe.products {
                        if !is_goods(&self.objects, product.goods) {
                            return Err(CatalogError::NotGoods {
                                object: object.id,
                                reference: product.goods,
                            });
                        }
                    }
                    if let Some(bad) = recipe.crafters.iter().find(|&&c| !is_crafter(&self.objects, c)) {
                        return Err(CatalogError::NotCrafter {
                            object: object.id,
                            reference: *bad,
                        });
                    }
                }
                ObjectData::Crafter(crafter) => {
                    if let Some(bad) = crafter.energy.fuels.iter().find(|&&f| !is_goods(&self.objects, f)) {
                        return Err(CatalogError::NotGoods {
                            object: object.id,
                            reference: *bad,
                        });
                    }
                }
                ObjectData::Goods(_) | ObjectData::Technology => {}
            }
        }

        // Assign variant groups in registration order so ids are reproducible.
        let mut group_ids: HashMap<String, VariantGroupId> = HashMap::new();
        let mut variant_groups: Vec<Vec<ObjectId>> = Vec::new();
        for index in 0..count {
            let id = ObjectId(index as u32);
            let Some(group) = self.fluid_groups.get(&id) else {
                continue;
            };
            let next = VariantGroupId(group_ids.len() as u32);
            let group_id = *group_ids.entry(group.clone()).or_insert(next);
            if group_id == next {
                variant_groups.push(Vec::new());
            }
            let object = &mut self.objects[index];
            match &mut object.data {
                ObjectData::Goods(GoodsData {
                    fluid: Some(fluid), ..
                }) => fluid.variant_group = Some(group_id),
                _ => return Err(CatalogError::NotFluid(id)),
            }
            variant_groups[group_id.0 as usize].push(id);
        }

        // An ingredient without an explicit variant list accepts every fluid
        // of its goods' group.
        let group_of: HashMap<ObjectId, usize> = variant_groups
            .iter()
            .enumerate()
            .flat_map(|(group, members)| members.iter().map(move |id| (*id, group)))
            .collect();
        for object in &mut self.objects {
            let ObjectData::Recipe(recipe) = &mut object.data else {
                continue;
            };
            for ingredient in recipe.ingredients.iter_mut().filter(|i| i.variants.is_empty()) {
                if let Some(&group) = group_of.get(&ingredient.goods)
                    && variant_groups[group].len() > 1
                {
                    ingredient.variants = variant_groups[group].clone();
                }
            }
        }

        let mut producers: HashMap<ObjectId, Vec<ObjectId>> = HashMap::new();
        for object in &self.objects {
            if let Some(recipe) = object.as_recipe() {
                for product in &recipe.products {
                    let list = producers.entry(product.goods).or_default();
                    if !list.contains(&object.id) {
                        list.push(object.id);
                    }
                }
            }
        }

        Ok(Catalog {
            objects: self.objects,
            name_to_id: self.name_to_id,
            qualities: self.qualities,
            variant_groups,
            producers,
        })
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Immutable catalog. Frozen after build(). Thread-safe to share.
#[derive(Debug)]
pub struct Catalog {
    objects: Vec<CatalogObject>,
    name_to_id: HashMap<String, ObjectId>,
    qualities: Vec<QualityDef>,
    variant_groups: Vec<Vec<ObjectId>>,
    producers: HashMap<ObjectId, Vec<ObjectId>>,
}

impl Catalog {
    pub fn get(&self, id: ObjectId) -> Option<&CatalogObject> {
        self.objects.get(id.index())
    }

    /// Look up an object that is known to exist.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this catalog.
    pub fn object(&self, id: ObjectId) -> &CatalogObject {
        &self.objects[id.index()]
    }

    pub fn id(&self, name: &str) -> Option<ObjectId> {
        self.name_to_id.get(name).copied()
    }

    pub fn by_name(&self, name: &str) -> Option<&CatalogObject> {
        self.id(name).and_then(|id| self.get(id))
    }

    pub fn objects(&self) -> &[CatalogObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn quality(&self, id: QualityId) -> Option<&QualityDef> {
        self.qualities.get(id.0 as usize)
    }

    pub fn qualities(&self) -> &[QualityDef] {
        &self.qualities
    }

    /// All fluids in a variant group, in registration order.
    pub fn variant_group(&self, group: VariantGroupId) -> &[ObjectId] {
        self.variant_groups
            .get(group.0 as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Recipes that list `goods` among their products.
    pub fn recipes_producing(&self, goods: ObjectId) -> &[ObjectId] {
        self.producers.get(&goods).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("object {object:?} references unknown object {reference:?}")]
    InvalidReference { object: ObjectId, reference: ObjectId },
    #[error("object {object:?} expects goods but {reference:?} is not goods")]
    NotGoods { object: ObjectId, reference: ObjectId },
    #[error("recipe {object:?} lists {reference:?} as a crafter but it is not one")]
    NotCrafter { object: ObjectId, reference: ObjectId },
    #[error("recipe {0:?} has an ingredient whose variants do not include its default goods")]
    VariantMismatch(ObjectId),
    #[error("recipe {0:?} must take a positive amount of time")]
    InvalidRecipeTime(ObjectId),
    #[error("object {0:?} was filed under a variant group but is not a fluid")]
    NotFluid(ObjectId),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn electric(speed: f32) -> CrafterData {
        CrafterData {
            crafting_speed: speed,
            energy_usage: 75.0,
            energy: EnergySource {
                energy_type: EnergyType::Electric,
                fuels: vec![],
                effectivity: 1.0,
            },
        }
    }

    fn setup_builder() -> CatalogBuilder {
        let mut b = CatalogBuilder::new();
        let plate = b.register(ObjectDef::item("iron_plate").with_cost(2.0));
        let gear = b.register(ObjectDef::item("gear").with_cost(5.0));
        let assembler = b.register(ObjectDef::crafter("assembler", electric(0.75)));
        b.register(ObjectDef::recipe(
            "gear_recipe",
            RecipeData {
                ingredients: vec![Ingredient::new(plate, 2.0)],
                products: vec![Product::new(gear, 1.0)],
                time: 0.5,
                crafters: vec![assembler],
                waste: 0.0,
                temperature_scaled: false,
            },
        ));
        b
    }

    #[test]
    fn register_and_build() {
        let catalog = setup_builder().build().unwrap();
        assert_eq!(catalog.len(), 4);
        assert!(catalog.by_name("gear").unwrap().as_goods().is_some());
        assert!(catalog.by_name("assembler").unwrap().as_crafter().is_some());
        assert_eq!(catalog.qualities().len(), 1);
    }

    #[test]
    fn producers_are_indexed() {
        let catalog = setup_builder().build().unwrap();
        let gear = catalog.id("gear").unwrap();
        let recipe = catalog.id("gear_recipe").unwrap();
        assert_eq!(catalog.recipes_producing(gear), &[recipe]);
        assert!(catalog.recipes_producing(catalog.id("iron_plate").unwrap()).is_empty());
    }

    #[test]
    fn waste_is_a_recipe_capability() {
        let catalog = setup_builder().build().unwrap();
        assert_eq!(catalog.by_name("gear_recipe").unwrap().recipe_waste(), Some(0.0));
        assert_eq!(catalog.by_name("gear").unwrap().recipe_waste(), None);
    }

    #[test]
    fn fluid_variants_share_a_group() {
        let mut b = CatalogBuilder::new();
        let cold = b.register_fluid_variant("water", ObjectDef::fluid("water", 15.0, 15.0, 0.2));
        let hot = b.register_fluid_variant("water", ObjectDef::fluid("water_50", 50.0, 15.0, 0.2));
        let steam = b.register_fluid_variant("steam", ObjectDef::fluid("steam", 165.0, 15.0, 0.2));
        let catalog = b.build().unwrap();

        let group = catalog.object(cold).as_fluid().unwrap().variant_group.unwrap();
        assert_eq!(catalog.variant_group(group), &[cold, hot]);
        let steam_group = catalog.object(steam).as_fluid().unwrap().variant_group.unwrap();
        assert_ne!(group, steam_group);
    }

    #[test]
    fn grouped_fluid_ingredient_becomes_ambiguous() {
        let mut b = CatalogBuilder::new();
        let cold = b.register_fluid_variant("water", ObjectDef::fluid("water", 15.0, 15.0, 0.2));
        let hot = b.register_fluid_variant("water", ObjectDef::fluid("water_50", 50.0, 15.0, 0.2));
        let steam = b.register_fluid_variant("steam", ObjectDef::fluid("steam", 165.0, 15.0, 0.2));
        let plate = b.register(ObjectDef::item("plate"));
        let recipe = b.register(ObjectDef::recipe(
            "boil",
            RecipeData {
                ingredients: vec![Ingredient::new(cold, 1.0), Ingredient::new(plate, 1.0)],
                products: vec![Product::new(steam, 1.0)],
                time: 1.0,
                crafters: vec![],
                waste: 0.0,
                temperature_scaled: false,
            },
        ));
        let catalog = b.build().unwrap();

        let ingredients = &catalog.object(recipe).as_recipe().unwrap().ingredients;
        assert!(ingredients[0].is_ambiguous());
        assert_eq!(ingredients[0].variants, vec![cold, hot]);
        assert!(ingredients[1].variants.is_empty());
    }

    #[test]
    fn heat_value_is_relative_to_base_temperature() {
        let mut b = CatalogBuilder::new();
        let steam = b.register(ObjectDef::fluid("steam", 165.0, 15.0, 0.2));
        let catalog = b.build().unwrap();
        let heat = catalog.object(steam).heat_value().unwrap();
        assert!((heat - 30.0).abs() < 1e-4);
        assert!((catalog.object(steam).energy_per_unit() - 30.0).abs() < 1e-4);
    }

    #[test]
    fn mutate_object() {
        let mut builder = setup_builder();
        builder.mutate("gear", |o| o.cost = 9.0).unwrap();
        let catalog = builder.build().unwrap();
        assert_eq!(catalog.by_name("gear").unwrap().cost, 9.0);
    }

    #[test]
    fn mutate_nonexistent_fails() {
        let mut builder = setup_builder();
        match builder.mutate("nonexistent", |_| {}) {
            Err(CatalogError::NotFound(name)) => assert_eq!(name, "nonexistent"),
            other => panic!("expected NotFound, got: {other:?}"),
        }
    }

    #[test]
    fn recipe_with_non_goods_ingredient_fails() {
        let mut b = setup_builder();
        let assembler = b.object_id("assembler").unwrap();
        b.register(ObjectDef::recipe(
            "bad",
            RecipeData {
                ingredients: vec![Ingredient::new(assembler, 1.0)],
                products: vec![],
                time: 1.0,
                crafters: vec![],
                waste: 0.0,
                temperature_scaled: false,
            },
        ));
        assert!(matches!(b.build(), Err(CatalogError::NotGoods { .. })));
    }

    #[test]
    fn unknown_dependency_fails() {
        let mut b = CatalogBuilder::new();
        b.register(ObjectDef::item("orphan").require_all(vec![ObjectId(99)]));
        match b.build() {
            Err(CatalogError::InvalidReference { reference, .. }) => {
                assert_eq!(reference, ObjectId(99));
            }
            other => panic!("expected InvalidReference, got: {other:?}"),
        }
    }

    #[test]
    fn variants_must_contain_default_goods() {
        let mut b = CatalogBuilder::new();
        let a = b.register(ObjectDef::fluid("a", 15.0, 15.0, 0.2));
        let c = b.register(ObjectDef::fluid("c", 50.0, 15.0, 0.2));
        let d = b.register(ObjectDef::fluid("d", 90.0, 15.0, 0.2));
        b.register(ObjectDef::recipe(
            "mix",
            RecipeData {
                ingredients: vec![Ingredient::with_variants(a, 1.0, vec![c, d])],
                products: vec![],
                time: 1.0,
                crafters: vec![],
                waste: 0.0,
                temperature_scaled: false,
            },
        ));
        assert!(matches!(b.build(), Err(CatalogError::VariantMismatch(_))));
    }

    #[test]
    fn zero_time_recipe_fails() {
        let mut b = CatalogBuilder::new();
        b.register(ObjectDef::recipe(
            "instant",
            RecipeData {
                ingredients: vec![],
                products: vec![],
                time: 0.0,
                crafters: vec![],
                waste: 0.0,
                temperature_scaled: false,
            },
        ));
        assert!(matches!(b.build(), Err(CatalogError::InvalidRecipeTime(_))));
    }

    #[test]
    fn quality_tiers_are_numbered_after_normal() {
        let mut b = CatalogBuilder::new();
        let uncommon = b.register_quality("uncommon", 1, 1.3);
        let catalog = b.build().unwrap();
        assert_eq!(uncommon, QualityId(1));
        assert_eq!(catalog.quality(uncommon).unwrap().speed_multiplier, 1.3);
        assert_eq!(catalog.quality(QualityId::NORMAL).unwrap().level, 0);
    }

    #[test]
    fn empty_catalog_builds_successfully() {
        let catalog = CatalogBuilder::new().build().unwrap();
        assert!(catalog.is_empty());
        assert!(catalog.get(ObjectId(0)).is_none());
    }
}
