//! Deterministic comparators over catalog objects.
//!
//! All domain orderings share one two-level shape, implemented once in
//! [`ObjectComparer`]:
//!
//! 1. **Primary key** -- milestone ordinal, then special type (`Normal`
//!    first).
//! 2. **Secondary key** -- a [`SimilarOrdering`] applied only on a primary tie.
//!
//! [`FavoritesComparer`] decorates any [`ObjectOrdering`] with the user's
//! favorites and the session bump counts. [`DeterministicComparer`] orders by
//! identity only and exists for reproducible iteration, not ranking.
//!
//! Every comparator here is a strict weak ordering. Floating keys are compared
//! with `f32::total_cmp`, so NaN costs cannot break transitivity.

use crate::catalog::{Catalog, CatalogObject};
use crate::milestones::Milestones;
use crate::preferences::{Preferences, SelectionSession};
use std::cmp::Ordering;

/// Read-only state every ranking call consults.
#[derive(Debug, Clone, Copy)]
pub struct OrderingContext<'a> {
    pub catalog: &'a Catalog,
    pub milestones: &'a Milestones,
    pub preferences: &'a Preferences,
}

impl<'a> OrderingContext<'a> {
    pub fn new(catalog: &'a Catalog, milestones: &'a Milestones, preferences: &'a Preferences) -> Self {
        Self {
            catalog,
            milestones,
            preferences,
        }
    }
}

pub trait ObjectOrdering {
    fn compare_objects(&self, x: &CatalogObject, y: &CatalogObject) -> Ordering;

    /// Absent objects sort last.
    fn compare(&self, x: Option<&CatalogObject>, y: Option<&CatalogObject>) -> Ordering {
        match (x, y) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => self.compare_objects(x, y),
        }
    }

    /// Stable sort, best first.
    fn sort(&self, objects: &mut [&CatalogObject]) {
        objects.sort_by(|a, b| self.compare_objects(a, b));
    }

    /// The first object under this ordering, keeping the earliest on ties.
    fn best<'o, I>(&self, candidates: I) -> Option<&'o CatalogObject>
    where
        Self: Sized,
        I: IntoIterator<Item = &'o CatalogObject>,
    {
        candidates.into_iter().fold(None, |best, candidate| match best {
            Some(current) if self.compare_objects(candidate, current) != Ordering::Less => {
                Some(current)
            }
            _ => Some(candidate),
        })
    }
}

impl<T: ObjectOrdering + ?Sized> ObjectOrdering for &T {
    fn compare_objects(&self, x: &CatalogObject, y: &CatalogObject) -> Ordering {
        (**self).compare_objects(x, y)
    }
}

// ---------------------------------------------------------------------------
// Secondary keys
// ---------------------------------------------------------------------------

/// Domain-specific secondary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarOrdering {
    /// Flow ascending, recipe waste ascending, cost descending.
    Default,
    /// Cost per unit of energy.
    Fuel,
    /// Energy type, crafting speed descending, cost ascending.
    Crafter,
    /// Flow descending, recipe waste ascending.
    Recipe,
}

impl SimilarOrdering {
    pub fn compare(self, x: &CatalogObject, y: &CatalogObject) -> Ordering {
        match self {
            SimilarOrdering::Default => default_similar(x, y),
            SimilarOrdering::Fuel => fuel_similar(x, y),
            SimilarOrdering::Crafter => crafter_similar(x, y),
            SimilarOrdering::Recipe => recipe_similar(x, y),
        }
    }
}

// Non-recipes count as zero waste, so two non-recipes always fall through to
// cost.
fn default_similar(x: &CatalogObject, y: &CatalogObject) -> Ordering {
    x.approximate_flow
        .total_cmp(&y.approximate_flow)
        .then_with(|| {
            let xw = x.recipe_waste().unwrap_or(0.0);
            let yw = y.recipe_waste().unwrap_or(0.0);
            xw.total_cmp(&yw)
        })
        .then_with(|| y.cost.total_cmp(&x.cost))
}

/// Fuel ranking class: burnable goods, then heat-carrying fluids, then the
/// rest by default ordering.
enum FuelClass {
    Burnable(f32),
    Heat(f32),
    Other,
}

fn fuel_class(o: &CatalogObject) -> FuelClass {
    let fuel_value = o.fuel_value();
    if fuel_value > 0.0 {
        return FuelClass::Burnable(o.cost / fuel_value);
    }
    match o.heat_value() {
        Some(heat) => FuelClass::Heat(o.cost / heat),
        None => FuelClass::Other,
    }
}

fn fuel_similar(x: &CatalogObject, y: &CatalogObject) -> Ordering {
    match (fuel_class(x), fuel_class(y)) {
        (FuelClass::Burnable(a), FuelClass::Burnable(b)) => a.total_cmp(&b),
        (FuelClass::Burnable(_), _) => Ordering::Less,
        (_, FuelClass::Burnable(_)) => Ordering::Greater,
        (FuelClass::Heat(a), FuelClass::Heat(b)) => a.total_cmp(&b),
        // Heat carriers outrank goods with no energy, keeping the class order total.
        (FuelClass::Heat(_), FuelClass::Other) => Ordering::Less,
        (FuelClass::Other, FuelClass::Heat(_)) => Ordering::Greater,
        (FuelClass::Other, FuelClass::Other) => default_similar(x, y),
    }
}

fn crafter_similar(x: &CatalogObject, y: &CatalogObject) -> Ordering {
    match (x.as_crafter(), y.as_crafter()) {
        (Some(cx), Some(cy)) => cx
            .energy
            .energy_type
            .cmp(&cy.energy.energy_type)
            .then_with(|| cy.crafting_speed.total_cmp(&cx.crafting_speed))
            .then_with(|| x.cost.total_cmp(&y.cost)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => x.cost.total_cmp(&y.cost),
    }
}

fn recipe_similar(x: &CatalogObject, y: &CatalogObject) -> Ordering {
    y.approximate_flow.total_cmp(&x.approximate_flow).then_with(|| {
        let xw = x.recipe_waste().unwrap_or(0.0);
        let yw = y.recipe_waste().unwrap_or(0.0);
        xw.total_cmp(&yw)
    })
}

// ---------------------------------------------------------------------------
// Comparers
// ---------------------------------------------------------------------------

/// Accessibility-first comparer with a domain secondary key.
#[derive(Debug, Clone, Copy)]
pub struct ObjectComparer<'a> {
    milestones: &'a Milestones,
    similar: SimilarOrdering,
}

impl<'a> ObjectComparer<'a> {
    pub fn new(milestones: &'a Milestones, similar: SimilarOrdering) -> Self {
        Self { milestones, similar }
    }

    pub fn default_ordering(milestones: &'a Milestones) -> Self {
        Self::new(milestones, SimilarOrdering::Default)
    }

    pub fn fuel_ordering(milestones: &'a Milestones) -> Self {
        Self::new(milestones, SimilarOrdering::Fuel)
    }

    pub fn crafter_ordering(milestones: &'a Milestones) -> Self {
        Self::new(milestones, SimilarOrdering::Crafter)
    }

    pub fn recipe_ordering(milestones: &'a Milestones) -> Self {
        Self::new(milestones, SimilarOrdering::Recipe)
    }

    pub fn similar(&self) -> SimilarOrdering {
        self.similar
    }
}

impl ObjectOrdering for ObjectComparer<'_> {
    fn compare_objects(&self, x: &CatalogObject, y: &CatalogObject) -> Ordering {
        let msx = self.milestones.milestone_order(x.id);
        let msy = self.milestones.milestone_order(y.id);
        msx.cmp(&msy)
            .then_with(|| x.special_type.cmp(&y.special_type))
            .then_with(|| self.similar.compare(x, y))
    }
}

/// Favorites first, then higher bump count, then the wrapped ordering.
#[derive(Debug, Clone, Copy)]
pub struct FavoritesComparer<'a, B> {
    base: B,
    preferences: &'a Preferences,
    session: &'a SelectionSession,
}

impl<'a, B: ObjectOrdering> FavoritesComparer<'a, B> {
    pub fn new(base: B, preferences: &'a Preferences, session: &'a SelectionSession) -> Self {
        Self {
            base,
            preferences,
            session,
        }
    }

    pub fn base(&self) -> &B {
        &self.base
    }
}

impl<B: ObjectOrdering> ObjectOrdering for FavoritesComparer<'_, B> {
    fn compare_objects(&self, x: &CatalogObject, y: &CatalogObject) -> Ordering {
        let fx = self.preferences.is_favorite(x.id);
        let fy = self.preferences.is_favorite(y.id);
        fy.cmp(&fx)
            .then_with(|| {
                self.session
                    .bump_count(y.id)
                    .cmp(&self.session.bump_count(x.id))
            })
            .then_with(|| self.base.compare_objects(x, y))
    }
}

/// Identity ordering for reproducible iteration.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeterministicComparer;

impl ObjectOrdering for DeterministicComparer {
    fn compare_objects(&self, x: &CatalogObject, y: &CatalogObject) -> Ordering {
        x.id.cmp(&y.id)
    }
}
