//! Property-based tests for the ordering and selection subsystem.
//!
//! Uses proptest to generate random catalogs, favorites and bump counts,
//! then verify the comparator and quick-select invariants hold.

use flowplan_core::catalog::*;
use flowplan_core::id::*;
use flowplan_core::milestones::Milestones;
use flowplan_core::ordering::*;
use flowplan_core::preferences::{Preferences, SelectionSession};
use flowplan_core::select::{SelectionHint, select_single};
use proptest::prelude::*;
use std::cmp::Ordering;
use std::collections::HashSet;

// ===========================================================================
// Generators
// ===========================================================================

#[derive(Debug, Clone)]
enum Kind {
    Item,
    Fuel(f32),
    Fluid(f32),
    Crafter(f32, u8),
    Recipe(f32),
}

#[derive(Debug, Clone)]
struct Blueprint {
    kind: Kind,
    cost: f32,
    flow: f32,
    special: bool,
}

fn arb_kind() -> impl Strategy<Value = Kind> {
    prop_oneof![
        Just(Kind::Item),
        (0.0f32..5000.0).prop_map(Kind::Fuel),
        (15.0f32..600.0).prop_map(Kind::Fluid),
        (0.1f32..3.0, 0u8..6).prop_map(|(s, e)| Kind::Crafter(s, e)),
        (0.0f32..1.0).prop_map(Kind::Recipe),
    ]
}

fn arb_blueprint() -> impl Strategy<Value = Blueprint> {
    // Small value sets so ties are common.
    (
        arb_kind(),
        prop::sample::select(vec![0.0f32, 0.5, 1.0, 2.0, f32::NAN]),
        prop::sample::select(vec![-1.0f32, 0.0, 1.0]),
        prop::bool::weighted(0.2),
    )
        .prop_map(|(kind, cost, flow, special)| Blueprint {
            kind,
            cost,
            flow,
            special,
        })
}

fn energy_type(index: u8) -> EnergyType {
    match index {
        0 => EnergyType::Void,
        1 => EnergyType::Electric,
        2 => EnergyType::Heat,
        3 => EnergyType::SolidFuel,
        4 => EnergyType::FluidFuel,
        _ => EnergyType::FluidHeat,
    }
}

fn build(blueprints: &[Blueprint], gates: &[Option<usize>], milestone_count: usize) -> (Catalog, Vec<ObjectId>, Vec<ObjectId>) {
    let mut b = CatalogBuilder::new();
    let techs: Vec<ObjectId> = (0..milestone_count)
        .map(|i| b.register(ObjectDef::technology(&format!("tech-{i}"))))
        .collect();
    let mut ids = Vec::with_capacity(blueprints.len());
    for (i, bp) in blueprints.iter().enumerate() {
        let name = format!("obj-{i}");
        let def = match bp.kind {
            Kind::Item => ObjectDef::item(&name),
            Kind::Fuel(v) => ObjectDef::fuel(&name, v),
            Kind::Fluid(t) => ObjectDef::fluid(&name, t, 15.0, 0.2),
            Kind::Crafter(speed, e) => ObjectDef::crafter(
                &name,
                CrafterData {
                    crafting_speed: speed,
                    energy_usage: 100.0,
                    energy: EnergySource {
                        energy_type: energy_type(e),
                        fuels: vec![],
                        effectivity: 1.0,
                    },
                },
            ),
            Kind::Recipe(waste) => ObjectDef::recipe(
                &name,
                RecipeData {
                    ingredients: vec![],
                    products: vec![],
                    time: 1.0,
                    crafters: vec![],
                    waste,
                    temperature_scaled: false,
                },
            ),
        };
        let mut def = def.with_cost(bp.cost).with_flow(bp.flow);
        if bp.special {
            def = def.with_special_type(SpecialType::Barreling);
        }
        if let Some(gate) = gates.get(i).copied().flatten()
            && let Some(tech) = techs.get(gate)
        {
            def = def.require_all(vec![*tech]);
        }
        ids.push(b.register(def));
    }
    (b.build().unwrap(), ids, techs)
}

fn arb_catalog() -> impl Strategy<Value = (Vec<Blueprint>, Vec<Option<usize>>)> {
    proptest::collection::vec(arb_blueprint(), 2..10).prop_flat_map(|blueprints| {
        let n = blueprints.len();
        (
            Just(blueprints),
            proptest::collection::vec(proptest::option::of(0usize..3), n),
        )
    })
}

fn assert_strict_weak<O: ObjectOrdering>(cmp: &O, objects: &[&CatalogObject]) -> Result<(), TestCaseError> {
    for x in objects {
        prop_assert_eq!(cmp.compare_objects(x, x), Ordering::Equal);
        for y in objects {
            let xy = cmp.compare_objects(x, y);
            prop_assert_eq!(xy, cmp.compare_objects(y, x).reverse());
            for z in objects {
                let yz = cmp.compare_objects(y, z);
                let xz = cmp.compare_objects(x, z);
                if xy != Ordering::Greater && yz != Ordering::Greater {
                    prop_assert_ne!(xz, Ordering::Greater);
                }
                if xy == Ordering::Equal && yz == Ordering::Equal {
                    prop_assert_eq!(xz, Ordering::Equal);
                }
            }
        }
    }
    Ok(())
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #[test]
    fn every_comparator_is_a_strict_weak_ordering(
        (blueprints, gates) in arb_catalog(),
        unlocked in proptest::collection::vec(any::<bool>(), 3),
        favorites in proptest::collection::vec(any::<bool>(), 10),
        bumps in proptest::collection::vec(0u32..3, 10),
    ) {
        let (catalog, ids, techs) = build(&blueprints, &gates, 3);
        let mut milestones = Milestones::compute(&catalog, techs.clone()).unwrap();
        let unlocked: HashSet<ObjectId> = techs.iter().zip(&unlocked).filter(|(_, u)| **u).map(|(t, _)| *t).collect();
        milestones.set_unlocked(&unlocked);

        let mut prefs = Preferences::new();
        let mut session = SelectionSession::new();
        for (i, id) in ids.iter().enumerate() {
            if favorites[i] {
                prefs.add_favorite(*id);
            }
            session.add_to_favorite(*id, bumps[i]);
        }

        let objects: Vec<&CatalogObject> = ids.iter().map(|id| catalog.object(*id)).collect();
        for similar in [SimilarOrdering::Default, SimilarOrdering::Fuel, SimilarOrdering::Crafter, SimilarOrdering::Recipe] {
            let base = ObjectComparer::new(&milestones, similar);
            assert_strict_weak(&base, &objects)?;
            assert_strict_weak(&FavoritesComparer::new(&base, &prefs, &session), &objects)?;
        }
        assert_strict_weak(&DeterministicComparer, &objects)?;
    }

    #[test]
    fn milestone_order_is_monotonic_in_required_set(
        requirements in proptest::collection::vec(proptest::collection::vec(any::<bool>(), 4), 2..8),
        unlocked in proptest::collection::vec(any::<bool>(), 4),
    ) {
        let mut b = CatalogBuilder::new();
        let techs: Vec<ObjectId> = (0..4).map(|i| b.register(ObjectDef::technology(&format!("t{i}")))).collect();
        let items: Vec<ObjectId> = requirements
            .iter()
            .enumerate()
            .map(|(i, req)| {
                let deps: Vec<ObjectId> = techs.iter().zip(req).filter(|(_, r)| **r).map(|(t, _)| *t).collect();
                b.register(ObjectDef::item(&format!("i{i}")).require_all(deps))
            })
            .collect();
        let catalog = b.build().unwrap();
        let mut ms = Milestones::compute(&catalog, techs.clone()).unwrap();
        let unlocked: HashSet<ObjectId> = techs.iter().zip(&unlocked).filter(|(_, u)| **u).map(|(t, _)| *t).collect();
        ms.set_unlocked(&unlocked);

        for (a, req_a) in items.iter().zip(&requirements) {
            for (b, req_b) in items.iter().zip(&requirements) {
                let subset = req_a.iter().zip(req_b).all(|(x, y)| !*x || *y);
                if subset {
                    prop_assert!(ms.milestone_order(*a) <= ms.milestone_order(*b));
                }
            }
        }
    }

    #[test]
    fn bumped_object_beats_equal_peer(amount in 1u32..100, cost in 0.0f32..10.0) {
        let mut b = CatalogBuilder::new();
        let x = b.register(ObjectDef::item("x").with_cost(cost));
        let y = b.register(ObjectDef::item("y").with_cost(cost));
        let catalog = b.build().unwrap();
        let ms = Milestones::all_unlocked(&catalog);
        let prefs = Preferences::new();
        let mut session = SelectionSession::new();
        session.add_to_favorite(x, amount);

        let base = ObjectComparer::default_ordering(&ms);
        prop_assert_eq!(base.compare_objects(catalog.object(x), catalog.object(y)), Ordering::Equal);
        let cmp = FavoritesComparer::new(&base, &prefs, &session);
        prop_assert_eq!(cmp.compare_objects(catalog.object(x), catalog.object(y)), Ordering::Less);
    }

    #[test]
    fn select_single_picks_only_a_unique_favorite(
        n in 2usize..8,
        favorite_mask in proptest::collection::vec(any::<bool>(), 8),
    ) {
        let mut b = CatalogBuilder::new();
        let ids: Vec<ObjectId> = (0..n).map(|i| b.register(ObjectDef::item(&format!("c{i}")))).collect();
        let catalog = b.build().unwrap();
        let ms = Milestones::all_unlocked(&catalog);
        let mut prefs = Preferences::new();
        let favorites: Vec<ObjectId> = ids.iter().zip(&favorite_mask).filter(|(_, f)| **f).map(|(id, _)| *id).collect();
        for id in &favorites {
            prefs.add_favorite(*id);
        }

        let ctx = OrderingContext::new(&catalog, &ms, &prefs);
        let selection = select_single(&ids, &ctx);
        match favorites.len() {
            1 => {
                prop_assert_eq!(selection.selected, Some(favorites[0]));
                prop_assert_eq!(selection.hint, SelectionHint::Favorite);
            }
            0 => {
                prop_assert_eq!(selection.selected, None);
                prop_assert_eq!(selection.hint, SelectionHint::MarkFavorite);
            }
            _ => {
                prop_assert_eq!(selection.selected, None);
                prop_assert_eq!(selection.hint, SelectionHint::MultipleFavorites);
            }
        }
    }
}
