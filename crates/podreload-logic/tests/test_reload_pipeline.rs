//! Integration tests for the full reload pipeline.
//!
//! Exercises: TransferableSet → LoadoutStats → check_loadout → distribute
//! on one shared scenario, the way the session layer drives it.
//!
//! All tests are pure logic — no host engine, no rendering.

use std::collections::HashSet;

use podreload_logic::distribute::{distribute, Assignment};
use podreload_logic::stats::{KindRates, KindRatesTable, LoadoutStats, PodInfo};
use podreload_logic::transferables::{Category, Stack, ThingId, TransferableSet};
use podreload_logic::validation::{check_loadout, LoadRejection};

// ── Kinds ──────────────────────────────────────────────────────────────

const COLONIST: u32 = 1;
const MEAL: u32 = 2;
const STEEL: u32 = 3;
const MEDICINE: u32 = 4;

fn rates() -> KindRatesTable {
    let mut rates = KindRatesTable::new();
    rates.insert(
        COLONIST,
        KindRates {
            mass: 60.0,
            hunger_per_day: 1.6,
            carry_capacity: 35.0,
            visibility: 1.0,
            ..KindRates::default()
        },
    );
    rates.insert(
        MEAL,
        KindRates { mass: 0.5, nutrition: 0.9, ..KindRates::default() },
    );
    rates.insert(STEEL, KindRates { mass: 0.5, ..KindRates::default() });
    rates.insert(MEDICINE, KindRates { mass: 0.2, ..KindRates::default() });
    rates
}

fn pod(id: u64, mass_capacity: f32) -> PodInfo {
    PodInfo {
        id,
        label: format!("transport pod {id}"),
        position: (10 + id as i32, 10),
        mass_capacity,
        has_fueling_port: true,
        contents: Vec::new(),
        pending_load: Vec::new(),
    }
}

/// Two colonists, a meal pile, two steel stacks, one medicine stack.
fn build_selection() -> TransferableSet {
    let mut set = TransferableSet::new();
    set.add_stack(COLONIST, "Colonist", Category::Pawn, Stack { thing: 100, count: 1 });
    set.add_stack(COLONIST, "Colonist", Category::Pawn, Stack { thing: 101, count: 1 });
    set.add_stack(MEAL, "Packaged meal", Category::Item, Stack { thing: 200, count: 30 });
    set.add_stack(STEEL, "Steel", Category::Item, Stack { thing: 201, count: 75 });
    set.add_stack(STEEL, "Steel", Category::Item, Stack { thing: 202, count: 75 });
    set.add_stack(MEDICINE, "Medicine", Category::Item, Stack { thing: 203, count: 10 });
    set
}

fn everything_reachable() -> HashSet<ThingId> {
    [100, 101, 200, 201, 202, 203].into_iter().collect()
}

// ── Pipeline coherence ─────────────────────────────────────────────────

#[test]
fn full_pipeline_accepts_and_distributes() {
    let mut set = build_selection();
    set.adjust(COLONIST, 2);
    set.adjust(MEAL, 20);
    set.adjust(STEEL, 100);
    set.adjust(MEDICINE, 5);

    let pods = vec![pod(1, 300.0), pod(2, 300.0), pod(3, 300.0)];
    let stats = LoadoutStats::compute(&set, &pods, &rates());
    assert!(!stats.over_capacity(), "300 kg x3 fits this selection");

    let reachable = everything_reachable();
    assert_eq!(check_loadout(&set, &stats, &reachable, &reachable), Ok(()));

    let assignments = distribute(set.entries(), pods.len());
    for t in set.iter() {
        let total: u32 = assignments
            .iter()
            .filter(|a| a.kind == t.kind)
            .map(|a| a.count)
            .sum();
        assert_eq!(total, t.count_to_transfer, "kind {} conserved", t.kind);
    }
    // Steel is the largest request and the three smaller ones fill all
    // three pods, so steel rides whole on pod 3 % 3 = 0.
    assert!(assignments.contains(&Assignment { kind: STEEL, count: 100, pod: 0 }));
}

#[test]
fn anchor_spreads_when_pods_outnumber_requests() {
    let mut set = build_selection();
    set.adjust(STEEL, 100);
    set.adjust(MEAL, 20);

    let assignments = distribute(set.entries(), 4);
    // Meal takes pod 0, steel splits 33/33/34 over pods 1-3.
    let steel: Vec<&Assignment> = assignments.iter().filter(|a| a.kind == STEEL).collect();
    assert_eq!(steel.len(), 3);
    assert_eq!(steel.iter().map(|a| a.count).sum::<u32>(), 100);
    assert_eq!(steel.last().unwrap().count, 34, "remainder lands on the last pod");
}

#[test]
fn selection_capped_by_available_stock() {
    let mut set = build_selection();
    set.adjust(MEDICINE, 500);
    assert_eq!(
        set.get(MEDICINE).unwrap().count_to_transfer,
        10,
        "cannot select more than the map holds"
    );
}

// ── Validation within the pipeline ─────────────────────────────────────

#[test]
fn rejects_before_distributing_when_too_heavy() {
    let mut set = build_selection();
    set.select_everything();

    let pods = vec![pod(1, 50.0)];
    let stats = LoadoutStats::compute(&set, &pods, &rates());
    let reachable = everything_reachable();
    assert!(matches!(
        check_loadout(&set, &stats, &reachable, &reachable),
        Err(LoadRejection::OverMassCapacity { .. })
    ));
}

#[test]
fn rejects_when_reachable_stock_cannot_cover_request() {
    let mut set = build_selection();
    set.adjust(STEEL, 120);

    let pods = vec![pod(1, 300.0)];
    let stats = LoadoutStats::compute(&set, &pods, &rates());
    // Stack 202 sits behind a collapsed corridor.
    let mut stacks = everything_reachable();
    stacks.remove(&202);
    assert_eq!(
        check_loadout(&set, &stats, &everything_reachable(), &stacks),
        Err(LoadRejection::ItemUnreachable { label: "Steel".into(), requested: 120 })
    );

    // Dropping the request under the reachable stack passes again.
    set.adjust(STEEL, 60);
    let stats = LoadoutStats::compute(&set, &pods, &rates());
    assert_eq!(
        check_loadout(&set, &stats, &everything_reachable(), &stacks),
        Ok(())
    );
}

#[test]
fn caravan_immobile_is_not_a_rejection() {
    let mut set = build_selection();
    set.adjust(COLONIST, 1);
    set.adjust(STEEL, 150);

    let pods = vec![pod(1, 300.0)];
    let stats = LoadoutStats::compute(&set, &pods, &rates());
    // 75 kg of steel against one colonist's 35 kg of carry capacity.
    assert!(stats.caravan_immobile());
    let reachable = everything_reachable();
    assert_eq!(
        check_loadout(&set, &stats, &reachable, &reachable),
        Ok(()),
        "immobile caravans load fine; the session asks for confirmation instead"
    );
}

// ── Worked distribution scenarios ──────────────────────────────────────

fn bare(kind: u32, count: u32) -> podreload_logic::transferables::Transferable {
    podreload_logic::transferables::Transferable {
        kind,
        label: format!("kind-{kind}"),
        category: Category::Item,
        stacks: vec![Stack { thing: kind as u64, count: count.max(1) }],
        count_to_transfer: count,
    }
}

#[test]
fn scenario_three_pods_split() {
    // A=10, B=3, C=0 over three pods: B fills pod 0, A splits 5/5.
    let assignments = distribute(&[bare(1, 10), bare(2, 3), bare(3, 0)], 3);
    assert_eq!(
        assignments,
        vec![
            Assignment { kind: 2, count: 3, pod: 0 },
            Assignment { kind: 1, count: 5, pod: 1 },
            Assignment { kind: 1, count: 5, pod: 2 },
        ]
    );
}

#[test]
fn scenario_single_pod_collapse() {
    // A=10, B=3 over one pod: both land on pod 0, A unsplit.
    let assignments = distribute(&[bare(1, 10), bare(2, 3)], 1);
    assert_eq!(
        assignments,
        vec![
            Assignment { kind: 2, count: 3, pod: 0 },
            Assignment { kind: 1, count: 10, pod: 0 },
        ]
    );
}

#[test]
fn scenario_lone_request_spreads() {
    // A=7 over three pods: 2/2/3.
    let assignments = distribute(&[bare(1, 7)], 3);
    assert_eq!(
        assignments,
        vec![
            Assignment { kind: 1, count: 2, pod: 0 },
            Assignment { kind: 1, count: 2, pod: 1 },
            Assignment { kind: 1, count: 3, pod: 2 },
        ]
    );
}
