//! PodReload Headless Harness
//!
//! Drives the reload flow end-to-end against an in-memory host double.
//! Runs entirely in-process — no game engine, no rendering.
//!
//! Usage:
//!   cargo run -p podreload-simtest
//!   cargo run -p podreload-simtest -- --verbose

mod simhost;

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

use podreload_core::command::open_reload_dialog;
use podreload_core::gizmo::{
    GizmoAction, GizmoEntry, GizmoRegistry, PodGizmoContext, ReloadGizmoProvider,
    CANCEL_LOAD_ICON,
};
use podreload_core::host::Cell;
use podreload_core::session::AcceptOutcome;
use podreload_logic::cache::{Memo, SelectionVersion};
use podreload_logic::distribute::{distribute, Assignment};
use podreload_logic::stats::{KindRates, KindRatesTable};
use podreload_logic::transferables::{Category, Stack, Transferable};

use simhost::{Effect, SimMessages, SimWorld};

// ── Distribution fixtures (worked scenarios, checked verbatim) ──────────
const SCENARIOS_JSON: &str = include_str!("../../../data/distribution_scenarios.json");

#[derive(Debug, Deserialize)]
struct FixtureEntry {
    kind: u32,
    count: u32,
}

#[derive(Debug, Deserialize)]
struct Scenario {
    name: String,
    transferables: Vec<FixtureEntry>,
    pods: usize,
    expected: Vec<Assignment>,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(results: &mut Vec<TestResult>, name: &str, passed: bool, detail: String) {
    results.push(TestResult { name: name.to_string(), passed, detail });
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    init_logger(verbose);
    println!("=== PodReload Reload-Flow Harness ===\n");

    let mut results = Vec::new();

    // 1. Distribution fixture scenarios
    results.extend(validate_distribution_fixtures());

    // 2. Distribution property sweep
    results.extend(validate_distribution_properties());

    // 3. Rejection paths
    results.extend(validate_rejections());

    // 4. End-to-end reload flow
    results.extend(validate_reload_flow());

    // 5. Gizmo registry assembly
    results.extend(validate_gizmo_registry());

    // 6. Stat memoization
    results.extend(validate_stat_cache());

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!("\n=== RESULT: {}/{} passed, {} failed ===", passed, total, failed);

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── Shared kinds ────────────────────────────────────────────────────────
//
// Pawns get one kind id each: a pawn's resource identity is the pawn,
// so two colonists never merge into one transferable.

const MEAL: u32 = 2;
const STEEL: u32 = 3;
const ALICE: u32 = 11;
const BOB: u32 = 12;
const CAROL: u32 = 13;

fn harness_rates() -> KindRatesTable {
    let mut rates = KindRatesTable::new();
    let pawn = KindRates {
        mass: 60.0,
        hunger_per_day: 1.6,
        carry_capacity: 35.0,
        visibility: 1.0,
        ..KindRates::default()
    };
    for kind in [ALICE, BOB, CAROL] {
        rates.insert(kind, pawn);
    }
    rates.insert(MEAL, KindRates { mass: 0.5, nutrition: 0.9, ..KindRates::default() });
    rates.insert(STEEL, KindRates { mass: 0.5, ..KindRates::default() });
    rates
}

/// Two pods, three colonists (Bob aboard pod 1, Carol hauling), steel and
/// meals on the ground.
fn standard_world() -> (SimWorld, u64, u64, u64, u64, u64) {
    let mut sim = SimWorld::new(harness_rates());
    sim.spawn_pod(1, Cell { x: 10, z: 10 }, 150.0);
    sim.spawn_pod(2, Cell { x: 12, z: 10 }, 150.0);
    let alice = sim.spawn_pawn(ALICE, "Alice", Cell { x: 1, z: 1 }, true);
    let bob = sim.spawn_pawn(BOB, "Bob", Cell { x: 10, z: 10 }, true);
    let carol = sim.spawn_pawn(CAROL, "Carol", Cell { x: 5, z: 5 }, true);
    sim.board_pawn(bob, 1);
    sim.start_hauling(carol);
    let steel = sim.spawn_item(STEEL, "Steel", Cell { x: 2, z: 2 }, 80);
    let meal = sim.spawn_item(MEAL, "Packaged meal", Cell { x: 3, z: 3 }, 30);
    (sim, alice, bob, carol, steel, meal)
}

// ── 1. Distribution fixtures ────────────────────────────────────────────

fn validate_distribution_fixtures() -> Vec<TestResult> {
    let mut results = Vec::new();
    let scenarios: Vec<Scenario> =
        serde_json::from_str(SCENARIOS_JSON).expect("fixture JSON parses");

    for scenario in &scenarios {
        let transferables: Vec<Transferable> = scenario
            .transferables
            .iter()
            .map(|e| Transferable {
                kind: e.kind,
                label: format!("kind-{}", e.kind),
                category: Category::Item,
                stacks: vec![Stack { thing: e.kind as u64, count: e.count.max(1) }],
                count_to_transfer: e.count,
            })
            .collect();
        let got = distribute(&transferables, scenario.pods);
        let passed = got == scenario.expected;
        let detail = if passed {
            format!("{} records", got.len())
        } else {
            format!("expected {:?}, got {:?}", scenario.expected, got)
        };
        check(&mut results, &format!("fixture: {}", scenario.name), passed, detail);
    }
    results
}

// ── 2. Distribution properties ──────────────────────────────────────────

fn validate_distribution_properties() -> Vec<TestResult> {
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(0x90D);

    let mut conserved = true;
    let mut positive = true;
    let mut in_bounds = true;
    let mut idempotent = true;
    let cases = 250;

    for _ in 0..cases {
        let kinds = rng.gen_range(1..=12u32);
        let pods = rng.gen_range(1..=8usize);
        let transferables: Vec<Transferable> = (0..kinds)
            .map(|k| {
                let count = rng.gen_range(0..=500u32);
                Transferable {
                    kind: k,
                    label: format!("kind-{k}"),
                    category: Category::Item,
                    stacks: vec![Stack { thing: k as u64, count: count.max(1) }],
                    count_to_transfer: count,
                }
            })
            .collect();

        let assignments = distribute(&transferables, pods);
        for t in &transferables {
            let total: u32 = assignments
                .iter()
                .filter(|a| a.kind == t.kind)
                .map(|a| a.count)
                .sum();
            conserved &= total == t.count_to_transfer;
        }
        positive &= assignments.iter().all(|a| a.count > 0);
        in_bounds &= assignments.iter().all(|a| a.pod < pods);
        idempotent &= assignments == distribute(&transferables, pods);
    }

    check(
        &mut results,
        "property: counts conserved",
        conserved,
        format!("{cases} random cases"),
    );
    check(&mut results, "property: no empty records", positive, format!("{cases} random cases"));
    check(&mut results, "property: pods in bounds", in_bounds, format!("{cases} random cases"));
    check(&mut results, "property: rerun identical", idempotent, format!("{cases} random cases"));
    results
}

// ── 3. Rejection paths ──────────────────────────────────────────────────

fn validate_rejections() -> Vec<TestResult> {
    let mut results = Vec::new();

    // Empty selection.
    {
        let (mut sim, _, bob, ..) = standard_world();
        let mut messages = SimMessages::default();
        let snapshot = sim.snapshot();
        let mut session =
            open_reload_dialog(1, snapshot, &sim, &sim, &mut messages).expect("group is sound");
        session.adjust_count(BOB, 0); // deselect the aboard pawn
        let reachability = SimReach::from(&sim);
        let outcome = session.try_accept(&reachability, &mut sim, &mut messages);
        let passed = matches!(outcome, AcceptOutcome::Rejected(_))
            && messages.rejections.iter().any(|m| m.contains("empty"));
        check(
            &mut results,
            "reject: nothing selected",
            passed,
            format!("bob={bob} outcome={outcome:?}"),
        );
    }

    // Over capacity: one 10 kg pod against 200 kg of steel.
    {
        let mut small = SimWorld::new(harness_rates());
        small.spawn_pod(1, Cell { x: 10, z: 10 }, 10.0);
        let heavy = small.spawn_item(STEEL, "Steel", Cell { x: 2, z: 2 }, 400);
        let mut messages = SimMessages::default();
        let mut session = open_reload_dialog(1, small.snapshot(), &small, &small, &mut messages)
            .expect("group is sound");
        session.adjust_count(STEEL, 400);
        let reachability = SimReach::from(&small);
        let outcome = session.try_accept(&reachability, &mut small, &mut messages);
        let passed = matches!(outcome, AcceptOutcome::Rejected(_))
            && messages.rejections.iter().any(|m| m.contains("Too much mass"));
        check(
            &mut results,
            "reject: over mass capacity",
            passed,
            format!("heavy={heavy} rejections={:?}", messages.rejections),
        );
    }

    // Unreachable pawn.
    {
        let (mut sim, alice, ..) = standard_world();
        sim.blocked.insert(Cell { x: 1, z: 1 }); // Alice's cell
        let mut messages = SimMessages::default();
        let mut session =
            open_reload_dialog(1, sim.snapshot(), &sim, &sim, &mut messages).expect("group is sound");
        session.adjust_count(ALICE, 1);
        let reachability = SimReach::from(&sim);
        let outcome = session.try_accept(&reachability, &mut sim, &mut messages);
        let passed = matches!(outcome, AcceptOutcome::Rejected(_))
            && messages.rejections.iter().any(|m| m.contains("Alice"));
        check(
            &mut results,
            "reject: unreachable pawn",
            passed,
            format!("alice={alice} rejections={:?}", messages.rejections),
        );
    }

    // Unreachable item stock.
    {
        let (mut sim, _, _, _, steel, _) = standard_world();
        sim.blocked.insert(Cell { x: 2, z: 2 }); // the steel stack
        let mut messages = SimMessages::default();
        let mut session =
            open_reload_dialog(1, sim.snapshot(), &sim, &sim, &mut messages).expect("group is sound");
        session.adjust_count(STEEL, 50);
        let reachability = SimReach::from(&sim);
        let outcome = session.try_accept(&reachability, &mut sim, &mut messages);
        let passed = matches!(outcome, AcceptOutcome::Rejected(_))
            && messages.rejections.iter().any(|m| m.contains("Steel"));
        check(
            &mut results,
            "reject: unreachable item stock",
            passed,
            format!("steel={steel} rejections={:?}", messages.rejections),
        );
    }

    // Disconnected pod (command-level).
    {
        let (mut sim, ..) = standard_world();
        sim.disconnected_pods.insert(2);
        let mut messages = SimMessages::default();
        let result = open_reload_dialog(1, sim.snapshot(), &sim, &sim, &mut messages);
        let passed = result.is_err()
            && messages.rejections.iter().any(|m| m.contains("not connected"));
        check(
            &mut results,
            "reject: pod off the port network",
            passed,
            format!("rejections={:?}", messages.rejections),
        );
    }

    // Unreachable pod (command-level).
    {
        let (mut sim, ..) = standard_world();
        sim.unreachable_pods.insert(2);
        let mut messages = SimMessages::default();
        let result = open_reload_dialog(1, sim.snapshot(), &sim, &sim, &mut messages);
        let passed = result.is_err()
            && messages.rejections.iter().any(|m| m.contains("unreachable"));
        check(
            &mut results,
            "reject: pod walled off",
            passed,
            format!("rejections={:?}", messages.rejections),
        );
    }

    results
}

// ── 4. End-to-end reload flow ───────────────────────────────────────────

fn validate_reload_flow() -> Vec<TestResult> {
    let mut results = Vec::new();

    let (mut sim, alice, bob, carol, _, _) = standard_world();
    let mut messages = SimMessages::default();
    let mut session =
        open_reload_dialog(1, sim.snapshot(), &sim, &sim, &mut messages).expect("group is sound");

    // Bob is aboard pod 1, so he opens pre-selected.
    let preselected = session
        .transferables()
        .get(BOB)
        .map(|t| t.count_to_transfer)
        .unwrap_or(0);
    check(
        &mut results,
        "flow: aboard pawn opens selected",
        preselected == 1,
        format!("bob count={preselected}"),
    );

    session.adjust_count(ALICE, 1);
    session.adjust_count(STEEL, 80);
    session.adjust_count(MEAL, 30);

    let reachability = SimReach::from(&sim);
    let outcome = session.try_accept(&reachability, &mut sim, &mut messages);
    let committed = matches!(outcome, AcceptOutcome::Committed { .. });
    check(&mut results, "flow: accept commits", committed, format!("{outcome:?}"));

    // Bob got dumped before reloading.
    let dumped = sim
        .effects
        .iter()
        .any(|e| *e == Effect::DroppedPawn { pod: 1, pawn: bob });
    check(
        &mut results,
        "flow: aboard pawn dumped first",
        dumped && sim.pawn_aboard(bob).is_none(),
        format!("effects={}", sim.effects.len()),
    );

    // Carol's stale haul was interrupted.
    let interrupted = sim
        .effects
        .iter()
        .any(|e| *e == Effect::InterruptedHauler { pawn: carol });
    check(&mut results, "flow: stale hauler interrupted", interrupted, String::new());

    // Both pods got load lists and every selected count survived.
    let recorded: u32 = sim.load_lists.values().flatten().map(|(_, c)| c).sum();
    check(
        &mut results,
        "flow: load lists conserve selection",
        recorded == 1 + 1 + 80 + 30,
        format!("recorded={recorded} lists={:?}", sim.load_lists),
    );
    check(
        &mut results,
        "flow: every pod participates",
        sim.load_lists.len() == 2,
        format!("{} pods with lists", sim.load_lists.len()),
    );

    // Selected colonists board.
    let boarders = sim.effects.iter().find_map(|e| match e {
        Effect::BeganLoading { boarders, .. } => Some(boarders.clone()),
        _ => None,
    });
    let expected: Vec<u64> = vec![alice, bob];
    check(
        &mut results,
        "flow: selected colonists board",
        boarders.as_deref() == Some(&expected[..]),
        format!("boarders={boarders:?}"),
    );

    check(
        &mut results,
        "flow: loading message posted",
        messages.infos.iter().any(|m| m.contains("loading process started")),
        format!("infos={:?}", messages.infos),
    );

    // Stuck-pawn anomaly: the drop fails, the pipeline respawns manually.
    {
        let (mut sim, _, bob, ..) = standard_world();
        sim.stuck_pawns.insert(bob);
        let mut messages = SimMessages::default();
        let mut session = open_reload_dialog(1, sim.snapshot(), &sim, &sim, &mut messages)
            .expect("group is sound");
        let reachability = SimReach::from(&sim);
        let outcome = session.try_accept(&reachability, &mut sim, &mut messages);
        let respawned = sim
            .effects
            .iter()
            .any(|e| *e == Effect::RespawnedStuck { pod: 1, pawn: bob });
        check(
            &mut results,
            "flow: stuck pawn respawned manually",
            matches!(outcome, AcceptOutcome::Committed { .. }) && respawned,
            format!("{outcome:?}"),
        );
    }

    results
}

// ── 5. Gizmo registry ───────────────────────────────────────────────────

fn validate_gizmo_registry() -> Vec<TestResult> {
    let mut results = Vec::new();
    let mut registry = GizmoRegistry::new();
    registry.register(Box::new(ReloadGizmoProvider));

    let base = vec![GizmoEntry {
        label: "Cancel load".into(),
        description: String::new(),
        icon: CANCEL_LOAD_ICON,
        action: GizmoAction::Host(9),
    }];

    let loading = PodGizmoContext { pod: 4, group_size: 2, loading_in_progress: true };
    let row = registry.assemble(base.clone(), &loading);
    check(
        &mut results,
        "gizmo: reload entry added while loading",
        row.len() == 2
            && row[1].action == GizmoAction::ReloadTransporters { origin: 4 }
            && row[1].label.contains("(2)"),
        format!("row={:?}", row.iter().map(|g| g.label.clone()).collect::<Vec<_>>()),
    );

    let idle = PodGizmoContext { pod: 4, group_size: 2, loading_in_progress: false };
    let row = registry.assemble(base, &idle);
    check(
        &mut results,
        "gizmo: idle pod row untouched",
        row.len() == 1,
        format!("{} entries", row.len()),
    );

    results
}

// ── 6. Stat memoization ─────────────────────────────────────────────────

fn validate_stat_cache() -> Vec<TestResult> {
    let mut results = Vec::new();

    let mut version = SelectionVersion::default();
    let mut memo: Memo<u32> = Memo::new();
    let mut computations = 0;
    for _ in 0..5 {
        memo.get_or_compute(version, || {
            computations += 1;
            1
        });
    }
    check(
        &mut results,
        "cache: stable version computes once",
        computations == 1,
        format!("{computations} computations over 5 reads"),
    );

    version.bump();
    memo.get_or_compute(version, || {
        computations += 1;
        2
    });
    check(
        &mut results,
        "cache: bump recomputes",
        computations == 2,
        format!("{computations} computations"),
    );

    // Through the session: adjusting the selection moves the readout.
    let (sim, ..) = standard_world();
    let mut messages = SimMessages::default();
    let mut session =
        open_reload_dialog(1, sim.snapshot(), &sim, &sim, &mut messages).expect("group is sound");
    let before = session.stats().mass_usage;
    session.adjust_count(STEEL, 80);
    let after = session.stats().mass_usage;
    check(
        &mut results,
        "cache: session stats track the selection",
        (after - before - 40.0).abs() < 1e-3,
        format!("before={before} after={after}"),
    );

    results
}

// ── Reachability shim ───────────────────────────────────────────────────
//
// `try_accept` borrows the reachability oracle immutably and the host
// actions mutably; one SimWorld cannot be both at once, so the oracle's
// tiny state is copied out first.

struct SimReach {
    blocked: HashSet<Cell>,
    unreachable: HashSet<u64>,
}

impl From<&SimWorld> for SimReach {
    fn from(sim: &SimWorld) -> Self {
        Self { blocked: sim.blocked.clone(), unreachable: sim.unreachable_pods.clone() }
    }
}

impl podreload_core::host::Reachability for SimReach {
    fn can_reach_pod(&self, from: Cell, pod: u64) -> bool {
        !self.blocked.contains(&from) && !self.unreachable.contains(&pod)
    }
}

// ── Logging ─────────────────────────────────────────────────────────────

struct StdoutLogger {
    verbose: bool,
}

impl log::Log for StdoutLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.verbose || metadata.level() <= log::Level::Warn
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            println!("  [{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

fn init_logger(verbose: bool) {
    let logger = Box::leak(Box::new(StdoutLogger { verbose }));
    if log::set_logger(logger).is_ok() {
        log::set_max_level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        });
    }
}
