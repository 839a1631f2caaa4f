//! Loadout mass/food/visibility aggregation.
//!
//! The host game owns the per-item formulas (body mass, nutrition values,
//! caravan visibility weighting); they arrive here as flat per-kind rates.
//! This module owns what the reload dialog aggregates from them: pod
//! capacity totals, the mass already sitting in the pods, and the caravan
//! readouts for the current selection.

use std::collections::HashMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::transferables::{Category, KindId, ThingId, TransferableSet};

/// Identity of a transport pod.
pub type PodId = u64;

/// Host-supplied rates for one resource kind. All values are per item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KindRates {
    /// Mass in kilograms.
    pub mass: f32,
    /// Nutrition contributed when eaten (items) or carried need per day
    /// (pawns, via `hunger_per_day`).
    pub nutrition: f32,
    /// Daily nutrition requirement. Zero for items.
    pub hunger_per_day: f32,
    /// Caravan carrying capacity contributed. Zero for items.
    pub carry_capacity: f32,
    /// Caravan visibility weight.
    pub visibility: f32,
}

/// Per-kind rate table, keyed by resource kind.
pub type KindRatesTable = HashMap<KindId, KindRates>;

/// Something already inside a pod (or queued on its pending load list).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodContent {
    pub thing: ThingId,
    pub kind: KindId,
    pub label: String,
    pub count: u32,
    pub category: Category,
}

/// Snapshot of one transport pod in the group being reloaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodInfo {
    pub id: PodId,
    pub label: String,
    /// Map cell the pod occupies, as host coordinates.
    pub position: (i32, i32),
    /// Maximum mass this pod can lift, in kilograms.
    pub mass_capacity: f32,
    /// Whether this pod draws from a fueling port.
    pub has_fueling_port: bool,
    pub contents: Vec<PodContent>,
    /// Things queued to load before the reload started.
    pub pending_load: Vec<PodContent>,
}

/// Derived statistics for the current selection, shown in the dialog
/// header and consulted by validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadoutStats {
    /// Selected mass plus cargo already aboard, in kilograms.
    pub mass_usage: f32,
    /// Combined lift capacity of the pod group.
    pub mass_capacity: f32,
    /// Mass the landed caravan would haul (items only; pawns walk).
    pub caravan_mass_usage: f32,
    /// Carrying capacity of the selected pawns.
    pub caravan_mass_capacity: f32,
    pub caravan_capacity_explanation: String,
    /// How long the selected food feeds the selected pawns.
    pub days_worth_of_food: f32,
    pub visibility: f32,
    pub visibility_explanation: String,
}

impl LoadoutStats {
    pub fn compute(
        transferables: &TransferableSet,
        pods: &[PodInfo],
        rates: &KindRatesTable,
    ) -> Self {
        let contents_mass = contents_mass(pods, rates);
        let mass_capacity: f32 = pods.iter().map(|p| p.mass_capacity).sum();

        let mut selected_mass = 0.0;
        let mut item_mass = 0.0;
        let mut nutrition = 0.0;
        let mut hunger_per_day = 0.0;
        let mut carry_capacity = 0.0;
        let mut carry_explanation = String::new();
        let mut visibility = 0.0;
        let mut visibility_explanation = String::new();

        for t in transferables.iter() {
            if t.count_to_transfer == 0 {
                continue;
            }
            let count = t.count_to_transfer as f32;
            let r = rates.get(&t.kind).copied().unwrap_or_default();
            selected_mass += r.mass * count;
            nutrition += r.nutrition * count;
            match t.category {
                Category::Pawn => {
                    hunger_per_day += r.hunger_per_day * count;
                    if r.carry_capacity > 0.0 {
                        carry_capacity += r.carry_capacity * count;
                        let _ = writeln!(
                            carry_explanation,
                            "  {} x{}: +{:.0} kg",
                            t.label,
                            t.count_to_transfer,
                            r.carry_capacity * count
                        );
                    }
                }
                Category::Item => item_mass += r.mass * count,
            }
            if r.visibility > 0.0 {
                visibility += r.visibility * count;
                let _ = writeln!(
                    visibility_explanation,
                    "  {} x{}: +{:.1}",
                    t.label,
                    t.count_to_transfer,
                    r.visibility * count
                );
            }
        }

        let days_worth_of_food = if hunger_per_day > 0.0 {
            nutrition / hunger_per_day
        } else {
            f32::INFINITY
        };

        LoadoutStats {
            mass_usage: selected_mass + contents_mass,
            mass_capacity,
            caravan_mass_usage: item_mass + contents_mass,
            caravan_mass_capacity: carry_capacity,
            caravan_capacity_explanation: carry_explanation,
            days_worth_of_food,
            visibility,
            visibility_explanation,
        }
    }

    /// The pods cannot lift this selection.
    pub fn over_capacity(&self) -> bool {
        self.mass_usage > self.mass_capacity
    }

    /// The caravan formed on landing could not move its own cargo. Not a
    /// rejection — the player may confirm and send it anyway.
    pub fn caravan_immobile(&self) -> bool {
        self.caravan_mass_usage > self.caravan_mass_capacity && self.caravan_mass_capacity != 0.0
    }
}

/// Mass of non-pawn cargo already aboard the pod group. Pawns aboard are
/// dumped and re-boarded by the loading process, so they never count.
pub fn contents_mass(pods: &[PodInfo], rates: &KindRatesTable) -> f32 {
    let mut mass = 0.0;
    for pod in pods {
        for c in &pod.contents {
            if c.category == Category::Item {
                let rate = rates.get(&c.kind).map(|r| r.mass).unwrap_or_default();
                mass += rate * c.count as f32;
            }
        }
    }
    mass
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transferables::Stack;

    fn rates() -> KindRatesTable {
        let mut rates = KindRatesTable::new();
        // Colonist: 60 kg body, needs 1.6 nutrition/day, carries 35 kg.
        rates.insert(
            1,
            KindRates {
                mass: 60.0,
                nutrition: 0.0,
                hunger_per_day: 1.6,
                carry_capacity: 35.0,
                visibility: 1.0,
            },
        );
        // Packaged meal: 0.5 kg, 0.9 nutrition.
        rates.insert(
            2,
            KindRates {
                mass: 0.5,
                nutrition: 0.9,
                ..KindRates::default()
            },
        );
        rates
    }

    fn pod(id: PodId, mass_capacity: f32) -> PodInfo {
        PodInfo {
            id,
            label: format!("pod {id}"),
            position: (0, 0),
            mass_capacity,
            has_fueling_port: true,
            contents: Vec::new(),
            pending_load: Vec::new(),
        }
    }

    fn selection() -> TransferableSet {
        let mut set = TransferableSet::new();
        set.add_stack_selected(1, "Colonist", Category::Pawn, Stack { thing: 10, count: 1 });
        set.add_stack(2, "Packaged meal", Category::Item, Stack { thing: 20, count: 40 });
        set.adjust(2, 16);
        set
    }

    #[test]
    fn mass_usage_counts_pawns_and_items() {
        let stats = LoadoutStats::compute(&selection(), &[pod(1, 150.0)], &rates());
        assert!((stats.mass_usage - (60.0 + 16.0 * 0.5)).abs() < 1e-3);
        assert_eq!(stats.mass_capacity, 150.0);
        assert!(!stats.over_capacity());
    }

    #[test]
    fn caravan_usage_excludes_pawn_body_mass() {
        let stats = LoadoutStats::compute(&selection(), &[pod(1, 150.0)], &rates());
        assert!((stats.caravan_mass_usage - 8.0).abs() < 1e-3);
        assert_eq!(stats.caravan_mass_capacity, 35.0);
        assert!(!stats.caravan_immobile());
        assert!(stats.caravan_capacity_explanation.contains("Colonist"));
    }

    #[test]
    fn cargo_already_aboard_counts_toward_mass() {
        let mut p = pod(1, 150.0);
        p.contents.push(PodContent {
            thing: 30,
            kind: 2,
            label: "Packaged meal".into(),
            count: 10,
            category: Category::Item,
        });
        // A stowaway pawn aboard contributes nothing — it gets dumped.
        p.contents.push(PodContent {
            thing: 31,
            kind: 1,
            label: "Colonist".into(),
            count: 1,
            category: Category::Pawn,
        });
        let stats = LoadoutStats::compute(&selection(), &[p], &rates());
        assert!((stats.mass_usage - (60.0 + 8.0 + 5.0)).abs() < 1e-3);
        assert!((stats.caravan_mass_usage - 13.0).abs() < 1e-3);
    }

    #[test]
    fn days_of_food_divides_nutrition_by_hunger() {
        let stats = LoadoutStats::compute(&selection(), &[pod(1, 150.0)], &rates());
        assert!((stats.days_worth_of_food - (16.0 * 0.9) / 1.6).abs() < 1e-3);
    }

    #[test]
    fn days_of_food_infinite_without_pawns() {
        let mut set = TransferableSet::new();
        set.add_stack(2, "Packaged meal", Category::Item, Stack { thing: 20, count: 40 });
        set.adjust(2, 5);
        let stats = LoadoutStats::compute(&set, &[pod(1, 150.0)], &rates());
        assert!(stats.days_worth_of_food.is_infinite());
    }

    #[test]
    fn immobile_needs_nonzero_carry_capacity() {
        // Items selected, no pawns: capacity 0 means the check never fires.
        let mut set = TransferableSet::new();
        set.add_stack(2, "Packaged meal", Category::Item, Stack { thing: 20, count: 40 });
        set.select_everything();
        let stats = LoadoutStats::compute(&set, &[pod(1, 150.0)], &rates());
        assert!(!stats.caravan_immobile());
    }
}
