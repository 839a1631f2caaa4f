//! Loadout acceptance checks and rejection reasons.
//!
//! Checks run in a fixed order and stop at the first failure, mirroring
//! how the host surfaces one rejection message at a time. Reachability is
//! host pathfinding; it arrives here as precomputed sets of reachable
//! thing ids against the lead pod.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::stats::LoadoutStats;
use crate::transferables::{ThingId, TransferableSet};

/// Why a reload operation cannot proceed. Carries the user-facing message
/// via `Display`; the host decides how to render it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LoadRejection {
    /// No transferable has a nonzero selected count.
    NothingSelected,
    /// The selection is heavier than the pods can lift.
    OverMassCapacity { usage: f32, capacity: f32 },
    /// A selected pawn cannot path to the lead pod.
    PawnUnreachable { label: String },
    /// Reachable stacks of this kind cannot cover the selected count.
    ItemUnreachable { label: String, requested: u32 },
    /// A pod in the group cannot be reached from the origin pod.
    PodUnreachable { label: String },
    /// A pod's fueling port is outside the origin's port network.
    PodsNotConnected { label: String },
}

impl fmt::Display for LoadRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadRejection::NothingSelected => {
                write!(f, "Cannot send empty transport pods.")
            }
            LoadRejection::OverMassCapacity { usage, capacity } => {
                write!(
                    f,
                    "Too much mass: {usage:.1} kg selected, pods can lift {capacity:.1} kg."
                )
            }
            LoadRejection::PawnUnreachable { label } => {
                write!(f, "{label} can't reach the transporters.")
            }
            LoadRejection::ItemUnreachable { label, requested } => {
                if *requested == 1 {
                    write!(f, "{label} is unreachable.")
                } else {
                    write!(f, "{requested}x {label} are unreachable.")
                }
            }
            LoadRejection::PodUnreachable { label } => {
                write!(f, "Transporter {label} is unreachable.")
            }
            LoadRejection::PodsNotConnected { label } => {
                write!(f, "Transporter {label} is not connected to the group.")
            }
        }
    }
}

/// Validate the current selection against the pod group.
///
/// `reachable_pawns` and `reachable_stacks` hold the thing ids the host's
/// pathfinder can route to the lead pod.
pub fn check_loadout(
    transferables: &TransferableSet,
    stats: &LoadoutStats,
    reachable_pawns: &HashSet<ThingId>,
    reachable_stacks: &HashSet<ThingId>,
) -> Result<(), LoadRejection> {
    if !transferables.any_selected() {
        return Err(LoadRejection::NothingSelected);
    }

    if stats.over_capacity() {
        return Err(LoadRejection::OverMassCapacity {
            usage: stats.mass_usage,
            capacity: stats.mass_capacity,
        });
    }

    for t in transferables.pawns() {
        if t.count_to_transfer == 0 {
            continue;
        }
        // Each pawn stack is one pawn; every selected pawn must reach.
        for stack in t.stacks.iter().take(t.count_to_transfer as usize) {
            if !reachable_pawns.contains(&stack.thing) {
                return Err(LoadRejection::PawnUnreachable {
                    label: t.label.clone(),
                });
            }
        }
    }

    for t in transferables.items() {
        let requested = t.count_to_transfer;
        if requested == 0 {
            continue;
        }
        // Walk stacks in discovery order until the reachable ones cover
        // the request.
        let mut covered = 0;
        for stack in &t.stacks {
            if reachable_stacks.contains(&stack.thing) {
                covered += stack.count;
                if covered >= requested {
                    break;
                }
            }
        }
        if covered < requested {
            return Err(LoadRejection::ItemUnreachable {
                label: t.label.clone(),
                requested,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{KindRates, KindRatesTable, LoadoutStats, PodInfo};
    use crate::transferables::{Category, Stack, TransferableSet};

    fn rates() -> KindRatesTable {
        let mut rates = KindRatesTable::new();
        rates.insert(
            1,
            KindRates {
                mass: 60.0,
                hunger_per_day: 1.6,
                carry_capacity: 35.0,
                visibility: 1.0,
                ..KindRates::default()
            },
        );
        rates.insert(2, KindRates { mass: 1.0, ..KindRates::default() });
        rates
    }

    fn pods(capacity: f32) -> Vec<PodInfo> {
        vec![PodInfo {
            id: 1,
            label: "pod 1".into(),
            position: (0, 0),
            mass_capacity: capacity,
            has_fueling_port: true,
            contents: Vec::new(),
            pending_load: Vec::new(),
        }]
    }

    fn selection() -> TransferableSet {
        let mut set = TransferableSet::new();
        set.add_stack_selected(1, "Colonist", Category::Pawn, Stack { thing: 10, count: 1 });
        set.add_stack(2, "Steel", Category::Item, Stack { thing: 20, count: 30 });
        set.add_stack(2, "Steel", Category::Item, Stack { thing: 21, count: 30 });
        set.adjust(2, 45);
        set
    }

    fn all_reachable() -> HashSet<ThingId> {
        [10, 20, 21].into_iter().collect()
    }

    #[test]
    fn valid_selection_passes() {
        let set = selection();
        let stats = LoadoutStats::compute(&set, &pods(500.0), &rates());
        let reachable = all_reachable();
        assert_eq!(check_loadout(&set, &stats, &reachable, &reachable), Ok(()));
    }

    #[test]
    fn empty_selection_is_rejected() {
        let mut set = selection();
        set.adjust(1, 0);
        set.adjust(2, 0);
        let stats = LoadoutStats::compute(&set, &pods(500.0), &rates());
        let reachable = all_reachable();
        assert_eq!(
            check_loadout(&set, &stats, &reachable, &reachable),
            Err(LoadRejection::NothingSelected)
        );
    }

    #[test]
    fn over_capacity_is_rejected_before_reachability() {
        let set = selection();
        let stats = LoadoutStats::compute(&set, &pods(50.0), &rates());
        // Nothing is reachable, but mass fails first.
        let empty = HashSet::new();
        match check_loadout(&set, &stats, &empty, &empty) {
            Err(LoadRejection::OverMassCapacity { usage, capacity }) => {
                assert!(usage > capacity);
            }
            other => panic!("expected mass rejection, got {other:?}"),
        }
    }

    #[test]
    fn unreachable_pawn_is_rejected() {
        let set = selection();
        let stats = LoadoutStats::compute(&set, &pods(500.0), &rates());
        let no_pawns = HashSet::new();
        let result = check_loadout(&set, &stats, &no_pawns, &all_reachable());
        assert_eq!(
            result,
            Err(LoadRejection::PawnUnreachable { label: "Colonist".into() })
        );
    }

    #[test]
    fn short_reachable_stock_is_rejected() {
        let set = selection();
        let stats = LoadoutStats::compute(&set, &pods(500.0), &rates());
        // Only one 30-stack reachable; 45 requested.
        let stacks: HashSet<ThingId> = [20].into_iter().collect();
        let result = check_loadout(&set, &stats, &all_reachable(), &stacks);
        assert_eq!(
            result,
            Err(LoadRejection::ItemUnreachable { label: "Steel".into(), requested: 45 })
        );
    }

    #[test]
    fn partial_stacks_can_cover_the_request() {
        let mut set = selection();
        set.adjust(2, 30);
        let stats = LoadoutStats::compute(&set, &pods(500.0), &rates());
        let stacks: HashSet<ThingId> = [21].into_iter().collect();
        assert_eq!(
            check_loadout(&set, &stats, &all_reachable(), &stacks),
            Ok(())
        );
    }

    #[test]
    fn rejection_messages_pluralize() {
        let single = LoadRejection::ItemUnreachable { label: "Bandage".into(), requested: 1 };
        let multi = LoadRejection::ItemUnreachable { label: "Bandage".into(), requested: 4 };
        assert_eq!(single.to_string(), "Bandage is unreachable.");
        assert_eq!(multi.to_string(), "4x Bandage are unreachable.");
    }
}
