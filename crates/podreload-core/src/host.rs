//! Traits and snapshots at the host boundary.
//!
//! The host game owns pathfinding, the fueling-port network, inventories,
//! jobs, and message rendering. This module narrows all of that to the
//! calls the reload flow actually makes, plus the plain-data picture of
//! the map the host assembles when the reload command fires.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use podreload_logic::stats::{KindRatesTable, PodId, PodInfo};
use podreload_logic::transferables::{KindId, ThingId};
use podreload_logic::validation::LoadRejection;

/// A map cell in host coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub z: i32,
}

/// A pawn the player could send, as seen when the dialog opened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PawnInfo {
    pub id: ThingId,
    pub kind: KindId,
    pub label: String,
    pub position: Cell,
    pub is_colonist: bool,
    pub downed: bool,
    /// Set when the pawn is currently inside one of the group's pods.
    pub aboard_pod: Option<PodId>,
    /// Set when the pawn is mid-haul toward one of the group's pods.
    pub hauling_to_group: bool,
}

/// An item stack the player could load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemStackInfo {
    pub id: ThingId,
    pub kind: KindId,
    pub label: String,
    pub position: Cell,
    pub count: u32,
}

/// Everything the reload flow needs to know about the map, gathered by
/// the host in one pass when the command fires.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Sendable pawns, including those already aboard the group's pods.
    pub pawns: Vec<PawnInfo>,
    /// Colony item stacks available for loading.
    pub items: Vec<ItemStackInfo>,
    /// The pod group being reloaded, in group order.
    pub pods: Vec<PodInfo>,
    /// Host-computed per-kind rates (mass, nutrition, visibility).
    pub rates: KindRatesTable,
}

impl WorldSnapshot {
    /// Position of the lead pod — the reachability target for everything
    /// that needs to walk or be hauled to the group.
    pub fn lead_pod(&self) -> Option<&PodInfo> {
        self.pods.first()
    }
}

/// Host pathfinding, reduced to the one query the reload flow makes:
/// touch-reachability from a cell to a pod, doors passable.
pub trait Reachability {
    fn can_reach_pod(&self, from: Cell, pod: PodId) -> bool;
}

/// The host's flood-fill over adjacent fueling-port givers. Pods on the
/// same port network launch as one group.
pub trait PortNetwork {
    fn connected_pods(&self, origin: PodId) -> HashSet<PodId>;
}

/// User-facing messages stay host-rendered.
pub trait MessageSink {
    fn reject(&mut self, rejection: &LoadRejection);
    fn info(&mut self, message: &str);
}

/// Mutations the commit pipeline asks of the host.
pub trait HostActions {
    /// Fresh id for the reformed loading group.
    fn next_group_id(&mut self) -> u32;

    /// Eject a pawn from a pod onto the map. Returns false when the host
    /// failed to place it (the anomaly path — see [`respawn_stuck_pawn`]).
    ///
    /// [`respawn_stuck_pawn`]: HostActions::respawn_stuck_pawn
    fn drop_pawn_from_pod(&mut self, pod: PodId, pawn: ThingId) -> bool;

    /// Forcibly spawn a pawn the drop left stuck inside a pod.
    fn respawn_stuck_pawn(&mut self, pod: PodId, pawn: ThingId);

    /// Cancel an in-progress haul toward the group.
    fn interrupt_hauler(&mut self, pawn: ThingId);

    /// Forget everything a pod was previously told to load.
    fn clear_load_list(&mut self, pod: PodId);

    /// Tell a pod to load `count` of `kind`.
    fn set_load_list(&mut self, pod: PodId, kind: KindId, count: u32);

    /// Stamp the group id and start the host's loading process, with the
    /// given pawns assigned to board.
    fn begin_loading(&mut self, group_id: u32, boarders: &[ThingId]);
}
