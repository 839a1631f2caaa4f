//! In-memory host double for the reload flow.
//!
//! A tiny `hecs` world stands in for the host game's map: pawns, item
//! stacks, and pods are entities, and the host traits are implemented
//! over it. Reachability is a flat rule — a set of blocked cells that
//! cannot path to any pod — which is all the reload flow observes of the
//! real pathfinder.

use std::collections::{HashMap, HashSet};

use hecs::{Entity, World};

use podreload_core::host::{
    Cell, HostActions, ItemStackInfo, MessageSink, PawnInfo, PortNetwork, Reachability,
    WorldSnapshot,
};
use podreload_logic::stats::{KindRatesTable, PodContent, PodId, PodInfo};
use podreload_logic::transferables::{Category, KindId, ThingId};
use podreload_logic::validation::LoadRejection;

// ── Components ─────────────────────────────────────────────────────────

pub struct Position(pub Cell);
pub struct Kind(pub KindId);
pub struct Label(pub String);
pub struct ItemStack(pub u32);
pub struct PawnFlags {
    pub colonist: bool,
    pub downed: bool,
}
/// Pawn is inside this pod.
pub struct Aboard(pub PodId);
/// Pawn is mid-haul toward the group.
pub struct Hauling;
pub struct Pod {
    pub id: PodId,
    pub mass_capacity: f32,
    pub has_fueling_port: bool,
}

fn thing_id(entity: Entity) -> ThingId {
    entity.to_bits().get()
}

// ── The double ─────────────────────────────────────────────────────────

/// Recorded host mutation, for assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    DroppedPawn { pod: PodId, pawn: ThingId },
    RespawnedStuck { pod: PodId, pawn: ThingId },
    InterruptedHauler { pawn: ThingId },
    ClearedLoadList { pod: PodId },
    BeganLoading { group_id: u32, boarders: Vec<ThingId> },
}

#[derive(Default)]
pub struct SimWorld {
    pub world: World,
    pub rates: KindRatesTable,
    /// Cells the pathfinder cannot route to the pods.
    pub blocked: HashSet<Cell>,
    /// Pods nothing can path to (walled off).
    pub unreachable_pods: HashSet<PodId>,
    /// Pods whose fueling port sits outside the origin's network.
    pub disconnected_pods: HashSet<PodId>,
    /// Pods that refuse to release a pawn (exercises the anomaly path).
    pub stuck_pawns: HashSet<ThingId>,
    pub load_lists: HashMap<PodId, Vec<(KindId, u32)>>,
    pub effects: Vec<Effect>,
    next_group_id: u32,
}

impl SimWorld {
    pub fn new(rates: KindRatesTable) -> Self {
        Self { rates, ..Self::default() }
    }

    pub fn spawn_pod(&mut self, id: PodId, position: Cell, mass_capacity: f32) -> Entity {
        self.world.spawn((
            Pod { id, mass_capacity, has_fueling_port: true },
            Position(position),
            Label(format!("transport pod {id}")),
        ))
    }

    pub fn spawn_pawn(
        &mut self,
        kind: KindId,
        label: &str,
        position: Cell,
        colonist: bool,
    ) -> ThingId {
        let entity = self.world.spawn((
            Kind(kind),
            Label(label.to_string()),
            Position(position),
            PawnFlags { colonist, downed: false },
        ));
        thing_id(entity)
    }

    pub fn spawn_item(&mut self, kind: KindId, label: &str, position: Cell, count: u32) -> ThingId {
        let entity = self.world.spawn((
            Kind(kind),
            Label(label.to_string()),
            Position(position),
            ItemStack(count),
        ));
        thing_id(entity)
    }

    pub fn board_pawn(&mut self, pawn: ThingId, pod: PodId) {
        let entity = Entity::from_bits(pawn).expect("valid pawn id");
        self.world.insert_one(entity, Aboard(pod)).expect("pawn exists");
    }

    pub fn start_hauling(&mut self, pawn: ThingId) {
        let entity = Entity::from_bits(pawn).expect("valid pawn id");
        self.world.insert_one(entity, Hauling).expect("pawn exists");
    }

    pub fn pawn_aboard(&self, pawn: ThingId) -> Option<PodId> {
        let entity = Entity::from_bits(pawn)?;
        self.world.get::<&Aboard>(entity).ok().map(|a| a.0)
    }

    /// Assemble the plain-data picture the reload command hands to the
    /// session, the way the host adapter would.
    pub fn snapshot(&self) -> WorldSnapshot {
        let mut pawns = Vec::new();
        for (entity, (kind, label, position, flags)) in self
            .world
            .query::<(&Kind, &Label, &Position, &PawnFlags)>()
            .iter()
        {
            let aboard = self.world.get::<&Aboard>(entity).ok().map(|a| a.0);
            let hauling = self.world.get::<&Hauling>(entity).is_ok();
            pawns.push(PawnInfo {
                id: thing_id(entity),
                kind: kind.0,
                label: label.0.clone(),
                position: position.0,
                is_colonist: flags.colonist,
                downed: flags.downed,
                aboard_pod: aboard,
                hauling_to_group: hauling,
            });
        }
        pawns.sort_by_key(|p| p.id);

        let mut items = Vec::new();
        for (entity, (kind, label, position, stack)) in self
            .world
            .query::<(&Kind, &Label, &Position, &ItemStack)>()
            .iter()
        {
            items.push(ItemStackInfo {
                id: thing_id(entity),
                kind: kind.0,
                label: label.0.clone(),
                position: position.0,
                count: stack.0,
            });
        }
        items.sort_by_key(|i| i.id);

        let mut pods = Vec::new();
        for (entity, (pod, position, label)) in
            self.world.query::<(&Pod, &Position, &Label)>().iter()
        {
            let mut contents = Vec::new();
            for (pawn_entity, (kind, pawn_label, aboard)) in
                self.world.query::<(&Kind, &Label, &Aboard)>().iter()
            {
                if aboard.0 == pod.id {
                    contents.push(PodContent {
                        thing: thing_id(pawn_entity),
                        kind: kind.0,
                        label: pawn_label.0.clone(),
                        count: 1,
                        category: Category::Pawn,
                    });
                }
            }
            contents.sort_by_key(|c| c.thing);
            pods.push(PodInfo {
                id: pod.id,
                label: label.0.clone(),
                position: (position.0.x, position.0.z),
                mass_capacity: pod.mass_capacity,
                has_fueling_port: pod.has_fueling_port,
                contents,
                pending_load: Vec::new(),
            });
        }
        pods.sort_by_key(|p| p.id);

        WorldSnapshot { pawns, items, pods, rates: self.rates.clone() }
    }
}

impl Reachability for SimWorld {
    fn can_reach_pod(&self, from: Cell, pod: PodId) -> bool {
        !self.blocked.contains(&from) && !self.unreachable_pods.contains(&pod)
    }
}

impl PortNetwork for SimWorld {
    fn connected_pods(&self, _origin: PodId) -> HashSet<PodId> {
        self.world
            .query::<&Pod>()
            .iter()
            .filter(|(_, p)| p.has_fueling_port && !self.disconnected_pods.contains(&p.id))
            .map(|(_, p)| p.id)
            .collect()
    }
}

impl HostActions for SimWorld {
    fn next_group_id(&mut self) -> u32 {
        self.next_group_id += 1;
        self.next_group_id
    }

    fn drop_pawn_from_pod(&mut self, pod: PodId, pawn: ThingId) -> bool {
        if self.stuck_pawns.contains(&pawn) {
            return false;
        }
        if let Some(entity) = Entity::from_bits(pawn) {
            let _ = self.world.remove_one::<Aboard>(entity);
        }
        self.effects.push(Effect::DroppedPawn { pod, pawn });
        true
    }

    fn respawn_stuck_pawn(&mut self, pod: PodId, pawn: ThingId) {
        if let Some(entity) = Entity::from_bits(pawn) {
            let _ = self.world.remove_one::<Aboard>(entity);
        }
        self.effects.push(Effect::RespawnedStuck { pod, pawn });
    }

    fn interrupt_hauler(&mut self, pawn: ThingId) {
        if let Some(entity) = Entity::from_bits(pawn) {
            let _ = self.world.remove_one::<Hauling>(entity);
        }
        self.effects.push(Effect::InterruptedHauler { pawn });
    }

    fn clear_load_list(&mut self, pod: PodId) {
        self.load_lists.remove(&pod);
        self.effects.push(Effect::ClearedLoadList { pod });
    }

    fn set_load_list(&mut self, pod: PodId, kind: KindId, count: u32) {
        self.load_lists.entry(pod).or_default().push((kind, count));
    }

    fn begin_loading(&mut self, group_id: u32, boarders: &[ThingId]) {
        self.effects.push(Effect::BeganLoading { group_id, boarders: boarders.to_vec() });
    }
}

/// Collects user-facing messages instead of rendering them.
#[derive(Default)]
pub struct SimMessages {
    pub rejections: Vec<String>,
    pub infos: Vec<String>,
}

impl MessageSink for SimMessages {
    fn reject(&mut self, rejection: &LoadRejection) {
        self.rejections.push(rejection.to_string());
    }

    fn info(&mut self, message: &str) {
        self.infos.push(message.to_string());
    }
}
