//! Dialog-equivalent selection state with memoized stats.
//!
//! A `ReloadSession` is the abstracted reload dialog: the pod group, the
//! transferable list the player adjusts, and the derived statistics shown
//! in the header. The host renders it however it likes; every mutation
//! goes through the session so the stat memos invalidate correctly.

use std::collections::HashSet;

use podreload_logic::cache::{Memo, SelectionVersion};
use podreload_logic::stats::LoadoutStats;
use podreload_logic::transferables::{Category, KindId, Stack, ThingId, TransferableSet};
use podreload_logic::validation::{check_loadout, LoadRejection};

use crate::commit;
use crate::host::{HostActions, MessageSink, Reachability, WorldSnapshot};

/// Result of asking the session to accept the current selection.
#[derive(Debug, Clone, PartialEq)]
pub enum AcceptOutcome {
    /// Validation failed; the rejection was surfaced to the player.
    Rejected(LoadRejection),
    /// The loadout is valid but the landed caravan could not move its own
    /// cargo. The host should ask the player and call
    /// [`ReloadSession::confirm_accept`] on yes.
    NeedsConfirmation,
    /// The commit pipeline ran; pods are loading.
    Committed { group_id: u32 },
}

/// Selection state for one reload of one pod group.
#[derive(Debug)]
pub struct ReloadSession {
    snapshot: WorldSnapshot,
    transferables: TransferableSet,
    version: SelectionVersion,
    stats: Memo<LoadoutStats>,
}

impl ReloadSession {
    /// Build the transferable list from the snapshot. Pawns already
    /// aboard a pod or queued on a pending load list start selected;
    /// everything else starts at zero.
    pub fn open(snapshot: WorldSnapshot) -> Self {
        let mut session = Self {
            snapshot,
            transferables: TransferableSet::new(),
            version: SelectionVersion::default(),
            stats: Memo::new(),
        };
        session.rebuild_transferables();
        session
    }

    fn rebuild_transferables(&mut self) {
        let mut transferables = TransferableSet::new();

        let pending: HashSet<ThingId> = self
            .snapshot
            .pods
            .iter()
            .flat_map(|p| p.pending_load.iter())
            .filter(|c| c.category == Category::Pawn)
            .map(|c| c.thing)
            .collect();

        for pawn in &self.snapshot.pawns {
            let stack = Stack { thing: pawn.id, count: 1 };
            if pawn.aboard_pod.is_some() || pending.contains(&pawn.id) {
                transferables.add_stack_selected(pawn.kind, &pawn.label, Category::Pawn, stack);
            } else {
                transferables.add_stack(pawn.kind, &pawn.label, Category::Pawn, stack);
            }
        }
        for item in &self.snapshot.items {
            let stack = Stack { thing: item.id, count: item.count };
            transferables.add_stack(item.kind, &item.label, Category::Item, stack);
        }

        self.transferables = transferables;
        self.version.bump();
    }

    pub fn snapshot(&self) -> &WorldSnapshot {
        &self.snapshot
    }

    pub fn transferables(&self) -> &TransferableSet {
        &self.transferables
    }

    /// Set the selected count for one kind. Returns false for an unknown
    /// kind; the selection is untouched and the memos stay valid.
    pub fn adjust_count(&mut self, kind: KindId, count: u32) -> bool {
        let changed = self.transferables.adjust(kind, count);
        if changed {
            self.version.bump();
        }
        changed
    }

    /// Select the full available quantity of everything.
    pub fn select_everything(&mut self) {
        self.transferables.select_everything();
        self.version.bump();
    }

    /// Throw the selection away and rebuild it from the snapshot.
    pub fn reset(&mut self) {
        self.rebuild_transferables();
    }

    /// Derived statistics for the current selection, recomputed only when
    /// the selection changed since the last read.
    pub fn stats(&mut self) -> &LoadoutStats {
        let Self { snapshot, transferables, version, stats } = self;
        stats.get_or_compute(*version, || {
            LoadoutStats::compute(transferables, &snapshot.pods, &snapshot.rates)
        })
    }

    /// Validate and, if the loadout is sound, run the commit pipeline.
    ///
    /// A caravan-immobile loadout is not committed here: the player gets
    /// one chance to back out, then [`confirm_accept`] commits it.
    ///
    /// [`confirm_accept`]: ReloadSession::confirm_accept
    pub fn try_accept<R, H, M>(
        &mut self,
        reachability: &R,
        host: &mut H,
        messages: &mut M,
    ) -> AcceptOutcome
    where
        R: Reachability,
        H: HostActions,
        M: MessageSink,
    {
        match self.validate(reachability, messages) {
            Err(rejection) => AcceptOutcome::Rejected(rejection),
            Ok(()) if self.stats().caravan_immobile() => AcceptOutcome::NeedsConfirmation,
            Ok(()) => self.commit(host, messages),
        }
    }

    /// Accept after the player confirmed an immobile-caravan loadout.
    /// Validation still runs — the selection may have changed since the
    /// confirmation was requested.
    pub fn confirm_accept<R, H, M>(
        &mut self,
        reachability: &R,
        host: &mut H,
        messages: &mut M,
    ) -> AcceptOutcome
    where
        R: Reachability,
        H: HostActions,
        M: MessageSink,
    {
        match self.validate(reachability, messages) {
            Err(rejection) => AcceptOutcome::Rejected(rejection),
            Ok(()) => self.commit(host, messages),
        }
    }

    fn validate<R, M>(&mut self, reachability: &R, messages: &mut M) -> Result<(), LoadRejection>
    where
        R: Reachability,
        M: MessageSink,
    {
        let stats = self.stats().clone();
        let (reachable_pawns, reachable_stacks) = self.reachable_things(reachability);
        let result = check_loadout(
            &self.transferables,
            &stats,
            &reachable_pawns,
            &reachable_stacks,
        );
        if let Err(rejection) = &result {
            messages.reject(rejection);
        }
        result
    }

    fn commit<H, M>(&mut self, host: &mut H, messages: &mut M) -> AcceptOutcome
    where
        H: HostActions,
        M: MessageSink,
    {
        let group_id = commit::run(&self.snapshot, &self.transferables, host, messages);
        AcceptOutcome::Committed { group_id }
    }

    /// Which pawns and item stacks the host pathfinder can route to the
    /// lead pod right now.
    fn reachable_things<R: Reachability>(
        &self,
        reachability: &R,
    ) -> (HashSet<ThingId>, HashSet<ThingId>) {
        let mut pawns = HashSet::new();
        let mut stacks = HashSet::new();
        let Some(lead) = self.snapshot.lead_pod() else {
            return (pawns, stacks);
        };
        for pawn in &self.snapshot.pawns {
            if reachability.can_reach_pod(pawn.position, lead.id) {
                pawns.insert(pawn.id);
            }
        }
        for item in &self.snapshot.items {
            if reachability.can_reach_pod(item.position, lead.id) {
                stacks.insert(item.id);
            }
        }
        (pawns, stacks)
    }
}
