//! The accept pipeline — dump, clear, distribute, load.
//!
//! Runs once validation has passed. The pods are returned to a clean
//! state (nobody aboard, no stale load lists, no haulers mid-flight),
//! the distributor splits the selection across the group, and the host
//! starts its loading process with the selected colonists boarding.

use log::{debug, warn};

use podreload_logic::distribute::distribute;
use podreload_logic::transferables::{Category, ThingId, TransferableSet};

use crate::host::{HostActions, MessageSink, WorldSnapshot};

/// Apply a validated selection to the pod group. Returns the id of the
/// freshly formed loading group.
pub fn run<H, M>(
    snapshot: &WorldSnapshot,
    transferables: &TransferableSet,
    host: &mut H,
    messages: &mut M,
) -> u32
where
    H: HostActions,
    M: MessageSink,
{
    let group_id = host.next_group_id();
    debug!(
        "reload commit: group {} over {} pods, {} kinds selected",
        group_id,
        snapshot.pods.len(),
        transferables.iter().filter(|t| t.count_to_transfer > 0).count()
    );

    // Everyone aboard gets out and re-boards through the loading process,
    // so the new selection decides who ends up inside.
    for pod in &snapshot.pods {
        for content in &pod.contents {
            if content.category != Category::Pawn {
                continue;
            }
            if !host.drop_pawn_from_pod(pod.id, content.thing) {
                warn!(
                    "pawn {} was still inside {} after the dump; respawning manually",
                    content.label, pod.label
                );
                host.respawn_stuck_pawn(pod.id, content.thing);
            }
        }
    }

    // Stale work from the previous load order must not race the new one.
    for pawn in &snapshot.pawns {
        if pawn.hauling_to_group {
            host.interrupt_hauler(pawn.id);
        }
    }
    for pod in &snapshot.pods {
        host.clear_load_list(pod.id);
    }

    let assignments = distribute(transferables.entries(), snapshot.pods.len());
    for a in &assignments {
        host.set_load_list(snapshot.pods[a.pod].id, a.kind, a.count);
    }
    debug!("reload commit: {} load-list records written", assignments.len());

    let boarders = boarding_colonists(snapshot, transferables);
    host.begin_loading(group_id, &boarders);
    messages.info("Transporters loading process started.");
    group_id
}

/// Selected colonists fit to board: for each pawn kind the first
/// `count_to_transfer` pawns of that kind, minus anyone downed or not of
/// the colony.
fn boarding_colonists(snapshot: &WorldSnapshot, transferables: &TransferableSet) -> Vec<ThingId> {
    let mut boarders = Vec::new();
    for t in transferables.pawns() {
        for stack in t.stacks.iter().take(t.count_to_transfer as usize) {
            let info = snapshot.pawns.iter().find(|p| p.id == stack.thing);
            if let Some(p) = info {
                if p.is_colonist && !p.downed {
                    boarders.push(p.id);
                }
            }
        }
    }
    boarders
}
