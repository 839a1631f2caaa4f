//! Spreads selected cargo across the pod group.
//!
//! Every transferable except the largest goes whole to one pod, dealt out
//! round-robin. The largest request is held back: if the round-robin pass
//! left pods empty, it is split evenly across them so no pod sits idle;
//! once every pod already has something it rides along unsplit. Quantities
//! are conserved exactly — integer division remainders land on the last
//! pod of the split.

use serde::{Deserialize, Serialize};

use crate::transferables::{KindId, Transferable};

/// One "load this many of this kind into this pod" record. `pod` indexes
/// into the caller's pod group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub kind: KindId,
    pub count: u32,
    pub pod: usize,
}

/// Assign every selected quantity to a pod.
///
/// Returns an empty list when nothing is selected or `pod_count` is zero.
/// Zero-count transferables produce no records and do not advance the
/// round-robin index.
pub fn distribute(transferables: &[Transferable], pod_count: usize) -> Vec<Assignment> {
    let mut assignments = Vec::new();
    if pod_count == 0 || transferables.is_empty() {
        return assignments;
    }

    // Largest request; ties go to the earliest entry.
    let mut anchor = 0;
    for (i, t) in transferables.iter().enumerate() {
        if t.count_to_transfer > transferables[anchor].count_to_transfer {
            anchor = i;
        }
    }

    let mut assigned = 0;
    for (i, t) in transferables.iter().enumerate() {
        if i != anchor && t.count_to_transfer > 0 {
            assignments.push(Assignment {
                kind: t.kind,
                count: t.count_to_transfer,
                pod: assigned % pod_count,
            });
            assigned += 1;
        }
    }

    let anchor_kind = transferables[anchor].kind;
    let mut remaining = transferables[anchor].count_to_transfer;
    if assigned < pod_count {
        // Idle pods remain: split the anchor evenly across them, with the
        // integer-division remainder landing on the last pod.
        let share = remaining / (pod_count - assigned) as u32;
        for pod in assigned..pod_count {
            let count = if pod != pod_count - 1 { share } else { remaining };
            if count > 0 {
                assignments.push(Assignment {
                    kind: anchor_kind,
                    count,
                    pod,
                });
            }
            remaining -= count;
        }
    } else if remaining > 0 {
        assignments.push(Assignment {
            kind: anchor_kind,
            count: remaining,
            pod: assigned % pod_count,
        });
    }

    assignments
}
