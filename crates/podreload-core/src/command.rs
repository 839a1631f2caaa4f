//! Pre-dialog checks and session construction.
//!
//! Before the reload dialog opens, the pod group itself must be sound:
//! every pod reachable from the one the player clicked, and every
//! fueling-port pod on the same port network so the group launches
//! together. Failures surface as rejection messages and no session is
//! created.

use podreload_logic::stats::PodId;
use podreload_logic::validation::LoadRejection;

use crate::host::{Cell, MessageSink, PortNetwork, Reachability, WorldSnapshot};
use crate::session::ReloadSession;

/// Validate the pod group and open a reload session on it.
pub fn open_reload_dialog<R, P, M>(
    origin: PodId,
    snapshot: WorldSnapshot,
    reachability: &R,
    ports: &P,
    messages: &mut M,
) -> Result<ReloadSession, LoadRejection>
where
    R: Reachability,
    P: PortNetwork,
    M: MessageSink,
{
    let origin_pod = snapshot.pods.iter().find(|p| p.id == origin);
    if let Some(origin_pod) = origin_pod {
        if origin_pod.has_fueling_port {
            let network = ports.connected_pods(origin);
            for pod in &snapshot.pods {
                if pod.has_fueling_port && !network.contains(&pod.id) {
                    let rejection = LoadRejection::PodsNotConnected {
                        label: pod.label.clone(),
                    };
                    messages.reject(&rejection);
                    return Err(rejection);
                }
            }
        }

        let origin_cell = Cell {
            x: origin_pod.position.0,
            z: origin_pod.position.1,
        };
        for pod in &snapshot.pods {
            if pod.id != origin && !reachability.can_reach_pod(origin_cell, pod.id) {
                let rejection = LoadRejection::PodUnreachable {
                    label: pod.label.clone(),
                };
                messages.reject(&rejection);
                return Err(rejection);
            }
        }
    }

    Ok(ReloadSession::open(snapshot))
}
