//! Registration-based extension of the pod command row.
//!
//! The host builds a base row of command entries for a selected pod and
//! then runs it through a registry of providers, each of which may splice
//! in its own entries. The reload provider inserts its command right
//! after the host's cancel-load entry, where players expect the loading
//! controls to sit.

use podreload_logic::stats::PodId;

/// Icon slot for the load-transporter command.
pub const LOAD_COMMAND_ICON: &str = "ui/commands/load_transporter";
/// Icon slot the host uses for its cancel-load entry.
pub const CANCEL_LOAD_ICON: &str = "ui/designators/cancel";

/// What pressing a command entry does. Host-produced entries carry an
/// opaque host command id; registry entries carry structured actions the
/// host dispatches on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GizmoAction {
    /// One of the host's own commands, untouched.
    Host(u32),
    /// Open the reload dialog for the group containing this pod.
    ReloadTransporters { origin: PodId },
}

/// One button in the pod command row.
#[derive(Debug, Clone, PartialEq)]
pub struct GizmoEntry {
    pub label: String,
    pub description: String,
    pub icon: &'static str,
    pub action: GizmoAction,
}

/// Context for one assembly pass over a selected pod.
#[derive(Debug, Clone, Copy)]
pub struct PodGizmoContext {
    pub pod: PodId,
    /// Pods in this pod's transporter group.
    pub group_size: usize,
    /// The group has loading underway or stands ready to launch.
    pub loading_in_progress: bool,
}

/// Something that contributes entries to the pod command row.
pub trait GizmoProvider {
    fn provide(&self, ctx: &PodGizmoContext, gizmos: &mut Vec<GizmoEntry>);
}

/// Ordered list of providers the host runs after building its base row.
#[derive(Default)]
pub struct GizmoRegistry {
    providers: Vec<Box<dyn GizmoProvider>>,
}

impl GizmoRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provider: Box<dyn GizmoProvider>) {
        self.providers.push(provider);
    }

    /// Run every provider, in registration order, over the host's base
    /// row and return the final command row.
    pub fn assemble(&self, base: Vec<GizmoEntry>, ctx: &PodGizmoContext) -> Vec<GizmoEntry> {
        let mut gizmos = base;
        for provider in &self.providers {
            provider.provide(ctx, &mut gizmos);
        }
        gizmos
    }
}

/// Adds the reload command to pods with loading underway.
pub struct ReloadGizmoProvider;

impl GizmoProvider for ReloadGizmoProvider {
    fn provide(&self, ctx: &PodGizmoContext, gizmos: &mut Vec<GizmoEntry>) {
        if !ctx.loading_in_progress {
            return;
        }
        let label = if ctx.group_size > 1 {
            format!("Reload transporters ({})", ctx.group_size)
        } else {
            "Reload transporter".to_string()
        };
        let entry = GizmoEntry {
            label,
            description: "Change which colonists and items load into this transporter group."
                .to_string(),
            icon: LOAD_COMMAND_ICON,
            action: GizmoAction::ReloadTransporters { origin: ctx.pod },
        };
        // Sit next to the host's cancel-load button when it is present.
        let cancel = gizmos.iter().position(|g| g.icon == CANCEL_LOAD_ICON);
        match cancel {
            Some(i) => gizmos.insert(i + 1, entry),
            None => gizmos.push(entry),
        }
    }
}
