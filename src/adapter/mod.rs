//! Event Adapter: the external collaborator that talks to the platform,
//! translates its watch stream into `Event`s for the `DecisionEngine`,
//! and executes the returned `Action`s. The engine itself never reaches
//! this module's dependencies, and never blocks — all I/O and all
//! `async` live here.

pub mod run;
pub mod wire;
pub mod xline;

use std::time::{Duration, Instant};

use crate::models::{Event, EventType, ObservedPod};

/// Result of a bind attempt against the platform.
pub enum BindOutcome {
    Bound,
    /// 404: the pod no longer exists. The caller should synthesize a
    /// `DELETED` event rather than treat this as a failure.
    PodGone,
    /// 409: the pod was already bound. `already_on_target` tells the
    /// caller whether it landed on the node we asked for.
    Conflict { already_on_target: bool },
    Failed(String),
}

/// Result of a preempt (delete) attempt against the platform.
pub enum PreemptOutcome {
    Deleted,
    /// 404: already gone — the goal is achieved either way.
    AlreadyGone,
    Failed(String),
}

/// Tracks the re-initialization cooldown: after a platform-side failure
/// the adapter backs off for a fixed window rather than re-initializing
/// on every subsequent error.
pub struct ReinitPolicy {
    cooldown: Duration,
    last_reinit: Option<Instant>,
}

impl ReinitPolicy {
    pub fn new(cooldown: Duration) -> Self {
        Self { cooldown, last_reinit: None }
    }

    /// Returns `true` if a re-init should proceed now, recording the
    /// attempt. Returns `false` (and logs) if still in cooldown.
    pub fn try_enter(&mut self, reason: &str) -> bool {
        let now = Instant::now();
        if let Some(last) = self.last_reinit {
            if now.duration_since(last) < self.cooldown {
                log::warn!("skipping re-init (cooldown active): {reason}");
                return false;
            }
        }
        log::warn!("re-initializing scheduler state due to: {reason}");
        self.last_reinit = Some(now);
        true
    }
}

/// Given a bind outcome, decides whether a `DELETED` should be synthesized
/// back into the engine and/or a re-init should be requested. Factored out
/// of the transport so it's unit-testable without an etcd connection.
pub fn handle_bind_outcome(
    outcome: BindOutcome,
    pod: &ObservedPod,
    node_name: &str,
    reinit: &mut ReinitPolicy,
) -> (bool, Option<Event>) {
    match outcome {
        BindOutcome::Bound => (false, None),
        BindOutcome::PodGone => {
            log::warn!("bind 404 for {}/{}; synthesizing delete", pod.namespace, pod.name);
            (false, Some(Event { event_type: EventType::Deleted, pod: pod.clone() }))
        }
        BindOutcome::Conflict { already_on_target: true } => {
            log::info!(
                "bind 409 for {}/{} but already on {node_name}; treating as success",
                pod.namespace,
                pod.name
            );
            (false, None)
        }
        BindOutcome::Conflict { already_on_target: false } => (
            reinit.try_enter(&format!("bind conflict, pod on wrong node: {}/{}", pod.namespace, pod.name)),
            None,
        ),
        BindOutcome::Failed(err) => {
            log::error!("bind failed for {}/{}: {err}", pod.namespace, pod.name);
            (reinit.try_enter(&format!("bind failure for {}/{}", pod.namespace, pod.name)), None)
        }
    }
}

/// Given a preempt outcome, decides whether a re-init should be requested.
pub fn handle_preempt_outcome(
    outcome: PreemptOutcome,
    pod_namespace: &str,
    pod_name: &str,
    reinit: &mut ReinitPolicy,
) -> bool {
    match outcome {
        PreemptOutcome::Deleted | PreemptOutcome::AlreadyGone => false,
        PreemptOutcome::Failed(err) => {
            log::error!("preempt failed for {pod_namespace}/{pod_name}: {err}");
            reinit.try_enter(&format!("preempt failure for {pod_namespace}/{pod_name}"))
        }
    }
}
