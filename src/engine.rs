//! Decision Engine: orchestrates the unit builder, queue
//! ordering, plan builder and differ, and owns the only mutable state in
//! the system. Pure with respect to I/O — `initialize`/`handle_event` never
//! block and never call the platform; they only return the action list the
//! adapter must execute.

use crate::error::EngineError;
use crate::models::{Action, Event, EventType, NodeInfo, ObservedPod};
use crate::state::ClusterState;
use crate::{differ, plan, queue};

#[derive(Debug, Default)]
pub struct DecisionEngine {
    state: ClusterState,
}

impl DecisionEngine {
    pub fn new() -> Self {
        Self { state: ClusterState::default() }
    }

    /// Whether a pod with this uid is already in the engine's pod table —
    /// the adapter needs this to tell a first-seen `Put` (an `ADDED`) from
    /// one that updates a pod it already scheduled (a `MODIFIED`), since
    /// carrying `node_name` alone doesn't distinguish the two.
    pub fn knows_pod(&self, uid: &str) -> bool {
        self.state.pods.contains_key(uid)
    }

    /// Builds the initial tables from a cluster snapshot and returns the
    /// first action list.
    pub fn initialize(
        &mut self,
        nodes: impl IntoIterator<Item = NodeInfo>,
        existing: impl IntoIterator<Item = ObservedPod>,
    ) -> Result<Vec<Action>, EngineError> {
        self.state = ClusterState::default();
        for node in nodes {
            self.state.add_node(&node);
        }
        for pod in existing {
            self.state.insert_or_refresh_pod(pod.to_record());
            if let Some(node_name) = &pod.node_name {
                if self.state.node_assignments.contains_key(node_name) {
                    self.state.bind_to_node(node_name, &pod.uid);
                }
            }
        }
        log::info!(
            "initialized: {} nodes, {} pods",
            self.state.node_assignments.len(),
            self.state.pods.len()
        );
        self.replan()
    }

    /// Processes one event and returns the actions the adapter must
    /// execute, in order.
    pub fn handle_event(&mut self, event: Event) -> Result<Vec<Action>, EngineError> {
        match event.event_type {
            EventType::Deleted => {
                self.handle_deleted(&event.pod);
            }
            EventType::Modified => {
                if !self.handle_modified(&event.pod) {
                    return Ok(Vec::new());
                }
            }
            EventType::Added => {
                self.handle_added(&event.pod);
            }
        }
        self.replan()
    }

    fn handle_deleted(&mut self, pod: &ObservedPod) {
        self.state.remove_pod(&pod.uid);
    }

    /// Returns `true` if the event should proceed to replanning (i.e. it
    /// wasn't a no-op/inconsistency). A `MODIFIED` whose node assignment
    /// already matches is a no-op; an unknown pod or a conflicting
    /// `node_name` is a transient inconsistency — logged, not propagated.
    fn handle_modified(&mut self, pod: &ObservedPod) -> bool {
        if !self.state.pods.contains_key(&pod.uid) {
            log::debug!("MODIFIED for unknown pod {} ignored", pod.uid);
            return false;
        }
        if let Some(node_name) = &pod.node_name {
            let current = self.state.node_assignments.get(node_name);
            match current {
                Some(Some(uid)) if uid == &pod.uid => false, // already consistent, no-op
                Some(_) => {
                    log::error!(
                        "MODIFIED pod {} reports node {node_name} but assignment table disagrees",
                        pod.uid
                    );
                    false
                }
                None => {
                    log::error!("MODIFIED pod {} reports unknown node {node_name}", pod.uid);
                    false
                }
            }
        } else {
            false
        }
    }

    fn handle_added(&mut self, pod: &ObservedPod) {
        self.state.insert_or_refresh_pod(pod.to_record());
        if let Some(node_name) = &pod.node_name {
            if self.state.node_assignments.contains_key(node_name) {
                self.state.bind_to_node(node_name, &pod.uid);
            }
        }
        if let Some(gang_name) = &pod.gang_name {
            if self.state.gangs_in_transition.contains(gang_name) && self.state.gang_settled(gang_name) {
                self.state.gangs_in_transition.remove(gang_name);
                log::info!("gang {gang_name} reformation complete");
            }
        }
    }

    fn replan(&mut self) -> Result<Vec<Action>, EngineError> {
        let ordered = queue::build_queue(&self.state);
        let built = plan::build_plan(ordered, self.state.total_nodes());
        differ::diff(&mut self.state, &built)
    }
}
