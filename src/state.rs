//! The mutable cluster view owned exclusively by the `DecisionEngine`:
//! the pod table, the node-assignment table, and the set of gangs
//! currently in transition after a partial preemption.

use std::collections::{BTreeMap, HashSet};

use crate::models::{NodeInfo, PodRecord};

/// Mapping `node_name -> pod_uid | None`, plus the pod table and the
/// gangs-in-transition set. Mutated only by `DecisionEngine` and, during
/// plan application, by `differ::diff`.
///
/// Both tables are ordered maps rather than hash maps: the queue builder
/// and the differ iterate them directly before any explicit tiebreak is
/// applied, and replanning from identical state has to produce identical
/// output on every run, not just on runs that happen to hash the same way.
#[derive(Debug, Default)]
pub struct ClusterState {
    pub node_assignments: BTreeMap<String, Option<String>>,
    pub pods: BTreeMap<String, PodRecord>,
    pub gangs_in_transition: HashSet<String>,
}

impl ClusterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: &NodeInfo) {
        self.node_assignments.entry(node.name.clone()).or_insert(None);
    }

    pub fn total_nodes(&self) -> usize {
        self.node_assignments.len()
    }

    /// Node currently holding `uid`, if any — a pod is never bound to
    /// more than one node at a time.
    pub fn node_of(&self, uid: &str) -> Option<String> {
        self.node_assignments
            .iter()
            .find(|(_, v)| v.as_deref() == Some(uid))
            .map(|(n, _)| n.clone())
    }

    pub fn insert_or_refresh_pod(&mut self, record: PodRecord) {
        self.pods.insert(record.uid.clone(), record);
    }

    pub fn remove_pod(&mut self, uid: &str) -> Option<PodRecord> {
        let removed = self.pods.remove(uid);
        if let Some(node) = self.node_of(uid) {
            self.node_assignments.insert(node, None);
        }
        removed
    }

    pub fn bind_to_node(&mut self, node_name: &str, uid: &str) {
        self.node_assignments
            .insert(node_name.to_string(), Some(uid.to_string()));
    }

    /// A gang is reformed once every one of its known members is present
    /// and none is still waiting on deletion. A gang with no
    /// observed members stays suppressed — it just hasn't reappeared yet.
    pub fn gang_settled(&self, gang_name: &str) -> bool {
        let members: Vec<&PodRecord> = self
            .pods
            .values()
            .filter(|p| p.gang_name.as_deref() == Some(gang_name))
            .collect();
        !members.is_empty() && members.iter().all(|p| !p.waiting_on_deletion)
    }
}
