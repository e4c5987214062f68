//! Core data types shared by every stage of the scheduling pipeline.
//!
//! `Event` and `Action` are the only values that cross the engine/adapter
//! boundary.

use std::collections::HashMap;

/// Identity + scheduling-relevant fields for a single pod, as tracked in
/// the pod table. `waiting_on_deletion` is transient: set when the engine
/// emits a preempt for this pod, cleared by removing the record entirely
/// once the matching `DELETED` event arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodRecord {
    pub uid: String,
    pub name: String,
    pub namespace: String,
    pub priority: i64,
    pub gang_name: Option<String>,
    pub waiting_on_deletion: bool,
}

impl PodRecord {
    pub fn new(uid: impl Into<String>, name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
            namespace: namespace.into(),
            priority: 0,
            gang_name: None,
            waiting_on_deletion: false,
        }
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_gang(mut self, gang_name: impl Into<String>) -> Self {
        self.gang_name = Some(gang_name.into());
        self
    }
}

/// A pod observation as delivered by the adapter, carrying whatever
/// `node_name` the platform currently reports for it (if any).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedPod {
    pub uid: String,
    pub name: String,
    pub namespace: String,
    pub priority: i64,
    pub gang_name: Option<String>,
    pub node_name: Option<String>,
}

impl ObservedPod {
    pub fn to_record(&self) -> PodRecord {
        PodRecord {
            uid: self.uid.clone(),
            name: self.name.clone(),
            namespace: self.namespace.clone(),
            priority: self.priority,
            gang_name: self.gang_name.clone(),
            waiting_on_deletion: false,
        }
    }
}

/// The kind of pod event the adapter normalizes its watch stream into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    Added,
    Deleted,
    Modified,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub event_type: EventType,
    pub pod: ObservedPod,
}

/// One action the adapter must execute against the platform, in the order
/// returned. All preempts precede all binds within a single action list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Bind {
        pod_uid: String,
        pod_name: String,
        pod_namespace: String,
        node_name: String,
    },
    Preempt {
        pod_uid: String,
        pod_name: String,
        pod_namespace: String,
    },
}

/// A single pod or a complete gang, treated as one indivisible reservation
/// by the plan builder and the differ. Not persisted — rebuilt from the pod
/// table on every event.
#[derive(Debug, Clone)]
pub struct SchedulingUnit {
    pub pods: Vec<PodRecord>,
    pub is_gang: bool,
    pub effective_priority: i64,
    pub gang_name: Option<String>,
}

impl SchedulingUnit {
    pub fn required_nodes(&self) -> usize {
        self.pods.len()
    }

    /// Total order over units: descending effective priority, ties broken
    /// by ascending unit size.
    pub fn precedes(&self, other: &SchedulingUnit) -> bool {
        if self.effective_priority != other.effective_priority {
            self.effective_priority > other.effective_priority
        } else {
            self.pods.len() < other.pods.len()
        }
    }
}

/// A node the engine may place pods on. Unschedulable nodes are never
/// tracked, so every `NodeInfo` the engine holds is schedulable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    pub name: String,
}

/// The platform's view of a pod, as decoded from its wire representation.
/// Annotations carry the scheduling metadata the typed pod spec doesn't.
#[derive(Debug, Clone)]
pub struct PodManifest {
    pub uid: String,
    pub name: String,
    pub namespace: String,
    pub scheduler_name: String,
    pub phase: PodPhase,
    pub node_name: Option<String>,
    pub annotations: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl PodPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, PodPhase::Succeeded | PodPhase::Failed)
    }
}

impl PodManifest {
    /// Priority from the `priority` annotation, falling back to 0.
    pub fn priority(&self) -> i64 {
        self.annotations
            .get("priority")
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(0)
    }

    /// Gang name from the `pod-group` annotation.
    pub fn gang_name(&self) -> Option<String> {
        self.annotations.get("pod-group").cloned()
    }

    pub fn into_observed(self) -> ObservedPod {
        ObservedPod {
            uid: self.uid,
            name: self.name,
            namespace: self.namespace,
            priority: self.priority(),
            gang_name: self.gang_name(),
            node_name: self.node_name,
        }
    }
}
