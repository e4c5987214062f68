//! YAML wire representation of pod/node objects as stored in the
//! platform's registry, and the annotation-driven extraction of
//! scheduling metadata: the typed pod spec carries no scheduling fields
//! of its own, so priority and gang membership travel as annotations.

use std::collections::HashMap;

use serde::Deserialize;

use crate::models::{PodManifest, PodPhase};

fn default_namespace() -> String {
    "default".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectMeta {
    pub name: String,
    #[serde(default, rename = "uid")]
    pub uid: Option<String>,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default)]
    pub annotations: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PodSpecWire {
    #[serde(default, rename = "nodeName")]
    pub node_name: Option<String>,
    #[serde(default = "default_scheduler_name", rename = "schedulerName")]
    pub scheduler_name: String,
}

fn default_scheduler_name() -> String {
    "custom-scheduler".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct PodStatusWire {
    #[serde(default)]
    pub phase: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PodTask {
    pub metadata: ObjectMeta,
    pub spec: PodSpecWire,
    #[serde(default)]
    pub status: Option<PodStatusWire>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeSpecWire {
    #[serde(default)]
    pub unschedulable: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Node {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: NodeSpecWire,
}

impl Default for NodeSpecWire {
    fn default() -> Self {
        Self { unschedulable: false }
    }
}

fn parse_phase(s: &str) -> PodPhase {
    match s {
        "Pending" => PodPhase::Pending,
        "Running" => PodPhase::Running,
        "Succeeded" => PodPhase::Succeeded,
        "Failed" => PodPhase::Failed,
        _ => PodPhase::Unknown,
    }
}

/// Turns a decoded `PodTask` into the engine-facing `PodManifest`,
/// synthesizing a uid from the name/namespace pair when the registry
/// entry doesn't carry one (the in-process registry this crate targets
/// doesn't assign uids the way a real platform's object store would).
pub fn pod_task_to_manifest(task: PodTask) -> PodManifest {
    let phase = task
        .status
        .map(|s| parse_phase(&s.phase))
        .unwrap_or(PodPhase::Pending);
    let uid = task
        .metadata
        .uid
        .clone()
        .unwrap_or_else(|| format!("{}/{}", task.metadata.namespace, task.metadata.name));
    PodManifest {
        uid,
        name: task.metadata.name,
        namespace: task.metadata.namespace,
        scheduler_name: task.spec.scheduler_name,
        phase,
        node_name: task.spec.node_name,
        annotations: task.metadata.annotations,
    }
}

pub fn node_to_node_info(node: Node) -> Option<crate::models::NodeInfo> {
    if node.spec.unschedulable {
        return None;
    }
    Some(crate::models::NodeInfo { name: node.metadata.name })
}
