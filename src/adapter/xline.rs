//! Etcd/xline-backed transport: pod/node objects are YAML-encoded under
//! `/registry/pods/<name>` and `/registry/nodes/<name>`, watched by
//! prefix. Binding writes `spec.nodeName` back to the pod's key;
//! preemption deletes it outright, since `nodeName` is immutable once
//! set and a misplaced pod has to be destroyed and rescheduled, not moved.

use std::collections::HashMap;

use etcd_client::{Client, EventType as XlineEventType, GetOptions, WatchOptions, WatchStream, Watcher};

use crate::adapter::wire::{self, Node, PodTask};
use crate::adapter::{BindOutcome, PreemptOutcome};
use crate::models::{NodeInfo, ObservedPod};

const PODS_PREFIX: &str = "/registry/pods/";
const NODES_PREFIX: &str = "/registry/nodes/";

pub struct XlineClient {
    client: Client,
}

impl XlineClient {
    pub async fn connect(endpoints: &[&str]) -> Result<Self, etcd_client::Error> {
        let client = Client::connect(endpoints, None).await?;
        Ok(Self { client })
    }

    pub async fn list_nodes(&mut self) -> anyhow::Result<Vec<NodeInfo>> {
        let resp = self.client.get(NODES_PREFIX, Some(GetOptions::new().with_prefix())).await?;
        let mut nodes = Vec::new();
        for kv in resp.kvs() {
            let node: Node = serde_yaml::from_slice(kv.value())?;
            if let Some(info) = wire::node_to_node_info(node) {
                nodes.push(info);
            }
        }
        Ok(nodes)
    }

    pub async fn list_pods(&mut self, scheduler_name: &str) -> anyhow::Result<Vec<ObservedPod>> {
        let resp = self.client.get(PODS_PREFIX, Some(GetOptions::new().with_prefix())).await?;
        let mut pods = Vec::new();
        for kv in resp.kvs() {
            let task: PodTask = serde_yaml::from_slice(kv.value())?;
            let manifest = wire::pod_task_to_manifest(task);
            if manifest.scheduler_name != scheduler_name || manifest.phase.is_terminal() {
                continue;
            }
            pods.push(manifest.into_observed());
        }
        Ok(pods)
    }

    /// Requests previous values on the watch stream (`with_prev_kv`) so a
    /// `Delete` event still carries the pod's real uid — the registry key
    /// is just the pod name, and uid is what the pod table is keyed on.
    pub async fn watch_pods(&mut self) -> Result<(Watcher, WatchStream), etcd_client::Error> {
        self.client
            .watch(PODS_PREFIX, Some(WatchOptions::new().with_prefix().with_prev_kv()))
            .await
    }

    /// Binds by writing `spec.nodeName` on the pod's registry entry.
    pub async fn bind(&mut self, pod_name: &str, node_name: &str) -> BindOutcome {
        let key = format!("{PODS_PREFIX}{pod_name}");
        let result: anyhow::Result<Option<bool>> = async {
            let resp = self.client.get(key.clone(), None).await?;
            let Some(kv) = resp.kvs().first() else {
                return Ok(None);
            };
            let mut task: PodTask = serde_yaml::from_slice(kv.value())?;
            if let Some(existing) = &task.spec.node_name {
                if existing != node_name {
                    return Ok(Some(false));
                }
            }
            task.spec.node_name = Some(node_name.to_string());
            let value = serde_yaml::to_string(&SerializablePodTask::from(&task))?;
            self.client.put(key, value, None).await?;
            Ok(Some(true))
        }
        .await;

        match result {
            Ok(None) => BindOutcome::PodGone,
            Ok(Some(true)) => BindOutcome::Bound,
            Ok(Some(false)) => BindOutcome::Conflict { already_on_target: false },
            Err(err) => BindOutcome::Failed(err.to_string()),
        }
    }

    /// Preempts by deleting the pod's registry entry outright. The
    /// platform's own controller is responsible for recreating it as
    /// pending, which is what produces the fresh-uid `ADDED` event gang
    /// reformation relies on.
    pub async fn preempt(&mut self, pod_name: &str) -> PreemptOutcome {
        let key = format!("{PODS_PREFIX}{pod_name}");
        match self.client.delete(key, None).await {
            Ok(resp) if resp.deleted() > 0 => PreemptOutcome::Deleted,
            Ok(_) => PreemptOutcome::AlreadyGone,
            Err(err) => PreemptOutcome::Failed(err.to_string()),
        }
    }

    /// Decodes a watch event into the engine-facing `ObservedPod`,
    /// returning `None` for pods outside `scheduler_name` or in a
    /// terminal phase (filtered before the engine ever sees them).
    ///
    /// `prev_value` is the registry entry's value immediately before this
    /// event (populated by `watch_pods`'s `with_prev_kv`); for a `Delete`
    /// it's the only place the pod's real uid survives, since the
    /// registry key is just the pod name.
    pub fn decode_pod_event(
        scheduler_name: &str,
        kind: XlineEventType,
        key: &[u8],
        value: &[u8],
        prev_value: Option<&[u8]>,
    ) -> anyhow::Result<Option<(XlineEventType, ObservedPod)>> {
        match kind {
            XlineEventType::Put => {
                let task: PodTask = serde_yaml::from_slice(value)?;
                let manifest = wire::pod_task_to_manifest(task);
                if manifest.scheduler_name != scheduler_name || manifest.phase.is_terminal() {
                    return Ok(None);
                }
                Ok(Some((XlineEventType::Put, manifest.into_observed())))
            }
            XlineEventType::Delete => {
                let name = String::from_utf8_lossy(key).replace(PODS_PREFIX, "");
                let Some(prev) = prev_value else {
                    log::error!("delete event for pod {name} carried no previous value; uid unknown");
                    return Ok(None);
                };
                let task: PodTask = serde_yaml::from_slice(prev)?;
                let manifest = wire::pod_task_to_manifest(task);
                if manifest.scheduler_name != scheduler_name {
                    return Ok(None);
                }
                Ok(Some((XlineEventType::Delete, manifest.into_observed())))
            }
        }
    }
}

/// `PodTask` (in `wire`) is `Deserialize`-only; this minimal
/// serializable shadow writes back only the field the adapter mutates
/// (`spec.nodeName`) without round-tripping fields it never touches.
#[derive(serde::Serialize)]
struct SerializablePodTask {
    metadata: SerializableMeta,
    spec: SerializableSpec,
}

#[derive(serde::Serialize)]
struct SerializableMeta {
    name: String,
    namespace: String,
    annotations: HashMap<String, String>,
}

#[derive(serde::Serialize)]
struct SerializableSpec {
    #[serde(rename = "nodeName", skip_serializing_if = "Option::is_none")]
    node_name: Option<String>,
    #[serde(rename = "schedulerName")]
    scheduler_name: String,
}

impl From<&PodTask> for SerializablePodTask {
    fn from(task: &PodTask) -> Self {
        Self {
            metadata: SerializableMeta {
                name: task.metadata.name.clone(),
                namespace: task.metadata.namespace.clone(),
                annotations: task.metadata.annotations.clone(),
            },
            spec: SerializableSpec {
                node_name: task.spec.node_name.clone(),
                scheduler_name: task.spec.scheduler_name.clone(),
            },
        }
    }
}
