//! Engine-internal error taxonomy.
//!
//! Transient event inconsistencies never produce an `EngineError` — they're
//! handled inline in `engine::DecisionEngine::handle_event` by returning an
//! empty action list. `EngineError` is reserved for invariant violations:
//! programming errors that should never happen given a correct plan, and
//! that the adapter's policy is to recover from by re-initializing.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("plan requires a free node for pod {pod_uid} but none remain")]
    NoFreeNodeForPlannedPod { pod_uid: String },

    #[error("node {node_name} was already assigned to {existing_uid} while binding {pod_uid}")]
    NodeAlreadyAssigned {
        node_name: String,
        existing_uid: String,
        pod_uid: String,
    },
}
