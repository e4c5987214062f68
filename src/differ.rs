//! Action Differ: diffs the plan against `ClusterState` and
//! emits the minimal ordered action list, preserving stable placements.
//! All preempts precede all binds so the adapter sees freed capacity
//! before it sees fill requests.

use std::collections::HashSet;

use crate::error::EngineError;
use crate::models::{Action, SchedulingUnit};
use crate::state::ClusterState;

pub fn diff(state: &mut ClusterState, plan: &[SchedulingUnit]) -> Result<Vec<Action>, EngineError> {
    let mut actions = Vec::new();

    let pods_in_plan: HashSet<&str> = plan
        .iter()
        .flat_map(|u| u.pods.iter().map(|p| p.uid.as_str()))
        .collect();

    // Step A — preempt anything occupying a node but absent from the plan.
    let assigned: Vec<(String, String)> = state
        .node_assignments
        .iter()
        .filter_map(|(n, u)| u.as_ref().map(|uid| (n.clone(), uid.clone())))
        .collect();
    for (node, uid) in assigned {
        if pods_in_plan.contains(uid.as_str()) {
            continue;
        }
        match state.pods.get(&uid).cloned() {
            Some(pod) => {
                actions.push(Action::Preempt {
                    pod_uid: uid.clone(),
                    pod_name: pod.name.clone(),
                    pod_namespace: pod.namespace.clone(),
                });
                if let Some(record) = state.pods.get_mut(&uid) {
                    record.waiting_on_deletion = true;
                }
                if let Some(gang_name) = pod.gang_name {
                    state.gangs_in_transition.insert(gang_name);
                }
            }
            None => {
                // Dangling assignment: log and clear the node anyway.
                log::error!("node {node} held unknown pod {uid}; clearing");
            }
        }
        state.node_assignments.insert(node, None);
    }

    // Step B — free nodes, deterministic ascending order.
    let mut free: Vec<String> = state
        .node_assignments
        .iter()
        .filter(|(_, v)| v.is_none())
        .map(|(n, _)| n.clone())
        .collect();
    free.sort();

    // Step C — bind, preserving stable placements.
    for unit in plan {
        for pod in &unit.pods {
            if let Some(node) = state.node_of(&pod.uid) {
                // Already correctly assigned; emit nothing.
                let _ = node;
                continue;
            }
            let Some(node_name) = free.first().cloned() else {
                return Err(EngineError::NoFreeNodeForPlannedPod {
                    pod_uid: pod.uid.clone(),
                });
            };
            free.remove(0);
            if let Some(Some(existing)) = state.node_assignments.get(&node_name) {
                return Err(EngineError::NodeAlreadyAssigned {
                    node_name,
                    existing_uid: existing.clone(),
                    pod_uid: pod.uid.clone(),
                });
            }
            actions.push(Action::Bind {
                pod_uid: pod.uid.clone(),
                pod_name: pod.name.clone(),
                pod_namespace: pod.namespace.clone(),
                node_name: node_name.clone(),
            });
            state.node_assignments.insert(node_name, Some(pod.uid.clone()));
        }
    }

    Ok(actions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NodeInfo, PodRecord};

    fn node(name: &str) -> NodeInfo {
        NodeInfo { name: name.to_string() }
    }

    #[test]
    fn stable_placement_emits_nothing() {
        let mut state = ClusterState::new();
        state.add_node(&node("node-1"));
        let pod = PodRecord::new("low", "low", "default").with_priority(10);
        state.insert_or_refresh_pod(pod.clone());
        state.bind_to_node("node-1", "low");

        let unit = SchedulingUnit {
            pods: vec![pod],
            is_gang: false,
            effective_priority: 10,
            gang_name: None,
        };
        let actions = diff(&mut state, &[unit]).unwrap();
        assert!(actions.is_empty());
    }

    #[test]
    fn preempts_precede_binds() {
        let mut state = ClusterState::new();
        state.add_node(&node("node-1"));
        let low = PodRecord::new("low", "low", "default").with_priority(10);
        state.insert_or_refresh_pod(low);
        state.bind_to_node("node-1", "low");

        let high = PodRecord::new("high", "high", "default").with_priority(100);
        state.insert_or_refresh_pod(high.clone());

        let unit = SchedulingUnit {
            pods: vec![high],
            is_gang: false,
            effective_priority: 100,
            gang_name: None,
        };
        let actions = diff(&mut state, &[unit]).unwrap();
        assert_eq!(actions.len(), 2);
        assert!(matches!(actions[0], Action::Preempt { .. }));
        assert!(matches!(actions[1], Action::Bind { .. }));
        assert!(state.pods["low"].waiting_on_deletion);
    }

    #[test]
    fn dangling_assignment_is_cleared_without_panicking() {
        let mut state = ClusterState::new();
        state.add_node(&node("node-1"));
        state.bind_to_node("node-1", "ghost");
        let actions = diff(&mut state, &[]).unwrap();
        assert!(actions.is_empty());
        assert_eq!(state.node_assignments["node-1"], None);
    }

    #[test]
    fn no_free_node_is_an_engine_error() {
        let mut state = ClusterState::new();
        // Zero nodes tracked but a unit in the plan: a capacity-accounting
        // bug that should never happen if the plan builder did its job.
        let pod = PodRecord::new("p", "p", "default").with_priority(1);
        state.insert_or_refresh_pod(pod.clone());
        let unit = SchedulingUnit {
            pods: vec![pod],
            is_gang: false,
            effective_priority: 1,
            gang_name: None,
        };
        assert!(diff(&mut state, &[unit]).is_err());
    }
}
