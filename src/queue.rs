//! Scheduling Unit Builder + Queue Ordering.
//!
//! Partitions the pod table into singles and gangs, suppresses gangs that
//! aren't whole and settled, then produces the total priority+size order
//! the plan builder consumes. This is a pure function of `ClusterState` —
//! rebuilding it on every event is what makes retries automatic without a
//! separate backoff queue.

use std::collections::BTreeMap;

use crate::models::SchedulingUnit;
use crate::state::ClusterState;

/// Build the priority-ordered queue of schedulable units.
///
/// Gang members are grouped by name in a `BTreeMap` rather than a
/// `HashMap`: the final `sort_by` only orders by priority and size, so two
/// gangs tied on both still need a deterministic fallback, which ascending
/// gang-name iteration here provides.
pub fn build_queue(state: &ClusterState) -> Vec<SchedulingUnit> {
    let mut singles = Vec::new();
    let mut gangs: BTreeMap<String, Vec<_>> = BTreeMap::new();

    for pod in state.pods.values() {
        if pod.waiting_on_deletion {
            continue;
        }
        match &pod.gang_name {
            Some(gang_name) => gangs.entry(gang_name.clone()).or_default().push(pod.clone()),
            None => singles.push(pod.clone()),
        }
    }

    let mut units: Vec<SchedulingUnit> = singles
        .into_iter()
        .map(|pod| SchedulingUnit {
            effective_priority: pod.priority,
            gang_name: None,
            is_gang: false,
            pods: vec![pod],
        })
        .collect();

    for (gang_name, members) in gangs {
        if members.iter().any(|p| p.waiting_on_deletion) {
            log::debug!("suppressing gang {gang_name}: a member is waiting on deletion");
            continue;
        }
        if state.gangs_in_transition.contains(&gang_name) {
            log::debug!("suppressing gang {gang_name}: still in transition");
            continue;
        }
        let effective_priority = members.iter().map(|p| p.priority).min().unwrap_or(0);
        units.push(SchedulingUnit {
            effective_priority,
            gang_name: Some(gang_name),
            is_gang: true,
            pods: members,
        });
    }

    units.sort_by(|a, b| {
        if a.precedes(b) {
            std::cmp::Ordering::Less
        } else if b.precedes(a) {
            std::cmp::Ordering::Greater
        } else {
            std::cmp::Ordering::Equal
        }
    });
    units
}
