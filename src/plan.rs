//! Plan Builder: greedily selects the longest priority prefix of units
//! that fits in the cluster, without stopping on the first unit that
//! doesn't — a later, smaller, lower-priority unit may still fit around
//! an unschedulable one, so a blocked gang never starves the rest of the
//! queue.

use crate::models::SchedulingUnit;

pub fn build_plan(queue: Vec<SchedulingUnit>, total_nodes: usize) -> Vec<SchedulingUnit> {
    let mut plan = Vec::new();
    let mut used = 0usize;
    for unit in queue {
        let needed = unit.required_nodes();
        if used + needed <= total_nodes {
            used += needed;
            plan.push(unit);
        }
    }
    plan
}
