//! Boundary scenarios and invariants exercised against the public
//! `DecisionEngine` API: small `make_*` helpers, plain `#[test]`,
//! `assert_eq!` on sorted/ordered action lists.

use gang_scheduler::engine::DecisionEngine;
use gang_scheduler::models::{Action, Event, EventType, NodeInfo, ObservedPod};

fn nodes(names: &[&str]) -> Vec<NodeInfo> {
    names.iter().map(|n| NodeInfo { name: n.to_string() }).collect()
}

fn make_pod(uid: &str, priority: i64, node_name: Option<&str>) -> ObservedPod {
    ObservedPod {
        uid: uid.to_string(),
        name: uid.to_string(),
        namespace: "default".to_string(),
        priority,
        gang_name: None,
        node_name: node_name.map(str::to_string),
    }
}

fn make_gang_pod(uid: &str, priority: i64, gang: &str) -> ObservedPod {
    let mut pod = make_pod(uid, priority, None);
    pod.gang_name = Some(gang.to_string());
    pod
}

fn added(pod: ObservedPod) -> Event {
    Event { event_type: EventType::Added, pod }
}

fn bind(uid: &str, node: &str) -> Action {
    Action::Bind {
        pod_uid: uid.to_string(),
        pod_name: uid.to_string(),
        pod_namespace: "default".to_string(),
        node_name: node.to_string(),
    }
}

fn preempt(uid: &str) -> Action {
    Action::Preempt {
        pod_uid: uid.to_string(),
        pod_name: uid.to_string(),
        pod_namespace: "default".to_string(),
    }
}

/// Scenario 1 — preemption of a single.
#[test]
fn preemption_of_a_single() {
    let mut engine = DecisionEngine::new();
    engine.initialize(nodes(&["node-1"]), vec![make_pod("low", 10, Some("node-1"))]).unwrap();

    let actions = engine.handle_event(added(make_pod("high", 100, None))).unwrap();
    assert_eq!(actions, vec![preempt("low"), bind("high", "node-1")]);
}

/// Scenario 2 — stability under headroom: exactly one bind, no preempts.
#[test]
fn stability_under_headroom() {
    let mut engine = DecisionEngine::new();
    engine
        .initialize(
            nodes(&["node-1", "node-2", "node-3"]),
            vec![make_pod("low1", 10, Some("node-1")), make_pod("low2", 10, Some("node-2"))],
        )
        .unwrap();

    let actions = engine.handle_event(added(make_pod("high", 100, None))).unwrap();
    assert_eq!(actions, vec![bind("high", "node-3")]);
}

/// Scenario 3 — gang with capacity: all three land on distinct nodes, in
/// ascending node-name order as each member arrives.
#[test]
fn gang_with_capacity_all_bound() {
    let mut engine = DecisionEngine::new();
    engine.initialize(nodes(&["node-1", "node-2", "node-3"]), vec![]).unwrap();

    let mut all_actions = Vec::new();
    for uid in ["g1", "g2", "g3"] {
        let actions = engine.handle_event(added(make_gang_pod(uid, 50, "A"))).unwrap();
        all_actions.extend(actions);
    }

    assert_eq!(
        all_actions,
        vec![bind("g1", "node-1"), bind("g2", "node-2"), bind("g3", "node-3")]
    );
}

/// Scenario 4 — unschedulable gang does not block a higher-priority single.
#[test]
fn unschedulable_gang_does_not_block() {
    let mut engine = DecisionEngine::new();
    engine.initialize(nodes(&["node-1", "node-2"]), vec![]).unwrap();

    for uid in ["g1", "g2", "g3"] {
        engine.handle_event(added(make_gang_pod(uid, 50, "A"))).unwrap();
    }

    let actions = engine.handle_event(added(make_pod("high", 100, None))).unwrap();
    assert_eq!(actions.len(), 1);
    assert!(matches!(&actions[0], Action::Bind { pod_uid, .. } if pod_uid == "high"));
}

/// Scenario 5 — gang effective priority is the minimum member; a single
/// between the two member priorities outranks the full gang and preempts
/// it to make room.
#[test]
fn gang_effective_priority_vs_single() {
    let mut engine = DecisionEngine::new();
    engine.initialize(nodes(&["node-1", "node-2"]), vec![]).unwrap();

    engine.handle_event(added(make_gang_pod("a", 50, "A"))).unwrap();
    let actions = engine.handle_event(added(make_gang_pod("b", 30, "A"))).unwrap();
    // Both members now fit exactly (2 nodes, gang of 2) and bind, since
    // nothing has outranked the gang's effective priority (30) yet.
    assert!(actions.iter().all(|a| matches!(a, Action::Bind { .. })));

    // "mid" (40) outranks the gang's effective priority (30), so the plan
    // now admits "mid" instead of the gang — both members are preempted
    // to free the nodes, and "mid" binds to the first free one. Preempts
    // come out in ascending node-name order (node-1 held "a", node-2 held
    // "b"), then the bind.
    let actions = engine.handle_event(added(make_pod("mid", 40, None))).unwrap();
    assert_eq!(actions, vec![preempt("a"), preempt("b"), bind("mid", "node-1")]);
}

/// Scenario 6 — tiebreak by size: at equal priority a size-1 unit precedes
/// a size-3 gang, so two singles displace a fully-bound gang entirely.
#[test]
fn tiebreak_by_size_favors_singles() {
    let mut engine = DecisionEngine::new();
    engine.initialize(nodes(&["node-1", "node-2", "node-3"]), vec![]).unwrap();

    for uid in ["g1", "g2", "g3"] {
        engine.handle_event(added(make_gang_pod(uid, 50, "A"))).unwrap();
    }

    // A same-priority single outranks the whole gang on the size tiebreak,
    // so the gang (no longer the longest fitting prefix) is preempted in
    // full to make room, in ascending node-name order (g1/node-1, g2/node-2,
    // g3/node-3), followed by the bind.
    let a1 = engine.handle_event(added(make_pod("s1", 50, None))).unwrap();
    assert_eq!(a1, vec![preempt("g1"), preempt("g2"), preempt("g3"), bind("s1", "node-1")]);

    // A second equal-priority single now just takes the next free node;
    // the gang stays pending (suppressed while in transition).
    let a2 = engine.handle_event(added(make_pod("s2", 50, None))).unwrap();
    assert_eq!(a2, vec![bind("s2", "node-2")]);
}

/// Gang atomicity: a plan that excludes a gang excludes all of it —
/// a higher-priority single never displaces just one member, leaving the
/// other stranded on a node.
#[test]
fn gang_atomicity_holds_under_preemption() {
    let mut engine = DecisionEngine::new();
    engine.initialize(nodes(&["node-1", "node-2"]), vec![]).unwrap();

    engine.handle_event(added(make_gang_pod("a", 50, "A"))).unwrap();
    engine.handle_event(added(make_gang_pod("b", 50, "A"))).unwrap();

    // A higher priority single doesn't fit alongside the gang, so the
    // entire gang — both members — is preempted at once, in ascending
    // node-name order, then the bind.
    let actions = engine.handle_event(added(make_pod("high", 100, None))).unwrap();
    assert_eq!(actions, vec![preempt("a"), preempt("b"), bind("high", "node-1")]);
}

/// Replaying the exact same event twice yields an empty action list on
/// the second call.
#[test]
fn replaying_same_event_is_idempotent() {
    let mut engine = DecisionEngine::new();
    engine.initialize(nodes(&["node-1"]), vec![]).unwrap();

    let event = added(make_pod("p", 10, None));
    let first = engine.handle_event(event.clone()).unwrap();
    assert_eq!(first, vec![bind("p", "node-1")]);

    let second = engine.handle_event(event).unwrap();
    assert!(second.is_empty());
}

/// Delete immediately followed by add (new uid) re-admits the pod to an
/// equivalent placement.
#[test]
fn delete_then_readd_reaches_equivalent_placement() {
    let mut engine = DecisionEngine::new();
    engine.initialize(nodes(&["node-1"]), vec![make_pod("old", 10, Some("node-1"))]).unwrap();

    engine
        .handle_event(Event { event_type: EventType::Deleted, pod: make_pod("old", 10, Some("node-1")) })
        .unwrap();
    let actions = engine.handle_event(added(make_pod("new", 10, None))).unwrap();
    assert_eq!(actions, vec![bind("new", "node-1")]);
}
