//! Wires `DecisionEngine` to `XlineClient`: the watch loop that turns
//! registry notifications into engine events and executes the resulting
//! actions, re-initializing on sustained platform failures.

use etcd_client::EventType as XlineEventType;
use tokio::time::sleep;

use crate::adapter::xline::XlineClient;
use crate::adapter::{handle_bind_outcome, handle_preempt_outcome, ReinitPolicy};
use crate::config::Config;
use crate::engine::DecisionEngine;
use crate::models::{Action, Event, EventType, ObservedPod};

pub async fn run(config: Config) -> anyhow::Result<()> {
    let endpoints: Vec<&str> = config.etcd_endpoints.iter().map(String::as_str).collect();
    let mut reinit = ReinitPolicy::new(config.reinit_cooldown);

    loop {
        match run_once(&config, &endpoints).await {
            Ok(()) => return Ok(()),
            Err(err) => {
                log::error!("scheduler loop exited: {err:#}");
                if !reinit.try_enter(&format!("main loop exception: {err}")) {
                    // Cooldown active — wait it out before retrying rather
                    // than spinning.
                    sleep(config.reinit_cooldown).await;
                }
            }
        }
    }
}

async fn run_once(config: &Config, endpoints: &[&str]) -> anyhow::Result<()> {
    let mut client = XlineClient::connect(endpoints).await?;
    let mut engine = DecisionEngine::new();

    let nodes = client.list_nodes().await?;
    let pods = client.list_pods(&config.scheduler_name).await?;
    log::info!("initializing with {} nodes and {} existing pods", nodes.len(), pods.len());
    let mut reinit = ReinitPolicy::new(config.reinit_cooldown);
    let actions = engine.initialize(nodes, pods)?;
    let followups = execute_actions(&mut client, &actions, &mut reinit).await;
    apply_followups(&mut engine, followups)?;

    let (_watcher, mut stream) = client.watch_pods().await?;

    while let Some(resp) = stream.message().await? {
        for ev in resp.events() {
            let Some(kv) = ev.kv() else { continue };
            let prev_value = ev.prev_kv().map(|kv| kv.value());
            let decoded = XlineClient::decode_pod_event(
                &config.scheduler_name,
                ev.event_type(),
                kv.key(),
                kv.value(),
                prev_value,
            )?;
            let Some((kind, observed)) = decoded else { continue };

            let event = to_engine_event(&engine, kind, observed);
            let actions = engine.handle_event(event)?;
            let followups = execute_actions(&mut client, &actions, &mut reinit).await;
            apply_followups(&mut engine, followups)?;
        }
    }

    Ok(())
}

/// Events the adapter synthesizes in reaction to a platform error (a bind
/// 404) are fed straight back through the engine, exactly as any other
/// event would be — the engine doesn't distinguish their origin.
fn apply_followups(engine: &mut DecisionEngine, followups: Vec<Event>) -> anyhow::Result<()> {
    for event in followups {
        engine.handle_event(event)?;
    }
    Ok(())
}

/// A `Put` for a uid the engine already knows is a `MODIFIED`; a `Put`
/// for a uid it has never seen is an `ADDED`, regardless of whether the
/// incoming record already carries a `node_name` — a gang member reborn
/// with a stale `nodeName` still has to go through `ADDED` first so the
/// engine actually tracks it, rather than being treated as a no-op update
/// to a pod it was never told about.
fn to_engine_event(engine: &DecisionEngine, kind: XlineEventType, pod: ObservedPod) -> Event {
    let event_type = match kind {
        XlineEventType::Put if engine.knows_pod(&pod.uid) => EventType::Modified,
        XlineEventType::Put => EventType::Added,
        XlineEventType::Delete => EventType::Deleted,
    };
    Event { event_type, pod }
}

async fn execute_actions(client: &mut XlineClient, actions: &[Action], reinit: &mut ReinitPolicy) -> Vec<Event> {
    let mut followups = Vec::new();
    for action in actions {
        match action {
            Action::Bind { pod_uid, pod_name, pod_namespace, node_name } => {
                log::info!("binding pod {pod_namespace}/{pod_name} to node {node_name}");
                let observed = ObservedPod {
                    uid: pod_uid.clone(),
                    name: pod_name.clone(),
                    namespace: pod_namespace.clone(),
                    priority: 0,
                    gang_name: None,
                    node_name: None,
                };
                let outcome = client.bind(pod_name, node_name).await;
                let (_, followup) = handle_bind_outcome(outcome, &observed, node_name, reinit);
                followups.extend(followup);
            }
            Action::Preempt { pod_uid: _, pod_name, pod_namespace } => {
                log::info!("preempting pod {pod_namespace}/{pod_name}");
                let outcome = client.preempt(pod_name).await;
                handle_preempt_outcome(outcome, pod_namespace, pod_name, reinit);
            }
        }
    }
    followups
}
