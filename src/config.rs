//! Scheduler configuration, env-sourced: the scheduler name plus the
//! etcd endpoints and re-init cooldown the adapter needs.

use std::time::Duration;

const DEFAULT_SCHEDULER_NAME: &str = "custom-scheduler";
const DEFAULT_ETCD_ENDPOINT: &str = "127.0.0.1:2379";
const DEFAULT_REINIT_COOLDOWN_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub scheduler_name: String,
    pub etcd_endpoints: Vec<String>,
    pub reinit_cooldown: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let scheduler_name =
            std::env::var("SCHEDULER_NAME").unwrap_or_else(|_| DEFAULT_SCHEDULER_NAME.to_string());

        let etcd_endpoints = std::env::var("SCHEDULER_ETCD_ENDPOINTS")
            .ok()
            .map(|raw| raw.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_else(|| vec![DEFAULT_ETCD_ENDPOINT.to_string()]);

        let reinit_cooldown = std::env::var("SCHEDULER_REINIT_COOLDOWN_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_REINIT_COOLDOWN_SECS));

        Self { scheduler_name, etcd_endpoints, reinit_cooldown }
    }
}
