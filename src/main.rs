use clap::Parser;
use log::info;

use gang_scheduler::adapter::run;
use gang_scheduler::config::Config;

/// Priority-preempting, gang-aware workload scheduler.
///
/// All configuration is read from the environment (`SCHEDULER_NAME`,
/// `SCHEDULER_ETCD_ENDPOINTS`, `SCHEDULER_REINIT_COOLDOWN_SECS`); see
/// `config::Config::from_env`.
#[derive(Parser)]
#[command(name = "gang-scheduler")]
struct Cli {}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Cli {} = Cli::parse();

    env_logger::init();
    info!("gang-scheduler starting");

    let config = Config::from_env();
    info!("scheduler_name={}", config.scheduler_name);

    run::run(config).await
}
