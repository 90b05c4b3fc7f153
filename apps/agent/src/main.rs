//! checkup-agent: poll configured targets and print what each check
//! produced.

mod config;
mod mesos;
mod sink;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::time::interval;
use tracing::{info, warn};

use checkup::{CheckRunner, HttpTransport, Transport};
use config::{AgentConfig, Instance};
use sink::ConsoleSink;

#[derive(Debug, Parser)]
#[command(name = "checkup-agent", version, about = "Poll Mesos masters and print the metrics and events each check produces")]
struct Cli {
    /// Path to the agent config file (defaults to the user config dir).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run against a single base URL instead of the configured instances.
    #[arg(long)]
    url: Option<String>,

    /// Extra "key:value" tag for the ad-hoc instance (repeatable).
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Per-request timeout in seconds for the ad-hoc instance.
    #[arg(long)]
    timeout: Option<f64>,

    /// Keep polling every N seconds instead of running once.
    #[arg(long)]
    interval: Option<u64>,

    /// Increase log verbosity (-v: debug, -vv: trace).
    #[arg(short, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init_with_level(logger::level_for_verbosity(cli.verbose));

    let (default_timeout, instances) = if let Some(url) = cli.url {
        let instance = Instance { url: Some(url), tags: cli.tags.clone(), timeout: cli.timeout };
        (cli.timeout.unwrap_or(checkup::DEFAULT_TIMEOUT_SECS), vec![instance])
    } else {
        let agent_config = AgentConfig::from_config(cli.config.as_deref())?;
        (agent_config.init_config.default_timeout, agent_config.instances)
    };

    let transport = HttpTransport::new()?;

    match cli.interval {
        Some(seconds) => {
            let mut timer = interval(Duration::from_secs(seconds.max(1)));
            loop {
                timer.tick().await;
                run_instances(&transport, default_timeout, &instances).await;
            }
        }
        None => run_instances(&transport, default_timeout, &instances).await,
    }

    Ok(())
}

/// Run the full check sequence against every configured instance, in
/// order. A failing instance never blocks the rest, and the exit status
/// does not distinguish failure kinds.
async fn run_instances(transport: &dyn Transport, default_timeout: f64, instances: &[Instance]) {
    for instance in instances {
        let Some(url) = &instance.url else {
            info!("skipping instance, no url configured");
            continue;
        };
        if let Err(reason) = config::validate_base_url(url) {
            warn!(url = %url, %reason, "skipping instance");
            continue;
        }

        println!("Running checks against {url}");
        let runner = CheckRunner::new(
            mesos::NAMESPACE,
            url.clone(),
            instance.timeout(default_timeout),
            instance.tags.clone(),
            mesos::master_checks(),
        );

        let mut console = ConsoleSink::default();
        runner.run(transport, &mut console).await;
        info!(
            url = %url,
            metrics = console.metrics(),
            events = console.events(),
            "instance done"
        );
    }
}
