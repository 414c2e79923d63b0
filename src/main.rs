use std::time::Duration;

use anyhow::Context;
use clap::{ArgAction, Parser};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use crate::lib::{
    deploy::types::{Deployer, WaitOptions},
    platform::types::{PlatformClient, PlatformConfig},
};

mod lib {
    pub mod deploy;
    pub mod platform;
    pub mod rollout;
    pub mod tasks;
}

/// Roll a new container image out to an ECS service through the Duplo tenant API
#[derive(Parser, Debug)]
#[command(name = "ecs-redeploy", version, long_about = None)]
struct Cli {
    /// Name of the ECS service to redeploy
    service: String,

    /// Container image reference to roll out
    image: String,

    /// Duplo portal URL
    #[arg(long, env = "DUPLO_HOST")]
    host: String,

    /// Tenant the service lives in
    #[arg(long, env = "TENANT_ID")]
    tenant_id: String,

    /// API bearer token
    #[arg(long, env = "DUPLO_TOKEN", hide_env_values = true)]
    token: String,

    /// Wait until the new task definition is running on every replica
    #[arg(long)]
    wait: bool,

    /// Expected replica count (defaults to the service's Replicas)
    #[arg(long, requires = "wait")]
    replicas: Option<u32>,

    /// Seconds between task listings while waiting
    #[arg(
        long,
        default_value = "15",
        value_name = "SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    poll_interval: u64,

    /// Seconds to wait before giving up on the rollout
    #[arg(long, default_value = "600", value_name = "SECS")]
    timeout: u64,

    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = PlatformConfig::new(&cli.host, &cli.tenant_id, &cli.token);
    debug!("Using tenant API at {}", config.base_url());

    let mut deployer = Deployer::new(PlatformClient::new(&config));
    let outcome = deployer
        .deploy(&cli.service, &cli.image)
        .await
        .with_context(|| format!("deploying {} to service {}", cli.image, cli.service))?;
    info!("Deployment submitted, check ECS for rollout progress");

    if cli.wait {
        let replicas = cli.replicas.unwrap_or(outcome.replicas) as usize;
        let options = WaitOptions {
            poll_interval: Duration::from_secs(cli.poll_interval),
            timeout: Duration::from_secs(cli.timeout),
        };
        deployer
            .wait_for_rollout(&outcome.task_definition, replicas, options)
            .await
            .with_context(|| format!("waiting for service {} to roll out", cli.service))?;
    }

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        error!("Fatal error: {:#}", e);
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
