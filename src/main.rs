use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use futures::future::join_all;
use rand::Rng;
use tracing::{info, Level};
use tracing_subscriber;

use tokengate::config::QuotaConfig;
use tokengate::quota::{AdmissionControl, RateLimiter};

/// Simulate a burst of AI API calls funneled through the dual-window limiter.
#[derive(Parser, Debug)]
#[command(name = "tokengate", version, about)]
struct Args {
    /// Path to a YAML quota configuration file
    #[arg(long)]
    config: Option<String>,

    /// Requests-per-minute quota (overrides the config file)
    #[arg(long)]
    rpm: Option<u32>,

    /// Tokens-per-minute quota (overrides the config file)
    #[arg(long)]
    tpm: Option<u64>,

    /// Total number of simulated calls to issue
    #[arg(long, default_value_t = 30)]
    calls: u32,

    /// Token weight attributed to each call
    #[arg(long, default_value_t = 50_000)]
    tokens_per_call: u64,

    /// Number of concurrent callers
    #[arg(long, default_value_t = 4)]
    concurrency: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => QuotaConfig::from_file(path)?,
        None => QuotaConfig::default(),
    };
    if let Some(rpm) = args.rpm {
        config.requests_per_minute = rpm;
    }
    if let Some(tpm) = args.tpm {
        config.tokens_per_minute = tpm;
    }

    info!(
        rpm = config.requests_per_minute,
        tpm = config.tokens_per_minute,
        calls = args.calls,
        tokens_per_call = args.tokens_per_call,
        "Starting rate limit simulation"
    );

    let limiter: Arc<dyn AdmissionControl> = Arc::new(RateLimiter::from_config(&config));

    let workers: Vec<_> = (0..args.concurrency)
        .map(|worker| {
            let limiter = Arc::clone(&limiter);
            let share = calls_for_worker(args.calls, args.concurrency, worker);
            let weight = args.tokens_per_call;
            tokio::spawn(async move {
                for call in 0..share {
                    limiter.admit(weight).await?;
                    fake_upstream_call(worker, call).await;
                }
                Ok::<_, tokengate::error::TokengateError>(())
            })
        })
        .collect();

    for outcome in join_all(workers).await {
        outcome??;
    }

    info!("Simulation complete");
    Ok(())
}

/// Split the total call count across workers, front-loading the remainder.
fn calls_for_worker(total: u32, concurrency: u32, worker: u32) -> u32 {
    total / concurrency + u32::from(worker < total % concurrency)
}

/// Stand-in for the real AI API: a short, slightly jittered delay.
async fn fake_upstream_call(worker: u32, call: u32) {
    let jitter: u64 = rand::thread_rng().gen_range(0..100);
    tokio::time::sleep(Duration::from_millis(200 + jitter)).await;
    info!(worker, call, "Upstream call completed");
}
