//! Gridwatch CLI entry point.
//!
//! One-shot run: load config, fetch one reading, evaluate thresholds,
//! dispatch any alert, exit. Exit code 0 on success or intentional early
//! exit, 1 on any configuration, fetch, or delivery failure.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use gridwatch::config::Config;
use gridwatch::dispatch::Dispatcher;
use gridwatch::notify::{Notify, NtfyNotifier};
use gridwatch::policy::ThresholdSet;
use gridwatch::source::FrequencyApi;

/// Gridwatch — one-shot EU grid frequency check with ntfy alerting.
#[derive(Parser)]
#[command(name = "gridwatch", version, about)]
struct Cli {
    /// Log level filter when RUST_LOG is unset.
    #[arg(short = 'l', long, default_value = "info")]
    loglevel: String,

    /// Send a test notification to verify the ntfy configuration, then exit.
    #[arg(short = 't', long)]
    test_ntfy: bool,

    /// Print the active thresholds, then exit.
    #[arg(long)]
    print_thresholds: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let start = Instant::now();
    let cli = Cli::parse();

    // A local .env supplies overrides in deployments without a TOML file.
    dotenvy::dotenv().ok();

    init_logging(&cli.loglevel);

    let code = match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    };
    debug!(runtime_secs = start.elapsed().as_secs_f64(), "run complete");
    code
}

/// Wire up the run; all exit-code decisions stay in `main`.
async fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    let thresholds = config.validate().context("invalid configuration")?;

    if cli.print_thresholds {
        print_thresholds(&thresholds);
        return Ok(());
    }

    let notifier = if config.ntfy.enabled {
        let notifier = NtfyNotifier::new(&config.ntfy).context("failed to build ntfy client")?;
        debug!(topic_url = %notifier.topic_url(), "using ntfy for notifications");
        Some(notifier)
    } else {
        warn!("ntfy is disabled");
        None
    };

    if cli.test_ntfy {
        let Some(notifier) = &notifier else {
            anyhow::bail!("cannot test the ntfy configuration while ntfy is disabled");
        };
        info!("testing ntfy configuration");
        if notifier.test_config().await {
            info!("ntfy configuration works");
            return Ok(());
        }
        anyhow::bail!("ntfy configuration test failed");
    }

    let api = FrequencyApi::new(&config.source).context("failed to build frequency API client")?;
    let reading = api
        .fetch()
        .await
        .context("could not get frequency and timestamp from the API")?;
    info!(
        frequency = reading.frequency,
        timestamp = %reading.timestamp,
        "reading received"
    );

    let decision = thresholds.evaluate(&reading);
    let dispatcher = Dispatcher::new(notifier.as_ref().map(|n| n as &dyn Notify));
    dispatcher
        .dispatch(decision.as_ref())
        .await
        .context("alert delivery failed")?;

    Ok(())
}

/// Initialise tracing output to stderr. `RUST_LOG` wins over the CLI flag.
fn init_logging(loglevel: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(loglevel));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Print the active threshold set to stdout.
fn print_thresholds(thresholds: &ThresholdSet) {
    println!(
        "warning band:  {} Hz .. {} Hz",
        thresholds.warning_min, thresholds.warning_max
    );
    if thresholds.has_critical_band() {
        println!(
            "critical band: {} Hz .. {} Hz",
            thresholds.critical_min, thresholds.critical_max
        );
    } else {
        println!("critical band: (none, two-band profile)");
    }
}
