mod commands;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stashcast_core::{
    load_config, resolve_feed_urls, validate_config, Config, FsMediaDirectory, IngestRunner,
    RetentionEngine, RetentionReport, RunOptions, RunReport, Scheduler,
};

use commands::{Cli, Commands, RunArgs};

/// Configuration file looked up in the media directory when `--config` is not given.
const DEFAULT_CONFIG_FILE: &str = ".stashcast.toml";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Logs go to stderr so JSON reports on stdout stay clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = load(&cli)?;

    match cli.command.unwrap_or(Commands::Run(RunArgs::default())) {
        Commands::Run(args) => run_once(config, args).await,
        Commands::Watch { no_retention } => watch(config, no_retention).await,
        Commands::Prune { dry_run, json } => prune(&config, dry_run, json),
        Commands::Feeds => {
            for url in resolve_feed_urls(&config.subscriptions)? {
                println!("{}", url);
            }
            Ok(())
        }
    }
}

/// Where to read the configuration from, and whether it must exist.
fn config_location(cli: &Cli) -> (PathBuf, bool) {
    match &cli.config {
        Some(path) => (path.clone(), true),
        None => {
            let dir = cli.dir.as_deref().unwrap_or_else(|| Path::new("."));
            (dir.join(DEFAULT_CONFIG_FILE), false)
        }
    }
}

fn load(cli: &Cli) -> Result<Config> {
    let (path, required) = config_location(cli);

    let config = if required || path.exists() {
        info!("Loading configuration from {:?}", path);
        load_config(&path).with_context(|| format!("Failed to load config from {:?}", path))?
    } else {
        warn!("No configuration at {:?}, using defaults", path);
        Config::default()
    };

    let config = match &cli.dir {
        Some(dir) => config.with_media_dir(dir),
        None => config,
    };

    validate_config(&config).context("Configuration validation failed")?;
    info!(
        media_dir = %config.media.dir.display(),
        subscriptions = config.subscriptions.len(),
        "Configuration loaded"
    );
    Ok(config)
}

async fn run_once(config: Config, args: RunArgs) -> Result<()> {
    if !args.dry_run {
        std::fs::create_dir_all(&config.media.dir).with_context(|| {
            format!("Failed to create media directory {:?}", config.media.dir)
        })?;
    }

    let runner = IngestRunner::from_config(config).context("Failed to set up ingestion")?;
    let report = runner
        .run(RunOptions {
            dry_run: args.dry_run,
            skip_retention: args.no_retention,
        })
        .await
        .context("Ingestion run failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_run_summary(&report);
    }
    Ok(())
}

async fn watch(config: Config, no_retention: bool) -> Result<()> {
    std::fs::create_dir_all(&config.media.dir)
        .with_context(|| format!("Failed to create media directory {:?}", config.media.dir))?;

    let schedule = config.schedule.clone();
    let runner = IngestRunner::from_config(config).context("Failed to set up ingestion")?;
    runner
        .validate()
        .await
        .context("Downloader is not usable")?;

    let scheduler = Scheduler::new(Arc::new(runner), schedule).with_options(RunOptions {
        dry_run: false,
        skip_retention: no_retention,
    });
    scheduler.start();

    shutdown_signal().await;
    info!("Shutdown signal received");

    scheduler.stop().await;
    Ok(())
}

fn prune(config: &Config, dry_run: bool, json: bool) -> Result<()> {
    let policy = config.retention_policy();
    if policy.is_unbounded() {
        warn!("No retention limits configured, nothing to do");
    }

    let media = FsMediaDirectory::from_config(config);
    let report = RetentionEngine::new(Arc::new(media), policy)
        .with_dry_run(dry_run)
        .enforce(SystemTime::now())
        .context("Retention failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_retention_summary(&report);
    }
    Ok(())
}

fn print_run_summary(report: &RunReport) {
    let verb = if report.dry_run { "to download" } else { "downloaded" };
    println!(
        "{} feeds ({} failed), {} entries: {} {}, {} already seen, {} failed",
        report.feeds,
        report.feed_failures.len(),
        report.entries,
        report.downloaded.len(),
        verb,
        report.skipped,
        report.download_failures.len(),
    );
    for failure in &report.feed_failures {
        println!("  feed failed: {} ({})", failure.url, failure.reason);
    }
    for failure in &report.download_failures {
        println!("  download failed: {} ({})", failure.identifier, failure.reason);
    }
    if let Some(retention) = &report.retention {
        print_retention_summary(retention);
    }
}

fn print_retention_summary(report: &RetentionReport) {
    let verb = if report.dry_run { "to delete" } else { "deleted" };
    println!(
        "{} files {}, {} failed, {} files ({} bytes) remaining",
        report.removed_count(),
        verb,
        report.failure_count(),
        report.remaining_files,
        report.remaining_bytes,
    );
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
