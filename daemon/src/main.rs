//! repwatch: watch the representatives a wallet delegates to.

mod config;
mod file_store;
mod output;
mod shutdown;
mod sources;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;

use repwatch_monitor::{Blocklist, FullOverview, KnownEntry, RepresentativeMonitor};
use repwatch_types::RepAddress;
use repwatch_utils::{format_duration, init_logging, LogFormat};

use crate::config::DaemonConfig;
use crate::file_store::JsonFileStore;
use crate::shutdown::ShutdownController;

/// Exit code of `changes` when at least one representative should be changed.
const EXIT_CHANGES_FOUND: u8 = 2;

#[derive(Parser)]
#[command(name = "repwatch", about = "Representative delegation monitor")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "REPWATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Ledger node RPC URL.
    #[arg(long, env = "REPWATCH_NODE_URL")]
    node_url: Option<String>,

    /// Uptime provider base URL.
    #[arg(long, env = "REPWATCH_REPUTATION_URL")]
    reputation_url: Option<String>,

    /// Crawler base URL.
    #[arg(long, env = "REPWATCH_CRAWLER_URL")]
    crawler_url: Option<String>,

    /// Wallet accounts to watch (comma-separated). Replaces the file's list.
    #[arg(long = "account", env = "REPWATCH_ACCOUNTS", value_delimiter = ',')]
    accounts: Vec<String>,

    /// JSON file holding the known representative list.
    #[arg(long, env = "REPWATCH_DATA_FILE")]
    data_file: Option<PathBuf>,

    /// Log format: "human" or "json".
    #[arg(long, env = "REPWATCH_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "REPWATCH_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Classify every representative the wallet delegates to.
    Overview {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Only the representatives that warrant a change. Exits with 2 if any.
    Changes {
        #[arg(long)]
        json: bool,
    },
    /// Re-run the overview periodically until interrupted.
    Watch {
        /// Seconds between runs.
        #[arg(long, env = "REPWATCH_WATCH_INTERVAL")]
        interval_secs: Option<u64>,
    },
    /// Inspect or edit the known representative list.
    Known {
        #[command(subcommand)]
        action: KnownAction,
    },
}

#[derive(clap::Subcommand)]
enum KnownAction {
    /// Show the list, trusted first.
    List,
    /// Add or replace an entry.
    Add {
        id: String,
        name: String,
        #[arg(long)]
        trusted: bool,
        #[arg(long)]
        warn: bool,
    },
    /// Remove the entry with this id.
    Remove { id: String },
    /// Forget the stored list and go back to the defaults. Also works when
    /// the stored list is unreadable.
    Reset,
    /// Rewrite `xrb_`/`nano_` ids in the stored list to the current prefix.
    Migrate,
    /// Whether a name is already in use. Exits with 1 if not.
    Exists { name: String },
}

impl KnownAction {
    /// Actions that work on the stored list directly skip loading it, so
    /// they still run when the stored list cannot be parsed.
    fn needs_loaded_list(&self) -> bool {
        !matches!(self, Self::Reset | Self::Migrate)
    }
}

impl Cli {
    fn resolve_config(&self) -> anyhow::Result<DaemonConfig> {
        let mut config = match &self.config {
            Some(path) => DaemonConfig::from_toml_file(path)?,
            None => DaemonConfig::default(),
        };
        if let Some(url) = &self.node_url {
            config.node_url = url.clone();
        }
        if let Some(url) = &self.reputation_url {
            config.reputation_url = url.clone();
        }
        if let Some(url) = &self.crawler_url {
            config.crawler_url = url.clone();
        }
        if !self.accounts.is_empty() {
            config.accounts = self.accounts.iter().map(|a| RepAddress::new(a.trim())).collect();
        }
        if let Some(path) = &self.data_file {
            config.data_file = path.clone();
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Command::Watch {
            interval_secs: Some(secs),
        } = &self.command
        {
            config.watch_interval_secs = *secs;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    init_logging(config.log_format, &config.log_level);

    let store = JsonFileStore::open(&config.data_file)
        .with_context(|| format!("failed to open data file {}", config.data_file.display()))?;
    let sources = sources::build_sources(&config)?;
    let mut monitor = RepresentativeMonitor::new(
        sources,
        store,
        config.monitor.clone(),
        Blocklist::builtin(),
    );

    match cli.command {
        Command::Overview { json } => {
            let overview = monitor.overview().await?;
            print_overviews(&overview, json)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Changes { json } => {
            let changes = monitor.detect_changeable(None).await?;
            print_overviews(&changes, json)?;
            Ok(if changes.is_empty() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_CHANGES_FOUND)
            })
        }
        Command::Watch { .. } => {
            let interval = Duration::from_secs(config.watch_interval_secs.max(1));
            run_watch(&mut monitor, interval).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Known { action } => run_known(&mut monitor, &config, action).await,
    }
}

fn print_overviews(overviews: &[FullOverview], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(overviews)?);
    } else {
        print!("{}", output::render_overview(overviews));
    }
    Ok(())
}

/// Run change detection every `interval` until SIGINT/SIGTERM. A failed run
/// is logged and the previous results stay published.
async fn run_watch(
    monitor: &mut RepresentativeMonitor<JsonFileStore>,
    interval: Duration,
) -> anyhow::Result<()> {
    let controller = Arc::new(ShutdownController::new());
    let mut shutdown_rx = controller.subscribe();
    tokio::spawn({
        let controller = controller.clone();
        async move { controller.wait_for_signal().await }
    });

    // Report whenever the set of representatives needing a change differs
    // from the last report.
    let mut changes_rx = monitor.subscribe_changeable();
    let mut reporter_shutdown = controller.subscribe();
    let reporter = tokio::spawn(async move {
        let mut last_ids: Option<Vec<RepAddress>> = None;
        loop {
            tokio::select! {
                changed = changes_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let changes = changes_rx.borrow_and_update().clone();
                    let ids: Vec<_> = changes.iter().map(|c| c.id.clone()).collect();
                    if last_ids.as_ref() != Some(&ids) {
                        print!("{}", output::render_overview(&changes));
                        last_ids = Some(ids);
                    }
                }
                _ = reporter_shutdown.recv() => break,
            }
        }
    });

    tracing::info!(interval = %format_duration(interval), "watching representatives");
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match monitor.detect_changeable(None).await {
                    Ok(changes) => tracing::info!(
                        changeable = changes.len(),
                        next_in = %format_duration(interval),
                        "watch cycle complete"
                    ),
                    Err(e) => tracing::warn!(error = %e, "overview failed, keeping previous results"),
                }
            }
            _ = shutdown_rx.recv() => break,
        }
    }

    controller.shutdown();
    if let Err(e) = reporter.await {
        tracing::warn!(error = %e, "change reporter task failed");
    }
    tracing::info!("watch stopped");
    Ok(())
}

async fn run_known(
    monitor: &mut RepresentativeMonitor<JsonFileStore>,
    config: &DaemonConfig,
    action: KnownAction,
) -> anyhow::Result<ExitCode> {
    if action.needs_loaded_list() {
        monitor.load_known_list().await?;
    }
    let prefix = &config.monitor.address_prefix;

    match action {
        KnownAction::List => {
            print!("{}", output::render_known(&monitor.known_list().sorted_by_priority()));
        }
        KnownAction::Add {
            id,
            name,
            trusted,
            warn,
        } => {
            let id = RepAddress::new(id).normalize(prefix);
            if !id.is_valid(prefix) {
                bail!("'{id}' is not a valid {prefix} address");
            }
            let known = monitor.known_list();
            let name_taken_elsewhere = known.name_exists(&name)
                && !known
                    .entries()
                    .iter()
                    .any(|e| e.has_name(&name) && e.id == id);
            if name_taken_elsewhere {
                bail!("the name '{name}' is already used by another representative");
            }
            monitor
                .known_list_mut()
                .save(KnownEntry::new(id.clone(), name).trusted(trusted).warn(warn))?;
            println!("saved {id}");
        }
        KnownAction::Remove { id } => {
            let id = RepAddress::new(id).normalize(prefix);
            if monitor.known_list_mut().delete(id.as_str())? {
                println!("removed {id}");
            } else {
                println!("{id} is not in the known list");
            }
        }
        KnownAction::Reset => {
            monitor.reset()?;
            println!("known list reset to defaults");
        }
        KnownAction::Migrate => {
            if monitor.known_list_mut().migrate_legacy_prefixes()? {
                println!("stored ids now use the {prefix} prefix");
            } else {
                println!("no stored known list");
            }
        }
        KnownAction::Exists { name } => {
            let exists = monitor.known_list().name_exists(&name);
            println!("{}", if exists { "yes" } else { "no" });
            if !exists {
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
