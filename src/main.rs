// Guest Quota CLI - Main Entry Point
//
// Inspects and drives the guest usage ledger stored on this machine:
// - Show remaining free tries per feature
// - Check or register a gated action
// - Clear stored usage

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use guest_quota::config::Config;
use guest_quota::quota::{
    FileStore, GatedFeature, GuestUsageTracker, Notification, Notifier, UsageSnapshot, Viewer,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info, Level};

/// Exit code when a gated action is blocked by an exhausted quota
const EXIT_BLOCKED: u8 = 3;

/// guest-quota: daily free-use tracking for anonymous visitors
#[derive(Parser, Debug)]
#[command(name = "guest-quota")]
#[command(version)]
#[command(about = "Track daily free uses of gated features for guest visitors", long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the usage ledger
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Act as a signed-in viewer (exempt from guest quotas)
    #[arg(long, global = true)]
    signed_in: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show remaining free uses for every feature
    Status {
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check whether a feature may be used (does not consume a use)
    Check {
        /// Feature identifier (search, menu-scrape, ai-analysis, comparison)
        feature: GatedFeature,
    },
    /// Record one successful use of a feature
    Register {
        /// Feature identifier
        feature: GatedFeature,
    },
    /// Check access and, if allowed, record one use
    Use {
        /// Feature identifier
        feature: GatedFeature,
    },
    /// Remove all stored usage
    Clear,
}

/// Prints notifications for the terminal user
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: &Notification) {
        match &notification.action {
            Some(action) => println!(
                "{} [{}: {}]",
                notification.message,
                action.label,
                action.target.path()
            ),
            None => println!("{}", notification.message),
        }
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(Config::config_path);

    // Warnings raised while reading overrides go to stderr before the
    // configured subscriber exists.
    let bootstrap = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(Level::WARN)
        .finish();
    let mut config =
        tracing::subscriber::with_default(bootstrap, || Config::load_from_path(&config_path))?;
    if let Some(dir) = &args.data_dir {
        config.storage.data_dir = Some(dir.clone());
    }

    guest_quota::logging::init(&config.logging, args.verbose)?;

    if config_path.exists() {
        info!("Loaded configuration from {:?}", config_path);
    } else {
        debug!("Config file not found at {:?}, using defaults", config_path);
    }

    let store = FileStore::new(config.data_dir());
    debug!("Using usage ledger in {:?}", store.dir());
    let data_dir = store.dir().to_path_buf();

    let tracker = GuestUsageTracker::new(config.quota.clone(), store).with_notifier(ConsoleNotifier);
    if args.signed_in {
        tracker.set_viewer(Viewer::Authenticated);
    }

    match args.command {
        Commands::Status { json } => {
            let snapshot = tracker.all_usage();
            if json {
                let out = serde_json::to_string_pretty(&snapshot)
                    .context("Failed to encode usage snapshot")?;
                println!("{}", out);
            } else {
                print_status(&snapshot);
            }
        }
        Commands::Check { feature } => {
            if !tracker.check_feature_access(feature) {
                return Ok(ExitCode::from(EXIT_BLOCKED));
            }
            println!(
                "{}: allowed ({} remaining today)",
                feature,
                tracker.remaining_uses(feature)
            );
        }
        Commands::Register { feature } => {
            tracker.register_usage(feature);
            println!(
                "{}: registered ({} remaining today)",
                feature,
                tracker.remaining_uses(feature)
            );
        }
        Commands::Use { feature } => {
            if !tracker.check_feature_access(feature) {
                return Ok(ExitCode::from(EXIT_BLOCKED));
            }
            tracker.register_usage(feature);
            println!(
                "{}: used ({} remaining today)",
                feature,
                tracker.remaining_uses(feature)
            );
        }
        Commands::Clear => {
            tracker.clear();
            info!("Usage ledger cleared in {:?}", data_dir);
            println!("Cleared guest usage");
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_status(snapshot: &UsageSnapshot) {
    println!("Guest usage for {} ({:?})", snapshot.date, snapshot.viewer);
    for (feature, usage) in &snapshot.features {
        println!(
            "  {:<22} {}/{} remaining",
            feature.display_name(),
            usage.remaining,
            usage.limit
        );
    }
}
