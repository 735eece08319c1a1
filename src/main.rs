use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use colored::*;

use btleash::core::{paths, EventLog, FileStore, FsStore, MonitorConfig};
use btleash::monitor::{
    AppLifecycleState, LifecycleController, MonitorContext, RunSettings, SharedState, UiSurface,
    DEFAULT_POLL_INTERVAL, RSSI_THRESHOLD_DBM,
};
use btleash::radio::{ConsoleSink, SimulatedRadio};
use btleash::ui::ForegroundUi;

fn main() -> Result<()> {
    btleash::init_logging();

    let matches = Command::new("btleash")
        .version(env!("CARGO_PKG_VERSION"))
        .about("BLE peripheral leash: monitors link state and signal strength")
        .subcommand(
            Command::new("run")
                .about("Run the leash monitor (default)")
                .allow_negative_numbers(true)
                .arg(
                    Arg::new("interval")
                        .long("interval")
                        .value_name("MS")
                        .help("Polling interval in milliseconds")
                        .value_parser(clap::value_parser!(u64).range(100..))
                        .default_value("1000"),
                )
                .arg(
                    Arg::new("threshold")
                        .long("threshold")
                        .value_name("DBM")
                        .help("Weak-signal threshold in dBm")
                        .value_parser(clap::value_parser!(i8).range(-126..=0))
                        .default_value("-70"),
                )
                .arg(
                    Arg::new("headless")
                        .long("headless")
                        .help("Run without a UI, monitoring in the background")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("log")
                .about("Show the event log")
                .arg(
                    Arg::new("tail")
                        .long("tail")
                        .value_name("N")
                        .help("Only show the last N lines")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("clear")
                        .long("clear")
                        .help("Truncate the event log")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("run", sub)) => cmd_run(sub),
        Some(("log", sub)) => cmd_log(sub),
        _ => cmd_run_defaults(),
    }
}

fn cmd_run(matches: &ArgMatches) -> Result<()> {
    let settings = RunSettings {
        poll_interval: matches
            .get_one::<u64>("interval")
            .map(|ms| Duration::from_millis(*ms))
            .unwrap_or(DEFAULT_POLL_INTERVAL),
        threshold_dbm: matches
            .get_one::<i8>("threshold")
            .copied()
            .unwrap_or(RSSI_THRESHOLD_DBM),
        headless: matches.get_flag("headless"),
    };
    run_monitor(settings)
}

fn cmd_run_defaults() -> Result<()> {
    run_monitor(RunSettings::default())
}

fn run_monitor(settings: RunSettings) -> Result<()> {
    let store: Arc<dyn FileStore> = Arc::new(FsStore::new());
    let config_path = paths::config_path()?;
    let config = MonitorConfig::load_from(store.as_ref(), &config_path);

    let event_log = Arc::new(EventLog::new(store.clone(), paths::log_path()?));

    let radio = Arc::new(SimulatedRadio::new());
    radio.start().context("Failed to start radio")?;

    let initial = if settings.headless {
        AppLifecycleState::Hidden
    } else {
        AppLifecycleState::Foreground
    };
    let state = Arc::new(SharedState::new(config.enabled, initial));

    let ctx = MonitorContext {
        radio: radio.clone(),
        signal: radio.clone(),
        sink: Arc::new(ConsoleSink),
        store,
        event_log,
        config_path,
        instance_path: paths::instance_path()?,
        settings,
        state,
    };

    let ui: Option<Box<dyn UiSurface>> = if settings.headless {
        None
    } else {
        Some(Box::new(ForegroundUi::init()?))
    };

    let result = LifecycleController::new(ctx).run(ui);
    radio.shutdown();
    result?;
    Ok(())
}

fn cmd_log(matches: &ArgMatches) -> Result<()> {
    let store: Arc<dyn FileStore> = Arc::new(FsStore::new());
    let event_log = EventLog::new(store, paths::log_path()?);

    if matches.get_flag("clear") {
        event_log.clear()?;
        println!("{}", "Event log cleared".green());
        return Ok(());
    }

    let text = event_log.read_all()?;
    if text.is_empty() {
        println!("{}", "Event log is empty".dimmed());
        return Ok(());
    }

    let lines: Vec<&str> = text.lines().collect();
    let start = matches
        .get_one::<usize>("tail")
        .map(|n| lines.len().saturating_sub(*n))
        .unwrap_or(0);

    for line in &lines[start..] {
        if line.contains("BT=Connected") {
            println!("{}", line.green());
        } else if line.contains("BT=Advertising") {
            println!("{}", line.yellow());
        } else {
            println!("{}", line.red());
        }
    }
    Ok(())
}
