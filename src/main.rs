#![deny(
    unused_import_braces,
    unused_lifetimes,
    unreachable_pub,
    trivial_numeric_casts,
    missing_debug_implementations,
    missing_copy_implementations,
    deprecated_in_future,
    meta_variable_misuse,
    non_ascii_idents,
    rust_2018_compatibility,
    rust_2018_idioms,
    future_incompatible,
    nonstandard_style,
    clippy::all
)]
#![warn(variant_size_differences, let_underscore_drop)]

//! # RTanks Stats

pub mod cli_options;
pub mod config;
pub mod logger;
pub mod render;
pub mod setup;

use crate::{
    cli_options::{
        CliOptions,
        CompareOptions,
        OnlineOptions,
        PlayerOptions,
        Subcommand,
    },
    config::Config,
    render::{
        ComparisonReport,
        ComparisonView,
        PlayerView,
        RankStyle,
    },
};
use anyhow::{
    bail,
    Context as _,
};
use std::{
    sync::Arc,
    time::{
        Duration,
        Instant,
    },
};
use tokio::runtime::Builder as RuntimeBuilder;
use tracing::{
    info,
    warn,
};
use tracing_appender::non_blocking::WorkerGuard;

const TOKIO_RT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Data from the setup function
struct SetupData {
    tokio_rt: tokio::runtime::Runtime,
    config: Arc<Config>,
    worker_guard: WorkerGuard,
}

/// Pre-main setup
fn setup(cli_options: &CliOptions) -> anyhow::Result<SetupData> {
    eprintln!("starting tokio runtime...");
    let tokio_rt = RuntimeBuilder::new_multi_thread()
        .enable_all()
        .thread_name("rtanks-stats-tokio-worker")
        .build()
        .context("failed to start tokio runtime")?;

    let config = setup::load_config(&cli_options.config)
        .map(Arc::new)
        .context("failed to load config")?;

    // Everything past here is assumed to need tokio
    let _enter_guard = tokio_rt.handle().enter();

    eprintln!("setting up logger...");
    let worker_guard = logger::setup(&config).context("failed to initialize logger")?;

    eprintln!();
    Ok(SetupData {
        tokio_rt,
        config,
        worker_guard,
    })
}

/// The main entry.
///
/// Sets up the program and calls `real_main`.
/// This allows more things to drop correctly.
/// This also calls setup operations like loading config and setting up the tokio runtime,
/// logging errors to the stderr instead of the loggers, which are not initialized yet.
fn main() -> anyhow::Result<()> {
    // This line MUST run first.
    // It is needed to exit early if the options are invalid,
    // and this will NOT run destructors if it does so.
    let cli_options: CliOptions = argh::from_env();

    let setup_data = setup(&cli_options)?;
    real_main(cli_options.subcommand, setup_data)
}

/// The actual entry point
fn real_main(subcommand: Subcommand, setup_data: SetupData) -> anyhow::Result<()> {
    let _enter_guard = setup_data.tokio_rt.enter();
    let ret = setup_data
        .tokio_rt
        .block_on(tokio::spawn(async_main(setup_data.config, subcommand)));

    let shutdown_start = Instant::now();
    info!(
        "shutting down tokio runtime (shutdown timeout is {:?})...",
        TOKIO_RT_SHUTDOWN_TIMEOUT
    );
    setup_data
        .tokio_rt
        .shutdown_timeout(TOKIO_RT_SHUTDOWN_TIMEOUT);
    info!("shutdown tokio runtime in {:?}", shutdown_start.elapsed());

    // Logging no longer reliable past this point
    drop(setup_data.worker_guard);

    ret.context("failed to join main task")?
}

/// The async entry
async fn async_main(config: Arc<Config>, subcommand: Subcommand) -> anyhow::Result<()> {
    let client = rtanks::Client::with_options(config.client_options());
    let style = RankStyle::from_config(&config);

    let ret = match subcommand {
        Subcommand::Player(options) => player(&client, &style, options).await,
        Subcommand::Compare(options) => compare(&client, &style, options).await,
        Subcommand::Online(options) => online(&client, options).await,
    };

    info!("closing client...");
    client.close();

    ret
}

async fn player(
    client: &rtanks::Client,
    style: &RankStyle,
    options: PlayerOptions,
) -> anyhow::Result<()> {
    let username = options.username.trim();
    if username.is_empty() {
        bail!("missing username");
    }

    let record = match client.get_player_data(username).await {
        Some(record) => record,
        None => bail!("player `{username}` was not found"),
    };

    if options.json {
        let json = serde_json::to_string_pretty(&record).context("failed to serialize record")?;
        println!("{json}");
        return Ok(());
    }

    // Only profile records have a page worth linking to
    let profile_url = if record.is_degraded() {
        None
    } else {
        client
            .profile_url(&record.username)
            .map_err(|error| warn!("{error}"))
            .ok()
    };

    let view = PlayerView {
        record: &record,
        profile_url: profile_url.as_ref(),
        style,
        expanded: options.expanded,
    };
    print!("{view}");

    Ok(())
}

async fn compare(
    client: &rtanks::Client,
    style: &RankStyle,
    options: CompareOptions,
) -> anyhow::Result<()> {
    let player1 = options.player1.trim();
    let player2 = options.player2.trim();
    if player1.is_empty() || player2.is_empty() {
        bail!("two usernames are needed");
    }

    if player1.to_lowercase() == player2.to_lowercase() {
        bail!("cannot compare `{player1}` with themselves");
    }

    let (record1, record2) = tokio::join!(
        client.get_player_data(player1),
        client.get_player_data(player2)
    );

    let (record1, record2) = match (record1, record2) {
        (Some(record1), Some(record2)) => (record1, record2),
        (None, Some(_)) => bail!("player `{player1}` was not found"),
        (Some(_), None) => bail!("player `{player2}` was not found"),
        (None, None) => bail!("neither `{player1}` nor `{player2}` were found"),
    };

    let equipment = rtanks::compare_equipment_quality(&record1.equipment, &record2.equipment);

    if options.json {
        let report = ComparisonReport {
            player1: &record1,
            player2: &record2,
            equipment: &equipment,
        };
        let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
        println!("{json}");
        return Ok(());
    }

    let view = ComparisonView {
        player1: &record1,
        player2: &record2,
        equipment: &equipment,
        style,
    };
    print!("{view}");

    Ok(())
}

async fn online(client: &rtanks::Client, options: OnlineOptions) -> anyhow::Result<()> {
    let period = match options.watch {
        Some(0) => bail!("the watch period must be greater than 0"),
        Some(secs) => Duration::from_secs(secs),
        None => {
            let count = client.get_online_players_count().await;
            println!("Online players: {count}");
            return Ok(());
        }
    };

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            result = &mut ctrl_c => {
                if let Err(error) = result.context("failed to set ctrl-c handler") {
                    warn!("{error:?}");
                }
                info!("stopping...");
                return Ok(());
            }
            _ = interval.tick() => {
                let count = client.get_online_players_count().await;
                println!("Online players: {count}");
            }
        }
    }
}
