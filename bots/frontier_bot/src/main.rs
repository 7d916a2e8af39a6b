use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use filler_bot_utils::{
    Bot, HttpGameServer, TurnConfig, DEFAULT_MAX_RETRIES, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_RETRY_DELAY_MS, DEFAULT_TIMEOUT_MS,
};
use frontier_bot::FrontierBot;
use tracing::info;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(about = "The AI for playing the filler game")]
struct Args {
    /// Game server to connect to, e.g. "http://localhost:8080/api/"
    #[arg(long = "gameServer")]
    game_server: String,

    /// The game id to connect to
    #[arg(long = "gameId")]
    game_id: String,

    /// The player id in the game
    #[arg(long = "playerId")]
    player_id: String,

    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "info")]
    log_level: LevelFilter,

    /// Timeout for a single request, in milliseconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_MS)]
    timeout_ms: u64,

    /// How often a request that got no response is retried
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    max_retries: u32,

    /// Pause between retries, in milliseconds
    #[arg(long, default_value_t = DEFAULT_RETRY_DELAY_MS)]
    retry_delay_ms: u64,

    /// Pause between checks whether it's our turn, in milliseconds
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL_MS)]
    poll_interval_ms: u64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    initialize_logging(args.log_level);

    let mut config = TurnConfig::new(&args.game_server, &args.game_id, &args.player_id)?;
    config.timeout = Duration::from_millis(args.timeout_ms);
    config.max_retries = args.max_retries;
    config.retry_delay = Duration::from_millis(args.retry_delay_ms);
    config.poll_interval = Duration::from_millis(args.poll_interval_ms);

    // Ctrl-C ends the game loop before its next request
    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst))
            .context("Could not install the signal handler")?;
    }

    let mut server = HttpGameServer::new(&config).context("Could not create the HTTP client")?;
    info!(url = %config.game_url(), player = config.player(), "Connecting to the game server");

    let winner = FrontierBot::new()
        .run(&mut server, &config, &stop)
        .context("The game could not be finished")?;
    info!(winner, "The game has ended");
    println!("{}", winner);
    Ok(())
}

fn initialize_logging(level: LevelFilter) {
    let format = tracing_subscriber::fmt::format()
        .with_target(false)
        .compact();

    let filter = Targets::new().with_default(level);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(format)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
