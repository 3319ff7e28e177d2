use std::{net::ToSocketAddrs, time::Duration};

use anyhow::{anyhow, ensure, Context, Result};
use autorefresh::{Config, RefreshLoop};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(name = "autorefresh")]
struct Opt {
    /// Hosted game to keep refreshed
    #[clap(default_value = "localhost:6112")]
    game: String,
    /// Simulated joiners per refresh
    #[clap(short = 's', long = "slots", default_value = "12")]
    slots: usize,
    /// Name joiners appear under; may include color codes, and is cut to 15 bytes
    #[clap(short = 'n', long = "name", default_value = "|rAutoRefresh")]
    name: String,
    /// Seconds between refreshes
    #[clap(short = 'i', long = "interval", default_value = "10")]
    interval: u64,
    /// Milliseconds to wait for a connection to the game
    #[clap(long = "connect-timeout", default_value = "5000")]
    connect_timeout: u64,
    /// Milliseconds to wait for the game to answer a join
    #[clap(long = "read-timeout", default_value = "5000")]
    read_timeout: u64,
    /// Game identifier to start probing from
    #[clap(long = "game-id", default_value = "0")]
    game_id: u8,
}

fn main() {
    let opt = Opt::parse();
    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .init();
    let code = {
        if let Err(e) = run(opt) {
            eprintln!("ERROR: {:#}", e);
            1
        } else {
            0
        }
    };
    drop(guard);
    ::std::process::exit(code);
}

#[tokio::main(flavor = "current_thread")]
async fn run(options: Opt) -> Result<()> {
    ensure!(options.slots > 0, "at least one slot is required");
    let address = options
        .game
        .to_socket_addrs()
        .map_err(|_| anyhow!("invalid game address -- did you forget a port number?"))?
        .next()
        .map_or_else(|| Err(anyhow!("no such hostname")), Ok)?;

    let config = Config {
        slots: options.slots,
        name: options.name.into_bytes(),
        interval: Duration::from_secs(options.interval),
        connect_timeout: Duration::from_millis(options.connect_timeout),
        read_timeout: Duration::from_millis(options.read_timeout),
        initial_game_id: options.game_id,
        ..Config::new(address)
    };
    info!(%address, slots = config.slots, "refreshing");
    let finished = RefreshLoop::new(config)
        .run()
        .await
        .context("refreshing game")?;
    info!(
        cycles = finished.cycles,
        game_id = finished.game_id,
        "the hosted game has started"
    );
    Ok(())
}
