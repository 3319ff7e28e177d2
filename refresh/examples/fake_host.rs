//! Stand-in for a hosted lobby, for trying out a refresher locally

use std::{
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use autorefresh::proto::{join, HEADER_LEN};
use clap::Parser;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

#[derive(Parser, Debug)]
#[clap(name = "fake_host")]
struct Opt {
    /// Address to listen on
    #[clap(long = "listen", default_value = "127.0.0.1:6112")]
    listen: SocketAddr,
    /// Game identifier the lobby answers to
    #[clap(long = "game-id", default_value = "3")]
    game_id: u8,
    /// Open slots in the lobby
    #[clap(long = "capacity", default_value = "8")]
    capacity: usize,
    /// Seconds until the match starts
    #[clap(long = "start-after", default_value = "30")]
    start_after: u64,
}

fn main() {
    let opt = Opt::parse();
    let code = {
        if let Err(e) = run(opt) {
            eprintln!("ERROR: {:#}", e);
            1
        } else {
            0
        }
    };
    ::std::process::exit(code);
}

struct Lobby {
    game_id: u8,
    capacity: usize,
    start: Instant,
    present: AtomicUsize,
}

#[tokio::main(flavor = "current_thread")]
async fn run(options: Opt) -> Result<()> {
    let listener = TcpListener::bind(options.listen)
        .await
        .context("binding listener")?;
    println!("hosting game {} on {}", options.game_id, options.listen);
    let lobby = Arc::new(Lobby {
        game_id: options.game_id,
        capacity: options.capacity,
        start: Instant::now() + Duration::from_secs(options.start_after),
        present: AtomicUsize::new(0),
    });
    loop {
        let (stream, peer) = listener.accept().await?;
        let lobby = lobby.clone();
        tokio::spawn(async move {
            if let Err(e) = handle(&lobby, stream).await {
                println!("{}: {:#}", peer, e);
            }
        });
    }
}

async fn handle(lobby: &Lobby, mut stream: TcpStream) -> Result<()> {
    let mut packet = vec![0; join::LENGTH_OFFSET + 1];
    stream.read_exact(&mut packet).await.context("reading header")?;
    let len = usize::from(packet[join::LENGTH_OFFSET]).max(packet.len());
    packet.resize(len, 0);
    stream
        .read_exact(&mut packet[join::LENGTH_OFFSET + 1..])
        .await
        .context("reading request")?;
    let name = packet.get(19..len.saturating_sub(19)).unwrap_or_default();

    let reason = if packet.get(join::GAME_ID_OFFSET) != Some(&lobby.game_id) {
        Some(7)
    } else if Instant::now() >= lobby.start {
        Some(10)
    } else if lobby.present.load(Ordering::Relaxed) >= lobby.capacity {
        Some(9)
    } else {
        None
    };
    let mut reply = [0xF7; HEADER_LEN];
    match reason {
        Some(reason) => {
            reply[1..5].copy_from_slice(&[5, 8, 0, reason]);
            stream.write_all(&reply).await?;
            return Ok(());
        }
        None => {
            reply[1] = 4;
            stream.write_all(&reply).await?;
        }
    }

    let present = lobby.present.fetch_add(1, Ordering::Relaxed) + 1;
    println!("{} joined ({} present)", String::from_utf8_lossy(name), present);
    let mut buf = [0; 64];
    while stream.read(&mut buf).await.map_or(false, |n| n > 0) {}
    lobby.present.fetch_sub(1, Ordering::Relaxed);
    Ok(())
}
