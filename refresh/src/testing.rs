//! Scripted stand-in for a hosting game

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

/// How the host answers one connection
pub enum Reply {
    /// Send a full reply header and wait for the joiner to leave
    Header([u8; 8]),
    /// Send these bytes, then hang up
    Short(Vec<u8>),
    /// Hang up without replying
    Hangup,
    /// Never reply; wait for the joiner to leave
    Silent,
}

pub fn refusal(reason: u8) -> Reply {
    Reply::Header([0xF7, 5, 8, 0, reason, 0, 0, 0])
}

pub fn joined() -> Reply {
    Reply::Header([0xF7, 4, 0, 0, 0, 0, 0, 0])
}

#[derive(Debug, Default, Clone)]
pub struct Stats {
    pub accepted: usize,
    pub closed: usize,
    /// Join requests in the order they arrived
    pub packets: Vec<Vec<u8>>,
}

type Script = Arc<dyn Fn(usize, &[u8]) -> Reply + Send + Sync>;

pub struct Host {
    address: SocketAddr,
    stats: Arc<Mutex<Stats>>,
}

impl Host {
    /// Listen on a fresh local port, answering the `n`th connection's join request `packet` with
    /// `script(n, packet)`
    pub async fn spawn<F>(script: F) -> Self
    where
        F: Fn(usize, &[u8]) -> Reply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let stats = Arc::new(Mutex::new(Stats::default()));
        let script: Script = Arc::new(script);
        tokio::spawn({
            let stats = stats.clone();
            async move {
                while let Ok((stream, _)) = listener.accept().await {
                    let n = {
                        let mut stats = stats.lock().unwrap();
                        stats.accepted += 1;
                        stats.accepted - 1
                    };
                    tokio::spawn(serve(stream, n, script.clone(), stats.clone()));
                }
            }
        });
        Self { address, stats }
    }

    /// An address nothing is listening on
    pub async fn unused_address() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    pub fn stats(&self) -> Stats {
        self.stats.lock().unwrap().clone()
    }

    pub async fn wait_accepted(&self, n: usize) {
        self.wait(|s| s.accepted >= n).await
    }

    /// Wait until `n` connections have been closed
    pub async fn wait_closed(&self, n: usize) {
        self.wait(|s| s.closed >= n).await
    }

    async fn wait(&self, f: impl Fn(&Stats) -> bool) {
        for _ in 0..500 {
            if f(&self.stats.lock().unwrap()) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("host never reached expected state: {:?}", self.stats());
    }
}

async fn serve(mut stream: TcpStream, n: usize, script: Script, stats: Arc<Mutex<Stats>>) {
    if let Some(packet) = read_packet(&mut stream).await {
        stats.lock().unwrap().packets.push(packet.clone());
        match script(n, &packet) {
            Reply::Header(header) => {
                let _ = stream.write_all(&header).await;
            }
            Reply::Short(bytes) => {
                let _ = stream.write_all(&bytes).await;
                drop(stream);
                stats.lock().unwrap().closed += 1;
                return;
            }
            Reply::Hangup => {
                drop(stream);
                stats.lock().unwrap().closed += 1;
                return;
            }
            Reply::Silent => {}
        }
    }
    let mut buf = [0; 64];
    loop {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
    }
    stats.lock().unwrap().closed += 1;
}

async fn read_packet(stream: &mut TcpStream) -> Option<Vec<u8>> {
    let mut packet = vec![0; 3];
    stream.read_exact(&mut packet).await.ok()?;
    let len = usize::from(packet[2]).max(3);
    packet.resize(len, 0);
    stream.read_exact(&mut packet[3..]).await.ok()?;
    Some(packet)
}
