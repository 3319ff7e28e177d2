//! Keep a locally hosted lobby visible by repeatedly announcing simulated joiners until the match
//! starts.

use std::{net::SocketAddr, time::Duration};

pub use autorefresh_proto as proto;
use thiserror::Error;
use tracing::{info, warn};

pub mod cycle;
pub mod slot;
#[cfg(test)]
mod testing;

pub use cycle::{run_cycle, Cycle, CycleOutcome};
pub use slot::{Slot, SlotConnector, TransportError};

#[derive(Debug, Error)]
pub enum Error {
    #[error("all {slots} slots failed, last error: {last}")]
    AllSlotsFailed { slots: usize, last: TransportError },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Where the game is hosted
    pub address: SocketAddr,
    /// Simulated joiners per cycle
    pub slots: usize,
    /// Name the joiners appear under, color codes included
    pub name: Vec<u8>,
    /// Pause after a cycle that didn't need a new game identifier
    pub interval: Duration,
    pub connect_timeout: Duration,
    /// How long to wait for the host to answer a join request
    pub read_timeout: Duration,
    /// First game identifier to try
    pub initial_game_id: u8,
}

impl Config {
    pub fn new(address: SocketAddr) -> Self {
        Self {
            address,
            slots: 12,
            name: b"|rAutoRefresh".to_vec(),
            interval: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(5),
            initial_game_id: 0,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum State {
    /// Refreshing, guessing that the lobby is identified by `game_id`
    Running { game_id: u8 },
    /// The host started the match
    Done,
}

impl State {
    /// The state following a cycle that ended with `outcome`, and how long to wait before the next
    /// cycle
    pub fn next(self, outcome: CycleOutcome, interval: Duration) -> (State, Option<Duration>) {
        let game_id = match self {
            State::Running { game_id } => game_id,
            State::Done => return (State::Done, None),
        };
        match outcome {
            CycleOutcome::Completed | CycleOutcome::Full => (self, Some(interval)),
            CycleOutcome::WrongGameId => (
                State::Running {
                    game_id: game_id.wrapping_add(1),
                },
                None,
            ),
            CycleOutcome::AlreadyStarted => (State::Done, None),
        }
    }
}

/// Result of a refresh session that ended with the match starting
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Finished {
    pub cycles: u64,
    /// The game identifier the host answered to
    pub game_id: u8,
}

/// Refreshes a lobby cycle after cycle
pub struct RefreshLoop {
    config: Config,
    connector: SlotConnector,
    state: State,
    cycles: u64,
}

impl RefreshLoop {
    pub fn new(config: Config) -> Self {
        let connector =
            SlotConnector::new(config.address, config.connect_timeout, config.read_timeout);
        Self {
            state: State::Running {
                game_id: config.initial_game_id,
            },
            config,
            connector,
            cycles: 0,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run cycles until the host starts the match.
    ///
    /// If the lobby is never found, the game identifier is probed forever.
    pub async fn run(&mut self) -> Result<Finished, Error> {
        let mut last_game_id = self.config.initial_game_id;
        loop {
            let game_id = match self.state {
                State::Running { game_id } => game_id,
                State::Done => {
                    return Ok(Finished {
                        cycles: self.cycles,
                        game_id: last_game_id,
                    })
                }
            };
            last_game_id = game_id;
            let cycle =
                run_cycle(&self.connector, &self.config.name, game_id, self.config.slots).await?;
            self.cycles += 1;
            let (next, delay) = self.state.next(cycle.outcome, self.config.interval);
            match (cycle.outcome, next) {
                (CycleOutcome::WrongGameId, State::Running { game_id: next_id }) => {
                    info!(game_id, "wrong game id, trying {}", next_id);
                    if next_id == self.config.initial_game_id {
                        warn!("every game id has been tried without finding the lobby");
                    }
                }
                (CycleOutcome::AlreadyStarted, _) => info!(game_id, "game started"),
                (outcome, _) => info!(
                    game_id,
                    joined = cycle.joined,
                    failed = cycle.failed,
                    "cycle {}: {:?}",
                    self.cycles,
                    outcome
                ),
            }
            self.state = next;
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
        }
    }
}
