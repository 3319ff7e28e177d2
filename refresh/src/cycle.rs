//! One refresh pass across every slot

use autorefresh_proto::{encode, ResponseOutcome};
use tracing::{debug, info, warn};

use crate::{
    slot::{Slot, SlotConnector, TransportError},
    Error,
};

/// How a refresh pass ended
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Every slot was refreshed
    Completed,
    Full,
    WrongGameId,
    AlreadyStarted,
}

/// Summary of a refresh pass
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Cycle {
    pub outcome: CycleOutcome,
    /// Connections opened, including ones that failed
    pub opened: usize,
    pub joined: usize,
    /// Slots lost to transport errors
    pub failed: usize,
}

/// Refresh up to `slots` slots in order, announcing `name` to the game `game_id`.
///
/// Stops opening slots as soon as the host reports the lobby full, the match started, or the
/// game identifier wrong. Every connection opened during the pass is closed before this returns.
/// Fails only if every one of `slots` slots failed at the transport level.
pub async fn run_cycle(
    connector: &SlotConnector,
    name: &[u8],
    game_id: u8,
    slots: usize,
) -> Result<Cycle, Error> {
    let mut open = Vec::with_capacity(slots);
    let result = refresh_all(connector, name, game_id, slots, &mut open).await;
    for slot in open {
        debug!(slot = slot.index(), "close");
        slot.close().await;
    }
    result
}

async fn refresh_all(
    connector: &SlotConnector,
    name: &[u8],
    game_id: u8,
    slots: usize,
    open: &mut Vec<Slot>,
) -> Result<Cycle, Error> {
    let packet = encode(name, game_id);
    let mut cycle = Cycle {
        outcome: CycleOutcome::Completed,
        opened: 0,
        joined: 0,
        failed: 0,
    };
    let mut last_error: Option<TransportError> = None;
    for index in 0..slots {
        cycle.opened += 1;
        let outcome = match connector.refresh_slot(index, &packet).await {
            Ok((outcome, slot)) => {
                open.push(slot);
                outcome
            }
            Err(e) => {
                warn!(slot = index, game_id, "slot failed: {}", e);
                cycle.failed += 1;
                last_error = Some(e);
                continue;
            }
        };
        use ResponseOutcome::*;
        match outcome {
            Joined => {
                debug!(slot = index, game_id, "{}", outcome);
                cycle.joined += 1;
            }
            UnknownFailure(_) | UnknownResponse(_) => {
                info!(slot = index, game_id, "{}", outcome);
            }
            Full => {
                cycle.outcome = CycleOutcome::Full;
                break;
            }
            WrongGameId => {
                cycle.outcome = CycleOutcome::WrongGameId;
                break;
            }
            AlreadyStarted => {
                cycle.outcome = CycleOutcome::AlreadyStarted;
                break;
            }
        }
    }
    match last_error {
        Some(last) if cycle.failed == slots => Err(Error::AllSlotsFailed { slots, last }),
        _ => Ok(cycle),
    }
}
