//! Host replies to a join request

use std::fmt;

/// Number of leading reply bytes needed to classify a reply
pub const HEADER_LEN: usize = 8;

/// What the host made of a join request
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ResponseOutcome {
    /// The join was accepted.
    ///
    /// Best-effort reading: nothing documents byte 1 == 4 as an acceptance, it's merely what the
    /// host sends when a join appears to go through.
    Joined,
    /// Every slot in the lobby is taken
    Full,
    /// The host has started the match
    AlreadyStarted,
    /// No lobby with the requested game identifier
    WrongGameId,
    /// A join refusal with an unrecognized reason code
    UnknownFailure(u8),
    /// Anything else
    UnknownResponse([u8; HEADER_LEN]),
}

impl ResponseOutcome {
    /// Classify the first [`HEADER_LEN`] bytes of a reply
    pub fn classify(header: &[u8; HEADER_LEN]) -> Self {
        use ResponseOutcome::*;
        match *header {
            [_, 5, 8, _, 9, ..] => Full,
            [_, 5, 8, _, 10, ..] => AlreadyStarted,
            [_, 5, 8, _, 7, ..] => WrongGameId,
            [_, 5, 8, _, code, ..] => UnknownFailure(code),
            [_, 4, ..] => Joined,
            _ => UnknownResponse(*header),
        }
    }

    /// Whether this outcome ends a refresh cycle
    pub fn is_terminal(&self) -> bool {
        use ResponseOutcome::*;
        matches!(self, Full | AlreadyStarted | WrongGameId)
    }
}

impl fmt::Display for ResponseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ResponseOutcome::*;
        match *self {
            Joined => f.write_str("ok"),
            Full => f.write_str("full"),
            AlreadyStarted => f.write_str("already started"),
            WrongGameId => f.write_str("wrong game id"),
            UnknownFailure(code) => write!(f, "failed to join - reason {} unknown", code),
            UnknownResponse(raw) => write!(f, "unknown response: {:02x?}", raw),
        }
    }
}
