//! Client side of a locally hosted game's lobby join handshake

pub mod join;
pub mod response;

pub use join::encode;
pub use response::{ResponseOutcome, HEADER_LEN};
