//! Join request sent by a would-be player

/// Longest name the host will display, counted in bytes including color codes
pub const MAX_NAME_LEN: usize = 15;

/// Offset of the packet's own length
pub const LENGTH_OFFSET: usize = 2;

/// Offset of the game identifier (the low byte of the host counter)
pub const GAME_ID_OFFSET: usize = 4;

const HEADER: [u8; 19] = [
    0xF7, 0x1E, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xE4, 0x17, 0x00,
    0x00, 0x00, 0x00,
];

const TRAILER: [u8; 19] = [
    0x00, 0x01, 0x00, 0x02, 0x00, 0x17, 0xE0, 0x7F, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00,
];

/// Build the join request announcing `name` to the game identified by `game_id`.
///
/// `name` is cut to its first [`MAX_NAME_LEN`] bytes; color codes such as `|r` count towards the
/// limit and are passed through untouched.
pub fn encode(name: &[u8], game_id: u8) -> Vec<u8> {
    let name = &name[..name.len().min(MAX_NAME_LEN)];
    let mut packet = Vec::with_capacity(HEADER.len() + name.len() + TRAILER.len());
    packet.extend_from_slice(&HEADER);
    packet[GAME_ID_OFFSET] = game_id;
    packet.extend_from_slice(name);
    packet.extend_from_slice(&TRAILER);
    // Can't overflow: at most 19 + 15 + 19 bytes
    packet[LENGTH_OFFSET] = packet.len() as u8;
    packet
}
