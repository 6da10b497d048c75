//! Fixed binary payloads sent by the server role.
//!
//! These are opaque fixtures captured from the room router protocol. They are
//! sent byte for byte and never decoded here.

use crate::endpoint::Role;

/// Announces the rooms the emulated server hosts. Sent once after connecting.
pub const ROOM_LIST_PACKET: [u8; 25] = [
    0xEF, 0xBE, 0xED, 0xFE, 0x5E, 0x00, 0x00, 0x00, 0x00, 0x0F, 0x00, 0x00, 0x80, 0x0C, 0x00,
    0x00, 0x00, 0x1F, 0x05, 0x00, 0x01, 0x00, 0x00, 0x01, 0x03,
];

/// Room data pushed on every cycle.
pub const ROOM_WAVE_PACKET: [u8; 22] = [
    0xEF, 0xBE, 0xED, 0xFE, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x80, 0x00, 0x00,
    0x00, 0x00, 0xDA, 0x02, 0x00, 0xAA, 0xBB,
];

/// A labelled binary payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet {
    pub label: &'static str,
    pub bytes: &'static [u8],
}

pub const ROOM_LIST: Packet = Packet {
    label: "Room List",
    bytes: &ROOM_LIST_PACKET,
};

pub const ROOM_WAVE: Packet = Packet {
    label: "Room Wave",
    bytes: &ROOM_WAVE_PACKET,
};

impl Role {
    /// Packets sent once, right after the upgrade and before the first cycle.
    pub fn opening_packets(self) -> &'static [Packet] {
        match self {
            Role::Client => &[],
            Role::Server => &[ROOM_LIST],
        }
    }

    /// Packet sent after the ping on every cycle, if any.
    pub fn cycle_packet(self) -> Option<Packet> {
        match self {
            Role::Client => None,
            Role::Server => Some(ROOM_WAVE),
        }
    }
}
