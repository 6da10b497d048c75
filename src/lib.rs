//! Diagnostic probe for the room router websocket protocol.
//!
//! Opens one websocket to the router as either a `client` or a `server`
//! party, pings on a fixed interval, pushes the fixed room packets when
//! emulating the server, and reports whatever comes back.

use std::fmt;

mod client;
mod endpoint;
mod error;
mod packets;
mod parse;
mod probe;

pub use client::{accept_key, encode_frame, write_message, Client, MessageReader, MAX_PAYLOAD};
pub use endpoint::{Endpoint, Role, DEFAULT_HOST, DEFAULT_PORT};
pub use error::{ProbeError, Result};
pub use packets::{Packet, ROOM_LIST, ROOM_LIST_PACKET, ROOM_WAVE, ROOM_WAVE_PACKET};
pub use probe::{log_event, run, run_with, Cancellation, ProbeEvent, ProbeSettings};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Ping(Vec<u8>),
    Pong(Vec<u8>),
    Text(String),
    Binary(Vec<u8>),
    Close(Option<(u16, String)>),
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Message::Text(text) => f.write_str(text),
            Message::Binary(data) => write!(f, "{:02X?}", data),
            Message::Ping(data) => write!(f, "PING {:02X?}", data),
            Message::Pong(data) => write!(f, "PONG {:02X?}", data),
            Message::Close(None) => f.write_str("CLOSE"),
            Message::Close(Some((code, reason))) => write!(f, "CLOSE {} {}", code, reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_displays_as_hex_bytes() {
        let message = Message::Binary(vec![0xEF, 0xBE, 0x0A]);
        assert_eq!(message.to_string(), "[EF, BE, 0A]");
        assert_eq!(Message::Text("hi".into()).to_string(), "hi");
        assert_eq!(Message::Pong(Vec::new()).to_string(), "PONG []");
    }
}
