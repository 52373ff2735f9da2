//! # PADDOCK Protocol - The Wire Contract
//!
//! Binary codec shared by every message the game server exchanges with
//! its clients.
//!
//! ## Architecture
//!
//! - **Stream**: typed little-endian writer/reader over a fixed buffer
//! - **Framing**: 4-byte magic (id + length), XOR-scrambled payload
//! - **Structures**: wire layouts of the persistent game entities
//! - **Messages**: server notifications built from those layouts
//!
//! ```text
//! entity ──Encode──► StreamWriter ──encode_message──► [magic|scrambled payload]
//!                                                             │
//! entity ◄──Decode── StreamReader ◄──decode_message───────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use paddock_protocol::{encode_message, BufferKind, HorseList, BUFFER_SIZE};
//!
//! let mut buffer = [0u8; BUFFER_SIZE];
//! let size = encode_message(&HorseList::default(), &mut buffer, BufferKind::Normal)?;
//! socket.write_all(&buffer[..size])?;
//! ```

#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod framing;
pub mod messages;
pub mod stream;
pub mod structures;

pub use error::{ProtocolError, ProtocolResult};
pub use framing::{
    decode_magic, decode_message, encode_magic, encode_message, peek_magic, split_frames,
    BufferKind, FrameSplitter, Message, MessageMagic, XorScrambler, BUFFER_SIZE, MAGIC_SIZE,
    MAX_JUMBO_PAYLOAD_SIZE, MAX_PAYLOAD_SIZE, XOR_KEY,
};
pub use messages::{
    CharacterProfile, HorseList, Inventory, KeyboardOptionsNotify, MailList, StoragePage,
};
pub use stream::{Decode, Encode, LengthPrefix, StreamReader, StreamWriter};
