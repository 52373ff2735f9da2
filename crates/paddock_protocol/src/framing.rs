//! # Message Framing
//!
//! Every message on the wire is a 4-byte magic followed by its payload.
//!
//! ```text
//! ┌───────────────────┬────────────────────┬────────────────────────────┐
//! │ id (u16, LE)      │ length (u16, LE)   │ payload (length bytes,     │
//! │                   │                    │ XOR-scrambled)             │
//! └───────────────────┴────────────────────┴────────────────────────────┘
//! ```
//!
//! The payload is scrambled with a repeating 4-byte key indexed by
//! `position mod 4`. Scrambling twice is the identity.

use crate::error::{ProtocolError, ProtocolResult};
use crate::stream::{Decode, Encode, StreamReader, StreamWriter};

/// Size of the magic header in bytes.
pub const MAGIC_SIZE: usize = 4;

/// Size of an ordinary message buffer, header included.
pub const BUFFER_SIZE: usize = 4096;

/// Largest payload an ordinary buffer can carry.
pub const MAX_PAYLOAD_SIZE: usize = BUFFER_SIZE - MAGIC_SIZE;

/// Largest payload a jumbo buffer can carry.
pub const MAX_JUMBO_PAYLOAD_SIZE: usize = 16_384;

/// Repeating key applied to payload bytes.
pub const XOR_KEY: [u8; 4] = [0xCB, 0x91, 0x01, 0xA2];

/// Which payload ceiling applies to a message.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BufferKind {
    /// Ordinary messages, up to [`MAX_PAYLOAD_SIZE`].
    #[default]
    Normal,
    /// Oversized messages, up to [`MAX_JUMBO_PAYLOAD_SIZE`].
    Jumbo,
}

impl BufferKind {
    /// Largest payload allowed for this kind.
    #[must_use]
    pub const fn max_payload(self) -> usize {
        match self {
            Self::Normal => MAX_PAYLOAD_SIZE,
            Self::Jumbo => MAX_JUMBO_PAYLOAD_SIZE,
        }
    }

    /// Buffer size needed to hold a full frame of this kind.
    #[must_use]
    pub const fn frame_capacity(self) -> usize {
        self.max_payload() + MAGIC_SIZE
    }
}

/// Decoded message header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MessageMagic {
    /// Message id.
    pub id: u16,
    /// Payload length in bytes.
    pub length: u16,
}

impl MessageMagic {
    /// Creates a header.
    #[inline]
    #[must_use]
    pub const fn new(id: u16, length: u16) -> Self {
        Self { id, length }
    }
}

/// Packs a header into its 32-bit magic value.
#[inline]
#[must_use]
pub const fn encode_magic(magic: MessageMagic) -> u32 {
    (magic.id as u32) | ((magic.length as u32) << 16)
}

/// Unpacks a 32-bit magic value.
///
/// # Errors
///
/// Rejects lengths above `max_payload` instead of truncating them.
pub fn decode_magic(value: u32, max_payload: usize) -> ProtocolResult<MessageMagic> {
    let id = (value & 0xFFFF) as u16;
    let length = (value >> 16) as u16;
    if usize::from(length) > max_payload {
        return Err(ProtocolError::PayloadTooLarge {
            length: usize::from(length),
            max: max_payload,
        });
    }
    Ok(MessageMagic { id, length })
}

/// Applies the repeating XOR key.
#[derive(Clone, Copy, Debug)]
pub struct XorScrambler {
    key: [u8; 4],
}

impl XorScrambler {
    /// Scrambler with the protocol key.
    #[must_use]
    pub const fn new() -> Self {
        Self { key: XOR_KEY }
    }

    /// Scrambler with a custom key.
    #[must_use]
    pub const fn with_key(key: [u8; 4]) -> Self {
        Self { key }
    }

    /// Scrambles (or unscrambles) `bytes` in place.
    #[inline]
    pub fn apply(&self, bytes: &mut [u8]) {
        for (index, byte) in bytes.iter_mut().enumerate() {
            *byte ^= self.key[index % 4];
        }
    }
}

impl Default for XorScrambler {
    fn default() -> Self {
        Self::new()
    }
}

/// A typed message with a fixed id.
pub trait Message: Encode + Decode {
    /// Id written in the magic header.
    const ID: u16;
}

/// Encodes `message` as a complete frame into `buffer`.
///
/// A placeholder magic is written first and patched once the payload
/// length is known. Returns the total frame size.
///
/// # Errors
///
/// Fails if the payload exceeds the ceiling of `kind` or the buffer.
pub fn encode_message<M: Message>(
    message: &M,
    buffer: &mut [u8],
    kind: BufferKind,
) -> ProtocolResult<usize> {
    let mut writer = StreamWriter::new(buffer);
    writer.write(&0u32)?;
    writer.write(message)?;

    let end = writer.position();
    let length = end - MAGIC_SIZE;
    if length > kind.max_payload() {
        return Err(ProtocolError::PayloadTooLarge {
            length,
            max: kind.max_payload(),
        });
    }

    XorScrambler::new().apply(&mut writer.written_mut()[MAGIC_SIZE..]);

    // The ceiling check above keeps the length within u16.
    #[allow(clippy::cast_possible_truncation)]
    let magic = MessageMagic::new(M::ID, length as u16);
    writer.seek(0)?;
    writer.write(&encode_magic(magic))?;
    writer.seek(end)?;
    Ok(end)
}

/// Reads and validates the magic at the start of `frame`.
///
/// # Errors
///
/// Fails on a short buffer, an oversized length, or a payload shorter
/// than declared.
pub fn peek_magic(frame: &[u8], kind: BufferKind) -> ProtocolResult<MessageMagic> {
    let mut reader = StreamReader::new(frame);
    let magic = decode_magic(reader.read::<u32>()?, kind.max_payload())?;
    let available = reader.remaining();
    if usize::from(magic.length) > available {
        return Err(ProtocolError::LengthMismatch {
            declared: usize::from(magic.length),
            available,
        });
    }
    Ok(magic)
}

/// Decodes a complete frame as message `M`.
///
/// # Errors
///
/// Fails on framing errors, a foreign message id, or a payload that does
/// not decode exactly.
pub fn decode_message<M: Message>(frame: &[u8], kind: BufferKind) -> ProtocolResult<M> {
    let magic = peek_magic(frame, kind)?;
    if magic.id != M::ID {
        return Err(ProtocolError::UnexpectedMessage {
            expected: M::ID,
            actual: magic.id,
        });
    }

    let length = usize::from(magic.length);
    let mut payload = frame[MAGIC_SIZE..MAGIC_SIZE + length].to_vec();
    XorScrambler::new().apply(&mut payload);

    let mut reader = StreamReader::new(&payload);
    let message = reader.read::<M>()?;
    if reader.remaining() != 0 {
        return Err(ProtocolError::LengthMismatch {
            declared: length,
            available: reader.position(),
        });
    }
    Ok(message)
}

/// Iterates over consecutive frames in a receive buffer.
///
/// Yields the header and the still-scrambled payload of each complete
/// frame. Stops at the first incomplete frame; [`FrameSplitter::consumed`]
/// tells the caller how many bytes can be discarded.
pub struct FrameSplitter<'a> {
    buffer: &'a [u8],
    offset: usize,
    kind: BufferKind,
}

impl<'a> FrameSplitter<'a> {
    /// Creates a splitter over `buffer`.
    #[must_use]
    pub const fn new(buffer: &'a [u8], kind: BufferKind) -> Self {
        Self {
            buffer,
            offset: 0,
            kind,
        }
    }

    /// Bytes belonging to frames already yielded.
    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.offset
    }
}

/// Splits a receive buffer into complete frames.
#[must_use]
pub const fn split_frames(buffer: &[u8], kind: BufferKind) -> FrameSplitter<'_> {
    FrameSplitter::new(buffer, kind)
}

impl<'a> Iterator for FrameSplitter<'a> {
    type Item = ProtocolResult<(MessageMagic, &'a [u8])>;

    fn next(&mut self) -> Option<Self::Item> {
        let buffer: &'a [u8] = self.buffer;
        let rest = &buffer[self.offset..];
        if rest.len() < MAGIC_SIZE {
            return None;
        }
        match peek_magic(rest, self.kind) {
            Ok(magic) => {
                let end = MAGIC_SIZE + usize::from(magic.length);
                let payload = &rest[MAGIC_SIZE..end];
                self.offset += end;
                Some(Ok((magic, payload)))
            }
            // Wait for the rest of the frame.
            Err(ProtocolError::LengthMismatch { .. }) => None,
            Err(err) => {
                tracing::warn!("dropping receive buffer: {err}");
                self.offset = self.buffer.len();
                Some(Err(err))
            }
        }
    }
}
