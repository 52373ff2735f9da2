//! # Protocol Error Types
//!
//! Everything that can go wrong while encoding, decoding or framing a message.
//! None of these are fatal for the connection that produced them: the caller
//! drops the offending message and keeps serving.

use thiserror::Error;

/// Errors raised by the stream codec and the message framing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A write did not fit in the remaining buffer capacity.
    #[error("stream overflow: need {requested} bytes, {remaining} remaining")]
    Overflow {
        /// Bytes the write needed.
        requested: usize,
        /// Bytes left in the buffer.
        remaining: usize,
    },

    /// A read ran past the end of the buffer.
    #[error("stream underflow: need {requested} bytes, {remaining} remaining")]
    Underflow {
        /// Bytes the read needed.
        requested: usize,
        /// Bytes left in the buffer.
        remaining: usize,
    },

    /// A seek targeted an offset outside the buffer.
    #[error("seek to {offset} is beyond the buffer size {size}")]
    SeekOutOfBounds {
        /// Requested offset.
        offset: usize,
        /// Buffer size.
        size: usize,
    },

    /// A string or sequence is longer than its length prefix can express.
    #[error("length {length} does not fit the {prefix_bits}-bit prefix")]
    LengthTooLong {
        /// Actual length.
        length: usize,
        /// Width of the prefix in bits.
        prefix_bits: u32,
    },

    /// A decoded string was not valid UTF-8.
    #[error("string payload is not valid UTF-8")]
    InvalidUtf8,

    /// A discriminant byte did not name any known variant.
    #[error("invalid value {value} for {field}")]
    InvalidEnum {
        /// Field being decoded.
        field: &'static str,
        /// Raw value read.
        value: u32,
    },

    /// The header declared more payload than the buffer kind allows.
    #[error("payload length {length} exceeds the maximum of {max}")]
    PayloadTooLarge {
        /// Declared length.
        length: usize,
        /// Allowed maximum.
        max: usize,
    },

    /// The bytes received do not match the length declared by the header.
    #[error("header declared {declared} payload bytes, {available} available")]
    LengthMismatch {
        /// Length from the header.
        declared: usize,
        /// Bytes actually present.
        available: usize,
    },

    /// A frame carried a different message id than the one being decoded.
    #[error("unexpected message id {actual:#06x}, expected {expected:#06x}")]
    UnexpectedMessage {
        /// Id the decoder expected.
        expected: u16,
        /// Id found in the header.
        actual: u16,
    },
}

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
