//! Error types for the pbsift-core library.
//!
//! Decoding failures are described by [`DecodeError`]. They are ordinary
//! values: a failed sub-decode keeps its [`DecodeError`] as the reason the
//! payload stayed opaque, and a failed top-level decode records one in the
//! [`DecodeReport`](crate::DecodeReport). The only error a decode run
//! returns through [`Error`] is a failing output sink.

use thiserror::Error;

/// Result type alias for pbsift operations
pub type Result<T> = std::result::Result<T, Error>;

/// Result type alias for wire-level decoding steps
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// A wire-format violation found while decoding
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    /// No terminating byte within the varint window
    #[error("truncated varint at offset {offset}")]
    TruncatedVarint {
        /// Byte offset where the varint starts
        offset: usize,
    },

    /// Fewer bytes than a fixed-width value needs
    #[error("truncated fixed-width value at offset {offset}: need {width} bytes, have {available}")]
    TruncatedFixedWidth {
        /// Byte offset where the value starts
        offset: usize,
        /// Width of the value in bytes (4 or 8)
        width: usize,
        /// Bytes left in the cursor
        available: usize,
    },

    /// A length prefix announces more bytes than remain
    #[error("length {length} at offset {offset} exceeds the {available} remaining bytes")]
    LengthExceedsBuffer {
        /// Byte offset of the payload start
        offset: usize,
        /// Announced payload length
        length: u64,
        /// Bytes left in the cursor
        available: usize,
    },

    /// Field number zero or above the configured ceiling
    #[error("invalid field number {number} at offset {offset}: must be between 1 and {max}")]
    InvalidFieldNumber {
        /// Byte offset of the tag
        offset: usize,
        /// The decoded field number
        number: u32,
        /// Configured ceiling
        max: u32,
    },

    /// Group or unknown wire type
    #[error("unsupported wire type {wire_type} at offset {offset}")]
    UnsupportedWireType {
        /// Byte offset of the tag
        offset: usize,
        /// The low three bits of the tag
        wire_type: u8,
    },

    /// Nesting reached the configured depth cap
    #[error("nesting depth {depth} at offset {offset} reached the limit of {max}")]
    DepthLimitExceeded {
        /// Byte offset of the payload start
        offset: usize,
        /// Depth of the field holding the payload
        depth: usize,
        /// Configured cap
        max: usize,
    },
}

impl DecodeError {
    /// Creates a new truncated varint error
    pub fn truncated_varint(offset: usize) -> Self {
        Self::TruncatedVarint { offset }
    }

    /// Creates a new truncated fixed-width error
    pub fn truncated_fixed_width(offset: usize, width: usize, available: usize) -> Self {
        Self::TruncatedFixedWidth {
            offset,
            width,
            available,
        }
    }

    /// Byte offset in the input where the violation was found
    pub fn offset(&self) -> usize {
        match self {
            Self::TruncatedVarint { offset }
            | Self::TruncatedFixedWidth { offset, .. }
            | Self::LengthExceedsBuffer { offset, .. }
            | Self::InvalidFieldNumber { offset, .. }
            | Self::UnsupportedWireType { offset, .. }
            | Self::DepthLimitExceeded { offset, .. } => *offset,
        }
    }
}

/// Error type for a whole decode run
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The input stopped decoding before its end
    #[error("decoding stopped early: {0}")]
    Decode(#[from] DecodeError),

    /// Failed to write decoded output
    #[error("failed to write decoded output: {0}")]
    Output(#[from] std::io::Error),
}

impl Error {
    /// Returns true if the error only cuts the output short
    ///
    /// Everything decoded before a [`Error::Decode`] has already gone to the
    /// sink; an [`Error::Output`] means the sink itself is broken.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}
