//! Field decoding and the nested-message heuristic.
//!
//! Without a schema, a length-delimited payload may be a string, raw bytes,
//! or an embedded message. [`FieldDecoder`] always tries the message reading
//! first and commits to it only if the payload decodes into valid fields with
//! nothing left over. Any violation keeps the payload as opaque bytes.
//!
//! ## Heuristic
//!
//! 1. Decode child fields from a cursor bounded to the payload
//! 2. Reject on the first error: bad field number, group or unknown wire
//!    type, truncated varint or fixed-width value, or a length running past
//!    the payload
//! 3. Keep the children only if the payload is fully consumed
//!
//! The field-number ceiling ([`MAX_FIELD_NUMBER`](crate::MAX_FIELD_NUMBER)
//! by default) is what makes step 2 reject most non-protobuf data, since
//! text and binary blobs rarely read as a run of small field numbers.

use crate::error::{DecodeError, DecodeResult};
use crate::wire::{Cursor, WireType};
use crate::{MAX_FIELD_NUMBER, ROOT_LABEL};
use std::ops::Range;
use tracing::{debug, trace};

/// Configuration for decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Highest field number accepted as valid
    pub max_field_number: u32,
    /// Depth at which sub-decoding stops being attempted (None = unlimited)
    pub max_depth: Option<usize>,
    /// Label at the start of every printed path
    pub root_label: String,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_field_number: MAX_FIELD_NUMBER,
            max_depth: None,
            root_label: ROOT_LABEL.to_string(),
        }
    }
}

impl DecoderConfig {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the field-number ceiling
    pub fn max_field_number(mut self, max: u32) -> Self {
        self.max_field_number = max;
        self
    }

    /// Caps nesting depth for sub-decoding
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Sets the root label for printed paths
    pub fn root_label(mut self, label: impl Into<String>) -> Self {
        self.root_label = label.into();
        self
    }
}

/// Payload of a decoded field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload<'a> {
    /// Value of a varint, fixed64 or fixed32 field
    Number(i64),
    /// Length-delimited payload kept as opaque bytes
    Bytes {
        /// The payload bytes
        raw: &'a [u8],
        /// Why the payload was not read as a message (None when empty)
        rejection: Option<DecodeError>,
    },
    /// Length-delimited payload that decoded completely into fields
    Message {
        /// The payload bytes
        raw: &'a [u8],
        /// Child fields, never empty
        children: Vec<Field<'a>>,
    },
}

/// One decoded wire-format field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field<'a> {
    /// Raw tag value
    pub tag: u32,
    /// Wire type from the tag
    pub wire_type: WireType,
    /// Field number from the tag
    pub field_number: u32,
    /// Nesting depth, 0 for top-level fields
    pub depth: usize,
    /// Byte offset of the tag in the input
    pub offset: usize,
    /// Decoded payload
    pub payload: Payload<'a>,
}

impl<'a> Field<'a> {
    /// Child fields; empty unless the payload decoded as a message
    pub fn children(&self) -> &[Field<'a>] {
        match &self.payload {
            Payload::Message { children, .. } => children,
            _ => &[],
        }
    }

    /// True if the field has no children and is printed as a line
    pub fn is_leaf(&self) -> bool {
        !matches!(self.payload, Payload::Message { .. })
    }

    /// Numeric value, for varint and fixed-width fields
    pub fn as_number(&self) -> Option<i64> {
        match self.payload {
            Payload::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Raw payload bytes, for length-delimited fields
    pub fn raw_bytes(&self) -> Option<&'a [u8]> {
        match self.payload {
            Payload::Bytes { raw, .. } | Payload::Message { raw, .. } => Some(raw),
            Payload::Number(_) => None,
        }
    }

    /// Why this field's payload stayed opaque, if it was rejected
    pub fn rejection(&self) -> Option<&DecodeError> {
        match &self.payload {
            Payload::Bytes { rejection, .. } => rejection.as_ref(),
            _ => None,
        }
    }
}

/// Decodes fields and sub-decodes length-delimited payloads
#[derive(Debug, Clone, Default)]
pub struct FieldDecoder {
    config: DecoderConfig,
}

impl FieldDecoder {
    /// Creates a new field decoder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new field decoder with custom configuration
    pub fn with_config(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// Returns the active configuration
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode one field at `depth` from the cursor.
    ///
    /// On error the cursor may have advanced past the tag; callers stop
    /// reading from it.
    pub fn decode_field<'a>(
        &self,
        cursor: &mut Cursor<'a>,
        depth: usize,
    ) -> DecodeResult<Field<'a>> {
        let offset = cursor.position();
        let tag = cursor.read_tag()?;

        let field_number = tag.field_number();
        if field_number == 0 || field_number > self.config.max_field_number {
            return Err(DecodeError::InvalidFieldNumber {
                offset,
                number: field_number,
                max: self.config.max_field_number,
            });
        }

        let unsupported = || DecodeError::UnsupportedWireType {
            offset,
            wire_type: tag.wire_type_bits(),
        };
        let wire_type = tag.wire_type().ok_or_else(unsupported)?;

        let payload = match wire_type {
            WireType::Varint => Payload::Number(cursor.read_signed_varint()?),
            WireType::Fixed64 => Payload::Number(cursor.read_fixed64()?),
            WireType::Fixed32 => Payload::Number(cursor.read_fixed32()?),
            WireType::LengthDelimited => self.decode_length_delimited(cursor, depth)?,
            WireType::StartGroup | WireType::EndGroup => return Err(unsupported()),
        };

        trace!(
            "Decoded field {} ({:?}) at offset {}, depth {}",
            field_number,
            wire_type,
            offset,
            depth
        );

        Ok(Field {
            tag: tag.raw(),
            wire_type,
            field_number,
            depth,
            offset,
            payload,
        })
    }

    fn decode_length_delimited<'a>(
        &self,
        cursor: &mut Cursor<'a>,
        depth: usize,
    ) -> DecodeResult<Payload<'a>> {
        let length = cursor.read_length()?;
        let start = cursor.position();
        let available = cursor.size();

        let raw = usize::try_from(length)
            .ok()
            .and_then(|len| cursor.take(len))
            .ok_or(DecodeError::LengthExceedsBuffer {
                offset: start,
                length: u64::from(length),
                available,
            })?;
        let range = start..start + raw.len();

        if raw.is_empty() {
            return Ok(Payload::Bytes {
                raw,
                rejection: None,
            });
        }

        if let Some(max) = self.config.max_depth {
            if depth >= max {
                trace!("Not sub-decoding payload at offset {}: depth {}", start, depth);
                return Ok(Payload::Bytes {
                    raw,
                    rejection: Some(DecodeError::DepthLimitExceeded {
                        offset: start,
                        depth,
                        max,
                    }),
                });
            }
        }

        match self.sub_decode(cursor.buffer(), range, depth + 1) {
            Ok(children) => Ok(Payload::Message { raw, children }),
            Err(e) => {
                debug!(
                    "Keeping {} bytes at offset {} as opaque: {}",
                    raw.len(),
                    start,
                    e
                );
                Ok(Payload::Bytes {
                    raw,
                    rejection: Some(e),
                })
            }
        }
    }

    /// Decode `range` of `data` as a sequence of fields at `depth`.
    ///
    /// Succeeds only if the whole range decodes into valid fields. The first
    /// error is returned and everything collected so far is dropped.
    pub fn sub_decode<'a>(
        &self,
        data: &'a [u8],
        range: Range<usize>,
        depth: usize,
    ) -> DecodeResult<Vec<Field<'a>>> {
        let mut cursor = Cursor::with_range(data, range);
        let mut children = Vec::new();

        while !cursor.is_exhausted() {
            children.push(self.decode_field(&mut cursor, depth)?);
        }

        Ok(children)
    }
}
