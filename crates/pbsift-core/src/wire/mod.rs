//! Low-level protobuf wire format parsing.
//!
//! ## Wire Format Overview
//!
//! Each protobuf field is encoded as:
//! - A varint "tag" containing the field number and wire type
//! - The field data (format depends on wire type)
//!
//! Wire types:
//! - 0: VARINT (int32, int64, uint32, uint64, sint32, sint64, bool, enum)
//! - 1: FIXED64 (fixed64, sfixed64, double)
//! - 2: LENGTH_DELIMITED (string, bytes, embedded messages, packed repeated fields)
//! - 3, 4: START_GROUP / END_GROUP (deprecated, never decoded)
//! - 5: FIXED32 (fixed32, sfixed32, float)

mod cursor;
mod varint;

pub use cursor::Cursor;
pub use varint::{decode_signed_varint, decode_varint32};

/// Longest varint encoding of a 64-bit value
pub const MAX_VARINT_BYTES: usize = 10;

/// Varint groups that contribute to a 32-bit value
pub const MAX_VARINT32_BYTES: usize = 5;

/// Bits of the tag holding the wire type
pub const TAG_TYPE_BITS: u32 = 3;

const TAG_TYPE_MASK: u32 = (1 << TAG_TYPE_BITS) - 1;

/// Protobuf wire types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    /// Variable-length integer
    Varint = 0,
    /// 64-bit fixed-width
    Fixed64 = 1,
    /// Length-delimited (strings, bytes, embedded messages)
    LengthDelimited = 2,
    /// Start group (deprecated)
    StartGroup = 3,
    /// End group (deprecated)
    EndGroup = 4,
    /// 32-bit fixed-width
    Fixed32 = 5,
}

impl WireType {
    /// Maps the low three tag bits to a wire type
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(WireType::Varint),
            1 => Some(WireType::Fixed64),
            2 => Some(WireType::LengthDelimited),
            3 => Some(WireType::StartGroup),
            4 => Some(WireType::EndGroup),
            5 => Some(WireType::Fixed32),
            _ => None,
        }
    }

    /// True for wire types whose payload is a number
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            WireType::Varint | WireType::Fixed64 | WireType::Fixed32
        )
    }
}

/// A decoded field tag: `field_number << 3 | wire_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag(u32);

impl Tag {
    /// Wraps a raw tag value
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw tag value as read from the stream
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Field number carried by the tag
    pub fn field_number(self) -> u32 {
        self.0 >> TAG_TYPE_BITS
    }

    /// The low three bits of the tag
    pub fn wire_type_bits(self) -> u8 {
        (self.0 & TAG_TYPE_MASK) as u8
    }

    /// Wire type carried by the tag, if the bits name one
    pub fn wire_type(self) -> Option<WireType> {
        WireType::from_bits(self.wire_type_bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_type_conversion() {
        assert_eq!(WireType::from_bits(0), Some(WireType::Varint));
        assert_eq!(WireType::from_bits(1), Some(WireType::Fixed64));
        assert_eq!(WireType::from_bits(2), Some(WireType::LengthDelimited));
        assert_eq!(WireType::from_bits(5), Some(WireType::Fixed32));
        assert_eq!(WireType::from_bits(6), None);
        assert_eq!(WireType::from_bits(7), None);
    }

    #[test]
    fn test_is_numeric() {
        assert!(WireType::Varint.is_numeric());
        assert!(WireType::Fixed64.is_numeric());
        assert!(WireType::Fixed32.is_numeric());
        assert!(!WireType::LengthDelimited.is_numeric());
        assert!(!WireType::StartGroup.is_numeric());
    }

    #[test]
    fn test_tag_split() {
        // field 2, length-delimited
        let tag = Tag::new(0x12);
        assert_eq!(tag.field_number(), 2);
        assert_eq!(tag.wire_type(), Some(WireType::LengthDelimited));

        // 'a' read as a tag: field 12, fixed64
        let tag = Tag::new(u32::from(b'a'));
        assert_eq!(tag.field_number(), 12);
        assert_eq!(tag.wire_type(), Some(WireType::Fixed64));

        let tag = Tag::new(0x0F);
        assert_eq!(tag.wire_type_bits(), 7);
        assert_eq!(tag.wire_type(), None);
    }
}
