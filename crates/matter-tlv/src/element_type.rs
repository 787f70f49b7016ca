//! TLV element type codes (bits 4..0 of the control octet).

/// One of the 25 element types a TLV element can carry.
///
/// The type alone determines the payload's shape and width; no other field
/// participates in sizing. Codes `0x19..=0x1F` are reserved and never
/// appear as a valid [`ElementType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ElementType {
    /// Signed integer, 1-byte little-endian two's complement.
    SignedInt1 = 0x00,
    /// Signed integer, 2-byte little-endian two's complement.
    SignedInt2 = 0x01,
    /// Signed integer, 4-byte little-endian two's complement.
    SignedInt4 = 0x02,
    /// Signed integer, 8-byte little-endian two's complement.
    SignedInt8 = 0x03,
    /// Unsigned integer, 1-byte little-endian.
    UnsignedInt1 = 0x04,
    /// Unsigned integer, 2-byte little-endian.
    UnsignedInt2 = 0x05,
    /// Unsigned integer, 4-byte little-endian.
    UnsignedInt4 = 0x06,
    /// Unsigned integer, 8-byte little-endian.
    UnsignedInt8 = 0x07,
    /// Boolean `false`, no payload.
    BooleanFalse = 0x08,
    /// Boolean `true`, no payload.
    BooleanTrue = 0x09,
    /// IEEE-754 single precision, little-endian.
    Float32 = 0x0A,
    /// IEEE-754 double precision, little-endian.
    Float64 = 0x0B,
    /// UTF-8 string with a 1-byte little-endian length prefix.
    Utf8String1 = 0x0C,
    /// UTF-8 string with a 2-byte little-endian length prefix.
    Utf8String2 = 0x0D,
    /// UTF-8 string with a 4-byte little-endian length prefix.
    Utf8String4 = 0x0E,
    /// UTF-8 string with an 8-byte little-endian length prefix.
    Utf8String8 = 0x0F,
    /// Octet string with a 1-byte little-endian length prefix.
    OctetString1 = 0x10,
    /// Octet string with a 2-byte little-endian length prefix.
    OctetString2 = 0x11,
    /// Octet string with a 4-byte little-endian length prefix.
    OctetString4 = 0x12,
    /// Octet string with an 8-byte little-endian length prefix.
    OctetString8 = 0x13,
    /// `Null`, no payload.
    Null = 0x14,
    /// Structure container opener, no payload.
    Structure = 0x15,
    /// Array container opener, no payload.
    Array = 0x16,
    /// List container opener, no payload.
    List = 0x17,
    /// Container terminator, no payload. Must carry an anonymous tag.
    EndOfContainer = 0x18,
}

impl ElementType {
    /// Decode a 5-bit element type code.
    ///
    /// # Errors
    ///
    /// Returns `None` for the reserved range `0x19..=0x1F` or any code
    /// `>= 0x20` (which cannot occur given a correctly masked control
    /// octet, but is rejected defensively).
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0x00 => Self::SignedInt1,
            0x01 => Self::SignedInt2,
            0x02 => Self::SignedInt4,
            0x03 => Self::SignedInt8,
            0x04 => Self::UnsignedInt1,
            0x05 => Self::UnsignedInt2,
            0x06 => Self::UnsignedInt4,
            0x07 => Self::UnsignedInt8,
            0x08 => Self::BooleanFalse,
            0x09 => Self::BooleanTrue,
            0x0A => Self::Float32,
            0x0B => Self::Float64,
            0x0C => Self::Utf8String1,
            0x0D => Self::Utf8String2,
            0x0E => Self::Utf8String4,
            0x0F => Self::Utf8String8,
            0x10 => Self::OctetString1,
            0x11 => Self::OctetString2,
            0x12 => Self::OctetString4,
            0x13 => Self::OctetString8,
            0x14 => Self::Null,
            0x15 => Self::Structure,
            0x16 => Self::Array,
            0x17 => Self::List,
            0x18 => Self::EndOfContainer,
            _ => return None,
        })
    }

    #[must_use]
    pub(crate) fn code(self) -> u8 {
        self as u8
    }

    /// `true` for `Structure`, `Array`, and `List`.
    #[must_use]
    pub fn is_container_start(self) -> bool {
        matches!(self, Self::Structure | Self::Array | Self::List)
    }

    /// Width in bytes of a fixed-size integer/float payload, if this type
    /// is one.
    #[must_use]
    pub(crate) fn fixed_payload_len(self) -> Option<usize> {
        match self {
            Self::SignedInt1 | Self::UnsignedInt1 => Some(1),
            Self::SignedInt2 | Self::UnsignedInt2 => Some(2),
            Self::SignedInt4 | Self::UnsignedInt4 | Self::Float32 => Some(4),
            Self::SignedInt8 | Self::UnsignedInt8 | Self::Float64 => Some(8),
            _ => None,
        }
    }

    /// Width in bytes of the length prefix, for string/octet types.
    #[must_use]
    pub(crate) fn length_prefix_len(self) -> Option<usize> {
        match self {
            Self::Utf8String1 | Self::OctetString1 => Some(1),
            Self::Utf8String2 | Self::OctetString2 => Some(2),
            Self::Utf8String4 | Self::OctetString4 => Some(4),
            Self::Utf8String8 | Self::OctetString8 => Some(8),
            _ => None,
        }
    }
}
