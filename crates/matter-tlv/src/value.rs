//! The polymorphic TLV element payload, modeled as a closed sum type
//! rather than several mutually exclusive pointer fields.

/// A decoded (or about-to-be-encoded) TLV element payload.
///
/// Cross-type accessors (`as_unsigned`, `as_bytes`, ...) return `None` when
/// the value is a different variant; they never perform an implicit
/// conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum TlvElementValue {
    /// A signed integer, sign-extended into 64 bits regardless of the wire
    /// width it was encoded with.
    Signed(i64),
    /// An unsigned integer, zero-extended into 64 bits regardless of the
    /// wire width it was encoded with.
    Unsigned(u64),
    /// A boolean.
    Bool(bool),
    /// An IEEE-754 single-precision float.
    Float32(f32),
    /// An IEEE-754 double-precision float.
    Float64(f64),
    /// A UTF-8 string, decoded into an owned buffer.
    Utf8(String),
    /// An octet string, decoded into an owned buffer.
    Bytes(Vec<u8>),
    /// The `Null` element.
    Null,
    /// A `Structure` container opener.
    StructureStart,
    /// An `Array` container opener.
    ArrayStart,
    /// A `List` container opener.
    ListStart,
}

impl TlvElementValue {
    /// The value as a signed integer, narrowed to `i64`, if this is
    /// [`TlvElementValue::Signed`].
    #[must_use]
    pub fn as_signed(&self) -> Option<i64> {
        match self {
            Self::Signed(v) => Some(*v),
            _ => None,
        }
    }

    /// The value as an unsigned integer, if this is
    /// [`TlvElementValue::Unsigned`].
    #[must_use]
    pub fn as_unsigned(&self) -> Option<u64> {
        match self {
            Self::Unsigned(v) => Some(*v),
            _ => None,
        }
    }

    /// The value narrowed to `u16`, if this is [`TlvElementValue::Unsigned`]
    /// and fits without truncation. A stored value wider than 16 bits
    /// returns `None` here even though `as_unsigned` would still return it,
    /// so callers can tell "absent" apart from "present but out of range".
    #[must_use]
    pub fn as_u16(&self) -> Option<u16> {
        self.as_unsigned().and_then(|v| u16::try_from(v).ok())
    }

    /// The value narrowed to `u32`, if this is [`TlvElementValue::Unsigned`]
    /// and fits without truncation. See [`TlvElementValue::as_u16`].
    #[must_use]
    pub fn as_u32(&self) -> Option<u32> {
        self.as_unsigned().and_then(|v| u32::try_from(v).ok())
    }

    /// The value as a bool, if this is [`TlvElementValue::Bool`].
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// The value as a UTF-8 string slice, if this is
    /// [`TlvElementValue::Utf8`].
    #[must_use]
    pub fn as_utf8(&self) -> Option<&str> {
        match self {
            Self::Utf8(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// The value as an octet-string slice, if this is
    /// [`TlvElementValue::Bytes`].
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// `true` for [`TlvElementValue::StructureStart`],
    /// [`TlvElementValue::ArrayStart`], and [`TlvElementValue::ListStart`].
    #[must_use]
    pub fn is_container_start(&self) -> bool {
        matches!(self, Self::StructureStart | Self::ArrayStart | Self::ListStart)
    }
}
