//! Schema-level errors for PBKDF/PASE message structures.

use matter_tlv::{TlvElementValue, TlvError};

/// Errors raised while encoding, decoding, or validating a schema struct.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// The underlying TLV stream failed to decode.
    #[error("tlv codec error: {0}")]
    Tlv(#[from] TlvError),

    /// A required field was absent after decode.
    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),

    /// A field was present but out of range.
    #[error("invalid field {field}: {detail}")]
    InvalidField {
        /// Name of the offending field.
        field: &'static str,
        /// Human-readable description of why the value was rejected.
        detail: String,
    },

    /// An element had the wrong TLV element type for its field.
    #[error("expected {expected} element, found a different type")]
    ExpectedType {
        /// The element type the schema expected.
        expected: &'static str,
    },

    /// An element inside a structure did not carry a context tag.
    #[error("expected a context-tagged element inside a structure")]
    ExpectedContextTag,

    /// Decode did not find a Structure opener where one was required.
    #[error("expected a structure opener to begin decoding")]
    ExpectedStructure,
}

/// Convenience alias for schema operation results.
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Narrows `value` to `u16`, rejecting a present-but-out-of-range value
/// instead of truncating it. `field` names the schema field for the error.
///
/// Returns `Ok(None)` when `value` isn't [`TlvElementValue::Unsigned`] at
/// all (the caller's existing "field absent" handling takes over from
/// there), and `Err(SchemaError::InvalidField)` when it is `Unsigned` but
/// doesn't fit in 16 bits.
pub(crate) fn narrow_u16(value: &TlvElementValue, field: &'static str) -> Result<Option<u16>> {
    match (value.as_unsigned(), value.as_u16()) {
        (Some(raw), None) => Err(SchemaError::InvalidField {
            field,
            detail: format!("{raw} does not fit in 16 bits"),
        }),
        (_, narrowed) => Ok(narrowed),
    }
}

/// `u32` counterpart of [`narrow_u16`].
pub(crate) fn narrow_u32(value: &TlvElementValue, field: &'static str) -> Result<Option<u32>> {
    match (value.as_unsigned(), value.as_u32()) {
        (Some(raw), None) => Err(SchemaError::InvalidField {
            field,
            detail: format!("{raw} does not fit in 32 bits"),
        }),
        (_, narrowed) => Ok(narrowed),
    }
}
