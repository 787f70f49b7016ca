//! Error types for the TLV codec.

use thiserror::Error;

/// Errors produced while decoding or encoding a TLV element stream.
///
/// The first error observed by either an [`crate::Encoder`] or a
/// [`crate::Decoder`] is terminal: no further progress is made after it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TlvError {
    /// The buffer ended before a complete element (or a required
    /// end-of-container marker) could be read.
    #[error("unexpected end of buffer")]
    UnexpectedEof,

    /// The control octet used a bit pattern that is not a valid
    /// (`TagControl`, `ElementType`) combination.
    #[error("invalid control byte {0:#04x}")]
    InvalidControlByte(u8),

    /// The element type code falls in the reserved range `0x19..=0x1F`.
    #[error("unknown element type code {0:#04x}")]
    UnknownElementType(u8),

    /// An `EndContainer` call had no matching `Begin*` on the stack, or a
    /// decoded `EndOfContainer` had no open container to close.
    #[error("container stack underflow")]
    ContainerUnderflow,

    /// Fewer tag bytes remained in the buffer than the tag form requires.
    #[error("insufficient tag bytes: need {needed}, have {available}")]
    InsufficientTagBytes {
        /// Bytes required by the tag form.
        needed: usize,
        /// Bytes actually available.
        available: usize,
    },

    /// A `TagControl` value outside `0..=7` was read from a control octet.
    ///
    /// In practice this is unreachable since `TagControl` is exactly 3
    /// bits, but the decoder surfaces it explicitly rather than panicking
    /// on a theoretical future encoding.
    #[error("unsupported tag form {0}")]
    UnsupportedTagForm(u8),

    /// An encoder was asked to write an integer into a width too narrow to
    /// hold it (`Put<IntegerN>` with a forced width).
    #[error("value {value} does not fit in {width}-byte width")]
    StringLengthOverflow {
        /// The value that did not fit.
        value: i128,
        /// The requested width in bytes.
        width: u8,
    },
}

/// Convenience alias for fallible TLV operations.
pub type Result<T> = std::result::Result<T, TlvError>;
