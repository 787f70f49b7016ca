//! `Crypto_PBKDFParameterSet`: PBKDF2 iteration count and salt, nested
//! inside [`crate::PBKDFParamResponse`].

#![allow(
    clippy::expect_used,
    reason = "decoder/encoder invariants already checked by next()/begin_structure()"
)]

use matter_tlv::{Decoder, Encoder, Tag, TlvElementValue};

use crate::error::{Result, SchemaError, narrow_u32};

/// Lower bound on PBKDF2 iteration count.
pub const MIN_ITERATIONS: u32 = 1000;
/// Upper bound on PBKDF2 iteration count.
pub const MAX_ITERATIONS: u32 = 100_000;
/// Lower bound on salt length, in bytes.
pub const MIN_SALT_LEN: usize = 16;
/// Upper bound on salt length, in bytes.
pub const MAX_SALT_LEN: usize = 32;

/// `Crypto_PBKDFParameterSet`.
///
/// The source carried two incompatible tag schemas for this struct, one
/// using `u16` iterations; the `u32` form is authoritative here (the `u16`
/// variant was a legacy bug).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PBKDFParameterSet {
    /// Context tag 1.
    pub iterations: u32,
    /// Context tag 2.
    pub salt: Vec<u8>,
}

impl PBKDFParameterSet {
    /// Builds a new parameter set without validating it; call
    /// [`Self::validate`] (or let [`Self::encode`] do so) before trusting
    /// the result.
    #[must_use]
    pub fn new(iterations: u32, salt: Vec<u8>) -> Self {
        Self { iterations, salt }
    }

    /// Writes this struct as a `Structure` under `tag`.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError::InvalidField`] if `iterations` or `salt`
    /// are out of range. Nothing is written to `enc` on failure.
    pub fn encode(&self, enc: &mut Encoder, tag: Tag) -> Result<()> {
        self.validate()?;
        enc.begin_structure(tag);
        enc.put_unsigned(Tag::Context(1), u64::from(self.iterations));
        enc.put_octet_string(Tag::Context(2), &self.salt);
        enc.end_container().expect("the container opened above is still on the stack");
        Ok(())
    }

    /// Reads a [`PBKDFParameterSet`] structure from the decoder's current
    /// position.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] on a malformed structure or a field that
    /// fails [`Self::validate`].
    pub fn decode(dec: &mut Decoder<'_>) -> Result<Self> {
        if !dec.next() {
            return Err(dec.error().cloned().map_or(SchemaError::ExpectedStructure, Into::into));
        }
        let (_, value) = dec.element().expect("next() returned true").clone();
        if !matches!(value, TlvElementValue::StructureStart) {
            return Err(SchemaError::ExpectedStructure);
        }
        Self::decode_body(dec)
    }

    /// Reads the fields of a [`PBKDFParameterSet`] structure whose opener
    /// has already been consumed by the caller.
    ///
    /// # Errors
    ///
    /// Same as [`Self::decode`].
    pub(crate) fn decode_body(dec: &mut Decoder<'_>) -> Result<Self> {
        let mut iterations = None;
        let mut salt = None;

        while dec.next() {
            let (tag, value) = dec.element().expect("next() returned true");
            let Some(ctx) = tag.as_context() else {
                return Err(SchemaError::ExpectedContextTag);
            };
            match ctx {
                1 => iterations = narrow_u32(value, "iterations")?,
                2 => salt = value.as_bytes().map(<[u8]>::to_vec),
                _ => {},
            }
        }
        if let Some(err) = dec.error() {
            return Err(err.clone().into());
        }

        let parsed = Self {
            iterations: iterations.ok_or(SchemaError::MissingRequiredField("iterations"))?,
            salt: salt.ok_or(SchemaError::MissingRequiredField("salt"))?,
        };
        parsed.validate()?;
        Ok(parsed)
    }

    /// Checks `iterations` is within `[1000, 100000]` and `salt` is within
    /// `[16, 32]` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidField`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_ITERATIONS..=MAX_ITERATIONS).contains(&self.iterations) {
            return Err(SchemaError::InvalidField {
                field: "iterations",
                detail: format!("{} outside [{MIN_ITERATIONS}, {MAX_ITERATIONS}]", self.iterations),
            });
        }
        if !(MIN_SALT_LEN..=MAX_SALT_LEN).contains(&self.salt.len()) {
            return Err(SchemaError::InvalidField {
                field: "salt",
                detail: format!(
                    "{}-byte salt outside [{MIN_SALT_LEN}, {MAX_SALT_LEN}]",
                    self.salt.len()
                ),
            });
        }
        Ok(())
    }
}
