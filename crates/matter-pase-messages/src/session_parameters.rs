//! `session-parameter-struct`: negotiated session timing and transport
//! capabilities exchanged during PBKDF parameter request/response.

#![allow(
    clippy::expect_used,
    reason = "decoder/encoder invariants already checked by next()/begin_structure()"
)]

use matter_tlv::{Decoder, Encoder, Tag, TlvElementValue};

use crate::error::{Result, SchemaError, narrow_u16, narrow_u32};

/// Bit-set of supported transports (context tag 8).
///
/// A newtype over a raw `u16` so the `MRP` default bit can't be confused
/// with an arbitrary integer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportBitmap(u16);

impl TransportBitmap {
    /// Message Reliability Protocol over UDP. Every Matter node supports
    /// it, so it is the default when the field is absent.
    pub const MRP: Self = Self(1 << 0);
    /// Direct TCP transport.
    pub const TCP: Self = Self(1 << 1);

    /// Builds a bitmap from its raw wire representation.
    #[must_use]
    pub fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// The raw wire representation.
    #[must_use]
    pub fn bits(self) -> u16 {
        self.0
    }

    /// Whether `self` includes every bit set in `other`.
    #[must_use]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Sets `other`'s bits in `self`.
    #[must_use]
    pub fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl Default for TransportBitmap {
    fn default() -> Self {
        Self::MRP
    }
}

/// `session-parameter-struct`: nine context-tagged fields describing one
/// endpoint's session timing and transport capabilities.
///
/// Required fields fail [`SessionParameters::validate`] when absent;
/// optional fields surface as `Option`. `max_tcp_message_size` is only
/// meaningful (and only encoded) when `supported_transports` indicates TCP
/// support.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionParameters {
    /// Context tag 1. Idle-mode polling interval, milliseconds.
    pub session_idle_interval: Option<u32>,
    /// Context tag 2. Active-mode polling interval, milliseconds.
    pub session_active_interval: Option<u32>,
    /// Context tag 3. How long a session stays "active" after traffic.
    pub session_active_threshold: Option<u16>,
    /// Context tag 4. Required.
    pub data_model_revision: u16,
    /// Context tag 5. Required.
    pub interaction_model_revision: u16,
    /// Context tag 6. Required.
    pub specification_version: u32,
    /// Context tag 7. Required.
    pub max_paths_per_invoke: u16,
    /// Context tag 8. Defaults to [`TransportBitmap::MRP`] when absent.
    pub supported_transports: TransportBitmap,
    /// Context tag 9. Present only when `supported_transports` includes
    /// [`TransportBitmap::TCP`].
    pub max_tcp_message_size: Option<u32>,
}

impl SessionParameters {
    /// Starts building a [`SessionParameters`] with the three required
    /// fields that have no sensible default.
    #[must_use]
    pub fn builder(
        data_model_revision: u16,
        interaction_model_revision: u16,
        specification_version: u32,
        max_paths_per_invoke: u16,
    ) -> SessionParametersBuilder {
        SessionParametersBuilder {
            session_idle_interval: None,
            session_active_interval: None,
            session_active_threshold: None,
            data_model_revision,
            interaction_model_revision,
            specification_version,
            max_paths_per_invoke,
            supported_transports: TransportBitmap::default(),
            max_tcp_message_size: None,
        }
    }

    /// Writes this struct as a `Structure` under `tag`.
    pub fn encode(&self, enc: &mut Encoder, tag: Tag) {
        enc.begin_structure(tag);
        if let Some(v) = self.session_idle_interval {
            enc.put_unsigned(Tag::Context(1), u64::from(v));
        }
        if let Some(v) = self.session_active_interval {
            enc.put_unsigned(Tag::Context(2), u64::from(v));
        }
        if let Some(v) = self.session_active_threshold {
            enc.put_unsigned(Tag::Context(3), u64::from(v));
        }
        enc.put_unsigned(Tag::Context(4), u64::from(self.data_model_revision));
        enc.put_unsigned(Tag::Context(5), u64::from(self.interaction_model_revision));
        enc.put_unsigned(Tag::Context(6), u64::from(self.specification_version));
        enc.put_unsigned(Tag::Context(7), u64::from(self.max_paths_per_invoke));
        enc.put_unsigned(Tag::Context(8), u64::from(self.supported_transports.bits()));
        if self.supported_transports.contains(TransportBitmap::TCP) {
            if let Some(v) = self.max_tcp_message_size {
                enc.put_unsigned(Tag::Context(9), u64::from(v));
            }
        }
        enc.end_container().expect("the container opened above is still on the stack");
    }

    /// Reads a [`SessionParameters`] structure from the decoder's current
    /// position, starting at a `Structure` opener.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if the structure opener is missing, a
    /// non-context-tagged element appears inside it, or [`Self::validate`]
    /// rejects the decoded fields.
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

    /// Reads the fields of a [`SessionParameters`] structure whose opener
    /// has already been consumed by the caller (used when this struct is
    /// nested inside another one that matched the opener itself).
    ///
    /// # Errors
    ///
    /// Same as [`Self::decode`].
    pub(crate) fn decode_body(dec: &mut Decoder<'_>) -> Result<Self> {
        let mut session_idle_interval = None;
        let mut session_active_interval = None;
        let mut session_active_threshold = None;
        let mut data_model_revision = None;
        let mut interaction_model_revision = None;
        let mut specification_version = None;
        let mut max_paths_per_invoke = None;
        let mut supported_transports = None;
        let mut max_tcp_message_size = None;

        // `Decoder::next` transparently swallows `EndOfContainer` markers,
        // including this structure's own closing one, so a clean `false`
        // here means every field has been consumed, not an error.
        while dec.next() {
            let (tag, value) = dec.element().expect("next() returned true");
            let Some(ctx) = tag.as_context() else {
                return Err(SchemaError::ExpectedContextTag);
            };
            match ctx {
                1 => session_idle_interval = narrow_u32(value, "session_idle_interval")?,
                2 => session_active_interval = narrow_u32(value, "session_active_interval")?,
                3 => session_active_threshold = narrow_u16(value, "session_active_threshold")?,
                4 => data_model_revision = narrow_u16(value, "data_model_revision")?,
                5 => interaction_model_revision = narrow_u16(value, "interaction_model_revision")?,
                6 => specification_version = narrow_u32(value, "specification_version")?,
                7 => max_paths_per_invoke = narrow_u16(value, "max_paths_per_invoke")?,
                8 => supported_transports = narrow_u16(value, "supported_transports")?
                    .map(TransportBitmap::from_bits),
                9 => max_tcp_message_size = narrow_u32(value, "max_tcp_message_size")?,
                _ => {}, // unrecognized context tags are silently skipped
            }
        }
        if let Some(err) = dec.error() {
            return Err(err.clone().into());
        }

        let parsed = Self {
            session_idle_interval,
            session_active_interval,
            session_active_threshold,
            data_model_revision: data_model_revision
                .ok_or(SchemaError::MissingRequiredField("data_model_revision"))?,
            interaction_model_revision: interaction_model_revision
                .ok_or(SchemaError::MissingRequiredField("interaction_model_revision"))?,
            specification_version: specification_version
                .ok_or(SchemaError::MissingRequiredField("specification_version"))?,
            max_paths_per_invoke: max_paths_per_invoke
                .ok_or(SchemaError::MissingRequiredField("max_paths_per_invoke"))?,
            supported_transports: supported_transports.unwrap_or_default(),
            max_tcp_message_size,
        };
        parsed.validate()?;
        Ok(parsed)
    }

    /// Checks that required fields were present and that the conditional
    /// `max_tcp_message_size` field is only set when TCP is advertised.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidField`] if `max_tcp_message_size` is
    /// set without `TransportBitmap::TCP` in `supported_transports`.
    pub fn validate(&self) -> Result<()> {
        if self.max_tcp_message_size.is_some()
            && !self.supported_transports.contains(TransportBitmap::TCP)
        {
            return Err(SchemaError::InvalidField {
                field: "max_tcp_message_size",
                detail: "set without TCP in supported_transports".to_owned(),
            });
        }
        Ok(())
    }
}

/// Builder for [`SessionParameters`], replacing the functional-option
/// pattern with chained setters over optional slots.
#[derive(Debug, Clone)]
pub struct SessionParametersBuilder {
    session_idle_interval: Option<u32>,
    session_active_interval: Option<u32>,
    session_active_threshold: Option<u16>,
    data_model_revision: u16,
    interaction_model_revision: u16,
    specification_version: u32,
    max_paths_per_invoke: u16,
    supported_transports: TransportBitmap,
    max_tcp_message_size: Option<u32>,
}

impl SessionParametersBuilder {
    /// Sets the idle-mode polling interval.
    #[must_use]
    pub fn session_idle_interval(mut self, v: u32) -> Self {
        self.session_idle_interval = Some(v);
        self
    }

    /// Sets the active-mode polling interval.
    #[must_use]
    pub fn session_active_interval(mut self, v: u32) -> Self {
        self.session_active_interval = Some(v);
        self
    }

    /// Sets the active-session threshold.
    #[must_use]
    pub fn session_active_threshold(mut self, v: u16) -> Self {
        self.session_active_threshold = Some(v);
        self
    }

    /// Overrides the default transport bitmap ([`TransportBitmap::MRP`]).
    #[must_use]
    pub fn supported_transports(mut self, v: TransportBitmap) -> Self {
        self.supported_transports = v;
        self
    }

    /// Sets the maximum TCP message size. Only meaningful alongside
    /// [`TransportBitmap::TCP`] in `supported_transports`.
    #[must_use]
    pub fn max_tcp_message_size(mut self, v: u32) -> Self {
        self.max_tcp_message_size = Some(v);
        self
    }

    /// Finishes the builder, producing a [`SessionParameters`].
    #[must_use]
    pub fn build(self) -> SessionParameters {
        SessionParameters {
            session_idle_interval: self.session_idle_interval,
            session_active_interval: self.session_active_interval,
            session_active_threshold: self.session_active_threshold,
            data_model_revision: self.data_model_revision,
            interaction_model_revision: self.interaction_model_revision,
            specification_version: self.specification_version,
            max_paths_per_invoke: self.max_paths_per_invoke,
            supported_transports: self.supported_transports,
            max_tcp_message_size: self.max_tcp_message_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SessionParameters {
        SessionParameters::builder(1, 1, 0x0102_0003, 16)
            .session_idle_interval(5000)
            .session_active_interval(300)
            .build()
    }

    #[test]
    fn round_trips_without_tcp() {
        let params = sample();
        let mut enc = Encoder::new();
        params.encode(&mut enc, Tag::Anonymous);
        let mut dec = Decoder::new(enc.as_slice());
        let decoded = SessionParameters::decode(&mut dec).expect("valid encoding decodes");
        assert_eq!(decoded, params);
    }

    #[test]
    fn round_trips_with_tcp() {
        let mut params = sample();
        params.supported_transports = TransportBitmap::MRP.with(TransportBitmap::TCP);
        params.max_tcp_message_size = Some(65_535);
        let mut enc = Encoder::new();
        params.encode(&mut enc, Tag::Anonymous);
        let mut dec = Decoder::new(enc.as_slice());
        let decoded = SessionParameters::decode(&mut dec).expect("valid encoding decodes");
        assert_eq!(decoded, params);
    }

    #[test]
    fn default_transports_is_mrp_only() {
        let params = sample();
        assert!(params.supported_transports.contains(TransportBitmap::MRP));
        assert!(!params.supported_transports.contains(TransportBitmap::TCP));
    }

    #[test]
    fn max_tcp_message_size_without_tcp_is_rejected() {
        let mut params = sample();
        params.max_tcp_message_size = Some(1024);
        assert!(matches!(params.validate(), Err(SchemaError::InvalidField { field: "max_tcp_message_size", .. })));
    }

    #[test]
    fn oversized_u16_field_is_rejected_not_truncated() {
        let mut enc = Encoder::new();
        enc.begin_structure(Tag::Anonymous);
        // `data_model_revision` (context tag 4) is nominally a u16; encode a
        // value that only fits in 4 bytes so the minimal-width encoder picks
        // a wider element than the field can hold.
        enc.put_unsigned(Tag::Context(4), 0x0001_0005);
        enc.put_unsigned(Tag::Context(5), 1);
        enc.put_unsigned(Tag::Context(6), 1);
        enc.put_unsigned(Tag::Context(7), 1);
        enc.end_container().unwrap();
        let mut dec = Decoder::new(enc.as_slice());
        let err = SessionParameters::decode(&mut dec).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::InvalidField { field: "data_model_revision", .. }
        ));
    }

    #[test]
    fn missing_required_field_fails_decode() {
        let mut enc = Encoder::new();
        enc.begin_structure(Tag::Anonymous);
        enc.put_unsigned(Tag::Context(4), 1);
        enc.end_container().unwrap();
        let mut dec = Decoder::new(enc.as_slice());
        let err = SessionParameters::decode(&mut dec).unwrap_err();
        assert!(matches!(err, SchemaError::MissingRequiredField("interaction_model_revision")));
    }
}
