//! `PBKDFParamRequest`: the first message of the PASE handshake's PBKDF
//! parameter exchange.

#![allow(
    clippy::expect_used,
    reason = "decoder/encoder invariants already checked by next()/begin_structure()"
)]

use matter_tlv::{Decoder, Encoder, Tag, TlvElementValue};

use crate::error::{Result, SchemaError, narrow_u16};
use crate::session_parameters::SessionParameters;

const INITIATOR_RANDOM_LEN: usize = 32;

/// `PBKDFParamRequest`, sent by the initiator to begin PASE.
///
/// `initiator_session_params` is written exactly once (the source encoded
/// it twice in `paramRequest.Encode`; that double-write is treated as a
/// bug here).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PBKDFParamRequest {
    /// Context tag 1. Exactly 32 bytes, freshly drawn from the DRBG.
    pub initiator_random: Vec<u8>,
    /// Context tag 2.
    pub initiator_session_id: u16,
    /// Context tag 3.
    pub passcode_id: u16,
    /// Context tag 4. Whether the initiator is also sending PBKDF
    /// parameters in-band (always `false` in this exchange; reserved for
    /// a future revision per Matter 4.14.1.2).
    pub has_pbkdf_parameters: bool,
    /// Context tag 5, optional, always the last field when present.
    pub initiator_session_params: Option<SessionParameters>,
}

impl PBKDFParamRequest {
    /// Writes this struct as an anonymous top-level `Structure`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidField`] if `initiator_random` is not
    /// exactly 32 bytes. Nothing is written to `enc` on failure.
    pub fn encode(&self, enc: &mut Encoder) -> Result<()> {
        self.validate()?;
        enc.begin_structure(Tag::Anonymous);
        enc.put_octet_string(Tag::Context(1), &self.initiator_random);
        enc.put_unsigned(Tag::Context(2), u64::from(self.initiator_session_id));
        enc.put_unsigned(Tag::Context(3), u64::from(self.passcode_id));
        enc.put_bool(Tag::Context(4), self.has_pbkdf_parameters);
        if let Some(params) = &self.initiator_session_params {
            params.encode(enc, Tag::Context(5));
        }
        enc.end_container().expect("the container opened above is still on the stack");
        Ok(())
    }

    /// Reads a [`PBKDFParamRequest`] from the decoder's current position.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] on a malformed structure, a non-context-
    /// tagged element, or a field that fails [`Self::validate`].
    pub fn decode(dec: &mut Decoder<'_>) -> Result<Self> {
        if !dec.next() {
            return Err(dec.error().cloned().map_or(SchemaError::ExpectedStructure, Into::into));
        }
        let (_, value) = dec.element().expect("next() returned true").clone();
        if !matches!(value, TlvElementValue::StructureStart) {
            return Err(SchemaError::ExpectedStructure);
        }

        let mut initiator_random = None;
        let mut initiator_session_id = None;
        let mut passcode_id = None;
        let mut has_pbkdf_parameters = None;
        let mut initiator_session_params = None;

        while dec.next() {
            let (tag, value) = dec.element().expect("next() returned true").clone();
            let Some(ctx) = tag.as_context() else {
                return Err(SchemaError::ExpectedContextTag);
            };
            match ctx {
                1 => initiator_random = value.as_bytes().map(<[u8]>::to_vec),
                2 => initiator_session_id = narrow_u16(&value, "initiator_session_id")?,
                3 => passcode_id = narrow_u16(&value, "passcode_id")?,
                4 => has_pbkdf_parameters = value.as_bool(),
                5 => {
                    if !value.is_container_start() {
                        return Err(SchemaError::ExpectedType { expected: "Structure" });
                    }
                    initiator_session_params = Some(SessionParameters::decode_body(dec)?);
                },
                _ => {},
            }
        }
        if let Some(err) = dec.error() {
            return Err(err.clone().into());
        }

        let parsed = Self {
            initiator_random: initiator_random
                .ok_or(SchemaError::MissingRequiredField("initiator_random"))?,
            initiator_session_id: initiator_session_id
                .ok_or(SchemaError::MissingRequiredField("initiator_session_id"))?,
            passcode_id: passcode_id.ok_or(SchemaError::MissingRequiredField("passcode_id"))?,
            has_pbkdf_parameters: has_pbkdf_parameters
                .ok_or(SchemaError::MissingRequiredField("has_pbkdf_parameters"))?,
            initiator_session_params,
        };
        parsed.validate()?;
        Ok(parsed)
    }

    /// Checks `initiator_random` is exactly 32 bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidField`] otherwise.
    pub fn validate(&self) -> Result<()> {
        if self.initiator_random.len() != INITIATOR_RANDOM_LEN {
            return Err(SchemaError::InvalidField {
                field: "initiator_random",
                detail: format!(
                    "{}-byte value, expected {INITIATOR_RANDOM_LEN}",
                    self.initiator_random.len()
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PBKDFParamRequest {
        PBKDFParamRequest {
            initiator_random: vec![0x42; 32],
            initiator_session_id: 0,
            passcode_id: 0,
            has_pbkdf_parameters: false,
            initiator_session_params: None,
        }
    }

    #[test]
    fn default_request_round_trips() {
        let request = sample();
        let mut enc = Encoder::new();
        request.encode(&mut enc).expect("valid request encodes");
        let mut dec = Decoder::new(enc.as_slice());
        let decoded = PBKDFParamRequest::decode(&mut dec).expect("valid encoding decodes");
        assert_eq!(decoded, request);
    }

    #[test]
    fn request_with_session_params_round_trips() {
        let mut request = sample();
        request.initiator_session_params =
            Some(SessionParameters::builder(1, 1, 1, 16).build());
        let mut enc = Encoder::new();
        request.encode(&mut enc).expect("valid request encodes");
        let mut dec = Decoder::new(enc.as_slice());
        let decoded = PBKDFParamRequest::decode(&mut dec).expect("valid encoding decodes");
        assert_eq!(decoded, request);
    }

    #[test]
    fn session_params_is_encoded_exactly_once() {
        let mut request = sample();
        request.initiator_session_params =
            Some(SessionParameters::builder(1, 1, 1, 16).build());
        let mut enc = Encoder::new();
        request.encode(&mut enc).unwrap();

        let mut nested_structures = 0;
        let mut dec = Decoder::new(enc.as_slice());
        while dec.next() {
            if dec.element().unwrap().1.is_container_start() {
                nested_structures += 1;
            }
        }
        // One opener for the top-level request, one for the nested
        // session-parameter struct: never more than that.
        assert_eq!(nested_structures, 2);
    }

    #[test]
    fn oversized_session_id_is_rejected_not_truncated() {
        let mut enc = Encoder::new();
        enc.begin_structure(Tag::Anonymous);
        enc.put_octet_string(Tag::Context(1), &[0x42; 32]);
        enc.put_unsigned(Tag::Context(2), 0x0001_0000);
        enc.put_unsigned(Tag::Context(3), 0);
        enc.put_bool(Tag::Context(4), false);
        enc.end_container().unwrap();
        let mut dec = Decoder::new(enc.as_slice());
        let err = PBKDFParamRequest::decode(&mut dec).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::InvalidField { field: "initiator_session_id", .. }
        ));
    }

    #[test]
    fn wrong_length_random_is_rejected() {
        let mut request = sample();
        request.initiator_random = vec![0; 31];
        assert!(matches!(
            request.validate(),
            Err(SchemaError::InvalidField { field: "initiator_random", .. })
        ));
    }
}
