//! `PBKDFParamResponse`: the second message of the PASE handshake's PBKDF
//! parameter exchange.

#![allow(
    clippy::expect_used,
    reason = "decoder/encoder invariants already checked by next()/begin_structure()"
)]

use matter_tlv::{Decoder, Encoder, Tag, TlvElementValue};

use crate::error::{Result, SchemaError, narrow_u16};
use crate::pbkdf_parameter_set::PBKDFParameterSet;
use crate::session_parameters::SessionParameters;

const RANDOM_LEN: usize = 32;

/// `PBKDFParamResponse`, sent by the responder to complete the PBKDF
/// parameter exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PBKDFParamResponse {
    /// Context tag 1. Echoes the request's `initiatorRandom`.
    pub initiator_random: Vec<u8>,
    /// Context tag 2. Exactly 32 bytes, freshly drawn from the DRBG.
    pub responder_random: Vec<u8>,
    /// Context tag 3.
    pub responder_session_id: u16,
    /// Context tag 4, required.
    pub pbkdf_parameters: PBKDFParameterSet,
    /// Context tag 5, optional, always the last field when present.
    pub responder_session_params: Option<SessionParameters>,
}

impl PBKDFParamResponse {
    /// Writes this struct as an anonymous top-level `Structure`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidField`] if either random value is not
    /// exactly 32 bytes, or if `pbkdf_parameters` fails its own
    /// validation. Nothing is written to `enc` on failure.
    pub fn encode(&self, enc: &mut Encoder) -> Result<()> {
        self.validate()?;
        enc.begin_structure(Tag::Anonymous);
        enc.put_octet_string(Tag::Context(1), &self.initiator_random);
        enc.put_octet_string(Tag::Context(2), &self.responder_random);
        enc.put_unsigned(Tag::Context(3), u64::from(self.responder_session_id));
        self.pbkdf_parameters.encode(enc, Tag::Context(4))?;
        if let Some(params) = &self.responder_session_params {
            params.encode(enc, Tag::Context(5));
        }
        enc.end_container().expect("the container opened above is still on the stack");
        Ok(())
    }

    /// Reads a [`PBKDFParamResponse`] from the decoder's current position.
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
        let mut responder_random = None;
        let mut responder_session_id = None;
        let mut pbkdf_parameters = None;
        let mut responder_session_params = None;

        while dec.next() {
            let (tag, value) = dec.element().expect("next() returned true").clone();
            let Some(ctx) = tag.as_context() else {
                return Err(SchemaError::ExpectedContextTag);
            };
            match ctx {
                1 => initiator_random = value.as_bytes().map(<[u8]>::to_vec),
                2 => responder_random = value.as_bytes().map(<[u8]>::to_vec),
                3 => responder_session_id = narrow_u16(&value, "responder_session_id")?,
                4 => {
                    if !value.is_container_start() {
                        return Err(SchemaError::ExpectedType { expected: "Structure" });
                    }
                    pbkdf_parameters = Some(PBKDFParameterSet::decode_body(dec)?);
                },
                5 => {
                    if !value.is_container_start() {
                        return Err(SchemaError::ExpectedType { expected: "Structure" });
                    }
                    responder_session_params = Some(SessionParameters::decode_body(dec)?);
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
            responder_random: responder_random
                .ok_or(SchemaError::MissingRequiredField("responder_random"))?,
            responder_session_id: responder_session_id
                .ok_or(SchemaError::MissingRequiredField("responder_session_id"))?,
            pbkdf_parameters: pbkdf_parameters
                .ok_or(SchemaError::MissingRequiredField("pbkdf_parameters"))?,
            responder_session_params,
        };
        parsed.validate()?;
        Ok(parsed)
    }

    /// Checks both random fields are exactly 32 bytes and that
    /// `pbkdf_parameters` passes its own validation.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidField`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.initiator_random.len() != RANDOM_LEN {
            return Err(SchemaError::InvalidField {
                field: "initiator_random",
                detail: format!("{}-byte value, expected {RANDOM_LEN}", self.initiator_random.len()),
            });
        }
        if self.responder_random.len() != RANDOM_LEN {
            return Err(SchemaError::InvalidField {
                field: "responder_random",
                detail: format!("{}-byte value, expected {RANDOM_LEN}", self.responder_random.len()),
            });
        }
        self.pbkdf_parameters.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PBKDFParamResponse {
        PBKDFParamResponse {
            initiator_random: vec![0x42; 32],
            responder_random: vec![0x24; 32],
            responder_session_id: 7,
            pbkdf_parameters: PBKDFParameterSet::new(10_000, vec![0xAB; 16]),
            responder_session_params: None,
        }
    }

    #[test]
    fn default_response_round_trips() {
        let response = sample();
        let mut enc = Encoder::new();
        response.encode(&mut enc).expect("valid response encodes");
        let mut dec = Decoder::new(enc.as_slice());
        let decoded = PBKDFParamResponse::decode(&mut dec).expect("valid encoding decodes");
        assert_eq!(decoded, response);
    }

    #[test]
    fn response_with_session_params_round_trips() {
        let mut response = sample();
        response.responder_session_params =
            Some(SessionParameters::builder(1, 1, 1, 16).build());
        let mut enc = Encoder::new();
        response.encode(&mut enc).expect("valid response encodes");
        let mut dec = Decoder::new(enc.as_slice());
        let decoded = PBKDFParamResponse::decode(&mut dec).expect("valid encoding decodes");
        assert_eq!(decoded, response);
    }

    #[test]
    fn oversized_responder_session_id_is_rejected_not_truncated() {
        let mut enc = Encoder::new();
        enc.begin_structure(Tag::Anonymous);
        enc.put_octet_string(Tag::Context(1), &[0x42; 32]);
        enc.put_octet_string(Tag::Context(2), &[0x24; 32]);
        enc.put_unsigned(Tag::Context(3), 0x0001_0000);
        enc.end_container().unwrap();
        let mut dec = Decoder::new(enc.as_slice());
        let err = PBKDFParamResponse::decode(&mut dec).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::InvalidField { field: "responder_session_id", .. }
        ));
    }

    #[test]
    fn invalid_nested_pbkdf_parameters_reject_encode() {
        let mut response = sample();
        response.pbkdf_parameters = PBKDFParameterSet::new(999, vec![0; 16]);
        let mut enc = Encoder::new();
        let err = response.encode(&mut enc).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidField { field: "iterations", .. }));
    }
}
