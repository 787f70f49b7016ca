//! Integration tests for the PBKDF/PASE message schemas, exercising the
//! public encode/decode/validate surface only.

use matter_pase_messages::{
    PBKDFParamRequest, PBKDFParamResponse, PBKDFParameterSet, SchemaError, SessionParameters,
    TransportBitmap,
};
use matter_tlv::{Decoder, Encoder};

#[test]
fn pbkdf_param_request_default_scenario_round_trips() {
    let request = PBKDFParamRequest {
        initiator_random: vec![0x5A; 32],
        initiator_session_id: 0,
        passcode_id: 0,
        has_pbkdf_parameters: false,
        initiator_session_params: None,
    };
    let mut enc = Encoder::new();
    request.encode(&mut enc).expect("valid request encodes");
    let mut dec = Decoder::new(enc.as_slice());
    let decoded = PBKDFParamRequest::decode(&mut dec).expect("valid encoding decodes");
    assert_eq!(decoded, request);
}

#[test]
fn pbkdf_param_request_with_nested_session_params_round_trips() {
    let params = SessionParameters::builder(1, 1, 1, 16)
        .session_idle_interval(1000)
        .supported_transports(TransportBitmap::MRP.with(TransportBitmap::TCP))
        .max_tcp_message_size(8192)
        .build();
    let request = PBKDFParamRequest {
        initiator_random: vec![0x5A; 32],
        initiator_session_id: 3,
        passcode_id: 1,
        has_pbkdf_parameters: false,
        initiator_session_params: Some(params),
    };
    let mut enc = Encoder::new();
    request.encode(&mut enc).expect("valid request encodes");
    let mut dec = Decoder::new(enc.as_slice());
    let decoded = PBKDFParamRequest::decode(&mut dec).expect("valid encoding decodes");
    assert_eq!(decoded, request);
}

#[test]
fn pbkdf_param_response_with_parameters_round_trips() {
    let response = PBKDFParamResponse {
        initiator_random: vec![0x5A; 32],
        responder_random: vec![0xA5; 32],
        responder_session_id: 9,
        pbkdf_parameters: PBKDFParameterSet::new(5000, vec![0x01; 24]),
        responder_session_params: Some(SessionParameters::builder(2, 1, 1, 8).build()),
    };
    let mut enc = Encoder::new();
    response.encode(&mut enc).expect("valid response encodes");
    let mut dec = Decoder::new(enc.as_slice());
    let decoded = PBKDFParamResponse::decode(&mut dec).expect("valid encoding decodes");
    assert_eq!(decoded, response);
}

#[test]
fn invalid_pbkdf_iterations_scenario() {
    let params = PBKDFParameterSet::new(999, vec![0x01; 16]);
    let mut enc = Encoder::new();
    let err = params.encode(&mut enc, matter_tlv::Tag::Anonymous).unwrap_err();
    assert!(matches!(err, SchemaError::InvalidField { field: "iterations", .. }));
}

#[test]
fn invalid_pbkdf_salt_scenario() {
    let params = PBKDFParameterSet::new(1000, vec![0x01; 15]);
    let mut enc = Encoder::new();
    let err = params.encode(&mut enc, matter_tlv::Tag::Anonymous).unwrap_err();
    assert!(matches!(err, SchemaError::InvalidField { field: "salt", .. }));
}

#[test]
fn unrecognized_context_tags_are_skipped_on_decode() {
    let mut enc = Encoder::new();
    enc.begin_structure(matter_tlv::Tag::Anonymous);
    enc.put_octet_string(matter_tlv::Tag::Context(1), &[0x5A; 32]);
    enc.put_unsigned(matter_tlv::Tag::Context(99), 0xFFFF); // unknown field
    enc.put_unsigned(matter_tlv::Tag::Context(2), 0);
    enc.put_unsigned(matter_tlv::Tag::Context(3), 0);
    enc.put_bool(matter_tlv::Tag::Context(4), false);
    enc.end_container().unwrap();

    let mut dec = Decoder::new(enc.as_slice());
    let decoded = PBKDFParamRequest::decode(&mut dec).expect("unknown tags are skipped");
    assert_eq!(decoded.initiator_session_id, 0);
}
