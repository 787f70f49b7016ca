//! Property and boundary tests for the TLV codec's round-trip closure.

use matter_tlv::{Decoder, Encoder, Tag, TlvElementValue, TlvError};
use proptest::prelude::*;

fn decode_one(bytes: &[u8]) -> (Tag, TlvElementValue) {
    let mut dec = Decoder::new(bytes);
    assert!(dec.next(), "expected exactly one element, decoder error: {:?}", dec.error());
    let (tag, value) = dec.element().expect("next() returned true").clone();
    (tag, value)
}

proptest! {
    #[test]
    fn unsigned_round_trips(v in any::<u64>(), ctx in any::<u8>()) {
        let mut enc = Encoder::new();
        enc.put_unsigned(Tag::Context(ctx), v);
        let (tag, value) = decode_one(enc.as_slice());
        prop_assert_eq!(tag, Tag::Context(ctx));
        prop_assert_eq!(value.as_unsigned(), Some(v));
    }

    #[test]
    fn signed_round_trips(v in any::<i64>(), ctx in any::<u8>()) {
        let mut enc = Encoder::new();
        enc.put_signed(Tag::Context(ctx), v);
        let (tag, value) = decode_one(enc.as_slice());
        prop_assert_eq!(tag, Tag::Context(ctx));
        prop_assert_eq!(value.as_signed(), Some(v));
    }

    #[test]
    fn bool_round_trips(v in any::<bool>()) {
        let mut enc = Encoder::new();
        enc.put_bool(Tag::Anonymous, v);
        let (tag, value) = decode_one(enc.as_slice());
        prop_assert_eq!(tag, Tag::Anonymous);
        prop_assert_eq!(value.as_bool(), Some(v));
    }

    #[test]
    fn utf8_round_trips(s in "\\PC*") {
        let mut enc = Encoder::new();
        enc.put_utf8(Tag::Anonymous, &s);
        let (_, value) = decode_one(enc.as_slice());
        prop_assert_eq!(value.as_utf8(), Some(s.as_str()));
    }

    #[test]
    fn bytes_round_trip(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let mut enc = Encoder::new();
        enc.put_octet_string(Tag::Anonymous, &data);
        let (_, value) = decode_one(enc.as_slice());
        prop_assert_eq!(value.as_bytes(), Some(data.as_slice()));
    }

    #[test]
    fn common_tag_round_trips(v in any::<u32>()) {
        let mut enc = Encoder::new();
        enc.put_null(Tag::Common(v));
        let (tag, _) = decode_one(enc.as_slice());
        prop_assert_eq!(tag, Tag::Common(v));
    }

    #[test]
    fn implicit_tag_round_trips(v in any::<u32>()) {
        let mut enc = Encoder::new();
        enc.put_null(Tag::Implicit(v));
        let (tag, _) = decode_one(enc.as_slice());
        prop_assert_eq!(tag, Tag::Implicit(v));
    }

    #[test]
    fn fully_qualified_tag_round_trips(vendor in any::<u16>(), profile in any::<u16>(), tag_num in any::<u32>()) {
        let mut enc = Encoder::new();
        let tag = Tag::FullyQualified { vendor, profile, tag: tag_num };
        enc.put_null(tag);
        let (decoded, _) = decode_one(enc.as_slice());
        prop_assert_eq!(decoded, tag);
    }

    #[test]
    fn minimal_unsigned_width_selection(v in any::<u64>()) {
        let mut enc = Encoder::new();
        enc.put_unsigned(Tag::Anonymous, v);
        let control = enc.as_slice()[0] & 0x1F;
        let expected = if u8::try_from(v).is_ok() {
            0x04
        } else if u16::try_from(v).is_ok() {
            0x05
        } else if u32::try_from(v).is_ok() {
            0x06
        } else {
            0x07
        };
        prop_assert_eq!(control, expected);
    }

    #[test]
    fn nested_structure_balances(depth in 1usize..8) {
        let mut enc = Encoder::new();
        for _ in 0..depth {
            enc.begin_structure(Tag::Anonymous);
        }
        for _ in 0..depth {
            enc.end_container().expect("matching begin exists");
        }
        prop_assert_eq!(enc.depth(), 0);

        let mut dec = Decoder::new(enc.as_slice());
        let mut seen = 0;
        while dec.next() {
            seen += 1;
        }
        prop_assert_eq!(dec.error(), None);
        prop_assert_eq!(seen, depth);
    }
}

#[test]
fn unbalanced_container_is_detected() {
    let mut enc = Encoder::new();
    enc.begin_structure(Tag::Anonymous);
    enc.begin_array(Tag::Context(1));
    enc.end_container().unwrap();
    // one Begin left un-ended

    let mut dec = Decoder::new(enc.as_slice());
    while dec.next() {}
    assert_eq!(dec.error(), Some(&TlvError::UnexpectedEof));
}

#[test]
fn length_prefix_boundaries() {
    let mut enc = Encoder::new();
    enc.put_utf8(Tag::Anonymous, &"a".repeat(255));
    assert_eq!(enc.as_slice()[0] & 0x1F, 0x0C); // Utf8String1

    let mut enc = Encoder::new();
    enc.put_utf8(Tag::Anonymous, &"a".repeat(256));
    assert_eq!(enc.as_slice()[0] & 0x1F, 0x0D); // Utf8String2

    let mut enc = Encoder::new();
    enc.put_utf8(Tag::Anonymous, &"a".repeat(65_535));
    assert_eq!(enc.as_slice()[0] & 0x1F, 0x0D); // Utf8String2

    let mut enc = Encoder::new();
    enc.put_utf8(Tag::Anonymous, &"a".repeat(65_536));
    assert_eq!(enc.as_slice()[0] & 0x1F, 0x0E); // Utf8String4
}

#[test]
fn pbkdf_request_style_structure_round_trips() {
    // A small nested structure resembling PBKDFParamRequest's shape, to
    // exercise mixed element types inside one container.
    let mut enc = Encoder::new();
    enc.begin_structure(Tag::Anonymous);
    enc.put_octet_string(Tag::Context(1), &[0xAB; 32]);
    enc.put_unsigned(Tag::Context(2), 1234u64);
    enc.put_unsigned(Tag::Context(3), 0u64);
    enc.put_bool(Tag::Context(4), false);
    enc.end_container().unwrap();

    let mut dec = Decoder::new(enc.as_slice());

    assert!(dec.next());
    assert!(dec.element().unwrap().1.is_container_start());

    assert!(dec.next());
    assert_eq!(dec.element().unwrap().0, Tag::Context(1));
    assert_eq!(dec.element().unwrap().1.as_bytes(), Some([0xAB; 32].as_slice()));

    assert!(dec.next());
    assert_eq!(dec.element().unwrap().1.as_unsigned(), Some(1234));

    assert!(dec.next());
    assert_eq!(dec.element().unwrap().1.as_unsigned(), Some(0));

    assert!(dec.next());
    assert_eq!(dec.element().unwrap().1.as_bool(), Some(false));

    assert!(!dec.next());
    assert_eq!(dec.error(), None);
}
