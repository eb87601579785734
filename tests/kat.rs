//! Known-answer tests.
//!
//! - RFC 3414 Appendix A.3 and A.5: password-to-key and localization
//! - RFC 6234: HMAC vectors, truncated per RFC 3414 / RFC 7860
//! - Fixed BER encodings for integers, lengths and a complete message

use bytes::Bytes;
use snmp_wire::ber::{Decoder, EncodeBuf};
use snmp_wire::format::hex::{decode, encode};
use snmp_wire::message::{CommunityMessage, Message};
use snmp_wire::v3::{
    AuthProtocol, LocalizedKey, MasterKey, PrivKey, PrivProtocol, UsmSecurityParams, extend_key,
};
use snmp_wire::{PduType, Version, oid};

fn rfc_engine_id() -> Vec<u8> {
    decode("000000000000000000000002").unwrap()
}

fn encode_integer(value: i32) -> String {
    let mut buf = EncodeBuf::new();
    buf.push_integer(value);
    encode(&buf.finish())
}

/// RFC 3414 A.3.1: MD5, "maplesyrup"
#[test]
fn test_rfc3414_a3_1_md5() {
    let master = MasterKey::from_password(AuthProtocol::Md5, b"maplesyrup");
    assert_eq!(encode(master.as_bytes()), "9faf3283884e92834ebc9847d8edd963");

    let key = master.localize(&rfc_engine_id());
    assert_eq!(encode(key.as_bytes()), "526f5eed9fcce26f8964c2930787d82b");
}

/// RFC 3414 A.3.2: SHA-1, "maplesyrup"
#[test]
fn test_rfc3414_a3_2_sha1() {
    let master = MasterKey::from_password(AuthProtocol::Sha1, b"maplesyrup");
    assert_eq!(
        encode(master.as_bytes()),
        "9fb5cc0381497b3793528939ff788d5d79145211"
    );

    let key = master.localize(&rfc_engine_id());
    assert_eq!(
        encode(key.as_bytes()),
        "6695febc9288e36282235fc7151f128497b38f3f"
    );
}

/// RFC 3414 A.5.1 / A.5.2: new password "newsyrup"
#[test]
fn test_rfc3414_a5_new_password() {
    let engine_id = rfc_engine_id();
    let md5 = LocalizedKey::from_password(AuthProtocol::Md5, b"newsyrup", &engine_id);
    assert_eq!(encode(md5.as_bytes()), "87021d7bd9d101ba05ea6e3bf9d9bd4a");

    let sha = LocalizedKey::from_password(AuthProtocol::Sha1, b"newsyrup", &engine_id);
    assert_eq!(
        encode(sha.as_bytes()),
        "78e2dcce79d59403b58c1bbaa5bff46391f1cd25"
    );
}

#[test]
fn test_localized_key_lengths() {
    let engine_id = rfc_engine_id();
    for (protocol, len) in [
        (AuthProtocol::Md5, 16),
        (AuthProtocol::Sha1, 20),
        (AuthProtocol::Sha224, 28),
        (AuthProtocol::Sha256, 32),
        (AuthProtocol::Sha384, 48),
        (AuthProtocol::Sha512, 64),
    ] {
        let key = LocalizedKey::from_password(protocol, b"maplesyrup", &engine_id);
        assert_eq!(key.as_bytes().len(), len, "{protocol}");
    }
}

/// RFC 6234 8.5 test case 1: key 0x0b x 20, "Hi There"
#[test]
fn test_rfc6234_case1_truncated() {
    let cases = [
        (AuthProtocol::Sha1, "b617318655057264e28bc0b6"),
        (AuthProtocol::Sha224, "896fb1128abbdf196832107cd49df33f"),
        (
            AuthProtocol::Sha256,
            "b0344c61d8db38535ca8afceaf0bf12b881dc200c9833da7",
        ),
        (
            AuthProtocol::Sha384,
            "afd03944d84895626b0825f4ab46907f15f9dadbe4101ec682aa034c7cebc59c",
        ),
        (
            AuthProtocol::Sha512,
            "87aa7cdea5ef619d4ff0b4241a1d6cb02379f4e2ce4ec2787ad0b30545e17cdedaa833b7d6b8a702038b274eaea3f4e4",
        ),
    ];
    for (protocol, expected) in cases {
        let key = LocalizedKey::from_bytes(protocol, vec![0x0b; 20]);
        let mac = key.compute_hmac(&[b"Hi There".as_slice()]).unwrap();
        assert_eq!(mac.len(), protocol.mac_len());
        assert_eq!(encode(&mac), expected, "{protocol}");
    }
}

/// RFC 6234 8.5 test case 2: key "Jefe", split input
#[test]
fn test_rfc6234_case2_multipart() {
    let key = LocalizedKey::from_bytes(AuthProtocol::Sha256, b"Jefe".to_vec());
    let mac = key
        .compute_hmac(&[b"what do ya want ".as_slice(), b"for nothing?"])
        .unwrap();
    assert_eq!(
        encode(&mac),
        "5bdcc146bf60754e6a042426089575c75a003f089d273983"
    );

    assert!(key.verify_hmac(b"what do ya want for nothing?", &mac));
    assert!(!key.verify_hmac(b"what do ya want for nothing!", &mac));
    assert!(!key.verify_hmac(b"what do ya want for nothing?", &mac[..8]));
}

/// Privacy keys take the leading bytes of the localized auth key.
#[test]
fn test_priv_key_prefix() {
    let engine_id = rfc_engine_id();
    let md5 = LocalizedKey::from_password(AuthProtocol::Md5, b"maplesyrup", &engine_id);
    let des = PrivKey::from_localized(&md5, PrivProtocol::Des);
    assert_eq!(des.protocol(), PrivProtocol::Des);

    let sha = LocalizedKey::from_password(AuthProtocol::Sha1, b"maplesyrup", &engine_id);
    let extended = extend_key(AuthProtocol::Sha1, sha.as_bytes(), 32);
    assert_eq!(extended.len(), 32);
    assert_eq!(&extended[..20], sha.as_bytes());
}

#[test]
fn test_privacy_known_salt_is_deterministic() {
    let engine_id = rfc_engine_id();
    let auth = LocalizedKey::from_password(AuthProtocol::Sha1, b"maplesyrup", &engine_id);
    let plaintext = decode("300e0400040030080201010201000500").unwrap();

    for protocol in [PrivProtocol::Des, PrivProtocol::Aes128] {
        let key = PrivKey::from_localized(&auth, protocol);
        let (ct1, params1) = key.encrypt(&plaintext, 1, 257, 42).unwrap();
        let (ct2, params2) = key.encrypt(&plaintext, 1, 257, 42).unwrap();
        assert_eq!(ct1, ct2, "{protocol}");
        assert_eq!(params1, params2);
        assert_eq!(params1.len(), 8);

        let back = key.decrypt(&ct1, 1, 257, &params1).unwrap();
        assert_eq!(&back[..plaintext.len()], plaintext.as_slice());
    }
}

#[test]
fn test_integer_encodings() {
    assert_eq!(encode_integer(0), "020100");
    assert_eq!(encode_integer(-1), "0201ff");
    assert_eq!(encode_integer(127), "02017f");
    assert_eq!(encode_integer(128), "02020080");
    assert_eq!(encode_integer(-129), "0202ff7f");
    assert_eq!(encode_integer(i32::MAX), "02047fffffff");
    assert_eq!(encode_integer(i32::MIN), "020480000000");
}

#[test]
fn test_length_forms() {
    let mut buf = EncodeBuf::new();
    buf.push_octet_string(&[0u8; 127]);
    assert_eq!(encode(&buf.finish()[..2]), "047f");

    let mut buf = EncodeBuf::new();
    buf.push_octet_string(&[0u8; 128]);
    assert_eq!(encode(&buf.finish()[..3]), "048180");

    let mut buf = EncodeBuf::new();
    buf.push_octet_string(&[0u8; 256]);
    assert_eq!(encode(&buf.finish()[..4]), "04820100");
}

#[test]
fn test_indefinite_length_rejected() {
    let mut decoder = Decoder::from_slice(&[0x30, 0x80, 0x00, 0x00]);
    assert!(decoder.read_sequence().is_err());
}

/// A v2c GetRequest for sysDescr.0 with community "public".
#[test]
fn test_v2c_get_request_bytes() {
    let wire = decode(concat!(
        "3026",
        "020101",
        "0406", "7075626c6963",
        "a019",
        "02012a",
        "020100",
        "020100",
        "300e", "300c", "06082b06010201010100", "0500",
    ))
    .unwrap();

    let msg = CommunityMessage::decode(Bytes::from(wire.clone())).unwrap();
    assert_eq!(msg.version, Version::V2c);
    assert_eq!(msg.community.as_ref(), b"public");
    assert_eq!(msg.pdu.pdu_type, PduType::GetRequest);
    assert_eq!(msg.pdu.request_id, 42);
    assert_eq!(msg.pdu.varbinds.as_slice()[0].oid, oid!(1, 3, 6, 1, 2, 1, 1, 1, 0));

    assert_eq!(encode(&msg.encode()), encode(&wire));
    assert!(matches!(
        Message::decode(Bytes::from(wire)).unwrap(),
        Message::Community(_)
    ));
}

/// RFC 3414 A.4 style USM parameters.
#[test]
fn test_usm_params_layout() {
    let params = UsmSecurityParams::new(
        Bytes::from(decode("800000020109840301").unwrap()),
        1,
        257,
        Bytes::from_static(b"bert"),
    )
    .with_priv_params(Bytes::from(decode("0123456789abcdef").unwrap()));

    let encoded = params.encode();
    assert_eq!(
        encode(&encoded),
        concat!(
            "3024",
            "0409", "800000020109840301",
            "020101",
            "02020101",
            "0404", "62657274",
            "0400",
            "0408", "0123456789abcdef",
        )
    );
    assert_eq!(UsmSecurityParams::decode(encoded).unwrap(), params);
}
