use std::io::{Cursor, Read};

use ceb2txt::format::header::{Header, VERSION};
use ceb2txt::{Ceb2TxtError, Jid};

fn sample_header() -> Header {
    let owner: Jid = "romeo@montague.lit/orchard".parse().expect("parse owner");
    Header::new(
        "eu.siacs.conversations",
        &owner,
        1_709_337_540_000,
        [7u8; 12],
        [42u8; 16],
    )
}

fn encode(header: &Header) -> Vec<u8> {
    let mut bytes = Vec::new();
    header.write(&mut bytes).expect("write header");
    bytes
}

#[test]
fn header_roundtrip() {
    let header = sample_header();
    let bytes = encode(&header);

    let parsed = Header::read(bytes.as_slice()).expect("read header");
    assert_eq!(parsed, header);
    // owner 只写入 bare 形式
    assert_eq!(parsed.owner.to_string(), "romeo@montague.lit");
    assert!(parsed.owner.is_bare());
}

#[test]
fn header_byte_layout() {
    let owner: Jid = "a@b".parse().expect("parse owner");
    let header = Header::new("app", &owner, 1, [1u8; 12], [2u8; 16]);
    let bytes = encode(&header);

    let mut expected = vec![0, 0, 0, 1];
    expected.extend_from_slice(&[0, 3]);
    expected.extend_from_slice(b"app");
    expected.extend_from_slice(&[0, 3]);
    expected.extend_from_slice(b"a@b");
    expected.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 1]);
    expected.extend_from_slice(&[1u8; 12]);
    expected.extend_from_slice(&[2u8; 16]);

    assert_eq!(bytes, expected);
}

#[test]
fn read_stops_at_ciphertext() {
    let mut bytes = encode(&sample_header());
    bytes.extend_from_slice(b"ciphertext");

    let mut cursor = Cursor::new(bytes);
    Header::read(&mut cursor).expect("read header");

    let mut rest = Vec::new();
    cursor.read_to_end(&mut rest).expect("read rest");
    assert_eq!(rest, b"ciphertext");
}

#[test]
fn newer_version_is_unsupported() {
    let mut header = sample_header();
    header.version = VERSION + 1;
    let bytes = encode(&header);

    match Header::read(bytes.as_slice()) {
        Err(Ceb2TxtError::UnsupportedVersion { found, supported }) => {
            assert_eq!(found, VERSION + 1);
            assert_eq!(supported, VERSION);
        }
        other => panic!("expected UnsupportedVersion, got {other:?}"),
    }
}

#[test]
fn newer_version_wins_over_garbage() {
    // 仅有版本号、其余字段缺失时仍报告版本不支持
    let bytes = 9i32.to_be_bytes();
    assert!(matches!(
        Header::read(bytes.as_slice()),
        Err(Ceb2TxtError::UnsupportedVersion { found: 9, .. })
    ));
}

#[test]
fn truncated_header_is_malformed() {
    let bytes = encode(&sample_header());

    for len in [0, 3, 4, 10, bytes.len() - 16, bytes.len() - 1] {
        let result = Header::read(&bytes[..len]);
        assert!(
            matches!(result, Err(Ceb2TxtError::MalformedHeader(_))),
            "length {len} gave {result:?}"
        );
    }
}

#[test]
fn invalid_owner_address_is_malformed() {
    let mut bytes = 1i32.to_be_bytes().to_vec();
    bytes.extend_from_slice(&[0, 3]);
    bytes.extend_from_slice(b"app");
    bytes.extend_from_slice(&[0, 2]);
    bytes.extend_from_slice(b"a@");
    bytes.extend_from_slice(&0i64.to_be_bytes());
    bytes.extend_from_slice(&[0u8; 28]);

    assert!(matches!(
        Header::read(bytes.as_slice()),
        Err(Ceb2TxtError::MalformedHeader(_))
    ));
}

#[test]
fn oversized_string_cannot_be_written() {
    let mut header = sample_header();
    header.app = "x".repeat(70_000);

    let err = header.write(Vec::new()).expect_err("write must fail");
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
}
