use std::fs;
use std::io::Cursor;

use ceb2txt::crypto::{aead, kdf};
use ceb2txt::format::header::{Header, VERSION};
use ceb2txt::{Backup, Ceb2TxtError, ContentFormat, Jid, Store};
use chrono::Utc;
use tempfile::tempdir;

const STATEMENTS: &str = "\
INSERT INTO accounts (uuid, username, server, resource) VALUES ('acc', 'romeo', 'montague.lit', 'orchard')
INSERT INTO conversations (uuid, accountUuid, contactJid, mode) VALUES ('c1', 'acc', 'juliet@capulet.lit', 0)
INSERT INTO messages (conversationUuid, timeSent, body, status, type) VALUES ('c1', 1709337540000, 'parting is
such sweet sorrow', 0, 0)
";

const ROWS: &str = r#"[
  {"table": "accounts", "values": {"uuid": "acc", "username": "romeo", "server": "montague.lit", "resource": null}},
  {"table": "conversations", "values": {"uuid": "c1", "accountUuid": "acc", "contactJid": "juliet@capulet.lit", "mode": 0}},
  {"table": "messages", "values": {"conversationUuid": "c1", "timeSent": 1709337540000, "body": "true:61000", "status": 0, "type": 6}},
  {"table": "identities", "values": {"account": "acc", "name": "juliet@capulet.lit", "trust": 1}}
]"#;

fn owner() -> Jid {
    "romeo@montague.lit/orchard".parse().expect("parse owner")
}

fn backup_bytes(content: &str, password: &str) -> Vec<u8> {
    let mut bytes = Vec::new();
    ceb2txt::write_backup(
        &mut bytes,
        "eu.siacs.conversations",
        &owner(),
        1_709_337_600_000,
        password,
        content.as_bytes(),
    )
    .expect("write backup");
    bytes
}

#[test]
fn statement_backup_roundtrip() {
    // 语句流格式：写入备份后完整走一遍解密、导入、渲染
    let temp_dir = tempdir().expect("create temp dir");
    let archive = temp_dir.path().join("backup.ceb");
    let output = temp_dir.path().join("out");

    fs::write(&archive, backup_bytes(STATEMENTS, "test-password")).expect("write archive");

    let summary =
        ceb2txt::convert(&archive, "test-password", &output, &Utc).expect("convert backup");
    assert_eq!(summary.conversations, 1);
    assert_eq!(summary.files, 1);

    let text = fs::read_to_string(
        output.join("romeo@montague.lit/1on1/juliet@capulet.lit/2024-03-01.txt"),
    )
    .expect("read transcript");
    assert_eq!(
        text,
        format!("23:59 <- parting is\n{}such sweet sorrow\n", " ".repeat(9))
    );
}

#[test]
fn row_backup_roundtrip() {
    let bytes = backup_bytes(ROWS, "test-password");

    let backup = Backup::from_reader(Cursor::new(bytes)).expect("read header");
    assert_eq!(backup.header().owner.to_string(), "romeo@montague.lit");
    assert_eq!(backup.header().app, "eu.siacs.conversations");
    assert_eq!(backup.header().version, VERSION);

    let content = backup.decrypt("test-password").expect("decrypt");
    let mut store = Store::open_in_memory().expect("store");
    let stats = store.import(content).expect("import");
    assert_eq!(stats.format, ContentFormat::Rows);
    assert_eq!(stats.statements, 4);

    let output = tempdir().expect("create temp dir");
    ceb2txt::render_transcripts(&store, output.path(), &Utc).expect("render");

    let text = fs::read_to_string(
        output
            .path()
            .join("romeo@montague.lit/1on1/juliet@capulet.lit/2024-03-01.txt"),
    )
    .expect("read transcript");
    assert_eq!(text, "23:59 <- Incoming call. Duration 61 seconds\n");
}

#[test]
fn decrypt_with_wrong_password_fails() {
    // 错误密码必须导致认证失败
    let bytes = backup_bytes(STATEMENTS, "correct-password");

    let backup = Backup::from_reader(Cursor::new(bytes)).expect("read header");
    assert!(matches!(
        backup.decrypt("wrong-password"),
        Err(Ceb2TxtError::DecryptionFailed)
    ));
}

#[test]
fn tampered_ciphertext_fails() {
    let mut bytes = backup_bytes(STATEMENTS, "test-password");
    let last = bytes.len() - 1;
    bytes[last] ^= 0x01;

    let backup = Backup::from_reader(Cursor::new(bytes)).expect("read header");
    assert!(matches!(
        backup.decrypt("test-password"),
        Err(Ceb2TxtError::DecryptionFailed)
    ));
}

#[test]
fn authenticated_but_not_gzip_fails_on_import() {
    // 认证通过但正文不是 gzip：同样报告为 DecryptionFailed
    let header = Header::new("app", &owner(), 0, [5u8; 12], [6u8; 16]);
    let key = kdf::derive_key("pw", &header.salt);
    let ciphertext = aead::encrypt(&key, &header.iv, b"INSERT INTO t VALUES (1)").expect("encrypt");

    let mut bytes = Vec::new();
    header.write(&mut bytes).expect("write header");
    bytes.extend_from_slice(&ciphertext);

    let content = Backup::from_reader(Cursor::new(bytes))
        .expect("read header")
        .decrypt("pw")
        .expect("authenticate");

    let mut store = Store::open_in_memory().expect("store");
    assert!(matches!(
        store.import(content),
        Err(Ceb2TxtError::DecryptionFailed)
    ));
}

#[test]
fn open_rejects_invalid_header() {
    // Header 不完整时立即拒绝
    let temp_dir = tempdir().expect("create temp dir");
    let bad_path = temp_dir.path().join("bad.ceb");
    fs::write(&bad_path, [0u8, 0, 0, 1, 0]).expect("write bad file");

    assert!(matches!(
        Backup::open(&bad_path),
        Err(Ceb2TxtError::MalformedHeader(_))
    ));
}

#[test]
fn fixed_header_produces_stable_ciphertext() {
    let header = Header::new("app", &owner(), 42, [1u8; 12], [2u8; 16]);

    let mut first = Vec::new();
    ceb2txt::write_backup_with_header(&mut first, &header, "pw", b"same").expect("write");
    let mut second = Vec::new();
    ceb2txt::write_backup_with_header(&mut second, &header, "pw", b"same").expect("write");

    assert_eq!(first, second);
}
