//! 备份文件生成
//!
//! 生成流程（严格顺序）：
//! 1. 生成随机 IV 与 salt
//! 2. 写入 Header
//! 3. 使用 KDF 从密码派生 AES 密钥
//! 4. gzip 压缩正文后整体 AES-GCM 加密
//!
//! 主要用于构造测试数据，命令行不提供该功能。

use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;
use rand::{RngCore, rngs::OsRng};

use crate::crypto::{aead, kdf};
use crate::error::Result;
use crate::format::header::{Header, IV_SIZE, SALT_SIZE};
use crate::model::Jid;

/// 生成完整备份，返回写入的 Header
pub fn write_backup<W: Write>(
    writer: W,
    app: &str,
    owner: &Jid,
    timestamp: i64,
    password: &str,
    content: &[u8],
) -> Result<Header> {
    let mut iv = [0u8; IV_SIZE];
    OsRng.fill_bytes(&mut iv);

    let mut salt = [0u8; SALT_SIZE];
    OsRng.fill_bytes(&mut salt);

    let header = Header::new(app, owner, timestamp, iv, salt);
    write_backup_with_header(writer, &header, password, content)?;
    Ok(header)
}

/// 使用给定 Header 生成备份
pub fn write_backup_with_header<W: Write>(
    mut writer: W,
    header: &Header,
    password: &str,
    content: &[u8],
) -> Result<()> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content)?;
    let compressed = encoder.finish()?;

    let key = kdf::derive_key(password, &header.salt);
    let ciphertext = aead::encrypt(&key, &header.iv, &compressed)?;

    header.write(&mut writer)?;
    writer.write_all(&ciphertext)?;
    writer.flush()?;

    Ok(())
}
