//! 备份文件 Header 实现
//!
//! Header 位于文件最前端，之后紧跟 AES-GCM 密文。
//!
//! 字节布局（大端）：
//! - 4  字节有符号 version
//! - u16 长度前缀 + UTF-8 app id
//! - u16 长度前缀 + UTF-8 owner 地址（bare 形式）
//! - 8  字节有符号 timestamp（毫秒）
//! - 12 字节 IV
//! - 16 字节 salt
//!
//! 本层只校验版本号、长度与地址格式，不做其它语义检查。
//! 版本号高于 VERSION 时返回 UnsupportedVersion，
//! 以便与损坏的文件区分开。

use std::io::{self, Read, Write};

use crate::error::Ceb2TxtError;
use crate::model::Jid;

/// 当前支持的最高版本号
pub const VERSION: i32 = 1;

/// AES-GCM IV 长度（字节）
pub const IV_SIZE: usize = 12;

/// KDF 使用的 salt 长度（字节）
pub const SALT_SIZE: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub version: i32,
    pub app: String,
    pub owner: Jid,
    pub timestamp: i64,
    pub iv: [u8; IV_SIZE],
    pub salt: [u8; SALT_SIZE],
}

impl Header {
    /// 创建当前版本的 Header，owner 只保留 bare 形式
    pub fn new(
        app: impl Into<String>,
        owner: &Jid,
        timestamp: i64,
        iv: [u8; IV_SIZE],
        salt: [u8; SALT_SIZE],
    ) -> Self {
        Self {
            version: VERSION,
            app: app.into(),
            owner: owner.bare(),
            timestamp,
            iv,
            salt,
        }
    }

    /// 将 Header 写入输出流
    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(&self.version.to_be_bytes())?;
        write_string(&mut writer, &self.app)?;
        write_string(&mut writer, &self.owner.bare().to_string())?;
        writer.write_all(&self.timestamp.to_be_bytes())?;
        writer.write_all(&self.iv)?;
        writer.write_all(&self.salt)?;
        Ok(())
    }

    /// 从输入流读取并解析 Header
    ///
    /// 读取结束后 reader 恰好停在密文起始处。
    pub fn read<R: Read>(mut reader: R) -> Result<Self, Ceb2TxtError> {
        let mut version_buf = [0u8; 4];
        read_field(&mut reader, &mut version_buf, "version")?;
        let version = i32::from_be_bytes(version_buf);

        if version > VERSION {
            return Err(Ceb2TxtError::UnsupportedVersion {
                found: version,
                supported: VERSION,
            });
        }

        let app = read_string(&mut reader, "app id")?;
        let owner_text = read_string(&mut reader, "owner address")?;
        let owner: Jid = owner_text
            .parse()
            .map_err(|e| Ceb2TxtError::MalformedHeader(format!("owner address: {e}")))?;

        let mut timestamp_buf = [0u8; 8];
        read_field(&mut reader, &mut timestamp_buf, "timestamp")?;
        let timestamp = i64::from_be_bytes(timestamp_buf);

        let mut iv = [0u8; IV_SIZE];
        read_field(&mut reader, &mut iv, "iv")?;

        let mut salt = [0u8; SALT_SIZE];
        read_field(&mut reader, &mut salt, "salt")?;

        Ok(Self {
            version,
            app,
            owner,
            timestamp,
            iv,
            salt,
        })
    }
}

fn write_string<W: Write>(writer: &mut W, value: &str) -> io::Result<()> {
    let len = u16::try_from(value.len()).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "header string longer than 65535 bytes",
        )
    })?;
    writer.write_all(&len.to_be_bytes())?;
    writer.write_all(value.as_bytes())
}

fn read_string<R: Read>(reader: &mut R, field: &str) -> Result<String, Ceb2TxtError> {
    let mut len_buf = [0u8; 2];
    read_field(reader, &mut len_buf, field)?;

    let mut bytes = vec![0u8; u16::from_be_bytes(len_buf) as usize];
    read_field(reader, &mut bytes, field)?;

    String::from_utf8(bytes)
        .map_err(|_| Ceb2TxtError::MalformedHeader(format!("{field} is not valid UTF-8")))
}

// 在字段边界处 EOF 同样视为截断
fn read_field<R: Read>(reader: &mut R, buf: &mut [u8], field: &str) -> Result<(), Ceb2TxtError> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => {
            Ceb2TxtError::MalformedHeader(format!("truncated while reading {field}"))
        }
        _ => Ceb2TxtError::Io(e),
    })
}
