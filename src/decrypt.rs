//! 备份文件解密流程
//!
//! 解密流程（严格顺序）：
//! 1. 读取并校验 Header
//! 2. 使用 Header 中的 salt + 密码派生 AES 密钥
//! 3. 认证解密正文并解压
//!
//! Header 与正文之间需要交互输入密码（提示中包含 owner 地址），
//! 因此拆成 open / decrypt 两步。

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::crypto::kdf;
use crate::error::Result;
use crate::format::header::Header;
use crate::format::stream::PlainText;

/// 已读取 Header、尚未解密的备份
pub struct Backup<R> {
    header: Header,
    reader: R,
}

impl Backup<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read> Backup<R> {
    pub fn from_reader(mut reader: R) -> Result<Self> {
        let header = Header::read(&mut reader)?;
        tracing::debug!(
            version = header.version,
            app = %header.app,
            owner = %header.owner,
            timestamp = header.timestamp,
            "backup header parsed"
        );
        Ok(Self { header, reader })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// 派生密钥并解密剩余数据
    pub fn decrypt(self, password: &str) -> Result<PlainText> {
        let key = kdf::derive_key(password, &self.header.salt);
        PlainText::decrypt(&key, &self.header.iv, self.reader)
    }
}
