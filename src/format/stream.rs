//! 备份正文解密与解压
//!
//! 处理流程：
//! 1. 读取 Header 之后的全部密文
//! 2. AES-GCM 认证并解密（认证需要完整密文）
//! 3. gzip 解压，以 UTF-8 文本形式逐行向前读取
//!
//! 本阶段的任何失败（认证、解压、编码）对外统一为 DecryptionFailed，
//! 具体原因只写入 debug 日志。

use std::io::{self, BufRead, BufReader, Cursor, Read};

use flate2::bufread::MultiGzDecoder;

use crate::crypto::aead;
use crate::crypto::kdf::KEY_LEN;
use crate::error::Ceb2TxtError;
use crate::format::header::IV_SIZE;

/// 解密后的正文
///
/// 只能向前读取，不支持 seek。
/// 读取过程中出现的解压错误以 InvalidData 返回，
/// 由上层统一映射为 DecryptionFailed。
pub struct PlainText {
    inner: BufReader<MultiGzDecoder<Cursor<Vec<u8>>>>,
}

impl PlainText {
    /// 解密 reader 中剩余的全部密文
    pub fn decrypt<R: Read>(
        key: &[u8; KEY_LEN],
        iv: &[u8; IV_SIZE],
        mut reader: R,
    ) -> Result<Self, Ceb2TxtError> {
        let mut ciphertext = Vec::new();
        reader.read_to_end(&mut ciphertext)?;

        let compressed = aead::decrypt(key, iv, &ciphertext)?;
        tracing::debug!(
            ciphertext = ciphertext.len(),
            compressed = compressed.len(),
            "backup body authenticated"
        );

        Ok(Self::from_compressed(compressed))
    }

    /// 直接包装一段 gzip 数据（已认证的明文）
    pub fn from_compressed(compressed: Vec<u8>) -> Self {
        Self {
            inner: BufReader::new(MultiGzDecoder::new(Cursor::new(compressed))),
        }
    }
}

fn corrupt(err: io::Error) -> io::Error {
    tracing::debug!(error = %err, "decompression failed");
    io::Error::new(io::ErrorKind::InvalidData, err)
}

impl Read for PlainText {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf).map_err(corrupt)
    }
}

impl BufRead for PlainText {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf().map_err(corrupt)
    }

    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt)
    }
}

/// 读取解密正文时的 I/O 错误视为文件损坏
pub fn content_error(err: io::Error) -> Ceb2TxtError {
    tracing::debug!(error = %err, "failed to read decrypted content");
    Ceb2TxtError::DecryptionFailed
}

/// 逐块校验 UTF-8 的 reader
///
/// 非法字节以 InvalidData 返回。跨块截断的多字节序列
/// 暂存到下一次读取再判断，流结束时仍未补全则视为非法。
pub struct Utf8Reader<R> {
    inner: R,
    pending: Vec<u8>,
}

impl<R: Read> Utf8Reader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            pending: Vec::new(),
        }
    }

    fn check(&mut self, chunk: &[u8]) -> io::Result<()> {
        let joined;
        let bytes = if self.pending.is_empty() {
            chunk
        } else {
            joined = [self.pending.as_slice(), chunk].concat();
            joined.as_slice()
        };

        match std::str::from_utf8(bytes) {
            Ok(_) => self.pending.clear(),
            Err(e) if e.error_len().is_none() => self.pending = bytes[e.valid_up_to()..].to_vec(),
            Err(e) => return Err(io::Error::new(io::ErrorKind::InvalidData, e)),
        }
        Ok(())
    }
}

impl<R: Read> Read for Utf8Reader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n == 0 {
            if !self.pending.is_empty() {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "stream ended inside a UTF-8 sequence",
                ));
            }
            return Ok(0);
        }

        self.check(&buf[..n])?;
        Ok(n)
    }
}
