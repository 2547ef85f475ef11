//! AES-128-GCM 加解密
//!
//! 整个备份正文是一条 GCM 密文，末尾 16 字节为认证标签。
//! 解密失败即表示：密码错误 或 数据被篡改，两者无法区分。
//! 在认证通过前不会返回任何明文。

use aes_gcm::{
    Aes128Gcm, Nonce,
    aead::{Aead, KeyInit},
};

use crate::crypto::kdf::KEY_LEN;
use crate::error::Ceb2TxtError;
use crate::format::header::IV_SIZE;

/// GCM 认证标签长度
pub const TAG_SIZE: usize = 16;

pub fn encrypt(
    key: &[u8; KEY_LEN],
    iv: &[u8; IV_SIZE],
    plaintext: &[u8],
) -> Result<Vec<u8>, Ceb2TxtError> {
    let cipher = Aes128Gcm::new_from_slice(key).map_err(|_| {
        Ceb2TxtError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "invalid key length",
        ))
    })?;

    cipher
        .encrypt(Nonce::from_slice(iv), plaintext)
        .map_err(|_| Ceb2TxtError::Io(std::io::Error::other("AEAD encrypt failed")))
}

pub fn decrypt(
    key: &[u8; KEY_LEN],
    iv: &[u8; IV_SIZE],
    ciphertext: &[u8],
) -> Result<Vec<u8>, Ceb2TxtError> {
    if ciphertext.len() < TAG_SIZE {
        tracing::debug!(len = ciphertext.len(), "ciphertext shorter than the GCM tag");
        return Err(Ceb2TxtError::DecryptionFailed);
    }

    let cipher = Aes128Gcm::new_from_slice(key).map_err(|_| Ceb2TxtError::DecryptionFailed)?;

    cipher
        .decrypt(Nonce::from_slice(iv), ciphertext)
        .map_err(|_| {
            tracing::debug!("GCM authentication tag mismatch");
            Ceb2TxtError::DecryptionFailed
        })
}
