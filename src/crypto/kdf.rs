//! 密钥派生函数（KDF）模块
//!
//! 将用户密码与 Header 中的 salt 派生为 AES-128 密钥：
//! - PBKDF2，PRF 为 HMAC-SHA1
//! - 1024 次迭代
//! - 输出 128 bit
//!
//! 参数由生成备份的客户端决定，不可调整。
//! 相同输入必然得到相同密钥；派生结果离开作用域后自动清零。

use pbkdf2::pbkdf2_hmac;
use sha1::Sha1;
use zeroize::Zeroizing;

use crate::format::header::SALT_SIZE;

/// 派生密钥长度（128-bit）
pub const KEY_LEN: usize = 16;

/// PBKDF2 迭代次数
pub const ITERATIONS: u32 = 1024;

/// 根据密码和 salt 派生对称密钥
pub fn derive_key(password: &str, salt: &[u8; SALT_SIZE]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha1>(password.as_bytes(), salt, ITERATIONS, &mut key[..]);
    key
}
