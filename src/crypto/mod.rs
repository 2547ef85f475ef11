pub mod aead;
pub mod kdf;
