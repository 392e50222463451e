//! AES-256-GCM encryption for secret config values
//!
//! Ciphertext format: `hexCiphertext--hexIV--hexAuthTag`. Keys are 64 hex
//! characters (32 bytes).

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use thiserror::Error;

/// Length of a hex-encoded key
pub const KEY_HEX_LENGTH: usize = 64;

const IV_LENGTH: usize = 12;
const TAG_LENGTH: usize = 16;
const SEPARATOR: &str = "--";

/// Encryption errors
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Encryption key must be 64 hex characters, got {0}")]
    InvalidKeyLength(usize),

    #[error("Encrypted value must have 3 parts separated by '--', got {0}")]
    MalformedCiphertext(usize),

    #[error("Invalid hex in encrypted value or key: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("Initialization vector must be 12 bytes, got {0}")]
    InvalidIv(usize),

    #[error("Encryption failed")]
    EncryptionFailed,

    #[error("Decryption failed")]
    DecryptionFailed,

    #[error("Decrypted value is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Generate a fresh random key, hex-encoded
pub fn generate_new_hex_key() -> String {
    hex::encode(Aes256Gcm::generate_key(OsRng))
}

fn cipher(hex_key: &str) -> Result<Aes256Gcm, CryptoError> {
    if hex_key.len() != KEY_HEX_LENGTH {
        return Err(CryptoError::InvalidKeyLength(hex_key.len()));
    }
    let key = hex::decode(hex_key)?;
    Aes256Gcm::new_from_slice(&key).map_err(|_| CryptoError::InvalidKeyLength(hex_key.len()))
}

/// Encrypt `cleartext` with a random IV
pub fn encrypt(cleartext: &str, hex_key: &str) -> Result<String, CryptoError> {
    let cipher = cipher(hex_key)?;
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let sealed = cipher
        .encrypt(&nonce, cleartext.as_bytes())
        .map_err(|_| CryptoError::EncryptionFailed)?;
    let (ciphertext, tag) = sealed.split_at(sealed.len() - TAG_LENGTH);

    Ok([
        hex::encode(ciphertext),
        hex::encode(nonce),
        hex::encode(tag),
    ]
    .join(SEPARATOR))
}

/// Decrypt a value produced by [`encrypt`]
pub fn decrypt(encrypted: &str, hex_key: &str) -> Result<String, CryptoError> {
    let parts: Vec<&str> = encrypted.split(SEPARATOR).collect();
    let [data, iv, tag] = parts.as_slice() else {
        return Err(CryptoError::MalformedCiphertext(parts.len()));
    };

    let cipher = cipher(hex_key)?;

    let iv = hex::decode(iv)?;
    if iv.len() != IV_LENGTH {
        return Err(CryptoError::InvalidIv(iv.len()));
    }

    let mut sealed = hex::decode(data)?;
    sealed.extend(hex::decode(tag)?);

    let cleartext = cipher
        .decrypt(Nonce::from_slice(&iv), sealed.as_ref())
        .map_err(|_| CryptoError::DecryptionFailed)?;

    Ok(String::from_utf8(cleartext)?)
}
