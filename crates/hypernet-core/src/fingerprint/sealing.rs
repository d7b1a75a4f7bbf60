//! Symmetric and asymmetric sealing of the compressed profile.
//!
//! The payload is AES-128-CBC encrypted under a key derived from a random
//! session id; the session id itself is RSA-encrypted (`ep`) so the server can
//! derive the same key.

use aes::cipher::{block_padding::Pkcs7, generic_array::GenericArray, BlockEncryptMut, KeyIvInit};
use aes::Aes128;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rsa::pkcs8::DecodePublicKey;
use rsa::{Pkcs1v15Encrypt, RsaPublicKey};

use crate::error::{AppError, AppResult};
use crate::utils::text::md5_hex;

type Aes128CbcEnc = cbc::Encryptor<Aes128>;

/// Fixed CBC initialization vector expected by the attestation endpoint.
pub const AES_IV: &[u8; 16] = b"0102030405060708";

const PEM_LINE_WIDTH: usize = 64;

/// First 16 characters of the MD5 hex of the session id, as ASCII bytes.
pub fn derive_session_key(session_id: &str) -> [u8; 16] {
    let mut key = [0_u8; 16];
    let digest = md5_hex(session_id);
    for (dst, src) in key.iter_mut().zip(digest.as_bytes()) {
        *dst = *src;
    }
    key
}

/// AES-128-CBC with PKCS#7 padding and the fixed IV; lowercase hex output.
pub fn seal_symmetric(plaintext: &str, key: &[u8; 16]) -> String {
    let cipher = Aes128CbcEnc::new(GenericArray::from_slice(key), GenericArray::from_slice(AES_IV));
    hex::encode(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes()))
}

/// Wrap a bare base64 SubjectPublicKeyInfo into a PEM block.
pub fn to_pem_block(b64_key: &str) -> String {
    let body: Vec<&str> = b64_key
        .as_bytes()
        .chunks(PEM_LINE_WIDTH)
        .filter_map(|line| std::str::from_utf8(line).ok())
        .collect();
    format!("-----BEGIN PUBLIC KEY-----\n{}\n-----END PUBLIC KEY-----", body.join("\n"))
}

/// RSA PKCS#1 v1.5 encryptor for the session id.
#[derive(Debug, Clone)]
pub struct SessionSealer {
    key: RsaPublicKey,
}

impl SessionSealer {
    /// Parse the base64 public key. Fails for malformed key material.
    pub fn from_base64_key(b64_key: &str) -> AppResult<Self> {
        let pem = to_pem_block(b64_key.trim());
        let key = RsaPublicKey::from_public_key_pem(&pem)
            .map_err(|e| AppError::Crypto(format!("invalid attestation public key: {}", e)))?;
        Ok(Self { key })
    }

    /// Encrypt the raw session id and base64 the ciphertext.
    pub fn seal(&self, session_id: &str) -> AppResult<String> {
        let mut rng = rand::thread_rng();
        let ciphertext = self.key.encrypt(&mut rng, Pkcs1v15Encrypt, session_id.as_bytes())?;
        Ok(STANDARD.encode(ciphertext))
    }
}
