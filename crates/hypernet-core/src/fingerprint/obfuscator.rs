//! Per-field renaming and DES encryption of a device profile.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use des::cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};
use des::Des;
use serde_json::{Map, Value};

use super::cipher_table::{rule_for, FieldCipher};
use crate::utils::text::py_str;

const DES_BLOCK: usize = 8;

/// DES-ECB encrypt the text, zero-padded to a block boundary, and base64 it.
///
/// Input already on a block boundary gets no extra block, so the empty string
/// encrypts to the empty string.
pub fn des_ecb_base64(plaintext: &str, key: &[u8; 8]) -> String {
    let cipher = Des::new(GenericArray::from_slice(key));

    let mut buf = plaintext.as_bytes().to_vec();
    let rem = buf.len() % DES_BLOCK;
    if rem != 0 {
        buf.resize(buf.len() + DES_BLOCK - rem, 0);
    }

    for chunk in buf.chunks_exact_mut(DES_BLOCK) {
        cipher.encrypt_block(GenericArray::from_mut_slice(chunk));
    }

    STANDARD.encode(buf)
}

/// Apply the field cipher table to every entry of `profile`.
///
/// Output preserves input order. Fields without a rule are copied verbatim.
pub fn obfuscate(profile: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::with_capacity(profile.len());
    for (field, value) in profile {
        match rule_for(field) {
            Some(rule) => {
                let transformed = match rule.cipher {
                    FieldCipher::Plain => value.clone(),
                    FieldCipher::Des { key } => Value::String(des_ecb_base64(&py_str(value), &key)),
                };
                out.insert(rule.alias.to_string(), transformed);
            },
            None => {
                out.insert(field.clone(), value.clone());
            },
        }
    }
    out
}
