//! Gzip packing of the obfuscated profile.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use flate2::{Compression, GzBuilder};
use serde_json::{Map, Value};
use std::io::Write;

use crate::error::AppResult;
use crate::utils::text::to_spaced_json;

/// Byte offset of the OS field in the gzip member header.
const GZIP_OS_OFFSET: usize = 9;
/// OS id the attestation endpoint expects in that field.
const GZIP_OS_ID: u8 = 19;

/// Compress with the current time as gzip mtime.
pub fn compress_object(obj: &Map<String, Value>) -> AppResult<String> {
    let mtime = u32::try_from(chrono::Utc::now().timestamp()).unwrap_or_default();
    compress_object_at(obj, mtime)
}

/// Serialize `obj` as spaced ASCII JSON, gzip it at best compression with the
/// given mtime, patch the OS header byte and base64 the result.
pub fn compress_object_at(obj: &Map<String, Value>, mtime: u32) -> AppResult<String> {
    let json = to_spaced_json(obj)?;

    let mut encoder = GzBuilder::new().mtime(mtime).write(Vec::new(), Compression::best());
    encoder.write_all(json.as_bytes())?;
    let mut bytes = encoder.finish()?;

    if let Some(os) = bytes.get_mut(GZIP_OS_OFFSET) {
        *os = GZIP_OS_ID;
    }

    Ok(STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use serde_json::json;
    use std::io::Read;

    fn sample() -> Map<String, Value> {
        match json!({"pj": "qeDGcpUpK4Y=", "protocol": 102, "jf": ""}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_header_and_payload() {
        let encoded = compress_object_at(&sample(), 1_700_000_000).expect("compress");
        let bytes = STANDARD.decode(encoded).expect("base64");

        assert_eq!(&bytes[..3], &[0x1f, 0x8b, 0x08]);
        assert_eq!(&bytes[4..8], &1_700_000_000_u32.to_le_bytes());
        assert_eq!(bytes[8], 2, "best compression flag");
        assert_eq!(bytes[GZIP_OS_OFFSET], GZIP_OS_ID);

        let mut text = String::new();
        GzDecoder::new(bytes.as_slice()).read_to_string(&mut text).expect("gunzip");
        assert_eq!(text, r#"{"pj": "qeDGcpUpK4Y=", "protocol": 102, "jf": ""}"#);
    }

    #[test]
    fn test_current_time_variant_decodes() {
        let encoded = compress_object(&sample()).expect("compress");
        let bytes = STANDARD.decode(encoded).expect("base64");
        assert_eq!(bytes[GZIP_OS_OFFSET], GZIP_OS_ID);
    }
}
