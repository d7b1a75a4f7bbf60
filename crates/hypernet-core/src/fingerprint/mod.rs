//! Device fingerprint attestation.
//!
//! ```text
//! DeviceProfile ──tn──► obfuscate ──► gzip+base64 ──► AES-CBC (hex) = data
//!                                                         ▲
//!                     session id ──md5[..16]──────────────┘
//!                     session id ──RSA PKCS#1 v1.5──────────────────► ep
//! ```
//!
//! The endpoint answers with a device id which [`FingerprintClient`] returns
//! with a `B` prefix; [`DeviceIdCache`] keeps it for an hour.

pub mod cipher_table;
pub mod client;
pub mod compression;
pub mod device_cache;
pub mod digest;
pub mod obfuscator;
pub mod profile;
pub mod sealing;

pub use client::{FingerprintClient, FingerprintEnvelope, FINGERPRINT_SUCCESS_CODE};
pub use device_cache::DeviceIdCache;
pub use profile::DeviceProfile;
pub use sealing::SessionSealer;

use crate::error::AppResult;

/// The two sealed values carried by an attestation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedProfile {
    /// AES-sealed compressed profile, hex
    pub data: String,
    /// RSA-sealed session id, base64
    pub ep: String,
}

/// Run a profile through obfuscation, compression and both sealing stages.
pub fn seal_profile(
    profile: &DeviceProfile,
    session_id: &str,
    sealer: &SessionSealer,
) -> AppResult<SealedProfile> {
    let obfuscated = obfuscator::obfuscate(profile.fields());
    let compressed = compression::compress_object(&obfuscated)?;
    let data = sealing::seal_symmetric(&compressed, &sealing::derive_session_key(session_id));
    let ep = sealer.seal(session_id)?;
    Ok(SealedProfile { data, ep })
}
