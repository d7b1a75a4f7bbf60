//! Device profile generation for the attestation request.
//!
//! A profile mimics a desktop Edge browser. Environment values are fixed;
//! identifiers and timestamps are fresh per profile. The `tn` digest is
//! computed over every other field and appended last.

use chrono::Local;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use super::digest::canonical_digest;
use crate::utils::text::md5_hex;

/// Simulated browser environment, in wire order.
pub mod browser_env {
    pub const PLUGINS: &str = "MicrosoftEdgePDFPluginPortableDocumentFormatinternal-pdf-viewer1,MicrosoftEdgePDFViewermhjfbmdgcfjbbpaeojofohoefgiehjai1";
    pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/129.0.0.0 Safari/537.36 Edg/129.0.0.0";
    pub const CANVAS: &str = "259ffe69";
    /// Minutes behind UTC (UTC+8)
    pub const TIMEZONE: i64 = -480;
    pub const PLATFORM: &str = "Win32";
    pub const URL: &str = "https://www.skland.com/";
    pub const REFERER: &str = "";
    /// width_height_depth_pixelRatio
    pub const RESOLUTION: &str = "1920_1080_24_1.25";
    pub const CLIENT_SIZE: &str = "0_0_1080_1920_1920_1080_1920_1080";
    pub const STATUS: &str = "0011";
}

const PROTOCOL_CODE: i64 = 102;
const SDK_VERSION: &str = "3.0.0";
const SUB_VERSION: &str = "1.0.0";
const SM_ID_SALT: &str = "smsk_web_";

/// Per-profile random values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSeed {
    pub vpw: String,
    pub svm: i64,
    pub trees: String,
    pub pmf: i64,
    pub smid: String,
}

impl ProfileSeed {
    /// Fresh identifiers and the current time.
    pub fn random() -> Self {
        Self {
            vpw: Uuid::new_v4().to_string(),
            svm: chrono::Utc::now().timestamp_millis(),
            trees: Uuid::new_v4().to_string(),
            pmf: chrono::Utc::now().timestamp_millis(),
            smid: generate_sm_id(),
        }
    }
}

/// Build an `smid` from a local `%Y%m%d%H%M%S` timestamp and a random uuid.
pub fn generate_sm_id() -> String {
    let timestamp = Local::now().format("%Y%m%d%H%M%S").to_string();
    sm_id_at(&timestamp, &Uuid::new_v4().to_string())
}

/// `<timestamp><md5(uid)>00<md5("smsk_web_" + prefix)[..14]>0`
pub fn sm_id_at(timestamp: &str, uid: &str) -> String {
    let prefix = format!("{}{}00", timestamp, md5_hex(uid));
    let check = md5_hex(format!("{}{}", SM_ID_SALT, prefix));
    format!("{}{}0", prefix, &check[..14])
}

/// Plain device profile, before obfuscation.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceProfile {
    fields: Map<String, Value>,
}

impl DeviceProfile {
    /// Generate a profile with fresh random values.
    pub fn generate(organization: &str, app_id: &str) -> Self {
        Self::from_seed(organization, app_id, ProfileSeed::random())
    }

    /// Assemble a profile from explicit random values.
    pub fn from_seed(organization: &str, app_id: &str, seed: ProfileSeed) -> Self {
        use self::browser_env::*;

        let mut fields = Map::new();
        let mut put = |key: &str, value: Value| {
            fields.insert(key.to_string(), value);
        };

        put("plugins", json!(PLUGINS));
        put("ua", json!(USER_AGENT));
        put("canvas", json!(CANVAS));
        put("timezone", json!(TIMEZONE));
        put("platform", json!(PLATFORM));
        put("url", json!(URL));
        put("referer", json!(REFERER));
        put("res", json!(RESOLUTION));
        put("clientSize", json!(CLIENT_SIZE));
        put("status", json!(STATUS));
        put("vpw", json!(seed.vpw));
        put("svm", json!(seed.svm));
        put("trees", json!(seed.trees));
        put("pmf", json!(seed.pmf));
        put("protocol", json!(PROTOCOL_CODE));
        put("organization", json!(organization));
        put("appId", json!(app_id));
        put("os", json!("web"));
        put("version", json!(SDK_VERSION));
        put("sdkver", json!(SDK_VERSION));
        put("box", json!(""));
        put("rtype", json!("all"));
        put("smid", json!(seed.smid));
        put("subVersion", json!(SUB_VERSION));
        put("time", json!(0));

        let tn = canonical_digest(&fields);
        fields.insert("tn".to_string(), Value::String(tn));

        Self { fields }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// The `tn` digest field.
    pub fn digest(&self) -> &str {
        self.fields.get("tn").and_then(Value::as_str).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed() -> ProfileSeed {
        ProfileSeed {
            vpw: "11111111-1111-4111-8111-111111111111".to_string(),
            svm: 1_700_000_000_000,
            trees: "22222222-2222-4222-8222-222222222222".to_string(),
            pmf: 1_700_000_000_000,
            smid: sm_id_at("20240101000000", "33333333-3333-4333-8333-333333333333"),
        }
    }

    #[test]
    fn test_field_order_and_tn_last() {
        let profile = DeviceProfile::from_seed("org", "default", seed());
        let keys: Vec<&str> = profile.fields().keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 26);
        assert_eq!(keys.first(), Some(&"plugins"));
        assert_eq!(keys[10], "vpw");
        assert_eq!(keys.last(), Some(&"tn"));
    }

    #[test]
    fn test_tn_covers_profile_without_itself() {
        let profile = DeviceProfile::from_seed("org", "default", seed());
        let mut without_tn = profile.fields().clone();
        without_tn.remove("tn");
        assert_eq!(profile.digest(), canonical_digest(&without_tn));
        assert_eq!(profile.digest().len(), 32);
    }

    #[test]
    fn test_same_seed_same_profile() {
        let a = DeviceProfile::from_seed("org", "default", seed());
        let b = DeviceProfile::from_seed("org", "default", seed());
        assert_eq!(a, b);

        let c = DeviceProfile::from_seed("other", "default", seed());
        assert_ne!(a.digest(), c.digest());
    }

    #[test]
    fn test_sm_id_shape() {
        let smid = sm_id_at("20240101000000", "33333333-3333-4333-8333-333333333333");
        assert_eq!(smid.len(), 14 + 32 + 2 + 14 + 1);
        assert!(smid.starts_with("20240101000000"));
        assert_eq!(&smid[46..48], "00");
        assert!(smid.ends_with('0'));

        let prefix = &smid[..48];
        let check = md5_hex(format!("smsk_web_{}", prefix));
        assert_eq!(&smid[48..62], &check[..14]);
    }

    #[test]
    fn test_generated_sm_id_is_fresh() {
        assert_ne!(generate_sm_id(), generate_sm_id());
    }

    #[test]
    fn test_random_seed_timestamps_sampled_in_order() {
        let before = chrono::Utc::now().timestamp_millis();
        let seed = ProfileSeed::random();
        let after = chrono::Utc::now().timestamp_millis();

        assert!(before <= seed.svm && seed.svm <= seed.pmf && seed.pmf <= after);
        assert_ne!(seed.vpw, seed.trees);
    }
}
