//! Configuration loading with environment overrides.

use hypernet_types::{ConfigError, CredentialConfig, Region};
use std::path::{Path, PathBuf};
use validator::Validate;

/// Environment variable selecting the region (`cn` / `os`).
pub const ENV_REGION: &str = "HYPERNET_REGION";
/// Environment variable overriding the attestation endpoint.
pub const ENV_FINGERPRINT_URL: &str = "HYPERNET_FINGERPRINT_URL";
/// Environment variable overriding the sign-token endpoint.
pub const ENV_SIGN_TOKEN_URL: &str = "HYPERNET_SIGN_TOKEN_URL";

const CONFIG_DIR: &str = "hypernet";
const CONFIG_FILE: &str = "config.json";

/// `<platform config dir>/hypernet/config.json`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Load `path` (defaults when missing), apply process environment overrides
/// and validate.
pub fn load_config(path: &Path) -> Result<CredentialConfig, ConfigError> {
    load_config_with(path, |key| std::env::var(key).ok())
}

/// [`load_config`] with an injectable environment lookup.
pub fn load_config_with<F>(path: &Path, env: F) -> Result<CredentialConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = read_config_file(path)?;
    apply_env_overrides(&mut config, env);
    config.validate().map_err(|e| ConfigError::from_validation(&e))?;
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<CredentialConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "Config file not found, using defaults");
        return Ok(CredentialConfig::default());
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::from_io_error(&e))?;
    serde_json::from_str(&content).map_err(|e| ConfigError::from_json_error(&e))
}

fn apply_env_overrides<F>(config: &mut CredentialConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = env(ENV_REGION) {
        match raw.parse::<Region>() {
            Ok(region) => {
                tracing::info!(region = region.code(), "Region set from environment");
                config.region = region;
            },
            Err(e) => tracing::warn!("{} ignored: {}", ENV_REGION, e),
        }
    }

    if let Some(url) = env_url(&env, ENV_FINGERPRINT_URL) {
        config.fingerprint.endpoint_url = url;
    }

    if let Some(url) = env_url(&env, ENV_SIGN_TOKEN_URL) {
        config.sign_token.endpoint_url = Some(url);
    }
}

fn env_url<F>(env: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = env(key)?;
    let url = raw.trim().to_string();
    if url.is_empty() {
        tracing::warn!("{} is empty, using configured value", key);
        return None;
    }
    if url::Url::parse(&url).is_err() {
        tracing::warn!("{} is not a valid URL, using configured value", key);
        return None;
    }
    tracing::info!("Using {} from environment", key);
    Some(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hypernet_types::RefreshPolicy;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load_config_with(&dir.path().join("absent.json"), env_of(&[])).expect("load");
        assert_eq!(config, CredentialConfig::default());
    }

    #[test]
    fn test_partial_file_and_overrides() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(file, r#"{{"region": "os", "sign_token_ttl_secs": 120, "refresh_policy": "concurrent"}}"#)
            .expect("write");

        let config = load_config_with(
            file.path(),
            env_of(&[
                (ENV_FINGERPRINT_URL, "http://127.0.0.1:9000/deviceprofile/v4"),
                (ENV_SIGN_TOKEN_URL, "not a url"),
            ]),
        )
        .expect("load");

        assert_eq!(config.region, Region::Overseas);
        assert_eq!(config.sign_token_ttl_secs, 120);
        assert_eq!(config.refresh_policy, RefreshPolicy::Concurrent);
        assert_eq!(config.fingerprint.endpoint_url, "http://127.0.0.1:9000/deviceprofile/v4");
        assert_eq!(config.sign_token.endpoint_url, None);
        assert_eq!(config.sign_token_url(), "https://zonai.skport.com/api/v1/auth/refresh");
    }

    #[test]
    fn test_region_override() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load_config_with(&dir.path().join("none.json"), env_of(&[(ENV_REGION, "cn")]))
            .expect("load");
        assert_eq!(config.region, Region::Chinese);
        assert_eq!(config.sign_token_url(), "https://zonai.skland.com/api/v1/auth/refresh");

        let config = load_config_with(&dir.path().join("none.json"), env_of(&[(ENV_REGION, "mars")]))
            .expect("load");
        assert_eq!(config.region, Region::Overseas);
    }

    #[test]
    fn test_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(file, "{{ not json").expect("write");
        assert!(matches!(
            load_config_with(file.path(), env_of(&[])),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_validation_failure() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(file, r#"{{"retry": {{"max_attempts": 0}}}}"#).expect("write");
        assert!(matches!(
            load_config_with(file.path(), env_of(&[])),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_default_path_shape() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("hypernet/config.json"));
        }
    }
}
