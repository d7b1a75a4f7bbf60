//! Tracing subscriber setup and secret redaction.

use tracing_subscriber::{fmt, EnvFilter};

const VISIBLE_PREFIX: usize = 4;

/// Install a global fmt subscriber filtered by `RUST_LOG`, falling back to
/// `default_directive` (e.g. `"info"` or `"hypernet_core=debug"`).
///
/// Fails when a global subscriber is already installed.
pub fn init_tracing(default_directive: &str) -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .map_err(|e| format!("invalid log filter: {}", e))?;

    fmt().with_env_filter(filter).with_target(false).try_init().map_err(|e| e.to_string())
}

/// Short, non-reversible form of a secret for logs: `abcd…(32)`.
pub fn redact(secret: &str) -> String {
    let prefix: String = secret.chars().take(VISIBLE_PREFIX).collect();
    if prefix.len() == secret.len() {
        return format!("…({})", secret.len());
    }
    format!("{}…({})", prefix, secret.chars().count())
}
