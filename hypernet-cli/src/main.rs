//! Diagnostic CLI for the HyperNet credential layer.

#![allow(clippy::print_stdout, reason = "CLI tool outputs to stdout")]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hypernet_core::config::{default_config_path, load_config};
use hypernet_core::logging::init_tracing;
use hypernet_core::{CredentialProvider, QueryParams, SignedRequest};
use hypernet_types::{ConfigError, CredentialConfig};
use reqwest::Method;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to <config dir>/hypernet/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Runs the fingerprint attestation and prints the device id
    DeviceId,
    /// Fetches a sign token and prints it
    SignToken {
        /// Bypass the cache
        #[arg(long)]
        force: bool,
    },
    /// Prints the signed header set for a request as JSON
    Sign {
        /// Full URL or bare path
        url: String,
        /// HTTP method; POST when a body is given, GET otherwise
        #[arg(short = 'X', long)]
        method: Option<String>,
        /// Query parameters as a JSON object
        #[arg(short, long)]
        query: Option<String>,
        /// Request body as JSON
        #[arg(short, long)]
        body: Option<String>,
    },
    /// Prints the effective configuration
    Config,
}

fn resolve_config(explicit: Option<PathBuf>) -> Result<CredentialConfig> {
    let path = match explicit {
        Some(path) if !path.exists() => {
            return Err(ConfigError::NotFound { path: path.display().to_string() }.into());
        },
        Some(path) => path,
        None => match default_config_path() {
            Some(path) => path,
            None => {
                tracing::warn!("No platform config directory, using defaults");
                return Ok(CredentialConfig::default());
            },
        },
    };

    info!("Loading config from {}", path.display());
    Ok(load_config(&path)?)
}

fn parse_method(raw: &str) -> Result<Method> {
    raw.to_ascii_uppercase().parse::<Method>().with_context(|| format!("invalid HTTP method {raw:?}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log).map_err(anyhow::Error::msg).context("setting default subscriber failed")?;

    let config = resolve_config(cli.config)?;

    if let Commands::Config = cli.command {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let provider = CredentialProvider::new(&config)?;

    match cli.command {
        Commands::DeviceId => {
            let device_id = provider.device_id().await?;
            println!("{device_id}");
        },
        Commands::SignToken { force } => {
            let token = provider.sign_token(force).await?;
            println!("{token}");
        },
        Commands::Sign { url, method, query, body } => {
            let body = body
                .map(|raw| serde_json::from_str::<serde_json::Value>(&raw))
                .transpose()
                .context("body is not valid JSON")?;
            let mut request = SignedRequest::new(&url, query.map(QueryParams::Json), body.as_ref());
            if let Some(method) = method {
                request = request.with_method(parse_method(&method)?);
            }

            let signed = provider.sign(&request).await?;
            let headers: serde_json::Map<String, serde_json::Value> = signed
                .pairs()
                .into_iter()
                .map(|(name, value)| (name.to_string(), serde_json::Value::from(value)))
                .collect();
            println!("{}", serde_json::to_string_pretty(&headers)?);
        },
        Commands::Config => {},
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_sign_arguments() {
        let cli = Cli::parse_from([
            "hypernet",
            "sign",
            "/api/v1/user/info",
            "-X",
            "delete",
            "--query",
            r#"{"uid":"1"}"#,
        ]);
        match cli.command {
            Commands::Sign { url, method, query, body } => {
                assert_eq!(url, "/api/v1/user/info");
                assert_eq!(method.as_deref(), Some("delete"));
                assert_eq!(query.as_deref(), Some(r#"{"uid":"1"}"#));
                assert!(body.is_none());
            },
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_method() {
        assert_eq!(parse_method("delete").ok(), Some(Method::DELETE));
        assert_eq!(parse_method("GET").ok(), Some(Method::GET));
        assert!(parse_method("bad method").is_err());
    }

    #[test]
    fn test_explicit_missing_config_is_an_error() {
        let result = resolve_config(Some(PathBuf::from("/nonexistent/hypernet/config.json")));
        let err = result.err().map(|e| e.downcast::<ConfigError>());
        assert!(matches!(err, Some(Ok(ConfigError::NotFound { .. }))));
    }
}
