//! Session token operator tool.
//!
//! Signs and inspects session tokens with the key configured in
//! `AUTH_JWT_BASE64_HS256_SECRET`, and generates keys to put there.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::Value;
use session_token::jwt::ClaimMap;
use session_token::observability::{init_tracing, TracingConfig};
use session_token::{Config, EnvSettings, KeyOrigin, SessionRequest, SigningKey, TokenSigner};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "session-token")]
#[command(version, about = "Sign and inspect HS256 session tokens", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a fresh base64 signing key
    Keygen,

    #[command(flatten)]
    Token(TokenCommand),
}

/// Commands that need a started signer.
#[derive(Subcommand)]
enum TokenCommand {
    /// Issue a token for a user
    Issue {
        /// User login placed in `sub`
        login: String,

        /// Lifetime in seconds (defaults to SESSION_TTL_SECONDS)
        #[arg(long)]
        ttl: Option<i64>,

        /// Extra claim as name=value (repeatable)
        #[arg(long = "claim", value_parser = parse_claim)]
        claims: Vec<(String, Value)>,
    },

    /// Decode a token and print its claims
    Inspect {
        /// Compact token
        token: String,
    },

    /// Re-sign a valid token with a new expiration
    Refresh {
        /// Compact token
        token: String,

        /// Lifetime in seconds (defaults to REFRESH_TTL_SECONDS)
        #[arg(long)]
        ttl: Option<i64>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env().context("invalid configuration")?;
    init_tracing(&TracingConfig::from_config(&config));

    match cli.command {
        Commands::Keygen => {
            println!("{}", SigningKey::generate().to_base64().as_str());
            Ok(())
        }
        Commands::Token(command) => run_with_signer(&config, command),
    }
}

fn run_with_signer(config: &Config, command: TokenCommand) -> anyhow::Result<()> {
    let signer = TokenSigner::with_settings(Arc::new(EnvSettings::load()));
    let origin = signer.start().context("failed to start session token signer")?;
    if origin == KeyOrigin::Generated {
        warn!("No signing key configured; tokens will not verify in any other process");
    }

    let result = run(&signer, config, command);
    signer.stop();
    result
}

fn run(signer: &TokenSigner, config: &Config, command: TokenCommand) -> anyhow::Result<()> {
    match command {
        TokenCommand::Issue { login, ttl, claims } => {
            let properties: ClaimMap = claims.into_iter().collect();
            let request = SessionRequest::with_properties(
                login,
                ttl.unwrap_or(config.session_ttl_seconds),
                properties,
            )?;
            println!("{}", signer.encode(&request)?);
            Ok(())
        }
        TokenCommand::Inspect { token } => match signer.decode(&token)? {
            Some(claims) => {
                println!("{}", serde_json::to_string_pretty(&claims.to_claim_map())?);
                Ok(())
            }
            None => bail!("token is expired or its signature does not match"),
        },
        TokenCommand::Refresh { token, ttl } => {
            let Some(claims) = signer.decode(&token)? else {
                bail!("token is expired or its signature does not match");
            };
            let refreshed = signer.refresh(&claims, ttl.unwrap_or(config.refresh_ttl_seconds))?;
            info!(subject = claims.subject(), "Token refreshed");
            println!("{refreshed}");
            Ok(())
        }
    }
}

/// Parse `name=value`. Values that read as JSON numbers or booleans keep that
/// type; everything else is a string.
fn parse_claim(raw: &str) -> Result<(String, Value), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))?;
    if name.is_empty() {
        return Err("claim name cannot be empty".to_string());
    }
    let value = match serde_json::from_str::<Value>(value) {
        Ok(v @ (Value::Number(_) | Value::Bool(_))) => v,
        _ => Value::from(value),
    };
    Ok((name.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_claim_types() {
        assert_eq!(parse_claim("role=admin").unwrap(), ("role".to_string(), Value::from("admin")));
        assert_eq!(parse_claim("level=3").unwrap().1, Value::from(3));
        assert_eq!(parse_claim("admin=true").unwrap().1, Value::from(true));
        assert_eq!(parse_claim("note=a=b").unwrap().1, Value::from("a=b"));
    }

    #[test]
    fn test_parse_claim_rejects_bad_input() {
        assert!(parse_claim("novalue").is_err());
        assert!(parse_claim("=x").is_err());
    }

    #[test]
    fn test_cli_parses_issue() {
        let cli = Cli::try_parse_from([
            "session-token",
            "issue",
            "alice",
            "--ttl",
            "60",
            "--claim",
            "role=admin",
        ])
        .unwrap();

        match cli.command {
            Commands::Token(TokenCommand::Issue { login, ttl, claims }) => {
                assert_eq!(login, "alice");
                assert_eq!(ttl, Some(60));
                assert_eq!(claims.len(), 1);
            }
            _ => panic!("expected issue command"),
        }
    }

    #[test]
    fn test_cli_parses_keygen_and_inspect() {
        let cli = Cli::try_parse_from(["session-token", "keygen"]).unwrap();
        assert!(matches!(cli.command, Commands::Keygen));

        let cli = Cli::try_parse_from(["session-token", "inspect", "a.b.c"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Token(TokenCommand::Inspect { token }) if token == "a.b.c"
        ));
    }
}
