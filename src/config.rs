use clap::Parser;
use std::net::{IpAddr, SocketAddr};

use crate::error::{Error, Result};

// CLI argument structure, every flag can also come from the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "discogs-reconcile")]
#[command(about = "OpenRefine reconciliation service for the Discogs API")]
pub struct Args {
    // Discogs personal access token
    #[arg(long, env = "TOKEN", hide_env_values = true)]
    pub token: String,

    // Discogs account the token belongs to (informational)
    #[arg(long, env = "DISCOGS_USER")]
    pub discogs_user: Option<String>,

    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 3456)]
    pub port: u16,

    // Address to bind
    #[arg(long, env = "BIND", default_value = "0.0.0.0")]
    pub bind: IpAddr,

    // Discogs API root (search and detail records)
    #[arg(long, env = "DISCOGS_API_BASE", default_value = "https://api.discogs.com")]
    pub api_base: String,

    // Public site root used to build entity URIs
    #[arg(long, env = "DISCOGS_PUBLIC_BASE", default_value = "https://www.discogs.com")]
    pub public_base: String,

    // tracing filter directive
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    // Shortcut for --log-level debug
    #[arg(short, long)]
    pub debug: bool,
}

/// Validated runtime configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub discogs_user: Option<String>,
    pub addr: SocketAddr,
    pub api_base: String,
    pub public_base: String,
    pub log_level: String,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self> {
        // .env files often carry the token quoted
        let token = args.token.trim().trim_matches('\'').trim().to_string();
        if token.is_empty() {
            return Err(Error::InvalidConfig {
                message: "The TOKEN field is required".to_string(),
            });
        }

        let api_base = normalize_base("DISCOGS_API_BASE", &args.api_base)?;
        let public_base = normalize_base("DISCOGS_PUBLIC_BASE", &args.public_base)?;

        let log_level = if args.debug {
            "debug".to_string()
        } else {
            args.log_level
        };

        Ok(Self {
            token,
            discogs_user: args.discogs_user.filter(|user| !user.trim().is_empty()),
            addr: SocketAddr::new(args.bind, args.port),
            api_base,
            public_base,
            log_level,
        })
    }
}

fn normalize_base(field: &str, raw: &str) -> Result<String> {
    let base = raw.trim().trim_end_matches('/');
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(Error::InvalidConfig {
            message: format!("The {field} field must be an http(s) URL, got \"{raw}\""),
        });
    }
    Ok(base.to_string())
}
