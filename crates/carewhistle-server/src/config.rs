use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::warn;

use carewhistle_crypto::keys::ContactKey;

const PLACEHOLDER_SECRET: &str = "dev-secret-change-me";

pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub session_secret: String,
    pub session_ttl: chrono::Duration,
    pub contact_key: ContactKey,
    pub seed_demo: bool,
}

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl ServerConfig {
    /// Read `CAREWHISTLE_*` variables, falling back to development defaults.
    pub fn from_env() -> Result<Self> {
        let host = var("CAREWHISTLE_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = var("CAREWHISTLE_PORT")
            .unwrap_or_else(|| "8000".into())
            .parse()
            .context("CAREWHISTLE_PORT must be a port number")?;
        let db_path: PathBuf = var("CAREWHISTLE_DB_PATH")
            .unwrap_or_else(|| "carewhistle.db".into())
            .into();

        let session_secret = var("CAREWHISTLE_SESSION_SECRET").unwrap_or_else(|| {
            warn!("CAREWHISTLE_SESSION_SECRET is unset; using the development placeholder");
            PLACEHOLDER_SECRET.into()
        });
        if session_secret == PLACEHOLDER_SECRET {
            warn!("Sessions are signed with a placeholder secret. Do not run this in production.");
        }

        let ttl_hours: i64 = var("CAREWHISTLE_SESSION_TTL_HOURS")
            .map(|v| v.parse())
            .transpose()
            .context("CAREWHISTLE_SESSION_TTL_HOURS must be a whole number")?
            .unwrap_or(12);
        if ttl_hours <= 0 {
            anyhow::bail!("CAREWHISTLE_SESSION_TTL_HOURS must be positive");
        }

        let contact_key = match var("CAREWHISTLE_CONTACT_KEY") {
            Some(encoded) => ContactKey::from_base64(&encoded)
                .context("CAREWHISTLE_CONTACT_KEY must be 32 bytes of base64")?,
            None => {
                warn!(
                    "CAREWHISTLE_CONTACT_KEY is unset; reporter contact details sealed by this process \
                     will be unreadable after restart"
                );
                ContactKey::generate()
            }
        };

        let seed_demo = match var("CAREWHISTLE_SEED_DEMO") {
            Some(v) => parse_bool(&v)
                .with_context(|| format!("CAREWHISTLE_SEED_DEMO: expected true/false, got {v:?}"))?,
            None => true,
        };

        Ok(Self {
            host,
            port,
            db_path,
            session_secret,
            session_ttl: chrono::Duration::hours(ttl_hours),
            contact_key,
            seed_demo,
        })
    }
}
