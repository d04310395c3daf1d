use anyhow::{bail, Context, Result};

use crate::layout::PageGeometry;

/// Object storage for authenticated media uploads.
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Prefix of the durable URLs handed back after an upload.
    pub public_base_url: String,
}

/// Application configuration loaded from environment variables.
/// Only malformed values are fatal; every backend has a local fallback.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub local_cache_path: String,
    pub database_url: Option<String>,
    pub s3: Option<S3Config>,
    pub page_geometry: PageGeometry,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let page_size = optional_env("EXPORT_PAGE_SIZE").unwrap_or_else(|| "a4".to_string());
        let page_geometry = PageGeometry::from_name(&page_size)
            .with_context(|| format!("EXPORT_PAGE_SIZE must be 'a4' or 'letter', got '{page_size}'"))?;

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            local_cache_path: optional_env("LOCAL_CACHE_PATH")
                .unwrap_or_else(|| "./resume-cache.json".to_string()),
            database_url: optional_env("DATABASE_URL"),
            s3: s3_from_env()?,
            page_geometry,
        })
    }
}

/// All four S3 variables or none of them.
fn s3_from_env() -> Result<Option<S3Config>> {
    const KEYS: [&str; 4] = ["S3_BUCKET", "S3_ENDPOINT", "AWS_ACCESS_KEY_ID", "AWS_SECRET_ACCESS_KEY"];
    let present: Vec<&str> = KEYS
        .into_iter()
        .filter(|key| optional_env(key).is_some())
        .collect();
    if present.is_empty() {
        return Ok(None);
    }
    if present.len() != KEYS.len() {
        bail!("S3 configuration is partial: set all of {KEYS:?} or none (found {present:?})");
    }

    let bucket = require_env("S3_BUCKET")?;
    let endpoint = require_env("S3_ENDPOINT")?;
    let public_base_url = optional_env("MEDIA_PUBLIC_BASE_URL")
        .unwrap_or_else(|| format!("{}/{}", endpoint.trim_end_matches('/'), bucket));
    Ok(Some(S3Config {
        bucket,
        endpoint,
        access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
        secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
        public_base_url,
    }))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
