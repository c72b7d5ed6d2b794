//! Configuration module
//!
//! Client configuration read from the environment (after loading a `.env` file
//! if present): API location, session credentials, the target course and the
//! upload scheduling policy.

use std::env;
use std::time::Duration;

use crate::models::{CourseId, UserId};

const DEFAULT_API_URL: &str = "http://localhost:3000/api";
const DEFAULT_UPLOAD_CONCURRENCY: usize = 3;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;
const BYTES_PER_MB: u64 = 1024 * 1024;

/// How queued uploads are scheduled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UploadPolicy {
    /// Group size when `barrier` is set, otherwise the sliding window width.
    /// Also the session-wide cap on simultaneously uploading items.
    pub concurrency: usize,
    /// Run groups strictly one after another, each waiting for every member to
    /// settle before the next group starts.
    pub barrier: bool,
    /// Optional client-side size ceiling applied at intake.
    pub max_file_size_bytes: Option<u64>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_UPLOAD_CONCURRENCY,
            barrier: true,
            max_file_size_bytes: None,
        }
    }
}

impl UploadPolicy {
    pub fn batched(group_size: usize) -> Self {
        Self {
            concurrency: group_size.max(1),
            ..Self::default()
        }
    }

    pub fn sliding(window: usize) -> Self {
        Self {
            concurrency: window.max(1),
            barrier: false,
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_url: String,
    pub session_token: String,
    pub course_id: Option<CourseId>,
    pub user_id: Option<UserId>,
    pub http_timeout: Duration,
    pub upload: UploadPolicy,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup (the environment in
    /// production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("LECTERN_API_URL")
            .or_else(|| lookup("API_URL"))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = api_url.trim().trim_end_matches('/').to_string();
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(anyhow::anyhow!(
                "LECTERN_API_URL must be an http(s) URL, got '{}'",
                api_url
            ));
        }

        let session_token = lookup("LECTERN_SESSION_TOKEN")
            .or_else(|| lookup("SESSION_TOKEN"))
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!("Missing session token. Set LECTERN_SESSION_TOKEN or SESSION_TOKEN")
            })?;

        let course_id = parse_optional::<CourseId>(&lookup, "LECTERN_COURSE_ID")?;
        let user_id = parse_optional::<UserId>(&lookup, "LECTERN_USER_ID")?;

        let concurrency = parse_optional::<usize>(&lookup, "LECTERN_UPLOAD_CONCURRENCY")?
            .unwrap_or(DEFAULT_UPLOAD_CONCURRENCY);
        if concurrency == 0 {
            return Err(anyhow::anyhow!(
                "LECTERN_UPLOAD_CONCURRENCY must be at least 1"
            ));
        }

        let barrier = match lookup("LECTERN_UPLOAD_BARRIER") {
            Some(value) => parse_bool(&value).ok_or_else(|| {
                anyhow::anyhow!("LECTERN_UPLOAD_BARRIER must be true or false, got '{}'", value)
            })?,
            None => true,
        };

        let max_file_size_bytes = parse_optional::<u64>(&lookup, "LECTERN_MAX_FILE_SIZE_MB")?
            .map(|mb| mb.saturating_mul(BYTES_PER_MB));

        let http_timeout_secs = parse_optional::<u64>(&lookup, "LECTERN_HTTP_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);

        Ok(Self {
            api_url,
            session_token,
            course_id,
            user_id,
            http_timeout: Duration::from_secs(http_timeout_secs),
            upload: UploadPolicy {
                concurrency,
                barrier,
                max_file_size_bytes,
            },
        })
    }
}

fn parse_optional<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, anyhow::Error>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: '{}' ({})", key, raw, e)),
        _ => Ok(None),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
