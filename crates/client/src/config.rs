use std::{env, time::Duration};

use eyre::{Result, WrapErr, eyre};
use serde::Deserialize;

use crate::poller::PollOptions;

/// Configuration for API consumers and feed watchers.
///
/// Every value except the API URL has a default, so a bare
/// `COUNSELSYNC_API_URL` is enough to start polling.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the CounselSync API, without a trailing slash
    pub api_url: String,
    /// Backoff settings shared by every feed
    pub poll: PollOptions,
    /// Upper bound on a single HTTP request
    pub http_timeout: Duration,
}

fn parse_var<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .wrap_err_with(|| format!("{} has an invalid value", key)),
        None => Ok(default),
    }
}

impl ClientConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("COUNSELSYNC_API_URL")
            .ok_or_else(|| eyre!("COUNSELSYNC_API_URL environment variable not set"))?
            .trim_end_matches('/')
            .to_string();

        let defaults = PollOptions::default();
        let poll = PollOptions {
            initial: Duration::from_millis(parse_var(
                &lookup,
                "POLL_INITIAL_MS",
                defaults.initial.as_millis() as u64,
            )?),
            min: Duration::from_millis(parse_var(
                &lookup,
                "POLL_MIN_MS",
                defaults.min.as_millis() as u64,
            )?),
            max: Duration::from_millis(parse_var(
                &lookup,
                "POLL_MAX_MS",
                defaults.max.as_millis() as u64,
            )?),
            success_factor: parse_var(&lookup, "POLL_SUCCESS_FACTOR", defaults.success_factor)?,
            failure_factor: parse_var(&lookup, "POLL_FAILURE_FACTOR", defaults.failure_factor)?,
        };
        poll.validate()?;

        let http_timeout = Duration::from_secs(parse_var(&lookup, "HTTP_TIMEOUT_SECONDS", 10)?);

        Ok(Self {
            api_url,
            poll,
            http_timeout,
        })
    }
}
