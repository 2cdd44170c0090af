use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use tablecopy_core::provision::PollConfig;
use tablecopy_core::retry::RetryPolicy;
use thiserror::Error;

const DEFAULT_REGION: &str = "us-west-2";

/// Errors raised while reading the environment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: '{value}' is not a non-negative integer")]
    InvalidNumber { name: &'static str, value: String },
    #[error("Invalid value for {name}: must be at least 1")]
    Zero { name: &'static str },
}

/// Where AWS credentials come from.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// A named profile from the shared config files.
    Profile(String),
    /// Static keys taken from the environment.
    Static {
        access_key_id: String,
        secret_access_key: String,
    },
    /// The SDK's default provider chain.
    Default,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Profile(name) => f.debug_tuple("Profile").field(name).finish(),
            Self::Static { access_key_id, .. } => f
                .debug_struct("Static")
                .field("access_key_id", access_key_id)
                .field("secret_access_key", &"<redacted>")
                .finish(),
            Self::Default => f.write_str("Default"),
        }
    }
}

impl fmt::Display for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Profile(name) => write!(f, "profile '{}'", name),
            Self::Static { .. } => f.write_str("static keys"),
            Self::Default => f.write_str("default chain"),
        }
    }
}

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// AWS region (default: us-west-2)
    pub region: String,
    pub credentials: Credentials,
    /// Custom endpoint URL, e.g. a local DynamoDB
    pub endpoint_url: Option<String>,
    pub disable_creation: bool,
    pub disable_datacopy: bool,
    pub poll: PollConfig,
    pub retry: RetryPolicy,
    /// Where copy progress is persisted between runs
    pub checkpoint_file: Option<PathBuf>,
    /// JSON attribute template replacing the built-in one
    pub template_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// Variable names are matched case-insensitively:
    /// - `AWS_DEFAULT_REGION` - region (default: us-west-2)
    /// - `PROFILE_NAME` - credentials profile
    /// - `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` - static keys, used
    ///   only without a profile and when both are set
    /// - `AWS_ENDPOINT_URL` - custom endpoint
    /// - `DISABLE_CREATION` / `DISABLE_DATACOPY` - skip a phase
    /// - `POLL_INITIAL_DELAY_SECS` (5), `POLL_INTERVAL_SECS` (3),
    ///   `POLL_TIMEOUT_SECS` (600) - waiting for the new table
    /// - `MAX_RETRIES` (8) - attempts per throttled call
    /// - `CHECKPOINT_FILE` - resumable copy progress
    /// - `ATTRIBUTE_TEMPLATE_FILE` - template override
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(
            env::vars_os().filter_map(|(name, value)| {
                Some((name.into_string().ok()?, value.into_string().ok()?))
            }),
        )
    }

    /// Load configuration from `(name, value)` pairs.
    ///
    /// When a name is present in several casings the upper-case one wins.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut env: HashMap<String, String> = HashMap::new();
        for (name, value) in vars {
            let upper = name.to_ascii_uppercase();
            if upper == name {
                env.insert(upper, value);
            } else {
                env.entry(upper).or_insert(value);
            }
        }
        let var = |name: &str| env.get(name).filter(|v| !v.is_empty()).cloned();
        let secs = |name: &'static str, default: u64| -> Result<Duration, ConfigError> {
            Ok(Duration::from_secs(number(name, var(name), default)?))
        };

        let credentials = match (
            var("PROFILE_NAME"),
            var("AWS_ACCESS_KEY_ID"),
            var("AWS_SECRET_ACCESS_KEY"),
        ) {
            (Some(profile), _, _) => Credentials::Profile(profile),
            (None, Some(access_key_id), Some(secret_access_key)) => Credentials::Static {
                access_key_id,
                secret_access_key,
            },
            _ => Credentials::Default,
        };

        let max_attempts = number("MAX_RETRIES", var("MAX_RETRIES"), 8)?;

        Ok(Self {
            region: var("AWS_DEFAULT_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            credentials,
            endpoint_url: var("AWS_ENDPOINT_URL"),
            disable_creation: flag(var("DISABLE_CREATION")),
            disable_datacopy: flag(var("DISABLE_DATACOPY")),
            poll: PollConfig {
                initial_delay: secs("POLL_INITIAL_DELAY_SECS", 5)?,
                interval: positive(secs("POLL_INTERVAL_SECS", 3)?, "POLL_INTERVAL_SECS")?,
                timeout: secs("POLL_TIMEOUT_SECS", 600)?,
            },
            retry: RetryPolicy::default()
                .with_max_attempts(u32::try_from(max_attempts).unwrap_or(u32::MAX)),
            checkpoint_file: var("CHECKPOINT_FILE").map(PathBuf::from),
            template_file: var("ATTRIBUTE_TEMPLATE_FILE").map(PathBuf::from),
        })
    }

    /// Returns a display string for the target environment.
    pub fn target_display(&self) -> String {
        match &self.endpoint_url {
            Some(url) => format!("Local DynamoDB ({}, region: {})", url, self.region),
            None => format!("AWS DynamoDB (region: {})", self.region),
        }
    }
}

/// A flag is set by any non-empty value other than 0, false, no or off.
fn flag(value: Option<String>) -> bool {
    match value {
        Some(value) => !matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "" | "0" | "false" | "no" | "off"
        ),
        None => false,
    }
}

fn number(name: &'static str, value: Option<String>, default: u64) -> Result<u64, ConfigError> {
    match value {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
        None => Ok(default),
    }
}

fn positive(duration: Duration, name: &'static str) -> Result<Duration, ConfigError> {
    if duration.is_zero() {
        Err(ConfigError::Zero { name })
    } else {
        Ok(duration)
    }
}
