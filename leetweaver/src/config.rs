//! Environment-driven configuration.
//!
//! Values come from the process environment (after `.env` is loaded with
//! `dotenv`). CLI flags are applied on top by the binaries.

use anyhow::Result;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::solver::types::Language;
use leetweaver_sdk::log_warning;

pub const DEFAULT_MODEL: &str = "gemini-1.5-pro-latest";
pub const DEFAULT_REQUESTS_PER_MINUTE: usize = 60;
pub const DEFAULT_MAX_ITERATIONS: usize = 5;
pub const DEFAULT_MAX_PROBLEMS: usize = 10;
pub const DEFAULT_SANDBOX_TIMEOUT: Duration = Duration::from_secs(10);

/// Judge account credentials
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Generation backend settings
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    pub requests_per_minute: usize,
    pub temperature: f32,
}

/// Complete runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub llm: LlmConfig,

    /// Code attempts per problem
    pub max_iterations: usize,

    /// Problems per batch run
    pub max_problems: usize,

    /// Run the browser without a window
    pub headless: bool,

    pub language: Language,

    /// External command that runs local tests; enables the Testing phase
    pub sandbox_command: Option<String>,
    pub sandbox_timeout: Duration,

    /// Run the Optimizing phase once per problem
    pub enable_optimization: bool,

    /// Results ledger location (defaults to the user data dir)
    pub results_file: Option<PathBuf>,
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup
    ///
    /// # Arguments
    /// * `lookup` - returns the raw value for a variable name, if set
    ///
    /// # Returns
    /// The configuration, or an error naming every missing required variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let username = get("LEETCODE_USERNAME");
        let password = get("LEETCODE_PASSWORD");
        let api_key = get("GEMINI_API_KEY");

        let missing: Vec<&str> = [
            ("LEETCODE_USERNAME", username.is_none()),
            ("LEETCODE_PASSWORD", password.is_none()),
            ("GEMINI_API_KEY", api_key.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        if !missing.is_empty() {
            anyhow::bail!(
                "Missing required environment variables: {}. Set them in your .env file.",
                missing.join(", ")
            );
        }

        let max_iterations = parse_or_default(&get, "MAX_ITERATIONS", DEFAULT_MAX_ITERATIONS)
            .max(1);
        let max_problems = parse_or_default(&get, "MAX_PROBLEMS", DEFAULT_MAX_PROBLEMS);
        let requests_per_minute =
            parse_or_default(&get, "GEMINI_RPM", DEFAULT_REQUESTS_PER_MINUTE).max(1);
        let sandbox_timeout = Duration::from_secs(parse_or_default(
            &get,
            "SANDBOX_TIMEOUT_SECS",
            DEFAULT_SANDBOX_TIMEOUT.as_secs(),
        ));

        let language = match get("TARGET_LANGUAGE") {
            Some(raw) => raw.parse::<Language>().unwrap_or_else(|e| {
                log_warning!("{} Using default {}.", e, Language::default());
                Language::default()
            }),
            None => Language::default(),
        };

        Ok(Self {
            credentials: Credentials {
                username: username.unwrap_or_default(),
                password: password.unwrap_or_default(),
            },
            llm: LlmConfig {
                api_key: api_key.unwrap_or_default(),
                model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                requests_per_minute,
                temperature: 0.0,
            },
            max_iterations,
            max_problems,
            headless: get("HEADLESS").and_then(|v| parse_bool(&v)).unwrap_or(false),
            language,
            sandbox_command: get("SANDBOX_COMMAND"),
            sandbox_timeout,
            enable_optimization: get("ENABLE_OPTIMIZATION")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(false),
            results_file: get("RESULTS_FILE").map(PathBuf::from),
        })
    }
}

/// Parse a numeric variable, warning and falling back on garbage
fn parse_or_default<T, G>(get: &G, key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display + Copy,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.parse::<T>().unwrap_or_else(|_| {
            log_warning!(
                "{} value '{}' is not a valid number. Using default {}.",
                key,
                raw,
                default
            );
            default
        }),
        None => default,
    }
}

/// Accepts 1/0, true/false, yes/no, on/off
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
