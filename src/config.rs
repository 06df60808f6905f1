// Application configuration loaded once at startup
//
// Settings come from the process environment, seeded from `.env` files:
// `.env.local` and `.env` in the working directory, then `cinebot/.env`
// under the platform config directory. Earlier files win because dotenvy
// never overwrites a variable that is already set.

use crate::agent::DEFAULT_MAX_ITERATIONS;
use crate::error::{CinebotError, Result};
use crate::llm::LlmProvider;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const PROVIDER_VAR: &str = "CINEBOT_PROVIDER";
pub const MODEL_VAR: &str = "CINEBOT_MODEL";
pub const API_BASE_VAR: &str = "CINEBOT_API_BASE";
pub const MAX_ITERATIONS_VAR: &str = "CINEBOT_MAX_ITERATIONS";
pub const HTTP_TIMEOUT_VAR: &str = "CINEBOT_HTTP_TIMEOUT_SECS";

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Resolved runtime configuration
///
/// Immutable after loading; `main` hands pieces of it to the LLM adapter,
/// the tools and the agent.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub provider: LlmProvider,

    /// None only for providers that need no key (Ollama)
    pub api_key: Option<String>,

    pub model: String,

    /// Base URL override; the provider default applies when None
    pub api_base: Option<String>,

    pub max_iterations: u32,

    pub http_timeout: Duration,
}

impl AppConfig {
    /// Load `.env` files and read configuration from the environment
    ///
    /// # Errors
    /// - `EnvError` when the provider's API key is missing or blank
    /// - `ConfigError` for an unknown provider or unparsable numbers
    pub fn load() -> Result<Self> {
        for path in env_files() {
            match dotenvy::from_path(&path) {
                Ok(()) => tracing::info!("Loaded environment from {}", path.display()),
                Err(e) if e.not_found() => {}
                Err(e) => tracing::warn!("Ignoring {}: {}", path.display(), e),
            }
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let provider = match value(PROVIDER_VAR) {
            Some(name) => LlmProvider::parse(&name).ok_or_else(|| {
                CinebotError::ConfigError(format!(
                    "{} must be one of gemini, openrouter, openai, ollama (got {:?})",
                    PROVIDER_VAR, name
                ))
            })?,
            None => LlmProvider::Gemini,
        };

        let api_key = if provider.requires_api_key() {
            let var = provider.default_env_var();
            Some(value(var).ok_or_else(|| {
                CinebotError::EnvError(format!(
                    "{} environment variable not set (required for {})",
                    var,
                    provider.display_name()
                ))
            })?)
        } else {
            None
        };

        let model = value(MODEL_VAR).unwrap_or_else(|| provider.default_model().to_string());
        let api_base = value(API_BASE_VAR);

        let max_iterations = match value(MAX_ITERATIONS_VAR) {
            Some(raw) => parse_number::<u32>(MAX_ITERATIONS_VAR, &raw)?,
            None => DEFAULT_MAX_ITERATIONS,
        };
        if max_iterations == 0 {
            return Err(CinebotError::ConfigError(format!(
                "{} must be at least 1",
                MAX_ITERATIONS_VAR
            )));
        }

        let timeout_secs = match value(HTTP_TIMEOUT_VAR) {
            Some(raw) => parse_number::<u64>(HTTP_TIMEOUT_VAR, &raw)?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        Ok(Self {
            provider,
            api_key,
            model,
            api_base,
            max_iterations,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.parse().map_err(|_| {
        CinebotError::ConfigError(format!("{} must be a whole number (got {:?})", key, raw))
    })
}

/// Candidate `.env` files in priority order
fn env_files() -> Vec<PathBuf> {
    let mut files = vec![PathBuf::from(".env.local"), PathBuf::from(".env")];
    if let Some(dir) = dirs::config_dir() {
        files.push(user_env_file(&dir));
    }
    files
}

fn user_env_file(config_dir: &Path) -> PathBuf {
    config_dir.join("cinebot").join(".env")
}
