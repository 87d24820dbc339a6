use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use crate::models::{LabelMatching, ScoringPolicy};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub supabase: SupabaseSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseSettings {
    pub url: String,
    pub api_key: String,
    pub timeout_secs: Option<u64>,
}

/// Session verification; disabled when no secret is configured
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: Option<String>,
    pub audience: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    pub redis_url: Option<String>,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_limit")]
    pub default_limit: u16,
    #[serde(default = "default_max_limit")]
    pub max_limit: u16,
    /// How many candidate profiles to pull from the store per request
    ///
    /// The store returns the oldest profiles first, so profiles beyond this
    /// cap are never scored.
    #[serde(default = "default_candidate_pool_size")]
    pub candidate_pool_size: usize,
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,
    #[serde(default = "default_true")]
    pub opposite_role_only: bool,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            candidate_pool_size: default_candidate_pool_size(),
            fetch_concurrency: default_fetch_concurrency(),
            opposite_role_only: true,
        }
    }
}

impl MatchingSettings {
    /// Effective result limit for a request
    pub fn effective_limit(&self, requested: Option<u16>) -> usize {
        requested.unwrap_or(self.default_limit).min(self.max_limit).max(1) as usize
    }
}

fn default_limit() -> u16 { 20 }
fn default_max_limit() -> u16 { 100 }
fn default_candidate_pool_size() -> usize { 200 }
fn default_fetch_concurrency() -> usize { 8 }
fn default_true() -> bool { true }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub label_matching: LabelMatching,
    #[serde(default)]
    pub clamp_to_100: bool,
}

impl ScoringSettings {
    pub fn policy(&self) -> ScoringPolicy {
        ScoringPolicy {
            label_matching: self.label_matching,
            clamp_to_100: self.clamp_to_100,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with INTERGEN)
    /// 5. Supabase's own variable names (SUPABASE_URL, ...)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., INTERGEN__SERVER__PORT -> server.port
            .add_source(environment())
            .build()?;

        apply_supabase_env(settings)?.try_deserialize()
    }
}

fn environment() -> Environment {
    Environment::with_prefix("INTERGEN")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Override settings from the variable names Supabase tooling exports
fn apply_supabase_env(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let overrides = [
        ("supabase.url", "SUPABASE_URL"),
        ("supabase.api_key", "SUPABASE_SERVICE_ROLE_KEY"),
        ("auth.jwt_secret", "SUPABASE_JWT_SECRET"),
    ];

    let mut builder = Config::builder().add_source(settings);
    for (key, var) in overrides {
        if let Ok(value) = env::var(var) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}
