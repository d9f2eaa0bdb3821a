//! Process configuration for the relay.
//!
//! Everything is read from the environment once at startup and passed down
//! explicitly; nothing below this module touches `std::env`.

use axum::http::HeaderValue;
use thiserror::Error;
use url::Url;

/// Default summarization endpoint.
pub const DEFAULT_PERPLEXITY_URL: &str = "https://api.perplexity.ai/chat/completions";

/// Default listening port.
pub const DEFAULT_PORT: u16 = 8000;

/// Origins allowed to call the API with credentials unless overridden.
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = [
    "http://localhost:3000",
    "https://your-frontend-domain.vercel.app",
];

const PERPLEXITY_API_KEY_ENV: &str = "PERPLEXITY_API_KEY";
const PERPLEXITY_API_URL_ENV: &str = "PERPLEXITY_API_URL";
const SUPABASE_URL_ENV: &str = "SUPABASE_URL";
const SUPABASE_API_KEY_ENV: &str = "SUPABASE_API_KEY";
const PORT_ENV: &str = "RELAY_PORT";
const ORIGINS_ENV: &str = "CORS_ALLOWED_ORIGINS";

/// Configuration errors detected while loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A URL-valued setting did not parse.
    #[error("invalid url in {name}: {source}")]
    InvalidUrl {
        /// Environment variable name.
        name: &'static str,
        /// Parse failure.
        source: url::ParseError,
    },
    /// Port was not a valid `u16`.
    #[error("invalid port in RELAY_PORT: {0}")]
    InvalidPort(String),
    /// An allowed origin is not a valid header value.
    #[error("invalid origin in CORS_ALLOWED_ORIGINS: {0}")]
    InvalidOrigin(String),
}

/// Summarization API settings.
#[derive(Clone, Debug)]
pub struct PerplexityConfig {
    /// Bearer credential. `None` degrades every request to a generation error.
    pub api_key: Option<String>,
    /// Endpoint receiving the `{query, focus, context?}` payload.
    pub endpoint: String,
}

impl Default for PerplexityConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_PERPLEXITY_URL.to_string(),
        }
    }
}

/// Datastore settings. Both values are required by the audit client; missing
/// ones only fault the logging attempt.
#[derive(Clone, Debug, Default)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    pub url: Option<Url>,
    /// Service or anon API key.
    pub api_key: Option<String>,
}

/// HTTP listener settings.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// TCP port bound on all interfaces.
    pub port: u16,
    /// Origins allowed by the CORS layer.
    pub allowed_origins: Vec<HeaderValue>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            allowed_origins: DEFAULT_ALLOWED_ORIGINS
                .into_iter()
                .map(HeaderValue::from_static)
                .collect(),
        }
    }
}

/// Top-level relay configuration.
#[derive(Clone, Debug, Default)]
pub struct RelayConfig {
    /// Summarization API.
    pub perplexity: PerplexityConfig,
    /// Audit datastore.
    pub supabase: SupabaseConfig,
    /// HTTP server.
    pub server: ServerConfig,
}

impl RelayConfig {
    /// Load configuration from process environment variables.
    ///
    /// # Errors
    /// Returns an error if a present value is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    /// Returns an error if a present value is malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let endpoint = match get(PERPLEXITY_API_URL_ENV) {
            Some(raw) => parse_url(PERPLEXITY_API_URL_ENV, &raw)?.to_string(),
            None => DEFAULT_PERPLEXITY_URL.to_string(),
        };

        let supabase_url = get(SUPABASE_URL_ENV)
            .map(|raw| parse_url(SUPABASE_URL_ENV, &raw))
            .transpose()?;

        let port = match get(PORT_ENV) {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let allowed_origins = match get(ORIGINS_ENV) {
            Some(raw) => parse_origins(&raw)?,
            None => ServerConfig::default().allowed_origins,
        };

        Ok(Self {
            perplexity: PerplexityConfig {
                api_key: get(PERPLEXITY_API_KEY_ENV),
                endpoint,
            },
            supabase: SupabaseConfig {
                url: supabase_url,
                api_key: get(SUPABASE_API_KEY_ENV),
            },
            server: ServerConfig {
                port,
                allowed_origins,
            },
        })
    }
}

fn parse_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|source| ConfigError::InvalidUrl { name, source })
}

fn parse_origins(raw: &str) -> Result<Vec<HeaderValue>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|_| ConfigError::InvalidOrigin(origin.to_string()))
        })
        .collect()
}
