use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Redis URL for counters, codes, sessions and the lesson cache.
    /// When unset, in-process stores are used (local development only).
    #[serde(default)]
    pub redis_url: Option<String>,
    /// SMTP URL for development email (e.g., smtp://localhost:1025)
    #[serde(default)]
    pub smtp_url: Option<String>,
    /// Resend API key for production email
    #[serde(default)]
    pub resend_api_key: Option<String>,
    /// Gemini API key for lesson generation
    pub gemini_api_key: String,
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,
    /// Comma-separated blocked theme terms, overriding the built-in list
    #[serde(default)]
    pub blocked_themes: Option<String>,
    /// Set to "production" for JSON logging, anything else for human-readable.
    #[serde(default)]
    pub env: String,
    /// Sentry DSN for error tracking
    #[serde(default)]
    pub sentry_dsn: Option<String>,
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".into()
}

impl Config {
    pub fn is_production(&self) -> bool {
        self.env == "production"
    }
}
