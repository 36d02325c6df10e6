use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub default_model: String,
    pub static_dir: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
            gemini_api_key: env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
            gemini_base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string()),
            default_model: env::var("DEFAULT_MODEL")
                .unwrap_or_else(|_| "gemini-2.0-flash-001".to_string()),
            static_dir: env::var("STATIC_DIR")
                .unwrap_or_else(|_| "crates/server/static".to_string()),
        }
    }
}
