use std::collections::HashMap;
use std::time::Duration;

use anyhow::{bail, Result};

/// Full application configuration, resolved once at startup.
/// The model API key comes from env/.env only and is never logged.
#[derive(Clone)]
pub struct Config {
    pub google_api_key: String,
    /// Base model name, e.g. "gemini-1.5-flash".
    pub model: String,
    /// Ask the model for `application/json` output.
    pub model_json_mode: bool,
    pub gemini_base_url: String,

    // Model call policy
    pub model_timeout_s: u64,
    pub model_max_retries: u32,
    pub model_retry_backoff_ms: u64,

    // Web server
    pub web_bind: String,
    pub web_port: u16,

    /// Optional JSON file replacing the built-in rights library.
    pub rights_library_path: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("google_api_key", &"<redacted>")
            .field("model", &self.model)
            .field("model_json_mode", &self.model_json_mode)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("model_timeout_s", &self.model_timeout_s)
            .field("model_max_retries", &self.model_max_retries)
            .field("model_retry_backoff_ms", &self.model_retry_backoff_ms)
            .field("web_bind", &self.web_bind)
            .field("web_port", &self.web_port)
            .field("rights_library_path", &self.rights_library_path)
            .finish()
    }
}

fn parse_dotenv() -> HashMap<String, String> {
    let mut map = HashMap::new();
    let Ok(contents) = std::fs::read_to_string(".env") else {
        return map;
    };
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((k, v)) = line.split_once('=') {
            let v = v.trim().trim_matches('"');
            map.insert(k.trim().to_string(), v.to_string());
        }
    }
    map
}

fn get_str(get: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    get(key).unwrap_or_else(|| default.to_string())
}

fn get_bool(get: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> bool {
    match get(key).as_deref() {
        Some("true") | Some("1") => true,
        Some("false") | Some("0") => false,
        Some(_) => default,
        None => default,
    }
}

fn get_u64(get: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> u64 {
    get(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn get_u32(get: &impl Fn(&str) -> Option<String>, key: &str, default: u32) -> u32 {
    get(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn get_u16(get: &impl Fn(&str) -> Option<String>, key: &str, default: u16) -> u16 {
    get(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

impl Config {
    /// Read configuration from the process environment, falling back to `.env`.
    pub fn from_env() -> Result<Self> {
        let dotenv = parse_dotenv();
        Self::from_lookup(|key| {
            std::env::var(key)
                .ok()
                .or_else(|| dotenv.get(key).cloned())
        })
    }

    /// Build a config from any key lookup. Fails if the model API key is missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string());

        let google_api_key = get_str(&get, "GOOGLE_API_KEY", "");
        if google_api_key.is_empty() {
            bail!("GOOGLE_API_KEY is required (set it in the environment or .env)");
        }

        let model = get_str(&get, "MODEL", "gemini-1.5-flash");
        if model.is_empty() {
            bail!("MODEL must not be empty");
        }

        let model_timeout_s = get_u64(&get, "MODEL_TIMEOUT_S", 30);
        if model_timeout_s == 0 {
            bail!("MODEL_TIMEOUT_S must be at least 1");
        }

        Ok(Config {
            google_api_key,
            model,
            model_json_mode: get_bool(&get, "MODEL_JSON_MODE", true),
            gemini_base_url: get_str(
                &get,
                "GEMINI_BASE_URL",
                "https://generativelanguage.googleapis.com",
            ),
            model_timeout_s,
            model_max_retries: get_u32(&get, "MODEL_MAX_RETRIES", 1),
            model_retry_backoff_ms: get_u64(&get, "MODEL_RETRY_BACKOFF_MS", 500),
            web_bind: get_str(&get, "WEB_BIND", "127.0.0.1"),
            web_port: get_u16(&get, "WEB_PORT", 5000),
            rights_library_path: get("RIGHTS_LIBRARY_PATH").filter(|p| !p.is_empty()),
        })
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model_timeout_s)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.model_retry_backoff_ms)
    }

    pub fn web_addr(&self) -> String {
        format!("{}:{}", self.web_bind, self.web_port)
    }
}
