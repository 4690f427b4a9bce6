use crate::errors::ConfigError;
use std::path::PathBuf;

pub mod aliases;

pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Ollama,
    OpenAi,
}

impl ProviderKind {
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(ProviderKind::Ollama),
            "openai" => Ok(ProviderKind::OpenAi),
            other => Err(ConfigError(format!(
                "unknown HUBIA_PROVIDER '{}' (supported: ollama, openai)",
                other
            ))),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub history_db_path: PathBuf,
    pub cache_db_path: PathBuf,
    pub aliases_path: PathBuf,
    pub provider: ProviderKind,
    pub model_name: String,
    pub ollama_host: String,
    pub openai_base_url: String,
    pub openai_api_key: Option<String>,
    pub model_timeout_secs: u64,
    pub history_turns: u32,
    pub memo_entries: u64,
    pub log_level: String,
}

// Hand-written so the API key never lands in logs.
impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("db_path", &self.db_path)
            .field("history_db_path", &self.history_db_path)
            .field("cache_db_path", &self.cache_db_path)
            .field("aliases_path", &self.aliases_path)
            .field("provider", &self.provider)
            .field("model_name", &self.model_name)
            .field("ollama_host", &self.ollama_host)
            .field("openai_base_url", &self.openai_base_url)
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "***"))
            .field("model_timeout_secs", &self.model_timeout_secs)
            .field("history_turns", &self.history_turns)
            .field("memo_entries", &self.memo_entries)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup; `from_env` uses the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let db_path = PathBuf::from(get("HUBIA_DB").ok_or_else(|| {
            ConfigError("HUBIA_DB is not set (path of the analytical database)".into())
        })?);
        if !db_path.exists() {
            return Err(ConfigError(format!(
                "database not found at {} (set HUBIA_DB to the correct path)",
                db_path.display()
            )));
        }

        let model_name = get("MODEL_NAME")
            .ok_or_else(|| ConfigError("MODEL_NAME is not set".into()))?;

        let provider = match get("HUBIA_PROVIDER") {
            Some(p) => ProviderKind::parse(&p)?,
            None => ProviderKind::Ollama,
        };

        let openai_api_key = get("OPENAI_API_KEY");
        if provider == ProviderKind::OpenAi && openai_api_key.is_none() {
            return Err(ConfigError(
                "OPENAI_API_KEY is required when HUBIA_PROVIDER=openai".into(),
            ));
        }

        Ok(Self {
            db_path,
            history_db_path: get("HUBIA_HISTORY_DB")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("hubia_history.db")),
            cache_db_path: get("CACHE_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("cache_respostas.db")),
            aliases_path: get("HUBIA_TABLE_ALIASES")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("table_aliases.yaml")),
            provider,
            model_name,
            ollama_host: get("OLLAMA_HOST").unwrap_or_else(|| DEFAULT_OLLAMA_HOST.to_string()),
            openai_base_url: get("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            openai_api_key,
            model_timeout_secs: parse_num(get("HUBIA_MODEL_TIMEOUT_SECS"), "HUBIA_MODEL_TIMEOUT_SECS", 60)?,
            history_turns: parse_num(get("HUBIA_HISTORY_TURNS"), "HUBIA_HISTORY_TURNS", 10)?,
            memo_entries: parse_num(get("HUBIA_MEMO_ENTRIES"), "HUBIA_MEMO_ENTRIES", 64)?,
            log_level: get("HUBIA_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_num<T: std::str::FromStr>(
    raw: Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| ConfigError(format!("{} must be a non-negative integer, got '{}'", key, v))),
    }
}
