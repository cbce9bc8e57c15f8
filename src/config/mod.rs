//! Application configuration

pub mod prompts;

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use prompts::{builtin as prompts_builtin, PersonalityLoader};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address the chat service binds to and the TUI connects to
    pub host: String,
    pub port: u16,
    /// Inference backend name, currently only "ollama"
    pub provider: String,
    pub model: String,
    pub ollama_url: String,
    /// Token budget passed to the inference backend per reply
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
    pub log_file: PathBuf,
    /// Optional directory with extra personality files
    pub personalities_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self::from_lookup(|key| env::var(key).ok()))
    }

    /// Build a config from any key lookup; unparseable numbers fall back to
    /// their defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".into()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(5001),
            provider: lookup("PROVIDER").unwrap_or_else(|| "ollama".into()),
            model: lookup("MODEL").unwrap_or_else(|| "llama3.2".into()),
            ollama_url: lookup("OLLAMA_URL")
                .unwrap_or_else(|| "http://localhost:11434".into()),
            max_tokens: lookup("MAX_TOKENS")
                .and_then(|t| t.parse().ok())
                .unwrap_or(400),
            request_timeout_secs: lookup("REQUEST_TIMEOUT_SECS")
                .and_then(|t| t.parse().ok())
                .unwrap_or(120),
            log_file: lookup("LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| env::temp_dir().join("personachat.log")),
            personalities_dir: lookup("PERSONALITIES_DIR").map(PathBuf::from),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// URL of the chat endpoint as seen by a client.
    ///
    /// A wildcard bind address is reached through loopback.
    pub fn chat_url(&self) -> String {
        let host = match self.host.as_str() {
            "0.0.0.0" => "127.0.0.1",
            "::" | "[::]" => "[::1]",
            other => other,
        };
        format!("http://{}:{}/chat", host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 5001);
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.max_tokens, 400);
        assert_eq!(config.request_timeout(), Duration::from_secs(120));
        assert!(config.personalities_dir.is_none());
    }

    #[test]
    fn test_overrides_and_bad_numbers() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("MAX_TOKENS", "lots"),
            ("MODEL", "mistral"),
            ("PERSONALITIES_DIR", "/etc/personachat"),
        ]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_tokens, 400);
        assert_eq!(config.model, "mistral");
        assert_eq!(
            config.personalities_dir,
            Some(PathBuf::from("/etc/personachat"))
        );
    }

    #[test]
    fn test_chat_url_uses_loopback_for_wildcard() {
        let config = config_from(&[("HOST", "0.0.0.0"), ("PORT", "5001")]);
        assert_eq!(config.chat_url(), "http://127.0.0.1:5001/chat");

        let config = config_from(&[("HOST", "chat.local")]);
        assert_eq!(config.chat_url(), "http://chat.local:5001/chat");
    }
}
