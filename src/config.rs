use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;

use crate::upload::UploadPolicy;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LLMConfig,
    pub upload: UploadPolicy,
    pub history: HistoryConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Clone)]
pub struct LLMConfig {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
}

// Keep the credential out of logs
impl std::fmt::Debug for LLMConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LLMConfig")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct HistoryConfig {
    pub path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GEMINI_API_KEY")
            .or_else(|| lookup("API_KEY"))
            .filter(|k| !k.trim().is_empty());
        let Some(api_key) = api_key else {
            bail!("GEMINI_API_KEY (or API_KEY) environment variable not set");
        };

        let policy_name = lookup("UNICORN_UPLOAD_POLICY").unwrap_or_else(|| "multi".to_string());
        let upload = UploadPolicy::from_name(&policy_name).with_context(|| {
            format!(
                "unknown UNICORN_UPLOAD_POLICY '{}' (expected 'single' or 'multi')",
                policy_name
            )
        })?;

        Ok(Self {
            server: ServerConfig {
                port: lookup("PORT")
                    .unwrap_or_else(|| "3000".to_string())
                    .parse()
                    .context("PORT must be a valid port number")?,
                host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            },
            llm: LLMConfig {
                api_key,
                api_base: lookup("GEMINI_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
                model: lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            },
            upload,
            history: HistoryConfig {
                path: lookup("UNICORN_HISTORY_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(default_history_path),
            },
        })
    }
}

fn default_history_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("unicorn-finder")
        .join("history.json")
}
