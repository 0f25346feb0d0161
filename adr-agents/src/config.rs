//! Process configuration
//!
//! Built once at start-up from built-in defaults, an optional TOML file and the environment
//! (in that order of precedence, lowest first) and passed to whatever needs it.

use adr_tools::confluence::{
    ConfluenceSettings, DEFAULT_BASE_URL, DEFAULT_PARENT_PAGE_ID, DEFAULT_SPACE_KEY,
};
use adr_tools::medication_db::{MedicationDbSettings, DEFAULT_DATABASE, DEFAULT_PORT};
use config::{Config, ConfigError, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub gcp: GcpConfig,
    pub llm: LlmConfig,
    pub confluence: ConfluenceConfig,
    pub postgres: PostgresConfig,
    #[serde(default)]
    pub prompts: PromptsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GcpConfig {
    /// Falls back to the metadata server when unset
    pub project: Option<String>,
    pub location: String,
    pub use_vertexai: bool,
    /// Fixed OAuth token, for running outside Google Cloud
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    pub model: String,
    /// Generative Language API key, used when Vertex AI is off
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConfluenceConfig {
    pub base_url: String,
    pub space_key: String,
    pub parent_page_id: Option<String>,
    pub username: Option<String>,
    pub secret_id: Option<String>,
    pub secret_version: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: Option<String>,
    pub password_secret: Option<String>,
    pub password_secret_version: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PromptsConfig {
    pub dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gcp: GcpConfig {
                project: None,
                location: "europe-west1".to_string(),
                use_vertexai: true,
                access_token: None,
            },
            llm: LlmConfig {
                model: adr_llm_sdk::models::gemini::GEMINI_2_5_FLASH.to_string(),
                api_key: None,
            },
            confluence: ConfluenceConfig {
                base_url: DEFAULT_BASE_URL.to_string(),
                space_key: DEFAULT_SPACE_KEY.to_string(),
                parent_page_id: Some(DEFAULT_PARENT_PAGE_ID.to_string()),
                username: None,
                secret_id: None,
                secret_version: None,
            },
            postgres: PostgresConfig {
                host: "localhost".to_string(),
                port: DEFAULT_PORT,
                database: DEFAULT_DATABASE.to_string(),
                user: None,
                password_secret: None,
                password_secret_version: "1".to_string(),
            },
            prompts: PromptsConfig::default(),
        }
    }
}

/// Environment variables and the configuration keys they override
const STRING_OVERRIDES: &[(&str, &str)] = &[
    ("GOOGLE_CLOUD_PROJECT", "gcp.project"),
    ("GOOGLE_CLOUD_LOCATION", "gcp.location"),
    ("GOOGLE_OAUTH_ACCESS_TOKEN", "gcp.access_token"),
    ("GOOGLE_API_KEY", "llm.api_key"),
    ("GEMINI_API_KEY", "llm.api_key"),
    ("ADR_LLM_MODEL", "llm.model"),
    ("CONFLUENCE_BASE_URL", "confluence.base_url"),
    ("CONFLUENCE_SPACE_KEY", "confluence.space_key"),
    ("CONFLUENCE_PARENT_PAGE_ID", "confluence.parent_page_id"),
    ("CONFLUENCE_USERNAME", "confluence.username"),
    ("CONFLUENCE_SECRET_ID", "confluence.secret_id"),
    ("CONFLUENCE_SECRET_VERSION", "confluence.secret_version"),
    ("POSTGRES_HOST", "postgres.host"),
    ("POSTGRES_DATABASE", "postgres.database"),
    ("POSTGRES_USER", "postgres.user"),
    ("POSTGRES_PASSWORD_SECRET", "postgres.password_secret"),
    ("POSTGRES_PASSWORD_SECRET_VERSION", "postgres.password_secret_version"),
    ("ADR_PROMPTS_DIR", "prompts.dir"),
];

/// `1`, `true` and `yes` in any case count as true
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}

impl AppConfig {
    /// Loads from `path` (if given) and the process environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, |name| std::env::var(name).ok())
    }

    /// Like [`AppConfig::load`], reading environment variables through `env`
    pub fn load_with_env<F>(path: Option<&Path>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);

        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::Message(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(File::from(path.to_path_buf()).format(FileFormat::Toml));
        }

        for (var, key) in STRING_OVERRIDES {
            if let Some(value) = env(*var).filter(|v| !v.is_empty()) {
                builder = builder.set_override(*key, value)?;
            }
        }

        if let Some(value) = env("GOOGLE_GENAI_USE_VERTEXAI") {
            builder = builder.set_override("gcp.use_vertexai", is_truthy(&value))?;
        }

        if let Some(value) = env("POSTGRES_PORT") {
            let port: u16 = value.trim().parse().map_err(|_| {
                ConfigError::Message(format!("POSTGRES_PORT is not a valid port: {}", value))
            })?;
            builder = builder.set_override("postgres.port", i64::from(port))?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn prompt_library(&self) -> crate::prompts::PromptLibrary {
        match &self.prompts.dir {
            Some(dir) => crate::prompts::PromptLibrary::with_dir(dir),
            None => crate::prompts::PromptLibrary::embedded(),
        }
    }

    pub fn medication_db_settings(&self, project_id: &str) -> MedicationDbSettings {
        MedicationDbSettings {
            project_id: project_id.to_string(),
            host: self.postgres.host.clone(),
            port: self.postgres.port,
            database: self.postgres.database.clone(),
            user: self.postgres.user.clone(),
            password_secret_id: self.postgres.password_secret.clone(),
            password_secret_version: self.postgres.password_secret_version.clone(),
        }
    }

    pub fn confluence_settings(&self, project_id: &str) -> ConfluenceSettings {
        ConfluenceSettings {
            project_id: project_id.to_string(),
            base_url: self.confluence.base_url.clone(),
            space_key: self.confluence.space_key.clone(),
            parent_page_id: self.confluence.parent_page_id.clone(),
            username: self.confluence.username.clone(),
            secret_id: self.confluence.secret_id.clone(),
            secret_version: self.confluence.secret_version.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::load_with_env(None, env(&[])).unwrap();

        assert_eq!(config.gcp.location, "europe-west1");
        assert!(config.gcp.use_vertexai);
        assert!(config.gcp.project.is_none());
        assert_eq!(config.llm.model, "gemini-2.5-flash");
        assert_eq!(config.confluence.base_url, "https://compeople.atlassian.net/wiki");
        assert_eq!(config.confluence.space_key, "GC");
        assert_eq!(config.confluence.parent_page_id.as_deref(), Some("389185556"));
        assert_eq!(config.postgres.host, "localhost");
        assert_eq!(config.postgres.port, 5432);
        assert_eq!(config.postgres.database, "medicine_details");
        assert_eq!(config.postgres.password_secret_version, "1");
    }

    #[test]
    fn test_environment_overrides() {
        let config = AppConfig::load_with_env(
            None,
            env(&[
                ("GOOGLE_CLOUD_PROJECT", "adr-project"),
                ("GOOGLE_GENAI_USE_VERTEXAI", "False"),
                ("GEMINI_API_KEY", "key"),
                ("CONFLUENCE_USERNAME", "bot@example.com"),
                ("CONFLUENCE_SECRET_ID", "confluence-token"),
                ("CONFLUENCE_SECRET_VERSION", "3"),
                ("POSTGRES_HOST", "10.0.0.5"),
                ("POSTGRES_USER", "reader"),
                ("POSTGRES_PASSWORD_SECRET", "db-password"),
            ]),
        )
        .unwrap();

        assert_eq!(config.gcp.project.as_deref(), Some("adr-project"));
        assert!(!config.gcp.use_vertexai);
        assert_eq!(config.llm.api_key.as_deref(), Some("key"));

        let db = config.medication_db_settings("adr-project");
        assert_eq!(db.host, "10.0.0.5");
        assert_eq!(db.user.as_deref(), Some("reader"));
        assert_eq!(db.password_secret_id.as_deref(), Some("db-password"));

        let confluence = config.confluence_settings("adr-project");
        assert_eq!(confluence.username.as_deref(), Some("bot@example.com"));
        assert_eq!(confluence.secret_version.as_deref(), Some("3"));
    }

    #[test]
    fn test_gemini_key_wins_over_google_key() {
        let config = AppConfig::load_with_env(
            None,
            env(&[("GOOGLE_API_KEY", "google"), ("GEMINI_API_KEY", "gemini")]),
        )
        .unwrap();
        assert_eq!(config.llm.api_key.as_deref(), Some("gemini"));
    }

    #[test]
    fn test_file_then_environment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("adr.toml");
        std::fs::write(
            &path,
            r#"
[gcp]
project = "from-file"
location = "europe-west3"

[postgres]
host = "db.internal"
user = "file-user"
"#,
        )
        .unwrap();

        let config =
            AppConfig::load_with_env(Some(&path), env(&[("POSTGRES_USER", "env-user")])).unwrap();

        assert_eq!(config.gcp.project.as_deref(), Some("from-file"));
        assert_eq!(config.gcp.location, "europe-west3");
        assert_eq!(config.postgres.host, "db.internal");
        assert_eq!(config.postgres.user.as_deref(), Some("env-user"));
        // Untouched keys keep their defaults
        assert_eq!(config.postgres.port, 5432);
    }

    #[test]
    fn test_missing_file() {
        let result = AppConfig::load_with_env(Some(Path::new("/nonexistent/adr.toml")), env(&[]));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_port() {
        let result = AppConfig::load_with_env(None, env(&[("POSTGRES_PORT", "abc")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_truthy() {
        assert!(is_truthy("True"));
        assert!(is_truthy("1"));
        assert!(!is_truthy("false"));
        assert!(!is_truthy(""));
    }
}
