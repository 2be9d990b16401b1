//! Provisioning settings from YAML and the per-run configuration

use crate::provision::credentials::Credentials;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings file looked up in the working directory when `--config` is absent
pub const DEFAULT_SETTINGS_FILE: &str = "devstack.yaml";

/// Placeholder written when no TMDB API key is supplied
pub const TMDB_PLACEHOLDER: &str = "REPLACE_WITH_TMDB_API_KEY";

/// How to treat a failing compose teardown
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TeardownPolicy {
    /// Swallow every teardown failure
    Always,
    /// Swallow only "nothing to tear down" failures
    #[default]
    NotFound,
    /// Treat teardown failures like any other step failure
    Never,
}

/// Local cloud emulator settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EmulatorSettings {
    /// Emulator CLI prefix
    pub cli: Vec<String>,

    /// Endpoint as seen from the host, used by provisioning steps
    pub endpoint: String,

    /// Endpoint as seen from inside the compose network, written to the env file
    pub service_endpoint: String,

    pub region: String,
}

impl Default for EmulatorSettings {
    fn default() -> Self {
        Self {
            cli: vec!["aws".to_string()],
            endpoint: "http://localhost:4566".to_string(),
            service_endpoint: "http://localstack:4566".to_string(),
            region: "us-east-1".to_string(),
        }
    }
}

/// Where the application reaches the relational database
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            host: "database".to_string(),
            port: 5432,
        }
    }
}

/// Standalone service image build/run settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ImageSettings {
    pub name: String,
    pub container_name: String,
    pub port: u16,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            name: "devstack-api".to_string(),
            container_name: "api".to_string(),
            port: 8080,
        }
    }
}

/// Top-level provisioning settings loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Environment file written for the services
    pub env_file: PathBuf,

    /// JSON array of table definitions
    pub schema_file: PathBuf,

    /// Container engine binary used for image build/run
    pub container_engine: String,

    /// Compose CLI prefix
    pub compose_command: Vec<String>,

    /// Explicit compose file, otherwise the compose CLI's own lookup applies
    pub compose_file: Option<PathBuf>,

    /// Running container that hosts the ORM
    pub service_container: String,

    /// ORM schema synchronization, run inside `service_container`
    pub orm_sync_command: Vec<String>,

    pub emulator: EmulatorSettings,

    pub database: DatabaseSettings,

    pub bucket_name: String,

    /// Sender address registered with the email emulator
    pub email_sender: String,

    /// Fixed passphrase the placeholder secrets are derived from
    pub secret_passphrase: String,

    pub teardown: TeardownPolicy,

    /// Per-step timeout; no timeout when absent
    pub step_timeout_secs: Option<u64>,

    pub image: ImageSettings,

    /// Scaffolding helper, `{name}` is replaced by the module name
    pub scaffold_command: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            env_file: PathBuf::from(".env"),
            schema_file: PathBuf::from("tables.json"),
            container_engine: "docker".to_string(),
            compose_command: vec!["docker".to_string(), "compose".to_string()],
            compose_file: None,
            service_container: "api".to_string(),
            orm_sync_command: ["npx", "prisma", "db", "push"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            emulator: EmulatorSettings::default(),
            database: DatabaseSettings::default(),
            bucket_name: "local-bucket".to_string(),
            email_sender: "no-reply@localhost.dev".to_string(),
            secret_passphrase: "local-development-secret".to_string(),
            teardown: TeardownPolicy::default(),
            step_timeout_secs: None,
            image: ImageSettings::default(),
            scaffold_command: ["npx", "nest", "g", "resource", "modules/{name}", "--no-spec"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Parse settings from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load from an explicit path, else `devstack.yaml` if present, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_SETTINGS_FILE).exists() => {
                Self::from_file(DEFAULT_SETTINGS_FILE)
            }
            None => Ok(Self::default()),
        }
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        let templates = [
            ("compose_command", &self.compose_command),
            ("orm_sync_command", &self.orm_sync_command),
            ("emulator.cli", &self.emulator.cli),
            ("scaffold_command", &self.scaffold_command),
        ];
        for (field, template) in templates {
            if template.is_empty() || template.iter().any(|t| t.is_empty()) {
                anyhow::bail!("{} must be a non-empty list of non-empty tokens", field);
            }
        }

        if self.database.port == 0 || self.image.port == 0 {
            anyhow::bail!("ports must be non-zero");
        }

        for (field, value) in [
            ("container_engine", &self.container_engine),
            ("service_container", &self.service_container),
            ("bucket_name", &self.bucket_name),
            ("email_sender", &self.email_sender),
            ("secret_passphrase", &self.secret_passphrase),
            ("image.name", &self.image.name),
        ] {
            if value.trim().is_empty() {
                anyhow::bail!("{} must not be empty", field);
            }
        }

        Ok(())
    }
}

/// Database identity chosen during intake
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub name: String,
    pub user: String,
    pub password: String,
}

/// Immutable configuration for one provisioning run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub settings: Settings,
    pub database: DatabaseConfig,
    pub tmdb_api_key: String,
    pub credentials: Credentials,
}
