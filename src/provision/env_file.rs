//! Environment file writer
//!
//! Writes `KEY=VALUE` lines in insertion order. Values are written verbatim:
//! a value containing a newline or `=` is not escaped and is not supported.

use crate::core::{ProvisionError, RunConfig};
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::info;

/// Ordered key/value mapping with unique keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentConfig {
    entries: Vec<(String, String)>,
}

impl EnvironmentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value. An existing key keeps its position and takes the new value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// File contents, one `KEY=VALUE` per line
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.entries {
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            out.push('\n');
        }
        out
    }

    /// Write the file, replacing any existing one
    pub fn write_to(&self, path: &Path) -> Result<(), ProvisionError> {
        std::fs::write(path, self.render())?;
        info!("Wrote {} entries to {}", self.entries.len(), path.display());
        Ok(())
    }

    /// Read a file written by `write_to` back, keeping file order.
    ///
    /// Each non-empty line is split on its first `=` and the value is kept
    /// as written: no unquoting, no comments, no `$VAR` expansion.
    pub fn read_from(path: &Path) -> Result<Self, ProvisionError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content).map_err(|reason| {
            ProvisionError::Config(format!(
                "invalid environment file {}: {}",
                path.display(),
                reason
            ))
        })
    }

    /// Parse `KEY=VALUE` lines, the inverse of `render`
    pub fn parse(content: &str) -> Result<Self, String> {
        let mut config = Self::new();
        for (number, line) in content.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            match line.split_once('=') {
                Some((key, value)) if !key.is_empty() => config.insert(key, value),
                _ => return Err(format!("line {} is not KEY=VALUE", number + 1)),
            }
        }
        Ok(config)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvironmentConfig {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut config = EnvironmentConfig::new();
        for (key, value) in iter {
            config.insert(key, value);
        }
        config
    }
}

/// SHA-256 hex digest of `passphrase`, salted with `purpose` when non-empty
pub fn derive_secret(passphrase: &str, purpose: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(passphrase.as_bytes());
    if !purpose.is_empty() {
        hasher.update(b":");
        hasher.update(purpose.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

/// Percent-encode a URL userinfo component, keeping only unreserved characters
fn encode_userinfo(component: &str) -> String {
    let mut out = String::with_capacity(component.len());
    for byte in component.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Build the service environment for a run
pub fn build_environment(run: &RunConfig) -> EnvironmentConfig {
    let settings = &run.settings;
    let db = &run.database;
    let passphrase = settings.secret_passphrase.as_str();

    let mut env = EnvironmentConfig::new();
    env.insert("NODE_ENV", "development");
    env.insert(
        "DATABASE_URL",
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            encode_userinfo(&db.user),
            encode_userinfo(&db.password),
            settings.database.host,
            settings.database.port,
            db.name
        ),
    );
    env.insert("TMDB_API_KEY", run.tmdb_api_key.as_str());
    env.insert("COOKIE_SECRET", derive_secret(passphrase, ""));
    env.insert(
        "EMAIL_VERIFICATION_JWT_SECRET",
        derive_secret(passphrase, "email-verification"),
    );
    env.insert(
        "RESET_PASSWORD_JWT_SECRET",
        derive_secret(passphrase, "reset-password"),
    );
    env.insert("EMAIL_SENDER", settings.email_sender.as_str());
    env.insert("BUCKET_NAME", settings.bucket_name.as_str());
    env.insert("LOCAL_AWS_ENDPOINT", settings.emulator.service_endpoint.as_str());
    env.insert("AWS_REGION", settings.emulator.region.as_str());
    env.insert("AWS_ACCESS_KEY_ID", run.credentials.access_key_id());
    env.insert("AWS_SECRET_ACCESS_KEY", run.credentials.secret_access_key());
    env
}
