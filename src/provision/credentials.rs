//! Credential loading from an INI-style shared credentials file

use crate::core::ProvisionError;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Profile read from the credentials file
pub const DEFAULT_PROFILE: &str = "default";

const ACCESS_KEY_FIELD: &str = "aws_access_key_id";
const SECRET_KEY_FIELD: &str = "aws_secret_access_key";

/// Access key pair for the local emulator
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_key_id: String,
    secret_access_key: String,
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Default credentials file location.
///
/// `AWS_SHARED_CREDENTIALS_FILE` wins, otherwise `~/.aws/credentials`.
pub fn default_credentials_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("AWS_SHARED_CREDENTIALS_FILE") {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|home| home.join(".aws").join("credentials"))
}

/// Read the credentials file and extract the given profile
pub fn load_credentials(path: &Path, profile: &str) -> Result<Credentials, ProvisionError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ProvisionError::CredentialsMissing {
                path: path.to_path_buf(),
                reason: "credentials file does not exist".to_string(),
            })
        }
        Err(e) => return Err(ProvisionError::Io(e)),
    };

    debug!("Read credentials file {}", path.display());
    parse_credentials(&content, profile).map_err(|reason| ProvisionError::CredentialsMissing {
        path: path.to_path_buf(),
        reason,
    })
}

/// Extract a profile's key pair from INI text.
///
/// Section headers are `[name]`, entries are `key = value`, and lines starting
/// with `#` or `;` are comments. A repeated key keeps its last value.
pub fn parse_credentials(content: &str, profile: &str) -> Result<Credentials, String> {
    let mut in_profile = false;
    let mut profile_seen = false;
    let mut access_key_id = None;
    let mut secret_access_key = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_profile = section.trim() == profile;
            profile_seen |= in_profile;
            continue;
        }

        if !in_profile {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            let value = value.trim().to_string();
            match key.trim() {
                ACCESS_KEY_FIELD => access_key_id = Some(value),
                SECRET_KEY_FIELD => secret_access_key = Some(value),
                _ => {}
            }
        }
    }

    if !profile_seen {
        return Err(format!("profile '{}' not found", profile));
    }

    let access_key_id = access_key_id
        .filter(|v| !v.is_empty())
        .ok_or_else(|| format!("profile '{}' has no {}", profile, ACCESS_KEY_FIELD))?;
    let secret_access_key = secret_access_key
        .filter(|v| !v.is_empty())
        .ok_or_else(|| format!("profile '{}' has no {}", profile, SECRET_KEY_FIELD))?;

    Ok(Credentials {
        access_key_id,
        secret_access_key,
    })
}
