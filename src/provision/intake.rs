//! Configuration intake - gathers interactive input into a `RunConfig`
//!
//! Prompts run in a fixed order: credential readiness, TMDB API key,
//! database name, database user, database password. Anything supplied up front
//! in `IntakeOverrides` skips its prompt.

use crate::core::{
    config::{DatabaseConfig, Settings, TMDB_PLACEHOLDER},
    ProvisionError, RunConfig,
};
use crate::provision::credentials::{default_credentials_path, load_credentials, DEFAULT_PROFILE};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, info};

/// Values known before prompting
#[derive(Debug, Clone, Default)]
pub struct IntakeOverrides {
    pub db_name: Option<String>,
    pub db_user: Option<String>,
    pub db_password: Option<String>,
    pub tmdb_api_key: Option<String>,
    /// Skip the credential readiness confirmation
    pub assume_ready: bool,
    pub credentials_file: Option<PathBuf>,
}

/// Prompts on `output`, reads answers from `input`
pub struct Intake<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Intake<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Ask once, keeping the answer as typed minus the line ending.
    /// `None` when input is exhausted.
    fn ask_raw(&mut self, label: &str) -> Result<Option<String>, ProvisionError> {
        write!(self.output, "{}: ", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let answer = line.strip_suffix('\n').unwrap_or(&line);
        let answer = answer.strip_suffix('\r').unwrap_or(answer);
        Ok(Some(answer.to_string()))
    }

    /// Ask once, trimmed
    fn ask(&mut self, label: &str) -> Result<Option<String>, ProvisionError> {
        Ok(self.ask_raw(label)?.map(|answer| answer.trim().to_string()))
    }

    /// Ask until a non-blank answer is given
    fn ask_required(&mut self, label: &str) -> Result<String, ProvisionError> {
        self.ask_until_given(label, true)
    }

    /// Like `ask_required`, but surrounding whitespace is part of the answer
    fn ask_secret(&mut self, label: &str) -> Result<String, ProvisionError> {
        self.ask_until_given(label, false)
    }

    fn ask_until_given(&mut self, label: &str, trim: bool) -> Result<String, ProvisionError> {
        loop {
            let answer = if trim { self.ask(label)? } else { self.ask_raw(label)? };
            match answer {
                Some(answer) if !answer.trim().is_empty() => return Ok(answer),
                Some(_) => writeln!(self.output, "{} is required", label)?,
                None => {
                    return Err(ProvisionError::Config(format!(
                        "input ended before {} was given",
                        label
                    )))
                }
            }
        }
    }

    fn confirm(&mut self, label: &str) -> Result<bool, ProvisionError> {
        let answer = self.ask(&format!("{} [y/N]", label))?.unwrap_or_default();
        Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
    }

    /// Run the intake phase and produce the immutable run configuration
    pub fn gather(
        &mut self,
        settings: Settings,
        overrides: IntakeOverrides,
    ) -> Result<RunConfig, ProvisionError> {
        let credentials_path = match overrides.credentials_file.or_else(default_credentials_path) {
            Some(path) => path,
            None => {
                return Err(ProvisionError::CredentialsMissing {
                    path: PathBuf::from("~/.aws/credentials"),
                    reason: "home directory could not be determined".to_string(),
                })
            }
        };

        if !overrides.assume_ready {
            let ready = self.confirm(&format!(
                "Have you set up the '{}' profile in {}?",
                DEFAULT_PROFILE,
                credentials_path.display()
            ))?;
            if !ready {
                return Err(ProvisionError::CredentialsMissing {
                    path: credentials_path,
                    reason: "credential setup was not confirmed".to_string(),
                });
            }
        }

        let credentials = load_credentials(&credentials_path, DEFAULT_PROFILE)?;
        info!("Loaded '{}' credentials from {}", DEFAULT_PROFILE, credentials_path.display());

        let tmdb_api_key = match overrides.tmdb_api_key {
            Some(key) => key,
            None => self
                .ask("TMDB API key (leave blank to fill in later)")?
                .filter(|key| !key.is_empty())
                .unwrap_or_else(|| {
                    debug!("No TMDB API key given, writing placeholder");
                    TMDB_PLACEHOLDER.to_string()
                }),
        };

        let name = match overrides.db_name {
            Some(name) => name,
            None => self.ask_required("Database name")?,
        };
        let user = match overrides.db_user {
            Some(user) => user,
            None => self.ask_required("Database user")?,
        };
        let password = match overrides.db_password {
            Some(password) => password,
            None => self.ask_secret("Database password")?,
        };

        Ok(RunConfig {
            settings,
            database: DatabaseConfig { name, user, password },
            tmdb_api_key,
            credentials,
        })
    }
}
