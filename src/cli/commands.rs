//! CLI command definitions

use crate::provision::IntakeOverrides;
use clap::Args;
use std::path::PathBuf;

/// Provision the full environment
#[derive(Debug, Args, Clone)]
pub struct SetupCommand {
    /// Skip the credential readiness confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// TMDB API key (prompted when absent)
    #[arg(long)]
    pub tmdb_api_key: Option<String>,

    /// Database name (prompted when absent)
    #[arg(long)]
    pub db_name: Option<String>,

    /// Database user (prompted when absent)
    #[arg(long)]
    pub db_user: Option<String>,

    /// Database password (prompted when absent)
    #[arg(long)]
    pub db_password: Option<String>,

    /// Credentials file (defaults to $AWS_SHARED_CREDENTIALS_FILE or ~/.aws/credentials)
    #[arg(long)]
    pub credentials_file: Option<PathBuf>,
}

impl SetupCommand {
    pub fn overrides(&self) -> IntakeOverrides {
        IntakeOverrides {
            db_name: self.db_name.clone(),
            db_user: self.db_user.clone(),
            db_password: self.db_password.clone(),
            tmdb_api_key: self.tmdb_api_key.clone(),
            assume_ready: self.yes,
            credentials_file: self.credentials_file.clone(),
        }
    }
}

/// Show the resolved provisioning steps
#[derive(Debug, Args, Clone)]
pub struct PlanCommand {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Build the service image
#[derive(Debug, Args, Clone)]
pub struct BuildCommand {
    /// Target platform for a cross build (e.g. linux/amd64)
    #[arg(long)]
    pub platform: Option<String>,

    /// Run the image after a local build, passing the environment file
    #[arg(long)]
    pub run: bool,
}

/// Generate an application module
#[derive(Debug, Args, Clone)]
pub struct ScaffoldCommand {
    /// Module name
    pub name: String,
}
