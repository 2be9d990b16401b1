//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{BuildCommand, PlanCommand, ScaffoldCommand, SetupCommand};
use std::ffi::OsString;

/// Local development environment provisioning
#[derive(Debug, Parser, Clone)]
#[command(name = "devstack")]
#[command(author = "devstack Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Provisions a local multi-service development environment", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to settings file (defaults to ./devstack.yaml when present)
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Gather configuration, write the environment file and provision every service
    Setup(SetupCommand),

    /// Show the provisioning steps without running them
    Plan(PlanCommand),

    /// Build the service image, optionally running it
    Build(BuildCommand),

    /// Generate a new application module
    Scaffold(ScaffoldCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}
