//! Provisioning building blocks: credentials, environment file, schema,
//! configuration intake and the step library

pub mod credentials;
pub mod env_file;
pub mod intake;
pub mod library;
pub mod schema;

pub use credentials::{load_credentials, Credentials};
pub use env_file::{build_environment, EnvironmentConfig};
pub use intake::{Intake, IntakeOverrides};

use crate::core::{Pipeline, ProvisionError, RunConfig};
use tracing::info;

/// Persist the run's environment file and build the provisioning pipeline.
///
/// The schema file is read before anything is written, so a broken schema
/// leaves the existing environment file untouched.
pub fn prepare(run: &RunConfig) -> Result<Pipeline, ProvisionError> {
    let tables = schema::load_table_definitions(&run.settings.schema_file)?;
    info!(
        "Loaded {} table definitions from {}",
        tables.len(),
        run.settings.schema_file.display()
    );

    build_environment(run).write_to(&run.settings.env_file)?;

    library::provisioning_pipeline(&run.settings, &tables)
}
