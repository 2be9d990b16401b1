//! Step library - the concrete provisioning steps
//!
//! Every function here only composes command templates from `Settings`.
//! Nothing is executed; the engine runs the resulting steps.

use crate::core::{
    config::{Settings, TeardownPolicy},
    FailurePolicy, Pipeline, ProvisionError, Step,
};
use crate::provision::{env_file::EnvironmentConfig, schema::table_name};
use regex::Regex;
use serde_json::Value;

/// Name of the full provisioning pipeline
pub const PROVISION_PIPELINE: &str = "provision";

/// Stderr of a teardown that had nothing to tear down
const NOTHING_TO_TEAR_DOWN: &str =
    r"(?i)(no such (container|network|volume|object)|no resource found|nothing to (remove|stop))";

/// Failure policy for the compose teardown step
pub fn teardown_failure_policy(policy: TeardownPolicy) -> FailurePolicy {
    match policy {
        TeardownPolicy::Always => FailurePolicy::Tolerate,
        TeardownPolicy::NotFound => {
            FailurePolicy::TolerateMatching(Regex::new(NOTHING_TO_TEAR_DOWN).expect("valid regex"))
        }
        TeardownPolicy::Never => FailurePolicy::Abort,
    }
}

fn compose(settings: &Settings, args: &[&str]) -> Vec<String> {
    let mut tokens = settings.compose_command.clone();
    if let Some(file) = &settings.compose_file {
        tokens.push("-f".to_string());
        tokens.push(file.display().to_string());
    }
    tokens.extend(args.iter().map(|a| a.to_string()));
    tokens
}

fn emulator<I, S>(settings: &Settings, args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut tokens = settings.emulator.cli.clone();
    tokens.push("--endpoint-url".to_string());
    tokens.push(settings.emulator.endpoint.clone());
    tokens.push("--region".to_string());
    tokens.push(settings.emulator.region.clone());
    tokens.extend(args.into_iter().map(Into::into));
    tokens
}

/// Tear down, rebuild without cache, start detached. Order is fixed.
pub fn compose_bring_up(settings: &Settings) -> Vec<Step> {
    vec![
        Step::new("compose-down", compose(settings, &["down"]))
            .with_failure_policy(teardown_failure_policy(settings.teardown)),
        Step::new("compose-build", compose(settings, &["build", "--no-cache"])),
        Step::new("compose-up", compose(settings, &["up", "-d"])),
    ]
}

/// One creation step per table definition, in file order
pub fn create_table_steps(settings: &Settings, tables: &[Value]) -> Result<Vec<Step>, ProvisionError> {
    tables
        .iter()
        .enumerate()
        .map(|(index, definition)| {
            let payload = serde_json::to_string(definition).map_err(|e| {
                ProvisionError::Config(format!("cannot serialize table definition {}: {}", index, e))
            })?;
            let name = match table_name(definition) {
                Some(table) => format!("create-table-{}", table),
                None => format!("create-table-{}", index + 1),
            };
            Ok(Step::new(
                name,
                emulator(settings, ["dynamodb", "create-table", "--cli-input-json", payload.as_str()]),
            )
            .with_endpoint(settings.emulator.endpoint.clone()))
        })
        .collect()
}

/// Register the fixed sender address with the email emulator
pub fn verify_mail_identity(settings: &Settings) -> Step {
    Step::new(
        "verify-mail-identity",
        emulator(
            settings,
            ["ses", "verify-email-identity", "--email-address", settings.email_sender.as_str()],
        ),
    )
    .with_endpoint(settings.emulator.endpoint.clone())
}

/// Create the fixed-name bucket on the emulator
pub fn create_bucket(settings: &Settings) -> Step {
    let target = format!("s3://{}", settings.bucket_name);
    Step::new("create-bucket", emulator(settings, ["s3", "mb", target.as_str()]))
        .with_endpoint(settings.emulator.endpoint.clone())
}

/// Apply the ORM schema from inside the running service container
pub fn sync_orm_schema(settings: &Settings) -> Step {
    let mut tokens = compose(settings, &["exec", "-T", settings.service_container.as_str()]);
    tokens.extend(settings.orm_sync_command.iter().cloned());
    Step::new("sync-orm-schema", tokens).with_endpoint(settings.service_container.clone())
}

/// Every provisioning step, compose bring-up first
pub fn provisioning_steps(settings: &Settings, tables: &[Value]) -> Result<Vec<Step>, ProvisionError> {
    let mut steps = compose_bring_up(settings);
    steps.extend(create_table_steps(settings, tables)?);
    steps.push(verify_mail_identity(settings));
    steps.push(create_bucket(settings));
    steps.push(sync_orm_schema(settings));
    Ok(steps)
}

/// The full provisioning pipeline
pub fn provisioning_pipeline(settings: &Settings, tables: &[Value]) -> Result<Pipeline, ProvisionError> {
    Pipeline::new(PROVISION_PIPELINE, provisioning_steps(settings, tables)?)
}

/// Build the service image, cross-building when a target platform is given
pub fn build_image(settings: &Settings, platform: Option<&str>) -> Step {
    let engine = settings.container_engine.clone();
    let tokens = match platform {
        Some(platform) => vec![
            engine,
            "buildx".to_string(),
            "build".to_string(),
            format!("--platform={}", platform),
            "-t".to_string(),
            settings.image.name.clone(),
            ".".to_string(),
        ],
        None => vec![
            engine,
            "build".to_string(),
            "-t".to_string(),
            settings.image.name.clone(),
            ".".to_string(),
        ],
    };
    Step::new("build-image", tokens)
}

/// Remove a previous standalone container, then start the image detached
pub fn run_image(settings: &Settings, env: &EnvironmentConfig) -> Vec<Step> {
    let engine = settings.container_engine.as_str();
    let image = &settings.image;

    let remove = Step::new(
        "remove-container",
        [engine, "rm", "-f", image.container_name.as_str()],
    )
    .with_failure_policy(teardown_failure_policy(settings.teardown));

    let mut tokens = vec![
        engine.to_string(),
        "run".to_string(),
        "--name".to_string(),
        image.container_name.clone(),
        "-p".to_string(),
        format!("{}:{}", image.port, image.port),
    ];
    for (key, value) in env.iter() {
        tokens.push("-e".to_string());
        tokens.push(format!("{}={}", key, value));
    }
    tokens.push("-d".to_string());
    tokens.push(image.name.clone());

    vec![
        remove,
        Step::new("run-container", tokens).with_endpoint(format!("localhost:{}", image.port)),
    ]
}

/// Run the application-scaffolding helper for a new module
pub fn scaffold_module(settings: &Settings, name: &str) -> Step {
    Step::new(
        format!("scaffold-{}", name),
        settings
            .scaffold_command
            .iter()
            .map(|token| token.replace("{name}", name)),
    )
}
