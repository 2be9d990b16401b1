use anyhow::{bail, Context, Result};
use devstack::cli::commands::{BuildCommand, PlanCommand, ScaffoldCommand, SetupCommand};
use devstack::cli::output::*;
use devstack::cli::{Cli, Command};
use devstack::command::{resolve, Platform, ProcessRunner};
use devstack::core::{Pipeline, ProvisionError, Settings};
use devstack::execution::{ExecutionEngine, ExecutionEvent};
use devstack::provision::{self, library, schema, EnvironmentConfig, Intake};
use std::io;
use std::path::Path;
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set logging subscriber: {}", e);
    }

    if let Err(err) = run(cli).await {
        error!("{:#}", err);
        eprintln!("{} {}", CROSS, style(format!("{:#}", err)).red());
        let code = err
            .downcast_ref::<ProvisionError>()
            .map(ProvisionError::exit_code)
            .unwrap_or(3);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref().map(Path::new))
        .context("Failed to load settings")?;

    match &cli.command {
        Command::Setup(cmd) => run_setup(cmd, settings).await,
        Command::Plan(cmd) => show_plan(cmd, &settings),
        Command::Build(cmd) => build(cmd, &settings).await,
        Command::Scaffold(cmd) => scaffold(cmd, &settings).await,
    }
}

async fn run_setup(cmd: &SetupCommand, settings: Settings) -> Result<()> {
    let run_config = {
        let stdin = io::stdin();
        let mut intake = Intake::new(stdin.lock(), io::stdout());
        intake.gather(settings, cmd.overrides())?
    };

    let mut pipeline = provision::prepare(&run_config)?;
    println!(
        "{} Wrote {}",
        INFO,
        style(run_config.settings.env_file.display()).bold()
    );

    execute_pipeline(&mut pipeline, &run_config.settings).await
}

async fn execute_pipeline(pipeline: &mut Pipeline, settings: &Settings) -> Result<()> {
    let runner = ProcessRunner::new(settings.step_timeout_secs);
    let mut engine = ExecutionEngine::new(runner, Platform::host());

    let bar = create_progress_bar(pipeline.steps().len());
    let handler_bar = bar.clone();
    engine.add_event_handler(move |event| {
        handler_bar.println(format_execution_event(event));
        match event {
            ExecutionEvent::StepStarted { step_name, .. } => {
                handler_bar.set_message(step_name.clone());
            }
            ExecutionEvent::StepSucceeded { .. }
            | ExecutionEvent::StepTolerated { .. }
            | ExecutionEvent::StepFailed { .. }
            | ExecutionEvent::StepSkipped { .. } => handler_bar.inc(1),
            _ => {}
        }
    });

    let outcome = engine.execute(pipeline).await;
    bar.finish_and_clear();

    if !pipeline.has_failed() {
        println!(
            "\n{} {} completed {}",
            CHECK,
            style(&pipeline.name).bold(),
            style("successfully").green()
        );
    } else {
        let failed_at = pipeline
            .failed_step()
            .map(|step| match &step.endpoint {
                Some(endpoint) => format!(" at {} ({})", step.name, endpoint),
                None => format!(" at {}", step.name),
            })
            .unwrap_or_default();
        println!(
            "\n{} {} {}{}",
            CROSS,
            style(&pipeline.name).bold(),
            style("failed").red(),
            failed_at
        );
        for (name, label) in pipeline.outcomes() {
            println!("  {:<28} {}", name, style(label).dim());
        }
    }

    outcome.into_result()?;
    Ok(())
}

fn show_plan(cmd: &PlanCommand, settings: &Settings) -> Result<()> {
    let tables = schema::load_table_definitions(&settings.schema_file)?;
    let pipeline = library::provisioning_pipeline(settings, &tables)?;
    let platform = Platform::host();
    let total = pipeline.steps().len();

    if cmd.json {
        let mut steps = Vec::with_capacity(total);
        for step in pipeline.steps() {
            let invocation = resolve(&step.command, platform)?;
            steps.push(serde_json::json!({
                "name": step.name,
                "command": step.command,
                "endpoint": step.endpoint,
                "on_failure": step.on_failure.label(),
                "invocation": invocation.to_string(),
            }));
        }
        let data = serde_json::json!({ "pipeline": pipeline.name, "steps": steps });
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    println!(
        "{} {} ({} steps)",
        INFO,
        style(&pipeline.name).bold(),
        style(total).cyan()
    );
    for (index, step) in pipeline.steps().iter().enumerate() {
        let invocation = resolve(&step.command, platform)?;
        println!("  {}", format_plan_step(index + 1, total, step, &invocation));
    }
    Ok(())
}

async fn build(cmd: &BuildCommand, settings: &Settings) -> Result<()> {
    if cmd.run && cmd.platform.is_some() {
        bail!("--run cannot be combined with --platform: a cross-built image is not run locally");
    }

    let mut steps = vec![library::build_image(settings, cmd.platform.as_deref())];
    if cmd.run {
        let env = EnvironmentConfig::read_from(&settings.env_file).with_context(|| {
            format!(
                "Failed to read {}, run `devstack setup` first",
                settings.env_file.display()
            )
        })?;
        steps.extend(library::run_image(settings, &env));
    }

    let mut pipeline = Pipeline::new("build", steps)?;
    execute_pipeline(&mut pipeline, settings).await
}

async fn scaffold(cmd: &ScaffoldCommand, settings: &Settings) -> Result<()> {
    let step = library::scaffold_module(settings, &cmd.name);
    let mut pipeline = Pipeline::new("scaffold", vec![step])?;
    execute_pipeline(&mut pipeline, settings).await
}
