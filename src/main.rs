use anyhow::{Context, Result};
use profiler_pipeline::cli::commands::{RunCommand, ValidateCommand};
use profiler_pipeline::cli::output::*;
use profiler_pipeline::cli::{Cli, Command};
use profiler_pipeline::{PipelineConfig, PipelineExecutor, ScriptRunner, SqliteSource};
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    match &cli.command {
        Command::Run(cmd) => run_pipeline(cmd).await?,
        Command::Validate(cmd) => validate_pipeline(cmd)?,
    }

    Ok(())
}

async fn run_pipeline(cmd: &RunCommand) -> Result<()> {
    let config = cmd
        .load_config()
        .with_context(|| format!("Failed to load pipeline config {}", cmd.file.display()))?;

    if !cmd.json {
        println!(
            "{} Loaded pipeline: {} ({})",
            INFO,
            style(config.name()).bold(),
            style(config.version()).dim()
        );
    }

    let pipeline_name = config.name().to_string();
    let mut executor = PipelineExecutor::new(config)
        .context("Failed to prepare extract folder")?
        .with_script_runner(ScriptRunner::new(cmd.script_config()));

    if let Some(db) = &cmd.source_db {
        let source = SqliteSource::connect(db)
            .await
            .with_context(|| format!("Failed to open source database {}", db.display()))?;
        executor = executor.with_source(Arc::new(source));
    }

    if !cmd.json {
        executor.add_event_handler(|event| {
            if let Some(line) = format_execution_event(&event) {
                println!("{}", line);
            }
        });
    }

    let result = executor.execute().await;

    if cmd.json {
        let report = match &result {
            Ok(results) => serde_json::json!({
                "pipeline": pipeline_name,
                "status": "success",
                "results": results,
            }),
            Err(e) => serde_json::json!({
                "pipeline": pipeline_name,
                "status": "failed",
                "error": e.to_string(),
                "results": e.results(),
            }),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    match result {
        Ok(_) => {
            if !cmd.json {
                println!(
                    "\n{} {} completed {}",
                    CHECK,
                    style(&pipeline_name).bold(),
                    style("successfully").green()
                );
            }
            Ok(())
        }
        Err(e) => {
            if !cmd.json {
                println!(
                    "\n{} {} {}",
                    CROSS,
                    style(&pipeline_name).bold(),
                    style("failed").red()
                );
                println!("  {}", style(&e).red());
            }
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

fn validate_pipeline(cmd: &ValidateCommand) -> Result<()> {
    match PipelineConfig::from_file(&cmd.file) {
        Ok(config) => {
            let early_steps = config.steps_before_first_ddl();

            if cmd.json {
                let report = serde_json::json!({
                    "valid": true,
                    "pipeline": config.to_spec(),
                    "steps_before_first_ddl": early_steps,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }

            println!("{} Pipeline configuration is valid!", CHECK);
            for line in format_pipeline_summary(&config) {
                println!("{}", line);
            }
            if !early_steps.is_empty() {
                println!(
                    "{} Steps run before the first DDL step: {}",
                    WARN,
                    style(early_steps.join(", ")).yellow()
                );
            }
            Ok(())
        }
        Err(e) => {
            if cmd.json {
                let report = serde_json::json!({
                    "valid": false,
                    "error": e.to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{} Validation failed:", CROSS);
                println!("  {}", style(&e).red());
            }
            std::process::exit(1);
        }
    }
}
