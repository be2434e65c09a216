// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline CLI Entry Point
//!
//! Parses and security-validates the command line, wires the engine's
//! services through the [`pipeline_bootstrap::composition_root::CompositionRoot`],
//! runs the requested command to completion, drains the logging core, and
//! maps the result to a process exit code.

use pipeline_bootstrap::composition_root::CompositionRoot;
use pipeline_bootstrap::config::{AppConfig, LogLevel};
use pipeline_bootstrap::shutdown::ShutdownCoordinator;
use pipeline_bootstrap::signals::create_signal_handler;
use pipeline_bootstrap::{bootstrap_cli, result_to_exit_code, ValidatedCli, ValidatedCommand};
use pipeline_domain::error::PipelineError;
use pipeline_engine::application::commands::{LoadPluginCommand, ValidateScriptCommand};

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let validated_cli = match bootstrap_cli() {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("argument error: {err}");
            return std::process::ExitCode::from(64); // EX_USAGE
        }
    };

    init_tracing(validated_cli.verbose);

    let config = build_config(&validated_cli);

    let result = run(validated_cli, &config).await;
    result_to_exit_code(result)
}

fn init_tracing(verbose: bool) {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO })
        .finish();
    // Only the first call in a process wins; harmless if already set (e.g.
    // from a surrounding test harness).
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn build_config(cli: &ValidatedCli) -> AppConfig {
    let mut builder = AppConfig::builder().app_name("pipeline").verbose(cli.verbose).log_level(if cli.verbose { LogLevel::Debug } else { LogLevel::Info });
    if let Some(workspace) = &cli.workspace {
        builder = builder.workspace_root(workspace.clone());
    }
    builder.build()
}

async fn run(cli: ValidatedCli, config: &AppConfig) -> Result<(), PipelineError> {
    let root = CompositionRoot::build(config).await?;

    let shutdown = ShutdownCoordinator::default();
    let signal_token = shutdown.token();
    tokio::spawn(async move {
        create_signal_handler().wait_for_signal(Box::new(move || signal_token.cancel())).await;
    });

    let outcome = dispatch(&root, cli.command).await;
    root.shutdown().await;
    outcome
}

async fn dispatch(root: &CompositionRoot, command: ValidatedCommand) -> Result<(), PipelineError> {
    match command {
        ValidatedCommand::Validate { script } => {
            let text = CompositionRoot::read_script(&script)?;
            let script_name = script.display().to_string();
            let report = root.validate_script_use_case().execute(ValidateScriptCommand::new(script_name, text));
            print_validation_report(&report);
            if report.is_valid() {
                Ok(())
            } else {
                Err(PipelineError::ValidationError(format!("{} issue(s) reported for {}", report.issues.len(), report.script_name)))
            }
        }
        ValidatedCommand::LoadPlugin { directory } => {
            let metadata = root.load_plugin_use_case().execute(LoadPluginCommand::new(directory))?;
            println!("loaded plugin {} v{} ({})", metadata.id, metadata.version, metadata.name);
            Ok(())
        }
        ValidatedCommand::UnloadPlugin { id } => {
            root.plugin_manager().unload(&id)?;
            println!("unloaded plugin {id}");
            Ok(())
        }
        ValidatedCommand::ReloadPlugin { id } => {
            let metadata = root.plugin_manager().reload(&id)?;
            println!("reloaded plugin {} v{}", metadata.id, metadata.version);
            Ok(())
        }
        ValidatedCommand::ListPlugins => {
            let plugins = root.plugin_manager().list();
            if plugins.is_empty() {
                println!("no plugins loaded");
            }
            for plugin in plugins {
                println!("{}\t{}\t{}", plugin.id, plugin.version, plugin.main_class);
            }
            Ok(())
        }
    }
}

fn print_validation_report(report: &pipeline_domain::value_objects::ValidationReport) {
    println!("{}: {}", report.script_name, if report.is_valid() { "VALID" } else { "INVALID" });
    for issue in &report.issues {
        println!("  [{:?}] {}: {}", issue.severity, issue.code, issue.message);
    }
    for recommendation in &report.recommendations {
        println!("  recommendation: {recommendation}");
    }
}
