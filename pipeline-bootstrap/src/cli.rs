// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Command-Line Interface Module
//!
//! Bootstrap-layer CLI handling with security-first design.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │  1. parser::parse_cli()             │  Parse CLI with clap
//! └─────────────────┬───────────────────┘
//!                   ↓
//! ┌─────────────────────────────────────┐
//! │  2. validate_cli()                  │  Security validation
//! └─────────────────┬───────────────────┘
//!                   ↓
//! ┌─────────────────────────────────────┐
//! │  3. ValidatedCli                    │  Safe, validated config
//! └─────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `parser` - CLI structure and clap parsing
//! - `validator` - Security validation layer

pub mod parser;
pub mod validator;

use std::path::PathBuf;

pub use parser::{parse_cli, Cli, Commands};
pub use validator::{ParseError, SecureArgParser};

/// Validated CLI configuration
///
/// Holds all CLI arguments after security validation. Paths that must
/// already exist are canonicalized; paths that may not exist yet (plugin
/// ids, script names which are validated as plain strings) are validated
/// for dangerous patterns only.
#[derive(Debug, Clone)]
pub struct ValidatedCli {
    pub command: ValidatedCommand,
    pub verbose: bool,
    pub workspace: Option<PathBuf>,
}

/// Validated command variants, one per [`Commands`] variant.
#[derive(Debug, Clone)]
pub enum ValidatedCommand {
    Validate { script: PathBuf },
    LoadPlugin { directory: PathBuf },
    UnloadPlugin { id: String },
    ReloadPlugin { id: String },
    ListPlugins,
}

/// Parses and validates CLI arguments: parse with clap, then run every
/// path/string argument through [`SecureArgParser`].
///
/// # Errors
///
/// Returns [`ParseError`] if any argument fails validation.
pub fn parse_and_validate() -> Result<ValidatedCli, ParseError> {
    let cli = parse_cli();
    validate_cli(cli)
}

fn validate_cli(cli: Cli) -> Result<ValidatedCli, ParseError> {
    let workspace = match cli.workspace {
        Some(path) => Some(SecureArgParser::validate_path(&path.to_string_lossy())?),
        None => None,
    };

    let command = match cli.command {
        Commands::Validate { script } => {
            let validated_script = SecureArgParser::validate_path(&script.to_string_lossy())?;
            ValidatedCommand::Validate { script: validated_script }
        }
        Commands::LoadPlugin { directory } => {
            let validated_directory = SecureArgParser::validate_path(&directory.to_string_lossy())?;
            ValidatedCommand::LoadPlugin { directory: validated_directory }
        }
        Commands::UnloadPlugin { id } => {
            SecureArgParser::validate_argument(&id)?;
            ValidatedCommand::UnloadPlugin { id }
        }
        Commands::ReloadPlugin { id } => {
            SecureArgParser::validate_argument(&id)?;
            ValidatedCommand::ReloadPlugin { id }
        }
        Commands::ListPlugins => ValidatedCommand::ListPlugins,
    };

    Ok(ValidatedCli {
        command,
        verbose: cli.verbose,
        workspace,
    })
}
