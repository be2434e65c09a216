// /////////////////////////////////////////////////////////////////////////////
// CI/CD Pipeline Execution Engine
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # CLI Parser
//!
//! Command-line interface parsing using clap.
//!
//! This module defines the CLI structure and handles argument parsing.
//! Security validation happens in [`super::validator`] after parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Main CLI structure
#[derive(Parser, Debug, Clone)]
#[command(name = "pipeline")]
#[command(about = concat!("CI/CD Pipeline Execution Engine v", env!("CARGO_PKG_VERSION")))]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Default workspace root for commands that don't name one explicitly
    #[arg(short, long)]
    pub workspace: Option<PathBuf>,
}

/// CLI subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Validate a pipeline script against the six-layer rule set without
    /// compiling or executing it
    Validate {
        /// Path to the script file
        script: PathBuf,
    },

    /// Load the plugin rooted at a directory carrying `plugin.properties`
    LoadPlugin {
        /// Plugin directory
        directory: PathBuf,
    },

    /// Unload a previously loaded plugin by id
    UnloadPlugin {
        /// Plugin id, e.g. `acme.sample`
        id: String,
    },

    /// Unload and reload a plugin from its original source directory
    ReloadPlugin {
        /// Plugin id, e.g. `acme.sample`
        id: String,
    },

    /// List currently loaded plugins
    ListPlugins,
}

/// Parses `std::env::args` into a [`Cli`]. Clap handles `--help`/`--version`
/// and exits the process on its own.
pub fn parse_cli() -> Cli {
    Cli::parse()
}
