// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bindery — page preprocessor for OCR pipelines.
//
// Entry point. Initialises logging, loads configuration, and dispatches to the
// requested subcommand.

mod args;
mod commands;

use anyhow::Result;
use clap::Parser;

use args::{Cli, Command};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    tracing::info!("Bindery starting");

    let config = commands::load_config(cli.config.as_deref())?;
    match &cli.command {
        Command::Binarize(args) => commands::binarize(config, args),
        Command::Wipe(args) => commands::wipe(config, args),
        Command::Multi(args) => commands::multi(config, args),
    }
}
