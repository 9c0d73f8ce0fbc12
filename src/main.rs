//! Atelier - a front-end asset pipeline with a dev server and live reload.

#![allow(dead_code)]

mod bundle;
mod cli;
mod config;
mod core;
mod embed;
mod logger;
mod pipeline;
mod reload;
mod utils;
mod watch;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::PipelineConfig;
use pipeline::Task;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    logger::set_verbose(cli.verbose);

    let config = config::init(PipelineConfig::load(cli)?);

    match &cli.command {
        Commands::Build => cli::build::build_all(&config),
        Commands::Serve { .. } => cli::serve::serve(&config),
        Commands::Html => cli::build::run_single(Task::Templates, &config),
        Commands::Styles => cli::build::run_single(Task::Styles, &config),
        Commands::Scripts => cli::build::run_single(Task::Scripts, &config),
        Commands::Fonts => cli::build::run_single(Task::Fonts, &config),
        Commands::Images => cli::build::run_single(Task::Images, &config),
        Commands::Clean => cli::build::run_single(Task::Clean, &config),
    }
}
