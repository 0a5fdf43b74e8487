//! Styx CLI - Command-line interface for declarative object mapping
//!
//! This is the main entry point for the Styx CLI application, providing
//! commands for validating definition directories and mapping JSON objects
//! through them.

mod cli;
mod config;
mod error;
mod handlers;
mod loader;
mod logging;
mod output;

use cli::{Cli, Commands, OutputFormat};
use colored::control;
use config::Config;
use error::Result;
use is_terminal::IsTerminal;
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::process;
use tracing::instrument;

fn main() {
    let cli = Cli::parse_args();

    // Configuration feeds logging, so it loads before any subscriber exists
    let config = match Config::load_with_file(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", error::format_error(&e, false));
            process::exit(e.exit_code());
        }
    };

    let use_color = cli.use_color(config.output.color);
    control::set_override(use_color);

    if let Err(e) = init_logging(&cli, &config) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let color_errors = config.output.color && !cli.no_color && std::io::stderr().is_terminal();

    match run(cli, &config, use_color) {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("{}", error::format_error(&e, color_errors));
            process::exit(e.exit_code());
        }
    }
}

/// Main application logic
#[instrument(skip_all, fields(command = ?cli.command))]
fn run(cli: Cli, config: &Config, use_color: bool) -> Result<()> {
    let _timer = Timer::new("cli_execution");

    let format = output_format(&cli, config);
    let mut output = OutputWriter::new(format, use_color, cli.quiet);

    tracing::info!(
        command = ?cli.command,
        verbosity = cli.verbosity_level(),
        "Executing command"
    );

    match cli.command {
        Commands::Validate(args) => handlers::handle_validate(args, config, &mut output),
        Commands::Map(args) => handlers::handle_map(args, config, &mut output),
        Commands::Completions(args) => handlers::handle_completions(args, &mut std::io::stdout()),
    }
}

/// `--output` wins; otherwise the configured format, falling back to human
fn output_format(cli: &Cli, config: &Config) -> OutputFormat {
    cli.output.unwrap_or_else(|| {
        OutputFormat::from_name(&config.output.format).unwrap_or_else(|| {
            tracing::warn!("Unknown output format in config: {}, using human", config.output.format);
            OutputFormat::Human
        })
    })
}

/// Initialize the logging system
fn init_logging(cli: &Cli, config: &Config) -> Result<()> {
    let mut logging_config = LoggingConfig::resolve(cli.verbosity_level(), cli.quiet, &config.logging);

    // Apply environment overrides
    logging_config.merge_with_env();

    logging::init_logging(logging_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_output_format_precedence() {
        let mut config = Config::default();
        config.output.format = "yaml".to_string();

        let cli = Cli::parse_from(["styx", "validate"]);
        assert_eq!(output_format(&cli, &config), OutputFormat::Yaml);

        let cli = Cli::parse_from(["styx", "--output", "json", "validate"]);
        assert_eq!(output_format(&cli, &config), OutputFormat::Json);

        config.output.format = "xml".to_string();
        let cli = Cli::parse_from(["styx", "validate"]);
        assert_eq!(output_format(&cli, &config), OutputFormat::Human);
    }
}
