mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "nrml", version, about = "NRML schema validation CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_validate_subcommand() {
        let cli = Cli::try_parse_from(["nrml", "validate", "exposure.xml", "sources.xml"])
            .expect("validate args should parse");

        assert!(matches!(cli.command, Command::Validate(_)));
    }

    #[test]
    fn validate_requires_at_least_one_file() {
        let err = Cli::try_parse_from(["nrml", "validate"])
            .expect_err("missing files should fail");

        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn parses_events_subcommand_with_filter() {
        let cli = Cli::try_parse_from(["nrml", "events", "exposure.xml", "--events", "start"])
            .expect("events args should parse");
        assert!(matches!(cli.command, Command::Events(_)));
    }

    #[test]
    fn parses_schema_path_subcommand() {
        let cli = Cli::try_parse_from(["nrml", "schema-path"])
            .expect("schema-path args should parse");
        assert!(matches!(cli.command, Command::SchemaPath(_)));
    }
}
