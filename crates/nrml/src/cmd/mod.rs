use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use nrml_schema::EventKind;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod events;
pub mod schema_path;
pub mod validate;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate NRML files against the bundled schema.
    Validate(ValidateArgs),
    /// Stream element events while validating incrementally.
    Events(EventsArgs),
    /// Print the resolved path of the bundled schema.
    SchemaPath(SchemaPathArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Validate(args) => validate::run(args, format),
        Command::Events(args) => events::run(args, format),
        Command::SchemaPath(args) => schema_path::run(args, format),
    }
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Args, Debug)]
pub struct EventsArgs {
    /// File to traverse.
    pub file: PathBuf,
    /// Events to report (comma-separated).
    #[arg(long, value_delimiter = ',', default_values = ["start", "end"])]
    pub events: Vec<EventArg>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum EventArg {
    Start,
    End,
}

impl From<EventArg> for EventKind {
    fn from(arg: EventArg) -> Self {
        match arg {
            EventArg::Start => EventKind::Start,
            EventArg::End => EventKind::End,
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct SchemaPathArgs {}
