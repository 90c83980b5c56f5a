use nrml_schema::nrml_schema_file;
use serde::Serialize;

use crate::cmd::SchemaPathArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::OutputFormat;

#[derive(Serialize)]
struct SchemaPathOutput {
    schema_path: String,
}

pub fn run(_args: SchemaPathArgs, format: OutputFormat) -> CliResult<i32> {
    let path = nrml_schema_file();
    match format {
        OutputFormat::Json => {
            let out = SchemaPathOutput {
                schema_path: path.display().to_string(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty | OutputFormat::Raw => {
            println!("{}", path.display());
        }
    }
    Ok(SUCCESS)
}
