use nrml_schema::{assert_valid, NrmlError};

use crate::cmd::ValidateArgs;
use crate::exit::{nrml_error, CliResult, DATA_INVALID, NO_INPUT, SUCCESS};
use crate::output::{print_reports, FileReport, OutputFormat};

pub fn run(args: ValidateArgs, format: OutputFormat) -> CliResult<i32> {
    let mut reports = Vec::with_capacity(args.files.len());
    let mut missing = false;
    let mut invalid = false;

    for path in &args.files {
        let file = path.display().to_string();
        match assert_valid(path.as_path()) {
            Ok(document) => {
                let root = document.root().map(|root| root.name());
                reports.push(FileReport::valid(file, root));
            }
            Err(err @ NrmlError::SchemaCompile { .. }) => {
                // A broken bundled schema fails every file the same way;
                // abort instead of repeating the report per file.
                return Err(nrml_error("schema compilation failed", err));
            }
            Err(err @ NrmlError::NotFound(_)) => {
                missing = true;
                reports.push(FileReport::failed(file, "missing", err.to_string()));
            }
            Err(err) => {
                invalid = true;
                reports.push(FileReport::failed(file, "invalid", err.to_string()));
            }
        }
    }

    print_reports(&reports, format);

    if missing {
        Ok(NO_INPUT)
    } else if invalid {
        Ok(DATA_INVALID)
    } else {
        Ok(SUCCESS)
    }
}
