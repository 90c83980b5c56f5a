use nrml_schema::{iter_events, EventKind};

use crate::cmd::EventsArgs;
use crate::exit::{reader_error, CliResult, SUCCESS};
use crate::output::{print_event, OutputFormat};

pub fn run(args: EventsArgs, format: OutputFormat) -> CliResult<i32> {
    let events: Vec<EventKind> = args.events.iter().copied().map(EventKind::from).collect();

    let stream = iter_events(args.file.as_path(), &events)
        .map_err(|err| reader_error("cannot start traversal", err))?;

    for item in stream {
        let (kind, element) = item.map_err(|err| reader_error("traversal failed", err))?;
        print_event(kind, &element, format);
    }

    Ok(SUCCESS)
}
