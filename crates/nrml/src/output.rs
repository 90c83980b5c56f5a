use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use nrml_schema::EventKind;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
pub struct FileReport {
    schema_id: &'static str,
    pub file: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl FileReport {
    pub fn valid(file: String, root: Option<String>) -> Self {
        Self {
            schema_id: "https://schemas.openquake.org/nrml/cli/v1/validation-report.schema.json",
            file,
            status: "valid",
            root,
            detail: None,
        }
    }

    pub fn failed(file: String, status: &'static str, detail: String) -> Self {
        Self {
            schema_id: "https://schemas.openquake.org/nrml/cli/v1/validation-report.schema.json",
            file,
            status,
            root: None,
            detail: Some(detail),
        }
    }
}

pub fn print_reports(reports: &[FileReport], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            for report in reports {
                println!(
                    "{}",
                    serde_json::to_string(report).unwrap_or_else(|_| "{}".to_string())
                );
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FILE", "STATUS", "DETAIL"]);
            for report in reports {
                table.add_row(vec![
                    report.file.clone(),
                    report.status.to_string(),
                    report.detail.clone().unwrap_or_default(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for report in reports {
                match &report.detail {
                    Some(detail) => println!("{}: {} ({detail})", report.file, report.status),
                    None => println!("{}: {}", report.file, report.status),
                }
            }
        }
        OutputFormat::Raw => {
            for report in reports {
                println!("{}\t{}", report.file, report.status);
            }
        }
    }
}

#[derive(Serialize)]
struct EventOutput<'a> {
    event: &'a str,
    element: &'a str,
}

pub fn print_event(kind: EventKind, element: &str, format: OutputFormat) {
    let event = event_name(kind);
    match format {
        OutputFormat::Json => {
            let out = EventOutput { event, element };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("{event:<5} {element}");
        }
        OutputFormat::Raw => {
            println!("{event} {element}");
        }
    }
}

pub fn event_name(kind: EventKind) -> &'static str {
    match kind {
        EventKind::Start => "start",
        EventKind::End => "end",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_report_serializes_without_detail() {
        let report = FileReport::valid("exposure.xml".to_string(), Some("nrml".to_string()));
        let json = serde_json::to_string(&report).expect("report should serialize");
        assert!(json.contains(r#""status":"valid""#));
        assert!(json.contains(r#""root":"nrml""#));
        assert!(!json.contains("detail"));
    }

    #[test]
    fn failed_report_carries_detail() {
        let report = FileReport::failed(
            "bad.xml".to_string(),
            "invalid",
            "missing description".to_string(),
        );
        let json = serde_json::to_string(&report).expect("report should serialize");
        assert!(json.contains(r#""status":"invalid""#));
        assert!(json.contains("missing description"));
    }

    #[test]
    fn event_names_are_lowercase() {
        assert_eq!(event_name(EventKind::Start), "start");
        assert_eq!(event_name(EventKind::End), "end");
    }
}
