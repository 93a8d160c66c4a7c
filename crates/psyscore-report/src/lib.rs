//! psyscore-report: Report rendering for parsed batteries.
//!
//! Renders a [`Battery`] as plain text, a self-contained HTML page, or JSON.

pub mod html;
pub mod text;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use psyscore_core::Battery;

/// Output formats for a rendered report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Html,
    Json,
}

impl ReportFormat {
    /// Conventional file extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Html => "html",
            ReportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Html => write!(f, "html"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "plain" => Ok(ReportFormat::Text),
            "html" | "htm" => Ok(ReportFormat::Html),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("unknown report format: {other}")),
        }
    }
}

/// Presentation settings shared by all renderers.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Heading at the top of the report.
    pub title: String,
    /// Whether to render the subtest table.
    pub include_subtests: bool,
    /// Timestamp printed in the report header.
    pub generated_at: DateTime<Utc>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            title: "Test report".to_string(),
            include_subtests: true,
            generated_at: Utc::now(),
        }
    }
}

/// Render a battery in the given format.
pub fn render(battery: &Battery, format: ReportFormat, options: &ReportOptions) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(text::generate_text(battery, options)),
        ReportFormat::Html => Ok(html::generate_html(battery, options)),
        ReportFormat::Json => {
            serde_json::to_string_pretty(battery).context("failed to serialize battery")
        }
    }
}

/// Parse the export archive at `archive`.
pub fn load_battery(archive: &Path) -> Result<Battery> {
    let battery = psyscore_core::parse_archive(archive)
        .with_context(|| format!("failed to parse export {}", archive.display()))?;
    tracing::info!(
        indices = battery.indices().len(),
        subtests = battery.subtests().len(),
        "parsed export"
    );
    Ok(battery)
}

/// Parse the export archive at `archive` and render it.
///
/// Nothing is rendered unless the whole archive parses.
pub fn create_report(
    archive: &Path,
    format: ReportFormat,
    options: &ReportOptions,
) -> Result<String> {
    let battery = load_battery(archive)?;
    render(&battery, format, options)
}

/// Write a rendered report to `path`, creating parent directories.
pub fn save_report(report: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    std::fs::write(path, report)
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    Ok(())
}



#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use std::io::{Cursor, Write};

    fn export_archive(text: &str) -> Vec<u8> {
        let mut data = vec![0xFF, 0xFE];
        data.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("scores.csv", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(&data).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn format_display_and_parse() {
        assert_eq!(ReportFormat::Html.to_string(), "html");
        assert_eq!("TEXT".parse::<ReportFormat>().unwrap(), ReportFormat::Text);
        assert_eq!("plain".parse::<ReportFormat>().unwrap(), ReportFormat::Text);
        assert_eq!("json".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert!("pdf".parse::<ReportFormat>().is_err());
        assert_eq!(ReportFormat::default(), ReportFormat::Text);
        assert_eq!(ReportFormat::Html.extension(), "html");
    }

    #[test]
    fn json_roundtrips_battery() {
        let battery = make_battery();
        let json = render(&battery, ReportFormat::Json, &options()).unwrap();
        let back: Battery = serde_json::from_str(&json).unwrap();
        assert_eq!(back, battery);
    }

    #[test]
    fn create_report_from_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.zip");
        std::fs::write(
            &path,
            export_archive(
                "Skalpoäng\r\nh\r\nh\r\nSI Likheter,30,11\r\n\r\n\
Indexpoäng\r\nh\r\nh\r\n10 Verbal Comprehension Index,105,63,98,112,96,114\r\n\r\n",
            ),
        )
        .unwrap();

        let report = create_report(&path, ReportFormat::Text, &options()).unwrap();
        assert!(report.contains("Verbal Comprehension Index"));
        assert!(report.contains("96-114"));
        assert!(report.contains("average"));
        assert!(report.contains("Likheter"));
    }

    #[test]
    fn create_report_fails_without_data_member() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.zip");
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("notes.txt", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"nothing here").unwrap();
        std::fs::write(&path, writer.finish().unwrap().into_inner()).unwrap();

        let err = create_report(&path, ReportFormat::Html, &options()).unwrap_err();
        let parse_err = err.downcast_ref::<psyscore_core::ParseError>().unwrap();
        assert_eq!(parse_err.kind(), psyscore_core::ErrorKind::MissingDataMember);
    }

    #[test]
    fn save_report_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/report.txt");

        let report = render(&make_battery(), ReportFormat::Text, &options()).unwrap();
        save_report(&report, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Testrapport TT111111"));
    }

    #[test]
    fn save_report_names_parent_it_cannot_create() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("taken");
        std::fs::write(&blocker, "not a directory").unwrap();
        let path = blocker.join("sub/report.txt");

        let err = save_report("report", &path).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.starts_with("failed to create directory"), "{message}");
        assert!(message.contains("taken"), "{message}");
        assert!(err.downcast_ref::<std::io::Error>().is_some());
    }

    #[test]
    fn load_battery_names_the_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.zip");

        let err = load_battery(&path).unwrap_err();
        assert!(err.to_string().contains("missing.zip"));
    }
}
