//! The `psyscore report` command.

use std::path::{Path, PathBuf};

use anyhow::Result;

use psyscore_report::{create_report, save_report, ReportFormat};

use crate::config::load_config_from;

pub fn execute(
    input: PathBuf,
    format: Option<String>,
    output: Option<PathBuf>,
    save: bool,
    title: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let format: ReportFormat = match format {
        Some(f) => f.parse().map_err(|e: String| anyhow::anyhow!("{}", e))?,
        None => config.default_format,
    };

    let mut options = config.report_options();
    if let Some(title) = title {
        options.title = title;
    }

    // Render before touching the output so a bad archive never leaves a file behind.
    let report = create_report(&input, format, &options)?;

    let target = match (output, save) {
        (Some(path), _) => Some(path),
        (None, true) => Some(saved_report_path(&config.output_dir, &input, format)),
        (None, false) => None,
    };

    match target {
        Some(path) => {
            save_report(&report, &path)?;
            eprintln!("Report written to {}", path.display());
        }
        None => {
            println!("{report}");
        }
    }

    Ok(())
}

/// `<output_dir>/<archive stem>.<format extension>`
fn saved_report_path(output_dir: &Path, input: &Path, format: ReportFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    output_dir.join(format!("{stem}.{}", format.extension()))
}
