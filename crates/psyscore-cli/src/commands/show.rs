//! The `psyscore show` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::Table;

use psyscore_core::{Battery, ConfidenceLevel, ScoreRef};

pub fn execute(input: PathBuf, name: Option<String>, level: String) -> Result<()> {
    let level: ConfidenceLevel = level.parse().map_err(|e: String| anyhow::anyhow!("{}", e))?;
    let battery = psyscore_report::load_battery(&input)?;

    match name {
        Some(name) => show_one(&battery, &name),
        None => {
            show_all(&battery, level);
            Ok(())
        }
    }
}

fn show_one(battery: &Battery, name: &str) -> Result<()> {
    let hit = battery
        .get(name)
        .ok_or_else(|| anyhow::anyhow!("no index or subtest matches `{name}`"))?;

    match hit {
        ScoreRef::Index(index) => {
            println!("{} ({})", index.short_name, index.long_name);
            println!("  Score:       {}", index.score);
            println!("  Percentile:  {}", index.percentile);
            for level in [ConfidenceLevel::Ninety, ConfidenceLevel::NinetyFive] {
                if let Some(ci) = index.confidence_interval(level) {
                    println!("  {level}% CI:     {ci}");
                }
            }
            println!("  Description: {}", index.score_description());
        }
        ScoreRef::Subtest(subtest) => {
            println!("{}", subtest.short_name);
            println!("  Scaled score: {}", subtest.score);
        }
    }

    Ok(())
}

fn show_all(battery: &Battery, level: ConfidenceLevel) {
    let mut indices = Table::new();
    let ci_header = format!("{level}% CI");
    indices.set_header(vec!["Index", "Score", "Percentile", ci_header.as_str(), "Description"]);
    for index in battery.indices() {
        indices.add_row(vec![
            index.short_name.clone(),
            index.score.to_string(),
            index.percentile.to_string(),
            index
                .confidence_interval(level)
                .map(|ci| ci.to_string())
                .unwrap_or_else(|| "-".to_string()),
            index.score_description().to_string(),
        ]);
    }
    println!("{indices}");

    let mut subtests = Table::new();
    subtests.set_header(vec!["Subtest", "Scaled score"]);
    for subtest in battery.subtests() {
        subtests.add_row(vec![subtest.short_name.clone(), subtest.score.to_string()]);
    }
    println!("{subtests}");
}
