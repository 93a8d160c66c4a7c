//! The `psyscore init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("psyscore.toml").exists() {
        println!("psyscore.toml already exists, skipping.");
    } else {
        std::fs::write("psyscore.toml", SAMPLE_CONFIG)?;
        println!("Created psyscore.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit psyscore.toml to set the report title and format");
    println!("  2. Run: psyscore show --input <export.zip>");
    println!("  3. Run: psyscore report --input <export.zip> --save");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# psyscore configuration

# text, html or json
default_format = "text"
output_dir = "./psyscore-reports"
title = "Test report"
include_subtests = true
"#;
