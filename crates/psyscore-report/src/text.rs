//! Plain-text report generator.

use psyscore_core::{Battery, IndexScale};

use crate::ReportOptions;

/// Generate a plain-text report.
pub fn generate_text(battery: &Battery, options: &ReportOptions) -> String {
    let mut out = String::new();

    out.push_str(&options.title);
    out.push('\n');
    out.push_str(&"=".repeat(options.title.chars().count()));
    out.push('\n');
    out.push_str(&format!(
        "Generated {}\n\n",
        options.generated_at.format("%Y-%m-%d %H:%M UTC")
    ));

    out.push_str("Index scales\n");
    if battery.indices().is_empty() {
        out.push_str("  (none)\n");
    }
    let width = name_width(battery.indices().iter().map(|i| i.short_name.as_str()));
    for index in battery.indices() {
        out.push_str(&index_line(index, width));
        out.push('\n');
    }

    if options.include_subtests {
        out.push_str("\nSubtests\n");
        if battery.subtests().is_empty() {
            out.push_str("  (none)\n");
        }
        let width = name_width(battery.subtests().iter().map(|s| s.short_name.as_str()));
        for subtest in battery.subtests() {
            out.push_str(&format!(
                "  {:<width$}  {:>3}\n",
                subtest.short_name, subtest.score
            ));
        }
    }

    out
}

fn index_line(index: &IndexScale, width: usize) -> String {
    let ci = index.ci_95().unwrap_or_else(|| "-".to_string());
    format!(
        "  {:<width$}  {:>3}  percentile {:>3}  95% CI {:<7}  {}",
        index.short_name,
        index.score,
        index.percentile,
        ci,
        index.score_description()
    )
}

/// Column width for names, counted in characters rather than bytes.
fn name_width<'a>(names: impl Iterator<Item = &'a str>) -> usize {
    names.map(|n| n.chars().count()).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    #[test]
    fn text_report_lists_indices_and_subtests() {
        let text = generate_text(&make_battery(), &options());

        assert!(text.starts_with("Testrapport TT111111\n====================\n"));
        assert!(text.contains("Generated 2023-04-10 09:30 UTC"));
        assert!(text.contains(
            "  Verbal Comprehension Index  105  percentile  63  95% CI 96-114   average"
        ));
        assert!(text.contains("Processing Speed Index"));
        assert!(text.contains("clearly below average"));
        assert!(text.contains("  Ordförråd   12"));
    }

    #[test]
    fn index_order_is_preserved() {
        let text = generate_text(&make_battery(), &options());
        let vci = text.find("Verbal Comprehension").unwrap();
        let psi = text.find("Processing Speed").unwrap();
        assert!(vci < psi);
    }

    #[test]
    fn subtests_can_be_omitted() {
        let mut opts = options();
        opts.include_subtests = false;
        let text = generate_text(&make_battery(), &opts);
        assert!(!text.contains("Subtests"));
        assert!(!text.contains("Likheter"));
    }

    #[test]
    fn empty_battery() {
        let text = generate_text(&Battery::default(), &options());
        assert!(text.contains("Index scales\n  (none)\n"));
        assert!(text.contains("Subtests\n  (none)\n"));
    }
}
