//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS inlined.

use psyscore_core::{Battery, ConfidenceLevel, ScoreBand};

use crate::ReportOptions;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn band_class(band: ScoreBand) -> &'static str {
    match band {
        ScoreBand::FarBelowAverage | ScoreBand::ClearlyBelowAverage => "below",
        ScoreBand::LowAverage | ScoreBand::Average | ScoreBand::HighAverage => "average",
        ScoreBand::ClearlyAboveAverage | ScoreBand::FarAboveAverage => "above",
    }
}

/// Generate an HTML report for a battery.
pub fn generate_html(battery: &Battery, options: &ReportOptions) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>{}</title>\n",
        html_escape(&options.title)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(&options.title)));
    html.push_str(&format!(
        "<p class=\"meta\">{} index scales | {} subtests | {}</p>\n",
        battery.indices().len(),
        battery.subtests().len(),
        options.generated_at.format("%Y-%m-%d %H:%M UTC")
    ));
    html.push_str("</header>\n");

    // Index scales
    html.push_str("<section class=\"indices\">\n");
    html.push_str("<h2>Index scales</h2>\n");
    html.push_str("<table>\n");
    html.push_str("<thead><tr><th>Index</th><th>Score</th><th>Percentile</th><th>90% CI</th><th>95% CI</th><th>Description</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for index in battery.indices() {
        let ci = |level| {
            index
                .confidence_interval(level)
                .map(|ci| ci.to_string())
                .unwrap_or_else(|| "-".to_string())
        };
        html.push_str(&format!(
            "<tr class=\"{}\"><td title=\"{}\">{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            band_class(index.score_band()),
            html_escape(&index.long_name),
            html_escape(&index.short_name),
            index.score,
            index.percentile,
            ci(ConfidenceLevel::Ninety),
            ci(ConfidenceLevel::NinetyFive),
            index.score_description(),
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Subtests
    if options.include_subtests {
        html.push_str("<section class=\"subtests\">\n");
        html.push_str("<h2>Subtests</h2>\n");
        html.push_str("<table>\n");
        html.push_str("<thead><tr><th>Subtest</th><th>Scaled score</th></tr></thead>\n");
        html.push_str("<tbody>\n");
        for subtest in battery.subtests() {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td></tr>\n",
                html_escape(&subtest.short_name),
                subtest.score
            ));
        }
        html.push_str("</tbody></table>\n");
        html.push_str("</section>\n");
    }

    html.push_str("</body>\n</html>");
    html
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --below: #fde2e2; --above: #dcfce7; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --below: #7f1d1d; --above: #064e3b; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
.below { background: var(--below); }
.above { background: var(--above); }
"#;
