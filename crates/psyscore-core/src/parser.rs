//! Section and row decoding for the exported score table.
//!
//! The decoded export is a list of named sections. Each section starts with a
//! marker line, then two header lines, then comma-separated data rows up to
//! the next blank line.

use std::collections::BTreeMap;

use crate::error::ParseError;
use crate::model::{Battery, ConfidenceLevel, IndexScale, Subtest};

/// Marker line of the subtest scaled-score section.
pub const SUBTEST_SECTION: &str = "Skalpoäng";

/// Marker line of the index standard-score section.
pub const INDEX_SECTION: &str = "Indexpoäng";

/// Lines between a marker and the first data row.
const HEADER_LINES: usize = 2;

const SUBTEST_MIN_FIELDS: usize = 3;
const INDEX_FIELDS: usize = 7;

/// The data rows of one section, with the line index of the first row.
#[derive(Debug, Clone, Copy)]
struct Section<'a> {
    first_line: usize,
    rows: &'a [&'a str],
}

impl<'a> Section<'a> {
    /// Rows paired with their 1-based line numbers.
    fn numbered(&self) -> impl Iterator<Item = (usize, &'a str)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .map(move |(i, row)| (self.first_line + i + 1, *row))
    }
}

/// Parse already-decoded export text into a [`Battery`].
pub fn parse_export_text(text: &str) -> Result<Battery, ParseError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let lines = split_lines(text);

    let subtests = find_section(&lines, SUBTEST_SECTION)?
        .numbered()
        .map(|(line, row)| subtest_from_row(line, row))
        .collect::<Result<Vec<_>, _>>()?;

    let indices = find_section(&lines, INDEX_SECTION)?
        .numbered()
        .map(|(line, row)| index_from_row(line, row))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        indices = indices.len(),
        subtests = subtests.len(),
        "parsed battery"
    );

    Ok(Battery::new(indices, subtests))
}

/// Split on `\r\n`, a bare `\r` or `\n`, and the rarer vertical tab, form
/// feed, information separators, NEL and Unicode line/paragraph separators.
/// A final terminator adds no empty line.
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let end = match c {
            '\r' => match chars.peek() {
                Some((_, '\n')) => {
                    chars.next();
                    i + 2
                }
                _ => i + 1,
            },
            '\n' | '\u{0b}' | '\u{0c}' | '\u{1c}' | '\u{1d}' | '\u{1e}' | '\u{85}'
            | '\u{2028}' | '\u{2029}' => i + c.len_utf8(),
            _ => continue,
        };
        lines.push(&text[start..i]);
        start = end;
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

fn find_section<'a>(lines: &'a [&'a str], marker: &str) -> Result<Section<'a>, ParseError> {
    let marker_line = lines
        .iter()
        .position(|line| *line == marker)
        .ok_or_else(|| ParseError::MissingSection {
            marker: marker.to_string(),
        })?;

    let truncated = || ParseError::TruncatedSection {
        marker: marker.to_string(),
    };

    let start = marker_line + 1 + HEADER_LINES;
    let body = lines.get(start..).ok_or_else(truncated)?;
    let len = body
        .iter()
        .position(|line| line.is_empty())
        .ok_or_else(truncated)?;

    tracing::debug!(marker, start, rows = len, "located section");

    Ok(Section {
        first_line: start,
        rows: &body[..len],
    })
}

/// Strip the leading code token from a label: `"10 Vocabulary"` -> `"Vocabulary"`.
pub fn short_name(label: &str) -> Option<&str> {
    label.split_once(' ').map(|(_, rest)| rest)
}

fn short_name_at(line: usize, label: &str) -> Result<String, ParseError> {
    short_name(label)
        .map(str::to_string)
        .ok_or_else(|| ParseError::MalformedLabel {
            line,
            label: label.to_string(),
        })
}

fn parse_int(line: usize, row: &str, field: &str, what: &str) -> Result<i32, ParseError> {
    field.trim().parse().map_err(|_| ParseError::MalformedRow {
        line,
        row: row.to_string(),
        reason: format!("{what} `{field}` is not an integer"),
    })
}

fn subtest_from_row(line: usize, row: &str) -> Result<Subtest, ParseError> {
    let fields: Vec<&str> = row.split(',').collect();
    if fields.len() < SUBTEST_MIN_FIELDS {
        return Err(ParseError::MalformedRow {
            line,
            row: row.to_string(),
            reason: format!(
                "expected at least {SUBTEST_MIN_FIELDS} fields, found {}",
                fields.len()
            ),
        });
    }

    Ok(Subtest {
        short_name: short_name_at(line, fields[0])?,
        description: None,
        score: parse_int(line, row, fields[2], "score")?,
        raw_score: None,
    })
}

fn index_from_row(line: usize, row: &str) -> Result<IndexScale, ParseError> {
    let fields: Vec<&str> = row.split(',').collect();
    let &[name, score, percentile, ci90_low, ci90_high, ci95_low, ci95_high] = fields.as_slice()
    else {
        return Err(ParseError::MalformedRow {
            line,
            row: row.to_string(),
            reason: format!("expected {INDEX_FIELDS} fields, found {}", fields.len()),
        });
    };

    let int = |field: &str, what: &str| parse_int(line, row, field, what);

    let mut confidence_intervals = BTreeMap::new();
    confidence_intervals.insert(
        ConfidenceLevel::Ninety,
        (int(ci90_low, "90% low")?, int(ci90_high, "90% high")?).into(),
    );
    confidence_intervals.insert(
        ConfidenceLevel::NinetyFive,
        (int(ci95_low, "95% low")?, int(ci95_high, "95% high")?).into(),
    );

    Ok(IndexScale {
        short_name: short_name_at(line, name)?,
        long_name: name.to_string(),
        description: None,
        score: int(score, "score")?,
        percentile: int(percentile, "percentile")?,
        confidence_intervals,
        subtests: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::model::ConfidenceInterval;

    const EXPORT: &str = "\
Klient,TT111111
Testdatum,2023-04-10

Skalpoäng
Delprov,Råpoäng,Skalpoäng
,,
SI Likheter,30,11
VC Ordförråd,28,12
BD Blockmönster,40,9

Indexpoäng
Index,Indexpoäng,Percentil,90% låg,90% hög,95% låg,95% hög
,,,,,,
10 Verbal Comprehension Index,105,63,98,112,96,114
20 Visual Spatial Index,94,34,87,102,86,103

Slut
";

    #[test]
    fn parse_full_export() {
        let battery = parse_export_text(EXPORT).unwrap();

        let names: Vec<&str> = battery
            .subtests()
            .iter()
            .map(|s| s.short_name.as_str())
            .collect();
        assert_eq!(names, vec!["Likheter", "Ordförråd", "Blockmönster"]);
        assert_eq!(battery.subtests()[1].score, 12);
        assert_eq!(battery.subtests()[0].raw_score, None);

        assert_eq!(battery.indices().len(), 2);
        let vci = &battery.indices()[0];
        assert_eq!(vci.short_name, "Verbal Comprehension Index");
        assert_eq!(vci.long_name, "10 Verbal Comprehension Index");
        assert_eq!(vci.score, 105);
        assert_eq!(vci.percentile, 63);
        assert_eq!(
            vci.confidence_interval(ConfidenceLevel::Ninety),
            Some(ConfidenceInterval { low: 98, high: 112 })
        );
        assert_eq!(vci.ci_95().as_deref(), Some("96-114"));
        assert_eq!(vci.score_description(), "average");
        assert!(vci.subtests.is_empty());
    }

    #[test]
    fn crlf_line_endings() {
        let text = EXPORT.replace('\n', "\r\n");
        let battery = parse_export_text(&text).unwrap();
        assert_eq!(battery.indices().len(), 2);
        assert_eq!(battery.subtests()[2].short_name, "Blockmönster");
    }

    #[test]
    fn cr_only_line_endings() {
        let text = EXPORT.replace('\n', "\r");
        let battery = parse_export_text(&text).unwrap();
        assert_eq!(battery.indices().len(), 2);
        assert_eq!(battery.subtests().len(), 3);
        assert_eq!(battery.indices()[1].short_name, "Visual Spatial Index");
    }

    #[test]
    fn split_lines_matches_all_terminators() {
        assert_eq!(split_lines("a\r\nb\rc\nd"), vec!["a", "b", "c", "d"]);
        assert_eq!(split_lines("a\r\n\r\nb\n"), vec!["a", "", "b"]);
        assert_eq!(split_lines("a\u{2028}b\u{85}c"), vec!["a", "b", "c"]);
        assert_eq!(split_lines("\r"), vec![""]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn parse_is_deterministic() {
        let a = parse_export_text(EXPORT).unwrap();
        let b = parse_export_text(EXPORT).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn sections_are_isolated() {
        // Subtest rows with 7 fields must not leak into the index section.
        let text = "\
Skalpoäng
h1
h2
AA One,1,2,3,4,5,6

Indexpoäng
h1
h2
10 Full Scale,100,50,95,105,93,107

";
        let battery = parse_export_text(text).unwrap();
        assert_eq!(battery.subtests().len(), 1);
        assert_eq!(battery.subtests()[0].short_name, "One");
        assert_eq!(battery.subtests()[0].score, 2);
        assert_eq!(battery.indices().len(), 1);
        assert_eq!(battery.indices()[0].short_name, "Full Scale");
    }

    #[test]
    fn empty_sections() {
        let text = "Skalpoäng\nh1\nh2\n\nIndexpoäng\nh1\nh2\n\n";
        let battery = parse_export_text(text).unwrap();
        assert!(battery.is_empty());
    }

    #[test]
    fn marker_must_match_exactly() {
        let text = EXPORT.replace("Indexpoäng\n", "Indexpoang\n");
        let err = parse_export_text(&text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingSection);
        assert!(err.to_string().contains("Indexpoäng"));
    }

    #[test]
    fn missing_subtest_section() {
        let text = "Indexpoäng\nh1\nh2\n10 Full Scale,100,50,95,105,93,107\n\n";
        let err = parse_export_text(text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingSection);
    }

    #[test]
    fn section_without_blank_terminator() {
        let text = "Skalpoäng\nh1\nh2\n\nIndexpoäng\nh1\nh2\n10 Full Scale,100,50,95,105,93,107";
        let err = parse_export_text(text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedSection);
    }

    #[test]
    fn marker_at_end_of_input() {
        let text = "Skalpoäng\nh1\nh2\n\nIndexpoäng\nh1";
        let err = parse_export_text(text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedSection);
    }

    #[test]
    fn index_row_with_wrong_field_count() {
        let text = "Skalpoäng\nh1\nh2\n\nIndexpoäng\nh1\nh2\n10 Full Scale,100,50,95,105,93\n\n";
        let err = parse_export_text(text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedRow);
        assert_eq!(err.line(), Some(8));
        assert!(err.to_string().contains("expected 7 fields, found 6"));
    }

    #[test]
    fn subtest_row_with_too_few_fields() {
        let text = "Skalpoäng\nh1\nh2\nSI Likheter,30\n\nIndexpoäng\nh1\nh2\n\n";
        let err = parse_export_text(text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedRow);
        assert_eq!(err.line(), Some(4));
    }

    #[test]
    fn non_integer_percentile() {
        let text =
            "Skalpoäng\nh1\nh2\n\nIndexpoäng\nh1\nh2\n10 Full Scale,100,>99.9,95,105,93,107\n\n";
        let err = parse_export_text(text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedRow);
        assert!(err.to_string().contains("percentile"));
    }

    #[test]
    fn label_without_code_token() {
        let text = "Skalpoäng\nh1\nh2\nLikheter,30,11\n\nIndexpoäng\nh1\nh2\n\n";
        let err = parse_export_text(text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedLabel);
        assert!(err.to_string().contains("Likheter"));
    }

    #[test]
    fn short_name_strips_first_token_only() {
        assert_eq!(
            short_name("10 Verbal Comprehension Index"),
            Some("Verbal Comprehension Index")
        );
        assert_eq!(short_name("SI Likheter"), Some("Likheter"));
        assert_eq!(short_name("X "), Some(""));
        assert_eq!(short_name("Likheter"), None);
    }

    #[test]
    fn numeric_fields_tolerate_padding() {
        let text = "Skalpoäng\nh1\nh2\nSI Likheter,30, 11\n\nIndexpoäng\nh1\nh2\n\n";
        let battery = parse_export_text(text).unwrap();
        assert_eq!(battery.subtests()[0].score, 11);
    }

    #[test]
    fn leading_bom_is_ignored() {
        let text = format!("\u{feff}{EXPORT}");
        assert_eq!(parse_export_text(&text).unwrap().indices().len(), 2);
    }
}
