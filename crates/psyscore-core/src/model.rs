//! Result model for one test administration.
//!
//! A [`Battery`] holds the index scales and subtests decoded from an export,
//! in the order they appeared. Everything here is plain data once built; the
//! parser fills a battery once and hands it to the caller.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The full result set for one test administration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Battery {
    indices: Vec<IndexScale>,
    subtests: Vec<Subtest>,
}

impl Battery {
    /// Build a battery from already-ordered records.
    pub fn new(indices: Vec<IndexScale>, subtests: Vec<Subtest>) -> Self {
        Self { indices, subtests }
    }

    /// Index scales in the order they were encountered.
    pub fn indices(&self) -> &[IndexScale] {
        &self.indices
    }

    /// Subtests in the order they were encountered.
    pub fn subtests(&self) -> &[Subtest] {
        &self.subtests
    }

    /// Look up an index scale by case-insensitive name prefix.
    ///
    /// A name that is empty after trimming matches nothing.
    pub fn get_index(&self, name: &str) -> Option<&IndexScale> {
        find_by_prefix(&self.indices, name, |i| i.short_name.as_str())
    }

    /// Look up a subtest by case-insensitive name prefix.
    ///
    /// A name that is empty after trimming matches nothing.
    pub fn get_subtest(&self, name: &str) -> Option<&Subtest> {
        find_by_prefix(&self.subtests, name, |s| s.short_name.as_str())
    }

    /// Look up a score by name, trying index scales before subtests.
    pub fn get(&self, name: &str) -> Option<ScoreRef<'_>> {
        self.get_index(name)
            .map(ScoreRef::Index)
            .or_else(|| self.get_subtest(name).map(ScoreRef::Subtest))
    }

    /// True when the battery holds neither index scales nor subtests.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty() && self.subtests.is_empty()
    }
}

impl fmt::Display for Battery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indices: Vec<String> = self.indices.iter().map(ToString::to_string).collect();
        write!(f, "Battery ({})", indices.join(", "))
    }
}

/// A borrowed hit from [`Battery::get`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreRef<'a> {
    Index(&'a IndexScale),
    Subtest(&'a Subtest),
}

impl ScoreRef<'_> {
    pub fn short_name(&self) -> &str {
        match self {
            ScoreRef::Index(i) => &i.short_name,
            ScoreRef::Subtest(s) => &s.short_name,
        }
    }

    pub fn score(&self) -> i32 {
        match self {
            ScoreRef::Index(i) => i.score,
            ScoreRef::Subtest(s) => s.score,
        }
    }
}

/// Return the first item whose key starts with `name`, ignoring case and
/// surrounding whitespace. An empty name matches nothing.
pub fn find_by_prefix<'a, T, F>(items: &'a [T], name: &str, key: F) -> Option<&'a T>
where
    F: Fn(&T) -> &str,
{
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    items
        .iter()
        .find(|item| key(item).to_lowercase().starts_with(&needle))
}

/// One composite index scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexScale {
    /// Canonical lookup key, the label without its leading code token.
    pub short_name: String,
    /// The label exactly as exported.
    pub long_name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Standard score.
    pub score: i32,
    pub percentile: i32,
    #[serde(default)]
    pub confidence_intervals: BTreeMap<ConfidenceLevel, ConfidenceInterval>,
    /// Subtests contributing to this index, when the export lists them.
    #[serde(default)]
    pub subtests: Vec<Subtest>,
}

impl IndexScale {
    /// The band this index's score falls in.
    pub fn score_band(&self) -> ScoreBand {
        ScoreBand::from_score(self.score)
    }

    /// Human-readable description of the score band.
    pub fn score_description(&self) -> &'static str {
        self.score_band().label()
    }

    pub fn confidence_interval(&self, level: ConfidenceLevel) -> Option<ConfidenceInterval> {
        self.confidence_intervals.get(&level).copied()
    }

    /// The 95% interval formatted as `"<low>-<high>"`, or `None` when absent.
    pub fn ci_95(&self) -> Option<String> {
        self.confidence_interval(ConfidenceLevel::NinetyFive)
            .map(|ci| ci.to_string())
    }

    /// Look up a nested subtest by case-insensitive name prefix.
    pub fn get_subtest(&self, name: &str) -> Option<&Subtest> {
        find_by_prefix(&self.subtests, name, |s| s.short_name.as_str())
    }
}

impl fmt::Display for IndexScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.short_name, self.score)
    }
}

/// One elementary subtest score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtest {
    /// Canonical lookup key.
    pub short_name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Scaled score.
    pub score: i32,
    /// Not present in current exports.
    #[serde(default)]
    pub raw_score: Option<i32>,
}

impl fmt::Display for Subtest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Subtest {} ({})", self.short_name, self.score)
    }
}

/// Confidence level of an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    #[serde(rename = "90")]
    Ninety,
    #[serde(rename = "95")]
    NinetyFive,
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceLevel::Ninety => write!(f, "90"),
            ConfidenceLevel::NinetyFive => write!(f, "95"),
        }
    }
}

impl FromStr for ConfidenceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_end_matches('%') {
            "90" => Ok(ConfidenceLevel::Ninety),
            "95" => Ok(ConfidenceLevel::NinetyFive),
            other => Err(format!("unknown confidence level: {other}")),
        }
    }
}

/// A `(low, high)` bound pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub low: i32,
    pub high: i32,
}

impl From<(i32, i32)> for ConfidenceInterval {
    fn from((low, high): (i32, i32)) -> Self {
        Self { low, high }
    }
}

impl fmt::Display for ConfidenceInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

/// Classification of a standard score. Variants are ordered low to high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    FarBelowAverage,
    ClearlyBelowAverage,
    LowAverage,
    Average,
    HighAverage,
    ClearlyAboveAverage,
    FarAboveAverage,
}

impl ScoreBand {
    /// Classify a standard score. Defined for every `i32`.
    pub fn from_score(score: i32) -> Self {
        match score {
            i32::MIN..=70 => ScoreBand::FarBelowAverage,
            71..=85 => ScoreBand::ClearlyBelowAverage,
            86..=92 => ScoreBand::LowAverage,
            93..=107 => ScoreBand::Average,
            108..=115 => ScoreBand::HighAverage,
            116..=130 => ScoreBand::ClearlyAboveAverage,
            131..=i32::MAX => ScoreBand::FarAboveAverage,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreBand::FarBelowAverage => "far below average",
            ScoreBand::ClearlyBelowAverage => "clearly below average",
            ScoreBand::LowAverage => "low average",
            ScoreBand::Average => "average",
            ScoreBand::HighAverage => "high average",
            ScoreBand::ClearlyAboveAverage => "clearly above average",
            ScoreBand::FarAboveAverage => "far above average",
        }
    }
}

impl fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
