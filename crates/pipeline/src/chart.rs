//! Chart formatting and score normalization.
//!
//! Rankings leave the engine as a chart dataset:
//!
//! ```json
//! {"source": [["amount", "product"], [4.2, "Machine Learning"], ...]}
//! ```
//!
//! A header row followed by `[score, label]` data rows.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const HEADER_SCORE: &str = "amount";
pub const HEADER_LABEL: &str = "product";

/// An (id, score) pair in a ranked list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredEntry {
    pub id: String,
    pub score: f64,
}

impl ScoredEntry {
    pub fn new(id: impl Into<String>, score: f64) -> Self {
        Self {
            id: id.into(),
            score,
        }
    }
}

/// One row of the chart dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChartRow {
    /// `[score, label]`
    Data(f64, String),
    /// `["amount", "product"]`
    Header(String, String),
}

impl ChartRow {
    pub fn header() -> Self {
        ChartRow::Header(HEADER_SCORE.to_string(), HEADER_LABEL.to_string())
    }

    pub fn score(&self) -> Option<f64> {
        match self {
            ChartRow::Data(score, _) => Some(*score),
            ChartRow::Header(..) => None,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            ChartRow::Data(_, label) => Some(label),
            ChartRow::Header(..) => None,
        }
    }
}

/// Chart dataset: header row plus data rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub source: Vec<ChartRow>,
}

impl ChartData {
    /// Scores of the data rows, in order
    pub fn scores(&self) -> Vec<f64> {
        self.source.iter().filter_map(ChartRow::score).collect()
    }

    /// Labels of the data rows, in order
    pub fn labels(&self) -> Vec<&str> {
        self.source.iter().filter_map(ChartRow::label).collect()
    }

    pub fn data_len(&self) -> usize {
        self.source
            .iter()
            .filter(|row| matches!(row, ChartRow::Data(..)))
            .count()
    }
}

/// Convert a ranked list into a chart dataset.
///
/// Entries whose id has no label are left out.
pub fn to_chart_format(entries: &[ScoredEntry], labels: &HashMap<String, String>) -> ChartData {
    let mut source = Vec::with_capacity(entries.len() + 1);
    source.push(ChartRow::header());
    source.extend(entries.iter().filter_map(|entry| {
        labels
            .get(&entry.id)
            .map(|label| ChartRow::Data(entry.score, label.clone()))
    }));
    ChartData { source }
}

/// Rescale the score column into `[low, high]`.
///
/// Header rows are skipped and labels are never reordered. With fewer than
/// two data rows, or when every score is equal, each score becomes the
/// midpoint of the range.
pub fn normalize(mut chart: ChartData, low: f64, high: f64) -> ChartData {
    let scores = chart.scores();
    if scores.is_empty() {
        return chart;
    }

    let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let midpoint = (low + high) / 2.0;
    let degenerate = scores.len() < 2 || max == min;

    for row in chart.source.iter_mut() {
        if let ChartRow::Data(score, _) = row {
            *score = if degenerate {
                midpoint
            } else {
                low + (high - low) * (*score - min) / (max - min)
            };
        }
    }
    chart
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> HashMap<String, String> {
        [("C1", "Algorithms"), ("C2", "Compilers"), ("C3", "Databases")]
            .into_iter()
            .map(|(id, name)| (id.to_string(), name.to_string()))
            .collect()
    }

    fn chart_of(scores: &[f64]) -> ChartData {
        let mut source = vec![ChartRow::header()];
        source.extend(
            scores
                .iter()
                .enumerate()
                .map(|(i, s)| ChartRow::Data(*s, format!("course {}", i))),
        );
        ChartData { source }
    }

    #[test]
    fn test_chart_format_layout() {
        let entries = vec![ScoredEntry::new("C2", 4.5), ScoredEntry::new("C1", 3.0)];
        let chart = to_chart_format(&entries, &labels());

        assert_eq!(chart.source[0], ChartRow::header());
        assert_eq!(chart.source[1], ChartRow::Data(4.5, "Compilers".to_string()));
        assert_eq!(chart.source[2], ChartRow::Data(3.0, "Algorithms".to_string()));
    }

    #[test]
    fn test_chart_format_skips_unknown_ids() {
        let entries = vec![ScoredEntry::new("C9", 5.0), ScoredEntry::new("C3", 2.0)];
        let chart = to_chart_format(&entries, &labels());
        assert_eq!(chart.data_len(), 1);
        assert_eq!(chart.labels(), vec!["Databases"]);
    }

    #[test]
    fn test_chart_round_trip_preserves_scores() {
        let entries = vec![
            ScoredEntry::new("C1", 4.25),
            ScoredEntry::new("C2", 3.1),
            ScoredEntry::new("C3", 0.7),
        ];
        let chart = to_chart_format(&entries, &labels());
        let scores: Vec<f64> = entries.iter().map(|e| e.score).collect();
        assert_eq!(chart.scores(), scores);
    }

    #[test]
    fn test_chart_json_shape() {
        let chart = to_chart_format(&[ScoredEntry::new("C1", 2.5)], &labels());
        let json = serde_json::to_string(&chart).unwrap();
        assert_eq!(json, r#"{"source":[["amount","product"],[2.5,"Algorithms"]]}"#);

        let parsed: ChartData = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, chart);
    }

    #[test]
    fn test_normalize_linear() {
        let chart = normalize(chart_of(&[10.0, 20.0, 30.0]), 1.0, 5.0);
        assert_eq!(chart.scores(), vec![1.0, 3.0, 5.0]);
        assert_eq!(chart.source[0], ChartRow::header());
    }

    #[test]
    fn test_normalize_constant_column() {
        let chart = normalize(chart_of(&[4.0, 4.0, 4.0]), 0.0, 1.0);
        assert_eq!(chart.scores(), vec![0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_normalize_single_row() {
        let chart = normalize(chart_of(&[7.0]), 1.0, 5.0);
        assert_eq!(chart.scores(), vec![3.0]);
    }

    #[test]
    fn test_normalize_header_only() {
        let chart = normalize(chart_of(&[]), 1.0, 5.0);
        assert_eq!(chart, chart_of(&[]));
    }

    #[test]
    fn test_normalize_keeps_label_order() {
        let chart = normalize(chart_of(&[3.0, 9.0, 6.0]), 0.0, 1.0);
        assert_eq!(chart.labels(), vec!["course 0", "course 1", "course 2"]);
        assert_eq!(chart.scores(), vec![0.0, 1.0, 0.5]);
    }
}
