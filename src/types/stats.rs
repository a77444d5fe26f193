use std::fmt;

use super::value::Value;

/// Per-label counts behind the macro-averaged statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelStats {
    pub label: Value,
    /// Rows with this ground-truth label predicted as this label.
    pub true_positive: usize,
    /// Rows predicted as this label whose ground truth differs.
    pub false_positive: usize,
    /// Rows whose ground-truth label is this label.
    pub ground_truth: usize,
    /// `tp / (tp + fp)` in percent; 0 when the label was never predicted.
    pub precision: f64,
    /// `tp / ground_truth` in percent; 0 when the label never occurs.
    pub recall: f64,
}

/// List-level statistics from the latest evaluation pass. All figures are
/// percentages in `[0, 100]`; zero denominators yield 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateStats {
    pub rows: usize,
    pub correct: usize,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub per_label: Vec<LabelStats>,
}

impl fmt::Display for AggregateStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rows: {}, accuracy: {:.2}%, precision: {:.2}%, recall: {:.2}%, f1: {:.2}%",
            self.rows, self.accuracy, self.precision, self.recall, self.f1
        )
    }
}
