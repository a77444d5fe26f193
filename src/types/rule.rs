use super::condition::Condition;
use super::value::Value;

/// The `(tp/fp)` pair a rule learner printed after each rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReportedCounts {
    pub true_count: u64,
    pub false_count: u64,
}

impl ReportedCounts {
    #[must_use]
    pub fn new(true_count: u64, false_count: u64) -> Self {
        Self {
            true_count,
            false_count,
        }
    }

    /// `tp / (tp + fp)`, or 0 when the rule reported no instances.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn strength(&self) -> f64 {
        let total = self.true_count + self.false_count;
        if total == 0 {
            0.0
        } else {
            self.true_count as f64 / total as f64
        }
    }
}

/// Statistics from the latest evaluation pass. Replaced wholesale on every
/// pass, never updated incrementally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleStats {
    /// Rows this rule claimed under first-match semantics.
    pub claimed: usize,
    /// Claimed rows per label, indexed like the label feature's values.
    pub per_label: Vec<usize>,
    /// Claimed rows whose label equals the predicted label.
    pub true_count: usize,
    /// `claimed - true_count`.
    pub false_count: usize,
    /// Percentage of snapshot rows claimed, in `[0, 100]`.
    pub support: f64,
    /// Percentage of claimed rows predicted correctly, in `[0, 100]`.
    pub confidence: f64,
}

/// One entry of a decision list: conditions, a predicted label and the
/// counts reported by the learner.
///
/// A rule without conditions is the default rule.
#[derive(Debug, Clone)]
pub struct Rule {
    pub(crate) conditions: Vec<Condition>,
    pub(crate) label: Value,
    pub(crate) reported: ReportedCounts,
    pub(crate) stats: RuleStats,
}

impl Rule {
    pub(crate) fn new(conditions: Vec<Condition>, label: Value, reported: ReportedCounts) -> Self {
        Self {
            conditions,
            label,
            reported,
            stats: RuleStats::default(),
        }
    }

    /// Conditions in the order they were written.
    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// The condition on a given feature, if the rule tests it.
    #[must_use]
    pub fn condition_on(&self, feature: usize) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.feature == feature)
    }

    #[must_use]
    pub fn references(&self, feature: usize) -> bool {
        self.condition_on(feature).is_some()
    }

    #[must_use]
    pub fn label(&self) -> &Value {
        &self.label
    }

    #[must_use]
    pub fn is_default(&self) -> bool {
        self.conditions.is_empty()
    }

    #[must_use]
    pub fn reported(&self) -> ReportedCounts {
        self.reported
    }

    #[must_use]
    pub fn stats(&self) -> &RuleStats {
        &self.stats
    }

    #[must_use]
    pub fn support(&self) -> f64 {
        self.stats.support
    }

    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.stats.confidence
    }

    /// Whether every condition holds for the given cells.
    #[inline]
    pub(crate) fn matches<'a>(&self, cell: impl Fn(usize) -> Option<&'a Value>) -> bool {
        self.conditions.iter().all(|c| c.meets(cell(c.feature)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CompareOp;

    #[test]
    fn strength_ratio() {
        assert!((ReportedCounts::new(80, 20).strength() - 0.8).abs() < 1e-12);
        assert_eq!(ReportedCounts::new(0, 5).strength(), 0.0);
    }

    #[test]
    fn strength_zero_denominator() {
        assert_eq!(ReportedCounts::new(0, 0).strength(), 0.0);
    }

    #[test]
    fn default_rule_has_no_conditions() {
        let rule = Rule::new(vec![], Value::from("no"), ReportedCounts::default());
        assert!(rule.is_default());
        assert!(rule.matches(|_| None));
    }

    #[test]
    fn condition_lookup() {
        let rule = Rule::new(
            vec![
                Condition::new(2, CompareOp::Eq, Value::from("red")),
                Condition::new(0, CompareOp::Gt, Value::Number(3.0)),
            ],
            Value::from("yes"),
            ReportedCounts::default(),
        );
        assert!(rule.references(0));
        assert!(!rule.references(1));
        assert_eq!(rule.condition_on(2).unwrap().op(), CompareOp::Eq);
    }

    #[test]
    fn matches_requires_all_conditions() {
        let rule = Rule::new(
            vec![
                Condition::new(0, CompareOp::Gte, Value::Number(30.0)),
                Condition::new(1, CompareOp::Eq, Value::from("red")),
            ],
            Value::from("yes"),
            ReportedCounts::default(),
        );
        let age = Value::Number(40.0);
        let red = Value::from("red");
        let blue = Value::from("blue");
        assert!(rule.matches(|i| if i == 0 { Some(&age) } else { Some(&red) }));
        assert!(!rule.matches(|i| if i == 0 { Some(&age) } else { Some(&blue) }));
        assert!(!rule.matches(|i| if i == 0 { None } else { Some(&red) }));
    }
}
