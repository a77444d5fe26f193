use std::collections::HashSet;
use std::fmt;

use super::condition::{CompareOp, Condition};
use super::dataset::Dataset;
use super::error::SchemaError;
use super::feature::FeatureCatalog;
use super::rule::{ReportedCounts, Rule};
use super::stats::AggregateStats;
use super::value::Value;
use crate::parse::{GrammarError, GrammarErrorKind};
use crate::RulescopeError;

/// An ordered list of rules evaluated by first match and terminated by
/// exactly one default rule.
///
/// Built by [`parse_rules`](crate::parse::parse_rules) or
/// [`DecisionListBuilder`]; both validate every rule against the
/// [`FeatureCatalog`] of the dataset it belongs to.
#[derive(Debug, Clone)]
pub struct DecisionList {
    pub(crate) rules: Vec<Rule>,
    pub(crate) aggregate: AggregateStats,
}

impl DecisionList {
    /// Start building a list programmatically against a catalog.
    #[must_use]
    pub fn builder(catalog: &FeatureCatalog) -> DecisionListBuilder<'_> {
        DecisionListBuilder {
            catalog,
            rules: Vec::new(),
        }
    }

    /// Check list-level structure. `lines[i]` is the source line of `rules[i]`.
    pub(crate) fn from_rules(rules: Vec<Rule>, lines: &[usize]) -> Result<Self, GrammarError> {
        let Some(last) = rules.last() else {
            return Err(GrammarError::new(1, GrammarErrorKind::EmptyList));
        };
        let line_of = |i: usize| lines.get(i).copied().unwrap_or(i + 1);
        if let Some(pos) = rules[..rules.len() - 1].iter().position(Rule::is_default) {
            return Err(GrammarError::new(
                line_of(pos),
                GrammarErrorKind::DefaultNotLast,
            ));
        }
        if !last.is_default() {
            return Err(GrammarError::new(
                line_of(rules.len() - 1),
                GrammarErrorKind::MissingDefault,
            ));
        }
        Ok(Self {
            rules,
            aggregate: AggregateStats::default(),
        })
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn rule(&self, index: usize) -> &Rule {
        &self.rules[index]
    }

    /// The terminating unconditional rule.
    #[must_use]
    pub fn default_rule(&self) -> &Rule {
        // from_rules guarantees a non-empty list ending in a default rule
        &self.rules[self.rules.len() - 1]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Always false for a validated list; provided for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Accuracy, macro precision/recall and F1 from the latest evaluation.
    #[must_use]
    pub fn aggregate(&self) -> &AggregateStats {
        &self.aggregate
    }

    /// Run one first-match pass over the snapshot `rows` of `dataset`,
    /// replacing all rule statistics and the aggregate.
    ///
    /// Returns the claiming rule index of each snapshot row.
    pub fn evaluate(&mut self, dataset: &Dataset, rows: &[usize]) -> Vec<usize> {
        crate::evaluate::evaluate(self, dataset, rows)
    }

    /// Index of the first rule whose conditions all hold for the given cells.
    ///
    /// Always `Some` for a validated list, since the default rule matches
    /// everything.
    #[must_use]
    pub fn first_match<'a>(&self, cell: impl Fn(usize) -> Option<&'a Value>) -> Option<usize> {
        self.rules.iter().position(|rule| rule.matches(&cell))
    }
}

impl fmt::Display for DecisionList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DecisionList({} rules, default '{}')",
            self.rules.len(),
            self.default_rule().label()
        )
    }
}

/// A condition whose feature is still a name.
#[derive(Debug, Clone)]
pub(crate) struct RawCondition {
    pub(crate) feature: String,
    pub(crate) op: CompareOp,
    pub(crate) value: Value,
}

/// Resolve names against the catalog and validate one rule.
pub(crate) fn resolve_rule(
    catalog: &FeatureCatalog,
    line: usize,
    conditions: Vec<RawCondition>,
    label: Value,
    reported: ReportedCounts,
) -> Result<Rule, RulescopeError> {
    if !catalog.label().contains(&label) {
        return Err(SchemaError::LabelNotInDomain {
            line,
            label: label.to_string(),
        }
        .into());
    }

    let mut seen = HashSet::with_capacity(conditions.len());
    let mut resolved = Vec::with_capacity(conditions.len());
    for raw in conditions {
        let feature = catalog
            .get(&raw.feature)
            .ok_or_else(|| SchemaError::UnknownRuleFeature {
                line,
                feature: raw.feature.clone(),
            })?;
        if feature == catalog.label_index() {
            return Err(SchemaError::ConditionOnLabel {
                line,
                feature: raw.feature,
            }
            .into());
        }
        if !seen.insert(feature) {
            return Err(
                GrammarError::new(line, GrammarErrorKind::DuplicateFeature(raw.feature)).into(),
            );
        }
        if raw.op.is_ordering() && !(catalog.feature(feature).is_numeric() && raw.value.is_number())
        {
            return Err(GrammarError::new(
                line,
                GrammarErrorKind::IncomparableValue {
                    feature: raw.feature,
                    op: raw.op.symbol().to_owned(),
                    value: raw.value.to_string(),
                },
            )
            .into());
        }
        resolved.push(Condition::new(feature, raw.op, raw.value));
    }

    Ok(Rule::new(resolved, label, reported))
}

/// Builder for constructing a [`DecisionList`] without rule text.
///
/// # Example
///
/// ```
/// use rulescope::{CompareOp, DecisionList, parse::parse_dataset};
///
/// let dataset = parse_dataset("age,label\n35,approve\n20,reject\n", ',', "label").unwrap();
/// let list = DecisionList::builder(dataset.catalog())
///     .rule(|r| r.when("age", CompareOp::Gte, 30).then("approve").reported(80, 20))
///     .default_rule("reject")
///     .build()
///     .unwrap();
/// assert_eq!(list.len(), 2);
/// ```
#[derive(Debug)]
pub struct DecisionListBuilder<'a> {
    catalog: &'a FeatureCatalog,
    rules: Vec<RuleBuilder>,
}

/// Intermediate builder passed to the rule definition closure.
#[derive(Debug, Default)]
pub struct RuleBuilder {
    conditions: Vec<RawCondition>,
    label: Option<Value>,
    reported: ReportedCounts,
}

impl RuleBuilder {
    /// Add a `<feature> <op> <value>` condition.
    #[must_use]
    pub fn when(mut self, feature: &str, op: CompareOp, value: impl Into<Value>) -> Self {
        self.conditions.push(RawCondition {
            feature: feature.to_owned(),
            op,
            value: value.into(),
        });
        self
    }

    /// Set the predicted label.
    #[must_use]
    pub fn then(mut self, label: impl Into<Value>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the learner-reported `(tp/fp)` counts.
    #[must_use]
    pub fn reported(mut self, true_count: u64, false_count: u64) -> Self {
        self.reported = ReportedCounts::new(true_count, false_count);
        self
    }
}

impl DecisionListBuilder<'_> {
    /// Define a rule. The closure must call `.then(label)`; a rule without
    /// any `.when(..)` is a default rule.
    #[must_use]
    pub fn rule(mut self, f: impl FnOnce(RuleBuilder) -> RuleBuilder) -> Self {
        self.rules.push(f(RuleBuilder::default()));
        self
    }

    /// Append the unconditional default rule.
    #[must_use]
    pub fn default_rule(self, label: impl Into<Value>) -> Self {
        let label = label.into();
        self.rule(|r| r.then(label))
    }

    /// Validate every rule and the list structure.
    ///
    /// Rule positions (1-based) stand in for line numbers in errors.
    ///
    /// # Errors
    ///
    /// Returns [`RulescopeError`] for the first invalid rule, or if the list
    /// does not end in exactly one default rule.
    pub fn build(self) -> Result<DecisionList, RulescopeError> {
        let mut rules = Vec::with_capacity(self.rules.len());
        for (idx, builder) in self.rules.into_iter().enumerate() {
            let line = idx + 1;
            let label = builder
                .label
                .ok_or_else(|| GrammarError::new(line, GrammarErrorKind::EmptyLabel))?;
            rules.push(resolve_rule(
                self.catalog,
                line,
                builder.conditions,
                label,
                builder.reported,
            )?);
        }
        let lines: Vec<usize> = (1..=rules.len()).collect();
        Ok(DecisionList::from_rules(rules, &lines)?)
    }
}
