use std::collections::{BTreeMap, HashSet};

use regex::Regex;

use crate::{
    CompareOp, Condition, Dataset, DecisionList, FeatureCatalog, RulescopeError, SchemaError, Value,
};

/// One accepted-value constraint on a feature.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Predicate {
    /// Numeric cell `>= bound`.
    AtLeast(f64),
    /// Numeric cell `<= bound`.
    AtMost(f64),
    /// Cell equal to one of the listed values.
    OneOf(Vec<Value>),
}

impl Predicate {
    /// Whether a cell passes. Missing cells never do.
    #[must_use]
    pub fn admits(&self, cell: Option<&Value>) -> bool {
        let Some(cell) = cell else {
            return false;
        };
        match self {
            Predicate::AtLeast(lo) => cell.as_number().is_some_and(|n| n >= *lo),
            Predicate::AtMost(hi) => cell.as_number().is_some_and(|n| n <= *hi),
            Predicate::OneOf(set) => set.contains(cell),
        }
    }

    /// Whether some value this predicate admits could still meet `condition`.
    #[must_use]
    pub fn compatible(&self, condition: &Condition) -> bool {
        let (op, value) = (condition.op(), condition.value());
        match self {
            Predicate::OneOf(set) => set
                .iter()
                .any(|accepted| accepted.compare(op, value).unwrap_or(false)),
            Predicate::AtLeast(lo) => match (op, value.as_number()) {
                (CompareOp::Neq | CompareOp::Gt | CompareOp::Gte, _) => true,
                (_, None) => false,
                (CompareOp::Eq | CompareOp::Lte, Some(v)) => v >= *lo,
                (CompareOp::Lt, Some(v)) => v > *lo,
            },
            Predicate::AtMost(hi) => match (op, value.as_number()) {
                (CompareOp::Neq | CompareOp::Lt | CompareOp::Lte, _) => true,
                (_, None) => false,
                (CompareOp::Eq | CompareOp::Gte, Some(v)) => v <= *hi,
                (CompareOp::Gt, Some(v)) => v < *hi,
            },
        }
    }

    fn is_range(&self) -> bool {
        !matches!(self, Predicate::OneOf(_))
    }
}

/// Dataset filter criteria: feature name to the predicates its cells must
/// all pass. Features without an entry impose no constraint.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterCriteria {
    entries: BTreeMap<String, Vec<Predicate>>,
}

impl FilterCriteria {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predicate on `feature`. Text in a `OneOf` set is coerced the
    /// way dataset cells are, so `"5"` matches a numeric cell.
    #[must_use]
    pub fn with(mut self, feature: &str, predicate: Predicate) -> Self {
        let predicate = match predicate {
            Predicate::OneOf(values) => Predicate::OneOf(values.into_iter().map(recoerce).collect()),
            other => other,
        };
        self.entries
            .entry(feature.to_owned())
            .or_default()
            .push(predicate);
        self
    }

    #[must_use]
    pub fn at_least(self, feature: &str, bound: f64) -> Self {
        self.with(feature, Predicate::AtLeast(bound))
    }

    #[must_use]
    pub fn at_most(self, feature: &str, bound: f64) -> Self {
        self.with(feature, Predicate::AtMost(bound))
    }

    #[must_use]
    pub fn one_of<V: Into<Value>>(self, feature: &str, values: impl IntoIterator<Item = V>) -> Self {
        self.with(
            feature,
            Predicate::OneOf(values.into_iter().map(Into::into).collect()),
        )
    }

    /// The conjunction of both criteria.
    #[must_use]
    pub fn and(mut self, other: FilterCriteria) -> Self {
        for (feature, predicates) in other.entries {
            self.entries.entry(feature).or_default().extend(predicates);
        }
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Predicate])> {
        self.entries
            .iter()
            .map(|(name, preds)| (name.as_str(), preds.as_slice()))
    }

    /// Resolve feature names and check range predicates sit on numeric
    /// features.
    pub(crate) fn resolve<'a>(
        &'a self,
        catalog: &FeatureCatalog,
    ) -> Result<Vec<(usize, &'a [Predicate])>, SchemaError> {
        self.entries
            .iter()
            .map(|(name, preds)| {
                let feature = catalog.resolve(name)?;
                if preds.iter().any(Predicate::is_range) && !catalog.feature(feature).is_numeric() {
                    return Err(SchemaError::NonNumericRange {
                        feature: name.clone(),
                    });
                }
                Ok((feature, preds.as_slice()))
            })
            .collect()
    }

    /// Keep the `rows` (indices into `dataset`) that pass every predicate,
    /// preserving their order. The dataset is never modified.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] for an unknown feature or a range predicate on
    /// a non-numeric feature.
    pub fn apply(&self, dataset: &Dataset, rows: &[usize]) -> Result<Vec<usize>, SchemaError> {
        let resolved = self.resolve(dataset.catalog())?;
        Ok(rows
            .iter()
            .copied()
            .filter(|&i| {
                dataset.rows().get(i).is_some_and(|row| {
                    resolved
                        .iter()
                        .all(|(f, preds)| preds.iter().all(|p| p.admits(row.get(*f))))
                })
            })
            .collect())
    }
}

fn recoerce(value: Value) -> Value {
    match value {
        Value::Text(token) => Value::coerce(&token),
        number => number,
    }
}

/// Regular-expression dataset filter. A row passes when each pattern
/// matches its feature's cell rendered as text.
#[derive(Debug, Clone, Default)]
pub struct RegexCriteria {
    patterns: Vec<(String, Regex)>,
}

impl RegexCriteria {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pattern for `feature`.
    ///
    /// # Errors
    ///
    /// Returns [`RulescopeError::Regex`] if the pattern does not compile.
    pub fn pattern(mut self, feature: &str, pattern: &str) -> Result<Self, RulescopeError> {
        let regex = Regex::new(pattern).map_err(|source| RulescopeError::Regex {
            feature: feature.to_owned(),
            source,
        })?;
        self.patterns.push((feature.to_owned(), regex));
        Ok(self)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Keep the matching `rows`, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownFeature`] for a pattern on an unknown
    /// feature.
    pub fn apply(&self, dataset: &Dataset, rows: &[usize]) -> Result<Vec<usize>, SchemaError> {
        let resolved = self
            .patterns
            .iter()
            .map(|(name, regex)| Ok((dataset.catalog().resolve(name)?, regex)))
            .collect::<Result<Vec<_>, SchemaError>>()?;
        Ok(rows
            .iter()
            .copied()
            .filter(|&i| {
                dataset.rows().get(i).is_some_and(|row| {
                    resolved.iter().all(|(f, regex)| {
                        row.get(*f)
                            .is_some_and(|cell| regex.is_match(&cell.to_string()))
                    })
                })
            })
            .collect())
    }
}

/// Which rules are visible: support and confidence thresholds (percent)
/// plus an optional feature-interest selection.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleFilter {
    pub min_support: f64,
    pub min_confidence: f64,
    /// When non-empty, only rules conditioning on every listed feature show.
    pub interest: Vec<String>,
}

impl RuleFilter {
    #[must_use]
    pub fn new(min_support: f64, min_confidence: f64) -> Self {
        Self {
            min_support,
            min_confidence,
            interest: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_interest<S: Into<String>>(mut self, features: impl IntoIterator<Item = S>) -> Self {
        self.interest = features.into_iter().map(Into::into).collect();
        self
    }

    /// Indices of the visible rules, in list order.
    ///
    /// A rule is visible when it clears both thresholds, every condition is
    /// compatible with `criteria`, and it matches the interest selection.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when `criteria` or the interest selection
    /// names an unknown feature.
    pub fn apply(
        &self,
        list: &DecisionList,
        catalog: &FeatureCatalog,
        criteria: &FilterCriteria,
    ) -> Result<Vec<usize>, SchemaError> {
        let resolved = criteria.resolve(catalog)?;
        let interest = self
            .interest
            .iter()
            .map(|name| catalog.resolve(name))
            .collect::<Result<HashSet<_>, _>>()?;

        let visible = list
            .rules()
            .iter()
            .enumerate()
            .filter(|(_, rule)| {
                rule.support() >= self.min_support && rule.confidence() >= self.min_confidence
            })
            .filter(|(_, rule)| {
                resolved.iter().all(|(feature, preds)| {
                    rule.condition_on(*feature)
                        .map_or(true, |cond| preds.iter().all(|p| p.compatible(cond)))
                })
            })
            .filter(|(_, rule)| interest.iter().all(|f| rule.references(*f)))
            .map(|(idx, _)| idx)
            .collect();
        Ok(visible)
    }
}
