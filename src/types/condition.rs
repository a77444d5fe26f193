use std::fmt;

use super::Value;

/// Comparison operators accepted in rule conditions.
///
/// Resolved once while parsing; evaluation dispatches on the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CompareOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// Every textual spelling of an operator, longest ASCII forms first so that
/// `>=` is never read as `>` followed by a stray `=`.
pub(crate) const OPERATOR_SPELLINGS: &[(&str, CompareOp)] = &[
    ("!=", CompareOp::Neq),
    ("\u{2260}", CompareOp::Neq),
    (">=", CompareOp::Gte),
    ("\u{2265}", CompareOp::Gte),
    ("<=", CompareOp::Lte),
    ("\u{2264}", CompareOp::Lte),
    (">", CompareOp::Gt),
    ("<", CompareOp::Lt),
    ("=", CompareOp::Eq),
];

impl CompareOp {
    /// Look up an operator by its ASCII or Unicode spelling.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<CompareOp> {
        OPERATOR_SPELLINGS
            .iter()
            .find(|(s, _)| *s == symbol)
            .map(|(_, op)| *op)
    }

    /// The ASCII spelling.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Neq => "!=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
        }
    }

    /// The single-glyph spelling used for display.
    #[must_use]
    pub fn glyph(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Neq => "\u{2260}",
            CompareOp::Gt => ">",
            CompareOp::Gte => "\u{2265}",
            CompareOp::Lt => "<",
            CompareOp::Lte => "\u{2264}",
        }
    }

    /// Whether the operator needs ordered (numeric) operands.
    #[must_use]
    pub fn is_ordering(self) -> bool {
        !matches!(self, CompareOp::Eq | CompareOp::Neq)
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One `<feature> <op> <value>` test inside a rule.
///
/// The feature is stored as its column index in the
/// [`FeatureCatalog`](super::FeatureCatalog) the rule was parsed against.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub(crate) feature: usize,
    pub(crate) op: CompareOp,
    pub(crate) value: Value,
}

impl Condition {
    pub(crate) fn new(feature: usize, op: CompareOp, value: Value) -> Self {
        Self { feature, op, value }
    }

    /// Column index of the tested feature.
    #[must_use]
    pub fn feature(&self) -> usize {
        self.feature
    }

    #[must_use]
    pub fn op(&self) -> CompareOp {
        self.op
    }

    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Whether a cell satisfies this condition. Missing cells never do.
    ///
    /// Operand compatibility is checked when the condition is built, so an
    /// ordering operator only ever sees numeric literals here; a text cell
    /// in a numeric column simply fails the test.
    #[inline]
    #[must_use]
    pub fn meets(&self, cell: Option<&Value>) -> bool {
        cell.and_then(|v| v.compare(self.op, &self.value))
            .unwrap_or(false)
    }
}
