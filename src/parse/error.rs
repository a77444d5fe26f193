use std::fmt;

use thiserror::Error;

/// What went wrong on a rejected line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarErrorKind {
    #[error("rule must start with 'if' or 'else'")]
    BadPrefix,

    #[error("missing 'then' between conditions and label")]
    MissingThen,

    #[error("missing '(<tp>/<fp>)' counts")]
    MissingCounts,

    #[error("invalid counts '{0}'")]
    BadCounts(String),

    #[error("no comparison operator in condition '{0}'")]
    NoOperator(String),

    #[error("condition '{0}' is missing its feature or value")]
    IncompleteCondition(String),

    #[error("empty label")]
    EmptyLabel,

    #[error("'{value}' cannot be compared with '{op}' on feature '{feature}'")]
    IncomparableValue {
        feature: String,
        op: String,
        value: String,
    },

    #[error("feature '{0}' appears more than once in one rule")]
    DuplicateFeature(String),

    #[error("rule list has no default ('else') rule")]
    MissingDefault,

    #[error("default rule must be the last rule")]
    DefaultNotLast,

    #[error("rule list is empty")]
    EmptyList,

    #[error("unterminated quoted field")]
    UnterminatedQuote,

    #[error("row has {found} cells, header has {expected}")]
    RaggedRow { expected: usize, found: usize },
}

/// A rejected line of rule or dataset text. Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarError {
    line: usize,
    kind: GrammarErrorKind,
}

impl GrammarError {
    pub(crate) fn new(line: usize, kind: GrammarErrorKind) -> Self {
        Self { line, kind }
    }

    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    #[must_use]
    pub fn kind(&self) -> &GrammarErrorKind {
        &self.kind
    }
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "grammar error at line {}: {}", self.line, self.kind)
    }
}

impl std::error::Error for GrammarError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = GrammarError::new(4, GrammarErrorKind::MissingThen);
        assert_eq!(
            err.to_string(),
            "grammar error at line 4: missing 'then' between conditions and label"
        );
    }

    #[test]
    fn incomparable_display() {
        let err = GrammarError::new(
            1,
            GrammarErrorKind::IncomparableValue {
                feature: "color".into(),
                op: ">".into(),
                value: "red".into(),
            },
        );
        assert_eq!(
            err.to_string(),
            "grammar error at line 1: 'red' cannot be compared with '>' on feature 'color'"
        );
    }
}
