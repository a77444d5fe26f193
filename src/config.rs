use crate::RuleFilter;

/// Settings for a [`Session`](crate::Session).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SessionConfig {
    /// Column delimiter of dataset text.
    pub delimiter: char,
    /// Name of the ground-truth column.
    pub label_column: String,
    /// Rule filter applied after every dataset import.
    pub rule_filter: RuleFilter,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            label_column: "label".to_owned(),
            rule_filter: RuleFilter::default(),
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn with_label_column(mut self, column: impl Into<String>) -> Self {
        self.label_column = column.into();
        self
    }

    #[must_use]
    pub fn with_rule_filter(mut self, filter: RuleFilter) -> Self {
        self.rule_filter = filter;
        self
    }
}
