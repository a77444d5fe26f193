use crate::types::{RawCondition, ReportedCounts, Value};

/// One rule line after grammar parsing, before names are resolved against
/// the feature catalog.
#[derive(Debug)]
pub(crate) struct ParsedRule {
    pub(crate) conditions: Vec<RawCondition>,
    pub(crate) label: Value,
    pub(crate) reported: ReportedCounts,
}

impl ParsedRule {
    pub(crate) fn is_default(&self) -> bool {
        self.conditions.is_empty()
    }
}
