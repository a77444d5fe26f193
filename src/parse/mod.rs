mod error;
mod grammar;
mod parser;
mod table;

use tracing::debug;

pub use error::{GrammarError, GrammarErrorKind};

use crate::types::{resolve_rule, Dataset, DecisionList, FeatureCatalog, Row, Value};
use crate::RulescopeError;

/// Parse rule-list text against a dataset's feature catalog.
///
/// Each non-blank line is `if <cond> and ... then <label> (<tp>/<fp>)` or
/// `else <label> (<tp>/<fp>)`; the `else` rule must come last.
///
/// # Errors
///
/// Returns [`RulescopeError::Grammar`] for malformed lines and
/// [`RulescopeError::Schema`] for names or labels the catalog does not know.
pub fn parse_rules(text: &str, catalog: &FeatureCatalog) -> Result<DecisionList, RulescopeError> {
    let mut rules = Vec::new();
    let mut lines = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let content = grammar::unquote(raw.trim());
        let content = content.trim();
        if content.is_empty() {
            continue;
        }
        let parsed = grammar::parse_rule_line(content, line, catalog.contains_and())?;
        debug!(line, default = parsed.is_default(), "parsed rule line");
        rules.push(resolve_rule(
            catalog,
            line,
            parsed.conditions,
            parsed.label,
            parsed.reported,
        )?);
        lines.push(line);
    }
    Ok(DecisionList::from_rules(rules, &lines)?)
}

/// Parse delimited dataset text. The first record is the header; empty
/// cells become missing values.
///
/// # Errors
///
/// Returns [`RulescopeError::Grammar`] for unterminated quotes or rows whose
/// width differs from the header, and [`RulescopeError::Schema`] when the
/// header is empty, repeats a name, or lacks `label_column`.
pub fn parse_dataset(
    text: &str,
    delimiter: char,
    label_column: &str,
) -> Result<Dataset, RulescopeError> {
    let mut records = table::read_records(text, delimiter)?.into_iter();
    let header: Vec<String> = match records.next() {
        Some((_, names)) => names.iter().map(|n| n.trim().to_owned()).collect(),
        None => Vec::new(),
    };

    let mut rows = Vec::new();
    for (line, fields) in records {
        if fields.len() != header.len() {
            return Err(GrammarError::new(
                line,
                GrammarErrorKind::RaggedRow {
                    expected: header.len(),
                    found: fields.len(),
                },
            )
            .into());
        }
        let cells = fields
            .iter()
            .map(|cell| {
                let cell = cell.trim();
                (!cell.is_empty()).then(|| Value::coerce(cell))
            })
            .collect();
        rows.push(Row::new(cells));
    }

    debug!(columns = header.len(), rows = rows.len(), "parsed dataset");
    Ok(Dataset::new(&header, rows, label_column)?)
}
