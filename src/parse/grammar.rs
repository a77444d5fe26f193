use winnow::ascii::{dec_uint, space0, space1};
use winnow::combinator::{alt, delimited, separated_pair, terminated};
use winnow::error::ModalResult;
use winnow::prelude::*;

use crate::types::condition::OPERATOR_SPELLINGS;
use crate::types::{RawCondition, ReportedCounts, Value};

use super::error::{GrammarError, GrammarErrorKind};
use super::parser::ParsedRule;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    If,
    Else,
}

// -- Tokens -----------------------------------------------------------------

fn keyword(input: &mut &str) -> ModalResult<Keyword> {
    terminated(
        alt(("if".value(Keyword::If), "else".value(Keyword::Else))),
        space1,
    )
    .parse_next(input)
}

fn counts(input: &mut &str) -> ModalResult<(u64, u64)> {
    delimited(
        ('(', space0),
        separated_pair(
            dec_uint::<_, u64, _>,
            (space0, '/', space0),
            dec_uint::<_, u64, _>,
        ),
        (space0, ')'),
    )
    .parse_next(input)
}

// -- Line structure -----------------------------------------------------------

/// Strip CSV quoting from a rule line written as a single quoted cell.
pub(crate) fn unquote(line: &str) -> std::borrow::Cow<'_, str> {
    match line
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        Some(inner) => std::borrow::Cow::Owned(inner.replace("\"\"", "\"")),
        None => std::borrow::Cow::Borrowed(line),
    }
}

/// Parse one non-blank rule line.
///
/// `merge_and` enables re-merging of condition fragments that were split
/// inside a feature name containing ` and `.
pub(crate) fn parse_rule_line(
    text: &str,
    line: usize,
    merge_and: bool,
) -> Result<ParsedRule, GrammarError> {
    let err = |kind| GrammarError::new(line, kind);

    let (head, tail) = text
        .rsplit_once('(')
        .ok_or_else(|| err(GrammarErrorKind::MissingCounts))?;
    let tail = format!("({tail}");
    let (true_count, false_count) = counts
        .parse(tail.trim())
        .map_err(|_| err(GrammarErrorKind::BadCounts(tail.trim().to_owned())))?;
    let reported = ReportedCounts::new(true_count, false_count);

    let mut rest = head.trim();
    if rest == "else" || rest.ends_with(" then") {
        return Err(err(GrammarErrorKind::EmptyLabel));
    }
    let kw = keyword
        .parse_next(&mut rest)
        .map_err(|_| err(GrammarErrorKind::BadPrefix))?;

    match kw {
        Keyword::Else => Ok(ParsedRule {
            conditions: Vec::new(),
            label: parse_label(rest, line)?,
            reported,
        }),
        Keyword::If => {
            let (body, label) = rest
                .rsplit_once(" then ")
                .ok_or_else(|| err(GrammarErrorKind::MissingThen))?;
            let conditions = split_conditions(body, merge_and)
                .into_iter()
                .map(|fragment| parse_condition(&fragment, line))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ParsedRule {
                conditions,
                label: parse_label(label, line)?,
                reported,
            })
        }
    }
}

fn parse_label(text: &str, line: usize) -> Result<Value, GrammarError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(GrammarError::new(line, GrammarErrorKind::EmptyLabel));
    }
    Ok(Value::coerce(text))
}

/// Split a condition body on ` and `. When `merge_and` is set, a fragment
/// holding no operator belongs to a feature name and is glued to the next one.
fn split_conditions(body: &str, merge_and: bool) -> Vec<String> {
    let mut out = Vec::new();
    let mut pending: Option<String> = None;
    for fragment in body.split(" and ") {
        let fragment = match pending.take() {
            Some(prefix) => format!("{prefix} and {fragment}"),
            None => fragment.to_owned(),
        };
        if merge_and && find_operator(&fragment).is_none() {
            pending = Some(fragment);
        } else {
            out.push(fragment);
        }
    }
    // A dangling fragment is reported by parse_condition.
    out.extend(pending);
    out
}

/// The operator of a condition: the first spelling in precedence order that
/// occurs in the text, at its first occurrence.
fn find_operator(condition: &str) -> Option<(usize, &'static str, crate::CompareOp)> {
    OPERATOR_SPELLINGS.iter().find_map(|(spelling, op)| {
        condition
            .find(spelling)
            .map(|pos| (pos, *spelling, *op))
    })
}

fn parse_condition(text: &str, line: usize) -> Result<RawCondition, GrammarError> {
    let (pos, spelling, op) = find_operator(text).ok_or_else(|| {
        GrammarError::new(line, GrammarErrorKind::NoOperator(text.trim().to_owned()))
    })?;
    let feature = text[..pos].trim();
    let value = text[pos + spelling.len()..].trim();
    if feature.is_empty() || value.is_empty() {
        return Err(GrammarError::new(
            line,
            GrammarErrorKind::IncompleteCondition(text.trim().to_owned()),
        ));
    }
    Ok(RawCondition {
        feature: feature.to_owned(),
        op,
        value: Value::coerce(value),
    })
}
