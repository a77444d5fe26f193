use winnow::combinator::{cut_err, opt};
use winnow::error::ModalResult;
use winnow::prelude::*;
use winnow::token::{any, take_till};

use super::error::{GrammarError, GrammarErrorKind};

/// A delimited record and the 1-based line it starts on.
pub(crate) type Record = (usize, Vec<String>);

fn quoted_field(input: &mut &str, delimiter: char) -> ModalResult<String> {
    '"'.parse_next(input)?;
    let mut field = String::new();
    loop {
        match cut_err(any).parse_next(input)? {
            '"' => {
                if opt('"').parse_next(input)?.is_some() {
                    field.push('"');
                } else {
                    break;
                }
            }
            ch => field.push(ch),
        }
    }
    // Text between the closing quote and the delimiter is kept verbatim.
    let trailing = take_till(0.., |c: char| c == delimiter || c == '\n').parse_next(input)?;
    field.push_str(trailing.trim_end_matches('\r'));
    Ok(field)
}

fn field(input: &mut &str, delimiter: char) -> ModalResult<String> {
    if input.starts_with('"') {
        return quoted_field(input, delimiter);
    }
    let raw = take_till(0.., |c: char| c == delimiter || c == '\n').parse_next(input)?;
    Ok(raw.trim_end_matches('\r').to_owned())
}

fn record(input: &mut &str, delimiter: char) -> ModalResult<Vec<String>> {
    let mut fields = vec![field(input, delimiter)?];
    while opt(delimiter).parse_next(input)?.is_some() {
        fields.push(field(input, delimiter)?);
    }
    Ok(fields)
}

/// Split delimited text into records. Blank lines are skipped; quoted
/// fields may contain the delimiter, newlines and `""` escapes.
pub(crate) fn read_records(text: &str, delimiter: char) -> Result<Vec<Record>, GrammarError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut input = text;
    let mut records = Vec::new();
    let mut line = 1;

    while !input.is_empty() {
        let start = input;
        let fields = record(&mut input, delimiter)
            .map_err(|_| GrammarError::new(line, GrammarErrorKind::UnterminatedQuote))?;
        if let Some(rest) = input.strip_prefix('\n') {
            input = rest;
        }
        let consumed = &start[..start.len() - input.len()];
        if consumed.is_empty() {
            break;
        }
        let record_line = line;
        // quoted fields may span lines
        line += consumed.matches('\n').count();
        if fields.len() == 1 && fields[0].trim().is_empty() {
            continue;
        }
        records.push((record_line, fields));
    }
    Ok(records)
}
