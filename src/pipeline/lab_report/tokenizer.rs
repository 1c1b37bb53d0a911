use super::dates::{looks_like_date, parse_dmy};
use super::LabParseError;
use crate::models::{ResultFlag, TestResult};

/// A tokenized table row, plus the raw date token if it was not a real
/// calendar date (the row still carries a rolled-over best-effort date).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizedRow {
    pub result: TestResult,
    pub ambiguous_date: Option<String>,
}

/// Split one table line into the fields of a [`TestResult`].
///
/// Columns are recovered from token shape alone, in this order:
///
/// 1. test name: every token before the first purely numeric token (`^[0-9.]+$`)
/// 2. current result: that numeric token, as written
/// 3. flag: `H`/`HIGH`/`L`/`LOW` right after the result, any case
/// 4. previous result and date: the first `D/M/YYYY` token, and the token
///    immediately before it
/// 5. units: the next token; reference interval: everything after, space-joined
///
/// A line with no numeric token, or one that starts with it (no test name),
/// is a [`LabParseError::MalformedRow`].
pub fn tokenize_row(line: &str) -> Result<TokenizedRow, LabParseError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    let value_idx = tokens
        .iter()
        .position(|t| is_numeric_token(t))
        .ok_or_else(|| LabParseError::MalformedRow(line.trim().to_string()))?;
    if value_idx == 0 {
        return Err(LabParseError::MalformedRow(line.trim().to_string()));
    }

    let mut result = TestResult::new(tokens[..value_idx].join(" "), tokens[value_idx]);
    let mut cursor = value_idx + 1;

    if let Some(flag) = tokens.get(cursor).and_then(|t| ResultFlag::from_token(t)) {
        result.flag = Some(flag);
        cursor += 1;
    }

    let mut ambiguous_date = None;
    if let Some(offset) = tokens[cursor..].iter().position(|t| looks_like_date(t)) {
        let date_idx = cursor + offset;
        let date_token = tokens[date_idx];

        result.previous_result = Some(tokens[date_idx - 1].to_string());
        if let Some(parsed) = parse_dmy(date_token) {
            if !parsed.is_exact() {
                ambiguous_date = Some(date_token.to_string());
            }
            result.previous_date = Some(parsed.date());
        } else {
            ambiguous_date = Some(date_token.to_string());
        }
        cursor = date_idx + 1;
    }

    if let Some(units) = tokens.get(cursor) {
        result.units = Some(units.to_string());
        let rest = &tokens[cursor + 1..];
        if !rest.is_empty() {
            result.reference_interval = Some(rest.join(" "));
        }
    }

    Ok(TokenizedRow {
        result,
        ambiguous_date,
    })
}

/// `^[0-9.]+$`: integers and decimals as printed on the report.
fn is_numeric_token(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit() || b == b'.')
}
