//! Cell formatting and typed input parsing.
//!
//! `parse_input` coerces raw user text into a [`CellValue`] against the
//! field's declared type; `format_cell` produces display text plus an
//! alignment hint. Both are pure and shared by the edit session and the
//! add-row form.

use crate::error::{Result, TableViewError};
use crate::types::{CellValue, Field, FieldType};

/// Horizontal alignment hint for a formatted cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
    Center,
}

/// Display text plus alignment for one cell.
#[derive(Debug, Clone)]
pub struct FormattedCell {
    pub text: String,
    pub align: Align,
}

/// Format a cell value for display under the given field.
pub fn format_cell(value: &CellValue, field: &Field) -> FormattedCell {
    let align = match field.field_type {
        FieldType::Number => Align::Right,
        FieldType::Bool => Align::Center,
        FieldType::Text | FieldType::Date => Align::Left,
    };
    FormattedCell {
        text: value.display(),
        align,
    }
}

/// Parse raw user input against the field's type.
///
/// - Empty/whitespace input → `CellValue::Empty` (clears the cell)
/// - `Number`: must parse as a finite f64
/// - `Date`: must be ISO `YYYY-MM-DD`, stored as text
/// - `Bool`: "true"/"false" (case-insensitive), also "1"/"0"
/// - `Text`: taken verbatim (trimmed)
pub fn parse_input(raw: &str, field: &Field) -> Result<CellValue> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(CellValue::Empty);
    }

    match field.field_type {
        FieldType::Text => Ok(CellValue::Text(trimmed.to_string())),
        FieldType::Number => match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(CellValue::Number(n)),
            _ => Err(TableViewError::InvalidValue {
                field: field.key.clone(),
                reason: format!("'{trimmed}' is not a number"),
            }),
        },
        FieldType::Bool => {
            if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
                Ok(CellValue::Bool(true))
            } else if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
                Ok(CellValue::Bool(false))
            } else {
                Err(TableViewError::InvalidValue {
                    field: field.key.clone(),
                    reason: format!("'{trimmed}' is not a boolean"),
                })
            }
        }
        FieldType::Date => {
            if is_iso_date(trimmed) {
                Ok(CellValue::Text(trimmed.to_string()))
            } else {
                Err(TableViewError::InvalidValue {
                    field: field.key.clone(),
                    reason: format!("'{trimmed}' is not an ISO date (YYYY-MM-DD)"),
                })
            }
        }
    }
}

/// Shape-and-range check for `YYYY-MM-DD`.
///
/// Month 1-12, day 1-31; no per-month day validation (matches the lenient
/// date handling of the surrounding host).
fn is_iso_date(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 10 || bytes.get(4) != Some(&b'-') || bytes.get(7) != Some(&b'-') {
        return false;
    }
    let Some((year, rest)) = s.split_once('-') else {
        return false;
    };
    let Some((month, day)) = rest.split_once('-') else {
        return false;
    };
    if year.len() != 4 || month.len() != 2 || day.len() != 2 {
        return false;
    }
    let (Ok(_), Ok(m), Ok(d)) = (
        year.parse::<u32>(),
        month.parse::<u32>(),
        day.parse::<u32>(),
    ) else {
        return false;
    };
    (1..=12).contains(&m) && (1..=31).contains(&d)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn number_field() -> Field {
        Field::text("amount", "Amount").with_type(FieldType::Number)
    }

    fn date_field() -> Field {
        Field::text("due", "Due").with_type(FieldType::Date)
    }

    #[test_case("42", CellValue::Number(42.0); "integer")]
    #[test_case("3.5", CellValue::Number(3.5); "decimal")]
    #[test_case("-1e3", CellValue::Number(-1000.0); "scientific")]
    #[test_case("  7 ", CellValue::Number(7.0); "whitespace trimmed")]
    fn parses_numbers(raw: &str, expected: CellValue) {
        assert_eq!(parse_input(raw, &number_field()).unwrap(), expected);
    }

    #[test_case("abc"; "letters")]
    #[test_case("1,5"; "comma decimal")]
    #[test_case("NaN"; "nan rejected")]
    fn rejects_non_numbers(raw: &str) {
        assert!(parse_input(raw, &number_field()).is_err());
    }

    #[test_case("2026-01-31", true; "valid date")]
    #[test_case("2026-13-01", false; "bad month")]
    #[test_case("2026-1-1", false; "unpadded")]
    #[test_case("31.01.2026", false; "wrong shape")]
    fn validates_dates(raw: &str, ok: bool) {
        assert_eq!(parse_input(raw, &date_field()).is_ok(), ok);
    }

    #[test]
    fn empty_input_clears_cell() {
        assert_eq!(
            parse_input("   ", &number_field()).unwrap(),
            CellValue::Empty
        );
    }

    #[test]
    fn bool_accepts_common_spellings() {
        let field = Field::text("done", "Done").with_type(FieldType::Bool);
        assert_eq!(parse_input("TRUE", &field).unwrap(), CellValue::Bool(true));
        assert_eq!(parse_input("0", &field).unwrap(), CellValue::Bool(false));
        assert!(parse_input("yes", &field).is_err());
    }

    #[test]
    fn number_cells_align_right() {
        let formatted = format_cell(&CellValue::Number(12.0), &number_field());
        assert_eq!(formatted.text, "12");
        assert_eq!(formatted.align, Align::Right);
    }
}
