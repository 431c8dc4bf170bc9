//! Statement literals parsed into native operands.

use crate::catalog::{FieldDescriptor, FilterComparison, ValueKind};
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};

/// A parsed statement literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Text {
        exact: String,
        /// Lowercased copy for the case-insensitive operators.
        folded: String,
    },
    Enum(u8),
    Number(f64),
    Date(DateLiteral),
    /// A trailing window for `IsInLast` / `IsNotInLast`, anchored at the
    /// compile time `now`.
    Window {
        span: TimeDelta,
        now: DateTime<Utc>,
    },
    Duration(TimeDelta),
    Members(Vec<String>),
    /// `IsEmpty` takes no literal.
    Nothing,
}

/// Dates compare at the precision they were written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateLiteral {
    /// `YYYY-MM-DD`: compares against the calendar day (UTC).
    Day(NaiveDate),
    /// RFC 3339: compares against the exact instant.
    Instant(DateTime<Utc>),
}

pub(crate) fn parse_operand(
    spec: &FieldDescriptor,
    comparison: FilterComparison,
    value: &str,
    now: DateTime<Utc>,
) -> Result<Operand, String> {
    match spec.kind {
        ValueKind::Text => Ok(Operand::Text {
            exact: value.to_string(),
            folded: value.to_lowercase(),
        }),
        ValueKind::Enum => {
            let domain = spec
                .domain
                .ok_or_else(|| format!("{} has no value domain", spec.label))?;
            domain.parse(value).map(Operand::Enum).ok_or_else(|| {
                let names: Vec<&str> = domain.variants().iter().map(|(name, _)| *name).collect();
                format!("expected one of {}", names.join(", "))
            })
        }
        ValueKind::Number => parse_number(value).map(Operand::Number),
        ValueKind::Date => match comparison {
            FilterComparison::IsInLast | FilterComparison::IsNotInLast => {
                parse_window(value).map(|span| Operand::Window { span, now })
            }
            _ => parse_date(value).map(Operand::Date),
        },
        ValueKind::Duration => parse_duration(value).map(Operand::Duration),
        ValueKind::EntityCollection => {
            if comparison == FilterComparison::IsEmpty {
                return Ok(Operand::Nothing);
            }
            let tokens = split_tokens(value);
            if tokens.is_empty() {
                return Err("expected at least one value".to_string());
            }
            Ok(Operand::Members(tokens))
        }
    }
}

fn parse_number(value: &str) -> Result<f64, String> {
    match value.trim().parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(number),
        _ => Err("expected a number".to_string()),
    }
}

fn parse_date(value: &str) -> Result<DateLiteral, String> {
    let value = value.trim();
    if let Ok(day) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(DateLiteral::Day(day));
    }
    DateTime::parse_from_rfc3339(value)
        .map(|instant| DateLiteral::Instant(instant.with_timezone(&Utc)))
        .map_err(|_| "expected a date (YYYY-MM-DD or RFC 3339)".to_string())
}

fn parse_window(value: &str) -> Result<TimeDelta, String> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|seconds| *seconds >= 0)
        .and_then(TimeDelta::try_seconds)
        .ok_or_else(|| "expected a non-negative number of seconds".to_string())
}

/// Whole hours, or a count with an `s`, `m`, `h` or `d` suffix.
fn parse_duration(value: &str) -> Result<TimeDelta, String> {
    let value = value.trim();
    let (count, unit) = match value.char_indices().last() {
        Some((i, c)) if c.is_ascii_alphabetic() => (&value[..i], c.to_ascii_lowercase()),
        _ => (value, 'h'),
    };
    let count = count
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|count| *count >= 0)
        .ok_or_else(|| "expected a non-negative duration such as 5, 90m or 2h".to_string())?;
    let delta = match unit {
        's' => TimeDelta::try_seconds(count),
        'm' => TimeDelta::try_minutes(count),
        'h' => TimeDelta::try_hours(count),
        'd' => TimeDelta::try_days(count),
        other => return Err(format!("unknown duration unit '{}'", other)),
    };
    delta.ok_or_else(|| "duration is out of range".to_string())
}

pub(crate) fn split_tokens(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{describe_field, FilterField};

    fn parse(field: FilterField, comparison: FilterComparison, value: &str) -> Result<Operand, String> {
        parse_operand(describe_field(field).unwrap(), comparison, value, Utc::now())
    }

    #[test]
    fn collection_literal_splits_on_commas() {
        assert_eq!(
            parse(FilterField::Genres, FilterComparison::MustContains, " Horror, Comedy ,,"),
            Ok(Operand::Members(vec!["Horror".into(), "Comedy".into()]))
        );
        assert!(parse(FilterField::Genres, FilterComparison::Contains, " , ").is_err());
        assert_eq!(
            parse(FilterField::Genres, FilterComparison::IsEmpty, ""),
            Ok(Operand::Nothing)
        );
    }

    #[test]
    fn enum_literal_resolves_in_domain() {
        assert_eq!(
            parse(FilterField::AgeRating, FilterComparison::Equal, "Teen"),
            Ok(Operand::Enum(8))
        );
        let err = parse(FilterField::PublicationStatus, FilterComparison::Equal, "Paused").unwrap_err();
        assert!(err.contains("OnGoing"));
    }

    #[test]
    fn number_literal_must_be_finite() {
        assert_eq!(
            parse(FilterField::ReleaseYear, FilterComparison::GreaterThan, " 2001 "),
            Ok(Operand::Number(2001.0))
        );
        assert!(parse(FilterField::UserRating, FilterComparison::Equal, "NaN").is_err());
        assert!(parse(FilterField::UserRating, FilterComparison::Equal, "five").is_err());
    }

    #[test]
    fn date_literal_keeps_precision() {
        assert_eq!(
            parse(FilterField::ReadingDate, FilterComparison::IsBefore, "2024-02-29"),
            Ok(Operand::Date(DateLiteral::Day(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())))
        );
        assert!(matches!(
            parse(FilterField::ReadingDate, FilterComparison::IsAfter, "2024-02-29T12:00:00+02:00"),
            Ok(Operand::Date(DateLiteral::Instant(_)))
        ));
        assert!(parse(FilterField::ReadingDate, FilterComparison::Equal, "yesterday").is_err());
    }

    #[test]
    fn window_literal_is_seconds() {
        let Ok(Operand::Window { span, .. }) =
            parse(FilterField::ReadingDate, FilterComparison::IsInLast, "86400")
        else {
            panic!("expected a window");
        };
        assert_eq!(span, TimeDelta::days(1));
        assert!(parse(FilterField::ReadingDate, FilterComparison::IsInLast, "-5").is_err());
    }

    #[test]
    fn duration_literal_defaults_to_hours() {
        assert_eq!(parse_duration("5"), Ok(TimeDelta::hours(5)));
        assert_eq!(parse_duration("90m"), Ok(TimeDelta::minutes(90)));
        assert_eq!(parse_duration("2D"), Ok(TimeDelta::days(2)));
        assert_eq!(parse_duration("3600s"), Ok(TimeDelta::hours(1)));
        assert!(parse_duration("5w").is_err());
        assert!(parse_duration("-1").is_err());
        assert!(parse_duration("").is_err());
    }
}
