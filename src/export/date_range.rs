use std::str::FromStr;

use chrono::{DateTime, Months, NaiveDate, NaiveTime, Utc};

use super::error::ParseError;

/// Parse a `MM/YYYY` string into midnight UTC on the first of that month.
///
/// The month must be exactly two digits and the year exactly four, so `1/2017`,
/// `2017-01` and `01/17` are all rejected.
pub fn parse_month(input: &str) -> Result<DateTime<Utc>, ParseError> {
    let format_err = || ParseError::Format {
        input: input.to_string(),
    };

    let (month, year) = input.split_once('/').ok_or_else(format_err)?;
    let all_digits = month.bytes().chain(year.bytes()).all(|b| b.is_ascii_digit());
    if month.len() != 2 || year.len() != 4 || !all_digits {
        return Err(format_err());
    }

    let month: u32 = month.parse().map_err(|_| format_err())?;
    let year: i32 = year.parse().map_err(|_| format_err())?;

    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .ok_or(ParseError::Month {
            input: input.to_string(),
            month,
        })
}

/// A half-open `[begin, end)` window covering exactly one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    begin: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateRange {
    /// Resolve a `MM/YYYY` selector into the window for that month.
    pub fn parse(selector: &str) -> Result<Self, ParseError> {
        let begin = parse_month(selector)?;
        let end = begin
            .checked_add_months(Months::new(1))
            .ok_or_else(|| ParseError::Format {
                input: selector.to_string(),
            })?;

        log::trace!("Resolved {selector} to [{begin}, {end})");
        Ok(Self { begin, end })
    }

    pub fn begin(&self) -> DateTime<Utc> {
        self.begin
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Returns `(begin, end)` as Unix epoch seconds, for use as query bounds.
    pub fn to_unix_ts(&self) -> (i64, i64) {
        (self.begin.timestamp(), self.end.timestamp())
    }

    /// Whether `t` falls inside the window (`begin <= t < end`).
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.begin <= t && t < self.end
    }
}

impl FromStr for DateRange {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {})",
            self.begin.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}
