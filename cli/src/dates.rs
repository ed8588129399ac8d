use chrono::NaiveDate;
use earth_gif_common::frame::FrameDescriptor;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, thiserror::Error)]
pub enum DateError {
    #[error("not a valid date: {0:?} (expected YYYY-MM-DD)")]
    Parse(String),
    #[error("date {date} is not between {earliest} and {latest}")]
    OutOfRange {
        date: NaiveDate,
        earliest: NaiveDate,
        latest: NaiveDate,
    },
    #[error("the catalog lists no dates")]
    NoDates,
}

pub fn parse(raw: &str) -> Result<NaiveDate, DateError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| DateError::Parse(raw.to_string()))
}

/// Parse a requested date and check it lies strictly after `earliest` and no later than `today`.
pub fn validate(raw: &str, earliest: NaiveDate, today: NaiveDate) -> Result<NaiveDate, DateError> {
    let date = parse(raw)?;
    if date <= earliest || date > today {
        return Err(DateError::OutOfRange {
            date,
            earliest,
            latest: today,
        });
    }
    Ok(date)
}

/// What to do with a requested date given the days the catalog has imagery for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The catalog has imagery on that exact day.
    Exact(NaiveDate),
    /// No imagery that day and only one neighbouring day exists.
    Nearest(NaiveDate),
    /// No imagery that day; the operator picks the closest later or earlier day.
    Choose { newer: NaiveDate, older: NaiveDate },
}

/// Find `requested` among `available`, or its nearest neighbours on either side.
/// Entries whose date does not parse are ignored; input order does not matter.
pub fn resolve(available: &[FrameDescriptor], requested: NaiveDate) -> Result<Resolution, DateError> {
    let mut newer: Option<NaiveDate> = None;
    let mut older: Option<NaiveDate> = None;

    for day in available.iter().filter_map(|d| d.day().ok()) {
        if day == requested {
            return Ok(Resolution::Exact(day));
        }
        if day > requested {
            newer = Some(newer.map_or(day, |n| n.min(day)));
        } else {
            older = Some(older.map_or(day, |o| o.max(day)));
        }
    }

    match (newer, older) {
        (Some(newer), Some(older)) => Ok(Resolution::Choose { newer, older }),
        (Some(only), None) | (None, Some(only)) => Ok(Resolution::Nearest(only)),
        (None, None) => Err(DateError::NoDates),
    }
}

pub fn format(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        parse(s).unwrap()
    }

    fn catalog(days: &[&str]) -> Vec<FrameDescriptor> {
        days.iter().map(|d| FrameDescriptor::new("", *d)).collect()
    }

    #[test]
    fn validate_accepts_dates_in_range() {
        let date = validate("2022-01-01", day("2015-06-13"), day("2024-05-01")).unwrap();
        assert_eq!(date, day("2022-01-01"));
        assert!(validate("2024-05-01", day("2015-06-13"), day("2024-05-01")).is_ok());
    }

    #[test]
    fn validate_rejects_bounds_and_garbage() {
        let earliest = day("2015-06-13");
        let today = day("2024-05-01");
        assert!(matches!(validate("2015-06-13", earliest, today), Err(DateError::OutOfRange { .. })));
        assert!(matches!(validate("2010-01-01", earliest, today), Err(DateError::OutOfRange { .. })));
        assert!(matches!(validate("2024-05-02", earliest, today), Err(DateError::OutOfRange { .. })));
        assert!(matches!(validate("2022-13-01", earliest, today), Err(DateError::Parse(_))));
        assert!(matches!(validate("01/02/2022", earliest, today), Err(DateError::Parse(_))));
    }

    #[test]
    fn out_of_range_message_names_bounds() {
        let err = validate("2010-01-01", day("2015-06-13"), day("2024-05-01")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("2015-06-13") && msg.contains("2024-05-01"), "{msg}");
    }

    #[test]
    fn resolve_exact_match() {
        let days = catalog(&["2022-01-05", "2022-01-03", "2022-01-01"]);
        assert_eq!(resolve(&days, day("2022-01-03")).unwrap(), Resolution::Exact(day("2022-01-03")));
    }

    #[test]
    fn resolve_offers_both_neighbours() {
        let days = catalog(&["2022-01-09", "2022-01-05", "2022-01-01", "2021-12-30"]);
        assert_eq!(
            resolve(&days, day("2022-01-03")).unwrap(),
            Resolution::Choose {
                newer: day("2022-01-05"),
                older: day("2022-01-01"),
            }
        );
    }

    #[test]
    fn resolve_ignores_input_order() {
        let days = catalog(&["2022-01-01", "2022-01-09", "2021-12-30", "2022-01-05"]);
        assert_eq!(
            resolve(&days, day("2022-01-03")).unwrap(),
            Resolution::Choose {
                newer: day("2022-01-05"),
                older: day("2022-01-01"),
            }
        );
    }

    #[test]
    fn resolve_single_sided_gap() {
        let days = catalog(&["2022-01-05", "2022-01-01"]);
        assert_eq!(resolve(&days, day("2022-02-01")).unwrap(), Resolution::Nearest(day("2022-01-05")));
        assert_eq!(resolve(&days, day("2021-02-01")).unwrap(), Resolution::Nearest(day("2022-01-01")));
    }

    #[test]
    fn resolve_empty_catalog() {
        assert!(matches!(resolve(&[], day("2022-01-01")), Err(DateError::NoDates)));
        let junk = catalog(&["whenever"]);
        assert!(matches!(resolve(&junk, day("2022-01-01")), Err(DateError::NoDates)));
    }
}
