//! The calendar month selected on the dashboard and reports pages.

use serde::Deserialize;
use time::{Date, Month, OffsetDateTime, Time};

/// The earliest year that can be selected.
const MIN_YEAR: i32 = 1;
/// The latest year that can be selected. The month after December must still be representable.
const MAX_YEAR: i32 = 9998;

/// The raw `month` and `year` query parameters.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct MonthQuery {
    pub month: Option<String>,
    pub year: Option<String>,
}

/// A calendar month in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthPeriod {
    year: i32,
    month: Month,
}

/// The month picked from a query along with whether the query had to be ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthSelection {
    pub period: MonthPeriod,
    /// Set when the query held a value that is not a valid month or year,
    /// in which case `period` is the current month.
    pub is_fallback: bool,
}

impl MonthPeriod {
    /// The month containing `date`.
    pub fn containing(date: Date) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Select the month from `query`, defaulting each missing value to the current one.
    ///
    /// A value that is not an integer, a month outside 1 to 12 or a year out of
    /// range selects the current month and year instead.
    pub fn from_query(query: &MonthQuery, today: Date) -> MonthSelection {
        let current = Self::containing(today);

        match Self::parse(query, current) {
            Some(period) => MonthSelection {
                period,
                is_fallback: false,
            },
            None => {
                tracing::debug!("Invalid month filter {query:?}, falling back to {current:?}");
                MonthSelection {
                    period: current,
                    is_fallback: true,
                }
            }
        }
    }

    fn parse(query: &MonthQuery, current: Self) -> Option<Self> {
        let non_blank = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_owned)
        };

        let month = match non_blank(&query.month) {
            Some(raw) => Month::try_from(raw.parse::<u8>().ok()?).ok()?,
            None => current.month,
        };

        let year = match non_blank(&query.year) {
            Some(raw) => raw.parse::<i32>().ok()?,
            None => current.year,
        };

        (MIN_YEAR..=MAX_YEAR)
            .contains(&year)
            .then_some(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> Month {
        self.month
    }

    /// The month number, 1 for January through 12 for December.
    pub fn month_number(&self) -> u8 {
        self.month as u8
    }

    fn first_day(&self) -> Date {
        // Only the month after December 9999 is out of range.
        Date::from_calendar_date(self.year, self.month, 1).unwrap_or(Date::MAX)
    }

    /// The half-open UTC range `[start of month, start of next month)`.
    pub fn utc_range(&self) -> (OffsetDateTime, OffsetDateTime) {
        let next = match self.month {
            Month::December => Self {
                year: self.year + 1,
                month: Month::January,
            },
            month => Self {
                year: self.year,
                month: month.next(),
            },
        };

        (
            self.first_day().with_time(Time::MIDNIGHT).assume_utc(),
            next.first_day().with_time(Time::MIDNIGHT).assume_utc(),
        )
    }

    /// Whether `date_time` falls within this month in UTC.
    pub fn contains(&self, date_time: OffsetDateTime) -> bool {
        let date = date_time.to_offset(time::UtcOffset::UTC).date();

        date.year() == self.year && date.month() == self.month
    }

    /// A human readable label such as "March 2025".
    pub fn label(&self) -> String {
        format!("{} {}", self.month, self.year)
    }
}

#[cfg(test)]
mod tests {
    use time::{Month, macros::date, macros::datetime};

    use super::{MonthPeriod, MonthQuery};

    fn query(month: Option<&str>, year: Option<&str>) -> MonthQuery {
        MonthQuery {
            month: month.map(str::to_owned),
            year: year.map(str::to_owned),
        }
    }

    const TODAY: time::Date = date!(2025 - 06 - 15);

    #[test]
    fn missing_values_default_to_today() {
        let selection = MonthPeriod::from_query(&query(None, Some("2024")), TODAY);

        assert!(!selection.is_fallback);
        assert_eq!(selection.period.year(), 2024);
        assert_eq!(selection.period.month(), Month::June);

        let selection = MonthPeriod::from_query(&query(Some("2"), None), TODAY);

        assert!(!selection.is_fallback);
        assert_eq!(selection.period.year(), 2025);
        assert_eq!(selection.period.month(), Month::February);
    }

    #[test]
    fn blank_values_are_missing() {
        let selection = MonthPeriod::from_query(&query(Some(""), Some(" ")), TODAY);

        assert!(!selection.is_fallback);
        assert_eq!(selection.period, MonthPeriod::containing(TODAY));
    }

    #[test]
    fn invalid_values_fall_back_to_current_month() {
        let cases = [
            query(Some("13"), Some("2024")),
            query(Some("0"), Some("2024")),
            query(Some("abc"), Some("2024")),
            query(Some("3"), Some("twenty")),
            query(Some("3"), Some("100000")),
        ];

        for case in cases {
            let selection = MonthPeriod::from_query(&case, TODAY);

            assert!(selection.is_fallback, "{case:?} should fall back");
            assert_eq!(selection.period, MonthPeriod::containing(TODAY));
        }
    }

    #[test]
    fn utc_range_is_half_open_month() {
        let period = MonthPeriod::from_query(&query(Some("12"), Some("2024")), TODAY).period;

        let (start, end) = period.utc_range();

        assert_eq!(start, datetime!(2024-12-01 00:00 UTC));
        assert_eq!(end, datetime!(2025-01-01 00:00 UTC));
        assert!(period.contains(datetime!(2024-12-31 23:59:59 UTC)));
        assert!(!period.contains(end));
    }

    #[test]
    fn label_names_month() {
        let period = MonthPeriod::containing(date!(2025 - 03 - 01));

        assert_eq!(period.label(), "March 2025");
        assert_eq!(period.month_number(), 3);
    }
}
