use time::{Date, Duration, OffsetDateTime};
use time_tz::{ToTimezone, timezones};

pub const DAYS_PER_WEEK: i64 = 7;
pub const WEEKS_PER_PLAN: u8 = 4;
pub const PLAN_DAYS: i64 = DAYS_PER_WEEK * WEEKS_PER_PLAN as i64;

/// Returns the 7 consecutive dates of the given week, week 0 starting at `start`
pub fn generate_week_dates(start: Date, week_index: u32) -> [Date; 7] {
    let first = start + Duration::weeks(week_index as i64);

    std::array::from_fn(|day| first + Duration::days(day as i64))
}

/// Returns the 28 consecutive dates of the 4-week window starting at `start`
pub fn generate_four_week_dates(start: Date) -> [Date; 28] {
    std::array::from_fn(|day| start + Duration::days(day as i64))
}

/// Signed number of calendar days from `from` to `to`
pub fn days_between(from: Date, to: Date) -> i64 {
    (to - from).whole_days()
}

/// Returns the week index (0..=3) `reference` falls in, or `None` when it is
/// outside the 4-week window starting at `start`
pub fn current_week_number(start: Date, reference: Date) -> Option<u8> {
    let days = days_between(start, reference);

    if !(0..PLAN_DAYS).contains(&days) {
        return None;
    }

    Some((days / DAYS_PER_WEEK) as u8)
}

pub fn is_within_window(start: Date, date: Date) -> bool {
    current_week_number(start, date).is_some()
}

/// Formats week `week_index` as "M/D - M/D", ending 6 days after the week start
pub fn format_week_range(start: Date, week_index: u32) -> String {
    let first = start + Duration::weeks(week_index as i64);

    format_date_range(first, first + Duration::days(DAYS_PER_WEEK - 1))
}

pub fn format_date_range(start: Date, end: Date) -> String {
    format!("{} - {}", format_month_day(start), format_month_day(end))
}

pub fn format_month_day(date: Date) -> String {
    format!("{}/{}", u8::from(date.month()), date.day())
}

/// Current calendar date in the given IANA timezone, UTC when the name is unknown
pub fn today(tz: impl AsRef<str>) -> Date {
    let mut now = OffsetDateTime::now_utc();

    if let Some(tz) = timezones::get_by_name(tz.as_ref()) {
        now = now.to_timezone(tz);
    }

    now.date()
}

pub fn is_known_timezone(tz: impl AsRef<str>) -> bool {
    timezones::get_by_name(tz.as_ref()).is_some()
}

/// Source of "today" for activity checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clock {
    Timezone(String),
    Fixed(Date),
}

impl Clock {
    pub fn today(&self) -> Date {
        match self {
            Clock::Timezone(tz) => today(tz),
            Clock::Fixed(date) => *date,
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Clock::Timezone("UTC".to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_generate_week_dates() {
        let week = generate_week_dates(date!(2024 - 03 - 15), 1);

        assert_eq!(week[0], date!(2024 - 03 - 22));
        assert_eq!(week[6], date!(2024 - 03 - 28));
    }

    #[test]
    fn test_four_weeks_is_concatenation_of_weeks() {
        for start in [
            date!(2024 - 03 - 15),
            date!(2024 - 02 - 20),
            date!(2023 - 12 - 18),
            date!(2025 - 01 - 31),
        ] {
            let all = generate_four_week_dates(start);
            let weeks = (0..4)
                .flat_map(|week| generate_week_dates(start, week))
                .collect::<Vec<_>>();

            assert_eq!(all.len(), 28);
            assert_eq!(all.to_vec(), weeks);
        }
    }

    #[test]
    fn test_four_weeks_crosses_leap_day() {
        let all = generate_four_week_dates(date!(2024 - 02 - 20));

        assert!(all.contains(&date!(2024 - 02 - 29)));
        assert_eq!(all[27], date!(2024 - 03 - 18));
    }

    #[test]
    fn test_current_week_number() {
        let start = date!(2024 - 03 - 15);

        assert_eq!(current_week_number(start, start), Some(0));
        assert_eq!(current_week_number(start, date!(2024 - 03 - 21)), Some(0));
        assert_eq!(current_week_number(start, date!(2024 - 03 - 22)), Some(1));
        assert_eq!(current_week_number(start, date!(2024 - 04 - 11)), Some(3));
        assert_eq!(current_week_number(start, date!(2024 - 04 - 12)), None);
        assert_eq!(current_week_number(start, date!(2024 - 03 - 14)), None);
    }

    #[test]
    fn test_format_week_range() {
        let start = date!(2024 - 03 - 15);

        assert_eq!(format_week_range(start, 0), "3/15 - 3/21");
        assert_eq!(format_week_range(start, 2), "3/29 - 4/4");
        assert_eq!(
            format_date_range(start, start + Duration::days(PLAN_DAYS - 1)),
            "3/15 - 4/11"
        );
    }

    #[test]
    fn test_days_between_is_signed() {
        assert_eq!(days_between(date!(2024 - 03 - 15), date!(2024 - 03 - 10)), -5);
        assert_eq!(days_between(date!(2024 - 12 - 30), date!(2025 - 01 - 02)), 3);
    }

    #[test]
    fn test_clock() {
        assert_eq!(
            Clock::Fixed(date!(2024 - 03 - 15)).today(),
            date!(2024 - 03 - 15)
        );
        assert!(is_known_timezone("Europe/Paris"));
        assert!(!is_known_timezone("Mars/Olympus"));
    }
}
