use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, NaiveTime, SecondsFormat, Utc};

/// Source of "now" for computing date-range defaults.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Format a timestamp as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn to_iso(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Midnight UTC, `days` days before the current UTC day. Never earlier than
/// 0000-01-01, the first day a four-digit ISO-8601 year can express.
pub fn start_of_day_days_ago(clock: &dyn Clock, days: u32) -> DateTime<Utc> {
    let day = clock
        .now()
        .date_naive()
        .checked_sub_days(Days::new(u64::from(days)))
        .filter(|d| d.year() >= 0)
        .unwrap_or_else(earliest_iso_date);
    day.and_time(NaiveTime::MIN).and_utc()
}

fn earliest_iso_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(0, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Last millisecond of the current UTC day.
pub fn end_of_today(clock: &dyn Clock) -> DateTime<Utc> {
    let next_day = clock.now().date_naive() + Duration::days(1);
    next_day.and_time(NaiveTime::MIN).and_utc() - Duration::milliseconds(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 12).unwrap())
    }

    #[test]
    fn start_of_day_one_week_back() {
        let started = start_of_day_days_ago(&clock(), 7);
        assert_eq!(to_iso(started), "2024-02-27T00:00:00.000Z");
    }

    #[test]
    fn end_of_today_is_last_millisecond() {
        let ended = end_of_today(&clock());
        assert_eq!(to_iso(ended), "2024-03-05T23:59:59.999Z");
    }

    #[test]
    fn oversized_lookback_clamps_to_year_zero() {
        let started = start_of_day_days_ago(&clock(), u32::MAX);
        assert_eq!(to_iso(started), "0000-01-01T00:00:00.000Z");

        let started = start_of_day_days_ago(&clock(), 1_000_000);
        assert_eq!(to_iso(started), "0000-01-01T00:00:00.000Z");
    }

    #[test]
    fn defaults_stable_within_a_day() {
        let morning = FixedClock(Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 1).unwrap());
        let night = FixedClock(Utc.with_ymd_and_hms(2024, 3, 5, 23, 59, 59).unwrap());

        assert_eq!(
            start_of_day_days_ago(&morning, 7),
            start_of_day_days_ago(&night, 7)
        );
        assert_eq!(end_of_today(&morning), end_of_today(&night));
    }
}
