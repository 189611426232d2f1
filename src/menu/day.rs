use std::fmt::Display;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Sun,
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl DayOfWeek {
    pub const ALL: [Self; 7] = [
        Self::Mon,
        Self::Tue,
        Self::Wed,
        Self::Thu,
        Self::Fri,
        Self::Sat,
        Self::Sun,
    ];

    pub fn of(date: NaiveDate) -> Self {
        date.weekday().into()
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sun => "sun",
            Self::Mon => "mon",
            Self::Tue => "tue",
            Self::Wed => "wed",
            Self::Thu => "thu",
            Self::Fri => "fri",
            Self::Sat => "sat",
        }
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Sun => Self::Sun,
            Weekday::Mon => Self::Mon,
            Weekday::Tue => Self::Tue,
            Weekday::Wed => Self::Wed,
            Weekday::Thu => Self::Thu,
            Weekday::Fri => Self::Fri,
            Weekday::Sat => Self::Sat,
        }
    }
}

impl Display for DayOfWeek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const KST_OFFSET_SECS: i32 = 9 * 3600;

/// Unix seconds of UTC midnight on `date`; the `sday` query parameter of the menu pages.
pub fn sday_of(date: NaiveDate) -> i64 {
    date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp()
}

pub fn date_of_sday(sday: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(sday, 0).map(|dt| dt.date_naive())
}

/// The calendar date in Korea at `now`.
pub fn korean_date(now: DateTime<Utc>) -> NaiveDate {
    let kst = FixedOffset::east_opt(KST_OFFSET_SECS).expect("offset is within a day");
    now.with_timezone(&kst).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_day_of_week() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        assert_eq!(DayOfWeek::of(date), DayOfWeek::Mon);
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(DayOfWeek::of(date), DayOfWeek::Sun);
    }

    #[test]
    fn test_sday_round_trip() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let sday = sday_of(date);
        assert_eq!(sday, 1_740_960_000);
        assert_eq!(date_of_sday(sday), Some(date));
    }

    #[test]
    fn test_korean_date_rolls_over_before_utc() {
        let now = Utc.with_ymd_and_hms(2025, 3, 2, 16, 30, 0).unwrap();
        assert_eq!(
            korean_date(now),
            NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
        );
    }

    #[test]
    fn test_serde() {
        assert_eq!(serde_json::to_string(&DayOfWeek::Wed).unwrap(), "\"wed\"");
        let day: DayOfWeek = serde_json::from_str("\"sat\"").unwrap();
        assert_eq!(day, DayOfWeek::Sat);
    }
}
