use chrono::{DateTime, Datelike, FixedOffset, Offset, Utc};

use super::types::{DayTag, DaySet, UnknownDayTag};

/// Calendar used to decide which weekday an instant falls on.
/// Pinned to one business offset so every environment agrees on day boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessCalendar {
    offset: FixedOffset,
}

impl BusinessCalendar {
    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    /// Builds a calendar from an offset in minutes east of UTC (e.g. 120 for UTC+2)
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(|offset| Self { offset })
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Weekday of `instant` in the business offset
    pub fn weekday_at(&self, instant: DateTime<Utc>) -> chrono::Weekday {
        instant.with_timezone(&self.offset).weekday()
    }
}

impl Default for BusinessCalendar {
    fn default() -> Self {
        Self::utc()
    }
}

/// Parses a comma-separated list of day tags, dropping duplicates and blanks
pub fn parse_day_list(raw: &str) -> Result<DaySet, UnknownDayTag> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::parse::<DayTag>)
        .collect()
}

/// Joins day tags back into the comma-separated column format
pub fn join_day_list(days: &DaySet) -> String {
    days.iter()
        .map(DayTag::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Human-readable schedule label shown to administrators
pub fn format_schedule(days: &DaySet, is_day_scheduled: bool) -> String {
    if days.contains(&DayTag::Everyday) || (!is_day_scheduled && days.is_empty()) {
        return "Every day".to_string();
    }
    if days.is_empty() {
        return "Not scheduled".to_string();
    }
    days.iter()
        .map(DayTag::label)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Weekday};

    #[test]
    fn weekday_follows_business_offset_across_midnight() {
        // Sunday 23:30 UTC is already Monday in UTC+2 and still Sunday in UTC-5
        let instant = Utc.with_ymd_and_hms(2026, 10, 11, 23, 30, 0).unwrap();
        assert_eq!(BusinessCalendar::utc().weekday_at(instant), Weekday::Sun);
        let plus_two = BusinessCalendar::from_offset_minutes(120).unwrap();
        assert_eq!(plus_two.weekday_at(instant), Weekday::Mon);
        let minus_five = BusinessCalendar::from_offset_minutes(-300).unwrap();
        assert_eq!(minus_five.weekday_at(instant), Weekday::Sun);
    }

    #[test]
    fn rejects_out_of_range_offsets() {
        assert!(BusinessCalendar::from_offset_minutes(24 * 60).is_none());
        assert!(BusinessCalendar::from_offset_minutes(i32::MAX).is_none());
    }

    #[test]
    fn parses_and_dedupes_day_lists() {
        let days = parse_day_list("friday, Monday,,monday ").unwrap();
        assert_eq!(join_day_list(&days), "monday, friday");
        assert!(parse_day_list("monday, someday").is_err());
        assert!(parse_day_list("").unwrap().is_empty());
    }

    #[test]
    fn formats_schedule_labels() {
        let mut days = DaySet::new();
        assert_eq!(format_schedule(&days, true), "Not scheduled");
        assert_eq!(format_schedule(&days, false), "Every day");
        days.insert(DayTag::Friday);
        days.insert(DayTag::Monday);
        assert_eq!(format_schedule(&days, true), "Monday, Friday");
        days.insert(DayTag::Everyday);
        assert_eq!(format_schedule(&days, false), "Every day");
    }
}
