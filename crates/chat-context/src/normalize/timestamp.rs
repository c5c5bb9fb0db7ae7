//! Timestamp reconciliation
//!
//! Collectors usually see a bare time of day next to each message and a
//! date divider ("Today", "Yesterday", "Tuesday", "12/03/2024") somewhere
//! above it. This module turns the pair into an absolute local timestamp.
//! Label resolution and time parsing are each an ordered list of pure
//! parsers; the first one that yields a value wins.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use regex::Regex;
use std::sync::LazyLock;

use crate::config::SameWeekdayPolicy;
use crate::types::TimestampHint;

static NUMERIC_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{4}|\d{2})$").expect("numeric date regex is valid")
});
static EMBEDDED_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{4}|\d{2})\b").expect("embedded date regex is valid")
});
static TIME_OF_DAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2}):(\d{2})(?::(\d{2}))?(?:\s*([ap])\.?\s*m\b\.?)?")
        .expect("time of day regex is valid")
});
static ORDINAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\b").expect("ordinal regex is valid"));

const DATED_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d %B %Y",
    "%d %B, %Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%A, %B %d, %Y",
    "%A, %d %B %Y",
    "%A %d %B %Y",
];

/// Formats without a year; parsed with the current year appended.
const YEARLESS_FORMATS: &[&str] = &["%B %d", "%d %B", "%A, %B %d", "%A, %d %B", "%A %d %B"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// A parsed time hint: either just a wall-clock time or a full date-time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedTime {
    TimeOfDay(NaiveTime),
    Full(NaiveDateTime),
}

impl ParsedTime {
    fn time(&self) -> NaiveTime {
        match self {
            ParsedTime::TimeOfDay(t) => *t,
            ParsedTime::Full(dt) => dt.time(),
        }
    }
}

/// Result of reconciling one record's hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reconciled {
    pub timestamp: Option<NaiveDateTime>,
    /// Calendar date, known even when no time of day parsed
    pub date: Option<NaiveDate>,
}

type LabelParser = fn(&TimestampReconciler, &str) -> Option<NaiveDate>;
type TimeParser = fn(&str) -> Option<ParsedTime>;

const LABEL_PARSERS: &[LabelParser] = &[
    TimestampReconciler::relative_day,
    TimestampReconciler::weekday,
    TimestampReconciler::numeric_date,
    TimestampReconciler::written_date,
];

const TIME_PARSERS: &[TimeParser] = &[parse_iso_datetime, parse_time_with_date, parse_time_only];

pub struct TimestampReconciler {
    today: NaiveDate,
    policy: SameWeekdayPolicy,
}

impl TimestampReconciler {
    pub fn new(today: NaiveDate, policy: SameWeekdayPolicy) -> Self {
        Self { today, policy }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Combine a time hint with an optional date label.
    pub fn reconcile(&self, hint: Option<&TimestampHint>, label: Option<&str>) -> Reconciled {
        let label_date = label.and_then(|l| self.resolve_date_label(l));

        let parsed = match hint {
            Some(TimestampHint::Absolute(dt)) => Some(ParsedTime::Full(*dt)),
            Some(TimestampHint::Text(text)) => parse_time_hint(text),
            None => None,
        };

        let timestamp = match (parsed, label_date) {
            (Some(p), Some(date)) => Some(date.and_time(p.time())),
            (Some(ParsedTime::Full(dt)), None) => Some(dt),
            (Some(ParsedTime::TimeOfDay(t)), None) => Some(self.today.and_time(t)),
            (None, _) => None,
        };

        Reconciled {
            timestamp,
            date: timestamp.map(|t| t.date()).or(label_date),
        }
    }

    /// Resolve a date divider label to a calendar date.
    pub fn resolve_date_label(&self, label: &str) -> Option<NaiveDate> {
        let normalized = label
            .trim()
            .trim_matches(|c: char| matches!(c, '[' | ']' | '(' | ')' | '-' | '—' | '·' | ',' | '.'))
            .trim()
            .to_lowercase();
        if normalized.is_empty() {
            return None;
        }
        LABEL_PARSERS.iter().find_map(|parse| parse(self, &normalized))
    }

    fn relative_day(&self, label: &str) -> Option<NaiveDate> {
        match label {
            "today" | "hoy" | "heute" | "aujourd'hui" | "aaj" => Some(self.today),
            "yesterday" | "ayer" | "gestern" | "hier" => self.today.pred_opt(),
            _ => None,
        }
    }

    fn weekday(&self, label: &str) -> Option<NaiveDate> {
        let target = parse_weekday(label)?;
        let today_idx = self.today.weekday().num_days_from_monday() as i64;
        let target_idx = target.num_days_from_monday() as i64;
        let mut back = (today_idx - target_idx).rem_euclid(7);
        if back == 0 && self.policy == SameWeekdayPolicy::SevenDaysPrior {
            back = 7;
        }
        self.today.checked_sub_signed(Duration::days(back))
    }

    fn numeric_date(&self, label: &str) -> Option<NaiveDate> {
        let caps = NUMERIC_DATE_RE.captures(label)?;
        date_from_parts(&caps[1], &caps[2], &caps[3])
    }

    fn written_date(&self, label: &str) -> Option<NaiveDate> {
        let label = ORDINAL_RE.replace_all(label, "$1");

        if let Some(date) = DATED_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(&label, fmt).ok())
        {
            return Some(date);
        }

        let year = self.today.year();
        let with_year = format!("{} {}", label, year);
        let date = YEARLESS_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(&with_year, &format!("{} %Y", fmt)).ok())?;

        // A yearless label can only refer to the past
        if date > self.today {
            date.with_year(year - 1)
        } else {
            Some(date)
        }
    }
}

fn parse_weekday(label: &str) -> Option<Weekday> {
    let day = match label {
        "monday" | "mon" => Weekday::Mon,
        "tuesday" | "tue" | "tues" => Weekday::Tue,
        "wednesday" | "wed" => Weekday::Wed,
        "thursday" | "thu" | "thur" | "thurs" => Weekday::Thu,
        "friday" | "fri" => Weekday::Fri,
        "saturday" | "sat" => Weekday::Sat,
        "sunday" | "sun" => Weekday::Sun,
        _ => return None,
    };
    Some(day)
}

/// DD/MM/YYYY or DD/MM/YY; two-digit years are 2000+.
fn date_from_parts(day: &str, month: &str, year: &str) -> Option<NaiveDate> {
    let day: u32 = day.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    let mut year: i32 = year.parse().ok()?;
    if year < 100 {
        year += 2000;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse a free-text time hint.
pub fn parse_time_hint(text: &str) -> Option<ParsedTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    TIME_PARSERS.iter().find_map(|parse| parse(text))
}

fn parse_iso_datetime(text: &str) -> Option<ParsedTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(ParsedTime::Full(dt.naive_local()));
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(ParsedTime::Full)
}

/// "[10:42 PM, 12/03/2024]" style hints that carry their own date.
fn parse_time_with_date(text: &str) -> Option<ParsedTime> {
    let caps = EMBEDDED_DATE_RE.captures(text)?;
    let date = date_from_parts(&caps[1], &caps[2], &caps[3])?;
    let time = parse_time_of_day(text)?;
    Some(ParsedTime::Full(date.and_time(time)))
}

fn parse_time_only(text: &str) -> Option<ParsedTime> {
    parse_time_of_day(text).map(ParsedTime::TimeOfDay)
}

/// Find the first `H:MM[:SS] [am|pm]` in the text.
pub fn parse_time_of_day(text: &str) -> Option<NaiveTime> {
    let caps = TIME_OF_DAY_RE.captures(text)?;
    let mut hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;
    let second: u32 = caps.get(3).map(|m| m.as_str().parse().unwrap_or(0)).unwrap_or(0);

    if let Some(meridiem) = caps.get(4) {
        if hour == 0 || hour > 12 {
            return None;
        }
        let pm = meridiem.as_str().eq_ignore_ascii_case("p");
        hour = match (hour, pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, true) => h + 12,
            (h, false) => h,
        };
    }

    NaiveTime::from_hms_opt(hour, minute, second)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-03-13 is a Wednesday
    fn reconciler() -> TimestampReconciler {
        TimestampReconciler::new(NaiveDate::from_ymd_opt(2024, 3, 13).unwrap(), SameWeekdayPolicy::SevenDaysPrior)
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_relative_labels() {
        let r = reconciler();
        assert_eq!(r.resolve_date_label("Today"), Some(ymd(2024, 3, 13)));
        assert_eq!(r.resolve_date_label(" YESTERDAY "), Some(ymd(2024, 3, 12)));
    }

    #[test]
    fn test_weekday_labels_resolve_to_prior_occurrence() {
        let r = reconciler();
        assert_eq!(r.resolve_date_label("Monday"), Some(ymd(2024, 3, 11)));
        assert_eq!(r.resolve_date_label("Thu"), Some(ymd(2024, 3, 7)));
    }

    // Documented assumption: a label naming today's weekday means last week,
    // since the surface would have said "Today" otherwise.
    #[test]
    fn test_same_weekday_policy() {
        let r = reconciler();
        assert_eq!(r.resolve_date_label("Wednesday"), Some(ymd(2024, 3, 6)));

        let same_day = TimestampReconciler::new(ymd(2024, 3, 13), SameWeekdayPolicy::SameDay);
        assert_eq!(same_day.resolve_date_label("Wednesday"), Some(ymd(2024, 3, 13)));
    }

    #[test]
    fn test_numeric_and_written_dates() {
        let r = reconciler();
        assert_eq!(r.resolve_date_label("05/02/2024"), Some(ymd(2024, 2, 5)));
        assert_eq!(r.resolve_date_label("05/02/24"), Some(ymd(2024, 2, 5)));
        assert_eq!(r.resolve_date_label("31/02/2024"), None);
        assert_eq!(r.resolve_date_label("2023-12-24"), Some(ymd(2023, 12, 24)));
        assert_eq!(r.resolve_date_label("March 3rd, 2024"), Some(ymd(2024, 3, 3)));
        assert_eq!(r.resolve_date_label("12 January 2024"), Some(ymd(2024, 1, 12)));
    }

    #[test]
    fn test_yearless_dates_never_land_in_the_future() {
        let r = reconciler();
        assert_eq!(r.resolve_date_label("March 1"), Some(ymd(2024, 3, 1)));
        assert_eq!(r.resolve_date_label("December 24"), Some(ymd(2023, 12, 24)));
    }

    #[test]
    fn test_time_of_day_parsing() {
        let t = |h, m, s| NaiveTime::from_hms_opt(h, m, s).unwrap();
        assert_eq!(parse_time_of_day("10:30"), Some(t(10, 30, 0)));
        assert_eq!(parse_time_of_day("9:05 PM"), Some(t(21, 5, 0)));
        assert_eq!(parse_time_of_day("12:15 a.m."), Some(t(0, 15, 0)));
        assert_eq!(parse_time_of_day("12:15pm"), Some(t(12, 15, 0)));
        assert_eq!(parse_time_of_day("23:59:58"), Some(t(23, 59, 58)));
        assert_eq!(parse_time_of_day("25:00"), None);
        assert_eq!(parse_time_of_day("13:00 pm"), None);
        assert_eq!(parse_time_of_day("soon"), None);
    }

    #[test]
    fn test_reconcile_combines_label_and_time() {
        let r = reconciler();
        let hint = TimestampHint::Text("8:45 PM".into());
        let out = r.reconcile(Some(&hint), Some("Yesterday"));
        assert_eq!(out.timestamp, Some(ymd(2024, 3, 12).and_hms_opt(20, 45, 0).unwrap()));
        assert_eq!(out.date, Some(ymd(2024, 3, 12)));
    }

    #[test]
    fn test_reconcile_without_label_assumes_today() {
        let r = reconciler();
        let hint = TimestampHint::Text("07:10".into());
        let out = r.reconcile(Some(&hint), None);
        assert_eq!(out.timestamp, Some(ymd(2024, 3, 13).and_hms_opt(7, 10, 0).unwrap()));
    }

    #[test]
    fn test_embedded_and_iso_dates() {
        let r = reconciler();
        let bracketed = TimestampHint::Text("[10:42 PM, 02/03/2024]".into());
        assert_eq!(
            r.reconcile(Some(&bracketed), None).timestamp,
            Some(ymd(2024, 3, 2).and_hms_opt(22, 42, 0).unwrap())
        );

        let iso = TimestampHint::Text("2024-03-01T09:00:00Z".into());
        assert_eq!(
            r.reconcile(Some(&iso), None).timestamp,
            Some(ymd(2024, 3, 1).and_hms_opt(9, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_unparseable_hints_yield_none_but_keep_date() {
        let r = reconciler();
        let hint = TimestampHint::Text("just now".into());
        let out = r.reconcile(Some(&hint), Some("Today"));
        assert_eq!(out.timestamp, None);
        assert_eq!(out.date, Some(ymd(2024, 3, 13)));

        let nothing = r.reconcile(None, Some("sometime"));
        assert_eq!(nothing, Reconciled::default());
    }
}
