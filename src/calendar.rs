//! Calendar conversion between broken-down fields and absolute time
//!
//! Anchor lines carry a local wall-clock time with no zone information. This
//! module turns those fields into an absolute instant (normalizing
//! out-of-range fields the way `mktime` does) and renders instants back in the
//! `ctime` layout, e.g. `Mon Mar 13 09:23:21 2017`.

use chrono::{
    DateTime, Duration, Local, LocalResult, Months, NaiveDate, NaiveDateTime, Offset, TimeZone,
    Utc,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AdjustError;

/// An absolute point in time
pub type AbsoluteTime = DateTime<Utc>;

/// `ctime` layout without the trailing newline
const CTIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// Zone in which anchor lines are interpreted and timestamps displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeZoneMode {
    /// The machine's local time zone (default)
    #[default]
    Local,
    /// Coordinated Universal Time
    Utc,
}

/// Broken-down calendar fields as read from an anchor line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarFields {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl fmt::Display for CalendarFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

impl CalendarFields {
    /// Normalize into a naive date-time, carrying overflow between fields
    ///
    /// Month 13 becomes January of the next year, day 0 the last day of the
    /// previous month, second 60 the next minute. Returns `None` when the
    /// result leaves chrono's representable range.
    fn normalize(&self) -> Option<NaiveDateTime> {
        let january = NaiveDate::from_ymd_opt(self.year, 1, 1)?;
        let months = i64::from(self.month) - 1;
        let month_start = if months >= 0 {
            january.checked_add_months(Months::new(u32::try_from(months).ok()?))?
        } else {
            january.checked_sub_months(Months::new(1))?
        };

        let date = month_start.checked_add_signed(Duration::days(i64::from(self.day) - 1))?;
        let seconds_into_day = i64::from(self.hour) * 3600
            + i64::from(self.minute) * 60
            + i64::from(self.second);

        date.and_hms_opt(0, 0, 0)?
            .checked_add_signed(Duration::seconds(seconds_into_day))
    }
}

/// Convert calendar fields to an absolute instant in the given zone
///
/// Ambiguous local times (the repeated hour when daylight saving ends)
/// resolve to the earlier instant. Local times inside a daylight saving gap
/// use the offset in force before the gap, which moves them forward.
pub fn to_absolute_time(
    zone: TimeZoneMode,
    fields: &CalendarFields,
) -> Result<AbsoluteTime, AdjustError> {
    let invalid = || AdjustError::InvalidCalendarDate {
        line: 0,
        fields: fields.to_string(),
    };

    let naive = fields.normalize().ok_or_else(invalid)?;

    match zone {
        TimeZoneMode::Utc => Ok(Utc.from_utc_datetime(&naive)),
        TimeZoneMode::Local => match Local.from_local_datetime(&naive) {
            LocalResult::Single(t) => Ok(t.with_timezone(&Utc)),
            // chrono does not promise which candidate comes first
            LocalResult::Ambiguous(a, b) => Ok(a.min(b).with_timezone(&Utc)),
            LocalResult::None => {
                let before_gap = naive
                    .checked_sub_signed(Duration::days(1))
                    .ok_or_else(invalid)?;
                let offset = Local.offset_from_utc_datetime(&before_gap).fix();
                let utc = naive
                    .checked_sub_signed(Duration::seconds(i64::from(offset.local_minus_utc())))
                    .ok_or_else(invalid)?;
                Ok(Utc.from_utc_datetime(&utc))
            }
        },
    }
}

/// Render an instant in `ctime` layout, e.g. `Mon Mar  6 09:23:21 2017`
pub fn to_display_string(zone: TimeZoneMode, instant: &AbsoluteTime) -> String {
    match zone {
        TimeZoneMode::Utc => instant.format(CTIME_FORMAT).to_string(),
        TimeZoneMode::Local => instant.with_timezone(&Local).format(CTIME_FORMAT).to_string(),
    }
}

/// Reorder a `ctime` string to put the year first and drop the weekday
///
/// `Mon Mar 13 09:23:21 2017` becomes `2017 Mar 13 09:23:21`. Strings that
/// do not have a weekday and year token are returned unchanged.
pub fn year_first(display: &str) -> String {
    let Some((_weekday, rest)) = display.split_once(' ') else {
        return display.to_string();
    };
    match rest.rsplit_once(' ') {
        Some((date_time, year)) => format!("{} {}", year, date_time),
        None => display.to_string(),
    }
}
