//! Class calendar and schedule date stamping.
//!
//! A class calendar is a set of weekdays on which the course meets, minus
//! a set of break dates (holidays, reading days). Breaks override class
//! days: a date is a class date iff its weekday is a class day AND it is
//! not a break.
//!
//! The semester start and the break dates are resolved elsewhere; this
//! module only walks a date cursor forward through them.

use std::collections::{BTreeSet, HashSet};

use chrono::{Datelike, Days, NaiveDate, Weekday};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::CalendarError;

/// Lookahead bound for [`ClassCalendar::next_valid`], in days.
pub const DEFAULT_MAX_LOOKAHEAD_DAYS: u32 = 366;

/// Format stamped onto each class session, e.g. `Mon 01/13`.
pub const SESSION_DATE_FORMAT: &str = "%a %m/%d";

/// Weekly class days with break dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassCalendar {
    class_days: HashSet<Weekday>,
    breaks: BTreeSet<NaiveDate>,
    max_lookahead_days: u32,
}

impl ClassCalendar {
    /// Creates a calendar meeting on the given weekdays.
    pub fn new(class_days: impl IntoIterator<Item = Weekday>) -> Self {
        Self {
            class_days: class_days.into_iter().collect(),
            breaks: BTreeSet::new(),
            max_lookahead_days: DEFAULT_MAX_LOOKAHEAD_DAYS,
        }
    }

    /// Creates a calendar from weekday names (`"Monday"`, `"wed"`, ...).
    pub fn from_day_names<I, S>(names: I) -> Result<Self, CalendarError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut days = HashSet::new();
        for name in names {
            let name = name.as_ref().trim();
            let day = name
                .parse::<Weekday>()
                .map_err(|_| CalendarError::UnknownWeekday(name.to_string()))?;
            days.insert(day);
        }
        if days.is_empty() {
            return Err(CalendarError::NoClassDays);
        }
        Ok(Self::new(days))
    }

    /// Adds a break date.
    pub fn with_break(mut self, date: NaiveDate) -> Self {
        self.breaks.insert(date);
        self
    }

    /// Adds break dates.
    pub fn with_breaks(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.breaks.extend(dates);
        self
    }

    /// Sets the lookahead bound.
    pub fn with_max_lookahead(mut self, days: u32) -> Self {
        self.max_lookahead_days = days;
        self
    }

    pub fn breaks(&self) -> &BTreeSet<NaiveDate> {
        &self.breaks
    }

    /// Whether the course meets on `date`.
    pub fn is_class_date(&self, date: NaiveDate) -> bool {
        self.class_days.contains(&date.weekday()) && !self.breaks.contains(&date)
    }

    /// First class date at or after `from`.
    ///
    /// Scans at most `max_lookahead_days` days past `from`; a break set that
    /// blocks every class day in that window is a configuration error.
    pub fn next_valid(&self, from: NaiveDate) -> Result<NaiveDate, CalendarError> {
        if self.class_days.is_empty() {
            return Err(CalendarError::NoClassDays);
        }
        let no_date = CalendarError::NoValidDate {
            from,
            lookahead_days: self.max_lookahead_days,
        };
        let mut date = from;
        for _ in 0..=self.max_lookahead_days {
            if self.is_class_date(date) {
                return Ok(date);
            }
            date = date.checked_add_days(Days::new(1)).ok_or(no_date.clone())?;
        }
        Err(no_date)
    }

    /// The next `count` class dates starting at `start`, strictly increasing.
    pub fn session_dates(
        &self,
        start: NaiveDate,
        count: usize,
    ) -> Result<Vec<NaiveDate>, CalendarError> {
        let mut dates = Vec::with_capacity(count);
        let mut cursor = start;
        for _ in 0..count {
            let date = self.next_valid(cursor)?;
            dates.push(date);
            cursor = day_after(date)?;
        }
        Ok(dates)
    }

    /// Stamps every class session in `sections` with a concrete date.
    ///
    /// Sessions are dated in document order from `semester_start`. Sections
    /// without sessions pass through unchanged.
    pub fn adjust(
        &self,
        sections: &[ScheduleSection],
        semester_start: NaiveDate,
    ) -> Result<Vec<ScheduleSection>, CalendarError> {
        let mut cursor = semester_start;
        let mut adjusted = Vec::with_capacity(sections.len());

        for section in sections {
            let mut section = section.clone();
            if let Some(days) = section.days.as_mut() {
                for session in days.iter_mut() {
                    let date = self.next_valid(cursor)?;
                    session.date = Some(date.format(SESSION_DATE_FORMAT).to_string());
                    cursor = day_after(date)?;
                }
            }
            adjusted.push(section);
        }

        Ok(adjusted)
    }
}

fn day_after(date: NaiveDate) -> Result<NaiveDate, CalendarError> {
    date.checked_add_days(Days::new(1))
        .ok_or(CalendarError::NoValidDate {
            from: date,
            lookahead_days: 0,
        })
}

/// One block of the course schedule (a unit, week or module).
///
/// Only `days` is interpreted; every other key is carried through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSection {
    #[serde(flatten)]
    pub fields: IndexMap<String, serde_yaml::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<Vec<ClassSession>>,
}

/// A single class meeting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassSession {
    #[serde(flatten)]
    pub fields: IndexMap<String, serde_yaml::Value>,
    /// Concrete date once adjusted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}
