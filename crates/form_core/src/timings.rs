//! Weekly opening hours.
//!
//! Every weekday holds either the single `Closed` sentinel slot or a
//! non-empty list of real ranges. The editing operations below are the only
//! way to change a day, and none of them can produce an empty or mixed list.

use std::collections::BTreeMap;

use chrono::NaiveTime;
use shared::{domain::Weekday, protocol::TimeSlotRecord};

use crate::error::TimingError;

pub const CLOSED: &str = "Closed";
pub const DEFAULT_OPEN: &str = "09:00 AM";
pub const DEFAULT_CLOSE: &str = "06:00 PM";
const TIME_FORMAT: &str = "%I:%M %p";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSlot {
    pub open: String,
    pub close: String,
}

impl TimeSlot {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    pub fn closed() -> Self {
        Self::new(CLOSED, CLOSED)
    }

    pub fn default_open() -> Self {
        Self::new(DEFAULT_OPEN, DEFAULT_CLOSE)
    }

    pub fn is_closed(&self) -> bool {
        self.open == CLOSED
    }

    /// Parsed `(open, close)` times, `None` for the sentinel or bad text.
    pub fn range(&self) -> Option<(NaiveTime, NaiveTime)> {
        Some((parse_clock(&self.open)?, parse_clock(&self.close)?))
    }
}

/// Parses `hh:mm AM` style clock text.
pub fn parse_clock(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text.trim(), TIME_FORMAT).ok()
}

pub fn format_clock(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Parses `hh:mm AM-hh:mm PM`, with or without spaces around the dash.
pub fn parse_clock_range(text: &str) -> Option<(NaiveTime, NaiveTime)> {
    let (start, end) = text.split_once('-')?;
    Some((parse_clock(start)?, parse_clock(end)?))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyTimings {
    days: BTreeMap<Weekday, Vec<TimeSlot>>,
}

impl Default for WeeklyTimings {
    fn default() -> Self {
        Self {
            days: Weekday::ALL
                .into_iter()
                .map(|day| (day, vec![TimeSlot::default_open()]))
                .collect(),
        }
    }
}

impl WeeklyTimings {
    pub fn slots(&self, day: Weekday) -> &[TimeSlot] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_closed(&self, day: Weekday) -> bool {
        matches!(self.slots(day), [only] if only.is_closed())
    }

    pub fn toggle_closed(&mut self, day: Weekday) {
        let next = if self.is_closed(day) {
            vec![TimeSlot::default_open()]
        } else {
            vec![TimeSlot::closed()]
        };
        self.days.insert(day, next);
    }

    /// Appends the default slot to an open day. Closed days are left alone.
    pub fn add_slot(&mut self, day: Weekday) {
        if self.is_closed(day) {
            return;
        }
        self.days
            .entry(day)
            .or_default()
            .push(TimeSlot::default_open());
    }

    /// Removes a slot unless it is the last one of an open day.
    pub fn remove_slot(&mut self, day: Weekday, index: usize) {
        if self.is_closed(day) {
            return;
        }
        if let Some(slots) = self.days.get_mut(&day) {
            if slots.len() > 1 && index < slots.len() {
                slots.remove(index);
            }
        }
    }

    pub fn set_slot(
        &mut self,
        day: Weekday,
        index: usize,
        open: &str,
        close: &str,
    ) -> Result<(), TimingError> {
        if self.is_closed(day) {
            return Err(TimingError::DayClosed { day });
        }
        for value in [open, close] {
            if parse_clock(value).is_none() {
                return Err(TimingError::InvalidTime(value.to_string()));
            }
        }
        let slot = self
            .days
            .get_mut(&day)
            .and_then(|slots| slots.get_mut(index))
            .ok_or(TimingError::NoSuchSlot { day, index })?;
        *slot = TimeSlot::new(open.trim(), close.trim());
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &[TimeSlot])> {
        self.days.iter().map(|(day, slots)| (*day, slots.as_slice()))
    }

    pub fn to_wire(&self) -> BTreeMap<String, Vec<TimeSlotRecord>> {
        self.days
            .iter()
            .map(|(day, slots)| {
                let records = slots
                    .iter()
                    .map(|slot| TimeSlotRecord {
                        open: slot.open.clone(),
                        close: slot.close.clone(),
                    })
                    .collect();
                (day.key().to_string(), records)
            })
            .collect()
    }

    /// Builds timings from backend data, repairing days that break the
    /// closed-or-open invariant. Missing or empty days become closed; a day
    /// mixing the sentinel with real ranges keeps only the ranges.
    pub fn from_wire(raw: &BTreeMap<String, Vec<TimeSlotRecord>>) -> Self {
        let days = Weekday::ALL
            .into_iter()
            .map(|day| {
                let ranges: Vec<TimeSlot> = raw
                    .get(day.key())
                    .into_iter()
                    .flatten()
                    .filter(|record| record.open != CLOSED && record.close != CLOSED)
                    .map(|record| TimeSlot::new(record.open.clone(), record.close.clone()))
                    .collect();
                if ranges.is_empty() {
                    (day, vec![TimeSlot::closed()])
                } else {
                    (day, ranges)
                }
            })
            .collect();
        Self { days }
    }
}
