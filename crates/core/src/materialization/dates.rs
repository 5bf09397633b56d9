//! Date resolver: maps (week_index, day_of_week, plan setup) to calendar
//! dates.
//!
//! Two anchoring schemes exist. Start-anchored plans count weeks forward
//! from the week containing `start_date`; legacy completion-anchored plans
//! count backward from the week containing `completion_date`. Both operate
//! on calendar day-keys; the athlete's time zone is parsed once from the
//! setup and threaded through explicitly for day-boundary anchoring.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use taper_domain::constants::{MAX_WEEKS_TO_EVENT, MIN_WEEKS_TO_EVENT};
use taper_domain::{PlanSetup, Result, TaperError, WeekStart};

/// Position (0-6) of a raw day-of-week within a week starting on
/// `week_start`.
///
/// `day_of_week` uses the raw 0-6 encoding, 0 = Sunday through
/// 6 = Saturday.
pub fn week_offset(day_of_week: u8, week_start: WeekStart) -> Result<u8> {
    if day_of_week > 6 {
        return Err(TaperError::Validation(format!(
            "day_of_week out of range: {day_of_week}"
        )));
    }

    Ok(match week_start {
        WeekStart::Sunday => day_of_week,
        WeekStart::Monday => (day_of_week + 6) % 7,
    })
}

/// First day of the week containing `date` under the given convention.
pub fn start_of_week(date: NaiveDate, week_start: WeekStart) -> NaiveDate {
    let raw_day = date.weekday().num_days_from_sunday() as u8;
    // raw_day is always 0-6, so the offset lookup cannot fail
    let offset = match week_start {
        WeekStart::Sunday => raw_day,
        WeekStart::Monday => (raw_day + 6) % 7,
    };
    date - Duration::days(i64::from(offset))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WeekAnchor {
    /// Week 0 starts the week containing the plan's start date
    Start(NaiveDate),
    /// Legacy: the final week (index weeks_to_event - 1) is the week
    /// containing the completion date; earlier weeks count backward
    Completion { anchor: NaiveDate, weeks_to_event: u32 },
}

/// Validated, resolvable view of a plan's scheduling setup.
///
/// Construction performs all setup validation: anchor-date presence,
/// `weeks_to_event` bounds, and time-zone parsing. Resolution afterwards is
/// pure date arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanSchedule {
    week_start: WeekStart,
    anchor: WeekAnchor,
    time_zone: Tz,
}

impl PlanSchedule {
    /// Validate a plan setup and build a resolvable schedule from it.
    pub fn from_setup(setup: &PlanSetup) -> Result<Self> {
        let time_zone: Tz = setup.time_zone.parse().map_err(|_| {
            TaperError::Validation(format!("unknown time zone: {}", setup.time_zone))
        })?;

        if !(MIN_WEEKS_TO_EVENT..=MAX_WEEKS_TO_EVENT).contains(&setup.weeks_to_event) {
            return Err(TaperError::Validation(format!(
                "weeks_to_event out of range: {}",
                setup.weeks_to_event
            )));
        }

        let anchor = match (setup.start_date, setup.completion_date) {
            (Some(start), _) => WeekAnchor::Start(start_of_week(start, setup.week_start)),
            (None, Some(completion)) => WeekAnchor::Completion {
                anchor: start_of_week(completion, setup.week_start),
                weeks_to_event: setup.weeks_to_event,
            },
            (None, None) => {
                return Err(TaperError::Validation(
                    "plan setup needs a start date or a completion date".into(),
                ));
            }
        };

        Ok(Self { week_start: setup.week_start, anchor, time_zone })
    }

    /// Resolve a session address to its calendar date.
    ///
    /// Increasing `week_index` by one (same `day_of_week`) always advances
    /// the result by exactly 7 days.
    pub fn resolve(&self, week_index: u32, day_of_week: u8) -> Result<NaiveDate> {
        let offset = week_offset(day_of_week, self.week_start)?;

        let week_boundary = match self.anchor {
            WeekAnchor::Start(anchor) => anchor + Duration::weeks(i64::from(week_index)),
            WeekAnchor::Completion { anchor, weeks_to_event } => {
                let remaining = i64::from(weeks_to_event) - 1 - i64::from(week_index);
                anchor - Duration::weeks(remaining)
            }
        };

        Ok(week_boundary + Duration::days(i64::from(offset)))
    }

    /// The athlete's time zone this schedule was validated against.
    pub fn time_zone(&self) -> Tz {
        self.time_zone
    }

    /// Anchor a resolved day-key to its zone-local start of day.
    ///
    /// On DST-gap days where midnight does not exist, the first valid
    /// instant of the day is used instead.
    pub fn day_start(&self, date: NaiveDate) -> DateTime<Tz> {
        let midnight = date.and_time(NaiveTime::MIN);
        self.time_zone.from_local_datetime(&midnight).earliest().unwrap_or_else(|| {
            self.time_zone
                .from_local_datetime(&(midnight + Duration::hours(1)))
                .earliest()
                .unwrap_or_else(|| self.time_zone.from_utc_datetime(&midnight))
        })
    }
}
