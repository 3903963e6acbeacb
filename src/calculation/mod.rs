//! Calculation logic for the time and pay ledger.
//!
//! Everything in this module is pure: holiday lookups, schedule resolution,
//! lateness and attendance pairing, interval segmentation, overtime
//! classification and business-day counting. The engine loads state from
//! the store and passes it in.

mod attendance;
mod business_days;
mod holiday_calendar;
mod overtime_classifier;
mod schedule_resolver;
mod segmentation;

pub use attendance::{minutes_late, pair_attendance};
pub use business_days::count_business_days;
pub use holiday_calendar::HolidayCalendar;
pub use overtime_classifier::{
    ClassifiedRun, IntervalClassification, OvertimeRules, classify_interval, overtime_windows,
};
pub use schedule_resolver::resolve_schedule;
pub use segmentation::{TimeBand, TimeSegment, segment_interval};
