//! Overtime classification.
//!
//! Turns a worked interval into runs of typed, multiplier-tagged overtime.
//!
//! ## Rules
//!
//! 1. When a resolved schedule is given and its date is an ordinary working
//!    day (a configured working weekday that is not a holiday), the scheduled
//!    window is removed from the interval. On rest days every minute counts.
//! 2. What remains is cut at midnight and at the night-band edges.
//! 3. Each segment is typed from its own date: a holiday gives `FESTIVA` at
//!    the holiday multiplier, otherwise a Sunday gives `DOMINICAL`, otherwise
//!    the band gives `DIURNA` or `NOCTURNA`.
//! 4. Adjacent segments with the same type and multiplier are merged into
//!    one run.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::LedgerPolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, OvertimeKind, ResolvedSchedule};

use super::holiday_calendar::HolidayCalendar;
use super::segmentation::{TimeBand, TimeSegment, segment_interval};

/// The policy and calendar a classification runs against.
#[derive(Debug, Clone, Copy)]
pub struct OvertimeRules<'a> {
    /// Multipliers, night band and working days.
    pub policy: &'a LedgerPolicy,
    /// Holiday snapshot.
    pub calendar: &'a HolidayCalendar,
}

impl OvertimeRules<'_> {
    /// Returns true if the resolved schedule is ordinary time on `date`.
    pub fn is_ordinary_day(&self, date: NaiveDate) -> bool {
        self.policy.is_working_day(date.weekday()) && !self.calendar.is_holiday(date)
    }
}

/// One contiguous run of overtime with a single type and multiplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedRun {
    /// Run start.
    pub start: NaiveDateTime,
    /// Run end.
    pub end: NaiveDateTime,
    /// Calendar date of the run start.
    pub date: NaiveDate,
    /// Worked minutes (sum of the rounded segment minutes).
    pub minutes: i64,
    /// The run type.
    pub kind: OvertimeKind,
    /// The run multiplier.
    pub multiplier: Decimal,
}

impl ClassifiedRun {
    /// `minutes / 60`.
    pub fn computed_hours(&self) -> Decimal {
        Decimal::from(self.minutes) / Decimal::from(60)
    }

    /// `computed_hours * multiplier`.
    pub fn equivalent_hours(&self) -> Decimal {
        self.computed_hours() * self.multiplier
    }
}

/// The runs found in an interval plus the audit trail that produced them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalClassification {
    /// Runs in chronological order.
    pub runs: Vec<ClassifiedRun>,
    /// One step per classified segment.
    pub audit_steps: Vec<AuditStep>,
}

impl IntervalClassification {
    /// Sum of equivalent hours over all runs.
    pub fn total_equivalent_hours(&self) -> Decimal {
        self.runs.iter().map(ClassifiedRun::equivalent_hours).sum()
    }
}

/// The parts of `[start, end)` that are overtime under `schedule`.
///
/// Without a schedule, or when the schedule date is not an ordinary working
/// day, the whole interval is returned.
pub fn overtime_windows(
    start: NaiveDateTime,
    end: NaiveDateTime,
    schedule: Option<&ResolvedSchedule>,
    rules: &OvertimeRules<'_>,
) -> Vec<(NaiveDateTime, NaiveDateTime)> {
    let schedule = match schedule {
        Some(schedule) if rules.is_ordinary_day(schedule.date) => schedule,
        _ => return vec![(start, end)],
    };

    let scheduled_start = schedule.entry_at();
    let scheduled_end = schedule.exit_at();
    let mut windows = Vec::with_capacity(2);

    let before_end = end.min(scheduled_start);
    if start < before_end {
        windows.push((start, before_end));
    }

    let after_start = start.max(scheduled_end);
    if after_start < end {
        windows.push((after_start, end));
    }

    windows
}

/// Classifies the overtime in `[start, end)`.
///
/// # Errors
///
/// `InvalidInterval` when `end <= start`.
///
/// # Example
///
/// ```
/// use time_ledger::calculation::{classify_interval, HolidayCalendar, OvertimeRules};
/// use time_ledger::config::LedgerPolicy;
/// use time_ledger::models::OvertimeKind;
/// use chrono::NaiveDateTime;
/// use rust_decimal::Decimal;
///
/// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
/// let policy = LedgerPolicy::default();
/// let calendar = HolidayCalendar::default();
/// let rules = OvertimeRules { policy: &policy, calendar: &calendar };
///
/// // Monday 19:00 to 23:00: two hours of day overtime, two of night overtime
/// let result = classify_interval(at("2025-01-06 19:00:00"), at("2025-01-06 23:00:00"), None, &rules)
///     .unwrap();
/// assert_eq!(result.runs.len(), 2);
/// assert_eq!(result.runs[0].kind, OvertimeKind::Day);
/// assert_eq!(result.runs[1].kind, OvertimeKind::Night);
/// assert_eq!(result.runs[1].equivalent_hours(), Decimal::new(35, 1));
/// ```
pub fn classify_interval(
    start: NaiveDateTime,
    end: NaiveDateTime,
    schedule: Option<&ResolvedSchedule>,
    rules: &OvertimeRules<'_>,
) -> EngineResult<IntervalClassification> {
    if end <= start {
        return Err(EngineError::InvalidInterval {
            start,
            end,
            message: "interval must have positive length".to_string(),
        });
    }

    let mut result = IntervalClassification::default();
    let mut step_number: u32 = 1;

    for (window_start, window_end) in overtime_windows(start, end, schedule, rules) {
        let mut previous: Option<ClassifiedRun> = None;

        for segment in segment_interval(window_start, window_end, &rules.policy.night_window) {
            let (kind, multiplier, step) = classify_segment(&segment, rules, step_number);
            result.audit_steps.push(step);
            step_number += 1;

            previous = match previous {
                Some(mut run)
                    if run.end == segment.start
                        && run.kind == kind
                        && run.multiplier == multiplier =>
                {
                    run.end = segment.end;
                    run.minutes += segment.minutes;
                    Some(run)
                }
                other => {
                    result.runs.extend(other);
                    Some(ClassifiedRun {
                        start: segment.start,
                        end: segment.end,
                        date: segment.start.date(),
                        minutes: segment.minutes,
                        kind,
                        multiplier,
                    })
                }
            };
        }

        result.runs.extend(previous);
    }

    Ok(result)
}

/// Types one segment and records the decision.
fn classify_segment(
    segment: &TimeSegment,
    rules: &OvertimeRules<'_>,
    step_number: u32,
) -> (OvertimeKind, Decimal, AuditStep) {
    let date = segment.start.date();
    let classification = rules.calendar.classify_date(date);
    let multipliers = &rules.policy.multipliers;

    let (kind, multiplier, rule_id, rule_name, reasoning) = if classification.is_holiday {
        (
            OvertimeKind::Holiday,
            classification.multiplier,
            "holiday_overtime",
            "Holiday Overtime",
            format!(
                "{} is the holiday '{}': {}x",
                date,
                classification.holiday_name.as_deref().unwrap_or_default(),
                classification.multiplier.normalize()
            ),
        )
    } else if classification.is_sunday {
        (
            OvertimeKind::Sunday,
            multipliers.dominical,
            "sunday_overtime",
            "Sunday Overtime",
            format!("{} is a Sunday: {}x", date, multipliers.dominical.normalize()),
        )
    } else {
        match segment.band {
            TimeBand::Night => (
                OvertimeKind::Night,
                multipliers.nocturna,
                "night_overtime",
                "Night Overtime",
                format!(
                    "{} to {} falls in the night band: {}x",
                    segment.start.time(),
                    segment.end.time(),
                    multipliers.nocturna.normalize()
                ),
            ),
            TimeBand::Day => (
                OvertimeKind::Day,
                multipliers.diurna,
                "day_overtime",
                "Day Overtime",
                format!(
                    "{} to {} on an ordinary day: {}x",
                    segment.start.time(),
                    segment.end.time(),
                    multipliers.diurna.normalize()
                ),
            ),
        }
    };

    let hours = Decimal::from(segment.minutes) / Decimal::from(60);
    let step = AuditStep {
        step_number,
        rule_id: rule_id.to_string(),
        rule_name: rule_name.to_string(),
        input: json!({
            "date": date.to_string(),
            "start": segment.start.to_string(),
            "end": segment.end.to_string(),
            "minutes": segment.minutes,
            "band": segment.band.to_string(),
            "is_holiday": classification.is_holiday,
            "is_sunday": classification.is_sunday,
        }),
        output: json!({
            "type": kind.to_string(),
            "multiplier": multiplier.normalize().to_string(),
            "equivalent_hours": (hours * multiplier).round_dp(4).normalize().to_string(),
        }),
        reasoning,
    };

    (kind, multiplier, step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Holiday, ScheduleSource};
    use chrono::NaiveTime;
    use std::str::FromStr;

    fn make_datetime(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn schedule_on(date: &str) -> ResolvedSchedule {
        ResolvedSchedule {
            date: make_date(date),
            entry_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            exit_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            tolerance_minutes: 10,
            requires_justification: false,
            source: ScheduleSource::Global,
        }
    }

    fn calendar_with(date: &str, multiplier: &str) -> HolidayCalendar {
        HolidayCalendar::new(vec![Holiday {
            date: make_date(date),
            name: "Test Holiday".to_string(),
            irrenunciable: false,
            multiplier: dec(multiplier),
        }])
    }

    fn classify(
        start: &str,
        end: &str,
        schedule: Option<&ResolvedSchedule>,
        calendar: &HolidayCalendar,
    ) -> EngineResult<IntervalClassification> {
        let policy = LedgerPolicy::default();
        let rules = OvertimeRules {
            policy: &policy,
            calendar,
        };
        classify_interval(make_datetime(start), make_datetime(end), schedule, &rules)
    }

    // ==========================================================================
    // OT-001: evening overtime after a weekday schedule
    // ==========================================================================
    #[test]
    fn test_ot_001_evening_after_schedule() {
        // Monday 2025-01-06, scheduled 09:00-18:00, worked 09:00-20:00
        let schedule = schedule_on("2025-01-06");
        let result = classify(
            "2025-01-06 09:00:00",
            "2025-01-06 20:00:00",
            Some(&schedule),
            &HolidayCalendar::default(),
        )
        .unwrap();

        assert_eq!(result.runs.len(), 1);
        let run = &result.runs[0];
        assert_eq!(run.kind, OvertimeKind::Day);
        assert_eq!(run.start, make_datetime("2025-01-06 18:00:00"));
        assert_eq!(run.minutes, 120);
        assert_eq!(run.multiplier, dec("1.5"));
        assert_eq!(run.equivalent_hours(), dec("3.0"));
    }

    // ==========================================================================
    // OT-002: interval fully inside the schedule yields nothing
    // ==========================================================================
    #[test]
    fn test_ot_002_inside_schedule_no_runs() {
        let schedule = schedule_on("2025-01-06");
        let result = classify(
            "2025-01-06 09:30:00",
            "2025-01-06 17:30:00",
            Some(&schedule),
            &HolidayCalendar::default(),
        )
        .unwrap();
        assert!(result.runs.is_empty());
        assert!(result.audit_steps.is_empty());
    }

    // ==========================================================================
    // OT-003: early arrival and late departure give two separate runs
    // ==========================================================================
    #[test]
    fn test_ot_003_before_and_after_schedule() {
        let schedule = schedule_on("2025-01-07");
        let result = classify(
            "2025-01-07 07:00:00",
            "2025-01-07 19:00:00",
            Some(&schedule),
            &HolidayCalendar::default(),
        )
        .unwrap();

        assert_eq!(result.runs.len(), 2);
        assert_eq!(result.runs[0].end, make_datetime("2025-01-07 09:00:00"));
        assert_eq!(result.runs[0].minutes, 120);
        assert_eq!(result.runs[1].start, make_datetime("2025-01-07 18:00:00"));
        assert_eq!(result.runs[1].minutes, 60);
    }

    // ==========================================================================
    // OT-004: crossing into the night band
    // ==========================================================================
    #[test]
    fn test_ot_004_day_then_night() {
        let schedule = schedule_on("2025-01-06");
        let result = classify(
            "2025-01-06 09:00:00",
            "2025-01-06 23:00:00",
            Some(&schedule),
            &HolidayCalendar::default(),
        )
        .unwrap();

        let kinds: Vec<OvertimeKind> = result.runs.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![OvertimeKind::Day, OvertimeKind::Night]);
        assert_eq!(result.runs[0].minutes, 180);
        assert_eq!(result.runs[1].minutes, 120);
        assert_eq!(result.runs[1].multiplier, dec("1.75"));
        assert_eq!(result.total_equivalent_hours(), dec("8.0"));
    }

    // ==========================================================================
    // OT-005: night run across an ordinary midnight stays one run
    // ==========================================================================
    #[test]
    fn test_ot_005_night_across_midnight_merges() {
        // Tuesday 22:00 to Wednesday 02:00
        let result = classify(
            "2025-01-07 22:00:00",
            "2025-01-08 02:00:00",
            None,
            &HolidayCalendar::default(),
        )
        .unwrap();

        assert_eq!(result.runs.len(), 1);
        assert_eq!(result.runs[0].kind, OvertimeKind::Night);
        assert_eq!(result.runs[0].minutes, 240);
        assert_eq!(result.runs[0].date, make_date("2025-01-07"));
        assert_eq!(result.audit_steps.len(), 2);
    }

    // ==========================================================================
    // OT-006: Saturday night into Sunday splits at midnight
    // ==========================================================================
    #[test]
    fn test_ot_006_saturday_night_into_sunday() {
        let result = classify(
            "2025-01-04 22:00:00",
            "2025-01-05 02:00:00",
            None,
            &HolidayCalendar::default(),
        )
        .unwrap();

        assert_eq!(result.runs.len(), 2);
        assert_eq!(result.runs[0].kind, OvertimeKind::Night);
        assert_eq!(result.runs[0].minutes, 120);
        assert_eq!(result.runs[1].kind, OvertimeKind::Sunday);
        assert_eq!(result.runs[1].multiplier, dec("2.0"));
        assert_eq!(result.runs[1].date, make_date("2025-01-05"));
    }

    // ==========================================================================
    // OT-007: Sunday work ignores the schedule
    // ==========================================================================
    #[test]
    fn test_ot_007_sunday_counts_every_minute() {
        let schedule = schedule_on("2025-01-05");
        let result = classify(
            "2025-01-05 09:00:00",
            "2025-01-05 13:00:00",
            Some(&schedule),
            &HolidayCalendar::default(),
        )
        .unwrap();

        assert_eq!(result.runs.len(), 1);
        assert_eq!(result.runs[0].kind, OvertimeKind::Sunday);
        assert_eq!(result.runs[0].minutes, 240);
        assert_eq!(result.runs[0].equivalent_hours(), dec("8.0"));
    }

    // ==========================================================================
    // OT-008: holiday overrides the band and the schedule
    // ==========================================================================
    #[test]
    fn test_ot_008_weekday_holiday() {
        // Thursday 2025-05-01
        let calendar = calendar_with("2025-05-01", "1.75");
        let schedule = schedule_on("2025-05-01");
        let result = classify(
            "2025-05-01 10:00:00",
            "2025-05-01 22:00:00",
            Some(&schedule),
            &calendar,
        )
        .unwrap();

        // Day and night segments share type and multiplier, so they merge
        assert_eq!(result.runs.len(), 1);
        assert_eq!(result.runs[0].kind, OvertimeKind::Holiday);
        assert_eq!(result.runs[0].minutes, 720);
        assert_eq!(result.runs[0].multiplier, dec("1.75"));
        assert_eq!(result.audit_steps.len(), 2);
        assert_eq!(result.audit_steps[0].rule_id, "holiday_overtime");
    }

    // ==========================================================================
    // OT-009: Sunday holiday keeps the holiday multiplier
    // ==========================================================================
    #[test]
    fn test_ot_009_sunday_holiday_not_stacked() {
        // 2025-06-29 is a Sunday
        let calendar = calendar_with("2025-06-29", "1.75");
        let result = classify("2025-06-29 10:00:00", "2025-06-29 12:00:00", None, &calendar)
            .unwrap();

        assert_eq!(result.runs[0].kind, OvertimeKind::Holiday);
        assert_eq!(result.runs[0].multiplier, dec("1.75"));
        assert_eq!(result.runs[0].equivalent_hours(), dec("3.5"));
    }

    // ==========================================================================
    // OT-010: invalid intervals
    // ==========================================================================
    #[test]
    fn test_ot_010_zero_and_negative_intervals_rejected() {
        let calendar = HolidayCalendar::default();
        for (start, end) in [
            ("2025-01-06 18:00:00", "2025-01-06 18:00:00"),
            ("2025-01-06 18:00:00", "2025-01-06 17:00:00"),
        ] {
            match classify(start, end, None, &calendar) {
                Err(EngineError::InvalidInterval { .. }) => {}
                other => panic!("Expected InvalidInterval, got {:?}", other),
            }
        }
    }

    // ==========================================================================
    // OT-011: Saturday is a rest day under the default policy
    // ==========================================================================
    #[test]
    fn test_ot_011_saturday_rest_day() {
        let schedule = schedule_on("2025-01-04");
        let result = classify(
            "2025-01-04 10:00:00",
            "2025-01-04 14:00:00",
            Some(&schedule),
            &HolidayCalendar::default(),
        )
        .unwrap();
        assert_eq!(result.runs.len(), 1);
        assert_eq!(result.runs[0].kind, OvertimeKind::Day);
        assert_eq!(result.runs[0].minutes, 240);
    }

    #[test]
    fn test_audit_step_records_inputs_and_outputs() {
        let result = classify(
            "2025-01-06 19:00:00",
            "2025-01-06 20:30:00",
            None,
            &HolidayCalendar::default(),
        )
        .unwrap();

        let step = &result.audit_steps[0];
        assert_eq!(step.step_number, 1);
        assert_eq!(step.rule_id, "day_overtime");
        assert_eq!(step.input["minutes"].as_i64().unwrap(), 90);
        assert_eq!(step.output["type"].as_str().unwrap(), "DIURNA");
        assert_eq!(step.output["multiplier"].as_str().unwrap(), "1.5");
        assert_eq!(step.output["equivalent_hours"].as_str().unwrap(), "2.25");
        assert!(step.reasoning.contains("1.5x"));
    }

    #[test]
    fn test_windows_without_schedule_is_whole_interval() {
        let policy = LedgerPolicy::default();
        let calendar = HolidayCalendar::default();
        let rules = OvertimeRules {
            policy: &policy,
            calendar: &calendar,
        };
        let start = make_datetime("2025-01-06 08:00:00");
        let end = make_datetime("2025-01-06 10:00:00");
        assert_eq!(overtime_windows(start, end, None, &rules), vec![(start, end)]);
    }
}
