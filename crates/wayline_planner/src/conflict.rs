use fxhash::{FxHashMap, FxHashSet};
use jiff::civil::Time;
use serde::Serialize;

use crate::clock::{format_hm, minutes, whole_minutes};
use crate::segment::Segment;
use crate::stop::Stop;

/// Lateness beyond this many minutes escalates from warning to error.
pub const LATE_ARRIVAL_ERROR_THRESHOLD_MINUTES: i64 = 15;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    LateArrival,
    Overlap,
    InsufficientBuffer,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

/// A derived, immutable fact about one schedule instance. Recomputed from
/// scratch on every detect call, never patched incrementally.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub severity: Severity,
    pub stop_id: String,
    pub message: String,
    /// Signed magnitude: positive minutes late, negative minutes short.
    pub minutes_over: i64,
}

#[derive(Serialize, Debug, Clone, Default)]
pub struct ConflictSummary {
    pub has_conflicts: bool,
    pub total_conflicts: usize,
    pub errors: usize,
    pub warnings: usize,
    pub conflicts: Vec<Conflict>,
    pub affected_stop_ids: FxHashSet<String>,
}

impl ConflictSummary {
    fn from_conflicts(conflicts: Vec<Conflict>) -> Self {
        let errors = conflicts
            .iter()
            .filter(|conflict| conflict.severity == Severity::Error)
            .count();
        let affected_stop_ids = conflicts
            .iter()
            .map(|conflict| conflict.stop_id.clone())
            .collect();

        ConflictSummary {
            has_conflicts: !conflicts.is_empty(),
            total_conflicts: conflicts.len(),
            errors,
            warnings: conflicts.len() - errors,
            conflicts,
            affected_stop_ids,
        }
    }
}

/// Re-walks a built schedule and reports everything that makes it
/// infeasible or risky. Side-effect free; safe to call after every edit.
pub struct ConflictDetector;

impl ConflictDetector {
    pub fn detect(stops: &[Stop], segments: &[Segment], start_time: Time) -> ConflictSummary {
        if stops.is_empty() {
            return ConflictSummary::default();
        }

        let mut conflicts = Vec::new();

        Self::detect_late_arrivals(stops, segments, start_time, &mut conflicts);
        Self::detect_overlaps(stops, &mut conflicts);
        Self::detect_insufficient_buffers(stops, &mut conflicts);

        ConflictSummary::from_conflicts(conflicts)
    }

    /// Same clock walk as ScheduleBuilder::build, reusing the travel
    /// minutes already stored on the segments.
    fn detect_late_arrivals(
        stops: &[Stop],
        segments: &[Segment],
        start_time: Time,
        conflicts: &mut Vec<Conflict>,
    ) {
        let mut clock = start_time;

        if let Some(first_fixed) = stops[0].fixed_time() {
            if first_fixed < clock {
                conflicts.push(Conflict {
                    kind: ConflictKind::LateArrival,
                    severity: Severity::Error,
                    stop_id: stops[0].id().to_string(),
                    message: format!(
                        "start time {} is after fixed time {}",
                        format_hm(start_time),
                        format_hm(first_fixed)
                    ),
                    minutes_over: whole_minutes(clock.duration_since(first_fixed)),
                });
            }
            clock = first_fixed;
        }

        for (index, pair) in stops.windows(2).enumerate() {
            let Some(segment) = segments.get(index) else {
                continue;
            };
            let (from, to) = (&pair[0], &pair[1]);

            let departure = clock.saturating_add(minutes(from.on_site_minutes() as f64));
            let arrival = departure.saturating_add(minutes(segment.travel_minutes));

            match to.fixed_time() {
                Some(fixed) => {
                    if arrival > fixed {
                        let minutes_late = whole_minutes(arrival.duration_since(fixed));
                        let severity = if minutes_late > LATE_ARRIVAL_ERROR_THRESHOLD_MINUTES {
                            Severity::Error
                        } else {
                            Severity::Warning
                        };
                        conflicts.push(Conflict {
                            kind: ConflictKind::LateArrival,
                            severity,
                            stop_id: to.id().to_string(),
                            message: format!(
                                "will arrive {} minutes late (at {}) for fixed time {}",
                                minutes_late,
                                format_hm(arrival),
                                format_hm(fixed)
                            ),
                            minutes_over: minutes_late,
                        });
                    }
                    clock = arrival.max(fixed);
                }
                None => clock = arrival,
            }
        }
    }

    /// Every member of a group sharing one fixed time gets an error.
    fn detect_overlaps(stops: &[Stop], conflicts: &mut Vec<Conflict>) {
        let mut groups: FxHashMap<Time, Vec<&Stop>> = FxHashMap::default();
        for stop in stops {
            if let Some(fixed) = stop.fixed_time() {
                groups.entry(fixed).or_default().push(stop);
            }
        }

        let mut groups: Vec<(Time, Vec<&Stop>)> = groups.into_iter().collect();
        groups.sort_by_key(|(time, _)| *time);

        for (time, members) in groups {
            if members.len() < 2 {
                continue;
            }
            for stop in members {
                conflicts.push(Conflict {
                    kind: ConflictKind::Overlap,
                    severity: Severity::Error,
                    stop_id: stop.id().to_string(),
                    message: format!("multiple stops scheduled at {}", format_hm(time)),
                    minutes_over: 0,
                });
            }
        }
    }

    /// Adjacent fixed-time stops, in fixed-time order, need enough room for
    /// the earlier stop's service and buffer. A zero-or-negative gap is the
    /// overlap check's business and is not reported twice.
    fn detect_insufficient_buffers(stops: &[Stop], conflicts: &mut Vec<Conflict>) {
        let mut fixed: Vec<(Time, &Stop)> = stops
            .iter()
            .filter_map(|stop| stop.fixed_time().map(|time| (time, stop)))
            .collect();
        fixed.sort_by_key(|(time, _)| *time);

        for pair in fixed.windows(2) {
            let (current_time, current) = (pair[0].0, pair[0].1);
            let (next_time, _) = (pair[1].0, pair[1].1);

            let gap = whole_minutes(next_time.duration_since(current_time));
            let required = current.on_site_minutes();

            if gap > 0 && gap < required {
                conflicts.push(Conflict {
                    kind: ConflictKind::InsufficientBuffer,
                    severity: Severity::Warning,
                    stop_id: current.id().to_string(),
                    message: format!(
                        "only {} minutes before the next appointment (need {})",
                        gap, required
                    ),
                    minutes_over: gap - required,
                });
            }
        }
    }
}
