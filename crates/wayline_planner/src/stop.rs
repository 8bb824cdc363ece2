use fxhash::FxHashSet;
use jiff::civil::Time;
use serde::{Deserialize, Serialize};

use crate::error::PlanError;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Coordinates { lat, lng }
    }

    pub fn point(&self) -> geo::Point {
        geo::Point::new(self.lng, self.lat)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StopKind {
    #[default]
    OpenVisit,
    Appointment,
}

/// A visit-stop supplied by the caller. Identity (`id`) is caller-assigned
/// and stable across optimize/build/detect calls within a planning session.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Stop {
    id: String,
    name: Option<String>,
    coordinates: Option<Coordinates>,
    duration_minutes: i64,
    buffer_minutes: i64,
    fixed_time: Option<Time>,
    kind: StopKind,
    notes: Option<String>,
}

impl Stop {
    pub fn builder(id: impl Into<String>) -> StopBuilder {
        StopBuilder {
            stop: Stop {
                id: id.into(),
                name: None,
                coordinates: None,
                duration_minutes: 0,
                buffer_minutes: 0,
                fixed_time: None,
                kind: StopKind::default(),
                notes: None,
            },
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        self.coordinates
    }

    pub fn point(&self) -> Option<geo::Point> {
        self.coordinates.map(|coordinates| coordinates.point())
    }

    pub fn duration_minutes(&self) -> i64 {
        self.duration_minutes
    }

    pub fn buffer_minutes(&self) -> i64 {
        self.buffer_minutes
    }

    /// Time spent at the stop before departing: service plus buffer.
    pub fn on_site_minutes(&self) -> i64 {
        self.duration_minutes + self.buffer_minutes
    }

    pub fn fixed_time(&self) -> Option<Time> {
        self.fixed_time
    }

    pub fn kind(&self) -> StopKind {
        self.kind
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

pub struct StopBuilder {
    stop: Stop,
}

impl StopBuilder {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.stop.name = Some(name.into());
        self
    }

    pub fn with_coordinates(mut self, lat: f64, lng: f64) -> Self {
        self.stop.coordinates = Some(Coordinates::new(lat, lng));
        self
    }

    pub fn with_duration_minutes(mut self, minutes: i64) -> Self {
        self.stop.duration_minutes = minutes;
        self
    }

    pub fn with_buffer_minutes(mut self, minutes: i64) -> Self {
        self.stop.buffer_minutes = minutes;
        self
    }

    pub fn with_fixed_time(mut self, time: Time) -> Self {
        self.stop.fixed_time = Some(time);
        self.stop.kind = StopKind::Appointment;
        self
    }

    /// Parses a zero-padded 24-hour HH:mm wall-clock value.
    pub fn with_fixed_time_str(self, value: &str) -> Result<Self, PlanError> {
        let time = Time::strptime("%H:%M", value).map_err(|_| PlanError::InvalidFixedTime {
            stop_id: self.stop.id.clone(),
            value: value.to_string(),
        })?;

        Ok(self.with_fixed_time(time))
    }

    pub fn with_kind(mut self, kind: StopKind) -> Self {
        self.stop.kind = kind;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.stop.notes = Some(notes.into());
        self
    }

    pub fn build(self) -> Stop {
        self.stop
    }
}

/// Boundary validation: malformed stops are rejected before any planning
/// stage runs, never silently coerced.
pub fn validate_stops(stops: &[Stop]) -> Result<(), PlanError> {
    let mut seen_ids = FxHashSet::default();

    for stop in stops {
        if stop.duration_minutes < 0 {
            return Err(PlanError::NegativeDuration {
                stop_id: stop.id.clone(),
                minutes: stop.duration_minutes,
            });
        }
        if stop.buffer_minutes < 0 {
            return Err(PlanError::NegativeBuffer {
                stop_id: stop.id.clone(),
                minutes: stop.buffer_minutes,
            });
        }
        if !seen_ids.insert(stop.id.as_str()) {
            return Err(PlanError::DuplicateStopId(stop.id.clone()));
        }
    }

    Ok(())
}
