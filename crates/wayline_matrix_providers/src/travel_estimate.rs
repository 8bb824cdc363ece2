use serde::{Deserialize, Serialize};

/// A single travel-leg estimate between two points.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct TravelEstimate {
    pub distance_km: f64,
    pub duration_minutes: f64,
}

impl TravelEstimate {
    pub const ZERO: TravelEstimate = TravelEstimate {
        distance_km: 0.0,
        duration_minutes: 0.0,
    };
}
