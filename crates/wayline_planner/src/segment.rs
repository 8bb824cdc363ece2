use jiff::civil::Time;
use serde::{Deserialize, Serialize};

use crate::stop::Stop;

/// One travel leg between consecutive stops of a built schedule.
/// Arrival is never earlier than departure; it may be later than pure
/// travel implies when the destination's fixed time holds it.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Segment {
    pub from: Stop,
    pub to: Stop,
    pub travel_km: f64,
    pub travel_minutes: f64,
    pub departure_time: Time,
    pub arrival_time: Time,
}
