use serde::Serialize;
use wayline_matrix_providers::travel_estimate::TravelEstimate;
use wayline_matrix_providers::travel_estimate_client::TravelEstimateClient;

use crate::estimate::estimate_between;
use crate::segment::Segment;
use crate::stop::Stop;

/// Estimates the leg back to an end-of-day destination.
pub struct ReturnTripCalculator<'a> {
    estimator: &'a TravelEstimateClient,
}

impl<'a> ReturnTripCalculator<'a> {
    pub fn new(estimator: &'a TravelEstimateClient) -> Self {
        ReturnTripCalculator { estimator }
    }

    /// None when either endpoint is missing. A zero estimate when an
    /// endpoint exists but has no coordinates, like any other leg.
    pub async fn estimate_return(
        &self,
        last_stop: Option<&Stop>,
        return_destination: Option<&Stop>,
    ) -> Option<TravelEstimate> {
        let (last_stop, return_destination) = (last_stop?, return_destination?);
        Some(estimate_between(self.estimator, last_stop, return_destination).await)
    }
}

/// Itinerary totals. The return leg is carried separately from the base
/// itinerary so callers can present either figure.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PlanTotals {
    pub distance_km: f64,
    /// Travel plus on-site time and buffers.
    pub duration_minutes: f64,
    pub return_distance_km: Option<f64>,
    pub return_duration_minutes: Option<f64>,
}

impl PlanTotals {
    pub fn compute(
        stops: &[Stop],
        segments: &[Segment],
        return_leg: Option<&TravelEstimate>,
    ) -> Self {
        let travel_minutes: f64 = segments.iter().map(|segment| segment.travel_minutes).sum();
        let on_site_minutes: i64 = stops.iter().map(|stop| stop.on_site_minutes()).sum();

        PlanTotals {
            distance_km: segments.iter().map(|segment| segment.travel_km).sum(),
            duration_minutes: travel_minutes + on_site_minutes as f64,
            return_distance_km: return_leg.map(|leg| leg.distance_km),
            return_duration_minutes: return_leg.map(|leg| leg.duration_minutes),
        }
    }

    pub fn distance_km_with_return(&self) -> f64 {
        self.distance_km + self.return_distance_km.unwrap_or(0.0)
    }

    pub fn duration_minutes_with_return(&self) -> f64 {
        self.duration_minutes + self.return_duration_minutes.unwrap_or(0.0)
    }
}
