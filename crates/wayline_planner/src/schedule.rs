use jiff::civil::Time;
use wayline_matrix_providers::travel_estimate_client::TravelEstimateClient;

use crate::clock::minutes;
use crate::estimate::estimate_between;
use crate::segment::Segment;
use crate::stop::Stop;

/// Walks an ordered stop sequence and derives one segment per consecutive
/// pair. The conflict detector re-runs the same clock walk over the emitted
/// segments; the two must never diverge.
pub struct ScheduleBuilder<'a> {
    estimator: &'a TravelEstimateClient,
}

impl<'a> ScheduleBuilder<'a> {
    pub fn new(estimator: &'a TravelEstimateClient) -> Self {
        ScheduleBuilder { estimator }
    }

    pub async fn build(&self, stops: &[Stop], start_time: Time) -> Vec<Segment> {
        let mut segments = Vec::new();

        let Some(first) = stops.first() else {
            return segments;
        };

        // A fixed first stop overrides the nominal start time.
        let mut clock = first.fixed_time().unwrap_or(start_time);

        for pair in stops.windows(2) {
            let (from, to) = (&pair[0], &pair[1]);
            let estimate = estimate_between(self.estimator, from, to).await;

            let departure = clock.saturating_add(minutes(from.on_site_minutes() as f64));
            let estimated_arrival = departure.saturating_add(minutes(estimate.duration_minutes));

            // Arriving before a fixed slot means waiting for it.
            let arrival = match to.fixed_time() {
                Some(fixed) if fixed > estimated_arrival => fixed,
                _ => estimated_arrival,
            };

            segments.push(Segment {
                from: from.clone(),
                to: to.clone(),
                travel_km: estimate.distance_km,
                travel_minutes: estimate.duration_minutes,
                departure_time: departure,
                arrival_time: arrival,
            });

            clock = arrival;
        }

        segments
    }
}
