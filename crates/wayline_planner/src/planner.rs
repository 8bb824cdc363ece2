use jiff::civil::Time;
use serde::{Deserialize, Serialize};
use tracing::debug;
use wayline_matrix_providers::travel_estimate::TravelEstimate;
use wayline_matrix_providers::travel_estimate_client::TravelEstimateClient;

use crate::conflict::{ConflictDetector, ConflictSummary};
use crate::error::PlanError;
use crate::optimizer::RouteOptimizer;
use crate::return_trip::{PlanTotals, ReturnTripCalculator};
use crate::schedule::ScheduleBuilder;
use crate::segment::Segment;
use crate::stop::{Stop, validate_stops};

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PlanRequest {
    pub stops: Vec<Stop>,
    pub start_time: Time,
    pub return_destination: Option<Stop>,
}

/// A complete planning result: plain data, recreated on every call and
/// owned by the caller.
#[derive(Serialize, Debug, Clone)]
pub struct Plan {
    pub ordered_stops: Vec<Stop>,
    pub segments: Vec<Segment>,
    pub conflicts: ConflictSummary,
    pub return_leg: Option<TravelEstimate>,
    pub totals: PlanTotals,
}

/// Runs the planning stages in order: validate, optimize, build, detect,
/// return leg, totals. Holds no state besides the estimator.
pub struct DayPlanner {
    estimator: TravelEstimateClient,
}

impl DayPlanner {
    pub fn new(estimator: TravelEstimateClient) -> Self {
        DayPlanner { estimator }
    }

    pub fn estimator(&self) -> &TravelEstimateClient {
        &self.estimator
    }

    pub async fn plan(&self, request: PlanRequest) -> Result<Plan, PlanError> {
        validate_stops(&request.stops)?;
        if let Some(destination) = &request.return_destination {
            validate_stops(std::slice::from_ref(destination))?;
        }

        let ordered_stops = RouteOptimizer::new(&self.estimator)
            .optimize(&request.stops)
            .await;
        let segments = ScheduleBuilder::new(&self.estimator)
            .build(&ordered_stops, request.start_time)
            .await;
        let conflicts = ConflictDetector::detect(&ordered_stops, &segments, request.start_time);
        let return_leg = ReturnTripCalculator::new(&self.estimator)
            .estimate_return(ordered_stops.last(), request.return_destination.as_ref())
            .await;
        let totals = PlanTotals::compute(&ordered_stops, &segments, return_leg.as_ref());

        debug!(
            stops = ordered_stops.len(),
            segments = segments.len(),
            conflicts = conflicts.total_conflicts,
            "plan built"
        );

        Ok(Plan {
            ordered_stops,
            segments,
            conflicts,
            return_leg,
            totals,
        })
    }
}
