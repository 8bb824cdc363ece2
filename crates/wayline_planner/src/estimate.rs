use wayline_matrix_providers::travel_estimate::TravelEstimate;
use wayline_matrix_providers::travel_estimate_client::TravelEstimateClient;

use crate::stop::Stop;

/// Travel estimate between two stops. Stops without coordinates cannot be
/// estimated; the zero estimate is a placeholder, not a measurement.
pub async fn estimate_between(
    client: &TravelEstimateClient,
    from: &Stop,
    to: &Stop,
) -> TravelEstimate {
    match (from.point(), to.point()) {
        (Some(from), Some(to)) => client.estimate(from, to).await,
        _ => TravelEstimate::ZERO,
    }
}
