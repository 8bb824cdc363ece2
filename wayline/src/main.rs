use jiff::civil::Time;
use tracing::{Level, info, warn};
use wayline_matrix_providers::distance_matrix_api::DistanceMatrixClientParams;
use wayline_matrix_providers::travel_estimate_client::{
    TravelEstimateClient, TravelEstimateProvider,
};
use wayline_planner::error::PlanError;
use wayline_planner::planner::{DayPlanner, PlanRequest};
use wayline_planner::stop::Stop;

fn provider_from_env() -> TravelEstimateProvider {
    match std::env::var("WAYLINE_DISTANCE_MATRIX_KEY") {
        Ok(api_key) if !api_key.is_empty() => TravelEstimateProvider::DistanceMatrixApi {
            params: DistanceMatrixClientParams::new(api_key),
        },
        _ => {
            warn!("WAYLINE_DISTANCE_MATRIX_KEY is not set, using as-the-crow-flies estimates");
            TravelEstimateProvider::AsTheCrowFlies { speed_kmh: 40.0 }
        }
    }
}

fn sample_day() -> Result<PlanRequest, PlanError> {
    // A field day around Brussels with two appointments.
    let stops = vec![
        Stop::builder("client-ixelles")
            .with_name("Ixelles site survey")
            .with_coordinates(50.8333, 4.3667)
            .with_duration_minutes(30)
            .with_buffer_minutes(15)
            .with_fixed_time_str("09:00")?
            .build(),
        Stop::builder("supplier-anderlecht")
            .with_name("Anderlecht supplier pickup")
            .with_coordinates(50.8365, 4.3126)
            .with_duration_minutes(20)
            .with_buffer_minutes(10)
            .build(),
        Stop::builder("client-schaerbeek")
            .with_name("Schaerbeek maintenance visit")
            .with_coordinates(50.8676, 4.3737)
            .with_duration_minutes(45)
            .with_buffer_minutes(10)
            .build(),
        Stop::builder("client-uccle")
            .with_name("Uccle inspection")
            .with_coordinates(50.8003, 4.3361)
            .with_duration_minutes(15)
            .with_fixed_time_str("14:00")?
            .build(),
    ];

    Ok(PlanRequest {
        stops,
        start_time: Time::constant(8, 30, 0, 0),
        return_destination: Some(
            Stop::builder("office")
                .with_name("Office")
                .with_coordinates(50.8503, 4.3517)
                .build(),
        ),
    })
}

#[tokio::main]
async fn main() {
    dotenvy::from_filename("./.env.local").ok();
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let estimator = TravelEstimateClient::new(provider_from_env());
    let planner = DayPlanner::new(estimator);

    let request = match sample_day() {
        Ok(request) => request,
        Err(error) => {
            warn!(%error, "invalid sample day");
            return;
        }
    };

    match planner.plan(request).await {
        Ok(plan) => {
            for stop in &plan.ordered_stops {
                info!(id = stop.id(), name = stop.name().unwrap_or(""), "stop");
            }
            for segment in &plan.segments {
                info!(
                    from = segment.from.id(),
                    to = segment.to.id(),
                    departure = %segment.departure_time.strftime("%H:%M"),
                    arrival = %segment.arrival_time.strftime("%H:%M"),
                    km = segment.travel_km,
                    "segment"
                );
            }
            for conflict in &plan.conflicts.conflicts {
                warn!(
                    stop_id = %conflict.stop_id,
                    minutes_over = conflict.minutes_over,
                    "{}",
                    conflict.message
                );
            }
            info!(
                distance_km = plan.totals.distance_km_with_return(),
                duration_minutes = plan.totals.duration_minutes_with_return(),
                "plan totals"
            );
        }
        Err(error) => warn!(%error, "planning failed"),
    }
}
