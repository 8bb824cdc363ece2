use jiff::civil::Time;
use wayline_matrix_providers::travel_estimate::TravelEstimate;
use wayline_matrix_providers::travel_estimate_client::{
    TravelEstimateClient, TravelEstimateProvider,
};

use crate::stop::Stop;

pub fn crow_flies_client() -> TravelEstimateClient {
    TravelEstimateClient::new(TravelEstimateProvider::AsTheCrowFlies { speed_kmh: 40.0 })
}

pub fn fixed_client(distance_km: f64, duration_minutes: f64) -> TravelEstimateClient {
    TravelEstimateClient::new(TravelEstimateProvider::Fixed {
        estimate: TravelEstimate {
            distance_km,
            duration_minutes,
        },
    })
}

pub fn visit(id: &str, lat: f64, lng: f64) -> Stop {
    Stop::builder(id)
        .with_coordinates(lat, lng)
        .with_duration_minutes(30)
        .with_buffer_minutes(10)
        .build()
}

pub fn appointment(id: &str, lat: f64, lng: f64, fixed_time: &str) -> Stop {
    Stop::builder(id)
        .with_coordinates(lat, lng)
        .with_duration_minutes(30)
        .with_buffer_minutes(10)
        .with_fixed_time_str(fixed_time)
        .unwrap()
        .build()
}

pub fn hm(value: &str) -> Time {
    Time::strptime("%H:%M", value).unwrap()
}

pub fn ids(stops: &[Stop]) -> Vec<&str> {
    stops.iter().map(|stop| stop.id()).collect()
}
