use geo::{Distance, Haversine};

use crate::travel_estimate::TravelEstimate;

pub const DEFAULT_AVERAGE_SPEED_KMH: f64 = 40.0;

/// Great-circle estimate at a constant average speed.
/// Deterministic given the two points, no I/O.
pub fn as_the_crow_flies_estimate(
    from: geo::Point,
    to: geo::Point,
    speed_kmh: f64,
) -> TravelEstimate {
    let haversine = Haversine;
    let distance_km = haversine.distance(from, to) / 1000.0;

    TravelEstimate {
        distance_km,
        duration_minutes: distance_km / speed_kmh * 60.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ~1 km due north of the first point
    const ONE_KM_IN_DEGREES_LAT: f64 = 0.008993;

    #[test]
    fn test_symmetry() {
        let brussels = geo::Point::new(4.34878, 50.85045);
        let liege = geo::Point::new(5.56749, 50.63373);

        let there = as_the_crow_flies_estimate(brussels, liege, DEFAULT_AVERAGE_SPEED_KMH);
        let back = as_the_crow_flies_estimate(liege, brussels, DEFAULT_AVERAGE_SPEED_KMH);

        assert!((there.distance_km - back.distance_km).abs() < 1e-9);
        assert!((there.duration_minutes - back.duration_minutes).abs() < 1e-9);
    }

    #[test]
    fn test_one_km_at_default_speed_takes_one_and_a_half_minutes() {
        let from = geo::Point::new(4.34878, 50.85045);
        let to = geo::Point::new(4.34878, 50.85045 + ONE_KM_IN_DEGREES_LAT);

        let estimate = as_the_crow_flies_estimate(from, to, DEFAULT_AVERAGE_SPEED_KMH);

        assert!((estimate.distance_km - 1.0).abs() < 0.01);
        assert!((estimate.duration_minutes - 1.5).abs() < 0.02);
    }

    #[test]
    fn test_zero_distance() {
        let point = geo::Point::new(4.34878, 50.85045);

        let estimate = as_the_crow_flies_estimate(point, point, DEFAULT_AVERAGE_SPEED_KMH);

        assert_eq!(estimate.distance_km, 0.0);
        assert_eq!(estimate.duration_minutes, 0.0);
    }
}
