use tracing::debug;
use wayline_matrix_providers::travel_estimate_client::TravelEstimateClient;

use crate::estimate::estimate_between;
use crate::stop::Stop;

/// Orders a stop set into a visiting sequence: fixed-time stops anchor the
/// route in time order, flexible stops fill the gaps nearest-first. Always
/// returns a permutation of the input, never a globally optimal tour.
pub struct RouteOptimizer<'a> {
    estimator: &'a TravelEstimateClient,
}

impl<'a> RouteOptimizer<'a> {
    pub fn new(estimator: &'a TravelEstimateClient) -> Self {
        RouteOptimizer { estimator }
    }

    pub async fn optimize(&self, stops: &[Stop]) -> Vec<Stop> {
        // No reordering benefit below three stops.
        if stops.len() <= 2 {
            return stops.to_vec();
        }

        let (mut fixed, flexible): (Vec<Stop>, Vec<Stop>) = stops
            .iter()
            .cloned()
            .partition(|stop| stop.fixed_time().is_some());

        // Stable sort: equal fixed times keep input order.
        fixed.sort_by_key(|stop| stop.fixed_time());

        if flexible.is_empty() {
            return fixed;
        }
        if fixed.is_empty() {
            return self.nearest_neighbor_chain(flexible).await;
        }

        self.interleave(fixed, flexible).await
    }

    /// Classic nearest-neighbor starting from the first input stop.
    async fn nearest_neighbor_chain(&self, mut remaining: Vec<Stop>) -> Vec<Stop> {
        let mut ordered = Vec::with_capacity(remaining.len());
        ordered.push(remaining.remove(0));

        while !remaining.is_empty() {
            let index = self.nearest_index(ordered.last(), &remaining).await;
            ordered.push(remaining.remove(index));
        }

        ordered
    }

    /// Fixed stops anchor the sequence; flexible stops are distributed
    /// around them with a rough proportional quota per gap, and whatever is
    /// left after the last anchor is appended nearest-first.
    async fn interleave(&self, fixed: Vec<Stop>, flexible: Vec<Stop>) -> Vec<Stop> {
        let fixed_total = fixed.len();
        let flexible_total = flexible.len();

        let mut ordered = Vec::with_capacity(fixed_total + flexible_total);
        let mut remaining = flexible;

        for (anchor_index, anchor) in fixed.into_iter().enumerate() {
            if anchor_index == 0 {
                let quota = flexible_total / (fixed_total + 1);
                while !remaining.is_empty() && ordered.len() < quota {
                    let index = self.nearest_index(ordered.last(), &remaining).await;
                    ordered.push(remaining.remove(index));
                }
            }

            ordered.push(anchor);

            if !remaining.is_empty() && anchor_index < fixed_total - 1 {
                let quota = remaining.len().div_ceil(fixed_total - anchor_index);
                let mut added = 0;
                while !remaining.is_empty() && added < quota {
                    let index = self.nearest_index(ordered.last(), &remaining).await;
                    ordered.push(remaining.remove(index));
                    added += 1;
                }
            }
        }

        while !remaining.is_empty() {
            let index = self.nearest_index(ordered.last(), &remaining).await;
            ordered.push(remaining.remove(index));
        }

        debug!(
            stops = ordered.len(),
            fixed = fixed_total,
            "interleaved fixed and flexible stops"
        );

        ordered
    }

    /// Index of the candidate nearest to `current`. Ties keep the first
    /// candidate encountered; with no current position every candidate is
    /// equally near, so the pick follows input order.
    async fn nearest_index(&self, current: Option<&Stop>, candidates: &[Stop]) -> usize {
        let Some(current) = current else {
            return 0;
        };

        let mut nearest_index = 0;
        let mut nearest_km = f64::INFINITY;

        for (index, candidate) in candidates.iter().enumerate() {
            let estimate = estimate_between(self.estimator, current, candidate).await;
            if estimate.distance_km < nearest_km {
                nearest_km = estimate.distance_km;
                nearest_index = index;
            }
        }

        nearest_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{self, ids};

    const LAT: f64 = 50.85045;

    fn flexible_at(id: &str, lng_offset: f64) -> Stop {
        test_utils::visit(id, LAT, 4.0 + lng_offset)
    }

    #[tokio::test]
    async fn test_two_stops_are_returned_unchanged() {
        let client = test_utils::crow_flies_client();
        let optimizer = RouteOptimizer::new(&client);
        let stops = vec![flexible_at("b", 0.5), flexible_at("a", 0.0)];

        let ordered = optimizer.optimize(&stops).await;

        assert_eq!(ids(&ordered), vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_nearest_neighbor_orders_by_proximity() {
        let client = test_utils::crow_flies_client();
        let optimizer = RouteOptimizer::new(&client);
        // Start is the first input stop; the rest lie along one parallel.
        let stops = vec![
            flexible_at("start", 0.0),
            flexible_at("far", 0.03),
            flexible_at("near", 0.01),
            flexible_at("mid", 0.02),
        ];

        let ordered = optimizer.optimize(&stops).await;

        assert_eq!(ids(&ordered), vec!["start", "near", "mid", "far"]);
    }

    #[tokio::test]
    async fn test_equal_distances_keep_input_order() {
        let client = test_utils::fixed_client(1.0, 2.0);
        let optimizer = RouteOptimizer::new(&client);
        let stops = vec![
            flexible_at("a", 0.0),
            flexible_at("b", 0.3),
            flexible_at("c", 0.1),
            flexible_at("d", 0.2),
        ];

        let ordered = optimizer.optimize(&stops).await;

        assert_eq!(ids(&ordered), vec!["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn test_all_fixed_are_sorted_by_time() {
        let client = test_utils::crow_flies_client();
        let optimizer = RouteOptimizer::new(&client);
        let stops = vec![
            test_utils::appointment("late", LAT, 4.0, "14:00"),
            test_utils::appointment("early", LAT, 4.1, "09:00"),
            test_utils::appointment("noon", LAT, 4.2, "12:00"),
        ];

        let ordered = optimizer.optimize(&stops).await;

        assert_eq!(ids(&ordered), vec!["early", "noon", "late"]);
    }

    #[tokio::test]
    async fn test_mixed_keeps_fixed_order_and_every_stop() {
        let client = test_utils::crow_flies_client();
        let optimizer = RouteOptimizer::new(&client);
        let stops = vec![
            flexible_at("f1", 0.01),
            test_utils::appointment("a2", LAT, 4.3, "15:00"),
            flexible_at("f2", 0.25),
            test_utils::appointment("a1", LAT, 4.1, "10:00"),
            flexible_at("f3", 0.12),
        ];

        let ordered = optimizer.optimize(&stops).await;

        assert_eq!(ordered.len(), stops.len());

        let position = |id: &str| ordered.iter().position(|s| s.id() == id).unwrap();
        assert!(position("a1") < position("a2"));

        let mut expected_ids: Vec<&str> = stops.iter().map(|s| s.id()).collect();
        let mut ordered_ids = ids(&ordered);
        expected_ids.sort_unstable();
        ordered_ids.sort_unstable();
        assert_eq!(ordered_ids, expected_ids);
    }

    #[tokio::test]
    async fn test_single_flexible_lands_between_anchors() {
        let client = test_utils::crow_flies_client();
        let optimizer = RouteOptimizer::new(&client);
        let stops = vec![
            test_utils::appointment("a", LAT, 4.0, "09:00"),
            flexible_at("b", 0.05),
            test_utils::appointment("c", LAT, 4.2, "11:00"),
        ];

        let ordered = optimizer.optimize(&stops).await;

        assert_eq!(ids(&ordered), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_permutation_is_preserved_with_many_stops() {
        let client = test_utils::crow_flies_client();
        let optimizer = RouteOptimizer::new(&client);
        let mut stops = Vec::new();
        for index in 0..8 {
            stops.push(flexible_at(&format!("f{index}"), index as f64 * 0.017));
        }
        stops.push(test_utils::appointment("a0", LAT, 4.05, "11:30"));
        stops.push(test_utils::appointment("a1", LAT, 4.11, "08:45"));

        let ordered = optimizer.optimize(&stops).await;

        let mut expected_ids: Vec<&str> = stops.iter().map(|s| s.id()).collect();
        let mut ordered_ids = ids(&ordered);
        expected_ids.sort_unstable();
        ordered_ids.sort_unstable();
        assert_eq!(ordered_ids, expected_ids);
    }
}
