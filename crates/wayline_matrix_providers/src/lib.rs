pub mod as_the_crow_flies;
pub mod distance_matrix_api;
pub mod rate_limit;
pub mod retry;
pub mod travel_estimate;
pub mod travel_estimate_client;
