mod clock;

pub mod conflict;
pub mod error;
pub mod estimate;
pub mod optimizer;
pub mod planner;
pub mod return_trip;
pub mod schedule;
pub mod segment;
pub mod session;
pub mod stop;

#[cfg(test)]
pub(crate) mod test_utils;
