use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    as_the_crow_flies::{DEFAULT_AVERAGE_SPEED_KMH, as_the_crow_flies_estimate},
    distance_matrix_api::{DistanceMatrixClient, DistanceMatrixClientParams, LookupOutcome},
    rate_limit::RateLimiter,
    retry::RetryPolicy,
    travel_estimate::TravelEstimate,
};

#[derive(Deserialize, Serialize)]
pub enum TravelEstimateProvider {
    /// Remote distance-matrix backend. Degrades to the geometric fallback
    /// on any non-success response.
    DistanceMatrixApi {
        params: DistanceMatrixClientParams,
    },
    AsTheCrowFlies {
        speed_kmh: f64,
    },
    /// Every pair gets the same estimate. For tests.
    Fixed {
        estimate: TravelEstimate,
    },
}

enum ProviderState {
    Remote(DistanceMatrixClient),
    AsTheCrowFlies { speed_kmh: f64 },
    Fixed { estimate: TravelEstimate },
}

pub struct TravelEstimateClient {
    provider: ProviderState,
    fallback_speed_kmh: f64,
    rate_limiter: Arc<RateLimiter>,
    retry: RetryPolicy,
}

impl TravelEstimateClient {
    pub fn new(provider: TravelEstimateProvider) -> Self {
        let provider = match provider {
            TravelEstimateProvider::DistanceMatrixApi { params } => {
                ProviderState::Remote(DistanceMatrixClient::new(params))
            }
            TravelEstimateProvider::AsTheCrowFlies { speed_kmh } => {
                ProviderState::AsTheCrowFlies { speed_kmh }
            }
            TravelEstimateProvider::Fixed { estimate } => ProviderState::Fixed { estimate },
        };

        TravelEstimateClient {
            provider,
            fallback_speed_kmh: DEFAULT_AVERAGE_SPEED_KMH,
            rate_limiter: Arc::new(RateLimiter::default()),
            retry: RetryPolicy::default(),
        }
    }

    /// Share one limiter between clients to keep the process-wide spacing.
    pub fn with_rate_limiter(mut self, rate_limiter: Arc<RateLimiter>) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_fallback_speed(mut self, speed_kmh: f64) -> Self {
        self.fallback_speed_kmh = speed_kmh;
        self
    }

    pub async fn estimate(&self, from: geo::Point, to: geo::Point) -> TravelEstimate {
        match &self.provider {
            ProviderState::Remote(client) => self.remote_estimate(client, from, to).await,
            ProviderState::AsTheCrowFlies { speed_kmh } => {
                as_the_crow_flies_estimate(from, to, *speed_kmh)
            }
            ProviderState::Fixed { estimate } => *estimate,
        }
    }

    async fn remote_estimate(
        &self,
        client: &DistanceMatrixClient,
        from: geo::Point,
        to: geo::Point,
    ) -> TravelEstimate {
        for attempt in 0..self.retry.max_attempts {
            self.rate_limiter.acquire().await;

            match client.lookup(from, to).await {
                LookupOutcome::Success(estimate) => return estimate,
                LookupOutcome::Permanent(error) => {
                    warn!(%error, "distance matrix lookup failed, using as-the-crow-flies estimate");
                    break;
                }
                LookupOutcome::Retryable(error) => {
                    warn!(%error, attempt, "transient distance matrix failure");
                    if attempt + 1 < self.retry.max_attempts {
                        tokio::time::sleep(self.retry.backoff(attempt)).await;
                    }
                }
            }
        }

        as_the_crow_flies_estimate(from, to, self.fallback_speed_kmh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_provider_returns_constant_estimate() {
        let estimate = TravelEstimate {
            distance_km: 5.0,
            duration_minutes: 10.0,
        };
        let client = TravelEstimateClient::new(TravelEstimateProvider::Fixed { estimate });

        let a = geo::Point::new(4.34878, 50.85045);
        let b = geo::Point::new(5.56749, 50.63373);

        assert_eq!(client.estimate(a, b).await, estimate);
        assert_eq!(client.estimate(b, a).await, estimate);
    }

    #[tokio::test]
    async fn test_as_the_crow_flies_provider_matches_fallback() {
        let client =
            TravelEstimateClient::new(TravelEstimateProvider::AsTheCrowFlies { speed_kmh: 40.0 });

        let a = geo::Point::new(4.34878, 50.85045);
        let b = geo::Point::new(4.40346, 51.21989);

        let estimate = client.estimate(a, b).await;
        let expected = as_the_crow_flies_estimate(a, b, 40.0);

        assert_eq!(estimate, expected);
    }
}
