use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::travel_estimate::TravelEstimate;

pub const DISTANCE_MATRIX_API_URL: &str =
    "https://maps.googleapis.com/maps/api/distancematrix/json";

#[derive(Debug, Error)]
pub enum DistanceMatrixError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request denied: {0}")]
    PermissionDenied(String),

    #[error("query limit exceeded")]
    QuotaExceeded,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("no route found between points")]
    NoRoute,

    #[error("unexpected response status: {0}")]
    Unexpected(String),
}

/// One lookup, already classified for the fallback policy: retryable
/// failures are worth a backoff, permanent ones are not.
#[derive(Debug)]
pub enum LookupOutcome {
    Success(TravelEstimate),
    Retryable(DistanceMatrixError),
    Permanent(DistanceMatrixError),
}

#[derive(Deserialize, Debug, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum ResponseStatus {
    Ok,
    OverQueryLimit,
    RequestDenied,
    InvalidRequest,
    UnknownError,
    #[serde(other)]
    Unknown,
}

#[derive(Deserialize, Debug, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum ElementStatus {
    Ok,
    NotFound,
    ZeroResults,
    #[serde(other)]
    Unknown,
}

#[derive(Deserialize, Debug)]
struct ValueField {
    /// Meters for distances, seconds for durations
    value: f64,
}

#[derive(Deserialize, Debug)]
struct MatrixElement {
    status: ElementStatus,
    distance: Option<ValueField>,
    duration: Option<ValueField>,
}

#[derive(Deserialize, Debug)]
struct MatrixRow {
    elements: Vec<MatrixElement>,
}

#[derive(Deserialize, Debug)]
struct MatrixResponse {
    status: ResponseStatus,
    error_message: Option<String>,
    #[serde(default)]
    rows: Vec<MatrixRow>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct DistanceMatrixClientParams {
    pub api_key: String,
    pub endpoint: String,
}

impl DistanceMatrixClientParams {
    pub fn new(api_key: impl Into<String>) -> Self {
        DistanceMatrixClientParams {
            api_key: api_key.into(),
            endpoint: DISTANCE_MATRIX_API_URL.to_string(),
        }
    }
}

pub struct DistanceMatrixClient {
    params: DistanceMatrixClientParams,
    client: reqwest::Client,
}

impl DistanceMatrixClient {
    pub fn new(params: DistanceMatrixClientParams) -> Self {
        Self {
            params,
            client: reqwest::Client::new(),
        }
    }

    /// A single origin/destination lookup. Never returns a raw error:
    /// every failure mode comes back classified as a `LookupOutcome`.
    pub async fn lookup(&self, from: geo::Point, to: geo::Point) -> LookupOutcome {
        let origins = format!("{},{}", from.y(), from.x());
        let destinations = format!("{},{}", to.y(), to.x());

        let response = match self
            .client
            .get(&self.params.endpoint)
            .query(&[
                ("origins", origins.as_str()),
                ("destinations", destinations.as_str()),
                ("key", self.params.api_key.as_str()),
            ])
            .send()
            .await
        {
            Ok(response) => response,
            Err(error) => return LookupOutcome::Retryable(DistanceMatrixError::Transport(error)),
        };

        let body: MatrixResponse = match response.json().await {
            Ok(body) => body,
            Err(error) => return LookupOutcome::Retryable(DistanceMatrixError::Transport(error)),
        };

        classify_response(body)
    }
}

fn classify_response(body: MatrixResponse) -> LookupOutcome {
    let error_message = body.error_message.unwrap_or_default();

    match body.status {
        ResponseStatus::Ok => {
            let element = body
                .rows
                .into_iter()
                .next()
                .and_then(|row| row.elements.into_iter().next());

            match element {
                Some(MatrixElement {
                    status: ElementStatus::Ok,
                    distance: Some(distance),
                    duration: Some(duration),
                }) => LookupOutcome::Success(TravelEstimate {
                    distance_km: distance.value / 1000.0,
                    duration_minutes: duration.value / 60.0,
                }),
                Some(MatrixElement {
                    status: ElementStatus::NotFound | ElementStatus::ZeroResults,
                    ..
                }) => LookupOutcome::Permanent(DistanceMatrixError::NoRoute),
                _ => LookupOutcome::Retryable(DistanceMatrixError::Unexpected(
                    "missing matrix element".to_string(),
                )),
            }
        }
        ResponseStatus::RequestDenied => {
            LookupOutcome::Permanent(DistanceMatrixError::PermissionDenied(error_message))
        }
        ResponseStatus::InvalidRequest => {
            LookupOutcome::Permanent(DistanceMatrixError::InvalidRequest(error_message))
        }
        ResponseStatus::OverQueryLimit => {
            LookupOutcome::Retryable(DistanceMatrixError::QuotaExceeded)
        }
        ResponseStatus::UnknownError | ResponseStatus::Unknown => {
            LookupOutcome::Retryable(DistanceMatrixError::Unexpected(error_message))
        }
    }
}
