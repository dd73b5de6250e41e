//! HTTP gateway integration for gridded daily datasets.

use chrono::NaiveDate;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tracing::debug;

use crate::data::provider::SeriesProvider;
use crate::domain::{Coordinate, Revision, RevisionSeries};
use crate::error::TermError;

const ENV_GATEWAY_URL: &str = "CLIMATE_GATEWAY_URL";
const ENV_GATEWAY_TOKEN: &str = "CLIMATE_GATEWAY_TOKEN";

/// Blocking client for a dataset gateway.
///
/// Endpoints (relative to the base URL):
/// - `GET /datasets/{dataset}/revisions?lat=..&lon=..`
/// - `GET /datasets/{dataset}/series?lat=..&lon=..&revision=..`
pub struct HttpProvider {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpProvider {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Build from `CLIMATE_GATEWAY_URL` / `CLIMATE_GATEWAY_TOKEN` (`.env` honored).
    pub fn from_env() -> Result<Self, TermError> {
        dotenvy::dotenv().ok();
        let base_url = std::env::var(ENV_GATEWAY_URL)
            .map_err(|_| TermError::Config(format!("Missing {ENV_GATEWAY_URL} in environment (.env).")))?;
        let token = std::env::var(ENV_GATEWAY_TOKEN).ok().filter(|t| !t.is_empty());
        Ok(Self::new(base_url, token))
    }

    fn get(&self, dataset: &str, endpoint: &str, coordinate: Coordinate) -> RequestBuilder {
        let url = format!("{}/datasets/{dataset}/{endpoint}", self.base_url);
        let req = self.client.get(url).query(&[
            ("lat", coordinate.lat.to_string()),
            ("lon", coordinate.lon.to_string()),
        ]);
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    fn send(
        &self,
        req: RequestBuilder,
        dataset: &str,
        coordinate: Coordinate,
        revision: Option<&Revision>,
    ) -> Result<Response, TermError> {
        let resp = req
            .send()
            .map_err(|e| TermError::Transport(format!("request failed: {e}")))?;

        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let body: ErrorBody = resp.json().unwrap_or_default();
        Err(map_gateway_error(status.as_u16(), &body, dataset, coordinate, revision))
    }
}

impl SeriesProvider for HttpProvider {
    fn revision_chain(&self, coordinate: Coordinate, dataset: &str) -> Result<Vec<Revision>, TermError> {
        let req = self.get(dataset, "revisions", coordinate);
        let body: RevisionsResponse = self
            .send(req, dataset, coordinate, None)?
            .json()
            .map_err(|e| TermError::DataMalformed(format!("failed to parse revision list: {e}")))?;
        debug!(dataset, revisions = ?body.revisions, "fetched revision chain");
        Ok(body.revisions.into_iter().map(Revision).collect())
    }

    fn fetch_series(
        &self,
        coordinate: Coordinate,
        dataset: &str,
        revision: &Revision,
    ) -> Result<RevisionSeries, TermError> {
        let req = self
            .get(dataset, "series", coordinate)
            .query(&[("revision", revision.as_str())]);
        let body: ObservationsResponse = self
            .send(req, dataset, coordinate, Some(revision))?
            .json()
            .map_err(|e| TermError::DataMalformed(format!("failed to parse series response: {e}")))?;

        let series = parse_observations(body.observations)?;
        debug!(dataset, %revision, days = series.len(), "fetched series");
        Ok(series)
    }
}

#[derive(Debug, Deserialize)]
struct RevisionsResponse {
    revisions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    message: String,
}

fn map_gateway_error(
    status: u16,
    body: &ErrorBody,
    dataset: &str,
    coordinate: Coordinate,
    revision: Option<&Revision>,
) -> TermError {
    let dataset = dataset.to_string();
    match body.error.as_str() {
        "dataset_not_found" => TermError::DatasetNotFound(dataset),
        "coordinate_out_of_range" => TermError::CoordinateOutOfRange {
            dataset,
            lat: coordinate.lat,
            lon: coordinate.lon,
        },
        "coordinate_not_found" => TermError::CoordinateNotFound {
            dataset,
            lat: coordinate.lat,
            lon: coordinate.lon,
        },
        "revision_not_found" => TermError::UnknownRevision {
            dataset,
            revision: revision.map(Revision::to_string).unwrap_or_default(),
        },
        _ if body.message.is_empty() => TermError::Transport(format!("status {status}")),
        _ => TermError::Transport(format!("status {status}: {}", body.message)),
    }
}

fn parse_observations(observations: Vec<Observation>) -> Result<RevisionSeries, TermError> {
    let mut out = Vec::with_capacity(observations.len());
    for obs in observations {
        let date = NaiveDate::parse_from_str(obs.date.trim(), "%Y-%m-%d")
            .map_err(|e| TermError::DataMalformed(format!("invalid date '{}': {e}", obs.date)))?;
        let value = parse_value(&obs.value).ok_or_else(|| {
            TermError::DataMalformed(format!("non-numeric value '{}' on {date}", obs.value))
        })?;
        out.push((date, value));
    }
    RevisionSeries::from_observations(out)
}

fn parse_value(raw: &str) -> Option<f64> {
    let v = raw.trim().parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
