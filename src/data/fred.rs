//! FRED API client: raw fetch, series observations, and catalog listings.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::data::credentials::ApiKey;
use crate::data::transport::{HttpTransport, ReqwestTransport};
use crate::domain::{Observation, Release, ReleaseSeries, SeriesRequest, SeriesTable};
use crate::error::AppError;

pub const BASE_URL: &str = "https://api.stlouisfed.org/fred/";
pub const OBSERVATIONS_ENDPOINT: &str = "series/observations";
pub const RELEASES_ENDPOINT: &str = "releases";
pub const RELEASE_SERIES_ENDPOINT: &str = "release/series";

const API_KEY_PARAM: &str = "api_key";
const EXCERPT_CHARS: usize = 200;
const MISSING_VALUE: &str = ".";

pub struct FredClient<T = ReqwestTransport> {
    transport: T,
    base_url: String,
    api_key: ApiKey,
}

impl FredClient<ReqwestTransport> {
    pub fn new(api_key: ApiKey) -> Self {
        Self::with_transport(ReqwestTransport::new(), BASE_URL, api_key)
    }
}

impl<T: HttpTransport> FredClient<T> {
    pub fn with_transport(transport: T, base_url: impl Into<String>, api_key: ApiKey) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            transport,
            base_url,
            api_key,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `base_url + endpoint` with `params` plus the API key and return the
    /// decoded JSON body.
    ///
    /// `params` must not carry `api_key` itself. Non-2xx statuses fail with
    /// [`AppError::RemoteRequest`] and are not retried.
    pub fn fetch(&self, endpoint: &str, params: &BTreeMap<String, String>) -> Result<Value, AppError> {
        if params.contains_key(API_KEY_PARAM) {
            return Err(AppError::InvalidRequest(format!(
                "`{API_KEY_PARAM}` must not be passed as a parameter; the client supplies it"
            )));
        }

        let url = format!("{}{}", self.base_url, endpoint.trim_start_matches('/'));
        debug!(%url, ?params, "FRED request");

        let mut query: Vec<(String, String)> =
            params.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        query.push((API_KEY_PARAM.to_string(), self.api_key.expose().to_string()));

        let resp = self.transport.get(&url, &query)?;

        if !resp.is_success() {
            let excerpt = excerpt(&resp.body);
            warn!(endpoint, status = resp.status, %excerpt, "FRED request failed");
            return Err(AppError::RemoteRequest {
                endpoint: endpoint.to_string(),
                status: resp.status,
                excerpt,
            });
        }

        serde_json::from_str(&resp.body)
            .map_err(|e| AppError::malformed(endpoint, format!("response is not valid JSON: {e}")))
    }

    /// Fetch one series over a date range and return its present observations.
    ///
    /// Records carrying the missing-value marker (or any non-numeric value) are
    /// excluded; payload order does not matter.
    pub fn load_series(&self, request: &SeriesRequest) -> Result<SeriesTable, AppError> {
        if request.start > request.end {
            return Err(AppError::InvalidRequest(format!(
                "observation start {} is after end {}",
                request.start, request.end
            )));
        }

        let mut params = BTreeMap::new();
        params.insert("series_id".to_string(), request.series_id.clone());
        params.insert("observation_start".to_string(), request.start.to_string());
        params.insert("observation_end".to_string(), request.end.to_string());
        params.insert("frequency".to_string(), request.frequency.as_param().to_string());
        params.insert("units".to_string(), request.units.as_param().to_string());
        params.insert("file_type".to_string(), "json".to_string());

        let payload = self.fetch(OBSERVATIONS_ENDPOINT, &params)?;
        let body: ObservationsResponse = decode(OBSERVATIONS_ENDPOINT, payload)?;

        let observations = body
            .observations
            .iter()
            .map(parse_observation)
            .collect::<Result<Vec<_>, _>>()?;

        let total = observations.len();
        let present = observations
            .into_iter()
            .filter_map(|obs| obs.value.map(|v| (obs.date, v)));

        let table = SeriesTable::from_points(&request.series_id, request.units, present).map_err(|date| {
            AppError::malformed(
                OBSERVATIONS_ENDPOINT,
                format!("series {} repeats observation date {date}", request.series_id),
            )
        })?;

        let dropped = total - table.len();
        if dropped > 0 {
            debug!(series = %request.series_id, dropped, "skipped observations without a numeric value");
        }
        info!(series = %request.series_id, rows = table.len(), "loaded series");

        Ok(table)
    }

    /// List all releases.
    pub fn releases(&self) -> Result<Vec<Release>, AppError> {
        let mut params = BTreeMap::new();
        params.insert("file_type".to_string(), "json".to_string());

        let payload = self.fetch(RELEASES_ENDPOINT, &params)?;
        let body: ReleasesResponse = decode(RELEASES_ENDPOINT, payload)?;
        Ok(body.releases)
    }

    /// List the series published under a release.
    pub fn release_series(&self, release_id: u32) -> Result<Vec<ReleaseSeries>, AppError> {
        let mut params = BTreeMap::new();
        params.insert("release_id".to_string(), release_id.to_string());
        params.insert("file_type".to_string(), "json".to_string());

        let payload = self.fetch(RELEASE_SERIES_ENDPOINT, &params)?;
        let body: ReleaseSeriesResponse = decode(RELEASE_SERIES_ENDPOINT, payload)?;
        Ok(body.seriess)
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<RawObservation>,
}

#[derive(Debug, Deserialize)]
struct RawObservation {
    date: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct ReleasesResponse {
    releases: Vec<Release>,
}

#[derive(Debug, Deserialize)]
struct ReleaseSeriesResponse {
    seriess: Vec<ReleaseSeries>,
}

fn decode<R: DeserializeOwned>(endpoint: &str, payload: Value) -> Result<R, AppError> {
    serde_json::from_value(payload).map_err(|e| AppError::malformed(endpoint, e.to_string()))
}

fn parse_observation(raw: &RawObservation) -> Result<Observation, AppError> {
    let date = NaiveDate::parse_from_str(raw.date.trim(), "%Y-%m-%d").map_err(|e| {
        AppError::malformed(OBSERVATIONS_ENDPOINT, format!("invalid date '{}': {e}", raw.date))
    })?;
    Ok(Observation {
        date,
        value: parse_value(&raw.value),
    })
}

fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed == MISSING_VALUE || trimmed.is_empty() {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

/// First `EXCERPT_CHARS` characters of a response body.
fn excerpt(body: &str) -> String {
    body.chars().take(EXCERPT_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::data::transport::{MockHttpTransport, RawResponse};
    use crate::domain::{Frequency, Units};

    fn key() -> ApiKey {
        ApiKey::parse(Some("test-key".into()), "test").unwrap()
    }

    fn client_returning(status: u16, body: String) -> FredClient<MockHttpTransport> {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_get()
            .times(1)
            .returning(move |_, _| Ok(RawResponse { status, body: body.clone() }));
        FredClient::with_transport(transport, BASE_URL, key())
    }

    fn request() -> SeriesRequest {
        SeriesRequest {
            series_id: "CPIAUCSL".into(),
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            frequency: Frequency::M,
            units: Units::Pc1,
        }
    }

    fn d(m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, 1).unwrap()
    }

    #[test]
    fn fetch_injects_key_and_builds_url() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_get()
            .withf(|url, query| {
                url == "https://api.stlouisfed.org/fred/series/observations"
                    && query.iter().any(|(k, v)| k == "api_key" && v == "test-key")
                    && query.iter().any(|(k, v)| k == "series_id" && v == "UNRATE")
            })
            .times(1)
            .returning(|_, _| {
                Ok(RawResponse {
                    status: 200,
                    body: r#"{"ok": true}"#.into(),
                })
            });
        let client = FredClient::with_transport(transport, "https://api.stlouisfed.org/fred", key());

        let mut params = BTreeMap::new();
        params.insert("series_id".to_string(), "UNRATE".to_string());
        let value = client.fetch(OBSERVATIONS_ENDPOINT, &params).unwrap();
        assert_eq!(value, json!({"ok": true}));
    }

    #[test]
    fn fetch_rejects_caller_supplied_key_without_network() {
        let mut transport = MockHttpTransport::new();
        transport.expect_get().times(0);
        let client = FredClient::with_transport(transport, BASE_URL, key());

        let mut params = BTreeMap::new();
        params.insert("api_key".to_string(), "other".to_string());
        let err = client.fetch(OBSERVATIONS_ENDPOINT, &params).unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[test]
    fn fetch_404_is_remote_request_error() {
        let client = client_returning(404, "Not Found".into());
        let err = client.fetch(OBSERVATIONS_ENDPOINT, &BTreeMap::new()).unwrap_err();
        match err {
            AppError::RemoteRequest {
                endpoint,
                status,
                excerpt,
            } => {
                assert_eq!(status, 404);
                assert_eq!(endpoint, OBSERVATIONS_ENDPOINT);
                assert_eq!(excerpt, "Not Found");
            }
            other => panic!("expected RemoteRequest, got {other:?}"),
        }
    }

    #[test]
    fn fetch_error_excerpt_is_truncated_to_200_chars() {
        let body = "é".repeat(500);
        let client = client_returning(500, body);
        let err = client.fetch(OBSERVATIONS_ENDPOINT, &BTreeMap::new()).unwrap_err();
        let AppError::RemoteRequest { excerpt, .. } = err else {
            panic!("expected RemoteRequest");
        };
        assert_eq!(excerpt.chars().count(), 200);
    }

    #[test]
    fn fetch_non_json_success_is_malformed() {
        let client = client_returning(200, "<html>oops</html>".into());
        let err = client.fetch(OBSERVATIONS_ENDPOINT, &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse { .. }));
    }

    #[test]
    fn load_series_sends_expected_parameters() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_get()
            .withf(|_, query| {
                let has = |k: &str, v: &str| query.iter().any(|(qk, qv)| qk == k && qv == v);
                has("series_id", "CPIAUCSL")
                    && has("observation_start", "2024-01-01")
                    && has("observation_end", "2024-12-31")
                    && has("frequency", "m")
                    && has("units", "pc1")
                    && has("file_type", "json")
                    && has("api_key", "test-key")
            })
            .times(1)
            .returning(|_, _| {
                Ok(RawResponse {
                    status: 200,
                    body: r#"{"observations": []}"#.into(),
                })
            });
        let client = FredClient::with_transport(transport, BASE_URL, key());

        let table = client.load_series(&request()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.series_id, "CPIAUCSL");
    }

    #[test]
    fn load_series_excludes_missing_value_marker() {
        let body = json!({
            "observations": [
                {"date": "2024-01-01", "value": "3.1"},
                {"date": "2024-02-01", "value": "."},
                {"date": "2024-03-01", "value": "3.5"}
            ]
        });
        let client = client_returning(200, body.to_string());

        let table = client.load_series(&request()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(&d(1)), Some(3.1));
        assert_eq!(table.get(&d(2)), None);
        assert_eq!(table.get(&d(3)), Some(3.5));
    }

    #[test]
    fn load_series_tolerates_unordered_payload() {
        let body = json!({
            "observations": [
                {"date": "2024-03-01", "value": "3"},
                {"date": "2024-01-01", "value": "1"},
                {"date": "2024-02-01", "value": "2"}
            ]
        });
        let client = client_returning(200, body.to_string());

        let table = client.load_series(&request()).unwrap();
        let dates: Vec<_> = table.iter().map(|(date, _)| date).collect();
        assert_eq!(dates, vec![d(1), d(2), d(3)]);
    }

    #[test]
    fn load_series_rejects_duplicate_dates() {
        let body = json!({
            "observations": [
                {"date": "2024-01-01", "value": "1"},
                {"date": "2024-01-01", "value": "2"}
            ]
        });
        let client = client_returning(200, body.to_string());
        let err = client.load_series(&request()).unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse { .. }));
    }

    #[test]
    fn load_series_missing_observations_is_malformed() {
        let client = client_returning(200, r#"{"error_message": "nope"}"#.into());
        let err = client.load_series(&request()).unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse { .. }));
    }

    #[test]
    fn load_series_bad_date_is_malformed() {
        let body = json!({"observations": [{"date": "01/02/2024", "value": "1"}]});
        let client = client_returning(200, body.to_string());
        let err = client.load_series(&request()).unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse { .. }));
    }

    #[test]
    fn load_series_rejects_inverted_range() {
        let mut transport = MockHttpTransport::new();
        transport.expect_get().times(0);
        let client = FredClient::with_transport(transport, BASE_URL, key());

        let mut req = request();
        std::mem::swap(&mut req.start, &mut req.end);
        assert!(matches!(client.load_series(&req), Err(AppError::InvalidRequest(_))));
    }

    #[test]
    fn releases_and_release_series_decode_catalogs() {
        let client = client_returning(
            200,
            json!({"releases": [{"id": 10, "name": "Consumer Price Index", "press_release": true}]}).to_string(),
        );
        let releases = client.releases().unwrap();
        assert_eq!(releases.len(), 1);
        assert_eq!(releases[0].id, 10);
        assert_eq!(releases[0].name, "Consumer Price Index");

        let client = client_returning(
            200,
            json!({"seriess": [{"id": "CPIAUCSL", "title": "CPI for All Urban Consumers"}]}).to_string(),
        );
        let series = client.release_series(10).unwrap();
        assert_eq!(series[0].id, "CPIAUCSL");
    }

    #[test]
    fn parse_value_handles_sentinels() {
        assert_eq!(parse_value("."), None);
        assert_eq!(parse_value(""), None);
        assert_eq!(parse_value("NaN"), None);
        assert_eq!(parse_value("abc"), None);
        assert_eq!(parse_value(" 4.25 "), Some(4.25));
    }
}
