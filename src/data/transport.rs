//! Blocking HTTP seam used by `FredClient`.
//!
//! The client only needs "GET this URL with these query pairs and give me the
//! status and body", so that is all the trait exposes. Tests mock it; the
//! binary uses reqwest.

use reqwest::blocking::Client;

use crate::error::AppError;

/// Status code and body text of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait HttpTransport {
    /// Perform a GET request. Only failures to obtain a response are errors;
    /// non-2xx statuses are returned as data.
    fn get(&self, url: &str, query: &[(String, String)]) -> Result<RawResponse, AppError>;
}

/// `reqwest` blocking transport.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self { client: Client::new() }
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: &str, query: &[(String, String)]) -> Result<RawResponse, AppError> {
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .map_err(|e| AppError::Transport {
                endpoint: url.to_string(),
                message: e.without_url().to_string(),
            })?;

        let status = resp.status().as_u16();
        let body = resp.text().map_err(|e| AppError::Transport {
            endpoint: url.to_string(),
            message: format!("failed to read response body: {}", e.without_url()),
        })?;

        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_range_is_2xx_only() {
        let ok = |status| RawResponse { status, body: String::new() }.is_success();
        assert!(ok(200));
        assert!(ok(204));
        assert!(ok(299));
        assert!(!ok(199));
        assert!(!ok(301));
        assert!(!ok(404));
        assert!(!ok(500));
    }
}
