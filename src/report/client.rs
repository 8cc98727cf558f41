use std::time::Duration;
use ureq::Agent;

use crate::config::Connection;
use crate::error::FetchError;
use crate::report::MaintenanceReport;

/// Path of the report endpoint, appended to the configured API URL
pub const REPORT_PATH: &str = "/admin/maintenance-report";

/// Anything the screen can pull a report from
pub trait ReportSource {
    fn fetch(&mut self) -> std::result::Result<MaintenanceReport, FetchError>;
}

/// Blocking HTTP client for the maintenance report endpoint.
///
/// One GET per call: no retries, no backoff.
pub struct ReportClient {
    agent: Agent,
    url: String,
    token: String,
}

impl ReportClient {
    pub fn new(connection: &Connection) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(connection.timeout_secs.map(Duration::from_secs))
            .build()
            .into();

        Self {
            agent,
            url: report_url(&connection.api_url),
            token: connection.token.clone(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ReportSource for ReportClient {
    fn fetch(&mut self) -> std::result::Result<MaintenanceReport, FetchError> {
        log::debug!("GET {}", self.url);

        let mut response = self
            .agent
            .get(&self.url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Content-Type", "application/json")
            .call()
            .map_err(|e| match e {
                ureq::Error::StatusCode(code) => FetchError::Status(code),
                other => FetchError::Transport(other.to_string()),
            })?;

        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        decode_report(&body)
    }
}

/// Join the base URL and the report path, tolerating a trailing slash
pub fn report_url(api_url: &str) -> String {
    format!("{}{}", api_url.trim_end_matches('/'), REPORT_PATH)
}

pub fn decode_report(body: &str) -> std::result::Result<MaintenanceReport, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))
}
