use std::time::Duration;

use reqwest::blocking::Client;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::detector::Prediction;

/// Upper bound on one delivery attempt. A stuck backend must not stall the
/// polling loop past this.
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Wire payload for one classification result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert<'a> {
    pub camera_id: &'a str,
    pub alert_type: &'a str,
    pub timestamp: String,
}

/// Wire payload for a unit status line.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusLog<'a> {
    pub camera_id: &'a str,
    pub log: &'a str,
}

/// Why a delivery did not land. The caller logs and discards these;
/// delivery failure never halts the loop.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend answered {0}")]
    Backend(u16),
    #[error("timestamp formatting: {0}")]
    Timestamp(#[from] time::error::Format),
}

/// Anything the polling loop can hand a prediction to.
pub trait AlertSink {
    /// Deliver one classification result, returning the backend's HTTP
    /// status code.
    fn report(&self, verdict: Prediction) -> Result<u16, ReportError>;
}

/// Synchronous JSON reporter for the monitoring backend.
///
/// One POST per call, no retries, no queuing. The camera identity is fixed
/// for the process lifetime; the timestamp is generated at send time.
pub struct AlertReporter {
    client: Client,
    alert_url: String,
    logs_url: Option<String>,
    camera_id: String,
}

impl AlertReporter {
    pub fn new(backend_url: &str, camera_id: &str) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(SEND_TIMEOUT).build()?;
        let alert_url = backend_url.trim_end_matches('/').to_string();
        let logs_url = sibling_logs_url(&alert_url);

        Ok(Self {
            client,
            alert_url,
            logs_url,
            camera_id: camera_id.to_string(),
        })
    }

    /// POST one alert to the backend.
    pub fn send_alert(&self, verdict: Prediction) -> Result<u16, ReportError> {
        let payload = Alert {
            camera_id: &self.camera_id,
            alert_type: verdict.label(),
            timestamp: OffsetDateTime::now_utc().format(&Rfc3339)?,
        };
        self.post(&self.alert_url, &payload)
    }

    /// POST a status line to the logs endpoint, if the backend URL exposes
    /// one. Units configured with a non-standard alert URL skip status
    /// reporting entirely.
    pub fn send_status(&self, line: &str) -> Result<Option<u16>, ReportError> {
        let Some(url) = &self.logs_url else {
            return Ok(None);
        };

        let payload = StatusLog {
            camera_id: &self.camera_id,
            log: line,
        };
        self.post(url, &payload).map(Some)
    }

    fn post<T: Serialize>(&self, url: &str, payload: &T) -> Result<u16, ReportError> {
        let response = self.client.post(url).json(payload).send()?;
        let status = response.status();

        if !status.is_success() {
            return Err(ReportError::Backend(status.as_u16()));
        }
        Ok(status.as_u16())
    }
}

impl AlertSink for AlertReporter {
    fn report(&self, verdict: Prediction) -> Result<u16, ReportError> {
        self.send_alert(verdict)
    }
}

/// Derive the status-log endpoint from the alert endpoint
/// (`.../api/alert` -> `.../api/logs`).
fn sibling_logs_url(alert_url: &str) -> Option<String> {
    alert_url
        .strip_suffix("/alert")
        .map(|base| format!("{}/logs", base))
}
