//! Frequency API client.
//!
//! Fetches one reading from the netzfrequenz XML API. Expected payload:
//!
//! ```xml
//! <r>
//!     <f>50.043</f>
//!     <z>2026-02-11T15:05:08+00:00</z>
//! </r>
//! ```

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::SourceConfig;
use crate::policy::Reading;

/// Seconds at or below which a timed-out request earns a configuration hint.
const LOW_TIMEOUT_HINT_SECS: u64 = 3;

/// Error fetching or decoding a frequency reading. Fatal for the run.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP transport failure (connection, TLS, timeout).
    #[error("frequency API request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Non-success HTTP status from the API.
    #[error("frequency API returned non-success status {status}")]
    HttpStatus {
        /// The HTTP status code.
        status: u16,
    },
    /// The payload was not well-formed XML.
    #[error("could not parse frequency API payload: {0}")]
    Parse(String),
    /// An expected element was missing from the payload.
    #[error("frequency API payload is missing the <{0}> element")]
    MissingElement(&'static str),
    /// The frequency element did not contain a finite number.
    #[error("frequency API returned an invalid frequency: {0:?}")]
    InvalidFrequency(String),
}

/// HTTP client for the frequency API.
pub struct FrequencyApi {
    client: reqwest::Client,
    url: String,
    timeout_secs: u64,
}

impl FrequencyApi {
    /// Build a client from config.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Request`] if the HTTP client cannot be
    /// constructed (TLS backend initialisation).
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;
        Ok(Self {
            client,
            url: config.url.clone(),
            timeout_secs: config.request_timeout_secs,
        })
    }

    /// Fetch one reading from the API.
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] on transport failure, non-2xx status, or
    /// a payload that cannot be decoded into a reading.
    pub async fn fetch(&self) -> Result<Reading, SourceError> {
        let response = self.client.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() && self.timeout_secs <= LOW_TIMEOUT_HINT_SECS {
                warn!(
                    timeout_secs = self.timeout_secs,
                    "request timed out; the configured timeout may be too low"
                );
            }
            e
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status));
        }

        let body = response.text().await?;
        debug!(status = %status, bytes = body.len(), url = %self.url, "got frequency API response");

        parse_reading(&body)
    }
}

/// Decode the API's XML payload into a reading.
///
/// Frequency comes from the `<f>` element, timestamp from `<z>`. Both are
/// trimmed; the frequency must parse to a finite float.
///
/// # Errors
///
/// Returns a [`SourceError`] on malformed XML, a missing element, or a
/// non-numeric/non-finite frequency value.
pub fn parse_reading(xml: &str) -> Result<Reading, SourceError> {
    let doc = roxmltree::Document::parse(xml).map_err(|e| SourceError::Parse(e.to_string()))?;

    let raw_frequency = element_text(&doc, "f")?.trim();
    let timestamp = element_text(&doc, "z")?.trim().to_owned();

    let frequency: f64 = raw_frequency
        .parse()
        .map_err(|_| SourceError::InvalidFrequency(raw_frequency.to_owned()))?;
    if !frequency.is_finite() {
        return Err(SourceError::InvalidFrequency(raw_frequency.to_owned()));
    }

    Ok(Reading {
        frequency,
        timestamp,
    })
}

fn element_text<'a>(
    doc: &'a roxmltree::Document<'_>,
    tag: &'static str,
) -> Result<&'a str, SourceError> {
    doc.descendants()
        .find(|n| n.has_tag_name(tag))
        .and_then(|n| n.text())
        .ok_or(SourceError::MissingElement(tag))
}

/// Map a non-success HTTP status to a fetch error.
fn status_error(status: reqwest::StatusCode) -> SourceError {
    SourceError::HttpStatus {
        status: status.as_u16(),
    }
}
