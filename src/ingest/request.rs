//! The print data job handed to the ingestor.

use serde::Deserialize;
use serde_json::Value;

use super::IngestError;

/// URL of the payload plus the settings blob written for the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    pub file_url: String,
    pub settings: Vec<u8>,
}

#[derive(Deserialize)]
struct Payload {
    file_url: String,
    #[serde(default)]
    settings: Value,
}

impl JobRequest {
    #[must_use]
    pub fn new(file_url: impl Into<String>, settings: impl Into<Vec<u8>>) -> Self {
        Self {
            file_url: file_url.into(),
            settings: settings.into(),
        }
    }

    /// Builds a request from a `print_data` command payload.
    ///
    /// ```
    /// use print_ingest::ingest::JobRequest;
    ///
    /// let job = JobRequest::from_payload_json(
    ///     r#"{"file_url": "http://host/job42.bin", "settings": {"JobName": "bracket"}}"#,
    /// ).unwrap();
    /// assert_eq!(job.file_url, "http://host/job42.bin");
    /// assert_eq!(job.settings, br#"{"JobName":"bracket"}"#);
    /// ```
    ///
    /// A string `settings` value is stored verbatim; any other JSON value is
    /// stored as its compact serialization. A missing value becomes `null`.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Payload`] if the payload is not valid JSON or
    /// lacks `file_url`.
    pub fn from_payload_json(raw: &str) -> Result<Self, IngestError> {
        let payload: Payload = serde_json::from_str(raw).map_err(IngestError::Payload)?;
        let settings = match payload.settings {
            Value::String(text) => text.into_bytes(),
            other => serde_json::to_vec(&other).map_err(IngestError::Payload)?,
        };
        Ok(Self {
            file_url: payload.file_url,
            settings,
        })
    }
}
