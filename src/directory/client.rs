//! HTTP implementation of the device directory
//!
//! Talks JSON to the remote device store with reqwest. A non-success status
//! is reported as [`DashboardError::HttpStatus`] instead of being decoded.
//! List responses are decoded record by record; records that do not decode
//! are skipped with a warning.

use crate::directory::DeviceDirectory;
use crate::error::{DashboardError, Result};
use crate::model::{Device, DeviceFields, NewStatusLog, StatusLog};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Default mock store URL
pub const DEFAULT_API_URL: &str = "https://68ccf3ebda4697a7f30411aa.mockapi.io";

/// Device directory backed by the remote REST store
#[derive(Debug, Clone)]
pub struct HttpDirectory {
    http: Client,
    base_url: String,
}

impl HttpDirectory {
    /// Create a client for `base_url`. Requests never time out unless
    /// `timeout` is set.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(DashboardError::config(format!(
                "API URL must start with http:// or https://: {}",
                base_url
            )));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| DashboardError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// URL of one device record. The ID is percent-encoded as a single path
    /// segment; IDs a URL parser would collapse (`.`, `..`, empty) match no
    /// record.
    fn device_url(&self, id: &str) -> Result<String> {
        if matches!(id, "" | "." | "..") {
            return Err(DashboardError::DeviceNotFound(id.to_string()));
        }
        Ok(self.url(&format!("/devices/{}", urlencoding::encode(id))))
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        debug!(%method, url, "device store request");
        self.http.request(method, url)
    }

    /// Send and check the status, returning the raw body
    async fn execute(&self, request: RequestBuilder, url: &str) -> Result<Vec<u8>> {
        let response = request
            .send()
            .await
            .map_err(|e| DashboardError::transport(url, e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| DashboardError::transport(url, e.to_string()))?;

        if !status.is_success() {
            return Err(DashboardError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(body.to_vec())
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder, url: &str) -> Result<T> {
        let body = self.execute(request, url).await?;
        serde_json::from_slice(&body).map_err(|e| DashboardError::decode(url, e.to_string()))
    }

    /// Fetch a JSON array and decode each element on its own, skipping the
    /// ones that do not decode.
    async fn send_list<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &str,
        kind: &str,
    ) -> Result<Vec<T>> {
        let records: Vec<Value> = self.send_json(request, url).await?;
        Ok(decode_records(records, kind))
    }
}

/// Decode every record that fits `T`, logging and dropping the rest
fn decode_records<T: DeserializeOwned>(records: Vec<Value>, kind: &str) -> Vec<T> {
    let mut decoded = Vec::with_capacity(records.len());
    for record in records {
        let id = match record.get("id") {
            Some(Value::String(id)) => id.clone(),
            Some(other) => other.to_string(),
            None => String::from("?"),
        };
        match serde_json::from_value(record) {
            Ok(value) => decoded.push(value),
            Err(e) => warn!(kind, record_id = %id, error = %e, "Skipping store record"),
        }
    }
    decoded
}

fn not_found_by_id<T>(result: Result<T>, id: &str) -> Result<T> {
    match result {
        Err(DashboardError::HttpStatus { status: 404, .. }) => {
            Err(DashboardError::DeviceNotFound(id.to_string()))
        }
        other => other,
    }
}

#[async_trait]
impl DeviceDirectory for HttpDirectory {
    async fn list_devices(&self) -> Result<Vec<Device>> {
        let url = self.url("/devices");
        self.send_list(self.request(Method::GET, &url), &url, "device")
            .await
    }

    async fn get_device(&self, id: &str) -> Result<Device> {
        let url = self.device_url(id)?;
        not_found_by_id(self.send_json(self.request(Method::GET, &url), &url).await, id)
    }

    async fn create_device(&self, fields: &DeviceFields) -> Result<Device> {
        let url = self.url("/devices");
        let request = self.request(Method::POST, &url).json(fields);
        self.send_json(request, &url).await
    }

    async fn update_device(&self, id: &str, fields: &DeviceFields) -> Result<Device> {
        let url = self.device_url(id)?;
        let request = self.request(Method::PUT, &url).json(fields);
        not_found_by_id(self.send_json(request, &url).await, id)
    }

    async fn delete_device(&self, id: &str) -> Result<()> {
        let url = self.device_url(id)?;
        let result = self.execute(self.request(Method::DELETE, &url), &url).await;
        not_found_by_id(result, id).map(|_| ())
    }

    async fn list_recent_logs(&self, limit: usize) -> Result<Vec<StatusLog>> {
        let url = self.url(&format!(
            "/status_logs?sortBy=timestamp&order=desc&limit={}",
            limit
        ));
        self.send_list(self.request(Method::GET, &url), &url, "status log")
            .await
    }

    async fn append_log(&self, entry: &NewStatusLog) -> Result<StatusLog> {
        let url = self.url("/status_logs");
        let request = self.request(Method::POST, &url).json(entry);
        self.send_json(request, &url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalized() {
        let dir = HttpDirectory::new("http://localhost:3000/", None).unwrap();
        assert_eq!(dir.base_url(), "http://localhost:3000");
        assert_eq!(dir.url("/devices"), "http://localhost:3000/devices");
    }

    #[test]
    fn test_rejects_non_http_url() {
        assert!(matches!(
            HttpDirectory::new("ftp://store", None),
            Err(DashboardError::ConfigError(_))
        ));
    }

    #[test]
    fn test_device_url_encodes_id() {
        let dir = HttpDirectory::new("http://store", None).unwrap();
        assert_eq!(dir.device_url("4").unwrap(), "http://store/devices/4");
        assert_eq!(
            dir.device_url("../status_logs").unwrap(),
            "http://store/devices/..%2Fstatus_logs"
        );
        assert_eq!(dir.device_url("7?x=1").unwrap(), "http://store/devices/7%3Fx%3D1");
        assert!(matches!(dir.device_url(".."), Err(DashboardError::DeviceNotFound(_))));
        assert!(matches!(dir.device_url(""), Err(DashboardError::DeviceNotFound(_))));
    }

    #[test]
    fn test_decode_records_skips_bad_entries() {
        let records = vec![
            serde_json::json!({"id": "1", "name": "Lamp", "type": "light", "status": "on", "location": "Lab"}),
            serde_json::json!({"id": "2", "name": "Door", "type": "door", "location": "Lab"}),
            serde_json::json!({"id": "3", "name": "Fan", "type": "fan", "status": "on", "location": "Lab"}),
        ];
        let devices: Vec<Device> = decode_records(records, "device");
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].id, "1");
    }
}
