//! Device directory client
//!
//! Typed access to the remote device store. Every operation is a single
//! round trip; failures propagate to the caller untouched.
//!
//! ## Store Endpoints
//!
//! | Endpoint | Method | Operation |
//! |----------|--------|-----------|
//! | `/devices` | GET | [`DeviceDirectory::list_devices`] |
//! | `/devices/{id}` | GET | [`DeviceDirectory::get_device`] |
//! | `/devices` | POST | [`DeviceDirectory::create_device`] |
//! | `/devices/{id}` | PUT | [`DeviceDirectory::update_device`] |
//! | `/devices/{id}` | DELETE | [`DeviceDirectory::delete_device`] |
//! | `/status_logs?sortBy=timestamp&order=desc&limit={n}` | GET | [`DeviceDirectory::list_recent_logs`] |
//! | `/status_logs` | POST | [`DeviceDirectory::append_log`] |

mod client;
mod memory;

pub use client::*;
pub use memory::*;

use crate::error::Result;
use crate::model::{Device, DeviceFields, NewStatusLog, StatusLog};
use async_trait::async_trait;

/// Number of log entries the monitoring view asks for
pub const DEFAULT_LOG_LIMIT: usize = 10;

/// Operations offered by the remote device store
#[async_trait]
pub trait DeviceDirectory: Send + Sync {
    /// All devices
    async fn list_devices(&self) -> Result<Vec<Device>>;

    /// One device by ID
    async fn get_device(&self, id: &str) -> Result<Device>;

    /// Create a device; the store assigns the ID
    async fn create_device(&self, fields: &DeviceFields) -> Result<Device>;

    /// Replace every field of a device
    async fn update_device(&self, id: &str, fields: &DeviceFields) -> Result<Device>;

    async fn delete_device(&self, id: &str) -> Result<()>;

    /// Most recent log entries, newest first
    async fn list_recent_logs(&self, limit: usize) -> Result<Vec<StatusLog>>;

    async fn append_log(&self, entry: &NewStatusLog) -> Result<StatusLog>;
}
