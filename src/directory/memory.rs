//! In-process device directory
//!
//! Holds devices and logs in memory with the same contract as the remote
//! store: string IDs assigned in sequence, full-replace updates, logs listed
//! newest first. Used by `serve --demo` and by tests, which can also inject
//! failures for individual operations.

use crate::directory::DeviceDirectory;
use crate::error::{DashboardError, Result};
use crate::model::{Device, DeviceFields, NewStatusLog, StatusLog};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Store {
    devices: Vec<Device>,
    logs: Vec<StatusLog>,
    next_device_id: u64,
    next_log_id: u64,
    failing_updates: HashSet<String>,
    fail_appends: bool,
    fail_lists: bool,
}

/// Device directory kept entirely in memory
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    store: Mutex<Store>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory pre-populated with `fields`, assigning IDs "1", "2", ...
    pub fn with_devices(fields: impl IntoIterator<Item = DeviceFields>) -> Self {
        let directory = Self::new();
        {
            let mut store = directory.lock();
            for f in fields {
                store.next_device_id += 1;
                let id = store.next_device_id.to_string();
                store.devices.push(f.into_device(id));
            }
        }
        directory
    }

    /// Sample classrooms for the demo sandbox
    pub fn demo() -> Self {
        use crate::model::{DeviceState, DeviceType};

        let seed = [
            ("Main light", "Room 101", DeviceType::Light, "on"),
            ("Front door", "Room 101", DeviceType::Door, "unlocked"),
            ("Window A", "Room 101", DeviceType::Window, "open"),
            ("Motion sensor", "Room 101", DeviceType::MotionSensor, "inactive"),
            ("Bench lights", "Chemistry Lab", DeviceType::Light, "off"),
            ("Lab door", "Chemistry Lab", DeviceType::Door, "locked"),
            ("Fume hood window", "Chemistry Lab", DeviceType::Window, "closed"),
            ("Lab motion sensor", "Chemistry Lab", DeviceType::MotionSensor, "active"),
        ];

        Self::with_devices(seed.into_iter().filter_map(|(name, location, kind, status)| {
            DeviceState::parse(kind, status)
                .ok()
                .map(|state| DeviceFields::new(name, location, state))
        }))
    }

    /// Make every update of `device_id` fail with a transport error
    pub fn fail_updates_for(&self, device_id: impl Into<String>) {
        self.lock().failing_updates.insert(device_id.into());
    }

    /// Make every log append fail with a transport error
    pub fn fail_appends(&self, fail: bool) {
        self.lock().fail_appends = fail;
    }

    /// Make device and log listings fail with a transport error
    pub fn fail_lists(&self, fail: bool) {
        self.lock().fail_lists = fail;
    }

    /// Every log entry in append order
    pub fn logs(&self) -> Vec<StatusLog> {
        self.lock().logs.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn injected(operation: &str) -> DashboardError {
    DashboardError::transport("memory://", format!("injected failure: {}", operation))
}

#[async_trait]
impl DeviceDirectory for MemoryDirectory {
    async fn list_devices(&self) -> Result<Vec<Device>> {
        let store = self.lock();
        if store.fail_lists {
            return Err(injected("list devices"));
        }
        Ok(store.devices.clone())
    }

    async fn get_device(&self, id: &str) -> Result<Device> {
        self.lock()
            .devices
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| DashboardError::DeviceNotFound(id.to_string()))
    }

    async fn create_device(&self, fields: &DeviceFields) -> Result<Device> {
        let mut store = self.lock();
        store.next_device_id += 1;
        let device = fields.clone().into_device(store.next_device_id.to_string());
        store.devices.push(device.clone());
        Ok(device)
    }

    async fn update_device(&self, id: &str, fields: &DeviceFields) -> Result<Device> {
        let mut store = self.lock();
        if store.failing_updates.contains(id) {
            return Err(injected("update device"));
        }

        let device = store
            .devices
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| DashboardError::DeviceNotFound(id.to_string()))?;
        *device = fields.clone().into_device(id);
        Ok(device.clone())
    }

    async fn delete_device(&self, id: &str) -> Result<()> {
        let mut store = self.lock();
        let before = store.devices.len();
        store.devices.retain(|d| d.id != id);
        if store.devices.len() == before {
            return Err(DashboardError::DeviceNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn list_recent_logs(&self, limit: usize) -> Result<Vec<StatusLog>> {
        let store = self.lock();
        if store.fail_lists {
            return Err(injected("list logs"));
        }

        let mut logs = store.logs.clone();
        logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        logs.truncate(limit);
        Ok(logs)
    }

    async fn append_log(&self, entry: &NewStatusLog) -> Result<StatusLog> {
        let mut store = self.lock();
        if store.fail_appends {
            return Err(injected("append log"));
        }

        store.next_log_id += 1;
        let log = entry.clone().into_log(store.next_log_id.to_string());
        store.logs.push(log.clone());
        Ok(log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DeviceState, DeviceType, LightStatus, Timestamper};

    fn lamp() -> DeviceFields {
        DeviceFields::new("Lamp", "Room 101", DeviceState::Light(LightStatus::On))
    }

    #[tokio::test]
    async fn test_crud_cycle() {
        let dir = MemoryDirectory::new();

        let created = dir.create_device(&lamp()).await.unwrap();
        assert_eq!(created.id, "1");

        let moved = DeviceFields { location: "Room 202".into(), ..lamp() };
        let updated = dir.update_device("1", &moved).await.unwrap();
        assert_eq!(updated.location, "Room 202");
        assert_eq!(dir.get_device("1").await.unwrap().location, "Room 202");

        dir.delete_device("1").await.unwrap();
        assert!(dir.list_devices().await.unwrap().is_empty());
        assert!(matches!(
            dir.delete_device("1").await,
            Err(DashboardError::DeviceNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_logs_newest_first_with_limit() {
        let dir = MemoryDirectory::with_devices([lamp()]);
        let device = dir.get_device("1").await.unwrap();
        let stamper = Timestamper::new();

        for _ in 0..5 {
            dir.append_log(&NewStatusLog::for_device(&device, stamper.next()))
                .await
                .unwrap();
        }

        let recent = dir.list_recent_logs(3).await.unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].id, "5");
        assert!(recent[0].timestamp > recent[1].timestamp);
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let dir = MemoryDirectory::with_devices([lamp()]);
        dir.fail_updates_for("1");
        assert!(dir.update_device("1", &lamp()).await.is_err());

        dir.fail_lists(true);
        assert!(dir.list_devices().await.is_err());
        assert!(dir.list_recent_logs(10).await.is_err());
    }

    #[test]
    fn test_demo_seed() {
        let dir = MemoryDirectory::demo();
        let store = dir.lock();
        assert_eq!(store.devices.len(), 8);
        assert!(store
            .devices
            .iter()
            .any(|d| d.device_type() == DeviceType::MotionSensor && d.state.is_motion_detected()));
    }
}
