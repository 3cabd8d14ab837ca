//! Status-change log entries

use crate::model::Device;
use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::sync::Mutex;

/// Appended record of a device status transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusLog {
    /// Store-assigned ID
    pub id: String,
    /// ID of the device at write time (may no longer exist)
    pub device_id: String,
    /// Device name copied at write time
    pub device_name: String,
    /// Status the device moved to
    pub new_status: String,
    #[serde(serialize_with = "serialize_millis")]
    pub timestamp: DateTime<Utc>,
}

/// Log entry body before the store assigns an ID
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStatusLog {
    pub device_id: String,
    pub device_name: String,
    pub new_status: String,
    #[serde(serialize_with = "serialize_millis")]
    pub timestamp: DateTime<Utc>,
}

impl NewStatusLog {
    /// Entry recording that `device` now has its current status
    pub fn for_device(device: &Device, timestamp: DateTime<Utc>) -> Self {
        Self {
            device_id: device.id.clone(),
            device_name: device.name.clone(),
            new_status: device.status().to_string(),
            timestamp,
        }
    }

    pub fn into_log(self, id: impl Into<String>) -> StatusLog {
        StatusLog {
            id: id.into(),
            device_id: self.device_id,
            device_name: self.device_name,
            new_status: self.new_status,
            timestamp: self.timestamp,
        }
    }
}

fn serialize_millis<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Hands out millisecond timestamps that strictly increase across calls.
///
/// Entries appended in sequence by one process therefore sort in the order
/// they were written, even within the same millisecond.
#[derive(Debug, Default)]
pub struct Timestamper {
    last: Mutex<Option<DateTime<Utc>>>,
}

impl Timestamper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> DateTime<Utc> {
        let now = Utc::now().trunc_subsecs(3);
        let mut last = self.last.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let stamp = match *last {
            Some(prev) if now <= prev => prev + Duration::milliseconds(1),
            _ => now,
        };
        *last = Some(stamp);
        stamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DeviceState, DeviceType};

    #[test]
    fn test_log_wire_format() {
        let device = crate::model::DeviceFields::new(
            "Lamp",
            "Room 101",
            DeviceState::initial(DeviceType::Light),
        )
        .into_device("4");
        let ts = DateTime::parse_from_rfc3339("2025-09-19T10:00:00.250Z")
            .unwrap()
            .with_timezone(&Utc);

        let value = serde_json::to_value(NewStatusLog::for_device(&device, ts)).unwrap();
        assert_eq!(value["deviceId"], "4");
        assert_eq!(value["deviceName"], "Lamp");
        assert_eq!(value["newStatus"], "on");
        assert_eq!(value["timestamp"], "2025-09-19T10:00:00.250Z");
    }

    #[test]
    fn test_log_decodes_store_record() {
        let json = r#"{"id":"12","deviceId":"4","deviceName":"Lamp","newStatus":"off","timestamp":"2025-09-19T10:00:00.250Z"}"#;
        let log: StatusLog = serde_json::from_str(json).unwrap();
        assert_eq!(log.id, "12");
        assert_eq!(log.new_status, "off");
        assert_eq!(log.timestamp.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_timestamper_strictly_increasing() {
        let stamper = Timestamper::new();
        let stamps: Vec<_> = (0..50).map(|_| stamper.next()).collect();
        for pair in stamps.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }
}
