//! Classroom devices
//!
//! Defines the four device types, their status vocabularies, and the
//! transitions the control panel applies (toggle and secure).

use crate::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Device type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    Light,
    Door,
    Window,
    MotionSensor,
}

impl DeviceType {
    /// Every device type, in form order
    pub const ALL: [DeviceType; 4] = [
        DeviceType::Light,
        DeviceType::Door,
        DeviceType::Window,
        DeviceType::MotionSensor,
    ];

    /// Wire name of the type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Door => "door",
            Self::Window => "window",
            Self::MotionSensor => "motion_sensor",
        }
    }

    /// Allowed status values, in the order the admin form lists them
    pub fn vocabulary(&self) -> &'static [&'static str] {
        match self {
            Self::Light => &["on", "off"],
            Self::Door => &["locked", "unlocked"],
            Self::Window => &["open", "closed"],
            Self::MotionSensor => &["active", "inactive"],
        }
    }

    /// Whether the control panel can switch this device
    pub fn is_controllable(&self) -> bool {
        !matches!(self, Self::MotionSensor)
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceType {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        DeviceType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DashboardError::UnknownDeviceType(s.to_string()))
    }
}

/// Light status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightStatus {
    On,
    Off,
}

/// Door status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoorStatus {
    Locked,
    Unlocked,
}

/// Window status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowStatus {
    Open,
    Closed,
}

/// Motion sensor status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionStatus {
    Active,
    Inactive,
}

/// Type and status of a device as one value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceState {
    Light(LightStatus),
    Door(DoorStatus),
    Window(WindowStatus),
    MotionSensor(MotionStatus),
}

impl DeviceState {
    /// Build a state from the wire pair, rejecting statuses outside the
    /// type's vocabulary.
    pub fn parse(device_type: DeviceType, status: &str) -> Result<Self> {
        let state = match (device_type, status) {
            (DeviceType::Light, "on") => Self::Light(LightStatus::On),
            (DeviceType::Light, "off") => Self::Light(LightStatus::Off),
            (DeviceType::Door, "locked") => Self::Door(DoorStatus::Locked),
            (DeviceType::Door, "unlocked") => Self::Door(DoorStatus::Unlocked),
            (DeviceType::Window, "open") => Self::Window(WindowStatus::Open),
            (DeviceType::Window, "closed") => Self::Window(WindowStatus::Closed),
            (DeviceType::MotionSensor, "active") => Self::MotionSensor(MotionStatus::Active),
            (DeviceType::MotionSensor, "inactive") => Self::MotionSensor(MotionStatus::Inactive),
            _ => return Err(DashboardError::invalid_status(device_type.as_str(), status)),
        };
        Ok(state)
    }

    /// First status of the type's vocabulary
    pub fn initial(device_type: DeviceType) -> Self {
        match device_type {
            DeviceType::Light => Self::Light(LightStatus::On),
            DeviceType::Door => Self::Door(DoorStatus::Locked),
            DeviceType::Window => Self::Window(WindowStatus::Open),
            DeviceType::MotionSensor => Self::MotionSensor(MotionStatus::Active),
        }
    }

    pub fn device_type(&self) -> DeviceType {
        match self {
            Self::Light(_) => DeviceType::Light,
            Self::Door(_) => DeviceType::Door,
            Self::Window(_) => DeviceType::Window,
            Self::MotionSensor(_) => DeviceType::MotionSensor,
        }
    }

    /// Wire name of the status
    pub fn status(&self) -> &'static str {
        match self {
            Self::Light(LightStatus::On) => "on",
            Self::Light(LightStatus::Off) => "off",
            Self::Door(DoorStatus::Locked) => "locked",
            Self::Door(DoorStatus::Unlocked) => "unlocked",
            Self::Window(WindowStatus::Open) => "open",
            Self::Window(WindowStatus::Closed) => "closed",
            Self::MotionSensor(MotionStatus::Active) => "active",
            Self::MotionSensor(MotionStatus::Inactive) => "inactive",
        }
    }

    /// Switch position on the control panel: on, unlocked and open
    pub fn is_affirmative(&self) -> bool {
        matches!(
            self,
            Self::Light(LightStatus::On)
                | Self::Door(DoorStatus::Unlocked)
                | Self::Window(WindowStatus::Open)
        )
    }

    /// Motion sensor reporting movement
    pub fn is_motion_detected(&self) -> bool {
        matches!(self, Self::MotionSensor(MotionStatus::Active))
    }

    /// Opposite status for controllable devices; `None` for sensors.
    pub fn toggled(&self) -> Option<Self> {
        match self {
            Self::Light(LightStatus::On) => Some(Self::Light(LightStatus::Off)),
            Self::Light(LightStatus::Off) => Some(Self::Light(LightStatus::On)),
            Self::Door(DoorStatus::Locked) => Some(Self::Door(DoorStatus::Unlocked)),
            Self::Door(DoorStatus::Unlocked) => Some(Self::Door(DoorStatus::Locked)),
            Self::Window(WindowStatus::Open) => Some(Self::Window(WindowStatus::Closed)),
            Self::Window(WindowStatus::Closed) => Some(Self::Window(WindowStatus::Open)),
            Self::MotionSensor(_) => None,
        }
    }

    /// Safe status a secure-classroom run moves this device to, or `None`
    /// when the device is a sensor or already safe.
    pub fn secure_target(&self) -> Option<Self> {
        match self {
            Self::Light(LightStatus::On) => Some(Self::Light(LightStatus::Off)),
            Self::Door(DoorStatus::Unlocked) => Some(Self::Door(DoorStatus::Locked)),
            Self::Window(WindowStatus::Open) => Some(Self::Window(WindowStatus::Closed)),
            _ => None,
        }
    }
}

/// Device as stored in the remote device store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireDevice", into = "WireDevice")]
pub struct Device {
    /// Store-assigned ID
    pub id: String,
    /// Display name
    pub name: String,
    /// Classroom the device is installed in
    pub location: String,
    /// Type and status
    pub state: DeviceState,
}

impl Device {
    pub fn device_type(&self) -> DeviceType {
        self.state.device_type()
    }

    pub fn status(&self) -> &'static str {
        self.state.status()
    }

    /// Full record without the ID, as sent on update
    pub fn fields(&self) -> DeviceFields {
        DeviceFields {
            name: self.name.clone(),
            location: self.location.clone(),
            state: self.state,
        }
    }

    /// Full record carrying a different state
    pub fn fields_with_state(&self, state: DeviceState) -> DeviceFields {
        DeviceFields {
            state,
            ..self.fields()
        }
    }
}

/// Device body for create and full-replace update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireFields", into = "WireFields")]
pub struct DeviceFields {
    pub name: String,
    pub location: String,
    pub state: DeviceState,
}

impl DeviceFields {
    pub fn new(name: impl Into<String>, location: impl Into<String>, state: DeviceState) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            state,
        }
    }

    /// Attach a store-assigned ID
    pub fn into_device(self, id: impl Into<String>) -> Device {
        Device {
            id: id.into(),
            name: self.name,
            location: self.location,
            state: self.state,
        }
    }
}

/// Flat device record as it appears on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireDevice {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: String,
    pub status: String,
    #[serde(default)]
    pub location: String,
}

impl TryFrom<WireDevice> for Device {
    type Error = DashboardError;

    fn try_from(wire: WireDevice) -> Result<Self> {
        let device_type = DeviceType::from_str(&wire.device_type)?;
        Ok(Device {
            state: DeviceState::parse(device_type, &wire.status)?,
            id: wire.id,
            name: wire.name,
            location: wire.location,
        })
    }
}

impl From<Device> for WireDevice {
    fn from(device: Device) -> Self {
        WireDevice {
            device_type: device.device_type().as_str().to_string(),
            status: device.status().to_string(),
            id: device.id,
            name: device.name,
            location: device.location,
        }
    }
}

/// Flat device body without an ID
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireFields {
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: String,
    pub status: String,
    pub location: String,
}

impl TryFrom<WireFields> for DeviceFields {
    type Error = DashboardError;

    fn try_from(wire: WireFields) -> Result<Self> {
        let device_type = DeviceType::from_str(&wire.device_type)?;
        Ok(DeviceFields {
            state: DeviceState::parse(device_type, &wire.status)?,
            name: wire.name,
            location: wire.location,
        })
    }
}

impl From<DeviceFields> for WireFields {
    fn from(fields: DeviceFields) -> Self {
        WireFields {
            device_type: fields.state.device_type().as_str().to_string(),
            status: fields.state.status().to_string(),
            name: fields.name,
            location: fields.location,
        }
    }
}
