//! Monitoring view: read-only device cards and the recent status log
//!
//! Each refresh fetches devices and logs independently and builds a
//! [`MonitorSnapshot`]; rendering is a pure function of the snapshot.

use crate::directory::{DeviceDirectory, DEFAULT_LOG_LIMIT};
use crate::model::{Device, DeviceState, DoorStatus, LightStatus, MotionStatus, StatusLog, WindowStatus};
use crate::views::html::{alert, escape};
use chrono::{DateTime, Local, Utc};
use std::fmt::Write;
use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

/// Default refresh interval
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(2);

/// Location shown for logs whose device no longer exists
pub const UNKNOWN_LOCATION: &str = "N/A";

/// Result of one refresh. Failures are kept as messages so snapshots can be
/// cloned and handed to other tasks.
#[derive(Debug, Clone)]
pub struct MonitorSnapshot {
    pub devices: std::result::Result<Vec<Device>, String>,
    pub logs: std::result::Result<Vec<StatusLog>, String>,
    pub fetched_at: DateTime<Utc>,
}

impl MonitorSnapshot {
    /// Location of `device_id` among the fetched devices
    pub fn resolve_location(&self, device_id: &str) -> &str {
        resolve_location(self.devices.as_deref().unwrap_or_default(), device_id)
    }
}

/// Location of `device_id` in `devices`, or `N/A`
pub fn resolve_location<'a>(devices: &'a [Device], device_id: &str) -> &'a str {
    devices
        .iter()
        .find(|d| d.id == device_id)
        .map(|d| d.location.as_str())
        .unwrap_or(UNKNOWN_LOCATION)
}

/// Card image for a type and status pair
pub fn device_image(state: &DeviceState) -> &'static str {
    match state {
        DeviceState::Light(LightStatus::On) => "light-on.svg",
        DeviceState::Light(LightStatus::Off) => "light-off.svg",
        DeviceState::Door(DoorStatus::Unlocked) => "door-open.svg",
        DeviceState::Door(DoorStatus::Locked) => "door-closed.svg",
        DeviceState::Window(WindowStatus::Open) => "window-open.svg",
        DeviceState::Window(WindowStatus::Closed) => "window-closed.svg",
        DeviceState::MotionSensor(MotionStatus::Active) => "motion-active.svg",
        DeviceState::MotionSensor(MotionStatus::Inactive) => "motion-inactive.svg",
    }
}

/// Badge colour for a status
pub fn status_variant(status: &str) -> &'static str {
    match status {
        "on" | "open" | "unlocked" | "active" => "success",
        _ => "secondary",
    }
}

/// Local wall-clock time of a log entry
pub fn format_local(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Monitoring view settings
#[derive(Debug, Clone)]
pub struct MonitoringView {
    pub log_limit: usize,
    pub interval: Duration,
}

impl Default for MonitoringView {
    fn default() -> Self {
        Self {
            log_limit: DEFAULT_LOG_LIMIT,
            interval: DEFAULT_REFRESH_INTERVAL,
        }
    }
}

impl MonitoringView {
    pub fn new(log_limit: usize, interval: Duration) -> Self {
        Self { log_limit, interval }
    }

    /// Fetch devices and logs concurrently
    pub async fn fetch(&self, directory: &dyn DeviceDirectory) -> MonitorSnapshot {
        let (devices, logs) = tokio::join!(
            directory.list_devices(),
            directory.list_recent_logs(self.log_limit)
        );

        if let Err(e) = &devices {
            warn!(error = %e, "Failed to fetch devices");
        }
        if let Err(e) = &logs {
            warn!(error = %e, "Failed to fetch status logs");
        }

        MonitorSnapshot {
            devices: devices.map_err(|e| e.to_string()),
            logs: logs.map_err(|e| e.to_string()),
            fetched_at: Utc::now(),
        }
    }

    /// Refresh every interval and hand each snapshot to `on_snapshot` until
    /// it returns `ControlFlow::Break`. A failed fetch does not pause the
    /// loop.
    pub async fn poll<F, Fut>(&self, directory: &dyn DeviceDirectory, mut on_snapshot: F)
    where
        F: FnMut(MonitorSnapshot) -> Fut,
        Fut: Future<Output = ControlFlow<()>>,
    {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let snapshot = self.fetch(directory).await;
            debug!(fetched_at = %snapshot.fetched_at, "Monitoring refresh");
            if on_snapshot(snapshot).await.is_break() {
                break;
            }
        }
    }

    /// Page body for a snapshot
    pub fn render(&self, snapshot: &MonitorSnapshot) -> String {
        let mut out = String::new();
        out.push_str(r#"<h2 class="h5">Devices</h2>"#);
        match &snapshot.devices {
            Ok(devices) => out.push_str(&Self::render_cards(devices)),
            Err(_) => out.push_str(&alert("danger", "Could not load devices.")),
        }

        out.push_str(r#"<h2 class="h5 mt-4">Recent activity</h2>"#);
        match &snapshot.logs {
            Ok(logs) => {
                let devices = snapshot.devices.as_deref().unwrap_or_default();
                out.push_str(&Self::render_log_table(logs, devices));
            }
            Err(_) => out.push_str(&alert("danger", "Could not load the status log.")),
        }

        let _ = write!(
            out,
            r#"<p class="text-muted small">Updated {}</p>"#,
            format_local(&snapshot.fetched_at)
        );
        out
    }

    pub fn render_cards(devices: &[Device]) -> String {
        if devices.is_empty() {
            return r#"<p class="text-center">No devices found.</p>"#.to_string();
        }

        let mut out = String::from(r#"<div class="row row-cols-2 row-cols-md-4 g-3">"#);
        for device in devices {
            let _ = write!(
                out,
                r#"<div class="col"><div class="card h-100 text-center"><img src="/assets/{image}" class="card-img-top p-3" alt="{kind}" style="height:96px"><div class="card-body"><h5 class="card-title">{name}</h5><p class="card-text text-muted">{location}</p><span class="badge bg-{variant}">{status}</span></div></div></div>"#,
                image = device_image(&device.state),
                kind = device.device_type(),
                name = escape(&device.name),
                location = escape(&device.location),
                variant = status_variant(device.status()),
                status = device.status(),
            );
        }
        out.push_str("</div>");
        out
    }

    /// Log table; each row's location is looked up in `devices`
    pub fn render_log_table(logs: &[StatusLog], devices: &[Device]) -> String {
        let mut out = String::from(
            r#"<table class="table table-sm table-striped"><thead><tr><th>Device</th><th>Location</th><th>New status</th><th>Time</th></tr></thead><tbody>"#,
        );
        if logs.is_empty() {
            out.push_str(r#"<tr><td colspan="4" class="text-center">No activity yet.</td></tr>"#);
        }
        for log in logs {
            let _ = write!(
                out,
                r#"<tr><td>{}</td><td>{}</td><td><span class="badge bg-{}">{}</span></td><td>{}</td></tr>"#,
                escape(&log.device_name),
                escape(resolve_location(devices, &log.device_id)),
                status_variant(&log.new_status),
                escape(&log.new_status),
                format_local(&log.timestamp),
            );
        }
        out.push_str("</tbody></table>");
        out
    }
}
