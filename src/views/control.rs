//! Control view: classroom selector, device switches, and secure classroom
//!
//! The panel for a classroom is computed from the locally held device list,
//! so whether "secure" is available never waits on the network. Actions
//! write to the store first and only then change the local copy.

use crate::directory::DeviceDirectory;
use crate::error::{DashboardError, Result};
use crate::model::{Device, DeviceState, DeviceType, NewStatusLog, Timestamper};
use crate::views::html::escape;
use crate::views::Notice;
use futures::future::join_all;
use std::fmt::Write;
use tracing::{error, info, warn};

/// Result of writing one status change to the store
#[derive(Debug)]
pub enum Transition {
    /// Update accepted; `log_error` is set when the log append failed
    Applied {
        device: Device,
        log_error: Option<DashboardError>,
    },
    /// Update rejected; the device keeps its previous status
    Rejected {
        device_id: String,
        error: DashboardError,
    },
}

/// Update the device to `target`, then append the matching log entry.
pub async fn apply_transition(
    directory: &dyn DeviceDirectory,
    stamper: &Timestamper,
    device: &Device,
    target: DeviceState,
) -> Transition {
    let fields = device.fields_with_state(target);
    if let Err(error) = directory.update_device(&device.id, &fields).await {
        return Transition::Rejected {
            device_id: device.id.clone(),
            error,
        };
    }

    let updated = fields.into_device(device.id.clone());
    let entry = NewStatusLog::for_device(&updated, stamper.next());
    let log_error = directory.append_log(&entry).await.err();

    Transition::Applied {
        device: updated,
        log_error,
    }
}

/// Outcome of a secure-classroom run
#[derive(Debug, Default)]
pub struct SecureReport {
    pub location: String,
    /// Devices now in their safe status
    pub secured: Vec<Device>,
    /// Devices whose update was rejected
    pub failed: Vec<(String, DashboardError)>,
    /// Secured devices whose log entry could not be written
    pub unlogged: Vec<String>,
}

impl SecureReport {
    pub fn attempted(&self) -> usize {
        self.secured.len() + self.failed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    fn notice(&self) -> Notice {
        if self.attempted() == 0 {
            Notice::info("All devices were already secure.")
        } else if self.is_complete() {
            Notice::success(format!("Classroom secured ({} devices).", self.secured.len()))
        } else {
            Notice::warning(format!(
                "{} of {} devices could not be secured.",
                self.failed.len(),
                self.attempted()
            ))
        }
    }
}

/// Panel state derived from the local device list
#[derive(Debug)]
pub struct ControlPanel<'a> {
    pub location: &'a str,
    /// First motion sensor of the classroom; others are ignored
    pub sensor: Option<&'a Device>,
    /// Non-sensor devices, in store order
    pub switches: Vec<&'a Device>,
    pub secure_enabled: bool,
}

impl ControlPanel<'_> {
    pub fn motion_detected(&self) -> bool {
        self.sensor.is_some_and(|s| s.state.is_motion_detected())
    }
}

/// Control view controller
#[derive(Debug, Default)]
pub struct ControlView {
    devices: Vec<Device>,
    selected: Option<String>,
    banner: Option<Notice>,
    stamper: Timestamper,
}

impl ControlView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn banner(&self) -> Option<&Notice> {
        self.banner.as_ref()
    }

    /// Enter the view: drop all state and fetch devices once
    pub async fn load(&mut self, directory: &dyn DeviceDirectory) -> Result<()> {
        self.devices.clear();
        self.selected = None;
        self.banner = None;

        match directory.list_devices().await {
            Ok(devices) => {
                self.devices = devices;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Failed to load classrooms");
                self.banner = Some(Notice::danger("Could not load classrooms."));
                Err(e)
            }
        }
    }

    /// Distinct locations in first-appearance order
    pub fn classrooms(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for device in &self.devices {
            if !seen.contains(&device.location.as_str()) {
                seen.push(&device.location);
            }
        }
        seen
    }

    pub fn select(&mut self, location: impl Into<String>) {
        self.selected = Some(location.into());
        self.banner = None;
    }

    /// Back to the classroom selector
    pub fn back(&mut self) {
        self.selected = None;
        self.banner = None;
    }

    /// Panel for the selected classroom
    pub fn panel(&self) -> Option<ControlPanel<'_>> {
        let location = self.selected.as_deref()?;
        let in_room: Vec<&Device> = self.devices.iter().filter(|d| d.location == location).collect();

        let sensor = in_room
            .iter()
            .copied()
            .find(|d| d.device_type() == DeviceType::MotionSensor);
        let motion = sensor.is_some_and(|s| s.state.is_motion_detected());
        let switches = in_room
            .into_iter()
            .filter(|d| d.device_type().is_controllable())
            .collect();

        Some(ControlPanel {
            location,
            sensor,
            switches,
            secure_enabled: !motion,
        })
    }

    /// Flip one device. Motion sensors and unknown IDs are left alone.
    pub async fn toggle(&mut self, directory: &dyn DeviceDirectory, device_id: &str) -> Result<()> {
        let Some(device) = self.devices.iter().find(|d| d.id == device_id).cloned() else {
            return Ok(());
        };
        let Some(target) = device.state.toggled() else {
            return Ok(());
        };

        match apply_transition(directory, &self.stamper, &device, target).await {
            Transition::Applied { device, log_error } => {
                info!(device_id = %device.id, status = device.status(), "Toggled device");
                self.replace_local(device);
                match log_error {
                    None => {
                        self.banner = None;
                        Ok(())
                    }
                    Some(e) => {
                        warn!(device_id, error = %e, "Status log append failed");
                        self.banner = Some(Notice::warning(
                            "Device updated, but the status log could not be written.",
                        ));
                        Err(e)
                    }
                }
            }
            Transition::Rejected { error, .. } => {
                error!(device_id, error = %error, "Failed to update device");
                self.banner = Some(Notice::danger("Error updating the device."));
                Err(error)
            }
        }
    }

    /// Move every light, window, and door of the selected classroom to its
    /// safe status. Refused while motion is detected. A run borrows the view
    /// mutably until its whole batch has settled, so runs never overlap; the
    /// server shares each view behind a `Mutex`.
    pub async fn secure_classroom(&mut self, directory: &dyn DeviceDirectory) -> Result<SecureReport> {
        let (location, targets) = {
            let panel = self.panel().ok_or_else(|| {
                DashboardError::ActionUnavailable("no classroom selected".to_string())
            })?;
            if panel.motion_detected() {
                return Err(DashboardError::ActionUnavailable(
                    "motion detected in the classroom".to_string(),
                ));
            }

            let targets: Vec<(Device, DeviceState)> = panel
                .switches
                .iter()
                .filter_map(|d| d.state.secure_target().map(|t| ((*d).clone(), t)))
                .collect();
            (panel.location.to_string(), targets)
        };

        info!(location = %location, devices = targets.len(), "Securing classroom");

        let stamper = &self.stamper;
        let transitions = join_all(
            targets
                .iter()
                .map(|(device, target)| apply_transition(directory, stamper, device, *target)),
        )
        .await;

        let mut report = SecureReport {
            location,
            ..Default::default()
        };
        for transition in transitions {
            match transition {
                Transition::Applied { device, log_error } => {
                    if let Some(e) = log_error {
                        warn!(device_id = %device.id, error = %e, "Status log append failed");
                        report.unlogged.push(device.id.clone());
                    }
                    self.replace_local(device.clone());
                    report.secured.push(device);
                }
                Transition::Rejected { device_id, error } => {
                    warn!(device_id = %device_id, error = %error, "Device could not be secured");
                    report.failed.push((device_id, error));
                }
            }
        }

        self.banner = Some(report.notice());
        Ok(report)
    }

    fn replace_local(&mut self, device: Device) {
        if let Some(local) = self.devices.iter_mut().find(|d| d.id == device.id) {
            *local = device;
        }
    }

    /// Page body: the selector, or the panel of the selected classroom
    pub fn render(&self) -> String {
        match self.panel() {
            Some(panel) => self.render_panel(&panel),
            None => self.render_selector(),
        }
    }

    pub fn render_selector(&self) -> String {
        let mut out = String::new();
        if let Some(banner) = &self.banner {
            out.push_str(&banner.render_banner());
        }

        let classrooms = self.classrooms();
        if classrooms.is_empty() {
            if self.banner.is_none() {
                out.push_str(
                    r#"<p class="text-center">No classrooms found. Add devices on the Admin page.</p>"#,
                );
            }
            return out;
        }

        out.push_str(r#"<form method="post" action="/control/select"><div class="list-group">"#);
        for location in classrooms {
            let _ = write!(
                out,
                r#"<button type="submit" name="location" value="{0}" class="list-group-item list-group-item-action fs-5"><i class="bi bi-door-open"></i> {0}</button>"#,
                escape(location)
            );
        }
        out.push_str("</div></form>");
        out
    }

    pub fn render_panel(&self, panel: &ControlPanel<'_>) -> String {
        let mut out = String::new();
        let _ = write!(out, r#"<h2 class="h4">Control panel - {}</h2>"#, escape(panel.location));

        if let Some(sensor) = panel.sensor {
            let (variant, label) = if sensor.state.is_motion_detected() {
                ("warning", "MOTION DETECTED")
            } else {
                ("info", "Inactive")
            };
            let _ = write!(
                out,
                r#"<div class="alert alert-{}">Motion sensor: <strong>{}</strong></div>"#,
                variant, label
            );
        }
        if let Some(banner) = &self.banner {
            out.push_str(&banner.render_banner());
        }

        out.push_str(r#"<div class="list-group mb-3">"#);
        for device in &panel.switches {
            let _ = write!(
                out,
                r#"<form method="post" action="/control/toggle/{id}" class="list-group-item d-flex justify-content-between align-items-center"><div><h5>{name}</h5><span>Status: {status}</span></div><div class="form-check form-switch"><input class="form-check-input" type="checkbox" role="switch" id="switch-{dom_id}" onchange="this.form.submit()"{checked}></div></form>"#,
                id = urlencoding::encode(&device.id),
                dom_id = escape(&device.id),
                name = escape(&device.name),
                status = device.status(),
                checked = if device.state.is_affirmative() { " checked" } else { "" },
            );
        }
        out.push_str("</div>");

        let disabled = if panel.secure_enabled { "" } else { " disabled" };
        let _ = write!(
            out,
            r#"<form method="post" action="/control/secure" class="d-inline"><button type="submit" id="secure-classroom-btn" class="btn btn-danger"{}><i class="bi bi-shield-lock"></i> Secure classroom</button></form>"#,
            disabled
        );
        if panel.motion_detected() {
            out.push_str(
                r#"<div id="secure-btn-help" class="form-text">Securing is unavailable while motion is detected.</div>"#,
            );
        }
        out.push_str(
            r#"<form method="post" action="/control/back" class="d-inline ms-2"><button type="submit" class="btn btn-secondary">Back</button></form>"#,
        );
        out
    }
}
