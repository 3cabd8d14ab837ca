//! Text reports for the command line
//!
//! Uses console for styled, width-aware columns and indicatif for the
//! spinner shown while a secure-classroom batch runs.

use crate::model::{Device, StatusLog};
use crate::views::{format_local, resolve_location, status_variant, MonitorSnapshot, SecureReport};
use console::{pad_str, style, Alignment};
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Write;
use std::time::Duration;

/// Spinner shown while requests are in flight
pub struct BatchSpinner {
    bar: ProgressBar,
}

impl BatchSpinner {
    pub fn new(message: impl Into<String>) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.into());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// Spinner that draws nothing (quiet mode, JSON output)
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn finish_success(&self, message: &str) {
        self.bar.finish_with_message(format!("✓ {}", message));
    }

    pub fn finish_error(&self, message: &str) {
        self.bar.abandon_with_message(format!("✗ {}", message));
    }
}

/// Status coloured by its badge variant
pub fn styled_status(status: &str) -> String {
    match status_variant(status) {
        "success" => style(status).green().bold().to_string(),
        _ => style(status).dim().to_string(),
    }
}

fn cell(text: &str, width: usize) -> String {
    pad_str(text, width, Alignment::Left, Some("…")).into_owned()
}

/// Device table with ID, name, type, status and location columns
pub fn device_table(devices: &[Device]) -> String {
    if devices.is_empty() {
        return "No devices registered.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} {} {} {}",
        style(cell("ID", 6)).bold(),
        style(cell("NAME", 24)).bold(),
        style(cell("TYPE", 14)).bold(),
        style(cell("STATUS", 10)).bold(),
        style("LOCATION").bold()
    );
    for device in devices {
        let _ = writeln!(
            out,
            "{} {} {} {} {}",
            cell(&device.id, 6),
            cell(&device.name, 24),
            cell(device.device_type().as_str(), 14),
            cell(&styled_status(device.status()), 10),
            device.location
        );
    }
    out
}

/// Classrooms with the devices installed in each, in first-appearance order
pub fn classroom_summary(devices: &[Device]) -> String {
    if devices.is_empty() {
        return "No classrooms found. Add devices first.\n".to_string();
    }

    let mut locations: Vec<&str> = Vec::new();
    for device in devices {
        if !locations.contains(&device.location.as_str()) {
            locations.push(&device.location);
        }
    }

    let mut out = String::new();
    for location in locations {
        let _ = writeln!(out, "{}", style(location).cyan().bold());
        for device in devices.iter().filter(|d| d.location == location) {
            let _ = writeln!(
                out,
                "  {} {} {}",
                cell(&device.name, 24),
                cell(device.device_type().as_str(), 14),
                styled_status(device.status())
            );
        }
    }
    out
}

/// Recent status changes with locations resolved against `devices`
pub fn log_table(logs: &[StatusLog], devices: &[Device]) -> String {
    if logs.is_empty() {
        return "No activity yet.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} {} {}",
        style(cell("TIME", 20)).bold(),
        style(cell("DEVICE", 24)).bold(),
        style(cell("LOCATION", 18)).bold(),
        style("STATUS").bold()
    );
    for log in logs {
        let _ = writeln!(
            out,
            "{} {} {} {}",
            cell(&format_local(&log.timestamp), 20),
            cell(&log.device_name, 24),
            cell(resolve_location(devices, &log.device_id), 18),
            styled_status(&log.new_status)
        );
    }
    out
}

/// One monitoring refresh as text
pub fn snapshot_report(snapshot: &MonitorSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {}",
        style("SmartClass monitoring").cyan().bold(),
        style(format_local(&snapshot.fetched_at)).dim()
    );

    match &snapshot.devices {
        Ok(devices) => out.push_str(&device_table(devices)),
        Err(e) => {
            let _ = writeln!(out, "{} {}", style("Could not load devices:").red(), e);
        }
    }
    out.push('\n');
    match &snapshot.logs {
        Ok(logs) => out.push_str(&log_table(logs, snapshot.devices.as_deref().unwrap_or_default())),
        Err(e) => {
            let _ = writeln!(out, "{} {}", style("Could not load the status log:").red(), e);
        }
    }
    out
}

/// Outcome of a secure-classroom run
pub fn secure_summary(report: &SecureReport) -> String {
    let mut out = String::new();
    if report.attempted() == 0 {
        let _ = writeln!(out, "All devices in {} were already secure.", report.location);
        return out;
    }

    for device in &report.secured {
        let _ = writeln!(
            out,
            "  {} {} -> {}",
            style("✓").green(),
            device.name,
            styled_status(device.status())
        );
    }
    for (id, error) in &report.failed {
        let _ = writeln!(out, "  {} device {}: {}", style("✗").red(), id, error);
    }
    for id in &report.unlogged {
        let _ = writeln!(out, "  {} status log not written for device {}", style("!").yellow(), id);
    }
    let _ = writeln!(
        out,
        "{} of {} devices secured in {}.",
        report.secured.len(),
        report.attempted(),
        report.location
    );
    out
}
