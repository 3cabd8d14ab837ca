//! SmartClass CLI - Smart-Classroom Device Dashboard
//!
//! Device administration, classroom control and live monitoring from the
//! terminal, plus the web dashboard server.

use clap::Parser;
use console::Term;
use serde::Serialize;
use smartclass::api::{AppState, DashboardServer, ServerConfig};
use smartclass::config::{CliArgs, Commands, DashboardConfig, DeviceCommand, LogFormat, OutputFormat};
use smartclass::directory::{DeviceDirectory, HttpDirectory, MemoryDirectory};
use smartclass::error::{collect_errors, DashboardError, Result};
use smartclass::model::Device;
use smartclass::terminal::{
    classroom_summary, device_table, log_table, secure_summary, snapshot_report, BatchSpinner,
};
use smartclass::views::{AdminView, ControlView, DeviceForm, MonitorSnapshot, MonitoringView};
use std::ops::ControlFlow;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Initialize logging
    init_logging(&args);

    // Handle result
    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(args: &CliArgs) {
    let level = match (args.quiet, args.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match args.log_format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Where command results go
struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    fn json<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    fn text(&self, text: &str) {
        if !self.quiet {
            print!("{}", text);
        }
    }

    fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    fn spinner(&self, message: &str) -> BatchSpinner {
        if self.quiet || self.is_json() {
            BatchSpinner::hidden()
        } else {
            BatchSpinner::new(message)
        }
    }
}

async fn run(args: CliArgs) -> Result<()> {
    let config = DashboardConfig::from_cli(&args)?;
    let out = Output {
        format: args.format,
        quiet: args.quiet,
    };

    match &args.command {
        Commands::Serve { demo, .. } => cmd_serve(&config, *demo).await,
        Commands::Devices { action } => cmd_devices(&open_store(&config)?, action, &out).await,
        Commands::Classrooms => cmd_classrooms(&open_store(&config)?, &out).await,
        Commands::Toggle { id } => cmd_toggle(&open_store(&config)?, id, &out).await,
        Commands::Secure { location } => cmd_secure(&open_store(&config)?, location, &out).await,
        Commands::Logs { .. } => cmd_logs(&open_store(&config)?, config.log_limit, &out).await,
        Commands::Monitor { tui, once, .. } => {
            let view = MonitoringView::new(config.log_limit, config.refresh_interval);
            cmd_monitor(&open_store(&config)?, &view, *tui, *once, &out).await
        }
    }
}

fn open_store(config: &DashboardConfig) -> Result<HttpDirectory> {
    let directory = HttpDirectory::new(config.api_url.clone(), config.request_timeout)?;
    info!(api_url = directory.base_url(), "Using device store");
    Ok(directory)
}

async fn cmd_serve(config: &DashboardConfig, demo: bool) -> Result<()> {
    let directory: Arc<dyn DeviceDirectory> = if demo {
        info!("Serving in-memory demo classrooms");
        Arc::new(MemoryDirectory::demo())
    } else {
        Arc::new(HttpDirectory::new(config.api_url.clone(), config.request_timeout)?)
    };

    let state = AppState::new(directory)
        .with_monitoring(MonitoringView::new(config.log_limit, config.refresh_interval));
    let server_config = ServerConfig {
        bind: config.bind.clone(),
        port: config.port,
        max_body_size: config.max_body_bytes()?,
    };

    eprintln!("SmartClass dashboard on http://{}", server_config.addr());
    eprintln!("Press Ctrl+C to stop.");

    let server = DashboardServer::new(server_config, state);
    server
        .run(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
}

async fn cmd_devices(directory: &HttpDirectory, action: &DeviceCommand, out: &Output) -> Result<()> {
    match action {
        DeviceCommand::List => {
            let devices = directory.list_devices().await?;
            if out.is_json() {
                return out.json(&devices);
            }
            out.text(&device_table(&devices));
        }

        DeviceCommand::Show { id } => {
            let device = directory.get_device(id).await?;
            if out.is_json() {
                return out.json(&device);
            }
            out.text(&device_table(std::slice::from_ref(&device)));
        }

        DeviceCommand::Add {
            name,
            location,
            device_type,
            status,
        } => {
            let mut admin = AdminView::new();
            admin.open_create();
            let form = DeviceForm {
                name: name.clone(),
                location: location.clone(),
                device_type: *device_type,
                status: status
                    .clone()
                    .unwrap_or_else(|| device_type.vocabulary()[0].to_string()),
            };
            admin.update_form(form);
            let device = admin.submit(directory).await?;
            print_saved(&device, "Created", out)?;
        }

        DeviceCommand::Edit {
            id,
            name,
            location,
            device_type,
            status,
        } => {
            let mut admin = AdminView::new();
            admin.open_edit(directory, id).await?;

            let mut form = admin.form().clone();
            if let Some(kind) = device_type {
                form = form.with_type(*kind);
            }
            if let Some(name) = name {
                form.name = name.clone();
            }
            if let Some(location) = location {
                form.location = location.clone();
            }
            if let Some(status) = status {
                form.status = status.clone();
            }
            admin.update_form(form);
            let device = admin.submit(directory).await?;
            print_saved(&device, "Updated", out)?;
        }

        DeviceCommand::Delete { id, yes } => {
            let mut admin = AdminView::new();
            admin.enter(directory).await;
            admin.request_delete(id)?;

            let name = admin
                .devices()
                .iter()
                .find(|d| &d.id == id)
                .map(|d| d.name.clone())
                .unwrap_or_default();
            let confirmed = *yes || confirm(&format!("Delete device '{}' ({})?", name, id))?;

            if admin.delete(directory, id, confirmed).await? {
                out.text(&format!("Deleted device {}\n", id));
            } else {
                out.text("Cancelled\n");
            }
        }
    }
    Ok(())
}

fn print_saved(device: &Device, verb: &str, out: &Output) -> Result<()> {
    if out.is_json() {
        return out.json(device);
    }
    out.text(&format!("{} device {}\n", verb, device.id));
    out.text(&device_table(std::slice::from_ref(device)));
    Ok(())
}

fn confirm(question: &str) -> Result<bool> {
    let term = Term::stderr();
    term.write_str(&format!("{} [y/N] ", question))?;
    let answer = term.read_line()?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

async fn cmd_classrooms(directory: &HttpDirectory, out: &Output) -> Result<()> {
    let mut control = ControlView::new();
    control.load(directory).await?;

    if out.is_json() {
        let classrooms: Vec<_> = control
            .classrooms()
            .into_iter()
            .map(|location| {
                let devices: Vec<&Device> = control
                    .devices()
                    .iter()
                    .filter(|d| d.location == location)
                    .collect();
                serde_json::json!({ "location": location, "devices": devices })
            })
            .collect();
        return out.json(&classrooms);
    }

    out.text(&classroom_summary(control.devices()));
    Ok(())
}

async fn cmd_toggle(directory: &HttpDirectory, id: &str, out: &Output) -> Result<()> {
    let mut control = ControlView::new();
    control.load(directory).await?;

    let device = control
        .devices()
        .iter()
        .find(|d| d.id == id)
        .cloned()
        .ok_or_else(|| DashboardError::DeviceNotFound(id.to_string()))?;
    if !device.device_type().is_controllable() {
        return Err(DashboardError::ActionUnavailable(
            "motion sensors cannot be toggled".to_string(),
        ));
    }

    control.select(device.location.clone());
    control.toggle(directory, id).await?;

    let updated = control
        .devices()
        .iter()
        .find(|d| d.id == id)
        .cloned()
        .unwrap_or(device);
    if out.is_json() {
        return out.json(&updated);
    }
    out.text(&format!("{} is now {}\n", updated.name, updated.status()));
    Ok(())
}

async fn cmd_secure(directory: &HttpDirectory, location: &str, out: &Output) -> Result<()> {
    let mut control = ControlView::new();
    control.load(directory).await?;
    if !control.classrooms().contains(&location) {
        return Err(DashboardError::ActionUnavailable(format!(
            "no devices in classroom '{}'",
            location
        )));
    }
    control.select(location);

    let spinner = out.spinner(&format!("Securing {}...", location));
    let report = match control.secure_classroom(directory).await {
        Ok(report) => report,
        Err(e) => {
            spinner.finish_error("Not secured");
            return Err(e);
        }
    };

    if report.is_complete() {
        spinner.finish_success("Classroom secured");
    } else {
        spinner.finish_error("Some devices could not be secured");
    }

    if out.is_json() {
        out.json(&serde_json::json!({
            "location": report.location,
            "secured": report.secured,
            "failed": report.failed.iter().map(|(id, e)| serde_json::json!({ "id": id, "error": e.to_string() })).collect::<Vec<_>>(),
            "unlogged": report.unlogged,
        }))?;
    } else {
        out.text(&secure_summary(&report));
    }

    let failures: Vec<Result<()>> = report.failed.into_iter().map(|(_, e)| Err(e)).collect();
    collect_errors(failures)
        .map(|_| ())
        .map_err(|e| e.with_context(format!("Securing {}", location)))
}

async fn cmd_logs(directory: &HttpDirectory, limit: usize, out: &Output) -> Result<()> {
    let (logs, devices) = tokio::join!(directory.list_recent_logs(limit), directory.list_devices());
    let logs = logs?;
    if out.is_json() {
        return out.json(&logs);
    }
    out.text(&log_table(&logs, &devices.unwrap_or_default()));
    Ok(())
}

fn snapshot_json(snapshot: &MonitorSnapshot) -> serde_json::Value {
    let section = |value: std::result::Result<serde_json::Value, &String>| match value {
        Ok(v) => v,
        Err(e) => serde_json::json!({ "error": e }),
    };
    serde_json::json!({
        "fetched_at": snapshot.fetched_at,
        "devices": section(snapshot.devices.as_ref().map(|d| serde_json::json!(d))),
        "logs": section(snapshot.logs.as_ref().map(|l| serde_json::json!(l))),
    })
}

async fn cmd_monitor(
    directory: &HttpDirectory,
    view: &MonitoringView,
    tui: bool,
    once: bool,
    out: &Output,
) -> Result<()> {
    if once {
        let snapshot = view.fetch(directory).await;
        if out.is_json() {
            return out.json(&snapshot_json(&snapshot));
        }
        out.text(&snapshot_report(&snapshot));
        return Ok(());
    }

    if tui {
        return monitor_tui(directory, view).await;
    }

    let term = Term::stdout();
    let poll = view.poll(directory, |snapshot| {
        if out.is_json() {
            if let Ok(line) = serde_json::to_string(&snapshot_json(&snapshot)) {
                println!("{}", line);
            }
        } else {
            let _ = term.clear_screen();
            out.text(&snapshot_report(&snapshot));
        }
        async { ControlFlow::Continue(()) }
    });

    tokio::select! {
        _ = poll => {}
        _ = tokio::signal::ctrl_c() => {}
    }
    Ok(())
}

#[cfg(feature = "tui")]
async fn monitor_tui(directory: &HttpDirectory, view: &MonitoringView) -> Result<()> {
    use smartclass::terminal::tui::TuiDashboard;

    let dashboard = TuiDashboard::new();
    let shared = dashboard.snapshot_handle();
    let handle = dashboard.spawn();

    view.poll(directory, |snapshot| {
        if let Ok(mut slot) = shared.lock() {
            *slot = Some(snapshot);
        }
        let quit = handle.is_finished();
        async move {
            if quit {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        }
    })
    .await;

    let _ = handle.join();
    Ok(())
}

#[cfg(not(feature = "tui"))]
async fn monitor_tui(_directory: &HttpDirectory, _view: &MonitoringView) -> Result<()> {
    Err(DashboardError::config(
        "TUI support not compiled in; rebuild with --features tui",
    ))
}
