//! Terminal User Interface (TUI) monitoring dashboard
//!
//! Draws the latest monitoring snapshot with Ratatui:
//! - Device table with coloured statuses
//! - Recent status log
//! - Key bindings: q=quit

use std::io;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};
use tracing::error;

use crate::views::{format_local, resolve_location, status_variant, MonitorSnapshot};

/// Latest snapshot, shared between the poll loop and the TUI thread.
pub type SharedSnapshot = Arc<Mutex<Option<MonitorSnapshot>>>;

/// The TUI dashboard controller.
pub struct TuiDashboard {
    snapshot: SharedSnapshot,
}

impl TuiDashboard {
    pub fn new() -> Self {
        Self {
            snapshot: Arc::new(Mutex::new(None)),
        }
    }

    /// Handle for publishing snapshots from the poll loop.
    pub fn snapshot_handle(&self) -> SharedSnapshot {
        Arc::clone(&self.snapshot)
    }

    /// Spawn the TUI in a background thread. The thread ends when the
    /// operator quits.
    pub fn spawn(self) -> thread::JoinHandle<()> {
        let snapshot = self.snapshot;
        thread::spawn(move || {
            if let Err(e) = run_tui(snapshot) {
                error!(error = %e, "TUI error");
            }
        })
    }
}

impl Default for TuiDashboard {
    fn default() -> Self {
        Self::new()
    }
}

fn run_tui(snapshot: SharedSnapshot) -> io::Result<()> {
    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        let current = snapshot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        terminal.draw(|frame| draw_ui(frame, current.as_ref()))?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press
                    && matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
                {
                    break;
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }

    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

fn status_color(status: &str) -> Color {
    match status_variant(status) {
        "success" => Color::Green,
        _ => Color::DarkGray,
    }
}

fn draw_ui(frame: &mut Frame, snapshot: Option<&MonitorSnapshot>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(6),    // Devices
            Constraint::Min(6),    // Logs
            Constraint::Length(2), // Footer
        ])
        .split(frame.area());

    let updated = snapshot
        .map(|s| format!("Updated {}", format_local(&s.fetched_at)))
        .unwrap_or_else(|| "Waiting for the first refresh...".to_string());
    let title = Paragraph::new(format!("SmartClass Monitoring  {}", updated))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(title, chunks[0]);

    let Some(snapshot) = snapshot else {
        return;
    };

    // Devices
    let device_block = Block::default().title(" Devices ").borders(Borders::ALL);
    match &snapshot.devices {
        Ok(devices) => {
            let rows: Vec<Row> = devices
                .iter()
                .map(|d| {
                    Row::new(vec![
                        Cell::from(d.name.clone()),
                        Cell::from(d.device_type().as_str()),
                        Cell::from(d.status()).style(Style::default().fg(status_color(d.status()))),
                        Cell::from(d.location.clone()),
                    ])
                })
                .collect();
            let widths = [
                Constraint::Percentage(35),
                Constraint::Percentage(20),
                Constraint::Percentage(15),
                Constraint::Percentage(30),
            ];
            let table = Table::new(rows, widths)
                .header(Row::new(vec!["Name", "Type", "Status", "Location"]).style(Style::default().bold()))
                .block(device_block);
            frame.render_widget(table, chunks[1]);
        }
        Err(e) => {
            let message = Paragraph::new(format!("Could not load devices: {}", e))
                .style(Style::default().fg(Color::Red))
                .block(device_block);
            frame.render_widget(message, chunks[1]);
        }
    }

    // Status log
    let log_block = Block::default().title(" Recent activity ").borders(Borders::ALL);
    match &snapshot.logs {
        Ok(logs) => {
            let devices = snapshot.devices.as_deref().unwrap_or_default();
            let rows: Vec<Row> = logs
                .iter()
                .map(|log| {
                    Row::new(vec![
                        Cell::from(format_local(&log.timestamp)),
                        Cell::from(log.device_name.clone()),
                        Cell::from(resolve_location(devices, &log.device_id).to_string()),
                        Cell::from(log.new_status.clone())
                            .style(Style::default().fg(status_color(&log.new_status))),
                    ])
                })
                .collect();
            let widths = [
                Constraint::Length(20),
                Constraint::Percentage(35),
                Constraint::Percentage(30),
                Constraint::Percentage(15),
            ];
            let table = Table::new(rows, widths)
                .header(Row::new(vec!["Time", "Device", "Location", "Status"]).style(Style::default().bold()))
                .block(log_block);
            frame.render_widget(table, chunks[2]);
        }
        Err(e) => {
            let message = Paragraph::new(format!("Could not load the status log: {}", e))
                .style(Style::default().fg(Color::Red))
                .block(log_block);
            frame.render_widget(message, chunks[2]);
        }
    }

    let footer = Paragraph::new(" q: quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(footer, chunks[3]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_status_colors() {
        assert_eq!(status_color("open"), Color::Green);
        assert_eq!(status_color("locked"), Color::DarkGray);
    }

    #[test]
    fn test_draws_failed_snapshot() {
        let snapshot = MonitorSnapshot {
            devices: Err("connection refused".into()),
            logs: Ok(Vec::new()),
            fetched_at: Utc::now(),
        };
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| draw_ui(frame, Some(&snapshot))).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Could not load devices"));
    }

    #[test]
    fn test_shared_snapshot_handle() {
        let dashboard = TuiDashboard::new();
        let handle = dashboard.snapshot_handle();
        assert!(handle.lock().unwrap().is_none());
    }
}
