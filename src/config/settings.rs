//! Configuration settings for SmartClass
//!
//! Defines all configuration options, CLI arguments, and defaults
//! for the dashboard.

use crate::directory::{DEFAULT_API_URL, DEFAULT_LOG_LIMIT};
use crate::error::{DashboardError, Result};
use crate::model::DeviceType;
use crate::views::DEFAULT_REFRESH_INTERVAL;
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// SmartClass - Smart-classroom device dashboard
#[derive(Parser, Debug, Clone)]
#[command(name = "smartclass")]
#[command(author = "SmartClass Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Admin, control and monitoring dashboard for smart-classroom devices")]
#[command(long_about = r#"
SmartClass manages the lights, doors, windows and motion sensors of a school
through a remote device store.

Examples:
  smartclass devices list                       # Device table
  smartclass devices add --name Lamp --location "Room 101" --type light
  smartclass secure "Room 101"                  # Switch off, close and lock
  smartclass monitor --interval 5s              # Live status
  smartclass serve --port 8080                  # Web dashboard
"#)]
pub struct CliArgs {
    /// Base URL of the device store
    #[arg(long, env = "SMARTCLASS_API_URL", value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// JSON configuration file
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Timeout for each request to the device store (e.g., 10s)
    #[arg(long, value_name = "DURATION", value_parser = parse_duration, global = true)]
    pub timeout: Option<Duration>,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Output format for command results
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Log line format
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Manage registered devices
    #[command(name = "devices")]
    Devices {
        #[command(subcommand)]
        action: DeviceCommand,
    },

    /// List classrooms and their devices
    #[command(name = "classrooms")]
    Classrooms,

    /// Toggle a light, door or window
    #[command(name = "toggle")]
    Toggle {
        /// Device ID
        id: String,
    },

    /// Switch off, close and lock every device of a classroom
    #[command(name = "secure")]
    Secure {
        /// Classroom (device location)
        location: String,
    },

    /// Show the most recent status changes
    #[command(name = "logs")]
    Logs {
        /// Number of entries
        #[arg(short, long, value_name = "NUM")]
        limit: Option<usize>,
    },

    /// Poll devices and logs and print them on every refresh
    #[command(name = "monitor")]
    Monitor {
        /// Refresh interval (e.g., 2s, 500ms)
        #[arg(short, long, value_name = "DURATION", value_parser = parse_duration)]
        interval: Option<Duration>,
        /// Draw a terminal dashboard (requires the `tui` feature)
        #[arg(long)]
        tui: bool,
        /// Print one snapshot and exit
        #[arg(long)]
        once: bool,
    },

    /// Run the web dashboard
    #[command(name = "serve")]
    Serve {
        /// Listen port
        #[arg(short, long)]
        port: Option<u16>,
        /// Bind address
        #[arg(short, long)]
        bind: Option<String>,
        /// Serve in-memory sample classrooms instead of the device store
        #[arg(long)]
        demo: bool,
    },
}

/// Device subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum DeviceCommand {
    /// List all devices
    List,

    /// Show one device
    Show {
        /// Device ID
        id: String,
    },

    /// Register a device
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        location: String,
        /// light, door, window or motion_sensor
        #[arg(long = "type", value_name = "TYPE", value_parser = parse_device_type)]
        device_type: DeviceType,
        /// Initial status (defaults to the first status of the type)
        #[arg(long)]
        status: Option<String>,
    },

    /// Change fields of a device
    Edit {
        /// Device ID
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long = "type", value_name = "TYPE", value_parser = parse_device_type)]
        device_type: Option<DeviceType>,
        #[arg(long)]
        status: Option<String>,
    },

    /// Delete a device
    Delete {
        /// Device ID
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Output format for command results
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON format
    Json,
}

/// Log line format
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Compact human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Base URL of the device store
    pub api_url: String,
    /// Timeout for each store request; none by default
    #[serde(with = "duration_opt_str")]
    pub request_timeout: Option<Duration>,
    /// Monitoring refresh interval
    #[serde(with = "duration_str")]
    pub refresh_interval: Duration,
    /// Log entries shown by the monitoring view
    pub log_limit: usize,
    /// Dashboard bind address
    pub bind: String,
    /// Dashboard port
    pub port: u16,
    /// Maximum request body accepted by the dashboard (e.g., "64K")
    pub max_body_size: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: None,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            log_limit: DEFAULT_LOG_LIMIT,
            bind: "127.0.0.1".to_string(),
            port: 8080,
            max_body_size: "64K".to_string(),
        }
    }
}

impl DashboardConfig {
    /// Load a JSON configuration file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| DashboardError::Io(e).with_context(format!("Reading {}", path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|e| DashboardError::config(format!("{}: {}", path.display(), e)))
    }

    /// Create config from CLI arguments, on top of the config file if given
    pub fn from_cli(args: &CliArgs) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(url) = &args.api_url {
            config.api_url = url.clone();
        }
        if args.timeout.is_some() {
            config.request_timeout = args.timeout;
        }

        match &args.command {
            Commands::Monitor {
                interval: Some(interval),
                ..
            } => config.refresh_interval = *interval,
            Commands::Logs { limit: Some(limit) } => config.log_limit = *limit,
            Commands::Serve { port, bind, .. } => {
                if let Some(port) = port {
                    config.port = *port;
                }
                if let Some(bind) = bind {
                    config.bind = bind.clone();
                }
            }
            _ => {}
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.refresh_interval.is_zero() {
            return Err(DashboardError::config("refresh interval must be greater than zero"));
        }
        if self.log_limit == 0 {
            return Err(DashboardError::config("log limit must be at least 1"));
        }
        self.max_body_bytes()?;
        Ok(())
    }

    /// `max_body_size` in bytes
    pub fn max_body_bytes(&self) -> Result<usize> {
        parse_size(&self.max_body_size)
            .and_then(|n| usize::try_from(n).map_err(|_| format!("Size too large: {}", n)))
            .map_err(|e| DashboardError::config(format!("Invalid max body size: {}", e)))
    }
}

/// Parse a human-readable duration such as `2s` or `500ms`
pub fn parse_duration(value: &str) -> std::result::Result<Duration, String> {
    humantime::parse_duration(value).map_err(|e| format!("Invalid duration '{}': {}", value, e))
}

fn parse_device_type(value: &str) -> std::result::Result<DeviceType, String> {
    value.parse().map_err(|e: DashboardError| e.to_string())
}

/// Parse human-readable size string to bytes
pub fn parse_size(size: &str) -> std::result::Result<u64, String> {
    let size = size.trim().to_uppercase();

    if size.is_empty() {
        return Err("Empty size string".to_string());
    }

    let (num_str, multiplier) = if size.ends_with("MB") || size.ends_with('M') {
        (size.trim_end_matches(['M', 'B']), 1024u64 * 1024)
    } else if size.ends_with("KB") || size.ends_with('K') {
        (size.trim_end_matches(['K', 'B']), 1024u64)
    } else if size.ends_with('B') {
        (size.trim_end_matches('B'), 1u64)
    } else {
        // Assume bytes if no suffix
        (size.as_str(), 1u64)
    };

    let num: u64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("Invalid number: {}", num_str))?;

    num.checked_mul(multiplier)
        .ok_or_else(|| format!("Size too large: {}", size))
}

mod duration_str {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

mod duration_opt_str {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&humantime::format_duration(*d).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| humantime::parse_duration(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}
