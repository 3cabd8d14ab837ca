//! # SmartClass - Smart-Classroom Device Dashboard
//!
//! SmartClass manages the simulated IoT devices of a school (lights, doors,
//! windows and motion sensors) through a remote REST device store. It offers
//! three views over the same store:
//!
//! - **Admin**: register, edit and delete devices
//! - **Control**: toggle devices per classroom and "secure" a classroom
//!   (switch off, close and lock everything) unless motion is detected
//! - **Monitoring**: live device cards and the most recent status changes
//!
//! The views are served as web pages by a small built-in HTTP server and are
//! also available as CLI commands.
//!
//! ## Quick Start
//!
//! ```no_run
//! use smartclass::directory::{DeviceDirectory, HttpDirectory, DEFAULT_API_URL};
//!
//! # async fn demo() -> smartclass::Result<()> {
//! let directory = HttpDirectory::new(DEFAULT_API_URL, None)?;
//! for device in directory.list_devices().await? {
//!     println!("{} ({}) is {}", device.name, device.location, device.status());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Securing a Classroom
//!
//! ```no_run
//! use smartclass::directory::MemoryDirectory;
//! use smartclass::views::ControlView;
//!
//! # async fn demo() -> smartclass::Result<()> {
//! let directory = MemoryDirectory::demo();
//! let mut control = ControlView::new();
//! control.load(&directory).await?;
//! control.select("Room 101");
//!
//! let report = control.secure_classroom(&directory).await?;
//! println!("{} of {} devices secured", report.secured.len(), report.attempted());
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]

pub mod api;
pub mod config;
pub mod directory;
pub mod error;
pub mod model;
pub mod terminal;
pub mod views;

// Re-export commonly used types
pub use config::DashboardConfig;
pub use directory::{DeviceDirectory, HttpDirectory, MemoryDirectory};
pub use error::{DashboardError, Result};
pub use model::{Device, DeviceState, DeviceType, StatusLog};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    //! Convenient re-exports for common usage
    //!
    //! ```no_run
    //! use smartclass::prelude::*;
    //! ```

    pub use crate::api::{AppState, DashboardServer, ServerConfig};
    pub use crate::config::DashboardConfig;
    pub use crate::directory::{DeviceDirectory, HttpDirectory, MemoryDirectory};
    pub use crate::error::{DashboardError, Result};
    pub use crate::model::{Device, DeviceFields, DeviceState, DeviceType, NewStatusLog, StatusLog};
    pub use crate::views::{AdminView, ControlView, MonitoringView, SecureReport};
}
