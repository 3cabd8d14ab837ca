//! Device and status-log data model
//!
//! Devices carry their type and status as a single tagged value so a status
//! outside the type's vocabulary cannot be constructed. The wire format used
//! by the remote device store stays the flat `{type, status}` string pair.

mod device;
mod log;

pub use device::*;
pub use log::*;
