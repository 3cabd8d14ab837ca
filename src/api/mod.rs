//! SmartClass Dashboard Server
//!
//! Serves the Admin, Control and Monitoring views as HTML pages, plus a
//! small JSON passthrough to the device store. View state lives in the
//! server, one controller per view, shared by every browser tab.
//!
//! ## Routes
//!
//! | Route | Method | Description |
//! |-------|--------|-------------|
//! | `/` | GET | Index with links to the three views |
//! | `/admin` | GET | Device table (closes every dialog) |
//! | `/admin/new` | GET | Create dialog (`?type=` preselects a type) |
//! | `/admin/devices` | POST | Dialog submit (`intent=save` or `intent=refresh`) |
//! | `/admin/devices/{id}/edit` | GET | Edit dialog |
//! | `/admin/devices/{id}/delete` | GET | Delete confirmation |
//! | `/admin/devices/{id}/delete` | POST | Confirmed delete (`confirm=yes`) |
//! | `/admin/notice/dismiss` | GET | Dismiss the blocking notice |
//! | `/control` | GET | Classroom selector |
//! | `/control/select` | POST | Open a classroom panel |
//! | `/control/back` | POST | Back to the selector |
//! | `/control/toggle/{id}` | POST | Toggle a device |
//! | `/control/secure` | POST | Secure the selected classroom |
//! | `/monitoring` | GET | Auto-refreshing device cards and status log |
//! | `/api/devices` | GET | Device list (JSON) |
//! | `/api/logs` | GET | Recent status logs (JSON, `?limit=`) |
//! | `/assets/{file}` | GET | Device card images |
//! | `/health` | GET | Liveness check |

mod assets;
mod handlers;
mod models;
mod server;

pub use assets::*;
pub use handlers::*;
pub use models::*;
pub use server::*;
