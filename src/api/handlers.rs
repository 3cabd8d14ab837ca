//! Dashboard Request Handlers
//!
//! Routes requests to the view controllers and wraps their output in pages.
//! Every POST renders the resulting page directly.

use crate::api::assets::asset;
use crate::api::models::{ApiError, HEALTH_OK};
use crate::api::server::{Request, Response};
use crate::directory::DeviceDirectory;
use crate::error::DashboardError;
use crate::model::DeviceType;
use crate::views::html::{page, Page};
use crate::views::{AdminView, ControlView, DeviceForm, MonitoringView};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::warn;

/// Application state shared across handlers
pub struct AppState {
    /// Device store every view talks to
    pub directory: Arc<dyn DeviceDirectory>,
    /// Admin view of the dashboard
    pub admin: Mutex<AdminView>,
    /// Control view of the dashboard
    pub control: Mutex<ControlView>,
    /// Monitoring settings
    pub monitoring: MonitoringView,
}

impl AppState {
    /// Create new application state
    pub fn new(directory: Arc<dyn DeviceDirectory>) -> Self {
        Self {
            directory,
            admin: Mutex::new(AdminView::new()),
            control: Mutex::new(ControlView::new()),
            monitoring: MonitoringView::default(),
        }
    }

    pub fn with_monitoring(mut self, monitoring: MonitoringView) -> Self {
        self.monitoring = monitoring;
        self
    }
}

/// Route HTTP request to appropriate handler
pub async fn route(state: &AppState, request: &Request) -> Response {
    let segments = request.segments();
    let segments: Vec<&str> = segments.iter().map(String::as_str).collect();

    match (request.method.as_str(), segments.as_slice()) {
        ("GET", []) => Response::html(page("Home", Page::Home, &render_index(), None)),

        // Admin
        ("GET", ["admin"]) => {
            let mut admin = state.admin.lock().await;
            admin.enter(state.directory.as_ref()).await;
            admin_page(&admin)
        }
        ("GET", ["admin", "new"]) => {
            let mut admin = state.admin.lock().await;
            admin.open_create();
            if let Some(kind) = request.query_param("type").and_then(|t| t.parse().ok()) {
                admin.change_type(kind);
            }
            admin_page(&admin)
        }
        ("POST", ["admin", "devices"]) => handle_device_form(state, request).await,
        ("GET", ["admin", "devices", id, "edit"]) => {
            let mut admin = state.admin.lock().await;
            let _ = admin.open_edit(state.directory.as_ref(), id).await;
            admin_page(&admin)
        }
        ("GET", ["admin", "devices", id, "delete"]) => {
            let mut admin = state.admin.lock().await;
            if let Err(e) = admin.request_delete(id) {
                warn!(device_id = %id, error = %e, "Delete requested for unknown device");
            }
            admin_page(&admin)
        }
        ("POST", ["admin", "devices", id, "delete"]) => {
            let confirmed = request.form_field("confirm") == Some("yes");
            let mut admin = state.admin.lock().await;
            let _ = admin.delete(state.directory.as_ref(), id, confirmed).await;
            admin_page(&admin)
        }
        ("GET", ["admin", "notice", "dismiss"]) => {
            let mut admin = state.admin.lock().await;
            admin.dismiss_notice();
            admin_page(&admin)
        }

        // Control
        ("GET", ["control"]) => {
            let mut control = state.control.lock().await;
            let _ = control.load(state.directory.as_ref()).await;
            control_page(&control)
        }
        ("POST", ["control", "select"]) => {
            let mut control = state.control.lock().await;
            match request.form_field("location") {
                Some(location) => control.select(location),
                None => return Response::error(&ApiError::bad_request("Missing location")),
            }
            control_page(&control)
        }
        ("POST", ["control", "back"]) => {
            let mut control = state.control.lock().await;
            control.back();
            control_page(&control)
        }
        ("POST", ["control", "toggle", id]) => {
            let mut control = state.control.lock().await;
            let _ = control.toggle(state.directory.as_ref(), id).await;
            control_page(&control)
        }
        ("POST", ["control", "secure"]) => {
            let mut control = state.control.lock().await;
            if let Err(e) = control.secure_classroom(state.directory.as_ref()).await {
                warn!(error = %e, "Secure classroom refused");
            }
            control_page(&control)
        }

        // Monitoring
        ("GET", ["monitoring"]) => {
            let snapshot = state.monitoring.fetch(state.directory.as_ref()).await;
            let body = state.monitoring.render(&snapshot);
            Response::html(page(
                "Monitoring",
                Page::Monitoring,
                &body,
                Some(state.monitoring.interval),
            ))
        }

        // JSON passthrough
        ("GET", ["api", "devices"]) => match state.directory.list_devices().await {
            Ok(devices) => Response::json(200, &devices),
            Err(e) => upstream_error(e),
        },
        ("GET", ["api", "logs"]) => {
            let limit = match request.query_param("limit") {
                Some(raw) => match raw.parse::<usize>() {
                    Ok(limit) if limit > 0 => limit,
                    _ => return Response::error(&ApiError::bad_request(format!("Invalid limit: {}", raw))),
                },
                None => state.monitoring.log_limit,
            };
            match state.directory.list_recent_logs(limit).await {
                Ok(logs) => Response::json(200, &logs),
                Err(e) => upstream_error(e),
            }
        }

        ("GET", ["assets", file]) => match asset(file) {
            Some(svg) => Response::svg(svg),
            None => Response::error(&ApiError::not_found("Asset not found")),
        },

        // Health check
        ("GET", ["health"]) => Response::text(200, HEALTH_OK),

        // Not found
        _ => Response::error(&ApiError::not_found("Not found")),
    }
}

/// Handler for POST /admin/devices
async fn handle_device_form(state: &AppState, request: &Request) -> Response {
    let device_type = match request.form_field("type").map(str::parse::<DeviceType>) {
        Some(Ok(kind)) => kind,
        Some(Err(e)) => return Response::error(&ApiError::bad_request(e.to_string())),
        None => DeviceType::Light,
    };
    let form = DeviceForm {
        name: request.form_field("name").unwrap_or_default().to_string(),
        location: request.form_field("location").unwrap_or_default().to_string(),
        device_type,
        status: request.form_field("status").unwrap_or_default().to_string(),
    };

    let mut admin = state.admin.lock().await;
    admin.update_form(form);
    if request.form_field("intent") == Some("refresh") {
        admin.change_type(device_type);
    } else {
        let _ = admin.submit(state.directory.as_ref()).await;
    }
    admin_page(&admin)
}

fn admin_page(admin: &AdminView) -> Response {
    Response::html(page("Device administration", Page::Admin, &admin.render(), None))
}

fn control_page(control: &ControlView) -> Response {
    Response::html(page("Classroom control", Page::Control, &control.render(), None))
}

fn upstream_error(err: DashboardError) -> Response {
    warn!(error = %err, "Device store request failed");
    Response::error(&ApiError::upstream(&err))
}

fn render_index() -> String {
    let card = |href: &str, icon: &str, title: &str, text: &str| {
        format!(
            r#"<div class="col"><div class="card h-100"><div class="card-body"><h5 class="card-title"><i class="bi bi-{}"></i> {}</h5><p class="card-text">{}</p><a class="btn btn-primary" href="{}">Open</a></div></div></div>"#,
            icon, title, text, href
        )
    };
    format!(
        r#"<div class="row row-cols-1 row-cols-md-3 g-3">{}{}{}</div>"#,
        card("/admin", "gear", "Admin", "Register, edit and remove classroom devices."),
        card("/control", "toggles", "Control", "Switch devices and secure a classroom."),
        card("/monitoring", "activity", "Monitoring", "Live device status and recent activity."),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::MemoryDirectory;

    fn demo_state() -> (Arc<MemoryDirectory>, AppState) {
        let directory = Arc::new(MemoryDirectory::demo());
        let state = AppState::new(directory.clone());
        (directory, state)
    }

    fn post(target: &str, body: &str) -> Request {
        Request::new("POST", target).with_form(body)
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let (_, state) = demo_state();
        let response = route(&state, &Request::new("GET", "/nope")).await;
        assert_eq!(response.status, 404);
        assert_eq!(response.content_type, "application/json");
        assert!(response.body.contains("NOT_FOUND"));
    }

    #[tokio::test]
    async fn test_admin_create_flow() {
        let (directory, state) = demo_state();

        let response = route(&state, &Request::new("GET", "/admin/new?type=window")).await;
        assert!(response.body.contains(r#"<option value="open" selected>"#));

        let response = route(
            &state,
            &post("/admin/devices", "intent=save&name=Projector+light&location=Room+202&type=light&status=off"),
        )
        .await;
        assert_eq!(response.status, 200);
        assert!(response.body.contains("Projector light"));
        assert_eq!(directory.list_devices().await.unwrap().len(), 9);
    }

    #[tokio::test]
    async fn test_admin_type_change_refreshes_options() {
        let (directory, state) = demo_state();
        route(&state, &Request::new("GET", "/admin/new")).await;

        let response = route(
            &state,
            &post("/admin/devices", "intent=refresh&name=X&location=Y&type=door&status=on"),
        )
        .await;
        assert!(response.body.contains(r#"<option value="locked" selected>"#));
        assert_eq!(directory.list_devices().await.unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_admin_delete_requires_confirmation() {
        let (directory, state) = demo_state();
        route(&state, &Request::new("GET", "/admin")).await;

        let response = route(&state, &Request::new("GET", "/admin/devices/1/delete")).await;
        assert!(response.body.contains("Main light"));
        assert!(response.body.contains(r#"action="/admin/devices/1/delete""#));

        route(&state, &post("/admin/devices/1/delete", "")).await;
        assert_eq!(directory.list_devices().await.unwrap().len(), 8);

        route(&state, &post("/admin/devices/1/delete", "confirm=yes")).await;
        assert_eq!(directory.list_devices().await.unwrap().len(), 7);
    }

    #[tokio::test]
    async fn test_control_flow() {
        let (directory, state) = demo_state();

        let response = route(&state, &Request::new("GET", "/control")).await;
        assert!(response.body.contains("Chemistry Lab"));

        let response = route(&state, &post("/control/select", "location=Chemistry+Lab")).await;
        assert!(response.body.contains("MOTION DETECTED"));

        route(&state, &post("/control/back", "")).await;
        route(&state, &post("/control/select", "location=Room+101")).await;
        let response = route(&state, &post("/control/secure", "")).await;
        assert!(response.body.contains("alert-success"));
        assert_eq!(directory.logs().len(), 3);

        route(&state, &post("/control/toggle/1", "")).await;
        assert_eq!(directory.get_device("1").await.unwrap().status(), "on");
    }

    #[tokio::test]
    async fn test_monitoring_page_refreshes() {
        let (_, state) = demo_state();
        let response = route(&state, &Request::new("GET", "/monitoring")).await;
        assert!(response.body.contains(r#"http-equiv="refresh" content="2""#));
        assert!(response.body.contains("/assets/door-open.svg"));
    }

    #[tokio::test]
    async fn test_json_endpoints() {
        let (directory, state) = demo_state();
        let response = route(&state, &Request::new("GET", "/api/devices")).await;
        let devices: Vec<serde_json::Value> = serde_json::from_str(&response.body).unwrap();
        assert_eq!(devices.len(), 8);
        assert_eq!(devices[0]["type"], "light");

        let response = route(&state, &Request::new("GET", "/api/logs?limit=0")).await;
        assert_eq!(response.status, 400);

        directory.fail_lists(true);
        let response = route(&state, &Request::new("GET", "/api/logs")).await;
        assert_eq!(response.status, 502);
        assert!(response.body.contains(r#""recoverable":true"#));
    }

    #[tokio::test]
    async fn test_health_and_assets() {
        let (_, state) = demo_state();
        assert_eq!(route(&state, &Request::new("GET", "/health")).await.body, "OK");
        let svg = route(&state, &Request::new("GET", "/assets/light-on.svg")).await;
        assert_eq!(svg.content_type, "image/svg+xml");
    }
}
