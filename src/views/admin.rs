//! Admin view: device table and the create/edit/delete dialogs
//!
//! The view holds one modal whose state is closed, creating, or editing a
//! specific device. Mutations that fail leave the table as last loaded and
//! raise a blocking notice.

use crate::directory::DeviceDirectory;
use crate::error::{DashboardError, Result};
use crate::model::{Device, DeviceFields, DeviceState, DeviceType};
use crate::views::html::escape;
use crate::views::Notice;
use std::fmt::Write;
use tracing::{error, info};

const EMPTY_TABLE_ROW: &str =
    r#"<tr><td colspan="5" class="text-center">No devices registered.</td></tr>"#;
const LOAD_ERROR_ROW: &str =
    r#"<tr><td colspan="5" class="text-center text-danger">Failed to load device data.</td></tr>"#;

/// State of the device dialog
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ModalState {
    #[default]
    Closed,
    Create,
    /// Editing the device with this ID
    Edit(String),
}

/// Values of the device dialog's fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceForm {
    pub name: String,
    pub location: String,
    pub device_type: DeviceType,
    pub status: String,
}

impl Default for DeviceForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            location: String::new(),
            device_type: DeviceType::Light,
            status: DeviceType::Light.vocabulary()[0].to_string(),
        }
    }
}

impl DeviceForm {
    pub fn from_device(device: &Device) -> Self {
        Self {
            name: device.name.clone(),
            location: device.location.clone(),
            device_type: device.device_type(),
            status: device.status().to_string(),
        }
    }

    /// Switch the type; the status falls back to the first option when it
    /// is not in the new type's vocabulary.
    pub fn with_type(mut self, device_type: DeviceType) -> Self {
        self.device_type = device_type;
        if !device_type.vocabulary().contains(&self.status.as_str()) {
            self.status = device_type.vocabulary()[0].to_string();
        }
        self
    }

    /// Validated record for the store
    pub fn to_fields(&self) -> Result<DeviceFields> {
        let state = DeviceState::parse(self.device_type, &self.status)?;
        Ok(DeviceFields::new(self.name.trim(), self.location.trim(), state))
    }
}

/// Admin view controller
#[derive(Debug, Default)]
pub struct AdminView {
    devices: Vec<Device>,
    load_failed: bool,
    modal: ModalState,
    form: DeviceForm,
    pending_delete: Option<Device>,
    notice: Option<Notice>,
}

impl AdminView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn modal(&self) -> &ModalState {
        &self.modal
    }

    pub fn form(&self) -> &DeviceForm {
        &self.form
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Enter the view: close every dialog and load the table
    pub async fn enter(&mut self, directory: &dyn DeviceDirectory) {
        self.modal = ModalState::Closed;
        self.pending_delete = None;
        self.notice = None;
        self.reload(directory).await;
    }

    /// Reload the table from the store
    pub async fn reload(&mut self, directory: &dyn DeviceDirectory) {
        match directory.list_devices().await {
            Ok(devices) => {
                self.devices = devices;
                self.load_failed = false;
            }
            Err(e) => {
                error!(error = %e, "Failed to load devices");
                self.load_failed = true;
            }
        }
    }

    pub fn open_create(&mut self) {
        self.form = DeviceForm::default();
        self.modal = ModalState::Create;
    }

    /// Open the dialog for `id`. The modal stays closed when the device
    /// cannot be fetched.
    pub async fn open_edit(&mut self, directory: &dyn DeviceDirectory, id: &str) -> Result<()> {
        match directory.get_device(id).await {
            Ok(device) => {
                self.form = DeviceForm::from_device(&device);
                self.modal = ModalState::Edit(device.id);
                Ok(())
            }
            Err(e) => {
                error!(device_id = id, error = %e, "Failed to fetch device for editing");
                self.notice = Some(Notice::danger("Could not load the device for editing."));
                Err(e)
            }
        }
    }

    /// Repopulate the status options after a type change
    pub fn change_type(&mut self, device_type: DeviceType) {
        self.form = std::mem::take(&mut self.form).with_type(device_type);
    }

    /// Replace the dialog's field values with what the operator typed
    pub fn update_form(&mut self, form: DeviceForm) {
        self.form = form;
    }

    /// Submit the dialog: create when no device is held, otherwise replace
    /// the held device, then close and reload.
    pub async fn submit(&mut self, directory: &dyn DeviceDirectory) -> Result<Device> {
        let fields = match self.form.to_fields() {
            Ok(fields) => fields,
            Err(e) => {
                self.notice = Some(Notice::danger(format!("Could not save the device: {}", e)));
                return Err(e);
            }
        };

        let result = match &self.modal {
            ModalState::Create => directory.create_device(&fields).await,
            ModalState::Edit(id) => directory.update_device(id, &fields).await,
            ModalState::Closed => Err(DashboardError::ActionUnavailable(
                "no device dialog is open".to_string(),
            )),
        };

        match result {
            Ok(device) => {
                info!(device_id = %device.id, name = %device.name, "Saved device");
                self.modal = ModalState::Closed;
                self.notice = None;
                self.reload(directory).await;
                Ok(device)
            }
            Err(e) => {
                error!(error = %e, "Failed to save device");
                self.notice = Some(Notice::danger("Could not save the device."));
                Err(e)
            }
        }
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Ask for confirmation before deleting the device with `id`
    pub fn request_delete(&mut self, id: &str) -> Result<()> {
        let device = self
            .devices
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| DashboardError::DeviceNotFound(id.to_string()))?;
        self.pending_delete = Some(device);
        Ok(())
    }

    /// Delete `id` if `confirmed`, then reload. Returns whether a delete was
    /// issued.
    pub async fn delete(
        &mut self,
        directory: &dyn DeviceDirectory,
        id: &str,
        confirmed: bool,
    ) -> Result<bool> {
        self.pending_delete = None;
        if !confirmed {
            return Ok(false);
        }

        match directory.delete_device(id).await {
            Ok(()) => {
                info!(device_id = id, "Deleted device");
                self.reload(directory).await;
                Ok(true)
            }
            Err(e) => {
                error!(device_id = id, error = %e, "Failed to delete device");
                self.notice = Some(Notice::danger("Could not delete the device."));
                Err(e)
            }
        }
    }

    /// Page body for the current state
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str(
            r#"<div class="mb-3"><a class="btn btn-primary" href="/admin/new"><i class="bi bi-plus-lg"></i> Add device</a></div>"#,
        );
        out.push_str(
            r#"<table class="table table-striped align-middle"><thead><tr><th>Name</th><th>Type</th><th>Status</th><th>Location</th><th>Actions</th></tr></thead><tbody>"#,
        );
        if self.load_failed {
            out.push_str(LOAD_ERROR_ROW);
        } else {
            out.push_str(&Self::render_table(&self.devices));
        }
        out.push_str("</tbody></table>");

        if self.modal != ModalState::Closed {
            out.push_str(&self.render_modal());
        }
        if let Some(device) = &self.pending_delete {
            out.push_str(&render_delete_confirmation(device));
        }
        if let Some(notice) = &self.notice {
            out.push_str(&notice.render_dialog("/admin/notice/dismiss"));
        }
        out
    }

    /// Table rows, one per device, or the empty-state row
    pub fn render_table(devices: &[Device]) -> String {
        if devices.is_empty() {
            return EMPTY_TABLE_ROW.to_string();
        }

        let mut rows = String::new();
        for device in devices {
            let id = urlencoding::encode(&device.id);
            let _ = write!(
                rows,
                r#"<tr data-id="{data_id}"><td>{name}</td><td><span class="badge bg-info">{kind}</span></td><td>{status}</td><td>{location}</td><td><a class="btn btn-sm btn-warning" href="/admin/devices/{id}/edit"><i class="bi bi-pencil"></i></a> <a class="btn btn-sm btn-danger" href="/admin/devices/{id}/delete"><i class="bi bi-trash"></i></a></td></tr>"#,
                data_id = escape(&device.id),
                name = escape(&device.name),
                kind = device.device_type(),
                status = device.status(),
                location = escape(&device.location),
                id = id,
            );
        }
        rows
    }

    /// `<option>` list for the status select of `device_type`
    pub fn status_options(device_type: DeviceType, selected: &str) -> String {
        device_type
            .vocabulary()
            .iter()
            .map(|status| {
                let mark = if *status == selected { " selected" } else { "" };
                format!(r#"<option value="{0}"{1}>{0}</option>"#, status, mark)
            })
            .collect()
    }

    fn render_modal(&self) -> String {
        let title = match self.modal {
            ModalState::Edit(_) => "Edit device",
            _ => "Add new device",
        };
        let type_options: String = DeviceType::ALL
            .iter()
            .map(|t| {
                let mark = if *t == self.form.device_type { " selected" } else { "" };
                format!(r#"<option value="{0}"{1}>{0}</option>"#, t, mark)
            })
            .collect();

        format!(
            r#"<div class="modal d-block" tabindex="-1" role="dialog" style="background:rgba(0,0,0,.5)">
<div class="modal-dialog"><div class="modal-content">
<form method="post" action="/admin/devices">
<input type="hidden" name="intent" value="save">
<div class="modal-header"><h5 class="modal-title">{title}</h5></div>
<div class="modal-body">
<div class="mb-3"><label class="form-label" for="device-name">Name</label><input class="form-control" id="device-name" name="name" value="{name}" required></div>
<div class="mb-3"><label class="form-label" for="device-location">Location</label><input class="form-control" id="device-location" name="location" value="{location}" required></div>
<div class="mb-3"><label class="form-label" for="device-type">Type</label><select class="form-select" id="device-type" name="type" onchange="this.form.elements['intent'].value='refresh';this.form.submit()">{type_options}</select></div>
<div class="mb-3"><label class="form-label" for="device-status">Status</label><select class="form-select" id="device-status" name="status">{status_options}</select></div>
</div>
<div class="modal-footer"><a class="btn btn-secondary" href="/admin">Cancel</a><button type="submit" class="btn btn-primary">Save</button></div>
</form>
</div></div></div>"#,
            title = title,
            name = escape(&self.form.name),
            location = escape(&self.form.location),
            type_options = type_options,
            status_options = Self::status_options(self.form.device_type, &self.form.status),
        )
    }
}

fn render_delete_confirmation(device: &Device) -> String {
    format!(
        r#"<div class="modal d-block" tabindex="-1" role="alertdialog" style="background:rgba(0,0,0,.5)">
<div class="modal-dialog"><div class="modal-content">
<form method="post" action="/admin/devices/{id}/delete">
<div class="modal-body">Are you sure you want to delete <strong>{name}</strong>?</div>
<div class="modal-footer"><a class="btn btn-secondary" href="/admin">Cancel</a><button type="submit" name="confirm" value="yes" class="btn btn-danger">Delete</button></div>
</form>
</div></div></div>"#,
        id = urlencoding::encode(&device.id),
        name = escape(&device.name),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::MemoryDirectory;
    use crate::model::{DoorStatus, LightStatus};

    fn seeded() -> MemoryDirectory {
        MemoryDirectory::with_devices([
            DeviceFields::new("Lamp", "Room 101", DeviceState::Light(LightStatus::On)),
            DeviceFields::new("Door", "Room 101", DeviceState::Door(DoorStatus::Locked)),
        ])
    }

    #[test]
    fn test_render_table_empty() {
        assert_eq!(AdminView::render_table(&[]), EMPTY_TABLE_ROW);
    }

    #[tokio::test]
    async fn test_render_table_one_row_per_device() {
        let dir = seeded();
        let devices = dir.list_devices().await.unwrap();
        let html = AdminView::render_table(&devices);

        assert_eq!(html.matches("<tr ").count(), 2);
        assert!(html.contains(r#"<tr data-id="1"><td>Lamp</td><td><span class="badge bg-info">light</span></td><td>on</td><td>Room 101</td>"#));
        assert!(html.contains(r#"<tr data-id="2"><td>Door</td><td><span class="badge bg-info">door</span></td><td>locked</td><td>Room 101</td>"#));
        assert!(html.contains("/admin/devices/2/delete"));
    }

    #[test]
    fn test_status_options_per_type() {
        let html = AdminView::status_options(DeviceType::Door, "");
        assert_eq!(
            html,
            r#"<option value="locked">locked</option><option value="unlocked">unlocked</option>"#
        );

        for device_type in DeviceType::ALL {
            let html = AdminView::status_options(device_type, "");
            assert_eq!(html.matches("<option").count(), device_type.vocabulary().len());
            for status in device_type.vocabulary() {
                assert!(html.contains(&format!(r#"value="{}""#, status)));
            }
        }
    }

    #[test]
    fn test_change_type_resets_status() {
        let mut view = AdminView::new();
        view.open_create();
        assert_eq!(view.form().status, "on");

        view.change_type(DeviceType::Window);
        assert_eq!(view.form().device_type, DeviceType::Window);
        assert_eq!(view.form().status, "open");

        let html = view.render();
        assert!(html.contains(r#"<option value="open" selected>open</option><option value="closed">closed</option>"#));
    }

    #[tokio::test]
    async fn test_create_then_reload() {
        let dir = seeded();
        let mut view = AdminView::new();
        view.enter(&dir).await;

        view.open_create();
        view.update_form(DeviceForm {
            name: "Sensor".into(),
            location: "Lab".into(),
            device_type: DeviceType::MotionSensor,
            status: "inactive".into(),
        });
        let created = view.submit(&dir).await.unwrap();

        assert_eq!(created.id, "3");
        assert_eq!(view.modal(), &ModalState::Closed);
        assert_eq!(view.devices().len(), 3);
    }

    #[tokio::test]
    async fn test_edit_replaces_device() {
        let dir = seeded();
        let mut view = AdminView::new();
        view.enter(&dir).await;

        view.open_edit(&dir, "2").await.unwrap();
        assert_eq!(view.modal(), &ModalState::Edit("2".into()));
        assert_eq!(view.form().status, "locked");

        let mut form = view.form().clone();
        form.location = "Room 202".into();
        form.status = "unlocked".into();
        view.update_form(form);
        view.submit(&dir).await.unwrap();

        let door = dir.get_device("2").await.unwrap();
        assert_eq!(door.location, "Room 202");
        assert_eq!(door.state, DeviceState::Door(DoorStatus::Unlocked));
        assert_eq!(door.name, "Door");
    }

    #[tokio::test]
    async fn test_edit_unknown_device_keeps_modal_closed() {
        let dir = seeded();
        let mut view = AdminView::new();
        assert!(view.open_edit(&dir, "99").await.is_err());
        assert_eq!(view.modal(), &ModalState::Closed);
        assert!(view.notice().is_some());
    }

    #[tokio::test]
    async fn test_invalid_status_blocks_submit() {
        let dir = seeded();
        let mut view = AdminView::new();
        view.enter(&dir).await;
        view.open_create();
        view.update_form(DeviceForm {
            name: "Lamp".into(),
            location: "Lab".into(),
            device_type: DeviceType::Light,
            status: "locked".into(),
        });

        assert!(matches!(
            view.submit(&dir).await,
            Err(DashboardError::InvalidStatus { .. })
        ));
        assert_eq!(view.modal(), &ModalState::Create);
        assert_eq!(dir.list_devices().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_update_leaves_table_stale() {
        let dir = seeded();
        let mut view = AdminView::new();
        view.enter(&dir).await;
        view.open_edit(&dir, "1").await.unwrap();
        dir.fail_updates_for("1");

        let mut form = view.form().clone();
        form.name = "Renamed".into();
        view.update_form(form);

        assert!(view.submit(&dir).await.is_err());
        assert_eq!(view.modal(), &ModalState::Edit("1".into()));
        assert_eq!(view.devices()[0].name, "Lamp");
        assert!(view.render().contains(r#"role="alertdialog""#));
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let dir = seeded();
        let mut view = AdminView::new();
        view.enter(&dir).await;

        view.request_delete("1").unwrap();
        assert!(view.render().contains("Are you sure you want to delete <strong>Lamp</strong>?"));

        assert!(!view.delete(&dir, "1", false).await.unwrap());
        assert_eq!(dir.list_devices().await.unwrap().len(), 2);

        assert!(view.delete(&dir, "1", true).await.unwrap());
        assert_eq!(view.devices().len(), 1);
        assert_eq!(view.devices()[0].id, "2");
    }

    #[tokio::test]
    async fn test_load_failure_row() {
        let dir = seeded();
        dir.fail_lists(true);
        let mut view = AdminView::new();
        view.enter(&dir).await;
        assert!(view.render().contains("Failed to load device data."));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let device = DeviceFields::new("<script>", "Lab", DeviceState::Light(LightStatus::Off))
            .into_device("1");
        let html = AdminView::render_table(&[device]);
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_action_links_encode_reserved_ids() {
        let device = DeviceFields::new("Lamp", "Lab", DeviceState::Light(LightStatus::Off))
            .into_device("../status_logs");
        let html = AdminView::render_table(&[device]);
        assert!(html.contains(r#"href="/admin/devices/..%2Fstatus_logs/edit""#));
        assert!(html.contains(r#"href="/admin/devices/..%2Fstatus_logs/delete""#));
    }
}
