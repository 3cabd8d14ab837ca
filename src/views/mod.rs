//! Dashboard views
//!
//! Each view is a controller object owning its transient state (fetched
//! devices, selection, open dialogs) and rendering HTML fragments from it.
//! Controllers take the device directory as an argument on every action, so
//! the same controller drives the web pages and the CLI.
//!
//! - [`AdminView`]: device table with create/edit/delete
//! - [`ControlView`]: per-classroom switches and "secure classroom"
//! - [`MonitoringView`]: read-only cards and recent status log

mod admin;
mod control;
pub mod html;
mod monitoring;

pub use admin::*;
pub use control::*;
pub use monitoring::*;

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Danger,
}

impl NoticeLevel {
    /// Bootstrap colour variant
    pub fn variant(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

/// Message shown to the operator after an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Danger, message)
    }

    /// Inline banner
    pub fn render_banner(&self) -> String {
        html::alert(self.level.variant(), &self.message)
    }

    /// Blocking dialog the operator must dismiss
    pub fn render_dialog(&self, dismiss_href: &str) -> String {
        format!(
            r#"<div class="modal d-block" tabindex="-1" role="alertdialog" style="background:rgba(0,0,0,.5)">
<div class="modal-dialog"><div class="modal-content">
<div class="modal-body"><div class="text-{}">{}</div></div>
<div class="modal-footer"><a class="btn btn-primary" href="{}">OK</a></div>
</div></div></div>"#,
            self.level.variant(),
            html::escape(&self.message),
            dismiss_href
        )
    }
}
