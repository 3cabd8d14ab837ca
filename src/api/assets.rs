//! Device card images served under `/assets/`

const LIGHT_ON: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 64 64"><circle cx="32" cy="26" r="16" fill="#ffd43b" stroke="#f08c00" stroke-width="3"/><rect x="24" y="42" width="16" height="12" rx="2" fill="#868e96"/><path d="M32 2v4M8 26H4M60 26h-4M14 8l3 3M50 8l-3 3" stroke="#f08c00" stroke-width="3"/></svg>"##;

const LIGHT_OFF: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 64 64"><circle cx="32" cy="26" r="16" fill="#e9ecef" stroke="#868e96" stroke-width="3"/><rect x="24" y="42" width="16" height="12" rx="2" fill="#868e96"/></svg>"##;

const DOOR_OPEN: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 64 64"><rect x="14" y="6" width="36" height="54" fill="none" stroke="#495057" stroke-width="3"/><path d="M14 6l20 6v52l-20-4z" fill="#74c0fc" stroke="#1971c2" stroke-width="3"/><circle cx="29" cy="36" r="2" fill="#1971c2"/></svg>"##;

const DOOR_CLOSED: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 64 64"><rect x="14" y="6" width="36" height="54" fill="#a5d8ff" stroke="#1971c2" stroke-width="3"/><circle cx="42" cy="34" r="2.5" fill="#1971c2"/><rect x="38" y="38" width="8" height="7" rx="1" fill="#495057"/></svg>"##;

const WINDOW_OPEN: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 64 64"><rect x="8" y="8" width="48" height="48" fill="#e7f5ff" stroke="#495057" stroke-width="3"/><path d="M8 8l14 6v36l-14 6zM56 8l-14 6v36l14 6z" fill="#a5d8ff" stroke="#1971c2" stroke-width="2"/></svg>"##;

const WINDOW_CLOSED: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 64 64"><rect x="8" y="8" width="48" height="48" fill="#a5d8ff" stroke="#495057" stroke-width="3"/><path d="M32 8v48M8 32h48" stroke="#495057" stroke-width="3"/></svg>"##;

const MOTION_ACTIVE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 64 64"><circle cx="32" cy="32" r="8" fill="#fa5252"/><path d="M20 20a17 17 0 0 0 0 24M44 20a17 17 0 0 1 0 24M12 12a28 28 0 0 0 0 40M52 12a28 28 0 0 1 0 40" fill="none" stroke="#fa5252" stroke-width="3"/></svg>"##;

const MOTION_INACTIVE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 64 64"><circle cx="32" cy="32" r="8" fill="#adb5bd"/><circle cx="32" cy="32" r="16" fill="none" stroke="#dee2e6" stroke-width="3"/></svg>"##;

/// SVG source of a card image, by file name
pub fn asset(name: &str) -> Option<&'static str> {
    let svg = match name {
        "light-on.svg" => LIGHT_ON,
        "light-off.svg" => LIGHT_OFF,
        "door-open.svg" => DOOR_OPEN,
        "door-closed.svg" => DOOR_CLOSED,
        "window-open.svg" => WINDOW_OPEN,
        "window-closed.svg" => WINDOW_CLOSED,
        "motion-active.svg" => MOTION_ACTIVE,
        "motion-inactive.svg" => MOTION_INACTIVE,
        _ => return None,
    };
    Some(svg)
}
