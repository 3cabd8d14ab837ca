//! HTML building blocks shared by the three views

use std::time::Duration;

/// Page the navigation bar highlights
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Admin,
    Control,
    Monitoring,
}

/// Escape text for HTML element content and quoted attributes
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Bootstrap alert box
pub fn alert(variant: &str, message: &str) -> String {
    format!(
        r#"<div class="alert alert-{}" role="alert">{}</div>"#,
        variant,
        escape(message)
    )
}

/// Full HTML document around `body`
pub fn page(title: &str, active: Page, body: &str, refresh: Option<Duration>) -> String {
    let refresh_meta = refresh
        .map(|d| format!(r#"<meta http-equiv="refresh" content="{}">"#, d.as_secs().max(1)))
        .unwrap_or_default();

    let nav_item = |target: Page, href: &str, label: &str| {
        let class = if target == active { "nav-link active" } else { "nav-link" };
        format!(r#"<li class="nav-item"><a class="{}" href="{}">{}</a></li>"#, class, href, label)
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
{refresh}
<title>{title} - SmartClass</title>
<link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css">
<link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bootstrap-icons@1.11.3/font/bootstrap-icons.min.css">
</head>
<body>
<nav class="navbar navbar-expand navbar-dark bg-dark mb-4">
<div class="container">
<a class="navbar-brand" href="/">SmartClass</a>
<ul class="navbar-nav">{admin}{control}{monitoring}</ul>
</div>
</nav>
<main class="container">
<h1 class="h3 mb-4">{title}</h1>
{body}
</main>
</body>
</html>
"#,
        refresh = refresh_meta,
        title = escape(title),
        admin = nav_item(Page::Admin, "/admin", "Admin"),
        control = nav_item(Page::Control, "/control", "Control"),
        monitoring = nav_item(Page::Monitoring, "/monitoring", "Monitoring"),
        body = body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("<b>\"Lab\" & 'Co'</b>"), "&lt;b&gt;&quot;Lab&quot; &amp; &#39;Co&#39;&lt;/b&gt;");
        assert_eq!(escape("Room 101"), "Room 101");
    }

    #[test]
    fn test_page_refresh() {
        let html = page("Monitoring", Page::Monitoring, "<p>x</p>", Some(Duration::from_secs(2)));
        assert!(html.contains(r#"content="2""#));
        assert!(html.contains(r#"<a class="nav-link active" href="/monitoring">"#));

        let html = page("Admin", Page::Admin, "", None);
        assert!(!html.contains("http-equiv"));
    }
}
