//! HTML rendering of the admin dashboard.

use crate::reporter::DashboardData;

/// Escape text for interpolation into HTML element content or attributes.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Instance URL cell: a link for `http(s)` URLs, plain text for anything else.
fn url_cell(url: &str) -> String {
    let escaped = escape_html(url);
    let scheme = url.trim_start().get(..8).unwrap_or("").to_ascii_lowercase();
    if scheme.starts_with("http://") || scheme.starts_with("https://") {
        format!("<a href=\"{escaped}\">{escaped}</a>")
    } else {
        escaped
    }
}

pub fn render_dashboard(data: &DashboardData) -> String {
    let latest = escape_html(&data.latest_version);

    let mut instance_rows = String::new();
    for instance in &data.instances {
        let version_class = if instance.version == data.latest_version {
            "current"
        } else {
            "outdated"
        };
        instance_rows.push_str(&format!(
            "<tr><td>{}</td><td class=\"{}\">{}</td><td>{}</td>\
             <td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape_html(&instance.customer_id),
            version_class,
            escape_html(&instance.version),
            url_cell(&instance.url),
            escape_html(&instance.health_status),
            escape_html(&instance.last_heartbeat),
            instance.first_seen.format("%Y-%m-%d %H:%M"),
            instance.total_users,
            instance.total_messages,
        ));
    }
    if data.instances.is_empty() {
        instance_rows.push_str("<tr><td colspan=\"8\">No instances registered yet</td></tr>\n");
    }

    let mut update_rows = String::new();
    for update in &data.recent_updates {
        update_rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape_html(&update.customer_id),
            escape_html(&update.old_version),
            escape_html(&update.new_version),
            update.updated_at.format("%Y-%m-%d %H:%M"),
        ));
    }
    if data.recent_updates.is_empty() {
        update_rows.push_str("<tr><td colspan=\"4\">No version updates recorded</td></tr>\n");
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>HushLane Central - Instances</title>
<style>
body {{ font-family: sans-serif; margin: 2rem; }}
.stats {{ display: flex; gap: 2rem; margin-bottom: 2rem; }}
.stat {{ border: 1px solid #ccc; padding: 1rem; border-radius: 4px; }}
table {{ border-collapse: collapse; width: 100%; margin-bottom: 2rem; }}
th, td {{ border-bottom: 1px solid #eee; padding: 0.4rem; text-align: left; }}
.outdated {{ color: #b35c00; }}
</style>
</head>
<body>
<h1>HushLane Central</h1>
<div class="stats">
<div class="stat"><strong>{total}</strong><br>Customers</div>
<div class="stat"><strong>{healthy}</strong><br>Healthy</div>
<div class="stat"><strong>{outdated}</strong><br>Outdated</div>
<div class="stat"><strong>{latest}</strong><br>Latest version</div>
</div>
<h2>Instances</h2>
<table>
<tr><th>Customer</th><th>Version</th><th>URL</th><th>Health</th><th>Last heartbeat</th><th>First seen</th><th>Users</th><th>Messages</th></tr>
{instance_rows}</table>
<h2>Recent updates</h2>
<table>
<tr><th>Customer</th><th>From</th><th>To</th><th>When</th></tr>
{update_rows}</table>
</body>
</html>
"#,
        total = data.total_customers,
        healthy = data.healthy_count,
        outdated = data.outdated_count,
    )
}
