//! Email templates.

use chrono::{DateTime, SecondsFormat, Utc};

/// Subject line for an unexpected-error notification.
pub fn error_notification_subject(method: &str, path: &str) -> String {
    format!("[Error] {} {}", method, path)
}

/// HTML body for an unexpected-error notification.
///
/// All interpolated values are escaped; `detail` is rendered preformatted.
pub fn error_notification_html(
    method: &str,
    path: &str,
    occurred_at: DateTime<Utc>,
    message: &str,
    detail: Option<&str>,
) -> String {
    format!(
        r#"<h2>Unhandled Server Error</h2>
<p><strong>Route:</strong> {method} {path}</p>
<p><strong>Time:</strong> {time}</p>
<p><strong>Message:</strong> {message}</p>
<pre>{detail}</pre>
"#,
        method = escape_html(method),
        path = escape_html(path),
        time = occurred_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        message = escape_html(message),
        detail = escape_html(detail.unwrap_or_default()),
    )
}

/// Escape the characters that are significant in HTML text and attributes.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
