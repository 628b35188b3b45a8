//! Minimal HTML shell shared by the page handlers.
//!
//! Pages are small `format!`-composed fragments; templating is deliberately
//! out of scope for this demo.

use axum::response::Html;

/// Escape text for safe interpolation into HTML content and attributes.
pub(crate) fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for character in value.chars() {
        match character {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(character),
        }
    }
    escaped
}

/// Base layout wrapping a page body.
pub(crate) fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>{title}</title>
</head>
<body>
  <div class="container">
{body}
  </div>
</body>
</html>
"#,
        title = escape(title),
    ))
}

/// Flash-message banner fed from the `error`/`success` query parameters.
pub(crate) fn message_banner(error: Option<&str>, success: Option<&str>) -> String {
    let mut banner = String::new();
    if let Some(error) = error {
        banner.push_str(&format!(
            "    <div class=\"error\">{}</div>\n",
            escape(error)
        ));
    }
    if let Some(success) = success {
        banner.push_str(&format!(
            "    <div class=\"success\">{}</div>\n",
            escape(success)
        ));
    }
    banner
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_neutralizes_markup() {
        assert_eq!(
            escape(r#"<script>alert("x&y")</script>"#),
            "&lt;script&gt;alert(&quot;x&amp;y&quot;)&lt;/script&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn banner_renders_only_present_messages() {
        assert_eq!(message_banner(None, None), "");
        let banner = message_banner(Some("bad <input>"), Some("ok"));
        assert!(banner.contains("class=\"error\""));
        assert!(banner.contains("bad &lt;input&gt;"));
        assert!(banner.contains("class=\"success\""));
    }

    #[test]
    fn layout_escapes_title() {
        let Html(page) = layout("A & B", "<p>body</p>");
        assert!(page.contains("<title>A &amp; B</title>"));
        assert!(page.contains("<p>body</p>"));
    }
}
