//! Default `<select>` rendering

use launder_domain::IntervalOption;

use super::ports::IntervalSelectorRenderer;

#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlSelectRenderer;

impl IntervalSelectorRenderer for HtmlSelectRenderer {
    fn render(&self, name: &str, options: &[IntervalOption], current: Option<&str>) -> String {
        let mut html = format!("<select name=\"{}\">", escape_html(name));
        for option in options {
            let selected =
                if current == Some(option.key.as_str()) { " selected='selected'" } else { "" };
            html.push_str(&format!(
                "<option value=\"{}\"{}>{}</option>",
                escape_html(&option.key),
                selected,
                escape_html(&option.label)
            ));
        }
        html.push_str("</select>");
        html
    }
}

/// Escape text for use in HTML content and quoted attributes.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
