use std::fmt::Write;

use crate::export::Exporter;
use crate::translation::TranslationResult;

const STYLE: &str = "body { font-family: sans-serif; padding: 20px; background-color: #fdfdfd; }
table { width: 100%; border-collapse: collapse; table-layout: fixed; }
th, td { border: 1px solid #ccc; padding: 10px; vertical-align: top; word-wrap: break-word; }
th { background-color: #f0f0f0; }
td.placeholder { color: #a00; }";

/// Escape text for HTML element content and attribute values
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Two-column comparison table, one body row per block
#[derive(Debug, Clone)]
pub struct HtmlExporter {
    title: String,
}

impl HtmlExporter {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into() }
    }
}

impl Exporter for HtmlExporter {
    fn extension(&self) -> &'static str {
        "html"
    }

    fn render(&self, results: &[TranslationResult]) -> anyhow::Result<String> {
        let title = escape_html(&self.title);
        let mut html = String::new();
        writeln!(html, "<!DOCTYPE html>")?;
        writeln!(html, "<html>")?;
        writeln!(html, "<head>")?;
        writeln!(html, "<meta charset=\"UTF-8\">")?;
        writeln!(html, "<title>{}</title>", title)?;
        writeln!(html, "<style>\n{}\n</style>", STYLE)?;
        writeln!(html, "</head>")?;
        writeln!(html, "<body>")?;
        writeln!(html, "<h1>{}</h1>", title)?;
        writeln!(html, "<table>")?;
        writeln!(html, "<thead><tr class=\"heading\"><th>Original</th><th>Translation</th></tr></thead>")?;
        writeln!(html, "<tbody>")?;
        for result in results {
            let class = if result.is_placeholder() { " class=\"placeholder\"" } else { "" };
            writeln!(
                html,
                "<tr><td>{}</td><td{}>{}</td></tr>",
                escape_html(result.original()),
                class,
                escape_html(&result.translation)
            )?;
        }
        writeln!(html, "</tbody>")?;
        writeln!(html, "</table>")?;
        writeln!(html, "</body>")?;
        writeln!(html, "</html>")?;
        Ok(html)
    }
}
