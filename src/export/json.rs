use serde::Serialize;

use crate::export::Exporter;
use crate::translation::TranslationResult;

#[derive(Debug, Serialize)]
struct JsonItem<'a> {
    index: usize,
    original: &'a str,
    translation: &'a str,
}

#[derive(Debug, Serialize)]
struct JsonDocument<'a> {
    items: Vec<JsonItem<'a>>,
}

/// `{"items": [{"index", "original", "translation"}]}` in block order
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExporter;

impl Exporter for JsonExporter {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn render(&self, results: &[TranslationResult]) -> anyhow::Result<String> {
        let document = JsonDocument {
            items: results
                .iter()
                .map(|r| JsonItem {
                    index: r.index(),
                    original: r.original(),
                    translation: &r.translation,
                })
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }
}
