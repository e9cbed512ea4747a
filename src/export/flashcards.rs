use std::fmt::Write;

use crate::export::Exporter;
use crate::translation::TranslationResult;

/// Anki-importable plain-text deck, one card per block.
///
/// The file header tells Anki the separator, that fields are plain text,
/// the target deck and the column names, so the file imports without
/// touching the import dialog. Every pair becomes a card; a failed
/// translation keeps the error placeholder on the back side.
#[derive(Debug, Clone)]
pub struct FlashcardExporter {
    deck_name: String,
}

/// Tabs and line breaks would split fields or notes
fn sanitize_field(text: &str) -> String {
    text.split(['\t', '\n', '\r'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

impl FlashcardExporter {
    pub fn new(deck_name: impl Into<String>) -> Self {
        Self {
            deck_name: deck_name.into(),
        }
    }
}

impl Exporter for FlashcardExporter {
    fn extension(&self) -> &'static str {
        "tsv"
    }

    fn render(&self, results: &[TranslationResult]) -> anyhow::Result<String> {
        let mut deck = String::new();
        writeln!(deck, "#separator:tab")?;
        writeln!(deck, "#html:false")?;
        writeln!(deck, "#deck:{}", sanitize_field(&self.deck_name))?;
        writeln!(deck, "#columns:Front\tBack")?;
        for result in results {
            writeln!(
                deck,
                "{}\t{}",
                sanitize_field(result.original()),
                sanitize_field(&result.translation)
            )?;
        }
        Ok(deck)
    }
}
