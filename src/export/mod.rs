/*!
 * Bilingual output artifacts.
 *
 * Every exporter renders the ordered (original, translation) pairs of one
 * input file into a single document.
 */

use crate::app_config::ExportFormat;
use crate::translation::TranslationResult;

pub mod flashcards;
pub mod html;
pub mod json;

pub use flashcards::FlashcardExporter;
pub use html::HtmlExporter;
pub use json::JsonExporter;

/// Renders translation results into one document
pub trait Exporter: Send + Sync {
    /// File extension without the dot
    fn extension(&self) -> &'static str;

    fn render(&self, results: &[TranslationResult]) -> anyhow::Result<String>;
}

/// Build the exporter for a format. `title` names the document or deck.
pub fn exporter_for(format: ExportFormat, title: &str) -> Box<dyn Exporter> {
    match format {
        ExportFormat::Html => Box::new(HtmlExporter::new(title)),
        ExportFormat::Anki => Box::new(FlashcardExporter::new(title)),
        ExportFormat::Json => Box::new(JsonExporter),
    }
}
