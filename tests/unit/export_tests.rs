/*!
 * Tests for the HTML, flashcard and JSON exporters
 */

use anyhow::Result;
use subpair::app_config::ExportFormat;
use subpair::export::{exporter_for, Exporter, FlashcardExporter, HtmlExporter, JsonExporter};
use subpair::translation::{Block, TranslationOutcome, TranslationResult};

fn result(index: usize, original: &str, translation: &str, outcome: TranslationOutcome) -> TranslationResult {
    TranslationResult {
        block: Block::new(original, vec![index]),
        translation: translation.to_string(),
        outcome,
    }
}

fn sample() -> Vec<TranslationResult> {
    vec![
        result(1, "She said \"hi\" & <left>.", "Она сказала \"привет\".", TranslationOutcome::Translated),
        result(3, "Next line.", "[translation error]", TranslationOutcome::Placeholder),
        result(4, "Tab\there", "Таб", TranslationOutcome::Fallback),
    ]
}

#[test]
fn test_html_render_withResults_shouldHaveOneRowPerBlock() -> Result<()> {
    let html = HtmlExporter::new("movie").render(&sample())?;

    assert_eq!(html.matches("<tr>").count(), 3);
    assert!(html.contains("<th>Original</th><th>Translation</th>"));

    // Body rows follow block order
    let first_cells: Vec<&str> = html
        .split("<tr><td>")
        .skip(1)
        .filter_map(|row| row.split("</td>").next())
        .collect();
    assert_eq!(
        first_cells,
        vec!["She said &quot;hi&quot; &amp; &lt;left&gt;.", "Next line.", "Tab\there"]
    );
    assert!(html.contains("<meta charset=\"UTF-8\">"));
    assert!(html.contains("<title>movie</title>"));
    Ok(())
}

#[test]
fn test_html_render_withSpecialCharacters_shouldEscape() -> Result<()> {
    let html = HtmlExporter::new("a <b>").render(&sample())?;

    assert!(html.contains("She said &quot;hi&quot; &amp; &lt;left&gt;."));
    assert!(html.contains("<title>a &lt;b&gt;</title>"));
    assert!(!html.contains("<left>"));
    assert!(html.contains("<td class=\"placeholder\">[translation error]</td>"));
    Ok(())
}

#[test]
fn test_html_render_withNoResults_shouldStillBeDocument() -> Result<()> {
    let html = HtmlExporter::new("empty").render(&[])?;
    assert_eq!(html.matches("<tr>").count(), 0);
    assert!(html.contains("</table>"));
    Ok(())
}

#[test]
fn test_flashcards_render_withResults_shouldWriteOneCardPerPair() -> Result<()> {
    let results = sample();
    let deck = FlashcardExporter::new("Movie Deck").render(&results)?;
    let lines: Vec<&str> = deck.lines().collect();

    assert_eq!(lines[0], "#separator:tab");
    assert_eq!(lines[1], "#html:false");
    assert_eq!(lines[2], "#deck:Movie Deck");
    assert_eq!(lines[3], "#columns:Front\tBack");

    let cards: Vec<&str> = lines.iter().copied().filter(|l| !l.starts_with('#')).collect();
    assert_eq!(cards.len(), results.len());
    assert_eq!(cards[0], "She said \"hi\" & <left>.\tОна сказала \"привет\".");
    assert_eq!(cards[1], "Next line.\t[translation error]");
    assert_eq!(cards[2], "Tab here\tТаб");
    Ok(())
}

#[test]
fn test_json_render_withResults_shouldKeepOrderAndIndices() -> Result<()> {
    let json = JsonExporter.render(&sample())?;
    let value: serde_json::Value = serde_json::from_str(&json)?;
    let items = value["items"].as_array().expect("items array");

    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["index"], 1);
    assert_eq!(items[0]["original"], "She said \"hi\" & <left>.");
    assert_eq!(items[1]["index"], 3);
    assert_eq!(items[1]["translation"], "[translation error]");
    Ok(())
}

#[test]
fn test_exporter_for_withEachFormat_shouldUseMatchingExtension() {
    assert_eq!(exporter_for(ExportFormat::Html, "t").extension(), "html");
    assert_eq!(exporter_for(ExportFormat::Anki, "t").extension(), "tsv");
    assert_eq!(exporter_for(ExportFormat::Json, "t").extension(), "json");
}
