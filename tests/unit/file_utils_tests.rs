/*!
 * Tests for file utilities
 */

use anyhow::Result;
use std::fs;
use std::path::Path;
use subpair::file_utils::FileManager;

use crate::common;

#[test]
fn test_generate_output_path_withLanguage_shouldInsertCode() {
    let path = FileManager::generate_output_path(Path::new("/in/movie.en.srt"), Path::new("/out"), "ru", "html");
    assert_eq!(path, Path::new("/out/movie.en.ru.html"));

    let path = FileManager::generate_output_path(Path::new("clip.srt"), Path::new("."), "de", ".tsv");
    assert_eq!(path, Path::new("./clip.de.tsv"));
}

#[test]
fn test_find_files_withNestedDirs_shouldReturnSortedSrtFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    fs::create_dir(root.join("season1"))?;
    common::create_test_file(root, "b.srt", "")?;
    common::create_test_file(root, "a.SRT", "")?;
    common::create_test_file(root, "notes.txt", "")?;
    common::create_test_file(&root.join("season1"), "e01.srt", "")?;

    let files = FileManager::find_files(root, "srt")?;
    let names: Vec<String> = files
        .iter()
        .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();
    assert_eq!(names, vec!["a.SRT", "b.srt", "season1/e01.srt"]);
    assert!(files.iter().all(|f| FileManager::is_srt_file(f)));
    Ok(())
}

#[test]
fn test_write_to_file_withMissingParent_shouldCreateIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("deep/er/out.html");
    FileManager::write_to_file(&path, "<html></html>")?;
    assert_eq!(FileManager::read_to_string(&path)?, "<html></html>");
    Ok(())
}

#[test]
fn test_append_to_log_file_withTwoLines_shouldKeepBoth() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("issues.log");
    FileManager::append_to_log_file(&path, "first")?;
    FileManager::append_to_log_file(&path, "second")?;

    let content = fs::read_to_string(&path)?;
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("] first"));
    assert!(lines[1].ends_with("] second"));
    Ok(())
}
