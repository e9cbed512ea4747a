/*!
 * Common test utilities for the subpair test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use subpair::app_config::Config;
use subpair::providers::mock::MockProvider;
use subpair::translation::TranslationService;

/// Route `log` output through env_logger once per test binary
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Sample subtitle with a sentence split across cues and a speaker turn
pub const SAMPLE_SRT: &str = "1
00:00:01,000 --> 00:00:03,000
<i>Hello</i>

2
00:00:03,500 --> 00:00:05,000
world.

3
00:00:05,500 --> 00:00:07,000
- Next line.

4
00:00:08,000 --> 00:00:10,000
She said \"fine\" & left.
";

/// Creates a sample subtitle file for testing
pub fn create_test_subtitle(dir: &Path, filename: &str) -> Result<PathBuf> {
    create_test_file(dir, filename, SAMPLE_SRT)
}

/// Default configuration with retries that do not sleep
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.translation.common.retry_count = 1;
    config.translation.common.retry_backoff_ms = 0;
    config
}

/// Translation service over a mock backend
pub fn mock_service(provider: MockProvider, config: &Config) -> TranslationService {
    TranslationService::from_mock(provider, config)
}
