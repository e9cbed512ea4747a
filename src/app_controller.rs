use anyhow::{anyhow, Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::export::exporter_for;
use crate::file_utils::FileManager;
use crate::subtitle_processor::SubtitleCollection;
use crate::translation::{Batch, BatchReport, BatchTranslator, Batcher, Block, BlockMerger, TranslationResult, TranslationService};

// @module: Application controller for subtitle processing

/// Name of the file collecting per-run problems next to the outputs
pub const ISSUES_LOG: &str = "subpair.issues.log";

/// Cues, blocks and batches computed for one file, before any translation
#[derive(Debug, Clone)]
pub struct TranslationPlan {
    pub source_file: PathBuf,
    pub cue_count: usize,
    pub empty_cue_count: usize,
    pub blocks: Vec<Block>,
    pub batches: Vec<Batch>,
}

impl TranslationPlan {
    /// Human-readable listing of the batches and their blocks
    pub fn describe(&self) -> String {
        let mut out = format!(
            "{}: {} cues ({} empty) -> {} blocks -> {} batches\n",
            self.source_file.display(),
            self.cue_count,
            self.empty_cue_count,
            self.blocks.len(),
            self.batches.len()
        );
        for (i, batch) in self.batches.iter().enumerate() {
            out.push_str(&format!(
                "batch {} ({} blocks, {} chars)\n",
                i + 1,
                batch.len(),
                batch.char_count
            ));
            for block in self.blocks.get(batch.range.clone()).unwrap_or(&[]) {
                out.push_str(&format!("  {:?} {}\n", block.cue_indices, block.text));
            }
        }
        out
    }
}

/// Outcome of processing one file
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub written: Vec<PathBuf>,
    pub report: BatchReport,
    pub skipped: bool,
}

/// Totals for folder mode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Backend, absent in plan-only use
    service: Option<TranslationService>,
}

impl Controller {
    // @method: Create a controller whose backend is built from the configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let service = TranslationService::new(&config).context("Failed to create translation service")?;
        Ok(Self {
            config,
            service: Some(service),
        })
    }

    // @method: Create a controller around an existing service (tests, mock runs)
    pub fn with_service(config: Config, service: TranslationService) -> Self {
        Self {
            config,
            service: Some(service),
        }
    }

    // @method: Create a controller that can only plan
    pub fn planner(config: Config) -> Self {
        Self { config, service: None }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load, merge and batch a file without translating it
    pub fn plan(&self, input_file: &Path) -> Result<TranslationPlan> {
        let collection = SubtitleCollection::load(input_file, self.config.segmentation.empty_cues)
            .with_context(|| format!("Failed to load {}", input_file.display()))?;
        let blocks = BlockMerger::new(self.config.segmentation.merge_cues).merge_cues(&collection.cues);
        let batches = Batcher::from_config(&self.config.batching).plan(&blocks);

        Ok(TranslationPlan {
            source_file: input_file.to_path_buf(),
            cue_count: collection.len(),
            empty_cue_count: collection.cues.iter().filter(|c| c.is_empty()).count(),
            blocks,
            batches,
        })
    }

    /// Translate one planned file, reporting progress on `multi_progress`
    pub async fn translate_plan(
        &self,
        plan: &TranslationPlan,
        multi_progress: &MultiProgress,
    ) -> Result<(Vec<TranslationResult>, BatchReport)> {
        let service = self
            .service
            .clone()
            .ok_or_else(|| anyhow!("No translation backend configured"))?;

        info!(
            "Translating {} blocks in {} batches with {} to {}",
            plan.blocks.len(),
            plan.batches.len(),
            service.provider_name(),
            self.config.target_language
        );

        let progress_bar = multi_progress.add(ProgressBar::new(plan.batches.len() as u64));
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} batches ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("=>-"));
        progress_bar.set_message("Translating");

        let translator = BatchTranslator::new(service, self.config.batching.clone());
        let pb = progress_bar.clone();
        let (results, report) = translator
            .translate_batches(&plan.blocks, &plan.batches, &self.config.target_language, move |completed, _total| {
                pb.set_position(completed as u64);
            })
            .await;
        progress_bar.finish_and_clear();

        if results.len() != plan.blocks.len() {
            return Err(anyhow!(
                "Result count {} does not match block count {}",
                results.len(),
                plan.blocks.len()
            ));
        }
        Ok((results, report))
    }

    /// Output paths for every configured format
    pub fn output_paths(&self, input_file: &Path, output_dir: &Path) -> Vec<PathBuf> {
        self.config
            .export
            .formats
            .iter()
            .map(|format| {
                FileManager::generate_output_path(input_file, output_dir, &self.config.target_language, format.extension())
            })
            .collect()
    }

    /// Run the whole pipeline for one SRT file
    pub async fn run(&self, input_file: PathBuf, output_dir: PathBuf, force_overwrite: bool) -> Result<FileOutcome> {
        let multi_progress = MultiProgress::new();
        self.run_with_progress(&input_file, &output_dir, &multi_progress, force_overwrite)
            .await
    }

    async fn run_with_progress(
        &self,
        input_file: &Path,
        output_dir: &Path,
        multi_progress: &MultiProgress,
        force_overwrite: bool,
    ) -> Result<FileOutcome> {
        let start_time = Instant::now();

        if !FileManager::file_exists(input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }
        FileManager::ensure_dir(output_dir)?;

        let outputs = self.output_paths(input_file, output_dir);
        if !force_overwrite && outputs.iter().all(|p| p.exists()) {
            warn!(
                "Skipping {}, outputs already exist (use -f to force overwrite)",
                input_file.display()
            );
            return Ok(FileOutcome {
                written: Vec::new(),
                report: BatchReport::default(),
                skipped: true,
            });
        }

        let plan = self.plan(input_file)?;
        if plan.blocks.is_empty() {
            warn!("{} contains no text to translate", input_file.display());
        }

        let (results, report) = self.translate_plan(&plan, multi_progress).await?;
        let written = self.export(&results, input_file, output_dir)?;

        if report.placeholder_blocks > 0 {
            let log_path = output_dir.join(ISSUES_LOG);
            let line = format!("{}: {}", input_file.display(), report.summary());
            if let Err(e) = FileManager::append_to_log_file(&log_path, &line) {
                warn!("Failed to write issues log: {}", e);
            }
        }

        info!(
            "Finished {} in {}",
            input_file.display(),
            Self::format_duration(start_time.elapsed())
        );
        Ok(FileOutcome {
            written,
            report,
            skipped: false,
        })
    }

    /// Write every configured artifact and return the written paths
    pub fn export(&self, results: &[TranslationResult], input_file: &Path, output_dir: &Path) -> Result<Vec<PathBuf>> {
        let title = self.config.export.deck_name.clone().unwrap_or_else(|| {
            input_file
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "subtitles".to_string())
        });

        let mut written = Vec::new();
        for format in &self.config.export.formats {
            let exporter = exporter_for(*format, &title);
            let path = FileManager::generate_output_path(
                input_file,
                output_dir,
                &self.config.target_language,
                exporter.extension(),
            );
            let content = exporter.render(results)?;
            FileManager::write_to_file(&path, &content)?;
            info!("Success: {}", path.display());
            written.push(path);
        }
        Ok(written)
    }

    /// Process every `.srt` file under `input_dir`. A failing file is logged
    /// and the next one is processed.
    pub async fn run_folder(
        &self,
        input_dir: PathBuf,
        output_dir: Option<PathBuf>,
        force_overwrite: bool,
    ) -> Result<FolderSummary> {
        let start_time = Instant::now();

        if !FileManager::dir_exists(&input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let files = FileManager::find_files(&input_dir, "srt")?;
        if files.is_empty() {
            return Err(anyhow!("No subtitle files found in directory: {:?}", input_dir));
        }

        let multi_progress = MultiProgress::new();
        let folder_pb = multi_progress.add(ProgressBar::new(files.len() as u64));
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(style.progress_chars("=>-"));

        let mut summary = FolderSummary::default();
        for file in &files {
            let file_name = file
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            let target_dir = output_dir
                .clone()
                .or_else(|| file.parent().map(Path::to_path_buf))
                .unwrap_or_else(|| input_dir.clone());

            match self
                .run_with_progress(file, &target_dir, &multi_progress, force_overwrite)
                .await
            {
                Ok(outcome) if outcome.skipped => summary.skipped += 1,
                Ok(_) => summary.processed += 1,
                Err(e) => {
                    error!("Error processing file {}: {:#}", file_name, e);
                    let log_path = target_dir.join(ISSUES_LOG);
                    if let Err(log_err) =
                        FileManager::append_to_log_file(&log_path, &format!("{}: {:#}", file.display(), e))
                    {
                        warn!("Failed to write issues log: {}", log_err);
                    }
                    summary.failed += 1;
                }
            }
            folder_pb.inc(1);
        }
        folder_pb.finish_with_message("Folder processing complete");

        info!(
            "Folder processing completed in {}: {} processed, {} skipped, {} errors",
            Self::format_duration(start_time.elapsed()),
            summary.processed,
            summary.skipped,
            summary.failed
        );
        Ok(summary)
    }

    // Format duration in a human-readable format
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
