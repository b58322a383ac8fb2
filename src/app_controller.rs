use anyhow::{Context, Result, anyhow};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::alignment::{SegmentPipeline, apply_translation_fallback};
use crate::app_config::{Config, SubtitleInfo, TranslationProvider};
use crate::clip_generator::{ClipGenerator, ClipRequest, FfmpegClipGenerator};
use crate::file_utils::{self, FileManager};
use crate::language_utils::{Language, LanguageSet};
use crate::providers::Translator;
use crate::providers::deepl::DeepL;
use crate::segment_writer::SegmentWriter;
use crate::subtitle_processor::{SubtitleCollection, SubtitleTrack, TrackOrigin};

// @module: Application controller for episode segmentation

// @struct: Outcome of one episode
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpisodeReport {
    pub video: PathBuf,
    pub output_dir: PathBuf,
    // @field: Rows written to the TSV
    pub segments_written: usize,
    // @field: Secondary slots filled by the translator
    pub machine_translated: usize,
    pub translation_failures: usize,
    pub clip_failures: usize,
}

// @struct: Totals for a whole run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub processed: usize,
    pub failed: usize,
    pub segments_written: usize,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    languages: LanguageSet,
    translator: Option<Arc<dyn Translator>>,
    clip_generator: Arc<dyn ClipGenerator>,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a controller with collaborators built from the configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let translator: Option<Arc<dyn Translator>> = match config.translation.provider {
            TranslationProvider::None => None,
            TranslationProvider::DeepL => Some(Arc::new(DeepL::from_config(&config.translation))),
        };
        let clip_generator = Arc::new(FfmpegClipGenerator::from_config(&config.output));

        Self::with_collaborators(config, translator, clip_generator)
    }

    // @method: Create a controller with explicit translator and clip generator
    pub fn with_collaborators(
        config: Config,
        translator: Option<Arc<dyn Translator>>,
        clip_generator: Arc<dyn ClipGenerator>,
    ) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        let languages = config.language_set()?;

        Ok(Self {
            config,
            languages,
            translator,
            clip_generator,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn languages(&self) -> &LanguageSet {
        &self.languages
    }

    /// Process every episode under `input` (a video file or a directory)
    pub async fn run(&self, input: &Path, output_root: &Path) -> Result<RunSummary> {
        let start_time = Instant::now();

        let episodes = FileManager::find_episodes(input)?;
        if episodes.is_empty() {
            return Err(anyhow!("No video files found in: {:?}", input));
        }
        FileManager::ensure_dir(output_root)?;

        info!("Found {} episode(s) in {}", episodes.len(), input.display());

        let progress = ProgressBar::new(episodes.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} episodes ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress.set_style(template_result.progress_chars("█▓▒░"));
        progress.set_message("Processing episodes");

        let concurrency = if self.config.output.parallel_episodes {
            self.config.output.max_parallel_episodes.max(1)
        } else {
            1
        };

        let results: Vec<(PathBuf, Result<EpisodeReport>)> = stream::iter(episodes)
            .map(|video| {
                let progress = progress.clone();
                async move {
                    let result = self.process_episode(&video, output_root).await;
                    progress.inc(1);
                    (video, result)
                }
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        progress.finish_and_clear();

        let mut summary = RunSummary::default();
        for (video, result) in results {
            match result {
                Ok(report) => {
                    summary.processed += 1;
                    summary.segments_written += report.segments_written;
                }
                Err(e) => {
                    error!("Something happened processing {}, skipping: {:#}", video.display(), e);
                    summary.failed += 1;
                }
            }
        }

        info!(
            "Run completed in {}: {} processed, {} failed, {} segments",
            Self::format_duration(start_time.elapsed()),
            summary.processed,
            summary.failed,
            summary.segments_written
        );

        Ok(summary)
    }

    /// Gather subtitles for one episode, then segment it
    pub async fn process_episode(&self, video: &Path, output_root: &Path) -> Result<EpisodeReport> {
        info!("Processing episode: {}", video.display());

        let output_dir = FileManager::episode_output_dir(output_root, video);
        FileManager::ensure_dir(&output_dir)?;

        let collection = self.collect_subtitles(video, &output_dir).await?;
        let tracks: Vec<SubtitleTrack> = collection.tracks().cloned().collect();

        self.process_tracks(video, &tracks, &output_dir).await
    }

    /// Sidecar files first, then container streams, keeping the best track per language
    pub async fn collect_subtitles(&self, video: &Path, output_dir: &Path) -> Result<SubtitleCollection> {
        let mut collection = SubtitleCollection::new(video.to_path_buf());

        for path in FileManager::find_sidecar_subtitles(video)? {
            match self.load_sidecar(&path) {
                Ok(Some(track)) => {
                    info!("Found external [{}] subtitle: {}", track.language, path.display());
                    collection.offer(track);
                }
                Ok(None) => {}
                Err(e) => warn!("Skipping subtitle {}: {:#}", path.display(), e),
            }
        }

        let timeout = Duration::from_secs(self.config.output.ffmpeg_timeout_secs);
        match SubtitleCollection::list_subtitle_tracks(video, timeout).await {
            Ok(streams) => {
                let tmp_dir = output_dir.join("tmp");
                for info in streams {
                    if let Some(language) = self.stream_language(&info) {
                        FileManager::ensure_dir(&tmp_dir)?;
                        match SubtitleCollection::extract_track(video, &info, language, &tmp_dir, timeout).await {
                            Ok(track) => {
                                collection.offer(track);
                            }
                            Err(e) => warn!("Skipping subtitle stream {}: {:#}", info.index, e),
                        }
                    }
                }
                if tmp_dir.exists() {
                    if let Err(e) = std::fs::remove_dir_all(&tmp_dir) {
                        debug!("Could not remove {}: {}", tmp_dir.display(), e);
                    }
                }
            }
            Err(e) => warn!("Could not list subtitle streams of {}: {:#}", video.display(), e),
        }

        debug!("{}", collection);
        Ok(collection)
    }

    /// Load a sidecar file if its language is part of the configured set
    fn load_sidecar(&self, path: &Path) -> Result<Option<SubtitleTrack>> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let language = match file_utils::guess_language_from_file_name(&name) {
            Some(language) => language,
            None => {
                // Fall back to the text itself
                let probe = SubtitleTrack::load(path, self.languages.primary(), TrackOrigin::External)?;
                let text: String = probe
                    .cues
                    .iter()
                    .map(|cue| cue.plaintext())
                    .collect::<Vec<_>>()
                    .join(" ");
                match file_utils::guess_language_from_text(&text) {
                    Some(language) => {
                        info!("External subtitle detected language: {}", language);
                        language
                    }
                    None => {
                        warn!("Impossible to guess the language of {}, skipping", path.display());
                        return Ok(None);
                    }
                }
            }
        };

        if !self.languages.contains(language) {
            info!("Language {} is not configured, skipping {}", language, path.display());
            return Ok(None);
        }

        SubtitleTrack::load(path, language, TrackOrigin::External).map(Some)
    }

    /// Configured language of a container stream; untagged streams are ignored
    fn stream_language(&self, info: &SubtitleInfo) -> Option<Language> {
        let tag = info.language.as_deref()?;
        match Language::from_code(tag) {
            Some(language) if self.languages.contains(language) => {
                info!(
                    "Found internal subtitle stream {} ({}) [{}]",
                    info.index,
                    info.codec_name,
                    language
                );
                Some(language)
            }
            _ => {
                debug!("Subtitle stream {} language {} not configured", info.index, tag);
                None
            }
        }
    }

    /// Segment the given tracks and write clips and the TSV into `output_dir`
    pub async fn process_tracks(
        &self,
        video: &Path,
        tracks: &[SubtitleTrack],
        output_dir: &Path,
    ) -> Result<EpisodeReport> {
        let primary = self.languages.primary();
        if !tracks.iter().any(|t| t.language == primary) {
            return Err(anyhow!("Could not find [{}] subtitles for {}", primary, video.display()));
        }

        FileManager::ensure_dir(output_dir)?;

        let pipeline = SegmentPipeline::new(self.languages.clone(), &self.config.alignment);
        let mut segments = pipeline.build_segments(tracks)?;
        info!("Start file segmentation: {} segments", segments.len());

        let output = &self.config.output;
        let mut writer = SegmentWriter::create(
            output_dir.join(&output.tsv_file_name),
            self.languages.clone(),
            &output.audio_extension,
            &output.screenshot_extension,
        )?;

        let mut report = EpisodeReport {
            video: video.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            ..Default::default()
        };

        for segment in segments.iter_mut() {
            let failures =
                apply_translation_fallback(segment, &self.languages, self.translator.as_deref()).await;
            report.translation_failures += failures.len();
            report.machine_translated += segment
                .texts
                .iter()
                .filter(|(_, text)| text.is_machine_translated == Some(true))
                .count();

            if !output.dry_run {
                let request = ClipRequest::for_segment(segment, output_dir);
                if let Err(e) = self.clip_generator.generate(video, &request).await {
                    error!("Error creating clips for segment {}: {}", segment.segment_id, e);
                    report.clip_failures += 1;
                }
            }

            writer.write_segment(segment)?;
            debug!(
                "({}) {} - {}: {}",
                segment.segment_id,
                segment.start_ms,
                segment.end_ms,
                segment.sentence(primary).unwrap_or_default()
            );
        }

        report.segments_written = writer.rows_written();
        writer.finish()?;

        info!(
            "Finished {}: {} segments, {} machine translated, {} clip failures",
            video.display(),
            report.segments_written,
            report.machine_translated,
            report.clip_failures
        );

        Ok(report)
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
