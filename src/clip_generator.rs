/*!
 * Audio clip and screenshot generation for emitted segments.
 *
 * Each segment gets `<id>.<audio_ext>` covering its time window and
 * `<id>.<screenshot_ext>` grabbed at the window's midpoint.
 */

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use tokio::process::Command;

use crate::alignment::Segment;
use crate::app_config::OutputConfig;
use crate::errors::MediaError;
use crate::subtitle_processor::filter_ffmpeg_stderr;

// @struct: What to cut for one segment
#[derive(Debug, Clone, PartialEq)]
pub struct ClipRequest {
    // @field: Segment id, used as the file stem
    pub segment_id: usize,
    pub start_ms: i64,
    pub end_ms: i64,
    // @field: Directory the artifacts are written to
    pub output_dir: PathBuf,
}

impl ClipRequest {
    pub fn for_segment(segment: &Segment, output_dir: &Path) -> Self {
        Self {
            segment_id: segment.segment_id,
            start_ms: segment.start_ms,
            end_ms: segment.end_ms,
            output_dir: output_dir.to_path_buf(),
        }
    }

    pub fn midpoint_ms(&self) -> i64 {
        (self.start_ms + self.end_ms) / 2
    }
}

// @struct: Files produced for one segment
#[derive(Debug, Clone, PartialEq)]
pub struct ClipArtifacts {
    pub audio_path: PathBuf,
    pub screenshot_path: PathBuf,
}

/// Cuts media for segments
#[async_trait]
pub trait ClipGenerator: Send + Sync {
    async fn generate(&self, video: &Path, request: &ClipRequest) -> Result<ClipArtifacts, MediaError>;
}

/// File name of a segment's audio clip
pub fn audio_file_name(segment_id: usize, extension: &str) -> String {
    format!("{}.{}", segment_id, extension)
}

/// File name of a segment's screenshot
pub fn screenshot_file_name(segment_id: usize, extension: &str) -> String {
    format!("{}.{}", segment_id, extension)
}

/// Seconds with millisecond precision, as ffmpeg's `-ss`/`-t` expect
pub fn ffmpeg_seconds(ms: i64) -> String {
    let ms = ms.max(0);
    format!("{}.{:03}", ms / 1000, ms % 1000)
}

/// ffmpeg-backed clip generator
#[derive(Debug, Clone)]
pub struct FfmpegClipGenerator {
    audio_extension: String,
    screenshot_extension: String,
    timeout: Duration,
}

impl FfmpegClipGenerator {
    pub fn new(audio_extension: impl Into<String>, screenshot_extension: impl Into<String>, timeout: Duration) -> Self {
        Self {
            audio_extension: audio_extension.into(),
            screenshot_extension: screenshot_extension.into(),
            timeout,
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(
            config.audio_extension.clone(),
            config.screenshot_extension.clone(),
            Duration::from_secs(config.ffmpeg_timeout_secs),
        )
    }

    /// Arguments for the audio cut
    pub fn audio_args(video: &Path, request: &ClipRequest, output: &Path) -> Vec<String> {
        let duration_ms = (request.end_ms - request.start_ms).max(0);
        vec![
            "-y".to_string(),
            "-v".to_string(),
            "error".to_string(),
            "-ss".to_string(),
            ffmpeg_seconds(request.start_ms),
            "-i".to_string(),
            video.to_string_lossy().into_owned(),
            "-t".to_string(),
            ffmpeg_seconds(duration_ms),
            "-vn".to_string(),
            "-map".to_string(),
            "0:a:0".to_string(),
            output.to_string_lossy().into_owned(),
        ]
    }

    /// Arguments for the midpoint frame grab
    pub fn screenshot_args(video: &Path, request: &ClipRequest, output: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-v".to_string(),
            "error".to_string(),
            "-ss".to_string(),
            ffmpeg_seconds(request.midpoint_ms()),
            "-i".to_string(),
            video.to_string_lossy().into_owned(),
            "-frames:v".to_string(),
            "1".to_string(),
            output.to_string_lossy().into_owned(),
        ]
    }

    async fn run_ffmpeg(&self, args: &[String]) -> Result<(), MediaError> {
        let ffmpeg_future = Command::new("ffmpeg").args(args).kill_on_drop(true).output();

        let output = tokio::select! {
            result = ffmpeg_future => {
                result.map_err(|e| MediaError::Spawn {
                    tool: "ffmpeg".to_string(),
                    message: e.to_string(),
                })?
            },
            _ = tokio::time::sleep(self.timeout) => {
                return Err(MediaError::Timeout {
                    tool: "ffmpeg".to_string(),
                    secs: self.timeout.as_secs(),
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MediaError::ToolFailed {
                tool: "ffmpeg".to_string(),
                message: filter_ffmpeg_stderr(&stderr),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl ClipGenerator for FfmpegClipGenerator {
    async fn generate(&self, video: &Path, request: &ClipRequest) -> Result<ClipArtifacts, MediaError> {
        let audio_path = request
            .output_dir
            .join(audio_file_name(request.segment_id, &self.audio_extension));
        let screenshot_path = request
            .output_dir
            .join(screenshot_file_name(request.segment_id, &self.screenshot_extension));

        self.run_ffmpeg(&Self::audio_args(video, request, &audio_path)).await?;
        debug!("Saved audio in {}", audio_path.display());

        self.run_ffmpeg(&Self::screenshot_args(video, request, &screenshot_path)).await?;
        debug!("Saved screenshot in {}", screenshot_path.display());

        Ok(ClipArtifacts {
            audio_path,
            screenshot_path,
        })
    }
}
