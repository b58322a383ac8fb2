use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use log::{debug, error, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Value, from_str};
use tokio::process::Command;

use crate::app_config::SubtitleInfo;
use crate::errors::SubtitleError;
use crate::language_utils::{Language, LanguageMap};

// @module: Subtitle track reading and selection

// @const: SRT timestamp regex (accepts `,` or `.` before milliseconds)
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2}):(\d{2}):(\d{2})[,.](\d{3}) --> (\d{1,2}):(\d{2}):(\d{2})[,.](\d{3})").unwrap()
});

// @const: ASS override blocks such as {\an8} or {\i1}
static OVERRIDE_BLOCK_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[^}]*\}").unwrap());

// @const: SRT inline styling tags
static SRT_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</?(?:i|b|u|s|font)(?:\s[^>]*)?>").unwrap()
});

/// Kind of event line in the source markup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupType {
    /// Spoken or displayed event
    Dialogue,
    /// Commented-out event, never shown
    Comment,
}

// @struct: One subtitle event before sanitization
#[derive(Debug, Clone, PartialEq)]
pub struct RawCue {
    // @field: Event kind
    pub markup_type: MarkupType,

    // @field: Start time in ms
    pub start_ms: i64,

    // @field: End time in ms
    pub end_ms: i64,

    // @field: Speaker label (ASS `Name` field)
    pub actor: String,

    // @field: Style name (ASS `Style` field)
    pub style: String,

    // @field: Text with markup, lines separated by `\N`
    pub raw_text: String,
}

impl RawCue {
    /// Dialogue event with no actor and the default style
    pub fn dialogue(start_ms: i64, end_ms: i64, raw_text: impl Into<String>) -> Self {
        Self {
            markup_type: MarkupType::Dialogue,
            start_ms,
            end_ms,
            actor: String::new(),
            style: "Default".to_string(),
            raw_text: raw_text.into(),
        }
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    pub fn as_comment(mut self) -> Self {
        self.markup_type = MarkupType::Comment;
        self
    }

    /// Text with override blocks removed and ASS line breaks turned into newlines
    pub fn plaintext(&self) -> String {
        ass_plaintext(&self.raw_text)
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: i64) -> String {
        let ms = ms.max(0);
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }
}

impl fmt::Display for RawCue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} --> {} [{}] {}",
            Self::format_timestamp(self.start_ms),
            Self::format_timestamp(self.end_ms),
            self.actor,
            self.raw_text
        )
    }
}

/// Strip `{...}` override blocks and turn `\N`, `\n` and `\h` into plain whitespace
pub fn ass_plaintext(raw_text: &str) -> String {
    OVERRIDE_BLOCK_REGEX
        .replace_all(raw_text, "")
        .replace("\\h", " ")
        .replace("\\n", "\n")
        .replace("\\N", "\n")
}

/// Where a track came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackOrigin {
    /// Sidecar file next to the episode
    External,
    /// Stream extracted from the video container
    Internal,
}

/// Supported subtitle file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    Srt,
    Ass,
}

impl SubtitleFormat {
    /// Guess the format from the file extension, falling back to content sniffing
    pub fn detect(path: &Path, content: &str) -> Result<Self, SubtitleError> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "srt" | "subrip" => Ok(Self::Srt),
            "ass" | "ssa" => Ok(Self::Ass),
            _ if content.contains("[Events]") => Ok(Self::Ass),
            _ if TIMESTAMP_REGEX.is_match(content) => Ok(Self::Srt),
            _ => Err(SubtitleError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// A parsed track in one language
#[derive(Debug, Clone)]
pub struct SubtitleTrack {
    /// Language of the track
    pub language: Language,

    /// Sidecar or container stream
    pub origin: TrackOrigin,

    /// File the cues were read from
    pub source_file: PathBuf,

    /// Events in file order
    pub cues: Vec<RawCue>,
}

impl SubtitleTrack {
    pub fn new(language: Language, origin: TrackOrigin, source_file: PathBuf, cues: Vec<RawCue>) -> Self {
        Self { language, origin, source_file, cues }
    }

    /// Load a track from an SRT or ASS file
    pub fn load<P: AsRef<Path>>(path: P, language: Language, origin: TrackOrigin) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read subtitle file: {}", path.display()))?;
        // Strip a UTF-8 BOM so the first line parses
        let content = content.trim_start_matches('\u{feff}');

        let cues = match SubtitleFormat::detect(path, content)? {
            SubtitleFormat::Srt => parse_srt_string(content)?,
            SubtitleFormat::Ass => parse_ass_string(content)?,
        };

        debug!("Loaded {} [{}] events from {}", cues.len(), language, path.display());
        Ok(Self::new(language, origin, path.to_path_buf(), cues))
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }
}

impl fmt::Display for SubtitleTrack {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[{}] {:?} {} ({} events)",
            self.language,
            self.origin,
            self.source_file.display(),
            self.cues.len()
        )
    }
}

/// Parse SRT format string into dialogue events
pub fn parse_srt_string(content: &str) -> Result<Vec<RawCue>, SubtitleError> {
    let mut cues = Vec::new();

    let mut current_seq_num: Option<usize> = None;
    let mut current_times: Option<(i64, i64)> = None;
    let mut current_text: Vec<String> = Vec::new();

    let flush = |times: Option<(i64, i64)>, text: &mut Vec<String>, cues: &mut Vec<RawCue>| {
        if let Some((start_ms, end_ms)) = times {
            if !text.is_empty() {
                let joined = text.join("\\N");
                cues.push(RawCue::dialogue(start_ms, end_ms, SRT_TAG_REGEX.replace_all(&joined, "").into_owned()));
            }
        }
        text.clear();
    };

    for (line_count, line) in content.lines().enumerate() {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            if current_times.is_some() && !current_text.is_empty() {
                flush(current_times, &mut current_text, &mut cues);
                current_seq_num = None;
                current_times = None;
            }
            continue;
        }

        if current_seq_num.is_none() && current_times.is_none() {
            if let Ok(num) = trimmed.parse::<usize>() {
                current_seq_num = Some(num);
                continue;
            }
        }

        if current_times.is_none() || current_text.is_empty() {
            if let Some(caps) = TIMESTAMP_REGEX.captures(trimmed) {
                if current_times.is_some() {
                    // Previous block had a timestamp but no text
                    warn!("Skipping empty subtitle entry before line {}", line_count + 1);
                }
                current_times = Some((captures_to_ms(&caps, 1)?, captures_to_ms(&caps, 5)?));
                continue;
            }
        }

        if current_times.is_some() {
            current_text.push(trimmed.to_string());
        } else {
            warn!("Unexpected text at line {} before timestamp: {}", line_count + 1, trimmed);
        }
    }

    flush(current_times, &mut current_text, &mut cues);

    if cues.is_empty() {
        return Err(SubtitleError::Malformed("no SRT entries found".to_string()));
    }

    Ok(cues)
}

fn captures_to_ms(caps: &regex::Captures, start_idx: usize) -> Result<i64, SubtitleError> {
    let mut parts = [0i64; 4];
    for (offset, part) in parts.iter_mut().enumerate() {
        let raw = caps.get(start_idx + offset).map(|m| m.as_str()).unwrap_or_default();
        *part = raw
            .parse()
            .map_err(|_| SubtitleError::InvalidTimestamp(caps[0].to_string()))?;
    }
    let [hours, minutes, seconds, millis] = parts;
    Ok((hours * 3600 + minutes * 60 + seconds) * 1000 + millis)
}

/// Default `[Events]` field order used when a script has no `Format:` line
const DEFAULT_EVENT_FORMAT: &[&str] = &[
    "layer", "start", "end", "style", "name", "marginl", "marginr", "marginv", "effect", "text",
];

/// Parse an ASS/SSA script, keeping both Dialogue and Comment events
pub fn parse_ass_string(content: &str) -> Result<Vec<RawCue>, SubtitleError> {
    let mut cues = Vec::new();
    let mut in_events = false;
    let mut format: Vec<String> = DEFAULT_EVENT_FORMAT.iter().map(|s| s.to_string()).collect();

    for line in content.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with('[') {
            in_events = trimmed.eq_ignore_ascii_case("[events]");
            continue;
        }
        if !in_events {
            continue;
        }

        let Some((kind, rest)) = trimmed.split_once(':') else {
            continue;
        };

        let markup_type = match kind.trim() {
            "Format" => {
                format = rest.split(',').map(|f| f.trim().to_lowercase()).collect();
                continue;
            }
            "Dialogue" => MarkupType::Dialogue,
            "Comment" => MarkupType::Comment,
            _ => continue,
        };

        // Text is the last field and may itself contain commas
        let fields: Vec<&str> = rest.trim_start().splitn(format.len(), ',').collect();
        if fields.len() != format.len() {
            warn!("Skipping ASS event with {} fields (expected {}): {}", fields.len(), format.len(), trimmed);
            continue;
        }

        cues.push(RawCue {
            markup_type,
            start_ms: parse_ass_timestamp(event_field(&format, &fields, "start"))?,
            end_ms: parse_ass_timestamp(event_field(&format, &fields, "end"))?,
            actor: event_field(&format, &fields, "name").to_string(),
            style: event_field(&format, &fields, "style").trim().to_string(),
            raw_text: event_field(&format, &fields, "text").to_string(),
        });
    }

    if cues.is_empty() {
        return Err(SubtitleError::Malformed("no [Events] entries found".to_string()));
    }

    Ok(cues)
}

fn event_field<'a>(format: &[String], fields: &[&'a str], name: &str) -> &'a str {
    format
        .iter()
        .position(|f| f == name)
        .and_then(|i| fields.get(i).copied())
        .unwrap_or_default()
}

/// Parse an ASS timestamp (`H:MM:SS.cc`) to milliseconds
pub fn parse_ass_timestamp(timestamp: &str) -> Result<i64, SubtitleError> {
    let invalid = || SubtitleError::InvalidTimestamp(timestamp.to_string());
    let trimmed = timestamp.trim();

    let mut parts = trimmed.splitn(3, ':');
    let hours: i64 = parts.next().ok_or_else(invalid)?.parse().map_err(|_| invalid())?;
    let minutes: i64 = parts.next().ok_or_else(invalid)?.parse().map_err(|_| invalid())?;
    let seconds_part = parts.next().ok_or_else(invalid)?;

    let (secs, frac) = seconds_part.split_once('.').unwrap_or((seconds_part, "0"));
    let seconds: i64 = secs.parse().map_err(|_| invalid())?;
    if minutes >= 60 || seconds >= 60 || frac.is_empty() || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    // Fraction is centiseconds in ASS but some writers emit milliseconds
    let padded: String = frac.chars().chain("000".chars()).take(3).collect();
    let millis: i64 = padded.parse().map_err(|_| invalid())?;

    Ok((hours * 3600 + minutes * 60 + seconds) * 1000 + millis)
}

/// Matched tracks for one episode, at most one per language
#[derive(Debug, Default)]
pub struct SubtitleCollection {
    /// Episode video
    pub source_file: PathBuf,

    /// Selected track per language
    pub tracks: LanguageMap<SubtitleTrack>,
}

impl SubtitleCollection {
    /// Create an empty collection for an episode
    pub fn new(source_file: PathBuf) -> Self {
        Self {
            source_file,
            tracks: LanguageMap::new(),
        }
    }

    /// Offer a track; returns true when it was kept.
    ///
    /// Sidecar files replace anything with fewer events. Container streams
    /// only replace a shorter container stream, never a sidecar file.
    pub fn offer(&mut self, track: SubtitleTrack) -> bool {
        let language = track.language;
        if let Some(existing) = self.tracks.get(language) {
            let keep_new = match track.origin {
                TrackOrigin::External => track.len() >= existing.len(),
                TrackOrigin::Internal => {
                    existing.origin != TrackOrigin::External && track.len() > existing.len()
                }
            };
            if !keep_new {
                debug!("Already matched a better [{}] track, skipping {}", language, track.source_file.display());
                return false;
            }
            info!("Replacing [{}] track with {}", language, track);
        } else {
            info!("Saving subtitles: {}", track);
        }
        self.tracks.insert(language, track);
        true
    }

    /// Selected tracks in language order
    pub fn tracks(&self) -> impl Iterator<Item = &SubtitleTrack> {
        self.tracks.iter().map(|(_, track)| track)
    }

    pub fn has_language(&self, language: Language) -> bool {
        self.tracks.contains(language)
    }

    /// List subtitle tracks in a video file
    pub async fn list_subtitle_tracks<P: AsRef<Path>>(video_path: P, timeout: Duration) -> Result<Vec<SubtitleInfo>> {
        let video_path = video_path.as_ref();

        if !video_path.exists() {
            return Err(anyhow!("Video file not found: {:?}", video_path));
        }

        let ffprobe_future = Command::new("ffprobe")
            .args([
                "-v", "quiet",
                "-print_format", "json",
                "-show_streams",
                "-select_streams", "s",
                video_path.to_str().unwrap_or(""),
            ])
            .output();

        let output = tokio::select! {
            result = ffprobe_future => {
                result.map_err(|e| anyhow!("Failed to execute ffprobe command: {}", e))?
            },
            _ = tokio::time::sleep(timeout) => {
                return Err(anyhow!("ffprobe command timed out after {} seconds", timeout.as_secs()));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("ffprobe failed: {}", stderr);
            return Err(anyhow!("ffprobe command failed: {}", stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.trim().is_empty() {
            return Ok(Vec::new());
        }

        let json: Value = from_str(&stdout).context("Failed to parse ffprobe JSON output")?;
        Ok(Self::parse_ffprobe_streams(&json))
    }

    /// Turn ffprobe's `streams` array into track descriptions
    pub fn parse_ffprobe_streams(json: &Value) -> Vec<SubtitleInfo> {
        let Some(streams) = json.get("streams").and_then(|s| s.as_array()) else {
            return Vec::new();
        };

        streams
            .iter()
            .filter(|stream| {
                stream.get("codec_type").and_then(|v| v.as_str()).unwrap_or("subtitle") == "subtitle"
            })
            .map(|stream| {
                let tag = |name: &str| {
                    stream
                        .get("tags")
                        .and_then(|t| t.get(name))
                        .and_then(|l| l.as_str())
                        .map(|s| s.to_string())
                };
                SubtitleInfo {
                    index: stream.get("index").and_then(|v| v.as_u64()).unwrap_or(0) as usize,
                    codec_name: stream
                        .get("codec_name")
                        .and_then(|v| v.as_str())
                        .unwrap_or("unknown")
                        .to_string(),
                    language: tag("language"),
                    title: tag("title"),
                }
            })
            .collect()
    }

    /// Extract one container stream to `output_dir` and parse it
    pub async fn extract_track<P: AsRef<Path>>(
        video_path: P,
        info: &SubtitleInfo,
        language: Language,
        output_dir: &Path,
        timeout: Duration,
    ) -> Result<SubtitleTrack> {
        let video_path = video_path.as_ref();

        if Self::is_bitmap_codec(&info.codec_name) {
            return Err(anyhow!(
                "Track {} is bitmap-based ({}) and cannot be read as text",
                info.index, info.codec_name
            ));
        }

        let extension = match info.codec_name.as_str() {
            "ass" | "ssa" => "ass",
            "subrip" | "srt" => "srt",
            other => {
                return Err(SubtitleError::UnsupportedFormat(other.to_string()).into());
            }
        };

        let stem = video_path.file_stem().unwrap_or_default().to_string_lossy();
        let output_path = output_dir.join(format!("{}.{}.{}.{}", stem, info.index, language, extension));

        let ffmpeg_future = Command::new("ffmpeg")
            .args([
                "-y",
                "-i", video_path.to_str().unwrap_or_default(),
                "-map", &format!("0:{}", info.index),
                "-c", "copy",
                output_path.to_str().unwrap_or_default(),
            ])
            .output();

        let result = tokio::select! {
            result = ffmpeg_future => {
                result.map_err(|e| anyhow!("Failed to execute ffmpeg command for subtitle extraction: {}", e))?
            },
            _ = tokio::time::sleep(timeout) => {
                return Err(anyhow!("ffmpeg command timed out after {} seconds", timeout.as_secs()));
            }
        };

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let filtered = filter_ffmpeg_stderr(&stderr);
            error!("Subtitle extraction failed: {}", filtered);
            return Err(anyhow!("ffmpeg extraction failed: {}", filtered));
        }

        info!("Exported subtitle stream {} to: {}", info.index, output_path.display());
        SubtitleTrack::load(&output_path, language, TrackOrigin::Internal)
    }

    /// Check if a subtitle codec is bitmap-based (cannot be converted to text)
    pub fn is_bitmap_codec(codec_name: &str) -> bool {
        matches!(
            codec_name,
            "hdmv_pgs_subtitle" | "dvd_subtitle" | "dvb_subtitle" | "xsub"
        )
    }
}

/// Filter ffmpeg stderr to only show meaningful error lines, stripping the
/// version banner, build configuration, and stream metadata noise.
pub fn filter_ffmpeg_stderr(stderr: &str) -> String {
    let noise_prefixes = [
        "ffmpeg version",
        "built with",
        "configuration:",
        "lib",
        "Input #",
        "Metadata:",
        "Duration:",
        "Chapter",
        "Stream #",
        "title",
        "BPS",
        "DURATION",
        "NUMBER_OF",
        "_STATISTICS",
        "Output #",
        "Stream mapping:",
        "Press [q]",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !noise_prefixes.iter().any(|p| line.starts_with(p)))
        .collect();

    if meaningful.is_empty() {
        "unknown ffmpeg error (stderr was empty after filtering)".to_string()
    } else {
        meaningful.join("\n")
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Collection")?;
        writeln!(f, "Source: {:?}", self.source_file)?;
        for track in self.tracks() {
            writeln!(f, "  {}", track)?;
        }
        Ok(())
    }
}
