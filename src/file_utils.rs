use anyhow::{Context, Result};
use isolang::Language as IsoLanguage;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::language_utils::Language;

// @module: File and directory utilities

// @const: Release-group and quality tags such as [Group] or (1080p)
static BRACKET_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[.*?\]|\(.*?\)").unwrap());

// @const: Explicit episode markers: S01E05, E05, Ep 05, Episode 5
static EXPLICIT_EPISODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|[^a-z])(?:episode|ep|e)[\s._]?(\d{1,4})(?:\D|$)").unwrap()
});

// @const: Bare one or two digit number not introduced by a season `S`
static BARE_EPISODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\dSs](\d{1,2})(?:\D|$)").unwrap());

// @const: Word separators in release file names
static NAME_TOKENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s._\-\[\]()]+").unwrap());

/// Video containers picked up as episodes
pub const EPISODE_EXTENSIONS: &[&str] = &["mkv", "mp4", "webm", "avi", "m4v"];

/// Sidecar subtitle formats
pub const SUBTITLE_EXTENSIONS: &[&str] = &["ass", "ssa", "srt"];

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Find files with any of the given extensions, recursively, sorted by path
    pub fn find_files<P: AsRef<Path>>(dir: P, extensions: &[&str]) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() && has_extension(path, extensions) {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Episodes under `input`; a single video file is returned as is
    pub fn find_episodes<P: AsRef<Path>>(input: P) -> Result<Vec<PathBuf>> {
        let input = input.as_ref();
        if input.is_file() {
            return Ok(vec![input.to_path_buf()]);
        }
        if !input.is_dir() {
            return Err(anyhow::anyhow!("Input path does not exist: {:?}", input));
        }
        Self::find_files(input, EPISODE_EXTENSIONS)
    }

    /// Subtitle files next to `video` that belong to the same episode.
    ///
    /// When both names carry an episode number they must match; otherwise the
    /// subtitle name has to start with the video's file stem.
    pub fn find_sidecar_subtitles<P: AsRef<Path>>(video: P) -> Result<Vec<PathBuf>> {
        let video = video.as_ref();
        let Some(parent) = video.parent() else {
            return Ok(Vec::new());
        };
        let parent = if parent.as_os_str().is_empty() { Path::new(".") } else { parent };

        let video_name = file_name(video);
        let video_stem = video
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let video_episode = guess_episode_number(&video_name);

        let mut sidecars = Vec::new();
        for entry in fs::read_dir(parent).with_context(|| format!("Failed to read directory: {:?}", parent))? {
            let path = entry.context("Failed to read directory entry")?.path();
            if !path.is_file() || !has_extension(&path, SUBTITLE_EXTENSIONS) {
                continue;
            }

            let name = file_name(&path);
            let belongs = match (video_episode, guess_episode_number(&name)) {
                (Some(video_ep), Some(sub_ep)) => video_ep == sub_ep,
                _ => name.starts_with(&video_stem),
            };
            if belongs {
                sidecars.push(path);
            }
        }

        sidecars.sort();
        Ok(sidecars)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))
    }

    /// Per-episode output directory: `<output_root>/<video stem>`
    pub fn episode_output_dir<P1: AsRef<Path>, P2: AsRef<Path>>(output_root: P1, video: P2) -> PathBuf {
        let stem = video.as_ref().file_stem().unwrap_or_default();
        output_root.as_ref().join(stem)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy();
            extensions.iter().any(|e| ext.eq_ignore_ascii_case(e))
        })
        .unwrap_or(false)
}

/// Episode number from a release file name, ignoring bracketed tags
pub fn guess_episode_number(file_name: &str) -> Option<u32> {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());
    let cleaned = BRACKET_TAGS.replace_all(&stem, " ");
    let padded = format!(" {}", cleaned);

    EXPLICIT_EPISODE
        .captures(&cleaned)
        .or_else(|| BARE_EPISODE.captures(&padded))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Subtitle language from a file name: a trailing code (`ep01.ja.ass`) or a
/// language name anywhere (`[English]`, `Español`)
pub fn guess_language_from_file_name(file_name: &str) -> Option<Language> {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let tokens: Vec<&str> = NAME_TOKENS.split(&stem).filter(|t| !t.is_empty()).collect();

    if let Some(last) = tokens.last() {
        if (2..=3).contains(&last.len()) && last.chars().all(|c| c.is_ascii_alphabetic()) {
            if let Some(lang) = Language::from_code(last) {
                return Some(lang);
            }
        }
    }

    tokens.iter().rev().find_map(|token| language_from_name(token))
}

fn language_from_name(token: &str) -> Option<Language> {
    let token = token.to_lowercase();
    Language::ALL.into_iter().find(|lang| {
        IsoLanguage::from_639_1(lang.code()).is_some_and(|iso| {
            iso.to_name().to_lowercase() == token
                || iso.to_autonym().is_some_and(|autonym| autonym.to_lowercase() == token)
        })
    })
}

/// Detect Japanese from subtitle text by its share of kana
pub fn guess_language_from_text(text: &str) -> Option<Language> {
    let letters = text.chars().filter(|c| c.is_alphabetic()).count();
    if letters == 0 {
        return None;
    }
    let kana = text
        .chars()
        .filter(|c| matches!(*c as u32, 0x3040..=0x30FF | 0xFF66..=0xFF9F))
        .count();

    if kana * 5 >= letters { Some(Language::Japanese) } else { None }
}
