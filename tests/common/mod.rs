/*!
 * Common test utilities for the subsplit test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use subsplit::alignment::Cue;
use subsplit::language_utils::Language;
use subsplit::subtitle_processor::{RawCue, SubtitleTrack, TrackOrigin};


/// Routes library log output through the test harness; safe to call repeatedly
pub fn init_test_logger() {
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

/// Japanese SRT with three lines
pub const SAMPLE_JA_SRT: &str = "1
00:00:01,000 --> 00:00:03,000
おはよう

2
00:00:04,000 --> 00:00:06,000
元気？

3
00:00:10,000 --> 00:00:12,000
またね
";

/// Spanish SRT lined up with [`SAMPLE_JA_SRT`], missing the last line
pub const SAMPLE_ES_SRT: &str = "1
00:00:01,100 --> 00:00:02,900
Buenos días

2
00:00:04,100 --> 00:00:05,900
¿Qué tal?
";

/// English ASS script with a sign line and a comment
pub const SAMPLE_EN_ASS: &str = "[Script Info]
Title: Sample
ScriptType: v4.00+

[V4+ Styles]
Format: Name, Fontname, Fontsize
Style: Default,Arial,20

[Events]
Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
Dialogue: 0,0:00:01.10,0:00:02.90,Default,Aoi,0,0,0,,Good morning
Dialogue: 0,0:00:04.10,0:00:05.90,Default,Kou,0,0,0,,{\\i1}How are you?{\\i0}
Dialogue: 0,0:00:07.00,0:00:09.00,Sign,,0,0,0,,{\\pos(320,50)}CAFE
Comment: 0,0:00:10.00,0:00:12.00,Default,,0,0,0,,See you
";

/// Build a sanitized cue for aligner and merger tests
pub fn cue(language: Language, sub_id: usize, start_ms: i64, end_ms: i64, sentence: &str) -> Cue {
    Cue::new(language, start_ms, end_ms, sentence).with_sub_id(sub_id)
}

/// External track made from `(start, end, text)` dialogue events
pub fn track(language: Language, events: &[(i64, i64, &str)]) -> SubtitleTrack {
    SubtitleTrack::new(
        language,
        TrackOrigin::External,
        PathBuf::from(format!("test.{}.srt", language)),
        events
            .iter()
            .map(|(start, end, text)| RawCue::dialogue(*start, *end, *text))
            .collect(),
    )
}

/// External track from already built events
pub fn track_from_cues(language: Language, cues: Vec<RawCue>) -> SubtitleTrack {
    SubtitleTrack::new(
        language,
        TrackOrigin::External,
        PathBuf::from(format!("test.{}.ass", language)),
        cues,
    )
}
