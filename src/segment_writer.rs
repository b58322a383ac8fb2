/*!
 * Tab-separated segment table, one per episode.
 *
 * Fields are never quoted; tabs, line breaks, quotes and backslashes inside
 * a field are escaped with a backslash so each segment stays on one row.
 */

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use csv::{QuoteStyle, Terminator, Writer, WriterBuilder};

use crate::alignment::{LanguageText, Segment};
use crate::clip_generator::{audio_file_name, screenshot_file_name};
use crate::language_utils::{Language, LanguageSet};

/// Column names, in output order, for a language set
pub fn header(languages: &LanguageSet) -> Vec<String> {
    let mut columns = vec!["ID".to_string()];
    columns.extend(
        languages
            .all()
            .map(|lang| format!("SUBS_{}_IDS", lang.ids_column_tag())),
    );
    columns.extend(
        [
            "START_TIME",
            "END_TIME",
            "NAME_AUDIO",
            "NAME_SCREENSHOT",
            "CONTENT",
        ]
        .map(String::from),
    );
    columns.extend(
        languages
            .secondary()
            .iter()
            .map(|lang| format!("CONTENT_TRANSLATION_{}", lang.column_name())),
    );
    columns.extend(
        languages
            .secondary()
            .iter()
            .map(|lang| format!("CONTENT_{}_MT", lang.column_name())),
    );
    columns.extend(
        languages
            .all()
            .map(|lang| format!("ACTOR_{}", lang.code().to_uppercase())),
    );
    columns
}

/// Render milliseconds the way a `timedelta` prints: `H:MM:SS[.ffffff]`,
/// with a `N day(s), ` prefix past 24 hours or below zero
pub fn format_timedelta(ms: i64) -> String {
    const DAY_MS: i64 = 86_400_000;

    let days = ms.div_euclid(DAY_MS);
    let rest = ms.rem_euclid(DAY_MS);

    let hours = rest / 3_600_000;
    let minutes = rest / 60_000 % 60;
    let seconds = rest / 1000 % 60;
    let millis = rest % 1000;

    let mut out = String::new();
    if days != 0 {
        let unit = if days.abs() == 1 { "day" } else { "days" };
        out.push_str(&format!("{} {}, ", days, unit));
    }
    out.push_str(&format!("{}:{:02}:{:02}", hours, minutes, seconds));
    if millis != 0 {
        out.push_str(&format!(".{:06}", millis * 1000));
    }
    out
}

/// Backslash-escape characters that would break an unquoted TSV field
pub fn escape_field(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '\t' | '"' | '\n' | '\r') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn mt_flag(flag: Option<bool>) -> String {
    match flag {
        Some(true) => "True".to_string(),
        Some(false) => "False".to_string(),
        None => String::new(),
    }
}

/// Field values of one segment, aligned with [`header`]
pub fn row(
    segment: &Segment,
    languages: &LanguageSet,
    audio_extension: &str,
    screenshot_extension: &str,
) -> Vec<String> {
    let empty = LanguageText::default();
    let text = |lang: Language| segment.text(lang).unwrap_or(&empty);

    let mut fields = vec![segment.segment_id.to_string()];
    fields.extend(languages.all().map(|lang| text(lang).ids_string()));
    fields.push(format_timedelta(segment.start_ms));
    fields.push(format_timedelta(segment.end_ms));
    fields.push(audio_file_name(segment.segment_id, audio_extension));
    fields.push(screenshot_file_name(segment.segment_id, screenshot_extension));
    fields.push(
        text(languages.primary())
            .merged_sentence
            .clone()
            .unwrap_or_default(),
    );
    fields.extend(
        languages
            .secondary()
            .iter()
            .map(|&lang| text(lang).merged_sentence.clone().unwrap_or_default()),
    );
    fields.extend(
        languages
            .secondary()
            .iter()
            .map(|&lang| mt_flag(text(lang).is_machine_translated)),
    );
    fields.extend(languages.all().map(|lang| text(lang).actors.clone()));

    fields.iter().map(|f| escape_field(f)).collect()
}

/// Streams segment rows to a TSV sink
pub struct SegmentWriter<W: Write> {
    writer: Writer<W>,
    languages: LanguageSet,
    audio_extension: String,
    screenshot_extension: String,
    rows_written: usize,
}

impl SegmentWriter<File> {
    /// Create `path` and write the header row
    pub fn create<P: AsRef<Path>>(
        path: P,
        languages: LanguageSet,
        audio_extension: &str,
        screenshot_extension: &str,
    ) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Self::from_writer(file, languages, audio_extension, screenshot_extension)
    }
}

impl<W: Write> SegmentWriter<W> {
    pub fn from_writer(
        sink: W,
        languages: LanguageSet,
        audio_extension: &str,
        screenshot_extension: &str,
    ) -> Result<Self> {
        let mut writer = WriterBuilder::new()
            .delimiter(b'\t')
            .quote_style(QuoteStyle::Never)
            .terminator(Terminator::CRLF)
            .from_writer(sink);

        writer
            .write_record(header(&languages))
            .context("Failed to write TSV header")?;

        Ok(Self {
            writer,
            languages,
            audio_extension: audio_extension.to_string(),
            screenshot_extension: screenshot_extension.to_string(),
            rows_written: 0,
        })
    }

    pub fn write_segment(&mut self, segment: &Segment) -> Result<()> {
        let fields = row(
            segment,
            &self.languages,
            &self.audio_extension,
            &self.screenshot_extension,
        );
        self.writer
            .write_record(&fields)
            .with_context(|| format!("Failed to write segment {}", segment.segment_id))?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flush and hand back the underlying sink
    pub fn finish(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush TSV output: {}", e.error()))
    }
}
