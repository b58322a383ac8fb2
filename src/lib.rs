/*!
 * # subsplit - multilingual subtitle segmentation
 *
 * A Rust library for turning anime episodes into language-learning material:
 * subtitles in several languages are aligned on the timeline, and each aligned
 * line becomes one audio clip, one screenshot and one table row.
 *
 * ## Features
 *
 * - SRT and ASS parsing, sidecar discovery and container stream extraction
 * - Dialogue filtering and text normalization for subtitle lines
 * - Timeline alignment of a primary language with one or more secondaries
 * - Optional DeepL fallback for lines missing a translation
 * - ffmpeg audio clips and screenshots, TSV output
 * - ISO 639-1 and ISO 639-2 language code support
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `alignment`: The segmentation core:
 *   - `alignment::sanitizer`: Dialogue detection and text cleanup
 *   - `alignment::dedup`: Cue sequencing and duplicate removal
 *   - `alignment::aligner`: Grouping cues into time windows
 *   - `alignment::merger`: Merging a window into a segment
 *   - `alignment::fallback`: Machine translation of missing languages
 * - `subtitle_processor`: Subtitle file handling and track selection
 * - `providers`: Translation backends (`providers::deepl`, `providers::mock`)
 * - `clip_generator`: Audio and screenshot extraction
 * - `segment_writer`: TSV output
 * - `app_config`: Configuration management
 * - `app_controller`: Main application controller
 * - `file_utils`: File system operations and file name heuristics
 * - `language_utils`: ISO language code utilities and the supported language set
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod alignment;
pub mod app_config;
pub mod app_controller;
pub mod clip_generator;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod segment_writer;
pub mod subtitle_processor;

// Re-export main types for easier usage
pub use alignment::{Cue, Segment, SegmentPipeline};
pub use app_config::Config;
pub use errors::{AlignmentError, AppError, MediaError, ProviderError, SubtitleError};
pub use language_utils::{Language, LanguageMap, LanguageSet, get_language_name, language_codes_match};
pub use subtitle_processor::{RawCue, SubtitleCollection, SubtitleTrack};
