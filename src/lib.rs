/*!
 * # text2video
 *
 * A Rust library that turns narration text plus a narration audio file into a
 * captioned video over a background clip.
 *
 * ## Features
 *
 * - Split text into captions by sentence, paragraph or fixed word groups
 * - Time captions proportionally against the narration duration
 * - Write bit-exact SRT files
 * - Resolve subtitle styles into ffmpeg `force_style` directives
 * - Loop or trim the background to the narration, merge audio and burn
 *   captions with ffmpeg
 * - Extract still frames and build small previews
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `captions`: Segmentation, timing and SRT output:
 *   - `captions::timecode`: SRT timestamp formatting and parsing
 *   - `captions::segmenter`: Text to caption units
 *   - `captions::timeline`: Proportional timing and SRT serialization
 * - `style`: Subtitle style resolution
 * - `media`: ffmpeg/ffprobe driven composition:
 *   - `media::tool`: Process invocation behind the `MediaTool` trait
 *   - `media::probe`: Media inspection
 *   - `media::workspace`: Per-job temporary directories
 *   - `media::renderer`: Subtitle burn-in strategies
 *   - `media::compositor`: The composition pipeline
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
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
pub mod app_config;
pub mod app_controller;
pub mod captions;
pub mod errors;
pub mod file_utils;
pub mod media;
pub mod style;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, RenderRequest};
pub use captions::{CaptionGenerator, CaptionMode, CaptionTimeline, Segmenter, TimedCaption};
pub use errors::{CaptionError, MediaError, StyleError};
pub use media::{CompositionJob, MediaTool, VideoCompositor};
pub use style::{resolve_style, StyleOverrides, SubtitleStyle};
