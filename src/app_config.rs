use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::captions::CaptionMode;
use crate::captions::segmenter::{DEFAULT_SIMPLE_GROUP_SIZE, DEFAULT_WORD_GROUP_SIZE};
use crate::file_utils::FileManager;
use crate::style::StyleOverrides;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Caption segmentation settings
    #[serde(default)]
    pub captions: CaptionConfig,

    /// Subtitle style overrides applied on top of the default style
    #[serde(default)]
    pub style: StyleOverrides,

    /// Composition settings
    #[serde(default)]
    pub video: VideoConfig,

    /// Preview rendering bounds
    #[serde(default)]
    pub preview: PreviewConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Caption segmentation configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CaptionConfig {
    /// Segmentation mode
    #[serde(default)]
    pub mode: CaptionMode,

    /// Words per caption in `word` mode
    #[serde(default = "default_word_group_size")]
    pub word_group_size: usize,

    /// Words per caption in `simple` mode
    #[serde(default = "default_simple_group_size")]
    pub simple_group_size: usize,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            mode: CaptionMode::default(),
            word_group_size: default_word_group_size(),
            simple_group_size: default_simple_group_size(),
        }
    }
}

/// Video composition configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VideoConfig {
    /// Loop the background when the narration is longer
    #[serde(default = "default_true")]
    pub loop_background: bool,

    /// Trim the background when the narration is shorter
    #[serde(default = "default_true")]
    pub trim_background: bool,

    /// Burn subtitles into the picture with ffmpeg.
    /// When disabled the output carries narration but no captions.
    #[serde(default = "default_true")]
    pub burn_subtitles: bool,

    /// ffmpeg executable (name on PATH or absolute path)
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// ffprobe executable; derived from `ffmpeg_path` when unset
    #[serde(default)]
    pub ffprobe_path: Option<PathBuf>,

    /// Video encoder for composited output
    #[serde(default = "default_video_codec")]
    pub video_codec: String,

    /// Audio encoder for composited output
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Parent directory for per-job workspaces; system temp dir when unset
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            loop_background: true,
            trim_background: true,
            burn_subtitles: true,
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: None,
            video_codec: default_video_codec(),
            audio_codec: default_audio_codec(),
            temp_dir: None,
        }
    }
}

impl VideoConfig {
    /// The ffprobe binary: explicit setting, else a sibling of the ffmpeg path
    pub fn resolved_ffprobe_path(&self) -> PathBuf {
        if let Some(path) = &self.ffprobe_path {
            return path.clone();
        }

        let ffmpeg = &self.ffmpeg_path;
        match ffmpeg.file_name().map(|name| name.to_string_lossy().to_string()) {
            Some(name) if name.contains("ffmpeg") => ffmpeg.with_file_name(name.replacen("ffmpeg", "ffprobe", 1)),
            _ => PathBuf::from("ffprobe"),
        }
    }
}

/// Preview rendering configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PreviewConfig {
    /// Maximum preview width in pixels
    #[serde(default = "default_preview_width")]
    pub max_width: u32,

    /// Maximum preview height in pixels
    #[serde(default = "default_preview_height")]
    pub max_height: u32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            max_width: default_preview_width(),
            max_height: default_preview_height(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_word_group_size() -> usize {
    DEFAULT_WORD_GROUP_SIZE
}

fn default_simple_group_size() -> usize {
    DEFAULT_SIMPLE_GROUP_SIZE
}

fn default_true() -> bool {
    true
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_video_codec() -> String {
    "libx264".to_string()
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

fn default_preview_width() -> u32 {
    640
}

fn default_preview_height() -> u32 {
    360
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.captions.word_group_size == 0 {
            return Err(anyhow!("captions.word_group_size must be at least 1"));
        }
        if self.captions.simple_group_size == 0 {
            return Err(anyhow!("captions.simple_group_size must be at least 1"));
        }

        if self.video.ffmpeg_path.as_os_str().is_empty() {
            return Err(anyhow!("video.ffmpeg_path must not be empty"));
        }
        if self.video.video_codec.trim().is_empty() {
            return Err(anyhow!("video.video_codec must not be empty"));
        }
        if self.video.audio_codec.trim().is_empty() {
            return Err(anyhow!("video.audio_codec must not be empty"));
        }

        if self.preview.max_width == 0 || self.preview.max_height == 0 {
            return Err(anyhow!(
                "preview bounds must be positive, got {}x{}",
                self.preview.max_width,
                self.preview.max_height
            ));
        }

        Ok(())
    }

    /// Load configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;

        FileManager::write_to_file(path, &config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))?;

        Ok(())
    }
}
