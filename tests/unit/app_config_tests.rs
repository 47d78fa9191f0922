/*!
 * Tests for application configuration functionality
 */

use anyhow::Result;
use std::path::PathBuf;
use text2video::app_config::{Config, LogLevel, VideoConfig};
use text2video::captions::CaptionMode;
use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.captions.mode, CaptionMode::Sentence);
    assert_eq!(config.captions.word_group_size, 3);
    assert_eq!(config.captions.simple_group_size, 5);
    assert!(config.style.is_empty());
    assert!(config.video.loop_background);
    assert!(config.video.trim_background);
    assert!(config.video.burn_subtitles);
    assert_eq!(config.video.ffmpeg_path, PathBuf::from("ffmpeg"));
    assert_eq!(config.video.video_codec, "libx264");
    assert_eq!(config.video.audio_codec, "aac");
    assert_eq!(config.preview.max_width, 640);
    assert_eq!(config.preview.max_height, 360);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    config.captions.word_group_size = 0;
    assert!(config.validate().is_err());
    config.captions.word_group_size = 3;

    config.captions.simple_group_size = 0;
    assert!(config.validate().is_err());
    config.captions.simple_group_size = 5;

    config.video.video_codec = "  ".to_string();
    assert!(config.validate().is_err());
    config.video.video_codec = "libx264".to_string();

    config.preview.max_height = 0;
    assert!(config.validate().is_err());
    config.preview.max_height = 360;

    assert!(config.validate().is_ok());
}

/// Test that a partial JSON file fills in defaults
#[test]
fn test_load_withPartialJson_shouldFillDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{
            "captions": { "mode": "word" },
            "style": { "FontSize": 36 },
            "video": { "loop_background": false },
            "log_level": "debug"
        }"#,
    )?;

    let config = Config::load(&path)?;
    assert_eq!(config.captions.mode, CaptionMode::Word);
    assert_eq!(config.captions.word_group_size, 3);
    assert_eq!(config.style.font_size, Some(36));
    assert!(!config.video.loop_background);
    assert!(config.video.trim_background);
    assert_eq!(config.log_level, LogLevel::Debug);
    Ok(())
}

/// Test that an unknown caption mode fails to load
#[test]
fn test_load_withUnknownMode_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", r#"{"captions": {"mode": "bogus"}}"#)?;
    assert!(Config::load(&path).is_err());
    Ok(())
}

/// Test save then load
#[test]
fn test_save_withCustomValues_shouldLoadBackEqual() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("sub").join("conf.json");

    let mut config = Config::default();
    config.captions.mode = CaptionMode::Paragraph;
    config.video.temp_dir = Some(PathBuf::from("/tmp/t2v"));
    config.style.set("Alignment", "8")?;
    config.save(&path)?;

    let loaded = Config::load(&path)?;
    assert_eq!(loaded.captions.mode, CaptionMode::Paragraph);
    assert_eq!(loaded.video.temp_dir, Some(PathBuf::from("/tmp/t2v")));
    assert_eq!(loaded.style.alignment, Some(8));
    Ok(())
}

/// Test ffprobe path derivation from the ffmpeg path
#[test]
fn test_resolved_ffprobe_path_withVariousSettings_shouldDerive() {
    let mut video = VideoConfig::default();
    assert_eq!(video.resolved_ffprobe_path(), PathBuf::from("ffprobe"));

    video.ffmpeg_path = PathBuf::from("/opt/ffmpeg/bin/ffmpeg");
    assert_eq!(video.resolved_ffprobe_path(), PathBuf::from("/opt/ffmpeg/bin/ffprobe"));

    video.ffprobe_path = Some(PathBuf::from("/usr/local/bin/ffprobe"));
    assert_eq!(video.resolved_ffprobe_path(), PathBuf::from("/usr/local/bin/ffprobe"));
}

/// Test log level mapping
#[test]
fn test_log_level_toLevelFilter_shouldMap() {
    assert_eq!(LogLevel::Error.to_level_filter(), log::LevelFilter::Error);
    assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
}
