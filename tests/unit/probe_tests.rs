/*!
 * Tests for ffprobe output parsing
 */

use anyhow::Result;
use std::path::Path;
use text2video::errors::MediaError;
use text2video::media::{parse_frame_rate, parse_probe_output, probe_media, SystemMediaTool};
use crate::common;

/// Test a typical video probe
#[test]
fn test_parse_probe_output_withVideo_shouldReadGeometry() {
    let json = r#"{
        "streams": [
            {"codec_type": "audio", "duration": "9.98"},
            {"codec_type": "video", "width": 1920, "height": 1080, "r_frame_rate": "30000/1001", "duration": "10.01"}
        ],
        "format": {"duration": "10.010000", "size": "5242880"}
    }"#;

    let asset = parse_probe_output(Path::new("bg.mp4"), json).unwrap();
    assert!((asset.duration_seconds - 10.01).abs() < 1e-9);
    assert_eq!(asset.width, Some(1920));
    assert_eq!(asset.height, Some(1080));
    assert!((asset.frame_rate.unwrap() - 29.97).abs() < 0.01);
    assert_eq!(asset.size_bytes, Some(5_242_880));
    assert!(asset.has_video());
}

/// Test an audio-only probe
#[test]
fn test_parse_probe_output_withAudioOnly_shouldHaveNoGeometry() {
    let json = r#"{"streams":[{"codec_type":"audio","duration":"12.5"}],"format":{"duration":"12.500000"}}"#;
    let asset = parse_probe_output(Path::new("voice.mp3"), json).unwrap();

    assert_eq!(asset.duration_seconds, 12.5);
    assert!(!asset.has_video());
    assert_eq!(asset.frame_rate, None);
}

/// Test the fallback to stream durations
#[test]
fn test_parse_probe_output_withoutFormatDuration_shouldUseLongestStream() {
    let json = r#"{"streams":[{"codec_type":"audio","duration":"3.2"},{"codec_type":"video","width":2,"height":2,"duration":"4.5"}],"format":{}}"#;
    let asset = parse_probe_output(Path::new("x.mkv"), json).unwrap();
    assert_eq!(asset.duration_seconds, 4.5);
}

/// Test unusable ffprobe output
#[test]
fn test_parse_probe_output_withBadOutput_shouldReturnProbeError() {
    for stdout in ["", "not json", r#"{"format":{"duration":"N/A"}}"#, r#"{"format":{"duration":"0"}}"#] {
        let result = parse_probe_output(Path::new("x.mp4"), stdout);
        assert!(matches!(result, Err(MediaError::Probe { .. })), "stdout {:?}", stdout);
    }
}

/// Test frame rate parsing
#[test]
fn test_parse_frame_rate_withVariousForms_shouldParse() {
    assert_eq!(parse_frame_rate("25"), Some(25.0));
    assert_eq!(parse_frame_rate("30/1"), Some(30.0));
    assert_eq!(parse_frame_rate("0/0"), None);
    assert_eq!(parse_frame_rate("abc"), None);
}

/// Test that an ffprobe binary which cannot be started is a probe failure
#[test]
fn test_probe_media_withMissingFfprobe_shouldReturnProbeError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let file = common::create_test_file(temp_dir.path(), "clip.mp4", "not really video")?;
    let tool = SystemMediaTool::new("/nonexistent/ffmpeg", "/nonexistent/ffprobe");

    match probe_media(&tool, &file) {
        Err(MediaError::Probe { path, message }) => {
            assert_eq!(path, file);
            assert!(message.contains("/nonexistent/ffprobe"), "message {:?}", message);
        }
        other => panic!("expected Probe error, got {:?}", other),
    }
    Ok(())
}
