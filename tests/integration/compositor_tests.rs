/*!
 * Composition pipeline tests against the scripted media tool
 */

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use text2video::captions::{CaptionGenerator, CaptionMode, Segmenter};
use text2video::errors::MediaError;
use text2video::media::{
    preview_scale_filter, BurnInRenderer, CaptionSource, CompositionJob, Reconciliation, SkipRenderer,
    SubtitleRenderer, VideoCompositor,
};
use text2video::style::StyleOverrides;

use crate::common::{self, mock_media::MockMediaTool};

struct Fixture {
    _dir: TempDir,
    background: PathBuf,
    audio: PathBuf,
    temp_root: PathBuf,
    output: PathBuf,
}

impl Fixture {
    fn new() -> Result<Self> {
        let dir = common::create_temp_dir()?;
        let (background, audio) = common::create_media_inputs(dir.path())?;
        let temp_root = dir.path().join("work");
        std::fs::create_dir_all(&temp_root)?;
        let output = dir.path().join("out").join("final.mp4");
        Ok(Self {
            _dir: dir,
            background,
            audio,
            temp_root,
            output,
        })
    }

    fn tool(&self, background_secs: f64, audio_secs: f64) -> MockMediaTool {
        MockMediaTool::new()
            .with_video(&self.background, background_secs, 1280, 720)
            .with_audio(&self.audio, audio_secs)
    }

    fn compositor(&self, tool: &Arc<MockMediaTool>, renderer: Box<dyn SubtitleRenderer>) -> VideoCompositor {
        VideoCompositor::new(tool.clone(), renderer).with_temp_root(Some(self.temp_root.clone()))
    }

    fn job(&self, audio_secs: f64) -> CompositionJob {
        let timeline = CaptionGenerator::new(Segmenter::new(CaptionMode::Sentence))
            .build_timeline(common::SAMPLE_TEXT, audio_secs)
            .unwrap();
        CompositionJob {
            background: self.background.clone(),
            audio: self.audio.clone(),
            captions: CaptionSource::Timeline(timeline),
            style: StyleOverrides::default(),
            output: self.output.clone(),
            loop_background: true,
            trim_background: true,
        }
    }
}

fn merge_call(tool: &MockMediaTool) -> Vec<String> {
    tool.ffmpeg_call_with("1:a:0").expect("merge call").args
}

fn position(args: &[String], value: &str) -> Option<usize> {
    args.iter().position(|a| a == value)
}

fn assert_workspace_clean(root: &Path) {
    assert_eq!(common::dir_entry_count(root).unwrap(), 0, "workspace left behind in {:?}", root);
}

/// Test that a short background is looped to the narration length
#[test]
fn test_create_video_withShortBackground_shouldLoopToAudioLength() -> Result<()> {
    let fx = Fixture::new()?;
    let tool = Arc::new(fx.tool(5.0, 12.0));
    let compositor = fx.compositor(&tool, Box::new(BurnInRenderer));

    let report = compositor.create_video(&fx.job(12.0))?;

    assert_eq!(report.reconciliation, Reconciliation::Loop { target: 12.0 });
    assert!(report.reconciliation.resulting_duration(5.0) >= 12.0);
    assert!(report.subtitles_burned);
    assert_eq!(report.background.width, Some(1280));

    let args = merge_call(&tool);
    let loop_at = position(&args, "-stream_loop").expect("-stream_loop");
    let input_at = position(&args, "-i").expect("-i");
    assert!(loop_at < input_at);
    assert_eq!(args[loop_at + 1], "-1");
    let t_at = position(&args, "-t").expect("-t");
    assert_eq!(args[t_at + 1], "12.000");

    assert!(fx.output.exists());
    assert_workspace_clean(&fx.temp_root);
    Ok(())
}

/// Test that a long background is trimmed to the narration length
#[test]
fn test_create_video_withLongBackground_shouldTrimToAudioLength() -> Result<()> {
    let fx = Fixture::new()?;
    let tool = Arc::new(fx.tool(30.0, 12.5));
    let compositor = fx.compositor(&tool, Box::new(BurnInRenderer));

    let report = compositor.create_video(&fx.job(12.5))?;

    assert_eq!(report.reconciliation, Reconciliation::Trim { target: 12.5 });
    assert_eq!(report.reconciliation.resulting_duration(30.0), 12.5);

    let args = merge_call(&tool);
    assert_eq!(position(&args, "-stream_loop"), None);
    let t_at = position(&args, "-t").expect("-t");
    assert_eq!(args[t_at + 1], "12.500");
    assert!(args.iter().any(|a| a == "0:v:0"));
    Ok(())
}

/// Test that disabled policies keep the background as is
#[test]
fn test_create_video_withPoliciesDisabled_shouldKeepBackground() -> Result<()> {
    let fx = Fixture::new()?;
    let tool = Arc::new(fx.tool(5.0, 12.0));
    let compositor = fx.compositor(&tool, Box::new(BurnInRenderer));

    let mut job = fx.job(12.0);
    job.loop_background = false;
    job.trim_background = false;
    let report = compositor.create_video(&job)?;

    assert_eq!(report.reconciliation, Reconciliation::Keep);
    let args = merge_call(&tool);
    assert_eq!(position(&args, "-stream_loop"), None);
    assert_eq!(position(&args, "-t"), None);
    Ok(())
}

/// Test the burn step: workspace-relative subtitles and the resolved style
#[test]
fn test_create_video_withBurnIn_shouldRunFilterInsideWorkspace() -> Result<()> {
    let fx = Fixture::new()?;
    let tool = Arc::new(fx.tool(10.0, 10.0));
    let compositor = fx.compositor(&tool, Box::new(BurnInRenderer));

    let mut job = fx.job(10.0);
    job.style = StyleOverrides::from_pairs([("FontSize", "36")])?;
    compositor.create_video(&job)?;

    let burn = tool.ffmpeg_call_with("subtitles=").expect("burn call");
    let working_dir = burn.working_dir.clone().expect("burn runs in the workspace");
    assert!(working_dir.starts_with(&fx.temp_root));
    assert!(
        working_dir
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("text2video-")
    );

    let vf_at = position(&burn.args, "-vf").expect("-vf");
    let filter = &burn.args[vf_at + 1];
    assert!(filter.starts_with("subtitles=captions.srt:force_style='FontName=Arial,FontSize=36,"));
    assert!(burn.args.windows(2).any(|w| w[0] == "-c:a" && w[1] == "copy"));
    assert_eq!(burn.output_arg(), Some("burned.mp4"));
    Ok(())
}

/// Test that an encoder failure surfaces its stderr and leaves nothing behind
#[test]
fn test_create_video_withBurnFailure_shouldReturnEncodingAndCleanUp() -> Result<()> {
    let fx = Fixture::new()?;
    let tool = Arc::new(
        fx.tool(10.0, 10.0)
            .failing_when("subtitles=", "[Parsed_subtitles_0] Unable to open captions.srt"),
    );
    let compositor = fx.compositor(&tool, Box::new(BurnInRenderer));

    let result = compositor.create_video(&fx.job(10.0));

    match result {
        Err(MediaError::Encoding { operation, message }) => {
            assert_eq!(operation, "subtitle burn");
            assert!(message.contains("Unable to open captions.srt"));
            assert!(!message.contains("ffmpeg version"));
        }
        other => panic!("expected Encoding error, got {:?}", other),
    }
    assert!(!fx.output.exists());
    assert_workspace_clean(&fx.temp_root);
    Ok(())
}

/// Test that a merge failure stops before the burn step
#[test]
fn test_create_video_withMergeFailure_shouldNotBurn() -> Result<()> {
    let fx = Fixture::new()?;
    let tool = Arc::new(fx.tool(10.0, 10.0).failing_when("1:a:0", "Stream map '1:a:0' matches no streams."));
    let compositor = fx.compositor(&tool, Box::new(BurnInRenderer));

    let result = compositor.create_video(&fx.job(10.0));

    assert!(matches!(result, Err(MediaError::Encoding { ref operation, .. }) if operation == "audio merge"));
    assert!(tool.ffmpeg_call_with("subtitles=").is_none());
    assert!(!fx.output.exists());
    assert_workspace_clean(&fx.temp_root);
    Ok(())
}

/// Test that an unprobeable input fails before any encoding
#[test]
fn test_create_video_withUnprobeableAudio_shouldReturnProbeError() -> Result<()> {
    let fx = Fixture::new()?;
    let tool = Arc::new(MockMediaTool::new().with_video(&fx.background, 10.0, 640, 360));
    let compositor = fx.compositor(&tool, Box::new(BurnInRenderer));

    let result = compositor.create_video(&fx.job(10.0));

    assert!(matches!(result, Err(MediaError::Probe { ref path, .. }) if path == &fx.audio));
    assert!(tool.ffmpeg_calls().is_empty());
    assert_workspace_clean(&fx.temp_root);
    Ok(())
}

/// Test that a missing input file is a probe error without running ffprobe
#[test]
fn test_probe_withMissingFile_shouldReturnProbeError() -> Result<()> {
    let fx = Fixture::new()?;
    let tool = Arc::new(MockMediaTool::new());
    let compositor = fx.compositor(&tool, Box::new(BurnInRenderer));

    let result = compositor.probe(fx.temp_root.join("missing.mp4"));
    assert!(matches!(result, Err(MediaError::Probe { .. })));
    assert!(tool.invocations().is_empty());
    Ok(())
}

/// Test the degraded renderer keeps narration and skips the burn
#[test]
fn test_create_video_withSkipRenderer_shouldOnlyMerge() -> Result<()> {
    let fx = Fixture::new()?;
    let tool = Arc::new(fx.tool(10.0, 8.0));
    let compositor = fx.compositor(&tool, Box::new(SkipRenderer));

    let report = compositor.create_video(&fx.job(8.0))?;

    assert!(!report.subtitles_burned);
    assert_eq!(tool.ffmpeg_calls().len(), 1);
    assert!(fx.output.exists());
    assert_workspace_clean(&fx.temp_root);
    Ok(())
}

/// Test that an existing SRT file is staged into the workspace
#[test]
fn test_create_video_withSrtFile_shouldBurnIt() -> Result<()> {
    let fx = Fixture::new()?;
    let srt = common::create_test_file(
        fx.background.parent().unwrap(),
        "my subs (final).srt",
        "1\n00:00:00,000 --> 00:00:05,000\nHi\n\n",
    )?;
    let tool = Arc::new(fx.tool(5.0, 5.0));
    let compositor = fx.compositor(&tool, Box::new(BurnInRenderer));

    let mut job = fx.job(5.0);
    job.captions = CaptionSource::File(srt.clone());
    compositor.create_video(&job)?;

    let burn = tool.ffmpeg_call_with("subtitles=").expect("burn call");
    assert!(burn.args.iter().any(|a| a.starts_with("subtitles=captions.srt")));
    assert!(srt.exists());
    Ok(())
}

/// Test frame extraction arguments and persistence
#[test]
fn test_extract_frame_withTime_shouldSeekAndPersist() -> Result<()> {
    let fx = Fixture::new()?;
    let tool = Arc::new(MockMediaTool::new());
    let compositor = fx.compositor(&tool, Box::new(BurnInRenderer));
    let output = fx.temp_root.parent().unwrap().join("thumb.jpg");

    let path = compositor.extract_frame(&fx.background, &output, 1.5)?;

    assert_eq!(path, output);
    assert!(output.exists());
    let args = &tool.ffmpeg_calls()[0];
    let ss_at = position(args, "-ss").expect("-ss");
    assert_eq!(args[ss_at + 1], "1.500");
    assert!(args.windows(2).any(|w| w[0] == "-vframes" && w[1] == "1"));
    assert_workspace_clean(&fx.temp_root);

    compositor.extract_frame(&fx.background, &output, -4.0)?;
    let args = &tool.ffmpeg_calls()[1];
    assert_eq!(args[position(args, "-ss").unwrap() + 1], "0.000");
    Ok(())
}

/// Test preview scaling never upscales
#[test]
fn test_create_preview_withBounds_shouldScaleDownOnly() -> Result<()> {
    let fx = Fixture::new()?;
    let tool = Arc::new(MockMediaTool::new());
    let compositor = fx.compositor(&tool, Box::new(BurnInRenderer));
    let output = fx.temp_root.parent().unwrap().join("preview.mp4");

    compositor.create_preview(&fx.background, &output, 640, 360)?;

    assert!(output.exists());
    let args = &tool.ffmpeg_calls()[0];
    let vf_at = position(args, "-vf").expect("-vf");
    assert_eq!(args[vf_at + 1], preview_scale_filter(640, 360));
    assert!(args[vf_at + 1].contains("min(640,iw):min(360,ih)"));
    assert!(args.windows(2).any(|w| w[0] == "-movflags" && w[1] == "+faststart"));
    assert_workspace_clean(&fx.temp_root);
    Ok(())
}

/// Test a preview failure leaves no output
#[test]
fn test_create_preview_withEncoderFailure_shouldLeaveNoOutput() -> Result<()> {
    let fx = Fixture::new()?;
    let tool = Arc::new(MockMediaTool::new().failing_when("scale=", "Error while opening encoder"));
    let compositor = fx.compositor(&tool, Box::new(BurnInRenderer));
    let output = fx.temp_root.parent().unwrap().join("preview.mp4");

    let result = compositor.create_preview(&fx.background, &output, 640, 360);

    assert!(matches!(result, Err(MediaError::Encoding { .. })));
    assert!(!output.exists());
    assert_workspace_clean(&fx.temp_root);
    Ok(())
}

/// Test tool availability checks
#[test]
fn test_check_tools_withMissingBinaries_shouldReturnToolNotFound() {
    let tool = Arc::new(MockMediaTool::new().unavailable());
    let compositor = VideoCompositor::new(tool.clone(), Box::new(BurnInRenderer));
    assert!(matches!(compositor.check_tools(), Err(MediaError::ToolNotFound { .. })));

    let tool = Arc::new(MockMediaTool::new());
    let compositor = VideoCompositor::new(tool.clone(), Box::new(BurnInRenderer));
    assert!(compositor.check_tools().is_ok());
    assert_eq!(tool.invocations().len(), 2);
}

/// Test that a binary which starts but fails `-version` is reported by its configured path
#[test]
fn test_check_tools_withBrokenBinary_shouldReportConfiguredPath() {
    let tool = Arc::new(MockMediaTool::new().with_broken_version());
    let compositor = VideoCompositor::new(tool.clone(), Box::new(BurnInRenderer));

    match compositor.check_tools() {
        Err(MediaError::ToolNotFound { tool: name, path }) => {
            assert_eq!(name, "ffmpeg");
            assert_eq!(path, PathBuf::from("/opt/mock/bin/ffmpeg"));
        }
        other => panic!("expected ToolNotFound, got {:?}", other),
    }
    assert_eq!(tool.invocations().len(), 1);
}

/// Test that an ffprobe which cannot start fails the job as a probe error
#[test]
fn test_create_video_withUnavailableProbe_shouldReturnProbeError() -> Result<()> {
    let fx = Fixture::new()?;
    let tool = Arc::new(MockMediaTool::new().unavailable());
    let compositor = fx.compositor(&tool, Box::new(BurnInRenderer));
    let job = fx.job(8.0);

    let result = compositor.create_video(&job);

    assert!(matches!(result, Err(MediaError::Probe { .. })));
    assert!(!job.output.exists());
    assert_workspace_clean(&fx.temp_root);
    Ok(())
}

/// Test the reconciliation decision table
#[test]
fn test_reconciliation_plan_withAllCombinations_shouldDecide() {
    assert_eq!(Reconciliation::plan(5.0, 12.0, true, true), Reconciliation::Loop { target: 12.0 });
    assert_eq!(Reconciliation::plan(5.0, 12.0, false, true), Reconciliation::Keep);
    assert_eq!(Reconciliation::plan(20.0, 12.0, true, true), Reconciliation::Trim { target: 12.0 });
    assert_eq!(Reconciliation::plan(20.0, 12.0, true, false), Reconciliation::Keep);
    assert_eq!(Reconciliation::plan(12.0, 12.0, true, true), Reconciliation::Keep);
    assert_eq!(Reconciliation::Keep.resulting_duration(20.0), 20.0);
}
