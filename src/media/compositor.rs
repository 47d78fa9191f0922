use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info, warn};
use serde::Serialize;

use super::probe::{probe_media, MediaAsset};
use super::renderer::{
    BurnInRenderer, EncodeSettings, RenderContext, SkipRenderer, SubtitleRenderer, WORKSPACE_SUBTITLE_NAME,
};
use super::tool::{run_ffmpeg, MediaTool, SystemMediaTool, Tool, ToolInvocation};
use super::workspace::JobWorkspace;
use crate::app_config::VideoConfig;
use crate::captions::CaptionTimeline;
use crate::errors::{CaptionError, MediaError};
use crate::file_utils::FileManager;
use crate::style::{resolve_style, StyleOverrides};

// @module: Background + narration + captions composition

/// Where the captions for a job come from
#[derive(Debug, Clone)]
pub enum CaptionSource {
    /// A freshly built timeline, written into the job workspace
    Timeline(CaptionTimeline),
    /// An existing SRT file
    File(PathBuf),
}

/// Inputs for one composition run
#[derive(Debug, Clone)]
pub struct CompositionJob {
    pub background: PathBuf,
    pub audio: PathBuf,
    pub captions: CaptionSource,
    pub style: StyleOverrides,
    pub output: PathBuf,
    pub loop_background: bool,
    pub trim_background: bool,
}

/// How the background length is adjusted to the narration
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Reconciliation {
    /// Repeat the background until `target` seconds
    Loop { target: f64 },
    /// Cut the background at `target` seconds
    Trim { target: f64 },
    /// Leave the background length alone
    Keep,
}

impl Reconciliation {
    /// Decide the adjustment. A mismatch whose policy flag is off is accepted.
    pub fn plan(background_duration: f64, audio_duration: f64, loop_background: bool, trim_background: bool) -> Self {
        if audio_duration > background_duration && loop_background {
            Self::Loop { target: audio_duration }
        } else if audio_duration < background_duration && trim_background {
            Self::Trim { target: audio_duration }
        } else {
            Self::Keep
        }
    }

    /// Background length after the adjustment
    pub fn resulting_duration(&self, background_duration: f64) -> f64 {
        match self {
            Self::Loop { target } | Self::Trim { target } => *target,
            Self::Keep => background_duration,
        }
    }

    // Goes before the background `-i`
    fn input_args(&self) -> Vec<String> {
        match self {
            Self::Loop { .. } => vec!["-stream_loop".to_string(), "-1".to_string()],
            _ => Vec::new(),
        }
    }

    // Goes before the output file
    fn output_args(&self) -> Vec<String> {
        match self {
            Self::Loop { target } | Self::Trim { target } => vec!["-t".to_string(), format!("{:.3}", target)],
            Self::Keep => Vec::new(),
        }
    }
}

/// Outcome of a successful composition
#[derive(Debug, Clone, Serialize)]
pub struct CompositionReport {
    pub job_id: String,
    pub output: PathBuf,
    pub background: MediaAsset,
    pub audio: MediaAsset,
    pub reconciliation: Reconciliation,
    pub subtitles_burned: bool,
}

/// Drives ffmpeg through probe, reconcile, merge, burn and persist.
///
/// Every run gets its own [`JobWorkspace`]; nothing is written to the
/// caller's output path until the last stage has succeeded.
pub struct VideoCompositor {
    tool: Arc<dyn MediaTool>,
    renderer: Box<dyn SubtitleRenderer>,
    encode: EncodeSettings,
    temp_root: Option<PathBuf>,
}

impl VideoCompositor {
    pub fn new(tool: Arc<dyn MediaTool>, renderer: Box<dyn SubtitleRenderer>) -> Self {
        Self {
            tool,
            renderer,
            encode: EncodeSettings::default(),
            temp_root: None,
        }
    }

    /// System ffmpeg with the renderer selected by `burn_subtitles`
    pub fn from_config(config: &VideoConfig) -> Self {
        let renderer: Box<dyn SubtitleRenderer> = if config.burn_subtitles {
            Box::new(BurnInRenderer)
        } else {
            Box::new(SkipRenderer)
        };

        Self::new(Arc::new(SystemMediaTool::from_config(config)), renderer)
            .with_encode_settings(EncodeSettings {
                video_codec: config.video_codec.clone(),
                audio_codec: config.audio_codec.clone(),
            })
            .with_temp_root(config.temp_dir.clone())
    }

    pub fn with_encode_settings(mut self, encode: EncodeSettings) -> Self {
        self.encode = encode;
        self
    }

    /// Parent directory for job workspaces; `None` uses the system temp dir
    pub fn with_temp_root(mut self, temp_root: Option<PathBuf>) -> Self {
        self.temp_root = temp_root;
        self
    }

    pub fn renderer_name(&self) -> &'static str {
        self.renderer.name()
    }

    /// Verify both binaries start. Run once before accepting work.
    pub fn check_tools(&self) -> Result<(), MediaError> {
        for tool in [Tool::Ffmpeg, Tool::Ffprobe] {
            let output = self.tool.run(&ToolInvocation::new(tool, vec!["-version".to_string()]))?;
            if !output.success {
                warn!("{} -version exited with code {:?}", tool, output.exit_code);
                return Err(MediaError::ToolNotFound {
                    tool: tool.to_string(),
                    path: self.tool.program(tool),
                });
            }
            let banner = output.stdout.lines().next().unwrap_or_default().to_string();
            info!("{} found: {}", tool, banner);
        }
        Ok(())
    }

    /// Measure duration, geometry and frame rate of a media file
    pub fn probe<P: AsRef<Path>>(&self, path: P) -> Result<MediaAsset, MediaError> {
        probe_media(self.tool.as_ref(), path.as_ref())
    }

    /// Run one composition job end to end
    pub fn create_video(&self, job: &CompositionJob) -> Result<CompositionReport, MediaError> {
        let workspace = JobWorkspace::create(self.temp_root.as_deref())?;
        let job_id = workspace.id().to_string();

        let result = self.compose_in(&workspace, job);

        // Drop would also remove it; closing explicitly surfaces the error
        if let Err(e) = workspace.close() {
            warn!("Job {}: workspace cleanup failed: {}", job_id, e);
        }

        result
    }

    fn compose_in(&self, workspace: &JobWorkspace, job: &CompositionJob) -> Result<CompositionReport, MediaError> {
        // Probe
        info!("Loading background video: {}", job.background.display());
        let background = self.probe(&job.background)?;
        info!("Loading audio: {}", job.audio.display());
        let audio = self.probe(&job.audio)?;

        // Reconcile
        let reconciliation = Reconciliation::plan(
            background.duration_seconds,
            audio.duration_seconds,
            job.loop_background,
            job.trim_background,
        );
        match reconciliation {
            Reconciliation::Loop { target } => {
                info!("Looping background video to match audio length ({:.2}s)", target)
            }
            Reconciliation::Trim { target } => {
                info!("Trimming background video to match audio length ({:.2}s)", target)
            }
            Reconciliation::Keep if (background.duration_seconds - audio.duration_seconds).abs() > 0.001 => warn!(
                "Keeping background length {:.2}s against {:.2}s of audio",
                background.duration_seconds, audio.duration_seconds
            ),
            Reconciliation::Keep => {}
        }

        let extension = output_extension(&job.output);

        // Merge audio
        let merged = workspace.file(format!("merged.{}", extension));
        info!("Adding audio to video");
        run_ffmpeg(
            self.tool.as_ref(),
            "audio merge",
            ToolInvocation::new(Tool::Ffmpeg, self.merge_args(job, &reconciliation, &merged)),
        )?;

        // Burn subtitles
        let subtitles = if self.renderer.burns_subtitles() {
            self.materialize_subtitles(workspace, &job.captions)?
        } else {
            PathBuf::new()
        };
        let style = resolve_style(Some(&job.style));
        let finished = self.renderer.render(&RenderContext {
            tool: self.tool.as_ref(),
            workspace,
            merged_video: &merged,
            subtitles: &subtitles,
            style: &style,
            encode: &self.encode,
            extension: &extension,
        })?;

        // Persist only after every stage succeeded
        FileManager::move_file(&finished, &job.output)?;
        info!("Video saved to: {}", job.output.display());

        Ok(CompositionReport {
            job_id: workspace.id().to_string(),
            output: job.output.clone(),
            background,
            audio,
            reconciliation,
            subtitles_burned: self.renderer.burns_subtitles(),
        })
    }

    fn merge_args(&self, job: &CompositionJob, reconciliation: &Reconciliation, merged: &Path) -> Vec<String> {
        let mut args = vec!["-y".to_string(), "-hide_banner".to_string()];
        args.extend(reconciliation.input_args());
        args.extend([
            "-i".to_string(),
            job.background.to_string_lossy().to_string(),
            "-i".to_string(),
            job.audio.to_string_lossy().to_string(),
            // Narration replaces whatever audio the background had
            "-map".to_string(),
            "0:v:0".to_string(),
            "-map".to_string(),
            "1:a:0".to_string(),
        ]);
        args.extend(reconciliation.output_args());
        args.extend([
            "-c:v".to_string(),
            self.encode.video_codec.clone(),
            "-c:a".to_string(),
            self.encode.audio_codec.clone(),
            merged.to_string_lossy().to_string(),
        ]);
        args
    }

    fn materialize_subtitles(&self, workspace: &JobWorkspace, captions: &CaptionSource) -> Result<PathBuf, MediaError> {
        let target = workspace.file(WORKSPACE_SUBTITLE_NAME);
        match captions {
            CaptionSource::Timeline(timeline) => {
                timeline.write_to_srt(&target).map_err(|e| match e {
                    CaptionError::Io(io) => MediaError::Io(io),
                    other => MediaError::Io(std::io::Error::other(other.to_string())),
                })?;
            }
            CaptionSource::File(path) => {
                std::fs::copy(path, &target)?;
            }
        }
        debug!("Subtitles staged at {}", target.display());
        Ok(target)
    }

    /// Extract one still frame at `time` seconds
    pub fn extract_frame<P1: AsRef<Path>, P2: AsRef<Path>>(&self, video: P1, output: P2, time: f64) -> Result<PathBuf, MediaError> {
        let video = video.as_ref();
        let output = output.as_ref();
        let time = if time.is_finite() && time > 0.0 { time } else { 0.0 };
        info!("Extracting frame at {:.3}s from {}", time, video.display());

        let workspace = JobWorkspace::create(self.temp_root.as_deref())?;
        let staged = workspace.file(format!("frame.{}", output_extension_or(output, "jpg")));
        let args = vec![
            "-y".to_string(),
            "-hide_banner".to_string(),
            "-ss".to_string(),
            format!("{:.3}", time),
            "-i".to_string(),
            video.to_string_lossy().to_string(),
            "-vframes".to_string(),
            "1".to_string(),
            "-q:v".to_string(),
            "2".to_string(),
            staged.to_string_lossy().to_string(),
        ];
        run_ffmpeg(self.tool.as_ref(), "frame extraction", ToolInvocation::new(Tool::Ffmpeg, args))?;

        FileManager::move_file(&staged, output)?;
        info!("Frame extracted to: {}", output.display());
        Ok(output.to_path_buf())
    }

    /// Downscaled, fast-start preview bounded by `max_width` x `max_height`
    pub fn create_preview<P1: AsRef<Path>, P2: AsRef<Path>>(
        &self,
        video: P1,
        output: P2,
        max_width: u32,
        max_height: u32,
    ) -> Result<PathBuf, MediaError> {
        let video = video.as_ref();
        let output = output.as_ref();
        info!("Creating preview for video: {}", video.display());

        let workspace = JobWorkspace::create(self.temp_root.as_deref())?;
        let staged = workspace.file(format!("preview.{}", output_extension(output)));
        let args = vec![
            "-y".to_string(),
            "-hide_banner".to_string(),
            "-i".to_string(),
            video.to_string_lossy().to_string(),
            "-vf".to_string(),
            preview_scale_filter(max_width, max_height),
            "-c:v".to_string(),
            self.encode.video_codec.clone(),
            "-preset".to_string(),
            "fast".to_string(),
            "-crf".to_string(),
            "28".to_string(),
            "-c:a".to_string(),
            self.encode.audio_codec.clone(),
            "-b:a".to_string(),
            "128k".to_string(),
            "-movflags".to_string(),
            "+faststart".to_string(),
            staged.to_string_lossy().to_string(),
        ];
        run_ffmpeg(self.tool.as_ref(), "preview", ToolInvocation::new(Tool::Ffmpeg, args))?;

        FileManager::move_file(&staged, output)?;
        info!("Preview created: {}", output.display());
        Ok(output.to_path_buf())
    }
}

/// Scale filter that never upscales and keeps the aspect ratio
pub fn preview_scale_filter(max_width: u32, max_height: u32) -> String {
    format!(
        "scale=min({},iw):min({},ih):force_original_aspect_ratio=decrease:force_divisible_by=2",
        max_width, max_height
    )
}

fn output_extension(path: &Path) -> String {
    output_extension_or(path, "mp4")
}

fn output_extension_or(path: &Path, fallback: &str) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .filter(|ext| !ext.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}
