use std::path::{Path, PathBuf};

use log::{info, warn};

use super::tool::{run_ffmpeg, MediaTool, Tool, ToolInvocation};
use super::workspace::JobWorkspace;
use crate::errors::MediaError;
use crate::style::SubtitleStyle;

// @module: Strategies for putting captions on the merged video

/// Fixed name the subtitle file gets inside the workspace. The `subtitles`
/// filter parses its argument as filter syntax, so a plain relative name
/// avoids escaping arbitrary user paths.
pub const WORKSPACE_SUBTITLE_NAME: &str = "captions.srt";

/// Encoder choices for the final output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeSettings {
    pub video_codec: String,
    pub audio_codec: String,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
        }
    }
}

/// Everything a renderer needs for one job
pub struct RenderContext<'a> {
    pub tool: &'a dyn MediaTool,
    pub workspace: &'a JobWorkspace,
    /// Background with narration, already reconciled
    pub merged_video: &'a Path,
    pub subtitles: &'a Path,
    pub style: &'a SubtitleStyle,
    pub encode: &'a EncodeSettings,
    /// Container extension for intermediate files, e.g. "mp4"
    pub extension: &'a str,
}

/// Turns the merged video into the finished video inside the workspace
pub trait SubtitleRenderer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether the finished video has captions in its picture
    fn burns_subtitles(&self) -> bool;

    /// Returns the path of the finished file, still inside the workspace
    fn render(&self, ctx: &RenderContext<'_>) -> Result<PathBuf, MediaError>;
}

/// Burns captions into the picture with ffmpeg's `subtitles` filter
#[derive(Debug, Clone, Copy, Default)]
pub struct BurnInRenderer;

impl SubtitleRenderer for BurnInRenderer {
    fn name(&self) -> &'static str {
        "burn-in"
    }

    fn burns_subtitles(&self) -> bool {
        true
    }

    fn render(&self, ctx: &RenderContext<'_>) -> Result<PathBuf, MediaError> {
        let local_subtitles = ctx.workspace.file(WORKSPACE_SUBTITLE_NAME);
        if ctx.subtitles != local_subtitles {
            std::fs::copy(ctx.subtitles, &local_subtitles)?;
        }

        let merged_name = ctx
            .merged_video
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| MediaError::Encoding {
                operation: "subtitle burn".to_string(),
                message: format!("invalid intermediate path {:?}", ctx.merged_video),
            })?;
        let burned_name = format!("burned.{}", ctx.extension);

        let filter = format!("subtitles={}{}", WORKSPACE_SUBTITLE_NAME, ctx.style.to_force_style());
        let args = vec![
            "-y".to_string(),
            "-hide_banner".to_string(),
            "-i".to_string(),
            merged_name,
            "-vf".to_string(),
            filter,
            "-c:v".to_string(),
            ctx.encode.video_codec.clone(),
            "-c:a".to_string(),
            "copy".to_string(),
            burned_name.clone(),
        ];

        // Relative names resolve inside the workspace; our own cwd is untouched
        run_ffmpeg(ctx.tool, "subtitle burn", ToolInvocation::new(Tool::Ffmpeg, args).in_dir(ctx.workspace.path()))?;

        info!("Burned captions into video (job {})", ctx.workspace.id());
        Ok(ctx.workspace.file(burned_name))
    }
}

/// Degraded mode: keeps the merged video as is, without captions in the picture
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipRenderer;

impl SubtitleRenderer for SkipRenderer {
    fn name(&self) -> &'static str {
        "skip"
    }

    fn burns_subtitles(&self) -> bool {
        false
    }

    fn render(&self, ctx: &RenderContext<'_>) -> Result<PathBuf, MediaError> {
        warn!("Subtitle burning disabled. Saving video with narration only (no captions).");
        Ok(ctx.merged_video.to_path_buf())
    }
}
