/*!
 * Video composition on top of ffmpeg and ffprobe.
 *
 * - `tool`: process invocation behind the [`MediaTool`] trait
 * - `probe`: duration and geometry inspection
 * - `workspace`: per-job temporary directories
 * - `renderer`: subtitle burn-in strategies
 * - `compositor`: the end-to-end pipeline plus frame and preview helpers
 */

pub mod compositor;
pub mod probe;
pub mod renderer;
pub mod tool;
pub mod workspace;

pub use compositor::{preview_scale_filter, CaptionSource, CompositionJob, CompositionReport, Reconciliation, VideoCompositor};
pub use probe::{parse_frame_rate, parse_probe_output, probe_media, MediaAsset};
pub use renderer::{BurnInRenderer, EncodeSettings, RenderContext, SkipRenderer, SubtitleRenderer, WORKSPACE_SUBTITLE_NAME};
pub use tool::{filter_ffmpeg_stderr, run_ffmpeg, MediaTool, SystemMediaTool, Tool, ToolInvocation, ToolOutput};
pub use workspace::JobWorkspace;
