use std::path::{Path, PathBuf};

use log::{debug, error};
use serde::Serialize;
use serde_json::Value;

use super::tool::{MediaTool, Tool, ToolInvocation};
use crate::errors::MediaError;

// @module: Media inspection through ffprobe

/// A probed audio or video file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaAsset {
    pub path: PathBuf,
    pub duration_seconds: f64,
    /// Video only
    pub width: Option<u32>,
    /// Video only
    pub height: Option<u32>,
    /// Video only, frames per second
    pub frame_rate: Option<f64>,
    pub size_bytes: Option<u64>,
}

impl MediaAsset {
    pub fn has_video(&self) -> bool {
        self.width.is_some() && self.height.is_some()
    }
}

/// ffprobe arguments: format duration/size plus per-stream geometry as JSON
pub fn probe_args(path: &Path) -> Vec<String> {
    vec![
        "-v".to_string(),
        "error".to_string(),
        "-show_entries".to_string(),
        "format=duration,size:stream=codec_type,width,height,r_frame_rate,duration".to_string(),
        "-of".to_string(),
        "json".to_string(),
        path.to_string_lossy().to_string(),
    ]
}

/// Probe `path` with the given tool.
///
/// Every failure, including an ffprobe that cannot be started, is a
/// [`MediaError::Probe`].
pub fn probe_media(tool: &dyn MediaTool, path: &Path) -> Result<MediaAsset, MediaError> {
    if !path.exists() {
        return Err(MediaError::Probe {
            path: path.to_path_buf(),
            message: "file does not exist".to_string(),
        });
    }

    let output = tool
        .run(&ToolInvocation::new(Tool::Ffprobe, probe_args(path)))
        .map_err(|e| {
            error!("Could not run ffprobe for {:?}: {}", path, e);
            MediaError::Probe {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;
    if !output.success {
        error!("ffprobe failed for {:?}: {}", path, output.stderr.trim());
        return Err(MediaError::Probe {
            path: path.to_path_buf(),
            message: format!("ffprobe exited with code {:?}: {}", output.exit_code, output.stderr.trim()),
        });
    }

    let asset = parse_probe_output(path, &output.stdout)?;
    debug!(
        "Probed {:?}: {:.3}s, {}x{} @ {:?} fps",
        path,
        asset.duration_seconds,
        asset.width.unwrap_or(0),
        asset.height.unwrap_or(0),
        asset.frame_rate
    );
    Ok(asset)
}

/// Parse ffprobe's JSON into a [`MediaAsset`].
///
/// Duration comes from the container, falling back to the longest stream.
/// Geometry and frame rate come from the first video stream.
pub fn parse_probe_output(path: &Path, stdout: &str) -> Result<MediaAsset, MediaError> {
    let probe_error = |message: String| MediaError::Probe {
        path: path.to_path_buf(),
        message,
    };

    if stdout.trim().is_empty() {
        return Err(probe_error("ffprobe returned empty output".to_string()));
    }

    let json: Value = serde_json::from_str(stdout)
        .map_err(|e| probe_error(format!("Failed to parse ffprobe JSON output: {}", e)))?;

    let format = json.get("format");
    let streams = json
        .get("streams")
        .and_then(|s| s.as_array())
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    let container_duration = format.and_then(|f| f.get("duration")).and_then(number_or_string);
    let stream_duration = streams
        .iter()
        .filter_map(|s| s.get("duration").and_then(number_or_string))
        .fold(None, |longest: Option<f64>, d| Some(longest.map_or(d, |l| l.max(d))));

    let duration_seconds = container_duration
        .or(stream_duration)
        .filter(|d| d.is_finite() && *d > 0.0)
        .ok_or_else(|| probe_error("no usable duration in ffprobe output".to_string()))?;

    let size_bytes = format
        .and_then(|f| f.get("size"))
        .and_then(number_or_string)
        .map(|size| size as u64);

    let video_stream = streams.iter().find(|s| {
        match s.get("codec_type").and_then(|t| t.as_str()) {
            Some(kind) => kind == "video",
            // Older ffprobe builds omit codec_type when not asked; width implies video
            None => s.get("width").is_some(),
        }
    });

    let width = video_stream
        .and_then(|s| s.get("width"))
        .and_then(|v| v.as_u64())
        .map(|v| v as u32);
    let height = video_stream
        .and_then(|s| s.get("height"))
        .and_then(|v| v.as_u64())
        .map(|v| v as u32);
    let frame_rate = video_stream
        .and_then(|s| s.get("r_frame_rate"))
        .and_then(|v| v.as_str())
        .and_then(parse_frame_rate);

    Ok(MediaAsset {
        path: path.to_path_buf(),
        duration_seconds,
        width,
        height,
        frame_rate,
        size_bytes,
    })
}

/// Parse an ffprobe rate such as `30000/1001` or `25`
pub fn parse_frame_rate(rate: &str) -> Option<f64> {
    let rate = rate.trim();
    let value = match rate.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => rate.parse().ok()?,
    };

    (value.is_finite() && value > 0.0).then_some(value)
}

// ffprobe prints most numbers as JSON strings
fn number_or_string(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
