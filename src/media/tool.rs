use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{debug, error};

use crate::app_config::VideoConfig;
use crate::errors::MediaError;

// @module: Invoking the external media tools

/// External binaries the compositor drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Ffmpeg,
    Ffprobe,
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tool::Ffmpeg => write!(f, "ffmpeg"),
            Tool::Ffprobe => write!(f, "ffprobe"),
        }
    }
}

/// One command line to run
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub tool: Tool,
    pub args: Vec<String>,
    /// Working directory for the child process only
    pub working_dir: Option<PathBuf>,
}

impl ToolInvocation {
    pub fn new(tool: Tool, args: Vec<String>) -> Self {
        Self {
            tool,
            args,
            working_dir: None,
        }
    }

    pub fn in_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Last argument, which is the output file for every ffmpeg call we make
    pub fn output_arg(&self) -> Option<&str> {
        self.args.last().map(String::as_str)
    }
}

/// Captured result of a finished process
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Runs media tool command lines and blocks until they exit.
///
/// `Err` means the process could not be started; a process that ran and
/// failed is reported through [`ToolOutput::success`].
pub trait MediaTool: Send + Sync {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, MediaError>;

    /// Binary used for `tool`, for diagnostics
    fn program(&self, tool: Tool) -> PathBuf {
        PathBuf::from(tool.to_string())
    }
}

/// Spawns the real ffmpeg / ffprobe binaries
#[derive(Debug, Clone)]
pub struct SystemMediaTool {
    ffmpeg_path: PathBuf,
    ffprobe_path: PathBuf,
}

impl SystemMediaTool {
    pub fn new<P1: Into<PathBuf>, P2: Into<PathBuf>>(ffmpeg_path: P1, ffprobe_path: P2) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            ffprobe_path: ffprobe_path.into(),
        }
    }

    pub fn from_config(config: &VideoConfig) -> Self {
        Self::new(config.ffmpeg_path.clone(), config.resolved_ffprobe_path())
    }

    pub fn path_for(&self, tool: Tool) -> &Path {
        match tool {
            Tool::Ffmpeg => &self.ffmpeg_path,
            Tool::Ffprobe => &self.ffprobe_path,
        }
    }
}

impl Default for SystemMediaTool {
    fn default() -> Self {
        Self::new("ffmpeg", "ffprobe")
    }
}

impl MediaTool for SystemMediaTool {
    fn program(&self, tool: Tool) -> PathBuf {
        self.path_for(tool).to_path_buf()
    }

    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, MediaError> {
        let program = self.path_for(invocation.tool);
        let mut command = Command::new(program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(dir) = &invocation.working_dir {
            command.current_dir(dir);
        }

        let output = command.output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MediaError::ToolNotFound {
                    tool: invocation.tool.to_string(),
                    path: program.to_path_buf(),
                }
            } else {
                MediaError::Io(e)
            }
        })?;

        Ok(ToolOutput {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Run an ffmpeg invocation and turn a non-zero exit into [`MediaError::Encoding`]
pub fn run_ffmpeg(tool: &dyn MediaTool, operation: &str, invocation: ToolInvocation) -> Result<ToolOutput, MediaError> {
    debug!("ffmpeg ({}): {}", operation, invocation.args.join(" "));
    let output = tool.run(&invocation)?;

    if !output.success {
        let filtered = filter_ffmpeg_stderr(&output.stderr);
        error!("ffmpeg {} failed (exit code {:?}): {}", operation, output.exit_code, filtered);
        return Err(MediaError::Encoding {
            operation: operation.to_string(),
            message: filtered,
        });
    }

    Ok(output)
}

/// Filter ffmpeg stderr to only show meaningful error lines, stripping the
/// version banner, build configuration, and stream metadata noise.
pub fn filter_ffmpeg_stderr(stderr: &str) -> String {
    let noise_prefixes = [
        "ffmpeg version",
        "built with",
        "configuration:",
        "lib",
        "Input #",
        "Metadata:",
        "Duration:",
        "Stream #",
        "Output #",
        "Stream mapping:",
        "Press [q]",
        "encoder",
        "handler_name",
        "major_brand",
        "minor_version",
        "compatible_brands",
        "frame=",
        "size=",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return false;
            }
            !noise_prefixes.iter().any(|p| trimmed.starts_with(p))
        })
        .collect();

    if meaningful.is_empty() {
        "unknown ffmpeg error (stderr was empty after filtering)".to_string()
    } else {
        meaningful.join("\n")
    }
}
