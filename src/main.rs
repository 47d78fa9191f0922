// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use text2video::app_config::{self, Config};
use text2video::app_controller::{Controller, RenderRequest};
use text2video::captions::CaptionMode;
use text2video::file_utils::FileManager;
use text2video::style::{parse_color, Position, StyleOverrides};

/// CLI Wrapper for CaptionMode to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliCaptionMode {
    Sentence,
    Paragraph,
    Word,
    Simple,
}

impl From<CliCaptionMode> for CaptionMode {
    fn from(cli_mode: CliCaptionMode) -> Self {
        match cli_mode {
            CliCaptionMode::Sentence => CaptionMode::Sentence,
            CliCaptionMode::Paragraph => CaptionMode::Paragraph,
            CliCaptionMode::Word => CaptionMode::Word,
            CliCaptionMode::Simple => CaptionMode::Simple,
        }
    }
}

/// CLI Wrapper for Position to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliPosition {
    Top,
    Middle,
    Bottom,
}

impl From<CliPosition> for Position {
    fn from(cli_position: CliPosition) -> Self {
        match cli_position {
            CliPosition::Top => Position::Top,
            CliPosition::Middle => Position::Middle,
            CliPosition::Bottom => Position::Bottom,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render narration, background video and captions into one video
    Render(RenderArgs),

    /// Only generate the SRT file
    Captions(CaptionsArgs),

    /// Extract a single frame from a video
    Frame {
        /// Source video
        video: PathBuf,
        /// Output image (jpg or png)
        output: PathBuf,
        /// Timestamp in seconds
        #[arg(short, long, default_value_t = 0.0)]
        time: f64,
    },

    /// Create a small fast-start preview of a video
    Preview {
        /// Source video
        video: PathBuf,
        /// Output video
        output: PathBuf,
        /// Maximum width in pixels (config value when omitted)
        #[arg(long)]
        max_width: Option<u32>,
        /// Maximum height in pixels (config value when omitted)
        #[arg(long)]
        max_height: Option<u32>,
    },

    /// Print duration and geometry of a media file as JSON
    Probe {
        /// Media file to inspect
        path: PathBuf,
    },

    /// Verify that ffmpeg and ffprobe can be started
    Check,

    /// Generate shell completions for text2video
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Where the narration text comes from
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct TextSource {
    /// Text file with the narration
    #[arg(long = "text", value_name = "FILE")]
    text_file: Option<PathBuf>,

    /// Narration text given inline
    #[arg(long = "text-input", value_name = "TEXT")]
    text_input: Option<String>,
}

impl TextSource {
    fn read(&self) -> Result<String> {
        FileManager::read_text_input(self.text_file.as_deref(), self.text_input.as_deref())
    }
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    text: TextSource,

    /// Narration audio file
    #[arg(long)]
    audio: PathBuf,

    /// Background video file
    #[arg(long = "bg-video")]
    bg_video: PathBuf,

    /// Output video file
    #[arg(short, long)]
    output: PathBuf,

    /// Caption segmentation mode
    #[arg(short, long, value_enum)]
    mode: Option<CliCaptionMode>,

    /// Subtitle font
    #[arg(long)]
    font_name: Option<String>,

    /// Subtitle font size
    #[arg(long)]
    font_size: Option<u32>,

    /// Text colour: name, #RRGGBB or #AARRGGBB
    #[arg(long)]
    font_color: Option<String>,

    /// Outline colour
    #[arg(long)]
    outline_color: Option<String>,

    /// Box colour behind the text
    #[arg(long)]
    bg_color: Option<String>,

    /// Vertical caption position
    #[arg(long, value_enum)]
    position: Option<CliPosition>,

    /// Do not loop a background shorter than the narration
    #[arg(long)]
    no_loop: bool,

    /// Do not trim a background longer than the narration
    #[arg(long)]
    no_trim: bool,

    /// Skip burning captions into the picture
    #[arg(long)]
    no_burn: bool,

    /// Also save the SRT file at this path
    #[arg(long)]
    srt_out: Option<PathBuf>,

    /// ffmpeg executable
    #[arg(long, env = "TEXT2VIDEO_FFMPEG")]
    ffmpeg_path: Option<PathBuf>,

    /// Parent directory for temporary job files
    #[arg(long)]
    temp_dir: Option<PathBuf>,

    /// Force overwrite of an existing output file
    #[arg(short, long)]
    force: bool,
}

impl RenderArgs {
    fn style_overrides(&self) -> StyleOverrides {
        StyleOverrides {
            font_name: self.font_name.clone(),
            font_size: self.font_size,
            primary_colour: self.font_color.as_deref().map(parse_color),
            outline_colour: self.outline_color.as_deref().map(parse_color),
            back_colour: self.bg_color.as_deref().map(parse_color),
            alignment: self.position.map(|p| Position::from(p).alignment()),
            ..StyleOverrides::default()
        }
    }
}

#[derive(Args, Debug)]
struct CaptionsArgs {
    #[command(flatten)]
    text: TextSource,

    /// Total caption duration in seconds
    #[arg(short, long, conflicts_with = "audio", required_unless_present = "audio")]
    duration: Option<f64>,

    /// Take the duration from this audio file
    #[arg(long)]
    audio: Option<PathBuf>,

    /// Caption segmentation mode
    #[arg(short, long, value_enum)]
    mode: Option<CliCaptionMode>,

    /// Output SRT file
    #[arg(short, long)]
    output: PathBuf,
}

/// text2video - narration text and audio to a captioned video
#[derive(Parser, Debug)]
#[command(name = "text2video")]
#[command(version)]
#[command(about = "Turn narration text and audio into a captioned video")]
#[command(long_about = "text2video splits narration text into captions, times them against the narration audio \
and burns them into a background video with ffmpeg.

EXAMPLES:
    text2video render --text story.txt --audio voice.mp3 --bg-video bg.mp4 -o out.mp4
    text2video render --text-input \"Hello world.\" --audio a.wav --bg-video bg.mp4 -o out.mp4 --mode word
    text2video captions --text story.txt --duration 42.5 -o story.srt
    text2video frame out.mp4 thumb.jpg --time 3.5
    text2video preview out.mp4 small.mp4
    text2video completions bash > text2video.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config: PathBuf,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour and tag for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (colour, tag) = Self::style_for_level(record.level());
            let _ = writeln!(std::io::stderr(), "{}{} {} {}\x1B[0m", colour, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() {
    // Accept everything here; the effective level is set through set_max_level
    if let Err(e) = CustomLogger::init(LevelFilter::Trace) {
        eprintln!("Failed to initialize logger: {}", e);
    }
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: CommandLineOptions) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(level) = &cli.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "text2video", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = load_or_create_config(&cli.config)?;
    match &cli.log_level {
        Some(level) => config.log_level = level.clone().into(),
        None => log::set_max_level(config.log_level.to_level_filter()),
    }

    match cli.command {
        Commands::Render(args) => run_render(config, args),
        Commands::Captions(args) => run_captions(config, args),
        Commands::Frame { video, output, time } => {
            let controller = Controller::with_config(config)?;
            controller.extract_frame(&video, &output, time)?;
            Ok(())
        }
        Commands::Preview {
            video,
            output,
            max_width,
            max_height,
        } => {
            let controller = Controller::with_config(config)?;
            controller.create_preview(&video, &output, max_width, max_height)?;
            Ok(())
        }
        Commands::Probe { path } => {
            let controller = Controller::with_config(config)?;
            let asset = controller.probe(&path)?;
            let json = serde_json::to_string_pretty(&asset).context("Failed to serialize probe result")?;
            println!("{}", json);
            Ok(())
        }
        Commands::Check => {
            let controller = Controller::with_config(config)?;
            controller.check_tools()?;
            info!("ffmpeg and ffprobe are available");
            Ok(())
        }
        Commands::Completions { .. } => Ok(()),
    }
}

// Load the config, or write the defaults when the file is missing
fn load_or_create_config(path: &Path) -> Result<Config> {
    if path.exists() {
        return Config::load(path);
    }

    warn!("Config file not found at '{}', creating default config.", path.display());
    let config = Config::default();
    config
        .save(path)
        .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;
    Ok(config)
}

fn run_render(mut config: Config, args: RenderArgs) -> Result<()> {
    // Override config with CLI options if provided
    if let Some(ffmpeg_path) = &args.ffmpeg_path {
        config.video.ffmpeg_path = ffmpeg_path.clone();
    }
    if let Some(temp_dir) = &args.temp_dir {
        config.video.temp_dir = Some(temp_dir.clone());
    }
    if args.no_burn {
        config.video.burn_subtitles = false;
    }

    let text = args.text.read()?;
    let request = RenderRequest {
        text,
        audio: args.audio.clone(),
        background: args.bg_video.clone(),
        output: args.output.clone(),
        srt_out: args.srt_out.clone(),
        mode: args.mode.map(CaptionMode::from),
        style: args.style_overrides(),
        loop_background: args.no_loop.then_some(false),
        trim_background: args.no_trim.then_some(false),
        force_overwrite: args.force,
    };

    let controller = Controller::with_config(config)?;
    controller.check_tools()?;

    match controller.render(&request)? {
        Some(report) => {
            info!("Done: {} ({:.2}s)", report.output.display(), report.audio.duration_seconds);
            Ok(())
        }
        None => Ok(()),
    }
}

fn run_captions(config: Config, args: CaptionsArgs) -> Result<()> {
    let text = args.text.read()?;
    let controller = Controller::with_config(config)?;

    let duration = match (args.duration, &args.audio) {
        (Some(duration), _) => duration,
        (None, Some(audio)) => controller.audio_duration(audio)?,
        (None, None) => return Err(anyhow!("Either --duration or --audio is required")),
    };

    let timeline = controller.generate_captions(&text, duration, &args.output, args.mode.map(CaptionMode::from))?;
    info!("Wrote {} captions to {}", timeline.len(), args.output.display());
    Ok(())
}
