use std::path::PathBuf;
use std::sync::LazyLock;

use clap::{Args, Parser as ClapParser, Subcommand, ValueEnum};
use log::LevelFilter;

static LONG_VERSION: LazyLock<String> = LazyLock::new(|| {
    format!(
        "{} (dvdvr {}, {}, built {})",
        env!("CARGO_PKG_VERSION"),
        env!("DVDVR_VERSION"),
        option_env!("VERGEN_GIT_DESCRIBE").unwrap_or("unknown revision"),
        env!("BUILD_TIMESTAMP"),
    )
});

#[derive(Debug, ClapParser)]
#[command(
    name         = env!("CARGO_PKG_NAME"),
    version      = env!("CARGO_PKG_VERSION"),
    long_version = LONG_VERSION.as_str(),
    about        = "Tools for inspecting DVD-VR discs and extracting their recordings",
    long_about   = None,
)]
pub struct Cli {
    /// Set the log level
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub loglevel: LogLevel,

    /// Treat warnings as fatal errors (fail on first warning).
    #[arg(long, global = true)]
    pub strict: bool,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Show progress bars during extraction.
    #[arg(long, global = true)]
    pub progress: bool,

    /// Choose an operation to perform.
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Level at which decode anomalies abort instead of being logged.
    pub fn fail_level(&self) -> LevelFilter {
        if self.strict {
            LevelFilter::Warn
        } else {
            LevelFilter::Off
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print disc and program information from the IFO.
    Info(InfoArgs),

    /// Print disc information and extract programs from the VRO.
    Extract(ExtractArgs),
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Navigation file, usually VR_MANGR.IFO (use "-" for stdin).
    #[arg(value_name = "IFO")]
    pub ifo: PathBuf,

    /// Only report this program (1-based).
    #[arg(long, value_name = "N")]
    pub program: Option<usize>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = ReportFormat::Plain)]
    pub format: ReportFormat,
}

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Navigation file, usually VR_MANGR.IFO.
    #[arg(value_name = "IFO")]
    pub ifo: PathBuf,

    /// Data file, usually VR_MOVIE.VRO.
    #[arg(value_name = "VRO")]
    pub vro: PathBuf,

    /// Only extract this program (1-based).
    #[arg(long, value_name = "N")]
    pub program: Option<usize>,

    /// Base name for output files, or "-" to write to stdout.
    ///
    /// Files are named BASE#NNN.vob. Without a base name they are named after
    /// the recording time. Stdout requires a single program.
    #[arg(long, value_name = "BASE")]
    pub name: Option<String>,

    /// Directory for output files.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Keep the extraction time as the file modification time.
    #[arg(long)]
    pub no_touch: bool,

    /// Report format.
    #[arg(long, value_enum, default_value_t = ReportFormat::Plain)]
    pub format: ReportFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    /// Disable logging output.
    Off,
    /// No output except errors.
    Error,
    /// Show warnings and errors.
    Warn,
    /// Show info, warnings and errors (default).
    Info,
    /// Show debug, info, warnings and errors.
    Debug,
    /// Show all log messages including trace.
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Colorized human-readable text.
    Plain,
    /// Structured JSON per log record.
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ReportFormat {
    /// "key: value" lines.
    Plain,
    /// YAML document.
    Yaml,
}
