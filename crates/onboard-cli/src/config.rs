//! CLI configuration

use crate::commands::{AndroidArgs, ColorArg, CommonArgs, WebArgs};
use crate::error::{CliError, CliResult};
use onboard::{OnboardError, SuiteConfig};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Verbosity {
    /// Quiet - warnings and errors
    Quiet,
    /// Normal - step boundaries and artifacts
    #[default]
    Normal,
    /// Verbose - every primitive
    Verbose,
    /// Trace - everything
    Trace,
}

impl Verbosity {
    /// Level from `-q` and the `-v` count
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Trace,
        }
    }

    /// Check if quiet mode
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// Default `EnvFilter` directive when `RUST_LOG` is unset
    #[must_use]
    pub const fn directive(self) -> &'static str {
        match self {
            Self::Quiet => "warn",
            Self::Normal => "info",
            Self::Verbose => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorChoice {
    /// Always use colors
    Always,
    /// Use colors when output is a terminal
    #[default]
    Auto,
    /// Never use colors
    Never,
}

impl From<ColorArg> for ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

impl ColorChoice {
    /// Should use colors based on output detection
    #[must_use]
    pub fn should_color(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => console::Term::stdout().is_term(),
        }
    }
}

/// CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Color output choice
    pub color: ColorChoice,
    /// JSON log lines instead of human-readable ones
    pub json_logs: bool,
}

impl CliConfig {
    /// Create new CLI config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity
    #[must_use]
    pub const fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set color choice
    #[must_use]
    pub const fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }

    /// Set JSON logging
    #[must_use]
    pub const fn with_json_logs(mut self, json: bool) -> Self {
        self.json_logs = json;
        self
    }

    /// Log filter: `RUST_LOG` if set, otherwise the verbosity default
    #[must_use]
    pub fn log_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.verbosity.directive()))
    }

    /// Install the global tracing subscriber on stderr
    ///
    /// # Errors
    ///
    /// `Logging` if a subscriber is already installed.
    pub fn init_logging(&self) -> CliResult<()> {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(self.log_filter())
            .with_writer(std::io::stderr)
            .with_ansi(self.color.should_color());
        let installed = if self.json_logs {
            builder.json().try_init()
        } else {
            builder.try_init()
        };
        installed.map_err(|e| CliError::Logging {
            message: e.to_string(),
        })
    }
}

/// Resolve the suite configuration: the environment first, then any
/// argument given on the command line.
///
/// # Errors
///
/// `Config` if an environment variable does not parse.
pub fn suite_config(
    common: &CommonArgs,
    android: Option<&AndroidArgs>,
    web: Option<&WebArgs>,
) -> CliResult<SuiteConfig> {
    resolve_suite_config(|key| std::env::var(key).ok(), common, android, web)
}

/// [`suite_config`] with the environment read through `lookup`.
///
/// # Errors
///
/// `Config` if a looked-up value does not parse.
pub fn resolve_suite_config<F>(
    lookup: F,
    common: &CommonArgs,
    android: Option<&AndroidArgs>,
    web: Option<&WebArgs>,
) -> CliResult<SuiteConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = SuiteConfig::from_lookup(lookup).map_err(|e| match e {
        OnboardError::Config { message } => CliError::Config { message },
        other => CliError::config(other.to_string()),
    })?;

    if let Some(wait) = common.explicit_wait_ms {
        config.explicit_wait_ms = Some(wait);
    }
    if let Some(dir) = &common.reports_dir {
        config.reports_dir.clone_from(dir);
    }

    if let Some(args) = android {
        let target = &mut config.android;
        if let Some(host) = &args.appium_host {
            target.appium_host.clone_from(host);
        }
        if let Some(port) = args.appium_port {
            target.appium_port = port;
        }
        if let Some(name) = &args.device_name {
            target.device_name.clone_from(name);
        }
        if args.udid.is_some() {
            target.udid.clone_from(&args.udid);
        }
        if args.platform_version.is_some() {
            target.platform_version.clone_from(&args.platform_version);
        }
        if args.app_path.is_some() {
            target.app_path.clone_from(&args.app_path);
        }
        if let Some(package) = &args.app_package {
            target.app_package.clone_from(package);
        }
        if let Some(activity) = &args.app_activity {
            target.app_activity.clone_from(activity);
        }
    }

    if let Some(args) = web {
        let target = &mut config.web;
        if args.portal_url.is_some() {
            target.portal_url.clone_from(&args.portal_url);
        }
        if let Some(url) = &args.chromedriver_url {
            target.chromedriver_url.clone_from(url);
        }
        if args.headless {
            target.headless = true;
        }
    }

    Ok(config)
}
