//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use onboard::{DialOrder, Role};
use std::path::PathBuf;

/// Onboard: run the registration app and partner portal flows
#[derive(Parser, Debug)]
#[command(name = "onboard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (warnings and errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register a client or service account in the Android app
    Register(RegisterArgs),

    /// Submit a partner application on the web portal
    Partner(PartnerArgs),

    /// Print the resolved configuration as JSON
    Config(ConfigArgs),
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Auto-detect
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Account role argument
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoleArg {
    /// Client account
    Client,
    /// Service account
    Service,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Client => Self::Client,
            RoleArg::Service => Self::Service,
        }
    }
}

/// Date picker dial order argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DialOrderArg {
    /// Day, then month, then year
    #[default]
    Dmy,
    /// Year, then month, then day
    Ymd,
}

impl From<DialOrderArg> for DialOrder {
    fn from(arg: DialOrderArg) -> Self {
        match arg {
            DialOrderArg::Dmy => Self::DayMonthYear,
            DialOrderArg::Ymd => Self::YearMonthDay,
        }
    }
}

/// Settings shared by every command.
///
/// Values given here override the environment; anything left out is
/// resolved by [`onboard::SuiteConfig::from_env`].
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Default explicit wait in milliseconds [env: EXPLICIT_WAIT_MS]
    #[arg(long)]
    pub explicit_wait_ms: Option<u64>,

    /// Directory for screenshots and JSON results [env: REPORTS_DIR]
    #[arg(long)]
    pub reports_dir: Option<PathBuf>,
}

/// Appium connection and app under test
#[derive(Args, Debug, Clone, Default)]
pub struct AndroidArgs {
    /// Appium server host [env: APPIUM_HOST]
    #[arg(long)]
    pub appium_host: Option<String>,

    /// Appium server port [env: APPIUM_PORT]
    #[arg(long)]
    pub appium_port: Option<u16>,

    /// Device name capability [env: ANDROID_DEVICE_NAME]
    #[arg(long)]
    pub device_name: Option<String>,

    /// Device UDID [env: ANDROID_UDID]
    #[arg(long)]
    pub udid: Option<String>,

    /// Android platform version [env: ANDROID_PLATFORM_VERSION]
    #[arg(long)]
    pub platform_version: Option<String>,

    /// APK to install; the installed app is reused when omitted [env: APP_PATH]
    #[arg(long)]
    pub app_path: Option<PathBuf>,

    /// App package [env: APP_PACKAGE]
    #[arg(long)]
    pub app_package: Option<String>,

    /// Launch activity [env: APP_ACTIVITY]
    #[arg(long)]
    pub app_activity: Option<String>,
}

/// Browser connection and portal location
#[derive(Args, Debug, Clone, Default)]
pub struct WebArgs {
    /// Partner portal base URL [env: PARTNER_PORTAL_URL]
    #[arg(long)]
    pub portal_url: Option<String>,

    /// chromedriver endpoint [env: CHROMEDRIVER_URL]
    #[arg(long)]
    pub chromedriver_url: Option<String>,

    /// Run Chrome headless [env: HEADLESS]
    #[arg(long)]
    pub headless: bool,
}

/// Arguments for the register command
#[derive(Parser, Debug)]
pub struct RegisterArgs {
    /// Account role to register
    #[arg(short, long, value_enum)]
    pub role: RoleArg,

    /// Order in which the date picker dials are set
    #[arg(long, value_enum, default_value = "dmy")]
    pub dial_order: DialOrderArg,

    /// Pause after the phone field and between PIN entries (ms)
    #[arg(long, default_value = "3000")]
    pub settle_ms: u64,

    /// Shared settings
    #[command(flatten)]
    pub common: CommonArgs,

    /// Appium settings
    #[command(flatten)]
    pub android: AndroidArgs,
}

/// Arguments for the partner command
#[derive(Parser, Debug)]
pub struct PartnerArgs {
    /// How long each availability check waits for the landing page (ms)
    #[arg(long, default_value = "5000")]
    pub marker_timeout_ms: u64,

    /// Pause before refreshing an unavailable portal (ms)
    #[arg(long, default_value = "10000")]
    pub retry_interval_ms: u64,

    /// Give up on an unavailable portal after this long (ms)
    #[arg(long, default_value = "120000")]
    pub deadline_ms: u64,

    /// Country to pick in the country dropdown
    #[arg(long)]
    pub country: Option<String>,

    /// Shared settings
    #[command(flatten)]
    pub common: CommonArgs,

    /// Browser settings
    #[command(flatten)]
    pub web: WebArgs,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Shared settings
    #[command(flatten)]
    pub common: CommonArgs,

    /// Appium settings
    #[command(flatten)]
    pub android: AndroidArgs,

    /// Browser settings
    #[command(flatten)]
    pub web: WebArgs,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_register_args() {
        let cli = Cli::try_parse_from([
            "onboard",
            "-vv",
            "register",
            "--role",
            "service",
            "--dial-order",
            "ymd",
            "--appium-port",
            "4725",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Register(args) => {
                assert_eq!(Role::from(args.role), Role::Service);
                assert_eq!(DialOrder::from(args.dial_order), DialOrder::YearMonthDay);
                assert_eq!(args.android.appium_port, Some(4725));
                assert_eq!(args.settle_ms, 3000);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_register_requires_role() {
        assert!(Cli::try_parse_from(["onboard", "register"]).is_err());
    }

    #[test]
    fn test_partner_defaults() {
        let cli = Cli::try_parse_from(["onboard", "--json-logs", "partner"]).unwrap();
        assert!(cli.json_logs);
        match cli.command {
            Commands::Partner(args) => {
                assert_eq!(args.marker_timeout_ms, 5_000);
                assert_eq!(args.retry_interval_ms, 10_000);
                assert_eq!(args.deadline_ms, 120_000);
                assert!(args.country.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
