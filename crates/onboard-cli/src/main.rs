//! Onboard CLI: run the registration app and partner portal flows
//!
//! ## Usage
//!
//! ```bash
//! onboard register --role client            # Client account, day-month-year dials
//! onboard register --role service --dial-order ymd
//! onboard partner                           # Partner application on the portal
//! onboard config                            # Resolved configuration as JSON
//! ```

use clap::Parser;
use onboard_cli::{
    run_partner, run_register, suite_config, Cli, CliConfig, CliResult, ColorChoice, Commands,
    Verbosity,
};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    console::set_colors_enabled(config.color.should_color());
    config.init_logging()?;

    match cli.command {
        Commands::Register(args) => {
            let suite = suite_config(&args.common, Some(&args.android), None)?;
            run_register(&suite, &args).await.map(|_| ())
        }
        Commands::Partner(args) => {
            let suite = suite_config(&args.common, None, Some(&args.web))?;
            run_partner(&suite, &args).await.map(|_| ())
        }
        Commands::Config(args) => {
            let suite = suite_config(&args.common, Some(&args.android), Some(&args.web))?;
            println!("{}", serde_json::to_string_pretty(&suite)?);
            Ok(())
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let color: ColorChoice = cli.color.clone().into();
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(color)
        .with_json_logs(cli.json_logs)
}
