//! Session lifecycle around one flow run.

use crate::commands::{PartnerArgs, RegisterArgs};
use crate::error::{CliError, CliResult};
use crate::output::render_report;
use onboard::{
    android_capabilities, chrome_capabilities, Artifacts, AvailabilityPoll, FlowOutcome,
    PartnerData, PartnerFlow, RegistrationFlow, SuiteConfig, SuiteReport, UiDriver, UserData,
    WebDriverSession,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Register one account against the configured Appium server
///
/// # Errors
///
/// Session start failures, report I/O, or `FlowFailed` when a step failed.
pub async fn run_register(config: &SuiteConfig, args: &RegisterArgs) -> CliResult<SuiteReport> {
    let user = UserData::valid(args.role.into());
    info!(role = %user.role, email = %user.email, "registering");
    let flow = RegistrationFlow::new(user)
        .with_dial_order(args.dial_order.into())
        .with_settle(Duration::from_millis(args.settle_ms))
        .with_timeout(config.native_wait());

    let session = WebDriverSession::start(
        config.android.server_url(),
        android_capabilities(&config.android),
    )
    .await?;
    let artifacts = Artifacts::new(config.reports_dir());
    let outcome = flow.run(&session, &artifacts).await;
    close(&session).await;
    conclude(outcome, &artifacts).await.map(|(report, _)| report)
}

/// Submit one partner application through chromedriver
///
/// # Errors
///
/// Missing portal URL, session start failures, report I/O, or `FlowFailed`.
pub async fn run_partner(config: &SuiteConfig, args: &PartnerArgs) -> CliResult<SuiteReport> {
    let base_url = config.web.portal_url()?.to_string();
    let partner = PartnerData {
        country: args.country.clone(),
        ..PartnerData::valid()
    };
    info!(business_id = %partner.business_id, "applying as partner");
    let flow = PartnerFlow::new(partner, base_url)
        .with_poll(poll_from(args))
        .with_timeout(config.web_wait());

    let session = WebDriverSession::start(
        config.web.chromedriver_url.clone(),
        chrome_capabilities(&config.web),
    )
    .await?;
    let artifacts = Artifacts::new(config.reports_dir());
    let outcome = flow.run(&session, &artifacts).await;
    close(&session).await;
    conclude(outcome, &artifacts).await.map(|(report, _)| report)
}

/// Availability poll timing from the partner arguments
#[must_use]
pub const fn poll_from(args: &PartnerArgs) -> AvailabilityPoll {
    AvailabilityPoll {
        marker_timeout: Duration::from_millis(args.marker_timeout_ms),
        retry_interval: Duration::from_millis(args.retry_interval_ms),
        deadline: Duration::from_millis(args.deadline_ms),
    }
}

async fn close<D: UiDriver + ?Sized>(driver: &D) {
    if let Err(e) = driver.end_session().await {
        warn!(error = %e, "session not closed cleanly");
    }
}

/// Write the report, print it, and turn a failed step into an error.
///
/// A step failure outranks a report that could not be written.
///
/// # Errors
///
/// `FlowFailed` naming the first failing step, otherwise report I/O.
pub async fn conclude(
    outcome: FlowOutcome,
    artifacts: &Artifacts,
) -> CliResult<(SuiteReport, PathBuf)> {
    let written = outcome.report.write(artifacts).await;
    print!("{}", render_report(&outcome.report));
    match &written {
        Ok(path) => println!("report: {}", path.display()),
        Err(e) => warn!(error = %e, "report not written"),
    }

    let Some(error) = outcome.error else {
        let path = written?;
        return Ok((outcome.report, path));
    };
    let failed_step = outcome
        .report
        .failure()
        .map(|s| s.name.clone())
        .unwrap_or_default();
    Err(CliError::flow_failed(
        outcome.report.flow,
        failed_step,
        error.to_string(),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use onboard::{MockDriver, OnboardError, StepRunner};

    #[tokio::test]
    async fn test_conclude_passing_flow_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = Artifacts::new(dir.path());
        let driver = MockDriver::new();
        let mut runner = StepRunner::new(&driver, artifacts.clone(), "demo");
        let _ = runner.step("only", || async { Ok(()) }).await;

        let (report, path) = conclude(runner.finish(), &artifacts).await.unwrap();
        assert!(report.all_passed());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_conclude_failed_flow_names_step() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = Artifacts::new(dir.path());
        let driver = MockDriver::new();
        let mut runner = StepRunner::new(&driver, artifacts.clone(), "demo");
        let _ = runner
            .step("Submit", || async { Err(OnboardError::assertion("no dialog")) })
            .await;

        let err = conclude(runner.finish(), &artifacts).await.unwrap_err();
        match err {
            CliError::FlowFailed { flow, step, message } => {
                assert_eq!(flow, "demo");
                assert_eq!(step, "Submit");
                assert_eq!(message, "Assertion failed: no dialog");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(dir.path().join("results").exists());
    }

    #[tokio::test]
    async fn test_conclude_keeps_step_failure_when_report_cannot_be_written() {
        let dir = tempfile::tempdir().unwrap();
        // a file where the reports root should be
        let blocker = dir.path().join("reports");
        std::fs::write(&blocker, b"").unwrap();
        let artifacts = Artifacts::new(&blocker);
        let driver = MockDriver::new();
        driver.fail_on("screenshot");
        let mut runner = StepRunner::new(&driver, artifacts.clone(), "demo");
        let _ = runner
            .step("Submit", || async { Err(OnboardError::assertion("no dialog")) })
            .await;

        let err = conclude(runner.finish(), &artifacts).await.unwrap_err();
        assert!(
            matches!(&err, CliError::FlowFailed { step, .. } if step == "Submit"),
            "unexpected error: {err}"
        );
    }

    #[tokio::test]
    async fn test_conclude_passing_flow_reports_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("reports");
        std::fs::write(&blocker, b"").unwrap();
        let artifacts = Artifacts::new(&blocker);
        let driver = MockDriver::new();
        let mut runner = StepRunner::new(&driver, artifacts.clone(), "demo");
        let _ = runner.step("only", || async { Ok(()) }).await;

        let err = conclude(runner.finish(), &artifacts).await.unwrap_err();
        assert!(!matches!(err, CliError::FlowFailed { .. }));
    }

    #[test]
    fn test_poll_from_args() {
        use clap::Parser;
        let cli = crate::Cli::try_parse_from([
            "onboard",
            "partner",
            "--deadline-ms",
            "30000",
        ])
        .unwrap();
        let crate::Commands::Partner(args) = cli.command else {
            panic!("expected partner command");
        };
        let poll = poll_from(&args);
        assert_eq!(poll.deadline, Duration::from_secs(30));
        assert_eq!(poll.marker_timeout, Duration::from_secs(5));
    }
}
