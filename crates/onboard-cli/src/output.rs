//! Step report rendering

use console::style;
use onboard::{StepStatus, SuiteReport};
use std::fmt::Write as _;

/// Render a finished flow as a human-readable block
#[must_use]
pub fn render_report(report: &SuiteReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", style(&report.flow).bold());
    for step in &report.steps {
        let mark = match step.status {
            StepStatus::Passed => style("✓").green(),
            StepStatus::Failed => style("✗").red(),
            StepStatus::Skipped => style("-").dim(),
        };
        let _ = write!(
            out,
            "  {mark} {:<20} {:>8.1}s",
            step.name,
            step.duration.as_secs_f64()
        );
        if let Some(error) = &step.error {
            let _ = write!(out, "  {}", style(error).red());
        }
        out.push('\n');
        if let Some(path) = &step.screenshot {
            let _ = writeln!(out, "      screenshot: {}", path.display());
        }
    }
    let summary = report.summary();
    let summary = if report.all_passed() {
        style(summary).green()
    } else {
        style(summary).red()
    };
    let _ = writeln!(out, "{summary}");
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use onboard::StepRecord;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_render_lists_every_step() {
        console::set_colors_enabled(false);
        let mut report = SuiteReport::new("partner_registration");
        report.record(StepRecord::passed("Open Portal", Duration::from_millis(1500)));
        report.record(
            StepRecord::failed("Submit", Duration::from_secs(15), "not visible")
                .with_screenshot(PathBuf::from("reports/screenshots/Submit.png")),
        );
        report.record(StepRecord::skipped("Success Message"));

        let text = render_report(&report);
        assert!(text.contains("Open Portal"));
        assert!(text.contains("not visible"));
        assert!(text.contains("screenshot: reports/screenshots/Submit.png"));
        assert!(text.contains("partner_registration: 1/3 passed, 1 failed, 1 skipped"));
    }
}
