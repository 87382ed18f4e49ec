//! Security check reporting.

use console::{style, Emoji};

static CHECK: Emoji = Emoji("✓", "+");
static CROSS: Emoji = Emoji("✗", "x");

/// Run the preflight battery and print a labelled result for each check.
///
/// Exits non-zero when any check fails, so scripts can gate on the result.
pub fn run() -> anyhow::Result<()> {
    let report = keepsafe_vault::run_checks();

    println!("Security preflight\n");
    for check in &report.checks {
        if check.passed {
            println!("  {} {}", style(CHECK).green(), check.label);
        } else {
            println!("  {} {}", style(CROSS).red(), check.label);
        }
    }

    println!("\n{}/{} checks passed", report.score(), report.total());

    if !report.all_passed() {
        anyhow::bail!("{} security check(s) failed", report.total() - report.score());
    }
    Ok(())
}
