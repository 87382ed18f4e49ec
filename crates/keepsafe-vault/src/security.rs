//! Preflight process-hardening checks.
//!
//! A fixed battery of independent checks runs once at process start, before
//! any secret touches memory. Each check yields pass/fail and a label; the
//! aggregate score is the number of passes. In strict mode (the default)
//! any failure is fatal; with `--no-secure` failures are demoted to
//! warnings.
//!
//! The memory-lock and privilege-drop checks have deliberate side effects:
//! a privileged process locks its pages into RAM and then drops to the
//! invoking user before anything sensitive happens.

use tracing::warn;

use keepsafe_core::Config;

use crate::error::{Result, VaultError};

/// Outcome of one hardening check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Human-readable description of what the check verifies.
    pub label: &'static str,
    pub passed: bool,
}

/// Results of the full check battery.
#[derive(Debug, Clone)]
pub struct SecurityReport {
    pub checks: Vec<CheckResult>,
}

impl SecurityReport {
    /// Number of checks that passed.
    pub fn score(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    /// Number of checks in the battery.
    pub fn total(&self) -> usize {
        self.checks.len()
    }

    pub fn all_passed(&self) -> bool {
        self.score() == self.total()
    }

    /// Labels of the checks that failed.
    pub fn failures(&self) -> Vec<&'static str> {
        self.checks
            .iter()
            .filter(|c| !c.passed)
            .map(|c| c.label)
            .collect()
    }
}

/// Run the full battery and return per-check results.
pub fn run_checks() -> SecurityReport {
    let checks = vec![
        CheckResult {
            label: "process not running as root",
            passed: check_unprivileged(),
        },
        CheckResult {
            label: "core dumps disabled",
            passed: check_core_dumps_disabled(),
        },
        CheckResult {
            label: "memory lock limit pinned",
            passed: check_memlock(),
        },
        CheckResult {
            label: "privileges dropped irrevocably",
            passed: check_privilege_drop(),
        },
        CheckResult {
            label: "standard descriptors contiguous",
            passed: check_fd_layout(),
        },
    ];

    SecurityReport { checks }
}

/// Run the battery and apply the configured policy.
///
/// Strict mode turns any failure into a fatal [`VaultError::SecurityCheck`]
/// before any further action; lenient mode logs each failure and continues.
pub fn enforce(config: &Config) -> Result<()> {
    let report = run_checks();
    if report.all_passed() {
        return Ok(());
    }

    if config.strict_checks {
        Err(VaultError::SecurityCheck(report.failures().join(", ")))
    } else {
        for label in report.failures() {
            warn!("security check failed: {label}");
        }
        Ok(())
    }
}

/// Both real and effective uid/gid are non-zero.
fn check_unprivileged() -> bool {
    unsafe {
        libc::getuid() != 0
            && libc::geteuid() != 0
            && libc::getgid() != 0
            && libc::getegid() != 0
    }
}

/// The soft core-dump size limit is zero, so a crash cannot write secrets
/// to a core file.
fn check_core_dumps_disabled() -> bool {
    match get_rlimit(libc::RLIMIT_CORE as libc::c_int) {
        Some((soft, _)) => soft == 0,
        None => false,
    }
}

/// The memory-lock limit cannot be raised later (soft == hard); while still
/// privileged, additionally lock all pages so secrets cannot be paged to
/// swap.
fn check_memlock() -> bool {
    let Some((soft, hard)) = get_rlimit(libc::RLIMIT_MEMLOCK as libc::c_int) else {
        return false;
    };
    if soft != hard {
        return false;
    }

    if unsafe { libc::geteuid() } == 0 {
        return unsafe { libc::mlockall(libc::MCL_CURRENT | libc::MCL_FUTURE) } == 0;
    }

    true
}

/// A process started privileged drops to the invoking user's real uid/gid
/// and must not be able to re-acquire privilege afterwards.
fn check_privilege_drop() -> bool {
    let ruid = unsafe { libc::getuid() };
    let euid = unsafe { libc::geteuid() };

    // Nothing to drop; a genuinely-root invocation is caught by the
    // not-running-as-root check.
    if euid != 0 || ruid == 0 {
        return true;
    }

    unsafe {
        // Group first: dropping the user id first would leave no privilege
        // to change the group with.
        if libc::setgid(libc::getgid()) != 0 {
            return false;
        }
        if libc::setuid(ruid) != 0 {
            return false;
        }
        // The drop must be irrevocable.
        libc::seteuid(0) != 0
    }
}

/// Descriptors 0/1/2 are open and contiguous: duplicating fd 0 must yield
/// fd 3, the lowest free descriptor.
fn check_fd_layout() -> bool {
    let fd = unsafe { libc::dup(0) };
    if fd < 0 {
        return false;
    }
    let contiguous = fd == 3;
    unsafe {
        libc::close(fd);
    }
    contiguous
}

fn get_rlimit(resource: libc::c_int) -> Option<(libc::rlim_t, libc::rlim_t)> {
    let mut limit = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };
    // The resource constant's integer type differs across platforms.
    let rc = unsafe { libc::getrlimit(resource as _, &mut limit) };
    (rc == 0).then_some((limit.rlim_cur, limit.rlim_max))
}
