//! Worker-count validation.
//!
//! Two independent checks run against the host's logical core count:
//!
//! - a hard cap: asking for more workers than cores fails with
//!   [`ConvertError::InvalidConfiguration`];
//! - a soft threshold: asking for more than 75% of the cores logs a warning
//!   and asks the operator to confirm through a [`Confirm`] implementation.
//!   Declining fails with [`ConvertError::UserAborted`].
//!
//! Both the core count and the confirmation channel are injected so tests can
//! run the high-utilization path without a terminal.

use crate::error::{ConvertError, Result};
use std::io::{self, BufRead, Write};
use tracing::warn;

/// Share of the available cores, in percent, above which confirmation is
/// required.
pub const CPU_USAGE_WARNING_PERCENT: usize = 75;

/// Asks the operator a yes/no question.
pub trait Confirm: Send + Sync {
    /// Return `true` to proceed.
    fn confirm(&self, question: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, question: &str) -> bool {
        self(question)
    }
}

/// Console confirmation: prints the question to stderr, reads one line from
/// stdin, and accepts `y` or `yes` (any case). Anything else declines,
/// including a closed or unreadable stdin.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, question: &str) -> bool {
        let mut stderr = io::stderr().lock();
        if write!(stderr, "{question} [y/n]: ")
            .and_then(|()| stderr.flush())
            .is_err()
        {
            return false;
        }
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(_) => is_affirmative(&line),
            Err(_) => false,
        }
    }
}

/// `true` for `y`/`yes`, ignoring case and surrounding whitespace.
#[must_use]
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Highest worker count that does not need confirmation on a host with
/// `available` cores.
///
/// Never below one: a single worker is the smallest valid request and runs
/// without a prompt even on a one-core host.
#[must_use]
pub fn warning_threshold(available: usize) -> usize {
    (available * CPU_USAGE_WARNING_PERCENT / 100).max(1)
}

/// Check `requested` worker processes against `available` cores.
///
/// # Errors
///
/// - [`ConvertError::InvalidConfiguration`] if `requested` is zero or exceeds
///   `available`.
/// - [`ConvertError::UserAborted`] if `requested` is in the high-utilization
///   band and `confirm` declines.
pub fn validate_processes(requested: usize, available: usize, confirm: &dyn Confirm) -> Result<()> {
    if requested == 0 {
        return Err(ConvertError::invalid(
            "the number of processes must be at least 1",
        ));
    }
    if requested > available {
        return Err(ConvertError::invalid(format!(
            "the specified number of processes ({requested}) exceeds the number of available \
             CPU cores ({available}). Use a value between 2 and {available}"
        )));
    }

    let threshold = warning_threshold(available);
    if requested > threshold {
        warn!(
            requested,
            available,
            "number of processes is greater than {CPU_USAGE_WARNING_PERCENT}% of available CPU cores; \
             this may impact system responsiveness or performance"
        );
        if !confirm.confirm(&format!(
            "{requested} of {available} CPU cores requested. Do you want to continue?"
        )) {
            warn!(requested, "aborting; specify a lower number of processes");
            return Err(ConvertError::UserAborted { requested });
        }
    }
    Ok(())
}
