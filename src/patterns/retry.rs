//! Optimistic retry loop
//!
//! ```text
//!   Read ──► Transform ──► ConditionalWrite ──┬─► Done(T)            (success)
//!    ▲                                        ├─► Conflict ── attempts left? ─┐
//!    └────────────────────────────────────────┼───────────────────── yes ─────┘
//!                                             │                     no ──► last conflict
//!                                             └─► Err(e)             (fatal, not retried)
//! ```

use crate::config::RetryConfig;
use crate::error::{Result, TableError};
use crate::model::ItemKey;

/// Outcome of one optimistic attempt
#[derive(Debug)]
pub(crate) enum Attempt<T> {
    Done(T),

    /// The primary conditional write lost a race; worth another attempt
    Conflict(TableError),
}

impl<T> Attempt<T> {
    /// Classify the result of the attempt's primary conditional write
    ///
    /// Only `ConditionalCheckFailed` becomes a `Conflict`; every other error
    /// stays an error and ends the loop.
    pub(crate) fn from_primary_write(result: Result<T>) -> Result<Attempt<T>> {
        match result {
            Ok(value) => Ok(Attempt::Done(value)),
            Err(e) if e.is_conditional_check_failed() => Ok(Attempt::Conflict(e)),
            Err(e) => Err(e),
        }
    }

    pub(crate) fn map<U>(self, f: impl FnOnce(T) -> U) -> Attempt<U> {
        match self {
            Attempt::Done(value) => Attempt::Done(f(value)),
            Attempt::Conflict(e) => Attempt::Conflict(e),
        }
    }
}

/// Run `attempt` until it is done, fails fatally, or the budget runs out
///
/// On exhaustion the last conflict is returned unchanged. A zero budget
/// never calls `attempt` and fails with `UnableToUpdate`.
pub(crate) fn retry_on_conflict<T>(
    retry: RetryConfig,
    key: &ItemKey,
    mut attempt: impl FnMut() -> Result<Attempt<T>>,
) -> Result<T> {
    let mut last_conflict = None;

    for attempt_number in 1..=retry.retries {
        match attempt()? {
            Attempt::Done(value) => {
                if attempt_number > 1 {
                    tracing::debug!("{} succeeded on attempt {}", key, attempt_number);
                }
                return Ok(value);
            }
            Attempt::Conflict(e) => {
                if attempt_number < retry.retries {
                    tracing::warn!(
                        "{} conflicted on attempt {}/{}, retrying: {}",
                        key,
                        attempt_number,
                        retry.retries,
                        e
                    );
                }
                last_conflict = Some(e);
            }
        }
    }

    match last_conflict {
        Some(e) => {
            tracing::warn!("{} exhausted {} attempts: {}", key, retry.retries, e);
            Err(e)
        }
        None => Err(TableError::UnableToUpdate(format!(
            "no attempts allowed for {}",
            key
        ))),
    }
}
