//! Side work that must never abort the primary operation.

use std::fmt::Display;
use tracing::warn;

/// Run a fallible side step and keep going on failure.
///
/// The error is logged at `warn` with `what` as context and swallowed.
pub fn attempt<T, E: Display>(what: &str, result: Result<T, E>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("{} failed: {}", what, e);
            None
        }
    }
}
