//! Ready-made callbacks for common decisions
//!
//! Each helper builds a [`Callback`] returning one fixed [`Decision`], for
//! registrations that need no history inspection.

use sievestream_core::{Callback, Decision};
use std::sync::Arc;

/// Callback that leaves the matched keyword in place
pub fn passthrough() -> Callback {
    constant(Decision::PassThrough)
}

/// Callback that drops the matched keyword
pub fn drop() -> Callback {
    constant(Decision::Drop)
}

/// Callback that replaces the matched keyword with fixed text
pub fn replace(text: impl Into<String>) -> Callback {
    constant(Decision::replace(text))
}

/// Callback that starts suppressing all output until a `ContinuousPass`
pub fn continuous_drop() -> Callback {
    constant(Decision::ContinuousDrop)
}

/// Callback that resumes output after a suppressed segment
pub fn continuous_pass() -> Callback {
    constant(Decision::ContinuousPass)
}

/// Callback that terminates the stream
pub fn halt() -> Callback {
    constant(Decision::Halt)
}

/// Callback returning a fixed decision
pub fn constant(decision: Decision) -> Callback {
    Arc::new(move |_| Ok(decision.clone()))
}
