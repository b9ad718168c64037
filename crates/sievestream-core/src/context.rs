//! Per-match context handed to callbacks

use crate::decision::Decision;
use crate::error::Result;
use crate::history::StreamHistory;
use std::sync::Arc;

/// A keyword callback.
///
/// Invoked once per resolved keyword occurrence; reads the match and the
/// run history through the [`ActionContext`] and returns the [`Decision`]
/// to apply. Callbacks must not block and must not hold state owned by the
/// processor beyond the call.
pub type Callback = Arc<dyn Fn(&ActionContext<'_>) -> Result<Decision> + Send + Sync>;

/// Immutable snapshot of one keyword match, created fresh per invocation
/// and discarded after the callback returns.
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
    /// The matched keyword
    pub keyword: &'a str,

    /// Byte offset where the match started in the logical input stream
    pub start: usize,

    /// Byte offset one past the end of the match
    pub end: usize,

    /// Read-only view of the run so far
    pub history: &'a StreamHistory,
}

impl<'a> ActionContext<'a> {
    /// Create a context for one match
    pub fn new(keyword: &'a str, start: usize, end: usize, history: &'a StreamHistory) -> Self {
        Self {
            keyword,
            start,
            end,
            history,
        }
    }

    /// Length of the matched keyword in bytes
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True for a zero-width span; never produced by the processor
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_span() {
        let hist = StreamHistory::new();
        let ctx = ActionContext::new("secret", 10, 16, &hist);
        assert_eq!(ctx.len(), 6);
        assert!(!ctx.is_empty());
        assert_eq!(ctx.keyword, "secret");
    }

    #[test]
    fn test_callbacks_can_read_history() {
        let mut hist = StreamHistory::new();
        hist.record_output("prior", false);

        let cb: Callback = Arc::new(|ctx| {
            if ctx.history.match_count(ctx.keyword) >= 3 {
                Ok(Decision::Halt)
            } else {
                Ok(Decision::replace("[REDACTED]"))
            }
        });

        let ctx = ActionContext::new("secret", 0, 6, &hist);
        assert_eq!(cb(&ctx).unwrap(), Decision::replace("[REDACTED]"));
    }
}
