//! Decision model for keyword callbacks
//!
//! Every callback invocation resolves to exactly one [`Decision`]. Decisions
//! from multiple callbacks registered on the same keyword compose
//! left-to-right: `Halt` short-circuits, otherwise the last
//! non-`PassThrough` decision wins.

use serde::{Deserialize, Serialize};

/// Outcome of a callback for one keyword occurrence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Emit the matched text unchanged
    PassThrough,

    /// Emit replacement text instead of the matched keyword
    Replace {
        /// Text emitted in place of the match
        replacement: String,
    },

    /// Emit nothing for this occurrence
    Drop,

    /// Suppress all subsequent output until a `ContinuousPass` decision
    /// or end of stream
    ContinuousDrop,

    /// Exit continuous-drop mode (no-op when not active); the matched
    /// keyword itself is emitted
    ContinuousPass,

    /// Terminate the stream immediately; no further input is consumed
    Halt,
}

impl Decision {
    /// Construct a `Replace` decision
    pub fn replace(replacement: impl Into<String>) -> Self {
        Self::Replace {
            replacement: replacement.into(),
        }
    }

    /// Whether this decision terminates the stream
    pub fn is_halt(&self) -> bool {
        matches!(self, Self::Halt)
    }

    /// Fold another callback's decision into this one.
    ///
    /// `Halt` always wins; a later non-`PassThrough` decision overrides an
    /// earlier one; an explicit later `PassThrough` leaves the earlier
    /// decision in place.
    pub fn combine(self, later: Decision) -> Decision {
        if self.is_halt() {
            return self;
        }
        match later {
            Decision::PassThrough => self,
            other => other,
        }
    }
}

impl Default for Decision {
    fn default() -> Self {
        Self::PassThrough
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_constructor() {
        let d = Decision::replace("[REDACTED]");
        assert_eq!(
            d,
            Decision::Replace {
                replacement: "[REDACTED]".to_string()
            }
        );
    }

    #[test]
    fn test_combine_last_write_wins() {
        let combined = Decision::PassThrough
            .combine(Decision::Drop)
            .combine(Decision::replace("x"));
        assert_eq!(combined, Decision::replace("x"));
    }

    #[test]
    fn test_combine_passthrough_is_neutral() {
        let combined = Decision::Drop.combine(Decision::PassThrough);
        assert_eq!(combined, Decision::Drop);
    }

    #[test]
    fn test_combine_halt_short_circuits() {
        let combined = Decision::Halt.combine(Decision::replace("x"));
        assert!(combined.is_halt());
    }

    #[test]
    fn test_serde_tagged_form() {
        let json = r#"{"type": "replace", "replacement": "[SAFE]"}"#;
        let d: Decision = serde_json::from_str(json).unwrap();
        assert_eq!(d, Decision::replace("[SAFE]"));

        let drop: Decision = serde_json::from_str(r#"{"type": "drop"}"#).unwrap();
        assert_eq!(drop, Decision::Drop);
    }
}
