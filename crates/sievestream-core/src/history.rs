//! Stream and action history tracking
//!
//! [`StreamHistory`] records everything that happened during one stream
//! run: input fragments, output spans (including spans suppressed by
//! continuous-drop mode), and the decision applied to each keyword match.
//! It is owned by the processor; callbacks read it through the
//! [`ActionContext`](crate::ActionContext) and never mutate it directly.

use crate::decision::Decision;
use serde::{Deserialize, Serialize};

/// One span of output produced by the processor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    /// The output text
    pub text: String,

    /// True when continuous-drop mode withheld this span from the consumer
    pub suppressed: bool,
}

/// One applied decision for a keyword match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Byte offset where the match started in the logical input stream
    pub start: usize,

    /// Byte offset one past the end of the match
    pub end: usize,

    /// The matched keyword
    pub keyword: String,

    /// The decision that was applied (after composition across callbacks)
    pub decision: Decision,
}

/// Append-only record of one stream run.
///
/// Recording can be disabled to save memory on long streams; a disabled
/// history accepts writes and discards them, and all accessors return
/// empty views.
#[derive(Debug, Default)]
pub struct StreamHistory {
    inputs: Vec<String>,
    outputs: Vec<OutputRecord>,
    actions: Vec<ActionRecord>,
    disabled: bool,
}

impl StreamHistory {
    /// Create a recording history
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a no-op history that discards all records
    pub fn disabled() -> Self {
        Self {
            disabled: true,
            ..Self::default()
        }
    }

    /// Whether this history records anything
    pub fn is_recording(&self) -> bool {
        !self.disabled
    }

    /// Record one input fragment
    pub fn record_input(&mut self, fragment: &str) {
        if !self.disabled {
            self.inputs.push(fragment.to_string());
        }
    }

    /// Record one output span
    pub fn record_output(&mut self, text: &str, suppressed: bool) {
        if !self.disabled {
            self.outputs.push(OutputRecord {
                text: text.to_string(),
                suppressed,
            });
        }
    }

    /// Record one applied decision
    pub fn record_action(&mut self, record: ActionRecord) {
        if !self.disabled {
            self.actions.push(record);
        }
    }

    /// Input fragments received so far
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    /// Output spans produced so far, suppressed ones included
    pub fn outputs(&self) -> &[OutputRecord] {
        &self.outputs
    }

    /// Decisions applied so far, in stream order
    pub fn actions(&self) -> &[ActionRecord] {
        &self.actions
    }

    /// Concatenated consumer-visible output so far
    pub fn emitted_text(&self) -> String {
        self.outputs
            .iter()
            .filter(|r| !r.suppressed)
            .map(|r| r.text.as_str())
            .collect()
    }

    /// Decisions applied so far for one keyword
    pub fn actions_for<'a>(&'a self, keyword: &'a str) -> impl Iterator<Item = &'a ActionRecord> {
        self.actions.iter().filter(move |a| a.keyword == keyword)
    }

    /// How many times a keyword has triggered so far
    pub fn match_count(&self, keyword: &str) -> usize {
        self.actions_for(keyword).count()
    }
}
