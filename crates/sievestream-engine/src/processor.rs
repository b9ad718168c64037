//! Stream processor: the prefix-safe matching/dispatch core
//!
//! Converts a sequence of input fragments into a sequence of sanitized
//! output spans. Incoming text accumulates in a rolling buffer that is
//! scanned with a leftmost-longest Aho-Corasick automaton over the
//! registered keywords. Text is flushed to the output queue as soon as it
//! can no longer participate in a match; a trailing span that is still a
//! strict prefix of some keyword (the ambiguous tail) is withheld until
//! more input arrives or the stream ends.
//!
//! A full match is not committed while an equal-or-earlier-starting longer
//! keyword could still complete with more input, so a stream carrying
//! "secret" resolves to `secret` even when `sec` is also registered.

use aho_corasick::{AhoCorasick, MatchKind};
use sievestream_core::{ActionContext, ActionRecord, Decision, Error, Result, StreamHistory};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::registry::KeywordRegistry;

/// The streaming matcher/dispatcher.
///
/// Input goes in through [`push`](Self::push) and [`finish`](Self::finish);
/// resolved output spans come out through [`drain_output`](Self::drain_output)
/// or [`next_output`](Self::next_output). The processor owns all run state:
/// the unresolved buffer, the output queue, the history, and the
/// continuous-drop flag.
pub struct StreamProcessor {
    registry: Arc<KeywordRegistry>,
    matcher: AhoCorasick,

    /// Unresolved trailing input; bounded by the longest keyword once a
    /// scan pass settles
    buf: String,

    /// Byte offset of `buf[0]` in the logical input stream
    offset: usize,

    /// Resolved output spans not yet taken by the consumer
    out: VecDeque<String>,

    history: StreamHistory,
    drop_mode: bool,
    halted: bool,
}

impl StreamProcessor {
    /// Create a processor over a registry, with history recording enabled
    pub fn new(registry: Arc<KeywordRegistry>) -> Result<Self> {
        Self::with_history(registry, true)
    }

    /// Create a processor, optionally disabling history recording to save
    /// memory on long streams
    pub fn with_history(registry: Arc<KeywordRegistry>, record_history: bool) -> Result<Self> {
        let matcher = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(registry.keywords())
            .map_err(|e| Error::config(format!("failed to build keyword automaton: {e}")))?;

        Ok(Self {
            registry,
            matcher,
            buf: String::new(),
            offset: 0,
            out: VecDeque::new(),
            history: if record_history {
                StreamHistory::new()
            } else {
                StreamHistory::disabled()
            },
            drop_mode: false,
            halted: false,
        })
    }

    /// Feed one input fragment and run the scan loop.
    ///
    /// Returns [`Error::Halted`] when a callback halts the stream; output
    /// flushed before the halting match remains available to drain.
    /// Callback failures propagate as-is and abandon the run.
    pub fn push(&mut self, fragment: &str) -> Result<()> {
        if self.halted {
            return Err(Error::Halted);
        }
        self.history.record_input(fragment);
        self.buf.push_str(fragment);
        self.scan(false)
    }

    /// Signal end of input. Pending matches resolve (an ambiguous tail can
    /// no longer extend) and the remaining tail is flushed as ordinary
    /// output.
    pub fn finish(&mut self) -> Result<()> {
        if self.halted {
            return Err(Error::Halted);
        }
        self.scan(true)
    }

    /// Take the next resolved output span
    pub fn next_output(&mut self) -> Option<String> {
        self.out.pop_front()
    }

    /// Take all resolved output spans
    pub fn drain_output(&mut self) -> Vec<String> {
        self.out.drain(..).collect()
    }

    /// Whether a `Halt` decision terminated this run
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Whether continuous-drop mode is currently suppressing output
    pub fn is_dropping(&self) -> bool {
        self.drop_mode
    }

    /// Read-only view of the run history
    pub fn history(&self) -> &StreamHistory {
        &self.history
    }

    /// Consume the processor and take the run history
    pub fn into_history(self) -> StreamHistory {
        self.history
    }

    /// Scan the buffer until no committable match remains.
    ///
    /// When `finishing` is set, no more input can arrive: ambiguity
    /// resolves, matches commit unconditionally, and the whole buffer
    /// drains.
    fn scan(&mut self, finishing: bool) -> Result<()> {
        loop {
            let Some(m) = self.matcher.find(self.buf.as_str()) else {
                if !finishing {
                    if let Some(s) = self.ambiguous_tail_start() {
                        self.flush_prefix(s);
                        return Ok(());
                    }
                }
                let len = self.buf.len();
                self.flush_prefix(len);
                return Ok(());
            };

            let (start, end, pid) = (m.start(), m.end(), m.pattern().as_usize());

            // Defer when a longer keyword starting at or before this match
            // could still complete; earliest-then-longest would prefer it.
            if !finishing {
                if let Some(s) = self.ambiguous_tail_start() {
                    if s <= start {
                        self.flush_prefix(s);
                        return Ok(());
                    }
                }
            }

            self.flush_prefix(start);
            self.dispatch(pid, end - start)?;
        }
    }

    /// Invoke callbacks for the match at the front of the buffer, apply
    /// the composed decision, and consume the matched span.
    fn dispatch(&mut self, pid: usize, len: usize) -> Result<()> {
        let matched = self.buf[..len].to_string();
        let keyword = self.registry.keywords()[pid].clone();
        let start = self.offset;
        let end = start + len;

        let decision = {
            let ctx = ActionContext::new(&keyword, start, end, &self.history);
            let mut combined = Decision::PassThrough;
            for cb in self.registry.lookup(&keyword) {
                let d = cb(&ctx)?;
                let halt = d.is_halt();
                combined = combined.combine(d);
                if halt {
                    break;
                }
            }
            combined
        };

        debug!(keyword = %keyword, start, end, decision = ?decision, "keyword resolved");
        self.history.record_action(ActionRecord {
            start,
            end,
            keyword,
            decision: decision.clone(),
        });
        self.consume(len);

        match decision {
            Decision::PassThrough => self.emit(&matched),
            Decision::Replace { replacement } => self.emit(&replacement),
            Decision::Drop => {}
            Decision::ContinuousDrop => {
                self.drop_mode = true;
                self.emit(&matched);
            }
            Decision::ContinuousPass => {
                self.drop_mode = false;
                self.emit(&matched);
            }
            Decision::Halt => {
                debug!(pos = self.offset, "halting stream");
                self.halted = true;
                self.buf.clear();
                return Err(Error::Halted);
            }
        }
        Ok(())
    }

    /// Earliest buffer position whose suffix is a strict prefix of some
    /// registered keyword, i.e. the start of the ambiguous tail
    fn ambiguous_tail_start(&self) -> Option<usize> {
        let max_len = self.registry.max_len();
        if max_len <= 1 || self.buf.is_empty() {
            return None;
        }

        // A strict prefix is shorter than the longest keyword, so only the
        // last max_len - 1 bytes can be ambiguous.
        let mut lower = self.buf.len().saturating_sub(max_len - 1);
        while lower < self.buf.len() && !self.buf.is_char_boundary(lower) {
            lower += 1;
        }

        for (off, _) in self.buf[lower..].char_indices() {
            let idx = lower + off;
            if self.registry.has_strict_prefix(&self.buf[idx..]) {
                return Some(idx);
            }
        }
        None
    }

    /// Flush the first `n` bytes of the buffer to the output side
    fn flush_prefix(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        let rest = self.buf.split_off(n);
        let prefix = std::mem::replace(&mut self.buf, rest);
        self.offset += n;
        self.emit(&prefix);
    }

    /// Drop the first `n` bytes of the buffer without emitting them
    fn consume(&mut self, n: usize) {
        self.buf = self.buf.split_off(n);
        self.offset += n;
    }

    /// Hand text to the consumer, or record it as suppressed while
    /// continuous-drop mode is active
    fn emit(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let suppressed = self.drop_mode;
        trace!(len = text.len(), suppressed, "emit");
        self.history.record_output(text, suppressed);
        if !suppressed {
            self.out.push_back(text.to_string());
        }
    }
}

impl std::fmt::Debug for StreamProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamProcessor")
            .field("buffered", &self.buf.len())
            .field("pending_output", &self.out.len())
            .field("offset", &self.offset)
            .field("drop_mode", &self.drop_mode)
            .field("halted", &self.halted)
            .finish()
    }
}
