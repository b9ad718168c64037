//! Pipeline adapters
//!
//! Wire a fragment source, a registry, and output options into a lazy
//! sanitized sequence. The adapters contain no matching logic; they pull
//! one fragment from the source only when the consumer asks for more
//! output and the processor has nothing resolved, so the pipeline never
//! reads ahead of what matching requires.
//!
//! [`sanitize`] adapts any blocking `Iterator<Item = String>`;
//! [`sanitize_stream`] adapts any `futures::Stream<Item = String>`.

use futures::Stream;
use pin_project::pin_project;
use serde::{Deserialize, Serialize};
use sievestream_core::{Error, Result, StreamHistory};
use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use crate::processor::StreamProcessor;
use crate::registry::KeywordRegistry;

/// Output unit granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Yield each resolved safe span as one unit
    #[default]
    Chunk,

    /// Split safe spans on whitespace before yielding
    Token,
}

impl std::str::FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "chunk" => Ok(Self::Chunk),
            "token" => Ok(Self::Token),
            other => Err(format!("unknown output mode '{other}' (chunk|token)")),
        }
    }
}

/// Pipeline options
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Output unit granularity
    pub mode: OutputMode,

    /// Record the run in [`StreamHistory`]
    pub record_history: bool,

    /// In token mode, withhold a trailing partial token and merge it with
    /// the next flush instead of splitting mid-token
    pub hold_partial_tokens: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mode: OutputMode::Chunk,
            record_history: true,
            hold_partial_tokens: true,
        }
    }
}

impl PipelineConfig {
    /// Config yielding whole safe spans
    pub fn chunk() -> Self {
        Self::default()
    }

    /// Config yielding whitespace-delimited tokens
    pub fn token() -> Self {
        Self {
            mode: OutputMode::Token,
            ..Self::default()
        }
    }
}

/// Regroups resolved safe spans into output units per [`OutputMode`].
///
/// Concatenating the produced units always reconstructs the concatenation
/// of the spans pushed in.
#[derive(Debug)]
struct Repacker {
    mode: OutputMode,
    hold_partial: bool,
    pending: String,
}

impl Repacker {
    fn new(config: &PipelineConfig) -> Self {
        Self {
            mode: config.mode,
            hold_partial: config.hold_partial_tokens,
            pending: String::new(),
        }
    }

    fn push(&mut self, span: &str, queue: &mut VecDeque<String>) {
        if span.is_empty() {
            return;
        }
        match self.mode {
            OutputMode::Chunk => queue.push_back(span.to_string()),
            OutputMode::Token => {
                self.pending.push_str(span);
                self.drain_tokens(queue);
            }
        }
    }

    fn drain_tokens(&mut self, queue: &mut VecDeque<String>) {
        // Everything up to the last whitespace char is complete; what
        // follows may be the head of a token still being produced.
        let cut = if self.hold_partial {
            match self.pending.char_indices().rev().find(|(_, c)| c.is_whitespace()) {
                Some((idx, c)) => idx + c.len_utf8(),
                None => 0,
            }
        } else {
            self.pending.len()
        };

        if cut == 0 {
            return;
        }
        let rest = self.pending.split_off(cut);
        let complete = std::mem::replace(&mut self.pending, rest);
        for unit in complete.split_inclusive(char::is_whitespace) {
            queue.push_back(unit.to_string());
        }
    }

    /// Flush any withheld partial token at end of stream
    fn finish(&mut self, queue: &mut VecDeque<String>) {
        if !self.pending.is_empty() {
            queue.push_back(std::mem::take(&mut self.pending));
        }
    }
}

/// Build a sanitizing pipeline over a blocking fragment source
pub fn sanitize<I>(
    registry: Arc<KeywordRegistry>,
    source: I,
    config: PipelineConfig,
) -> Result<SanitizeIter<I::IntoIter>>
where
    I: IntoIterator<Item = String>,
{
    let processor = StreamProcessor::with_history(registry, config.record_history)?;
    Ok(SanitizeIter {
        source: source.into_iter(),
        state: PumpState::new(&config),
        processor,
    })
}

/// Build a sanitizing pipeline over an async fragment source
pub fn sanitize_stream<S>(
    registry: Arc<KeywordRegistry>,
    source: S,
    config: PipelineConfig,
) -> Result<SanitizeStream<S>>
where
    S: Stream<Item = String>,
{
    let processor = StreamProcessor::with_history(registry, config.record_history)?;
    Ok(SanitizeStream {
        source,
        state: PumpState::new(&config),
        processor,
    })
}

/// Shared adapter state driving one processor step.
///
/// Output resolved before a halt or a callback failure is queued first, so
/// consumers always see everything that was safe before the terminating
/// event; a failure is then yielded as one `Err` before the sequence ends.
#[derive(Debug)]
struct PumpState {
    repacker: Repacker,
    queue: VecDeque<String>,
    error: Option<Error>,
    done: bool,
}

impl PumpState {
    fn new(config: &PipelineConfig) -> Self {
        Self {
            repacker: Repacker::new(config),
            queue: VecDeque::new(),
            error: None,
            done: false,
        }
    }

    fn pump(&mut self, processor: &mut StreamProcessor) {
        for span in processor.drain_output() {
            self.repacker.push(&span, &mut self.queue);
        }
    }

    fn step(&mut self, result: Result<()>, processor: &mut StreamProcessor) {
        match result {
            Ok(()) => self.pump(processor),
            // Cooperative termination: drain what was resolved before the
            // halting match, then end cleanly.
            Err(Error::Halted) => {
                self.pump(processor);
                self.repacker.finish(&mut self.queue);
                self.done = true;
            }
            Err(e) => {
                self.pump(processor);
                self.error = Some(e);
                self.done = true;
            }
        }
    }

    fn end_of_source(&mut self, processor: &mut StreamProcessor) {
        let result = processor.finish();
        self.step(result, processor);
        if self.error.is_none() {
            self.repacker.finish(&mut self.queue);
        }
        self.done = true;
    }
}

/// Lazy sanitized sequence over a blocking source.
///
/// Yields `Ok(unit)` per output unit; a callback failure is yielded as one
/// `Err` and ends the sequence. A halted run ends without an error;
/// [`is_halted`](Self::is_halted) distinguishes it from exhaustion.
pub struct SanitizeIter<I> {
    source: I,
    processor: StreamProcessor,
    state: PumpState,
}

impl<I> SanitizeIter<I> {
    /// Whether the run was terminated by a `Halt` decision
    pub fn is_halted(&self) -> bool {
        self.processor.is_halted()
    }

    /// History of the run so far
    pub fn history(&self) -> &StreamHistory {
        self.processor.history()
    }
}

impl<I: Iterator<Item = String>> Iterator for SanitizeIter<I> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(unit) = self.state.queue.pop_front() {
                return Some(Ok(unit));
            }
            if let Some(e) = self.state.error.take() {
                return Some(Err(e));
            }
            if self.state.done {
                return None;
            }

            match self.source.next() {
                Some(fragment) => {
                    let result = self.processor.push(&fragment);
                    self.state.step(result, &mut self.processor);
                }
                None => self.state.end_of_source(&mut self.processor),
            }
        }
    }
}

/// Lazy sanitized sequence over an async source.
///
/// Same contract as [`SanitizeIter`]; suspension happens only while
/// waiting on the underlying source.
#[pin_project]
pub struct SanitizeStream<S> {
    #[pin]
    source: S,
    processor: StreamProcessor,
    state: PumpState,
}

impl<S> SanitizeStream<S> {
    /// Whether the run was terminated by a `Halt` decision
    pub fn is_halted(&self) -> bool {
        self.processor.is_halted()
    }

    /// History of the run so far
    pub fn history(&self) -> &StreamHistory {
        self.processor.history()
    }
}

impl<S: Stream<Item = String>> Stream for SanitizeStream<S> {
    type Item = Result<String>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        loop {
            if let Some(unit) = this.state.queue.pop_front() {
                return Poll::Ready(Some(Ok(unit)));
            }
            if let Some(e) = this.state.error.take() {
                return Poll::Ready(Some(Err(e)));
            }
            if this.state.done {
                return Poll::Ready(None);
            }

            match this.source.as_mut().poll_next(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Some(fragment)) => {
                    let result = this.processor.push(&fragment);
                    this.state.step(result, this.processor);
                }
                Poll::Ready(None) => this.state.end_of_source(this.processor),
            }
        }
    }
}
