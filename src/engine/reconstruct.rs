//! Message reconstruction state machine.
//!
//! Walks physical lines one at a time. A line that matches a timestamp
//! grammar starts a new logical message; anything else is appended to the
//! message in progress, or reported as an orphan when none is open.
//!
//! ```text
//! state         line         action                 next state
//! Idle          match        open message           Accumulating
//! Idle          no match     orphan                 Idle
//! Accumulating  match        flush, open message    Accumulating
//! Accumulating  no match     append continuation    Accumulating
//! any           finish()     flush if open          Idle
//! ```
//!
//! A match while accumulating flushes the open message and opens the next
//! one. Messages are flushed only by the next match or by [`finish`]; there
//! is no line or time limit.
//!
//! [`finish`]: MessageReconstructor::finish

use tracing::trace;

use super::folder::{resolve_timestamp, FolderDate};
use super::Engine;
use crate::model::{LogMessage, Provenance};

/// What happened to one pushed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    /// The line opened a new message. Carries the message it displaced, if any.
    Started(Option<LogMessage>),
    /// The line was appended to the open message.
    Continued,
    /// No message was open and the line did not start one.
    Orphan,
}

#[derive(Debug)]
struct PendingMessage {
    timestamp: String,
    raw_time_fragment: String,
    tags: Vec<String>,
    first_line: String,
    continuations: Vec<String>,
}

#[derive(Debug)]
enum State {
    Idle,
    Accumulating(PendingMessage),
}

/// Reassembles the logical messages of one file.
#[derive(Debug)]
pub struct MessageReconstructor<'e> {
    engine: &'e Engine,
    provenance: Provenance,
    folder_date: Option<FolderDate>,
    state: State,
    multiline_messages: usize,
    continuation_lines: usize,
}

impl<'e> MessageReconstructor<'e> {
    /// Start reconstructing a file. The folder date is resolved once, here.
    pub fn new(engine: &'e Engine, provenance: Provenance) -> Self {
        let folder_date = FolderDate::from_folder_name(&provenance.folder_timestamp);
        Self {
            engine,
            provenance,
            folder_date,
            state: State::Idle,
            multiline_messages: 0,
            continuation_lines: 0,
        }
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    pub fn folder_date(&self) -> Option<&FolderDate> {
        self.folder_date.as_ref()
    }

    /// True while a message is open.
    pub fn is_accumulating(&self) -> bool {
        matches!(self.state, State::Accumulating(_))
    }

    /// Multiline messages flushed so far.
    pub fn multiline_messages(&self) -> usize {
        self.multiline_messages
    }

    /// Continuation lines appended so far.
    pub fn continuation_lines(&self) -> usize {
        self.continuation_lines
    }

    /// Feed one physical line (without its line terminator).
    pub fn push_line(&mut self, line: &str) -> LineEvent {
        let engine = self.engine;
        let Some(m) = engine.grammars().match_line(line) else {
            return match &mut self.state {
                State::Accumulating(pending) => {
                    pending.continuations.push(line.to_string());
                    self.continuation_lines += 1;
                    LineEvent::Continued
                }
                State::Idle => LineEvent::Orphan,
            };
        };

        let opened = PendingMessage {
            timestamp: resolve_timestamp(&m, self.folder_date.as_ref()),
            raw_time_fragment: m.timestamp.to_string(),
            tags: engine.tags().extract(line),
            first_line: line.to_string(),
            continuations: Vec::new(),
        };
        trace!(grammar = m.grammar, timestamp = %opened.timestamp, "message started");

        let flushed = match std::mem::replace(&mut self.state, State::Accumulating(opened)) {
            State::Accumulating(previous) => Some(self.complete(previous)),
            State::Idle => None,
        };
        LineEvent::Started(flushed)
    }

    /// Flush the open message, if any, and return to `Idle`.
    ///
    /// Call at end of input and after a read failure.
    pub fn finish(&mut self) -> Option<LogMessage> {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Accumulating(pending) => Some(self.complete(pending)),
            State::Idle => None,
        }
    }

    fn complete(&mut self, pending: PendingMessage) -> LogMessage {
        let continuation_line_count = pending.continuations.len();
        if continuation_line_count > 0 {
            self.multiline_messages += 1;
        }

        let body = if pending.continuations.is_empty() {
            pending.first_line
        } else {
            let joiner = self.engine.joiner();
            let mut body = pending.first_line;
            for line in &pending.continuations {
                body.push_str(joiner);
                body.push_str(line);
            }
            body
        };

        LogMessage {
            timestamp: pending.timestamp,
            raw_time_fragment: pending.raw_time_fragment,
            tags: pending.tags,
            body,
            continuation_line_count,
            provenance: self.provenance.clone(),
        }
    }
}
