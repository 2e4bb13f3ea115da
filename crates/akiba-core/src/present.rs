//! Presentation adapter.
//!
//! A pure projection of the displayed log and the blink flag into
//! renderable lines. No timers, no business logic; the rendering surface
//! calls [`frame`] whenever the sequencer's revision changes.

use serde::Serialize;

use crate::line::{DisplayedLine, LineStatus};

/// One renderable log line.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedLine {
    #[serde(skip)]
    pub status: LineStatus,
    /// Bracketed status column, e.g. `[RETRYING]`.
    pub label: String,
    /// Message text, with the retry suffix when the line has failed before.
    pub text: String,
}

impl RenderedLine {
    /// The full line as plain text.
    pub fn plain(&self) -> String {
        format!("{} {}", self.label, self.text)
    }
}

/// A renderable snapshot of the boot log.
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub lines: Vec<RenderedLine>,
    /// Whether the trailing block cursor should be drawn right now.
    pub cursor_visible: bool,
}

/// Project the log into a frame.
///
/// The cursor is only shown while the sequence is still running; the blink
/// flag merely gates its visibility within that window.
pub fn frame(lines: &[DisplayedLine], blink_visible: bool, running: bool) -> Frame {
    let lines = lines
        .iter()
        .map(|line| {
            let text = if line.retry_count > 0 {
                format!("{} (Retries: {})", line.text, line.retry_count)
            } else {
                line.text.clone()
            };
            RenderedLine {
                status: line.status,
                label: format!("[{}]", line.status.label()),
                text,
            }
        })
        .collect();
    Frame {
        lines,
        cursor_visible: running && blink_visible,
    }
}
