//! Displayed-log line state.

/// Status of a single line in the boot log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStatus {
    /// Resolved successfully.
    Ok,
    /// The last resolve attempt failed; a retry is pending.
    Fail,
    /// In progress (initial state on append, and between retries).
    Retrying,
    /// Progress animation running (memory test).
    Testing,
}

impl LineStatus {
    /// Bracketed status column text, matching the on-screen markup.
    pub fn label(self) -> &'static str {
        match self {
            LineStatus::Ok => "OK",
            LineStatus::Fail => "FAIL",
            LineStatus::Retrying => "RETRYING",
            LineStatus::Testing => "TESTING",
        }
    }
}

/// One line of the displayed boot log.
///
/// Created when the sequence cursor reaches its script index, mutated in
/// place by the sequencer until it settles at [`LineStatus::Ok`]. Lines
/// resolve strictly in script order, so only the newest line ever changes.
#[derive(Debug, Clone)]
pub struct DisplayedLine {
    /// Position in the boot script this line was created from.
    pub index: usize,
    /// Rendered text; diverges from the definition during progress animation.
    pub text: String,
    pub status: LineStatus,
    /// Number of FAIL transitions this line has gone through.
    pub retry_count: u32,
}
