//! Cursor blink timer.

use std::time::Duration;

/// Fixed-period blink flag for the boot-log cursor.
///
/// Lives entirely outside the sequencer: created when the boot view mounts,
/// dropped when it unmounts, and never coupled to sequence progress. The
/// caller feeds it elapsed time alongside [`Sequencer::advance`].
///
/// [`Sequencer::advance`]: crate::sequencer::Sequencer::advance
#[derive(Debug)]
pub struct CursorBlink {
    period: Duration,
    elapsed: Duration,
    visible: bool,
}

impl CursorBlink {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            elapsed: Duration::ZERO,
            visible: true,
        }
    }

    /// Advance the blink clock, toggling once per elapsed period.
    pub fn advance(&mut self, dt: Duration) {
        if self.period.is_zero() {
            return;
        }
        self.elapsed += dt;
        while self.elapsed >= self.period {
            self.elapsed -= self.period;
            self.visible = !self.visible;
        }
    }

    pub fn visible(&self) -> bool {
        self.visible
    }
}
