//! Sequence driver, line execution state machine, and progress animation.
//!
//! Everything runs on a single virtual-time timer queue: the embedding
//! application feeds elapsed wall time into [`Sequencer::advance`], and all
//! due timers fire in fire-time order (ties in schedule order). Retries are
//! a timer chain through the queue, never recursion, so a line with a high
//! fail chance can retry indefinitely at constant stack depth.
//!
//! Mutations are confined to the displayed log and the sequence cursor.
//! Renderers poll [`Sequencer::revision`] to learn when a redraw is due.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::line::{DisplayedLine, LineStatus};
use crate::script::{BootScript, LineKind};
use crate::timing;
use crate::tone::{ToneHandle, ToneSink};

/// Timer intervals and progress-animation parameters.
///
/// Defaults match the classic pacing; tests substitute millisecond-scale
/// values to keep virtual runs short.
#[derive(Debug, Clone)]
pub struct Tuning {
    /// Pause on a FAIL transition before the line flips back to RETRYING.
    pub fail_settle_ms: u64,
    /// Pause after a successful resolve before the cursor advances.
    pub advance_settle_ms: u64,
    /// Bounds for the randomized wait between RETRYING and the next attempt.
    pub retry_delay_ms: (u64, u64),
    /// Number of intermediate progress frames for the memory test.
    pub progress_steps: u32,
    /// Counter value the final progress frame must reach exactly, in KB.
    pub progress_target_kb: u32,
    /// Pitch of the memory-test tone.
    pub tone_hz: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            fail_settle_ms: 1000,
            advance_settle_ms: 100,
            retry_delay_ms: (500, 1000),
            progress_steps: 100,
            progress_target_kb: 16384,
            tone_hz: 440.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Task {
    /// Append the line for this index and run its first resolve attempt.
    Append(usize),
    /// Flip a failed line back to RETRYING and schedule the next attempt.
    MarkRetrying(usize),
    /// Run another resolve attempt for a retrying line.
    Retry(usize),
    /// Emit one progress frame (or, past the last step, finish the test).
    ProgressStep { index: usize, step: u32 },
    /// Move the cursor to the next script index and dispatch it.
    AdvanceCursor,
}

struct Scheduled {
    fire_at_ms: u64,
    seq: u64,
    task: Task,
}

// Min-heap order by (fire time, schedule order); `seq` is unique, so this
// is a total order and `task` never participates.
impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we want the earliest timer on top.
        (other.fire_at_ms, other.seq).cmp(&(self.fire_at_ms, self.seq))
    }
}

/// Owns the script cursor and drives the whole boot presentation.
pub struct Sequencer {
    script: BootScript,
    tuning: Tuning,
    lines: Vec<DisplayedLine>,
    cursor: usize,
    now_ms: u64,
    timers: BinaryHeap<Scheduled>,
    next_seq: u64,
    rng: StdRng,
    tone: ToneHandle,
    started: bool,
    completed: bool,
    torn_down: bool,
    revision: u64,
    on_complete: Option<Box<dyn FnOnce()>>,
}

impl Sequencer {
    /// Create a sequencer over a script with an entropy-seeded RNG.
    pub fn new(script: BootScript, tuning: Tuning, tone: Box<dyn ToneSink>) -> Self {
        Self::with_rng(script, tuning, tone, StdRng::from_entropy())
    }

    /// Create a sequencer with a fixed seed for reproducible runs.
    pub fn with_seed(
        script: BootScript,
        tuning: Tuning,
        tone: Box<dyn ToneSink>,
        seed: u64,
    ) -> Self {
        Self::with_rng(script, tuning, tone, StdRng::seed_from_u64(seed))
    }

    fn with_rng(script: BootScript, tuning: Tuning, tone: Box<dyn ToneSink>, rng: StdRng) -> Self {
        Self {
            script,
            tuning,
            lines: Vec::new(),
            cursor: 0,
            now_ms: 0,
            timers: BinaryHeap::new(),
            next_seq: 0,
            rng,
            tone: ToneHandle::new(tone),
            started: false,
            completed: false,
            torn_down: false,
            revision: 0,
            on_complete: None,
        }
    }

    /// Register the completion signal. Invoked exactly once, when the cursor
    /// first reaches the end of the script.
    pub fn set_on_complete(&mut self, callback: impl FnOnce() + 'static) {
        self.on_complete = Some(Box::new(callback));
    }

    /// Dispatch the first script index. A second call is a no-op.
    pub fn start(&mut self) {
        debug_assert!(!self.started, "sequencer started twice");
        if self.started || self.torn_down {
            return;
        }
        self.started = true;
        tracing::info!(lines = self.script.len(), "boot sequence starting");
        self.dispatch();
    }

    /// Advance virtual time and fire every timer that has come due.
    ///
    /// Tasks scheduled while pumping that are already due fire within the
    /// same call, so a zero-delay cascade settles before this returns.
    pub fn advance(&mut self, dt: Duration) {
        if self.torn_down {
            return;
        }
        self.now_ms = self.now_ms.saturating_add(dt.as_millis() as u64);
        loop {
            match self.timers.peek() {
                Some(next) if next.fire_at_ms <= self.now_ms => {}
                _ => break,
            }
            if let Some(scheduled) = self.timers.pop() {
                self.run(scheduled.task);
            }
        }
    }

    /// Cancel every outstanding timer and release the tone.
    ///
    /// After teardown no callback fires and no state mutates; `advance`
    /// becomes a no-op. Safe to call more than once.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.timers.clear();
        self.tone.stop();
        self.torn_down = true;
        tracing::debug!(cursor = self.cursor, "sequencer torn down");
    }

    pub fn lines(&self) -> &[DisplayedLine] {
        &self.lines
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Bumped on every log or cursor mutation; renderers redraw on change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    pub fn tone_active(&self) -> bool {
        self.tone.is_active()
    }

    fn schedule(&mut self, delay_ms: u64, task: Task) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.push(Scheduled {
            fire_at_ms: self.now_ms + delay_ms,
            seq,
            task,
        });
    }

    fn run(&mut self, task: Task) {
        match task {
            Task::Append(index) => self.append(index),
            Task::MarkRetrying(index) => self.mark_retrying(index),
            Task::Retry(index) => self.resolve(index),
            Task::ProgressStep { index, step } => self.progress_step(index, step),
            Task::AdvanceCursor => {
                self.cursor += 1;
                self.revision += 1;
                self.dispatch();
            }
        }
    }

    /// Inspect the event at the cursor and kick off its presentation, or
    /// signal completion once the cursor has walked off the end.
    fn dispatch(&mut self) {
        let (kind, nominal_delay_ms) = match self.script.get(self.cursor) {
            Some(event) => (event.def.kind, event.nominal_delay_ms),
            None => {
                if !self.completed {
                    self.completed = true;
                    tracing::info!("boot sequence complete");
                    if let Some(callback) = self.on_complete.take() {
                        callback();
                    }
                }
                return;
            }
        };
        match kind {
            LineKind::ProgressAnimated => {
                self.tone.start(self.tuning.tone_hz);
                // First frame is emitted immediately; the rest are timed.
                self.progress_step(self.cursor, 1);
            }
            LineKind::Normal => {
                self.schedule(nominal_delay_ms, Task::Append(self.cursor));
            }
        }
    }

    fn append(&mut self, index: usize) {
        debug_assert_eq!(self.lines.len(), index, "line appended out of order");
        let text = match self.script.get(index) {
            Some(event) => event.def.text.clone(),
            None => return,
        };
        self.lines.push(DisplayedLine {
            index,
            text,
            status: LineStatus::Retrying,
            retry_count: 0,
        });
        self.revision += 1;
        self.resolve(index);
    }

    /// One resolve attempt: draw the failure decision and transition the
    /// line, scheduling either the retry chain or the cursor advance.
    fn resolve(&mut self, index: usize) {
        let fail_chance = match self.script.get(index) {
            Some(event) => event.def.fail_chance,
            None => return,
        };
        let Some(line) = self.lines.get(index) else {
            debug_assert!(false, "resolve for a line that was never appended");
            tracing::warn!(index, "resolve for missing line ignored");
            return;
        };
        debug_assert_eq!(
            line.status,
            LineStatus::Retrying,
            "concurrent resolve for index {index}"
        );

        if timing::should_fail(&mut self.rng, fail_chance) {
            self.transition(index, LineStatus::Fail, true);
            self.schedule(self.tuning.fail_settle_ms, Task::MarkRetrying(index));
        } else {
            self.transition(index, LineStatus::Ok, false);
            self.schedule(self.tuning.advance_settle_ms, Task::AdvanceCursor);
        }
    }

    fn mark_retrying(&mut self, index: usize) {
        self.transition(index, LineStatus::Retrying, false);
        let (min, max) = self.tuning.retry_delay_ms;
        let wait = timing::delay_between(&mut self.rng, min, max);
        self.schedule(wait, Task::Retry(index));
    }

    /// Progress animation for the memory-test line. Steps `1..=steps` are
    /// intermediate frames; the step past the end forces the exact target
    /// value, stops the tone, and hands control back to the cursor.
    fn progress_step(&mut self, index: usize, step: u32) {
        let steps = self.tuning.progress_steps.max(1);
        let target = self.tuning.progress_target_kb;
        if step <= steps {
            let counter = (u64::from(step) * u64::from(target) / u64::from(steps)) as u32;
            self.set_line(index, format!("Memory Test: {counter}K"), LineStatus::Testing);
            let nominal = self.script.get(index).map(|e| e.nominal_delay_ms).unwrap_or(0);
            self.schedule(
                nominal / u64::from(steps),
                Task::ProgressStep {
                    index,
                    step: step + 1,
                },
            );
        } else {
            self.tone.stop();
            self.set_line(index, format!("Memory Test: {target}K"), LineStatus::Ok);
            self.schedule(self.tuning.advance_settle_ms, Task::AdvanceCursor);
        }
    }

    fn transition(&mut self, index: usize, status: LineStatus, count_failure: bool) {
        let Some(line) = self.lines.get_mut(index) else {
            debug_assert!(false, "transition for a line that was never appended");
            tracing::warn!(index, "transition for missing line ignored");
            return;
        };
        line.status = status;
        if count_failure {
            line.retry_count += 1;
            tracing::debug!(index, retries = line.retry_count, "line failed, will retry");
        }
        self.revision += 1;
    }

    /// Create-or-rewrite for the progress line, which mutates in place on
    /// every frame rather than appending.
    fn set_line(&mut self, index: usize, text: String, status: LineStatus) {
        if self.lines.len() == index {
            self.lines.push(DisplayedLine {
                index,
                text,
                status,
                retry_count: 0,
            });
        } else if let Some(line) = self.lines.get_mut(index) {
            line.text = text;
            line.status = status;
        } else {
            debug_assert!(false, "progress frame for an unreachable index");
            tracing::warn!(index, "progress frame for unreachable index ignored");
            return;
        }
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::BootEventDef;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Default)]
    struct ToneState {
        active: bool,
        starts: u32,
        stops: u32,
    }

    struct SharedTone(Rc<RefCell<ToneState>>);

    impl ToneSink for SharedTone {
        fn start(&mut self, _freq_hz: f32) {
            let mut state = self.0.borrow_mut();
            state.active = true;
            state.starts += 1;
        }
        fn stop(&mut self) {
            let mut state = self.0.borrow_mut();
            state.active = false;
            state.stops += 1;
        }
    }

    fn fast_tuning() -> Tuning {
        Tuning {
            fail_settle_ms: 10,
            advance_settle_ms: 5,
            retry_delay_ms: (5, 5),
            progress_steps: 4,
            progress_target_kb: 16,
            tone_hz: 440.0,
        }
    }

    fn build(
        defs: Vec<BootEventDef>,
        tuning: Tuning,
        seed: u64,
    ) -> (Sequencer, Rc<RefCell<ToneState>>, Rc<Cell<u32>>) {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        let script = BootScript::from_defs(defs, &mut rng);
        let tone = Rc::new(RefCell::new(ToneState::default()));
        let mut sequencer =
            Sequencer::with_seed(script, tuning, Box::new(SharedTone(tone.clone())), seed);
        let completions = Rc::new(Cell::new(0));
        let counter = completions.clone();
        sequencer.set_on_complete(move || counter.set(counter.get() + 1));
        (sequencer, tone, completions)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn two_reliable_lines_resolve_in_order_and_complete_once() {
        let defs = vec![
            BootEventDef::normal("A", (10, 10), 0.0),
            BootEventDef::normal("B", (10, 10), 0.0),
        ];
        let (mut seq, _tone, completions) = build(defs, fast_tuning(), 1);
        seq.start();
        assert!(seq.lines().is_empty());

        // A appears after its nominal delay and resolves immediately.
        seq.advance(ms(10));
        assert_eq!(seq.lines().len(), 1);
        assert_eq!(seq.lines()[0].text, "A");
        assert_eq!(seq.lines()[0].status, LineStatus::Ok);
        assert_eq!(seq.lines()[0].retry_count, 0);

        // B must not exist until the cursor has advanced past A.
        seq.advance(ms(4));
        assert_eq!(seq.lines().len(), 1);
        seq.advance(ms(1));
        assert_eq!(seq.cursor(), 1);

        seq.advance(ms(10));
        assert_eq!(seq.lines().len(), 2);
        assert_eq!(seq.lines()[1].status, LineStatus::Ok);

        assert_eq!(completions.get(), 0);
        seq.advance(ms(5));
        assert!(seq.is_complete());
        assert_eq!(completions.get(), 1);

        seq.advance(ms(10_000));
        assert_eq!(completions.get(), 1);
    }

    #[test]
    fn zero_fail_chance_line_never_fails() {
        let defs = vec![BootEventDef::normal("solid", (10, 10), 0.0)];
        let (mut seq, _tone, _done) = build(defs, fast_tuning(), 2);
        seq.start();
        seq.advance(ms(10));
        assert_eq!(seq.lines()[0].status, LineStatus::Ok);
        assert_eq!(seq.lines()[0].retry_count, 0);
    }

    #[test]
    fn certain_failure_retries_forever_without_resolving() {
        let defs = vec![BootEventDef::normal("doomed", (10, 10), 1.0)];
        let (mut seq, _tone, completions) = build(defs, fast_tuning(), 3);
        seq.start();
        seq.advance(ms(10));
        assert_eq!(seq.lines()[0].status, LineStatus::Fail);
        assert_eq!(seq.lines()[0].retry_count, 1);

        // One full fail/retry cycle is fail_settle (10) + retry wait (5).
        for expected in 2..=200u32 {
            seq.advance(ms(15));
            let line = &seq.lines()[0];
            assert_ne!(line.status, LineStatus::Ok);
            assert_eq!(line.retry_count, expected);
        }
        assert_eq!(seq.lines().len(), 1);
        assert_eq!(seq.cursor(), 0);
        assert_eq!(completions.get(), 0);
    }

    #[test]
    fn retry_count_matches_observed_fail_transitions() {
        let defs = vec![BootEventDef::normal("flaky", (10, 10), 0.5)];
        let (mut seq, _tone, _done) = build(defs, fast_tuning(), 7);
        seq.start();

        let mut observed_fails = 0u32;
        let mut prev = None;
        for _ in 0..10_000 {
            seq.advance(ms(1));
            let status = seq.lines().first().map(|l| l.status);
            if status == Some(LineStatus::Fail) && prev != Some(LineStatus::Fail) {
                observed_fails += 1;
            }
            prev = status;
            if status == Some(LineStatus::Ok) {
                break;
            }
        }
        let line = &seq.lines()[0];
        assert_eq!(line.status, LineStatus::Ok);
        assert_eq!(line.retry_count, observed_fails);
    }

    #[test]
    fn retry_count_survives_the_final_ok() {
        // Scan seeds for a run that fails at least once before resolving,
        // then assert the accumulated count is preserved through the OK.
        for seed in 0..100 {
            let defs = vec![BootEventDef::normal("flaky", (10, 10), 0.5)];
            let (mut seq, _tone, _done) = build(defs, fast_tuning(), seed);
            seq.start();
            for _ in 0..10_000 {
                seq.advance(ms(1));
                if seq.lines().first().map(|l| l.status) == Some(LineStatus::Ok) {
                    break;
                }
            }
            let line = &seq.lines()[0];
            assert_eq!(line.status, LineStatus::Ok);
            if line.retry_count > 0 {
                return;
            }
        }
        panic!("no seed in 0..100 produced a failed attempt at p = 0.5");
    }

    #[test]
    fn progress_animation_counts_up_to_exact_target() {
        let defs = vec![BootEventDef::progress("Memory Test: 16K", (40, 40))];
        let (mut seq, tone, completions) = build(defs, fast_tuning(), 4);
        seq.start();

        // First frame is synchronous with dispatch.
        assert_eq!(seq.lines().len(), 1);
        assert_eq!(seq.lines()[0].text, "Memory Test: 4K");
        assert_eq!(seq.lines()[0].status, LineStatus::Testing);
        assert!(tone.borrow().active);

        let mut frames = vec![seq.lines()[0].text.clone()];
        for _ in 0..3 {
            seq.advance(ms(10));
            assert_eq!(seq.lines()[0].status, LineStatus::Testing);
            assert!(tone.borrow().active);
            frames.push(seq.lines()[0].text.clone());
        }
        assert_eq!(
            frames,
            vec![
                "Memory Test: 4K",
                "Memory Test: 8K",
                "Memory Test: 12K",
                "Memory Test: 16K",
            ]
        );

        // The frame past the last step forces the exact target and stops the tone.
        seq.advance(ms(10));
        assert_eq!(seq.lines()[0].text, "Memory Test: 16K");
        assert_eq!(seq.lines()[0].status, LineStatus::Ok);
        assert!(!tone.borrow().active);
        assert_eq!(tone.borrow().starts, 1);
        assert_eq!(tone.borrow().stops, 1);

        seq.advance(ms(5));
        assert_eq!(completions.get(), 1);
    }

    #[test]
    fn progress_counter_is_non_decreasing_with_default_step_count() {
        let mut tuning = fast_tuning();
        tuning.progress_steps = 100;
        tuning.progress_target_kb = 16384;
        let defs = vec![BootEventDef::progress("Memory Test: 16384K", (100, 100))];
        let (mut seq, tone, _done) = build(defs, tuning, 5);
        seq.start();

        let mut values = Vec::new();
        let mut testing_frames = 0u32;
        let mut last_revision = 0;
        for _ in 0..200 {
            if seq.revision() != last_revision {
                last_revision = seq.revision();
                let line = &seq.lines()[0];
                let kb: u32 = line
                    .text
                    .trim_start_matches("Memory Test: ")
                    .trim_end_matches('K')
                    .parse()
                    .unwrap();
                values.push(kb);
                if line.status == LineStatus::Testing {
                    testing_frames += 1;
                }
            }
            if seq.lines()[0].status == LineStatus::Ok {
                break;
            }
            seq.advance(ms(1));
        }
        assert_eq!(testing_frames, 100);
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*values.last().unwrap(), 16384);
        assert!(!tone.borrow().active);
    }

    #[test]
    fn progress_line_hands_off_to_the_next_normal_line() {
        let defs = vec![
            BootEventDef::progress("Memory Test: 16K", (40, 40)),
            BootEventDef::normal("after", (10, 10), 0.0),
        ];
        let (mut seq, _tone, completions) = build(defs, fast_tuning(), 6);
        seq.start();
        // 4 intermediate frames + completion frame + settle + delay + settle.
        seq.advance(ms(40 + 5 + 10 + 5));
        assert_eq!(seq.lines().len(), 2);
        assert_eq!(seq.lines()[1].text, "after");
        assert_eq!(seq.lines()[1].status, LineStatus::Ok);
        assert_eq!(completions.get(), 1);
    }

    #[test]
    fn lines_append_strictly_in_script_order() {
        let defs = vec![
            BootEventDef::normal("one", (10, 10), 0.0),
            BootEventDef::normal("two", (10, 10), 0.0),
            BootEventDef::normal("three", (10, 10), 0.0),
        ];
        let (mut seq, _tone, _done) = build(defs, fast_tuning(), 8);
        seq.start();
        let mut max_seen = 0usize;
        for _ in 0..100 {
            seq.advance(ms(1));
            if let Some(last) = seq.lines().last() {
                // A new line may only appear once every earlier one is OK.
                if last.index > max_seen {
                    assert!(seq.lines()[..last.index]
                        .iter()
                        .all(|l| l.status == LineStatus::Ok));
                    max_seen = last.index;
                }
            }
        }
        assert_eq!(seq.lines().len(), 3);
    }

    #[test]
    fn completion_fires_exactly_once_for_empty_script() {
        let (mut seq, _tone, completions) = build(Vec::new(), fast_tuning(), 9);
        seq.start();
        assert!(seq.is_complete());
        assert_eq!(completions.get(), 1);
        seq.advance(ms(1000));
        assert_eq!(completions.get(), 1);
    }

    #[test]
    fn teardown_cancels_all_pending_timers() {
        let defs: Vec<_> = (0..10)
            .map(|i| BootEventDef::normal(format!("line {i}"), (10, 10), 0.0))
            .collect();
        let (mut seq, _tone, completions) = build(defs, fast_tuning(), 10);
        seq.start();
        // 10 ms delay + 5 ms settle per line: resolve three of them.
        seq.advance(ms(45));
        assert_eq!(seq.lines().len(), 3);

        seq.teardown();
        let revision = seq.revision();
        seq.advance(ms(60_000));
        assert_eq!(seq.revision(), revision);
        assert_eq!(seq.lines().len(), 3);
        assert_eq!(completions.get(), 0);
    }

    #[test]
    fn teardown_during_progress_animation_releases_the_tone() {
        let defs = vec![BootEventDef::progress("Memory Test: 16K", (40, 40))];
        let (mut seq, tone, _done) = build(defs, fast_tuning(), 12);
        seq.start();
        seq.advance(ms(10));
        assert!(tone.borrow().active);

        seq.teardown();
        assert!(!tone.borrow().active);
        assert_eq!(tone.borrow().stops, 1);
        seq.advance(ms(1000));
        assert_eq!(seq.lines()[0].status, LineStatus::Testing);
    }

    #[test]
    fn teardown_is_idempotent() {
        let defs = vec![BootEventDef::normal("x", (10, 10), 0.0)];
        let (mut seq, _tone, _done) = build(defs, fast_tuning(), 13);
        seq.start();
        seq.teardown();
        seq.teardown();
        assert_eq!(seq.lines().len(), 0);
    }

    #[test]
    fn same_seed_replays_the_same_run() {
        let defs = || {
            vec![
                BootEventDef::normal("a", (10, 20), 0.3),
                BootEventDef::normal("b", (10, 20), 0.3),
            ]
        };
        let (mut left, _t1, _d1) = build(defs(), fast_tuning(), 77);
        let (mut right, _t2, _d2) = build(defs(), fast_tuning(), 77);
        left.start();
        right.start();
        for _ in 0..500 {
            left.advance(ms(1));
            right.advance(ms(1));
            assert_eq!(left.revision(), right.revision());
            assert_eq!(left.lines().len(), right.lines().len());
            for (l, r) in left.lines().iter().zip(right.lines()) {
                assert_eq!(l.status, r.status);
                assert_eq!(l.retry_count, r.retry_count);
            }
        }
    }
}
