//! Audio tone seam.
//!
//! The sequencer only ever asks for "start tone" / "stop tone"; how that
//! becomes sound is up to the embedding application. [`NullTone`] is the
//! headless backend used by tests and `--no-audio` runs.

/// Abstract audio output capability for the memory-test tone.
pub trait ToneSink {
    /// Begin emitting a continuous tone at the given pitch.
    fn start(&mut self, freq_hz: f32);
    /// Stop the tone.
    fn stop(&mut self);
}

/// A no-op tone sink.
///
/// Makes no sound, costs nothing.
pub struct NullTone;

impl ToneSink for NullTone {
    fn start(&mut self, _freq_hz: f32) {}
    fn stop(&mut self) {}
}

/// Singleton guard around a [`ToneSink`].
///
/// At most one tone may be live at a time. Starting while one is active is
/// a contract violation: it asserts in debug builds and is ignored (with a
/// warning) in release builds. The tone is always released on [`stop`],
/// on drop, and on sequencer teardown, so a running tone can never outlive
/// the animation that started it.
///
/// [`stop`]: ToneHandle::stop
pub(crate) struct ToneHandle {
    sink: Box<dyn ToneSink>,
    active: bool,
}

impl ToneHandle {
    pub(crate) fn new(sink: Box<dyn ToneSink>) -> Self {
        Self {
            sink,
            active: false,
        }
    }

    pub(crate) fn start(&mut self, freq_hz: f32) {
        debug_assert!(!self.active, "tone started while already active");
        if self.active {
            tracing::warn!("duplicate tone start ignored");
            return;
        }
        self.sink.start(freq_hz);
        self.active = true;
    }

    pub(crate) fn stop(&mut self) {
        if self.active {
            self.sink.stop();
            self.active = false;
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }
}

impl Drop for ToneHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
