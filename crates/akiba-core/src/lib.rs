//! Akiba boot sequencer.
//!
//! Drives the simulated boot log: an ordered script of boot events is
//! resolved one line at a time, each after a randomized delay, with
//! probabilistic fail/retry transitions, one progress-animated memory
//! test with a synchronized tone, and an independent cursor blink.
//!
//! The crate is headless: time is virtual and advanced by the caller
//! through [`Sequencer::advance`], rendering is a pure projection via
//! [`present::frame`], and audio goes through the [`ToneSink`] seam.

pub mod blink;
pub mod line;
pub mod present;
pub mod script;
pub mod sequencer;
pub mod timing;
pub mod tone;

pub use blink::CursorBlink;
pub use line::{DisplayedLine, LineStatus};
pub use present::{frame, Frame, RenderedLine};
pub use script::{BootEventDef, BootScript, LineKind, ScriptedEvent};
pub use sequencer::{Sequencer, Tuning};
pub use tone::{NullTone, ToneSink};
