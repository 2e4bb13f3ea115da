//! Terminal tone backends.

use std::io::Write;

use akiba_core::{NullTone, ToneSink};

/// Emits the terminal bell when the tone starts.
///
/// Terminals cannot hold a pitched tone, so the bell marks the start of the
/// memory test and the stop is silent.
pub struct BellTone;

impl ToneSink for BellTone {
    fn start(&mut self, freq_hz: f32) {
        tracing::debug!(freq_hz, "tone start");
        let mut out = std::io::stdout();
        let _ = out.write_all(b"\x07");
        let _ = out.flush();
    }

    fn stop(&mut self) {
        tracing::debug!("tone stop");
    }
}

/// Pick a tone backend from the effective audio setting.
pub fn make_tone(audio_enabled: bool) -> Box<dyn ToneSink> {
    if audio_enabled {
        Box::new(BellTone)
    } else {
        Box::new(NullTone)
    }
}
