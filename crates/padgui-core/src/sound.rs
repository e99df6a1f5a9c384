/// Fire-and-forget audio cues. Playback itself lives outside padgui.
pub trait SoundSink {
    fn play(&mut self, name: &str);
    /// Start background music; `loops < 0` repeats forever.
    fn music(&mut self, name: &str, loops: i32, volume: f32);
}

/// Drops every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSound;

impl SoundSink for NullSound {
    fn play(&mut self, name: &str) {
        log::trace!("sound '{name}' (no audio sink)");
    }

    fn music(&mut self, name: &str, _loops: i32, _volume: f32) {
        log::trace!("music '{name}' (no audio sink)");
    }
}
