/// Fire-and-forget speech output.
///
/// Implementors must return immediately; synthesis happens in the background
/// and failures are never reported back to the caller.
pub trait SpeechOutput: Send + Sync {
    fn speak(&self, text: &str);
}

/// Speech output that discards everything. Used when synthesis is unavailable.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSpeech;

impl SpeechOutput for SilentSpeech {
    fn speak(&self, _text: &str) {}
}
