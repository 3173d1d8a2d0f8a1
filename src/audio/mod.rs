//! Prompt playback.
//!
//! The engine only ever talks to [`AudioPort`]: play a named clip, queue one
//! behind it, or stop. Clip names are resolved to WAV files under the audio
//! directory by [`ClipLibrary`]. With the `native-audio` feature the
//! [`CpalPlayer`] renders them on the default output device; otherwise (or
//! with `--no-audio`) [`LogOnlyAudio`] validates clips and logs what would
//! have played.

mod clips;
mod log_only;
#[cfg(feature = "native-audio")]
mod player;
#[cfg(any(feature = "native-audio", test))]
mod resample;

pub use clips::ClipLibrary;
pub use log_only::LogOnlyAudio;
#[cfg(feature = "native-audio")]
pub use player::CpalPlayer;

use std::path::PathBuf;

/// Clip played when the handset is lifted.
pub const DIAL_TONE_CLIP: &str = "prompts/dial_tone";

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("audio clip '{clip}' not found under {}", .root.display())]
    ClipNotFound { clip: String, root: PathBuf },

    #[error("audio clip '{0}' points outside the audio directory")]
    OutsideLibrary(String),

    #[error("failed to decode '{}': {message}", .path.display())]
    Decode { path: PathBuf, message: String },

    #[error("audio output thread has stopped")]
    OutputClosed,
}

/// Output side of the appliance.
///
/// Calls are fire-and-forget: `play` returns as soon as playback has been
/// scheduled. A missing clip is reported through the `Result` and never
/// interrupts navigation.
pub trait AudioPort: Send + Sync {
    /// Stop whatever is playing and start `clip`.
    fn play(&self, clip: &str) -> Result<(), AudioError>;

    /// Play `clip` after the currently scheduled audio.
    fn enqueue(&self, clip: &str) -> Result<(), AudioError> {
        self.play(clip)
    }

    /// Silence output and drop anything queued.
    fn stop(&self);
}
