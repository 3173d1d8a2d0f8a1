use super::{AudioError, AudioPort, ClipLibrary};
use tracing::info;

/// Headless port: checks that clips exist and logs playback instead of rendering it.
#[derive(Debug, Clone)]
pub struct LogOnlyAudio {
    library: Option<ClipLibrary>,
}

impl LogOnlyAudio {
    pub fn new(library: ClipLibrary) -> Self {
        Self {
            library: Some(library),
        }
    }

    /// Accept every clip name without touching the filesystem.
    pub fn unchecked() -> Self {
        Self { library: None }
    }

    fn check(&self, clip: &str) -> Result<(), AudioError> {
        match &self.library {
            Some(library) => library.resolve(clip).map(|_| ()),
            None => Ok(()),
        }
    }
}

impl AudioPort for LogOnlyAudio {
    fn play(&self, clip: &str) -> Result<(), AudioError> {
        self.check(clip)?;
        info!(clip, "play");
        Ok(())
    }

    fn enqueue(&self, clip: &str) -> Result<(), AudioError> {
        self.check(clip)?;
        info!(clip, "enqueue");
        Ok(())
    }

    fn stop(&self) {
        info!("stop audio");
    }
}
