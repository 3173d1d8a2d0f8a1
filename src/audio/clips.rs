use super::AudioError;
use std::path::{Component, Path, PathBuf};

/// Maps clip identifiers such as `menu/main_menu` onto files in the audio directory.
#[derive(Debug, Clone)]
pub struct ClipLibrary {
    root: PathBuf,
}

impl ClipLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find the file for `clip`.
    ///
    /// Clips may be named with or without an extension. Names without one, or
    /// ending in `.mp3`, also match a `.wav` file of the same stem, since the
    /// player only decodes WAV.
    pub fn resolve(&self, clip: &str) -> Result<PathBuf, AudioError> {
        let relative = Path::new(clip);
        let escapes = relative
            .components()
            .any(|part| !matches!(part, Component::Normal(_) | Component::CurDir));
        if clip.trim().is_empty() || escapes {
            return Err(AudioError::OutsideLibrary(clip.to_string()));
        }

        let direct = self.root.join(relative);
        let mut candidates = vec![direct.clone()];
        match relative.extension().and_then(|ext| ext.to_str()) {
            None => candidates.push(direct.with_extension("wav")),
            Some(ext) if ext.eq_ignore_ascii_case("mp3") => {
                candidates.push(direct.with_extension("wav"))
            }
            Some(_) => {}
        }

        candidates
            .into_iter()
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| AudioError::ClipNotFound {
                clip: clip.to_string(),
                root: self.root.clone(),
            })
    }
}
