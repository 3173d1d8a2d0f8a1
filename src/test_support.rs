use crate::audio::{AudioError, AudioPort};
use crate::lock_or_recover;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AudioCall {
    Play(String),
    Enqueue(String),
    Stop,
}

/// Audio port that records every call; clips listed as missing fail like absent files.
#[derive(Default)]
pub(crate) struct RecordingAudio {
    calls: Mutex<Vec<AudioCall>>,
    missing: Mutex<HashSet<String>>,
}

impl RecordingAudio {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_missing(clips: &[&str]) -> Self {
        let audio = Self::default();
        lock_or_recover(&audio.missing, "missing clips")
            .extend(clips.iter().map(|clip| clip.to_string()));
        audio
    }

    pub(crate) fn calls(&self) -> Vec<AudioCall> {
        lock_or_recover(&self.calls, "audio calls").clone()
    }

    /// Clips passed to `play` or `enqueue`, in order.
    pub(crate) fn clips(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                AudioCall::Play(clip) | AudioCall::Enqueue(clip) => Some(clip),
                AudioCall::Stop => None,
            })
            .collect()
    }

    pub(crate) fn last_clip(&self) -> Option<String> {
        self.clips().pop()
    }

    pub(crate) fn stop_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, AudioCall::Stop))
            .count()
    }

    pub(crate) fn clear(&self) {
        lock_or_recover(&self.calls, "audio calls").clear();
    }

    fn record(&self, call: AudioCall, clip: &str) -> Result<(), AudioError> {
        lock_or_recover(&self.calls, "audio calls").push(call);
        if lock_or_recover(&self.missing, "missing clips").contains(clip) {
            return Err(AudioError::ClipNotFound {
                clip: clip.to_string(),
                root: PathBuf::from("test-audio"),
            });
        }
        Ok(())
    }
}

impl AudioPort for RecordingAudio {
    fn play(&self, clip: &str) -> Result<(), AudioError> {
        self.record(AudioCall::Play(clip.to_string()), clip)
    }

    fn enqueue(&self, clip: &str) -> Result<(), AudioError> {
        self.record(AudioCall::Enqueue(clip.to_string()), clip)
    }

    fn stop(&self) {
        lock_or_recover(&self.calls, "audio calls").push(AudioCall::Stop);
    }
}
