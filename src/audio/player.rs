//! Prompt playback through CPAL.
//!
//! The output stream lives on a dedicated thread (CPAL streams are not
//! `Send`). The engine side only resolves the clip path and sends a
//! command; decoding and resampling happen on the audio thread, which
//! feeds a shared queue drained sample by sample by the stream callback.

use super::resample::{downmix_to_mono, resample_linear};
use super::{AudioError, AudioPort, ClipLibrary};
use crate::lock_or_recover;
use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use tracing::{debug, warn};

#[derive(Default)]
struct PlaybackQueue {
    clips: VecDeque<Vec<f32>>,
    cursor: usize,
}

impl PlaybackQueue {
    fn next_sample(&mut self) -> f32 {
        while let Some(current) = self.clips.front() {
            if let Some(sample) = current.get(self.cursor) {
                self.cursor += 1;
                return *sample;
            }
            self.clips.pop_front();
            self.cursor = 0;
        }
        0.0
    }

    fn replace(&mut self, samples: Vec<f32>) {
        self.clear();
        self.clips.push_back(samples);
    }

    fn clear(&mut self) {
        self.clips.clear();
        self.cursor = 0;
    }
}

/// Work handed to the audio thread, applied in send order.
#[derive(Debug)]
enum PlayerCommand {
    Play(PathBuf),
    Enqueue(PathBuf),
    Stop,
}

/// Plays WAV prompts on an output device.
pub struct CpalPlayer {
    library: ClipLibrary,
    commands: Sender<PlayerCommand>,
    device_name: String,
}

impl CpalPlayer {
    /// List output device names for `--output-device`.
    pub fn list_devices() -> Result<Vec<String>> {
        let host = cpal::default_host();
        let devices = host
            .output_devices()
            .context("no output devices available")?;
        Ok(devices.filter_map(|device| device.name().ok()).collect())
    }

    /// Open the preferred (or default) output device and start a silent stream.
    pub fn new(library: ClipLibrary, preferred_device: Option<&str>) -> Result<Self> {
        let (ready_tx, ready_rx) = bounded::<Result<String>>(1);
        let (command_tx, command_rx) = unbounded::<PlayerCommand>();
        let preferred = preferred_device.map(str::to_string);

        thread::spawn(move || {
            let queue = Arc::new(Mutex::new(PlaybackQueue::default()));
            let (stream, rate) = match open_stream(preferred.as_deref(), Arc::clone(&queue)) {
                Ok((stream, rate, name)) => {
                    debug!(device = %name, rate, "audio output ready");
                    let _ = ready_tx.send(Ok(name));
                    (stream, rate)
                }
                Err(err) => {
                    let _ = ready_tx.send(Err(err));
                    return;
                }
            };
            // Runs until the player (the only sender) is dropped.
            run_commands(&command_rx, &queue, rate);
            drop(stream);
        });

        let device_name = ready_rx
            .recv()
            .map_err(|_| anyhow!("audio output thread exited during start-up"))??;
        Ok(Self {
            library,
            commands: command_tx,
            device_name,
        })
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    fn send(&self, command: PlayerCommand) -> Result<(), AudioError> {
        self.commands
            .send(command)
            .map_err(|_| AudioError::OutputClosed)
    }
}

impl AudioPort for CpalPlayer {
    fn play(&self, clip: &str) -> Result<(), AudioError> {
        let path = self.library.resolve(clip)?;
        self.send(PlayerCommand::Play(path))
    }

    fn enqueue(&self, clip: &str) -> Result<(), AudioError> {
        let path = self.library.resolve(clip)?;
        self.send(PlayerCommand::Enqueue(path))
    }

    fn stop(&self) {
        if self.send(PlayerCommand::Stop).is_err() {
            warn!("audio output thread has stopped");
        }
    }
}

fn run_commands(commands: &Receiver<PlayerCommand>, queue: &Mutex<PlaybackQueue>, rate: u32) {
    for command in commands.iter() {
        apply_command(queue, command, rate);
    }
    debug!("audio command channel closed");
}

fn apply_command(queue: &Mutex<PlaybackQueue>, command: PlayerCommand, rate: u32) {
    let (path, replace) = match command {
        PlayerCommand::Stop => {
            lock_or_recover(queue, "playback queue").clear();
            return;
        }
        PlayerCommand::Play(path) => (path, true),
        PlayerCommand::Enqueue(path) => (path, false),
    };
    // Decode outside the lock so the stream callback never waits on it.
    let samples = match decode_wav(&path, rate) {
        Ok(samples) => samples,
        Err(err) => {
            warn!(error = %err, "prompt could not be decoded");
            if replace {
                lock_or_recover(queue, "playback queue").clear();
            }
            return;
        }
    };
    let mut queue = lock_or_recover(queue, "playback queue");
    if replace {
        queue.replace(samples);
    } else {
        queue.clips.push_back(samples);
    }
}

fn open_stream(
    preferred_device: Option<&str>,
    queue: Arc<Mutex<PlaybackQueue>>,
) -> Result<(cpal::Stream, u32, String)> {
    let host = cpal::default_host();
    let device = match preferred_device {
        Some(name) => {
            let mut devices = host
                .output_devices()
                .context("no output devices available")?;
            devices
                .find(|d| d.name().map(|n| n == name).unwrap_or(false))
                .ok_or_else(|| anyhow!("output device '{name}' not found"))?
        }
        None => host
            .default_output_device()
            .context("no default output device available")?,
    };
    let name = device
        .name()
        .unwrap_or_else(|_| "unknown output device".to_string());
    let default_config = device.default_output_config()?;
    let format = default_config.sample_format();
    let config: StreamConfig = default_config.into();
    let rate = config.sample_rate.0;
    let channels = usize::from(config.channels.max(1));

    let err_fn = |err| warn!(error = %err, "audio output stream error");

    let stream = match format {
        SampleFormat::F32 => device.build_output_stream(
            &config,
            move |data: &mut [f32], _| {
                fill_frames(data, channels, &queue, |sample| sample);
            },
            err_fn,
            None,
        )?,
        SampleFormat::I16 => device.build_output_stream(
            &config,
            move |data: &mut [i16], _| {
                fill_frames(data, channels, &queue, |sample| {
                    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
                });
            },
            err_fn,
            None,
        )?,
        SampleFormat::U16 => device.build_output_stream(
            &config,
            move |data: &mut [u16], _| {
                fill_frames(data, channels, &queue, |sample| {
                    ((sample.clamp(-1.0, 1.0) * 0.5 + 0.5) * u16::MAX as f32) as u16
                });
            },
            err_fn,
            None,
        )?,
        other => return Err(anyhow!("unsupported sample format: {other:?}")),
    };
    stream.play()?;
    Ok((stream, rate, name))
}

fn fill_frames<T, F>(data: &mut [T], channels: usize, queue: &Mutex<PlaybackQueue>, convert: F)
where
    T: Copy,
    F: Fn(f32) -> T,
{
    let mut queue = lock_or_recover(queue, "playback queue");
    for frame in data.chunks_mut(channels) {
        let value = convert(queue.next_sample());
        for slot in frame.iter_mut() {
            *slot = value;
        }
    }
}

/// Decode a WAV file to mono f32 at `target_rate`.
fn decode_wav(path: &Path, target_rate: u32) -> Result<Vec<f32>, AudioError> {
    let decode_err = |message: String| AudioError::Decode {
        path: path.to_path_buf(),
        message,
    };
    let mut reader = hound::WavReader::open(path).map_err(|err| decode_err(err.to_string()))?;
    let spec = reader.spec();
    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|err| decode_err(err.to_string()))?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.clamp(1, 32) - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|sample| sample.map(|value| value as f32 / scale))
                .collect::<Result<_, _>>()
                .map_err(|err| decode_err(err.to_string()))?
        }
    };
    let mono = downmix_to_mono(&interleaved, usize::from(spec.channels));
    if spec.sample_rate == 0 {
        return Err(decode_err("sample rate is zero".to_string()));
    }
    Ok(resample_linear(
        &mono,
        target_rate as f32 / spec.sample_rate as f32,
    ))
}
