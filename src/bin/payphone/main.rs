//! Payphone appliance entrypoint.
//!
//! Reads hook and key events from stdin or a serial device, and drives either
//! the bootloader or (with `--system`) a single phone system directly.
//!
//! # Threads
//!
//! - Input thread: parses event lines and sends them over a channel
//! - Main thread: owns every session and timer; see [`run_event_loop`]
//! - Audio: the cpal output stream renders queued clips on its own callback

mod cli_utils;

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::unbounded;
use payphone::audio::{AudioPort, ClipLibrary, LogOnlyAudio};
use payphone::bootloader::{Appliance, BootloaderController, DirectSystem};
use payphone::config::{AppConfig, ConfigStore};
use payphone::input::spawn_line_reader;
use payphone::registry::SystemRegistry;
use payphone::runtime::{run_event_loop, SystemClock};
use payphone::{systems, telemetry};
use std::fs::File;
use std::io::{self, BufReader};
use std::sync::Arc;
use tracing::{info, warn};

use crate::cli_utils::{list_output_devices, print_systems};

fn main() -> Result<()> {
    let config = AppConfig::parse_args()?;
    telemetry::init_tracing(&config);
    telemetry::install_panic_hook();

    if config.list_output_devices {
        return list_output_devices();
    }

    let store = ConfigStore::new(&config.config);
    let bootloader = store.load();
    let registry = Arc::new(SystemRegistry::discover(
        &bootloader.scan_paths,
        systems::catalog(),
        config.tree_defaults(),
    ));
    for failure in registry.failures() {
        warn!(location = %failure.location, error = %failure.error, "phone system skipped");
    }

    if config.list_systems {
        print_systems(&registry);
        return Ok(());
    }

    let audio = build_audio(&config);
    let mut appliance: Box<dyn Appliance> = match &config.system {
        Some(id) => {
            let system = registry
                .get(id)
                .map_err(|err| anyhow!("--system {id}: {err}"))?;
            info!(system_id = %id, "legacy mode, bootloader bypassed");
            Box::new(DirectSystem::new(
                id.clone(),
                Arc::clone(system.tree()),
                audio,
                config.engine_policy(),
            ))
        }
        None => Box::new(BootloaderController::new(
            Arc::clone(&registry),
            audio,
            store,
            bootloader,
            config.engine_policy(),
            config.key_repeat(),
        )),
    };

    let (tx, rx) = unbounded();
    let reader = if config.reads_stdin() {
        spawn_line_reader(BufReader::new(io::stdin()), tx)
    } else {
        let file = File::open(&config.input)
            .with_context(|| format!("failed to open event source {}", config.input))?;
        spawn_line_reader(BufReader::new(file), tx)
    };
    info!(
        input = %config.input,
        systems = registry.len(),
        "payphone ready"
    );

    run_event_loop(appliance.as_mut(), &rx, &SystemClock);
    if reader.join().is_err() {
        warn!("event source thread panicked");
    }
    Ok(())
}

fn build_audio(config: &AppConfig) -> Arc<dyn AudioPort> {
    let library = ClipLibrary::new(&config.audio_dir);
    if config.no_audio {
        return Arc::new(LogOnlyAudio::new(library));
    }
    native_audio(library, config.output_device.as_deref())
}

#[cfg(feature = "native-audio")]
fn native_audio(library: ClipLibrary, device: Option<&str>) -> Arc<dyn AudioPort> {
    match payphone::audio::CpalPlayer::new(library.clone(), device) {
        Ok(player) => {
            info!(device = player.device_name(), "audio output ready");
            Arc::new(player)
        }
        Err(err) => {
            warn!(error = %err, "audio output unavailable, logging prompts instead");
            Arc::new(LogOnlyAudio::new(library))
        }
    }
}

#[cfg(not(feature = "native-audio"))]
fn native_audio(library: ClipLibrary, _device: Option<&str>) -> Arc<dyn AudioPort> {
    warn!("built without native-audio, logging prompts instead");
    Arc::new(LogOnlyAudio::new(library))
}
