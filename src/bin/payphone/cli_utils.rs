use anyhow::Result;
use payphone::registry::SystemRegistry;

/// Parse a comma separated device list, dropping blanks.
fn parse_device_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

pub(crate) fn list_output_devices() -> Result<()> {
    // PAYPHONE_TEST_DEVICES stands in for the host when set.
    let devices = match std::env::var("PAYPHONE_TEST_DEVICES") {
        Ok(raw) => parse_device_list(&raw),
        Err(_) => detect_output_devices(),
    };

    if devices.is_empty() {
        println!("No audio output devices detected.");
    } else {
        println!("Available audio output devices:");
        for name in devices {
            println!("  - {name}");
        }
    }
    Ok(())
}

#[cfg(feature = "native-audio")]
fn detect_output_devices() -> Vec<String> {
    payphone::audio::CpalPlayer::list_devices().unwrap_or_else(|err| {
        eprintln!("Failed to list audio output devices: {err}");
        Vec::new()
    })
}

#[cfg(not(feature = "native-audio"))]
fn detect_output_devices() -> Vec<String> {
    eprintln!("Failed to list audio output devices: built without native-audio");
    Vec::new()
}

pub(crate) fn print_systems(registry: &SystemRegistry) {
    if registry.is_empty() {
        println!("No phone systems discovered.");
    } else {
        println!("Available phone systems:");
        for system in registry.records() {
            let meta = system.metadata();
            println!(
                "  - {} ({} v{}) [{}]",
                system.id(),
                meta.display_name,
                meta.version,
                system.source()
            );
        }
    }
    for failure in registry.failures() {
        println!("  ! {}: {}", failure.location, failure.error);
    }
}
