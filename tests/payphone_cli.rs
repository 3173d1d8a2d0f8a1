use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

fn combined_output(output: &std::process::Output) -> String {
    let mut combined = String::new();
    combined.push_str(&String::from_utf8_lossy(&output.stdout));
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    combined
}

fn payphone_bin() -> &'static str {
    option_env!("CARGO_BIN_EXE_payphone").expect("payphone test binary not built")
}

fn payphone_in(dir: &Path) -> Command {
    let mut command = Command::new(payphone_bin());
    command
        .current_dir(dir)
        .env_remove("PAYPHONE_CONFIG")
        .env_remove("PAYPHONE_LEGACY_MODE")
        .env_remove("AUDIO_DIR")
        .args(["--no-audio", "--no-logs"]);
    command
}

#[test]
fn payphone_help_mentions_name() {
    let output = Command::new(payphone_bin())
        .arg("--help")
        .output()
        .expect("run payphone --help");
    assert!(output.status.success());
    let combined = combined_output(&output);
    assert!(combined.contains("payphone"));
    assert!(combined.contains("--list-systems"));
}

#[test]
fn payphone_rejects_out_of_range_timeout() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = payphone_in(dir.path())
        .args(["--menu-timeout-secs", "0"])
        .output()
        .expect("run payphone");
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("--menu-timeout-secs"));
}

#[test]
fn payphone_list_systems_prints_builtins() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = payphone_in(dir.path())
        .arg("--list-systems")
        .output()
        .expect("run payphone --list-systems");
    assert!(output.status.success());
    let combined = combined_output(&output);
    assert!(combined.contains("information_booth"));
    assert!(combined.contains("directory"));
    assert!(dir.path().join(".bios_config.json").exists());
}

#[test]
fn payphone_list_output_devices_uses_override() {
    let output = Command::new(payphone_bin())
        .args(["--no-logs", "--list-output-devices"])
        .env("PAYPHONE_TEST_DEVICES", "Handset Speaker")
        .output()
        .expect("run payphone --list-output-devices");
    assert!(output.status.success());
    assert!(combined_output(&output).contains("Handset Speaker"));
}

#[test]
fn payphone_unknown_legacy_system_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = payphone_in(dir.path())
        .args(["--system", "no_such_system"])
        .stdin(Stdio::null())
        .output()
        .expect("run payphone --system");
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("no_such_system"));
}

#[test]
fn payphone_bios_selection_is_persisted() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut child = payphone_in(dir.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn payphone");
    let mut stdin = child.stdin.take().expect("child stdin");
    // Separate writes so no key shares a batch with the hang-up.
    for line in ["HOOK:OFF", "KEY:1", "KEY:1", "HOOK:ON"] {
        writeln!(stdin, "{line}").expect("write event");
        stdin.flush().expect("flush events");
        thread::sleep(Duration::from_millis(150));
    }
    drop(stdin);

    let output = child.wait_with_output().expect("wait for payphone");
    assert!(output.status.success(), "{}", combined_output(&output));
    let stored = fs::read_to_string(dir.path().join(".bios_config.json")).expect("config written");
    let stored: serde_json::Value = serde_json::from_str(&stored).expect("config is JSON");
    assert_eq!(stored["last_system_id"], "information_booth");
}
