//! Process exit status of the `telebridge` binary

use std::process::{Command, Stdio};

fn telebridge() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_telebridge"));
    cmd.arg("-q").stdout(Stdio::null()).stderr(Stdio::null());
    cmd
}

#[test]
fn missing_replay_file_exits_with_failure() {
    let dir = tempfile::tempdir().unwrap();

    let status = telebridge()
        .arg("--replay")
        .arg(dir.path().join("missing.log"))
        .args(["--store", "file", "--store-path"])
        .arg(dir.path().join("store"))
        .status()
        .unwrap();

    assert!(!status.success());
    assert_eq!(status.code(), Some(1));
    assert!(!dir.path().join("store").exists());
}

#[test]
fn invalid_config_file_exits_with_failure() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("bridge.json");
    std::fs::write(&config, "{ not json").unwrap();

    let status = telebridge().arg("--config").arg(&config).status().unwrap();

    assert_eq!(status.code(), Some(1));
}

#[cfg(unix)]
#[test]
fn sigterm_after_startup_exits_cleanly() {
    use std::fs;
    use std::thread;
    use std::time::{Duration, Instant};

    let dir = tempfile::tempdir().unwrap();
    let capture = dir.path().join("capture.log");
    fs::write(&capture, b"21.5\n").unwrap();
    let store = dir.path().join("store");

    let mut child = telebridge()
        .arg("--replay")
        .arg(&capture)
        .args(["--store", "file", "--store-path"])
        .arg(&store)
        .spawn()
        .unwrap();

    // The value only lands after the signal listeners are in place
    let deadline = Instant::now() + Duration::from_secs(10);
    while fs::read_to_string(store.join("Value")).ok().as_deref() != Some("21.5") {
        assert!(Instant::now() < deadline, "bridge never wrote the value");
        thread::sleep(Duration::from_millis(10));
    }

    let kill = Command::new("kill")
        .args(["-TERM", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(kill.success());

    let deadline = Instant::now() + Duration::from_secs(10);
    let status = loop {
        if let Some(status) = child.try_wait().unwrap() {
            break status;
        }
        if Instant::now() > deadline {
            child.kill().unwrap();
            panic!("bridge did not stop after SIGTERM");
        }
        thread::sleep(Duration::from_millis(10));
    };

    assert_eq!(status.code(), Some(0));
}
