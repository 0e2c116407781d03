//! End-to-end driver behaviour with in-memory transport and sink

use std::time::Duration;

use telebridge_core::memory::{MemorySink, MemoryTransport, ReadStep, SinkProbe, TransportProbe};
use telebridge_core::{BridgeDriver, DriverConfig, DriverStats, ShutdownSignal, StartupError};

fn quick_config() -> DriverConfig {
    DriverConfig::default()
        .with_idle_backoff(Duration::ZERO)
        .with_error_backoff(Duration::from_millis(1))
}

/// Run a script to completion and return what the sink and transport saw
fn run_script(steps: Vec<ReadStep>) -> (DriverStats, SinkProbe, TransportProbe) {
    let signal = ShutdownSignal::new();
    let transport = MemoryTransport::new(steps).stop_when_exhausted(signal.clone());
    let transport_probe = transport.probe();
    let sink = MemorySink::new(r"Software\Sensors\Custom\Temp0");
    let sink_probe = sink.probe();

    let driver = BridgeDriver::start(
        quick_config(),
        || Ok::<_, String>(transport),
        || Ok::<_, String>(sink),
    )
    .expect("startup");
    let stats = driver.run(&signal);

    (stats, sink_probe, transport_probe)
}

#[test]
fn writes_label_then_distinct_values() {
    let (stats, sink, _) = run_script(vec![ReadStep::data("10\n10\n20\n10\n")]);

    assert_eq!(
        sink.history(),
        vec![
            ("Name".to_string(), "Temperature".to_string()),
            ("Value".to_string(), "10".to_string()),
            ("Value".to_string(), "20".to_string()),
            ("Value".to_string(), "10".to_string()),
        ]
    );
    assert_eq!(stats.pipeline.readings, 4);
    assert_eq!(stats.pipeline.suppressed, 1);
    assert_eq!(stats.pipeline.writes, 3);
}

#[test]
fn identical_line_twice_writes_once() {
    let (_, sink, _) = run_script(vec![ReadStep::data("21.5\n"), ReadStep::data("21.5\n")]);
    assert_eq!(sink.values(), ["21.5"]);
}

#[test]
fn line_split_across_reads() {
    let (stats, sink, _) = run_script(vec![
        ReadStep::data("12"),
        ReadStep::Idle,
        ReadStep::data(".5\n"),
    ]);

    assert_eq!(sink.values(), ["12.5"]);
    assert_eq!(stats.idle_polls, 2); // scripted idle + exhausted script
}

#[test]
fn bad_lines_and_read_errors_do_not_stop_the_loop() {
    let (stats, sink, _) = run_script(vec![
        ReadStep::data("  \n12.5 extra\n"),
        ReadStep::Fail("framing error".into()),
        ReadStep::data("  42  \n-3.14\n"),
    ]);

    assert_eq!(sink.values(), ["42", "-3.14"]);
    assert_eq!(stats.read_errors, 1);
    assert_eq!(stats.pipeline.blank_lines, 1);
    assert_eq!(stats.pipeline.rejected_lines, 1);
}

#[test]
fn write_failure_is_not_retried_for_repeats() {
    let signal = ShutdownSignal::new();
    let transport = MemoryTransport::new(vec![
        ReadStep::data("5\n"),
        ReadStep::data("5\n"),
        ReadStep::data("6\n5\n"),
    ])
    .stop_when_exhausted(signal.clone());
    let sink = MemorySink::new("k");
    let probe = sink.probe();

    let driver = BridgeDriver::start(
        quick_config(),
        || Ok::<_, String>(transport),
        || Ok::<_, String>(sink),
    )
    .unwrap();
    // Name succeeds, the first Value write fails
    probe.fail_next(1);
    let stats = driver.run(&signal);

    assert_eq!(probe.values(), ["6", "5"]);
    assert_eq!(stats.pipeline.write_failures, 1);
    assert_eq!(stats.pipeline.suppressed, 1);
}

#[test]
fn metadata_failure_is_not_fatal() {
    let signal = ShutdownSignal::new();
    let transport =
        MemoryTransport::new(vec![ReadStep::data("1\n")]).stop_when_exhausted(signal.clone());
    let sink = MemorySink::new("k");
    let probe = sink.probe();
    probe.fail_entry("Name");

    let driver = BridgeDriver::start(
        quick_config(),
        || Ok::<_, String>(transport),
        || Ok::<_, String>(sink),
    )
    .unwrap();
    driver.run(&signal);

    assert_eq!(probe.get("Name"), None);
    assert_eq!(probe.values(), ["1"]);
}

#[test]
fn shutdown_during_read_finishes_that_read_and_releases_once() {
    let signal = ShutdownSignal::new();
    let transport = MemoryTransport::new(vec![
        ReadStep::data("1\n"),
        ReadStep::data("2\n"),
        ReadStep::data("3\n"),
    ])
    .stop_during_read(2, signal.clone());
    let transport_probe = transport.probe();
    let sink = MemorySink::new("k");
    let sink_probe = sink.probe();

    let driver = BridgeDriver::start(
        quick_config(),
        || Ok::<_, String>(transport),
        || Ok::<_, String>(sink),
    )
    .unwrap();
    driver.run(&signal);

    // The read in flight when the flag dropped is still processed
    assert_eq!(sink_probe.values(), ["1", "2"]);
    assert_eq!(transport_probe.reads(), 2);
    assert_eq!(transport_probe.drops(), 1);
    assert_eq!(sink_probe.drops(), 1);
}

#[test]
fn already_triggered_signal_skips_the_loop() {
    let signal = ShutdownSignal::new();
    signal.trigger();
    let transport = MemoryTransport::new(vec![ReadStep::data("1\n")]);
    let probe = transport.probe();

    let driver = BridgeDriver::start(
        quick_config(),
        || Ok::<_, String>(transport),
        || Ok::<_, String>(MemorySink::new("k")),
    )
    .unwrap();
    let stats = driver.run(&signal);

    assert_eq!(stats.reads, 0);
    assert_eq!(probe.reads(), 0);
    assert_eq!(probe.drops(), 1);
}

#[test]
fn unopenable_transport_is_fatal_before_any_read() {
    let mut sink_opened = false;

    let result = BridgeDriver::<MemoryTransport, MemorySink>::start(
        quick_config(),
        || Err("COM4: The system cannot find the file specified"),
        || {
            sink_opened = true;
            Ok::<_, String>(MemorySink::new("k"))
        },
    );

    assert_eq!(
        result.unwrap_err(),
        StartupError::Transport("COM4: The system cannot find the file specified".into())
    );
    assert!(!sink_opened);
}

#[test]
fn unopenable_sink_releases_transport() {
    let transport = MemoryTransport::new(vec![ReadStep::data("1\n")]);
    let probe = transport.probe();

    let result = BridgeDriver::<MemoryTransport, MemorySink>::start(
        quick_config(),
        || Ok::<_, String>(transport),
        || Err("access denied"),
    );

    assert!(matches!(result, Err(StartupError::Sink(_))));
    assert_eq!(probe.reads(), 0);
    assert_eq!(probe.drops(), 1);
}

#[test]
fn oversized_garbage_is_dropped_and_stream_recovers() {
    let signal = ShutdownSignal::new();
    let garbage = "x".repeat(64);
    let transport = MemoryTransport::new(vec![
        ReadStep::data(&garbage),
        ReadStep::data(&garbage),
        ReadStep::data("\n7\n"),
    ])
    .stop_when_exhausted(signal.clone());
    let sink = MemorySink::new("k");
    let probe = sink.probe();

    let driver = BridgeDriver::start(
        quick_config().with_max_line_len(Some(32)),
        || Ok::<_, String>(transport),
        || Ok::<_, String>(sink),
    )
    .unwrap();
    let stats = driver.run(&signal);

    assert_eq!(probe.values(), ["7"]);
    assert_eq!(stats.overflowed_lines, 1);
    assert_eq!(stats.pipeline.rejected_lines, 0);
}
