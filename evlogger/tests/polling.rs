//! Change detection through the controller.

mod common;

use common::{ScriptedInput, TickingClock, boot, get};
use evlogger::{Health, InputSource, InterruptLatch, LatchedInput, Logger, LoggerConfig};
use evlogger_store::MemoryStore;

#[tokio::test]
async fn test_settled_edge_logged_once() {
    let mut logger = boot(LoggerConfig::new(), ScriptedInput::bank0(&[0, 1, 1, 1, 1])).await;
    let mut logged = 0;
    for _ in 0..5 {
        logged += logger.poll_inputs().await.logged;
    }
    assert_eq!(logged, 1);

    let (_, body) = get(&mut logger, "/log").await;
    assert!(body.trim_end().ends_with("b0c0  ON"));
}

#[tokio::test]
async fn test_bounce_logs_nothing() {
    let mut logger = boot(LoggerConfig::new(), ScriptedInput::bank0(&[0, 1, 0, 1, 0])).await;
    for _ in 0..5 {
        assert_eq!(logger.poll_inputs().await.logged, 0);
    }
    assert_eq!(logger.stats().events_logged, 0);
}

#[tokio::test]
async fn test_append_failure_does_not_block_other_lines() {
    let mut logger = boot(LoggerConfig::new(), ScriptedInput::bank0(&[0, 0b11, 0b11])).await;
    logger.poll_inputs().await;
    logger.poll_inputs().await;

    logger.data_store().set_fail_writes(true);
    let report = logger.poll_inputs().await;
    assert_eq!(report.failed, 2);
    assert_eq!(report.logged, 0);
    assert_eq!(logger.health(), Health::StorageFault);

    // The loop keeps going and the lines stay confirmed
    logger.data_store().set_fail_writes(false);
    assert_eq!(logger.poll_inputs().await.logged, 0);
    assert_eq!(logger.detector().confirmed(0), Some(0b11));
}

#[tokio::test]
async fn test_events_survive_reboot() {
    let mut logger = boot(LoggerConfig::new(), ScriptedInput::bank0(&[0, 4, 4, 0, 0])).await;
    for _ in 0..5 {
        logger.poll_inputs().await;
    }
    assert_eq!(logger.stats().events_logged, 2);

    let (header_store, data_store, clock, _) = logger.into_parts();
    let mut rebooted = Logger::new(
        LoggerConfig::new(),
        header_store,
        data_store,
        clock,
        ScriptedInput::default(),
    );
    rebooted.boot().await;
    assert_eq!(rebooted.event_log().len(rebooted.header()), 2);

    let (_, body) = get(&mut rebooted, "/log").await;
    let lines: Vec<&str> = body.lines().collect();
    assert!(lines[0].ends_with("b0c2 OFF"));
    assert!(lines[1].ends_with("b0c2  ON"));
}

#[tokio::test]
async fn test_interrupt_fed_input() {
    static LATCH: InterruptLatch<2> = InterruptLatch::new();

    let mut logger = Logger::new(
        LoggerConfig::new(),
        MemoryStore::new(0x1_0000),
        MemoryStore::new(0x1_0000),
        TickingClock::new(),
        LatchedInput::new(&LATCH),
    );
    logger.boot().await;

    // Nothing published: nothing sampled
    assert!(!logger.poll_inputs().await.sampled);

    // Prime both banks
    LATCH.publish(0, 0);
    assert!(logger.poll_inputs().await.sampled);

    // One interrupt; the detector keeps sampling until the change settles
    LATCH.publish(1, 0x0100);
    assert_eq!(logger.poll_inputs().await.logged, 0);
    let report = logger.poll_inputs().await;
    assert!(report.sampled);
    assert_eq!(report.logged, 1);

    // Quiet again
    assert!(!logger.poll_inputs().await.sampled);
    assert!(!logger.inputs().pending());
    assert_eq!(logger.detector().confirmed(1), Some(0x0100));
    assert_eq!(logger.event_log().len(logger.header()), 1);
}
