//! End-to-end request handling against in-memory stores.

mod common;

use common::{ScriptedInput, boot, get};
use evlogger::{ChannelId, ChannelName, LineState, LoggerConfig, Status, Transition};

fn event(bank: u8, pin: u8, state: LineState) -> Transition {
    Transition {
        channel: ChannelId::new(bank, pin).unwrap(),
        state,
    }
}

#[tokio::test]
async fn test_empty_log_reports_no_data() {
    let mut logger = boot(LoggerConfig::new(), ScriptedInput::default()).await;
    assert_eq!(
        get(&mut logger, "/").await,
        (Status::Ok, "no data\n".to_string())
    );
    assert_eq!(get(&mut logger, "/dump").await.1, "no data\n");
}

#[tokio::test]
async fn test_log_is_newest_first_and_limited() {
    let config = LoggerConfig::new().with_recent_limit(2);
    let mut logger = boot(config, ScriptedInput::default()).await;
    logger
        .record_event(event(0, 1, LineState::On))
        .await
        .unwrap();
    logger
        .record_event(event(0, 2, LineState::On))
        .await
        .unwrap();
    logger
        .record_event(event(1, 15, LineState::Off))
        .await
        .unwrap();

    let (status, body) = get(&mut logger, "/log").await;
    assert_eq!(status, Status::Ok);
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("b1cf OFF"));
    assert!(lines[1].ends_with("b0c2  ON"));
    assert!(lines.iter().all(|line| line.len() == 64));

    let (_, dump) = get(&mut logger, "/dump").await;
    assert_eq!(dump.lines().count(), 3);
}

#[tokio::test]
async fn test_addr_and_clear() {
    let mut logger = boot(LoggerConfig::new(), ScriptedInput::default()).await;
    for pin in 0..3 {
        logger
            .record_event(event(0, pin, LineState::On))
            .await
            .unwrap();
    }

    let (_, body) = get(&mut logger, "/addr").await;
    assert_eq!(body, "HDER fe80\n00c0 0000\n");

    assert_eq!(
        get(&mut logger, "/clr").await,
        (Status::Ok, "done\n".to_string())
    );
    let (_, body) = get(&mut logger, "/addr").await;
    assert_eq!(body, "HDER fe00\n00c0 00c0\n");
    assert_eq!(get(&mut logger, "/log").await.1, "no data\n");
}

#[tokio::test]
async fn test_time_read_and_set() {
    let mut logger = boot(LoggerConfig::new(), ScriptedInput::default()).await;

    let (status, body) = get(&mut logger, "/time?20250102030405").await;
    assert_eq!(status, Status::Ok);
    // The test clock ticks one second per read
    assert_eq!(body, "time updated\n2025-01-02 03:04:07\n");

    let (_, body) = get(&mut logger, "/time").await;
    assert_eq!(body, "2025-01-02 03:04:08\n");

    let (status, body) = get(&mut logger, "/time?2025-13-02%2003:04:05").await;
    assert_eq!(
        (status, body.as_str()),
        (Status::BadRequest, "bad request\n")
    );
}

#[tokio::test]
async fn test_channel_names() -> anyhow::Result<()> {
    let mut logger = boot(LoggerConfig::new(), ScriptedInput::default()).await;

    let (_, body) = get(&mut logger, "/cnl").await;
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 32);
    assert_eq!(lines[0], format!("b0c0 {:>40}", "b0c0"));
    assert_eq!(lines[31], format!("b1cf {:>40}", "b1cf"));

    let (status, body) = get(&mut logger, "/cnl?b1c3fire%20alarm").await;
    assert_eq!(status, Status::Ok);
    assert!(
        body.lines()
            .any(|line| line == format!("b1c3 {:>40}", "fire alarm"))
    );

    // Renamed channel labels new events
    logger.record_event(event(1, 3, LineState::On)).await?;
    let (_, log) = get(&mut logger, "/log").await;
    assert!(log.starts_with("20"));
    assert!(log.trim_end().ends_with("fire alarm  ON"));

    let (_, body) = get(&mut logger, "/cnl?reset").await;
    assert!(
        body.lines()
            .any(|line| line == format!("b1c3 {:>40}", "b1c3"))
    );
    let channel = ChannelId::new(1, 3).unwrap();
    assert_eq!(
        logger.name(channel).await?,
        ChannelName::placeholder(channel)
    );
    Ok(())
}

#[tokio::test]
async fn test_bank_bits() {
    let mut input = ScriptedInput::default();
    input.last = [0b1000_0000_0000_0101, 0xFFFF];
    let mut logger = boot(LoggerConfig::new(), input).await;

    let (_, body) = get(&mut logger, "/bank").await;
    assert_eq!(body, "b0 1000000000000101\nb1 1111111111111111\n");
}

#[tokio::test]
async fn test_errors() {
    let mut logger = boot(LoggerConfig::new(), ScriptedInput::default()).await;

    assert_eq!(
        get(&mut logger, "/nowhere").await,
        (Status::NotFound, "page not found\n".to_string())
    );
    assert_eq!(get(&mut logger, "/cnl?b9c0x").await.0, Status::BadRequest);
    assert_eq!(get(&mut logger, "/cnl?b0c0").await.0, Status::BadRequest);

    let mut sink = common::Capture::default();
    let status = logger
        .serve(b"DELETE / HTTP/1.1\r\n\r\n", &mut sink)
        .await
        .unwrap();
    assert_eq!(status, Status::BadRequest);
    assert!(
        sink.bytes()
            .starts_with(b"HTTP/1.0 400 Bad Request\r\nPowered-By: evlogger\r\n")
    );

    logger.header_store().set_fail_writes(true);
    assert_eq!(
        get(&mut logger, "/clr").await,
        (Status::InternalError, "storage error\n".to_string())
    );
    assert_eq!(logger.stats().requests, 5);
}

#[tokio::test]
async fn test_second_bank_rejected_on_single_bank_layout() {
    let config = LoggerConfig::new().with_layout(evlogger::Layout::dual_24lc512().with_banks(1));
    let mut logger = boot(config, ScriptedInput::default()).await;

    assert_eq!(get(&mut logger, "/cnl?b1c0x").await.0, Status::BadRequest);
    assert_eq!(get(&mut logger, "/cnl").await.1.lines().count(), 16);
    assert_eq!(get(&mut logger, "/bank").await.1.lines().count(), 1);
}

#[tokio::test]
async fn test_dump_spans_many_chunks() {
    let mut logger = boot(LoggerConfig::new(), ScriptedInput::default()).await;
    for n in 0..40u8 {
        let state = if n % 2 == 0 {
            LineState::On
        } else {
            LineState::Off
        };
        logger.record_event(event(0, n % 16, state)).await.unwrap();
    }

    // `get` checks chunk bounds and the single end marker
    let (_, body) = get(&mut logger, "/dump").await;
    assert_eq!(body.lines().count(), 40);
    assert_eq!(get(&mut logger, "/log").await.1.lines().count(), 32);
}
