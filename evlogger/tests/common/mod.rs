//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::convert::Infallible;

use evlogger::{
    Clock, ClockError, DateTime, InputSource, Layout, Logger, LoggerConfig, ResponseSink, Status,
};
use evlogger_store::MemoryStore;

pub const T0: u32 = 1_700_000_000;

/// Eight header slots below 0x1000, full 64 KiB log.
pub const SMALL_HEADER: Layout = Layout::new(0x0F80, 0x0C00, 0x80, 0x280, 0x28, 2, 0x1_0000);

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Clock that advances one second per read.
pub struct TickingClock {
    pub unix: u32,
    pub fail: bool,
}

impl TickingClock {
    pub fn new() -> Self {
        Self {
            unix: T0,
            fail: false,
        }
    }
}

impl Clock for TickingClock {
    async fn now(&mut self) -> Result<DateTime, ClockError> {
        if self.fail {
            return Err(ClockError::Unavailable);
        }
        self.unix += 1;
        Ok(DateTime::from_unix(self.unix))
    }

    async fn set(&mut self, time: DateTime) -> Result<(), ClockError> {
        self.unix = time.to_unix();
        Ok(())
    }
}

/// Replays queued samples per bank, then repeats the last one.
#[derive(Default)]
pub struct ScriptedInput {
    pub queues: [VecDeque<u16>; 2],
    pub last: [u16; 2],
}

impl ScriptedInput {
    pub fn bank0(samples: &[u16]) -> Self {
        let mut input = Self::default();
        input.queues[0].extend(samples.iter().copied());
        input
    }
}

impl InputSource for ScriptedInput {
    type Error = Infallible;

    async fn read_bank(&mut self, bank: u8) -> Result<u16, Self::Error> {
        let bank = bank as usize;
        if let Some(bits) = self.queues[bank].pop_front() {
            self.last[bank] = bits;
        }
        Ok(self.last[bank])
    }
}

/// Sink that keeps every chunk.
#[derive(Default)]
pub struct Capture {
    pub chunks: Vec<(Vec<u8>, bool)>,
}

impl Capture {
    pub fn bytes(&self) -> Vec<u8> {
        self.chunks
            .iter()
            .flat_map(|(c, _)| c.iter().copied())
            .collect()
    }

    /// Response text after the preamble.
    pub fn body(&self) -> String {
        let text = String::from_utf8(self.bytes()).unwrap();
        let (_, body) = text.split_once("\r\n\r\n").unwrap();
        body.to_string()
    }
}

impl ResponseSink for Capture {
    type Error = Infallible;

    async fn send(&mut self, chunk: &[u8], last: bool) -> Result<(), Self::Error> {
        self.chunks.push((chunk.to_vec(), last));
        Ok(())
    }
}

pub type TestLogger = Logger<MemoryStore, MemoryStore, TickingClock, ScriptedInput>;

pub async fn boot(config: LoggerConfig, input: ScriptedInput) -> TestLogger {
    init_logging();
    let layout = config.layout;
    let mut logger = Logger::new(
        config,
        MemoryStore::new(0x1_0000),
        MemoryStore::new(layout.log_capacity()),
        TickingClock::new(),
        input,
    );
    logger.boot().await;
    logger
}

/// Serve `path` and return status and body.
pub async fn get(logger: &mut TestLogger, path: &str) -> (Status, String) {
    let request = format!("GET {} HTTP/1.1\r\nHost: logger\r\n\r\n", path);
    let mut sink = Capture::default();
    let status = logger.serve(request.as_bytes(), &mut sink).await.unwrap();

    let flags: Vec<bool> = sink.chunks.iter().map(|(_, last)| *last).collect();
    assert_eq!(flags.iter().filter(|last| **last).count(), 1);
    assert_eq!(flags.last(), Some(&true));
    assert!(
        sink.chunks
            .iter()
            .all(|(c, _)| c.len() <= evlogger::CHUNK_CAPACITY)
    );

    (status, sink.body())
}
