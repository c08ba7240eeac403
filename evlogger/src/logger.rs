//! Controller context.
//!
//! [`Logger`] owns every piece of mutable state: both stores, the clock, the
//! input source, the cached header, the detector history and the busy flag.
//! One control loop drives it:
//!
//! ```text
//! boot() ──► loop { poll_inputs(); serve(request) }
//! ```
//!
//! Nothing in here halts the loop. Storage and clock failures degrade
//! [`Health`] and are counted in [`Stats`]; the next step carries on from
//! the in-memory state.

use core::sync::atomic::{AtomicBool, Ordering};

use evlogger_store::ByteStore;

use crate::domain::{
    ChannelDetector, ChannelId, ChannelName, ChannelNames, Clock, ClockError, DateTime, EventLog,
    HeaderDirectory, HeaderRecord, InputSource, Layout, LogCursor, LogError, LogRecord, Transition,
};

/// Controller configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggerConfig {
    /// Storage geometry.
    pub layout: Layout,
    /// Records returned by the "recent log" request.
    pub recent_limit: u32,
}

impl LoggerConfig {
    /// Firmware defaults: two 24LC512 EEPROMs, 32 recent records.
    pub const fn new() -> Self {
        Self {
            layout: Layout::dual_24lc512(),
            recent_limit: 32,
        }
    }

    /// Same configuration with a different layout.
    pub const fn with_layout(self, layout: Layout) -> Self {
        Self { layout, ..self }
    }

    /// Same configuration with a different recent-log size.
    pub const fn with_recent_limit(self, recent_limit: u32) -> Self {
        Self {
            recent_limit,
            ..self
        }
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Indicator state. Never blocks logging.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Health {
    /// Everything works.
    Normal,
    /// The clock failed or reads earlier than the last header commit.
    ClockFault,
    /// The last header or record write failed.
    StorageFault,
}

/// Outcome of one [`Logger::poll_inputs`] call.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollReport {
    /// Whether the banks were sampled at all.
    pub sampled: bool,
    /// Events durably appended.
    pub logged: u32,
    /// Events whose append failed.
    pub failed: u32,
    /// Banks that could not be read.
    pub input_errors: u32,
}

/// Running counters.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Events appended since boot.
    pub events_logged: u32,
    /// Appends that failed since boot.
    pub append_failures: u32,
    /// Failed bank reads since boot.
    pub input_errors: u32,
    /// Requests answered since boot.
    pub requests: u32,
}

/// Re-entrancy guard for log and header mutations.
///
/// A mutation that is abandoned mid-flight (a cancelled future) leaves the
/// flag held by its guard until the guard is dropped, which is when the
/// future is dropped.
#[derive(Debug, Default)]
pub struct BusyFlag(AtomicBool);

impl BusyFlag {
    /// A released flag.
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Take the flag, or `None` if a mutation is in flight.
    pub fn try_acquire(&self) -> Option<BusyGuard<'_>> {
        self.0
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| BusyGuard(&self.0))
    }

    /// Whether a mutation is in flight.
    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Holds a [`BusyFlag`] until dropped.
#[derive(Debug)]
pub struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The event logger.
///
/// `H` holds channel names and header slots, `D` the record ring. Both must
/// report the same error type.
pub struct Logger<H, D, C, I> {
    pub(crate) config: LoggerConfig,
    pub(crate) header_store: H,
    pub(crate) data_store: D,
    pub(crate) clock: C,
    pub(crate) inputs: I,
    pub(crate) header: HeaderDirectory,
    pub(crate) log: EventLog,
    pub(crate) names: ChannelNames,
    pub(crate) detector: ChannelDetector,
    pub(crate) busy: BusyFlag,
    clock_fault: bool,
    /// Whether `last_time` came from the most recent clock read.
    clock_ok: bool,
    storage_fault: bool,
    last_time: DateTime,
    /// Clock time of the last successful commit, seeded from the header at boot.
    committed_at: Option<u32>,
    pub(crate) stats: Stats,
}

impl<H, D, C, I> Logger<H, D, C, I>
where
    H: ByteStore,
    D: ByteStore<Error = H::Error>,
    C: Clock,
    I: InputSource,
{
    /// Create a logger. Call [`boot`](Self::boot) before anything else.
    pub fn new(config: LoggerConfig, header_store: H, data_store: D, clock: C, inputs: I) -> Self {
        let layout = config.layout;
        Self {
            config,
            header_store,
            data_store,
            clock,
            inputs,
            header: HeaderDirectory::new(layout),
            log: EventLog::new(layout),
            names: ChannelNames::new(layout),
            detector: ChannelDetector::new(),
            busy: BusyFlag::new(),
            clock_fault: false,
            clock_ok: false,
            storage_fault: false,
            last_time: DateTime::EPOCH,
            committed_at: None,
            stats: Stats::default(),
        }
    }

    /// Recover the header and check the clock against it.
    pub async fn boot(&mut self) -> HeaderRecord {
        let record = self.header.recover(&mut self.header_store).await;
        self.committed_at = self.header.newest_time();
        let now = self.now().await;
        info!(
            "boot: {} records live, clock {}, health {:?}",
            self.log.len(&self.header),
            now,
            self.health()
        );
        record
    }

    /// Sample every bank and log the confirmed transitions.
    ///
    /// Skipped when the input source has nothing new and no change is
    /// settling. Failed reads and appends are counted, never propagated.
    pub async fn poll_inputs(&mut self) -> PollReport {
        let mut report = PollReport::default();
        if !self.inputs.pending() && !self.detector.is_settling() {
            return report;
        }
        report.sampled = true;

        for bank in 0..self.config.layout.banks() {
            let bits = match self.inputs.read_bank(bank).await {
                Ok(bits) => bits,
                Err(e) => {
                    warn!("bank {} read failed: {:?}", bank, e);
                    report.input_errors += 1;
                    continue;
                }
            };

            for transition in self.detector.sample(bank, bits) {
                match self.record_event(transition).await {
                    Ok(()) => report.logged += 1,
                    Err(e) => {
                        error!("event {} lost: {:?}", transition.channel, e);
                        report.failed += 1;
                    }
                }
            }
        }

        self.inputs.acknowledge();
        self.stats.input_errors += report.input_errors;
        report
    }

    /// Stamp, label and append one transition.
    pub async fn record_event(&mut self, transition: Transition) -> Result<(), LogError<H::Error>> {
        let now = self.now().await;
        let name = self
            .names
            .read_or_placeholder(&mut self.header_store, transition.channel)
            .await;
        let record = LogRecord::compose(now, &name, transition.state);

        let Some(_guard) = self.busy.try_acquire() else {
            self.stats.append_failures += 1;
            return Err(LogError::Busy);
        };
        let result = self
            .log
            .append(
                &mut self.header,
                &mut self.header_store,
                &mut self.data_store,
                &record,
                now.to_unix(),
            )
            .await;

        self.storage_fault = result.is_err();
        match result {
            Ok(()) => {
                Self::committed(
                    self.clock_ok,
                    &mut self.committed_at,
                    &mut self.clock_fault,
                    now,
                );
                self.stats.events_logged += 1;
                debug!("logged {} {:?}", transition.channel, transition.state);
            }
            Err(_) => self.stats.append_failures += 1,
        }
        result
    }

    /// Drop every live record.
    pub async fn clear_log(&mut self) -> Result<(), LogError<H::Error>> {
        let now = self.now().await;
        let unix = now.to_unix();
        let Some(_guard) = self.busy.try_acquire() else {
            return Err(LogError::Busy);
        };
        let result = self
            .log
            .truncate(&mut self.header, &mut self.header_store, unix)
            .await;
        self.storage_fault = result.is_err();
        if result.is_ok() {
            Self::committed(
                self.clock_ok,
                &mut self.committed_at,
                &mut self.clock_fault,
                now,
            );
            info!("log cleared at {}", self.header.current().newest());
        }
        result
    }

    /// Current time, or the last good reading if the clock fails.
    ///
    /// Updates the clock part of [`health`](Self::health).
    pub async fn now(&mut self) -> DateTime {
        match self.clock.now().await {
            Ok(now) => {
                let behind = self
                    .committed_at
                    .is_some_and(|committed| now.to_unix() < committed);
                if behind && !self.clock_fault {
                    warn!("clock {} is behind the last header commit", now);
                }
                self.clock_fault = behind;
                self.clock_ok = true;
                self.last_time = now;
                now
            }
            Err(e) => {
                if !self.clock_fault {
                    warn!("clock read failed: {}", e);
                }
                self.clock_fault = true;
                self.clock_ok = false;
                self.last_time
            }
        }
    }

    /// A commit stamped `time` reached the medium.
    ///
    /// The ordering key never rises, so the clock check follows the commit
    /// time instead. A clock reading that was merely behind the previous
    /// commit is now the reference and no longer a fault.
    fn committed(
        clock_ok: bool,
        committed_at: &mut Option<u32>,
        clock_fault: &mut bool,
        time: DateTime,
    ) {
        if clock_ok {
            *committed_at = Some(time.to_unix());
            *clock_fault = false;
        }
    }

    /// Set the clock.
    pub async fn set_time(&mut self, time: DateTime) -> Result<(), ClockError> {
        self.clock.set(time).await?;
        info!("clock set to {}", time);
        self.now().await;
        Ok(())
    }

    /// Stored name of `channel`.
    pub async fn name(&mut self, channel: ChannelId) -> Result<ChannelName, LogError<H::Error>> {
        self.names.read(&mut self.header_store, channel).await
    }

    /// Rename `channel`.
    pub async fn set_name(
        &mut self,
        channel: ChannelId,
        name: &ChannelName,
    ) -> Result<(), LogError<H::Error>> {
        let Some(_guard) = self.busy.try_acquire() else {
            return Err(LogError::Busy);
        };
        self.names
            .write(&mut self.header_store, channel, name)
            .await
    }

    /// Restore every placeholder name.
    pub async fn reset_names(&mut self) -> Result<(), LogError<H::Error>> {
        let Some(_guard) = self.busy.try_acquire() else {
            return Err(LogError::Busy);
        };
        self.names.reset_all(&mut self.header_store).await
    }

    /// Re-read the header, then walk up to `limit` records newest first.
    ///
    /// Read the records with [`LogCursor::next`] on [`data_store`](Self::data_store).
    pub async fn records(&mut self, limit: Option<u32>) -> LogCursor {
        self.header.reload(&mut self.header_store).await;
        self.log.cursor(&self.header, limit)
    }

    /// Indicator state, storage faults first.
    pub fn health(&self) -> Health {
        if self.storage_fault {
            Health::StorageFault
        } else if self.clock_fault {
            Health::ClockFault
        } else {
            Health::Normal
        }
    }

    /// Running counters.
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Configuration.
    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Header directory.
    pub fn header(&self) -> &HeaderDirectory {
        &self.header
    }

    /// Record ring.
    pub fn event_log(&self) -> &EventLog {
        &self.log
    }

    /// Change detector.
    pub fn detector(&self) -> &ChannelDetector {
        &self.detector
    }

    /// Busy flag shared by all mutations.
    pub fn busy(&self) -> &BusyFlag {
        &self.busy
    }

    /// Store holding names and header slots.
    pub fn header_store(&mut self) -> &mut H {
        &mut self.header_store
    }

    /// Store holding the record ring.
    pub fn data_store(&mut self) -> &mut D {
        &mut self.data_store
    }

    /// Input source.
    pub fn inputs(&mut self) -> &mut I {
        &mut self.inputs
    }

    /// Take the logger apart.
    pub fn into_parts(self) -> (H, D, C, I) {
        (self.header_store, self.data_store, self.clock, self.inputs)
    }
}
