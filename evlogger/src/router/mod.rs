//! Request router.
//!
//! Turns one request line into log, channel, time and clear operations and
//! streams the answer through a [`ResponseSink`] in chunks of at most
//! [`CHUNK_CAPACITY`] bytes. Every request gets exactly one response, and
//! errors become status codes instead of failures of the control loop.
//!
//! | request | answer |
//! |---------|--------|
//! | `/`, `/log` | most recent records, newest first |
//! | `/dump` | every live record, newest first |
//! | `/addr` | `HDER <slot>` and `<newest> <oldest>` |
//! | `/clr` | truncate the log |
//! | `/time`, `/time?<time>` | read or set the clock |
//! | `/cnl`, `/cnl?b<B>c<P><name>`, `/cnl?reset` | list, set or reset names |
//! | `/bank` | raw bank bitsets |

mod request;
mod response;

pub use request::Request;
pub use response::{CHUNK_CAPACITY, Status};

use evlogger_store::ByteStore;

use crate::domain::{ChannelId, Clock, InputSource, LogError, LogRecord, RECORD_LEN, ResponseSink};
use crate::logger::Logger;
use response::ResponseWriter;

const NO_DATA: &[u8] = b"no data\n";

impl<H, D, C, I> Logger<H, D, C, I>
where
    H: ByteStore,
    D: ByteStore<Error = H::Error>,
    C: Clock,
    I: InputSource,
{
    /// Answer one request.
    ///
    /// Only a failing `sink` makes this return an error; everything else is
    /// reported to the client and reflected in the returned status.
    pub async fn serve<S: ResponseSink>(
        &mut self,
        request: &[u8],
        sink: &mut S,
    ) -> Result<Status, S::Error> {
        self.stats.requests += 1;
        let mut out = ResponseWriter::new(sink);

        let status = match Request::parse(request) {
            Ok(request) => {
                debug!("request {:?}", request);
                self.respond(request, &mut out).await?
            }
            Err(e) => {
                debug!("rejected request: {}", e);
                let status = Status::from(e);
                out.start(status).await?;
                out.write(status.body()).await?;
                status
            }
        };

        out.finish().await?;
        Ok(status)
    }

    async fn respond<S: ResponseSink>(
        &mut self,
        request: Request,
        out: &mut ResponseWriter<'_, S>,
    ) -> Result<Status, S::Error> {
        // Mutations run before the preamble so their outcome picks the status
        let outcome = match &request {
            Request::Clear => self.clear_log().await,
            Request::SetName(channel, _) if channel.bank() >= self.config.layout.banks() => {
                return reject(out, Status::BadRequest).await;
            }
            Request::SetName(channel, name) => self.set_name(*channel, name).await,
            Request::ResetNames => self.reset_names().await,
            Request::SetTime(time) => {
                if let Err(e) = self.set_time(*time).await {
                    warn!("clock set failed: {}", e);
                    out.start(Status::InternalError).await?;
                    out.write(b"clock error\n").await?;
                    return Ok(Status::InternalError);
                }
                Ok(())
            }
            _ => Ok(()),
        };
        match outcome {
            Ok(()) => {}
            Err(LogError::Busy) => return reject(out, Status::Busy).await,
            Err(e) => {
                warn!("request failed: {:?}", e);
                return reject(out, Status::InternalError).await;
            }
        }

        out.start(Status::Ok).await?;
        match request {
            Request::Recent => {
                let limit = self.config.recent_limit;
                self.write_records(out, Some(limit)).await?;
            }
            Request::Dump => self.write_records(out, None).await?,
            Request::Addr => {
                let current = self.header.reload(&mut self.header_store).await;
                writeln!(
                    out,
                    "HDER {:04x}\n{} {}",
                    self.header.slot_address(),
                    current.newest(),
                    current.oldest()
                )
                .await?;
            }
            Request::Clear => out.write(b"done\n").await?,
            Request::Time => {
                let now = self.now().await;
                writeln!(out, "{}", now).await?;
            }
            Request::SetTime(_) => {
                let now = self.now().await;
                writeln!(out, "time updated\n{}", now).await?;
            }
            Request::Names | Request::SetName(..) | Request::ResetNames => {
                self.write_names(out).await?;
            }
            Request::Banks => self.write_banks(out).await?,
        }
        Ok(Status::Ok)
    }

    async fn write_records<S: ResponseSink>(
        &mut self,
        out: &mut ResponseWriter<'_, S>,
        limit: Option<u32>,
    ) -> Result<(), S::Error> {
        let mut cursor = self.records(limit).await;
        if cursor.remaining() == 0 {
            return out.write(NO_DATA).await;
        }

        let mut unreadable = 0u32;
        while let Some(item) = cursor.next(&mut self.data_store).await {
            match item {
                Ok(record) => {
                    out.write(&printable(&record)).await?;
                    out.write(b"\n").await?;
                }
                Err(_) => unreadable += 1,
            }
        }
        if unreadable > 0 {
            warn!("{} records could not be read", unreadable);
        }
        Ok(())
    }

    async fn write_names<S: ResponseSink>(
        &mut self,
        out: &mut ResponseWriter<'_, S>,
    ) -> Result<(), S::Error> {
        for channel in ChannelId::all(self.config.layout.banks()) {
            let name = self
                .names
                .read_or_placeholder(&mut self.header_store, channel)
                .await;
            writeln!(out, "{} {}", channel, name.as_str()).await?;
        }
        Ok(())
    }

    async fn write_banks<S: ResponseSink>(
        &mut self,
        out: &mut ResponseWriter<'_, S>,
    ) -> Result<(), S::Error> {
        for bank in 0..self.config.layout.banks() {
            match self.inputs.read_bank(bank).await {
                Ok(bits) => writeln!(out, "b{:x} {:016b}", bank, bits).await?,
                Err(e) => {
                    debug!("bank {} read failed: {:?}", bank, e);
                    writeln!(out, "b{:x} read error", bank).await?;
                }
            }
        }
        Ok(())
    }
}

async fn reject<S: ResponseSink>(
    out: &mut ResponseWriter<'_, S>,
    status: Status,
) -> Result<Status, S::Error> {
    out.start(status).await?;
    out.write(status.body()).await?;
    Ok(status)
}

/// Record bytes with anything unprintable (erased or torn data) as `?`.
fn printable(record: &LogRecord) -> [u8; RECORD_LEN] {
    let mut bytes = *record.as_bytes();
    for b in bytes.iter_mut().filter(|b| !(0x20..0x7f).contains(&**b)) {
        *b = b'?';
    }
    bytes
}
