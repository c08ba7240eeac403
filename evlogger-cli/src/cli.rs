//! Command line interface.
//!
//! `serve` runs the control loop against image files in the data directory
//! and answers HTTP-style requests on a TCP socket. The other commands open
//! the same images for offline inspection and maintenance.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use embedded_io_adapters::tokio_1::FromTokio;
use evlogger::{
    ChannelId, ChannelName, InputSource, IoSink, LINES_PER_BANK, Layout, LoggerConfig, MAX_BANKS,
};
use log::{debug, info, warn};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::host::{self, FileInputs, HostLogger};

/// Largest request head accepted from a client.
const MAX_REQUEST: usize = 1024;

/// Time a client gets to send its request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Parser, Debug)]
#[command(name = "evlogger")]
#[command(about = "Channel event logger on EEPROM image files", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Directory holding header.bin, data.bin and inputs.txt
    #[arg(long, global = true, default_value = "evlogger-data")]
    pub data_dir: PathBuf,

    /// Number of 16-line input banks
    #[arg(long, global = true, default_value_t = 2, value_parser = clap::value_parser!(u8).range(1..=MAX_BANKS as i64))]
    pub banks: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the logger and serve requests
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8080")]
        listen: SocketAddr,

        /// Input polling period in milliseconds
        #[arg(long, default_value_t = 50)]
        poll_ms: u64,

        /// Line levels file (defaults to inputs.txt in the data directory)
        #[arg(long)]
        inputs: Option<PathBuf>,

        /// Records returned by the recent log request
        #[arg(long, default_value_t = 32)]
        recent_limit: u32,
    },

    /// Print logged events, newest first
    Dump {
        /// Print at most this many records
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Show the recovered header
    Header {
        /// Also list every committed header slot
        #[arg(long)]
        slots: bool,
    },

    /// List or change channel names
    Names {
        /// Rename a channel, e.g. `--set b0c3 "Pump 3"`
        #[arg(long, num_args = 2, value_names = ["CHANNEL", "NAME"])]
        set: Option<Vec<String>>,

        /// Restore every default name
        #[arg(long, conflicts_with = "set")]
        reset: bool,
    },

    /// Empty the event log
    Clear,
}

pub async fn run(cli: Cli) -> Result<()> {
    let layout = Layout::dual_24lc512().with_banks(cli.banks);

    match cli.command {
        Commands::Serve {
            listen,
            poll_ms,
            inputs,
            recent_limit,
        } => {
            let config = LoggerConfig::new()
                .with_layout(layout)
                .with_recent_limit(recent_limit);
            let inputs = FileInputs::new(inputs.unwrap_or_else(|| cli.data_dir.join("inputs.txt")));
            let logger = host::open_logger(&cli.data_dir, config, inputs).await?;
            serve(logger, listen, Duration::from_millis(poll_ms.max(1))).await
        }
        Commands::Dump { limit } => dump(&mut open(&cli.data_dir, layout).await?, limit).await,
        Commands::Header { slots } => header(&mut open(&cli.data_dir, layout).await?, slots).await,
        Commands::Names { set, reset } => {
            names(&mut open(&cli.data_dir, layout).await?, set, reset).await
        }
        Commands::Clear => {
            let mut logger = open(&cli.data_dir, layout).await?;
            logger.clear_log().await.context("clearing log")?;
            println!("log cleared");
            Ok(())
        }
    }
}

/// Open the images for an offline command.
async fn open(data_dir: &Path, layout: Layout) -> Result<HostLogger<FileInputs>> {
    let config = LoggerConfig::new().with_layout(layout);
    host::open_logger(data_dir, config, FileInputs::new(data_dir.join("inputs.txt"))).await
}

async fn serve<I: InputSource>(
    mut logger: HostLogger<I>,
    listen: SocketAddr,
    period: Duration,
) -> Result<()> {
    let listener = TcpListener::bind(listen)
        .await
        .with_context(|| format!("binding {}", listen))?;
    info!("listening on {}", listen);

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let report = logger.poll_inputs().await;
                if report.logged > 0 || report.failed > 0 {
                    debug!("poll: {:?}", report);
                }
            }
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        warn!("accept failed: {}", e);
                        continue;
                    }
                };
                if let Err(e) = handle(&mut logger, stream).await {
                    warn!("client {}: {:#}", peer, e);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                break;
            }
        }
    }

    info!("{:?}, health {:?}", logger.stats(), logger.health());
    Ok(())
}

async fn handle<I: InputSource>(logger: &mut HostLogger<I>, mut stream: TcpStream) -> Result<()> {
    let request = tokio::time::timeout(REQUEST_TIMEOUT, read_request(&mut stream))
        .await
        .map_err(|_| anyhow!("request timed out"))??;

    let mut sink = IoSink::new(FromTokio::new(stream));
    let status = logger.serve(&request, &mut sink).await?;
    debug!("{} {} ({} bytes)", status.code(), status.reason(), sink.sent());

    let mut stream = sink.into_inner().into_inner();
    stream.shutdown().await?;
    Ok(())
}

/// Read up to the end of the request head, or `MAX_REQUEST` bytes.
async fn read_request(stream: &mut TcpStream) -> Result<Vec<u8>> {
    let mut request = Vec::with_capacity(256);
    let mut buf = [0u8; 256];
    while request.len() < MAX_REQUEST && !request.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        request.extend_from_slice(&buf[..n]);
    }
    request.truncate(MAX_REQUEST);
    Ok(request)
}

async fn dump<I: InputSource>(logger: &mut HostLogger<I>, limit: Option<u32>) -> Result<()> {
    let mut cursor = logger.records(limit).await;
    if cursor.remaining() == 0 {
        println!("no data");
        return Ok(());
    }

    while let Some(item) = cursor.next(logger.data_store()).await {
        let record = item.context("reading record")?;
        let name = String::from_utf8_lossy(record.name());
        let state = record
            .state()
            .map(|state| String::from_utf8_lossy(state.label()).into_owned())
            .unwrap_or_else(|| "???".into());
        match record.time() {
            Some(time) => println!("{} {} {}", time, name, state),
            None => println!("{:19} {} {}", "(bad time)", name, state),
        }
    }
    Ok(())
}

async fn header<I: InputSource>(logger: &mut HostLogger<I>, slots: bool) -> Result<()> {
    let directory = logger.header().clone();
    let current = directory.current();

    println!("slot    {:04x}", directory.slot_address());
    println!("newest  {}", current.newest());
    println!("oldest  {}", current.oldest());
    println!("records {}", logger.event_log().len(&directory));
    if current.is_committed() {
        println!(
            "written {}",
            evlogger::DateTime::from_unix(current.written_at())
        );
    }
    println!("health  {:?}", logger.health());

    if slots {
        let layout = directory.layout();
        for index in 0..layout.slot_count() {
            let address = layout.slot_address(index);
            let record = directory
                .read_slot(logger.header_store(), address)
                .await
                .with_context(|| format!("reading slot {:04x}", address))?;
            if record.is_erased() {
                continue;
            }
            let marker = if address == directory.slot_address() { '*' } else { ' ' };
            println!(
                "{}{:04x} key {:08x} newest {} oldest {}",
                marker,
                address,
                record.key(),
                record.newest(),
                record.oldest()
            );
        }
    }
    Ok(())
}

async fn names<I: InputSource>(
    logger: &mut HostLogger<I>,
    set: Option<Vec<String>>,
    reset: bool,
) -> Result<()> {
    if reset {
        logger.reset_names().await.context("resetting names")?;
    }
    if let Some(args) = set {
        let [channel, name] = args.as_slice() else {
            bail!("--set takes a channel and a name");
        };
        let channel = parse_channel(channel).map_err(|e| anyhow!(e))?;
        if channel.bank() >= logger.config().layout.banks() {
            bail!("channel {} is outside the configured banks", channel);
        }
        let name = ChannelName::from_text(name.as_bytes())
            .ok_or_else(|| anyhow!("names are 1 to 40 printable ASCII characters"))?;
        logger
            .set_name(channel, &name)
            .await
            .with_context(|| format!("renaming {}", channel))?;
    }

    for channel in ChannelId::all(logger.config().layout.banks()) {
        let name = logger.name(channel).await.context("reading names")?;
        println!("{} {}", channel, name.as_str());
    }
    Ok(())
}

/// Parse `b<bank>c<pin>` with hex digits, e.g. `b1cf`.
fn parse_channel(text: &str) -> Result<ChannelId, String> {
    let malformed = || format!("expected b<bank>c<pin>, got {:?}", text);
    let rest = text.strip_prefix('b').ok_or_else(malformed)?;
    let (bank, pin) = rest.split_once('c').ok_or_else(malformed)?;
    let bank = u8::from_str_radix(bank, 16).map_err(|_| malformed())?;
    let pin = u8::from_str_radix(pin, 16).map_err(|_| malformed())?;
    ChannelId::new(bank, pin).ok_or_else(|| {
        format!(
            "channel {:?} out of range ({} banks of {} lines)",
            text, MAX_BANKS, LINES_PER_BANK
        )
    })
}
