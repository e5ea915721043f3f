//! Event-driver front end: reads a CSV order event stream, drives the
//! matching engine one event at a time, and writes the NBBO and trade logs.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use engine::{MatchingEngine, NbboSnapshot, Side, Trade};
use tracing::{debug, debug_span, info};

/// CSV-driven matching engine front end.
#[derive(Parser, Debug)]
#[command(name = "engine-cli", version, about = "Single-symbol limit order matching engine")]
struct Args {
    /// Path to the input event CSV (header row discarded).
    #[arg(long)]
    input: PathBuf,

    /// Path the NBBO snapshot CSV is written to.
    #[arg(long = "nbbo-out")]
    nbbo_out: PathBuf,

    /// Path the trade log CSV is written to.
    #[arg(long = "trades-out")]
    trades_out: PathBuf,

    /// Tracing filter directive, e.g. `info`, `debug`, `engine_cli=trace`.
    #[arg(long = "log-level", default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&args.log_level))
        .init();

    run(&args)
}

fn run(args: &Args) -> anyhow::Result<()> {
    info!(input = %args.input.display(), "starting run");

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(&args.input)
        .with_context(|| format!("opening input file {}", args.input.display()))?;

    let nbbo_file = File::create(&args.nbbo_out)
        .with_context(|| format!("creating nbbo output file {}", args.nbbo_out.display()))?;
    let mut nbbo_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(BufWriter::new(nbbo_file));
    nbbo_writer
        .write_record(["bid_price", "bid_size", "ask_price", "ask_size"])
        .context("writing nbbo header row")?;

    let trades_file = File::create(&args.trades_out)
        .with_context(|| format!("creating trades output file {}", args.trades_out.display()))?;
    let mut trades_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(BufWriter::new(trades_file));
    trades_writer
        .write_record(["trade_price", "trade_size", "buy_order_id", "sell_order_id"])
        .context("writing trades header row")?;

    let mut engine = MatchingEngine::new();
    let mut event_count = 0u64;
    let mut trade_count = 0u64;

    for (line_no, record) in reader.records().enumerate() {
        let record = record
            .with_context(|| format!("reading input record at line {}", line_no + 2))?;
        let span = debug_span!("event", line = line_no + 2);
        let _enter = span.enter();

        let (trades, nbbo) = process_record(&mut engine, &record)
            .with_context(|| format!("rejecting input at line {}: {:?}", line_no + 2, record))?;

        for trade in &trades {
            write_trade(&mut trades_writer, trade)?;
        }
        trade_count += trades.len() as u64;
        write_nbbo(&mut nbbo_writer, &nbbo)?;
        event_count += 1;

        debug!(trades = trades.len(), "event processed");
    }

    nbbo_writer.flush().context("flushing nbbo output")?;
    trades_writer.flush().context("flushing trades output")?;

    info!(event_count, trade_count, "run complete");
    Ok(())
}

/// Classify and dispatch a single CSV record to the engine.
///
/// Two record shapes are accepted: `timestamp,insert,id,side,price,size`
/// (6 fields) and `timestamp,cancel,id` (3 fields). Anything else, or a
/// numeric/enum field that fails to parse, is a malformed-line error (§7).
fn process_record(
    engine: &mut MatchingEngine,
    record: &csv::StringRecord,
) -> anyhow::Result<(Vec<Trade>, NbboSnapshot)> {
    let timestamp: u64 = record
        .get(0)
        .context("missing timestamp field")?
        .parse()
        .context("timestamp is not a non-negative integer")?;
    let action = record.get(1).context("missing action field")?;

    match action {
        "insert" => {
            if record.len() != 6 {
                bail!("insert record must have 6 fields, got {}", record.len());
            }
            let id: u64 = record.get(2).unwrap().parse().context("id is not a positive integer")?;
            let side = parse_side(record.get(3).unwrap())?;
            let price: u64 = record.get(4).unwrap().parse().context("price is not a positive integer")?;
            let size: u64 = record.get(5).unwrap().parse().context("size is not a positive integer")?;

            let (trades, nbbo) = engine.process_insert(timestamp, id, side, price, size)?;
            Ok((trades, nbbo))
        }
        "cancel" => {
            if record.len() != 3 {
                bail!("cancel record must have 3 fields, got {}", record.len());
            }
            let id: u64 = record.get(2).unwrap().parse().context("id is not a positive integer")?;
            let nbbo = engine.process_cancel(id);
            Ok((Vec::new(), nbbo))
        }
        other => bail!("unknown action {other:?}"),
    }
}

fn parse_side(raw: &str) -> anyhow::Result<Side> {
    match raw {
        "buy" => Ok(Side::Buy),
        "sell" => Ok(Side::Sell),
        other => bail!("unknown side {other:?}, expected \"buy\" or \"sell\""),
    }
}

fn write_nbbo<W: Write>(writer: &mut csv::Writer<W>, nbbo: &NbboSnapshot) -> anyhow::Result<()> {
    writer.serialize(nbbo).context("writing nbbo row")?;
    Ok(())
}

fn write_trade<W: Write>(writer: &mut csv::Writer<W>, trade: &Trade) -> anyhow::Result<()> {
    writer.serialize(trade).context("writing trade row")?;
    Ok(())
}
