//! `tgrid`: snap timestamps to DST-aware time grids from the command line.

use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use time_grid::{
    is_snapped_to, is_snapped_to_naive, parse_timezone, period_to_duration,
    round_down, round_down_naive, round_to_15min, round_to_15min_naive, round_up, round_up_naive,
    Period, RoundOptions, TimeGridError, Unit,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

#[derive(Parser)]
#[command(name = "tgrid", version, about = "Round and snap timestamps to minute/hour/day/week grids")]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Round down to the latest boundary at or before DATETIME
    Floor(RoundArgs),
    /// Round up to the earliest boundary at or after DATETIME
    Ceil(RoundArgs),
    /// Round to the nearest quarter hour (down when at most 7 minutes past)
    Nearest15(NearestArgs),
    /// Check whether DATETIME is exactly on a boundary
    Snapped(SnapArgs),
    /// Show the unit, quantity and nominal length of a period
    Period {
        /// Period descriptor, e.g. minute-15
        period: String,
    },
}

#[derive(Args)]
struct RoundArgs {
    /// RFC 3339 datetime, or YYYY-MM-DDTHH:MM:SS[.f] read as UTC
    datetime: String,

    /// Grid period: second, minute, minute-15, hour, day, week, ...
    #[arg(short, long, default_value = "minute-15")]
    period: String,

    /// IANA timezone whose wall clock defines the grid
    #[arg(long)]
    tz: Option<String>,

    /// Move a datetime already on a boundary to the neighbouring boundary
    #[arg(long)]
    force: bool,
}

#[derive(Args)]
struct NearestArgs {
    /// RFC 3339 datetime, or YYYY-MM-DDTHH:MM:SS[.f] read as UTC
    datetime: String,

    /// IANA timezone whose wall clock defines the grid
    #[arg(long)]
    tz: Option<String>,

    /// Move a datetime already on a boundary to the neighbouring boundary
    #[arg(long)]
    force: bool,
}

#[derive(Args)]
struct SnapArgs {
    /// RFC 3339 datetime, or YYYY-MM-DDTHH:MM:SS[.f] (requires --tz)
    datetime: String,

    /// Grid period: second, minute, minute-15, hour, day
    #[arg(short, long, default_value = "minute-15")]
    period: String,

    /// IANA timezone whose wall clock defines the grid
    #[arg(long)]
    tz: Option<String>,
}

/// A datetime as given on the command line.
#[derive(Debug, Clone, Copy)]
enum Input {
    Aware(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

impl FromStr for Input {
    type Err = TimeGridError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Input::Aware(dt));
        }
        NaiveDateTime::parse_from_str(s, NAIVE_FORMAT)
            .map(Input::Naive)
            .map_err(|e| TimeGridError::InvalidDatetime(format!("'{s}': {e}")))
    }
}

impl Input {
    fn render(&self) -> String {
        match self {
            Input::Aware(dt) => dt.to_rfc3339(),
            Input::Naive(dt) => dt.format(NAIVE_FORMAT).to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Down,
    Up,
    Nearest15,
}

#[derive(Serialize)]
struct RoundOutput<'a> {
    input: &'a str,
    period: Period,
    timezone: Option<&'static str>,
    force: bool,
    result: String,
}

#[derive(Serialize)]
struct SnapOutput<'a> {
    input: &'a str,
    period: Period,
    timezone: Option<&'static str>,
    snapped: bool,
}

#[derive(Serialize)]
struct PeriodOutput {
    period: Period,
    unit: Unit,
    quantity: u32,
    seconds: i64,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let output = run(&cli)?;
    println!("{output}");
    Ok(())
}

/// Log to stderr, filtered by `RUST_LOG`.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: &Cli) -> Result<String> {
    match &cli.command {
        Command::Floor(args) => round_command(args, Direction::Down, cli.json),
        Command::Ceil(args) => round_command(args, Direction::Up, cli.json),
        Command::Nearest15(args) => {
            let opts = options(args.tz.as_deref(), args.force)?;
            render_rounded(
                &args.datetime,
                Period::QUARTER_HOUR,
                Direction::Nearest15,
                &opts,
                cli.json,
            )
        }
        Command::Snapped(args) => snap_command(args, cli.json),
        Command::Period { period } => period_command(period, cli.json),
    }
}

fn options(tz: Option<&str>, force: bool) -> Result<RoundOptions> {
    let timezone = tz.map(parse_timezone).transpose()?;
    Ok(RoundOptions { timezone, force })
}

fn round_command(args: &RoundArgs, direction: Direction, json: bool) -> Result<String> {
    let opts = options(args.tz.as_deref(), args.force)?;
    let period: Period = args.period.parse()?;
    render_rounded(&args.datetime, period, direction, &opts, json)
}

fn render_rounded(
    datetime: &str,
    period: Period,
    direction: Direction,
    opts: &RoundOptions,
    json: bool,
) -> Result<String> {
    let input: Input = datetime.parse()?;
    debug!(?input, %period, ?direction, ?opts, "rounding");

    let rounded = round(input, period, direction, opts)
        .with_context(|| format!("rounding '{datetime}' to {period}"))?;

    if json {
        let output = RoundOutput {
            input: datetime,
            period,
            timezone: opts.timezone.map(|tz| tz.name()),
            force: opts.force,
            result: rounded.render(),
        };
        Ok(serde_json::to_string_pretty(&output)?)
    } else {
        Ok(rounded.render())
    }
}

fn round(input: Input, period: Period, direction: Direction, opts: &RoundOptions) -> Result<Input> {
    let period = period.to_string();
    let period = period.as_str();
    let rounded = match (input, direction) {
        (Input::Aware(dt), Direction::Down) => Input::Aware(round_down(&dt, period, opts)?),
        (Input::Aware(dt), Direction::Up) => Input::Aware(round_up(&dt, period, opts)?),
        (Input::Aware(dt), Direction::Nearest15) => Input::Aware(round_to_15min(&dt, opts)?),
        (Input::Naive(dt), Direction::Down) => Input::Naive(round_down_naive(&dt, period, opts)?),
        (Input::Naive(dt), Direction::Up) => Input::Naive(round_up_naive(&dt, period, opts)?),
        (Input::Naive(dt), Direction::Nearest15) => {
            Input::Naive(round_to_15min_naive(&dt, opts)?)
        }
    };
    Ok(rounded)
}

fn snap_command(args: &SnapArgs, json: bool) -> Result<String> {
    let timezone = args.tz.as_deref().map(parse_timezone).transpose()?;
    let input: Input = args.datetime.parse()?;
    let period: Period = args.period.parse()?;

    let snapped = match input {
        Input::Aware(dt) => is_snapped_to(&dt, &args.period, timezone),
        Input::Naive(dt) => is_snapped_to_naive(&dt, &args.period, timezone),
    }
    .with_context(|| format!("checking '{}' against {}", args.datetime, args.period))?;

    if json {
        let output = SnapOutput {
            input: &args.datetime,
            period,
            timezone: timezone.map(|tz| tz.name()),
            snapped,
        };
        Ok(serde_json::to_string_pretty(&output)?)
    } else {
        Ok(snapped.to_string())
    }
}

fn period_command(descriptor: &str, json: bool) -> Result<String> {
    let period: Period = match descriptor.parse() {
        Ok(period) => period,
        // Reports month/year as unsupported rather than unrecognized.
        Err(err) => return Err(period_to_duration(descriptor).err().unwrap_or(err).into()),
    };
    let seconds = period.duration().num_seconds();

    if json {
        let output = PeriodOutput {
            period,
            unit: period.unit(),
            quantity: period.quantity(),
            seconds,
        };
        Ok(serde_json::to_string_pretty(&output)?)
    } else {
        Ok(format!(
            "{period}: {} x {} = {seconds}s",
            period.quantity(),
            period.unit()
        ))
    }
}
