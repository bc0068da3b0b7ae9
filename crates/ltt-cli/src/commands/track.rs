//! `ltt track`: the interactive timer.
//!
//! Commands are read line by line from stdin while a one-second interval
//! drives [`Tracker::tick`]. The interval branch is only polled while the
//! timer is running. Start begins a fresh period; resume continues the period
//! that pause interrupted, so each counted second is a full second of running
//! time however it was split. Ctrl-C, `quit` and end of input all save the
//! active session before returning.

use std::io::Write;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use ltt_core::customer::find_customer;
use ltt_core::{Clock, TickOutcome, TimeStore, Tracker, format_duration, format_time};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

const TICK_PERIOD: Duration = Duration::from_secs(1);

const HELP: &str =
    "Commands: start, pause, resume, stop, status, select <customer>, dismiss, quit";

/// A line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Pause,
    Resume,
    Stop,
    Status,
    Select(String),
    Dismiss,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(word, rest)| (word, rest.trim()));

        match (word.to_ascii_lowercase().as_str(), rest) {
            ("start", "") => Ok(Self::Start),
            ("pause", "") => Ok(Self::Pause),
            ("resume", "") => Ok(Self::Resume),
            ("stop", "") => Ok(Self::Stop),
            ("status", "") => Ok(Self::Status),
            ("select", reference) if !reference.is_empty() => {
                Ok(Self::Select(reference.to_string()))
            }
            ("dismiss", "") => Ok(Self::Dismiss),
            ("help", "") => Ok(Self::Help),
            ("quit" | "exit", "") => Ok(Self::Quit),
            _ => Err(line.to_string()),
        }
    }
}

/// What the loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// A new run began; start a fresh tick period.
    Started,
    Paused,
    /// Running again; continue the interrupted period.
    Resumed,
    Quit,
}

/// Where the running timer is within the current tick period.
///
/// Running time from a period cut short by a pause is carried into the next
/// resume, so the next tick lands where it would have without the pause.
#[derive(Debug, Clone, Copy, Default)]
struct TickPhase {
    /// When running time last began accruing toward the next tick.
    anchor: Option<Instant>,
    /// Running time already spent in the current period.
    carried: Duration,
}

impl TickPhase {
    /// Begins a fresh period, returning the first tick deadline.
    fn start(&mut self, now: Instant) -> Instant {
        self.anchor = Some(now);
        self.carried = Duration::ZERO;
        now + TICK_PERIOD
    }

    const fn ticked(&mut self, at: Instant) {
        self.anchor = Some(at);
        self.carried = Duration::ZERO;
    }

    fn pause(&mut self, now: Instant) {
        if let Some(anchor) = self.anchor.take() {
            let running = now.saturating_duration_since(anchor);
            self.carried = (self.carried + running).min(TICK_PERIOD);
        }
    }

    /// Continues the interrupted period, returning the next tick deadline.
    fn resume(&mut self, now: Instant) -> Instant {
        self.anchor = Some(now);
        now + TICK_PERIOD.saturating_sub(self.carried)
    }
}

/// Prints and clears the tracker's pending error, if any.
fn report_error<S: TimeStore, C: Clock, W: Write>(
    tracker: &mut Tracker<S, C>,
    writer: &mut W,
) -> Result<()> {
    if let Some(message) = tracker.last_error() {
        writeln!(writer, "Error: {message}")?;
    }
    tracker.clear_error();
    Ok(())
}

fn write_status<S: TimeStore, C: Clock, W: Write>(
    tracker: &Tracker<S, C>,
    writer: &mut W,
) -> Result<()> {
    match tracker.selected_customer() {
        Some(customer) if customer.engagement_type.is_empty() => {
            writeln!(writer, "Customer: {}", customer.name)?;
        }
        Some(customer) => {
            writeln!(
                writer,
                "Customer: {} ({})",
                customer.name, customer.engagement_type
            )?;
        }
        None => writeln!(writer, "Customer: none")?,
    }

    let timer = tracker.timer();
    writeln!(
        writer,
        "Timer: {} {}",
        timer.status(),
        format_time(timer.elapsed_seconds())
    )?;

    if let Some(summary) = tracker.hours_summary() {
        writeln!(
            writer,
            "Spent: {}  Remaining: {}  Progress: {:.0}%",
            summary.spent_display(),
            summary.remaining_display(),
            summary.progress_percent
        )?;
    }
    if let Some(notice) = tracker.notice() {
        writeln!(writer, "Notice: {notice}")?;
    }
    Ok(())
}

fn stop_and_report<S: TimeStore, C: Clock, W: Write>(
    tracker: &mut Tracker<S, C>,
    writer: &mut W,
) -> Result<()> {
    let elapsed = tracker.timer().elapsed_seconds();
    match tracker.stop() {
        Ok(Some(log)) => writeln!(
            writer,
            "Saved {} for {}. Remaining: {}",
            format_duration(elapsed),
            log.customer_name,
            log.summary().remaining_display()
        )?,
        Ok(None) => writeln!(writer, "Timer is idle.")?,
        Err(_) => report_error(tracker, writer)?,
    }
    Ok(())
}

/// Applies one command to the tracker, writing feedback to `writer`.
pub fn handle_command<S: TimeStore, C: Clock, W: Write>(
    tracker: &mut Tracker<S, C>,
    command: Command,
    writer: &mut W,
) -> Result<Flow> {
    debug!(?command, status = %tracker.timer().status(), "track command");

    match command {
        Command::Start => {
            let Some(customer) = tracker.selected_customer().cloned() else {
                writeln!(writer, "No customer selected. Use 'select <customer>'.")?;
                return Ok(Flow::Continue);
            };
            if !tracker.can_start() {
                writeln!(writer, "Timer is already {}.", tracker.timer().status())?;
                return Ok(Flow::Continue);
            }
            tracker.start(customer.id);
            writeln!(writer, "Started timer for {}.", customer.name)?;
            return Ok(Flow::Started);
        }
        Command::Pause => {
            if tracker.pause() {
                let elapsed = format_time(tracker.timer().elapsed_seconds());
                writeln!(writer, "Paused at {elapsed}.")?;
                return Ok(Flow::Paused);
            }
            writeln!(writer, "Timer is not running.")?;
        }
        Command::Resume => {
            if tracker.resume() {
                let elapsed = format_time(tracker.timer().elapsed_seconds());
                writeln!(writer, "Resumed at {elapsed}.")?;
                return Ok(Flow::Resumed);
            }
            writeln!(writer, "Timer is not paused.")?;
        }
        Command::Stop => stop_and_report(tracker, writer)?,
        Command::Status => write_status(tracker, writer)?,
        Command::Select(reference) => {
            if !tracker.can_select_customer() {
                writeln!(writer, "Stop the timer before switching customers.")?;
                return Ok(Flow::Continue);
            }
            let Some(customer) = find_customer(tracker.customers(), &reference).cloned() else {
                writeln!(writer, "No active customer matching '{reference}'.")?;
                return Ok(Flow::Continue);
            };
            if tracker.select_customer(Some(customer.id)).is_ok() {
                writeln!(writer, "Selected {}.", customer.name)?;
            } else {
                report_error(tracker, writer)?;
            }
        }
        Command::Dismiss => tracker.dismiss_notice(),
        Command::Help => writeln!(writer, "{HELP}")?,
        Command::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

/// Advances the timer by one period and reports an idle stop.
pub fn handle_tick<S: TimeStore, C: Clock, W: Write>(
    tracker: &mut Tracker<S, C>,
    writer: &mut W,
) -> Result<()> {
    if let TickOutcome::IdleStopped {
        elapsed_seconds,
        notice,
        persisted,
    } = tracker.tick()
    {
        writeln!(writer, "{notice}")?;
        if persisted {
            writeln!(writer, "Saved {}.", format_duration(elapsed_seconds))?;
        } else {
            report_error(tracker, writer)?;
        }
    }
    Ok(())
}

fn shutdown<S: TimeStore, C: Clock, W: Write>(
    tracker: &mut Tracker<S, C>,
    writer: &mut W,
) -> Result<()> {
    let elapsed = tracker.timer().elapsed_seconds();
    let saved = tracker
        .shutdown()
        .context("failed to save the active session on exit")?;
    if let Some(log) = saved {
        writeln!(
            writer,
            "Saved {} for {} before exit.",
            format_duration(elapsed),
            log.customer_name
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// Runs the command loop until `quit`, end of input or Ctrl-C.
pub async fn run<S, C, R, W>(tracker: &mut Tracker<S, C>, input: R, writer: &mut W) -> Result<()>
where
    S: TimeStore,
    C: Clock,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut interval = tokio::time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut phase = TickPhase::default();
    let mut lines = input.lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    writeln!(writer, "{HELP}")?;
    writer.flush()?;

    loop {
        tokio::select! {
            at = interval.tick(), if tracker.timer().is_running() => {
                phase.ticked(at);
                handle_tick(tracker, writer)?;
            }
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read command")? else {
                    debug!("input closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Command>() {
                    Ok(command) => match handle_command(tracker, command, writer)? {
                        Flow::Continue => {}
                        Flow::Started => interval.reset_at(phase.start(Instant::now())),
                        Flow::Paused => phase.pause(Instant::now()),
                        Flow::Resumed => interval.reset_at(phase.resume(Instant::now())),
                        Flow::Quit => break,
                    },
                    Err(unknown) => writeln!(writer, "Unknown command '{unknown}'. {HELP}")?,
                }
            }
            result = &mut ctrl_c => {
                result.context("failed to listen for Ctrl-C")?;
                debug!("interrupted");
                writeln!(writer)?;
                break;
            }
        }
        writer.flush()?;
    }

    shutdown(tracker, writer)
}

/// Runs `ltt track` against stdin and stdout on a current-thread runtime.
pub fn run_stdio<S: TimeStore, C: Clock>(
    tracker: &mut Tracker<S, C>,
    customer: Option<&str>,
) -> Result<()> {
    if let Some(reference) = customer {
        let Some(id) = find_customer(tracker.customers(), reference).map(|c| c.id.clone()) else {
            anyhow::bail!("no active customer matching '{reference}'");
        };
        tracker
            .select_customer(Some(id))
            .context("failed to load time log")?;
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to initialize tokio runtime")?;
    let input = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    let result = runtime.block_on(run(tracker, input, &mut stdout));
    // A pending stdin read would otherwise block runtime shutdown
    runtime.shutdown_background();
    result
}
