//! # cli — interactive `add` / `close` / `stats`
//!
//! Each command prompts line by line, validates as it goes and aborts on the
//! first bad answer.  Reader and writer are generic so the flows run against
//! in-memory buffers in tests.

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{bail, Context};

use crate::error::AppError;
use crate::models::{
    trade::{parse_optional_price, parse_price, parse_trade_id},
    DateRange, Direction, NewTrade, Outcome, Setup,
};
use crate::store::TradeStore;

pub struct Prompter<R, W> {
    input:  R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Prints `label: ` and returns the trimmed answer.
    pub fn ask(&mut self, label: &str) -> anyhow::Result<String> {
        write!(self.output, "{label}: ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            bail!("unexpected end of input while reading '{label}'");
        }
        Ok(line.trim().to_string())
    }

    pub fn say(&mut self, line: &str) -> anyhow::Result<()> {
        writeln!(self.output, "{line}")?;
        Ok(())
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

/// Resolves an optional screenshot answer to an absolute path.
fn screenshot_path(raw: &str) -> anyhow::Result<Option<String>> {
    if raw.is_empty() {
        return Ok(None);
    }
    let path = Path::new(raw);
    if !path.exists() {
        return Err(AppError::validation("Screenshot file does not exist").into());
    }
    let resolved = path
        .canonicalize()
        .with_context(|| format!("cannot resolve screenshot path '{raw}'"))?;
    Ok(Some(resolved.display().to_string()))
}

// ─── add ──────────────────────────────────────────────────────────────────────

pub async fn add_trade<R, W>(store: &dyn TradeStore, io: &mut Prompter<R, W>) -> anyhow::Result<i64>
where
    R: BufRead,
    W: Write,
{
    let symbol = io.ask("Symbol (e.g. EURUSD)")?;
    let direction: Direction = io.ask("Direction (LONG / SHORT)")?.parse()?;
    let setup: Setup = io.ask("Setup type (A / B / C)")?.parse()?;
    let entry_price = parse_price(&io.ask("Entry price")?, "Entry price")?;
    let notes = io.ask("Notes (optional)")?;
    let screenshot = screenshot_path(&io.ask("Screenshot path (optional)")?)?;

    let new_trade = NewTrade::new(&symbol, direction, setup, entry_price)?
        .with_notes(Some(notes))
        .with_screenshot(screenshot);

    let id = store.insert(new_trade).await?;
    io.say("")?;
    io.say(&format!("✅ Trade recorded with ID: {id}"))?;
    Ok(id)
}

// ─── close ────────────────────────────────────────────────────────────────────

pub async fn close_trade<R, W>(
    store: &dyn TradeStore,
    io: &mut Prompter<R, W>,
) -> anyhow::Result<(i64, Outcome)>
where
    R: BufRead,
    W: Write,
{
    let id = parse_trade_id(&io.ask("Trade ID to close")?)?;
    let outcome: Outcome = io.ask("Outcome (WIN / LOSS / BREAKEVEN)")?.parse()?;
    let exit_price = parse_optional_price(&io.ask("Exit price (optional)")?, "Exit price")?;

    store.close(id, outcome, exit_price).await?;
    io.say("")?;
    io.say(&format!("✅ Trade {id} closed as {outcome}"))?;
    Ok((id, outcome))
}

// ─── stats ────────────────────────────────────────────────────────────────────

pub async fn show_stats<W: Write>(
    store: &dyn TradeStore,
    range: DateRange,
    out: &mut W,
) -> anyhow::Result<()> {
    writeln!(out, "\n=== Win Rate by Setup ===")?;
    let by_setup = store.stats_by_setup(range).await?;
    if by_setup.is_empty() {
        writeln!(out, "(no closed trades)")?;
    }
    for row in by_setup {
        let t = row.tally;
        writeln!(
            out,
            "{:<6} trades: {:>4}  wins: {:>4}  losses: {:>4}  win rate: {}",
            row.setup, t.total, t.wins, t.losses, t.win_rate_label()
        )?;
    }

    writeln!(out, "\n=== Win Rate by Direction ===")?;
    let by_direction = store.stats_by_direction(range).await?;
    if by_direction.is_empty() {
        writeln!(out, "(no closed trades)")?;
    }
    for row in by_direction {
        let t = row.tally;
        writeln!(
            out,
            "{:<6} trades: {:>4}  wins: {:>4}  losses: {:>4}  win rate: {}",
            row.direction, t.total, t.wins, t.losses, t.win_rate_label()
        )?;
    }

    out.flush().context("failed to write statistics")?;
    Ok(())
}
