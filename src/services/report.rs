//! Plain-text report formatting.
//!
//! Delivery is left to the caller; `chunk_message` splits a report into
//! pieces small enough for chat sinks with a per-message size cap.

use crate::types::{ReportEntry, ReportedState, SignalRecord};
use chrono::{DateTime, TimeZone, Utc};

/// Default per-message cap, a little under Telegram's 4096.
pub const DEFAULT_CHUNK_CHARS: usize = 4000;

/// Render an epoch-millisecond timestamp as `YYYY-MM-DD HH:MM UTC`.
pub fn format_time(ms: i64) -> String {
    match Utc.timestamp_millis_opt(ms).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => ms.to_string(),
    }
}

fn format_price(price: f64) -> String {
    if price.abs() >= 1.0 {
        format!("{:.2}", price)
    } else {
        format!("{:.6}", price)
    }
}

/// One line per record.
pub fn format_record(record: &SignalRecord) -> String {
    let mut line = String::new();

    if record.is_new {
        line.push_str("[NEW] ");
    }
    line.push_str(&format!("{} {}", record.timeframe, record.state));

    match record.state {
        ReportedState::Long | ReportedState::Short => {
            if let Some(price) = record.entry_price {
                line.push_str(&format!(" @ {}", format_price(price)));
            }
            if let Some(time) = record.entry_time {
                line.push_str(&format!(" since {}", format_time(time)));
            }
            if let Some(pnl) = record.pnl_pct {
                line.push_str(&format!(" | {:+.2}%", pnl));
            }
        }
        ReportedState::Flat => {
            if let Some(time) = record.flip_time {
                line.push_str(&format!(" since {}", format_time(time)));
            }
        }
        ReportedState::WeakBias => {
            if record.is_bullish() {
                line.push_str(" (bullish)");
            } else if record.is_bearish() {
                line.push_str(" (bearish)");
            }
        }
    }

    line.push_str(&format!(" | last {}", format_price(record.last_close)));

    let ind = &record.indicators;
    if let Some(adx) = ind.adx {
        line.push_str(&format!(" | ADX {:.1}", adx));
    }
    if let Some(rsi) = ind.rsi {
        line.push_str(&format!(" RSI {:.1}", rsi));
    }
    if ind.squeeze {
        line.push_str(" squeeze");
    }

    line
}

/// Full report: a header line, then one block per symbol.
pub fn format_report(entries: &[ReportEntry], generated_at: DateTime<Utc>) -> String {
    let mut out = format!(
        "Trend flips {}\n",
        generated_at.format("%Y-%m-%d %H:%M UTC")
    );

    if entries.is_empty() {
        out.push_str("\nNo signals.\n");
        return out;
    }

    for entry in entries {
        out.push('\n');
        out.push_str(&entry.symbol);
        if entry.changed {
            out.push_str(" (changed)");
        }
        out.push('\n');
        for record in &entry.records {
            out.push_str("  ");
            out.push_str(&format_record(record));
            out.push('\n');
        }
    }

    out
}

/// Split `text` into chunks of at most `max_chars` characters.
///
/// Chunks break on line boundaries; a single line longer than `max_chars`
/// is split on char boundaries. Line breaks at chunk edges are dropped.
pub fn chunk_message(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for line in text.lines() {
        let line_len = line.chars().count();

        // Flush when the line (plus its newline) would not fit.
        let needed = if current.is_empty() { line_len } else { line_len + 1 };
        if !current.is_empty() && current_len + needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if line_len > max_chars {
            let chars: Vec<char> = line.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        if !current.is_empty() {
            current.push('\n');
            current_len += 1;
        }
        current.push_str(line);
        current_len += line_len;
    }

    if !current.trim().is_empty() {
        chunks.push(current);
    }

    chunks
}
