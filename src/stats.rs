//! Offline aggregation of a beep journal.
//!
//! Reduces a decoded event sequence into two series - beep durations (ms)
//! and inter-beep delays (s) - and renders the summary report. For N
//! events there are N durations but only N-1 delays (the first beep has no
//! preceding gap); the chronological report reproduces that length
//! mismatch as-is instead of padding it.

use crate::event::BeepEvent;
use std::fmt::Write;

/// Descriptive statistics over one series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population standard deviation.
    pub stddev: f64,
}

impl Summary {
    /// `None` for an empty series.
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let count = values.len();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / count as f64;
        let variance =
            values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / count as f64;

        Some(Self {
            count,
            min,
            max,
            mean,
            stddev: variance.sqrt(),
        })
    }
}

/// Beep durations in milliseconds, one per event.
pub fn durations_ms(events: &[BeepEvent]) -> Vec<f64> {
    events.iter().map(BeepEvent::duration_ms).collect()
}

/// Gaps between consecutive beeps in seconds: end of one to start of the
/// next. One fewer than the number of events.
pub fn interbeep_delays(events: &[BeepEvent]) -> Vec<f64> {
    events
        .windows(2)
        .map(|pair| pair[1].start_timestamp - pair[0].end_timestamp)
        .collect()
}

/// Render a delay as `HH:MM:SS.mmm` by floor division.
pub fn format_delay(delay: f64) -> String {
    let hours = (delay / 3600.0).floor();
    let minutes = ((delay - hours * 3600.0) / 60.0).floor();
    let seconds = delay - hours * 3600.0 - minutes * 60.0;
    let milliseconds = (seconds - seconds.floor()) * 1000.0;
    format!(
        "{:02}:{:02}:{:02}.{:03}",
        hours as u64, minutes as u64, seconds as u64, milliseconds as u64
    )
}

/// Render the full analysis report for a journal's events.
///
/// The chronological section walks duration/following-delay pairs and then
/// prints the final beep's duration on its own - it has no delay after it,
/// and the first beep none before it.
pub fn render_report(events: &[BeepEvent]) -> String {
    let durations = durations_ms(events);
    let delays = interbeep_delays(events);

    let mut out = String::new();
    render_series(&mut out, "BEEP DURATIONS", &durations, "ms");
    out.push('\n');
    render_series(&mut out, "INTERBEEP PAUSES", &delays, "s");
    out.push('\n');

    let _ = writeln!(out, "FULL LOG:");
    for (i, (duration, delay)) in durations.iter().zip(delays.iter()).enumerate() {
        let _ = writeln!(out, "{}\tBEEP: {:02}ms", i + 1, *duration as i64);
        let _ = writeln!(out, "\tDELAY: {}", format_delay(*delay));
    }
    if let Some(last) = durations.last() {
        let _ = writeln!(out, "{}\tBEEP: {:02}ms", durations.len(), *last as i64);
    }

    out
}

fn render_series(out: &mut String, title: &str, values: &[f64], unit: &str) {
    let _ = writeln!(out, "{}", title);
    match Summary::of(values) {
        Some(summary) => {
            let _ = writeln!(out, "count:\t{}", summary.count);
            let _ = writeln!(out, "min:\t{:.6}{}", summary.min, unit);
            let _ = writeln!(out, "max:\t{:.6}{}", summary.max, unit);
            let _ = writeln!(out, "mean:\t{:.6}{}", summary.mean, unit);
            let _ = writeln!(out, "stddev:\t{:.6}{}", summary.stddev, unit);
        }
        None => {
            let _ = writeln!(out, "count:\t0");
        }
    }
}
