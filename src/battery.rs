//! Battery lifespan estimate for the beeper under test.
//!
//! Closed-form arithmetic over the device's measured current draws and its
//! beep/sleep duty cycle. The device sleeps between beeps, waking briefly
//! each sleep period; a beep fires after a randomized number of sleeps, so
//! the estimate uses the midpoint.

use std::fmt::Write;

/// Measured electrical and timing characteristics of the device.
#[derive(Debug, Clone)]
pub struct BatteryParams {
    /// Current drawn while the buzzer sounds, in amps.
    pub beep_current_a: f64,
    /// Beep duration in seconds.
    pub beep_length_s: f64,
    /// Sleep-mode current in amps.
    pub idle_current_a: f64,
    /// One sleep period in seconds.
    pub sleep_length_s: f64,
    /// Current while awake but not beeping, in amps.
    pub active_nobeep_current_a: f64,
    /// Time to wake, decide, and return to sleep, in seconds.
    pub wakeup_turnaround_s: f64,
    /// Fewest sleep periods between beeps.
    pub min_interbeep_sleeps: f64,
    /// Most sleep periods between beeps.
    pub max_interbeep_sleeps: f64,
    /// Battery capacity in amp-hours.
    pub battery_capacity_ah: f64,
}

impl Default for BatteryParams {
    fn default() -> Self {
        Self {
            beep_current_a: 1.5e-3,
            beep_length_s: 20e-3,
            idle_current_a: 4.4e-6,
            sleep_length_s: 8.0,
            active_nobeep_current_a: 655.0e-6,
            wakeup_turnaround_s: 21e-6,
            min_interbeep_sleeps: 20.0,
            max_interbeep_sleeps: 60.0,
            battery_capacity_ah: 0.040,
        }
    }
}

/// Derived figures, kept separately so the report can show its work.
#[derive(Debug, Clone, Copy)]
pub struct BatteryEstimate {
    pub avg_sleep_current_a: f64,
    pub avg_interbeep_sleeps: f64,
    pub avg_current_a: f64,
    pub lifespan_hours: f64,
    pub lifespan_days: f64,
    pub lifespan_years: f64,
}

pub fn estimate(params: &BatteryParams) -> BatteryEstimate {
    // One sleep cycle = the sleep itself plus the wakeup turnaround
    let cycle_s = params.sleep_length_s + params.wakeup_turnaround_s;
    let avg_sleep_current_a = (params.sleep_length_s * params.idle_current_a
        + params.wakeup_turnaround_s * params.active_nobeep_current_a)
        / cycle_s;

    let avg_interbeep_sleeps =
        (params.min_interbeep_sleeps + params.max_interbeep_sleeps) / 2.0;

    let avg_current_a = (avg_interbeep_sleeps * avg_sleep_current_a * cycle_s
        + params.beep_current_a * params.beep_length_s)
        / (avg_interbeep_sleeps * cycle_s + params.beep_length_s);

    let lifespan_hours = params.battery_capacity_ah / avg_current_a;
    let lifespan_days = lifespan_hours / 24.0;
    let lifespan_years = lifespan_days / 365.0;

    BatteryEstimate {
        avg_sleep_current_a,
        avg_interbeep_sleeps,
        avg_current_a,
        lifespan_hours,
        lifespan_days,
        lifespan_years,
    }
}

/// Render the step-by-step estimate report.
pub fn render_report(params: &BatteryParams) -> String {
    let est = estimate(params);
    let mut out = String::new();

    let _ = writeln!(out, "Beep current (A): {}", params.beep_current_a);
    let _ = writeln!(out, "Beep length (s): {}", params.beep_length_s);
    let _ = writeln!(out);
    let _ = writeln!(out, "Idle current (A): {}", params.idle_current_a);
    let _ = writeln!(out, "Sleep length (s): {}", params.sleep_length_s);
    let _ = writeln!(
        out,
        "Active current w/o beeping (A): {}",
        params.active_nobeep_current_a
    );
    let _ = writeln!(
        out,
        "Wakeup turnaround time (s): {}",
        params.wakeup_turnaround_s
    );
    let _ = writeln!(out, "\tAvg sleep current (A): {}", est.avg_sleep_current_a);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Min sleeps between beeps (#): {}",
        params.min_interbeep_sleeps
    );
    let _ = writeln!(
        out,
        "Max sleeps between beeps (#): {}",
        params.max_interbeep_sleeps
    );
    let _ = writeln!(
        out,
        "\tAvg sleeps between beeps (#): {}",
        est.avg_interbeep_sleeps
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "\tTotal avg current consumption (A): {}",
        est.avg_current_a
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Battery capacity (Ah): {}", params.battery_capacity_ah);
    let _ = writeln!(out, "\tEstimated lifespan (hours): {:.1}", est.lifespan_hours);
    let _ = writeln!(out, "\tEstimated lifespan (days): {:.1}", est.lifespan_days);
    let _ = writeln!(out, "\tEstimated lifespan (years): {:.3}", est.lifespan_years);

    out
}
