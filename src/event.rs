//! Beep event types.
//!
//! A beep is observed in two stages: an [`OpenBeep`] carries only the start
//! fields while the tone is still sounding, and closing it produces the
//! immutable [`BeepEvent`] that gets persisted. Only closed events ever
//! reach the journal.

use serde::{Deserialize, Serialize};

/// A beep whose start has been observed but whose end has not.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpenBeep {
    pub start_timestamp: f64,
    pub start_frequency: f64,
    pub start_signal_strength: f64,
}

impl OpenBeep {
    /// Close this beep with the end-of-beep slice's measurements.
    pub fn close(
        self,
        end_timestamp: f64,
        end_frequency: f64,
        end_signal_strength: f64,
    ) -> BeepEvent {
        BeepEvent {
            start_timestamp: self.start_timestamp,
            start_frequency: self.start_frequency,
            start_signal_strength: self.start_signal_strength,
            end_timestamp,
            end_frequency,
            end_signal_strength,
        }
    }
}

/// One detected beep, bounded by start/end timestamps in seconds.
///
/// The six fields are exactly what the journal persists per record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeepEvent {
    pub start_timestamp: f64,
    pub start_frequency: f64,
    pub start_signal_strength: f64,
    pub end_timestamp: f64,
    pub end_frequency: f64,
    pub end_signal_strength: f64,
}

impl BeepEvent {
    pub fn duration_ms(&self) -> f64 {
        (self.end_timestamp - self.start_timestamp) * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_carries_start_and_end_fields() {
        let open = OpenBeep {
            start_timestamp: 1.5,
            start_frequency: 4010.0,
            start_signal_strength: 0.002,
        };

        let event = open.close(1.52, 3950.0, 0.0001);

        assert_eq!(event.start_timestamp, 1.5);
        assert_eq!(event.start_frequency, 4010.0);
        assert_eq!(event.start_signal_strength, 0.002);
        assert_eq!(event.end_timestamp, 1.52);
        assert_eq!(event.end_frequency, 3950.0);
        assert_eq!(event.end_signal_strength, 0.0001);
    }

    #[test]
    fn test_duration_ms() {
        let event = BeepEvent {
            start_timestamp: 1.0,
            start_frequency: 4000.0,
            start_signal_strength: 0.01,
            end_timestamp: 1.02,
            end_frequency: 4000.0,
            end_signal_strength: 0.01,
        };
        assert!((event.duration_ms() - 20.0).abs() < 1e-9);
    }
}
