//! Per-slice beep classification.
//!
//! A slice is "active" when the loudest frequency in it looks like the
//! beeper: close enough to the target tone and strong enough to stand out
//! from the noise floor.

use crate::config::DetectionConfig;
use crate::spectrum::Spectrogram;

/// Classifier output for one time slice of a spectrogram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifiedSlice {
    /// Absolute time of the slice in seconds (block time + slice offset).
    pub timestamp: f64,
    /// Frequency of the dominant bin in Hz.
    pub frequency: f64,
    /// Magnitude of the dominant bin.
    pub strength: f64,
    pub active: bool,
}

/// Classify every slice of a spectrogram.
///
/// The dominant bin is the first maximum scanning upward from bin 0, so an
/// exact magnitude tie resolves to the lowest frequency. The deviation
/// bound is inclusive, the strength bound exclusive.
pub fn classify(
    spectrogram: &Spectrogram,
    block_timestamp: f64,
    config: &DetectionConfig,
) -> Vec<ClassifiedSlice> {
    (0..spectrogram.num_slices())
        .map(|slice| {
            let mut main_bin = 0;
            for bin in 1..spectrogram.num_bins() {
                if spectrogram.magnitude(bin, slice) > spectrogram.magnitude(main_bin, slice) {
                    main_bin = bin;
                }
            }

            let frequency = spectrogram.frequencies[main_bin];
            let strength = spectrogram.magnitude(main_bin, slice) as f64;
            let deviation = (frequency - config.target_frequency).abs();
            let active = deviation <= config.max_frequency_deviation
                && strength > config.min_signal_strength;

            ClassifiedSlice {
                timestamp: block_timestamp + spectrogram.times[slice],
                frequency,
                strength,
                active,
            }
        })
        .collect()
}
