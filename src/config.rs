//! Build-time constants for capture and detection.
//!
//! There is deliberately no config file or environment lookup: the harness
//! is tuned once against the bench setup (microphone, beeper tone,
//! experimentally measured signal floor) and the numbers live here.

/// Fixed parameters for the audio input stream.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Input device name, matched against the enumerated device list.
    pub device_name: String,
    /// Capture sample rate in Hz.
    pub sample_rate: u32,
    /// Channels delivered by the device; analysis uses the first.
    pub channels: u16,
    /// Duration of one capture block in milliseconds.
    pub block_ms: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device_name: "Yeti".to_string(),
            sample_rate: 44_000,
            channels: 2,
            block_ms: 200,
        }
    }
}

impl CaptureConfig {
    /// Frames per capture block.
    pub fn block_frames(&self) -> usize {
        self.sample_rate as usize * self.block_ms as usize / 1000
    }
}

/// Thresholds and spectrogram geometry for beep classification.
#[derive(Debug, Clone)]
pub struct DetectionConfig {
    /// The beeper's nominal tone in Hz.
    pub target_frequency: f64,
    /// How many Hz off the nominal tone still counts as the beeper.
    pub max_frequency_deviation: f64,
    /// Minimum spectrogram magnitude for a slice to count as signal.
    /// Determined experimentally by recording some beeps and seeing what
    /// the signal levels were in the spectrogram.
    pub min_signal_strength: f64,
    /// Samples per spectrogram segment.
    pub segment_len: usize,
    /// Samples of overlap between consecutive segments.
    pub overlap: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            target_frequency: 4000.0,
            max_frequency_deviation: 150.0,
            min_signal_strength: 1e-4,
            segment_len: 256,
            overlap: 32,
        }
    }
}

impl DetectionConfig {
    /// Samples between the starts of consecutive segments.
    pub fn hop(&self) -> usize {
        self.segment_len - self.overlap
    }
}
