//! Audio capture seam.
//!
//! The detection pipeline consumes an ordered stream of timestamped blocks
//! through [`BlockSource`], so the same code runs against a live microphone
//! ([`capture::LiveCapture`]), a recorded WAV file ([`replay::WavReplay`]),
//! or synthetic blocks in tests.

pub mod capture;
pub mod replay;

/// One block of captured audio. Ephemeral; never persisted.
#[derive(Debug, Clone)]
pub struct AudioBlock {
    /// Interleaved sample frames.
    pub samples: Vec<f32>,
    pub channels: u16,
    pub sample_rate: u32,
    /// Seconds since capture start, at the block's first frame.
    pub timestamp: f64,
}

impl AudioBlock {
    /// The first channel of the interleaved frame buffer. Analysis always
    /// uses this channel regardless of how many the device delivers.
    pub fn primary_channel(&self) -> Vec<f32> {
        let step = self.channels.max(1) as usize;
        self.samples.iter().step_by(step).copied().collect()
    }
}

/// What a capture source hands the pipeline: a block, or the driver error
/// that arrived in its place.
#[derive(Debug)]
pub enum CaptureEvent {
    Block(AudioBlock),
    Error(String),
}

/// An ordered sequence of audio blocks, live or replayed.
///
/// Sources deliver blocks one at a time, in order; `None` means the stream
/// is exhausted. A driver error is delivered in-stream so the consumer can
/// skip that block and keep going.
pub trait BlockSource {
    fn next_event(&mut self) -> Option<CaptureEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_channel_deinterleaves() {
        let block = AudioBlock {
            samples: vec![1.0, -1.0, 2.0, -2.0, 3.0, -3.0],
            channels: 2,
            sample_rate: 44_000,
            timestamp: 0.0,
        };

        assert_eq!(block.primary_channel(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_primary_channel_mono_is_identity() {
        let block = AudioBlock {
            samples: vec![0.5, 0.25, 0.125],
            channels: 1,
            sample_rate: 44_000,
            timestamp: 0.0,
        };

        assert_eq!(block.primary_channel(), block.samples);
    }
}
