//! WAV replay source.
//!
//! Feeds a recorded WAV file through the detection pipeline in blocks of
//! the same duration the live capture would deliver, with timestamps
//! derived from the sample counter. Used for offline re-analysis of bench
//! recordings and for deterministic end-to-end tests.

use crate::audio::{AudioBlock, BlockSource, CaptureEvent};
use anyhow::{Context, Result};
use hound::WavReader;
use std::path::Path;

pub struct WavReplay {
    samples: Vec<f32>,
    pos: usize,
    channels: u16,
    sample_rate: u32,
    samples_per_block: usize,
    frames_emitted: u64,
}

impl WavReplay {
    /// Open a WAV file, normalizing integer PCM to [-1.0, 1.0].
    pub fn open<P: AsRef<Path>>(path: P, block_ms: u32) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = WavReader::open(path)
            .with_context(|| format!("Failed to open WAV file '{}'", path.display()))?;
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => {
                reader.samples::<f32>().collect::<Result<_, _>>()?
            }
            hound::SampleFormat::Int => {
                let full_scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / full_scale))
                    .collect::<Result<_, _>>()?
            }
        };

        let block_frames = spec.sample_rate as usize * block_ms as usize / 1000;
        Ok(Self {
            samples,
            pos: 0,
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            samples_per_block: block_frames.max(1) * spec.channels as usize,
            frames_emitted: 0,
        })
    }
}

impl BlockSource for WavReplay {
    fn next_event(&mut self) -> Option<CaptureEvent> {
        if self.pos >= self.samples.len() {
            return None;
        }

        let end = (self.pos + self.samples_per_block).min(self.samples.len());
        let chunk = self.samples[self.pos..end].to_vec();
        self.pos = end;

        let timestamp = self.frames_emitted as f64 / self.sample_rate as f64;
        self.frames_emitted += (chunk.len() / self.channels.max(1) as usize) as u64;

        Some(CaptureEvent::Block(AudioBlock {
            samples: chunk,
            channels: self.channels,
            sample_rate: self.sample_rate,
            timestamp,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{SampleFormat, WavSpec, WavWriter};

    fn write_wav(path: &Path, samples: &[i16], sample_rate: u32) {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for &sample in samples {
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_blocks_cover_file_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        // 500ms at 1kHz mono: 500 samples, 200ms blocks of 200 frames
        write_wav(&path, &vec![1000i16; 500], 1000);

        let mut replay = WavReplay::open(&path, 200).unwrap();

        let mut timestamps = Vec::new();
        let mut total_frames = 0;
        while let Some(CaptureEvent::Block(block)) = replay.next_event() {
            timestamps.push(block.timestamp);
            total_frames += block.samples.len();
        }

        assert_eq!(total_frames, 500);
        assert_eq!(timestamps, vec![0.0, 0.2, 0.4]);
        assert!(replay.next_event().is_none());
    }

    #[test]
    fn test_int_samples_are_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("full-scale.wav");
        write_wav(&path, &[i16::MAX, 0, i16::MIN], 1000);

        let mut replay = WavReplay::open(&path, 200).unwrap();
        let Some(CaptureEvent::Block(block)) = replay.next_event() else {
            panic!("expected one block");
        };

        assert!(block.samples[0] > 0.99 && block.samples[0] <= 1.0);
        assert_eq!(block.samples[1], 0.0);
        assert_eq!(block.samples[2], -1.0);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(WavReplay::open("/nonexistent/file.wav", 200).is_err());
    }
}
