//! The detection pipeline: audio blocks in, persisted beep events out.
//!
//! Owns the detector for a run and drives the full chain per block:
//! spectrogram, per-slice classification, segmentation, append. Each
//! closed event reaches the sink before the next slice is examined, so a
//! crash loses at most the beep in flight.

use crate::audio::{BlockSource, CaptureEvent};
use crate::classify;
use crate::config::DetectionConfig;
use crate::detector::BeepDetector;
use crate::event::BeepEvent;
use crate::journal::JournalWriter;
use crate::spectrum::SpectrogramAnalyzer;
use anyhow::Result;

/// Where closed events go. The journal in production; a plain vec in
/// tests.
pub trait EventSink {
    fn persist(&mut self, event: &BeepEvent) -> Result<()>;
}

impl EventSink for JournalWriter {
    fn persist(&mut self, event: &BeepEvent) -> Result<()> {
        self.append(event)?;
        Ok(())
    }
}

impl EventSink for Vec<BeepEvent> {
    fn persist(&mut self, event: &BeepEvent) -> Result<()> {
        self.push(*event);
        Ok(())
    }
}

/// Run the pipeline until the source is exhausted. Returns the number of
/// events persisted.
///
/// A driver error is reported and its block skipped; processing continues
/// with the next block. A beep still open when the stream ends is reported
/// and discarded, never persisted.
pub fn run<S: BlockSource, K: EventSink>(
    source: &mut S,
    config: &DetectionConfig,
    sink: &mut K,
) -> Result<u64> {
    let mut analyzer = SpectrogramAnalyzer::new(config);
    let mut detector = BeepDetector::new();
    let mut persisted = 0u64;

    while let Some(event) = source.next_event() {
        let block = match event {
            CaptureEvent::Block(block) => block,
            CaptureEvent::Error(message) => {
                eprintln!("ERROR: {}", message);
                continue;
            }
        };

        let spectrogram = analyzer.analyze(&block.primary_channel(), block.sample_rate);
        for slice in classify::classify(&spectrogram, block.timestamp, config) {
            let was_open = detector.open_beep().is_some();

            if let Some(beep) = detector.advance(&slice) {
                println!(
                    "END:\t{:.6}\t{:.6}\t{:.6}",
                    beep.end_timestamp, beep.end_frequency, beep.end_signal_strength
                );
                println!("DURATION: {:.6}ms", beep.duration_ms());
                println!();

                sink.persist(&beep)?;
                persisted += 1;
            } else if !was_open {
                if let Some(open) = detector.open_beep() {
                    println!(
                        "START:\t{:.6}\t{:.6}\t{:.6}",
                        open.start_timestamp, open.start_frequency, open.start_signal_strength
                    );
                }
            }
        }
    }

    if let Some(open) = detector.open_beep() {
        eprintln!(
            "Stream ended mid-beep; discarding unterminated beep started at {:.6}s",
            open.start_timestamp
        );
    }

    Ok(persisted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioBlock;
    use crate::config::CaptureConfig;

    /// Synthetic source: a fixed queue of capture events.
    struct ScriptedSource {
        events: std::vec::IntoIter<CaptureEvent>,
    }

    impl ScriptedSource {
        fn new(events: Vec<CaptureEvent>) -> Self {
            Self {
                events: events.into_iter(),
            }
        }
    }

    impl BlockSource for ScriptedSource {
        fn next_event(&mut self) -> Option<CaptureEvent> {
            self.events.next()
        }
    }

    fn tone_block(frequency: f32, timestamp: f64, config: &CaptureConfig) -> AudioBlock {
        let frames = config.block_frames();
        let samples = (0..frames)
            .map(|i| {
                0.5 * (2.0 * std::f32::consts::PI * frequency * i as f32
                    / config.sample_rate as f32)
                    .sin()
            })
            .collect();
        AudioBlock {
            samples,
            channels: 1,
            sample_rate: config.sample_rate,
            timestamp,
        }
    }

    fn silent_block(timestamp: f64, config: &CaptureConfig) -> AudioBlock {
        AudioBlock {
            samples: vec![0.0; config.block_frames()],
            channels: 1,
            sample_rate: config.sample_rate,
            timestamp,
        }
    }

    #[test]
    fn test_tone_between_silence_yields_one_event() {
        let capture = CaptureConfig {
            channels: 1,
            ..CaptureConfig::default()
        };
        let detection = DetectionConfig::default();

        let mut source = ScriptedSource::new(vec![
            CaptureEvent::Block(silent_block(0.0, &capture)),
            CaptureEvent::Block(tone_block(4000.0, 0.2, &capture)),
            CaptureEvent::Block(silent_block(0.4, &capture)),
        ]);
        let mut events = Vec::new();

        let persisted = run(&mut source, &detection, &mut events).unwrap();

        assert_eq!(persisted, 1);
        assert_eq!(events.len(), 1);
        let beep = events[0];
        // Started within the tone block, ended within the trailing silence
        assert!(beep.start_timestamp >= 0.2 && beep.start_timestamp < 0.4);
        assert!(beep.end_timestamp >= 0.4);
        assert!(beep.end_timestamp > beep.start_timestamp);
        assert!((beep.start_frequency - 4000.0).abs() <= detection.max_frequency_deviation);
    }

    #[test]
    fn test_beep_spanning_blocks_yields_one_event() {
        let capture = CaptureConfig {
            channels: 1,
            ..CaptureConfig::default()
        };
        let detection = DetectionConfig::default();

        let mut source = ScriptedSource::new(vec![
            CaptureEvent::Block(tone_block(4000.0, 0.0, &capture)),
            CaptureEvent::Block(tone_block(4000.0, 0.2, &capture)),
            CaptureEvent::Block(silent_block(0.4, &capture)),
        ]);
        let mut events = Vec::new();

        let persisted = run(&mut source, &detection, &mut events).unwrap();

        assert_eq!(persisted, 1);
    }

    #[test]
    fn test_off_frequency_tone_is_ignored() {
        let capture = CaptureConfig {
            channels: 1,
            ..CaptureConfig::default()
        };
        let detection = DetectionConfig::default();

        let mut source = ScriptedSource::new(vec![
            CaptureEvent::Block(tone_block(1000.0, 0.0, &capture)),
            CaptureEvent::Block(silent_block(0.2, &capture)),
        ]);
        let mut events = Vec::new();

        let persisted = run(&mut source, &detection, &mut events).unwrap();

        assert_eq!(persisted, 0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_driver_error_skips_block_and_continues() {
        let capture = CaptureConfig {
            channels: 1,
            ..CaptureConfig::default()
        };
        let detection = DetectionConfig::default();

        let mut source = ScriptedSource::new(vec![
            CaptureEvent::Error("input overflowed".to_string()),
            CaptureEvent::Block(tone_block(4000.0, 0.2, &capture)),
            CaptureEvent::Block(silent_block(0.4, &capture)),
        ]);
        let mut events = Vec::new();

        let persisted = run(&mut source, &detection, &mut events).unwrap();

        assert_eq!(persisted, 1);
    }

    #[test]
    fn test_wav_replay_end_to_end() {
        use crate::audio::replay::WavReplay;
        use crate::journal::{JournalReader, JournalWriter};
        use hound::{SampleFormat, WavSpec, WavWriter};

        let dir = tempfile::tempdir().unwrap();
        let wav_path = dir.path().join("bench.wav");
        let log_path = dir.path().join("beeps.log");

        // 0.7s mono recording: silence, a 4kHz burst from 0.2s to 0.4s,
        // silence again
        let spec = WavSpec {
            channels: 1,
            sample_rate: 44_000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut wav = WavWriter::create(&wav_path, spec).unwrap();
        for i in 0..30_800u32 {
            let sample = if (8800..17_600).contains(&i) {
                (16_000.0
                    * (2.0 * std::f32::consts::PI * 4000.0 * i as f32 / 44_000.0).sin())
                    as i16
            } else {
                0
            };
            wav.write_sample(sample).unwrap();
        }
        wav.finalize().unwrap();

        let mut source = WavReplay::open(&wav_path, 200).unwrap();
        let mut journal = JournalWriter::create(&log_path).unwrap();
        let persisted = run(&mut source, &DetectionConfig::default(), &mut journal).unwrap();
        drop(journal);

        assert_eq!(persisted, 1);
        let events = JournalReader::open(&log_path).unwrap().read_all().unwrap();
        assert_eq!(events.len(), 1);
        assert!(events[0].start_timestamp >= 0.2 && events[0].start_timestamp < 0.4);
        assert!(events[0].end_timestamp > events[0].start_timestamp);
    }

    #[test]
    fn test_open_beep_at_stream_end_is_discarded() {
        let capture = CaptureConfig {
            channels: 1,
            ..CaptureConfig::default()
        };
        let detection = DetectionConfig::default();

        // Tone right up to the end of the stream: never closes
        let mut source = ScriptedSource::new(vec![CaptureEvent::Block(tone_block(
            4000.0, 0.0, &capture,
        ))]);
        let mut events = Vec::new();

        let persisted = run(&mut source, &detection, &mut events).unwrap();

        assert_eq!(persisted, 0);
        assert!(events.is_empty());
    }
}
