//! Short-time spectral analysis of captured audio blocks.
//!
//! Each capture block is analyzed independently: the block is split into
//! Hann-windowed segments, each segment is FFT'd, and the one-sided power
//! spectra are collected into a time-frequency magnitude matrix. The
//! classifier then inspects one column (time slice) at a time.

use crate::config::DetectionConfig;
use rustfft::{FftPlanner, num_complex::Complex};

/// Time-frequency energy representation of one audio block.
///
/// `frequencies` are the bin centers in Hz (ascending), `times` are slice
/// centers in seconds relative to the start of the block.
pub struct Spectrogram {
    pub frequencies: Vec<f64>,
    pub times: Vec<f64>,
    // bins x slices, row-major by frequency bin
    magnitudes: Vec<f32>,
}

impl Spectrogram {
    pub(crate) fn from_parts(
        frequencies: Vec<f64>,
        times: Vec<f64>,
        magnitudes: Vec<f32>,
    ) -> Self {
        debug_assert_eq!(magnitudes.len(), frequencies.len() * times.len());
        Self {
            frequencies,
            times,
            magnitudes,
        }
    }

    pub fn num_bins(&self) -> usize {
        self.frequencies.len()
    }

    pub fn num_slices(&self) -> usize {
        self.times.len()
    }

    pub fn magnitude(&self, bin: usize, slice: usize) -> f32 {
        self.magnitudes[bin * self.times.len() + slice]
    }
}

/// Computes spectrograms over capture blocks. Stateless across blocks; the
/// struct only caches the window and FFT plan.
pub struct SpectrogramAnalyzer {
    segment_len: usize,
    hop: usize,
    window: Vec<f32>,
    window_power: f32,
    fft_planner: FftPlanner<f32>,
}

impl SpectrogramAnalyzer {
    pub fn new(config: &DetectionConfig) -> Self {
        // Hann window to reduce spectral leakage
        let segment_len = config.segment_len;
        let mut window = vec![0.0; segment_len];
        for i in 0..segment_len {
            window[i] = 0.5
                * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / segment_len as f32).cos());
        }
        let window_power = window.iter().map(|w| w * w).sum();

        Self {
            segment_len,
            hop: config.hop(),
            window,
            window_power,
            fft_planner: FftPlanner::new(),
        }
    }

    /// Analyze one channel of one block.
    ///
    /// A block shorter than a single segment yields a spectrogram with zero
    /// slices, so the classifier simply sees nothing for that block.
    pub fn analyze(&mut self, samples: &[f32], sample_rate: u32) -> Spectrogram {
        let n_bins = self.segment_len / 2 + 1;
        let frequencies: Vec<f64> = (0..n_bins)
            .map(|k| k as f64 * sample_rate as f64 / self.segment_len as f64)
            .collect();

        let num_slices = if samples.len() >= self.segment_len {
            (samples.len() - self.segment_len) / self.hop + 1
        } else {
            0
        };
        let times: Vec<f64> = (0..num_slices)
            .map(|i| (i * self.hop + self.segment_len / 2) as f64 / sample_rate as f64)
            .collect();

        let mut magnitudes = vec![0.0f32; n_bins * num_slices];
        if num_slices == 0 {
            return Spectrogram::from_parts(frequencies, times, magnitudes);
        }

        let fft = self.fft_planner.plan_fft_forward(self.segment_len);
        // Density scaling so magnitudes are comparable across sample rates
        let scale = 1.0 / (sample_rate as f32 * self.window_power);
        let mut buffer: Vec<Complex<f32>> = Vec::with_capacity(self.segment_len);

        for slice in 0..num_slices {
            let start = slice * self.hop;
            buffer.clear();
            buffer.extend(
                samples[start..start + self.segment_len]
                    .iter()
                    .zip(self.window.iter())
                    .map(|(&s, &w)| Complex::new(s * w, 0.0)),
            );
            fft.process(&mut buffer);

            for bin in 0..n_bins {
                let mut power = buffer[bin].norm_sqr() * scale;
                // One-sided spectrum: double everything except DC and Nyquist
                if bin != 0 && bin != n_bins - 1 {
                    power *= 2.0;
                }
                magnitudes[bin * num_slices + slice] = power;
            }
        }

        Spectrogram::from_parts(frequencies, times, magnitudes)
    }
}
