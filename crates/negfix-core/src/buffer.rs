//! Pixel buffers and per-channel vectors
//!
//! A [`PixelBuffer`] holds interleaved `f32` samples laid out as
//! (height, width, channels). Samples keep their native value units (0-255
//! for 8-bit sources, 0-65535 for 16-bit) throughout the pipeline.

use std::ops::Index;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::bit_depth::{Sample, StorageType};
use crate::error::ToneError;

/// Threshold for switching to parallel processing (100k pixels * 3 channels)
pub(crate) const PARALLEL_THRESHOLD: usize = 300_000;

/// Pixels per parallel work item
const CHUNK_PIXELS: usize = 256;

/// Three-dimensional sample buffer, row-major with interleaved channels.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    height: usize,
    width: usize,
    channels: usize,
    data: Vec<f32>,
}

impl PixelBuffer {
    /// Wrap interleaved samples, checking that they fill a
    /// `height x width x channels` grid.
    pub fn new(
        height: usize,
        width: usize,
        channels: usize,
        data: Vec<f32>,
    ) -> Result<Self, ToneError> {
        if channels == 0 {
            return Err(ToneError::shape("buffer must have at least one channel"));
        }
        if height == 0 || width == 0 {
            return Err(ToneError::shape(format!(
                "buffer has no pixels ({}x{})",
                width, height
            )));
        }
        let expected = height
            .checked_mul(width)
            .and_then(|n| n.checked_mul(channels))
            .ok_or_else(|| ToneError::shape("buffer dimensions overflow"))?;
        if data.len() != expected {
            return Err(ToneError::shape(format!(
                "expected {} samples for {}x{}x{}, got {}",
                expected,
                height,
                width,
                channels,
                data.len()
            )));
        }

        Ok(Self {
            height,
            width,
            channels,
            data,
        })
    }

    /// Buffer with every sample set to `value`
    pub fn filled(
        height: usize,
        width: usize,
        channels: usize,
        value: f32,
    ) -> Result<Self, ToneError> {
        let len = height.saturating_mul(width).saturating_mul(channels);
        Self::new(height, width, channels, vec![value; len])
    }

    /// Promote integer samples to a floating-point buffer.
    pub fn from_samples<T: Sample>(
        height: usize,
        width: usize,
        channels: usize,
        samples: &[T],
    ) -> Result<Self, ToneError> {
        let data = samples.iter().map(|&s| s.to_f32()).collect();
        Self::new(height, width, channels, data)
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// (height, width, channels)
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height, self.width, self.channels)
    }

    pub fn pixel_count(&self) -> usize {
        self.height * self.width
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    /// Iterate over the samples of one channel.
    pub fn channel_values(&self, channel: usize) -> impl Iterator<Item = f32> + '_ {
        self.data
            .iter()
            .skip(channel)
            .step_by(self.channels)
            .copied()
    }

    /// Apply `f` to every sample.
    pub(crate) fn map_values<F>(mut self, f: F) -> Self
    where
        F: Fn(f32) -> f32 + Sync,
    {
        if self.data.len() >= PARALLEL_THRESHOLD {
            let chunk = CHUNK_PIXELS * self.channels;
            self.data.par_chunks_mut(chunk).for_each(|chunk| {
                for value in chunk.iter_mut() {
                    *value = f(*value);
                }
            });
        } else {
            for value in self.data.iter_mut() {
                *value = f(*value);
            }
        }
        self
    }

    /// Apply `f(channel, sample)` to every sample.
    pub(crate) fn map_channels<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, f32) -> f32 + Sync,
    {
        let channels = self.channels;
        let apply = |chunk: &mut [f32]| {
            for pixel in chunk.chunks_exact_mut(channels) {
                for (c, value) in pixel.iter_mut().enumerate() {
                    *value = f(c, *value);
                }
            }
        };

        if self.data.len() >= PARALLEL_THRESHOLD {
            self.data
                .par_chunks_mut(CHUNK_PIXELS * channels)
                .for_each(apply);
        } else {
            apply(&mut self.data);
        }
        self
    }

    /// Clip to `[0, ceiling]`.
    pub fn clip(self, ceiling: f32) -> Self {
        self.map_values(|v| v.clamp(0.0, ceiling))
    }

    /// Quantize to integer samples of type `T`.
    ///
    /// Samples are interpreted in units of `source_ceiling` and rescaled to
    /// the ceiling of `T` when the two differ, then clipped and rounded.
    pub fn to_samples<T: Sample>(&self, source_ceiling: f32) -> Vec<T> {
        let target_ceiling = T::STORAGE.ceiling();
        let scale = if source_ceiling > 0.0 {
            target_ceiling / source_ceiling
        } else {
            0.0
        };
        let quantize = |v: f32| T::from_f32((v * scale).clamp(0.0, target_ceiling).round());

        if self.data.len() >= PARALLEL_THRESHOLD {
            self.data.par_iter().map(|&v| quantize(v)).collect()
        } else {
            self.data.iter().map(|&v| quantize(v)).collect()
        }
    }

    /// Quantize into the sample container for `target`.
    pub fn to_sample_data(&self, source_ceiling: f32, target: StorageType) -> SampleData {
        match target {
            StorageType::U8 => SampleData::U8(self.to_samples::<u8>(source_ceiling)),
            StorageType::U16 => SampleData::U16(self.to_samples::<u16>(source_ceiling)),
        }
    }

    /// Min, max and mean over all samples
    pub fn stats(&self) -> BufferStats {
        let mut min = f32::MAX;
        let mut max = f32::MIN;
        let mut sum = 0.0f64;

        for &value in &self.data {
            min = min.min(value);
            max = max.max(value);
            sum += value as f64;
        }

        BufferStats {
            min,
            max,
            mean: (sum / self.data.len() as f64) as f32,
        }
    }
}

/// Summary statistics used for debug logging
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BufferStats {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
}

/// Quantized samples ready for an encoder
#[derive(Debug, Clone, PartialEq)]
pub enum SampleData {
    U8(Vec<u8>),
    U16(Vec<u16>),
}

impl SampleData {
    pub fn storage(&self) -> StorageType {
        match self {
            SampleData::U8(_) => StorageType::U8,
            SampleData::U16(_) => StorageType::U16,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SampleData::U8(v) => v.len(),
            SampleData::U16(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One scalar per channel (black point, white point).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelVector(Vec<f32>);

impl ChannelVector {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    /// The same value for every channel
    pub fn splat(value: f32, channels: usize) -> Self {
        Self(vec![value; channels])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.0.iter().copied()
    }

    /// Fail with `ShapeMismatch` unless there is one value per channel.
    pub fn check_channels(&self, name: &str, channels: usize) -> Result<(), ToneError> {
        if self.0.len() != channels {
            return Err(ToneError::shape(format!(
                "{} has {} values but the buffer has {} channels",
                name,
                self.0.len(),
                channels
            )));
        }
        Ok(())
    }
}

impl From<Vec<f32>> for ChannelVector {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

impl Index<usize> for ChannelVector {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.0[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_bad_shapes() {
        assert!(matches!(
            PixelBuffer::new(2, 2, 0, vec![]),
            Err(ToneError::ShapeMismatch(_))
        ));
        assert!(matches!(
            PixelBuffer::new(0, 2, 1, vec![]),
            Err(ToneError::ShapeMismatch(_))
        ));
        assert!(matches!(
            PixelBuffer::new(2, 2, 3, vec![0.0; 11]),
            Err(ToneError::ShapeMismatch(_))
        ));
        assert!(PixelBuffer::new(2, 2, 3, vec![0.0; 12]).is_ok());
    }

    #[test]
    fn test_channel_values_are_strided() {
        let buffer = PixelBuffer::new(1, 2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let green: Vec<f32> = buffer.channel_values(1).collect();
        assert_eq!(green, vec![2.0, 5.0]);
    }

    #[test]
    fn test_from_samples_promotes() {
        let buffer = PixelBuffer::from_samples::<u16>(1, 2, 1, &[0, 65535]).unwrap();
        assert_eq!(buffer.data(), &[0.0, 65535.0]);
    }

    #[test]
    fn test_to_samples_clips_and_rounds() {
        let buffer = PixelBuffer::new(1, 4, 1, vec![-3.0, 12.4, 12.6, 300.0]).unwrap();
        let samples = buffer.to_samples::<u8>(255.0);
        assert_eq!(samples, vec![0, 12, 13, 255]);
    }

    #[test]
    fn test_to_samples_rescales_between_depths() {
        let buffer = PixelBuffer::new(1, 3, 1, vec![0.0, 65535.0, 32768.0]).unwrap();
        let samples = buffer.to_samples::<u8>(65535.0);
        assert_eq!(samples, vec![0, 255, 128]);

        let buffer = PixelBuffer::new(1, 2, 1, vec![0.0, 255.0]).unwrap();
        assert_eq!(
            buffer.to_sample_data(255.0, StorageType::U16),
            SampleData::U16(vec![0, 65535])
        );
    }

    #[test]
    fn test_parallel_map_matches_sequential() {
        let len = PARALLEL_THRESHOLD + 3 * 17;
        let data: Vec<f32> = (0..len).map(|i| (i % 256) as f32).collect();
        let big = PixelBuffer::new(len / 3, 1, 3, data.clone()).unwrap();
        let mapped = big.map_channels(|c, v| v * (c + 1) as f32);
        for (i, (&out, &inp)) in mapped.data().iter().zip(data.iter()).enumerate() {
            assert_eq!(out, inp * ((i % 3) + 1) as f32);
        }
    }

    #[test]
    fn test_stats() {
        let buffer = PixelBuffer::new(1, 4, 1, vec![0.0, 10.0, 20.0, 30.0]).unwrap();
        let stats = buffer.stats();
        assert_eq!(stats.min, 0.0);
        assert_eq!(stats.max, 30.0);
        assert!((stats.mean - 15.0).abs() < 1e-6);
    }

    #[test]
    fn test_channel_vector_check() {
        let v = ChannelVector::splat(10.0, 3);
        assert!(v.check_channels("black point", 3).is_ok());
        assert!(matches!(
            v.check_channels("black point", 1),
            Err(ToneError::ShapeMismatch(_))
        ));
        assert_eq!(v[2], 10.0);
    }
}
