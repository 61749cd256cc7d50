//! Audio Buffer Management
//!
//! Provides the planar sample buffer used by every stage of the loop
//! pipeline, and the `SampleSource` trait through which the core reads
//! source audio without knowing the container it came from.

use crate::error::{LoopXfadeError, Result};

// ============================================================================
// Sample Source
// ============================================================================

/// Read access to normalized PCM samples
///
/// Implemented by in-memory buffers and by decoded WAV files. Callers are
/// expected to stay within `[0, length())`; implementations clip any
/// request that runs past the end instead of panicking.
pub trait SampleSource {
    /// Number of independent channels
    fn num_channels(&self) -> usize;

    /// Number of samples per channel
    fn length(&self) -> usize;

    /// Read up to `count` samples of `channel` starting at `offset`
    ///
    /// The returned vector is shorter than `count` when the request runs
    /// past `length()`.
    fn read(&self, channel: usize, offset: usize, count: usize) -> Vec<f32>;
}

// ============================================================================
// Audio Buffer
// ============================================================================

/// Planar 32-bit float audio buffer
///
/// Each channel is a separate `Vec<f32>` and all channels have the same
/// length.
///
/// # Example
/// ```
/// use loopxfade::engine::AudioBuffer;
///
/// let buffer = AudioBuffer::new(2, 1000);
/// assert_eq!(buffer.channels(), 2);
/// assert_eq!(buffer.len(), 1000);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Sample data: outer Vec is channels, inner Vec is samples
    samples: Vec<Vec<f32>>,
}

impl AudioBuffer {
    /// Create a silent buffer with `num_channels` channels of `num_samples` each
    pub fn new(num_channels: usize, num_samples: usize) -> Self {
        Self {
            samples: vec![vec![0.0_f32; num_samples]; num_channels],
        }
    }

    /// Build a buffer from per-channel sample vectors
    ///
    /// # Errors
    /// * `UnsupportedFormat` - If the channels differ in length
    pub fn from_channels(samples: Vec<Vec<f32>>) -> Result<Self> {
        if let Some(first) = samples.first() {
            let expected = first.len();
            if let Some((ch, bad)) = samples
                .iter()
                .enumerate()
                .find(|(_, ch)| ch.len() != expected)
            {
                return Err(LoopXfadeError::UnsupportedFormat {
                    details: format!(
                        "channel {} has {} samples, expected {}",
                        ch,
                        bad.len(),
                        expected
                    ),
                });
            }
        }

        Ok(Self { samples })
    }

    /// Create an audio buffer from interleaved sample data
    ///
    /// # Arguments
    /// * `interleaved` - Interleaved sample data (L, R, L, R, ... for stereo)
    /// * `num_channels` - Number of interleaved channels
    ///
    /// # Errors
    /// * `UnsupportedFormat` - If the channel count is zero or the data length
    ///   is not a whole number of frames
    pub fn from_interleaved(interleaved: &[f32], num_channels: usize) -> Result<Self> {
        if num_channels == 0 {
            return Err(LoopXfadeError::UnsupportedFormat {
                details: "audio with zero channels".to_string(),
            });
        }

        if interleaved.len() % num_channels != 0 {
            return Err(LoopXfadeError::UnsupportedFormat {
                details: format!(
                    "interleaved data length {} is not divisible by channel count {}",
                    interleaved.len(),
                    num_channels
                ),
            });
        }

        let num_samples = interleaved.len() / num_channels;
        let mut samples = vec![Vec::with_capacity(num_samples); num_channels];

        for frame in interleaved.chunks_exact(num_channels) {
            for (ch, &sample) in frame.iter().enumerate() {
                samples[ch].push(sample);
            }
        }

        Ok(Self { samples })
    }

    /// Convert the buffer to interleaved format
    pub fn to_interleaved(&self) -> Vec<f32> {
        let num_channels = self.channels();
        let num_samples = self.len();

        let mut interleaved = Vec::with_capacity(num_channels * num_samples);

        for sample_idx in 0..num_samples {
            for channel in &self.samples {
                interleaved.push(channel[sample_idx]);
            }
        }

        interleaved
    }

    /// Get the number of channels
    #[inline]
    pub fn channels(&self) -> usize {
        self.samples.len()
    }

    /// Get the number of samples per channel
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.first().map(|ch| ch.len()).unwrap_or(0)
    }

    /// Check if the buffer is empty (no samples)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get immutable access to a channel's samples
    ///
    /// # Panics
    /// Panics if the channel index is out of bounds
    #[inline]
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.samples[index]
    }

    /// Iterate over the channels as slices
    pub fn iter_channels(&self) -> impl Iterator<Item = &[f32]> {
        self.samples.iter().map(Vec::as_slice)
    }

    /// Check that every sample is finite (no NaN or infinity)
    pub fn is_finite(&self) -> bool {
        self.samples
            .iter()
            .flat_map(|channel| channel.iter())
            .all(|s| s.is_finite())
    }
}

impl SampleSource for AudioBuffer {
    fn num_channels(&self) -> usize {
        self.channels()
    }

    fn length(&self) -> usize {
        self.len()
    }

    fn read(&self, channel: usize, offset: usize, count: usize) -> Vec<f32> {
        let data = match self.samples.get(channel) {
            Some(data) => data,
            None => return Vec::new(),
        };
        let start = offset.min(data.len());
        let end = offset.saturating_add(count).min(data.len());
        data[start..end].to_vec()
    }
}

// ============================================================================
// Tests
// ============================================================================
