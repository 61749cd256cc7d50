//! Equal-Power Loop Crossfade
//!
//! Builds the looped output from the extracted segment. Each channel is
//! the concatenation of three parts:
//!
//! | Part   | Output range                          | Content                       |
//! | ------ | ------------------------------------- | ----------------------------- |
//! | prefix | `[0, loop_start)`                     | source, verbatim              |
//! | body   | `[loop_start, loop_end - crossfade)`  | source, verbatim              |
//! | tail   | `[loop_end - crossfade, loop_end]`    | fade-out / fade-in blend      |
//!
//! The tail fades the samples in front of the loop end out while fading
//! the samples in front of the loop start in, so when playback jumps from
//! `loop_end` back to `loop_start` it continues from where the fade-in
//! left off.
//!
//! Gains follow a quarter-period sine/cosine pair, so
//! `fade_out^2 + fade_in^2 == 1` at every point.

use std::f32::consts::FRAC_PI_2;

use log::debug;
use rayon::prelude::*;

use crate::dsp::loop_spec::LoopSpec;
use crate::engine::buffer::AudioBuffer;
use crate::error::Result;

/// Fade-out and fade-in gains at position `i` of a crossfade of `length` samples
///
/// `i` runs from `0` (fade-out 1, fade-in 0) to `length` inclusive
/// (fade-out 0, fade-in 1). A zero-length crossfade is a hard splice and
/// always yields `(1.0, 0.0)`.
#[inline]
pub fn equal_power_gains(i: usize, length: usize) -> (f32, f32) {
    if length == 0 {
        return (1.0, 0.0);
    }

    let phase = i as f32 / length as f32 * FRAC_PI_2;
    (phase.cos(), phase.sin())
}

/// Crossfade one channel of an extracted segment
///
/// Returns `loop_end + 1` samples.
///
/// # Panics
/// Panics if `segment` is shorter than `loop_end + 1` samples. Segments
/// produced by [`extract_segment`](crate::dsp::extract::extract_segment)
/// always satisfy this.
pub fn crossfade_channel(segment: &[f32], spec: &LoopSpec) -> Vec<f32> {
    let LoopSpec {
        loop_start,
        loop_end,
        crossfade,
    } = *spec;

    let fade_out_start = loop_end - crossfade;
    let fade_in_start = loop_start - crossfade;

    let mut output = Vec::with_capacity(spec.output_length());

    // Prefix and body are contiguous in the source
    output.extend_from_slice(&segment[..fade_out_start]);

    for i in 0..=crossfade {
        let (fade_out, fade_in) = equal_power_gains(i, crossfade);
        let outgoing = segment[fade_out_start + i];
        let incoming = segment[fade_in_start + i];
        output.push(outgoing * fade_out + incoming * fade_in);
    }

    output
}

/// Crossfade every channel of an extracted segment
///
/// Channels are processed in parallel; each reads only its own segment
/// data and owns its output.
pub fn crossfade_loop(segment: &AudioBuffer, spec: &LoopSpec) -> Result<AudioBuffer> {
    debug!(
        "Crossfading {} channels: start={} end={} crossfade={}",
        segment.channels(),
        spec.loop_start,
        spec.loop_end,
        spec.crossfade
    );

    let channels: Vec<&[f32]> = segment.iter_channels().collect();
    let output: Vec<Vec<f32>> = channels
        .par_iter()
        .map(|channel| crossfade_channel(channel, spec))
        .collect();

    AudioBuffer::from_channels(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn ramp(len: usize) -> Vec<f32> {
        (0..len).map(|i| (i as f32 * 0.37).sin()).collect()
    }

    #[test]
    fn test_gains_are_equal_power() {
        for length in [1, 2, 7, 50, 441, 4096] {
            for i in 0..=length {
                let (fade_out, fade_in) = equal_power_gains(i, length);
                assert_abs_diff_eq!(fade_out * fade_out + fade_in * fade_in, 1.0, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_gain_endpoints() {
        let (fade_out, fade_in) = equal_power_gains(0, 50);
        assert_eq!(fade_out, 1.0);
        assert_eq!(fade_in, 0.0);

        let (fade_out, fade_in) = equal_power_gains(50, 50);
        assert_abs_diff_eq!(fade_out, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(fade_in, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_gain_midpoint() {
        let (fade_out, fade_in) = equal_power_gains(25, 50);
        assert_abs_diff_eq!(fade_out, std::f32::consts::FRAC_1_SQRT_2, epsilon = 1e-6);
        assert_abs_diff_eq!(fade_in, std::f32::consts::FRAC_1_SQRT_2, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_length_gains() {
        assert_eq!(equal_power_gains(0, 0), (1.0, 0.0));
    }

    #[test]
    fn test_channel_segments() {
        let segment = ramp(851);
        let spec = LoopSpec::new(200, 800, 50);

        let output = crossfade_channel(&segment, &spec);

        assert_eq!(output.len(), 801);
        assert_eq!(&output[..750], &segment[..750]);

        for i in [0, 25, 50] {
            let (fade_out, fade_in) = equal_power_gains(i, 50);
            let expected = segment[750 + i] * fade_out + segment[150 + i] * fade_in;
            assert_abs_diff_eq!(output[750 + i], expected, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_channel_tail_endpoints() {
        let segment = ramp(851);
        let spec = LoopSpec::new(200, 800, 50);

        let output = crossfade_channel(&segment, &spec);

        assert_abs_diff_eq!(output[750], segment[750], epsilon = 1e-6);
        assert_abs_diff_eq!(output[800], segment[200], epsilon = 1e-6);
    }

    #[test]
    fn test_zero_crossfade_is_hard_splice() {
        let segment = ramp(101);
        let spec = LoopSpec::new(40, 100, 0);

        let output = crossfade_channel(&segment, &spec);

        assert_eq!(output.len(), 101);
        assert_eq!(output, segment);
        assert!(output.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_zero_crossfade_at_origin() {
        let output = crossfade_channel(&[0.25], &LoopSpec::new(0, 0, 0));
        assert_eq!(output, vec![0.25]);
    }

    #[test]
    fn test_channels_processed_independently() {
        let left = ramp(121);
        let right: Vec<f32> = left.iter().map(|s| -s * 0.5).collect();
        let segment = AudioBuffer::from_channels(vec![left.clone(), right.clone()]).unwrap();
        let spec = LoopSpec::new(30, 100, 20);

        let output = crossfade_loop(&segment, &spec).unwrap();

        assert_eq!(output.channels(), 2);
        assert_eq!(output.len(), 101);
        assert_eq!(output.channel(0), crossfade_channel(&left, &spec).as_slice());
        assert_eq!(output.channel(1), crossfade_channel(&right, &spec).as_slice());
    }
}
