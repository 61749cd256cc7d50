//! Segment Extraction
//!
//! Copies the span of source audio the crossfade needs into a working
//! buffer. The span runs from sample 0 through `loop_end + crossfade`;
//! anything at or past the end of the source is filled with silence.

use log::debug;

use crate::dsp::loop_spec::LoopSpec;
use crate::engine::buffer::{AudioBuffer, SampleSource};
use crate::error::Result;

/// Number of samples per channel the working buffer holds for `spec`
///
/// The `+ 1` keeps the inclusive sample at `loop_end`.
pub fn extract_length(spec: &LoopSpec) -> usize {
    spec.loop_end + spec.crossfade + 1
}

/// Read the working segment for a validated loop
///
/// `spec` must already have passed [`LoopSpec::validate`] against
/// `source.length()`. Only indices below the source length are requested
/// from the reader; the rest of the buffer stays zeroed.
pub fn extract_segment(source: &dyn SampleSource, spec: &LoopSpec) -> Result<AudioBuffer> {
    let length = extract_length(spec);
    let readable = length.min(source.length());

    debug!(
        "Extracting {} samples x {} channels ({} from source, {} zero-filled)",
        length,
        source.num_channels(),
        readable,
        length - readable
    );

    let channels = (0..source.num_channels())
        .map(|channel| {
            let mut data = source.read(channel, 0, readable);
            data.resize(length, 0.0);
            data
        })
        .collect();

    AudioBuffer::from_channels(channels)
}
