//! Loop Crossfade Processing
//!
//! The algorithmic core: loop parameter validation, segment extraction,
//! the equal-power crossfade and the loop descriptor.
//!
//! Processing order: validate -> extract -> crossfade. Validation runs
//! before any buffer is allocated.

pub mod crossfade;
pub mod extract;
pub mod loop_metadata;
pub mod loop_spec;

pub use crossfade::{crossfade_channel, crossfade_loop, equal_power_gains};
pub use extract::{extract_length, extract_segment};
pub use loop_metadata::{encode_loop_metadata, LoopMetadata, LOOP_TYPE_FORWARD};
pub use loop_spec::{validate_loop, LoopSpec};

use crate::engine::buffer::{AudioBuffer, SampleSource};
use crate::error::Result;

/// Build the crossfaded loop for `source`
///
/// Returns a buffer of `loop_end + 1` samples per channel. Fails with a
/// validation error, without reading the source, if `spec` does not fit
/// it.
pub fn loop_audio(source: &dyn SampleSource, spec: &LoopSpec) -> Result<AudioBuffer> {
    spec.validate(source.length())?;

    let segment = extract_segment(source, spec)?;
    crossfade_loop(&segment, spec)
}
