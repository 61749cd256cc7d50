//! LoopXFade - Seamless Sample Loops
//!
//! Turns a region of a PCM sample into a click-free loop by blending the
//! samples in front of the loop end into the samples in front of the loop
//! start with an equal-power crossfade, then writes a WAV file whose
//! `smpl` chunk tells samplers where the loop is.
//!
//! # Pipeline
//!
//! validate -> extract -> crossfade -> encode loop metadata -> write
//!
//! - `dsp`: loop parameters, extraction, crossfade and loop descriptor
//! - `engine`: sample buffers, WAV I/O and the `smpl` chunk
//! - `cli`: argument model and the end-to-end command

pub mod cli;
pub mod dsp;
pub mod engine;
pub mod error;

pub use dsp::{loop_audio, LoopMetadata, LoopSpec};
pub use engine::{AudioBuffer, SampleSource};
pub use error::{LoopXfadeError, Result};
