//! Audio Engine Module
//!
//! Sample storage and container I/O:
//! - Planar audio buffers and the sample source trait
//! - WAV decoding and looped WAV encoding
//! - RIFF `smpl` loop chunk support

pub mod buffer;
pub mod io;
pub mod smpl;

pub use buffer::{AudioBuffer, SampleSource};
pub use io::{
    encode_looped_wav, ensure_output_absent, open_wav_prefix, open_wav_source, probe_wav,
    write_looped_wav, WavInfo, WavSource,
};
pub use smpl::read_loop_metadata;
