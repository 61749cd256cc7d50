//! Audio file I/O for LoopXFade
//!
//! Reads WAV sources into planar `f32` buffers and writes the looped
//! result back out in the source's own format, with a `smpl` loop chunk.
//!
//! Integer samples are normalized by `2^(bits-1)`. For 8, 16 and 24-bit
//! PCM every sample is exactly representable as `f32`, so untouched
//! samples are written back bit for bit. 32-bit integer PCM keeps 24
//! significant bits; low bits below that are rounded away.
//!
//! Output files are assembled in memory, written to a temporary file next
//! to the destination and renamed into place, so a failed run never
//! leaves a half-written file at the destination path.

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::debug;
use tempfile::NamedTempFile;

use crate::dsp::loop_metadata::LoopMetadata;
use crate::engine::buffer::{AudioBuffer, SampleSource};
use crate::engine::smpl::{append_chunk, encode_smpl_chunk};
use crate::error::{LoopXfadeError, Result};

// ============================================================================
// Source
// ============================================================================

/// A decoded WAV file, or the leading part of one
///
/// Keeps the container format so the output can be written with the same
/// sample rate, bit depth and sample format. `length()` is always the
/// length of the whole file; only the first `buffer().len()` samples are
/// held in memory.
#[derive(Debug, Clone)]
pub struct WavSource {
    spec: WavSpec,
    length: usize,
    buffer: AudioBuffer,
}

impl WavSource {
    /// Format of the source file
    pub fn spec(&self) -> WavSpec {
        self.spec
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.spec.sample_rate
    }

    /// Bits per sample
    pub fn bits_per_sample(&self) -> u16 {
        self.spec.bits_per_sample
    }

    /// Decoded samples, starting at the first sample of the file
    pub fn buffer(&self) -> &AudioBuffer {
        &self.buffer
    }
}

impl SampleSource for WavSource {
    fn num_channels(&self) -> usize {
        self.buffer.channels()
    }

    fn length(&self) -> usize {
        self.length
    }

    fn read(&self, channel: usize, offset: usize, count: usize) -> Vec<f32> {
        self.buffer.read(channel, offset, count)
    }
}

/// Format and length of a WAV file, read from its header only
#[derive(Debug, Clone, Copy)]
pub struct WavInfo {
    /// Container format
    pub spec: WavSpec,
    /// Samples per channel
    pub length: usize,
}

/// Read the header of a WAV file without decoding any samples
///
/// # Errors
/// * `SourceUnreadable` - If the file does not exist or is not a valid WAV file
/// * `UnsupportedFormat` - If the sample format or bit depth is not supported
pub fn probe_wav(path: &Path) -> Result<WavInfo> {
    let reader = open_reader(path)?;
    let spec = reader.spec();
    check_format(&spec)?;

    Ok(WavInfo {
        spec,
        length: reader.duration() as usize,
    })
}

/// Open a WAV file and decode all of it to normalized `f32` samples
///
/// # Errors
/// * `SourceUnreadable` - If the file does not exist or is not a valid WAV file
/// * `UnsupportedFormat` - If the sample format or bit depth is not supported
pub fn open_wav_source(path: &Path) -> Result<WavSource> {
    decode_wav(path, usize::MAX)
}

/// Open a WAV file and decode at most its first `max_frames` samples per channel
///
/// Nothing past `max_frames` is decoded or kept in memory. The returned
/// source still reports the full file length.
///
/// # Errors
/// * `SourceUnreadable` - If the file does not exist or is not a valid WAV file
/// * `UnsupportedFormat` - If the sample format or bit depth is not supported
pub fn open_wav_prefix(path: &Path, max_frames: usize) -> Result<WavSource> {
    decode_wav(path, max_frames)
}

fn decode_wav(path: &Path, max_frames: usize) -> Result<WavSource> {
    let reader = open_reader(path)?;
    let spec = reader.spec();
    check_format(&spec)?;

    let length = reader.duration() as usize;
    let frames = length.min(max_frames);
    let max_samples = frames * spec.channels as usize;

    let interleaved = read_samples_as_f32(reader, &spec, max_samples).map_err(|e| {
        LoopXfadeError::SourceUnreadable {
            path: path.to_path_buf(),
            reason: format!("failed to decode samples: {}", e),
            source: Some(e),
        }
    })?;

    let buffer = AudioBuffer::from_interleaved(&interleaved, spec.channels as usize)?;

    debug!(
        "Decoded {}: {} channels, {} of {} samples, {} Hz, {}-bit {:?}",
        path.display(),
        buffer.channels(),
        buffer.len(),
        length,
        spec.sample_rate,
        spec.bits_per_sample,
        spec.sample_format
    );

    Ok(WavSource {
        spec,
        length,
        buffer,
    })
}

// ============================================================================
// Output
// ============================================================================

/// Fail with `OutputAlreadyExists` if something is already at `path`
pub fn ensure_output_absent(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(LoopXfadeError::OutputAlreadyExists {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Encode a buffer and its loop descriptor as a complete WAV file in memory
///
/// # Errors
/// * `UnsupportedFormat` - If `spec` is not a supported PCM format or its
///   channel count does not match the buffer
pub fn encode_looped_wav(
    buffer: &AudioBuffer,
    spec: WavSpec,
    meta: &LoopMetadata,
) -> Result<Vec<u8>> {
    check_format(&spec)?;

    if spec.channels as usize != buffer.channels() {
        return Err(LoopXfadeError::UnsupportedFormat {
            details: format!(
                "format declares {} channels, buffer has {}",
                spec.channels,
                buffer.channels()
            ),
        });
    }

    let mut cursor = Cursor::new(Vec::new());
    write_samples(&mut cursor, spec, &buffer.to_interleaved()).map_err(|e| {
        LoopXfadeError::UnsupportedFormat {
            details: format!("failed to encode samples: {}", e),
        }
    })?;

    let mut wav = cursor.into_inner();
    splice_loop_chunk(&mut wav, meta, spec.sample_rate)?;

    Ok(wav)
}

/// Write a looped WAV file
///
/// The file appears at `path` only once it is complete. An existing file
/// is never replaced.
///
/// # Returns
/// The number of bytes written
///
/// # Errors
/// * `OutputAlreadyExists` - If a file already exists at `path`
/// * `OutputUnwritable` - If the destination cannot be written
/// * `UnsupportedFormat` - If `spec` is not a supported PCM format
pub fn write_looped_wav(
    path: &Path,
    buffer: &AudioBuffer,
    spec: WavSpec,
    meta: &LoopMetadata,
) -> Result<u64> {
    ensure_output_absent(path)?;

    let wav = encode_looped_wav(buffer, spec, meta)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let unwritable = |reason: &str, e: std::io::Error| LoopXfadeError::OutputUnwritable {
        path: path.to_path_buf(),
        reason: format!("{}: {}", reason, e),
        source: Some(Box::new(e)),
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| unwritable("temporary file", e))?;
    temp.write_all(&wav).map_err(|e| unwritable("write", e))?;
    temp.as_file().sync_all().map_err(|e| unwritable("sync", e))?;

    temp.persist_noclobber(path).map_err(|e| {
        if e.error.kind() == std::io::ErrorKind::AlreadyExists {
            LoopXfadeError::OutputAlreadyExists {
                path: path.to_path_buf(),
            }
        } else {
            unwritable("rename", e.error)
        }
    })?;

    debug!("Wrote {} bytes to {}", wav.len(), path.display());
    Ok(wav.len() as u64)
}

// ============================================================================
// Internal helper functions
// ============================================================================

fn open_reader(path: &Path) -> Result<WavReader<std::io::BufReader<fs::File>>> {
    if !path.exists() {
        return Err(LoopXfadeError::SourceUnreadable {
            path: path.to_path_buf(),
            reason: "file not found".to_string(),
            source: None,
        });
    }

    WavReader::open(path).map_err(|e| LoopXfadeError::SourceUnreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
        source: Some(e),
    })
}

/// Append the `smpl` chunk to an encoded WAV file
fn splice_loop_chunk(wav: &mut Vec<u8>, meta: &LoopMetadata, sample_rate: u32) -> Result<()> {
    append_chunk(wav, &encode_smpl_chunk(meta, sample_rate)).map_err(|e| {
        LoopXfadeError::UnsupportedFormat {
            details: format!("failed to attach loop chunk: {}", e),
        }
    })
}

/// Reject formats the codec does not handle
fn check_format(spec: &WavSpec) -> Result<()> {
    let supported = match spec.sample_format {
        SampleFormat::Float => spec.bits_per_sample == 32,
        SampleFormat::Int => matches!(spec.bits_per_sample, 8 | 16 | 24 | 32),
    };

    if !supported {
        return Err(LoopXfadeError::UnsupportedFormat {
            details: format!("{}-bit {:?} audio", spec.bits_per_sample, spec.sample_format),
        });
    }

    if spec.channels == 0 {
        return Err(LoopXfadeError::UnsupportedFormat {
            details: "audio with zero channels".to_string(),
        });
    }

    Ok(())
}

/// Full-scale value of an integer sample of `bits` bits
#[inline]
fn int_scale(bits: u16) -> f32 {
    (1u64 << (bits - 1)) as f32
}

/// Read up to `max_samples` interleaved samples and convert to f32
fn read_samples_as_f32<R: std::io::Read>(
    mut reader: WavReader<R>,
    spec: &WavSpec,
    max_samples: usize,
) -> std::result::Result<Vec<f32>, hound::Error> {
    match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().take(max_samples).collect(),
        SampleFormat::Int => {
            let scale = int_scale(spec.bits_per_sample);
            match spec.bits_per_sample {
                8 => reader
                    .samples::<i8>()
                    .take(max_samples)
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect(),
                16 => reader
                    .samples::<i16>()
                    .take(max_samples)
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect(),
                // 24-bit stored as i32 in hound
                _ => reader
                    .samples::<i32>()
                    .take(max_samples)
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect(),
            }
        }
    }
}

/// Encode interleaved f32 samples into `writer` using `spec`
fn write_samples<W: std::io::Write + std::io::Seek>(
    writer: W,
    spec: WavSpec,
    interleaved: &[f32],
) -> std::result::Result<(), hound::Error> {
    let mut writer = WavWriter::new(writer, spec)?;

    match spec.sample_format {
        SampleFormat::Float => {
            for &sample in interleaved {
                writer.write_sample(sample)?;
            }
        }
        SampleFormat::Int => {
            let scale = int_scale(spec.bits_per_sample);
            let max = scale - 1.0;
            let quantize = |sample: f32| (sample * scale).round().clamp(-scale, max);

            match spec.bits_per_sample {
                8 => {
                    for &sample in interleaved {
                        writer.write_sample(quantize(sample) as i8)?;
                    }
                }
                16 => {
                    for &sample in interleaved {
                        writer.write_sample(quantize(sample) as i16)?;
                    }
                }
                _ => {
                    for &sample in interleaved {
                        writer.write_sample(quantize(sample) as i32)?;
                    }
                }
            }
        }
    }

    writer.finalize()
}

// ============================================================================
// Tests
// ============================================================================
