//! RIFF `smpl` Chunk Support
//!
//! hound writes the `fmt ` and `data` chunks but knows nothing about
//! sampler metadata, so the loop descriptor is encoded here and spliced in
//! after the `data` chunk.
//!
//! The `smpl` chunk body (all fields little-endian u32):
//!
//! Offset | Field
//! -----: | ---------------------------------------------------
//!      0 | manufacturer
//!      4 | product
//!      8 | sample period in nanoseconds
//!     12 | MIDI unity note
//!     16 | MIDI pitch fraction
//!     20 | SMPTE format
//!     24 | SMPTE offset
//!     28 | number of sample loops
//!     32 | sampler data size
//!     36 | loops, 24 bytes each: id, type, start, end, fraction, play count

use std::fs;
use std::io;
use std::path::Path;

use crate::dsp::loop_metadata::LoopMetadata;
use crate::error::{LoopXfadeError, Result};

/// Chunk identifier of the sampler chunk
pub const SMPL_CHUNK_ID: &[u8; 4] = b"smpl";

/// Size of the fixed part of the `smpl` body
const SMPL_HEADER_SIZE: usize = 36;

/// Size of a single loop record
const SMPL_LOOP_SIZE: usize = 24;

/// MIDI note played back at the recorded pitch (middle C)
const MIDI_UNITY_NOTE: u32 = 60;

/// Size of the `RIFF` + size + `WAVE` preamble
const RIFF_HEADER_SIZE: usize = 12;

/// Encode a complete `smpl` chunk (id, size and body) for one loop
///
/// The play count is written as 0, meaning the loop repeats until the
/// note is released.
pub fn encode_smpl_chunk(meta: &LoopMetadata, sample_rate: u32) -> Vec<u8> {
    let sample_period = if sample_rate == 0 {
        0
    } else {
        1_000_000_000 / sample_rate
    };
    let body_size = SMPL_HEADER_SIZE + SMPL_LOOP_SIZE;

    let fields = [
        0,               // manufacturer
        0,               // product
        sample_period,
        MIDI_UNITY_NOTE,
        0,               // pitch fraction
        0,               // SMPTE format
        0,               // SMPTE offset
        meta.loop_count,
        0,               // sampler data
        meta.identifier,
        meta.loop_type,
        meta.loop_start,
        meta.loop_end,
        0,               // fraction
        0,               // play count
    ];

    let mut chunk = Vec::with_capacity(8 + body_size);
    chunk.extend_from_slice(SMPL_CHUNK_ID);
    chunk.extend_from_slice(&(body_size as u32).to_le_bytes());
    for field in fields {
        chunk.extend_from_slice(&field.to_le_bytes());
    }

    chunk
}

/// Decode the first loop of a `smpl` chunk body
///
/// Returns `None` if the body is truncated or declares no loops.
pub fn decode_smpl_chunk(body: &[u8]) -> Option<LoopMetadata> {
    let loop_count = read_u32(body, 28)?;
    if loop_count == 0 {
        return None;
    }

    // Loop records come before any sampler-specific data
    let base = SMPL_HEADER_SIZE;
    Some(LoopMetadata {
        identifier: read_u32(body, base)?,
        loop_type: read_u32(body, base + 4)?,
        loop_start: read_u32(body, base + 8)?,
        loop_end: read_u32(body, base + 12)?,
        loop_count,
    })
}

/// Locate a chunk in a RIFF/WAVE byte stream
///
/// # Returns
/// The offset and length of the chunk body, or None if absent
pub fn find_chunk(riff: &[u8], id: &[u8; 4]) -> Option<(usize, usize)> {
    let mut pos = RIFF_HEADER_SIZE;

    while pos + 8 <= riff.len() {
        let size = read_u32(riff, pos + 4)? as usize;
        let body = pos + 8;

        if &riff[pos..pos + 4] == id {
            return Some((body, size.min(riff.len() - body)));
        }

        // Chunks are word aligned
        pos = body.checked_add(size)?.checked_add(size & 1)?;
    }

    None
}

/// Append a chunk after the `data` chunk of an in-memory WAV file
///
/// Anything after the audio data is discarded, the data is padded to an
/// even length, and the RIFF size field is updated.
pub fn append_chunk(wav: &mut Vec<u8>, chunk: &[u8]) -> io::Result<()> {
    if !is_riff_wave(wav) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "not a RIFF/WAVE stream",
        ));
    }

    let (data_offset, data_len) = find_chunk(wav, b"data")
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "missing data chunk"))?;

    wav.truncate(data_offset + data_len);
    if data_len % 2 == 1 {
        wav.push(0);
    }
    wav.extend_from_slice(chunk);

    let riff_size = u32::try_from(wav.len() - 8)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "file exceeds 4 GiB"))?;
    wav[4..8].copy_from_slice(&riff_size.to_le_bytes());

    Ok(())
}

/// Read the loop descriptor from a WAV file
///
/// # Returns
/// * `Ok(Some(meta))` - The first loop of the file's `smpl` chunk
/// * `Ok(None)` - The file carries no loop
///
/// # Errors
/// * `SourceUnreadable` - If the file cannot be read or is not a WAV file
pub fn read_loop_metadata(path: &Path) -> Result<Option<LoopMetadata>> {
    let bytes = fs::read(path).map_err(|e| LoopXfadeError::SourceUnreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
        source: None,
    })?;

    if !is_riff_wave(&bytes) {
        return Err(LoopXfadeError::SourceUnreadable {
            path: path.to_path_buf(),
            reason: "not a RIFF/WAVE file".to_string(),
            source: None,
        });
    }

    Ok(find_chunk(&bytes, SMPL_CHUNK_ID)
        .and_then(|(offset, len)| decode_smpl_chunk(&bytes[offset..offset + len])))
}

fn is_riff_wave(bytes: &[u8]) -> bool {
    bytes.len() >= RIFF_HEADER_SIZE && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE"
}

fn read_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let raw = bytes.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::loop_metadata::encode_loop_metadata;

    /// Minimal RIFF/WAVE stream with a data chunk of `data_len` bytes
    fn minimal_wav(data_len: usize, trailing: &[u8]) -> Vec<u8> {
        let mut wav = Vec::new();
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&0u32.to_le_bytes());
        wav.extend_from_slice(b"WAVE");
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&(data_len as u32).to_le_bytes());
        wav.extend(std::iter::repeat(0x7f).take(data_len));
        wav.extend_from_slice(trailing);
        let size = (wav.len() - 8) as u32;
        wav[4..8].copy_from_slice(&size.to_le_bytes());
        wav
    }

    #[test]
    fn test_encode_layout() {
        let chunk = encode_smpl_chunk(&encode_loop_metadata(200, 800), 48000);

        assert_eq!(chunk.len(), 8 + 60);
        assert_eq!(&chunk[0..4], b"smpl");
        assert_eq!(read_u32(&chunk, 4), Some(60));
        assert_eq!(read_u32(&chunk, 8 + 8), Some(20833));
        assert_eq!(read_u32(&chunk, 8 + 12), Some(60));
        assert_eq!(read_u32(&chunk, 8 + 28), Some(1));
        assert_eq!(read_u32(&chunk, 8 + 36 + 8), Some(200));
        assert_eq!(read_u32(&chunk, 8 + 36 + 12), Some(800));
    }

    #[test]
    fn test_decode_encoded_chunk() {
        let meta = encode_loop_metadata(12, 3456);
        let chunk = encode_smpl_chunk(&meta, 44100);

        assert_eq!(decode_smpl_chunk(&chunk[8..]), Some(meta));
    }

    #[test]
    fn test_decode_truncated_or_empty() {
        assert_eq!(decode_smpl_chunk(&[0u8; 20]), None);
        assert_eq!(decode_smpl_chunk(&[0u8; 60]), None);
    }

    #[test]
    fn test_append_pads_odd_data() {
        let mut wav = minimal_wav(3, &[]);
        let chunk = encode_smpl_chunk(&encode_loop_metadata(1, 2), 8000);

        append_chunk(&mut wav, &chunk).unwrap();

        assert_eq!(wav.len(), 12 + 8 + 3 + 1 + chunk.len());
        assert_eq!(read_u32(&wav, 4), Some((wav.len() - 8) as u32));
        let (offset, len) = find_chunk(&wav, SMPL_CHUNK_ID).unwrap();
        assert_eq!(len, 60);
        assert_eq!(
            decode_smpl_chunk(&wav[offset..offset + len]),
            Some(encode_loop_metadata(1, 2))
        );
    }

    #[test]
    fn test_append_discards_trailing_bytes() {
        let mut wav = minimal_wav(4, b"junkjunk");
        let chunk = encode_smpl_chunk(&encode_loop_metadata(0, 3), 8000);

        append_chunk(&mut wav, &chunk).unwrap();

        assert_eq!(wav.len(), 12 + 8 + 4 + chunk.len());
        assert!(find_chunk(&wav, b"junk").is_none());
    }

    #[test]
    fn test_append_rejects_non_riff() {
        let mut bytes = b"not a wave file".to_vec();
        assert!(append_chunk(&mut bytes, &[]).is_err());
    }
}
