//! CLI Command Implementations
//!
//! Runs one loop job end to end: check the destination, read the source
//! header, validate, decode, crossfade, and write the looped file.

use std::path::PathBuf;

use log::{debug, info};
use serde::Serialize;

use crate::dsp::{encode_loop_metadata, extract_length, loop_audio, LoopMetadata, LoopSpec};
use crate::engine::{ensure_output_absent, open_wav_prefix, probe_wav, write_looped_wav};
use crate::error::{LoopXfadeError, Result};

/// One invocation of the tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopJob {
    /// Source WAV file
    pub input: PathBuf,
    /// Destination WAV file
    pub output: PathBuf,
    /// Loop points and crossfade length
    pub spec: LoopSpec,
}

/// Summary of a completed job
#[derive(Debug, Clone, Serialize)]
pub struct LoopReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub source_length: usize,
    pub output_length: usize,
    pub crossfade: usize,
    pub loop_metadata: LoopMetadata,
    pub file_size_bytes: u64,
}

/// Crossfade the loop of `job.input` and write it to `job.output`
///
/// Nothing is written unless every step succeeds, and an existing output
/// file is never touched.
pub fn process_file(job: &LoopJob) -> Result<LoopReport> {
    let spec = &job.spec;

    ensure_output_absent(&job.output)?;

    let info = probe_wav(&job.input)?;
    info!(
        "Source {}: {} channels, {} samples, {} Hz, {}-bit",
        job.input.display(),
        info.spec.channels,
        info.length,
        info.spec.sample_rate,
        info.spec.bits_per_sample
    );

    spec.validate(info.length)?;
    debug!(
        "Loop validated: start={} end={} crossfade={} (max crossfade {})",
        spec.loop_start,
        spec.loop_end,
        spec.crossfade,
        spec.max_crossfade()
    );

    // Samples past the extracted segment are never decoded
    let source = open_wav_prefix(&job.input, extract_length(spec))?;
    let output = loop_audio(&source, spec)?;
    drop(source);

    let meta = encode_loop_metadata(
        to_chunk_offset(spec.loop_start)?,
        to_chunk_offset(spec.loop_end)?,
    );

    let file_size_bytes = write_looped_wav(&job.output, &output, info.spec, &meta)?;
    info!("Output file created: {}", job.output.display());

    Ok(LoopReport {
        input: job.input.clone(),
        output: job.output.clone(),
        channels: info.spec.channels,
        sample_rate: info.spec.sample_rate,
        bits_per_sample: info.spec.bits_per_sample,
        source_length: info.length,
        output_length: output.len(),
        crossfade: spec.crossfade,
        loop_metadata: meta,
        file_size_bytes,
    })
}

/// Print a report as pretty JSON on stdout
pub fn print_report(report: &LoopReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Path shown in diagnostics for a job
pub fn describe(job: &LoopJob) -> String {
    format!("{} -> {}", job.input.display(), job.output.display())
}

/// One-line context for a failed job: paths, error code and recovery hint
///
/// The error's own message is not repeated here; it is reported as the
/// cause underneath this line.
pub fn failure_context(job: &LoopJob, err: &LoopXfadeError) -> String {
    format!(
        "{} [{}] (hint: {})",
        describe(job),
        err.error_code(),
        err.recovery_hint()
    )
}

fn to_chunk_offset(sample: usize) -> Result<u32> {
    u32::try_from(sample).map_err(|_| LoopXfadeError::UnsupportedFormat {
        details: format!("loop point {} does not fit a smpl chunk", sample),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> LoopJob {
        LoopJob {
            input: PathBuf::from("in.wav"),
            output: PathBuf::from("out.wav"),
            spec: LoopSpec::new(30, 800, 50),
        }
    }

    #[test]
    fn test_failure_context_does_not_repeat_message() {
        let err = LoopXfadeError::CrossfadeExceedsLookback {
            loop_start: 30,
            crossfade: 50,
            max_crossfade: 30,
        };

        let context = failure_context(&job(), &err);

        assert!(context.contains("in.wav -> out.wav"));
        assert!(context.contains("CROSSFADE_EXCEEDS_LOOKBACK"));
        assert!(context.contains(err.recovery_hint()));
        assert!(!context.contains(&err.to_string()));
    }

    #[test]
    fn test_chunk_offset_range() {
        assert_eq!(to_chunk_offset(800).unwrap(), 800);
        assert!(to_chunk_offset(u32::MAX as usize).is_ok());
    }
}
