//! Loop Parameters
//!
//! `LoopSpec` names the loop region and the crossfade length. `validate`
//! checks the four relationships the crossfade needs before any sample is
//! read or any buffer is allocated.

use serde::{Deserialize, Serialize};

use crate::error::{LoopXfadeError, Result};

/// Loop region and crossfade length, all in samples
///
/// `loop_end` is inclusive: the sample at `loop_end` is the last one of the
/// output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopSpec {
    /// First sample of the loop
    pub loop_start: usize,
    /// Last sample of the loop (inclusive)
    pub loop_end: usize,
    /// Number of samples blended in front of the loop end
    pub crossfade: usize,
}

impl LoopSpec {
    /// Create a new loop spec. No validation is performed here.
    pub fn new(loop_start: usize, loop_end: usize, crossfade: usize) -> Self {
        Self {
            loop_start,
            loop_end,
            crossfade,
        }
    }

    /// Length of the loop region (`loop_end - loop_start`)
    ///
    /// Saturates to zero for an inverted region.
    pub fn loop_body(&self) -> usize {
        self.loop_end.saturating_sub(self.loop_start)
    }

    /// The largest crossfade these loop points allow
    pub fn max_crossfade(&self) -> usize {
        self.loop_start.min(self.loop_body())
    }

    /// Number of samples per channel the crossfaded output will have
    pub fn output_length(&self) -> usize {
        self.loop_end + 1
    }

    /// Check the loop against a source of `source_length` samples
    ///
    /// Checks run in a fixed order and the first failure is returned:
    /// 1. loop end past the source
    /// 2. loop start after loop end
    /// 3. crossfade longer than the lookback in front of loop start
    /// 4. crossfade longer than the loop region
    ///
    /// A zero crossfade is valid and produces a hard splice.
    pub fn validate(&self, source_length: usize) -> Result<()> {
        validate_loop(source_length, self.loop_start, self.loop_end, self.crossfade)
    }
}

/// Validate raw loop parameters against a source length
///
/// See [`LoopSpec::validate`] for the order of the checks.
pub fn validate_loop(
    source_length: usize,
    loop_start: usize,
    loop_end: usize,
    crossfade: usize,
) -> Result<()> {
    if loop_end > source_length {
        return Err(LoopXfadeError::LoopEndBeyondSource {
            loop_end,
            source_length,
        });
    }

    if loop_start > loop_end {
        return Err(LoopXfadeError::LoopStartAfterEnd {
            loop_start,
            loop_end,
        });
    }

    let loop_body = loop_end - loop_start;

    if loop_start < crossfade {
        return Err(LoopXfadeError::CrossfadeExceedsLookback {
            loop_start,
            crossfade,
            max_crossfade: loop_start.min(loop_body),
        });
    }

    if crossfade > loop_body {
        return Err(LoopXfadeError::CrossfadeExceedsLoopBody {
            crossfade,
            loop_body,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_loop() {
        assert!(LoopSpec::new(200, 800, 50).validate(1000).is_ok());
    }

    #[test]
    fn test_zero_crossfade_is_valid() {
        assert!(LoopSpec::new(0, 0, 0).validate(0).is_ok());
        assert!(LoopSpec::new(10, 10, 0).validate(10).is_ok());
    }

    #[test]
    fn test_loop_end_at_source_length_is_valid() {
        assert!(LoopSpec::new(100, 1000, 100).validate(1000).is_ok());
    }

    #[test]
    fn test_crossfade_equal_to_both_limits_is_valid() {
        // loop_start == crossfade == loop body
        assert!(LoopSpec::new(100, 200, 100).validate(1000).is_ok());
    }

    #[test]
    fn test_loop_end_beyond_source() {
        let err = LoopSpec::new(200, 1001, 50).validate(1000).unwrap_err();
        assert!(matches!(
            err,
            LoopXfadeError::LoopEndBeyondSource {
                loop_end: 1001,
                source_length: 1000
            }
        ));
    }

    #[test]
    fn test_loop_start_after_end() {
        let err = LoopSpec::new(801, 800, 0).validate(1000).unwrap_err();
        assert!(matches!(
            err,
            LoopXfadeError::LoopStartAfterEnd {
                loop_start: 801,
                loop_end: 800
            }
        ));
    }

    #[test]
    fn test_crossfade_exceeds_lookback_reports_max() {
        let err = LoopSpec::new(30, 800, 50).validate(1000).unwrap_err();
        match err {
            LoopXfadeError::CrossfadeExceedsLookback {
                loop_start,
                crossfade,
                max_crossfade,
            } => {
                assert_eq!(loop_start, 30);
                assert_eq!(crossfade, 50);
                assert_eq!(max_crossfade, 30);
            }
            other => panic!("Expected CrossfadeExceedsLookback, got: {:?}", other),
        }
    }

    #[test]
    fn test_lookback_max_limited_by_loop_body() {
        // Both checks 3 and 4 fail; only the lookback one is reported, and
        // its maximum is limited by the short loop body.
        let err = LoopSpec::new(40, 60, 50).validate(1000).unwrap_err();
        assert!(matches!(
            err,
            LoopXfadeError::CrossfadeExceedsLookback {
                max_crossfade: 20,
                ..
            }
        ));
    }

    #[test]
    fn test_crossfade_exceeds_loop_body() {
        let err = LoopSpec::new(500, 520, 50).validate(1000).unwrap_err();
        assert!(matches!(
            err,
            LoopXfadeError::CrossfadeExceedsLoopBody {
                crossfade: 50,
                loop_body: 20
            }
        ));
    }

    #[test]
    fn test_first_failure_wins() {
        // Every check fails; the loop end check comes first.
        let err = validate_loop(10, 50, 20, 100).unwrap_err();
        assert!(matches!(err, LoopXfadeError::LoopEndBeyondSource { .. }));

        // Start after end and crossfade too long; start/end check comes first.
        let err = validate_loop(100, 50, 20, 100).unwrap_err();
        assert!(matches!(err, LoopXfadeError::LoopStartAfterEnd { .. }));
    }

    #[test]
    fn test_derived_lengths() {
        let spec = LoopSpec::new(200, 800, 50);
        assert_eq!(spec.loop_body(), 600);
        assert_eq!(spec.max_crossfade(), 200);
        assert_eq!(spec.output_length(), 801);
    }
}
