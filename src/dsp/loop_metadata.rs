//! Sample Loop Metadata
//!
//! The loop descriptor attached to the output file. One forward loop,
//! identifier 0, written once and never changed.

use serde::{Deserialize, Serialize};

/// Loop type code for a forward (non ping-pong) loop
pub const LOOP_TYPE_FORWARD: u32 = 0;

/// Descriptor of the sample loop carried by the output file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopMetadata {
    /// First sample of the loop
    pub loop_start: u32,
    /// Last sample of the loop (inclusive)
    pub loop_end: u32,
    /// Loop identifier (cue point id)
    pub identifier: u32,
    /// Loop type, 0 for forward
    pub loop_type: u32,
    /// Number of loops in the descriptor set
    pub loop_count: u32,
}

impl LoopMetadata {
    /// True when this descriptor is a forward loop
    pub fn is_forward(&self) -> bool {
        self.loop_type == LOOP_TYPE_FORWARD
    }
}

/// Build the loop descriptor for `loop_start..=loop_end`
pub fn encode_loop_metadata(loop_start: u32, loop_end: u32) -> LoopMetadata {
    LoopMetadata {
        loop_start,
        loop_end,
        identifier: 0,
        loop_type: LOOP_TYPE_FORWARD,
        loop_count: 1,
    }
}
