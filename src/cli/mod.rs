//! CLI Module
//!
//! Command-line interface for the loop crossfade tool.

pub mod commands;

use clap::Parser;
use std::path::PathBuf;

use crate::dsp::LoopSpec;
use commands::LoopJob;

/// LoopXFade - crossfade a loop region and write a WAV with loop points
#[derive(Parser, Debug)]
#[command(name = "loopxfade")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Print a JSON summary of the run on stdout
    #[arg(long)]
    pub report: bool,

    /// Input WAV file
    #[arg(env = "LOOPXFADE_INPUT")]
    pub input: PathBuf,

    /// Output WAV file (must not exist)
    #[arg(env = "LOOPXFADE_OUTPUT")]
    pub output: PathBuf,

    /// First sample of the loop
    #[arg(env = "LOOPXFADE_LOOP_START")]
    pub loop_start: usize,

    /// Last sample of the loop (inclusive)
    #[arg(env = "LOOPXFADE_LOOP_END")]
    pub loop_end: usize,

    /// Crossfade length in samples
    #[arg(env = "LOOPXFADE_CROSSFADE")]
    pub crossfade: usize,
}

impl Cli {
    /// The job described by the parsed arguments
    pub fn job(&self) -> LoopJob {
        LoopJob {
            input: self.input.clone(),
            output: self.output.clone(),
            spec: LoopSpec::new(self.loop_start, self.loop_end, self.crossfade),
        }
    }
}
