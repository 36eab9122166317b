//! # Minicam-Compiler
//!
//! Batch-rename and merge behavioral minicam trial clips into a single
//! session video.
//!
//! The pipeline is a single forward pass over a fixed session layout:
//! stage (copy + rename with a trial-ordinal prefix), sort naturally, then
//! stream-decode each clip, resize every frame to a fixed resolution, and
//! stream-encode the lot into one merged output file.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use minicam_compiler::{
//!     config::Config,
//!     pipeline::CompileEngine,
//!     session::{Device, SessionLayout, TrialSpec},
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let layout = SessionLayout::new("/data/mouse1/session4", Device::Minicam1);
//! let trial = TrialSpec { name: "trial_01".into(), ordinal: 0 };
//!
//! let engine = CompileEngine::new(config);
//! let report = engine.compile(&layout, &trial).await?;
//! println!("merged {} frames", report.total_frames);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - [`session`] - Session directory conventions and the device selector
//! - [`staging`] - Clip staging and natural-order sorting
//! - [`video`] - Probing, streaming decode/encode, and the merge pass
//! - [`pipeline`] - The compile engine tying the stages together
//! - [`config`] - Configuration management
//!
//! All media I/O shells out to external `ffmpeg`/`ffprobe` processes; the
//! crate links no codec libraries.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod session;
pub mod staging;
pub mod video;

// Re-export commonly used types for convenience
pub use crate::{
    config::Config,
    error::{CompilerError, Result},
    pipeline::CompileEngine,
    session::{Device, SessionLayout, TrialSpec},
};
