//! # Video Processing Module
//!
//! Probing, streaming decode, frame resizing, and the single-pass merge
//! into one output file. All media I/O goes through external ffmpeg/ffprobe
//! processes; nothing here links against codec libraries.

pub mod types;

mod decoder;
mod encoder;
mod merger;
mod probe;

pub use decoder::FrameReader;
pub use encoder::{check_ffmpeg_available, FrameSink};
pub use merger::{ClipFrames, MergeReport, Merger};
pub use probe::{probe_clip, ClipMetadata};
pub use types::{Frame, VideoParams};
