//! Transcoder/concatenator for ordered clip lists.
//!
//! One forward pass: each clip is opened, fully drained, and closed before
//! the next; every decoded frame is resized to the target resolution and
//! appended to the single open output stream. Merged frame count is always
//! the sum of per-clip frame counts, in clip-list order.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{PipelineError, Result, VideoError};
use crate::staging::StagedClip;
use crate::video::decoder::FrameReader;
use crate::video::encoder::{check_ffmpeg_available, FrameSink};
use crate::video::probe::probe_clip;
use crate::video::types::VideoParams;

/// Per-clip frame accounting for a finished merge
#[derive(Debug, Clone)]
pub struct ClipFrames {
    pub name: String,
    pub frames: u64,
}

/// Summary of a completed merge
#[derive(Debug, Clone)]
pub struct MergeReport {
    pub output: PathBuf,
    pub clips: Vec<ClipFrames>,
    pub total_frames: u64,
    pub file_size: u64,
}

/// Sequential clip merger
pub struct Merger {
    params: VideoParams,
}

impl Merger {
    pub fn new(params: VideoParams) -> Self {
        Self { params }
    }

    /// Merge `clips` (already in playback order) into `output`.
    ///
    /// Blocking; drive it from `spawn_blocking` in async contexts. On any
    /// failure the partially written output file is removed so an aborted
    /// run cannot be mistaken for a finished one.
    pub fn merge(&self, clips: &[StagedClip], output: &Path) -> Result<MergeReport> {
        let result = self.run_merge(clips, output);
        if result.is_err() {
            let _ = std::fs::remove_file(output);
        }
        result
    }

    fn run_merge(&self, clips: &[StagedClip], output: &Path) -> Result<MergeReport> {
        if clips.is_empty() {
            return Err(PipelineError::NoClipsFound {
                path: output
                    .parent()
                    .unwrap_or(output)
                    .display()
                    .to_string(),
            }
            .into());
        }

        self.params.validate()?;

        if !check_ffmpeg_available() {
            return Err(VideoError::EncodeFailed {
                reason: "FFmpeg not found. Please install FFmpeg.".to_string(),
            }
            .into());
        }

        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let (target_w, target_h) = self.params.resolution;
        info!(
            "Merging {} clips into {} at {}x{} @ {} fps",
            clips.len(),
            output.display(),
            target_w,
            target_h,
            self.params.fps
        );

        let mut sink = FrameSink::open(output, &self.params)?;
        let mut per_clip = Vec::with_capacity(clips.len());

        for clip in clips {
            let frames = self.append_clip(clip, &mut sink)?;
            per_clip.push(ClipFrames {
                name: clip.name.clone(),
                frames,
            });
        }

        let total_frames = sink.finish()?;
        let file_size = std::fs::metadata(output)?.len();

        info!(
            "Merge complete: {} frames, {} MB",
            total_frames,
            file_size / 1024 / 1024
        );

        Ok(MergeReport {
            output: output.to_path_buf(),
            clips: per_clip,
            total_frames,
            file_size,
        })
    }

    /// Decode one clip to end-of-stream, resizing every frame into the sink.
    fn append_clip(&self, clip: &StagedClip, sink: &mut FrameSink) -> Result<u64> {
        let metadata = probe_clip(&clip.path)?;
        let (target_w, target_h) = self.params.resolution;

        debug!(
            "Appending {} ({}x{} source)",
            clip.name, metadata.width, metadata.height
        );

        let mut reader = FrameReader::open(&clip.path, metadata.width, metadata.height)?;

        while let Some(frame) = reader.next_frame()? {
            let frame = if frame.width() != target_w || frame.height() != target_h {
                frame.resize(target_w, target_h)
            } else {
                frame
            };
            sink.write_frame(&frame)?;
        }

        let frames = reader.finish()?;

        // A clip that opens but yields nothing is corrupt, not empty input.
        if frames == 0 {
            return Err(VideoError::DecodeFailed {
                path: clip.path.display().to_string(),
                frame_index: 0,
                reason: "clip produced no frames".to_string(),
            }
            .into());
        }

        debug!("Appended {}: {} frames", clip.name, frames);
        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompilerError;
    use tempfile::tempdir;

    #[test]
    fn test_empty_clip_list_is_rejected() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("output").join("merged.avi");

        let merger = Merger::new(VideoParams::default());
        let err = merger.merge(&[], &output).unwrap_err();

        assert!(matches!(
            err,
            CompilerError::Pipeline(PipelineError::NoClipsFound { .. })
        ));
        // No partial artifact may appear on the empty-input path.
        assert!(!output.exists());
    }

    #[test]
    fn test_invalid_params_fail_before_any_io() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("merged.avi");
        let clips = vec![StagedClip {
            name: "0_clip.avi".to_string(),
            path: dir.path().join("0_clip.avi"),
        }];

        let merger = Merger::new(VideoParams {
            fps: -1.0,
            ..VideoParams::default()
        });
        assert!(merger.merge(&clips, &output).is_err());
        assert!(!output.exists());
    }
}
