//! Streaming output encoder.
//!
//! Opens one external `ffmpeg` process for the whole merged output and feeds
//! it raw RGB24 frames over stdin. The output frame rate is written as
//! metadata from configuration; nothing is measured from the inputs.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use tracing::debug;

use crate::error::{Result, VideoError};
use crate::video::types::{Frame, VideoParams};

/// Check that the external ffmpeg binary is on PATH.
pub fn check_ffmpeg_available() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Single open output stream for the merged video.
pub struct FrameSink {
    path: PathBuf,
    child: Child,
    stdin: Option<ChildStdin>,
    params: VideoParams,
    frames_written: u64,
}

impl FrameSink {
    /// Open the encoder for `output` with the given parameters.
    pub fn open(output: &Path, params: &VideoParams) -> Result<Self> {
        let (width, height) = params.resolution;

        let mut child = Command::new("ffmpeg")
            .args([
                "-y",
                "-v",
                "error",
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgb24",
                "-s",
                &format!("{}x{}", width, height),
                "-r",
                &params.fps.to_string(),
                "-i",
                "pipe:0",
                "-c:v",
                &params.codec,
                "-crf",
                &quality_to_crf(params.quality).to_string(),
                "-pix_fmt",
                "yuv420p",
            ])
            .arg(output)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| VideoError::EncodeFailed {
                reason: format!("could not spawn ffmpeg for {}: {}", output.display(), e),
            })?;

        let stdin = child.stdin.take().ok_or_else(|| VideoError::EncodeFailed {
            reason: "ffmpeg stdin unavailable".to_string(),
        })?;

        debug!(
            "Encoding {} at {}x{} @ {} fps ({})",
            output.display(),
            width,
            height,
            params.fps,
            params.codec
        );

        Ok(Self {
            path: output.to_path_buf(),
            child,
            stdin: Some(stdin),
            params: params.clone(),
            frames_written: 0,
        })
    }

    /// Number of frames appended so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Append one frame to the output stream.
    ///
    /// The frame must already be at the target resolution.
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        let (width, height) = self.params.resolution;
        if frame.width() != width || frame.height() != height {
            return Err(VideoError::EncodeFailed {
                reason: format!(
                    "frame is {}x{}, output stream expects {}x{}",
                    frame.width(),
                    frame.height(),
                    width,
                    height
                ),
            }
            .into());
        }

        let stdin = self.stdin.as_mut().ok_or_else(|| VideoError::EncodeFailed {
            reason: "output stream already closed".to_string(),
        })?;

        if let Err(e) = stdin.write_all(frame.as_rgb_bytes()) {
            // A broken pipe means the encoder died; reap it and report the
            // encoder's own message instead of the pipe error.
            let _ = self.child.kill();
            let _ = self.child.wait();
            return Err(VideoError::EncodeFailed {
                reason: format!(
                    "write to encoder failed after {} frames: {}",
                    self.frames_written, e
                ),
            }
            .into());
        }

        self.frames_written += 1;
        Ok(())
    }

    /// Close the stream, wait for the encoder, and return the frame count.
    pub fn finish(mut self) -> Result<u64> {
        // Closing stdin signals end-of-stream to ffmpeg.
        drop(self.stdin.take());

        let output = self
            .child
            .wait_with_output()
            .map_err(|e| VideoError::EncodeFailed {
                reason: format!("could not wait for ffmpeg: {}", e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VideoError::EncodeFailed {
                reason: format!(
                    "ffmpeg exited with {} while writing {}: {}",
                    output.status,
                    self.path.display(),
                    stderr.trim()
                ),
            }
            .into());
        }

        debug!(
            "Encoded {} frames into {}",
            self.frames_written,
            self.path.display()
        );
        Ok(self.frames_written)
    }
}

/// Map the 0-100 quality knob onto libx264's 51-0 CRF scale.
fn quality_to_crf(quality: u8) -> u8 {
    51 - ((quality.min(100) as f32 / 100.0) * 51.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_to_crf_endpoints() {
        assert_eq!(quality_to_crf(100), 0);
        assert_eq!(quality_to_crf(0), 51);
    }

    #[test]
    fn test_quality_to_crf_is_monotonic() {
        let mut last = quality_to_crf(0);
        for q in 1..=100 {
            let crf = quality_to_crf(q);
            assert!(crf <= last, "crf must not rise with quality");
            last = crf;
        }
    }
}
