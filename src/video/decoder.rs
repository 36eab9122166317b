//! Streaming clip decoder.
//!
//! Spawns an external `ffmpeg` process per clip and reads raw RGB24 frames
//! from its stdout, one frame at a time. The whole clip is drained before the
//! reader is closed; there is no seeking and no parallelism.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use tracing::debug;

use crate::error::{Result, VideoError};
use crate::video::types::Frame;

/// Sequential frame reader over a single clip.
pub struct FrameReader {
    path: PathBuf,
    child: Child,
    stdout: ChildStdout,
    width: u32,
    height: u32,
    frames_read: u64,
}

impl FrameReader {
    /// Spawn the decoder for `path`, decoding at the clip's native resolution.
    pub fn open(path: &Path, width: u32, height: u32) -> Result<Self> {
        let mut child = Command::new("ffmpeg")
            .args(["-v", "error", "-i"])
            .arg(path)
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24", "pipe:1"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| VideoError::OpenFailed {
                path: path.display().to_string(),
                reason: format!("could not spawn ffmpeg: {}", e),
            })?;

        let stdout = child.stdout.take().ok_or_else(|| VideoError::OpenFailed {
            path: path.display().to_string(),
            reason: "ffmpeg stdout unavailable".to_string(),
        })?;

        debug!("Decoding {} at {}x{}", path.display(), width, height);

        Ok(Self {
            path: path.to_path_buf(),
            child,
            stdout,
            width,
            height,
            frames_read: 0,
        })
    }

    /// Number of frames fully decoded so far.
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Read the next frame, or `None` at a clean end-of-stream.
    ///
    /// A stream that ends inside a frame is a truncated clip and fails with
    /// the index of the offending frame.
    pub fn next_frame(&mut self) -> Result<Option<Frame>> {
        let frame_len = self.width as usize * self.height as usize * 3;
        let mut buf = vec![0u8; frame_len];
        let mut filled = 0;

        while filled < frame_len {
            let n = self
                .stdout
                .read(&mut buf[filled..])
                .map_err(|e| self.decode_error(format!("pipe read failed: {}", e)))?;

            if n == 0 {
                if filled == 0 {
                    return Ok(None);
                }
                return Err(self.decode_error(format!(
                    "truncated stream: got {} of {} bytes",
                    filled, frame_len
                )));
            }
            filled += n;
        }

        let frame = Frame::from_rgb_bytes(self.width, self.height, buf)
            .ok_or_else(|| self.decode_error("frame buffer size mismatch".to_string()))?;

        self.frames_read += 1;
        Ok(Some(frame))
    }

    /// Close the reader and surface any decoder failure.
    ///
    /// Must be called after `next_frame` returns `None`; a non-zero ffmpeg
    /// exit means the clip is corrupt even when some frames decoded.
    pub fn finish(mut self) -> Result<u64> {
        drop(self.stdout);

        let frames_read = self.frames_read;
        let path = self.path.clone();

        let output = self
            .child
            .wait_with_output()
            .map_err(|e| VideoError::DecodeFailed {
                path: path.display().to_string(),
                frame_index: frames_read,
                reason: format!("could not wait for ffmpeg: {}", e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VideoError::DecodeFailed {
                path: path.display().to_string(),
                frame_index: frames_read,
                reason: format!("ffmpeg exited with {}: {}", output.status, stderr.trim()),
            }
            .into());
        }

        debug!("Decoded {} frames from {}", frames_read, path.display());
        Ok(frames_read)
    }

    fn decode_error(&mut self, reason: String) -> crate::error::CompilerError {
        // The child is abandoned mid-stream; reap it so no zombie survives
        // the abort path.
        let _ = self.child.kill();
        let _ = self.child.wait();

        VideoError::DecodeFailed {
            path: self.path.display().to_string(),
            frame_index: self.frames_read,
            reason,
        }
        .into()
    }
}
