//! ffprobe-backed clip metadata.
//!
//! Shells out to `ffprobe -print_format json -show_streams` and maps the
//! first video stream into [`ClipMetadata`].

use std::path::Path;
use std::process::Command;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, VideoError};

/// Metadata for one source clip, as reported by ffprobe
#[derive(Debug, Clone)]
pub struct ClipMetadata {
    pub width: u32,
    pub height: u32,
    /// Nominal container frame rate. Minicam containers routinely declare a
    /// rate that differs from the actual recorded rate, so this is never used
    /// to time the output.
    pub fps: f64,
    pub duration: Option<f64>,
    pub frame_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    duration: Option<String>,
    nb_frames: Option<String>,
}

/// Probe a clip for dimensions and nominal frame rate.
pub fn probe_clip(path: &Path) -> Result<ClipMetadata> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_streams",
            "-select_streams",
            "v:0",
        ])
        .arg(path)
        .output()
        .map_err(|e| VideoError::ProbeFailed {
            path: path.display().to_string(),
            reason: format!("could not run ffprobe: {}", e),
        })?;

    if !output.status.success() {
        return Err(VideoError::ProbeFailed {
            path: path.display().to_string(),
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
        .into());
    }

    let parsed: FfprobeOutput =
        serde_json::from_slice(&output.stdout).map_err(|e| VideoError::ProbeFailed {
            path: path.display().to_string(),
            reason: format!("ffprobe JSON parse error: {}", e),
        })?;

    let stream = parsed
        .streams
        .into_iter()
        .next()
        .ok_or_else(|| VideoError::ProbeFailed {
            path: path.display().to_string(),
            reason: "no video stream found".to_string(),
        })?;

    let (width, height) = match (stream.width, stream.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => {
            return Err(VideoError::ProbeFailed {
                path: path.display().to_string(),
                reason: "stream is missing valid dimensions".to_string(),
            }
            .into())
        }
    };

    let fps = stream
        .avg_frame_rate
        .as_deref()
        .and_then(parse_rational)
        .unwrap_or(0.0);
    let duration = stream.duration.as_deref().and_then(|d| d.parse().ok());
    let frame_count = stream.nb_frames.as_deref().and_then(|n| n.parse().ok());

    let metadata = ClipMetadata {
        width,
        height,
        fps,
        duration,
        frame_count,
    };

    debug!(
        "Probed {}: {}x{} @ {:.2} fps, {:?} frames",
        path.display(),
        metadata.width,
        metadata.height,
        metadata.fps,
        metadata.frame_count
    );

    Ok(metadata)
}

/// Parse an ffprobe rational such as "30000/1001" into a float.
fn parse_rational(value: &str) -> Option<f64> {
    let (num, den) = value.split_once('/')?;
    let num: f64 = num.parse().ok()?;
    let den: f64 = den.parse().ok()?;
    if den == 0.0 {
        return None;
    }
    Some(num / den)
}
