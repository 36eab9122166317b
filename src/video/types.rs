use image::{ImageBuffer, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Represents a single decoded video frame
///
/// This is a simple wrapper around an RGB image buffer. Decoded rawvideo
/// bytes go in, resized frames come out, and the raw buffer is handed to
/// the encoder untouched.
#[derive(Clone, Debug)]
pub struct Frame {
    buffer: RgbImage,
}

impl Frame {
    /// Create a new frame from an RGB image buffer
    pub fn new(buffer: RgbImage) -> Self {
        Self { buffer }
    }

    /// Create a new frame with the given dimensions filled with the specified color
    pub fn new_filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        let buffer = ImageBuffer::from_fn(width, height, |_, _| Rgb(color));
        Self { buffer }
    }

    /// Get the width of the frame
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    /// Get the height of the frame
    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Get the underlying image buffer
    pub fn as_image(&self) -> &RgbImage {
        &self.buffer
    }

    /// Borrow the frame as packed RGB24 bytes (row-major, 3 bytes per pixel)
    pub fn as_rgb_bytes(&self) -> &[u8] {
        self.buffer.as_raw()
    }

    /// Create a frame from packed RGB24 bytes
    ///
    /// Returns `None` when the byte count does not match `width * height * 3`.
    pub fn from_rgb_bytes(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        ImageBuffer::from_raw(width, height, data).map(|buffer| Self { buffer })
    }

    /// Resize to the given dimensions with interpolated resampling.
    ///
    /// The source aspect ratio is discarded; no letterboxing or cropping.
    pub fn resize(&self, width: u32, height: u32) -> Frame {
        use image::imageops::FilterType;

        let resized = image::imageops::resize(&self.buffer, width, height, FilterType::Lanczos3);
        Frame::new(resized)
    }
}

/// Output video parameters for the merged file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoParams {
    /// Declared output frame rate (metadata only, never measured from inputs)
    pub fps: f64,

    /// Target resolution (width, height); every merged frame gets this size
    pub resolution: (u32, u32),

    /// Video codec to use for output
    pub codec: String,

    /// Quality setting (0-100, higher is better)
    pub quality: u8,
}

impl Default for VideoParams {
    fn default() -> Self {
        Self {
            fps: 30.0,
            resolution: (480, 720),
            codec: "libx264".to_string(),
            quality: 85,
        }
    }
}

impl VideoParams {
    pub fn validate(&self) -> Result<()> {
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "video.params.fps".to_string(),
                value: self.fps.to_string(),
            }
            .into());
        }

        let (width, height) = self.resolution;
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidValue {
                key: "video.params.resolution".to_string(),
                value: format!("{}x{}", width, height),
            }
            .into());
        }

        // yuv420p output requires even dimensions; reject early with the key
        // rather than surfacing an encoder failure mid-run.
        if width % 2 != 0 || height % 2 != 0 {
            return Err(ConfigError::InvalidValue {
                key: "video.params.resolution".to_string(),
                value: format!("{}x{}", width, height),
            }
            .into());
        }

        if self.quality > 100 {
            return Err(ConfigError::InvalidValue {
                key: "video.params.quality".to_string(),
                value: self.quality.to_string(),
            }
            .into());
        }

        if self.codec.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "video.params.codec".to_string(),
                value: self.codec.clone(),
            }
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_rgb_roundtrip() {
        let data: Vec<u8> = (0..2 * 2 * 3).map(|i| i as u8).collect();
        let frame = Frame::from_rgb_bytes(2, 2, data.clone()).unwrap();

        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.as_rgb_bytes(), data.as_slice());
    }

    #[test]
    fn test_frame_from_short_buffer_is_rejected() {
        assert!(Frame::from_rgb_bytes(2, 2, vec![0u8; 11]).is_none());
    }

    #[test]
    fn test_resize_hits_target_resolution() {
        let frame = Frame::new_filled(640, 480, [10, 20, 30]);
        let resized = frame.resize(480, 720);

        assert_eq!(resized.width(), 480);
        assert_eq!(resized.height(), 720);
    }

    #[test]
    fn test_default_params_are_valid() {
        assert!(VideoParams::default().validate().is_ok());
    }

    #[test]
    fn test_odd_resolution_is_rejected() {
        let params = VideoParams {
            resolution: (481, 720),
            ..VideoParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_non_positive_fps_is_rejected() {
        let params = VideoParams {
            fps: 0.0,
            ..VideoParams::default()
        };
        assert!(params.validate().is_err());
    }
}
