use thiserror::Error;

/// Main error type for the Minicam-Compiler library
#[derive(Error, Debug)]
pub enum CompilerError {
    #[error("Staging error: {0}")]
    Staging(#[from] StagingError),

    #[error("Video processing error: {0}")]
    Video(#[from] VideoError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Filesystem errors raised while staging clips
#[derive(Error, Debug)]
pub enum StagingError {
    #[error("Directory not found: {path}")]
    MissingDirectory { path: String },

    #[error("Directory entry unreadable: {path} - {reason}")]
    Unreadable { path: String, reason: String },

    #[error("Destination collision: {path} already exists")]
    DestinationCollision { path: String },

    #[error("Copy failed: {src} - {reason}")]
    CopyFailed { src: String, reason: String },
}

/// Media errors raised while probing, decoding, or encoding
#[derive(Error, Debug)]
pub enum VideoError {
    #[error("Failed to probe video file: {path} - {reason}")]
    ProbeFailed { path: String, reason: String },

    #[error("Failed to open video file: {path} - {reason}")]
    OpenFailed { path: String, reason: String },

    #[error("Video decoding failed: {path} at frame {frame_index}: {reason}")]
    DecodeFailed {
        path: String,
        frame_index: u64,
        reason: String,
    },

    #[error("Video encoding failed: {reason}")]
    EncodeFailed { reason: String },

    #[error("Invalid video parameters: {details}")]
    InvalidParameters { details: String },
}

/// Pipeline-level errors
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("No video clips found in directory: {path}")]
    NoClipsFound { path: String },

    #[error("Output generation failed: {reason}")]
    OutputFailed { reason: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using CompilerError
pub type Result<T> = std::result::Result<T, CompilerError>;

impl CompilerError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Check if this error is recoverable (can be retried)
    pub fn is_recoverable(&self) -> bool {
        match self {
            // IO errors might be temporary
            Self::Io(_) => true,
            // A clip that failed to open might appear on retry (network mounts)
            Self::Video(VideoError::OpenFailed { .. }) => true,
            // Everything else aborts the batch for good
            _ => false,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Staging(StagingError::DestinationCollision { path }) => {
                format!(
                    "Staged file '{}' already exists. Remove the compiled folder or stage into an empty destination.",
                    path
                )
            }
            Self::Video(VideoError::OpenFailed { path, .. }) => {
                format!(
                    "Could not open video file '{}'. Please check the file exists and is a supported format.",
                    path
                )
            }
            Self::Pipeline(PipelineError::NoClipsFound { path }) => {
                format!(
                    "No clips found in '{}'. Check the session layout and the configured clip extension.",
                    path
                )
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}
