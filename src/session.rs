//! Session directory conventions.
//!
//! A recording session lives under one root folder and contains one
//! subfolder per trial, each holding one subfolder per camera device:
//!
//! ```text
//! {root}/{trial}/{device}/*.avi            source clips
//! {root}/minicam{N}_compiled/              staged (renamed) copies
//! {root}/minicam{N}_compiled/output/       merged video
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result, StagingError};

/// Camera device selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Minicam1,
    Minicam2,
}

impl Device {
    /// Resolve the numeric selector used in session notebooks (1 or 2).
    pub fn from_id(id: u8) -> Result<Self> {
        match id {
            1 => Ok(Device::Minicam1),
            2 => Ok(Device::Minicam2),
            other => Err(ConfigError::InvalidValue {
                key: "device".to_string(),
                value: other.to_string(),
            }
            .into()),
        }
    }

    /// Directory name of this device inside a trial folder.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Device::Minicam1 => "minicam1",
            Device::Minicam2 => "minicam2",
        }
    }

    /// CLI parser: accepts the device name or its numeric id.
    pub fn parse(value: &str) -> std::result::Result<Self, String> {
        match value.to_ascii_lowercase().as_str() {
            "minicam1" | "1" => Ok(Device::Minicam1),
            "minicam2" | "2" => Ok(Device::Minicam2),
            other => Err(format!(
                "unknown device '{}' (expected minicam1, minicam2, 1, or 2)",
                other
            )),
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// One trial to compile: its subfolder name and ordinal prefix
#[derive(Debug, Clone)]
pub struct TrialSpec {
    /// Trial subfolder name under the session root
    pub name: String,
    /// Decimal prefix prepended to every staged clip name
    pub ordinal: u32,
}

/// Resolved paths for one session/device pair
#[derive(Debug, Clone)]
pub struct SessionLayout {
    root: PathBuf,
    device: Device,
}

impl SessionLayout {
    pub fn new<P: Into<PathBuf>>(root: P, device: Device) -> Self {
        Self {
            root: root.into(),
            device,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn device(&self) -> Device {
        self.device
    }

    /// Source clip folder for one trial.
    pub fn device_dir(&self, trial: &TrialSpec) -> PathBuf {
        self.root.join(&trial.name).join(self.device.dir_name())
    }

    /// Destination for staged (renamed) clips.
    pub fn compiled_dir(&self) -> PathBuf {
        self.root
            .join(format!("{}_compiled", self.device.dir_name()))
    }

    /// Folder holding the merged video.
    pub fn output_dir(&self) -> PathBuf {
        self.compiled_dir().join("output")
    }

    /// Full path of the merged video for the given extension.
    pub fn merged_output(&self, extension: &str) -> PathBuf {
        self.output_dir()
            .join(format!("mergedVideo_{}.{}", self.device.dir_name(), extension))
    }
}

/// Source of the session root folder.
///
/// The original tool raised an interactive folder picker; anything that can
/// produce a directory (CLI argument, config file, GUI dialog) implements
/// this trait and gets injected at the edge.
pub trait RootProvider {
    fn session_root(&self) -> Result<PathBuf>;
}

/// Root provider backed by an already-known path (CLI argument).
#[derive(Debug, Clone)]
pub struct FixedRoot {
    root: PathBuf,
}

impl FixedRoot {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }
}

impl RootProvider for FixedRoot {
    fn session_root(&self) -> Result<PathBuf> {
        if !self.root.is_dir() {
            return Err(StagingError::MissingDirectory {
                path: self.root.display().to_string(),
            }
            .into());
        }
        Ok(self.root.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_device_from_id() {
        assert_eq!(Device::from_id(1).unwrap(), Device::Minicam1);
        assert_eq!(Device::from_id(2).unwrap(), Device::Minicam2);
        assert!(Device::from_id(3).is_err());
    }

    #[test]
    fn test_device_parse_accepts_names_and_ids() {
        assert_eq!(Device::parse("minicam2").unwrap(), Device::Minicam2);
        assert_eq!(Device::parse("1").unwrap(), Device::Minicam1);
        assert!(Device::parse("minicam3").is_err());
    }

    #[test]
    fn test_layout_follows_session_convention() {
        let layout = SessionLayout::new("/data/mouse1/session4", Device::Minicam1);
        let trial = TrialSpec {
            name: "trial_01".to_string(),
            ordinal: 0,
        };

        assert_eq!(
            layout.device_dir(&trial),
            PathBuf::from("/data/mouse1/session4/trial_01/minicam1")
        );
        assert_eq!(
            layout.compiled_dir(),
            PathBuf::from("/data/mouse1/session4/minicam1_compiled")
        );
        assert_eq!(
            layout.merged_output("avi"),
            PathBuf::from(
                "/data/mouse1/session4/minicam1_compiled/output/mergedVideo_minicam1.avi"
            )
        );
    }

    #[test]
    fn test_fixed_root_requires_existing_directory() {
        let dir = tempdir().unwrap();
        assert!(FixedRoot::new(dir.path()).session_root().is_ok());
        assert!(FixedRoot::new(dir.path().join("missing"))
            .session_root()
            .is_err());
    }
}
