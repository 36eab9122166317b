//! File stager: copies trial clips into the compiled folder under a
//! trial-ordinal prefix.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Result, StagingError};

/// One staged (renamed) clip in the compiled folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedClip {
    /// File name, including the ordinal prefix and extension
    pub name: String,
    pub path: PathBuf,
}

/// Copies device clips into a compiled folder as `{ordinal}_{name}`.
///
/// Sources are never moved or modified; a name collision in the destination
/// is an explicit error rather than an overwrite.
pub struct Stager {
    extension: String,
}

impl Stager {
    /// `extension` is the clip extension without a leading dot, e.g. `"avi"`.
    pub fn new<S: Into<String>>(extension: S) -> Self {
        Self {
            extension: extension.into().to_ascii_lowercase(),
        }
    }

    /// Stage every matching clip from `device_dir` into `dest`.
    ///
    /// Returns the staged clips in the order they were copied. An empty
    /// device folder yields an empty list; rejecting that is the pipeline's
    /// call, not the stager's.
    pub fn stage(&self, device_dir: &Path, ordinal: u32, dest: &Path) -> Result<Vec<StagedClip>> {
        if !device_dir.is_dir() {
            return Err(StagingError::MissingDirectory {
                path: device_dir.display().to_string(),
            }
            .into());
        }

        std::fs::create_dir_all(dest)?;

        let sources = self.matching_clips(device_dir)?;
        let mut staged = Vec::with_capacity(sources.len());

        for source in sources {
            let file_name = match source.file_name().and_then(|n| n.to_str()) {
                Some(name) => name,
                None => {
                    warn!("Skipping clip with non-UTF-8 name: {:?}", source);
                    continue;
                }
            };

            let staged_name = format!("{}_{}", ordinal, file_name);
            let target = dest.join(&staged_name);

            if target.exists() {
                return Err(StagingError::DestinationCollision {
                    path: target.display().to_string(),
                }
                .into());
            }

            std::fs::copy(&source, &target).map_err(|e| StagingError::CopyFailed {
                src: source.display().to_string(),
                reason: e.to_string(),
            })?;

            debug!("Staged {} -> {}", source.display(), target.display());
            staged.push(StagedClip {
                name: staged_name,
                path: target,
            });
        }

        info!(
            "Staged {} clips from {} into {}",
            staged.len(),
            device_dir.display(),
            dest.display()
        );
        Ok(staged)
    }

    /// Re-discover previously staged clips in `dir` (for runs that skip the
    /// copy stage).
    pub fn list_staged(&self, dir: &Path) -> Result<Vec<StagedClip>> {
        if !dir.is_dir() {
            return Err(StagingError::MissingDirectory {
                path: dir.display().to_string(),
            }
            .into());
        }

        let clips = self
            .matching_clips(dir)?
            .into_iter()
            .filter_map(|path| {
                let name = path.file_name()?.to_str()?.to_string();
                Some(StagedClip { name, path })
            })
            .collect();

        Ok(clips)
    }

    /// Files in `dir` whose extension matches, skipping hidden files and
    /// subdirectories. Returned lexically sorted so staging is deterministic.
    fn matching_clips(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(dir).map_err(|e| StagingError::Unreadable {
            path: dir.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut clips = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StagingError::Unreadable {
                path: dir.display().to_string(),
                reason: e.to_string(),
            })?;
            let path = entry.path();

            if !path.is_file() || is_hidden_file(&path) {
                continue;
            }

            let matches = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case(&self.extension))
                .unwrap_or(false);

            if matches {
                clips.push(path);
            } else {
                debug!("Ignoring non-clip file {}", path.display());
            }
        }

        clips.sort();
        Ok(clips)
    }
}

fn is_hidden_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompilerError;
    use tempfile::tempdir;

    fn write_clip(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_stage_renames_with_ordinal_prefix() {
        let root = tempdir().unwrap();
        let device = root.path().join("device");
        let dest = root.path().join("compiled");
        std::fs::create_dir(&device).unwrap();
        write_clip(&device, "clip_a.avi", b"aaaa");
        write_clip(&device, "clip_b.avi", b"bb");

        let staged = Stager::new("avi").stage(&device, 0, &dest).unwrap();

        let names: Vec<&str> = staged.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["0_clip_a.avi", "0_clip_b.avi"]);
    }

    #[test]
    fn test_stage_copies_byte_identical_and_keeps_sources() {
        let root = tempdir().unwrap();
        let device = root.path().join("device");
        let dest = root.path().join("compiled");
        std::fs::create_dir(&device).unwrap();
        let source = write_clip(&device, "trial.avi", b"frame-bytes");

        let staged = Stager::new("avi").stage(&device, 3, &dest).unwrap();

        assert!(source.exists(), "staging must not move the source");
        assert_eq!(
            std::fs::read(&staged[0].path).unwrap(),
            std::fs::read(&source).unwrap()
        );
    }

    #[test]
    fn test_stage_skips_foreign_extensions_and_hidden_files() {
        let root = tempdir().unwrap();
        let device = root.path().join("device");
        let dest = root.path().join("compiled");
        std::fs::create_dir(&device).unwrap();
        write_clip(&device, "clip.avi", b"x");
        write_clip(&device, "notes.txt", b"x");
        write_clip(&device, ".hidden.avi", b"x");

        let staged = Stager::new("avi").stage(&device, 0, &dest).unwrap();
        assert_eq!(staged.len(), 1);
        assert_eq!(staged[0].name, "0_clip.avi");
    }

    #[test]
    fn test_stage_collision_is_an_error() {
        let root = tempdir().unwrap();
        let device = root.path().join("device");
        let dest = root.path().join("compiled");
        std::fs::create_dir(&device).unwrap();
        write_clip(&device, "clip.avi", b"x");

        let stager = Stager::new("avi");
        stager.stage(&device, 0, &dest).unwrap();
        let err = stager.stage(&device, 0, &dest).unwrap_err();

        assert!(matches!(
            err,
            CompilerError::Staging(StagingError::DestinationCollision { .. })
        ));
    }

    #[test]
    fn test_missing_device_dir_is_an_error() {
        let root = tempdir().unwrap();
        let err = Stager::new("avi")
            .stage(&root.path().join("nope"), 0, &root.path().join("compiled"))
            .unwrap_err();

        assert!(matches!(
            err,
            CompilerError::Staging(StagingError::MissingDirectory { .. })
        ));
    }

    #[test]
    fn test_empty_device_dir_stages_nothing() {
        let root = tempdir().unwrap();
        let device = root.path().join("device");
        let dest = root.path().join("compiled");
        std::fs::create_dir(&device).unwrap();

        let staged = Stager::new("avi").stage(&device, 0, &dest).unwrap();
        assert!(staged.is_empty());
    }

    #[test]
    fn test_list_staged_finds_previous_run() {
        let root = tempdir().unwrap();
        let device = root.path().join("device");
        let dest = root.path().join("compiled");
        std::fs::create_dir(&device).unwrap();
        write_clip(&device, "clip.avi", b"x");

        let stager = Stager::new("avi");
        stager.stage(&device, 1, &dest).unwrap();

        let listed = stager.list_staged(&dest).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "1_clip.avi");
    }
}
