use tokio::task;
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    error::{PipelineError, Result},
    session::{SessionLayout, TrialSpec},
    staging::{sort_natural, StagedClip, Stager},
    video::{MergeReport, Merger},
};

/// Main compile engine that runs the whole staging-and-merge pipeline
///
/// The engine follows a clear pipeline:
/// 1. Staging - copy and rename the trial's device clips into the compiled folder
/// 2. Ordering - sort the staged files in natural filename order
/// 3. Merging - stream-decode, resize, and stream-encode into one output video
pub struct CompileEngine {
    config: Config,
}

impl CompileEngine {
    /// Create a new compile engine with the given configuration
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the full pipeline for one trial of one device.
    ///
    /// Any failure in any stage aborts the run; there is no partial-success
    /// mode and no retry.
    pub async fn compile(&self, layout: &SessionLayout, trial: &TrialSpec) -> Result<MergeReport> {
        info!("🎬 Starting minicam compile");
        info!("   Session: {:?}", layout.root());
        info!("   Trial: {} (ordinal {})", trial.name, trial.ordinal);
        info!("   Device: {}", layout.device());

        self.config.validate()?;

        // Pipeline Step 1: Staging
        let mut staged = self.stage_clips(layout, trial)?;

        // Pipeline Step 2: Natural ordering
        info!("🔢 Step 2: Ordering staged clips...");
        sort_natural(&mut staged);
        for clip in &staged {
            debug!("   {}", clip.name);
        }

        if staged.is_empty() {
            return Err(PipelineError::NoClipsFound {
                path: layout.compiled_dir().display().to_string(),
            }
            .into());
        }

        // Pipeline Step 3: Merging
        let report = self.merge_clips(layout, staged).await?;

        info!(
            "🎉 Compile complete: {} frames from {} clips -> {:?}",
            report.total_frames,
            report.clips.len(),
            report.output
        );
        Ok(report)
    }

    /// Stage the trial's clips, or re-list a previous run when staging is off.
    fn stage_clips(&self, layout: &SessionLayout, trial: &TrialSpec) -> Result<Vec<StagedClip>> {
        let stager = Stager::new(self.config.staging.extension.clone());
        let compiled_dir = layout.compiled_dir();

        if self.config.staging.enabled {
            info!("📂 Step 1: Staging clips...");
            let device_dir = layout.device_dir(trial);
            stager.stage(&device_dir, trial.ordinal, &compiled_dir)
        } else {
            warn!("📂 Step 1: Staging disabled, reusing {:?}", compiled_dir);
            stager.list_staged(&compiled_dir)
        }
    }

    /// Run the blocking merge on the blocking pool.
    async fn merge_clips(
        &self,
        layout: &SessionLayout,
        staged: Vec<StagedClip>,
    ) -> Result<MergeReport> {
        info!("🎞️  Step 3: Merging {} clips...", staged.len());

        if self.config.speed.enabled {
            info!(
                "   Speed conversion enabled: {}x playback",
                self.config.speed.factor
            );
        }

        let merger = Merger::new(self.config.effective_params());
        let output = layout.merged_output(&self.config.staging.extension);

        task::spawn_blocking(move || merger.merge(&staged, &output))
            .await
            .map_err(|e| PipelineError::OutputFailed {
                reason: format!("merge task failed: {}", e),
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompilerError;
    use crate::session::Device;
    use tempfile::tempdir;

    fn trial() -> TrialSpec {
        TrialSpec {
            name: "trial_01".to_string(),
            ordinal: 0,
        }
    }

    #[tokio::test]
    async fn test_empty_device_dir_reports_no_clips() {
        let root = tempdir().unwrap();
        let layout = SessionLayout::new(root.path(), Device::Minicam1);
        std::fs::create_dir_all(layout.device_dir(&trial())).unwrap();

        let engine = CompileEngine::new(Config::default());
        let err = engine.compile(&layout, &trial()).await.unwrap_err();

        assert!(matches!(
            err,
            CompilerError::Pipeline(PipelineError::NoClipsFound { .. })
        ));
        // The empty-input path must not leave an output artifact behind.
        assert!(!layout.merged_output("avi").exists());
    }

    #[tokio::test]
    async fn test_staging_disabled_requires_compiled_dir() {
        let root = tempdir().unwrap();
        let layout = SessionLayout::new(root.path(), Device::Minicam2);

        let mut config = Config::default();
        config.staging.enabled = false;

        let engine = CompileEngine::new(config);
        let err = engine.compile(&layout, &trial()).await.unwrap_err();

        assert!(matches!(err, CompilerError::Staging(_)));
    }

    #[tokio::test]
    async fn test_invalid_config_fails_before_staging() {
        let root = tempdir().unwrap();
        let layout = SessionLayout::new(root.path(), Device::Minicam1);

        let mut config = Config::default();
        config.video.params.fps = -5.0;

        let engine = CompileEngine::new(config);
        let err = engine.compile(&layout, &trial()).await.unwrap_err();

        assert!(matches!(err, CompilerError::Config(_)));
        // Nothing may be staged when configuration is rejected.
        assert!(!layout.compiled_dir().exists());
    }
}
