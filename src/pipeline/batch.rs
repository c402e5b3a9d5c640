use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;

use crate::{
    foundation::{
        core::FrameDelay,
        error::{SpriteKeyError, SpriteKeyResult},
    },
    pipeline::job::{AssetJob, JobOutcome, process_job},
};

fn default_delay_ms() -> u32 {
    FrameDelay::DEFAULT.as_ms()
}

/// The list of jobs for one run, plus the delay used for sources without timing.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BatchConfig {
    #[serde(default = "default_delay_ms")]
    pub default_delay_ms: u32,
    pub jobs: Vec<AssetJob>,
}

impl BatchConfig {
    pub fn new(jobs: Vec<AssetJob>) -> Self {
        Self {
            default_delay_ms: default_delay_ms(),
            jobs,
        }
    }

    /// The built-in sprite list, relative to the working directory.
    pub fn default_assets() -> Self {
        Self::new(vec![
            AssetJob::new("public/blink_10.gif", "public/blink_10", false),
            AssetJob::new("public/middle_down_10.gif", "public/middle_down_10", true),
            AssetJob::new("public/middle_left_12.gif", "public/middle_left_12", true),
            AssetJob::new("public/middle_right_12.gif", "public/middle_right_12", true),
        ])
    }

    /// Reads a JSON manifest. Relative job paths resolve against the manifest's directory.
    pub fn from_path(path: impl AsRef<Path>) -> SpriteKeyResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).with_context(|| format!("open manifest '{}'", path.display()))?;
        let mut cfg: Self = serde_json::from_reader(BufReader::new(f))
            .map_err(|e| SpriteKeyError::validation(format!("parse manifest: {e}")))?;

        let root = path.parent().unwrap_or_else(|| Path::new("."));
        cfg.resolve_relative_to(root);
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn resolve_relative_to(&mut self, root: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = root.join(&*p);
            }
        };
        for job in &mut self.jobs {
            resolve(&mut job.input);
            resolve(&mut job.output_prefix);
        }
    }

    pub fn validate(&self) -> SpriteKeyResult<()> {
        if self.jobs.is_empty() {
            return Err(SpriteKeyError::validation("manifest lists no jobs"));
        }
        FrameDelay::from_ms(self.default_delay_ms)?;
        for (idx, job) in self.jobs.iter().enumerate() {
            if job.input.as_os_str().is_empty() {
                return Err(SpriteKeyError::validation(format!(
                    "job {idx}: input path is empty"
                )));
            }
            if job.output_prefix.as_os_str().is_empty() {
                return Err(SpriteKeyError::validation(format!(
                    "job {idx}: output prefix is empty"
                )));
            }
        }
        Ok(())
    }

    pub fn fallback_delay(&self) -> FrameDelay {
        FrameDelay::from_ms(self.default_delay_ms).unwrap_or_default()
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<(AssetJob, JobOutcome)>,
}

impl BatchReport {
    pub fn completed(&self) -> usize {
        self.count(|o| matches!(o, JobOutcome::Completed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, JobOutcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, JobOutcome::Failed { .. }))
    }

    pub fn files_written(&self) -> usize {
        self.outcomes.iter().map(|(_, o)| o.written().len()).sum()
    }

    fn count(&self, pred: impl Fn(&JobOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }
}

/// Processes every job in order. Skips and failures are recorded, never propagated.
pub fn run_batch(config: &BatchConfig) -> BatchReport {
    let fallback = config.fallback_delay();
    let mut report = BatchReport::default();
    for job in &config.jobs {
        let outcome = process_job(job, fallback);
        report.outcomes.push((job.clone(), outcome));
    }

    tracing::info!(
        completed = report.completed(),
        skipped = report.skipped(),
        failed = report.failed(),
        files = report.files_written(),
        "batch finished"
    );
    report
}
