use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use crate::{
    assets::decode::decode_animation,
    effects::key::{KeyStats, classify_and_key},
    encode::{animated::write_animation, still::write_still},
    foundation::{
        core::{Animation, FrameDelay},
        error::{SpriteKeyError, SpriteKeyResult},
    },
};

/// One input animation and where its derived outputs go.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AssetJob {
    pub input: PathBuf,
    pub output_prefix: PathBuf,
    #[serde(default)]
    pub reverse: bool,
}

impl AssetJob {
    pub fn new(
        input: impl Into<PathBuf>,
        output_prefix: impl Into<PathBuf>,
        reverse: bool,
    ) -> Self {
        Self {
            input: input.into(),
            output_prefix: output_prefix.into(),
            reverse,
        }
    }

    /// Uses the input path minus its extension as the output prefix.
    pub fn from_input(input: impl Into<PathBuf>, reverse: bool) -> Self {
        let input = input.into();
        let output_prefix = input.with_extension("");
        Self {
            input,
            output_prefix,
            reverse,
        }
    }

    pub fn output_paths(&self) -> OutputPaths {
        OutputPaths::for_prefix(&self.output_prefix)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputPaths {
    pub processed: PathBuf,
    pub reversed: PathBuf,
    pub first: PathBuf,
    pub last: PathBuf,
}

impl OutputPaths {
    pub fn for_prefix(prefix: &Path) -> Self {
        let with_suffix = |suffix: &str| {
            let mut s = OsString::from(prefix.as_os_str());
            s.push(suffix);
            PathBuf::from(s)
        };
        Self {
            processed: with_suffix("_processed.gif"),
            reversed: with_suffix("_reversed.gif"),
            first: with_suffix("_static.png"),
            last: with_suffix("_last.png"),
        }
    }
}

/// An export that stopped part way. Files in `written` were left on disk.
#[derive(thiserror::Error, Debug)]
#[error("export stopped after writing {} file(s)", .written.len())]
pub struct ExportError {
    pub written: Vec<PathBuf>,
    #[source]
    pub source: SpriteKeyError,
}

/// Keys every frame of `anim` in place.
pub fn key_animation(anim: &mut Animation) -> KeyStats {
    let mut total = KeyStats::default();
    for (idx, frame) in anim.frames_mut().iter_mut().enumerate() {
        let stats = classify_and_key(frame);
        tracing::debug!(
            frame = idx,
            kept = stats.kept,
            cleared = stats.cleared,
            "keyed frame"
        );
        total += stats;
    }
    total
}

/// Writes the forward animation, the reversed one when requested, then the first and
/// last frames. Stops at the first failed write.
pub fn export_job(job: &AssetJob, anim: &Animation) -> Result<Vec<PathBuf>, ExportError> {
    let paths = job.output_paths();
    let mut written = Vec::with_capacity(4);
    match write_outputs(job.reverse, anim, &paths, &mut written) {
        Ok(()) => Ok(written),
        Err(source) => Err(ExportError { written, source }),
    }
}

fn write_outputs(
    reverse: bool,
    anim: &Animation,
    paths: &OutputPaths,
    written: &mut Vec<PathBuf>,
) -> SpriteKeyResult<()> {
    write_animation(&paths.processed, anim.frames(), anim.delay())?;
    record(written, &paths.processed);

    if reverse {
        write_animation(&paths.reversed, anim.frames().iter().rev(), anim.delay())?;
        record(written, &paths.reversed);
    }

    write_still(&paths.first, anim.first_frame())?;
    record(written, &paths.first);

    write_still(&paths.last, anim.last_frame())?;
    record(written, &paths.last);
    Ok(())
}

fn record(written: &mut Vec<PathBuf>, path: &Path) {
    tracing::info!("created {}", path.display());
    written.push(path.to_path_buf());
}

#[derive(Debug)]
pub enum JobOutcome {
    Completed { written: Vec<PathBuf> },
    /// The input did not exist; nothing was written.
    Skipped,
    Failed {
        cause: SpriteKeyError,
        written: Vec<PathBuf>,
    },
}

impl JobOutcome {
    pub fn written(&self) -> &[PathBuf] {
        match self {
            Self::Completed { written } | Self::Failed { written, .. } => written,
            Self::Skipped => &[],
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Runs one job end to end: existence check, decode, key, export.
///
/// Never returns an error; every failure is logged and folded into the outcome.
#[tracing::instrument(skip_all, fields(input = %job.input.display()))]
pub fn process_job(job: &AssetJob, fallback_delay: FrameDelay) -> JobOutcome {
    if !job.input.exists() {
        tracing::warn!("skipping {} (not found)", job.input.display());
        return JobOutcome::Skipped;
    }

    tracing::info!("processing {}", job.input.display());

    let mut anim = match decode_animation(&job.input, fallback_delay) {
        Ok(anim) => anim,
        Err(cause) => {
            tracing::error!("error processing {}: {cause:#}", job.input.display());
            return JobOutcome::Failed {
                cause,
                written: Vec::new(),
            };
        }
    };

    let stats = key_animation(&mut anim);
    tracing::debug!(
        frames = anim.len(),
        delay_ms = anim.delay().as_ms(),
        kept = stats.kept,
        cleared = stats.cleared,
        "keyed animation"
    );

    match export_job(job, &anim) {
        Ok(written) => JobOutcome::Completed { written },
        Err(ExportError { written, source }) => {
            tracing::error!("error processing {}: {source:#}", job.input.display());
            JobOutcome::Failed {
                cause: source,
                written,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::*;

    #[test]
    fn output_paths_append_suffixes() {
        let p = OutputPaths::for_prefix(Path::new("public/blink_10"));
        assert_eq!(p.processed, PathBuf::from("public/blink_10_processed.gif"));
        assert_eq!(p.reversed, PathBuf::from("public/blink_10_reversed.gif"));
        assert_eq!(p.first, PathBuf::from("public/blink_10_static.png"));
        assert_eq!(p.last, PathBuf::from("public/blink_10_last.png"));
    }

    #[test]
    fn prefix_defaults_to_input_without_extension() {
        let job = AssetJob::from_input("assets/walk.v2.gif", true);
        assert_eq!(job.output_prefix, PathBuf::from("assets/walk.v2"));
        assert!(job.reverse);
        assert_eq!(
            job.output_paths().processed,
            PathBuf::from("assets/walk.v2_processed.gif")
        );
    }

    #[test]
    fn key_animation_touches_every_frame() {
        let mut anim = Animation::new(
            vec![
                RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255])),
                RgbaImage::from_pixel(2, 2, Rgba([128, 128, 128, 255])),
            ],
            FrameDelay::DEFAULT,
        )
        .unwrap();

        let stats = key_animation(&mut anim);
        assert_eq!(stats, KeyStats { kept: 4, cleared: 4 });
        assert_eq!(anim.first_frame().get_pixel(1, 1).0, [0, 0, 0, 255]);
        assert_eq!(anim.last_frame().get_pixel(1, 1).0, [255, 255, 255, 0]);
    }

    #[test]
    fn missing_input_is_skipped() {
        let job = AssetJob::new("no/such/input.gif", "no/such/out", true);
        let outcome = process_job(&job, FrameDelay::DEFAULT);
        assert!(matches!(outcome, JobOutcome::Skipped));
        assert!(outcome.written().is_empty());
        assert!(!job.output_paths().processed.exists());
    }
}
