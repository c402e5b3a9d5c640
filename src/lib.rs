//! Color-keys animated sprite assets and exports their derived variants.
//!
//! Each [`AssetJob`] runs one straight-line pipeline:
//!
//! 1. **Decode**: read the source animation (GIF, APNG, animated WebP, or a still image)
//!    into an [`Animation`] of RGBA8 frames sharing one [`FrameDelay`].
//! 2. **Key**: [`classify_and_key`] keeps near-black and near-white pixels and turns
//!    every other pixel fully transparent.
//! 3. **Export**: [`export_job`] writes `<prefix>_processed.gif`, optionally
//!    `<prefix>_reversed.gif`, then `<prefix>_static.png` (first frame) and
//!    `<prefix>_last.png` (last frame).
//!
//! [`run_batch`] processes a [`BatchConfig`] one job at a time; a missing input is
//! skipped and a failing job is logged without stopping the rest.
#![forbid(unsafe_code)]

mod assets;
mod effects;
mod encode;
mod foundation;
mod pipeline;

pub use assets::decode::{decode_animation, decode_animation_from_reader};
pub use effects::key::{
    BLACK_MAX, KEYED_OUT, KeyStats, PixelClass, WHITE_MIN, classify_and_key, classify_pixel,
};
pub use encode::{
    animated::{encode_gif, write_animation},
    ensure_parent_dir,
    still::write_still,
};
pub use foundation::core::{Animation, FrameDelay};
pub use foundation::error::{SpriteKeyError, SpriteKeyResult};
pub use pipeline::batch::{BatchConfig, BatchReport, run_batch};
pub use pipeline::job::{
    AssetJob, ExportError, JobOutcome, OutputPaths, export_job, key_animation, process_job,
};
