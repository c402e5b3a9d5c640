use std::{fs::File, io::BufWriter, io::Write, path::Path};

use anyhow::Context as _;
use gif::{DisposalMethod, Encoder, Repeat};
use image::RgbaImage;

use crate::{
    effects::key::KEYED_OUT,
    encode::ensure_parent_dir,
    foundation::{
        core::FrameDelay,
        error::{SpriteKeyError, SpriteKeyResult},
    },
};

/// Quantizer speed handed to `gif`; 1 is slowest/best, 30 fastest.
const QUANTIZE_SPEED: i32 = 10;

/// Writes `frames` as an endlessly looping GIF.
///
/// Every frame shows for `delay` and is disposed to background before the next one, so
/// transparent regions never accumulate pixels from earlier frames.
pub fn write_animation<'a, I>(path: &Path, frames: I, delay: FrameDelay) -> SpriteKeyResult<()>
where
    I: IntoIterator<Item = &'a RgbaImage>,
{
    ensure_parent_dir(path)?;
    let file = File::create(path).with_context(|| format!("create '{}'", path.display()))?;
    let out = encode_gif(BufWriter::new(file), frames, delay)?;
    out.into_inner()
        .map_err(|e| e.into_error())
        .and_then(|mut f| f.flush())
        .with_context(|| format!("flush '{}'", path.display()))?;
    Ok(())
}

/// Encodes into any writer and hands it back once the trailer is written.
pub fn encode_gif<'a, W, I>(writer: W, frames: I, delay: FrameDelay) -> SpriteKeyResult<W>
where
    W: Write,
    I: IntoIterator<Item = &'a RgbaImage>,
{
    let mut frames = frames.into_iter().peekable();
    let Some(first) = frames.peek() else {
        return Err(SpriteKeyError::validation("cannot encode a gif with no frames"));
    };
    let (width, height) = gif_dimensions(first)?;

    let mut encoder = Encoder::new(writer, width, height, &[])
        .map_err(|e| SpriteKeyError::encode(format!("write gif header: {e}")))?;
    encoder
        .set_repeat(Repeat::Infinite)
        .map_err(|e| SpriteKeyError::encode(format!("write gif loop extension: {e}")))?;

    let mut scratch = Vec::new();
    for (idx, img) in frames.enumerate() {
        if gif_dimensions(img)? != (width, height) {
            return Err(SpriteKeyError::validation(format!(
                "frame {idx} is {}x{}, expected {width}x{height}",
                img.width(),
                img.height()
            )));
        }

        scratch.clear();
        scratch.extend_from_slice(img.as_raw());
        unify_transparent(&mut scratch);
        let mut frame = gif::Frame::from_rgba_speed(width, height, &mut scratch, QUANTIZE_SPEED);
        frame.delay = delay.as_gif_centis();
        frame.dispose = DisposalMethod::Background;

        encoder
            .write_frame(&frame)
            .map_err(|e| SpriteKeyError::encode(format!("write gif frame {idx}: {e}")))?;
    }

    encoder
        .into_inner()
        .map_err(|e| SpriteKeyError::encode(format!("write gif trailer: {e}")))
}

/// GIF has a single transparent palette slot, so every alpha-0 pixel must share one color
/// or the quantizer turns the others opaque.
fn unify_transparent(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        if px[3] == 0 {
            px.copy_from_slice(&KEYED_OUT.0);
        }
    }
}

fn gif_dimensions(img: &RgbaImage) -> SpriteKeyResult<(u16, u16)> {
    match (u16::try_from(img.width()), u16::try_from(img.height())) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(SpriteKeyError::validation(format!(
            "{}x{} exceeds the gif limit of 65535x65535",
            img.width(),
            img.height()
        ))),
    }
}
