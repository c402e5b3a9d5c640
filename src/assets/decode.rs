use std::{
    io::{BufRead, Seek},
    path::Path,
};

use anyhow::Context;
use image::{
    AnimationDecoder, DynamicImage, Frame, ImageFormat, ImageReader,
    codecs::{gif::GifDecoder, png::PngDecoder, webp::WebPDecoder},
};

use crate::foundation::{
    core::{Animation, FrameDelay},
    error::{SpriteKeyError, SpriteKeyResult},
};

/// Decodes every frame of the animation at `path` into RGBA8.
///
/// The container is sniffed from the file header first and from the extension second.
/// Still images come back as a single-frame animation. `fallback_delay` applies when the
/// source carries no frame timing.
pub fn decode_animation(path: &Path, fallback_delay: FrameDelay) -> SpriteKeyResult<Animation> {
    let reader = ImageReader::open(path)
        .with_context(|| format!("open '{}'", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("read header of '{}'", path.display()))?;

    let format = match reader.format() {
        Some(f) => f,
        None => ImageFormat::from_path(path).map_err(|_| {
            SpriteKeyError::decode(format!(
                "could not determine image format of '{}'",
                path.display()
            ))
        })?,
    };

    decode_animation_from_reader(reader.into_inner(), format, fallback_delay)
        .with_context(|| format!("decode '{}'", path.display()))
        .map_err(SpriteKeyError::from)
}

pub fn decode_animation_from_reader<R: BufRead + Seek>(
    reader: R,
    format: ImageFormat,
    fallback_delay: FrameDelay,
) -> SpriteKeyResult<Animation> {
    let frames = match format {
        ImageFormat::Gif => {
            let decoder = GifDecoder::new(reader).context("read gif header")?;
            decoder.into_frames().collect_frames().context("decode gif frames")?
        }
        ImageFormat::Png => {
            let decoder = PngDecoder::new(reader).context("read png header")?;
            if decoder.is_apng().context("inspect png animation chunks")? {
                decoder
                    .apng()
                    .context("read apng control chunk")?
                    .into_frames()
                    .collect_frames()
                    .context("decode apng frames")?
            } else {
                vec![still_frame(
                    DynamicImage::from_decoder(decoder).context("decode png")?,
                )]
            }
        }
        ImageFormat::WebP => {
            let decoder = WebPDecoder::new(reader).context("read webp header")?;
            if decoder.has_animation() {
                decoder
                    .into_frames()
                    .collect_frames()
                    .context("decode webp frames")?
            } else {
                vec![still_frame(
                    DynamicImage::from_decoder(decoder).context("decode webp")?,
                )]
            }
        }
        other => {
            let mut still = ImageReader::new(reader);
            still.set_format(other);
            let img = still
                .decode()
                .map_err(|e| SpriteKeyError::decode(format!("{other:?}: {e}")))?;
            vec![still_frame(img)]
        }
    };

    tracing::debug!(frames = frames.len(), ?format, "decoded source");
    animation_from_frames(frames, fallback_delay)
}

fn still_frame(img: DynamicImage) -> Frame {
    Frame::new(img.to_rgba8())
}

/// The first frame's delay is applied to the whole animation.
fn animation_from_frames(
    frames: Vec<Frame>,
    fallback_delay: FrameDelay,
) -> SpriteKeyResult<Animation> {
    let delay = frames
        .first()
        .and_then(|f| {
            let (numer, denom) = f.delay().numer_denom_ms();
            FrameDelay::from_ratio_ms(numer, denom)
        })
        .unwrap_or(fallback_delay);

    let buffers = frames.into_iter().map(Frame::into_buffer).collect();
    Animation::new(buffers, delay)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{Delay, Rgba, RgbaImage, codecs::gif::GifEncoder};

    use super::*;

    fn gif_bytes(frames: &[(RgbaImage, u32)]) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut enc = GifEncoder::new(&mut buf);
            for (img, ms) in frames {
                enc.encode_frame(Frame::from_parts(
                    img.clone(),
                    0,
                    0,
                    Delay::from_numer_denom_ms(*ms, 1),
                ))
                .unwrap();
            }
        }
        buf
    }

    #[test]
    fn gif_frames_and_delay_are_read() {
        let black = RgbaImage::from_pixel(3, 2, Rgba([0, 0, 0, 255]));
        let white = RgbaImage::from_pixel(3, 2, Rgba([255, 255, 255, 255]));
        let bytes = gif_bytes(&[(black, 70), (white, 70)]);

        let anim = decode_animation_from_reader(
            Cursor::new(bytes),
            ImageFormat::Gif,
            FrameDelay::DEFAULT,
        )
        .unwrap();
        assert_eq!(anim.len(), 2);
        assert_eq!(anim.dimensions(), (3, 2));
        assert_eq!(anim.delay(), FrameDelay(70));
        assert_eq!(anim.first_frame().get_pixel(0, 0).0, [0, 0, 0, 255]);
        assert_eq!(anim.last_frame().get_pixel(2, 1).0, [255, 255, 255, 255]);
    }

    #[test]
    fn gif_without_delay_uses_fallback() {
        let px = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]));
        let bytes = gif_bytes(&[(px, 0)]);
        let anim =
            decode_animation_from_reader(Cursor::new(bytes), ImageFormat::Gif, FrameDelay(250))
                .unwrap();
        assert_eq!(anim.delay(), FrameDelay(250));
    }

    #[test]
    fn still_png_is_one_frame() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([12, 34, 56, 78]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();

        let anim =
            decode_animation_from_reader(Cursor::new(buf), ImageFormat::Png, FrameDelay::DEFAULT)
                .unwrap();
        assert_eq!(anim.len(), 1);
        assert_eq!(anim.delay(), FrameDelay::DEFAULT);
        assert_eq!(anim.first_frame().get_pixel(3, 3).0, [12, 34, 56, 78]);
    }

    #[test]
    fn corrupt_input_is_an_error() {
        let bad = b"GIF89a\x01".to_vec();
        assert!(
            decode_animation_from_reader(Cursor::new(bad), ImageFormat::Gif, FrameDelay::DEFAULT)
                .is_err()
        );
    }

    #[test]
    fn missing_file_reports_path() {
        let err =
            decode_animation(Path::new("does/not/exist.gif"), FrameDelay::DEFAULT).unwrap_err();
        assert!(format!("{err:#}").contains("exist.gif"));
    }
}
