use image::RgbaImage;

use crate::foundation::error::{SpriteKeyError, SpriteKeyResult};

/// Display time of a single animation frame, in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameDelay(pub u32);

impl FrameDelay {
    /// Used when the source animation carries no timing of its own.
    pub const DEFAULT: Self = Self(100);

    pub fn from_ms(ms: u32) -> SpriteKeyResult<Self> {
        if ms == 0 {
            return Err(SpriteKeyError::validation("frame delay must be > 0 ms"));
        }
        Ok(Self(ms))
    }

    /// Converts a `numer / denom` millisecond ratio (as reported by `image`) to whole
    /// milliseconds. Returns `None` when the ratio rounds to zero, i.e. no usable delay.
    pub fn from_ratio_ms(numer: u32, denom: u32) -> Option<Self> {
        if denom == 0 {
            return None;
        }
        let ms = (u64::from(numer) + u64::from(denom) / 2) / u64::from(denom);
        let ms = u32::try_from(ms).unwrap_or(u32::MAX);
        (ms > 0).then_some(Self(ms))
    }

    pub fn as_ms(self) -> u32 {
        self.0
    }

    /// GIF stores delays in hundredths of a second.
    pub fn as_gif_centis(self) -> u16 {
        let centis = (u64::from(self.0) + 5) / 10;
        u16::try_from(centis).unwrap_or(u16::MAX)
    }
}

impl Default for FrameDelay {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// An ordered, non-empty run of equally sized RGBA8 frames sharing one delay.
#[derive(Clone, Debug, PartialEq)]
pub struct Animation {
    frames: Vec<RgbaImage>,
    delay: FrameDelay,
}

impl Animation {
    pub fn new(frames: Vec<RgbaImage>, delay: FrameDelay) -> SpriteKeyResult<Self> {
        let Some(first) = frames.first() else {
            return Err(SpriteKeyError::validation("animation has no frames"));
        };
        let dims = first.dimensions();
        if dims.0 == 0 || dims.1 == 0 {
            return Err(SpriteKeyError::validation(
                "animation frame width/height must be non-zero",
            ));
        }
        if let Some((idx, f)) = frames
            .iter()
            .enumerate()
            .find(|(_, f)| f.dimensions() != dims)
        {
            return Err(SpriteKeyError::validation(format!(
                "frame {idx} is {}x{}, expected {}x{}",
                f.width(),
                f.height(),
                dims.0,
                dims.1
            )));
        }
        Ok(Self { frames, delay })
    }

    pub fn frames(&self) -> &[RgbaImage] {
        &self.frames
    }

    pub fn frames_mut(&mut self) -> &mut [RgbaImage] {
        &mut self.frames
    }

    pub fn delay(&self) -> FrameDelay {
        self.delay
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Construction rejects empty frame lists, so this is `false` in practice.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.frames[0].dimensions()
    }

    pub fn first_frame(&self) -> &RgbaImage {
        &self.frames[0]
    }

    pub fn last_frame(&self) -> &RgbaImage {
        &self.frames[self.frames.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, px: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(w, h, image::Rgba(px))
    }

    #[test]
    fn delay_ratio_rounds_and_rejects_zero() {
        assert_eq!(FrameDelay::from_ratio_ms(100, 1), Some(FrameDelay(100)));
        assert_eq!(FrameDelay::from_ratio_ms(250, 3), Some(FrameDelay(83)));
        assert_eq!(FrameDelay::from_ratio_ms(0, 1), None);
        assert_eq!(FrameDelay::from_ratio_ms(10, 0), None);
        assert!(FrameDelay::from_ms(0).is_err());
        assert_eq!(FrameDelay::default().as_ms(), 100);
    }

    #[test]
    fn delay_to_gif_centis() {
        assert_eq!(FrameDelay(100).as_gif_centis(), 10);
        assert_eq!(FrameDelay(85).as_gif_centis(), 9);
        assert_eq!(FrameDelay(4).as_gif_centis(), 0);
        assert_eq!(FrameDelay(u32::MAX).as_gif_centis(), u16::MAX);
    }

    #[test]
    fn animation_requires_frames_of_equal_size() {
        assert!(Animation::new(vec![], FrameDelay::DEFAULT).is_err());
        assert!(Animation::new(vec![RgbaImage::new(0, 4)], FrameDelay::DEFAULT).is_err());

        let err = Animation::new(
            vec![solid(2, 2, [0; 4]), solid(3, 2, [0; 4])],
            FrameDelay::DEFAULT,
        )
        .unwrap_err();
        assert!(err.to_string().contains("frame 1 is 3x2"));

        let anim = Animation::new(
            vec![solid(2, 2, [0, 0, 0, 255]), solid(2, 2, [255; 4])],
            FrameDelay(40),
        )
        .unwrap();
        assert_eq!(anim.len(), 2);
        assert_eq!(anim.dimensions(), (2, 2));
        assert_eq!(anim.first_frame().get_pixel(0, 0).0, [0, 0, 0, 255]);
        assert_eq!(anim.last_frame().get_pixel(0, 0).0, [255; 4]);
        assert_eq!(anim.delay(), FrameDelay(40));
    }
}
