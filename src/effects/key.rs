//! Black/white color keying.
//!
//! Every pixel is classified by a hard threshold on its color channels. Near-black and
//! near-white pixels survive untouched; everything in between is replaced by a fully
//! transparent pixel. There is no blending at the band edges.

use image::{Rgba, RgbaImage};

/// Channels strictly below this value count as black.
pub const BLACK_MAX: u8 = 50;
/// Channels strictly above this value count as white.
pub const WHITE_MIN: u8 = 200;
/// Replacement for keyed-out pixels.
pub const KEYED_OUT: Rgba<u8> = Rgba([255, 255, 255, 0]);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelClass {
    Black,
    White,
    Other,
}

/// Alpha does not take part in classification.
pub fn classify_pixel(px: Rgba<u8>) -> PixelClass {
    let [r, g, b, _] = px.0;
    if r < BLACK_MAX && g < BLACK_MAX && b < BLACK_MAX {
        PixelClass::Black
    } else if r > WHITE_MIN && g > WHITE_MIN && b > WHITE_MIN {
        PixelClass::White
    } else {
        PixelClass::Other
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyStats {
    pub kept: u64,
    pub cleared: u64,
}

impl KeyStats {
    pub fn total(self) -> u64 {
        self.kept + self.cleared
    }
}

impl std::ops::AddAssign for KeyStats {
    fn add_assign(&mut self, rhs: Self) {
        self.kept += rhs.kept;
        self.cleared += rhs.cleared;
    }
}

/// Keys `frame` in place; dimensions are unchanged.
pub fn classify_and_key(frame: &mut RgbaImage) -> KeyStats {
    let mut stats = KeyStats::default();
    for px in frame.pixels_mut() {
        match classify_pixel(*px) {
            PixelClass::Black | PixelClass::White => stats.kept += 1,
            PixelClass::Other => {
                *px = KEYED_OUT;
                stats.cleared += 1;
            }
        }
    }
    stats
}
