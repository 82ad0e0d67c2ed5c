//! Pixel values for a 1-bit display
//!
//! This module defines the [`Fill`] enum used to clear the whole framebuffer
//! and the grayscale threshold that decides whether an image pixel lights up.
//!
//! ## Pixel Representation
//!
//! Each framebuffer bit is one pixel: `1` lights the OLED pixel, `0` leaves
//! it dark.
//!
//! | Fill     | Byte   |
//! |----------|--------|
//! | `AllOn`  | `0xFF` |
//! | `AllOff` | `0x00` |
//!
//! ## Threshold
//!
//! Image pixels are reduced to 8-bit luma first. A luma of 128 or more turns
//! the pixel on, 127 or less turns it off.
//!
//! ```
//! use sh1107::color::{is_lit, luma};
//!
//! assert!(is_lit(128));
//! assert!(!is_lit(127));
//! assert_eq!(luma(255, 255, 255), 255);
//! assert_eq!(luma(128, 128, 128), 128);
//! ```

/// Value written to every pixel by a full clear
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Fill {
    /// All pixels lit
    AllOn,
    /// All pixels dark
    AllOff,
}

impl Fill {
    /// Get the byte value that fills a page column with this value
    ///
    /// ## Example
    ///
    /// ```
    /// use sh1107::Fill;
    ///
    /// assert_eq!(Fill::AllOn.byte(), 0xFF);
    /// assert_eq!(Fill::AllOff.byte(), 0x00);
    /// ```
    pub fn byte(self) -> u8 {
        match self {
            Self::AllOn => 0xFF,
            Self::AllOff => 0x00,
        }
    }
}

impl From<bool> for Fill {
    fn from(on: bool) -> Self {
        if on { Self::AllOn } else { Self::AllOff }
    }
}

#[cfg(feature = "graphics")]
impl From<embedded_graphics_core::pixelcolor::BinaryColor> for Fill {
    fn from(color: embedded_graphics_core::pixelcolor::BinaryColor) -> Self {
        Self::from(color.is_on())
    }
}

/// Highest luma that still maps to an unlit pixel
pub const THRESHOLD: u8 = 127;

/// Whether a pixel of the given luma is drawn lit
pub fn is_lit(luma: u8) -> bool {
    luma > THRESHOLD
}

/// 8-bit luma of an 8-bit RGB colour
///
/// Uses ITU-R BT.601 weights in 16.16 fixed point. The weights sum to
/// exactly 65536, so any gray `(v, v, v)` maps back to `v` and the threshold
/// boundary does not move between gray and colour inputs.
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let y = 19_595 * u32::from(r) + 38_470 * u32::from(g) + 7_471 * u32::from(b) + (1 << 15);
    (y >> 16) as u8
}
