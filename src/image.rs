//! Source images for [`Display::blit`](crate::display::Display::blit)
//!
//! Anything that can report its size and the luma of a pixel can be blitted.
//! [`GrayFrame`] is the owned 8-bit grayscale image produced by the animation
//! decoder; with the `std` feature a decoded [`tinybmp::Bmp`] can be blitted
//! directly.

#[cfg(any(test, feature = "alloc", feature = "std"))]
use crate::color::luma;

/// Pixel-addressable grayscale or colour image
pub trait Image {
    /// Width in pixels
    fn width(&self) -> u32;

    /// Height in pixels
    fn height(&self) -> u32;

    /// 8-bit luma of the pixel at (`x`, `y`)
    ///
    /// Callers stay within `[0, width) x [0, height)`.
    fn luma(&self, x: u32, y: u32) -> u8;
}

impl<T: Image + ?Sized> Image for &T {
    fn width(&self) -> u32 {
        (**self).width()
    }

    fn height(&self) -> u32 {
        (**self).height()
    }

    fn luma(&self, x: u32, y: u32) -> u8 {
        (**self).luma(x, y)
    }
}

/// Owned 8-bit grayscale image, row-major
#[cfg(any(test, feature = "alloc"))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayFrame {
    width: u32,
    height: u32,
    pixels: alloc::vec::Vec<u8>,
}

#[cfg(any(test, feature = "alloc"))]
impl GrayFrame {
    /// Wrap row-major luma values, `None` unless `pixels.len() == width * height`
    pub fn new(width: u32, height: u32, pixels: alloc::vec::Vec<u8>) -> Option<Self> {
        if pixels.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build a frame by evaluating `f(x, y)` for every pixel
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> u8) -> Self {
        let mut pixels = alloc::vec::Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Build a frame from row-major 8-bit RGB triples
    pub fn from_rgb(width: u32, height: u32, rgb: &[[u8; 3]]) -> Option<Self> {
        if rgb.len() != width as usize * height as usize {
            return None;
        }
        let pixels = rgb.iter().map(|[r, g, b]| luma(*r, *g, *b)).collect();
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Row-major luma values
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }
}

#[cfg(any(test, feature = "alloc"))]
impl Image for GrayFrame {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn luma(&self, x: u32, y: u32) -> u8 {
        self.pixels[y as usize * self.width as usize + x as usize]
    }
}

#[cfg(feature = "std")]
impl Image for tinybmp::Bmp<'_, embedded_graphics_core::pixelcolor::Rgb888> {
    fn width(&self) -> u32 {
        embedded_graphics_core::geometry::OriginDimensions::size(self).width
    }

    fn height(&self) -> u32 {
        embedded_graphics_core::geometry::OriginDimensions::size(self).height
    }

    fn luma(&self, x: u32, y: u32) -> u8 {
        use embedded_graphics_core::{image::GetPixel, pixelcolor::RgbColor};

        let point = embedded_graphics_core::geometry::Point::new(x as i32, y as i32);
        self.pixel(point)
            .map_or(0, |color| luma(color.r(), color.g(), color.b()))
    }
}
