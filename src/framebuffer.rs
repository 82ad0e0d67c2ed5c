//! Page-organized 1-bit framebuffer
//!
//! The SH1107 stores its display RAM as pages: horizontal bands of 8 rows.
//! Each byte of a page holds one column of 8 vertically stacked pixels, with
//! the top row in bit 0.
//!
//! ```text
//! page 0: byte[0]         byte[1]         ... byte[width-1]
//!         bit0 = (0, 0)   bit0 = (1, 0)
//!         bit7 = (0, 7)   bit7 = (1, 7)
//! page 1: byte[width]     ...
//!         bit0 = (0, 8)
//! ```
//!
//! [`Framebuffer`] only stores pixels; it never touches the bus.
//!
//! ## Example
//!
//! ```
//! use sh1107::{Dimensions, Fill, Framebuffer};
//!
//! let dims = match Dimensions::new(16, 16) {
//!     Ok(dims) => dims,
//!     Err(_) => return,
//! };
//! let mut fb = match Framebuffer::new(dims, [0u8; 32]) {
//!     Ok(fb) => fb,
//!     Err(_) => return,
//! };
//!
//! fb.set(3, 9, true);
//! assert_eq!(fb.page(1)[3], 0b0000_0010);
//!
//! // Off-screen writes are ignored
//! fb.set(-1, 100, true);
//!
//! fb.fill(Fill::AllOn);
//! assert!(fb.as_bytes().iter().all(|b| *b == 0xFF));
//! ```

use crate::color::Fill;
use crate::config::{Dimensions, PAGE_HEIGHT};
use crate::error::BufferTooSmall;

/// Bit-packed pixel store for one display
///
/// Generic over the backing storage so it works with a static array on
/// `no_std` targets and with a `Vec<u8>` when `alloc` is available. A backing
/// store larger than [`Dimensions::buffer_size`] is accepted; the excess is
/// never read or written.
#[derive(Clone, Debug)]
pub struct Framebuffer<B> {
    buffer: B,
    dimensions: Dimensions,
}

impl<B> Framebuffer<B>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    /// Wrap `buffer` as the framebuffer for a display of `dimensions`
    ///
    /// The buffer contents are kept as-is.
    ///
    /// # Errors
    ///
    /// Returns [`BufferTooSmall`] if `buffer` holds fewer than
    /// `dimensions.buffer_size()` bytes.
    pub fn new(dimensions: Dimensions, buffer: B) -> Result<Self, BufferTooSmall> {
        let required = dimensions.buffer_size();
        let provided = buffer.as_ref().len();
        if provided < required {
            return Err(BufferTooSmall { required, provided });
        }
        Ok(Self { buffer, dimensions })
    }

    /// Display dimensions this buffer was sized for
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Set or clear the pixel at (`x`, `y`)
    ///
    /// Coordinates outside `[0, width) x [0, height)` are ignored. Only the
    /// addressed bit changes; the other 7 pixels sharing its byte are kept.
    pub fn set(&mut self, x: i32, y: i32, on: bool) {
        let Some((offset, mask)) = self.locate(x, y) else {
            return;
        };
        let byte = &mut self.buffer.as_mut()[offset];
        if on {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
    }

    /// Read the pixel at (`x`, `y`), `None` when off-screen
    pub fn get(&self, x: i32, y: i32) -> Option<bool> {
        self.locate(x, y)
            .map(|(offset, mask)| self.buffer.as_ref()[offset] & mask != 0)
    }

    /// Fill every byte with the value of `fill`
    pub fn fill(&mut self, fill: Fill) {
        let len = self.dimensions.buffer_size();
        self.buffer.as_mut()[..len].fill(fill.byte());
    }

    /// Bytes of page `page` (one per column), empty if `page` is out of range
    pub fn page(&self, page: u16) -> &[u8] {
        if page >= self.dimensions.pages() {
            return &[];
        }
        let width = self.dimensions.width as usize;
        let start = page as usize * width;
        &self.buffer.as_ref()[start..start + width]
    }

    /// All pixel bytes, page by page
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer.as_ref()[..self.dimensions.buffer_size()]
    }

    /// Give back the backing storage
    pub fn into_inner(self) -> B {
        self.buffer
    }

    /// Byte offset and bit mask for an on-screen pixel
    fn locate(&self, x: i32, y: i32) -> Option<(usize, u8)> {
        let x = u16::try_from(x).ok()?;
        let y = u16::try_from(y).ok()?;
        if x >= self.dimensions.width || y >= self.dimensions.height {
            return None;
        }
        let page = (y / PAGE_HEIGHT) as usize;
        let offset = page * self.dimensions.width as usize + x as usize;
        let mask = 1u8 << (y % PAGE_HEIGHT);
        Some((offset, mask))
    }
}

#[cfg(any(test, feature = "alloc"))]
impl Framebuffer<alloc::vec::Vec<u8>> {
    /// Allocate a dark framebuffer sized for `dimensions`
    pub fn alloc(dimensions: Dimensions) -> Self {
        Self {
            buffer: alloc::vec![0u8; dimensions.buffer_size()],
            dimensions,
        }
    }
}
