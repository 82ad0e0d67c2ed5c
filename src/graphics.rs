//! Graphics support via embedded-graphics
//!
//! [`Display`] implements [`DrawTarget`] with
//! [`BinaryColor`](embedded_graphics_core::pixelcolor::BinaryColor) pixels, so
//! any embedded-graphics primitive, font or image can be drawn into the
//! framebuffer. Drawing never touches the bus; call
//! [`Display::render`] afterwards.
//!
//! The target reports the panel's native size for every rotation.
//!
//! ## Example
//!
//! ```rust,no_run
//! use embedded_graphics::{
//!     pixelcolor::BinaryColor,
//!     prelude::*,
//!     primitives::{Circle, PrimitiveStyle},
//! };
//! use sh1107::{Builder, Dimensions, Display, I2cInterface};
//! # use core::convert::Infallible;
//! # use embedded_hal::i2c::{ErrorType, I2c, Operation, SevenBitAddress};
//! # struct MockI2c;
//! # impl ErrorType for MockI2c { type Error = Infallible; }
//! # impl I2c<SevenBitAddress> for MockI2c {
//! #     fn transaction(
//! #         &mut self,
//! #         _address: u8,
//! #         _operations: &mut [Operation<'_>],
//! #     ) -> Result<(), Self::Error> {
//! #         Ok(())
//! #     }
//! # }
//! let dims = match Dimensions::new(128, 128) {
//!     Ok(dims) => dims,
//!     Err(_) => return,
//! };
//! let config = match Builder::new().dimensions(dims).build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//! let interface = I2cInterface::new(MockI2c, config.address);
//! let mut display = match Display::new(interface, config, [0u8; 2048]) {
//!     Ok(display) => display,
//!     Err(_) => return,
//! };
//!
//! let _ = Circle::new(Point::new(34, 34), 60)
//!     .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 2))
//!     .draw(&mut display);
//!
//! // Update physical display
//! let _ = display.render();
//! ```

use core::convert::Infallible;
use embedded_graphics_core::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
    pixelcolor::BinaryColor,
    prelude::Pixel,
};

use crate::display::Display;
use crate::interface::DisplayInterface;

impl<I, B> DrawTarget for Display<I, B>
where
    I: DisplayInterface,
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<Iter>(&mut self, pixels: Iter) -> Result<(), Self::Error>
    where
        Iter: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(Point { x, y }, color) in pixels {
            self.set_pixel(x, y, color.is_on());
        }
        Ok(())
    }
}

impl<I, B> OriginDimensions for Display<I, B>
where
    I: DisplayInterface,
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    fn size(&self) -> Size {
        let dims = self.dimensions();
        Size::new(u32::from(dims.width), u32::from(dims.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::config::{Builder, Dimensions, Rotation};
    use alloc::vec;
    use alloc::vec::Vec;

    #[derive(Debug, Default)]
    struct MockInterface {
        transfers: usize,
    }

    impl DisplayInterface for MockInterface {
        type Error = Infallible;

        fn send_command(&mut self, _command: Command) -> Result<(), Self::Error> {
            self.transfers += 1;
            Ok(())
        }

        fn send_data(&mut self, _data: &[u8]) -> Result<(), Self::Error> {
            self.transfers += 1;
            Ok(())
        }
    }

    fn test_display(rotation: Rotation) -> Display<MockInterface, Vec<u8>> {
        let config = Builder::new()
            .dimensions(Dimensions::new(128, 64).unwrap())
            .rotation(rotation)
            .build()
            .unwrap();
        Display::new(MockInterface::default(), config, vec![0u8; 1024]).unwrap()
    }

    #[test]
    fn test_size_is_native_for_every_rotation() {
        for index in 0..4 {
            let display = test_display(Rotation::from_index(index));
            assert_eq!(display.size(), Size::new(128, 64));
        }
    }

    #[test]
    fn test_draw_iter_sets_and_clears() {
        let mut display = test_display(Rotation::Rotate0);
        display
            .draw_iter([
                Pixel(Point::new(1, 2), BinaryColor::On),
                Pixel(Point::new(127, 63), BinaryColor::On),
            ])
            .unwrap();
        assert_eq!(display.get_pixel(1, 2), Some(true));
        assert_eq!(display.get_pixel(127, 63), Some(true));

        display
            .draw_iter([Pixel(Point::new(1, 2), BinaryColor::Off)])
            .unwrap();
        assert_eq!(display.get_pixel(1, 2), Some(false));
    }

    #[test]
    fn test_draw_iter_clips_off_screen() {
        let mut display = test_display(Rotation::Rotate0);
        display
            .draw_iter([
                Pixel(Point::new(-1, 0), BinaryColor::On),
                Pixel(Point::new(128, 0), BinaryColor::On),
                Pixel(Point::new(0, 64), BinaryColor::On),
            ])
            .unwrap();
        assert!(display.framebuffer().as_bytes().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_drawing_does_not_touch_bus() {
        let mut display = test_display(Rotation::Rotate0);
        let before = display.interface().transfers;
        DrawTarget::clear(&mut display, BinaryColor::On).unwrap();
        assert_eq!(display.interface().transfers, before);
        assert!(display.framebuffer().as_bytes().iter().all(|b| *b == 0xFF));
    }
}
