//! SH1107 OLED Display Driver
//!
//! A driver for the SH1107 monochrome OLED controller on I2C, supporting
//! panels up to 128x128 pixels.
//!
//! ## Features
//!
//! - `no_std` compatible core
//! - `embedded-hal` v1.0 support
//! - `embedded-graphics` integration (with `graphics` feature)
//! - Configurable display dimensions
//! - Brightness and rotation control
//! - Paced BMP animation player (with `std` feature)
//! - `/dev/i2c-N` opener (with `linux` feature)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core::convert::Infallible;
//! use embedded_hal::i2c::{ErrorType, I2c, Operation, SevenBitAddress};
//! use sh1107::{Builder, Dimensions, Display, Fill, I2cInterface, Rotation};
//!
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
//! # let i2c = MockI2c;
//! let dims = match Dimensions::new(128, 128) {
//!     Ok(dims) => dims,
//!     Err(_) => return,
//! };
//! let config = match Builder::new().dimensions(dims).rotation(Rotation::Rotate180).build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//!
//! let interface = I2cInterface::new(i2c, config.address);
//! let mut display = match Display::new(interface, config, [0u8; 2048]) {
//!     Ok(display) => display,
//!     Err(_) => return,
//! };
//! let _ = display.set_brightness(0.5);
//! let _ = display.clear(Fill::AllOn);
//! ```

#![no_std]

#[cfg(any(test, feature = "alloc"))]
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

/// Pixel values and grayscale threshold
pub mod color;
/// SH1107 command definitions
pub mod command;
/// Display configuration types and builder
pub mod config;
/// Core display operations
pub mod display;
/// Error types for the driver
pub mod error;
/// Page-organized framebuffer
pub mod framebuffer;
/// Image sources for blitting
pub mod image;
/// Hardware interface abstraction
pub mod interface;
/// Rotation command table
pub mod rotation;

/// Graphics support via embedded-graphics (requires `graphics` feature)
#[cfg(feature = "graphics")]
pub mod graphics;

/// Animation player (requires `std` feature)
#[cfg(feature = "std")]
pub mod animation;

/// Linux I2C device support (requires `linux` feature)
#[cfg(feature = "linux")]
pub mod linux;

pub use color::Fill;
pub use config::{Builder, Config, Dimensions, MAX_COLUMNS, MAX_ROWS, Rotation};
pub use display::Display;
pub use error::{BufferTooSmall, BuilderError, Error};
pub use framebuffer::Framebuffer;
pub use image::Image;
pub use interface::InterfaceError;
pub use interface::{DEFAULT_ADDRESS, DisplayInterface, I2cInterface};

#[cfg(feature = "alloc")]
pub use image::GrayFrame;

#[cfg(feature = "std")]
pub use animation::{
    BmpDecoder, DecodeError, FrameDecoder, PlaybackReport, PlaybackState, Player, PlayerConfig,
};

#[cfg(feature = "linux")]
pub use linux::{LinuxDisplay, OpenError};
