//! Opening a display on a Linux I2C character device
//!
//! ```rust,no_run
//! use sh1107::{Builder, Dimensions, Display};
//!
//! let dims = match Dimensions::new(128, 128) {
//!     Ok(dims) => dims,
//!     Err(_) => return,
//! };
//! let config = match Builder::new().dimensions(dims).build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//! match Display::open(1, config) {
//!     Ok(mut display) => {
//!         let _ = display.test_pattern();
//!     }
//!     Err(e) => log::error!("{e}"),
//! }
//! ```

use std::fmt;
use std::string::String;
use std::vec::Vec;

use linux_embedded_hal::I2cdev;
use linux_embedded_hal::i2cdev::linux::LinuxI2CError;
use log::info;

use crate::config::Config;
use crate::display::Display;
use crate::error::Error;
use crate::interface::I2cInterface;

/// Interface type of a display opened with [`Display::open`]
pub type LinuxInterface = I2cInterface<I2cdev>;

/// Display opened on `/dev/i2c-N` with a heap framebuffer
pub type LinuxDisplay = Display<LinuxInterface, Vec<u8>>;

/// Errors from [`Display::open`]
#[derive(Debug)]
pub enum OpenError {
    /// The bus device could not be opened
    Bus {
        /// Device path that was tried
        path: String,
        /// Underlying error
        source: LinuxI2CError,
    },
    /// The bus opened but controller bring-up failed
    Init(Error<LinuxInterface>),
}

impl fmt::Display for OpenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus { path, source } => write!(f, "Cannot open {path}: {source}"),
            Self::Init(e) => write!(f, "Display init failed: {e}"),
        }
    }
}

impl std::error::Error for OpenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bus { source, .. } => Some(source),
            Self::Init(e) => Some(e),
        }
    }
}

impl From<Error<LinuxInterface>> for OpenError {
    fn from(err: Error<LinuxInterface>) -> Self {
        Self::Init(err)
    }
}

/// Device path of I2C bus `bus`
pub fn bus_path(bus: u8) -> String {
    std::format!("/dev/i2c-{bus}")
}

impl Display<LinuxInterface, Vec<u8>> {
    /// Open `/dev/i2c-<bus>`, then bring up the controller at `config.address`
    ///
    /// The framebuffer is allocated to fit `config.dimensions`. On failure
    /// the device is closed before returning.
    pub fn open(bus: u8, config: Config) -> Result<LinuxDisplay, OpenError> {
        let path = bus_path(bus);
        info!("sh1107: opening {} at {:#04x}", path, config.address);
        let i2c = I2cdev::new(&path).map_err(|source| OpenError::Bus {
            path: path.clone(),
            source,
        })?;
        let interface = I2cInterface::new(i2c, config.address);
        let buffer = std::vec![0u8; config.dimensions.buffer_size()];
        Ok(Display::new(interface, config, buffer)?)
    }
}
