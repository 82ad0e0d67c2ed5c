//! Display configuration types and builder

use crate::command::MAX_CONTRAST;
pub use crate::error::BuilderError;
use crate::interface::DEFAULT_ADDRESS;

/// Maximum number of columns (segment outputs) driven by the SH1107
pub const MAX_COLUMNS: u16 = 128;

/// Maximum number of rows (common outputs) driven by the SH1107
pub const MAX_ROWS: u16 = 128;

/// Number of pixel rows packed into one page byte
pub const PAGE_HEIGHT: u16 = 8;

/// Display dimensions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dimensions {
    /// Width in pixels (columns)
    pub width: u16,
    /// Height in pixels (rows), always a multiple of 8
    pub height: u16,
}

impl Dimensions {
    /// Create new dimensions with validation
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::InvalidDimensions` if:
    /// - width == 0 or width > MAX_COLUMNS
    /// - height == 0 or height > MAX_ROWS
    /// - height % 8 != 0 (rows are addressed in 8-pixel pages)
    pub fn new(width: u16, height: u16) -> Result<Self, BuilderError> {
        if width == 0 || width > MAX_COLUMNS {
            return Err(BuilderError::InvalidDimensions { width, height });
        }
        if height == 0 || height > MAX_ROWS || height % PAGE_HEIGHT != 0 {
            return Err(BuilderError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    /// Number of 8-row pages
    pub fn pages(&self) -> u16 {
        self.height / PAGE_HEIGHT
    }

    /// Calculate required buffer size in bytes
    pub fn buffer_size(&self) -> usize {
        (self.width as usize * self.height as usize) / 8
    }
}

/// Display rotation relative to native orientation
///
/// Rotation only changes the controller's segment remap and COM scan
/// direction. The framebuffer keeps its native width/height, so
/// [`Rotate90`](Rotation::Rotate90) and [`Rotate270`](Rotation::Rotate270)
/// mirror the image instead of turning it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Rotation {
    /// No rotation
    #[default]
    Rotate0,
    /// Rotate 90 degrees clockwise
    Rotate90,
    /// Rotate 180 degrees
    Rotate180,
    /// Rotate 270 degrees clockwise
    Rotate270,
}

impl Rotation {
    /// Rotation from a quarter-turn index, taken modulo 4
    pub fn from_index(index: u8) -> Self {
        match index % 4 {
            0 => Self::Rotate0,
            1 => Self::Rotate90,
            2 => Self::Rotate180,
            _ => Self::Rotate270,
        }
    }

    /// Rotation from degrees, rounded down to a quarter turn, modulo 360
    pub fn from_degrees(degrees: u16) -> Self {
        Self::from_index(((degrees / 90) % 4) as u8)
    }

    /// Quarter-turn index, 0..=3
    pub fn index(self) -> u8 {
        match self {
            Self::Rotate0 => 0,
            Self::Rotate90 => 1,
            Self::Rotate180 => 2,
            Self::Rotate270 => 3,
        }
    }

    /// Rotation in degrees
    pub fn degrees(self) -> u16 {
        u16::from(self.index()) * 90
    }
}

/// Display configuration
///
/// This struct holds all configurable parameters for the SH1107 controller.
/// Use `Builder` to create a Config. Register defaults match common 128x128
/// SH1107 modules.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Display dimensions
    pub dimensions: Dimensions,
    /// Display rotation
    pub rotation: Rotation,
    /// 7-bit I2C address
    pub address: u8,
    /// Contrast register value written during bring-up
    pub contrast: u8,
    /// Display offset (vertical COM shift)
    pub display_offset: u8,
    /// Clock divide ratio / oscillator frequency byte
    pub clock_divide: u8,
    /// Discharge / precharge period byte
    pub precharge: u8,
    /// VCOMH deselect level
    pub vcomh: u8,
    /// DC-DC (charge pump) control byte
    pub dc_dc: u8,
    /// Brightness applied after bring-up (`None` keeps `contrast`)
    pub brightness: Option<f32>,
}

impl Config {
    /// Multiplex ratio register value (active rows minus one)
    pub fn multiplex_ratio(&self) -> u8 {
        (self.dimensions.height - 1) as u8
    }
}

/// Builder for constructing display configuration
///
/// # Example
///
/// ```
/// use sh1107::{Builder, Dimensions, Rotation};
///
/// let dims = match Dimensions::new(128, 128) {
///     Ok(dims) => dims,
///     Err(_) => return,
/// };
/// let config = match Builder::new().dimensions(dims).rotation(Rotation::Rotate180).build() {
///     Ok(config) => config,
///     Err(_) => return,
/// };
/// assert_eq!(config.address, 0x3C);
/// assert_eq!(config.multiplex_ratio(), 0x7F);
/// ```
#[must_use]
pub struct Builder {
    /// Display dimensions (required)
    dimensions: Option<Dimensions>,
    /// Display rotation
    rotation: Rotation,
    /// 7-bit I2C address
    address: u8,
    /// Contrast register value written during bring-up
    contrast: u8,
    /// Display offset
    display_offset: u8,
    /// Clock divide ratio / oscillator frequency byte
    clock_divide: u8,
    /// Discharge / precharge period byte
    precharge: u8,
    /// VCOMH deselect level
    vcomh: u8,
    /// DC-DC control byte
    dc_dc: u8,
    /// Brightness applied after bring-up
    brightness: Option<f32>,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            dimensions: None,
            rotation: Rotation::Rotate0,
            address: DEFAULT_ADDRESS,
            contrast: MAX_CONTRAST,
            display_offset: 0x00,
            // Oscillator +15%, divide ratio 1
            clock_divide: 0x41,
            // 2 DCLK discharge, 2 DCLK precharge
            precharge: 0x22,
            vcomh: 0x35,
            // Built-in DC-DC on
            dc_dc: 0x8A,
            brightness: None,
        }
    }
}

impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set display dimensions (required)
    pub fn dimensions(mut self, dims: Dimensions) -> Self {
        self.dimensions = Some(dims);
        self
    }

    /// Set display rotation
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the 7-bit I2C address
    pub fn address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Set the contrast written during bring-up
    pub fn contrast(mut self, value: u8) -> Self {
        self.contrast = value;
        self
    }

    /// Set the display offset
    pub fn display_offset(mut self, value: u8) -> Self {
        self.display_offset = value;
        self
    }

    /// Set clock divide ratio / oscillator frequency
    pub fn clock_divide(mut self, value: u8) -> Self {
        self.clock_divide = value;
        self
    }

    /// Set discharge / precharge period
    pub fn precharge(mut self, value: u8) -> Self {
        self.precharge = value;
        self
    }

    /// Set VCOMH deselect level
    pub fn vcomh(mut self, value: u8) -> Self {
        self.vcomh = value;
        self
    }

    /// Set DC-DC control byte
    pub fn dc_dc(mut self, value: u8) -> Self {
        self.dc_dc = value;
        self
    }

    /// Set a brightness level (0.0..=1.0) to apply right after bring-up
    pub fn brightness(mut self, level: f32) -> Self {
        self.brightness = Some(level);
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::MissingDimensions` if dimensions were not set
    pub fn build(self) -> Result<Config, BuilderError> {
        Ok(Config {
            dimensions: self.dimensions.ok_or(BuilderError::MissingDimensions)?,
            rotation: self.rotation,
            address: self.address,
            contrast: self.contrast,
            display_offset: self.display_offset,
            clock_divide: self.clock_divide,
            precharge: self.precharge,
            vcomh: self.vcomh,
            dc_dc: self.dc_dc,
            brightness: self.brightness,
        })
    }
}
