//! SH1107 command definitions
//!
//! This module defines the command bytes used to control the SH1107 OLED
//! controller and the [`Command`] payload type that carries them to the bus.
//!
//! ## Transaction Structure
//!
//! Every I2C transaction starts with a control byte that tells the controller
//! how to interpret the rest of the transaction:
//!
//! | Control byte | Meaning                                  |
//! |--------------|------------------------------------------|
//! | `0x00`       | all following bytes are commands          |
//! | `0x40`       | all following bytes are display RAM data  |
//!
//! A command and its arguments always travel in a single transaction.
//!
//! ## Example
//!
//! ```
//! use sh1107::command::{self, Command};
//!
//! let contrast = Command::with_arg(command::SET_CONTRAST, 0x40);
//! assert_eq!(contrast.as_bytes(), &[0x81, 0x40]);
//!
//! // Page 3, column 0
//! let page = Command::page_address(3);
//! assert_eq!(page.as_bytes(), &[0xB3, 0x00, 0x10]);
//! ```

// Control bytes

/// Control byte announcing a command stream (Co = 0, D/C# = 0)
pub const CONTROL_COMMAND: u8 = 0x00;

/// Control byte announcing a display RAM data stream (Co = 0, D/C# = 1)
pub const CONTROL_DATA: u8 = 0x40;

// Fundamental commands

/// Display off (sleep mode) command (0xAE)
pub const DISPLAY_OFF: u8 = 0xAE;

/// Display on command (0xAF)
pub const DISPLAY_ON: u8 = 0xAF;

/// Set contrast control command (0x81)
///
/// Requires 1 byte of data. The SH1107 accepts 0x00..=0xFF but this driver
/// maps brightness onto 0x00..=[`MAX_CONTRAST`].
pub const SET_CONTRAST: u8 = 0x81;

/// Highest contrast value produced by brightness scaling
pub const MAX_CONTRAST: u8 = 0x7F;

/// Resume display from RAM content (entire display on disabled) command (0xA4)
pub const ENTIRE_DISPLAY_ON_RESUME: u8 = 0xA4;

/// Normal (non-inverted) display command (0xA6)
pub const NORMAL_DISPLAY: u8 = 0xA6;

// Addressing commands

/// Set lower column address nibble (0x00..=0x0F)
pub const SET_LOWER_COLUMN: u8 = 0x00;

/// Set higher column address nibble (0x10..=0x17)
pub const SET_HIGHER_COLUMN: u8 = 0x10;

/// Page addressing mode command (0x20)
///
/// The column counter increments after each data byte and the page stays fixed.
pub const PAGE_ADDRESSING_MODE: u8 = 0x20;

/// Set page address command base (0xB0..=0xBF)
///
/// The page index is OR'd into the low nibble.
pub const SET_PAGE_ADDRESS: u8 = 0xB0;

/// Set display start line command (0xDC)
///
/// Requires 1 byte: start line 0..=127.
pub const SET_DISPLAY_START_LINE: u8 = 0xDC;

// Hardware configuration commands

/// Segment remap, column 0 mapped to SEG0 (0xA0)
pub const SEGMENT_REMAP_NORMAL: u8 = 0xA0;

/// Segment remap, column 127 mapped to SEG0 (0xA1)
pub const SEGMENT_REMAP_REVERSE: u8 = 0xA1;

/// COM output scan direction, COM0 to COM[N-1] (0xC0)
pub const COM_SCAN_NORMAL: u8 = 0xC0;

/// COM output scan direction, COM[N-1] to COM0 (0xC8)
pub const COM_SCAN_REVERSE: u8 = 0xC8;

/// Set multiplex ratio command (0xA8)
///
/// Requires 1 byte: number of active rows minus one.
pub const SET_MULTIPLEX_RATIO: u8 = 0xA8;

/// Set display offset command (0xD3)
///
/// Requires 1 byte: vertical COM shift.
pub const SET_DISPLAY_OFFSET: u8 = 0xD3;

// Timing and driving scheme commands

/// Set display clock divide ratio / oscillator frequency command (0xD5)
///
/// Requires 1 byte: high nibble oscillator frequency, low nibble divide ratio.
pub const SET_CLOCK_DIVIDE: u8 = 0xD5;

/// Set discharge / precharge period command (0xD9)
///
/// Requires 1 byte: high nibble discharge, low nibble precharge (in DCLKs).
pub const SET_PRECHARGE: u8 = 0xD9;

/// Set VCOMH deselect level command (0xDB)
///
/// Requires 1 byte.
pub const SET_VCOMH: u8 = 0xDB;

/// DC-DC (charge pump) control command (0xAD)
///
/// Requires 1 byte: `0x8A` enables the built-in converter.
pub const SET_DC_DC: u8 = 0xAD;

/// A single controller command together with its argument bytes
///
/// Commands are at most three bytes long and are stored inline, so building
/// one never allocates. The control byte is not part of the payload; the
/// [`DisplayInterface`](crate::interface::DisplayInterface) adds it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Command {
    bytes: [u8; Command::MAX_LEN],
    len: u8,
}

impl Command {
    /// Longest command burst, in bytes
    pub const MAX_LEN: usize = 3;

    /// A command without arguments
    pub const fn single(opcode: u8) -> Self {
        Self {
            bytes: [opcode, 0, 0],
            len: 1,
        }
    }

    /// A command followed by one argument byte
    pub const fn with_arg(opcode: u8, arg: u8) -> Self {
        Self {
            bytes: [opcode, arg, 0],
            len: 2,
        }
    }

    /// Two argument-less commands sent back to back in one transaction
    pub const fn pair(first: u8, second: u8) -> Self {
        Self {
            bytes: [first, second, 0],
            len: 2,
        }
    }

    /// Set the column address counter (lower nibble, higher nibble)
    pub const fn column_address(column: u8) -> Self {
        Self::pair(
            SET_LOWER_COLUMN | (column & 0x0F),
            SET_HIGHER_COLUMN | ((column >> 4) & 0x07),
        )
    }

    /// Select `page` and rewind the column counter to 0
    ///
    /// This is the burst issued before every page of a render.
    pub const fn page_address(page: u8) -> Self {
        Self {
            bytes: [
                SET_PAGE_ADDRESS | (page & 0x0F),
                SET_LOWER_COLUMN,
                SET_HIGHER_COLUMN,
            ],
            len: 3,
        }
    }

    /// The command bytes, without the control byte
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// Number of bytes in the command
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Always false; every command carries at least an opcode
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
