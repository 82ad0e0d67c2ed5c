//! Hardware interface abstraction
//!
//! This module provides the [`DisplayInterface`] trait and the [`I2cInterface`]
//! struct for communicating with the SH1107 controller over I2C.
//!
//! ## Wire Format
//!
//! Each call produces exactly one I2C write transaction:
//!
//! - commands: `[0x00, cmd, args...]`
//! - data: `[0x40, byte, byte, ...]`
//!
//! Payloads are never split across transactions. Controllers that latch per
//! transaction would otherwise show half-written pages.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sh1107::command::{self, Command};
//! use sh1107::{DisplayInterface, I2cInterface};
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
//! let mut interface = I2cInterface::new(MockI2c, sh1107::DEFAULT_ADDRESS);
//!
//! // Send command
//! let _ = interface.send_command(Command::single(command::DISPLAY_ON));
//!
//! // Send data
//! let _ = interface.send_data(&[0xFF, 0x00, 0xFF]);
//! ```

use core::fmt::Debug;
use embedded_hal::i2c::I2c;

use crate::command::{CONTROL_COMMAND, CONTROL_DATA, Command};

type InterfaceResult<T, E> = core::result::Result<T, E>;

/// Default 7-bit I2C address of SH1107 modules (SA0 low)
pub const DEFAULT_ADDRESS: u8 = 0x3C;

/// Largest data payload a single transaction may carry (one full page row)
pub const MAX_DATA_LEN: usize = 128;

/// Trait for the transport between driver and SH1107 controller
///
/// This trait abstracts over different bus implementations, allowing the
/// [`Display`](crate::display::Display) to work with any transport that can
/// deliver a command burst or a data burst atomically.
///
/// ## Implementing
///
/// For most cases, use the provided [`I2cInterface`]. Test doubles and
/// alternative transports implement this trait directly.
pub trait DisplayInterface {
    /// Error type for interface operations
    ///
    /// Must implement [`Debug`] for error reporting.
    type Error: Debug;

    /// Send one command (opcode plus arguments) to the controller
    ///
    /// The implementation must transmit the whole command in one bus
    /// transaction on the command channel.
    fn send_command(&mut self, command: Command) -> InterfaceResult<(), Self::Error>;

    /// Send display RAM bytes to the controller
    ///
    /// The implementation must transmit `data` in one bus transaction on the
    /// data channel.
    fn send_data(&mut self, data: &[u8]) -> InterfaceResult<(), Self::Error>;
}

/// Errors that can occur at the interface level
///
/// Generic over the I2C bus error type.
#[derive(Debug)]
pub enum InterfaceError<I2cErr> {
    /// I2C communication error
    I2c(I2cErr),
    /// Data payload does not fit in one transaction
    DataTooLong {
        /// Length of the rejected payload
        len: usize,
        /// Maximum payload length
        max: usize,
    },
}

impl<I2cErr: Debug> core::fmt::Display for InterfaceError<I2cErr> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::I2c(e) => write!(f, "I2C error: {e:?}"),
            Self::DataTooLong { len, max } => {
                write!(f, "Data payload too long: {len} bytes (max {max})")
            }
        }
    }
}

impl<I2cErr: Debug> core::error::Error for InterfaceError<I2cErr> {}

/// I2C interface implementation for SH1107
///
/// Implements [`DisplayInterface`] for an embedded-hal v1.0 [`I2c`] bus.
/// The control byte and payload are staged in an internal scratch buffer and
/// written with a single [`I2c::write`] call.
///
/// ## Type Parameters
///
/// * `I2C` - I2C bus implementing [`I2c`]
pub struct I2cInterface<I2C> {
    /// I2C bus
    i2c: I2C,
    /// 7-bit device address
    address: u8,
    /// Control byte + payload staging area
    scratch: [u8; MAX_DATA_LEN + 1],
}

impl<I2C> I2cInterface<I2C>
where
    I2C: I2c,
{
    /// Create a new interface for the device at `address`
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            scratch: [0; MAX_DATA_LEN + 1],
        }
    }

    /// Get the 7-bit device address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Release the underlying I2C bus
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn write_prefixed(
        &mut self,
        control: u8,
        payload: &[u8],
    ) -> InterfaceResult<(), InterfaceError<I2C::Error>> {
        if payload.len() > MAX_DATA_LEN {
            return Err(InterfaceError::DataTooLong {
                len: payload.len(),
                max: MAX_DATA_LEN,
            });
        }
        let end = payload.len() + 1;
        self.scratch[0] = control;
        self.scratch[1..end].copy_from_slice(payload);
        self.i2c
            .write(self.address, &self.scratch[..end])
            .map_err(InterfaceError::I2c)
    }
}

impl<I2C> Debug for I2cInterface<I2C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("I2cInterface")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl<I2C> DisplayInterface for I2cInterface<I2C>
where
    I2C: I2c,
{
    type Error = InterfaceError<I2C::Error>;

    fn send_command(&mut self, command: Command) -> InterfaceResult<(), Self::Error> {
        self.write_prefixed(CONTROL_COMMAND, command.as_bytes())
    }

    fn send_data(&mut self, data: &[u8]) -> InterfaceResult<(), Self::Error> {
        self.write_prefixed(CONTROL_DATA, data)
    }
}
