//! I2C bus access for the port expander.
//!
//! The display only ever needs to push single bytes to the expander, so the [I2cBus] trait is
//! reduced to exactly that. [LinuxI2cBus] talks to `/dev/i2c-N` directly, and [HalI2cBus] adapts
//! any [embedded_hal::i2c::I2c] implementation.

mod hal;
mod linux;

use crate::LcdResult;
pub use hal::*;
pub use linux::*;
use std::fmt::Debug;

pub trait I2cBus: Debug {
    /// Writes a single byte to the device at the given 7-bit address.
    ///
    /// Each call is one complete transaction (start, address, data, stop). An unacknowledged
    /// transfer must be reported as an error, never ignored.
    fn write_byte(&mut self, address: u8, byte: u8) -> LcdResult<()>;
}

impl<T: I2cBus + ?Sized> I2cBus for &mut T {
    fn write_byte(&mut self, address: u8, byte: u8) -> LcdResult<()> {
        (**self).write_byte(address, byte)
    }
}

impl<T: I2cBus + ?Sized> I2cBus for Box<T> {
    fn write_byte(&mut self, address: u8, byte: u8) -> LcdResult<()> {
        (**self).write_byte(address, byte)
    }
}
