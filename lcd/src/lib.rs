pub mod bus;
pub mod delay;
pub mod lcd;

#[cfg(test)]
mod testing;

use thiserror::Error;

pub use bus::{HalI2cBus, I2cBus, LinuxI2cBus};
pub use delay::StdDelay;
pub use lcd::hd44780::{CharSize, LcdDriver, LcdState};

#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum LcdError {
    #[error("the display has not been initialized")]
    NotInitialized,
    #[error("invalid argument")]
    InvalidArgument,
    #[error("row {row} is out of range for a display with {rows} rows")]
    RowOutOfRange { row: u8, rows: u8 },
    #[error("no acknowledge from device at {address:#04x}")]
    NoAcknowledge { address: u8 },
    #[error("bus error: {0}")]
    Bus(String),
}

pub type LcdResult<T> = Result<T, LcdError>;
