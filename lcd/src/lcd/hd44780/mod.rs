//! HD44780 character LCD behind a PCF8574 I2C expander.
//!
//! [LcdDriver] is the display-level API: geometry, cursor, text, custom glyphs and backlight.
//! It sits on top of the instruction-level [driver::HD44780Driver] trait, implemented for the
//! expander by [driver::Pcf8574HD44780Driver].

pub mod driver;
mod display;

pub use display::*;
pub use driver::CharSize;
