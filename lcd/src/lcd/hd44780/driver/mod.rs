mod pcf8574;

use crate::{LcdError, LcdResult};
pub use pcf8574::*;
use std::fmt::Debug;

/// Low-level interface to an HD44780 controller.
///
/// Every instruction is composed here from a command family and its flag record, so the bytes that
/// end up on the wire can be checked without any hardware. Implementations only provide the raw
/// transfers and a way to wait.
pub trait HD44780Driver: Debug {
    /// Brings the controller from an unknown power-on state into 4-bit interface mode.
    ///
    /// This only performs the synchronization sequence. Function set, display control and entry
    /// mode are left to the caller.
    fn init(&mut self) -> LcdResult<()>;

    /// Clears the display and sets the cursor to the home position.
    ///
    /// Command: `00000001`. Takes up to 1.52 ms, so it waits 2 ms afterwards.
    fn clear_display(&mut self) -> LcdResult<()> {
        self.send_command(0b00000001)?;
        self.delay_us(2000);
        Ok(())
    }

    /// Sets the cursor to the home position and undoes any display shift.
    ///
    /// Command: `0000001?`. Waits 2 ms afterwards, like [Self::clear_display].
    fn return_home(&mut self) -> LcdResult<()> {
        self.send_command(0b00000010)?;
        self.delay_us(2000);
        Ok(())
    }

    /// Sets the entry mode.
    ///
    /// Command: `000001IS`.
    fn set_entry_mode(&mut self, mode: EntryMode) -> LcdResult<()> {
        self.send_command(mode.to_command())
    }

    /// Sets the display on/off, cursor on/off, and blinking on/off.
    ///
    /// Command: `00001DCB`.
    fn set_display_control(&mut self, control: DisplayControl) -> LcdResult<()> {
        self.send_command(control.to_command())
    }

    /// Moves the cursor or shifts the display without touching DDRAM.
    ///
    /// Command: `0001DR??`.
    /// `D` is `1` for display shift, `0` for cursor move.
    /// `R` is `1` for right, `0` for left.
    fn cursor_shift(&mut self, display_shift: bool, direction: CursorDirection) -> LcdResult<()> {
        let mut command = 0b00010000;
        if display_shift {
            command |= 0b00001000;
        }
        if direction == CursorDirection::Right {
            command |= 0b00000100;
        }
        self.send_command(command)
    }

    /// Sets interface width, line count and font.
    ///
    /// Command: `001DNF??`.
    fn function_set(&mut self, function: FunctionSet) -> LcdResult<()> {
        self.send_command(function.to_command())
    }

    /// Sets the CGRAM address. Subsequent data goes to the custom character memory.
    ///
    /// The address is a 6-bit value. If out of bounds, it will return [LcdError::InvalidArgument].
    fn set_cgram_address(&mut self, address: u8) -> LcdResult<()> {
        if address > 0b00111111 {
            return Err(LcdError::InvalidArgument);
        }
        let command = 0b01000000 | address;
        self.send_command(command)
    }

    /// Sets the DDRAM address, which is the cursor position.
    ///
    /// The address is a 7-bit value. If out of bounds, it will return [LcdError::InvalidArgument].
    fn set_ddram_address(&mut self, address: u8) -> LcdResult<()> {
        if address > 0b01111111 {
            return Err(LcdError::InvalidArgument);
        }
        let command = 0b10000000 | address;
        self.send_command(command)
    }

    // Low-level commands
    // Implemented by the transport, used by the instructions above.

    /// Sends a command to the HD44780 controller, with RS low.
    fn send_command(&mut self, command: u8) -> LcdResult<()>;

    /// Sends data to the HD44780 controller, with RS high.
    fn send_data(&mut self, data: u8) -> LcdResult<()>;

    /// Blocks for at least `micros` microseconds.
    fn delay_us(&mut self, micros: u32);
}

#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub enum CursorDirection {
    /// Moves the cursor to the left after writing data.
    Left,
    /// Moves the cursor to the right after writing data.
    #[default]
    Right,
}

/// Character cell height. 5x10 dots only exists on single-line panels.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub enum CharSize {
    #[default]
    Dots5x8,
    Dots5x10,
}

/// Flags of the function set instruction.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct FunctionSet {
    /// `D`: 8-bit interface. Always `false` behind an I2C expander.
    pub eight_bit: bool,
    /// `N`: two display lines.
    pub two_lines: bool,
    /// `F`: 5x10 dot font.
    pub large_font: bool,
}

impl FunctionSet {
    pub fn to_command(&self) -> u8 {
        let mut command = 0b00100000;
        if self.eight_bit {
            command |= 0b00010000;
        }
        if self.two_lines {
            command |= 0b00001000;
        }
        if self.large_font {
            command |= 0b00000100;
        }
        command
    }
}

/// Flags of the display control instruction.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct DisplayControl {
    pub display_on: bool,
    pub cursor_on: bool,
    pub blink_on: bool,
}

impl DisplayControl {
    pub fn to_command(&self) -> u8 {
        let mut command = 0b00001000;
        if self.display_on {
            command |= 0b00000100;
        }
        if self.cursor_on {
            command |= 0b00000010;
        }
        if self.blink_on {
            command |= 0b00000001;
        }
        command
    }
}

/// Flags of the entry mode instruction.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct EntryMode {
    /// `I/D`: where the cursor goes after each character.
    pub direction: CursorDirection,
    /// `S`: shift the whole display instead, keeping the cursor in place on screen.
    pub shift: bool,
}

impl EntryMode {
    pub fn to_command(&self) -> u8 {
        let mut command = 0b00000100;
        if self.direction == CursorDirection::Right {
            command |= 0b00000010;
        }
        if self.shift {
            command |= 0b00000001;
        }
        command
    }
}
