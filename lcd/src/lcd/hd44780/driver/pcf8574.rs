use crate::bus::I2cBus;
use crate::lcd::hd44780::driver::HD44780Driver;
use crate::{LcdError, LcdResult};
use embedded_hal::delay::DelayNs;
use log::{debug, trace};
use std::fmt::{Debug, Formatter};

// Expander port layout: D7 D6 D5 D4 BL E RW RS
const PIN_RS: u8 = 0b00000001;
const PIN_RW: u8 = 0b00000010;
const PIN_E: u8 = 0b00000100;
const PIN_BACKLIGHT: u8 = 0b00001000;

/// HD44780 driver talking through a PCF8574 I2C port expander, as found on the common
/// "I2C backpack" boards.
///
/// The expander has a single 8-bit output port carrying the upper data nibble, the control lines
/// and the backlight transistor. Every port update is one I2C transaction, and the backlight bit
/// is OR'd into each of them so command traffic never flickers it. R/W is always driven low; these
/// boards cannot read from the controller.
///
/// One byte to the controller takes four transactions: high nibble with E high, high nibble with
/// E low, then the same for the low nibble. The controller latches on the falling edge of E.
pub struct Pcf8574HD44780Driver<B, D> {
    bus: B,
    delay: D,
    address: u8,
    backlight: bool,
}

impl<B: I2cBus, D: DelayNs> Pcf8574HD44780Driver<B, D> {
    /// Creates a driver for the expander at `address`. No I/O happens until the first command.
    ///
    /// The backlight starts on.
    pub fn new(bus: B, delay: D, address: u8) -> Self {
        Pcf8574HD44780Driver {
            bus,
            delay,
            address,
            backlight: true,
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Gets the last commanded backlight state. There is no way to read it back.
    pub fn backlight(&self) -> bool {
        self.backlight
    }

    /// Switches the backlight, leaving data and control lines low.
    pub fn set_backlight(&mut self, on: bool) -> LcdResult<()> {
        self.backlight = on;
        self.expander_write(0)
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn delay(&self) -> &D {
        &self.delay
    }

    /// Gives back the bus and the delay provider.
    pub fn release(self) -> (B, D) {
        (self.bus, self.delay)
    }

    /// Writes a single nibble, pulsing E once.
    ///
    /// Only used directly while the controller is still in 8-bit mode during [Self::init], where
    /// one nibble is a whole instruction as far as the controller is concerned.
    pub fn write_nibble(&mut self, nibble: u8, rs: bool) -> LcdResult<()> {
        if nibble > 0b1111 {
            return Err(LcdError::InvalidArgument);
        }
        trace!("Writing nibble: {:04b}, RS: {}", nibble, rs);
        let mode = if rs { PIN_RS } else { 0 };
        self.write4bits((nibble << 4) | mode)
    }

    fn expander_write(&mut self, data: u8) -> LcdResult<()> {
        let byte = if self.backlight {
            data | PIN_BACKLIGHT
        } else {
            data & !PIN_BACKLIGHT
        };
        trace!("Expander write: {:08b}", byte);
        self.bus.write_byte(self.address, byte)
    }

    fn pulse_e(&mut self, data: u8) -> LcdResult<()> {
        // Enable pulse must be wider than 450 ns
        self.expander_write(data | PIN_E)?;
        self.delay.delay_us(1);
        // Commands need more than 37 us to settle
        self.expander_write(data & !PIN_E)?;
        self.delay.delay_us(50);
        Ok(())
    }

    fn write4bits(&mut self, value: u8) -> LcdResult<()> {
        self.pulse_e(value & !PIN_RW)
    }

    fn send(&mut self, data: u8, rs: bool) -> LcdResult<()> {
        trace!("Sending data: {:08b}, RS: {}", data, rs);

        let mode = if rs { PIN_RS } else { 0 };
        let high_nibble = data & 0xF0;
        let low_nibble = (data << 4) & 0xF0;
        self.write4bits(high_nibble | mode)?;
        self.write4bits(low_nibble | mode)?;

        Ok(())
    }
}

impl<B: I2cBus, D> Debug for Pcf8574HD44780Driver<B, D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pcf8574HD44780Driver")
            .field("bus", &self.bus)
            .field("address", &format_args!("{:#04x}", self.address))
            .field("backlight", &self.backlight)
            .finish()
    }
}

impl<B: I2cBus, D: DelayNs> HD44780Driver for Pcf8574HD44780Driver<B, D> {
    /// Runs the power-on synchronization from the HD44780 datasheet (figure 24).
    ///
    /// The controller may come up in 8-bit mode or halfway through a 4-bit transfer, so `0011`
    /// is sent three times to force a known 8-bit state, followed by `0010` to switch to 4-bit
    /// mode. None of these delays may be shortened; some panels stay uninitialized otherwise.
    fn init(&mut self) -> LcdResult<()> {
        debug!("Synchronizing HD44780 at {:#04x}", self.address);

        // At least 40 ms after Vcc rises above 2.7 V
        self.delay.delay_ms(50);

        // Reset the expander port, keeping only the backlight bit
        self.expander_write(0)?;
        self.delay.delay_ms(1000);

        // Synchronize
        self.write_nibble(0b0011, false)?;
        self.delay.delay_us(4500);
        self.write_nibble(0b0011, false)?;
        self.delay.delay_us(4500);
        self.write_nibble(0b0011, false)?;
        self.delay.delay_us(150);
        self.write_nibble(0b0010, false)?;

        Ok(())
    }

    fn send_command(&mut self, command: u8) -> LcdResult<()> {
        self.send(command, false)
    }

    fn send_data(&mut self, data: u8) -> LcdResult<()> {
        self.send(data, true)
    }

    fn delay_us(&mut self, micros: u32) {
        self.delay.delay_us(micros);
    }
}
