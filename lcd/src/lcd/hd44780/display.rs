use crate::bus::I2cBus;
use crate::lcd::hd44780::driver::{
    CharSize, CursorDirection, DisplayControl, EntryMode, FunctionSet, HD44780Driver,
    Pcf8574HD44780Driver,
};
use crate::{LcdError, LcdResult};
use embedded_hal::delay::DelayNs;
use log::{debug, warn};
use std::fmt::{Debug, Formatter};

/// DDRAM address of the first column of each row.
///
/// Rows 2 and 3 of a 4-line panel continue rows 0 and 1 in memory, hence the odd order.
const ROW_OFFSETS: [u8; 4] = [0x00, 0x40, 0x14, 0x54];

/// The flag registers last sent to the controller.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LcdState {
    pub function: FunctionSet,
    pub control: DisplayControl,
    pub entry: EntryMode,
}

impl Default for LcdState {
    /// 4-bit bus, one line, 5x8 font, display on without cursor, left-to-right, no autoscroll.
    fn default() -> Self {
        LcdState {
            function: FunctionSet::default(),
            control: DisplayControl {
                display_on: true,
                cursor_on: false,
                blink_on: false,
            },
            entry: EntryMode {
                direction: CursorDirection::Right,
                shift: false,
            },
        }
    }
}

/// Character LCD behind a PCF8574 I2C backpack.
///
/// Keeps the display geometry and a copy of the controller's flag registers. Every flag change
/// is sent to the controller right away, so [Self::state] always matches what the controller
/// was last told.
///
/// [Self::init] has to run before anything that talks to the controller; until then those
/// operations return [LcdError::NotInitialized]. The backlight is the exception, as it only
/// involves the expander.
///
/// Text is written with [Self::print], [Self::write_byte], or through [std::fmt::Write]:
///
/// ```no_run
/// use std::fmt::Write;
/// use liquid_crystal_i2c::{LcdDriver, LinuxI2cBus, StdDelay};
///
/// let bus = LinuxI2cBus::open_bus(1, 0x27)?;
/// let mut lcd = LcdDriver::new(bus, StdDelay, 0x27, 16, 2);
/// lcd.init()?;
/// lcd.set_cursor(0, 1)?;
/// write!(lcd, "{} C", 21.5).ok();
/// # Ok::<(), liquid_crystal_i2c::LcdError>(())
/// ```
pub struct LcdDriver<B, D> {
    driver: Pcf8574HD44780Driver<B, D>,
    columns: u8,
    rows: u8,
    char_size: CharSize,
    state: LcdState,
    initialized: bool,
}

impl<B: I2cBus, D: DelayNs> LcdDriver<B, D> {
    /// Creates a driver for a `columns` x `rows` display behind the expander at `address`.
    ///
    /// Performs no I/O. The font defaults to 5x8 dots, see [Self::with_char_size].
    pub fn new(bus: B, delay: D, address: u8, columns: u8, rows: u8) -> Self {
        LcdDriver {
            driver: Pcf8574HD44780Driver::new(bus, delay, address),
            columns,
            rows,
            char_size: CharSize::default(),
            state: LcdState::default(),
            initialized: false,
        }
    }

    /// Selects the character size. 5x10 only takes effect on single-row displays, matching the
    /// controller's own restriction.
    pub fn with_char_size(mut self, char_size: CharSize) -> Self {
        self.char_size = char_size;
        self
    }

    pub fn address(&self) -> u8 {
        self.driver.address()
    }

    pub fn columns(&self) -> u8 {
        self.columns
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn char_size(&self) -> CharSize {
        self.char_size
    }

    pub fn state(&self) -> LcdState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Gets the underlying instruction-level driver.
    pub fn driver(&self) -> &Pcf8574HD44780Driver<B, D> {
        &self.driver
    }

    /// Gives back the bus and the delay provider.
    pub fn release(self) -> (B, D) {
        self.driver.release()
    }

    /// Initializes the controller. Must be called before anything else.
    ///
    /// Waits for power to settle, synchronizes the controller into 4-bit mode, then sends the
    /// function set, turns the display on, clears it, sets the entry mode and homes the cursor.
    /// Takes a little over a second, most of it mandated settle time.
    ///
    /// Running it again starts over from the default flags, so earlier cursor, blink and entry
    /// mode changes are dropped. If any step fails the display stays uninitialized.
    pub fn init(&mut self) -> LcdResult<()> {
        self.initialized = false;
        self.state = LcdState::default();

        if self.rows > 1 {
            self.state.function.two_lines = true;
        }
        if self.char_size == CharSize::Dots5x10 {
            if self.rows == 1 {
                self.state.function.large_font = true;
            } else {
                debug!("5x10 font is not available with {} rows, using 5x8", self.rows);
            }
        }

        debug!(
            "Initializing {}x{} LCD at {:#04x}",
            self.columns,
            self.rows,
            self.driver.address()
        );
        self.driver.init()?;

        self.driver.function_set(self.state.function)?;
        self.driver.set_display_control(self.state.control)?;
        self.driver.clear_display()?;
        self.driver.set_entry_mode(self.state.entry)?;
        self.driver.return_home()?;
        self.initialized = true;

        debug!("{:?} initialized.", self);
        Ok(())
    }

    /// Clears the display and moves the cursor to (0, 0).
    pub fn clear(&mut self) -> LcdResult<()> {
        self.ensure_initialized()?;
        self.driver.clear_display()
    }

    /// Moves the cursor to (0, 0) and undoes scrolling, keeping the content.
    pub fn home(&mut self) -> LcdResult<()> {
        self.ensure_initialized()?;
        self.driver.return_home()
    }

    /// Moves the cursor to `col` on `row`, both counted from 0.
    ///
    /// A row outside the display (`row >= rows`) is rejected with [LcdError::RowOutOfRange]
    /// rather than clamped. Columns are not checked against the geometry, so text can be placed
    /// in the off-screen part of a line; only a position past the end of DDRAM is rejected.
    pub fn set_cursor(&mut self, col: u8, row: u8) -> LcdResult<()> {
        self.ensure_initialized()?;
        if row >= self.rows || row as usize >= ROW_OFFSETS.len() {
            return Err(LcdError::RowOutOfRange {
                row,
                rows: self.rows,
            });
        }
        let address = col
            .checked_add(ROW_OFFSETS[row as usize])
            .ok_or(LcdError::InvalidArgument)?;
        self.driver.set_ddram_address(address)
    }

    /// Shows the characters again after [Self::no_display].
    pub fn display(&mut self) -> LcdResult<()> {
        self.update_control(|control| control.display_on = true)
    }

    /// Hides all characters. DDRAM and the backlight are left alone.
    pub fn no_display(&mut self) -> LcdResult<()> {
        self.update_control(|control| control.display_on = false)
    }

    /// Shows the underline cursor.
    pub fn cursor(&mut self) -> LcdResult<()> {
        self.update_control(|control| control.cursor_on = true)
    }

    pub fn no_cursor(&mut self) -> LcdResult<()> {
        self.update_control(|control| control.cursor_on = false)
    }

    /// Blinks the character block at the cursor position.
    pub fn blink(&mut self) -> LcdResult<()> {
        self.update_control(|control| control.blink_on = true)
    }

    pub fn no_blink(&mut self) -> LcdResult<()> {
        self.update_control(|control| control.blink_on = false)
    }

    /// Shifts the whole display one position to the left without changing DDRAM.
    pub fn scroll_display_left(&mut self) -> LcdResult<()> {
        self.ensure_initialized()?;
        self.driver.cursor_shift(true, CursorDirection::Left)
    }

    /// Shifts the whole display one position to the right without changing DDRAM.
    pub fn scroll_display_right(&mut self) -> LcdResult<()> {
        self.ensure_initialized()?;
        self.driver.cursor_shift(true, CursorDirection::Right)
    }

    /// Text flows from left to right. This is the default.
    pub fn left_to_right(&mut self) -> LcdResult<()> {
        self.update_entry(|entry| entry.direction = CursorDirection::Right)
    }

    /// Text flows from right to left.
    pub fn right_to_left(&mut self) -> LcdResult<()> {
        self.update_entry(|entry| entry.direction = CursorDirection::Left)
    }

    /// Shifts the display on every character instead of moving the cursor, which right-aligns
    /// text at the cursor position.
    pub fn autoscroll(&mut self) -> LcdResult<()> {
        self.update_entry(|entry| entry.shift = true)
    }

    pub fn no_autoscroll(&mut self) -> LcdResult<()> {
        self.update_entry(|entry| entry.shift = false)
    }

    pub fn backlight(&mut self) -> LcdResult<()> {
        self.driver.set_backlight(true)
    }

    pub fn no_backlight(&mut self) -> LcdResult<()> {
        self.driver.set_backlight(false)
    }

    /// Gets the last commanded backlight state. The hardware cannot report it.
    pub fn backlight_on(&self) -> bool {
        self.driver.backlight()
    }

    /// Stores a custom 5x8 glyph in one of the 8 CGRAM slots. Only the low 3 bits of `slot` are
    /// used; the glyph is then printable as character code `slot`.
    ///
    /// Leaves the address counter in CGRAM, so position the cursor before writing text again.
    /// If the bus fails halfway the slot is left partially written.
    pub fn create_char(&mut self, slot: u8, glyph: &[u8; 8]) -> LcdResult<()> {
        self.ensure_initialized()?;
        let slot = slot & 0b111;
        self.driver.set_cgram_address(slot << 3)?;
        for &row in glyph {
            self.driver.send_data(row)?;
        }
        Ok(())
    }

    /// Writes one character code at the cursor. Returns the number of bytes written.
    pub fn write_byte(&mut self, value: u8) -> LcdResult<usize> {
        self.ensure_initialized()?;
        self.driver.send_data(value)?;
        Ok(1)
    }

    /// Writes a string at the cursor. Characters outside ASCII are shown as `?`.
    ///
    /// Returns the number of bytes written.
    pub fn print(&mut self, s: &str) -> LcdResult<usize> {
        let mut written = 0;
        for c in s.chars() {
            if c.is_ascii() {
                written += self.write_byte(c as u8)?;
            } else {
                warn!("Non-ASCII character: {}", c);
                written += self.write_byte(b'?')?;
            }
        }
        Ok(written)
    }

    /// Sends a raw instruction byte.
    pub fn command(&mut self, value: u8) -> LcdResult<()> {
        self.ensure_initialized()?;
        self.driver.send_command(value)
    }

    // Compatibility aliases

    /// Any non-zero level turns the backlight on.
    pub fn set_backlight(&mut self, level: u8) -> LcdResult<()> {
        if level != 0 {
            self.backlight()
        } else {
            self.no_backlight()
        }
    }

    pub fn load_custom_character(&mut self, slot: u8, glyph: &[u8; 8]) -> LcdResult<()> {
        self.create_char(slot, glyph)
    }

    pub fn printstr(&mut self, s: &str) -> LcdResult<()> {
        self.print(s).map(|_| ())
    }

    pub fn blink_on(&mut self) -> LcdResult<()> {
        self.blink()
    }

    pub fn blink_off(&mut self) -> LcdResult<()> {
        self.no_blink()
    }

    pub fn cursor_on(&mut self) -> LcdResult<()> {
        self.cursor()
    }

    pub fn cursor_off(&mut self) -> LcdResult<()> {
        self.no_cursor()
    }

    fn ensure_initialized(&self) -> LcdResult<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(LcdError::NotInitialized)
        }
    }

    fn update_control(&mut self, change: impl FnOnce(&mut DisplayControl)) -> LcdResult<()> {
        self.ensure_initialized()?;
        change(&mut self.state.control);
        self.driver.set_display_control(self.state.control)
    }

    fn update_entry(&mut self, change: impl FnOnce(&mut EntryMode)) -> LcdResult<()> {
        self.ensure_initialized()?;
        change(&mut self.state.entry);
        self.driver.set_entry_mode(self.state.entry)
    }
}

impl<B: I2cBus, D> Debug for LcdDriver<B, D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "LcdDriver({}x{}, {:?})",
            self.columns, self.rows, self.driver
        )
    }
}

impl<B: I2cBus, D: DelayNs> std::fmt::Write for LcdDriver<B, D> {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        self.print(s).map(|_| ()).map_err(|err| {
            warn!("Writing to LCD failed: {}", err);
            std::fmt::Error
        })
    }
}
