//! Test doubles: a recording bus, a recording delay and a software HD44780 that replays the
//! expander traffic into DDRAM/CGRAM, standing in for the read-back the wiring lacks.
use crate::bus::I2cBus;
use crate::{LcdError, LcdResult};
use embedded_hal::delay::DelayNs;
use std::time::Duration;

#[derive(Debug, Default)]
pub struct RecordingBus {
    pub writes: Vec<(u8, u8)>,
    fail_after: Option<usize>,
}

impl RecordingBus {
    /// A bus that acknowledges `count` writes and then stops responding.
    pub fn failing_after(count: usize) -> Self {
        RecordingBus {
            writes: Vec::new(),
            fail_after: Some(count),
        }
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.writes.iter().map(|&(_, byte)| byte).collect()
    }
}

impl I2cBus for RecordingBus {
    fn write_byte(&mut self, address: u8, byte: u8) -> LcdResult<()> {
        if self.fail_after.is_some_and(|limit| self.writes.len() >= limit) {
            return Err(LcdError::NoAcknowledge { address });
        }
        self.writes.push((address, byte));
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingDelay {
    pub delays: Vec<Duration>,
}

impl RecordingDelay {
    /// Delays longer than the 50 us settle time that follows every enable pulse.
    pub fn long_delays(&self) -> Vec<Duration> {
        self.delays
            .iter()
            .copied()
            .filter(|delay| *delay > Duration::from_micros(50))
            .collect()
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.delays.push(Duration::from_nanos(u64::from(ns)));
    }

    fn delay_us(&mut self, us: u32) {
        self.delays.push(Duration::from_micros(u64::from(us)));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delays.push(Duration::from_millis(u64::from(ms)));
    }
}

const PIN_RS: u8 = 0b00000001;
const PIN_E: u8 = 0b00000100;
const PIN_BACKLIGHT: u8 = 0b00001000;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Ram {
    Ddram,
    Cgram,
}

/// Behavioural model of the controller as seen through the expander's port.
#[derive(Debug)]
pub struct SimulatedHD44780 {
    pub ddram: [u8; 0x80],
    pub cgram: [u8; 0x40],
    pub commands: Vec<u8>,
    /// Every data write as (memory, address, value).
    pub data: Vec<(Ram, u8, u8)>,
    pub function: u8,
    pub display_control: u8,
    pub entry_mode: u8,
    pub backlight: bool,
    pub four_bit: bool,
    pub address: u8,
    pub ram: Ram,
    port: u8,
    pending_high: Option<u8>,
}

impl Default for SimulatedHD44780 {
    fn default() -> Self {
        SimulatedHD44780 {
            ddram: [b' '; 0x80],
            cgram: [0; 0x40],
            commands: Vec::new(),
            data: Vec::new(),
            function: 0,
            display_control: 0,
            entry_mode: 0b00000110,
            backlight: false,
            four_bit: false,
            address: 0,
            ram: Ram::Ddram,
            port: 0,
            pending_high: None,
        }
    }
}

impl SimulatedHD44780 {
    pub fn replay(bus: &RecordingBus) -> Self {
        let mut controller = SimulatedHD44780::default();
        for &(_, byte) in &bus.writes {
            controller.feed(byte);
        }
        controller
    }

    /// Applies one expander port update.
    pub fn feed(&mut self, port: u8) {
        self.backlight = port & PIN_BACKLIGHT != 0;
        let falling_edge = self.port & PIN_E != 0 && port & PIN_E == 0;
        self.port = port;
        if !falling_edge {
            return;
        }

        let rs = port & PIN_RS != 0;
        let nibble = port >> 4;
        if !self.four_bit {
            // Only D7..D4 are wired, D3..D0 read as low
            self.execute(nibble << 4, rs);
            return;
        }
        match self.pending_high.take() {
            None => self.pending_high = Some(nibble),
            Some(high) => self.execute((high << 4) | nibble, rs),
        }
    }

    /// DDRAM contents starting at `address`, as text.
    pub fn text_at(&self, address: u8, len: usize) -> String {
        let start = address as usize;
        String::from_utf8_lossy(&self.ddram[start..start + len]).into_owned()
    }

    pub fn data_writes(&self) -> usize {
        self.data.len()
    }

    fn execute(&mut self, byte: u8, rs: bool) {
        if rs {
            self.write_data(byte);
            return;
        }

        self.commands.push(byte);
        if byte & 0b10000000 != 0 {
            self.ram = Ram::Ddram;
            self.address = byte & 0b01111111;
        } else if byte & 0b01000000 != 0 {
            self.ram = Ram::Cgram;
            self.address = byte & 0b00111111;
        } else if byte & 0b00100000 != 0 {
            self.four_bit = byte & 0b00010000 == 0;
            self.function = byte;
        } else if byte & 0b00010000 != 0 {
            // Cursor or display shift, nothing to model
        } else if byte & 0b00001000 != 0 {
            self.display_control = byte;
        } else if byte & 0b00000100 != 0 {
            self.entry_mode = byte;
        } else if byte & 0b00000010 != 0 {
            self.ram = Ram::Ddram;
            self.address = 0;
        } else if byte & 0b00000001 != 0 {
            self.ddram = [b' '; 0x80];
            self.ram = Ram::Ddram;
            self.address = 0;
            self.entry_mode |= 0b00000010;
        }
    }

    fn write_data(&mut self, value: u8) {
        self.data.push((self.ram, self.address, value));
        let increment = self.entry_mode & 0b00000010 != 0;
        match self.ram {
            Ram::Ddram => {
                self.ddram[self.address as usize] = value;
                self.address = step(self.address, increment) & 0b01111111;
            }
            Ram::Cgram => {
                self.cgram[self.address as usize] = value;
                self.address = step(self.address, increment) & 0b00111111;
            }
        }
    }
}

fn step(address: u8, increment: bool) -> u8 {
    if increment {
        address.wrapping_add(1)
    } else {
        address.wrapping_sub(1)
    }
}
