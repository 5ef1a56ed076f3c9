//! Linux userspace I2C through the `i2c-dev` character devices.
use crate::bus::I2cBus;
use crate::{LcdError, LcdResult};
use i2cdev::core::I2CDevice;
use i2cdev::linux::{LinuxI2CDevice, LinuxI2CError};
use log::trace;
use std::fmt::{Debug, Formatter};
use std::path::{Path, PathBuf};

/// I2C bus backed by a `/dev/i2c-N` device node.
///
/// The device is bound to one slave address at a time. Writing to another address re-targets
/// the device first, so a single bus can serve several expanders.
pub struct LinuxI2cBus {
    device: LinuxI2CDevice,
    path: PathBuf,
    address: u8,
}

impl LinuxI2cBus {
    /// Opens the bus device at `path`, initially targeting `address`.
    pub fn open(path: impl AsRef<Path>, address: u8) -> LcdResult<Self> {
        let path = path.as_ref().to_path_buf();
        let device = LinuxI2CDevice::new(&path, u16::from(address))?;
        Ok(LinuxI2cBus {
            device,
            path,
            address,
        })
    }

    /// Opens `/dev/i2c-<bus>`. On a Raspberry Pi the header pins are bus `1`.
    pub fn open_bus(bus: u8, address: u8) -> LcdResult<Self> {
        Self::open(format!("/dev/i2c-{}", bus), address)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Debug for LinuxI2cBus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "LinuxI2cBus({}@{:#04x})", self.path.display(), self.address)
    }
}

impl From<LinuxI2CError> for LcdError {
    fn from(err: LinuxI2CError) -> Self {
        LcdError::Bus(err.to_string())
    }
}

impl I2cBus for LinuxI2cBus {
    fn write_byte(&mut self, address: u8, byte: u8) -> LcdResult<()> {
        if address != self.address {
            trace!("Retargeting {} to {:#04x}", self.path.display(), address);
            self.device.set_slave_address(u16::from(address))?;
            self.address = address;
        }
        self.device.write(&[byte])?;
        Ok(())
    }
}
