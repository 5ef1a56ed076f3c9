use crate::bus::I2cBus;
use crate::{LcdError, LcdResult};
use embedded_hal::i2c::{Error, ErrorKind, I2c};
use std::fmt::{Debug, Formatter};

/// Adapter exposing any `embedded-hal` I2C peripheral as an [I2cBus].
pub struct HalI2cBus<I> {
    i2c: I,
}

impl<I: I2c> HalI2cBus<I> {
    pub fn new(i2c: I) -> Self {
        HalI2cBus { i2c }
    }

    /// Gives the wrapped peripheral back.
    pub fn release(self) -> I {
        self.i2c
    }
}

impl<I> Debug for HalI2cBus<I> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "HalI2cBus({})", std::any::type_name::<I>())
    }
}

impl<I: I2c> I2cBus for HalI2cBus<I> {
    fn write_byte(&mut self, address: u8, byte: u8) -> LcdResult<()> {
        self.i2c
            .write(address, &[byte])
            .map_err(|err| match err.kind() {
                ErrorKind::NoAcknowledge(_) => LcdError::NoAcknowledge { address },
                kind => LcdError::Bus(format!("{:?}", kind)),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorType, NoAcknowledgeSource, Operation};

    #[derive(Debug)]
    struct FakeError(ErrorKind);

    impl Error for FakeError {
        fn kind(&self) -> ErrorKind {
            self.0
        }
    }

    #[derive(Default)]
    struct FakeI2c {
        written: Vec<(u8, Vec<u8>)>,
        fail_with: Option<ErrorKind>,
    }

    impl ErrorType for FakeI2c {
        type Error = FakeError;
    }

    impl I2c for FakeI2c {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if let Some(kind) = self.fail_with {
                return Err(FakeError(kind));
            }
            for operation in operations {
                if let Operation::Write(bytes) = operation {
                    self.written.push((address, bytes.to_vec()));
                }
            }
            Ok(())
        }
    }

    #[test]
    fn writes_single_byte_transactions() {
        let mut bus = HalI2cBus::new(FakeI2c::default());
        bus.write_byte(0x27, 0x08).unwrap();
        bus.write_byte(0x3f, 0xAB).unwrap();

        let i2c = bus.release();
        assert_eq!(i2c.written, vec![(0x27, vec![0x08]), (0x3f, vec![0xAB])]);
    }

    #[test]
    fn maps_missing_acknowledge() {
        let mut bus = HalI2cBus::new(FakeI2c {
            fail_with: Some(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)),
            ..FakeI2c::default()
        });
        assert_eq!(
            bus.write_byte(0x27, 0x00),
            Err(LcdError::NoAcknowledge { address: 0x27 })
        );
    }

    #[test]
    fn maps_other_failures_to_bus_error() {
        let mut bus = HalI2cBus::new(FakeI2c {
            fail_with: Some(ErrorKind::ArbitrationLoss),
            ..FakeI2c::default()
        });
        assert_eq!(
            bus.write_byte(0x27, 0x00),
            Err(LcdError::Bus("ArbitrationLoss".to_string()))
        );
    }
}
