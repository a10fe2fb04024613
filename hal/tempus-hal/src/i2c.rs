//! I2C bus abstractions
//!
//! Provides the trait the EEPROM engine talks through, plus a blanket
//! implementation for any `embedded-hal` 1.0 I2C master.

/// Blocking I2C master as seen by the storage engine
///
/// Every storage transaction goes to one of several device-select
/// addresses on the same bus; the address is the only thing that varies
/// between memory sectors. Errors are passed through untouched.
pub trait I2cBus {
    /// Transport error
    type Error;

    /// Send `data` to the 7-bit `address` in one transaction
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Fill `buf` from `address` without sending anything first
    ///
    /// On an EEPROM this is a current-address read.
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Send `write_data`, then fill `read_buf` after a repeated start
    ///
    /// On an EEPROM `write_data` is the memory address header, which moves
    /// the internal pointer before the sequential read.
    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error>;
}

impl<T: embedded_hal::i2c::I2c> I2cBus for T {
    type Error = T::Error;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        embedded_hal::i2c::I2c::write(self, address, data)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        embedded_hal::i2c::I2c::read(self, address, buf)
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        embedded_hal::i2c::I2c::write_read(self, address, write_data, read_buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorType, Operation};

    /// Minimal embedded-hal master that remembers what it was asked to do
    struct Recorder {
        writes: [(u8, usize); 4],
        count: usize,
    }

    impl ErrorType for Recorder {
        type Error = core::convert::Infallible;
    }

    impl embedded_hal::i2c::I2c for Recorder {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            for op in operations {
                match op {
                    Operation::Write(bytes) => {
                        self.writes[self.count] = (address, bytes.len());
                        self.count += 1;
                    }
                    Operation::Read(buf) => buf.fill(0xA5),
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_blanket_impl_forwards_writes() {
        let mut bus = Recorder {
            writes: [(0, 0); 4],
            count: 0,
        };

        I2cBus::write(&mut bus, 0x50, &[1, 2, 3]).unwrap();
        assert_eq!(bus.count, 1);
        assert_eq!(bus.writes[0], (0x50, 3));
    }

    #[test]
    fn test_blanket_impl_forwards_write_read() {
        let mut bus = Recorder {
            writes: [(0, 0); 4],
            count: 0,
        };
        let mut buf = [0u8; 4];

        I2cBus::write_read(&mut bus, 0x58, &[0x00, 0x10], &mut buf).unwrap();
        assert_eq!(bus.writes[0], (0x58, 2));
        assert_eq!(buf, [0xA5; 4]);
    }
}
