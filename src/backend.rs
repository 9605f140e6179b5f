use embedded_hal::blocking::i2c::{Write, WriteIter};
use embedded_hal::digital::v2::{InputPin, OutputPin};

use crate::bitbang::{Error, SoftI2c, SpinDelay};

/// The byte oriented write contract the SSD1306 driver needs from a bus.
///
/// Both calls are complete transactions: when they return, successful or not, the bus is idle.
pub trait DisplayBus {
    type Error;

    /// write `bytes` to the device at 7 bit `address`
    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error>;

    /// write `register` followed by `bytes` to the device at 7 bit `address`
    fn write_register(&mut self, address: u8, register: u8, bytes: &[u8]) -> Result<(), Self::Error>;
}

impl<SCL, SDA, DELAY, E> DisplayBus for SoftI2c<SCL, SDA, DELAY>
where
    SCL: OutputPin<Error = E>,
    SDA: OutputPin<Error = E> + InputPin<Error = E>,
    DELAY: SpinDelay,
{
    type Error = Error<E>;

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Error<E>> {
        SoftI2c::write(self, address, bytes)
    }

    fn write_register(&mut self, address: u8, register: u8, bytes: &[u8]) -> Result<(), Error<E>> {
        SoftI2c::write_register(self, address, register, bytes)
    }
}

/// Runs the display on a hardware I2C peripheral implementing the embedded_hal blocking traits.
pub struct HalI2c<I2C> {
    i2c: I2C,
}

impl<I2C, ERR> HalI2c<I2C>
where
    I2C: Write<Error = ERR> + WriteIter<Error = ERR>,
{
    pub fn new(i2c: I2C) -> HalI2c<I2C> {
        HalI2c { i2c }
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C, ERR> DisplayBus for HalI2c<I2C>
where
    I2C: Write<Error = ERR> + WriteIter<Error = ERR>,
{
    type Error = ERR;

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), ERR> {
        Write::write(&mut self.i2c, address, bytes)
    }

    fn write_register(&mut self, address: u8, register: u8, bytes: &[u8]) -> Result<(), ERR> {
        // the framebuffer is too big to copy behind the register byte, stream it instead
        WriteIter::write(
            &mut self.i2c,
            address,
            core::iter::once(register).chain(bytes.iter().copied()),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::vec;
    use std::vec::Vec;

    use super::*;

    #[derive(Default)]
    struct Peripheral {
        writes: Vec<(u8, Vec<u8>)>,
    }

    impl Write for Peripheral {
        type Error = ();

        fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), ()> {
            self.writes.push((address, bytes.to_vec()));
            Ok(())
        }
    }

    impl WriteIter for Peripheral {
        type Error = ();

        fn write<B>(&mut self, address: u8, bytes: B) -> Result<(), ()>
        where
            B: IntoIterator<Item = u8>,
        {
            self.writes.push((address, bytes.into_iter().collect()));
            Ok(())
        }
    }

    #[test]
    fn hal_adapter_streams_register_and_payload() {
        let mut bus = HalI2c::new(Peripheral::default());

        DisplayBus::write(&mut bus, 0x3C, &[0x80, 0xAF]).unwrap();
        bus.write_register(0x3C, 0x40, &[1, 2, 3]).unwrap();

        assert_eq!(
            bus.release().writes,
            vec![(0x3C, vec![0x80, 0xAF]), (0x3C, vec![0x40, 1, 2, 3])]
        );
    }
}
