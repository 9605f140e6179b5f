//! "Bit bang" I2C bus master
//!
//! Generates the two-wire protocol with two open-drain pins and a busy-wait delay, no hardware
//! I2C peripheral needed. It is a single master bus without clock stretching: the clock line
//! is only ever driven, never read back.
//!
//! Every line change is followed by a half-bit delay of `(cpu_clock_hz / frequency_hz) / 4`
//! spin iterations. The real bus speed is therefore an approximation, which is fine for the
//! SSD1306 and most other I2C devices.
//!
//! Use `SoftI2c::new()` with already configured pins, or `SoftI2c::on_gpio()` to configure two
//! ESP32-C3 GPIOs as well.
use core::convert::Infallible;

use embedded_hal::blocking::i2c::{Read, Write, WriteRead};
use embedded_hal::digital::v2::{InputPin, OutputPin};

use crate::gpio::OpenDrainPin;
use crate::CPU_CLOCK_HZ;

/// Bus timing configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusConfig {
    /// target SCL frequency in Hz
    pub frequency_hz: u32,
    /// core clock the spin loops run at
    pub cpu_clock_hz: u32,
}

impl BusConfig {
    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self {
        frequency_hz: 100_000,
        cpu_clock_hz: CPU_CLOCK_HZ,
    };

    /// Fast mode (400 kHz)
    pub const FAST: Self = Self {
        frequency_hz: 400_000,
        cpu_clock_hz: CPU_CLOCK_HZ,
    };

    /// Spin iterations per half bit
    pub fn half_bit_spins(&self) -> u32 {
        (self.cpu_clock_hz / self.frequency_hz.max(1)) / 4
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Busy-wait provider used for all bus timing.
pub trait SpinDelay {
    /// wait for `iterations` loop turns
    fn spin(&mut self, iterations: u32);
}

/// Spins the processor with `core::hint::spin_loop()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BusyLoop;

impl SpinDelay for BusyLoop {
    #[inline]
    fn spin(&mut self, iterations: u32) {
        for _ in 0..iterations {
            core::hint::spin_loop();
        }
    }
}

/// Used to run without delay, for slow cores or simulated pins
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl SpinDelay for NoDelay {
    #[inline]
    fn spin(&mut self, _iterations: u32) {}
}

/// Errors of the bit-banged bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// the address or a data byte was not acknowledged, the transaction was aborted
    Nack,
    /// clock and data were given the same GPIO
    PinConflict,
    /// a pin operation failed
    Pin(E),
}

impl<E> Error<E> {
    // wraps a pin result so it can be used with `?`
    fn pin<T>(result: Result<T, E>) -> Result<T, Error<E>> {
        result.map_err(Error::Pin)
    }
}

/// Direction bit of the address byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Write = 0,
    Read = 1,
}

/// address byte on the wire: 7 bit address in the upper bits, direction in bit 0
pub const fn address_byte(address: u8, direction: Direction) -> u8 {
    ((address & 0x7F) << 1) | direction as u8
}

/// "Bit bang" I2C master over an open-drain clock and data pin.
pub struct SoftI2c<SCL, SDA, DELAY> {
    scl: SCL,
    sda: SDA,
    delay: DELAY,
    half_bit: u32,
}

impl<DELAY: SpinDelay> SoftI2c<OpenDrainPin, OpenDrainPin, DELAY> {
    /// Configures GPIO `scl_pin` and `sda_pin` as open-drain and builds the bus on them.
    pub fn on_gpio(
        scl_pin: u8,
        sda_pin: u8,
        delay: DELAY,
        config: BusConfig,
    ) -> Result<Self, Error<Infallible>> {
        if scl_pin == sda_pin {
            return Err(Error::PinConflict);
        }
        let scl = OpenDrainPin::new(scl_pin);
        let sda = OpenDrainPin::new(sda_pin);
        SoftI2c::new(scl, sda, delay, config)
    }
}

impl<SCL, SDA, DELAY, E> SoftI2c<SCL, SDA, DELAY>
where
    SCL: OutputPin<Error = E>,
    SDA: OutputPin<Error = E> + InputPin<Error = E>,
    DELAY: SpinDelay,
{
    /// Constructs the bus from already configured pins and releases both lines.
    pub fn new(scl: SCL, sda: SDA, delay: DELAY, config: BusConfig) -> Result<Self, Error<E>> {
        let mut bus = SoftI2c {
            scl,
            sda,
            delay,
            half_bit: config.half_bit_spins(),
        };
        bus.sda_high()?;
        bus.scl_high()?;
        Ok(bus)
    }

    /// spin iterations per half bit
    pub fn half_bit_spins(&self) -> u32 {
        self.half_bit
    }

    /// Busy-wait with the bus delay provider, the lines are left untouched.
    pub fn pause(&mut self, iterations: u32) {
        self.delay.spin(iterations);
    }

    /// Gives back the pins and the delay.
    pub fn release(self) -> (SCL, SDA, DELAY) {
        (self.scl, self.sda, self.delay)
    }

    #[inline]
    fn wait(&mut self) {
        self.delay.spin(self.half_bit);
    }

    fn scl_high(&mut self) -> Result<(), Error<E>> {
        Error::pin(self.scl.set_high())?;
        self.wait();
        Ok(())
    }

    fn scl_low(&mut self) -> Result<(), Error<E>> {
        Error::pin(self.scl.set_low())?;
        self.wait();
        Ok(())
    }

    fn sda_high(&mut self) -> Result<(), Error<E>> {
        Error::pin(self.sda.set_high())?;
        self.wait();
        Ok(())
    }

    fn sda_low(&mut self) -> Result<(), Error<E>> {
        Error::pin(self.sda.set_low())?;
        self.wait();
        Ok(())
    }

    fn sda_read(&self) -> Result<bool, Error<E>> {
        Error::pin(self.sda.is_high())
    }

    /// Start condition: SDA falls while SCL is high. Also works as repeated start.
    pub fn start(&mut self) -> Result<(), Error<E>> {
        self.sda_high()?;
        self.scl_high()?;
        self.sda_low()?;
        self.scl_low()
    }

    /// Stop condition: SDA rises while SCL is high, leaving the bus idle.
    pub fn stop(&mut self) -> Result<(), Error<E>> {
        self.sda_low()?;
        self.scl_high()?;
        self.sda_high()
    }

    /// Clocks out one byte MSB first and returns whether the receiver acknowledged it.
    pub fn write_byte(&mut self, byte: u8) -> Result<bool, Error<E>> {
        for bit in (0..8).rev() {
            if byte & (1 << bit) != 0 {
                self.sda_high()?;
            } else {
                self.sda_low()?;
            }
            self.scl_high()?;
            self.scl_low()?;
        }

        // release SDA, the receiver pulls it low to acknowledge
        self.sda_high()?;
        self.scl_high()?;
        let ack = !self.sda_read()?;
        self.scl_low()?;

        Ok(ack)
    }

    /// Clocks in one byte MSB first, then acknowledges it if `ack` is set.
    pub fn read_byte(&mut self, ack: bool) -> Result<u8, Error<E>> {
        let mut byte = 0u8;

        self.sda_high()?;
        for bit in (0..8).rev() {
            self.scl_high()?;
            if self.sda_read()? {
                byte |= 1 << bit;
            }
            self.scl_low()?;
        }

        if ack {
            self.sda_low()?;
        } else {
            self.sda_high()?;
        }
        self.scl_high()?;
        self.scl_low()?;
        self.sda_high()?;

        Ok(byte)
    }

    /// Starts a transaction with the device at 7 bit `address`.
    ///
    /// The returned guard issues the stop condition when it goes out of scope, so the bus is
    /// idle again on every exit path. If the address is not acknowledged the stop is sent
    /// right away and `Error::Nack` is returned.
    pub fn transaction(
        &mut self,
        address: u8,
        direction: Direction,
    ) -> Result<Transaction<'_, SCL, SDA, DELAY, E>, Error<E>> {
        self.start()?;
        let mut transaction = Transaction {
            bus: self,
            stopped: false,
        };
        transaction.address(address, direction)?;
        Ok(transaction)
    }

    /// Writes `bytes` to the device at `address` in one transaction.
    pub fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Error<E>> {
        let mut transaction = self.transaction(address, Direction::Write)?;
        transaction.write(bytes)?;
        transaction.finish()
    }

    /// Writes `register` followed by `bytes` to the device at `address` in one transaction.
    pub fn write_register(&mut self, address: u8, register: u8, bytes: &[u8]) -> Result<(), Error<E>> {
        let mut transaction = self.transaction(address, Direction::Write)?;
        transaction.write(&[register])?;
        transaction.write(bytes)?;
        transaction.finish()
    }

    /// Fills `buffer` from the device at `address`, the last byte is not acknowledged.
    ///
    /// An empty buffer puts nothing on the bus: the device would keep driving SDA for a byte
    /// nobody clocks out, blocking the stop condition.
    pub fn read(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), Error<E>> {
        if buffer.is_empty() {
            return Ok(());
        }
        let mut transaction = self.transaction(address, Direction::Read)?;
        transaction.read(buffer)?;
        transaction.finish()
    }

    /// Writes `bytes`, then reads into `buffer` after a repeated start. With an empty
    /// `buffer` this is a plain write.
    pub fn write_read(&mut self, address: u8, bytes: &[u8], buffer: &mut [u8]) -> Result<(), Error<E>> {
        let mut transaction = self.transaction(address, Direction::Write)?;
        transaction.write(bytes)?;
        if buffer.is_empty() {
            return transaction.finish();
        }
        transaction.restart(address, Direction::Read)?;
        transaction.read(buffer)?;
        transaction.finish()
    }

    /// Whether a device acknowledges `address`.
    pub fn probe(&mut self, address: u8) -> Result<bool, Error<E>> {
        match self.transaction(address, Direction::Write) {
            Ok(transaction) => transaction.finish().map(|_| true),
            Err(Error::Nack) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// An open transaction on the bus, see [`SoftI2c::transaction`].
pub struct Transaction<'a, SCL, SDA, DELAY, E>
where
    SCL: OutputPin<Error = E>,
    SDA: OutputPin<Error = E> + InputPin<Error = E>,
    DELAY: SpinDelay,
{
    bus: &'a mut SoftI2c<SCL, SDA, DELAY>,
    stopped: bool,
}

impl<'a, SCL, SDA, DELAY, E> Transaction<'a, SCL, SDA, DELAY, E>
where
    SCL: OutputPin<Error = E>,
    SDA: OutputPin<Error = E> + InputPin<Error = E>,
    DELAY: SpinDelay,
{
    fn address(&mut self, address: u8, direction: Direction) -> Result<(), Error<E>> {
        if self.bus.write_byte(address_byte(address, direction))? {
            Ok(())
        } else {
            #[cfg(feature = "defmt")]
            defmt::warn!("no device acknowledged address {=u8:#x}", address);
            Err(Error::Nack)
        }
    }

    /// Repeated start, addressing the device again (usually to turn the bus around).
    pub fn restart(&mut self, address: u8, direction: Direction) -> Result<(), Error<E>> {
        self.bus.start()?;
        self.address(address, direction)
    }

    /// Writes all `bytes`, failing on the first one that is not acknowledged.
    pub fn write(&mut self, bytes: &[u8]) -> Result<(), Error<E>> {
        for &byte in bytes {
            if !self.bus.write_byte(byte)? {
                #[cfg(feature = "defmt")]
                defmt::warn!("data byte {=u8:#x} not acknowledged", byte);
                return Err(Error::Nack);
            }
        }
        Ok(())
    }

    /// Reads `buffer.len()` bytes, acknowledging all but the last. Read at least one byte
    /// after addressing a device for reading, or it may hold SDA low through the stop.
    pub fn read(&mut self, buffer: &mut [u8]) -> Result<(), Error<E>> {
        let last = buffer.len().saturating_sub(1);
        for (i, byte) in buffer.iter_mut().enumerate() {
            *byte = self.bus.read_byte(i != last)?;
        }
        Ok(())
    }

    /// Sends the stop condition and reports its outcome.
    pub fn finish(mut self) -> Result<(), Error<E>> {
        self.stopped = true;
        self.bus.stop()
    }
}

impl<'a, SCL, SDA, DELAY, E> Drop for Transaction<'a, SCL, SDA, DELAY, E>
where
    SCL: OutputPin<Error = E>,
    SDA: OutputPin<Error = E> + InputPin<Error = E>,
    DELAY: SpinDelay,
{
    fn drop(&mut self) {
        if !self.stopped {
            // the error that got us here is more useful than a failing stop
            let _ = self.bus.stop();
        }
    }
}

impl<SCL, SDA, DELAY, E> Write for SoftI2c<SCL, SDA, DELAY>
where
    SCL: OutputPin<Error = E>,
    SDA: OutputPin<Error = E> + InputPin<Error = E>,
    DELAY: SpinDelay,
{
    type Error = Error<E>;

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        SoftI2c::write(self, address, bytes)
    }
}

impl<SCL, SDA, DELAY, E> Read for SoftI2c<SCL, SDA, DELAY>
where
    SCL: OutputPin<Error = E>,
    SDA: OutputPin<Error = E> + InputPin<Error = E>,
    DELAY: SpinDelay,
{
    type Error = Error<E>;

    fn read(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        SoftI2c::read(self, address, buffer)
    }
}

impl<SCL, SDA, DELAY, E> WriteRead for SoftI2c<SCL, SDA, DELAY>
where
    SCL: OutputPin<Error = E>,
    SDA: OutputPin<Error = E> + InputPin<Error = E>,
    DELAY: SpinDelay,
{
    type Error = Error<E>;

    fn write_read(&mut self, address: u8, bytes: &[u8], buffer: &mut [u8]) -> Result<(), Self::Error> {
        SoftI2c::write_read(self, address, bytes, buffer)
    }
}
