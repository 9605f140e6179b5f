//! # Register level GPIO for the ESP32-C3
//!
//! The I2C lines have to be open-drain with a pull-up: the firmware only ever pulls a line low
//! or lets go of it, and both the pull-up and the remote device may hold it high or low. This
//! module configures a pin that way through the IO MUX and the GPIO matrix and exposes it as an
//! embedded_hal `OutputPin` + `InputPin`.
//!
//! Output changes use the write-1-to-set and write-1-to-clear registers, so there is no
//! read-modify-write on the shared output register and two pins never race.
//!
//! Register access goes through the [`Registers`] trait. [`Mmio`] is the real, volatile
//! implementation.
use core::convert::Infallible;
use core::ptr::{read_volatile, write_volatile};

use embedded_hal::digital::v2::{InputPin, OutputPin};

/// highest GPIO number of the ESP32-C3
pub const MAX_PIN: u8 = 21;

const GPIO_BASE: u32 = 0x6000_4000;
const IO_MUX_BASE: u32 = 0x6000_9000;

pub(crate) const GPIO_OUT_W1TS_REG: u32 = GPIO_BASE + 0x0008;
pub(crate) const GPIO_OUT_W1TC_REG: u32 = GPIO_BASE + 0x000C;
pub(crate) const GPIO_ENABLE_REG: u32 = GPIO_BASE + 0x0020;
pub(crate) const GPIO_IN_REG: u32 = GPIO_BASE + 0x003C;

pub(crate) const fn gpio_pin_reg(n: u8) -> u32 {
    GPIO_BASE + 0x0074 + (n as u32 * 4)
}

pub(crate) const fn io_mux_reg(n: u8) -> u32 {
    IO_MUX_BASE + 0x0004 + (n as u32 * 4)
}

// GPIO_PINn_REG
pub(crate) const PAD_DRIVER: u32 = 1 << 2;

// IO_MUX_GPIOn_REG
pub(crate) const FUN_WPU: u32 = 1 << 7;
pub(crate) const FUN_WPD: u32 = 1 << 8;
pub(crate) const FUN_IE: u32 = 1 << 9;
pub(crate) const FUN_DRV_SHIFT: u32 = 10;
pub(crate) const MCU_SEL_SHIFT: u32 = 12;

const FUN_DRV_MEDIUM: u32 = 2;
const MCU_SEL_GPIO: u32 = 1;

/// 32 bit register file access
pub trait Registers {
    fn read(&self, address: u32) -> u32;
    fn write(&self, address: u32, value: u32);

    fn set_bits(&self, address: u32, bits: u32) {
        let value = self.read(address);
        self.write(address, value | bits);
    }
}

impl<R: Registers + ?Sized> Registers for &R {
    fn read(&self, address: u32) -> u32 {
        (**self).read(address)
    }

    fn write(&self, address: u32, value: u32) {
        (**self).write(address, value)
    }
}

/// Volatile access to the memory mapped peripheral registers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mmio;

impl Registers for Mmio {
    #[inline(always)]
    fn read(&self, address: u32) -> u32 {
        // addresses come from the constants above and are valid peripheral registers
        unsafe { read_volatile(address as *const u32) }
    }

    #[inline(always)]
    fn write(&self, address: u32, value: u32) {
        unsafe { write_volatile(address as *mut u32, value) }
    }
}

/// A GPIO configured as open-drain output with weak pull-up and input sense.
///
/// Pins outside `0..=MAX_PIN` are accepted but inert: configuring, setting and clearing them
/// touches no register and reading them returns a released (high) line.
#[derive(Debug)]
pub struct OpenDrainPin<R = Mmio> {
    index: u8,
    regs: R,
}

impl OpenDrainPin<Mmio> {
    /// Configure the GPIO with number `index` on the real hardware.
    pub fn new(index: u8) -> Self {
        Self::with_registers(index, Mmio)
    }
}

impl<R: Registers> OpenDrainPin<R> {
    /// Configure the GPIO with number `index` through the given register file.
    pub fn with_registers(index: u8, regs: R) -> Self {
        let pin = OpenDrainPin { index, regs };
        pin.configure_open_drain();
        pin
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    /// whether the index refers to an existing GPIO
    pub fn is_valid(&self) -> bool {
        self.index <= MAX_PIN
    }

    fn mask(&self) -> u32 {
        1 << self.index
    }

    fn configure_open_drain(&self) {
        if !self.is_valid() {
            #[cfg(feature = "defmt")]
            defmt::warn!("ignoring configuration of GPIO{}", self.index);
            return;
        }

        let mux_reg = io_mux_reg(self.index);
        let mut mux = self.regs.read(mux_reg);

        mux &= !(0x7 << MCU_SEL_SHIFT);
        mux |= MCU_SEL_GPIO << MCU_SEL_SHIFT;

        mux |= FUN_IE | FUN_WPU;
        mux &= !FUN_WPD;

        mux &= !(0x3 << FUN_DRV_SHIFT);
        mux |= FUN_DRV_MEDIUM << FUN_DRV_SHIFT;

        self.regs.write(mux_reg, mux);

        // only ever pull low, the pull-up (or the device) brings the line high
        self.regs.set_bits(gpio_pin_reg(self.index), PAD_DRIVER);
        self.regs.set_bits(GPIO_ENABLE_REG, self.mask());
    }

    /// release the line, it floats high through the pull-up
    pub fn release(&mut self) {
        if self.is_valid() {
            self.regs.write(GPIO_OUT_W1TS_REG, self.mask());
        }
    }

    /// pull the line low
    pub fn pull_low(&mut self) {
        if self.is_valid() {
            self.regs.write(GPIO_OUT_W1TC_REG, self.mask());
        }
    }

    /// sensed level of the line, regardless of who drives it
    pub fn read(&self) -> bool {
        if !self.is_valid() {
            return true;
        }
        self.regs.read(GPIO_IN_REG) & self.mask() != 0
    }
}

impl<R: Registers> OutputPin for OpenDrainPin<R> {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.pull_low();
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.release();
        Ok(())
    }
}

impl<R: Registers> InputPin for OpenDrainPin<R> {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Self::Error> {
        Ok(self.read())
    }

    fn is_low(&self) -> Result<bool, Self::Error> {
        Ok(!self.read())
    }
}
