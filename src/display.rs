//! # Main driver for the SSD1306
//!
//! The [`Ssd1306`] struct is one display session: it owns the bus it talks through, knows the
//! I2C address of the controller and keeps the framebuffer every drawing function works on.
//! Nothing reaches the panel before [`Ssd1306::display`] pushes the framebuffer.
//!
//! Typically you want to look into the following functions:
//!  - `Ssd1306::initialize()` to configure the pins, the bus and bring up the controller
//!  - `Ssd1306::new()` + `Ssd1306::init()` when you bring your own bus, or want to keep the
//!    session when the controller does not answer
//!  - `Ssd1306::display()` to make the framebuffer visible
//!
//! The drawing functions live in the `graphics` and `textmode` modules.
use core::convert::Infallible;

use crate::{
    backend::DisplayBus,
    bitbang::{BusConfig, Error, SoftI2c, SpinDelay},
    framebuffer::FrameBuffer,
    gpio::OpenDrainPin,
    instructions::prelude::*,
    DEFAULT_ADDRESS, HEIGHT, PAGES, WIDTH,
};

/// busy-wait iterations for the controller supply to settle after power on
pub const POWER_ON_SETTLE_SPINS: u32 = 100_000;

/// contrast set during bring-up
pub const DEFAULT_CONTRAST: u8 = 0xCF;

/// Where the display is connected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayConfig {
    /// 7 bit I2C address, `DEFAULT_ADDRESS` or `ALTERNATE_ADDRESS`
    pub address: u8,
    /// GPIO number of the clock line
    pub scl_pin: u8,
    /// GPIO number of the data line
    pub sda_pin: u8,
}

impl Default for DisplayConfig {
    // SCL on GPIO7 and SDA on GPIO6, the D5/D4 pads of a XIAO ESP32-C3
    fn default() -> Self {
        DisplayConfig {
            address: DEFAULT_ADDRESS,
            scl_pin: 7,
            sda_pin: 6,
        }
    }
}

/// Bus type used by `Ssd1306::initialize()`
pub type GpioBus<DELAY> = SoftI2c<OpenDrainPin, OpenDrainPin, DELAY>;

/// main struct for state keeping of the SSD1306 driver
pub struct Ssd1306<B> {
    bus: B,
    address: u8,
    initialized: bool,
    pub(crate) framebuffer: FrameBuffer,
    pub(crate) cursor_x: i32,
    pub(crate) cursor_y: i32,
}

impl<DELAY: SpinDelay> Ssd1306<GpioBus<DELAY>> {
    /// Sets up the bit-banged bus on the configured GPIOs at 400 kHz, waits for the panel
    /// supply to settle and runs the bring-up sequence.
    pub fn initialize(config: DisplayConfig, delay: DELAY) -> Result<Self, Error<Infallible>> {
        let mut bus = SoftI2c::on_gpio(config.scl_pin, config.sda_pin, delay, BusConfig::FAST)?;
        bus.pause(POWER_ON_SETTLE_SPINS);

        let mut display = Ssd1306::new(bus, config.address);
        display.init()?;
        Ok(display)
    }
}

impl<B: DisplayBus> Ssd1306<B> {
    /// Create a new session for the controller at 7 bit `address`. Nothing is sent yet.
    pub fn new(bus: B, address: u8) -> Self {
        Ssd1306 {
            bus,
            address,
            initialized: false,
            framebuffer: FrameBuffer::new(),
            cursor_x: 0,
            cursor_y: 0,
        }
    }

    // the controller powers up in an unusable state: charge pump off, wrong
    // orientation and page addressing. This sequence must be sent as is.
    fn init_sequence() -> [Command; 16] {
        [
            DisplayOn(false),
            ClockDivide(0x80),
            Multiplex(HEIGHT as u8 - 1),
            DisplayOffset(0),
            StartLine(0),
            ChargePump(true),
            MemoryMode(AddressingMode::Horizontal),
            SegmentRemap(true),
            ReverseComScan(true),
            ComPins(0x12),
            Contrast(DEFAULT_CONTRAST),
            PreCharge(0xF1),
            VcomhDeselect(0x40),
            AllOn(false),
            Invert(false),
            DisplayOn(true),
        ]
    }

    /// Brings up the controller and shows a blank screen.
    ///
    /// Stops at the first command that fails; the session stays usable and `init()` can be
    /// retried.
    pub fn init(&mut self) -> Result<(), B::Error> {
        self.initialized = false;

        #[cfg(feature = "defmt")]
        defmt::debug!("initializing SSD1306 at {=u8:#x}", self.address);

        for command in Self::init_sequence().iter() {
            self.write_command(*command)?;
        }

        self.framebuffer.clear();
        self.display()?;

        self.initialized = true;
        Ok(())
    }

    /// whether the bring-up sequence went through
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Gives back the bus.
    pub fn release(self) -> B {
        self.bus
    }

    /// Sends a command, each byte in its own single-command transaction.
    pub fn write_command(&mut self, command: Command) -> Result<(), B::Error> {
        for byte in command.bytes().as_slice() {
            self.bus.write(self.address, &[CONTROL_COMMAND, *byte])?;
        }
        Ok(())
    }

    /// Transfers the framebuffer to the controller, making it visible.
    pub fn display(&mut self) -> Result<(), B::Error> {
        self.write_command(ColumnAddress(0, WIDTH as u8 - 1))?;
        self.write_command(PageAddress(0, PAGES as u8 - 1))?;
        // the whole buffer in one data-stream transaction
        self.bus
            .write_register(self.address, CONTROL_DATA, self.framebuffer.as_bytes())
    }

    /// Set the contrast of the panel, 0 (dim) to 255 (bright).
    pub fn set_contrast(&mut self, level: u8) -> Result<(), B::Error> {
        self.write_command(Contrast(level))
    }

    /// Switch the panel on, or off (sleep mode, the display RAM is kept).
    pub fn power(&mut self, on: bool) -> Result<(), B::Error> {
        self.write_command(DisplayOn(on))
    }

    /// Invert the panel, lit pixels turn dark and the other way round.
    pub fn invert(&mut self, inverted: bool) -> Result<(), B::Error> {
        self.write_command(Invert(inverted))
    }

    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    pub fn framebuffer_mut(&mut self) -> &mut FrameBuffer {
        &mut self.framebuffer
    }
}
