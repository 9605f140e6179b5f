//! # SSD1306 OLED driver over a bit-banged I2C bus
//!
//! This crate drives a 128x64 monochrome SSD1306 OLED without any hardware I2C peripheral. The
//! bus protocol is generated in software by toggling two GPIO pins and busy-waiting between the
//! edges, and the display driver keeps a framebuffer in RAM which is pushed to the controller in
//! one transaction.
//!
//! The crate is split in three layers:
//!  - [`gpio`]: register level open-drain pins for the ESP32-C3 GPIO block
//!  - [`bitbang`]: the I2C bus master, generic over any embedded_hal pins
//!  - [`display`]: the SSD1306 session owning the framebuffer, with the drawing functions in
//!    [`graphics`] and [`textmode`]
//!
//! A typical program looks like this:
//!
//! ```no_run
//! use ssd1306_bitbang::{bitbang::BusyLoop, display::{DisplayConfig, Ssd1306}};
//!
//! let mut oled = Ssd1306::initialize(DisplayConfig::default(), BusyLoop).unwrap();
//! oled.clear();
//! oled.draw_string(0, 0, "hello");
//! oled.fill_rect(0, 12, 128, 2, true);
//! oled.display().unwrap();
//! ```
//!
//! The [`backend::DisplayBus`] trait is the seam between the display and the bus, so the same
//! driver also runs on a hardware I2C peripheral through [`backend::HalI2c`].
#![no_std]

#[cfg(test)]
extern crate std;

pub mod backend;
pub mod bitbang;
pub mod display;
pub mod font;
pub mod framebuffer;
pub mod gpio;
pub mod graphics;
pub mod instructions;
pub mod textmode;

#[cfg(test)]
mod sim;

pub use crate::backend::{DisplayBus, HalI2c};
pub use crate::bitbang::{BusConfig, Error, SoftI2c};
pub use crate::display::{DisplayConfig, Ssd1306};
pub use crate::framebuffer::FrameBuffer;

/// width of the panel in pixels
pub const WIDTH: usize = 128;

/// height of the panel in pixels
pub const HEIGHT: usize = 64;

/// number of 8 pixel high pages
pub const PAGES: usize = HEIGHT / 8;

/// size of the framebuffer, the same as the SSD1306 graphic display RAM
pub const BUFFER_SIZE: usize = WIDTH * PAGES;

/// I2C address with the SA0 pin low, used by most modules
pub const DEFAULT_ADDRESS: u8 = 0x3C;

/// I2C address with the SA0 pin high
pub const ALTERNATE_ADDRESS: u8 = 0x3D;

/// Core clock the busy-wait loops are calibrated against
pub const CPU_CLOCK_HZ: u32 = 160_000_000;
