//! # Module defining the command set of the SSD1306
//!
//! All commands are enum variants carrying their arguments, so the driver code reads like the
//! data sheet. `Command::bytes()` turns a command into the opcode and argument bytes as they
//! go over the wire.
//!
//! Every byte is sent in its own I2C transaction behind the `CONTROL_COMMAND` control byte.
//! The SSD1306 takes the arguments of a multi byte command just like further commands, so
//! this works for all of them.

/// control byte announcing a single command byte
pub const CONTROL_COMMAND: u8 = 0x80;

/// control byte announcing a stream of display RAM bytes
pub const CONTROL_DATA: u8 = 0x40;

/// How the column and page address pointers advance after each display RAM byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AddressingMode {
    /// column first, then the next page
    Horizontal = 0b00,
    /// page first, then the next column
    Vertical = 0b01,
    /// column only, the page stays
    Page = 0b10,
}

/// SSD1306 command set, as far as this driver uses it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// set contrast, 0..=255
    // translates to: 0x81, level
    Contrast(u8),

    /// light every pixel regardless of the RAM content, or follow the RAM again
    // translates to: 0xA4 (follow RAM) / 0xA5 (all on)
    AllOn(bool),

    /// inverted display, a zero bit in RAM lights the pixel
    // translates to: 0xA6 (normal) / 0xA7 (inverted)
    Invert(bool),

    /// panel on or off (sleep mode)
    // translates to: 0xAF (on) / 0xAE (off)
    DisplayOn(bool),

    /// addressing mode for display RAM writes
    // translates to: 0x20, mode
    MemoryMode(AddressingMode),

    /// column window for RAM writes, start and end inclusive
    // translates to: 0x21, start, end
    ColumnAddress(u8, u8),

    /// page window for RAM writes, start and end inclusive
    // translates to: 0x22, start, end
    PageAddress(u8, u8),

    /// RAM row shown on the top line, 0..=63
    // translates to: 0x40 OR line
    StartLine(u8),

    /// mirror horizontally: column 127 is mapped to SEG0
    // translates to: 0xA0 OR remap
    SegmentRemap(bool),

    /// number of active rows minus one
    // translates to: 0xA8, ratio
    Multiplex(u8),

    /// mirror vertically: scan from COM[N-1] to COM0
    // translates to: 0xC0 / 0xC8
    ReverseComScan(bool),

    /// vertical shift of the rows
    // translates to: 0xD3, offset
    DisplayOffset(u8),

    /// COM pin hardware configuration
    // translates to: 0xDA, config
    ComPins(u8),

    /// display clock divide ratio (low nibble) and oscillator frequency (high nibble)
    // translates to: 0xD5, value
    ClockDivide(u8),

    /// pre-charge phase 1 (low nibble) and phase 2 (high nibble) in DCLKs
    // translates to: 0xD9, value
    PreCharge(u8),

    /// VCOMH deselect level
    // translates to: 0xDB, level
    VcomhDeselect(u8),

    /// internal charge pump on or off
    // translates to: 0x8D, 0x14 (on) / 0x10 (off)
    ChargePump(bool),
}

use Command::*;

/// Opcode and argument bytes of one command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandBytes {
    buf: [u8; 3],
    len: usize,
}

impl CommandBytes {
    fn one(a: u8) -> Self {
        CommandBytes { buf: [a, 0, 0], len: 1 }
    }

    fn two(a: u8, b: u8) -> Self {
        CommandBytes { buf: [a, b, 0], len: 2 }
    }

    fn three(a: u8, b: u8, c: u8) -> Self {
        CommandBytes { buf: [a, b, c], len: 3 }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl Command {
    /// Returns the command as the bytes which are sent over the wire
    pub fn bytes(self) -> CommandBytes {
        match self {
            Contrast(level) => CommandBytes::two(0x81, level),
            AllOn(on) => CommandBytes::one(0xA4 | on as u8),
            Invert(inverted) => CommandBytes::one(0xA6 | inverted as u8),
            DisplayOn(on) => CommandBytes::one(0xAE | on as u8),
            MemoryMode(mode) => CommandBytes::two(0x20, mode as u8),
            ColumnAddress(start, end) => CommandBytes::three(0x21, start, end),
            PageAddress(start, end) => CommandBytes::three(0x22, start, end),
            StartLine(line) => CommandBytes::one(0x40 | (line & 0x3F)),
            SegmentRemap(remap) => CommandBytes::one(0xA0 | remap as u8),
            Multiplex(ratio) => CommandBytes::two(0xA8, ratio),
            ReverseComScan(reverse) => CommandBytes::one(0xC0 | ((reverse as u8) << 3)),
            DisplayOffset(offset) => CommandBytes::two(0xD3, offset),
            ComPins(config) => CommandBytes::two(0xDA, config),
            ClockDivide(value) => CommandBytes::two(0xD5, value),
            PreCharge(value) => CommandBytes::two(0xD9, value),
            VcomhDeselect(level) => CommandBytes::two(0xDB, level),
            ChargePump(on) => CommandBytes::two(0x8D, if on { 0x14 } else { 0x10 }),
        }
    }
}

/// A prelude for convenience, it pulls all enums into scope.
pub mod prelude {
    pub use super::{AddressingMode, Command, Command::*, CONTROL_COMMAND, CONTROL_DATA};
}
