//! # Text functions for the SSD1306 driver
//!
//! Text is drawn with the 5x7 font of the `font` module into the framebuffer. Every character
//! cell is 6 pixels wide (5 glyph columns and 1 spacing column) and 8 pixels high, so the
//! screen holds 21 x 8 characters.
//!
//! Besides `draw_char()` and `draw_string()` the driver keeps a text cursor and implements
//! `core::fmt::Write`, so `write!()` and `writeln!()` "just work" like on a teletype.
use core::fmt::Result as FmtResult;
use core::fmt::Write;

use crate::{
    backend::DisplayBus,
    display::Ssd1306,
    font::{glyph, GLYPH_HEIGHT},
    HEIGHT, WIDTH,
};

/// horizontal advance per character
pub const CHAR_WIDTH: i32 = 6;

/// vertical advance per line
pub const LINE_HEIGHT: i32 = 8;

impl<B: DisplayBus> Ssd1306<B> {
    /// Draws the glyph of `c` with its top left corner at x, y.
    ///
    /// Characters outside the printable ASCII range are drawn as a space. Only the set bits
    /// of the glyph are drawn, the background is left as it is.
    pub fn draw_char(&mut self, x: i32, y: i32, c: char) {
        for (i, column) in glyph(c).iter().enumerate() {
            for j in 0..GLYPH_HEIGHT {
                if *column & (1 << j) != 0 {
                    self.framebuffer
                        .set_pixel(x.saturating_add(i as i32), y.saturating_add(j as i32), true);
                }
            }
        }
    }

    /// Draws `text` starting at x, y.
    ///
    /// Lines wrap back to column `x` on '\n' or once the cursor has moved past the right
    /// edge, so the last character of a line may be clipped. There is no scrolling: text
    /// below the last row is simply not drawn.
    pub fn draw_string(&mut self, x: i32, y: i32, text: &str) {
        let (mut cursor_x, mut cursor_y) = (x, y);
        for c in text.chars() {
            self.put_char(x, &mut cursor_x, &mut cursor_y, c);
        }
    }

    /// Position of the text cursor used by `write!()`, in pixels
    pub fn cursor(&self) -> (i32, i32) {
        (self.cursor_x, self.cursor_y)
    }

    /// Move the text cursor used by `write!()`, in pixels
    pub fn set_cursor(&mut self, x: i32, y: i32) {
        self.cursor_x = x;
        self.cursor_y = y;
    }

    // draws one character at the cursor and advances it, wrapping to `origin`
    fn put_char(&mut self, origin: i32, x: &mut i32, y: &mut i32, c: char) {
        if c == '\n' {
            *x = origin;
            *y = y.saturating_add(LINE_HEIGHT);
            return;
        }

        self.draw_char(*x, *y, c);
        *x = x.saturating_add(CHAR_WIDTH);

        if *x >= WIDTH as i32 {
            *x = origin;
            *y = y.saturating_add(LINE_HEIGHT);
        }
    }
}

impl<B: DisplayBus> Write for Ssd1306<B> {
    // with this implementation of write_str, the SSD1306 becomes addressable with all the
    // standard "Write" functions. Drawing into the framebuffer can't fail.
    // Like a teletype the cursor wraps from the last line back to the top one.
    fn write_str(&mut self, s: &str) -> FmtResult {
        let (mut x, mut y) = self.cursor();
        for c in s.chars() {
            if c == '\r' {
                x = 0;
            } else {
                self.put_char(0, &mut x, &mut y, c);
            }
            if y >= HEIGHT as i32 {
                y = 0;
            }
        }
        self.set_cursor(x, y);
        Ok(())
    }
}
