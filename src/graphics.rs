//! Graphics functions for the SSD1306
//!
//! All drawing happens in the framebuffer; call `Ssd1306::display()` to make it visible.
//! The typical workflow is:
//!  - clear the framebuffer with `Ssd1306::clear()`
//!  - draw "stuff" into the framebuffer (pixels, rectangles, text)
//!  - `Ssd1306::display()` the framebuffer to the controller
//!  - rinse and repeat
//!
//! With the "graphics" feature the driver also implements the embedded_graphics `DrawTarget`
//! trait, so all circle/line/text/bitmap functions of embedded_graphics work on it.
#[cfg(feature = "graphics")]
use embedded_graphics_core::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Size},
    pixelcolor::BinaryColor,
    Pixel,
};

use crate::{backend::DisplayBus, display::Ssd1306};
#[cfg(feature = "graphics")]
use crate::{HEIGHT, WIDTH};

impl<B: DisplayBus> Ssd1306<B> {
    /// Zeroes the framebuffer and homes the text cursor. The panel is not touched until
    /// `display()`.
    pub fn clear(&mut self) {
        self.framebuffer.clear();
        self.set_cursor(0, 0);
    }

    /// Set a pixel at x, y in the framebuffer, coordinates off the panel are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, on: bool) {
        self.framebuffer.set_pixel(x, y, on);
    }

    /// Whether the pixel at x, y in the framebuffer is lit.
    pub fn pixel(&self, x: i32, y: i32) -> bool {
        self.framebuffer.pixel(x, y)
    }

    /// Fill the `w` x `h` rectangle with its top left corner at x, y.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, on: bool) {
        self.framebuffer.fill_rect(x, y, w, h, on);
    }
}

#[cfg(feature = "graphics")]
impl<B: DisplayBus> DrawTarget for Ssd1306<B> {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            // off-panel pixels are dropped by set_pixel
            self.framebuffer.set_pixel(coord.x, coord.y, color.is_on());
        }
        Ok(())
    }

    fn clear(&mut self, color: BinaryColor) -> Result<(), Self::Error> {
        self.framebuffer.fill(color.is_on());
        Ok(())
    }
}

#[cfg(feature = "graphics")]
impl<B: DisplayBus> OriginDimensions for Ssd1306<B> {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}
