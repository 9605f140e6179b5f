//! In-memory copy of the SSD1306 display RAM.
//!
//! The buffer is laid out exactly like the controller's graphic display RAM in horizontal
//! addressing mode: 8 pages of 128 bytes, each byte a column of 8 pixels with bit 0 on top.
//! Pixel (x, y) is bit `y & 7` of byte `x + (y / 8) * WIDTH`, so the whole buffer can be sent
//! to the controller as it is.
use crate::{BUFFER_SIZE, HEIGHT, WIDTH};

#[derive(Clone)]
pub struct FrameBuffer {
    bytes: [u8; BUFFER_SIZE],
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let lit = self.bytes.iter().map(|b| b.count_ones()).sum::<u32>();
        write!(f, "FrameBuffer {{ {}x{}, {} pixels on }}", WIDTH, HEIGHT, lit)
    }
}

impl FrameBuffer {
    pub const fn new() -> Self {
        FrameBuffer {
            bytes: [0u8; BUFFER_SIZE],
        }
    }

    // byte index and bit mask of an on-screen pixel
    fn locate(x: i32, y: i32) -> Option<(usize, u8)> {
        if x < 0 || y < 0 || x >= WIDTH as i32 || y >= HEIGHT as i32 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        Some((x + (y / 8) * WIDTH, 1 << (y & 7)))
    }

    /// Sets or clears pixel (x, y). Coordinates outside the panel are silently ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, on: bool) {
        if let Some((index, mask)) = Self::locate(x, y) {
            if on {
                self.bytes[index] |= mask;
            } else {
                self.bytes[index] &= !mask;
            }
        }
    }

    /// Whether pixel (x, y) is lit, `false` outside the panel.
    pub fn pixel(&self, x: i32, y: i32) -> bool {
        match Self::locate(x, y) {
            Some((index, mask)) => self.bytes[index] & mask != 0,
            None => false,
        }
    }

    /// Switches every pixel off.
    pub fn clear(&mut self) {
        self.fill(false);
    }

    /// Switches every pixel on or off.
    pub fn fill(&mut self, on: bool) {
        let byte = if on { 0xFF } else { 0x00 };
        self.bytes.iter_mut().for_each(|b| *b = byte);
    }

    /// Sets every pixel of the `w` x `h` rectangle at (x, y), clipping at the panel edges.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, on: bool) {
        let columns = x.max(0)..x.saturating_add(w).min(WIDTH as i32);
        let rows = y.max(0)..y.saturating_add(h).min(HEIGHT as i32);
        for i in columns {
            for j in rows.clone() {
                self.set_pixel(i, j, on);
            }
        }
    }

    /// Number of lit pixels.
    pub fn count_on(&self) -> usize {
        self.bytes.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// The raw display RAM image.
    pub fn as_bytes(&self) -> &[u8; BUFFER_SIZE] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_pixel_uses_page_layout() {
        let mut fb = FrameBuffer::new();

        fb.set_pixel(10, 20, true);

        // page 2, bit 4
        assert_eq!(fb.as_bytes()[10 + 2 * WIDTH], 1 << 4);
        assert_eq!(fb.count_on(), 1);
    }

    #[test]
    fn set_pixel_round_trips_everywhere() {
        let mut fb = FrameBuffer::new();
        for y in 0..HEIGHT as i32 {
            for x in 0..WIDTH as i32 {
                let on = (x * 7 + y * 3) % 5 == 0;
                fb.set_pixel(x, y, on);
                assert_eq!(fb.pixel(x, y), on, "pixel ({}, {})", x, y);
            }
        }
        fb.set_pixel(127, 63, true);
        assert!(fb.pixel(127, 63));
        fb.set_pixel(127, 63, false);
        assert!(!fb.pixel(127, 63));
    }

    #[test]
    fn out_of_range_is_ignored() {
        let mut fb = FrameBuffer::new();
        fb.set_pixel(3, 3, true);
        let before = fb.as_bytes().clone();

        for &(x, y) in &[(-1, 0), (0, -1), (128, 0), (0, 64), (i32::MAX, i32::MIN)] {
            fb.set_pixel(x, y, true);
            fb.set_pixel(x, y, false);
            assert!(!fb.pixel(x, y));
        }

        assert_eq!(fb.as_bytes()[..], before[..]);
    }

    #[test]
    fn clear_switches_everything_off() {
        let mut fb = FrameBuffer::new();
        fb.fill(true);
        assert_eq!(fb.count_on(), WIDTH * HEIGHT);

        fb.clear();

        assert_eq!(fb.count_on(), 0);
        assert!(fb.as_bytes().iter().all(|b| *b == 0));
    }

    #[test]
    fn fill_rect_with_hole() {
        let mut fb = FrameBuffer::new();

        fb.fill_rect(10, 10, 20, 20, true);
        fb.set_pixel(15, 15, false);

        assert_eq!(fb.count_on(), 399);
        assert!(!fb.pixel(15, 15));
        assert!(fb.pixel(10, 10));
        assert!(fb.pixel(29, 29));
        assert!(!fb.pixel(30, 29));
    }

    #[test]
    fn fill_rect_clips_at_edges() {
        let mut fb = FrameBuffer::new();

        fb.fill_rect(120, 60, 20, 20, true);
        fb.fill_rect(-5, -5, 7, 7, true);

        assert_eq!(fb.count_on(), 8 * 4 + 2 * 2);
    }

    #[test]
    fn fill_rect_far_off_panel_is_clipped_first() {
        let mut fb = FrameBuffer::new();

        fb.fill_rect(i32::MIN, 0, i32::MAX, 1, true);
        fb.fill_rect(0, i32::MAX - 1, i32::MAX, i32::MAX, true);
        assert_eq!(fb.count_on(), 0);

        // ends at x = 9
        fb.fill_rect(i32::MIN + 10, 0, i32::MAX, 1, true);
        assert_eq!(fb.count_on(), 9);
        assert!(fb.pixel(8, 0));
        assert!(!fb.pixel(9, 0));
    }
}
