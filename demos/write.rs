use ssd1306_bitbang::{DisplayBus, Ssd1306, HEIGHT, WIDTH};
use std::convert::Infallible;
use std::fmt::Write;

/// Prints every data stream the driver sends as ASCII art instead of talking to a controller.
pub struct ConsoleBus;

impl DisplayBus for ConsoleBus {
    type Error = Infallible;

    fn write(&mut self, _address: u8, _bytes: &[u8]) -> Result<(), Self::Error> {
        Ok(())
    }

    fn write_register(&mut self, _address: u8, _register: u8, ram: &[u8]) -> Result<(), Self::Error> {
        for y in 0..HEIGHT {
            let line: String = (0..WIDTH)
                .map(|x| match ram[x + (y / 8) * WIDTH] & (1 << (y & 7)) {
                    0 => ' ',
                    _ => '#',
                })
                .collect();
            println!("{}", line.trim_end());
        }
        Ok(())
    }
}

fn main() {
    let mut display = Ssd1306::new(ConsoleBus, ssd1306_bitbang::DEFAULT_ADDRESS);

    display.init().expect("Infallible cannot fail");
    writeln!(display, "Hello World").unwrap();
    display.fill_rect(0, 10, WIDTH as i32, 1, true);
    display.draw_string(0, 16, "SSD1306 over GPIO");
    display.display().expect("Infallible cannot fail");
}
