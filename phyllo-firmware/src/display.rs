//! OLED status display
//!
//! Renders the status screen on a 128x64 SSD1306 over I2C using the
//! buffered graphics mode: draw into RAM, flush once per update.

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::Text;
use esp_hal::i2c::master::I2c;
use esp_hal::Async;
use ssd1306::mode::BufferedGraphicsModeAsync;
use ssd1306::prelude::*;
use ssd1306::{I2CDisplayInterface, Ssd1306Async};

use phyllo_core::screen::StatusScreen;
use phyllo_core::traits::{DisplayError, StatusDisplay};

/// Character cells per row at the 6x10 font
const COLS: usize = 21;

/// Pixel rows per text line; one blank row between lines
const LINE_PITCH: i32 = 14;

type Driver = Ssd1306Async<
    I2CInterface<I2c<'static, Async>>,
    DisplaySize128x64,
    BufferedGraphicsModeAsync<DisplaySize128x64>,
>;

/// SSD1306 status surface
pub struct Oled {
    driver: Driver,
}

impl Oled {
    /// Initialize the display over the given I2C bus
    pub async fn new(i2c: I2c<'static, Async>) -> Result<Self, DisplayError> {
        let interface = I2CDisplayInterface::new(i2c);
        let mut driver = Ssd1306Async::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();
        driver.init().await.map_err(|_| DisplayError::Bus)?;
        Ok(Self { driver })
    }
}

impl StatusDisplay for Oled {
    async fn render(&mut self, screen: &StatusScreen) -> Result<(), DisplayError> {
        self.driver.clear_buffer();

        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        let mut y = 10;
        for line in screen.lines() {
            // Wrap long lines onto the remaining rows rather than clipping
            let mut rest = line;
            loop {
                let cut = cols_bytes(rest);
                let (head, tail) = rest.split_at(cut);
                Text::new(head, Point::new(0, y), style)
                    .draw(&mut self.driver)
                    .ok();
                y += LINE_PITCH;
                rest = tail;
                if rest.is_empty() || y >= 64 {
                    break;
                }
            }
            if y >= 64 {
                break;
            }
        }

        self.driver.flush().await.map_err(|_| DisplayError::Bus)
    }
}

/// Byte length of the first `COLS` characters of `text`
fn cols_bytes(text: &str) -> usize {
    text.char_indices()
        .nth(COLS)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}
