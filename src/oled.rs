//! SSD1306 128x64 OLED renderer for the menu and the sound history plot.

use core::fmt::Write;

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::{MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle};
use embedded_graphics::text::{Baseline, Text};
use heapless::String;
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::{I2CDisplayInterface, Ssd1306};

use crate::dht22::DhtReading;
use crate::menu::{MenuState, Redraw, Screen, BACK_HEADER};
use crate::sound_level::SoundLevel;
use crate::{Error, Result};

const LINE_HEIGHT: i32 = 10;
const WIDTH: i32 = 128;
const HEIGHT: i32 = 64;

type Display<I2C> =
    Ssd1306<I2CInterface<I2C>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

type Line32 = String<32>;

pub struct Oled<I2C> {
    display: Display<I2C>,
}

impl<I2C> Oled<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    /// Initializes the panel at address 0x3C and blanks it.
    ///
    /// # Errors
    ///
    /// [`Error::Display`] when the panel does not acknowledge.
    pub fn new(i2c: I2C) -> Result<Self> {
        let interface = I2CDisplayInterface::new(i2c);
        let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();
        display.init().map_err(|_| Error::Display)?;
        display.clear_buffer();
        display.flush().map_err(|_| Error::Display)?;
        Ok(Self { display })
    }

    /// Blanks the panel and turns it off.
    ///
    /// # Errors
    ///
    /// [`Error::Display`] on an I2C failure.
    pub fn sleep(&mut self) -> Result<()> {
        self.display.clear_buffer();
        self.display.flush().map_err(|_| Error::Display)?;
        self.display.set_display_on(false).map_err(|_| Error::Display)
    }

    /// # Errors
    ///
    /// [`Error::Display`] on an I2C failure.
    pub fn wake(&mut self) -> Result<()> {
        self.display.set_display_on(true).map_err(|_| Error::Display)
    }

    /// Draws the screen described by `redraw`.
    ///
    /// # Errors
    ///
    /// [`Error::Display`] on an I2C failure.
    pub fn draw_menu(
        &mut self,
        redraw: &Redraw,
        menu: &MenuState,
        reading: Option<DhtReading>,
    ) -> Result<()> {
        let config = menu.config();
        self.display.clear_buffer();
        let mut row = 0;

        let title = match redraw.screen {
            Screen::Main => "Main Menu",
            Screen::Options => "Options",
            Screen::Info => "DHT22",
        };
        self.text(title, 0, row)?;
        row += 1;

        if config.back_header && redraw.screen != Screen::Main {
            self.item("< Back", redraw.selector == BACK_HEADER, row)?;
            row += 1;
        }

        match redraw.screen {
            Screen::Main => {
                for (index, entry) in config.entries.iter().enumerate() {
                    self.item(entry.label, is_selected(redraw.selector, index), row)?;
                    row += 1;
                }
            }
            Screen::Options => {
                for (index, (option, &enabled)) in
                    config.options.iter().zip(menu.options()).enumerate()
                {
                    let mut line = Line32::new();
                    let mark = if enabled { 'x' } else { ' ' };
                    write!(line, "[{mark}] {}", option.label).map_err(|_| Error::Display)?;
                    self.item(&line, is_selected(redraw.selector, index), row)?;
                    row += 1;
                }
            }
            Screen::Info => {
                if let Some(reading) = reading {
                    let mut line = Line32::new();
                    write!(line, "T: {:.1} C", reading.temperature_celsius)
                        .map_err(|_| Error::Display)?;
                    self.text(&line, 0, row)?;
                    line.clear();
                    write!(line, "H: {:.1} %", reading.humidity_percent)
                        .map_err(|_| Error::Display)?;
                    self.text(&line, 0, row + 1)?;
                } else {
                    self.text("Waiting for sensor", 0, row)?;
                }
            }
        }

        if let Some(option) = redraw.blocked
            && let Some(toggle) = config.options.get(option.0)
        {
            let mut line = Line32::new();
            write!(line, "Enable {}", toggle.label).map_err(|_| Error::Display)?;
            self.text(&line, 0, HEIGHT / LINE_HEIGHT - 1)?;
        }

        self.display.flush().map_err(|_| Error::Display)
    }

    /// Plots block averages as vertical lines, newest on the right, with the
    /// latest level in the top row.
    ///
    /// # Errors
    ///
    /// [`Error::Display`] on an I2C failure.
    pub fn draw_history(
        &mut self,
        history: impl Iterator<Item = u16> + Clone,
        level: Option<SoundLevel>,
    ) -> Result<()> {
        self.display.clear_buffer();

        if let Some(level) = level {
            let mut line = Line32::new();
            write!(line, "Lvl {} Pk {} #{}", level.average, level.peak, level.bars)
                .map_err(|_| Error::Display)?;
            self.text(&line, 0, 0)?;
        }

        let scale = i32::from(history.clone().max().unwrap_or(0).max(1));
        let plot_height = HEIGHT - LINE_HEIGHT;
        let style = PrimitiveStyle::with_stroke(BinaryColor::On, 1);
        let bar_width = WIDTH / 64;
        for (column, value) in (0..).zip(history) {
            let height = i32::from(value) * plot_height / scale;
            let x = column * bar_width;
            Line::new(Point::new(x, HEIGHT - 1), Point::new(x, HEIGHT - 1 - height))
                .into_styled(style)
                .draw(&mut self.display)
                .map_err(|_| Error::Display)?;
        }

        self.display.flush().map_err(|_| Error::Display)
    }

    fn item(&mut self, label: &str, selected: bool, row: i32) -> Result<()> {
        if selected {
            self.text(">", 0, row)?;
        }
        self.text(label, 8, row)
    }

    fn text(&mut self, text: &str, x: i32, row: i32) -> Result<()> {
        Text::with_baseline(
            text,
            Point::new(x, row * LINE_HEIGHT),
            text_style(),
            Baseline::Top,
        )
        .draw(&mut self.display)
        .map_err(|_| Error::Display)?;
        Ok(())
    }
}

fn is_selected(selector: i8, index: usize) -> bool {
    usize::try_from(selector).is_ok_and(|selected| selected == index)
}

fn text_style() -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyleBuilder::new()
        .font(&FONT_6X10)
        .text_color(BinaryColor::On)
        .build()
}
