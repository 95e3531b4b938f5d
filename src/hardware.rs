//! Pin tables of the sketches. Each sketch takes exactly one of these.

use embassy_rp::adc::{self, Adc};
use embassy_rp::gpio::{self, Level, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::{I2C1, PIN_14, PIN_15};

use crate::output_array::OutputArray;
use crate::shared_constants::{BAR_LED_COUNT, DISPLAY_I2C_FREQUENCY};

pub type DisplayI2c = I2c<'static, I2C1, i2c::Blocking>;

/// DHT22 data line.
pub const DHT_PIN: u8 = 13;

/// Four-button OLED menu with a DHT22.
pub struct MenuHardware {
    /// Cancel, Up, Down, Enter on GP0..GP3, pulled up.
    pub buttons: [gpio::Input<'static>; 4],
    pub life_led: gpio::Output<'static>,
    pub dht: gpio::OutputOpenDrain<'static>,
    /// SSD1306 at 0x3C, SDA on GP14, SCL on GP15.
    pub i2c: DisplayI2c,
}

impl Default for MenuHardware {
    fn default() -> Self {
        let peripherals: embassy_rp::Peripherals =
            embassy_rp::init(embassy_rp::config::Config::default());

        let buttons = [
            gpio::Input::new(peripherals.PIN_0, Pull::Up),
            gpio::Input::new(peripherals.PIN_1, Pull::Up),
            gpio::Input::new(peripherals.PIN_2, Pull::Up),
            gpio::Input::new(peripherals.PIN_3, Pull::Up),
        ];

        let life_led = gpio::Output::new(peripherals.PIN_25, Level::Low);

        // Released: the sensor board carries the pull-up.
        let dht = gpio::OutputOpenDrain::new(peripherals.PIN_13, Level::High);

        let i2c = display_i2c(peripherals.I2C1, peripherals.PIN_15, peripherals.PIN_14);

        Self {
            buttons,
            life_led,
            dht,
            i2c,
        }
    }
}

/// HC-SR04 ranging.
pub struct EchoHardware {
    pub trigger: gpio::Output<'static>,
    pub echo: gpio::Input<'static>,
    pub led: gpio::Output<'static>,
}

impl Default for EchoHardware {
    fn default() -> Self {
        let peripherals: embassy_rp::Peripherals =
            embassy_rp::init(embassy_rp::config::Config::default());

        let trigger = gpio::Output::new(peripherals.PIN_18, Level::Low);
        let echo = gpio::Input::new(peripherals.PIN_19, Pull::Down);
        let led = gpio::Output::new(peripherals.PIN_25, Level::Low);

        Self {
            trigger,
            echo,
            led,
        }
    }
}

/// Microphone on ADC0 with a ten-LED bar graph and an OLED history plot.
pub struct SoundHardware {
    pub adc: Adc<'static, adc::Blocking>,
    pub microphone: adc::Channel<'static>,
    pub bars: OutputArray<'static, BAR_LED_COUNT>,
    pub i2c: DisplayI2c,
}

impl Default for SoundHardware {
    fn default() -> Self {
        let peripherals: embassy_rp::Peripherals =
            embassy_rp::init(embassy_rp::config::Config::default());

        let adc = Adc::new_blocking(peripherals.ADC, adc::Config::default());
        let microphone = adc::Channel::new_pin(peripherals.PIN_26, Pull::None);

        let bars = OutputArray::new([
            gpio::Output::new(peripherals.PIN_2, Level::Low),
            gpio::Output::new(peripherals.PIN_16, Level::Low),
            gpio::Output::new(peripherals.PIN_17, Level::Low),
            gpio::Output::new(peripherals.PIN_18, Level::Low),
            gpio::Output::new(peripherals.PIN_19, Level::Low),
            gpio::Output::new(peripherals.PIN_20, Level::Low),
            gpio::Output::new(peripherals.PIN_21, Level::Low),
            gpio::Output::new(peripherals.PIN_22, Level::Low),
            gpio::Output::new(peripherals.PIN_27, Level::Low),
            gpio::Output::new(peripherals.PIN_28, Level::Low),
        ]);

        let i2c = display_i2c(peripherals.I2C1, peripherals.PIN_15, peripherals.PIN_14);

        Self {
            adc,
            microphone,
            bars,
            i2c,
        }
    }
}

fn display_i2c(i2c1: I2C1, scl: PIN_15, sda: PIN_14) -> DisplayI2c {
    let mut config = i2c::Config::default();
    config.frequency = DISPLAY_I2C_FREQUENCY;
    I2c::new_blocking(i2c1, scl, sda, config)
}
