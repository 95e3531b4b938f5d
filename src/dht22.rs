//! DHT22 (AM2302) temperature and humidity sensor on a single open-drain wire.
//!
//! The host pulls the line low for a few milliseconds and releases it. The sensor
//! answers with an 80 µs low/80 µs high acknowledgement followed by 40 bits. Every
//! bit starts with a ~50 µs low; the length of the high that follows is the value
//! (~26 µs for a 0, ~70 µs for a 1). The frame is humidity (16 bits, tenths of a
//! percent), temperature (16 bits, tenths of a degree, sign in the top bit) and a
//! checksum byte equal to the low byte of the sum of the first four.
//!
//! Datasheet: <https://cdn-shop.adafruit.com/datasheets/Digital+humidity+and+temperature+sensor+AM2302.pdf>

use derive_more::derive::{Display, Error};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::clock::Clock;

// Host start signal (Tbe: 0.8 to 20 ms) and bus release (Tgo: 20 to 200 µs)
const START_LOW_MS: u32 = 10;
const RELEASE_US: u32 = 40;
// Sensor acknowledgement, Trel and Treh are 80 µs typical
const ACK_LOW_TIMEOUT_US: u64 = 100;
const ACK_HIGH_TIMEOUT_US: u64 = 100;
const ACK_END_TIMEOUT_US: u64 = 200;
// Data bits, Tlow is 50 µs typical and Th1 70 µs
const BIT_START_TIMEOUT_US: u64 = 200;
const BIT_HIGH_TIMEOUT_US: u64 = 100;
const BIT_ONE_THRESHOLD_US: u64 = 50;
const POLL_US: u32 = 10;

const FRAME_BITS: usize = 40;

/// Raw frame as received: humidity high/low, temperature high/low, checksum.
pub type Frame = [u8; 5];

#[derive(Clone, Copy, Debug, Display, Error, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DhtError {
    #[display("no sensor answered on the data line")]
    NoSensor,
    #[display("frame checksum mismatch")]
    ChecksumError,
    #[display("implausible reading")]
    NanError,
    #[display("data pin access failed")]
    Pin,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DhtReading {
    pub pin_id: u8,
    pub temperature_celsius: f32,
    pub humidity_percent: f32,
}

/// Checks and converts a received frame.
///
/// # Errors
///
/// [`DhtError::ChecksumError`] when the checksum byte does not match, and
/// [`DhtError::NanError`] when a value is NaN or the temperature is exactly 0.0 °C.
pub fn decode_frame(pin_id: u8, frame: Frame) -> Result<DhtReading, DhtError> {
    let [humidity_high, humidity_low, temperature_high, temperature_low, checksum] = frame;
    let sum = humidity_high
        .wrapping_add(humidity_low)
        .wrapping_add(temperature_high)
        .wrapping_add(temperature_low);
    if sum != checksum {
        return Err(DhtError::ChecksumError);
    }

    let humidity_percent = tenths(humidity_high, humidity_low);
    let magnitude = tenths(temperature_high & 0x7F, temperature_low);
    let temperature_celsius = if temperature_high & 0x80 == 0 {
        magnitude
    } else {
        -magnitude
    };

    // A zero temperature is what an unpowered sensor clocks out.
    let temperature_zero = temperature_high & 0x7F == 0 && temperature_low == 0;
    if temperature_zero || temperature_celsius.is_nan() || humidity_percent.is_nan() {
        return Err(DhtError::NanError);
    }

    Ok(DhtReading {
        pin_id,
        temperature_celsius,
        humidity_percent,
    })
}

fn tenths(high: u8, low: u8) -> f32 {
    f32::from(u16::from_be_bytes([high, low])) / 10.0
}

/// Bits arrive most significant first.
fn push_bit(frame: &mut Frame, index: usize, one: bool) {
    if let Some(byte) = frame.get_mut(index / 8) {
        *byte = (*byte << 1) | u8::from(one);
    }
}

const fn bit_from_high_time(high_us: u64) -> bool {
    high_us > BIT_ONE_THRESHOLD_US
}

/// Bit-banged DHT22 reader.
///
/// `pin` must be open drain: `set_high` releases the line to the pull-up and
/// `is_high` reads it back. The read blocks for about 15 ms and must run from a
/// context that is not preempted for more than a few microseconds.
pub struct Dht22<P, D, C> {
    pin_id: u8,
    pin: P,
    delay: D,
    clock: C,
    latest: Option<DhtReading>,
}

impl<P, D, C> Dht22<P, D, C>
where
    P: InputPin + OutputPin,
    D: DelayNs,
    C: Clock,
{
    #[must_use]
    pub const fn new(pin_id: u8, pin: P, delay: D, clock: C) -> Self {
        Self {
            pin_id,
            pin,
            delay,
            clock,
            latest: None,
        }
    }

    #[must_use]
    pub const fn pin_id(&self) -> u8 {
        self.pin_id
    }

    /// The last successful reading. Failed reads leave it untouched.
    #[must_use]
    pub const fn latest(&self) -> Option<DhtReading> {
        self.latest
    }

    /// Runs one complete exchange with the sensor.
    ///
    /// # Errors
    ///
    /// [`DhtError::NoSensor`] when the line does not move within its timing
    /// window, plus the errors of [`decode_frame`].
    pub fn read(&mut self) -> Result<DhtReading, DhtError> {
        let reading = decode_frame(self.pin_id, self.read_frame()?)?;
        debug!(
            "DHT22 on GP{}: {} C, {} %",
            self.pin_id,
            reading.temperature_celsius,
            reading.humidity_percent
        );
        self.latest = Some(reading);
        Ok(reading)
    }

    /// Sends the start signal and collects the 40 raw bits.
    ///
    /// # Errors
    ///
    /// [`DhtError::NoSensor`] or [`DhtError::Pin`].
    pub fn read_frame(&mut self) -> Result<Frame, DhtError> {
        self.send_start()?;
        let frame = self.receive();
        // Leave the line released whatever happened on the wire.
        self.pin.set_high().map_err(|_| DhtError::Pin)?;
        frame
    }

    fn send_start(&mut self) -> Result<(), DhtError> {
        self.pin.set_low().map_err(|_| DhtError::Pin)?;
        self.delay.delay_ms(START_LOW_MS);
        self.pin.set_high().map_err(|_| DhtError::Pin)?;
        self.delay.delay_us(RELEASE_US);
        Ok(())
    }

    fn receive(&mut self) -> Result<Frame, DhtError> {
        self.wait_for(false, ACK_LOW_TIMEOUT_US)?;
        self.wait_for(true, ACK_HIGH_TIMEOUT_US)?;
        self.wait_for(false, ACK_END_TIMEOUT_US)?;

        let mut frame = Frame::default();
        for index in 0..FRAME_BITS {
            self.wait_for(true, BIT_START_TIMEOUT_US)?;
            let high_us = self.wait_for(false, BIT_HIGH_TIMEOUT_US)?;
            push_bit(&mut frame, index, bit_from_high_time(high_us));
        }
        Ok(frame)
    }

    /// Polls until the line reads `level_high` and returns how long that took in µs.
    fn wait_for(&mut self, level_high: bool, timeout_us: u64) -> Result<u64, DhtError> {
        let start = self.clock.now();
        loop {
            let elapsed_us = self.clock.now().saturating_duration_since(start).as_micros();
            if self.pin.is_high().map_err(|_| DhtError::Pin)? == level_high {
                return Ok(elapsed_us);
            }
            if elapsed_us >= timeout_us {
                return Err(DhtError::NoSensor);
            }
            self.delay.delay_us(POLL_US);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{bit_from_high_time, push_bit, Frame};

    #[test]
    fn bits_fill_bytes_msb_first() {
        let mut frame = Frame::default();
        for (index, one) in [true, false, false, false, false, false, true, true, true]
            .into_iter()
            .enumerate()
        {
            push_bit(&mut frame, index, one);
        }
        assert_eq!(frame, [0x83, 0x01, 0, 0, 0]);
    }

    #[test]
    fn high_time_threshold() {
        assert!(!bit_from_high_time(26));
        assert!(!bit_from_high_time(50));
        assert!(bit_from_high_time(60));
        assert!(bit_from_high_time(70));
    }
}
