//! Host-level tests for the DHT22 reader, driven by a simulated sensor.
//!
//! The simulated pin, delay and clock share one bus. Delays advance the bus
//! time, and the line level is computed from how long ago the host released it.

use core::cell::Cell;
use core::convert::Infallible;
use std::rc::Rc;

use embassy_time::Instant;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use sensor_kit::dht22::{Frame, decode_frame};
use sensor_kit::{Clock, Dht22, DhtError, DhtReading};

/// The worked example of the datasheet: 65.2 %RH, 16.6 °C.
const DATASHEET_FRAME: Frame = [0x02, 0x8C, 0x00, 0xA6, 0x34];
const PIN: u8 = 13;

#[derive(Default)]
struct Bus {
    now_us: Cell<u64>,
    host_low: Cell<bool>,
    released_at: Cell<Option<u64>>,
    frame: Cell<Option<Frame>>,
    /// Line freezes at `level` from `at` µs after release.
    stuck: Cell<Option<Stuck>>,
}

#[derive(Clone, Copy)]
struct Stuck {
    at: u64,
    level: bool,
}

impl Bus {
    fn level(&self) -> bool {
        if self.host_low.get() {
            return false;
        }
        match (self.released_at.get(), self.frame.get()) {
            (Some(released_at), Some(frame)) => {
                let t = self.now_us.get() - released_at;
                match self.stuck.get() {
                    Some(stuck) if t >= stuck.at => stuck.level,
                    _ => sensor_level(&frame, t),
                }
            }
            _ => true,
        }
    }
}

/// Level the sensor puts on the line `t` µs after the host released it.
fn sensor_level(frame: &Frame, mut t: u64) -> bool {
    let bits = frame
        .iter()
        .flat_map(|&byte| (0..8).rev().map(move |shift| (byte >> shift) & 1 == 1));
    let segments = [(true, 20), (false, 80), (true, 80)]
        .into_iter()
        .chain(bits.flat_map(|one| [(false, 50), (true, if one { 70 } else { 26 })]))
        .chain([(false, 50)]);
    for (level, duration) in segments {
        if t < duration {
            return level;
        }
        t -= duration;
    }
    true
}

struct SimPin(Rc<Bus>);

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.host_low.set(true);
        self.0.released_at.set(None);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        if self.0.host_low.replace(false) {
            self.0.released_at.set(Some(self.0.now_us.get()));
        }
        Ok(())
    }
}

impl InputPin for SimPin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.level())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.0.level())
    }
}

struct SimDelay(Rc<Bus>);

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        let now = self.0.now_us.get();
        self.0.now_us.set(now + u64::from(ns.div_ceil(1_000)));
    }
}

struct SimClock(Rc<Bus>);

impl Clock for SimClock {
    fn now(&self) -> Instant {
        Instant::from_micros(self.0.now_us.get())
    }
}

type SimDht = Dht22<SimPin, SimDelay, SimClock>;

fn sensor(frame: Option<Frame>) -> (Rc<Bus>, SimDht) {
    let bus = Rc::new(Bus::default());
    bus.now_us.set(1_000);
    bus.frame.set(frame);
    let dht = Dht22::new(
        PIN,
        SimPin(Rc::clone(&bus)),
        SimDelay(Rc::clone(&bus)),
        SimClock(Rc::clone(&bus)),
    );
    (bus, dht)
}

fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-4,
        "expected {expected}, got {actual}"
    );
}

fn with_checksum(data: [u8; 4]) -> Frame {
    let sum = data.iter().fold(0u8, |sum, &byte| sum.wrapping_add(byte));
    [data[0], data[1], data[2], data[3], sum]
}

#[test]
fn decodes_the_datasheet_example() {
    let reading = decode_frame(PIN, DATASHEET_FRAME).expect("valid frame");
    assert_eq!(reading.pin_id, PIN);
    assert_close(reading.humidity_percent, 65.2);
    assert_close(reading.temperature_celsius, 16.6);
}

#[test]
fn top_temperature_bit_is_the_sign() {
    let reading = decode_frame(PIN, with_checksum([0x02, 0x8C, 0x80, 0x65])).expect("valid frame");
    assert_close(reading.temperature_celsius, -10.1);
}

#[test]
fn checksum_is_the_low_byte_of_the_sum() {
    // 0x80 + 0x80 + 0x01 + 0x00 overflows a byte
    let reading = decode_frame(PIN, [0x80, 0x80, 0x01, 0x00, 0x01]);
    assert!(reading.is_ok());

    let mut corrupt = DATASHEET_FRAME;
    corrupt[4] ^= 0x01;
    assert_eq!(decode_frame(PIN, corrupt), Err(DhtError::ChecksumError));
}

#[test]
fn zero_temperature_is_rejected() {
    assert_eq!(
        decode_frame(PIN, with_checksum([0x02, 0x8C, 0x00, 0x00])),
        Err(DhtError::NanError)
    );
    assert_eq!(
        decode_frame(PIN, with_checksum([0x02, 0x8C, 0x80, 0x00])),
        Err(DhtError::NanError)
    );
}

#[test]
fn reads_a_frame_off_the_wire() {
    let (bus, mut dht) = sensor(Some(DATASHEET_FRAME));
    assert_eq!(dht.read_frame(), Ok(DATASHEET_FRAME));
    assert!(!bus.host_low.get(), "line must be released after a read");
}

#[test]
fn read_updates_the_cached_reading() {
    let (_bus, mut dht) = sensor(Some(DATASHEET_FRAME));
    assert_eq!(dht.latest(), None);

    let reading = dht.read().expect("sensor present");
    assert_close(reading.humidity_percent, 65.2);
    assert_close(reading.temperature_celsius, 16.6);
    assert_eq!(dht.latest(), Some(reading));
}

#[test]
fn start_signal_holds_the_line_low_for_10ms() {
    let (bus, mut dht) = sensor(Some(DATASHEET_FRAME));
    let start = bus.now_us.get();
    dht.read().expect("sensor present");
    // 10 ms start, 40 µs release, then about 4 ms of response and data
    let elapsed = bus.now_us.get() - start;
    assert!((10_040..16_000).contains(&elapsed), "read took {elapsed} µs");
}

#[test]
fn silent_line_reports_no_sensor() {
    let (bus, mut dht) = sensor(None);
    assert_eq!(dht.read(), Err(DhtError::NoSensor));
    assert_eq!(dht.latest(), None);
    assert!(!bus.host_low.get());
}

/// A good read, then a read that fails on a line frozen as described.
fn assert_stuck_line_fails(stuck: Stuck) {
    let (bus, mut dht) = sensor(Some(DATASHEET_FRAME));
    let good = dht.read().expect("sensor present");

    bus.stuck.set(Some(stuck));
    assert_eq!(dht.read(), Err(DhtError::NoSensor));
    assert_eq!(dht.latest(), Some(good));
    assert!(!bus.host_low.get(), "line must be released after a failed read");
}

#[test]
fn ack_that_never_goes_high_reports_no_sensor() {
    // The acknowledgement low starts 20 µs after release.
    assert_stuck_line_fails(Stuck {
        at: 20,
        level: false,
    });
}

#[test]
fn ack_that_never_ends_reports_no_sensor() {
    // The acknowledgement high starts at 100 µs.
    assert_stuck_line_fails(Stuck {
        at: 120,
        level: true,
    });
}

#[test]
fn line_stuck_high_mid_frame_reports_no_sensor() {
    // Data bits start at 180 µs; 1 ms falls in the humidity low byte.
    assert_stuck_line_fails(Stuck {
        at: 1_000,
        level: true,
    });
}

#[test]
fn line_stuck_low_mid_frame_reports_no_sensor() {
    assert_stuck_line_fails(Stuck {
        at: 2_000,
        level: false,
    });
}

#[test]
fn failed_read_keeps_the_previous_reading() {
    let (bus, mut dht) = sensor(Some(DATASHEET_FRAME));
    let good: DhtReading = dht.read().expect("sensor present");

    let mut corrupt = DATASHEET_FRAME;
    corrupt[4] = 0x00;
    bus.frame.set(Some(corrupt));
    assert_eq!(dht.read(), Err(DhtError::ChecksumError));
    assert_eq!(dht.latest(), Some(good));

    bus.frame.set(None);
    assert_eq!(dht.read(), Err(DhtError::NoSensor));
    assert_eq!(dht.latest(), Some(good));
}
