//! Source of "now" for code that busy-waits on a pin.

use embassy_time::Instant;

/// A monotonic microsecond clock.
///
/// Blocking protocol code asks a `Clock` instead of calling `Instant::now()` so
/// that a test can drive it from a simulated bus.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// The embassy time driver.
#[cfg(feature = "arm")]
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

#[cfg(feature = "arm")]
impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
