//! HC-SR04 ultrasonic ranging.
//!
//! The trigger pulse is sent from the main loop. Both edges of the echo line are
//! timestamped by a task on a high-priority interrupt executor and land in an
//! [`EchoCell`]; the main loop then takes finished samples out of the cell.

use core::cell::Cell;

use embassy_sync::blocking_mutex::CriticalSectionMutex;
use embassy_time::{Duration, Instant};
use portable_atomic::{AtomicBool, Ordering};

use crate::shared_constants::SPEED_OF_SOUND_M_PER_S;
use crate::timer_gate::TimerGate;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    Rising,
    Falling,
}

impl Edge {
    /// The edge that just brought the line to `level_high`.
    #[must_use]
    pub const fn from_level(level_high: bool) -> Self {
        if level_high {
            Self::Rising
        } else {
            Self::Falling
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EchoSample {
    pub rise_time: Instant,
    pub pulse_width_us: i64,
    pub distance_cm: f32,
}

#[derive(Clone, Copy)]
struct EchoTiming {
    /// Start of the pulse currently on the line.
    pending_rise: Instant,
    /// Start of the last completed pulse.
    rise_time: Instant,
    pulse_width_us: i64,
}

/// Echo timing shared by the edge handler and the main loop.
///
/// Lives in a `static`. The rise time of an in-flight pulse is kept apart from
/// the last completed pulse, which a falling edge writes as one pair inside the
/// critical section.
pub struct EchoCell {
    timing: CriticalSectionMutex<Cell<EchoTiming>>,
    ready: AtomicBool,
}

impl EchoCell {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timing: CriticalSectionMutex::new(Cell::new(EchoTiming {
                pending_rise: Instant::from_ticks(0),
                rise_time: Instant::from_ticks(0),
                pulse_width_us: 0,
            })),
            ready: AtomicBool::new(false),
        }
    }

    /// Records one edge of the echo line. Called from interrupt context.
    ///
    /// A falling edge completes a sample. A rising edge only starts the next
    /// pulse and leaves any finished sample untouched.
    pub fn on_edge(&self, edge: Edge, now: Instant) {
        self.timing.lock(|cell| {
            let mut timing = cell.get();
            match edge {
                Edge::Rising => timing.pending_rise = now,
                Edge::Falling => {
                    timing.rise_time = timing.pending_rise;
                    timing.pulse_width_us = pulse_width_us(timing.pending_rise, now);
                }
            }
            cell.set(timing);
            if edge == Edge::Falling {
                self.ready.store(true, Ordering::Release);
            }
        });
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Takes the finished sample, if any, and clears the ready flag.
    pub fn take_sample(&self) -> Option<EchoSample> {
        if !self.is_ready() {
            return None;
        }
        let timing = self.timing.lock(|cell| {
            self.ready.store(false, Ordering::Relaxed);
            cell.get()
        });
        Some(EchoSample {
            rise_time: timing.rise_time,
            pulse_width_us: timing.pulse_width_us,
            distance_cm: distance_cm(timing.pulse_width_us),
        })
    }
}

impl Default for EchoCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Signed `fall - rise` in µs.
#[must_use]
pub fn pulse_width_us(rise: Instant, fall: Instant) -> i64 {
    let to_i64 = |duration: Duration| i64::try_from(duration.as_micros()).unwrap_or(i64::MAX);
    if fall >= rise {
        to_i64(fall.saturating_duration_since(rise))
    } else {
        to_i64(rise.saturating_duration_since(fall)).saturating_neg()
    }
}

/// Distance to the reflector: the sound travels there and back.
#[must_use]
#[expect(
    clippy::cast_precision_loss,
    reason = "echo pulses last at most a few tens of milliseconds"
)]
pub fn distance_cm(pulse_width_us: i64) -> f32 {
    // µs * m/s = 1e-6 m; halved for the round trip; 1e-6 m = 1e-4 cm
    pulse_width_us as f32 * f32::from(SPEED_OF_SOUND_M_PER_S) / 2.0 / 10_000.0
}

/// Main-loop side of the ranging sketch: paces triggers and collects samples.
pub struct EchoSampler<'a> {
    cell: &'a EchoCell,
    trigger: TimerGate,
    latest: Option<EchoSample>,
}

impl<'a> EchoSampler<'a> {
    #[must_use]
    pub const fn new(cell: &'a EchoCell, period: Duration, now: Instant) -> Self {
        Self {
            cell,
            trigger: TimerGate::new(period, now),
            latest: None,
        }
    }

    /// `true` when a trigger pulse is due now.
    pub fn poll_trigger(&mut self, now: Instant) -> bool {
        self.trigger.fire(now)
    }

    /// Collects a finished sample.
    pub fn poll_sample(&mut self) -> Option<EchoSample> {
        let sample = self.cell.take_sample()?;
        info!(
            "Echo {} us, distance {} cm",
            sample.pulse_width_us,
            sample.distance_cm
        );
        self.latest = Some(sample);
        Some(sample)
    }

    #[must_use]
    pub const fn latest(&self) -> Option<EchoSample> {
        self.latest
    }
}

/// Timestamps every edge of the echo line into `cell`.
///
/// Spawn it on an `InterruptExecutor` so that the timestamps are not delayed by
/// the main loop.
#[cfg(feature = "arm")]
#[embassy_executor::task]
pub async fn echo_edge_task(
    mut echo: embassy_rp::gpio::Input<'static>,
    cell: &'static EchoCell,
) -> ! {
    loop {
        echo.wait_for_any_edge().await;
        let now = Instant::now();
        cell.on_edge(Edge::from_level(echo.is_high()), now);
    }
}
