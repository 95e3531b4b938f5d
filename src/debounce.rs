//! Integrating debounce filter for polled buttons.
//!
//! Each channel keeps a small saturating counter. A sample that reads "pressed"
//! counts up, any other sample counts down. The debounced state turns on when the
//! counter reaches the coefficient and turns off when it drains back to zero, so a
//! lone glitch moves the counter by one step and never flips the state.

use embassy_time::{Duration, Instant};
use heapless::Vec;

use crate::shared_constants::{BUTTON_FILTER_COEFFICIENT, BUTTON_FILTER_INTERVAL};

/// Which electrical level counts as "pressed".
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Pull-up input, switch to ground.
    #[default]
    ActiveLow,
    ActiveHigh,
}

impl Polarity {
    #[must_use]
    pub const fn is_pressed(self, level_high: bool) -> bool {
        match self {
            Self::ActiveLow => !level_high,
            Self::ActiveHigh => level_high,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DebounceConfig {
    /// Minimum time between two samples of the same channel.
    pub interval: Duration,
    /// Number of agreeing samples needed to reach the pressed state.
    pub coefficient: u8,
    pub polarity: Polarity,
}

impl DebounceConfig {
    pub const DEFAULT: Self = Self {
        interval: BUTTON_FILTER_INTERVAL,
        coefficient: BUTTON_FILTER_COEFFICIENT,
        polarity: Polarity::ActiveLow,
    };
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A debounced state change of one channel of an [`InputBank`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonEdge {
    pub channel: usize,
    pub pressed: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputChannel {
    pin_id: u8,
    raw_sample: bool,
    integrator: u8,
    debounced_state: bool,
    previous_state: bool,
    last_sample_time: Instant,
}

impl InputChannel {
    #[must_use]
    pub const fn new(pin_id: u8) -> Self {
        Self {
            pin_id,
            raw_sample: false,
            integrator: 0,
            debounced_state: false,
            previous_state: false,
            last_sample_time: Instant::from_ticks(0),
        }
    }

    #[must_use]
    pub const fn pin_id(&self) -> u8 {
        self.pin_id
    }

    /// Last electrical level sampled (`true` is high).
    #[must_use]
    pub const fn raw_sample(&self) -> bool {
        self.raw_sample
    }

    #[must_use]
    pub const fn integrator(&self) -> u8 {
        self.integrator
    }

    #[must_use]
    pub const fn is_pressed(&self) -> bool {
        self.debounced_state
    }

    /// Feeds one reading of the pin.
    ///
    /// Readings arriving less than `config.interval` after the last accepted one
    /// are ignored. Returns the new debounced state when it changed.
    pub fn sample(
        &mut self,
        level_high: bool,
        now: Instant,
        config: &DebounceConfig,
    ) -> Option<bool> {
        if now.saturating_duration_since(self.last_sample_time) < config.interval {
            return None;
        }
        self.last_sample_time = now;
        self.raw_sample = level_high;

        if config.polarity.is_pressed(level_high) {
            self.integrator = self.integrator.saturating_add(1).min(config.coefficient);
            if self.integrator == config.coefficient {
                self.debounced_state = true;
            }
        } else {
            self.integrator = self.integrator.saturating_sub(1);
            if self.integrator == 0 {
                self.debounced_state = false;
            }
        }

        if self.debounced_state == self.previous_state {
            return None;
        }
        self.previous_state = self.debounced_state;
        Some(self.debounced_state)
    }
}

/// A fixed set of buttons sampled together from the main loop.
#[derive(Clone, Debug)]
pub struct InputBank<const N: usize> {
    channels: [InputChannel; N],
    config: DebounceConfig,
}

impl<const N: usize> InputBank<N> {
    #[must_use]
    pub fn new(pin_ids: [u8; N], config: DebounceConfig) -> Self {
        Self {
            channels: pin_ids.map(InputChannel::new),
            config,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &DebounceConfig {
        &self.config
    }

    #[must_use]
    pub const fn channels(&self) -> &[InputChannel; N] {
        &self.channels
    }

    #[must_use]
    pub fn channel(&self, index: usize) -> Option<&InputChannel> {
        self.channels.get(index)
    }

    /// Debounced "pressed" state of every channel.
    #[must_use]
    pub fn pressed(&self) -> [bool; N] {
        self.channels.map(|channel| channel.is_pressed())
    }

    /// Samples every channel with `levels[i]` as the pin level of channel `i`.
    ///
    /// Returns the debounced edges in channel order.
    pub fn sample_all(&mut self, levels: [bool; N], now: Instant) -> Vec<ButtonEdge, N> {
        let mut edges = Vec::new();
        for (channel, (input, level_high)) in self.channels.iter_mut().zip(levels).enumerate() {
            if let Some(pressed) = input.sample(level_high, now, &self.config) {
                // At most one edge per channel, so the vector cannot overflow.
                let _ = edges.push(ButtonEdge { channel, pressed });
            }
        }
        edges
    }
}
