use embassy_time::{Duration, Instant};

use crate::shared_constants::{LIFE_LED_OFF, LIFE_LED_ON};
use crate::timer_gate::TimerGate;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BlinkState {
    #[default]
    Disabled,
    BlinkingAndOn,
    BlinkingButOff,
}

/// Heartbeat LED: a short flash, then a long pause, while enabled.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Blinker {
    state: BlinkState,
    on_time: Duration,
    off_time: Duration,
    gate: TimerGate,
}

impl Blinker {
    #[must_use]
    pub const fn new(on_time: Duration, off_time: Duration, now: Instant) -> Self {
        Self {
            state: BlinkState::Disabled,
            on_time,
            off_time,
            gate: TimerGate::new(off_time, now),
        }
    }

    /// A blinker with the life LED timings.
    #[must_use]
    pub const fn life_led(now: Instant) -> Self {
        Self::new(LIFE_LED_ON, LIFE_LED_OFF, now)
    }

    #[must_use]
    pub const fn state(&self) -> BlinkState {
        self.state
    }

    #[must_use]
    pub const fn is_lit(&self) -> bool {
        matches!(self.state, BlinkState::BlinkingAndOn)
    }

    /// Advances the blink pattern. Returns the new LED level when it changes.
    ///
    /// Disabling turns the LED off at once. Enabling again lights it on the first
    /// poll after the off time has run out.
    pub fn poll(&mut self, enabled: bool, now: Instant) -> Option<bool> {
        let next = match (enabled, self.state) {
            (false, BlinkState::Disabled) => return None,
            (false, BlinkState::BlinkingAndOn) => BlinkState::Disabled,
            (false, BlinkState::BlinkingButOff) => {
                self.state = BlinkState::Disabled;
                return None;
            }
            (true, BlinkState::Disabled | BlinkState::BlinkingButOff) => {
                self.gate.set_period(self.off_time);
                if !self.gate.fire(now) {
                    self.state = BlinkState::BlinkingButOff;
                    return None;
                }
                self.gate.set_period(self.on_time);
                BlinkState::BlinkingAndOn
            }
            (true, BlinkState::BlinkingAndOn) => {
                if !self.gate.fire(now) {
                    return None;
                }
                self.gate.set_period(self.off_time);
                BlinkState::BlinkingButOff
            }
        };
        self.state = next;
        Some(self.is_lit())
    }
}
