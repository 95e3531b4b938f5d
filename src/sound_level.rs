//! Sound level from blocks of microphone ADC samples, shown on a bar of LEDs.

use embassy_time::Instant;
use heapless::{Deque, Vec};

use crate::shared_constants::{
    ADC_BAR_SCALE, BAR_LED_COUNT, DISPLAY_REFRESH_PERIOD, SOUND_SAMPLE_PERIOD,
};
use crate::timer_gate::TimerGate;

/// Summary of one block of samples.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SoundLevel {
    /// Mean absolute deviation from the block mean, in ADC counts.
    pub average: u16,
    pub peak: u16,
    /// Lit LEDs, `0..=BAR_LED_COUNT`.
    pub bars: u8,
}

impl SoundLevel {
    #[must_use]
    pub fn from_samples(samples: &[u16]) -> Self {
        let count = u32::try_from(samples.len()).unwrap_or(u32::MAX).max(1);
        let sum: u32 = samples.iter().map(|&sample| u32::from(sample)).sum();
        let mean = sum / count;
        let deviation: u32 = samples
            .iter()
            .map(|&sample| u32::from(sample).abs_diff(mean))
            .sum();
        let average = u16::try_from(deviation / count).unwrap_or(u16::MAX);
        let peak = samples.iter().copied().max().unwrap_or(0);
        Self {
            average,
            peak,
            bars: bar_count(average, peak),
        }
    }

    /// LED levels for the bar graph, lowest LED first.
    #[must_use]
    pub fn bar_levels(&self) -> [bool; BAR_LED_COUNT] {
        core::array::from_fn(|index| index < usize::from(self.bars))
    }
}

/// `average * 11 / (peak - 1)`, capped at the LED count.
#[must_use]
pub fn bar_count(average: u16, peak: u16) -> u8 {
    let divisor = u32::from(peak).saturating_sub(1).max(1);
    let bars = (u32::from(average) * ADC_BAR_SCALE / divisor)
        .min(u32::try_from(BAR_LED_COUNT).unwrap_or(u32::MAX));
    u8::try_from(bars).unwrap_or(u8::MAX)
}

/// Collects `N` samples per block and keeps the last `H` block averages.
#[derive(Clone, Debug, Default)]
pub struct SoundMeter<const N: usize, const H: usize> {
    block: Vec<u16, N>,
    history: Deque<u16, H>,
    latest: Option<SoundLevel>,
}

impl<const N: usize, const H: usize> SoundMeter<N, H> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            block: Vec::new(),
            history: Deque::new(),
            latest: None,
        }
    }

    /// Adds a sample. Returns the block summary when this sample completes a block.
    pub fn push(&mut self, sample: u16) -> Option<SoundLevel> {
        if self.block.push(sample).is_err() || !self.block.is_full() {
            return None;
        }
        let level = SoundLevel::from_samples(&self.block);
        self.block.clear();
        if self.history.is_full() {
            self.history.pop_front();
        }
        let _ = self.history.push_back(level.average);
        self.latest = Some(level);
        Some(level)
    }

    #[must_use]
    pub const fn latest(&self) -> Option<SoundLevel> {
        self.latest
    }

    /// Block averages, oldest first.
    pub fn history(&self) -> impl Iterator<Item = u16> + Clone + '_ {
        self.history.iter().copied()
    }
}

/// Paces the sound sketch: ADC sampling and display refresh.
pub struct SoundPanel<const N: usize, const H: usize> {
    meter: SoundMeter<N, H>,
    sample_gate: TimerGate,
    refresh_gate: TimerGate,
    refresh_needed: bool,
}

impl<const N: usize, const H: usize> SoundPanel<N, H> {
    #[must_use]
    pub const fn new(now: Instant) -> Self {
        Self {
            meter: SoundMeter::new(),
            sample_gate: TimerGate::new(SOUND_SAMPLE_PERIOD, now),
            refresh_gate: TimerGate::new(DISPLAY_REFRESH_PERIOD, now),
            refresh_needed: false,
        }
    }

    #[must_use]
    pub const fn meter(&self) -> &SoundMeter<N, H> {
        &self.meter
    }

    /// `true` when the next ADC sample is due.
    pub fn sample_due(&mut self, now: Instant) -> bool {
        self.sample_gate.fire(now)
    }

    pub fn on_sample(&mut self, sample: u16) -> Option<SoundLevel> {
        self.refresh_needed = true;
        let level = self.meter.push(sample)?;
        debug!("Sound level {}, peak {}, bars {}", level.average, level.peak, level.bars);
        Some(level)
    }

    /// `true` when the display should be redrawn now.
    pub fn refresh_due(&mut self, now: Instant) -> bool {
        if !self.refresh_needed || !self.refresh_gate.fire(now) {
            return false;
        }
        self.refresh_needed = false;
        true
    }
}
