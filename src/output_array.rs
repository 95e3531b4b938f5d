use embassy_rp::gpio::{self, Level};

/// A row of push-pull outputs driven together, such as an LED bar graph.
pub struct OutputArray<'a, const N: usize>([gpio::Output<'a>; N]);

impl<'a, const N: usize> OutputArray<'a, N> {
    #[must_use]
    pub const fn new(outputs: [gpio::Output<'a>; N]) -> Self {
        Self(outputs)
    }

    /// `levels[i]` drives output `i`; `true` is high.
    #[inline]
    pub fn set_levels(&mut self, levels: [bool; N]) {
        for (output, level) in self.0.iter_mut().zip(levels) {
            output.set_level(Level::from(level));
        }
    }

    #[inline]
    pub fn set_all(&mut self, level: Level) {
        for output in &mut self.0 {
            output.set_level(level);
        }
    }
}
