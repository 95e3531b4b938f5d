//! Host-level tests for the sound level meter.

use embassy_time::Instant;
use sensor_kit::sound_level::bar_count;
use sensor_kit::{SoundLevel, SoundMeter, SoundPanel};

#[test]
fn steady_signal_has_no_level() {
    let level = SoundLevel::from_samples(&[2_000; 100]);
    assert_eq!(
        level,
        SoundLevel {
            average: 0,
            peak: 2_000,
            bars: 0
        }
    );
}

#[test]
fn square_wave_level_is_its_amplitude() {
    let samples: Vec<u16> = (0..100)
        .map(|index| if index % 2 == 0 { 1_000 } else { 3_000 })
        .collect();
    let level = SoundLevel::from_samples(&samples);
    assert_eq!(level.average, 1_000);
    assert_eq!(level.peak, 3_000);
    // 1000 * 11 / 2999
    assert_eq!(level.bars, 3);
}

#[test]
fn bar_count_is_capped_and_never_divides_by_zero() {
    assert_eq!(bar_count(5_000, 100), 10);
    assert_eq!(bar_count(0, 0), 0);
    assert_eq!(bar_count(3, 1), 10);
    assert_eq!(bar_count(100, 1_101), 1);
}

#[test]
fn bar_levels_light_from_the_bottom() {
    let level = SoundLevel {
        average: 0,
        peak: 0,
        bars: 3,
    };
    assert_eq!(
        level.bar_levels(),
        [true, true, true, false, false, false, false, false, false, false]
    );
}

#[test]
fn meter_reports_once_per_block() {
    let mut meter = SoundMeter::<4, 3>::new();
    assert_eq!(meter.push(10), None);
    assert_eq!(meter.push(30), None);
    assert_eq!(meter.push(10), None);
    let level = meter.push(30).expect("block complete");
    assert_eq!(level.average, 10);
    assert_eq!(meter.latest(), Some(level));
    assert_eq!(meter.push(10), None);
}

#[test]
fn history_keeps_the_most_recent_blocks() {
    let mut meter = SoundMeter::<2, 3>::new();
    for amplitude in [1, 2, 3, 4, 5] {
        meter.push(100 - amplitude);
        meter.push(100 + amplitude);
    }
    assert_eq!(meter.history().collect::<Vec<_>>(), [3, 4, 5]);
}

#[test]
fn panel_paces_sampling_and_refresh() {
    let mut panel = SoundPanel::<2, 4>::new(Instant::from_micros(0));
    assert!(!panel.sample_due(Instant::from_micros(50)));
    assert!(panel.sample_due(Instant::from_micros(100)));
    assert!(!panel.sample_due(Instant::from_micros(150)));

    // Nothing new to show yet.
    assert!(!panel.refresh_due(Instant::from_millis(100)));

    assert_eq!(panel.on_sample(900), None);
    assert!(panel.on_sample(1_100).is_some());
    assert!(panel.refresh_due(Instant::from_millis(200)));
    assert!(!panel.refresh_due(Instant::from_millis(300)));
    assert_eq!(panel.meter().history().collect::<Vec<_>>(), [100]);
}
