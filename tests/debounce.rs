//! Host-level tests for the integrating button filter.

use embassy_time::Instant;
use sensor_kit::{ButtonEdge, DebounceConfig, InputBank, InputChannel, Polarity};

const CONFIG: DebounceConfig = DebounceConfig::DEFAULT;
const PRESSED: bool = false;
const RELEASED: bool = true;

/// The `n`-th sample slot, one filter interval apart.
fn slot(n: u64) -> Instant {
    Instant::from_millis(30 * n)
}

#[test]
fn default_filter_is_active_low_30ms_coefficient_4() {
    assert_eq!(CONFIG.interval.as_millis(), 30);
    assert_eq!(CONFIG.coefficient, 4);
    assert_eq!(CONFIG.polarity, Polarity::ActiveLow);
}

#[test]
fn press_is_reported_on_the_fourth_agreeing_sample() {
    let mut channel = InputChannel::new(0);
    assert_eq!(channel.sample(PRESSED, slot(1), &CONFIG), None);
    assert_eq!(channel.sample(PRESSED, slot(2), &CONFIG), None);
    assert_eq!(channel.sample(PRESSED, slot(3), &CONFIG), None);
    assert!(!channel.is_pressed());
    assert_eq!(channel.sample(PRESSED, slot(4), &CONFIG), Some(true));
    assert!(channel.is_pressed());
    assert_eq!(channel.integrator(), 4);
}

#[test]
fn integrator_saturates_and_reports_once() {
    let mut channel = InputChannel::new(0);
    let edges: Vec<_> = (1..=10)
        .filter_map(|n| channel.sample(PRESSED, slot(n), &CONFIG))
        .collect();
    assert_eq!(edges, [true]);
    assert_eq!(channel.integrator(), CONFIG.coefficient);
}

#[test]
fn isolated_glitches_never_flip_the_state() {
    let mut channel = InputChannel::new(0);

    // Released line with a single noisy sample
    assert_eq!(channel.sample(PRESSED, slot(1), &CONFIG), None);
    assert_eq!(channel.sample(RELEASED, slot(2), &CONFIG), None);
    assert_eq!(channel.integrator(), 0);
    assert!(!channel.is_pressed());

    // Pressed line with a single noisy sample
    for n in 3..=6 {
        channel.sample(PRESSED, slot(n), &CONFIG);
    }
    assert!(channel.is_pressed());
    assert_eq!(channel.sample(RELEASED, slot(7), &CONFIG), None);
    assert_eq!(channel.sample(PRESSED, slot(8), &CONFIG), None);
    assert!(channel.is_pressed());
}

#[test]
fn release_waits_for_the_integrator_to_drain() {
    let mut channel = InputChannel::new(0);
    for n in 1..=4 {
        channel.sample(PRESSED, slot(n), &CONFIG);
    }
    assert_eq!(channel.sample(RELEASED, slot(5), &CONFIG), None);
    assert_eq!(channel.sample(RELEASED, slot(6), &CONFIG), None);
    assert_eq!(channel.sample(RELEASED, slot(7), &CONFIG), None);
    assert_eq!(channel.sample(RELEASED, slot(8), &CONFIG), Some(false));
    assert_eq!(channel.integrator(), 0);
}

#[test]
fn samples_inside_the_interval_are_ignored() {
    let mut channel = InputChannel::new(0);
    channel.sample(PRESSED, slot(1), &CONFIG);
    assert_eq!(channel.integrator(), 1);

    assert_eq!(
        channel.sample(RELEASED, slot(1) + embassy_time::Duration::from_millis(29), &CONFIG),
        None
    );
    assert_eq!(channel.integrator(), 1);
    assert_eq!(channel.raw_sample(), PRESSED);

    channel.sample(PRESSED, slot(2), &CONFIG);
    assert_eq!(channel.integrator(), 2);
}

#[test]
fn first_sample_needs_one_interval_after_boot() {
    let mut channel = InputChannel::new(0);
    channel.sample(PRESSED, Instant::from_millis(10), &CONFIG);
    assert_eq!(channel.integrator(), 0);
}

#[test]
fn active_high_inputs_press_on_high_level() {
    let config = DebounceConfig {
        polarity: Polarity::ActiveHigh,
        ..CONFIG
    };
    let mut channel = InputChannel::new(5);
    let edges: Vec<_> = (1..=4)
        .filter_map(|n| channel.sample(true, slot(n), &config))
        .collect();
    assert_eq!(edges, [true]);
    assert_eq!(channel.pin_id(), 5);
}

#[test]
fn bank_reports_edges_in_channel_order() {
    let mut bank = InputBank::new([0, 1, 2], CONFIG);
    let levels = [PRESSED, RELEASED, PRESSED];

    for n in 1..=3 {
        assert!(bank.sample_all(levels, slot(n)).is_empty());
    }
    let edges = bank.sample_all(levels, slot(4));
    assert_eq!(
        edges.as_slice(),
        [
            ButtonEdge {
                channel: 0,
                pressed: true
            },
            ButtonEdge {
                channel: 2,
                pressed: true
            },
        ]
    );
    assert_eq!(bank.pressed(), [true, false, true]);
    assert_eq!(bank.channel(2).map(InputChannel::pin_id), Some(2));
    assert!(bank.channel(3).is_none());
}
