//! Host-level tests for elapsed-time gates.

use embassy_time::{Duration, Instant};
use sensor_kit::TimerGate;

const PERIOD: Duration = Duration::from_millis(100);

#[test]
fn expires_once_the_period_has_elapsed() {
    let gate = TimerGate::new(PERIOD, Instant::from_millis(1_000));
    assert!(!gate.expired(Instant::from_millis(1_099)));
    assert!(gate.expired(Instant::from_millis(1_100)));
    assert!(gate.expired(Instant::from_millis(5_000)));
}

#[test]
fn checking_does_not_reset() {
    let gate = TimerGate::new(PERIOD, Instant::from_millis(0));
    let now = Instant::from_millis(150);
    assert!(gate.expired(now));
    assert!(gate.expired(now));
    assert_eq!(gate.last_fire(), Instant::from_millis(0));
}

#[test]
fn reset_restarts_the_period() {
    let mut gate = TimerGate::new(PERIOD, Instant::from_millis(0));
    gate.reset(Instant::from_millis(150));
    assert!(!gate.expired(Instant::from_millis(200)));
    assert!(gate.expired(Instant::from_millis(250)));
}

#[test]
fn fire_commits_only_when_expired() {
    let mut gate = TimerGate::new(PERIOD, Instant::from_millis(0));
    assert!(!gate.fire(Instant::from_millis(50)));
    assert_eq!(gate.last_fire(), Instant::from_millis(0));
    assert!(gate.fire(Instant::from_millis(120)));
    assert!(!gate.fire(Instant::from_millis(121)));
    assert!(gate.fire(Instant::from_millis(220)));
}

#[test]
fn time_before_the_last_reset_reads_as_zero() {
    let gate = TimerGate::new(PERIOD, Instant::from_millis(500));
    assert_eq!(gate.elapsed(Instant::from_millis(100)), Duration::from_ticks(0));
    assert!(!gate.expired(Instant::from_millis(100)));
}

#[test]
fn period_change_keeps_the_last_fire_time() {
    let mut gate = TimerGate::new(PERIOD, Instant::from_millis(0));
    gate.set_period(Duration::from_millis(10));
    assert_eq!(gate.period(), Duration::from_millis(10));
    assert!(gate.expired(Instant::from_millis(10)));
}
