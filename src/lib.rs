//! Building blocks of the Raspberry Pi Pico sensor sketches: debounced buttons,
//! timer gates, a DHT22 reader, HC-SR04 echo timing, a sound level meter and a
//! small OLED menu.
//!
//! Everything outside `hardware`, `oled` and `output_array` is plain logic fed
//! with pin levels and timestamps, and is tested on the host.
#![cfg_attr(not(test), no_std)]

#[cfg(all(feature = "arm", not(any(feature = "pico1", feature = "pico2"))))]
compile_error!("the `arm` feature needs a board: enable `pico1` or `pico2`");

// Must come first: the logging macros are textually scoped.
mod fmt;

pub mod blinker;
pub mod clock;
pub mod controller;
pub mod debounce;
pub mod dht22;
pub mod echo;
mod error;
#[cfg(feature = "arm")]
pub mod hardware;
pub mod menu;
#[cfg(feature = "arm")]
pub mod oled;
#[cfg(feature = "arm")]
mod output_array;
mod shared_constants;
pub mod sound_level;
pub mod timer_gate;

// Re-export commonly used items
pub use blinker::{BlinkState, Blinker};
#[cfg(feature = "arm")]
pub use clock::SystemClock;
pub use clock::Clock;
pub use controller::{PanelConfig, PanelController, Tick, DHT_MENU, DHT_PANEL};
pub use debounce::{ButtonEdge, DebounceConfig, InputBank, InputChannel, Polarity};
pub use dht22::{Dht22, DhtError, DhtReading};
pub use echo::{EchoCell, EchoSample, EchoSampler, Edge};
pub use error::{Error, Result};
pub use menu::{Button, DisplayCommand, MenuConfig, MenuEvent, MenuState, Redraw, Screen};
#[cfg(feature = "arm")]
pub use output_array::OutputArray;
pub use shared_constants::*;
pub use sound_level::{SoundLevel, SoundMeter, SoundPanel};
pub use timer_gate::TimerGate;
