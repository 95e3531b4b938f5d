//! Main-loop logic of the menu sketch, free of hardware.
//!
//! Each loop iteration the sketch reads the button pins and calls
//! [`PanelController::poll`], runs a sensor read when asked to, then asks
//! [`PanelController::display`] what to show.

use embassy_time::{Duration, Instant};
use heapless::Vec;

use crate::blinker::Blinker;
use crate::debounce::{ButtonEdge, DebounceConfig, InputBank};
use crate::dht22::{DhtError, DhtReading};
use crate::menu::{
    Button, DisplayCommand, MenuConfig, MenuEntry, MenuState, OptionId, OptionSpec, Screen,
};
use crate::shared_constants::{
    DHT_ACQUISITION_PERIOD, DISPLAY_SLEEP_DELAY, LIFE_LED_OFF, LIFE_LED_ON,
};
use crate::timer_gate::TimerGate;

pub const OPTION_LIFE_LED: OptionId = OptionId(0);
pub const OPTION_SCREEN_TIMEOUT: OptionId = OptionId(1);
pub const OPTION_USE_DHT: OptionId = OptionId(2);

pub const DHT_MENU: MenuConfig = MenuConfig {
    entries: &[
        MenuEntry {
            screen: Screen::Options,
            label: "Options",
            requires: None,
        },
        MenuEntry {
            screen: Screen::Info,
            label: "Info",
            requires: Some(OPTION_USE_DHT),
        },
    ],
    options: &[
        OptionSpec {
            label: "Life LED",
            default: false,
        },
        OptionSpec {
            label: "Screen Timeout",
            default: false,
        },
        OptionSpec {
            label: "Use DHT Sensor",
            default: false,
        },
    ],
    screen_timeout: Some(OPTION_SCREEN_TIMEOUT),
    sleep_after: DISPLAY_SLEEP_DELAY,
    back_header: false,
    selector_repeat: None,
};

/// Wiring and behavior of one panel.
#[derive(Clone, Copy, Debug)]
pub struct PanelConfig<const N: usize> {
    pub menu: &'static MenuConfig,
    pub pin_ids: [u8; N],
    /// Menu button of each input channel.
    pub buttons: [Button; N],
    pub debounce: DebounceConfig,
    pub life_led_option: OptionId,
    pub life_led_on: Duration,
    pub life_led_off: Duration,
    /// Option that enables sensor reads, `None` to always read.
    pub sensor_option: Option<OptionId>,
    pub acquisition_period: Duration,
}

/// Buttons on GP0..GP3: Cancel, Up, Down, Enter.
pub const DHT_PANEL: PanelConfig<4> = PanelConfig {
    menu: &DHT_MENU,
    pin_ids: [0, 1, 2, 3],
    buttons: [Button::Cancel, Button::Up, Button::Down, Button::Enter],
    debounce: DebounceConfig::DEFAULT,
    life_led_option: OPTION_LIFE_LED,
    life_led_on: LIFE_LED_ON,
    life_led_off: LIFE_LED_OFF,
    sensor_option: Some(OPTION_USE_DHT),
    acquisition_period: DHT_ACQUISITION_PERIOD,
};

/// Result of one [`PanelController::poll`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Tick<const N: usize> {
    pub edges: Vec<ButtonEdge, N>,
    /// New life LED level, if it changed.
    pub life_led: Option<bool>,
    /// A sensor read is due.
    pub acquire: bool,
}

pub struct PanelController<const N: usize> {
    config: &'static PanelConfig<N>,
    inputs: InputBank<N>,
    menu: MenuState,
    life_led: Blinker,
    acquisition: TimerGate,
    reading: Option<DhtReading>,
    last_error: Option<DhtError>,
}

impl<const N: usize> PanelController<N> {
    #[must_use]
    pub fn new(config: &'static PanelConfig<N>, now: Instant) -> Self {
        Self {
            config,
            inputs: InputBank::new(config.pin_ids, config.debounce),
            menu: MenuState::new(config.menu, now),
            life_led: Blinker::new(config.life_led_on, config.life_led_off, now),
            acquisition: TimerGate::new(config.acquisition_period, now),
            reading: None,
            last_error: None,
        }
    }

    #[must_use]
    pub const fn menu(&self) -> &MenuState {
        &self.menu
    }

    pub const fn menu_mut(&mut self) -> &mut MenuState {
        &mut self.menu
    }

    #[must_use]
    pub const fn inputs(&self) -> &InputBank<N> {
        &self.inputs
    }

    /// Last good sensor reading. Kept across failed reads.
    #[must_use]
    pub const fn reading(&self) -> Option<DhtReading> {
        self.reading
    }

    /// Error of the last read, cleared by the next good one.
    #[must_use]
    pub const fn last_error(&self) -> Option<DhtError> {
        self.last_error
    }

    /// Runs one main-loop step. `levels[i]` is the pin level of button `i`.
    pub fn poll(&mut self, now: Instant, levels: [bool; N]) -> Tick<N> {
        let edges = self.inputs.sample_all(levels, now);
        for edge in &edges {
            let Some(&button) = self.config.buttons.get(edge.channel) else {
                continue;
            };
            if edge.pressed {
                self.menu.on_press(button, now);
            } else {
                let event = self.menu.on_release(button, now);
                info!("{} -> {}", button, event);
            }
        }
        for (&button, pressed) in self.config.buttons.iter().zip(self.inputs.pressed()) {
            if pressed && let Some(event) = self.menu.on_hold(button, now) {
                info!("{} held -> {}", button, event);
            }
        }

        let life_led = self
            .life_led
            .poll(self.menu.option(self.config.life_led_option), now);
        let sensor_enabled = self
            .config
            .sensor_option
            .is_none_or(|option| self.menu.option(option));
        let acquire = sensor_enabled && self.acquisition.fire(now);

        Tick {
            edges,
            life_led,
            acquire,
        }
    }

    /// Stores the outcome of a sensor read.
    pub fn on_reading(&mut self, result: Result<DhtReading, DhtError>) {
        match result {
            Ok(reading) => {
                self.reading = Some(reading);
                self.last_error = None;
                if self.menu.current_screen() == Screen::Info {
                    self.menu.request_redraw();
                }
            }
            Err(err) => {
                warn!("DHT22 read failed: {}", err);
                self.last_error = Some(err);
            }
        }
    }

    pub fn display(&mut self, now: Instant) -> DisplayCommand {
        self.menu.poll_display(now)
    }
}
