//! Menu navigation and display power for a four-button OLED panel.
//!
//! The menu is data: a [`MenuConfig`] lists the entries of the main screen and
//! the boolean options of the options screen. [`MenuState`] consumes debounced
//! button events and tells the caller what to draw through
//! [`MenuState::poll_display`]. Rendering itself lives elsewhere.
//!
//! Actions happen when a button is released. With `selector_repeat` set,
//! holding Up or Down keeps moving the selector at that rate.

use embassy_time::{Duration, Instant};
use heapless::Vec;

use crate::timer_gate::TimerGate;

/// Upper bound on the number of options a menu can carry.
pub const MAX_OPTIONS: usize = 8;

/// Selector value of the "back" header line.
pub const BACK_HEADER: i8 = -1;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    Cancel,
    Up,
    Down,
    Enter,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Screen {
    #[default]
    Main,
    Options,
    Info,
}

/// Index of an option in [`MenuConfig::options`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OptionId(pub usize);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MenuEntry {
    pub screen: Screen,
    pub label: &'static str,
    /// Entering is refused while this option is off.
    pub requires: Option<OptionId>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OptionSpec {
    pub label: &'static str,
    pub default: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MenuConfig {
    pub entries: &'static [MenuEntry],
    pub options: &'static [OptionSpec],
    /// Option that enables display sleep. `None` keeps the display on.
    pub screen_timeout: Option<OptionId>,
    pub sleep_after: Duration,
    /// Sub-screens get a "back" line above their items, reachable with the selector.
    pub back_header: bool,
    /// Auto-repeat period of a held Up or Down.
    pub selector_repeat: Option<Duration>,
}

/// What changed in response to a button release.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuEvent {
    Moved { selector: i8 },
    Entered(Screen),
    Blocked(OptionId),
    Toggled { option: OptionId, enabled: bool },
    BackHighlighted,
    Back,
    /// The button only refreshed the display.
    Ignored,
}

/// Everything a renderer needs to draw the current screen.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Redraw {
    pub screen: Screen,
    pub selector: i8,
    /// First draw since the screen was entered.
    pub first_visit: bool,
    /// Set when the last Enter was refused because this option is off.
    pub blocked: Option<OptionId>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayCommand {
    Idle,
    /// Blank the panel.
    Sleep,
    /// Draw the screen; `woke` is set when the panel was asleep.
    Draw { redraw: Redraw, woke: bool },
}

pub struct MenuState {
    config: &'static MenuConfig,
    current_screen: Screen,
    previous_screen: Screen,
    drawn_screen: Option<Screen>,
    selector: i8,
    option_flags: Vec<bool, MAX_OPTIONS>,
    display_awake: bool,
    redraw_needed: bool,
    blocked: Option<OptionId>,
    sleep_gate: TimerGate,
    repeat_gate: TimerGate,
    repeated: bool,
}

impl MenuState {
    /// Starts on the main screen with the display on and a draw pending.
    ///
    /// Options beyond [`MAX_OPTIONS`] are dropped.
    #[must_use]
    pub fn new(config: &'static MenuConfig, now: Instant) -> Self {
        let option_flags = config
            .options
            .iter()
            .take(MAX_OPTIONS)
            .map(|option| option.default)
            .collect();
        Self {
            config,
            current_screen: Screen::Main,
            previous_screen: Screen::Main,
            drawn_screen: None,
            selector: 0,
            option_flags,
            display_awake: true,
            redraw_needed: true,
            blocked: None,
            sleep_gate: TimerGate::new(config.sleep_after, now),
            repeat_gate: TimerGate::new(config.selector_repeat.unwrap_or(Duration::MAX), now),
            repeated: false,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &'static MenuConfig {
        self.config
    }

    #[must_use]
    pub const fn current_screen(&self) -> Screen {
        self.current_screen
    }

    /// The screen that was shown before the last transition.
    #[must_use]
    pub const fn previous_screen(&self) -> Screen {
        self.previous_screen
    }

    #[must_use]
    pub const fn selector(&self) -> i8 {
        self.selector
    }

    #[must_use]
    pub const fn is_display_awake(&self) -> bool {
        self.display_awake
    }

    #[must_use]
    pub const fn is_redraw_needed(&self) -> bool {
        self.redraw_needed
    }

    #[must_use]
    pub fn options(&self) -> &[bool] {
        &self.option_flags
    }

    /// `false` for unknown options.
    #[must_use]
    pub fn option(&self, id: OptionId) -> bool {
        self.option_flags.get(id.0).copied().unwrap_or(false)
    }

    pub fn set_option(&mut self, id: OptionId, enabled: bool) {
        if let Some(flag) = self.option_flags.get_mut(id.0) {
            *flag = enabled;
        }
    }

    /// Asks for a redraw because shown data changed.
    ///
    /// Ignored while the display sleeps: new data does not wake the panel.
    pub const fn request_redraw(&mut self) {
        if self.display_awake {
            self.redraw_needed = true;
        }
    }

    pub fn on_press(&mut self, button: Button, now: Instant) {
        if matches!(button, Button::Up | Button::Down) {
            self.repeat_gate.reset(now);
            self.repeated = false;
        }
    }

    /// Auto-repeat for a held Up or Down. Call every loop while the button is down.
    #[must_use]
    pub fn on_hold(&mut self, button: Button, now: Instant) -> Option<MenuEvent> {
        let delta = match button {
            Button::Up => -1,
            Button::Down => 1,
            Button::Cancel | Button::Enter => return None,
        };
        if self.config.selector_repeat.is_none() || !self.repeat_gate.fire(now) {
            return None;
        }
        self.repeated = true;
        let event = self.move_selector(delta);
        self.touch(now);
        Some(event)
    }

    #[must_use]
    pub fn on_release(&mut self, button: Button, now: Instant) -> MenuEvent {
        let event = match button {
            // The held button already moved the selector.
            Button::Up | Button::Down if self.repeated => {
                self.repeated = false;
                MenuEvent::Ignored
            }
            Button::Up => self.move_selector(-1),
            Button::Down => self.move_selector(1),
            // A sleeping display only wakes up.
            Button::Enter if !self.display_awake => MenuEvent::Ignored,
            Button::Enter => self.enter(),
            Button::Cancel => self.cancel(),
        };
        debug!("{} released: {}", button, event);
        self.touch(now);
        event
    }

    /// Sleeps, wakes or redraws the display as needed.
    pub fn poll_display(&mut self, now: Instant) -> DisplayCommand {
        let woke = self.redraw_needed && !self.display_awake;
        if woke {
            self.display_awake = true;
        }

        if self.display_awake && !woke && self.timeout_enabled() && self.sleep_gate.expired(now) {
            info!("Display going to sleep");
            self.display_awake = false;
            self.redraw_needed = false;
            return DisplayCommand::Sleep;
        }

        if !(self.display_awake && self.redraw_needed) {
            return DisplayCommand::Idle;
        }
        self.redraw_needed = false;
        let redraw = Redraw {
            screen: self.current_screen,
            selector: self.selector,
            first_visit: self.drawn_screen != Some(self.current_screen),
            blocked: self.blocked.take(),
        };
        self.drawn_screen = Some(self.current_screen);
        DisplayCommand::Draw { redraw, woke }
    }

    fn timeout_enabled(&self) -> bool {
        self.config
            .screen_timeout
            .is_some_and(|option| self.option(option))
    }

    fn touch(&mut self, now: Instant) {
        self.redraw_needed = true;
        self.sleep_gate.reset(now);
    }

    fn item_count(&self) -> usize {
        match self.current_screen {
            Screen::Main => self.config.entries.len(),
            Screen::Options => self.option_flags.len(),
            Screen::Info => 0,
        }
    }

    fn selector_bounds(&self) -> (i8, i8) {
        let low = if self.config.back_header && self.current_screen != Screen::Main {
            BACK_HEADER
        } else {
            0
        };
        let count = i8::try_from(self.item_count()).unwrap_or(i8::MAX);
        (low, count.saturating_sub(1).max(low))
    }

    /// Moves the selector by one line, wrapping at both ends.
    fn move_selector(&mut self, delta: i8) -> MenuEvent {
        let (low, high) = self.selector_bounds();
        let next = self.selector.saturating_add(delta);
        self.selector = if next < low {
            high
        } else if next > high {
            low
        } else {
            next
        };
        MenuEvent::Moved {
            selector: self.selector,
        }
    }

    fn selected_index(&self) -> Option<usize> {
        usize::try_from(self.selector).ok()
    }

    fn enter(&mut self) -> MenuEvent {
        if self.current_screen != Screen::Main && self.selector == BACK_HEADER {
            return self.go_back();
        }
        let Some(index) = self.selected_index() else {
            return MenuEvent::Ignored;
        };
        match self.current_screen {
            Screen::Main => {
                let Some(entry) = self.config.entries.get(index) else {
                    return MenuEvent::Ignored;
                };
                if let Some(required) = entry.requires
                    && !self.option(required)
                {
                    self.blocked = Some(required);
                    return MenuEvent::Blocked(required);
                }
                self.go_to(entry.screen);
                MenuEvent::Entered(entry.screen)
            }
            Screen::Options => {
                let Some(flag) = self.option_flags.get_mut(index) else {
                    return MenuEvent::Ignored;
                };
                *flag = !*flag;
                MenuEvent::Toggled {
                    option: OptionId(index),
                    enabled: *flag,
                }
            }
            Screen::Info => MenuEvent::Ignored,
        }
    }

    fn cancel(&mut self) -> MenuEvent {
        if self.current_screen == Screen::Main {
            return MenuEvent::Ignored;
        }
        if self.config.back_header && self.selector != BACK_HEADER {
            self.selector = BACK_HEADER;
            return MenuEvent::BackHighlighted;
        }
        self.go_back()
    }

    fn go_back(&mut self) -> MenuEvent {
        self.go_to(Screen::Main);
        MenuEvent::Back
    }

    fn go_to(&mut self, screen: Screen) {
        self.previous_screen = self.current_screen;
        self.current_screen = screen;
        self.selector = if self.item_count() == 0 {
            self.selector_bounds().0
        } else {
            0
        };
    }
}
