use embassy_time::Duration;

pub const ONE_SECOND: Duration = Duration::from_secs(1);

/// Yield between two iterations of a sketch's main loop.
pub const LOOP_PERIOD: Duration = Duration::from_millis(1);

// Buttons
pub const BUTTON_FILTER_INTERVAL: Duration = Duration::from_millis(30);
pub const BUTTON_FILTER_COEFFICIENT: u8 = 4;

// Life LED: a short flash every few seconds
pub const LIFE_LED_ON: Duration = Duration::from_millis(100);
pub const LIFE_LED_OFF: Duration = Duration::from_secs(3);

// Display
pub const DISPLAY_SLEEP_DELAY: Duration = Duration::from_secs(5);
pub const SELECTOR_REPEAT: Duration = Duration::from_millis(300);
pub const DISPLAY_REFRESH_PERIOD: Duration = Duration::from_millis(100);
pub const DISPLAY_I2C_FREQUENCY: u32 = 400_000;

// DHT22
pub const DHT_ACQUISITION_PERIOD: Duration = Duration::from_secs(3);

// HC-SR04
pub const ECHO_ACQUISITION_PERIOD: Duration = ONE_SECOND;
pub const ECHO_TRIGGER_PULSE: Duration = Duration::from_micros(10);
pub const SPEED_OF_SOUND_M_PER_S: u16 = 340;

// Sound sensor
pub const SOUND_SAMPLE_PERIOD: Duration = Duration::from_micros(100);
pub const SOUND_BLOCK_LEN: usize = 100;
pub const SOUND_HISTORY_LEN: usize = 64;
pub const BAR_LED_COUNT: usize = 10;
/// Scale applied to a block's deviation before dividing by its peak (the sensor's 11 V range).
pub const ADC_BAR_SCALE: u32 = 11;
