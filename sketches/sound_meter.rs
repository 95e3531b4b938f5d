//! Microphone level on a ten-LED bar graph, with the recent history plotted on
//! the OLED.
#![no_std]
#![no_main]

use core::convert::Infallible;

use defmt::info;
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_futures::yield_now;
use embassy_rp::gpio::Level;
use embassy_time::Instant;
use panic_probe as _;
use sensor_kit::hardware::SoundHardware;
use sensor_kit::oled::Oled;
use sensor_kit::{Result, SOUND_BLOCK_LEN, SOUND_HISTORY_LEN, SoundPanel};

// Boot block the RP2350 bootrom looks for.
#[cfg(feature = "pico2")]
#[expect(unsafe_code, reason = "placing the image definition in its linker section")]
#[unsafe(link_section = ".start_block")]
#[used]
pub static IMAGE_DEF: embassy_rp::block::ImageDef = embassy_rp::block::ImageDef::secure_exe();

#[embassy_executor::main]
pub async fn main(spawner: Spawner) -> ! {
    // If it returns, something went wrong.
    let err = inner_main(spawner).await.unwrap_err();
    panic!("{err}");
}

async fn inner_main(_spawner: Spawner) -> Result<Infallible> {
    let SoundHardware {
        mut adc,
        mut microphone,
        mut bars,
        i2c,
    } = SoundHardware::default();

    bars.set_all(Level::Low);
    let mut oled = Oled::new(i2c)?;
    let mut panel = SoundPanel::<SOUND_BLOCK_LEN, SOUND_HISTORY_LEN>::new(Instant::now());
    info!("Sound meter ready");

    loop {
        let now = Instant::now();
        if panel.sample_due(now) {
            let sample = adc.blocking_read(&mut microphone)?;
            if let Some(level) = panel.on_sample(sample) {
                bars.set_levels(level.bar_levels());
            }
        }
        if panel.refresh_due(now) {
            oled.draw_history(panel.meter().history(), panel.meter().latest())?;
        }

        // Sampling runs every 100 µs, finer than a timer tick is worth here.
        yield_now().await;
    }
}
