//! Four-button OLED menu. Options turn on a heartbeat LED, display sleep and a
//! DHT22 read every three seconds whose values show on the Info screen.
#![no_std]
#![no_main]

use core::convert::Infallible;

use defmt::info;
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::gpio::Level;
use embassy_time::{Delay, Instant, Timer};
use panic_probe as _;
use sensor_kit::hardware::{DHT_PIN, MenuHardware};
use sensor_kit::oled::Oled;
use sensor_kit::{
    DHT_PANEL, Dht22, DisplayCommand, LOOP_PERIOD, PanelController, Result, SystemClock,
};

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
    let MenuHardware {
        buttons,
        mut life_led,
        dht,
        i2c,
    } = MenuHardware::default();

    let mut oled = Oled::new(i2c)?;
    let mut sensor = Dht22::new(DHT_PIN, dht, Delay, SystemClock);
    let mut panel = PanelController::new(&DHT_PANEL, Instant::now());
    info!("Menu ready");

    loop {
        let now = Instant::now();
        let levels = buttons.each_ref().map(|button| button.is_high());
        let tick = panel.poll(now, levels);

        if let Some(lit) = tick.life_led {
            life_led.set_level(Level::from(lit));
        }
        if tick.acquire {
            panel.on_reading(sensor.read());
        }

        match panel.display(Instant::now()) {
            DisplayCommand::Idle => {}
            DisplayCommand::Sleep => oled.sleep()?,
            DisplayCommand::Draw { redraw, woke } => {
                if woke {
                    oled.wake()?;
                }
                oled.draw_menu(&redraw, panel.menu(), panel.reading())?;
            }
        }

        Timer::after(LOOP_PERIOD).await;
    }
}
