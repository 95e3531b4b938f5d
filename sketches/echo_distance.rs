//! HC-SR04 distance every second. The echo edges are timestamped by a task on a
//! high-priority interrupt executor; the main loop triggers and reports.
#![no_std]
#![no_main]

use core::convert::Infallible;

use defmt::info;
use defmt_rtt as _;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_time::{Instant, Timer, block_for};
use panic_probe as _;
use sensor_kit::echo::echo_edge_task;
use sensor_kit::hardware::EchoHardware;
use sensor_kit::{
    ECHO_ACQUISITION_PERIOD, ECHO_TRIGGER_PULSE, EchoCell, EchoSampler, LOOP_PERIOD, Result,
};

// Boot block the RP2350 bootrom looks for.
#[cfg(feature = "pico2")]
#[expect(unsafe_code, reason = "placing the image definition in its linker section")]
#[unsafe(link_section = ".start_block")]
#[used]
pub static IMAGE_DEF: embassy_rp::block::ImageDef = embassy_rp::block::ImageDef::secure_exe();

static ECHO: EchoCell = EchoCell::new();
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
#[expect(unsafe_code, reason = "interrupt handler entry point")]
unsafe fn SWI_IRQ_1() {
    // SAFETY: SWI_IRQ_1 is reserved for this executor and only pended by it.
    unsafe { EXECUTOR_HIGH.on_interrupt() }
}

#[embassy_executor::main]
pub async fn main(spawner: Spawner) -> ! {
    // If it returns, something went wrong.
    let err = inner_main(spawner).await.unwrap_err();
    panic!("{err}");
}

async fn inner_main(_spawner: Spawner) -> Result<Infallible> {
    let EchoHardware {
        mut trigger,
        echo,
        mut led,
    } = EchoHardware::default();

    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let high_spawner = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);
    high_spawner.spawn(echo_edge_task(echo, &ECHO))?;

    let mut sampler = EchoSampler::new(&ECHO, ECHO_ACQUISITION_PERIOD, Instant::now());
    info!("Ranging every {} ms", ECHO_ACQUISITION_PERIOD.as_millis());

    loop {
        let now = Instant::now();
        if sampler.poll_trigger(now) {
            led.toggle();
            trigger.set_high();
            block_for(ECHO_TRIGGER_PULSE);
            trigger.set_low();
        }
        // The sampler logs every finished measurement.
        sampler.poll_sample();

        Timer::after(LOOP_PERIOD).await;
    }
}
