//! Crosshair shooter firmware.
//!
//! The D-pad steers the crosshair, A fires, B restarts. Samples are taken at
//! 20 Hz; the renderer redraws whenever a new sample arrives.
//!
//! Task layout:
//! - `sampler_task`: periodic producer, never waits except on its ticker. It
//!   has core 1 to itself, so SPI frames and the spawner's busy loop on
//!   core 0 cannot delay it
//! - `render_task`: consumer, waits on the hand-off queue
//! - `spawner_task`: keeps one enemy alive
//! - `trigger_task`: turns debounced button edges into one-shot tasks
//! - `fire_task` / `restart_task`: run once and end

#![no_std]
#![no_main]

#[allow(clippy::wildcard_imports)]
use badge_blaster::*;
use badge_blaster::{
    render,
    restart::restart,
    spawner,
};
use defmt::{
    info,
    warn,
};
use embassy_executor::{
    SpawnToken,
    Spawner,
};
use embassy_futures::select::{
    Either,
    select,
};
use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    mutex::Mutex,
};
use embassy_time::{
    Duration,
    Instant,
    Timer,
};
use esp_backtrace as _;
use esp_hal::{
    gpio::Input,
    interrupt::software::SoftwareInterruptControl,
    system::Stack,
    timer::timg::TimerGroup,
};
use esp_println as _;

extern crate alloc;

esp_bootloader_esp_idf::esp_app_desc!();

type DisplayLock = Mutex<CriticalSectionRawMutex, Display<'static>>;

static ARCADE: Arcade = Arcade::new(Config::DEFAULT);

/// Spawn `token` and count it as a created task.
fn launch<S>(spawner: Spawner, token: SpawnToken<S>, name: &str) {
    match spawner.spawn(token) {
        Ok(()) => ARCADE.diagnostics.count_thread_created(),
        Err(_) => warn!("{} task not started", name),
    }
}

// ── Tasks ───────────────────────────────────────────────────────────────────

#[embassy_executor::task]
async fn sampler_task(sampler: PositionSampler, stick: &'static mut Joystick) {
    info!("Sampler started");
    sampler.run(&ARCADE, stick).await;
}

#[embassy_executor::task]
async fn render_task(display: &'static DisplayLock) {
    info!("Renderer started");
    render::run(&ARCADE, display, Renderer::new(PLAYFIELD_OFFSET)).await;
}

#[embassy_executor::task]
async fn spawner_task() {
    spawner::run(&ARCADE).await;
}

#[embassy_executor::task(pool_size = 4)]
async fn fire_task() {
    ARCADE.fire();
}

#[embassy_executor::task]
async fn restart_task(spawner: Spawner, display: &'static DisplayLock) {
    if restart(&ARCADE, display).await.is_err() {
        warn!("restart banner failed to draw");
    }
    launch(spawner, render_task(display), "render");
}

#[embassy_executor::task]
async fn trigger_task(
    spawner: Spawner,
    fire: &'static mut Input<'static>,
    reset: &'static mut Input<'static>,
    display: &'static DisplayLock,
) {
    let mut fire_guard = Debounce::new(ARCADE.config().debounce);
    let mut reset_guard = Debounce::new(ARCADE.config().debounce);

    loop {
        match select(fire.wait_for_falling_edge(), reset.wait_for_falling_edge()).await {
            Either::First(()) => {
                if fire_guard.accept(Instant::now()) {
                    launch(spawner, fire_task(), "fire");
                }
            }
            Either::Second(()) => {
                if reset_guard.accept(Instant::now()) {
                    launch(spawner, restart_task(spawner, display), "restart");
                }
            }
        }
    }
}

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let peripherals = badge_blaster::init();
    let resources = split_resources!(peripherals);

    esp_alloc::heap_allocator!(size: 64 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let _backlight = mk_static!(Backlight, resources.backlight.into());
    let display = mk_static!(DisplayLock, Mutex::new(resources.display.into()));
    let controls: Controls = resources.buttons.into();
    let stick = mk_static!(Joystick, controls.stick);
    let fire = mk_static!(Input<'static>, controls.fire);
    let reset = mk_static!(Input<'static>, controls.restart);

    // Clear whatever the bootloader left on the panel before the first frame.
    {
        use embedded_graphics::prelude::*;
        let mut panel = display.lock().await;
        panel.clear(render::BACKGROUND).unwrap();
    }

    let sampler = PositionSampler::calibrate(stick);
    let display: &'static DisplayLock = display;

    // Core 1 runs nothing but the sampler.
    let sw_ints = SoftwareInterruptControl::new(peripherals.SW_INTERRUPT);
    let core1_stack = mk_static!(Stack<8192>, Stack::new());
    esp_rtos::start_second_core::<8192>(
        peripherals.CPU_CTRL,
        sw_ints.software_interrupt0,
        sw_ints.software_interrupt1,
        core1_stack,
        move || {
            let executor = mk_static!(esp_rtos::embassy::Executor, esp_rtos::embassy::Executor::new());
            executor.run(move |core1| launch(core1, sampler_task(sampler, stick), "sampler"));
        },
    );

    launch(spawner, render_task(display), "render");
    launch(spawner, spawner_task(), "spawner");
    launch(spawner, trigger_task(spawner, fire, reset, display), "trigger");

    loop {
        Timer::after(Duration::from_secs(10)).await;
        let stats = ARCADE.diagnostics.snapshot();
        info!("score {} stats {}", ARCADE.score(), stats);
    }
}
