//! # badge-blaster
//!
//! A crosshair shooter for the Disobey 2026 badge.
//!
//! The game is split into cooperating tasks around one shared [`Arcade`]:
//! - **Sampler**: periodic; reads the stick, moves the cursor, queues the
//!   position for the renderer and advances bullets and enemies
//! - **Renderer**: waits on the hand-off queue and redraws changed footprints
//! - **Spawner**: keeps one enemy on the field
//! - **Fire / Restart**: one-shot tasks started by debounced button edges
//!
//! Everything except the board bring-up is hardware independent and runs in
//! host tests. Enable the `badge` feature for the ESP32-S3 firmware pieces.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! static ARCADE: Arcade = Arcade::new(Config::DEFAULT);
//!
//! let mut sampler = PositionSampler::calibrate(&mut stick);
//! sampler.sample(&ARCADE, stick.sample(), Instant::now());
//! ```

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod arcade;
pub mod collision;
pub mod config;
pub mod diagnostics;
pub mod entities;
pub mod jitter;
pub mod render;
pub mod restart;
pub mod sampler;
pub mod spawner;
pub mod trigger;
pub mod world;

#[cfg(feature = "badge")]
mod board;
#[cfg(feature = "badge")]
mod display;
#[cfg(feature = "badge")]
mod input;

pub use arcade::{
    Arcade,
    HandoffSample,
};
pub use config::Config;
#[cfg(feature = "badge")]
pub use display::{
    Backlight,
    Display,
    PLAYFIELD_OFFSET,
};
#[cfg(feature = "badge")]
pub use input::{
    Controls,
    Joystick,
};
pub use render::Renderer;
pub use sampler::{
    InputSource,
    PositionSampler,
};
pub use trigger::Debounce;
pub use world::{
    Cursor,
    RawInput,
    World,
};

/// StaticCell helper: allocates a value into a `static` exactly once.
#[cfg(feature = "badge")]
#[macro_export]
macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        #[deny(unused_attributes)]
        let x = STATIC_CELL.uninit().write($val);
        x
    }};
}

#[cfg(feature = "badge")]
pub use board::init;

// ── Pin / peripheral assignments ────────────────────────────────────────────

#[cfg(feature = "badge")]
esp_hal::assign_resources! {
    pub Resources<'d> {
        display: DisplayResources<'d> {
            dc: GPIO15,
            rst: GPIO7,
            sck: GPIO4,
            cs: GPIO6,
            miso: GPIO16,
            mosi: GPIO5,
            spi: SPI2,
            dma: DMA_CH0,
        },
        backlight: BacklightResources<'d> {
            led: GPIO19,
        },
        buttons: ButtonResources<'d> {
            up: GPIO11,
            down: GPIO1,
            left: GPIO21,
            right: GPIO2,
            stick: GPIO14,
            a: GPIO13,
            b: GPIO38,
        }
    }
}
