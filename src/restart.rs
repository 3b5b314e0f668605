//! The restart sequence run by the restart one-shot task.

use embassy_sync::{
    blocking_mutex::raw::RawMutex,
    mutex::Mutex,
};
use embassy_time::Timer;
use embedded_graphics::{
    mono_font::{
        MonoTextStyle,
        ascii::FONT_6X10,
    },
    pixelcolor::Rgb565,
    prelude::*,
    text::{
        Alignment,
        Text,
    },
};

use crate::{
    arcade::Arcade,
    render::{
        BACKGROUND,
        HUD_COLOR,
    },
};

/// Stop the renderer, show the banner, and put the game back to its
/// power-up state.
///
/// The old renderer has returned before the banner goes up, so the caller
/// can start a fresh render task afterwards. The game is reset even if
/// drawing the banner failed.
pub async fn restart<M, D>(arcade: &Arcade, display: &Mutex<M, D>) -> Result<(), D::Error>
where
    M: RawMutex,
    D: DrawTarget<Color = Rgb565>,
{
    let config = *arcade.config();
    Timer::after(config.restart_pause).await;

    info!("restarting after {}", arcade.diagnostics.snapshot());
    arcade.stop_renderer().await;

    let shown = {
        let mut display = display.lock().await;
        banner(&mut *display, config.restart_banner).await
    };

    arcade.reset();
    shown
}

async fn banner<D>(display: &mut D, hold: embassy_time::Duration) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let screen = display.bounding_box();
    display.fill_solid(&screen, BACKGROUND)?;
    Text::with_alignment(
        "Restarting",
        screen.center(),
        MonoTextStyle::new(&FONT_6X10, HUD_COLOR),
        Alignment::Center,
    )
    .draw(display)?;
    Timer::after(hold).await;
    display.fill_solid(&screen, BACKGROUND)
}
