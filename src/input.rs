//! Badge controls: the D-pad stands in for an analog stick, A fires and B
//! restarts.

use esp_hal::gpio::{
    Input,
    InputConfig,
    Pull,
};

use crate::{
    ButtonResources,
    sampler::InputSource,
    world::RawInput,
};

/// Rest value of an emulated 12-bit stick axis.
pub const STICK_CENTRE: u16 = 2048;
/// How far a held D-pad direction pushes the axis. Three pixels per tick
/// after damping.
pub const STICK_DEFLECTION: u16 = 1536;

/// The D-pad read as a two-axis stick, with the stick click as its button.
pub struct Joystick {
    up: Input<'static>,
    down: Input<'static>,
    left: Input<'static>,
    right: Input<'static>,
    click: Input<'static>,
}

/// Map a pair of opposing buttons onto one axis value.
fn axis(low: bool, high: bool) -> u16 {
    match (low, high) {
        (true, false) => STICK_CENTRE - STICK_DEFLECTION,
        (false, true) => STICK_CENTRE + STICK_DEFLECTION,
        _ => STICK_CENTRE,
    }
}

impl InputSource for Joystick {
    fn sample(&mut self) -> RawInput {
        // Buttons are active low. A higher raw y moves the cursor up.
        RawInput {
            x: axis(self.left.is_low(), self.right.is_low()),
            y: axis(self.down.is_low(), self.up.is_low()),
            pressed: self.click.is_low(),
        }
    }
}

/// Everything the game reads from the button matrix.
pub struct Controls {
    pub stick: Joystick,
    pub fire: Input<'static>,
    pub restart: Input<'static>,
}

impl From<ButtonResources<'static>> for Controls {
    fn from(res: ButtonResources<'static>) -> Self {
        let pull_up = InputConfig::default().with_pull(Pull::Up);
        Self {
            stick: Joystick {
                up: Input::new(res.up, pull_up),
                down: Input::new(res.down, pull_up),
                left: Input::new(res.left, pull_up),
                right: Input::new(res.right, pull_up),
                click: Input::new(res.stick, pull_up),
            },
            fire: Input::new(res.a, pull_up),
            restart: Input::new(res.b, pull_up),
        }
    }
}
