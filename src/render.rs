//! The render consumer: waits for cursor samples and redraws the playfield.
//!
//! Drawing is incremental. The renderer remembers exactly which footprints it
//! put on screen last frame and paints those black before drawing the new
//! ones, so there is no framebuffer and no full-screen clear per frame.

use core::fmt::Write as _;

use embassy_futures::select::{
    Either,
    select,
};
use embassy_sync::{
    blocking_mutex::raw::RawMutex,
    mutex::Mutex,
};
use embedded_graphics::{
    mono_font::{
        MonoTextStyleBuilder,
        ascii::FONT_6X10,
    },
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{
        Line,
        PrimitiveStyle,
        Rectangle,
    },
    text::{
        Baseline,
        Text,
    },
};

use crate::{
    arcade::{
        Arcade,
        HandoffSample,
    },
    config::{
        BULLET_CAPACITY,
        BULLET_H,
        BULLET_W,
        CROSSHAIR_SIZE,
        CURSOR_AREA_H,
        ENEMY_CAPACITY,
        ENEMY_H,
        ENEMY_W,
        FIELD_H,
        FIELD_W,
    },
    world::{
        Cursor,
        Frame,
    },
};

pub const BACKGROUND: Rgb565 = Rgb565::BLACK;
pub const CROSSHAIR_COLOR: Rgb565 = Rgb565::RED;
pub const ENTITY_COLOR: Rgb565 = Rgb565::WHITE;
pub const HUD_COLOR: Rgb565 = Rgb565::WHITE;

/// The playfield in its own coordinates.
pub const FIELD: Rectangle = Rectangle::new(
    Point::zero(),
    Size::new(FIELD_W as u32, FIELD_H as u32),
);

/// HUD text position: row 1 below the cursor area, column 3.
const HUD_ORIGIN: Point = Point::new(3 * 6, CURSOR_AREA_H as i32 + 2);

fn fill<D>(target: &mut D, x: i16, y: i16, w: i16, h: i16, color: Rgb565) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    Rectangle::new(
        Point::new(x.into(), y.into()),
        Size::new(w as u32, h as u32),
    )
    .into_styled(PrimitiveStyle::with_fill(color))
    .draw(target)
}

/// Plus-shaped crosshair whose top-middle pixel is at the cursor.
fn draw_crosshair<D>(target: &mut D, cursor: Cursor, color: Rgb565) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let (x, y) = (i32::from(cursor.x), i32::from(cursor.y));
    let half = i32::from(CROSSHAIR_SIZE / 2);
    let style = PrimitiveStyle::with_stroke(color, 1);
    Line::new(Point::new(x - half, y + half), Point::new(x + half, y + half))
        .into_styled(style)
        .draw(target)?;
    Line::new(Point::new(x, y), Point::new(x, y + 2 * half))
        .into_styled(style)
        .draw(target)
}

fn draw_bullet<D>(target: &mut D, (x, y): (i16, i16), color: Rgb565) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    fill(target, x, y, BULLET_W, BULLET_H, color)
}

fn draw_enemy<D>(target: &mut D, (x, y): (i16, i16), color: Rgb565) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    fill(target, x, y, ENEMY_W, ENEMY_H, color)
}

/// Fixed-size text buffer for the HUD line.
struct HudLine {
    buf: [u8; 24],
    len: usize,
}

impl HudLine {
    fn new() -> Self {
        Self {
            buf: [0; 24],
            len: 0,
        }
    }

    fn as_str(&self) -> &str {
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or_default()
    }
}

impl core::fmt::Write for HudLine {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let end = self.len + s.len();
        let dst = self.buf.get_mut(self.len..end).ok_or(core::fmt::Error)?;
        dst.copy_from_slice(s.as_bytes());
        self.len = end;
        Ok(())
    }
}

/// Incremental playfield renderer.
pub struct Renderer {
    offset: Point,
    cursor: Option<Cursor>,
    bullets: [Option<(i16, i16)>; BULLET_CAPACITY],
    enemies: [Option<(i16, i16)>; ENEMY_CAPACITY],
}

impl Renderer {
    /// `offset` places the playfield's top-left corner on the display.
    pub const fn new(offset: Point) -> Self {
        Self {
            offset,
            cursor: None,
            bullets: [None; BULLET_CAPACITY],
            enemies: [None; ENEMY_CAPACITY],
        }
    }

    /// Erase last frame's footprints and draw this one.
    ///
    /// Dead entities (expired bullets, destroyed enemies) are erased but not
    /// drawn again.
    pub fn draw<D>(&mut self, display: &mut D, sample: HandoffSample, frame: &Frame) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let mut moved = display.translated(self.offset);
        let mut field = moved.clipped(&FIELD);

        // Footprints are forgotten only after their erase succeeds and are
        // recorded before their draw starts.
        if let Some(cursor) = self.cursor {
            draw_crosshair(&mut field, cursor, BACKGROUND)?;
            self.cursor = None;
        }
        for drawn in &mut self.bullets {
            if let Some(at) = *drawn {
                draw_bullet(&mut field, at, BACKGROUND)?;
                *drawn = None;
            }
        }
        for drawn in &mut self.enemies {
            if let Some(at) = *drawn {
                draw_enemy(&mut field, at, BACKGROUND)?;
                *drawn = None;
            }
        }

        for (drawn, bullet) in self.bullets.iter_mut().zip(&frame.bullets) {
            if bullet.is_live() {
                *drawn = Some((bullet.x, bullet.y));
                draw_bullet(&mut field, (bullet.x, bullet.y), ENTITY_COLOR)?;
            }
        }
        for (drawn, enemy) in self.enemies.iter_mut().zip(&frame.enemies) {
            if enemy.is_live() {
                *drawn = Some((enemy.x, enemy.y));
                draw_enemy(&mut field, (enemy.x, enemy.y), ENTITY_COLOR)?;
            }
        }

        self.cursor = Some(sample.cursor);
        draw_crosshair(&mut field, sample.cursor, CROSSHAIR_COLOR)?;

        let mut line = HudLine::new();
        let _ = write!(line, "Score: {}", frame.score);
        let style = MonoTextStyleBuilder::new()
            .font(&FONT_6X10)
            .text_color(HUD_COLOR)
            .background_color(BACKGROUND)
            .build();
        Text::with_baseline(line.as_str(), HUD_ORIGIN, style, Baseline::Top).draw(&mut field)?;

        Ok(())
    }
}

/// Render task body: draw one frame per hand-off sample until asked to stop.
///
/// A pending stop request wins over queued samples. The display lock is held
/// only while a frame is drawn and is released on every path out, including
/// draw errors.
pub async fn run<M, D>(arcade: &Arcade, display: &Mutex<M, D>, mut renderer: Renderer)
where
    M: RawMutex,
    D: DrawTarget<Color = Rgb565>,
{
    arcade.render_started();

    loop {
        let sample = match select(arcade.render_stop_requested(), arcade.next_sample()).await {
            Either::First(()) => break,
            Either::Second(sample) => sample,
        };

        let frame = arcade.snapshot();
        let drawn = {
            let mut display = display.lock().await;
            renderer.draw(&mut *display, sample, &frame)
        };
        match drawn {
            Ok(()) => arcade.diagnostics.count_frame(),
            Err(_) => warn!("frame {} failed to draw", sample.seq),
        }
    }

    info!("renderer stopping");
    arcade.render_finished();
}
