//! One iteration of the main loop
//!
//! The order of the stages is fixed: collisions are resolved after motion and
//! before the terminal checks, so a hit taken this step can end the session
//! this step.

use core::fmt::Write as _;

use glam::DVec2;

use super::collision::overlaps;
use super::input::Button;
use super::sprite::Entity;
use super::state::{Event, Interrupts, World};
use crate::consts::*;
use crate::platform::{Display, Telemetry, send_debug};
use crate::{angle_to, direction};

/// Peripheral readings taken at the start of a step
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// 10-bit ADC reading of the aim potentiometer
    pub aim: u16,
    /// 8-bit coarse counter register
    pub coarse_count: u32,
    /// 16-bit fine counter register
    pub fine_count: u32,
    /// Byte typed on the serial console
    pub key: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    /// Lives ran out this step
    GameOver,
}

/// Aim angle in degrees for an ADC reading
pub fn aim_degrees(adc: u16) -> i32 {
    (adc as f64 * AIM_SCALE).ceil() as i32
}

/// Region entities may touch without being pushed back
#[derive(Debug, Clone, Copy)]
struct WallZone {
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

impl WallZone {
    const ALIEN: WallZone = WallZone {
        min_x: 2.0,
        max_x: (LCD_X - 6) as f64,
        min_y: 11.0,
        max_y: (LCD_Y - 6) as f64,
    };

    const MOTHERSHIP: WallZone = WallZone {
        min_x: 2.0,
        max_x: (LCD_X - 11) as f64,
        min_y: 11.0,
        max_y: (LCD_Y - 9) as f64,
    };

    fn touches(&self, pos: DVec2) -> bool {
        pos.x <= self.min_x || pos.x >= self.max_x || pos.y <= self.min_y || pos.y >= self.max_y
    }
}

/// Debug lines stamped with this step's fine-clock time
struct Reporter<'a, T: Telemetry + ?Sized> {
    telemetry: &'a mut T,
    time: f64,
    enabled: bool,
}

impl<T: Telemetry + ?Sized> Reporter<'_, T> {
    fn debug(&mut self, message: &str) {
        log::debug!("{}", message);
        if self.enabled {
            send_debug(&mut *self.telemetry, self.time, format_args!("{}", message));
        }
    }

    fn status(&mut self, world: &World, adc: u16) {
        if !self.enabled {
            return;
        }
        let (x, y) = (world.craft.pos.x as i32, world.craft.pos.y as i32);
        let aim = (adc as f64 * AIM_SCALE) as i32;
        send_debug(
            &mut *self.telemetry,
            self.time,
            format_args!("Location: ( {}, {}) Aim: {}", x, y, aim),
        );
    }
}

/// Run one main-loop iteration
pub fn step<D, T>(
    world: &mut World,
    irq: &mut Interrupts,
    input: &FrameInput,
    display: &mut D,
    telemetry: &mut T,
) -> StepOutcome
where
    D: Display + ?Sized,
    T: Telemetry + ?Sized,
{
    let mut reporter = Reporter {
        time: irq.fine.elapsed_seconds(input.fine_count),
        enabled: world.settings.telemetry,
        telemetry,
    };

    // 1. Play time
    let played = irq.coarse.elapsed_seconds(input.coarse_count);
    world.game.set_play_time(played);

    // 2. Aim
    world.aim_degrees = aim_degrees(input.aim);

    // 3-4. Frame chrome
    display.clear();
    draw_status(display, world);

    // 5. Input and interrupt events
    apply_input(world, irq, input.key);
    drain_events(world, irq, &mut reporter, input.aim);

    // 6. Craft
    draw_entity(display, &world.craft);

    // 7-8. Motion
    advance(world);
    for e in world
        .aliens
        .iter()
        .chain(world.bullets.iter())
        .chain([&world.mothership, &world.boss_bullet])
    {
        draw_entity(display, e);
    }
    if world.mothership.visible {
        draw_boss_health(display, &world.mothership, world.game.boss_health);
    }

    // 9. Walls
    wall_lockouts(world, irq);

    // 10. Collisions
    resolve_collisions(world, &mut reporter);

    // 11-12. Aim line and flush
    world.aim_tip = draw_aim_line(display, world.craft_center_pixel(), world.aim_degrees);
    display.present();

    // 13. Terminal conditions
    terminal_checks(world, irq, &mut reporter)
}

fn draw_status<D: Display + ?Sized>(display: &mut D, world: &World) {
    let game = &world.game;
    let mut status: heapless::String<32> = heapless::String::new();
    let _ = write!(
        status,
        "T:{:02}:{:02} L:{} S:{}",
        game.minutes, game.seconds, game.lives, game.score
    );
    display.draw_text(0, 0, &status);

    let (right, bottom) = (LCD_X - 1, LCD_Y - 1);
    display.draw_line(0, STATUS_BORDER_Y, right, STATUS_BORDER_Y);
    display.draw_line(right, STATUS_BORDER_Y, right, bottom);
    display.draw_line(right, bottom, 0, bottom);
    display.draw_line(0, bottom, 0, STATUS_BORDER_Y);
}

pub fn draw_entity<D: Display + ?Sized>(display: &mut D, entity: &Entity) {
    if !entity.visible {
        return;
    }
    let (x, y) = entity.pixel();
    for (col, row) in entity.shape.set_pixels() {
        display.draw_pixel(x + col, y + row, true);
    }
}

fn draw_boss_health<D: Display + ?Sized>(display: &mut D, boss: &Entity, health: u8) {
    if health == 0 {
        return;
    }
    let (x, y) = boss.pixel();
    let bar_y = if y > 12 { y - 2 } else { y + 10 };
    display.draw_line(x, bar_y, x + health as i32 - 1, bar_y);
}

/// Move the craft one pixel per held direction, staying off the border
fn apply_input(world: &mut World, irq: &Interrupts, key: Option<u8>) {
    let wants = |button: Button, k: u8| key == Some(k) || irq.buttons.is_held(button);
    let craft = &mut world.craft;

    if wants(Button::Left, b'a') && craft.pos.x > 1.0 {
        craft.nudge(DVec2::new(-CRAFT_SPEED, 0.0));
    }
    if wants(Button::Right, b'd') && craft.pos.x < (LCD_X - 6) as f64 {
        craft.nudge(DVec2::new(CRAFT_SPEED, 0.0));
    }
    if wants(Button::Up, b'w') && craft.pos.y > PLAYFIELD_TOP as f64 {
        craft.nudge(DVec2::new(0.0, -CRAFT_SPEED));
    }
    if wants(Button::Down, b's') && craft.pos.y < (LCD_Y - 6) as f64 {
        craft.nudge(DVec2::new(0.0, CRAFT_SPEED));
    }
    if key == Some(b' ') {
        let degrees = world.aim_degrees;
        world.shoot(degrees);
    }
}

fn drain_events<T: Telemetry + ?Sized>(
    world: &mut World,
    irq: &mut Interrupts,
    reporter: &mut Reporter<'_, T>,
    adc: u16,
) {
    while let Some(event) = irq.events.pop() {
        match event {
            Event::FireRequested => {
                let degrees = world.aim_degrees;
                if !world.shoot(degrees) {
                    log::trace!("no free bullet slot");
                }
            }
            Event::AlienAttack(i) => {
                if let Some(alien) = world.aliens.get_mut(i).filter(|a| a.visible) {
                    alien.vel = direction(angle_to(alien.pos, world.craft.pos)) * ALIEN_SPEED;
                }
            }
            Event::BossAttack => {
                let boss = &mut world.mothership;
                if boss.visible {
                    boss.vel = direction(angle_to(boss.pos, world.craft.pos)) * MOTHERSHIP_SPEED;
                }
            }
            Event::BossFire => boss_shoot(world),
            Event::StatusDue => reporter.status(world, adc),
        }
    }
}

/// Fire the mothership's single bullet at the craft, if it is not in flight
fn boss_shoot(world: &mut World) {
    if !world.mothership.visible || world.boss_bullet.visible {
        return;
    }
    let muzzle = world.mothership.pos + DVec2::new(5.0, 4.0);
    let target = world.craft.pos + DVec2::new(2.0, 2.0);
    world.boss_bullet.spawn_at(muzzle);
    world.boss_bullet.vel = direction(angle_to(muzzle, target)) * BULLET_SPEED;
}

fn out_of_play(e: &Entity) -> bool {
    e.pos.x > (LCD_X - 1) as f64
        || e.pos.x < 1.0
        || e.pos.y > (LCD_Y - 1) as f64
        || e.pos.y < PLAYFIELD_TOP as f64
}

/// Step every visible entity; projectiles leaving the playfield vanish
fn advance(world: &mut World) {
    for alien in world.aliens.iter_mut().filter(|a| a.visible) {
        alien.step();
    }
    if world.mothership.visible {
        world.mothership.step();
    }
    for shot in world
        .bullets
        .iter_mut()
        .chain(core::iter::once(&mut world.boss_bullet))
        .filter(|b| b.visible)
    {
        shot.step();
        if out_of_play(shot) {
            shot.hide();
        }
    }
}

/// Enemies touching the wall stop and wait out a fresh cooldown
fn wall_lockouts(world: &mut World, irq: &mut Interrupts) {
    for (i, alien) in world.aliens.iter_mut().enumerate() {
        if alien.visible && WallZone::ALIEN.touches(alien.pos) {
            alien.vel = DVec2::ZERO;
            irq.alien_arming[i].bounce(&mut world.rng, ARM_LOW, ARM_HIGH);
            irq.events.discard(Event::AlienAttack(i));
        }
    }

    let boss = &mut world.mothership;
    if boss.visible && WallZone::MOTHERSHIP.touches(boss.pos) {
        boss.vel = DVec2::ZERO;
        irq.boss_arming.bounce(&mut world.rng, ARM_LOW, ARM_HIGH);
        irq.events.discard(Event::BossAttack);
    }
}

fn lose_life<T: Telemetry + ?Sized>(world: &mut World, reporter: &mut Reporter<'_, T>, why: &str) {
    reporter.debug(why);
    world.game.lives = world.game.lives.saturating_sub(1);
    world.spawn_craft();
}

fn resolve_collisions<T: Telemetry + ?Sized>(world: &mut World, reporter: &mut Reporter<'_, T>) {
    // --- PLAYER BULLETS vs ALIENS ---
    for b in 0..BULLET_COUNT {
        for a in 0..ALIEN_COUNT {
            if overlaps(&world.bullets[b], &world.aliens[a]) {
                world.bullets[b].hide();
                world.aliens[a].hide();
                world.game.score += 1;
                reporter.debug("Player destroyed alien.");
            }
        }
    }

    // --- MOTHERSHIP vs CRAFT ---
    if overlaps(&world.boss_bullet, &world.craft) {
        world.boss_bullet.hide();
        lose_life(world, reporter, "Mothership shot player.");
    }

    if overlaps(&world.mothership, &world.craft) {
        lose_life(world, reporter, "Mothership destroyed player.");
    }

    // --- PLAYER BULLETS vs MOTHERSHIP ---
    for b in 0..BULLET_COUNT {
        if overlaps(&world.bullets[b], &world.mothership) {
            world.bullets[b].hide();
            world.game.boss_health = world.game.boss_health.saturating_sub(1);
        }
    }

    // --- ALIENS vs CRAFT ---
    for a in 0..ALIEN_COUNT {
        if overlaps(&world.craft, &world.aliens[a]) {
            lose_life(world, reporter, "Alien destroyed player.");
        }
    }
}

/// Draw the aim line from the craft centre and return its tip. The line is
/// shortened until the tip is on screen and below the status bar.
fn draw_aim_line<D: Display + ?Sized>(display: &mut D, from: (i32, i32), degrees: i32) -> (i32, i32) {
    let radians = (degrees as f64).to_radians();
    let (x, y) = from;
    let tip = |len: i32| {
        (
            (x as f64 + radians.cos() * len as f64) as i32,
            (y as f64 + radians.sin() * len as f64) as i32,
        )
    };
    let on_screen = |(ax, ay): (i32, i32)| ax > 0 && ax < LCD_X && ay > STATUS_BORDER_Y - 1 && ay < LCD_Y;

    let mut len = AIM_LINE_LENGTH;
    while len > 0 && !on_screen(tip(len)) {
        len -= 1;
    }
    let (ax, ay) = tip(len);
    display.draw_line(x, y, ax, ay);
    (ax, ay)
}

fn terminal_checks<T: Telemetry + ?Sized>(
    world: &mut World,
    irq: &mut Interrupts,
    reporter: &mut Reporter<'_, T>,
) -> StepOutcome {
    if world.game.lives == 0 {
        log::info!("game over: score {}", world.game.score);
        return StepOutcome::GameOver;
    }

    if world.mothership.visible && world.game.boss_health == 0 {
        world.mothership.hide();
        irq.boss_fire.lock();
        irq.boss_arming.lock();
        irq.events.discard(Event::BossAttack);
        irq.events.discard(Event::BossFire);
        world.game.boss_health = world.settings.boss_health;
        world.game.score += MOTHERSHIP_BOUNTY;
        reporter.debug("Player destroyed mothership.");

        world.spawn_wave(irq);
        world.game.boss_due = true;
        log::info!("mothership down, new wave (score {})", world.game.score);
    }

    if world.game.boss_due && world.aliens_cleared() {
        world.spawn_mothership(irq);
        world.game.boss_due = false;
    }

    StepOutcome::Continue
}
