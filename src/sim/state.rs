//! Game state and the split between the two execution contexts
//!
//! State is partitioned by who writes it:
//!
//! | state                       | tick handler           | main loop                      |
//! |-----------------------------|------------------------|--------------------------------|
//! | `Interrupts::coarse/fine`   | overflow count         | reads, resets at session start |
//! | `Interrupts::buttons`       | samples                | reads, resets at session start |
//! | `Interrupts::*_arming/fire` | advance, relock        | arms on spawn and wall bounce  |
//! | `Interrupts::events`        | pushes                 | drains, discards on bounce     |
//! | `World` (entities, score)   | never                  | everything                     |
//!
//! Enemy velocity is only ever written by the main loop, when it drains an
//! attack event, so a bounce can never be overridden by a stale attack.

use glam::DVec2;
use heapless::Deque;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::clock::{Clock, ClockSpec};
use super::collision::{Placement, SpawnArea, place};
use super::cooldown::Cooldown;
use super::input::Debouncer;
use super::sprite::{ALIEN, BULLET, CRAFT, Entity, MOTHERSHIP};
use crate::Settings;
use crate::consts::*;

/// Messages from the tick handler to the main loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A fire button was released
    FireRequested,
    /// Alien `n` finished its cooldown and charges the craft
    AlienAttack(usize),
    /// The mothership finished its movement cooldown
    BossAttack,
    /// The mothership's gun is due
    BossFire,
    /// Periodic telemetry status line is due
    StatusDue,
}

/// Pending events (fixed capacity, oldest first)
pub const EVENT_CAPACITY: usize = 32;

#[derive(Debug, Default)]
pub struct EventQueue {
    queue: Deque<Event, EVENT_CAPACITY>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue; a full queue drops the new event
    pub fn push(&mut self, event: Event) {
        if self.queue.push_back(event).is_err() {
            log::warn!("event queue full, dropping {:?}", event);
        }
    }

    pub fn pop(&mut self) -> Option<Event> {
        self.queue.pop_front()
    }

    /// Remove every pending copy of `event`, keeping the order of the rest
    pub fn discard(&mut self, event: Event) {
        for _ in 0..self.queue.len() {
            if let Some(e) = self.queue.pop_front() {
                if e != event {
                    // Cannot fail: one slot was just freed
                    let _ = self.queue.push_back(e);
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

/// Everything the timer interrupt owns
#[derive(Debug)]
pub struct Interrupts {
    /// Play-time clock (8-bit counter)
    pub coarse: Clock,
    /// Delta/timestamp clock (16-bit counter)
    pub fine: Clock,
    pub buttons: Debouncer,
    pub alien_arming: [Cooldown; ALIEN_COUNT],
    pub boss_arming: Cooldown,
    pub boss_fire: Cooldown,
    /// Fine-clock reading at the previous tick
    pub previous_time: f64,
    /// Seconds accumulated toward the next status line
    pub status_timer: f64,
    pub status_interval: f64,
    /// Status lines are only due while a session is running
    pub reporting: bool,
    /// Boss gun re-arm draws
    pub rng: Pcg32,
    pub events: EventQueue,
}

impl Interrupts {
    pub fn new(settings: &Settings) -> Self {
        Self {
            coarse: Clock::new(ClockSpec::COARSE),
            fine: Clock::new(ClockSpec::FINE),
            buttons: Debouncer::new(),
            alien_arming: [Cooldown::Locked; ALIEN_COUNT],
            boss_arming: Cooldown::Locked,
            boss_fire: Cooldown::Locked,
            previous_time: 0.0,
            status_timer: 0.0,
            status_interval: settings.status_interval_secs,
            reporting: false,
            rng: Pcg32::seed_from_u64(0),
            events: EventQueue::new(),
        }
    }

    /// Lock every cooldown and forget pending events
    pub fn stand_down(&mut self) {
        self.alien_arming = [Cooldown::Locked; ALIEN_COUNT];
        self.boss_arming.lock();
        self.boss_fire.lock();
        self.events.clear();
        self.status_timer = 0.0;
    }
}

/// Score, lives and wave bookkeeping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub score: u32,
    pub lives: u8,
    pub boss_health: u8,
    pub minutes: u32,
    pub seconds: u32,
    /// A mothership appears once the current wave is cleared
    pub boss_due: bool,
}

impl GameState {
    pub fn new(settings: &Settings) -> Self {
        Self {
            score: 0,
            lives: settings.starting_lives,
            boss_health: settings.boss_health,
            minutes: 0,
            seconds: 0,
            boss_due: true,
        }
    }

    /// Split play time into the minutes/seconds shown in the status bar
    pub fn set_play_time(&mut self, seconds: f64) {
        let seconds = seconds.max(0.0);
        self.minutes = (seconds / 60.0).floor() as u32;
        self.seconds = seconds.floor() as u32 % 60;
    }
}

/// Everything the main loop owns
#[derive(Debug)]
pub struct World {
    pub craft: Entity,
    pub bullets: [Entity; BULLET_COUNT],
    pub aliens: [Entity; ALIEN_COUNT],
    pub mothership: Entity,
    pub boss_bullet: Entity,
    pub game: GameState,
    /// Current aim angle in degrees (from the analog input)
    pub aim_degrees: i32,
    /// End of the aim line drawn last step; player bullets spawn here
    pub aim_tip: (i32, i32),
    /// Placement and arming draws
    pub rng: Pcg32,
    pub settings: Settings,
}

impl World {
    pub fn new(settings: Settings) -> Self {
        Self {
            craft: Entity::new(&CRAFT),
            bullets: [Entity::new(&BULLET); BULLET_COUNT],
            aliens: [Entity::new(&ALIEN); ALIEN_COUNT],
            mothership: Entity::new(&MOTHERSHIP),
            boss_bullet: Entity::new(&BULLET),
            game: GameState::new(&settings),
            aim_degrees: 0,
            aim_tip: (0, 0),
            rng: Pcg32::seed_from_u64(0),
            settings,
        }
    }

    /// Reseed both random streams
    pub fn reseed(&mut self, irq: &mut Interrupts, seed: u64) {
        self.rng = Pcg32::seed_from_u64(seed);
        irq.rng = Pcg32::new(seed, 0xa02b_dbf7_bb3c_0a7f);
    }

    /// Fresh session: hide everything, forget held buttons, reset
    /// score/lives/clock, spawn the craft and a full wave
    pub fn reset_session(&mut self, irq: &mut Interrupts) {
        self.game = GameState::new(&self.settings);
        self.craft.hide();
        self.mothership.hide();
        self.boss_bullet.hide();
        for e in self.bullets.iter_mut().chain(self.aliens.iter_mut()) {
            e.hide();
        }

        irq.stand_down();
        irq.buttons.reset();
        irq.coarse.reset();

        self.spawn_craft();
        self.aim_tip = self.craft_center_pixel();
        self.spawn_wave(irq);
        log::info!("session started: {} lives", self.game.lives);
    }

    /// Drop the craft somewhere no alien is
    pub fn spawn_craft(&mut self) -> Placement {
        let protected: [&Entity; ALIEN_COUNT] = core::array::from_fn(|i| &self.aliens[i]);
        let placement = place(
            &mut self.craft,
            SpawnArea::SMALL,
            &protected,
            &mut self.rng,
            self.settings.spawn_retry_cap,
        );
        log::debug!("craft at {:?} after {} draws", placement.pos, placement.attempts);
        placement
    }

    /// Spawn alien `i` away from the craft and start its attack cooldown
    pub fn spawn_alien(&mut self, irq: &mut Interrupts, i: usize) -> Placement {
        irq.alien_arming[i].arm(&mut self.rng, ARM_LOW, ARM_HIGH);
        let placement = place(
            &mut self.aliens[i],
            SpawnArea::SMALL,
            &[&self.craft],
            &mut self.rng,
            self.settings.spawn_retry_cap,
        );
        log::debug!("alien {} at {:?}, armed {:.2}", i, placement.pos, irq.alien_arming[i].value());
        placement
    }

    pub fn spawn_wave(&mut self, irq: &mut Interrupts) {
        for i in 0..ALIEN_COUNT {
            self.spawn_alien(irq, i);
        }
    }

    /// Bring in the mothership with both of its cooldowns armed
    pub fn spawn_mothership(&mut self, irq: &mut Interrupts) -> Placement {
        irq.boss_arming.arm(&mut self.rng, ARM_LOW, ARM_HIGH);
        irq.boss_fire.arm(&mut self.rng, ARM_LOW, ARM_HIGH);
        let placement = place(
            &mut self.mothership,
            SpawnArea::MOTHERSHIP,
            &[&self.craft],
            &mut self.rng,
            self.settings.spawn_retry_cap,
        );
        log::info!("mothership at {:?} ({} hp)", placement.pos, self.game.boss_health);
        placement
    }

    pub fn aliens_cleared(&self) -> bool {
        self.aliens.iter().all(|a| !a.visible)
    }

    pub fn craft_center_pixel(&self) -> (i32, i32) {
        let (x, y) = self.craft.pixel();
        (x + 2, y + 2)
    }

    /// Fire a player bullet from the aim tip. False if all slots are busy.
    pub fn shoot(&mut self, degrees: i32) -> bool {
        let Some(bullet) = self.bullets.iter_mut().find(|b| !b.visible) else {
            return false;
        };
        let (x, y) = self.aim_tip;
        bullet.spawn_at(DVec2::new(x as f64, y as f64));
        bullet.vel = crate::direction((degrees as f64).to_radians()) * BULLET_SPEED;
        true
    }
}
