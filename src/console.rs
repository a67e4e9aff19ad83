//! The handheld's top-level flow: title menu, countdown, play, game over
//!
//! `Console` owns both halves of the game state and hands the right half to
//! each entry point: `on_tick` and the overflow handlers run in interrupt
//! context, `frame` is one pass of the main loop.

use crate::Settings;
use crate::consts::LCD_X;
use crate::platform::{Display, Telemetry, send_debug};
use crate::sim::{FrameInput, Interrupts, StepOutcome, TickInput, World, on_tick, step};

const GREETING: &str = "Greetings from Alien Advance. Debugger initialised.";

/// Digits shown before a session starts
const COUNTDOWN_FROM: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    /// Title screen; a held fire button leaves it
    Menu,
    /// Showing `remaining` until the fine clock reaches `next_at`
    Countdown { remaining: u8, next_at: f64 },
    Playing,
    /// `ready` once every fire button has been let go
    GameOver { ready: bool },
}

/// What the driver needs to know after a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub phase: Phase,
    /// A session began this frame; the coarse counter register must be cleared
    pub session_started: bool,
}

pub struct Console {
    irq: Interrupts,
    world: World,
    phase: Phase,
    greeted: bool,
    /// Sessions started so far; offsets the seed of each new one
    sessions: u64,
    base_seed: u64,
}

impl Console {
    pub fn new(settings: Settings) -> Self {
        Self {
            irq: Interrupts::new(&settings),
            world: World::new(settings),
            phase: Phase::Menu,
            greeted: false,
            sessions: 0,
            base_seed: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn interrupts(&self) -> &Interrupts {
        &self.irq
    }

    // --- interrupt context ---

    /// Periodic timer interrupt
    pub fn on_tick(&mut self, input: &TickInput) {
        on_tick(&mut self.irq, input);
    }

    /// 8-bit counter wrapped
    pub fn on_coarse_overflow(&mut self) {
        self.irq.coarse.record_overflow();
    }

    /// 16-bit counter wrapped
    pub fn on_fine_overflow(&mut self) {
        self.irq.fine.record_overflow();
    }

    // --- main loop ---

    /// Run one main-loop pass for the current phase
    pub fn frame<D, T>(&mut self, input: &FrameInput, display: &mut D, telemetry: &mut T) -> FrameReport
    where
        D: Display + ?Sized,
        T: Telemetry + ?Sized,
    {
        let now = self.irq.fine.elapsed_seconds(input.fine_count);
        if !self.greeted && telemetry.connected() {
            self.greeted = true;
            if self.world.settings.telemetry {
                send_debug(&mut *telemetry, now, format_args!("{}", GREETING));
            }
        }

        let mut session_started = false;
        match self.phase {
            Phase::Menu => {
                draw_title(display, None);
                if self.irq.buttons.any_fire_held() {
                    self.base_seed = self.world.settings.seed.unwrap_or(input.fine_count as u64);
                    log::info!("leaving menu, seed {}", self.base_seed);
                    self.begin_countdown(now);
                }
            }
            Phase::Countdown { remaining, next_at } => {
                draw_title(display, Some(remaining));
                if now >= next_at {
                    if remaining > 1 {
                        self.phase = Phase::Countdown {
                            remaining: remaining - 1,
                            next_at: next_at + self.world.settings.countdown_step_secs,
                        };
                    } else {
                        self.start_session();
                        session_started = true;
                    }
                }
            }
            Phase::Playing => {
                let mut input = input.clone();
                if input.key.is_none() {
                    input.key = telemetry.poll_key();
                }
                let outcome = step(&mut self.world, &mut self.irq, &input, display, telemetry);
                if outcome == StepOutcome::GameOver {
                    self.end_session();
                }
            }
            Phase::GameOver { ready } => {
                draw_game_over(display);
                let held = self.irq.buttons.any_fire_held();
                if !ready && !held {
                    self.phase = Phase::GameOver { ready: true };
                } else if ready && held {
                    self.begin_countdown(now);
                }
            }
        }

        FrameReport {
            phase: self.phase,
            session_started,
        }
    }

    fn begin_countdown(&mut self, now: f64) {
        self.phase = Phase::Countdown {
            remaining: COUNTDOWN_FROM,
            next_at: now + self.world.settings.countdown_step_secs,
        };
    }

    fn start_session(&mut self) {
        let seed = self.base_seed.wrapping_add(self.sessions);
        self.sessions += 1;
        self.world.reseed(&mut self.irq, seed);
        // Also drops the release of the button that left the menu
        self.world.reset_session(&mut self.irq);
        self.irq.reporting = true;
        self.phase = Phase::Playing;
        log::info!("session {} started (seed {})", self.sessions, seed);
    }

    fn end_session(&mut self) {
        self.irq.reporting = false;
        self.irq.stand_down();
        self.phase = Phase::GameOver { ready: false };
        log::info!(
            "session {} over: score {}, {:02}:{:02}",
            self.sessions,
            self.world.game.score,
            self.world.game.minutes,
            self.world.game.seconds
        );
    }
}

fn draw_title<D: Display + ?Sized>(display: &mut D, countdown: Option<u8>) {
    display.clear();
    display.draw_text(1, 0, "Alien Advance");
    display.draw_text(1, 24, "Press a button");
    display.draw_text(1, 32, "to continue...");
    if let Some(digit) = countdown {
        let mut text: heapless::String<4> = heapless::String::new();
        let _ = core::fmt::Write::write_fmt(&mut text, format_args!("{}", digit));
        display.draw_text((LCD_X - 1) / 2, 40, &text);
    }
    display.present();
}

fn draw_game_over<D: Display + ?Sized>(display: &mut D) {
    display.clear();
    display.draw_text((LCD_X - 9 * 5) / 2, 0, "GAME OVER");
    display.draw_text(1, 16, "You have lost");
    display.draw_text(1, 24, "Alien Advance");
    display.draw_text(1, 32, "Press a button");
    display.draw_text(1, 40, "to restart...");
    display.present();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{COARSE_RANGE, COUNTS_PER_TICK, FINE_RANGE, NUM_BUTTONS};
    use crate::platform::host::{FrameBuffer, MemoryTelemetry, SimTimer};
    use crate::sim::Button;
    use glam::DVec2;

    const FIRE: [bool; NUM_BUTTONS] = [false, false, false, false, true, false];
    const NONE: [bool; NUM_BUTTONS] = [false; NUM_BUTTONS];

    struct Bench {
        console: Console,
        coarse: SimTimer,
        fine: SimTimer,
        display: FrameBuffer,
        telemetry: MemoryTelemetry,
    }

    impl Bench {
        fn new() -> Self {
            let settings = Settings {
                seed: Some(7),
                ..Settings::default()
            };
            Self {
                console: Console::new(settings),
                coarse: SimTimer::new(COARSE_RANGE),
                fine: SimTimer::new(FINE_RANGE),
                display: FrameBuffer::new(),
                telemetry: MemoryTelemetry::default(),
            }
        }

        fn ticks(&mut self, n: usize, buttons: [bool; NUM_BUTTONS]) {
            for _ in 0..n {
                for _ in 0..self.coarse.advance(COUNTS_PER_TICK) {
                    self.console.on_coarse_overflow();
                }
                for _ in 0..self.fine.advance(COUNTS_PER_TICK) {
                    self.console.on_fine_overflow();
                }
                self.console.on_tick(&TickInput {
                    buttons,
                    fine_count: self.fine.count,
                });
            }
        }

        fn frame(&mut self) -> FrameReport {
            let input = FrameInput {
                aim: 0,
                coarse_count: self.coarse.count,
                fine_count: self.fine.count,
                key: None,
            };
            let report = self.console.frame(&input, &mut self.display, &mut self.telemetry);
            if report.session_started {
                self.coarse.clear();
            }
            report
        }

        /// Press fire on the menu and run the countdown out
        fn start(&mut self) {
            self.ticks(10, FIRE);
            self.frame();
            for _ in 0..400 {
                self.ticks(2, NONE);
                if self.frame().session_started {
                    return;
                }
            }
            panic!("countdown never finished");
        }
    }

    #[test]
    fn test_menu_waits_for_fire() {
        let mut b = Bench::new();
        b.ticks(50, NONE);
        assert_eq!(b.frame().phase, Phase::Menu);
        assert!(b.display.has_text("Press a button"));

        b.ticks(10, FIRE);
        assert!(matches!(b.frame().phase, Phase::Countdown { remaining: 3, .. }));
        assert!(b.display.has_text("3"));
    }

    #[test]
    fn test_greeting_sent_once() {
        let mut b = Bench::new();
        b.frame();
        b.frame();
        let greetings = b.telemetry.lines.iter().filter(|l| l.contains("Greetings")).count();
        assert_eq!(greetings, 1);
    }

    #[test]
    fn test_countdown_runs_three_steps() {
        let mut b = Bench::new();
        b.ticks(10, FIRE);
        b.frame();
        // 0.9 s is about 220 ticks
        b.ticks(100, NONE);
        assert!(matches!(b.frame().phase, Phase::Countdown { remaining: 2, .. }));
        b.ticks(80, NONE);
        assert!(matches!(b.frame().phase, Phase::Countdown { remaining: 1, .. }));
        b.ticks(60, NONE);
        let report = b.frame();
        assert_eq!(report.phase, Phase::Playing);
        assert!(report.session_started);
    }

    #[test]
    fn test_menu_release_does_not_shoot() {
        let mut b = Bench::new();
        b.start();
        assert!(!b.console.irq.buttons.is_held(Button::FireLeft));
        b.frame();
        assert!(b.console.world().bullets.iter().all(|e| !e.visible));
        assert!(b.console.world().craft.visible);
    }

    #[test]
    fn test_menu_button_held_through_countdown_never_fires() {
        let mut b = Bench::new();
        b.ticks(10, FIRE);
        b.frame();
        let mut started = false;
        for _ in 0..400 {
            b.ticks(2, FIRE);
            if b.frame().session_started {
                started = true;
                break;
            }
        }
        assert!(started);

        b.ticks(10, NONE);
        b.frame();
        let shots = b.console.world().bullets.iter().filter(|e| e.visible).count();
        assert_eq!(shots, 0);
    }

    #[test]
    fn test_status_lines_while_playing() {
        let mut b = Bench::new();
        b.start();
        assert!(!b.telemetry.contains("Location: ("));
        b.ticks(130, NONE);
        b.frame();
        assert!(b.telemetry.contains("Location: ("));
    }

    #[test]
    fn test_serial_key_fires() {
        let mut b = Bench::new();
        b.start();
        let world = &mut b.console.world;
        world.craft.spawn_at(DVec2::new(20.0, 30.0));
        for (i, alien) in world.aliens.iter_mut().enumerate() {
            alien.spawn_at(DVec2::new(70.0, 14.0 + 6.0 * i as f64));
        }
        b.frame();
        b.telemetry.keys.push(b' ');
        b.frame();
        assert_eq!(b.console.world().bullets.iter().filter(|e| e.visible).count(), 1);
    }

    #[test]
    fn test_same_seed_same_session() {
        let mut a = Bench::new();
        let mut b = Bench::new();
        a.start();
        b.start();
        let pa: Vec<DVec2> = a.console.world().aliens.iter().map(|e| e.pos).collect();
        let pb: Vec<DVec2> = b.console.world().aliens.iter().map(|e| e.pos).collect();
        assert_eq!(pa, pb);
    }

    #[test]
    fn test_game_over_needs_release_then_press() {
        let mut b = Bench::new();
        b.start();
        b.console.world.game.lives = 1;
        let craft = b.console.world.craft.pos;
        b.console.world.aliens[0].spawn_at(craft);

        b.ticks(10, FIRE);
        assert_eq!(b.frame().phase, Phase::GameOver { ready: false });
        assert!(b.display.has_text("GAME OVER"));
        assert!(!b.console.interrupts().reporting);

        // Still holding the button from the last session
        assert_eq!(b.frame().phase, Phase::GameOver { ready: false });

        b.ticks(10, NONE);
        assert_eq!(b.frame().phase, Phase::GameOver { ready: true });
        b.ticks(10, FIRE);
        assert!(matches!(b.frame().phase, Phase::Countdown { .. }));
    }
}
