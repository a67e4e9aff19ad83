//! Alien Advance host driver
//!
//! Runs the game headless: simulated timers raise the same interrupts the
//! handheld would, an autopilot works the buttons and the aim knob, and a
//! scripted serial console types a few keys. The last frame is printed.
//!
//! `RUST_LOG` controls logging; `ALIEN_ADVANCE_SETTINGS` names a settings file.

use alien_advance::{
    Console, Settings,
    consts::{COARSE_RANGE, COUNTS_PER_TICK, FINE_RANGE, NUM_BUTTONS},
    platform::host::{FrameBuffer, LogTelemetry, SimTimer},
    platform::{AimInput, ButtonInput, Telemetry},
    sim::{Button, FrameInput, TickInput},
};

/// Main-loop passes to run
const FRAMES: u32 = 4000;
/// Timer ticks between two main-loop passes (about 33 ms)
const TICKS_PER_FRAME: u32 = 8;

/// Deterministic button and knob pattern, advanced once per tick
#[derive(Default)]
struct Autopilot {
    tick: u64,
}

impl ButtonInput for Autopilot {
    fn read_raw_buttons(&mut self) -> [bool; NUM_BUTTONS] {
        let t = self.tick;
        self.tick += 1;

        let mut raw = [false; NUM_BUTTONS];
        let sweep = (t / 300) % 4;
        raw[Button::Left.index()] = sweep == 0;
        raw[Button::Up.index()] = sweep == 1;
        raw[Button::Right.index()] = sweep == 2;
        raw[Button::Down.index()] = sweep == 3;
        // Hold long enough to debounce, then let go to fire
        raw[Button::FireLeft.index()] = t % 90 < 20;
        raw
    }
}

impl AimInput for Autopilot {
    fn read_aim(&mut self) -> u16 {
        ((self.tick * 5) % 1024) as u16
    }
}

/// Serial console that logs what it receives and types from a script
struct ScriptedSerial {
    out: LogTelemetry,
    script: &'static [u8],
    polls: usize,
}

impl Telemetry for ScriptedSerial {
    fn write_line(&mut self, text: &str) {
        self.out.write_line(text);
    }

    fn poll_key(&mut self) -> Option<u8> {
        self.polls += 1;
        if self.polls % 25 != 0 {
            return None;
        }
        let i = self.polls / 25 % self.script.len().max(1);
        self.script.get(i).copied()
    }
}

fn main() {
    env_logger::init();
    log::info!("Alien Advance (host) starting...");

    let settings = Settings::load();
    if let Ok(json) = settings.to_json() {
        log::debug!("settings: {}", json);
    }
    let mut console = Console::new(settings);
    let mut coarse = SimTimer::new(COARSE_RANGE);
    let mut fine = SimTimer::new(FINE_RANGE);
    let mut pad = Autopilot::default();
    let mut display = FrameBuffer::new();
    let mut serial = ScriptedSerial {
        out: LogTelemetry,
        script: b"wwdd ssaa ",
        polls: 0,
    };
    let mut sessions = 0;

    for _ in 0..FRAMES {
        for _ in 0..TICKS_PER_FRAME {
            for _ in 0..coarse.advance(COUNTS_PER_TICK) {
                console.on_coarse_overflow();
            }
            for _ in 0..fine.advance(COUNTS_PER_TICK) {
                console.on_fine_overflow();
            }
            let input = TickInput {
                buttons: pad.read_raw_buttons(),
                fine_count: fine.count,
            };
            console.on_tick(&input);
        }

        let input = FrameInput {
            aim: pad.read_aim(),
            coarse_count: coarse.count,
            fine_count: fine.count,
            key: None,
        };
        let report = console.frame(&input, &mut display, &mut serial);
        if report.session_started {
            coarse.clear();
            sessions += 1;
        }
    }

    let game = &console.world().game;
    println!("{}", display.to_ascii());
    println!(
        "{:?} after {} frames ({} lit pixels): {} session(s), score {}, lives {}, {:02}:{:02}",
        console.phase(),
        display.frames,
        display.lit_pixels(),
        sessions,
        game.score,
        game.lives,
        game.minutes,
        game.seconds
    );
}
