//! Deterministic simulation module
//!
//! All gameplay logic lives here. Two entry points mirror the two execution
//! contexts of the handheld:
//! - `tick::on_tick`: the periodic timer interrupt (clocks, buttons, cooldowns)
//! - `step::step`: one iteration of the cooperative main loop
//!
//! The contexts only talk through the event queue in `state::Interrupts`.

pub mod clock;
pub mod collision;
pub mod cooldown;
pub mod input;
pub mod sprite;
pub mod state;
pub mod step;
pub mod tick;

pub use clock::{Clock, ClockSpec};
pub use collision::{SpawnArea, overlaps, place};
pub use cooldown::Cooldown;
pub use input::{Button, Debouncer, Releases};
pub use sprite::{Bitmap, Entity};
pub use state::{Event, EventQueue, GameState, Interrupts, World};
pub use step::{FrameInput, StepOutcome, step};
pub use tick::{TickInput, on_tick};
