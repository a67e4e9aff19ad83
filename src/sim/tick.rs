//! Periodic timer interrupt
//!
//! Runs every ~4 ms whether or not a session is in progress. It never touches
//! the `World`; anything the main loop must act on is posted as an `Event`.

use super::state::{Event, Interrupts};
use crate::consts::{ARM_HIGH, ARM_LOW, NUM_BUTTONS};

/// Hardware readings for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Raw pin states: left, right, up, down, fire-left, fire-right
    pub buttons: [bool; NUM_BUTTONS],
    /// 16-bit fine counter register
    pub fine_count: u32,
}

/// Service one timer tick
pub fn on_tick(irq: &mut Interrupts, input: &TickInput) {
    let now = irq.fine.elapsed_seconds(input.fine_count);
    let elapsed = now - irq.previous_time;
    irq.previous_time = now;

    // --- BUTTONS ---
    let releases = irq.buttons.sample(input.buttons);
    if !releases.is_empty() {
        log::trace!("released {:?}", releases);
    }
    for _ in releases.fire() {
        irq.events.push(Event::FireRequested);
    }

    // --- ARMING ---
    for (i, cooldown) in irq.alien_arming.iter_mut().enumerate() {
        if cooldown.tick(elapsed) {
            irq.events.push(Event::AlienAttack(i));
        }
    }

    if irq.boss_arming.tick(elapsed) {
        irq.events.push(Event::BossAttack);
    }

    // The gun re-arms straight away instead of waiting for a bounce
    if irq.boss_fire.tick(elapsed) {
        irq.events.push(Event::BossFire);
        irq.boss_fire.arm(&mut irq.rng, ARM_LOW, ARM_HIGH);
    }

    // --- TELEMETRY ---
    if irq.reporting && irq.status_interval > 0.0 {
        irq.status_timer += elapsed;
        if irq.status_timer >= irq.status_interval {
            irq.status_timer -= irq.status_interval;
            irq.events.push(Event::StatusDue);
        }
    }
}
