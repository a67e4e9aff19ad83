//! Button debouncing
//!
//! Every tick shifts each channel's 8-bit history left and ORs the fresh pin
//! sample into bit 0. A channel only goes down after eight consecutive pressed
//! samples and only comes back up after eight consecutive released ones.

use crate::consts::NUM_BUTTONS;

/// Logical buttons, in the order the digital input collaborator reports them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Left = 0,
    Right = 1,
    Up = 2,
    Down = 3,
    FireLeft = 4,
    FireRight = 5,
}

impl Button {
    pub const ALL: [Button; NUM_BUTTONS] = [
        Button::Left,
        Button::Right,
        Button::Up,
        Button::Down,
        Button::FireLeft,
        Button::FireRight,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Releasing one of these shoots
    pub fn is_fire(self) -> bool {
        matches!(self, Button::FireLeft | Button::FireRight)
    }
}

/// Debounced state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Held {
    #[default]
    Up,
    Down,
}

/// One button's sample history and debounced state
#[derive(Debug, Clone, Copy, Default)]
struct ButtonChannel {
    history: u8,
    held: Held,
}

impl ButtonChannel {
    /// Shift in a sample; returns true on a Down -> Up edge
    fn sample(&mut self, pressed: bool) -> bool {
        self.history = (self.history << 1) | pressed as u8;
        match (self.history, self.held) {
            (0xFF, Held::Up) => {
                self.held = Held::Down;
                false
            }
            (0x00, Held::Down) => {
                self.held = Held::Up;
                true
            }
            _ => false,
        }
    }
}

/// Buttons that completed a Down -> Up edge during one sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Releases(u8);

impl Releases {
    pub fn contains(&self, button: Button) -> bool {
        self.0 & (1 << button.index()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Released fire buttons, in channel order
    pub fn fire(&self) -> impl Iterator<Item = Button> + '_ {
        Button::ALL
            .into_iter()
            .filter(|b| b.is_fire() && self.contains(*b))
    }
}

/// Shift-register debouncer for all six buttons
#[derive(Debug, Clone, Default)]
pub struct Debouncer {
    channels: [ButtonChannel; NUM_BUTTONS],
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one tick's raw pin states
    pub fn sample(&mut self, raw: [bool; NUM_BUTTONS]) -> Releases {
        let mut released = 0u8;
        for (i, (channel, pressed)) in self.channels.iter_mut().zip(raw).enumerate() {
            if channel.sample(pressed) {
                released |= 1 << i;
            }
        }
        Releases(released)
    }

    #[inline]
    pub fn is_held(&self, button: Button) -> bool {
        self.channels[button.index()].held == Held::Down
    }

    /// Either fire button held (the menu gate)
    pub fn any_fire_held(&self) -> bool {
        self.is_held(Button::FireLeft) || self.is_held(Button::FireRight)
    }

    pub fn reset(&mut self) {
        self.channels = [ButtonChannel::default(); NUM_BUTTONS];
    }
}
