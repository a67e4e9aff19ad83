//! Entities and their bitmaps
//!
//! Bitmaps are packed row-major, most significant bit first, each row padded
//! to whole bytes. They are `'static` and shared by every entity using them.

use glam::DVec2;

use crate::to_pixel;

/// Immutable 1-bit image
#[derive(Debug, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u8,
    pub height: u8,
    pub rows: &'static [u8],
}

impl Bitmap {
    #[inline]
    fn stride(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }

    /// Whether the pixel at (col, row) is set; out of range is unset
    pub fn is_set(&self, col: i32, row: i32) -> bool {
        if col < 0 || row < 0 || col >= self.width as i32 || row >= self.height as i32 {
            return false;
        }
        let byte = self.rows[row as usize * self.stride() + col as usize / 8];
        byte & (0x80 >> (col % 8)) != 0
    }

    /// All set pixels as (col, row) offsets
    pub fn set_pixels(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (0..self.height as i32).flat_map(move |row| {
            (0..self.width as i32)
                .filter(move |&col| self.is_set(col, row))
                .map(move |col| (col, row))
        })
    }
}

pub static BULLET: Bitmap = Bitmap {
    width: 2,
    height: 2,
    rows: &[0b1100_0000, 0b1100_0000],
};

pub static CRAFT: Bitmap = Bitmap {
    width: 5,
    height: 5,
    rows: &[
        0b0010_0000,
        0b0111_0000,
        0b1111_1000,
        0b0111_0000,
        0b0010_0000,
    ],
};

pub static ALIEN: Bitmap = Bitmap {
    width: 5,
    height: 5,
    rows: &[
        0b0111_0000,
        0b0010_0000,
        0b1111_1000,
        0b0010_0000,
        0b0111_0000,
    ],
};

#[rustfmt::skip]
pub static MOTHERSHIP: Bitmap = Bitmap {
    width: 10,
    height: 8,
    rows: &[
        0b1111_1111, 0b1100_0000,
        0b1001_1110, 0b0100_0000,
        0b1001_1110, 0b0100_0000,
        0b1111_1111, 0b1100_0000,
        0b1101_1110, 0b1100_0000,
        0b1101_1110, 0b1100_0000,
        0b1101_1110, 0b1100_0000,
        0b1100_0000, 0b1100_0000,
    ],
};

/// A craft, bullet, alien or mothership slot
#[derive(Debug, Clone, Copy)]
pub struct Entity {
    pub pos: DVec2,
    pub vel: DVec2,
    pub visible: bool,
    pub shape: &'static Bitmap,
}

impl Entity {
    /// Hidden, motionless entity at the origin
    pub const fn new(shape: &'static Bitmap) -> Self {
        Self {
            pos: DVec2::ZERO,
            vel: DVec2::ZERO,
            visible: false,
            shape,
        }
    }

    /// Rounded pixel of the top-left corner
    #[inline]
    pub fn pixel(&self) -> (i32, i32) {
        (to_pixel(self.pos.x), to_pixel(self.pos.y))
    }

    /// Apply velocity; true if the drawn pixel changed
    pub fn step(&mut self) -> bool {
        self.nudge(self.vel)
    }

    /// Move by `delta`; true if the drawn pixel changed
    pub fn nudge(&mut self, delta: DVec2) -> bool {
        let before = self.pixel();
        self.pos += delta;
        before != self.pixel()
    }

    /// Make visible at `pos`, at rest
    pub fn spawn_at(&mut self, pos: DVec2) {
        self.pos = pos;
        self.vel = DVec2::ZERO;
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Whether the set pixel of this entity's bitmap covers absolute (x, y)
    pub fn covers(&self, x: i32, y: i32) -> bool {
        let (ox, oy) = self.pixel();
        self.shape.is_set(x - ox, y - oy)
    }
}
