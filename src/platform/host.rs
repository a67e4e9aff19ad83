//! In-memory stand-ins for the handheld's peripherals

use super::{Display, Telemetry};
use crate::consts::{LCD_X, LCD_Y};

const W: usize = LCD_X as usize;
const H: usize = LCD_Y as usize;

/// Monochrome framebuffer with a text overlay.
///
/// Drawing goes to a back buffer; `present` copies it to the front buffer,
/// which is what `pixel`, `lit_pixels` and `to_ascii` report.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    back: [[bool; W]; H],
    front: [[bool; W]; H],
    back_text: Vec<(i32, i32, String)>,
    front_text: Vec<(i32, i32, String)>,
    pub frames: u64,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self {
            back: [[false; W]; H],
            front: [[false; W]; H],
            back_text: Vec::new(),
            front_text: Vec::new(),
            frames: 0,
        }
    }
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Presented pixel; off-screen reads as off
    pub fn pixel(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= LCD_X || y >= LCD_Y {
            return false;
        }
        self.front[y as usize][x as usize]
    }

    pub fn lit_pixels(&self) -> usize {
        self.front.iter().flatten().filter(|p| **p).count()
    }

    /// Whether any text run of the presented frame contains `needle`
    #[cfg(test)]
    pub fn has_text(&self, needle: &str) -> bool {
        self.front_text.iter().any(|(_, _, t)| t.contains(needle))
    }

    /// `#`/`.` dump of the presented frame followed by its text runs
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((W + 1) * H + 64);
        for row in &self.front {
            out.extend(row.iter().map(|&p| if p { '#' } else { '.' }));
            out.push('\n');
        }
        for (x, y, text) in &self.front_text {
            out.push_str(&format!("({x:2},{y:2}) {text}\n"));
        }
        out
    }
}

impl Display for FrameBuffer {
    fn clear(&mut self) {
        self.back = [[false; W]; H];
        self.back_text.clear();
    }

    fn draw_pixel(&mut self, x: i32, y: i32, on: bool) {
        if x < 0 || y < 0 || x >= LCD_X || y >= LCD_Y {
            return;
        }
        self.back[y as usize][x as usize] = on;
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        // Bresenham, all octants
        let (dx, dy) = ((x1 - x0).abs(), -(y1 - y0).abs());
        let (sx, sy) = ((x1 - x0).signum(), (y1 - y0).signum());
        let (mut x, mut y, mut err) = (x0, y0, dx + dy);
        loop {
            self.draw_pixel(x, y, true);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str) {
        self.back_text.push((x, y, text.to_string()));
    }

    fn present(&mut self) {
        self.front = self.back;
        self.front_text = self.back_text.clone();
        self.frames += 1;
    }
}

/// Collects every telemetry line
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct MemoryTelemetry {
    pub connected: bool,
    pub lines: Vec<String>,
    /// Bytes returned by `poll_key`, front first
    pub keys: Vec<u8>,
}

#[cfg(test)]
impl Default for MemoryTelemetry {
    fn default() -> Self {
        Self {
            connected: true,
            lines: Vec::new(),
            keys: Vec::new(),
        }
    }
}

#[cfg(test)]
impl MemoryTelemetry {
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }
}

#[cfg(test)]
impl Telemetry for MemoryTelemetry {
    fn connected(&self) -> bool {
        self.connected
    }

    fn write_line(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }

    fn poll_key(&mut self) -> Option<u8> {
        if self.keys.is_empty() {
            None
        } else {
            Some(self.keys.remove(0))
        }
    }
}

/// Forwards telemetry to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTelemetry;

impl Telemetry for LogTelemetry {
    fn write_line(&mut self, text: &str) {
        log::info!(target: "telemetry", "{}", text);
    }
}

/// Free-running counter register with wraparound
#[derive(Debug, Clone)]
pub struct SimTimer {
    pub count: u32,
    range: u32,
}

impl SimTimer {
    pub fn new(range: u32) -> Self {
        Self { count: 0, range }
    }

    /// Advance by `counts`; returns how many times the register wrapped
    pub fn advance(&mut self, counts: u32) -> u32 {
        let total = self.count as u64 + counts as u64;
        self.count = (total % self.range as u64) as u32;
        (total / self.range as u64) as u32
    }

    pub fn clear(&mut self) {
        self.count = 0;
    }
}
