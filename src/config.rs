use crate::error::{Error, Result};
use crate::types::ColorId;

/// Fixed physics tick period, decoupled from the render cadence.
pub const TICK: f32 = 0.015;
pub const RENDER_HZ: f32 = 30.0;

/// World units per terminal cell; the world is sized in pixel-like units.
pub const CELL_PX_X: f32 = 8.0;
pub const CELL_PX_Y: f32 = 16.0;

/// Surfaces at or below this width get the smaller font band.
pub const SMALL_SURFACE_WIDTH: f32 = 800.0;
pub const FONT_RANGE_SMALL: (u32, u32) = (12, 16);
pub const FONT_RANGE_LARGE: (u32, u32) = (16, 20);

/// Terminal speed factor range, exclusive upper bound.
pub const SPEED_MIN: u32 = 1;
pub const SPEED_MAX: u32 = 10;

/// Approximate monospace advance as a fraction of the font size.
pub const GLYPH_ASPECT: f32 = 0.6;

#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum concurrent particles.
    pub max_texts: usize,
    /// Vertical spawn band margins, world units.
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub color: ColorId,
    /// Candidate strings; must be non-empty.
    pub texts: Vec<String>,
    /// Bounds for the randomized spawn delay, milliseconds.
    pub spawn_min_ms: u64,
    pub spawn_max_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_texts: 15,
            margin_top: 25.0,
            margin_bottom: 0.0,
            color: ColorId::White,
            texts: ["add", "your", "own", "texts", "here"]
                .into_iter()
                .map(String::from)
                .collect(),
            spawn_min_ms: 1000,
            spawn_max_ms: 2500,
        }
    }
}

impl Config {
    /// Fail-fast check run once at construction; nothing is built from a
    /// config that does not pass.
    pub fn validate(&self) -> Result<()> {
        if self.texts.is_empty() {
            return Err(Error::InvalidConfig("texts must not be empty".into()));
        }
        if self.spawn_min_ms > self.spawn_max_ms {
            return Err(Error::InvalidConfig(format!(
                "spawn cadence bounds inverted: {} > {}",
                self.spawn_min_ms, self.spawn_max_ms
            )));
        }
        Ok(())
    }
}
