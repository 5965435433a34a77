use std::time::Duration;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    config::{self, Config},
    core::World,
    error::Result,
    types::ParticleId,
};

/// Synchronous width measurement supplied by the rendering surface. The
/// spawner asks for it before a particle exists.
pub trait TextMetrics {
    /// Width of `text` rendered at `font_size`, in world units.
    fn measure(&self, text: &str, font_size: f32) -> f32;
}

/// Feeds the world with new particles on a randomized cadence. Holds no
/// particles itself; everything spawned is handed to the world.
pub struct TextWriter {
    config: Config,
    width: f32,
    height: f32,
    rng: StdRng,
}

impl TextWriter {
    pub fn new(config: Config, width: f32, height: f32) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            width,
            height,
            rng: StdRng::from_entropy(),
        })
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    /// Delay until the next spawn attempt; drawn fresh after every attempt
    /// whether or not a particle was spawned.
    pub fn next_delay(&mut self) -> Duration {
        let ms = self
            .rng
            .gen_range(self.config.spawn_min_ms..=self.config.spawn_max_ms);
        Duration::from_millis(ms)
    }

    /// One spawn attempt. Does nothing when the world is at the population
    /// cap.
    pub fn try_spawn(
        &mut self,
        world: &mut World,
        metrics: &dyn TextMetrics,
    ) -> Option<ParticleId> {
        if world.len() >= self.config.max_texts {
            return None;
        }

        let direction = world.direction();
        let (font_min, font_max) = if self.width <= config::SMALL_SURFACE_WIDTH {
            config::FONT_RANGE_SMALL
        } else {
            config::FONT_RANGE_LARGE
        };
        let font_size = self.rng.gen_range(font_min..font_max) as f32;

        let text = self.config.texts[self.rng.gen_range(0..self.config.texts.len())].clone();
        let w = metrics.measure(&text, font_size);

        // Enter just outside the surface on the edge opposite the travel.
        let x = if direction.x < 0.0 { self.width } else { -w };
        let y = self.spawn_y(font_size);
        let max_ax =
            self.rng.gen_range(config::SPEED_MIN..config::SPEED_MAX) as f32 * direction.x;

        Some(world.add_text(
            text,
            self.config.color,
            x,
            y,
            w,
            font_size,
            max_ax,
        ))
    }

    fn spawn_y(&mut self, font_size: f32) -> f32 {
        let min = self.config.margin_top;
        let max = self.height - self.config.margin_bottom - self.config.margin_top - font_size;
        if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }
}
