use crate::types::{
    ColorId, Direction, Motion, Particle, ParticleId, ParticleSnapshot, TEXT_MAX_DRAW,
};

/// The simulation: owns the live particle collection and the fixed-period
/// physics tick. Particles are only ever added and removed here.
pub struct World {
    pub particles: Vec<Particle>,
    direction: Direction,
    pub width: f32,
    pub height: f32,
    next_id: ParticleId,
    exited: Vec<ParticleId>,
}

impl World {
    pub fn new(direction: Direction, width: f32, height: f32) -> Self {
        Self {
            particles: Vec::new(),
            direction,
            width,
            height,
            next_id: 1,
            exited: Vec::new(),
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_text(
        &mut self,
        text: String,
        color: ColorId,
        x: f32,
        y: f32,
        w: f32,
        font_size: f32,
        max_ax: f32,
    ) -> ParticleId {
        let id = self.next_id();
        self.particles
            .push(Particle::new(id, text, color, x, y, w, font_size, max_ax));
        id
    }

    /// One physics tick: advance every particle, run the pairwise collision
    /// pass, then evict everything that left the world. The three steps are
    /// one atomic unit relative to `snapshot`.
    pub fn tick(&mut self, dt: f32) {
        self.exited.clear();
        let direction = self.direction;
        let width = self.width;
        for particle in &mut self.particles {
            if particle.advance(dt, direction, width) == Motion::Exited {
                self.exited.push(particle.id);
            }
        }

        self.resolve_collisions();

        if !self.exited.is_empty() {
            let exited = std::mem::take(&mut self.exited);
            self.particles.retain(|p| !exited.contains(&p.id));
            self.exited = exited;
        }
    }

    pub fn snapshot(&self, out: &mut Vec<ParticleSnapshot>) {
        out.clear();
        for particle in &self.particles {
            let mut text = [' '; TEXT_MAX_DRAW];
            let mut len = 0;
            for (idx, ch) in particle.text.chars().take(TEXT_MAX_DRAW).enumerate() {
                text[idx] = ch;
                len = idx + 1;
            }
            out.push(ParticleSnapshot {
                id: particle.id,
                text,
                text_len: len,
                x: particle.x,
                y: particle.y,
                font_size: particle.font_size,
                color: particle.color,
            });
        }
    }

    fn next_id(&mut self) -> ParticleId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// O(n²) pass, each unordered pair once in collection order. Small
    /// populations by design (the spawn cap), so no spatial pruning.
    fn resolve_collisions(&mut self) {
        for i in 0..self.particles.len() {
            for j in (i + 1)..self.particles.len() {
                let (head, tail) = self.particles.split_at_mut(j);
                let a = &mut head[i];
                let b = &mut tail[0];

                if !a.rect.overlaps(&b.rect) {
                    continue;
                }

                // Dominant axis by overlap extent; ties go to y. An
                // x-dominant overlap is detected but draws no response.
                let overlap_x = a.rect.overlap_x(&b.rect);
                let overlap_y = a.rect.overlap_y(&b.rect);
                if overlap_x > overlap_y {
                    continue;
                }

                // The particle ahead along the travel direction gets a
                // forward nudge from the one catching up; the trailing one
                // settles behind it.
                let (ahead, trailing) = if self.direction.x < 0.0 {
                    if a.rect.left < b.rect.left {
                        (a, b)
                    } else {
                        (b, a)
                    }
                } else if a.rect.right > b.rect.right {
                    (a, b)
                } else {
                    (b, a)
                };

                let trailing_ax = trailing.ax;
                let trailing_font = trailing.font_size;
                let ahead_font = ahead.font_size;
                ahead.boost_up(trailing_ax, trailing_font);
                trailing.brake_down(ahead_font);
            }
        }
    }
}
