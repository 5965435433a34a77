use rand::Rng;

pub type ParticleId = u64;

pub const TEXT_MAX_DRAW: usize = 48;

/// Period between acceleration-phase steps, in seconds.
pub const PHASE_STEP_PERIOD: f32 = 0.040;

/// Fixed step used while settling back down to the terminal acceleration.
/// Deliberately coarser than the per-particle acceleration step.
pub const BRAKE_STEP: f32 = 0.1;

/// The eight compass points plus the null direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compass {
    None,
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Compass {
    pub fn vector(self) -> Direction {
        let (x, y) = match self {
            Compass::None => (0.0, 0.0),
            Compass::North => (0.0, -1.0),
            Compass::NorthEast => (1.0, -1.0),
            Compass::East => (1.0, 0.0),
            Compass::SouthEast => (1.0, 1.0),
            Compass::South => (0.0, 1.0),
            Compass::SouthWest => (-1.0, 1.0),
            Compass::West => (-1.0, 0.0),
            Compass::NorthWest => (-1.0, -1.0),
        };
        Direction { x, y }
    }
}

/// Unit motion vector fixed for the lifetime of a simulation run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Direction {
    pub x: f32,
    pub y: f32,
}

impl Direction {
    /// Uniformly picks one of `candidates`. The flow restricts the full
    /// compass to east/west, so the chosen vector is purely horizontal.
    pub fn pick<R: Rng + ?Sized>(candidates: &[Compass], rng: &mut R) -> Direction {
        candidates[rng.gen_range(0..candidates.len())].vector()
    }
}

/// Axis-aligned bounding box, a pure function of position and size.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Rect {
    /// Rectangle for a baseline position: the glyph box extends `font_size`
    /// above the baseline and `w` to the right of it.
    pub fn of(x: f32, y: f32, w: f32, font_size: f32) -> Rect {
        Rect {
            top: y - font_size,
            right: x + w,
            bottom: y,
            left: x,
        }
    }

    /// Strict separating-axis test: touching edges still count as overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        if self.left > other.right || other.left > self.right {
            return false;
        }
        if self.top > other.bottom || other.top > self.bottom {
            return false;
        }
        true
    }

    pub fn overlap_x(&self, other: &Rect) -> f32 {
        self.right.min(other.right) - self.left.max(other.left)
    }

    pub fn overlap_y(&self, other: &Rect) -> f32 {
        self.bottom.min(other.bottom) - self.top.max(other.top)
    }
}

/// Kinematic state a particle's acceleration is progressing through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Accelerating,
    Decelerating,
    Cruising,
}

/// Outcome of one particle advance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Motion {
    Flowing,
    /// Trailing edge fully crossed the exit bound; the world evicts it.
    Exited,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorId {
    White,
    Cyan,
    Blue,
    Yellow,
    Magenta,
    Red,
    Gray,
}

/// One floating line of text.
///
/// Acceleration doubles as speed: `advance` copies `ax`/`ay` into `vx`/`vy`
/// each tick instead of integrating, which gives the smooth drift the flow
/// is after rather than physically accurate motion.
#[derive(Clone, Debug)]
pub struct Particle {
    pub id: ParticleId,
    pub text: String,
    pub color: ColorId,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub font_size: f32,
    pub ax: f32,
    pub ay: f32,
    pub vx: f32,
    pub vy: f32,
    /// Terminal horizontal acceleration, signed by the travel direction.
    pub max_ax: f32,
    pub rect: Rect,
    phase: Phase,
    phase_clock: f32,
    acceleration_step: f32,
}

impl Particle {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ParticleId,
        text: String,
        color: ColorId,
        x: f32,
        y: f32,
        w: f32,
        font_size: f32,
        max_ax: f32,
    ) -> Self {
        Self {
            id,
            text,
            color,
            x,
            y,
            w,
            font_size,
            ax: 0.0,
            ay: 0.0,
            vx: 0.0,
            vy: 0.0,
            max_ax,
            rect: Rect::of(x, y, w, font_size),
            phase: Phase::Accelerating,
            phase_clock: 0.0,
            // Larger glyphs ramp up more slowly, a parallax-like depth cue.
            acceleration_step: 1.0 / font_size,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Nudge toward the trailing particle's acceleration, scaled by the
    /// font-size ratio, then settle back down. Named for its effect on the
    /// other particle in the pair, not for the phase it enters.
    pub fn boost_up(&mut self, other_ax: f32, other_font_size: f32) {
        self.ax += (other_ax - self.ax) * (other_font_size / self.font_size);
        self.phase = Phase::Decelerating;
        self.phase_clock = 0.0;
    }

    /// Shed acceleration toward zero, scaled by the font-size ratio, then
    /// ramp back up.
    pub fn brake_down(&mut self, other_font_size: f32) {
        self.ax -= self.ax * (other_font_size / self.font_size);
        self.phase = Phase::Accelerating;
        self.phase_clock = 0.0;
    }

    /// One fixed-tick update: run due phase steps, move, refresh the rect,
    /// and report whether the trailing edge left the world.
    pub fn advance(&mut self, dt: f32, direction: Direction, world_width: f32) -> Motion {
        self.step_phase(dt, direction);

        self.vx = self.ax;
        self.vy = self.ay;
        self.x += self.vx;
        self.y += self.vy;
        self.rect = Rect::of(self.x, self.y, self.w, self.font_size);

        if direction.x < 0.0 {
            if self.rect.right < 0.0 {
                return Motion::Exited;
            }
        } else if self.rect.left > world_width {
            return Motion::Exited;
        }
        Motion::Flowing
    }

    fn step_phase(&mut self, dt: f32, direction: Direction) {
        self.phase_clock += dt;
        while self.phase_clock >= PHASE_STEP_PERIOD {
            self.phase_clock -= PHASE_STEP_PERIOD;
            match self.phase {
                Phase::Accelerating => {
                    self.ax += self.acceleration_step * direction.x;
                    if self.ax.abs() >= self.max_ax.abs() {
                        self.ax = self.max_ax;
                        self.phase = Phase::Cruising;
                    }
                }
                Phase::Decelerating => {
                    self.ax += BRAKE_STEP * direction.x;
                    if self.ax.abs() <= self.max_ax.abs() {
                        self.ax = self.max_ax;
                        self.phase = Phase::Cruising;
                    }
                }
                Phase::Cruising => {}
            }
        }
    }
}

/// Read-only copy handed to the renderer each frame.
#[derive(Clone, Copy, Debug)]
pub struct ParticleSnapshot {
    pub id: ParticleId,
    pub text: [char; TEXT_MAX_DRAW],
    pub text_len: usize,
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
    pub color: ColorId,
}
