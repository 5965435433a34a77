use std::{
    io,
    time::{Duration, Instant},
};

use crossterm::{
    event::{
        self, DisableFocusChange, EnableFocusChange, Event as CrosstermEvent, KeyCode,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use rand::{rngs::StdRng, SeedableRng};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction as LayoutDirection, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Terminal,
};

use crate::{
    config::{self, Config},
    core::World,
    error::Result,
    render,
    spawner::{TextMetrics, TextWriter},
    types::{ColorId, Compass, Direction, ParticleSnapshot},
};

/// One simulation run: world, writer, their shared direction, and the timer
/// state driving them. All scheduling is cooperative; `update` is the only
/// place anything fires, so a stopped session can have nothing pending.
pub struct Session {
    pub world: World,
    writer: TextWriter,
    active: bool,
    sim_accum: f32,
    last_update: Option<Duration>,
    spawn_at: Option<Duration>,
}

impl Session {
    pub fn new(config: Config, width: f32, height: f32) -> Result<Self> {
        let mut rng = StdRng::from_entropy();
        let direction = Direction::pick(&[Compass::East, Compass::West], &mut rng);
        let writer = TextWriter::new(config, width, height)?;
        Ok(Self {
            world: World::new(direction, width, height),
            writer,
            active: false,
            sim_accum: 0.0,
            last_update: None,
            spawn_at: None,
        })
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn spawn_pending(&self) -> bool {
        self.spawn_at.is_some()
    }

    /// Idempotent: a second start changes nothing.
    pub fn start(&mut self, now: Duration) {
        if self.active {
            return;
        }
        self.active = true;
        self.last_update = Some(now);
        let delay = self.writer.next_delay();
        self.spawn_at = Some(now + delay);
    }

    /// Idempotent: cancels the pending spawn deadline and drains the tick
    /// accumulator so nothing fires into a stopped session.
    pub fn stop(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.spawn_at = None;
        self.last_update = None;
        self.sim_accum = 0.0;
    }

    /// Visibility-change handling: one global active flag, flipped whole.
    pub fn toggle(&mut self, now: Duration) {
        if self.active {
            self.stop();
        } else {
            self.start(now);
        }
    }

    /// Runs every physics tick and spawn attempt due by `now`. Each tick is
    /// atomic; a snapshot taken between updates never sees a half-moved set.
    pub fn update(&mut self, now: Duration, metrics: &dyn TextMetrics) {
        if !self.active {
            return;
        }

        if let Some(last) = self.last_update {
            self.sim_accum += now.saturating_sub(last).as_secs_f32();
        }
        self.last_update = Some(now);

        while self.sim_accum >= config::TICK {
            self.world.tick(config::TICK);
            self.sim_accum -= config::TICK;
        }

        if let Some(at) = self.spawn_at {
            if now >= at {
                self.writer.try_spawn(&mut self.world, metrics);
                // re-armed after every attempt, spawned or not
                self.spawn_at = Some(now + self.writer.next_delay());
            }
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.world.resize(width, height);
        self.writer.resize(width, height);
    }
}

/// Terminal cells to world units.
fn world_bounds(cols: u16, rows: u16) -> (f32, f32) {
    (
        cols as f32 * config::CELL_PX_X,
        rows as f32 * config::CELL_PX_Y,
    )
}

pub fn run() -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let size = terminal.size()?;
    let (width, height) = world_bounds(size.width, size.height.saturating_sub(3));

    let mut session = Session::new(Config::default(), width, height)?;
    let metrics = render::CellMetrics;
    let mut snapshot: Vec<ParticleSnapshot> = Vec::new();
    let mut screen = Screen::new();

    let origin = Instant::now();
    session.start(origin.elapsed());

    let render_interval = Duration::from_secs_f32(1.0 / config::RENDER_HZ);
    let mut last_render = Instant::now();

    loop {
        session.update(origin.elapsed(), &metrics);

        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                CrosstermEvent::Key(key) => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        shutdown_terminal(&mut terminal)?;
                        return Ok(());
                    }
                    KeyCode::Char('p') | KeyCode::Char(' ') => {
                        session.toggle(origin.elapsed());
                    }
                    _ => {}
                },
                CrosstermEvent::FocusLost => session.stop(),
                CrosstermEvent::FocusGained => session.start(origin.elapsed()),
                CrosstermEvent::Resize(cols, rows) => {
                    let (w, h) = world_bounds(cols, rows.saturating_sub(3));
                    session.resize(w, h);
                }
                _ => {}
            }
        }

        if last_render.elapsed() >= render_interval {
            session.world.snapshot(&mut snapshot);
            let count = snapshot.len();
            let active = session.is_active();

            terminal.draw(|frame| {
                let chunks = Layout::default()
                    .direction(LayoutDirection::Vertical)
                    .constraints([Constraint::Min(3), Constraint::Length(3)])
                    .split(frame.size());

                screen.ensure_viewport(chunks[0].width, chunks[0].height);
                render::draw(
                    &snapshot,
                    render::Viewport {
                        width: chunks[0].width,
                        height: chunks[0].height,
                    },
                    &mut screen.framebuf,
                );

                let framebuf = &screen.framebuf;
                let lines: Vec<Line> = (0..framebuf.height())
                    .map(|y| {
                        let spans: Vec<Span> = (0..framebuf.width())
                            .map(|x| {
                                let cell = framebuf.get(x, y);
                                Span::styled(
                                    cell.ch.to_string(),
                                    Style::default().fg(color_for(cell.color)),
                                )
                            })
                            .collect();
                        Line::from(spans)
                    })
                    .collect();

                let viewport = Paragraph::new(lines)
                    .block(Block::default().borders(Borders::ALL).title("textflow"));
                frame.render_widget(viewport, chunks[0]);

                let state = if active { "flowing" } else { "paused" };
                let footer = Paragraph::new(format!(
                    "texts: {count} | {state} | p/space: pause | q: quit"
                ))
                .block(Block::default().borders(Borders::ALL).title("Controls"));
                frame.render_widget(footer, chunks[1]);
            })?;

            last_render = Instant::now();
        }

        std::thread::sleep(Duration::from_millis(1));
    }
}

fn shutdown_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableFocusChange)?;
    terminal.show_cursor()?;
    Ok(())
}

struct Screen {
    framebuf: render::FrameBuffer,
}

impl Screen {
    fn new() -> Self {
        Self {
            framebuf: render::FrameBuffer::new(0, 0),
        }
    }

    fn ensure_viewport(&mut self, width: u16, height: u16) {
        if self.framebuf.width() != width || self.framebuf.height() != height {
            self.framebuf.resize(width, height);
        }
    }
}

fn color_for(color: ColorId) -> Color {
    match color {
        ColorId::White => Color::White,
        ColorId::Cyan => Color::Cyan,
        ColorId::Blue => Color::Blue,
        ColorId::Yellow => Color::Yellow,
        ColorId::Magenta => Color::Magenta,
        ColorId::Red => Color::Red,
        ColorId::Gray => Color::DarkGray,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedMetrics(f32);

    impl TextMetrics for FixedMetrics {
        fn measure(&self, _text: &str, _font_size: f32) -> f32 {
            self.0
        }
    }

    fn session() -> Session {
        match Session::new(Config::default(), 640.0, 384.0) {
            Ok(session) => session,
            Err(err) => panic!("default session must construct: {err}"),
        }
    }

    // wide enough that nothing spawned can exit during a test
    fn wide_session() -> Session {
        match Session::new(Config::default(), 1_000_000.0, 384.0) {
            Ok(session) => session,
            Err(err) => panic!("default session must construct: {err}"),
        }
    }

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    mod lifecycle {
        use super::*;

        #[test]
        fn starts_inactive_with_nothing_pending() {
            let session = session();
            assert!(!session.is_active());
            assert!(!session.spawn_pending());
        }

        #[test]
        fn start_arms_the_spawn_timer_once() {
            let mut session = session();
            session.start(secs(0));
            assert!(session.is_active());
            assert!(session.spawn_pending());
        }

        #[test]
        fn stop_twice_leaves_nothing_pending() {
            let mut session = session();
            session.start(secs(0));
            session.stop();
            session.stop();
            assert!(!session.is_active());
            assert!(!session.spawn_pending());
        }

        #[test]
        fn start_after_stop_resumes_exactly_once() {
            let mut session = session();
            session.start(secs(0));
            session.stop();
            session.start(secs(5));
            session.start(secs(6));
            assert!(session.is_active());
            assert!(session.spawn_pending());
        }

        #[test]
        fn toggle_flips_the_whole_session() {
            let mut session = session();
            session.toggle(secs(0));
            assert!(session.is_active());
            session.toggle(secs(1));
            assert!(!session.is_active());
            assert!(!session.spawn_pending());
        }
    }

    mod update {
        use super::*;

        #[test]
        fn inactive_session_ignores_updates() {
            let mut session = session();
            let dir_x = session.world.direction().x;
            session
                .world
                .add_text("idle".into(), ColorId::White, 100.0, 50.0, 30.0, 16.0, 5.0 * dir_x);
            session.world.particles[0].ax = 2.0 * dir_x;
            session.update(secs(10), &FixedMetrics(30.0));
            assert_eq!(session.world.particles[0].x, 100.0);
        }

        #[test]
        fn update_runs_due_ticks() {
            let mut session = session();
            session.start(secs(0));
            let dir_x = session.world.direction().x;
            session
                .world
                .add_text("move".into(), ColorId::White, 100.0, 50.0, 30.0, 16.0, 5.0 * dir_x);
            session.world.particles[0].ax = 2.0 * dir_x;
            session.update(Duration::from_millis(100), &FixedMetrics(30.0));
            let moved = (session.world.particles[0].x - 100.0) * dir_x;
            assert!(moved > 0.0);
        }

        #[test]
        fn spawn_fires_once_the_deadline_passes() {
            let mut session = wide_session();
            session.start(secs(0));
            session.update(secs(10), &FixedMetrics(30.0));
            assert_eq!(session.world.len(), 1);
            assert!(session.spawn_pending());
        }

        #[test]
        fn deadline_is_rearmed_after_each_attempt() {
            let mut session = wide_session();
            session.start(secs(0));
            // the configured maximum delay is 2.5s, so every 10s step fires
            session.update(secs(10), &FixedMetrics(30.0));
            session.update(secs(20), &FixedMetrics(30.0));
            assert_eq!(session.world.len(), 2);
        }

        #[test]
        fn stopped_time_does_not_accumulate_ticks() {
            let mut session = session();
            session.start(secs(0));
            session.stop();
            session.start(secs(100));
            let dir_x = session.world.direction().x;
            session
                .world
                .add_text("late".into(), ColorId::White, 100.0, 50.0, 30.0, 16.0, 5.0 * dir_x);
            session.world.particles[0].ax = 2.0 * dir_x;
            // only 15ms of active time, one tick at most
            session.update(Duration::from_millis(100_015), &FixedMetrics(30.0));
            let moved = (session.world.particles[0].x - 100.0).abs();
            assert!(moved <= 2.0 + f32::EPSILON);
        }
    }

    mod geometry {
        use super::*;

        #[test]
        fn world_bounds_scale_with_cell_size() {
            let (w, h) = world_bounds(80, 24);
            assert_eq!(w, 80.0 * config::CELL_PX_X);
            assert_eq!(h, 24.0 * config::CELL_PX_Y);
        }

        #[test]
        fn resize_reaches_the_world() {
            let mut session = session();
            session.resize(1_000.0, 500.0);
            assert_eq!(session.world.width, 1_000.0);
            assert_eq!(session.world.height, 500.0);
        }
    }
}
