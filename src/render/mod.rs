use crate::{
    config,
    spawner::TextMetrics,
    types::{ColorId, ParticleSnapshot, TEXT_MAX_DRAW},
};

#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

#[derive(Clone, Copy, Debug)]
pub struct RenderCell {
    pub ch: char,
    /// Draw priority; bigger glyphs sit in front of smaller ones.
    pub depth: f32,
    pub color: ColorId,
}

#[derive(Debug)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<RenderCell>,
}

impl FrameBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        let mut buffer = Self {
            width,
            height,
            cells: Vec::new(),
        };
        buffer.resize(width, height);
        buffer
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        let len = (width as usize).saturating_mul(height as usize);
        if self.cells.len() != len {
            self.cells.resize(
                len,
                RenderCell {
                    ch: ' ',
                    depth: f32::NEG_INFINITY,
                    color: ColorId::White,
                },
            );
        }
        self.clear();
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.ch = ' ';
            cell.depth = f32::NEG_INFINITY;
            cell.color = ColorId::White;
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn get(&self, x: u16, y: u16) -> RenderCell {
        debug_assert!(x < self.width && y < self.height, "get() out of bounds");
        let idx = (y as usize) * (self.width as usize) + (x as usize);
        self.cells[idx]
    }

    fn set(&mut self, x: u16, y: u16, ch: char, depth: f32, color: ColorId) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = (y as usize) * (self.width as usize) + (x as usize);
        let cell = &mut self.cells[idx];
        if depth >= cell.depth {
            cell.depth = depth;
            cell.ch = ch;
            cell.color = color;
        }
    }
}

/// Terminal text metrics: advance proportional to the font size, the way a
/// canvas measurement would be.
pub struct CellMetrics;

impl TextMetrics for CellMetrics {
    fn measure(&self, text: &str, font_size: f32) -> f32 {
        text.chars().count() as f32 * font_size * config::GLYPH_ASPECT
    }
}

/// Rasterizes a world snapshot into the frame buffer. World coordinates are
/// pixel-like; each terminal cell covers CELL_PX_X by CELL_PX_Y of them.
pub fn draw(snapshot: &[ParticleSnapshot], viewport: Viewport, frame: &mut FrameBuffer) {
    if frame.width() != viewport.width || frame.height() != viewport.height {
        frame.resize(viewport.width, viewport.height);
    } else {
        frame.clear();
    }

    for particle in snapshot {
        // glyph box midline, so the row tracks the visual center
        let mid_y = particle.y - particle.font_size / 2.0;
        let sy = (mid_y / config::CELL_PX_Y).round() as i32;
        if sy < 0 || sy >= viewport.height as i32 {
            continue;
        }

        let sx = (particle.x / config::CELL_PX_X).round() as i32;
        let text_len = particle.text_len.min(TEXT_MAX_DRAW);
        for i in 0..text_len {
            let x = sx + i as i32;
            if x < 0 || x >= viewport.width as i32 {
                continue;
            }
            frame.set(
                x as u16,
                sy as u16,
                particle.text[i],
                particle.font_size,
                particle.color,
            );
        }
    }
}
