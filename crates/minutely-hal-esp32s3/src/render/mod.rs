//! Clock-face renderer for the 296x128 landscape panel.

use depg0290::Frame;
use minutely_core::render::Screen;

mod face;
mod glyph;
mod notice;
mod primitives;

#[allow(unused_imports)]
use self::{face::*, glyph::*, notice::*, primitives::*};

/// Draws core view models into the panel frame planes.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClockRenderer;

impl ClockRenderer {
    pub const fn new() -> Self {
        Self
    }

    /// Renders `screen` into the black plane and, when present, the red
    /// plane. Callers clear the planes first; rendering only adds ink.
    pub fn render(&self, screen: Screen<'_>, bw: &mut Frame, red: Option<&mut Frame>) {
        match screen {
            Screen::Face { date, hour, minute } => draw_face(bw, red, date, hour, minute),
            Screen::Seconds { second } => draw_seconds(bw, second),
            Screen::Notice { title, lines } => draw_notice(bw, title, lines),
        }
    }
}
