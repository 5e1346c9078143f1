//! Static catalog of transformation styles, plus the landing page carousel over it.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use shared::domain::StyleEndpoint;

use crate::clock::Clock;

pub const CAROUSEL_INTERVAL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Style {
    pub id: u32,
    pub title: &'static str,
    pub description: &'static str,
    pub preview_image: &'static str,
}

impl Style {
    pub fn endpoint(&self) -> StyleEndpoint {
        StyleEndpoint::from_title(self.title)
    }
}

const STYLES: &[Style] = &[
    Style {
        id: 1,
        title: "Pixar",
        description: "Soft, rounded 3D animation look with warm cinematic lighting.",
        preview_image: "previews/pixar.png",
    },
    Style {
        id: 2,
        title: "Comics",
        description: "Bold lineart, vibrant colors and dramatic comic-book shading.",
        preview_image: "previews/comics.png",
    },
    Style {
        id: 3,
        title: "Studio Ghibli",
        description: "Hand-painted anime scenery with gentle pastel tones.",
        preview_image: "previews/ghibli.png",
    },
    Style {
        id: 4,
        title: "Oil Painting",
        description: "Textured brush strokes with a grainy oil pastel finish.",
        preview_image: "previews/oil.png",
    },
    Style {
        id: 5,
        title: "Pencil Sketch",
        description: "Graphite sketch with clean contrast and soft shadows.",
        preview_image: "previews/sketch.png",
    },
    Style {
        id: 6,
        title: "Cartoon",
        description: "Classic 2D cartoon with clean lines and smooth shading.",
        preview_image: "previews/cartoon.png",
    },
];

pub fn styles() -> &'static [Style] {
    STYLES
}

pub fn find_by_id(id: u32) -> Option<&'static Style> {
    STYLES.iter().find(|style| style.id == id)
}

pub fn find_by_title(title: &str) -> Option<&'static Style> {
    let title = title.trim();
    STYLES
        .iter()
        .find(|style| style.title.eq_ignore_ascii_case(title))
}

/// Where a card sits relative to the carousel's current index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarouselSlot {
    Center,
    Right,
    Left,
    FarRight,
    FarLeft,
    Hidden,
}

/// Auto-advancing, wrapping carousel over the catalog.
pub struct Carousel {
    clock: Arc<dyn Clock>,
    len: usize,
    index: usize,
    last_advance: Instant,
}

impl Carousel {
    pub fn new(clock: Arc<dyn Clock>, len: usize) -> Self {
        let last_advance = clock.now();
        Self {
            clock,
            len,
            index: 0,
            last_advance,
        }
    }

    pub fn over_catalog(clock: Arc<dyn Clock>) -> Self {
        Self::new(clock, STYLES.len())
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current_style(&self) -> Option<&'static Style> {
        STYLES.get(self.index)
    }

    /// Applies every interval that has fully elapsed. Returns whether the index moved.
    pub fn poll(&mut self) -> bool {
        if self.len == 0 {
            return false;
        }
        let now = self.clock.now();
        let elapsed = now.saturating_duration_since(self.last_advance);
        let interval = CAROUSEL_INTERVAL.as_millis();
        let steps = elapsed.as_millis() / interval;
        if steps == 0 {
            return false;
        }
        // Both remainders are bounded by usize and the interval respectively.
        let shift = (steps % self.len as u128) as usize;
        self.index = (self.index + shift) % self.len;
        let partial = (elapsed.as_millis() % interval) as u64;
        self.last_advance = now - Duration::from_millis(partial);
        true
    }

    pub fn slot_for(&self, index: usize) -> CarouselSlot {
        if self.len == 0 {
            return CarouselSlot::Hidden;
        }
        let offset = (index % self.len + self.len - self.index) % self.len;
        if offset == 0 {
            CarouselSlot::Center
        } else if offset == 1 {
            CarouselSlot::Right
        } else if offset == self.len - 1 {
            CarouselSlot::Left
        } else if offset == 2 {
            CarouselSlot::FarRight
        } else if offset == self.len - 2 {
            CarouselSlot::FarLeft
        } else {
            CarouselSlot::Hidden
        }
    }
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
