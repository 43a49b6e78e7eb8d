//! In-memory page-turn engine.
//!
//! Models a book the way turn-style widgets do: in double mode page 1 is the
//! cover on its own, followed by spreads `(2, 3)`, `(4, 5)`, ... Navigation
//! moves a whole view at a time; every successful turn reports `Turning`
//! then `Turned` with the requested page.

use crate::controller::{BookLayout, DisplayMode, FlipEvent, PageFlipEngine};
use crate::error::Result;
use crate::rasterizer::RasterPage;

#[derive(Debug)]
pub struct BookEngine {
    pages: Vec<RasterPage>,
    layout: Option<BookLayout>,
    current: usize,
}

impl BookEngine {
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            layout: None,
            current: 1,
        }
    }

    pub fn pages(&self) -> &[RasterPage] {
        &self.pages
    }

    pub fn layout(&self) -> Option<&BookLayout> {
        self.layout.as_ref()
    }

    /// First and last page of the view containing `page`.
    fn view_bounds(&self, page: usize) -> (usize, usize) {
        let total = self.pages.len();
        match self.layout.as_ref().map(|l| l.display) {
            Some(DisplayMode::Double) if page > 1 => {
                let left = page - page % 2;
                (left, (left + 1).min(total))
            }
            _ => (page, page),
        }
    }

    /// Pages currently on screen.
    pub fn current_view(&self) -> Vec<usize> {
        if self.pages.is_empty() {
            return Vec::new();
        }
        let (first, last) = self.view_bounds(self.current);
        (first..=last).collect()
    }
}

impl Default for BookEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PageFlipEngine for BookEngine {
    fn bind(&mut self, pages: Vec<RasterPage>, layout: &BookLayout) -> Result<()> {
        self.pages = pages;
        self.layout = Some(layout.clone());
        self.current = 1;
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.layout.is_some()
    }

    fn destroy(&mut self) {
        self.pages.clear();
        self.layout = None;
        self.current = 1;
    }

    fn next(&mut self) -> Vec<FlipEvent> {
        let (_, last) = self.view_bounds(self.current);
        self.turn_to(last + 1)
    }

    fn previous(&mut self) -> Vec<FlipEvent> {
        let (first, _) = self.view_bounds(self.current);
        if first <= 1 {
            return Vec::new();
        }
        self.turn_to(first - 1)
    }

    fn turn_to(&mut self, page: usize) -> Vec<FlipEvent> {
        if !self.is_active() || page == 0 || page > self.pages.len() {
            return Vec::new();
        }
        if self.view_bounds(page) == self.view_bounds(self.current) {
            return Vec::new();
        }
        self.current = page;
        vec![FlipEvent::Turning(page), FlipEvent::Turned(page)]
    }

    fn set_size(&mut self, width: f32, height: f32) {
        if let Some(layout) = self.layout.as_mut() {
            layout.width = width;
            layout.height = height;
        }
    }

    fn current_page(&self) -> usize {
        self.current
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }
}
