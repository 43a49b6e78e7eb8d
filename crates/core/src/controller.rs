//! Page-flip controller.
//!
//! [`PageFlipController`] owns the single binding between a container and a
//! [`PageFlipEngine`]. The orchestrator only ever talks to the controller, so
//! the engine can be swapped without touching lifecycle logic.

use crate::config::EngineOptions;
use crate::error::{FlipbookError, Result};
use crate::rasterizer::RasterPage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Single-page or two-page-spread layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    Single,
    Double,
}

impl DisplayMode {
    /// `Double` when `width` is strictly wider than `breakpoint`.
    pub fn for_width(width: f32, breakpoint: f32) -> Self {
        if width > breakpoint {
            DisplayMode::Double
        } else {
            DisplayMode::Single
        }
    }
}

/// Page-turn notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipEvent {
    /// A turn towards `page` has started.
    Turning(usize),
    /// The turn to `page` has completed.
    Turned(usize),
}

impl FlipEvent {
    pub fn page(&self) -> usize {
        match *self {
            FlipEvent::Turning(page) | FlipEvent::Turned(page) => page,
        }
    }
}

/// Geometry and options of a bound book.
#[derive(Debug, Clone, PartialEq)]
pub struct BookLayout {
    pub width: f32,
    pub height: f32,
    pub display: DisplayMode,
    pub options: EngineOptions,
}

/// A page-turn implementation.
///
/// Turning operations return the events they produced, in order.
pub trait PageFlipEngine {
    /// Whether the engine can be used at all.
    fn is_available(&self) -> bool {
        true
    }

    /// Attach `pages` with `layout`. Callers destroy any prior binding first.
    fn bind(&mut self, pages: Vec<RasterPage>, layout: &BookLayout) -> Result<()>;

    /// Whether a binding is live.
    fn is_active(&self) -> bool;

    /// Release the binding. No-op when inactive.
    fn destroy(&mut self);

    fn next(&mut self) -> Vec<FlipEvent>;

    fn previous(&mut self) -> Vec<FlipEvent>;

    fn turn_to(&mut self, page: usize) -> Vec<FlipEvent>;

    /// Reflow to a new size, keeping pages and position.
    fn set_size(&mut self, width: f32, height: f32);

    /// Current page (1-indexed).
    fn current_page(&self) -> usize;

    fn page_count(&self) -> usize;
}

/// Controller for one container's page-flip binding.
#[derive(Debug)]
pub struct PageFlipController<E: PageFlipEngine> {
    engine: E,
}

impl<E: PageFlipEngine> PageFlipController<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    /// Bind `pages` to the container, replacing any existing binding.
    pub fn initialize(
        &mut self,
        pages: Vec<RasterPage>,
        width: f32,
        height: f32,
        display: DisplayMode,
        options: EngineOptions,
    ) -> Result<()> {
        if !self.engine.is_available() {
            return Err(FlipbookError::missing(
                "page-flip engine",
                "engine reported unavailable",
            ));
        }

        if self.engine.is_active() {
            debug!("Destroying previous page-flip binding before re-initialization");
            self.engine.destroy();
        }

        let page_count = pages.len();
        let layout = BookLayout {
            width,
            height,
            display,
            options,
        };
        self.engine.bind(pages, &layout)?;

        info!(
            "Page-flip bound: {} pages, {}x{}, {:?}",
            page_count, layout.width, layout.height, layout.display
        );
        Ok(())
    }

    pub fn next(&mut self) -> Vec<FlipEvent> {
        if !self.engine.is_active() {
            return Vec::new();
        }
        self.engine.next()
    }

    pub fn previous(&mut self) -> Vec<FlipEvent> {
        if !self.engine.is_active() {
            return Vec::new();
        }
        self.engine.previous()
    }

    /// Turn to `page`. Out-of-range pages produce no events.
    pub fn goto_page(&mut self, page: usize) -> Vec<FlipEvent> {
        if !self.engine.is_active() || page == 0 || page > self.engine.page_count() {
            return Vec::new();
        }
        self.engine.turn_to(page)
    }

    /// Reflow the active binding. Returns `false` when nothing is bound.
    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        if !self.engine.is_active() {
            return false;
        }
        self.engine.set_size(width, height);
        true
    }

    pub fn destroy(&mut self) {
        if self.engine.is_active() {
            debug!("Destroying page-flip binding");
            self.engine.destroy();
        }
    }

    pub fn is_active(&self) -> bool {
        self.engine.is_active()
    }

    pub fn current_page(&self) -> usize {
        self.engine.current_page()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}
