//! # pdf-flipbook-core
//!
//! Headless PDF flipbook: fetch a document by id, rasterize its pages with
//! pdfium, and drive a page-turn view with navigation controls, fullscreen,
//! and keyboard shortcuts.
//!
//! The embedding page is reached through the [`Host`] trait; transport,
//! PDF parsing and the page-turn engine are traits too, with defaults
//! backed by `ureq`, pdfium and an in-memory book model.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_flipbook_core::{
//!     ComponentProps, DefaultFlipbook, FlipbookConfig, Host, KeyboardHub, Notification,
//! };
//!
//! struct Page;
//!
//! impl Host for Page {
//!     fn container_width(&self) -> Option<f32> { Some(1024.0) }
//!     fn request_fullscreen(&mut self) -> anyhow::Result<()> { Ok(()) }
//!     fn exit_fullscreen(&mut self) -> anyhow::Result<()> { Ok(()) }
//!     fn set_class(&mut self, _class: &str, _enabled: bool) {}
//!     fn notify(&mut self, n: Notification) { eprintln!("{}", n.message) }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let props = ComponentProps::from_json(r#"{"flipbookId": 3}"#)?;
//!     let mut flipbook = DefaultFlipbook::with_defaults(
//!         FlipbookConfig::new("http://localhost:8069"),
//!         props.mount_options(),
//!         Page,
//!         KeyboardHub::new(),
//!     )?;
//!
//!     flipbook.mount().await;
//!     println!("{} pages", flipbook.session().total_pages);
//!     flipbook.next_page();
//!     flipbook.unmount();
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod controller;
pub mod document;
pub mod engine;
pub mod error;
pub mod fetcher;
pub mod flipbook;
pub mod host;
pub mod keyboard;
pub mod overlay;
pub mod rasterizer;
pub mod session;
pub mod worker;

// Re-export main types for convenience
pub use config::{EngineOptions, FetchConfig, FlipbookConfig, LayoutConfig, RenderConfig};
pub use controller::{BookLayout, DisplayMode, FlipEvent, PageFlipController, PageFlipEngine};
pub use document::{DocumentLoader, PageSize, PageSource, PdfiumLoader};
pub use engine::BookEngine;
pub use error::{FlipbookError, Result};
pub use fetcher::{FetchRequest, PdfFetcher, Transport, UreqTransport};
pub use flipbook::{DefaultFlipbook, Flipbook, TeardownHandle};
pub use host::{ComponentProps, Host, LegacyMarkup, MountOptions, Notification, Severity};
pub use keyboard::{Key, KeyboardHub, KeyboardListener};
pub use overlay::{Control, NavAction, NavigationOverlay};
pub use rasterizer::{PageRasterizer, PageStatus, RasterPage, RasterSurface};
pub use session::{FlipbookId, FlipbookSession, LoadState};

/// Initialize the library's logging.
/// Call this once at application startup if you want to see logs.
pub fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();
}
