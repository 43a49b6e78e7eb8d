//! Flipbook orchestrator.
//!
//! [`Flipbook`] owns one instance's lifecycle: it validates the id, fetches
//! and rasterizes the document, binds the pages to the page-flip controller,
//! and then routes navigation, resize, fullscreen and keyboard input.
//!
//! ```text
//! Idle --mount/start--> Loading --> Ready
//!   \                       \-----> Failed --retry--> Loading
//!    \--invalid id----------------> Failed
//! ```

use crate::config::FlipbookConfig;
use crate::controller::{DisplayMode, FlipEvent, PageFlipController, PageFlipEngine};
use crate::document::{DocumentLoader, PdfiumLoader};
use crate::engine::BookEngine;
use crate::error::{FlipbookError, Result};
use crate::fetcher::{PdfFetcher, Transport, UreqTransport};
use crate::host::{Host, MountOptions, Notification};
use crate::keyboard::{Key, KeyboardHub, KeyboardListener};
use crate::overlay::{Control, NavAction, NavigationOverlay};
use crate::rasterizer::{PageRasterizer, RasterPage};
use crate::session::{FlipbookId, FlipbookSession, LoadState};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Class toggled on the container's parent while fullscreen.
pub const FULLSCREEN_CLASS: &str = "flipbook-fullscreen";

/// Message of the notification raised on a fatal load failure.
pub const LOAD_FAILED_MESSAGE: &str = "Error loading flipbook";

/// Signals that the owning component went away.
///
/// A load that finishes after the handle fired drops its results without
/// touching the session.
#[derive(Debug, Clone, Default)]
pub struct TeardownHandle(Arc<AtomicBool>);

impl TeardownHandle {
    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Flipbook wired to the default transport, loader and engine.
pub type DefaultFlipbook<H> = Flipbook<UreqTransport, PdfiumLoader, BookEngine, H>;

/// One flipbook instance.
pub struct Flipbook<T, L, E: PageFlipEngine, H> {
    config: FlipbookConfig,
    options: MountOptions,
    fetcher: PdfFetcher<T, L>,
    rasterizer: PageRasterizer,
    controller: PageFlipController<E>,
    host: H,
    keyboard_hub: KeyboardHub,
    session: FlipbookSession,
    overlay: Option<NavigationOverlay>,
    keyboard: Option<KeyboardListener>,
    teardown: TeardownHandle,
    mounted: bool,
}

impl<H: Host> DefaultFlipbook<H> {
    /// Flipbook using `ureq`, pdfium and the in-memory book engine.
    pub fn with_defaults(
        config: FlipbookConfig,
        options: MountOptions,
        host: H,
        keyboard_hub: KeyboardHub,
    ) -> Result<Self> {
        Flipbook::new(
            config,
            options,
            UreqTransport::new(),
            PdfiumLoader::new(),
            BookEngine::new(),
            host,
            keyboard_hub,
        )
    }
}

impl<T, L, E, H> Flipbook<T, L, E, H>
where
    T: Transport,
    L: DocumentLoader,
    E: PageFlipEngine,
    H: Host,
{
    /// Create an unmounted flipbook.
    pub fn new(
        config: FlipbookConfig,
        options: MountOptions,
        transport: T,
        loader: L,
        engine: E,
        host: H,
        keyboard_hub: KeyboardHub,
    ) -> Result<Self> {
        config.validate()?;

        let fetcher = PdfFetcher::new(transport, loader, config.fetch.clone())?;
        let rasterizer = PageRasterizer::new(config.render.clone())?;

        Ok(Self {
            config,
            options,
            fetcher,
            rasterizer,
            controller: PageFlipController::new(engine),
            host,
            keyboard_hub,
            session: FlipbookSession::default(),
            overlay: None,
            keyboard: None,
            teardown: TeardownHandle::default(),
            mounted: false,
        })
    }

    /// Mount and, with `auto_start`, load the document.
    pub async fn mount(&mut self) -> LoadState {
        if self.mounted {
            return self.session.state;
        }
        self.mounted = true;
        self.teardown.reset();

        if !self.options.auto_start {
            debug!("Mounted without auto-start");
            return self.session.state;
        }
        self.start().await
    }

    /// Begin loading. Valid from `Idle` (after mount) and `Failed`.
    pub async fn start(&mut self) -> LoadState {
        if !self.mounted {
            warn!("start() called before mount()");
            return self.session.state;
        }
        if matches!(self.session.state, LoadState::Loading | LoadState::Ready) {
            return self.session.state;
        }

        match FlipbookId::from_optional(self.options.raw_id) {
            Ok(id) => self.load(id).await,
            Err(e) => {
                warn!("Refusing to load flipbook {:?}: {}", self.options.raw_id, e);
                self.fail(e)
            }
        }
    }

    /// Reload after a failure.
    pub async fn retry(&mut self) -> LoadState {
        if self.session.state != LoadState::Failed {
            return self.session.state;
        }
        info!("Retrying flipbook {:?}", self.options.raw_id);
        self.start().await
    }

    async fn load(&mut self, id: FlipbookId) -> LoadState {
        let start = Instant::now();
        self.session.begin_loading(id);

        let Some(reported_width) = self.host.container_width() else {
            return self.fail(FlipbookError::ContainerNotFound);
        };
        let width = self.rasterizer.effective_container_width(reported_width);
        let url = self.fetcher.document_url(id);

        info!("Loading flipbook {} from {}", id, url);
        let result = load_pages(&self.fetcher, &self.rasterizer, &url, width).await;

        if self.teardown.is_triggered() {
            debug!("Flipbook {} torn down while loading, discarding result", id);
            self.release();
            self.session = FlipbookSession::default();
            return self.session.state;
        }

        match result {
            Ok(pages) => {
                let state = self.bind_pages(pages, width);
                info!(
                    "Flipbook {} ready with {} pages in {:?}",
                    id,
                    self.session.total_pages,
                    start.elapsed()
                );
                state
            }
            Err(e) => self.fail(e),
        }
    }

    fn bind_pages(&mut self, pages: Vec<RasterPage>, width: f32) -> LoadState {
        let layout = &self.config.layout;
        let total_pages = pages.len();
        let height = layout.view_height(width);
        let display = DisplayMode::for_width(width, layout.double_page_breakpoint);

        if let Err(e) =
            self.controller
                .initialize(pages, width, height, display, layout.engine.clone())
        {
            return self.fail(e);
        }

        self.session.ready(total_pages);
        if self.options.show_controls {
            self.overlay = Some(NavigationOverlay::new(&self.session));
        }
        self.keyboard = Some(self.keyboard_hub.listen());
        self.session.state
    }

    fn fail(&mut self, err: FlipbookError) -> LoadState {
        error!("Flipbook failed: {}", err);

        let retry = self.options.retry_enabled && err.is_retryable();
        let message = err.to_string();
        self.session.fail(message.clone());

        if !matches!(err, FlipbookError::InvalidIdentifier) {
            self.host.notify(Notification::danger(LOAD_FAILED_MESSAGE));
        }
        self.host.show_error(&message, retry);
        self.session.state
    }

    fn apply_events(&mut self, events: Vec<FlipEvent>) -> bool {
        let turned = !events.is_empty();
        for event in events {
            self.session.set_current_page(event.page());
            if let Some(overlay) = self.overlay.as_mut() {
                overlay.refresh(&self.session);
            }
        }
        turned
    }

    /// Turn forward. Returns whether the page changed.
    pub fn next_page(&mut self) -> bool {
        let events = self.controller.next();
        self.apply_events(events)
    }

    /// Turn back. Returns whether the page changed.
    pub fn previous_page(&mut self) -> bool {
        let events = self.controller.previous();
        self.apply_events(events)
    }

    /// Turn to `page`; pages outside `[1, total_pages]` are ignored.
    pub fn goto_page(&mut self, page: usize) -> bool {
        if page == 0 || page > self.session.total_pages {
            return false;
        }
        let events = self.controller.goto_page(page);
        self.apply_events(events)
    }

    /// Activate an overlay control. Ignored when controls are hidden.
    pub fn press(&mut self, control: Control) -> bool {
        let Some(action) = self.overlay.as_ref().map(|o| o.action(control)) else {
            return false;
        };

        match action {
            NavAction::Previous => self.previous_page(),
            NavAction::Next => self.next_page(),
            NavAction::GotoPage(page) => self.goto_page(page),
            NavAction::ToggleFullscreen => {
                self.toggle_fullscreen();
                true
            }
        }
    }

    /// Enter or leave fullscreen. Failures are logged and leave state unchanged.
    pub fn toggle_fullscreen(&mut self) -> bool {
        if self.session.is_fullscreen {
            self.exit_fullscreen()
        } else {
            self.enter_fullscreen()
        }
    }

    fn enter_fullscreen(&mut self) -> bool {
        match self.host.request_fullscreen() {
            Ok(()) => {
                // Presses queued while windowed never count as navigation
                if let Some(listener) = self.keyboard.as_ref() {
                    let dropped = listener.clear();
                    if dropped > 0 {
                        debug!("Dropped {} keys queued before fullscreen", dropped);
                    }
                }
                self.session.is_fullscreen = true;
                self.host.set_class(FULLSCREEN_CLASS, true);
                true
            }
            Err(e) => {
                warn!("Failed to enter fullscreen: {:#}", e);
                false
            }
        }
    }

    fn exit_fullscreen(&mut self) -> bool {
        match self.host.exit_fullscreen() {
            Ok(()) => {
                self.session.is_fullscreen = false;
                self.host.set_class(FULLSCREEN_CLASS, false);
                true
            }
            Err(e) => {
                warn!("Failed to exit fullscreen: {:#}", e);
                false
            }
        }
    }

    /// Handle a key press. Only active while fullscreen.
    pub fn handle_key(&mut self, key: Key) -> bool {
        if !self.session.is_fullscreen {
            return false;
        }
        match key {
            Key::ArrowLeft => {
                self.previous_page();
                true
            }
            Key::ArrowRight => {
                self.next_page();
                true
            }
            Key::Escape => {
                self.exit_fullscreen();
                true
            }
            Key::Other(_) => false,
        }
    }

    /// Handle every key queued for this instance on the shared hub.
    pub fn pump_keyboard(&mut self) -> usize {
        let mut handled = 0;
        while let Some(key) = self.keyboard.as_ref().and_then(|l| l.try_next()) {
            if self.handle_key(key) {
                handled += 1;
            }
        }
        handled
    }

    /// Reflow after the container changed width.
    pub fn handle_resize(&mut self, width: f32) -> bool {
        if !self.session.is_ready() || !self.controller.is_active() {
            return false;
        }
        let height = self.config.layout.view_height(width);
        debug!("Resizing flipbook to {}x{}", width, height);
        self.controller.resize(width, height)
    }

    fn release(&mut self) {
        self.keyboard = None;
        self.overlay = None;
        self.controller.destroy();
    }

    /// Tear down: release the key listener, destroy the binding, drop the session.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.teardown.trigger();
        self.release();
        self.session = FlipbookSession::default();
        self.mounted = false;
        info!("Flipbook unmounted");
    }

    pub fn session(&self) -> &FlipbookSession {
        &self.session
    }

    pub fn state(&self) -> LoadState {
        self.session.state
    }

    pub fn overlay(&self) -> Option<&NavigationOverlay> {
        self.overlay.as_ref()
    }

    pub fn controller(&self) -> &PageFlipController<E> {
        &self.controller
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Handle for signalling teardown from outside an in-flight load.
    pub fn teardown_handle(&self) -> TeardownHandle {
        self.teardown.clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn has_keyboard_listener(&self) -> bool {
        self.keyboard.is_some()
    }
}

async fn load_pages<T: Transport, L: DocumentLoader>(
    fetcher: &PdfFetcher<T, L>,
    rasterizer: &PageRasterizer,
    url: &str,
    container_width: f32,
) -> Result<Vec<RasterPage>> {
    let document = fetcher.fetch(url).await?;
    rasterizer
        .rasterize_all_with_progress(&document, container_width, |done, total| {
            debug!("Rendered page {}/{}", done, total);
        })
        .await
}
