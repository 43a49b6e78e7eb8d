//! Flipbook identifiers and per-instance session state.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{FlipbookError, Result};

/// Validated, strictly positive flipbook id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct FlipbookId(u64);

impl FlipbookId {
    /// Accept only positive ids.
    pub fn new(raw: i64) -> Result<Self> {
        if raw > 0 {
            Ok(Self(raw as u64))
        } else {
            Err(FlipbookError::InvalidIdentifier)
        }
    }

    /// Validate an optional raw id; `None` is as invalid as `0`.
    pub fn from_optional(raw: Option<i64>) -> Result<Self> {
        raw.map_or(Err(FlipbookError::InvalidIdentifier), Self::new)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl TryFrom<i64> for FlipbookId {
    type Error = FlipbookError;

    fn try_from(raw: i64) -> Result<Self> {
        Self::new(raw)
    }
}

impl From<FlipbookId> for i64 {
    fn from(id: FlipbookId) -> i64 {
        id.0 as i64
    }
}

impl fmt::Display for FlipbookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle stage of a flipbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadState {
    /// Not mounted, or mounted without auto-start.
    Idle,
    /// Fetching and rasterizing.
    Loading,
    /// Pages bound to the page-flip controller.
    Ready,
    /// Load failed; see `FlipbookSession::error`.
    Failed,
}

/// Mutable UI state of one flipbook instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlipbookSession {
    pub document_id: Option<FlipbookId>,
    pub state: LoadState,
    pub total_pages: usize,
    pub current_page: usize,
    pub loading: bool,
    pub error: Option<String>,
    pub is_fullscreen: bool,
}

impl Default for FlipbookSession {
    fn default() -> Self {
        Self {
            document_id: None,
            state: LoadState::Idle,
            total_pages: 0,
            current_page: 1,
            loading: true,
            error: None,
            is_fullscreen: false,
        }
    }
}

impl FlipbookSession {
    pub(crate) fn begin_loading(&mut self, id: FlipbookId) {
        self.document_id = Some(id);
        self.state = LoadState::Loading;
        self.loading = true;
        self.error = None;
        self.total_pages = 0;
        self.current_page = 1;
    }

    pub(crate) fn ready(&mut self, total_pages: usize) {
        self.state = LoadState::Ready;
        self.loading = false;
        self.total_pages = total_pages;
        self.current_page = 1;
    }

    pub(crate) fn fail(&mut self, message: impl Into<String>) {
        self.state = LoadState::Failed;
        self.loading = false;
        self.error = Some(message.into());
    }

    /// Record the page reported by a flip event, clamped to the document.
    pub(crate) fn set_current_page(&mut self, page: usize) {
        self.current_page = if self.total_pages == 0 {
            1
        } else {
            page.clamp(1, self.total_pages)
        };
    }

    pub fn is_ready(&self) -> bool {
        self.state == LoadState::Ready
    }

    pub fn is_failed(&self) -> bool {
        self.state == LoadState::Failed
    }
}
