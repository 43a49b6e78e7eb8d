//! Parsed PDF documents and the pdfium-backed loader.
//!
//! [`DocumentLoader`] turns fetched bytes into a [`PageSource`]; the
//! rasterizer only ever talks to `PageSource`, so tests and alternative
//! engines can stand in for pdfium.

use crate::error::{FlipbookError, Result};
use image::RgbaImage;
use once_cell::unsync::OnceCell;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Native size of a page in PDF points (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Size after applying `scale`, truncated to whole pixels.
    pub fn scaled(&self, scale: f32) -> (u32, u32) {
        ((self.width * scale) as u32, (self.height * scale) as u32)
    }
}

/// Per-page access to a loaded document. Page numbers are 1-indexed.
pub trait PageSource {
    /// Number of pages. An error here is a document-level failure.
    fn page_count(&self) -> Result<usize>;

    /// Native size of a page.
    fn page_size(&self, page_number: usize) -> Result<PageSize>;

    /// Rasterize a page into a `width` x `height` RGBA image.
    fn render_page(&self, page_number: usize, width: u32, height: u32) -> Result<RgbaImage>;
}

/// Parses document bytes into a [`PageSource`].
pub trait DocumentLoader {
    type Document<'a>: PageSource
    where
        Self: 'a;

    /// Parse `bytes`. Parse failures are reported as [`FlipbookError::FetchError`];
    /// an unavailable backend as [`FlipbookError::MissingDependency`].
    fn load(&self, bytes: Vec<u8>) -> Result<Self::Document<'_>>;
}

/// Loader backed by pdfium. The library is bound lazily on first load.
pub struct PdfiumLoader {
    library_path: Option<PathBuf>,
    pdfium: OnceCell<Pdfium>,
}

impl PdfiumLoader {
    /// Loader that searches the working directory, the usual system library
    /// directories, and finally the system loader.
    pub fn new() -> Self {
        Self {
            library_path: None,
            pdfium: OnceCell::new(),
        }
    }

    /// Loader that tries `path` (a directory or the library file) first.
    pub fn with_library_path(path: impl Into<PathBuf>) -> Self {
        Self {
            library_path: Some(path.into()),
            pdfium: OnceCell::new(),
        }
    }

    /// Bind pdfium now, reporting whether it is usable.
    pub fn is_available(&self) -> bool {
        self.pdfium().is_ok()
    }

    fn pdfium(&self) -> Result<&Pdfium> {
        self.pdfium
            .get_or_try_init(|| bind_pdfium(self.library_path.as_deref()))
    }
}

impl Default for PdfiumLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn library_candidates(hint: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    let mut push_dir_or_file = |path: &Path| {
        if path.is_dir() {
            candidates.push(Pdfium::pdfium_platform_library_name_at_path(path));
        } else if path.is_file() {
            candidates.push(path.to_path_buf());
        }
    };

    if let Some(hint) = hint {
        push_dir_or_file(hint);
    }

    for dir in ["./", "/usr/lib", "/usr/local/lib"] {
        candidates.push(Pdfium::pdfium_platform_library_name_at_path(dir));
    }
    candidates
}

fn bind_pdfium(hint: Option<&Path>) -> Result<Pdfium> {
    for candidate in library_candidates(hint) {
        if let Ok(bindings) = Pdfium::bind_to_library(&candidate) {
            info!("Bound pdfium from {:?}", candidate);
            return Ok(Pdfium::new(bindings));
        }
    }

    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|e| FlipbookError::missing("pdfium", format!("failed to load library: {}", e)))
}

impl DocumentLoader for PdfiumLoader {
    type Document<'a> = PdfiumDocument<'a>;

    fn load(&self, bytes: Vec<u8>) -> Result<PdfiumDocument<'_>> {
        let pdfium = self.pdfium()?;
        let size = bytes.len();

        let document = pdfium
            .load_pdf_from_byte_vec(bytes, None)
            .map_err(|e| FlipbookError::FetchError(format!("failed to parse PDF: {}", e)))?;

        debug!(
            "Parsed PDF of {} bytes with {} pages",
            size,
            document.pages().len()
        );
        Ok(PdfiumDocument { document })
    }
}

/// A document parsed by pdfium.
pub struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
}

impl<'a> PdfiumDocument<'a> {
    fn page(&self, page_number: usize) -> Result<PdfPage<'a>> {
        let index = page_number
            .checked_sub(1)
            .and_then(|i| u16::try_from(i).ok())
            .ok_or_else(|| FlipbookError::PageRenderError {
                page: page_number,
                message: "page number out of range".to_string(),
            })?;

        self.document
            .pages()
            .get(index)
            .map_err(|e| FlipbookError::PageRenderError {
                page: page_number,
                message: e.to_string(),
            })
    }
}

impl<'a> PageSource for PdfiumDocument<'a> {
    fn page_count(&self) -> Result<usize> {
        Ok(self.document.pages().len() as usize)
    }

    fn page_size(&self, page_number: usize) -> Result<PageSize> {
        let page = self.page(page_number)?;
        Ok(PageSize::new(page.width().value, page.height().value))
    }

    fn render_page(&self, page_number: usize, width: u32, height: u32) -> Result<RgbaImage> {
        let page = self.page(page_number)?;

        let render_config = PdfRenderConfig::new()
            .set_target_width(width as i32)
            .set_target_height(height as i32)
            .rotate_if_landscape(PdfPageRenderRotation::None, false);

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| FlipbookError::PageRenderError {
                page: page_number,
                message: e.to_string(),
            })?;

        Ok(bitmap.as_image().into_rgba8())
    }
}
