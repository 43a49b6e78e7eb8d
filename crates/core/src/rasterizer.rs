//! Page rasterization.
//!
//! Pages are rendered one at a time, in page order, at a scale derived from
//! the container width:
//! - target width = `min(container / 2, max_page_width)`
//! - scale = `min(target / native_width, max_scale)`
//!
//! A page that fails to render is replaced by a placeholder surface and the
//! batch carries on.

use crate::config::{RenderConfig, MAX_RENDER_SCALE};
use crate::document::{PageSize, PageSource};
use crate::error::{FlipbookError, Result};
use image::{Rgba, RgbaImage};
use std::io::Cursor;
use std::time::Instant;
use tracing::{debug, error};

/// Amber used for the placeholder warning band.
const WARNING_COLOR: Rgba<u8> = Rgba([255, 193, 7, 255]);

/// A fixed-size raster image of one page.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    pub width: u32,
    pub height: u32,
    pub image: RgbaImage,
}

impl RasterSurface {
    pub fn new(image: RgbaImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            image,
        }
    }

    /// Encode the surface as PNG bytes.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        encode_png(&self.image)
    }
}

/// Whether a page rendered or was replaced by a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    Ok,
    Failed,
}

/// One rendered (or placeholder) page.
#[derive(Debug, Clone)]
pub struct RasterPage {
    /// Page number (1-indexed).
    pub page_number: usize,
    pub surface: RasterSurface,
    pub status: PageStatus,
}

impl RasterPage {
    pub fn is_failed(&self) -> bool {
        self.status == PageStatus::Failed
    }

    /// Label shown on a failed page.
    pub fn failure_label(&self) -> Option<String> {
        self.is_failed()
            .then(|| format!("Error loading page {}", self.page_number))
    }
}

/// Renders document pages into [`RasterPage`]s.
#[derive(Debug, Clone)]
pub struct PageRasterizer {
    config: RenderConfig,
}

impl PageRasterizer {
    /// Create a rasterizer.
    pub fn new(config: RenderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Container width with the zero-width fallback applied.
    pub fn effective_container_width(&self, reported: f32) -> f32 {
        if reported > 0.0 {
            reported
        } else {
            self.config.default_container_width
        }
    }

    /// Width budget for a single page.
    pub fn target_width(&self, container_width: f32) -> f32 {
        (container_width / 2.0).min(self.config.max_page_width)
    }

    /// Scale that fits `native_width` into `target_width`, never above `max_scale`.
    pub fn scale_for(&self, native_width: f32, target_width: f32) -> f32 {
        (target_width / native_width)
            .min(self.config.max_scale)
            .min(MAX_RENDER_SCALE)
    }

    /// Render a single page at the scale implied by `target_width`.
    pub fn rasterize_page<S: PageSource>(
        &self,
        source: &S,
        page_number: usize,
        target_width: f32,
    ) -> Result<RasterPage> {
        let size = source.page_size(page_number)?;
        if !(size.width > 0.0 && size.height > 0.0) {
            return Err(FlipbookError::PageRenderError {
                page: page_number,
                message: format!("invalid page size {}x{}", size.width, size.height),
            });
        }

        let scale = self.scale_for(size.width, target_width);
        let (width, height) = size.scaled(scale);
        let image = source.render_page(page_number, width.max(1), height.max(1))?;

        Ok(RasterPage {
            page_number,
            surface: RasterSurface::new(self.apply_background(image)),
            status: PageStatus::Ok,
        })
    }

    /// Placeholder for a page that could not be rendered.
    pub fn placeholder(&self, page_number: usize, target_width: f32) -> RasterPage {
        let (width, height) = PageSize::new(target_width, target_width * std::f32::consts::SQRT_2)
            .scaled(1.0);
        let (width, height) = (width.max(1), height.max(1));

        let (r, g, b) = self.config.background_color;
        let mut image = RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255]));

        let band_top = height / 3;
        let band_bottom = (height * 2 / 3).max(band_top + 1).min(height);
        for y in band_top..band_bottom {
            for x in 0..width {
                image.put_pixel(x, y, WARNING_COLOR);
            }
        }

        RasterPage {
            page_number,
            surface: RasterSurface::new(image),
            status: PageStatus::Failed,
        }
    }

    /// Render every page of `source` in order.
    pub async fn rasterize_all<S: PageSource>(
        &self,
        source: &S,
        container_width: f32,
    ) -> Result<Vec<RasterPage>> {
        self.rasterize_all_with_progress(source, container_width, |_, _| {})
            .await
    }

    /// Render every page of `source` in order, reporting `(done, total)` after each page.
    ///
    /// Page N+1 is not started until page N has rendered or failed. Only a
    /// failure to read the page count aborts the batch.
    pub async fn rasterize_all_with_progress<S, F>(
        &self,
        source: &S,
        container_width: f32,
        mut progress: F,
    ) -> Result<Vec<RasterPage>>
    where
        S: PageSource,
        F: FnMut(usize, usize),
    {
        let start = Instant::now();
        let page_count = source.page_count()?;
        let target = self.target_width(self.effective_container_width(container_width));

        debug!(
            "Rasterizing {} pages at target width {}",
            page_count, target
        );

        let mut pages = Vec::with_capacity(page_count);
        for page_number in 1..=page_count {
            match self.rasterize_page(source, page_number, target) {
                Ok(page) => pages.push(page),
                Err(e) => {
                    error!("Failed to render page {}: {}", page_number, e);
                    pages.push(self.placeholder(page_number, target));
                }
            }
            progress(page_number, page_count);

            tokio::task::yield_now().await;
        }

        debug!("Rasterized {} pages in {:?}", page_count, start.elapsed());
        Ok(pages)
    }

    /// Flatten transparent areas onto the background colour.
    fn apply_background(&self, mut image: RgbaImage) -> RgbaImage {
        let (r, g, b) = self.config.background_color;

        for pixel in image.pixels_mut() {
            let alpha = pixel[3] as f32 / 255.0;
            if alpha < 1.0 {
                let inv_alpha = 1.0 - alpha;
                pixel[0] = ((pixel[0] as f32 * alpha) + (r as f32 * inv_alpha)) as u8;
                pixel[1] = ((pixel[1] as f32 * alpha) + (g as f32 * inv_alpha)) as u8;
                pixel[2] = ((pixel[2] as f32 * alpha) + (b as f32 * inv_alpha)) as u8;
                pixel[3] = 255;
            }
        }

        image
    }
}

/// Encode an RGBA image to PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());

    let mut encoder = png::Encoder::new(&mut buffer, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Fast);

    let mut writer = encoder.write_header().map_err(|e| {
        FlipbookError::PngEncodingError(format!("Failed to write PNG header: {}", e))
    })?;

    writer.write_image_data(image.as_raw()).map_err(|e| {
        FlipbookError::PngEncodingError(format!("Failed to write PNG data: {}", e))
    })?;

    drop(writer);

    Ok(buffer.into_inner())
}
