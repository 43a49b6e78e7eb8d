//! Configuration types for flipbook loading, rendering and layout.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{FlipbookError, Result};

/// Static asset path of the rasterizer worker.
pub const DEFAULT_WORKER_SRC: &str = "/pdf_flipbook_website/static/src/lib/pdfjs/pdf.worker.min.js";

/// Largest scale a page is ever rendered at.
pub const MAX_RENDER_SCALE: f32 = 2.0;

/// Budget for a single document fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for fetching PDF documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Prefix prepended to `/flipbook/pdf/{id}`, e.g. `https://example.com`.
    /// Default: empty (relative URL).
    pub base_url: String,

    /// Time allowed for the fetch to settle.
    /// Default: 30 seconds.
    pub timeout: Duration,

    /// Endpoint of the rasterizer worker, configured once per process.
    pub worker_src: String,

    /// Send `Cache-Control: no-cache` with document requests.
    /// Default: true.
    pub no_cache: bool,

    /// Upper bound on the response body size.
    /// Default: 100 MiB.
    pub max_document_bytes: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout: DEFAULT_FETCH_TIMEOUT,
            worker_src: DEFAULT_WORKER_SRC.to_string(),
            no_cache: true,
            max_document_bytes: 100 * 1024 * 1024,
        }
    }
}

impl FetchConfig {
    /// Create a fetch config rooted at `base_url`.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the fetch timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the worker endpoint.
    pub fn worker_src(mut self, src: impl Into<String>) -> Self {
        self.worker_src = src.into();
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(FlipbookError::InvalidConfig(
                "fetch timeout must be greater than 0".to_string(),
            ));
        }
        if self.worker_src.trim().is_empty() {
            return Err(FlipbookError::InvalidConfig(
                "worker_src must not be empty".to_string(),
            ));
        }
        if self.max_document_bytes == 0 {
            return Err(FlipbookError::InvalidConfig(
                "max_document_bytes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for page rasterization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Widest a single page may be, in logical units.
    /// Default: 400.
    pub max_page_width: f32,

    /// Largest scale factor applied to a page's native size.
    /// Default: 2.0, which is also the upper bound.
    pub max_scale: f32,

    /// Width assumed when the host reports a zero-width container.
    /// Default: 800.
    pub default_container_width: f32,

    /// Background for pages and placeholders.
    /// Default: white (255, 255, 255).
    pub background_color: (u8, u8, u8),
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_page_width: 400.0,
            max_scale: MAX_RENDER_SCALE,
            default_container_width: 800.0,
            background_color: (255, 255, 255),
        }
    }
}

impl RenderConfig {
    /// Set the per-page width cap.
    pub fn max_page_width(mut self, width: f32) -> Self {
        self.max_page_width = width;
        self
    }

    /// Set the scale cap.
    pub fn max_scale(mut self, scale: f32) -> Self {
        self.max_scale = scale;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !(self.max_page_width > 0.0) {
            return Err(FlipbookError::InvalidConfig(
                "max_page_width must be positive".to_string(),
            ));
        }
        if !(self.max_scale > 0.0 && self.max_scale <= MAX_RENDER_SCALE) {
            return Err(FlipbookError::InvalidConfig(format!(
                "max_scale must be in (0, {}]",
                MAX_RENDER_SCALE
            )));
        }
        if !(self.default_container_width > 0.0) {
            return Err(FlipbookError::InvalidConfig(
                "default_container_width must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Animation options handed to the page-flip engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Turn animation length in milliseconds.
    pub duration_ms: u32,
    pub gradients: bool,
    pub acceleration: bool,
    /// Shadow elevation in pixels.
    pub elevation: u32,
    pub auto_center: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            duration_ms: 800,
            gradients: true,
            acceleration: true,
            elevation: 50,
            auto_center: true,
        }
    }
}

/// Configuration for the page-turn view geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Containers wider than this show two-page spreads.
    /// Default: 768.
    pub double_page_breakpoint: f32,

    /// Tallest the view may be.
    /// Default: 600.
    pub max_height: f32,

    /// View height as a fraction of its width.
    /// Default: 0.6.
    pub height_ratio: f32,

    /// Engine animation options.
    pub engine: EngineOptions,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            double_page_breakpoint: 768.0,
            max_height: 600.0,
            height_ratio: 0.6,
            engine: EngineOptions::default(),
        }
    }
}

impl LayoutConfig {
    /// View height for a container width: `min(max_height, width * height_ratio)`.
    pub fn view_height(&self, width: f32) -> f32 {
        self.max_height.min(width * self.height_ratio)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !(self.max_height > 0.0) || !(self.height_ratio > 0.0) {
            return Err(FlipbookError::InvalidConfig(
                "max_height and height_ratio must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Combined configuration for a flipbook.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlipbookConfig {
    pub fetch: FetchConfig,
    pub render: RenderConfig,
    pub layout: LayoutConfig,
}

impl FlipbookConfig {
    /// Create a config whose documents are served from `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            fetch: FetchConfig::with_base_url(base_url),
            ..Default::default()
        }
    }

    /// Validate the entire configuration.
    pub fn validate(&self) -> Result<()> {
        self.fetch.validate()?;
        self.render.validate()?;
        self.layout.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_config_defaults() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout.as_secs(), 30);
        assert_eq!(config.worker_src, DEFAULT_WORKER_SRC);
        assert!(config.no_cache);
        assert!(config.base_url.is_empty());
    }

    #[test]
    fn test_fetch_config_builder_pattern() {
        let config = FetchConfig::with_base_url("https://shop.example")
            .timeout(Duration::from_secs(5))
            .worker_src("/custom/worker.js");
        assert_eq!(config.base_url, "https://shop.example");
        assert_eq!(config.timeout.as_secs(), 5);
        assert_eq!(config.worker_src, "/custom/worker.js");
    }

    #[test]
    fn test_fetch_config_validation_zero_timeout() {
        let config = FetchConfig::default().timeout(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fetch_config_validation_empty_worker() {
        let config = FetchConfig::default().worker_src("  ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_render_config_defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.max_page_width, 400.0);
        assert_eq!(config.max_scale, 2.0);
        assert_eq!(config.default_container_width, 800.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_render_config_validation() {
        assert!(RenderConfig::default().max_scale(0.0).validate().is_err());
        assert!(RenderConfig::default().max_scale(2.5).validate().is_err());
        assert!(RenderConfig::default().max_scale(f32::NAN).validate().is_err());
        assert!(RenderConfig::default().max_scale(1.5).validate().is_ok());
        assert!(RenderConfig::default().max_page_width(-1.0).validate().is_err());
    }

    #[test]
    fn test_layout_view_height() {
        let layout = LayoutConfig::default();
        assert_eq!(layout.view_height(500.0), 300.0);
        assert_eq!(layout.view_height(1000.0), 600.0);
        assert_eq!(layout.view_height(2000.0), 600.0);
    }

    #[test]
    fn test_engine_options_defaults() {
        let options = EngineOptions::default();
        assert_eq!(options.duration_ms, 800);
        assert_eq!(options.elevation, 50);
        assert!(options.gradients && options.acceleration && options.auto_center);
    }

    #[test]
    fn test_flipbook_config_validate_propagates() {
        let mut config = FlipbookConfig::new("http://localhost:8069");
        assert!(config.validate().is_ok());
        config.layout.height_ratio = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_flipbook_config_json_roundtrip_keeps_timeout() {
        let config = FlipbookConfig::new("http://localhost:8069");
        let json = serde_json::to_string(&config).unwrap();
        let parsed: FlipbookConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.fetch.timeout, Duration::from_secs(30));
        assert_eq!(parsed.fetch.base_url, "http://localhost:8069");
    }
}
