//! Host integration.
//!
//! [`Host`] is everything the flipbook needs from the page embedding it:
//! container geometry, OS fullscreen, CSS classes, and user notifications.
//! Two thin adapters turn host-specific inputs into [`MountOptions`]:
//! [`ComponentProps`] for the component path and [`LegacyMarkup`] for
//! markup carrying a `data-flipbook-id` attribute.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{FlipbookError, Result};

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Danger,
}

/// A user-visible toast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    /// Whether the toast stays until dismissed.
    pub sticky: bool,
}

impl Notification {
    /// Transient danger toast.
    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Danger,
            sticky: false,
        }
    }
}

/// The page a flipbook is embedded in.
pub trait Host {
    /// Width of the container's parent, or `None` when there is no container.
    fn container_width(&self) -> Option<f32>;

    /// Enter OS fullscreen on the container's parent.
    fn request_fullscreen(&mut self) -> anyhow::Result<()>;

    fn exit_fullscreen(&mut self) -> anyhow::Result<()>;

    /// Add or remove a CSS class on the container's parent.
    fn set_class(&mut self, class: &str, enabled: bool);

    fn notify(&mut self, notification: Notification);

    /// Show the document-level error panel, optionally with a retry control.
    fn show_error(&mut self, _message: &str, _retry: bool) {}
}

/// How a host wants a flipbook mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MountOptions {
    /// Unvalidated id as the host supplied it.
    pub raw_id: Option<i64>,
    /// Load immediately on mount.
    pub auto_start: bool,
    /// Attach the navigation overlay.
    pub show_controls: bool,
    /// Offer a retry control on fatal failure.
    pub retry_enabled: bool,
}

impl MountOptions {
    pub fn new(raw_id: Option<i64>) -> Self {
        Self {
            raw_id,
            auto_start: true,
            show_controls: true,
            retry_enabled: false,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Accepts any JSON value; only integral numbers become an id.
fn lenient_id<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_i64())
}

/// Declared component properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentProps {
    #[serde(default, deserialize_with = "lenient_id")]
    pub flipbook_id: Option<i64>,
    #[serde(default = "default_true")]
    pub auto_start: bool,
    #[serde(default = "default_true")]
    pub show_controls: bool,
}

impl ComponentProps {
    pub fn new(flipbook_id: i64) -> Self {
        Self {
            flipbook_id: Some(flipbook_id),
            auto_start: true,
            show_controls: true,
        }
    }

    /// Parse props from their JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| FlipbookError::InvalidConfig(format!("invalid component props: {}", e)))
    }

    pub fn mount_options(&self) -> MountOptions {
        MountOptions {
            raw_id: self.flipbook_id,
            auto_start: self.auto_start,
            show_controls: self.show_controls,
            retry_enabled: false,
        }
    }
}

/// Adapter for markup carrying `data-flipbook-id`.
pub struct LegacyMarkup;

impl LegacyMarkup {
    /// Parse the attribute the way `parseInt` does: optional leading
    /// whitespace and sign, then digits up to the first non-digit.
    pub fn parse_flipbook_id(attribute: Option<&str>) -> Option<i64> {
        let trimmed = attribute?.trim_start();
        let (negative, rest) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let value: i64 = rest[..digits_end].parse().ok()?;

        Some(if negative { -value } else { value })
    }

    pub fn mount_options(attribute: Option<&str>) -> MountOptions {
        MountOptions {
            raw_id: Self::parse_flipbook_id(attribute),
            auto_start: true,
            show_controls: false,
            retry_enabled: true,
        }
    }
}
