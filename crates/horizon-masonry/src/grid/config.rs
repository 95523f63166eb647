//! Grid configuration.
//!
//! `GridConfig` is plain data. It can be built in code with the `with_*`
//! setters or loaded from a settings file:
//!
//! ```
//! use horizon_masonry::grid::GridConfig;
//! use std::time::Duration;
//!
//! let config = GridConfig::from_toml_str(r#"
//! columnCount = 3
//! gutter = 12.0
//! asyncTimeout = 500
//!
//! [viewOptions]
//! theme = "dark"
//! "#).unwrap();
//!
//! assert_eq!(config.column_count, 3);
//! assert_eq!(config.async_timeout, Duration::from_millis(500));
//! assert_eq!(config.view_options["theme"], "dark");
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::ConfigError;

/// Default number of columns.
pub const DEFAULT_COLUMN_COUNT: usize = 5;

/// Default spacing between columns and between stacked items, in pixels.
pub const DEFAULT_GUTTER: f32 = 20.0;

/// Default wait before an asynchronous view is placed regardless of readiness.
pub const DEFAULT_ASYNC_TIMEOUT: Duration = Duration::from_millis(2000);

/// Default batching delay between the first queued item and its layout pass.
pub const DEFAULT_LAYOUT_INTERVAL: Duration = Duration::from_millis(20);

/// Configuration for a [`MasonryGrid`](super::MasonryGrid).
///
/// `column_count` and `gutter` may be changed on a live grid through
/// [`MasonryGrid::set_column_count`](super::MasonryGrid::set_column_count) and
/// [`MasonryGrid::set_gutter`](super::MasonryGrid::set_gutter); the change
/// takes effect on the next reflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridConfig {
    /// Number of columns. Must be at least 1.
    pub column_count: usize,

    /// Spacing between columns and between items in a column, in pixels.
    pub gutter: f32,

    /// How long an asynchronous view may stay unready before it is placed
    /// anyway. Only enforced when `enforce_async_timeout` is set.
    #[serde(with = "duration_millis")]
    pub async_timeout: Duration,

    /// Place asynchronous views once `async_timeout` elapses without a
    /// readiness notification.
    pub enforce_async_timeout: bool,

    /// Place items in submission order even when asynchronous views become
    /// ready out of order. Only enforced when `enforce_order` is set.
    pub ensure_order: bool,

    /// Sequence placement by submission ticket when `ensure_order` is set.
    pub enforce_order: bool,

    /// Delay between the first enqueue and the layout pass that flushes it.
    #[serde(with = "duration_millis")]
    pub layout_interval: Duration,

    /// Extra fields merged into every view's options.
    pub view_options: Map<String, Value>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            column_count: DEFAULT_COLUMN_COUNT,
            gutter: DEFAULT_GUTTER,
            async_timeout: DEFAULT_ASYNC_TIMEOUT,
            enforce_async_timeout: false,
            ensure_order: false,
            enforce_order: false,
            layout_interval: DEFAULT_LAYOUT_INTERVAL,
            view_options: Map::new(),
        }
    }
}

impl GridConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the column count.
    pub fn with_column_count(mut self, column_count: usize) -> Self {
        self.column_count = column_count;
        self
    }

    /// Sets the gutter.
    pub fn with_gutter(mut self, gutter: f32) -> Self {
        self.gutter = gutter;
        self
    }

    /// Sets the asynchronous readiness timeout.
    pub fn with_async_timeout(mut self, timeout: Duration) -> Self {
        self.async_timeout = timeout;
        self
    }

    /// Enables or disables enforcement of the asynchronous timeout.
    pub fn with_enforced_async_timeout(mut self, enforce: bool) -> Self {
        self.enforce_async_timeout = enforce;
        self
    }

    /// Requests submission-order placement. See `enforce_order`.
    pub fn with_ensure_order(mut self, ensure_order: bool) -> Self {
        self.ensure_order = ensure_order;
        self
    }

    /// Enables or disables enforcement of `ensure_order`.
    pub fn with_enforced_order(mut self, enforce: bool) -> Self {
        self.enforce_order = enforce;
        self
    }

    /// Whether placement is sequenced by submission order.
    pub fn orders_placement(&self) -> bool {
        self.ensure_order && self.enforce_order
    }

    /// Sets the batching delay before each layout pass.
    pub fn with_layout_interval(mut self, interval: Duration) -> Self {
        self.layout_interval = interval;
        self
    }

    /// Adds one field to the view options.
    pub fn with_view_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.view_options.insert(key.into(), value.into());
        self
    }

    /// Checks that the configuration describes a usable grid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_column_count(self.column_count)?;
        validate_gutter(self.gutter)
    }

    /// Parses a configuration from TOML text. Missing keys take defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a configuration from JSON text. Missing keys take defaults.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Width of one column for a container of `container_width` pixels.
    ///
    /// `(container_width - gutter * (columns - 1)) / columns`, never negative.
    pub fn item_width(&self, container_width: f32) -> f32 {
        let columns = self.column_count.max(1) as f32;
        let width = (container_width - self.gutter * (columns - 1.0)) / columns;
        if width.is_finite() { width.max(0.0) } else { 0.0 }
    }
}

pub(crate) fn validate_column_count(column_count: usize) -> Result<(), ConfigError> {
    if column_count == 0 {
        return Err(ConfigError::InvalidColumnCount(column_count));
    }
    Ok(())
}

pub(crate) fn validate_gutter(gutter: f32) -> Result<(), ConfigError> {
    if !gutter.is_finite() || gutter < 0.0 {
        return Err(ConfigError::InvalidGutter(gutter));
    }
    Ok(())
}

/// Serde adapter storing a `Duration` as integer milliseconds.
mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
